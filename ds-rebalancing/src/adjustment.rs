use ds_protocol::ProjectId;
use serde::{Deserialize, Serialize};

use crate::error::RebalancingError;

/// The observed event volume of a project.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct ProjectVolume {
    /// The project identifier.
    pub id: ProjectId,
    /// The number of events observed for the project.
    pub total: f64,
}

/// Smooths volume disparities between the projects of an organization.
///
/// The model moves volume from the largest project towards projects below the average. The
/// adjustment of every project is bounded by the distance between the average and the smallest
/// project, and by the smallest project divided by the fidelity rate.
#[derive(Clone, Debug)]
pub struct AdjustedModel {
    projects: Vec<ProjectVolume>,
    fidelity_rate: f64,
}

impl AdjustedModel {
    /// Creates the model over the given project volumes.
    ///
    /// The fidelity rate must be a finite value in `(0, 1]`. Volumes must be finite and not
    /// negative.
    pub fn new(projects: Vec<ProjectVolume>, fidelity_rate: f64) -> Result<Self, RebalancingError> {
        if projects.is_empty() {
            return Err(RebalancingError::EmptyInput);
        }

        if !(fidelity_rate > 0.0 && fidelity_rate <= 1.0) {
            return Err(RebalancingError::InvalidFidelityRate(fidelity_rate));
        }

        for project in &projects {
            crate::error::check_count(project.total)?;
        }

        Ok(Self {
            projects,
            fidelity_rate,
        })
    }

    /// Returns the projects sorted by descending volume.
    ///
    /// Projects with equal volume are ordered by ascending id.
    pub fn sorted_projects(&self) -> Vec<ProjectVolume> {
        let mut sorted = self.projects.clone();
        sorted.sort_by(|a, b| b.total.total_cmp(&a.total).then(a.id.cmp(&b.id)));
        sorted
    }

    /// Computes the volume adjustment of every project.
    ///
    /// The returned deltas are aligned with [`sorted_projects`](Self::sorted_projects) and sum up
    /// to zero: every project after the first receives a non-negative delta towards the average,
    /// and the largest project gives up the sum of all of them.
    pub fn adjust_sample_rates(&self) -> Vec<f64> {
        let sorted = self.sorted_projects();

        let count = sorted.len() as f64;
        let avg = sorted.iter().map(|p| p.total).sum::<f64>() / count;
        let min_element = sorted.last().map_or(0.0, |p| p.total);

        let bound = (avg - min_element).min(min_element / self.fidelity_rate);

        let mut deltas = vec![0.0; sorted.len()];
        for (delta, project) in deltas.iter_mut().zip(&sorted).skip(1) {
            *delta = (avg - project.total).clamp(0.0, bound.max(0.0));
        }

        let given: f64 = deltas.iter().skip(1).sum();
        if let Some(first) = deltas.first_mut() {
            *first = -given;
        }

        deltas
    }
}
