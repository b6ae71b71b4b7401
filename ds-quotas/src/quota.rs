use std::collections::BTreeMap;

use ds_protocol::{OrganizationId, Project};
use serde::{Deserialize, Serialize};

/// A transaction sampling tier of an organization's plan.
///
/// Organizations whose monthly volume falls into this tier are sampled at `sample_rate`.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SamplingTier {
    /// The monthly volume up to which this tier applies.
    pub volume: u64,
    /// The sample rate for organizations in this tier.
    pub sample_rate: f64,
}

/// Access to quota information of organizations.
pub trait Quotas: Send + Sync {
    /// Returns the blended sample rate of the project's organization.
    ///
    /// Returns `None` if dynamic sampling is not available for the organization.
    fn blended_sample_rate(&self, project: &Project) -> Option<f64>;

    /// Returns the sampling tier applicable to the given monthly transaction volume.
    fn transaction_sampling_tier_for_volume(
        &self,
        organization_id: OrganizationId,
        volume: u64,
    ) -> Option<SamplingTier>;
}

/// In-memory [`Quotas`] with fixed blended sample rates and sampling tiers.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StaticQuotas {
    /// The blended sample rate for organizations without an explicit entry.
    pub default_sample_rate: Option<f64>,
    /// Blended sample rates by organization.
    pub organizations: BTreeMap<OrganizationId, f64>,
    /// Sampling tiers in any order.
    pub tiers: Vec<SamplingTier>,
}

impl StaticQuotas {
    /// Creates quotas that return the same blended sample rate for every organization.
    pub fn with_sample_rate(sample_rate: f64) -> Self {
        Self {
            default_sample_rate: Some(sample_rate),
            ..Default::default()
        }
    }
}

impl Quotas for StaticQuotas {
    fn blended_sample_rate(&self, project: &Project) -> Option<f64> {
        self.organizations
            .get(&project.organization_id)
            .copied()
            .or(self.default_sample_rate)
    }

    fn transaction_sampling_tier_for_volume(
        &self,
        _organization_id: OrganizationId,
        volume: u64,
    ) -> Option<SamplingTier> {
        let mut tiers = self.tiers.clone();
        tiers.sort_by_key(|tier| tier.volume);

        // Volumes above the largest tier fall into the largest tier.
        tiers
            .iter()
            .find(|tier| volume <= tier.volume)
            .or(tiers.last())
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use ds_protocol::ProjectId;
    use similar_asserts::assert_eq;

    use super::*;

    fn tiered() -> StaticQuotas {
        serde_json::from_str(
            r#"{
                "defaultSampleRate": 0.5,
                "organizations": {"7": 0.1},
                "tiers": [
                    {"volume": 10000000, "sampleRate": 0.1},
                    {"volume": 100000, "sampleRate": 1.0},
                    {"volume": 1000000, "sampleRate": 0.5}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_blended_sample_rate() {
        let quotas = tiered();

        let project = Project::new(ProjectId::new(1), OrganizationId::new(7));
        assert_eq!(quotas.blended_sample_rate(&project), Some(0.1));

        let project = Project::new(ProjectId::new(1), OrganizationId::new(8));
        assert_eq!(quotas.blended_sample_rate(&project), Some(0.5));

        let project = Project::new(ProjectId::new(1), OrganizationId::new(8));
        assert_eq!(StaticQuotas::default().blended_sample_rate(&project), None);
    }

    #[test]
    fn test_sampling_tiers() {
        let quotas = tiered();
        let org = OrganizationId::new(1);

        let tier = |volume| {
            quotas
                .transaction_sampling_tier_for_volume(org, volume)
                .map(|tier| tier.sample_rate)
        };

        assert_eq!(tier(0), Some(1.0));
        assert_eq!(tier(100_000), Some(1.0));
        assert_eq!(tier(100_001), Some(0.5));
        assert_eq!(tier(5_000_000), Some(0.1));
        assert_eq!(tier(u64::MAX), Some(0.1));
    }

    #[test]
    fn test_no_tiers() {
        let quotas = StaticQuotas::with_sample_rate(0.2);
        assert_eq!(
            quotas.transaction_sampling_tier_for_volume(OrganizationId::new(1), 10),
            None
        );
    }
}
