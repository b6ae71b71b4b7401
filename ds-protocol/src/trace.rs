use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::getter::{Getter, Val};

/// The trace information available to sampling rules.
///
/// This mirrors the dynamic sampling context that SDKs propagate with every trace. Fields are
/// exposed to rule conditions under the `trace.` prefix, see the [`Getter`] implementation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TraceContext {
    /// The trace identifier.
    pub trace_id: Uuid,
    /// The release of the application that started the trace.
    #[serde(default)]
    pub release: Option<String>,
    /// The environment of the application that started the trace.
    #[serde(default)]
    pub environment: Option<String>,
    /// The name of the root transaction.
    #[serde(default)]
    pub transaction: Option<String>,
    /// The identifier of a session replay associated with the trace.
    #[serde(default)]
    pub replay_id: Option<Uuid>,
    /// Whether the SDK made a positive sampling decision for the trace.
    #[serde(default)]
    pub sampled: Option<bool>,
}

impl Getter for TraceContext {
    fn get_value(&self, path: &str) -> Option<Val<'_>> {
        let path = path.strip_prefix("trace.")?;

        Some(match path {
            "release" => self.release.as_deref()?.into(),
            "environment" => self.environment.as_deref()?.into(),
            "transaction" => self.transaction.as_deref()?.into(),
            "replay_id" => self.replay_id?.into(),
            "sampled" => self.sampled?.into(),
            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use similar_asserts::assert_eq;

    use super::*;

    #[test]
    fn test_get_value() {
        let replay_id = Uuid::new_v4();
        let trace = TraceContext {
            trace_id: Uuid::new_v4(),
            release: Some("backend@1.0".to_owned()),
            environment: Some("prod".to_owned()),
            transaction: None,
            replay_id: Some(replay_id),
            sampled: Some(false),
        };

        assert_eq!(
            trace.get_value("trace.release"),
            Some(Val::String("backend@1.0"))
        );
        assert_eq!(trace.get_value("trace.environment"), Some(Val::String("prod")));
        assert_eq!(trace.get_value("trace.transaction"), None);
        assert_eq!(trace.get_value("trace.replay_id"), Some(Val::Uuid(replay_id)));
        assert_eq!(trace.get_value("trace.sampled"), Some(Val::Bool(false)));
        assert_eq!(trace.get_value("release"), None);
        assert_eq!(trace.get_value("trace.unknown"), None);
    }

    #[test]
    fn test_deserialize_partial() {
        let trace: TraceContext = serde_json::from_str(
            r#"{"trace_id": "67e5504410b1426f9247bb680e5fe0c8", "environment": "dev"}"#,
        )
        .unwrap();

        assert_eq!(trace.environment.as_deref(), Some("dev"));
        assert_eq!(trace.release, None);
    }
}
