use std::collections::BTreeMap;

use crate::error::AuditError;
use crate::model::FunctionRecord;
use crate::services::provider::CloudProvider;
use crate::services::topology::TopologySource;

/// Tag keys that identify the deployment mechanism, highest priority first.
pub const DEFAULT_OWNERSHIP_KEYS: [&str; 3] =
    ["aws:cloudformation:stack-name", "aws:cloudformation:stack-id", "amplify:appId"];

pub fn default_ownership_keys() -> Vec<String> {
    DEFAULT_OWNERSHIP_KEYS.iter().map(|key| key.to_string()).collect()
}

/// Value of the first key in `priority` present in `tags`.
pub fn derive_owner(tags: &BTreeMap<String, String>, priority: &[String]) -> Option<String> {
    priority.iter().find_map(|key| tags.get(key)).cloned()
}

/// Builds the [`FunctionRecord`] for one function name.
pub struct FunctionInspector<'a> {
    pub provider: &'a dyn CloudProvider,
    pub topology: &'a TopologySource<'a>,
    pub ownership_keys: &'a [String],
}

impl<'a> FunctionInspector<'a> {
    /// Inspect one function.
    ///
    /// Not-found/denied identity lookups and tag failures are folded into the
    /// returned record. Any other identity failure is returned as
    /// [`AuditError::Inspection`] for the orchestrator to record.
    pub fn inspect(&self, name: &str) -> Result<FunctionRecord, AuditError> {
        let identity = match self.provider.get_function(name) {
            Ok(identity) => identity,
            Err(source) if source.is_not_found_or_denied() => {
                let err = AuditError::NotFoundOrDenied { name: name.to_string(), source };
                tracing::warn!("{err}");
                return Ok(FunctionRecord::not_found(name, err.to_string()));
            }
            Err(source) => {
                return Err(AuditError::Inspection { name: name.to_string(), source });
            }
        };

        let Some(arn) = identity.arn else {
            tracing::warn!(function = name, "identity response carried no ARN");
            return Ok(FunctionRecord::found_without_identifier(name));
        };

        let tags = match self.provider.list_tags(&arn) {
            Ok(tags) => tags,
            Err(source) => {
                let err = AuditError::TagLookupFailed { identifier: arn.clone(), source };
                tracing::warn!("{err}");
                BTreeMap::new()
            }
        };
        let owner = derive_owner(&tags, self.ownership_keys);

        let integrations = self.topology.get().matches_for(&arn);
        tracing::debug!(function = name, integrations = integrations.len(), "matched integrations");

        Ok(FunctionRecord::found(name, arn, tags, owner, integrations))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn owner_uses_first_key_in_priority_order() {
        let keys = default_ownership_keys();
        let t = tags(&[
            ("amplify:appId", "d123"),
            ("aws:cloudformation:stack-id", "arn:stack/demo/1"),
            ("aws:cloudformation:stack-name", "demo"),
        ]);
        assert_eq!(derive_owner(&t, &keys).as_deref(), Some("demo"));

        let t = tags(&[("amplify:appId", "d123"), ("aws:cloudformation:stack-id", "arn:stack")]);
        assert_eq!(derive_owner(&t, &keys).as_deref(), Some("arn:stack"));
    }

    #[test]
    fn owner_is_unset_without_known_keys() {
        let t = tags(&[("team", "payments")]);
        assert_eq!(derive_owner(&t, &default_ownership_keys()), None);
    }

    #[test]
    fn custom_priority_list_is_respected() {
        let keys = vec!["team".to_string(), "aws:cloudformation:stack-name".to_string()];
        let t = tags(&[("aws:cloudformation:stack-name", "demo"), ("team", "payments")]);
        assert_eq!(derive_owner(&t, &keys).as_deref(), Some("payments"));
    }
}
