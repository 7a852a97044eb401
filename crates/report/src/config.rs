use std::path::PathBuf;

use anyhow::Context;

/// Filter applied when `APPROVAL_FILTER` is unset: everything, no search.
pub const DEFAULT_FILTER_JSON: &str = r#"{"status":"all","type":"all","search":""}"#;

/// Report configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// JSON file holding an array of approval records exported from the store.
    pub snapshot_path: PathBuf,
    /// Untyped filter object; validated before use.
    pub filter: serde_json::Value,
}

impl ReportConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var              | Default                                  |
    /// |----------------------|------------------------------------------|
    /// | `APPROVALS_SNAPSHOT` | required                                 |
    /// | `APPROVAL_FILTER`    | `{"status":"all","type":"all","search":""}` |
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ReportConfig::from_env`] with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let snapshot_path = lookup("APPROVALS_SNAPSHOT")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .context("APPROVALS_SNAPSHOT environment variable is required")?;

        let filter_json = lookup("APPROVAL_FILTER").unwrap_or_else(|| DEFAULT_FILTER_JSON.into());
        let filter: serde_json::Value =
            serde_json::from_str(&filter_json).context("APPROVAL_FILTER must be valid JSON")?;

        Ok(Self {
            snapshot_path,
            filter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn snapshot_path_is_required() {
        let err = ReportConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(err.to_string().contains("APPROVALS_SNAPSHOT"));
    }

    #[test]
    fn blank_snapshot_path_is_rejected() {
        assert!(ReportConfig::from_lookup(lookup_from(&[("APPROVALS_SNAPSHOT", "  ")])).is_err());
    }

    #[test]
    fn filter_defaults_to_everything() {
        let config =
            ReportConfig::from_lookup(lookup_from(&[("APPROVALS_SNAPSHOT", "/tmp/a.json")]))
                .unwrap();
        assert_eq!(config.snapshot_path, PathBuf::from("/tmp/a.json"));
        assert_eq!(
            config.filter,
            serde_json::json!({"status": "all", "type": "all", "search": ""})
        );
    }

    #[test]
    fn malformed_filter_json_is_an_error() {
        let result = ReportConfig::from_lookup(lookup_from(&[
            ("APPROVALS_SNAPSHOT", "/tmp/a.json"),
            ("APPROVAL_FILTER", "{status:"),
        ]));
        let err = result.unwrap_err();
        assert!(err.to_string().contains("APPROVAL_FILTER"));
    }
}
