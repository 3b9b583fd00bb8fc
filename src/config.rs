use std::path::PathBuf;

pub const WORKSPACE_ENV: &str = "GRADECALCD_WORKSPACE";
pub const LOG_ENV: &str = "GRADECALCD_LOG";
const DEFAULT_LOG_FILTER: &str = "warn";

/// Startup settings read from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct DaemonConfig {
    /// Workspace opened before the first request, if set.
    pub workspace: Option<PathBuf>,
    pub log_filter: String,
}

impl DaemonConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let workspace = lookup(WORKSPACE_ENV)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);
        let log_filter = lookup(LOG_ENV)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());
        Self {
            workspace,
            log_filter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_when_unset() {
        let cfg = DaemonConfig::from_lookup(|_| None);
        assert_eq!(cfg.workspace, None);
        assert_eq!(cfg.log_filter, "warn");
    }

    #[test]
    fn reads_and_trims_values() {
        let env: HashMap<&str, &str> = [
            (WORKSPACE_ENV, " /tmp/grades "),
            (LOG_ENV, "gradecalcd=debug"),
        ]
        .into_iter()
        .collect();
        let cfg = DaemonConfig::from_lookup(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.workspace, Some(PathBuf::from("/tmp/grades")));
        assert_eq!(cfg.log_filter, "gradecalcd=debug");
    }

    #[test]
    fn blank_workspace_is_ignored() {
        let cfg = DaemonConfig::from_lookup(|k| (k == WORKSPACE_ENV).then(|| "  ".to_string()));
        assert_eq!(cfg.workspace, None);
    }
}
