use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_TICK_MS: u64 = 1000;

/// Runtime knobs read from the environment at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Period of one nominal second. Shorter values are for rehearsals.
    pub tick_interval: Duration,
    pub settings_path: Option<PathBuf>,
    pub mute: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(DEFAULT_TICK_MS),
            settings_path: None,
            mute: false,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let tick_ms = lookup("CLASSTIMER_TICK_MS")
            .and_then(|value| value.trim().parse::<u64>().ok())
            .filter(|ms| *ms > 0)
            .unwrap_or(DEFAULT_TICK_MS);

        let settings_path = lookup("CLASSTIMER_SETTINGS")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);

        let mute = lookup("CLASSTIMER_MUTE")
            .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Self {
            tick_interval: Duration::from_millis(tick_ms),
            settings_path,
            mute,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> AppConfig {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn empty_environment_gives_defaults() {
        assert_eq!(config(&[]), AppConfig::default());
    }

    #[test]
    fn reads_all_variables() {
        let cfg = config(&[
            ("CLASSTIMER_TICK_MS", "50"),
            ("CLASSTIMER_SETTINGS", "/tmp/classtimer.json"),
            ("CLASSTIMER_MUTE", "TRUE"),
        ]);
        assert_eq!(cfg.tick_interval, Duration::from_millis(50));
        assert_eq!(cfg.settings_path, Some(PathBuf::from("/tmp/classtimer.json")));
        assert!(cfg.mute);
    }

    #[test]
    fn invalid_tick_falls_back_to_one_second() {
        for bad in ["0", "-3", "fast", ""] {
            let cfg = config(&[("CLASSTIMER_TICK_MS", bad)]);
            assert_eq!(cfg.tick_interval, Duration::from_secs(1));
        }
    }
}
