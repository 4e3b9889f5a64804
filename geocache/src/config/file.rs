//! INI settings file.
//!
//! # Format
//!
//! ```ini
//! [backend]
//! max_size_bytes = 536870912
//! ttl_secs = 60
//!
//! [fixed]
//! resolution = 5
//! cache_limit = 5000
//!
//! [ring]
//! resolution = 6
//! cache_limit = 2000
//! k = 1
//! tag = ring
//! read_only = false
//! ```
//!
//! Every section and key is optional. A strategy section that is present
//! yields a config starting from that strategy's defaults; an absent section
//! leaves the strategy unconfigured.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use ini::{Ini, Properties};
use tracing::warn;

use super::{ConfigError, FixedCellConfig, RingConfig};
use crate::cache::MemoryBackend;

/// Default memory backend capacity (512 MB).
pub const DEFAULT_BACKEND_MAX_SIZE_BYTES: u64 = 512 * 1024 * 1024;

const BACKEND_SECTION: &str = "backend";
const FIXED_SECTION: &str = "fixed";
const RING_SECTION: &str = "ring";

/// Memory backend settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackendSettings {
    /// Maximum total value size in bytes.
    pub max_size_bytes: u64,

    /// Entry time-to-live; `None` keeps entries until evicted.
    pub ttl: Option<Duration>,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            max_size_bytes: DEFAULT_BACKEND_MAX_SIZE_BYTES,
            ttl: None,
        }
    }
}

impl BackendSettings {
    /// Build the memory backend these settings describe.
    pub fn build(&self) -> MemoryBackend {
        MemoryBackend::new(self.max_size_bytes, self.ttl)
    }
}

/// Everything a settings file can configure.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CacheSettings {
    /// Backend settings.
    pub backend: BackendSettings,

    /// Fixed-cell strategy, if the file has a `[fixed]` section.
    pub fixed: Option<FixedCellConfig>,

    /// Ring-expansion strategy, if the file has a `[ring]` section.
    pub ring: Option<RingConfig>,
}

impl CacheSettings {
    /// Load settings from an INI file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::Load {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_ini(&ini)
    }

    /// Parse settings from INI text.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Self::from_ini(&ini)
    }

    fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let mut settings = Self::default();

        if let Some(props) = ini.section(Some(BACKEND_SECTION)) {
            warn_unknown_keys(BACKEND_SECTION, props, &["max_size_bytes", "ttl_secs"]);
            if let Some(max) = parse_value(BACKEND_SECTION, props, "max_size_bytes")? {
                settings.backend.max_size_bytes = max;
            }
            if let Some(secs) = parse_value::<u64>(BACKEND_SECTION, props, "ttl_secs")? {
                settings.backend.ttl = (secs > 0).then(|| Duration::from_secs(secs));
            }
        }

        if let Some(props) = ini.section(Some(FIXED_SECTION)) {
            warn_unknown_keys(
                FIXED_SECTION,
                props,
                &["resolution", "cache_limit", "tag", "read_only"],
            );
            let mut config = FixedCellConfig::default();
            if let Some(resolution) = parse_value(FIXED_SECTION, props, "resolution")? {
                config.resolution = resolution;
            }
            if let Some(limit) = parse_value(FIXED_SECTION, props, "cache_limit")? {
                config.cache_limit = limit;
            }
            if let Some(tag) = props.get("tag") {
                config.tag = tag.trim().to_string();
            }
            if let Some(read_only) = parse_bool(FIXED_SECTION, props, "read_only")? {
                config.read_only = read_only;
            }
            settings.fixed = Some(config);
        }

        if let Some(props) = ini.section(Some(RING_SECTION)) {
            warn_unknown_keys(
                RING_SECTION,
                props,
                &["resolution", "cache_limit", "k", "tag", "read_only"],
            );
            let mut config = RingConfig::default();
            if let Some(resolution) = parse_value(RING_SECTION, props, "resolution")? {
                config.resolution = resolution;
            }
            if let Some(limit) = parse_value(RING_SECTION, props, "cache_limit")? {
                config.cache_limit = limit;
            }
            if let Some(k) = parse_value(RING_SECTION, props, "k")? {
                config.k = k;
            }
            if let Some(tag) = props.get("tag") {
                config.tag = tag.trim().to_string();
            }
            if let Some(read_only) = parse_bool(RING_SECTION, props, "read_only")? {
                config.read_only = read_only;
            }
            settings.ring = Some(config);
        }

        Ok(settings)
    }
}

fn invalid(section: &str, key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn parse_value<T: FromStr>(
    section: &str,
    props: &Properties,
    key: &str,
) -> Result<Option<T>, ConfigError> {
    match props.get(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| invalid(section, key, raw)),
    }
}

fn parse_bool(section: &str, props: &Properties, key: &str) -> Result<Option<bool>, ConfigError> {
    match props.get(key) {
        None => Ok(None),
        Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(Some(true)),
            "false" | "no" | "off" | "0" => Ok(Some(false)),
            _ => Err(invalid(section, key, raw)),
        },
    }
}

fn warn_unknown_keys(section: &str, props: &Properties, known: &[&str]) {
    for (key, _) in props.iter() {
        if !known.contains(&key) {
            warn!(section = %section, key = %key, "Ignoring unknown settings key");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const FULL: &str = "\
[backend]
max_size_bytes = 1048576
ttl_secs = 60

[fixed]
resolution = 4
cache_limit = 100
read_only = yes

[ring]
resolution = 7
cache_limit = 50
k = 2
tag = nearby
";

    #[test]
    fn test_parse_full_settings() {
        let settings = CacheSettings::parse(FULL).unwrap();

        assert_eq!(settings.backend.max_size_bytes, 1_048_576);
        assert_eq!(settings.backend.ttl, Some(Duration::from_secs(60)));

        let fixed = settings.fixed.unwrap();
        assert_eq!(fixed.resolution, 4);
        assert_eq!(fixed.cache_limit, 100);
        assert_eq!(fixed.tag, "fixed");
        assert!(fixed.read_only);

        let ring = settings.ring.unwrap();
        assert_eq!(ring.resolution, 7);
        assert_eq!(ring.cache_limit, 50);
        assert_eq!(ring.k, 2);
        assert_eq!(ring.tag, "nearby");
        assert!(!ring.read_only);
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        let settings = CacheSettings::parse("").unwrap();
        assert_eq!(settings, CacheSettings::default());
        assert!(settings.fixed.is_none());
        assert!(settings.ring.is_none());
    }

    #[test]
    fn test_empty_section_gives_strategy_defaults() {
        let settings = CacheSettings::parse("[ring]\n").unwrap();
        assert_eq!(settings.ring, Some(RingConfig::default()));
    }

    #[test]
    fn test_zero_ttl_disables_expiry() {
        let settings = CacheSettings::parse("[backend]\nttl_secs = 0\n").unwrap();
        assert_eq!(settings.backend.ttl, None);
    }

    #[test]
    fn test_negative_k_is_rejected() {
        let err = CacheSettings::parse("[ring]\nk = -1\n").unwrap_err();
        match err {
            ConfigError::InvalidValue {
                section,
                key,
                value,
            } => {
                assert_eq!(section, "ring");
                assert_eq!(key, "k");
                assert_eq!(value, "-1");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bad_bool_is_rejected() {
        let result = CacheSettings::parse("[fixed]\nread_only = maybe\n");
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FULL.as_bytes()).unwrap();

        let settings = CacheSettings::load(file.path()).unwrap();
        assert_eq!(settings.ring.unwrap().k, 2);
    }

    #[test]
    fn test_load_missing_file() {
        let result = CacheSettings::load(Path::new("/nonexistent/geocache.ini"));
        assert!(matches!(result, Err(ConfigError::Load { .. })));
    }

    #[tokio::test]
    async fn test_backend_settings_build() {
        let backend = BackendSettings::default().build();
        assert_eq!(backend.max_size_bytes(), DEFAULT_BACKEND_MAX_SIZE_BYTES);
    }
}
