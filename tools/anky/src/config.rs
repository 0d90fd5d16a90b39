use crate::errors::AnkyError;
use crate::runtime::FileSystem;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Fixed session start/end overhead added to the summed keystroke delays.
pub const DEFAULT_BASE_OFFSET_SECONDS: u64 = 8;
/// Eight minutes of writing.
pub const DEFAULT_MIN_ELAPSED_SECONDS: u64 = 480;
pub const DEFAULT_DATA_DIR: &str = "data/writing_sessions";
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 4096;
const MIN_PAYLOAD_BYTES: usize = 64;

#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config_path: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub log_path: Option<PathBuf>,
    pub elapsed_override_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct AppConfig {
    pub replay: ReplayConfig,
    pub gate: GateConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReplayConfig {
    pub base_offset_seconds: u64,
    /// Replaces the computed elapsed time when set. Off unless configured.
    pub elapsed_override_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GateConfig {
    pub min_elapsed_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    pub path: Option<PathBuf>,
    pub max_payload_bytes: usize,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            base_offset_seconds: DEFAULT_BASE_OFFSET_SECONDS,
            elapsed_override_seconds: None,
        }
    }
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            min_elapsed_seconds: DEFAULT_MIN_ELAPSED_SECONDS,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            path: None,
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct PartialAppConfig {
    replay: Option<PartialReplayConfig>,
    gate: Option<PartialGateConfig>,
    storage: Option<PartialStorageConfig>,
    logging: Option<PartialLoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct PartialReplayConfig {
    base_offset_seconds: Option<u64>,
    elapsed_override_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct PartialGateConfig {
    min_elapsed_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct PartialStorageConfig {
    data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct PartialLoggingConfig {
    path: Option<PathBuf>,
    max_payload_bytes: Option<usize>,
}

/// Defaults, then the TOML file (if any), then CLI overrides. Relative paths
/// resolve against `process_cwd`.
pub fn load_config(
    overrides: &CliOverrides,
    process_cwd: &Path,
    fs: &dyn FileSystem,
) -> Result<AppConfig, AnkyError> {
    let mut cfg = AppConfig::default();

    if let Some(path) = &overrides.config_path {
        let file_contents = fs.read_to_string(&absolutize_path(process_cwd, path))?;
        let partial: PartialAppConfig = toml::from_str(&file_contents)
            .map_err(|e| AnkyError::ConfigParse(e.to_string()))?;
        merge_partial_config(&mut cfg, partial);
    }

    apply_cli_overrides(&mut cfg, overrides);
    validate_config(&cfg)?;

    cfg.storage.data_dir = absolutize_path(process_cwd, &cfg.storage.data_dir);
    if let Some(path) = cfg.logging.path.take() {
        cfg.logging.path = Some(absolutize_path(process_cwd, &path));
    }
    Ok(cfg)
}

fn merge_partial_config(cfg: &mut AppConfig, partial: PartialAppConfig) {
    if let Some(replay) = partial.replay {
        if let Some(value) = replay.base_offset_seconds {
            cfg.replay.base_offset_seconds = value;
        }
        if let Some(value) = replay.elapsed_override_seconds {
            cfg.replay.elapsed_override_seconds = Some(value);
        }
    }

    if let Some(gate) = partial.gate {
        if let Some(value) = gate.min_elapsed_seconds {
            cfg.gate.min_elapsed_seconds = value;
        }
    }

    if let Some(storage) = partial.storage {
        if let Some(value) = storage.data_dir {
            cfg.storage.data_dir = value;
        }
    }

    if let Some(logging) = partial.logging {
        if let Some(value) = logging.path {
            cfg.logging.path = Some(value);
        }
        if let Some(value) = logging.max_payload_bytes {
            cfg.logging.max_payload_bytes = value;
        }
    }
}

fn apply_cli_overrides(cfg: &mut AppConfig, overrides: &CliOverrides) {
    if let Some(data_dir) = &overrides.data_dir {
        cfg.storage.data_dir = data_dir.clone();
    }
    if let Some(log_path) = &overrides.log_path {
        cfg.logging.path = Some(log_path.clone());
    }
    if let Some(seconds) = overrides.elapsed_override_seconds {
        cfg.replay.elapsed_override_seconds = Some(seconds);
    }
}

fn absolutize_path(base: &Path, value: &Path) -> PathBuf {
    if value.is_absolute() {
        value.to_path_buf()
    } else {
        base.join(value)
    }
}

fn validate_config(cfg: &AppConfig) -> Result<(), AnkyError> {
    if cfg.gate.min_elapsed_seconds == 0 {
        return Err(AnkyError::InvalidConfig(
            "gate.min_elapsed_seconds must be greater than zero".to_string(),
        ));
    }

    if cfg.storage.data_dir.as_os_str().is_empty() {
        return Err(AnkyError::InvalidConfig(
            "storage.data_dir must not be empty".to_string(),
        ));
    }

    if cfg.logging.max_payload_bytes < MIN_PAYLOAD_BYTES {
        return Err(AnkyError::InvalidConfig(format!(
            "logging.max_payload_bytes must be at least {MIN_PAYLOAD_BYTES}"
        )));
    }

    Ok(())
}
