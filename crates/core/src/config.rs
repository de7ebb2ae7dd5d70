use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::Level;

use crate::store::{Latency, StoreSettings};

pub const CONFIG_FILE_CANDIDATES: [&str; 2] = ["sweetshop.toml", "config/sweetshop.toml"];

/// Sets every simulated delay at once; the per-step variables still win.
pub const LATENCY_ENV: &str = "SWEETSHOP_CATALOG_LATENCY_MS";

const MAX_SIMULATED_LATENCY_MS: u64 = 10_000;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub catalog: CatalogConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct CatalogConfig {
    pub latency: LatencyConfig,
    pub seed_path: Option<PathBuf>,
    pub currency: String,
}

impl CatalogConfig {
    pub fn store_settings(&self) -> StoreSettings {
        StoreSettings { latency: self.latency.to_latency(), currency: self.currency.clone() }
    }
}

/// Simulated delays in milliseconds. `save` covers both add and edit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LatencyConfig {
    pub load_ms: u64,
    pub purchase_ms: u64,
    pub restock_ms: u64,
    pub save_ms: u64,
    pub delete_ms: u64,
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self { load_ms: 1_000, purchase_ms: 1_000, restock_ms: 500, save_ms: 1_000, delete_ms: 500 }
    }
}

impl LatencyConfig {
    pub fn uniform(ms: u64) -> Self {
        Self { load_ms: ms, purchase_ms: ms, restock_ms: ms, save_ms: ms, delete_ms: ms }
    }

    pub fn to_latency(&self) -> Latency {
        Latency {
            load: Duration::from_millis(self.load_ms),
            purchase: Duration::from_millis(self.purchase_ms),
            restock: Duration::from_millis(self.restock_ms),
            save: Duration::from_millis(self.save_ms),
            delete: Duration::from_millis(self.delete_ms),
        }
    }

    /// Millisecond values keyed by step name.
    pub fn steps(&self) -> [(&'static str, u64); 5] {
        [
            ("load", self.load_ms),
            ("purchase", self.purchase_ms),
            ("restock", self.restock_ms),
            ("save", self.save_ms),
            ("delete", self.delete_ms),
        ]
    }

    fn steps_mut(&mut self) -> [(&'static str, &mut u64); 5] {
        [
            ("load", &mut self.load_ms),
            ("purchase", &mut self.purchase_ms),
            ("restock", &mut self.restock_ms),
            ("save", &mut self.save_ms),
            ("delete", &mut self.delete_ms),
        ]
    }
}

/// `SWEETSHOP_CATALOG_LATENCY_<STEP>_MS` for a step named by [`LatencyConfig::steps`].
pub fn latency_env_key(step: &str) -> String {
    format!("SWEETSHOP_CATALOG_LATENCY_{}_MS", step.to_ascii_uppercase())
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Applied to every step, like `LATENCY_ENV`.
    pub latency_ms: Option<u64>,
    pub seed_path: Option<PathBuf>,
    pub currency: Option<String>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("`{path}` is not valid TOML: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("config file `{0}` does not exist")]
    MissingConfigFile(PathBuf),
    #[error("`${{{var}}}` is referenced in the config file but not set")]
    MissingEnvInterpolation { var: String },
    #[error("`${{` without a closing `}}` in the config file")]
    UnterminatedInterpolation,
    #[error("{key}={value:?} is not a valid setting")]
    InvalidEnvOverride { key: String, value: String },
    #[error("invalid config: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog: CatalogConfig {
                latency: LatencyConfig::default(),
                seed_path: None,
                currency: "USD".to_string(),
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        [("compact", Self::Compact), ("pretty", Self::Pretty), ("json", Self::Json)]
            .into_iter()
            .find_map(|(name, format)| (name == normalized).then_some(format))
            .ok_or_else(|| {
                ConfigError::Validation(format!(
                    "logging.format `{normalized}` is not one of compact, pretty, json"
                ))
            })
    }
}

impl AppConfig {
    /// Precedence, lowest first: defaults, config file, `SWEETSHOP_*` env,
    /// programmatic overrides.
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from(CONFIG_FILE_CANDIDATES[0]));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(catalog) = patch.catalog {
            if let Some(latency) = catalog.latency {
                latency.apply_to(&mut self.catalog.latency);
            }
            if let Some(seed_path) = catalog.seed_path {
                self.catalog.seed_path = Some(seed_path);
            }
            if let Some(currency) = catalog.currency {
                self.catalog.currency = currency;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env(LATENCY_ENV) {
            self.catalog.latency = LatencyConfig::uniform(parse_u64(LATENCY_ENV, &value)?);
        }
        for (step, slot) in self.catalog.latency.steps_mut() {
            let key = latency_env_key(step);
            if let Some(value) = read_env(&key) {
                *slot = parse_u64(&key, &value)?;
            }
        }
        if let Some(value) = read_env("SWEETSHOP_CATALOG_SEED_PATH") {
            self.catalog.seed_path = Some(PathBuf::from(value));
        }
        if let Some(value) = read_env("SWEETSHOP_CATALOG_CURRENCY") {
            self.catalog.currency = value;
        }

        let log_level =
            read_env("SWEETSHOP_LOGGING_LEVEL").or_else(|| read_env("SWEETSHOP_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("SWEETSHOP_LOGGING_FORMAT").or_else(|| read_env("SWEETSHOP_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(latency_ms) = overrides.latency_ms {
            self.catalog.latency = LatencyConfig::uniform(latency_ms);
        }
        if let Some(seed_path) = overrides.seed_path {
            self.catalog.seed_path = Some(seed_path);
        }
        if let Some(currency) = overrides.currency {
            self.catalog.currency = currency;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_catalog(&self.catalog)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

/// Returns the config file that `load` would read, if any.
pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    CONFIG_FILE_CANDIDATES.into_iter().map(PathBuf::from).find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

/// Expands `${NAME}` references against the process environment.
fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut expanded = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        expanded.push_str(&rest[..start]);
        let after_open = &rest[start + 2..];
        let end = after_open.find('}').ok_or(ConfigError::UnterminatedInterpolation)?;
        let name = &after_open[..end];
        let value = env::var(name)
            .map_err(|_| ConfigError::MissingEnvInterpolation { var: name.to_string() })?;
        expanded.push_str(&value);
        rest = &after_open[end + 1..];
    }

    expanded.push_str(rest);
    Ok(expanded)
}

fn validate_catalog(catalog: &CatalogConfig) -> Result<(), ConfigError> {
    if let Some((step, ms)) =
        catalog.latency.steps().into_iter().find(|(_, ms)| *ms > MAX_SIMULATED_LATENCY_MS)
    {
        return Err(ConfigError::Validation(format!(
            "catalog.latency.{step}_ms is {ms}, must be in range 0..={MAX_SIMULATED_LATENCY_MS}"
        )));
    }

    let currency = catalog.currency.as_str();
    if currency.len() != 3 || !currency.chars().all(|ch| ch.is_ascii_uppercase()) {
        return Err(ConfigError::Validation(format!(
            "catalog.currency must be a three-letter uppercase code, got `{currency}`"
        )));
    }

    if let Some(seed_path) = &catalog.seed_path {
        if seed_path.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "catalog.seed_path must not be empty when set".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    logging.level.trim().parse::<Level>().map(|_| ()).map_err(|_| {
        ConfigError::Validation(format!(
            "logging.level `{}` is not a tracing level (trace, debug, info, warn, error)",
            logging.level
        ))
    })
}

/// Reads an env setting; blank values count as unset.
pub fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    catalog: Option<CatalogPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct CatalogPatch {
    latency: Option<LatencyPatch>,
    seed_path: Option<PathBuf>,
    currency: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LatencyPatch {
    load_ms: Option<u64>,
    purchase_ms: Option<u64>,
    restock_ms: Option<u64>,
    save_ms: Option<u64>,
    delete_ms: Option<u64>,
}

impl LatencyPatch {
    fn apply_to(self, latency: &mut LatencyConfig) {
        let values = [self.load_ms, self.purchase_ms, self.restock_ms, self.save_ms, self.delete_ms];
        for ((_, slot), value) in latency.steps_mut().into_iter().zip(values) {
            if let Some(ms) = value {
                *slot = ms;
            }
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
