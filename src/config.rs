use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub supabase: SupabaseSettings,
    pub table: TableSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SupabaseSettings {
    pub url: String,
    pub service_role_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TableSettings {
    pub profiles: String,
    pub events: String,
    pub rsvps: String,
    pub notifications: String,
    pub crossed_paths: String,
}

/// Matchmaking knobs. The defaults reproduce the production constants:
/// 50 km radius, 0.3 compatibility threshold, groups of 2 to 6, dinners
/// scheduled 7 days out.
#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_max_radius_km")]
    pub max_radius_km: f64,
    #[serde(default = "default_compatibility_threshold")]
    pub compatibility_threshold: f64,
    #[serde(default = "default_max_group_size")]
    pub max_group_size: usize,
    #[serde(default = "default_min_group_size")]
    pub min_group_size: usize,
    #[serde(default = "default_event_lead_days")]
    pub event_lead_days: i64,
    #[serde(default = "default_run_timeout_secs")]
    pub run_timeout_secs: u64,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            max_radius_km: default_max_radius_km(),
            compatibility_threshold: default_compatibility_threshold(),
            max_group_size: default_max_group_size(),
            min_group_size: default_min_group_size(),
            event_lead_days: default_event_lead_days(),
            run_timeout_secs: default_run_timeout_secs(),
        }
    }
}

fn default_max_radius_km() -> f64 { 50.0 }
fn default_compatibility_threshold() -> f64 { 0.3 }
fn default_max_group_size() -> usize { 6 }
fn default_min_group_size() -> usize { 2 }
fn default_event_lead_days() -> i64 { 7 }
fn default_run_timeout_secs() -> u64 { 300 }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights: WeightsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_dining_style_weight")]
    pub dining_style: f64,
    #[serde(default = "default_dietary_weight")]
    pub dietary: f64,
    #[serde(default = "default_locality_weight")]
    pub locality: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            dining_style: default_dining_style_weight(),
            dietary: default_dietary_weight(),
            locality: default_locality_weight(),
        }
    }
}

fn default_dining_style_weight() -> f64 { 0.4 }
fn default_dietary_weight() -> f64 { 0.3 }
fn default_locality_weight() -> f64 { 0.3 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Environment variables (prefixed with CONVIVIO_)
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            // Add default config file
            .add_source(File::with_name("config/default").required(false))
            // Add local config file (for development overrides)
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables (prefixed with CONVIVIO_)
            // e.g., CONVIVIO_SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("CONVIVIO")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        // Substitute the Supabase connection secrets supplied out-of-band
        settings = substitute_env_vars(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("CONVIVIO")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

/// Override Supabase connection settings from the conventional environment
/// variables. SUPABASE_URL / SUPABASE_SERVICE_ROLE_KEY win over the prefixed
/// CONVIVIO_SUPABASE__* forms, which win over the config file.
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let supabase_url = env::var("SUPABASE_URL")
        .or_else(|_| env::var("CONVIVIO_SUPABASE__URL"))
        .ok();

    let service_role_key = env::var("SUPABASE_SERVICE_ROLE_KEY")
        .or_else(|_| env::var("CONVIVIO_SUPABASE__SERVICE_ROLE_KEY"))
        .ok();

    let mut builder = Config::builder().add_source(settings);

    if let Some(url) = supabase_url {
        builder = builder.set_override("supabase.url", url)?;
    }
    if let Some(key) = service_role_key {
        builder = builder.set_override("supabase.service_role_key", key)?;
    }

    builder.build()
}
