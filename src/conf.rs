use config::Config;
use serde::{Deserialize, Serialize};
///  fn settings() -> &'static RwLock<Config>
///  fn questioneer() -> &'static RwLock<Questioneer>
///
///  struct Questioneer
use std::fmt;
use std::str::FromStr;
use std::sync::{OnceLock, RwLock};

use crate::erx;

/// default application short name, used in layouted error codes
pub const DEFAULT_SHORT: &str = "QSTN";

/// get raw settings
/// it's not recommended to call settings() directly, use questioneer() instead
pub fn settings() -> &'static RwLock<Config> {
    static CONFIG: OnceLock<RwLock<Config>> = OnceLock::new();
    CONFIG.get_or_init(|| {
        let config = init_config().unwrap_or_else(|e| {
            tracing::warn!("config sources failed to load, using defaults: {}", e);
            Config::default()
        });
        RwLock::new(config)
    })
}

/// get the shared Questioneer configuration
/// every field has a default, so a missing config directory is not an error
pub fn questioneer() -> &'static RwLock<Questioneer> {
    static QUESTIONEER: OnceLock<RwLock<Questioneer>> = OnceLock::new();
    QUESTIONEER.get_or_init(|| {
        if cfg!(test) {
            return RwLock::new(Questioneer::default());
        }

        let loaded = settings().read().map_err(erx::smp).and_then(|c| c.clone().try_deserialize::<Questioneer>().map_err(erx::smp));
        match loaded {
            Ok(q) => RwLock::new(q),
            Err(e) => {
                tracing::warn!("questioneer config invalid, using defaults: {}", e.message());
                RwLock::new(Questioneer::default())
            },
        }
    })
}

/// short application name, never panics
pub fn short() -> String {
    questioneer().read().map(|q| q.short.clone()).unwrap_or_else(|_| DEFAULT_SHORT.to_string())
}

/// load config sources
/// config/config.yml -> config/{QSTN_RUN_MODE}.yml -> config/local.yml -> QSTN_* environment
fn init_config() -> Result<Config, config::ConfigError> {
    //development production testing
    let run_mode = std::env::var("QSTN_RUN_MODE").unwrap_or("development".to_string());
    let config_path = std::env::var("QSTN_CONFIG_PATH").unwrap_or("config".to_string());

    tracing::info!("QSTN_RUN_MODE={} config path: {}", run_mode, config_path);

    let conf = config::File::with_name(&format!("{config_path}/config.yml")).required(false);
    let mode = config::File::with_name(&format!("{config_path}/{run_mode}.yml")).required(false);
    let local = config::File::with_name(&format!("{config_path}/local.yml")).required(false);

    Config::builder()
        .add_source(conf)
        .add_source(mode)
        .add_source(local)
        .add_source(config::Environment::with_prefix("QSTN").separator("__"))
        .build()
}

/// Questioneer config
/// # Fields
/// * `name` - application name, used as log file prefix
/// * `short` - short name, first part of every layouted error code
/// * `debug` - debug mode
/// * `web` - http listener
/// * `model` - persistence backend
/// * `log` - logging
/// * `listing` - questionnaire listing defaults
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct Questioneer {
    pub name: String,
    pub short: String,
    pub debug: bool,
    pub web: Web,
    pub model: Model,
    pub log: Option<Log>,
    pub listing: Listing,
}

/// # Fields
/// * `level` - EnvFilter directives
/// * `console` - write to stdout
/// * `dirs` - rolling log directory, empty disables file output
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct Log {
    pub level: String,
    pub console: bool,
    pub dirs: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct Web {
    pub port: u16,
    pub bind: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone, Copy, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Memory,
    Sqlite,
    Postgres,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct Backend {
    pub kind: BackendKind,
    pub connect: String,
    /// run the schema migration on startup
    pub migrate: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct Model {
    pub backend: Option<Backend>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct Listing {
    /// page size used when the request has no limit
    pub default_limit: i64,
}

impl Default for Log {
    fn default() -> Self {
        Log { level: "info".to_string(), console: true, dirs: String::new() }
    }
}

impl Default for Web {
    fn default() -> Self {
        Self { bind: None, port: 8080 }
    }
}

impl Default for Backend {
    fn default() -> Self {
        Self { kind: BackendKind::Memory, connect: String::new(), migrate: true }
    }
}

impl Default for Listing {
    fn default() -> Self {
        Self { default_limit: 10 }
    }
}

impl Default for Questioneer {
    fn default() -> Self {
        Self {
            name: "questioneer".to_string(),
            short: DEFAULT_SHORT.to_string(),
            debug: false,
            web: Default::default(),
            model: Default::default(),
            log: Default::default(),
            listing: Default::default(),
        }
    }
}

impl Web {
    pub fn bind_addr(&self) -> String {
        let bind = self.bind.clone().unwrap_or("0.0.0.0".to_string());
        format!("{}:{}", bind, self.port)
    }
}

impl Model {
    /// configured backend, in-memory when nothing is configured
    pub fn backend_or_memory(&self) -> Backend {
        self.backend.clone().unwrap_or_default()
    }
}

impl Questioneer {
    pub fn log_or_default(&self) -> Log {
        self.log.clone().unwrap_or_default()
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(BackendKind::Memory),
            "sqlite" => Ok(BackendKind::Sqlite),
            "postgres" => Ok(BackendKind::Postgres),
            _ => Err(format!("unknown backend kind: {}", s)),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BackendKind::Memory => write!(f, "Memory"),
            BackendKind::Sqlite => write!(f, "Sqlite"),
            BackendKind::Postgres => write!(f, "Postgres"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_source_deserializes_to_defaults() {
        let q: Questioneer = Config::builder().build().unwrap().try_deserialize().unwrap();
        assert_eq!(q.short, DEFAULT_SHORT);
        assert_eq!(q.listing.default_limit, 10);
        assert_eq!(q.model.backend_or_memory().kind, BackendKind::Memory);
    }

    #[test]
    fn yaml_overrides_nested_values() {
        let yaml = r#"
name: qa
web:
  port: 9001
  bind: 127.0.0.1
model:
  backend:
    kind: sqlite
    connect: "sqlite::memory:"
listing:
  default_limit: 25
"#;
        let q: Questioneer = Config::builder()
            .add_source(config::File::from_str(yaml, config::FileFormat::Yaml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(q.name, "qa");
        assert_eq!(q.web.bind_addr(), "127.0.0.1:9001");
        let backend = q.model.backend_or_memory();
        assert_eq!(backend.kind, BackendKind::Sqlite);
        assert!(backend.migrate);
        assert_eq!(q.listing.default_limit, 25);
    }

    #[test]
    fn backend_kind_from_str() {
        assert_eq!("Postgres".parse::<BackendKind>().unwrap(), BackendKind::Postgres);
        assert!("oracle".parse::<BackendKind>().is_err());
    }
}
