use crate::errors::{AppError, AppResult};
use crate::models::location::GeoPoint;
use crate::utils::path::expand_tilde;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

pub mod migrate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Punch server database (used by `serve`, `db`, `log`)
    pub database: String,
    /// Device-local store holding the offline queue and clock display
    pub queue_database: String,
    pub server_url: String,
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default)]
    pub api_token: String,
    #[serde(default)]
    pub worker_id: String,
    #[serde(default)]
    pub device_name: String,
    #[serde(default = "default_time_zone")]
    pub time_zone: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub offline_punch_allowed: bool,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_watch_interval")]
    pub watch_interval_secs: u64,
}

fn default_bind() -> String {
    "127.0.0.1:8787".to_string()
}
fn default_time_zone() -> String {
    env::var("TZ")
        .ok()
        .filter(|tz| !tz.trim().is_empty())
        .unwrap_or_else(|| "UTC".to_string())
}
fn default_request_timeout() -> u64 {
    10
}
fn default_watch_interval() -> u64 {
    15
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: Self::database_file().to_string_lossy().to_string(),
            queue_database: Self::queue_database_file().to_string_lossy().to_string(),
            server_url: format!("http://{}", default_bind()),
            bind: default_bind(),
            api_token: String::new(),
            worker_id: String::new(),
            device_name: String::new(),
            time_zone: default_time_zone(),
            latitude: None,
            longitude: None,
            offline_punch_allowed: false,
            request_timeout_secs: default_request_timeout(),
            watch_interval_secs: default_watch_interval(),
        }
    }
}

impl Config {
    /// Return the standard configuration directory depending on the platform
    pub fn config_dir() -> PathBuf {
        if cfg!(target_os = "windows") {
            let appdata = env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(appdata).join("rpunch")
        } else {
            let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".rpunch")
        }
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("rpunch.conf")
    }

    /// Return the full path of the server SQLite database
    pub fn database_file() -> PathBuf {
        Self::config_dir().join("rpunch-server.sqlite")
    }

    /// Return the full path of the device-local queue database
    pub fn queue_database_file() -> PathBuf {
        Self::config_dir().join("rpunch-queue.sqlite")
    }

    /// Load configuration from file, or return defaults if not found
    pub fn load() -> AppResult<Self> {
        let path = Self::config_file();

        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&path)?;
        let mut cfg: Config = serde_yaml::from_str(&content)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?;
        cfg.database = expand_tilde(&cfg.database).to_string_lossy().to_string();
        cfg.queue_database = expand_tilde(&cfg.queue_database)
            .to_string_lossy()
            .to_string();
        Ok(cfg)
    }

    /// Configured device position; both coordinates are required.
    pub fn location(&self) -> Option<GeoPoint> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => GeoPoint::new(lat, lon),
            _ => None,
        }
    }

    /// Worker to punch for: explicit override first, then the configured one.
    pub fn resolve_worker(&self, worker: &Option<String>) -> AppResult<String> {
        worker
            .clone()
            .or_else(|| Some(self.worker_id.clone()))
            .filter(|w| !w.trim().is_empty())
            .ok_or_else(|| {
                AppError::Config("no worker id: set worker_id in the config or pass --worker".into())
            })
    }

    /// Initialize configuration and database files
    pub fn init_all(
        custom_db: Option<String>,
        custom_queue_db: Option<String>,
        is_test: bool,
    ) -> io::Result<Config> {
        let dir = Self::config_dir();
        fs::create_dir_all(&dir)?;

        let resolve = |name: Option<String>, default: PathBuf| match name {
            Some(n) => {
                let p = expand_tilde(&n);
                if p.is_absolute() { p } else { dir.join(p) }
            }
            None => default,
        };

        let config = Config {
            database: resolve(custom_db, Self::database_file())
                .to_string_lossy()
                .to_string(),
            queue_database: resolve(custom_queue_db, Self::queue_database_file())
                .to_string_lossy()
                .to_string(),
            ..Config::default()
        };

        if !is_test {
            let yaml = serde_yaml::to_string(&config).map_err(io::Error::other)?;
            let mut file = fs::File::create(Self::config_file())?;
            file.write_all(yaml.as_bytes())?;
            println!("✅ Config file: {:?}", Self::config_file());
        }

        Ok(config)
    }
}
