//! Configuration Vault – reads/writes `~/.argus/config.toml`.

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use argus_middleware::{DEFAULT_ROBOT_URL, LinkConfig, SimulatedRobot};
use argus_runtime::{DEFAULT_HOME, SessionConfig, SimSettings};
use argus_types::{ArgusError, LatLng};
use serde::{Deserialize, Serialize};

/// Persisted operator configuration stored in `~/.argus/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// WebSocket endpoint of the robot firmware.
    #[serde(default = "default_robot_url")]
    pub robot_url: String,

    /// Seconds between liveness pings while the link is open.
    #[serde(default = "default_heartbeat_secs")]
    pub heartbeat_secs: u64,

    /// Bot position shown before the first GPS fix.
    #[serde(default = "default_home_lat")]
    pub home_lat: f64,
    #[serde(default = "default_home_lng")]
    pub home_lng: f64,

    /// Local port for the simulated robot (`/sim`).
    #[serde(default = "default_sim_port")]
    pub sim_port: u16,

    /// Simulated telemetry period in milliseconds.
    #[serde(default = "default_sim_period_ms")]
    pub sim_period_ms: u64,
}

fn default_robot_url() -> String {
    DEFAULT_ROBOT_URL.to_string()
}
fn default_heartbeat_secs() -> u64 {
    10
}
fn default_home_lat() -> f64 {
    DEFAULT_HOME.lat
}
fn default_home_lng() -> f64 {
    DEFAULT_HOME.lng
}
fn default_sim_port() -> u16 {
    9091
}
fn default_sim_period_ms() -> u64 {
    1000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            robot_url: default_robot_url(),
            heartbeat_secs: default_heartbeat_secs(),
            home_lat: default_home_lat(),
            home_lng: default_home_lng(),
            sim_port: default_sim_port(),
            sim_period_ms: default_sim_period_ms(),
        }
    }
}

impl Config {
    pub fn home(&self) -> LatLng {
        LatLng::new(self.home_lat, self.home_lng)
    }

    /// Zero intervals are raised to the smallest usable value.
    pub fn link_config(&self) -> LinkConfig {
        LinkConfig::new(self.robot_url.clone())
            .with_heartbeat(Duration::from_secs(self.heartbeat_secs.max(1)))
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            home: self.home(),
            ..SessionConfig::default()
        }
    }

    pub fn sim_settings(&self) -> SimSettings {
        SimSettings {
            robot: SimulatedRobot::new(self.home())
                .with_period(Duration::from_millis(self.sim_period_ms.max(1))),
            addr: SocketAddr::from(([127, 0, 0, 1], self.sim_port)),
        }
    }
}

/// Return the path to `~/.argus/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

/// Build the config path relative to the given home directory.
pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".argus").join("config.toml")
}

/// Load the config from disk with `ARGUS_*` overrides applied. Returns
/// `None` if the file does not exist.
pub fn load() -> Result<Option<Config>, ArgusError> {
    let mut cfg = load_from(&config_path())?;
    if let Some(cfg) = cfg.as_mut() {
        apply_env_overrides(cfg);
    }
    Ok(cfg)
}

pub(crate) fn load_from(path: &Path) -> Result<Option<Config>, ArgusError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path).map_err(|e| {
        ArgusError::Config(format!("failed to read config at {}: {e}", path.display()))
    })?;
    let cfg: Config = toml::from_str(&raw)
        .map_err(|e| ArgusError::Config(format!("failed to parse config: {e}")))?;
    Ok(Some(cfg))
}

/// Apply `ARGUS_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `ARGUS_ROBOT_URL` | `robot_url` |
/// | `ARGUS_HEARTBEAT_SECS` | `heartbeat_secs` |
/// | `ARGUS_SIM_PORT` | `sim_port` |
///
/// Values that do not parse are ignored.
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("ARGUS_ROBOT_URL") {
        cfg.robot_url = v;
    }
    if let Ok(v) = std::env::var("ARGUS_HEARTBEAT_SECS")
        && let Ok(secs) = v.parse::<u64>()
    {
        cfg.heartbeat_secs = secs;
    }
    if let Ok(v) = std::env::var("ARGUS_SIM_PORT")
        && let Ok(port) = v.parse::<u16>()
    {
        cfg.sim_port = port;
    }
}

/// Save the config to disk, creating `~/.argus/` if necessary.
pub fn save(cfg: &Config) -> Result<(), ArgusError> {
    save_to(cfg, &config_path())
}

pub(crate) fn save_to(cfg: &Config, path: &Path) -> Result<(), ArgusError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            ArgusError::Config(format!("failed to create config directory: {e}"))
        })?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(parent, fs::Permissions::from_mode(0o700)).map_err(|e| {
                ArgusError::Config(format!("failed to set config directory permissions: {e}"))
            })?;
        }
    }
    let raw = toml::to_string_pretty(cfg)
        .map_err(|e| ArgusError::Config(format!("failed to serialize config: {e}")))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .and_then(|mut f| {
                use std::io::Write;
                f.write_all(raw.as_bytes())
            })
            .map_err(|e| {
                ArgusError::Config(format!("failed to write config at {}: {e}", path.display()))
            })?;
    }
    #[cfg(not(unix))]
    fs::write(path, raw).map_err(|e| {
        ArgusError::Config(format!("failed to write config at {}: {e}", path.display()))
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn config_file_has_restrictive_permissions() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());

        save_to(&Config::default(), &path).expect("save");

        let file_mode = std::fs::metadata(&path).expect("file metadata").permissions().mode() & 0o777;
        assert_eq!(file_mode, 0o600, "config file must have 0o600 permissions");

        let dir_mode = std::fs::metadata(path.parent().unwrap())
            .expect("dir metadata")
            .permissions()
            .mode()
            & 0o777;
        assert_eq!(dir_mode, 0o700, "config directory must have 0o700 permissions");
    }

    #[test]
    fn roundtrip_default_config() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());

        save_to(&Config::default(), &path).expect("save");

        let loaded = load_from(&path).expect("load ok").expect("some");
        assert_eq!(loaded.robot_url, "ws://192.168.4.1/ws");
        assert_eq!(loaded.heartbeat_secs, 10);
        assert_eq!(loaded.home(), LatLng::new(7.351136, -2.341782));
        assert_eq!(loaded.sim_port, 9091);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "robot_url = \"ws://10.0.0.7/ws\"\n").unwrap();

        let loaded = load_from(&path).expect("load ok").expect("some");
        assert_eq!(loaded.robot_url, "ws://10.0.0.7/ws");
        assert_eq!(loaded.sim_period_ms, 1000);
        assert_eq!(loaded.home_lat, 7.351136);
    }

    #[test]
    fn parse_error_is_a_config_error() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "heartbeat_secs = \"often\"").unwrap();
        assert!(matches!(load_from(&path), Err(ArgusError::Config(_))));
    }

    #[test]
    fn config_path_points_to_argus_dir() {
        let p = config_path_for_home("/home/operator");
        assert!(p.to_string_lossy().contains(".argus"));
        assert!(p.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn load_from_returns_none_when_missing() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());
        assert!(load_from(&path).expect("no error").is_none());
    }

    #[test]
    fn derived_runtime_configs() {
        let cfg = Config {
            heartbeat_secs: 0,
            sim_port: 9200,
            ..Config::default()
        };
        assert_eq!(cfg.link_config().heartbeat, Duration::from_secs(1));
        assert_eq!(cfg.link_config().url, "ws://192.168.4.1/ws");
        assert_eq!(cfg.session_config().home, DEFAULT_HOME);
        assert_eq!(cfg.sim_settings().addr.port(), 9200);
    }

    // Env-var tests share one function so they never race each other.
    #[test]
    fn apply_env_overrides_reads_argus_vars() {
        // SAFETY: only this test touches ARGUS_* variables.
        unsafe {
            std::env::set_var("ARGUS_ROBOT_URL", "ws://127.0.0.1:9091/ws");
            std::env::set_var("ARGUS_HEARTBEAT_SECS", "3");
            std::env::set_var("ARGUS_SIM_PORT", "not-a-port");
        }
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.robot_url, "ws://127.0.0.1:9091/ws");
        assert_eq!(cfg.heartbeat_secs, 3);
        assert_eq!(cfg.sim_port, 9091);
        unsafe {
            std::env::remove_var("ARGUS_ROBOT_URL");
            std::env::remove_var("ARGUS_HEARTBEAT_SECS");
            std::env::remove_var("ARGUS_SIM_PORT");
        }
    }
}
