use std::path::PathBuf;
use std::time::Duration;

pub const CONFIG_SCHEMA_VERSION: &str = "1";

/// Server configuration, filled from `CIVICA_*` environment variables by
/// the binary. Defaults suit local development; the session secret MUST
/// be overridden for any shared deployment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub database_path: PathBuf,
    pub session_secret: String,
    pub session_ttl: Duration,
    pub cors_allowed_origins: Vec<String>,
    pub seed_fixtures: bool,
    pub reset_on_boot: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            database_path: PathBuf::from("civica.db"),
            session_secret: "civica-dev-secret".to_string(),
            session_ttl: Duration::from_secs(60 * 60 * 24 * 2),
            cors_allowed_origins: Vec::new(),
            seed_fixtures: false,
            reset_on_boot: false,
        }
    }
}

pub fn validate_startup_config_contract(config: &ServerConfig) -> Result<(), String> {
    if config.bind_addr.trim().is_empty() {
        return Err("bind address must not be empty".to_string());
    }
    if config.session_secret.len() < 8 {
        return Err("session secret must be at least 8 bytes".to_string());
    }
    if config.session_ttl.is_zero() {
        return Err("session ttl must be > 0".to_string());
    }
    if config.database_path.as_os_str().is_empty() {
        return Err("database path must not be empty".to_string());
    }
    if config.reset_on_boot && !config.seed_fixtures {
        // A reset without fixtures leaves an empty site with no admin.
        return Err("reset_on_boot requires seed_fixtures".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pass_the_startup_contract() {
        validate_startup_config_contract(&ServerConfig::default()).expect("defaults valid");
    }

    #[test]
    fn short_secret_and_zero_ttl_are_rejected() {
        let cfg = ServerConfig {
            session_secret: "short".to_string(),
            ..ServerConfig::default()
        };
        let err = validate_startup_config_contract(&cfg).expect_err("short secret");
        assert!(err.contains("secret"));

        let cfg = ServerConfig {
            session_ttl: Duration::ZERO,
            ..ServerConfig::default()
        };
        let err = validate_startup_config_contract(&cfg).expect_err("zero ttl");
        assert!(err.contains("ttl"));
    }

    #[test]
    fn reset_without_fixtures_is_rejected() {
        let cfg = ServerConfig {
            reset_on_boot: true,
            seed_fixtures: false,
            ..ServerConfig::default()
        };
        let err = validate_startup_config_contract(&cfg).expect_err("reset without seed");
        assert!(err.contains("seed_fixtures"));
    }
}
