//! Process configuration
//!
//! Parsed exactly once in `main` and handed to the components that need it.
//! Every flag can also come from the environment (or a `.env` file).

use anyhow::{ensure, Result};
use clap::Parser;
use dotenv::dotenv;
use std::fmt;
use std::path::Path;

const MIN_BCRYPT_COST: u32 = 4;
const MAX_BCRYPT_COST: u32 = 31;

#[derive(Parser, Clone)]
#[command(name = "library-backend")]
#[command(about = "Library lending backend - user accounts and bearer-token auth")]
pub struct Config {
    /// Interface to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value = "3000")]
    pub port: u16,

    /// SQLite database holding user accounts
    #[arg(long, env = "AUTH_DB_PATH", default_value = "library_auth.db")]
    pub auth_db_path: String,

    /// HMAC secret used to sign and verify every token
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: String,

    /// bcrypt work factor for new password hashes
    #[arg(long, env = "BCRYPT_COST", default_value_t = bcrypt::DEFAULT_COST)]
    pub bcrypt_cost: u32,
}

impl Config {
    /// Parse flags/environment and validate.
    pub fn load() -> Result<Self> {
        let config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            !self.jwt_secret.trim().is_empty(),
            "JWT_SECRET must be set to a non-empty value"
        );
        ensure!(
            (MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&self.bcrypt_cost),
            "BCRYPT_COST must be between {} and {}, got {}",
            MIN_BCRYPT_COST,
            MAX_BCRYPT_COST,
            self.bcrypt_cost
        );
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("auth_db_path", &self.auth_db_path)
            .field("jwt_secret", &"<redacted>")
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}

/// Load `.env` from the working directory (and parents), then from the crate root.
pub fn load_env() {
    let _ = dotenv();

    let manifest_env = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
    if manifest_env.exists() {
        let _ = dotenv::from_path(&manifest_env);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        let mut argv = vec!["library-backend"];
        argv.extend_from_slice(args);
        Config::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_flags_override_defaults() {
        let config = parse(&[
            "--jwt-secret",
            "s3cret",
            "--port",
            "8081",
            "--host",
            "127.0.0.1",
            "--bcrypt-cost",
            "5",
        ]);

        assert_eq!(config.bind_addr(), "127.0.0.1:8081");
        assert_eq!(config.bcrypt_cost, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_blank_secret_rejected() {
        let config = parse(&["--jwt-secret", "   "]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bcrypt_cost_range() {
        assert!(parse(&["--jwt-secret", "s", "--bcrypt-cost", "3"])
            .validate()
            .is_err());
        assert!(parse(&["--jwt-secret", "s", "--bcrypt-cost", "32"])
            .validate()
            .is_err());
        assert!(parse(&["--jwt-secret", "s", "--bcrypt-cost", "4"])
            .validate()
            .is_ok());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = parse(&["--jwt-secret", "do-not-print-me"]);
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("do-not-print-me"));
        assert!(rendered.contains("<redacted>"));
    }
}
