//! Command line, environment and file configuration for the phonebook server.
//!
//! Every setting resolves in the order CLI > environment > TOML file >
//! built-in default.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use phonebook_core::logging_facility::Profile;
use phonebook_engine::StoreBackend;
use serde::Deserialize;
use thiserror::Error;

pub(crate) const DEFAULT_BIND: &str = "127.0.0.1:8080";
pub(crate) const DEFAULT_DATABASE: &str = "phonebook.db";
pub(crate) const DEFAULT_CACHE_TTL_SECS: u64 = 300;

pub const ENV_BIND: &str = "PHONEBOOK_BIND";
pub const ENV_DATABASE: &str = "PHONEBOOK_DB";
pub const ENV_CACHE_TTL: &str = "PHONEBOOK_CACHE_TTL";
pub const ENV_LOG: &str = "PHONEBOOK_LOG";
pub const ENV_STORAGE: &str = "PHONEBOOK_STORAGE";

/// Contact management REST service.
#[derive(Parser, Debug)]
#[command(name = "phonebook-server", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP server (the default when no subcommand is given)
    Serve(ServeArgs),

    /// Apply pending schema migrations and exit
    Migrate {
        /// SQLite database file [env: PHONEBOOK_DB] [default: phonebook.db]
        #[arg(long, short = 'd')]
        database: Option<String>,
    },
}

#[derive(Args, Debug, Default, Clone)]
pub struct ServeArgs {
    /// HTTP bind address [env: PHONEBOOK_BIND] [default: 127.0.0.1:8080]
    #[arg(long, short = 'b')]
    pub bind: Option<String>,

    /// SQLite database file, or `:memory:` [env: PHONEBOOK_DB] [default: phonebook.db]
    #[arg(long, short = 'd')]
    pub database: Option<String>,

    /// Response cache time-to-live in seconds, 0 disables [env: PHONEBOOK_CACHE_TTL] [default: 300]
    #[arg(long)]
    pub cache_ttl_secs: Option<u64>,

    /// Log profile: development or production [env: PHONEBOOK_LOG] [default: development]
    #[arg(long)]
    pub log_profile: Option<String>,

    /// Storage backend: sqlite or memory [env: PHONEBOOK_STORAGE] [default: sqlite]
    #[arg(long)]
    pub storage: Option<String>,

    /// Optional TOML configuration file
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,
}

/// Settings accepted in the TOML configuration file
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub bind_addr: Option<String>,
    pub database: Option<String>,
    pub cache_ttl_secs: Option<u64>,
    pub log_profile: Option<String>,
    pub storage: Option<String>,
}

impl FileConfig {
    /// Read and parse a TOML configuration file
    ///
    /// # Errors
    /// Fails when the file cannot be read or is not valid TOML for this schema.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid value for {setting}: {message}")]
    Invalid { setting: &'static str, message: String },
}

/// Fully resolved server settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub backend: StoreBackend,
    pub cache_ttl: Duration,
    pub log_profile: Profile,
}

impl ServerConfig {
    /// Resolve settings from CLI arguments and the process environment
    ///
    /// # Errors
    /// Fails on an unreadable config file or an unparseable setting.
    pub fn from_cli_and_env(args: ServeArgs) -> Result<Self, ConfigError> {
        Self::resolve(args, |key| std::env::var(key).ok())
    }

    /// Resolve settings with an injectable environment lookup
    ///
    /// # Errors
    /// Fails on an unreadable config file or an unparseable setting.
    pub fn resolve<E>(args: ServeArgs, env: E) -> Result<Self, ConfigError>
    where
        E: Fn(&str) -> Option<String>,
    {
        let file = match &args.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };

        let bind_addr = args
            .bind
            .or_else(|| env(ENV_BIND))
            .or(file.bind_addr)
            .unwrap_or_else(|| DEFAULT_BIND.to_string());

        let database = args
            .database
            .or_else(|| env(ENV_DATABASE))
            .or(file.database)
            .unwrap_or_else(|| DEFAULT_DATABASE.to_string());

        let cache_ttl_secs = match args.cache_ttl_secs {
            Some(secs) => secs,
            None => match env(ENV_CACHE_TTL) {
                Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                    setting: ENV_CACHE_TTL,
                    message: format!("'{}' is not a number of seconds", raw),
                })?,
                None => file.cache_ttl_secs.unwrap_or(DEFAULT_CACHE_TTL_SECS),
            },
        };

        let log_profile = match args
            .log_profile
            .or_else(|| env(ENV_LOG))
            .or(file.log_profile)
        {
            Some(raw) => raw
                .parse::<Profile>()
                .map_err(|message| ConfigError::Invalid {
                    setting: "log_profile",
                    message,
                })?,
            None => Profile::Development,
        };

        let storage = args
            .storage
            .or_else(|| env(ENV_STORAGE))
            .or(file.storage)
            .unwrap_or_else(|| "sqlite".to_string());
        let backend = match storage.trim().to_ascii_lowercase().as_str() {
            "sqlite" => StoreBackend::sqlite(&database),
            "memory" => StoreBackend::Memory,
            other => {
                return Err(ConfigError::Invalid {
                    setting: "storage",
                    message: format!("unknown storage backend '{}'", other),
                })
            }
        };

        Ok(Self {
            bind_addr,
            backend,
            cache_ttl: Duration::from_secs(cache_ttl_secs),
            log_profile,
        })
    }
}

/// Database location for the `migrate` subcommand
pub fn migrate_database(database: Option<String>) -> String {
    database
        .or_else(|| std::env::var(ENV_DATABASE).ok())
        .unwrap_or_else(|| DEFAULT_DATABASE.to_string())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::resolve(ServeArgs::default(), env_from(&[])).unwrap();
        assert_eq!(config.bind_addr, DEFAULT_BIND);
        assert_eq!(
            config.backend,
            StoreBackend::SqliteFile(PathBuf::from(DEFAULT_DATABASE))
        );
        assert_eq!(config.cache_ttl, Duration::from_secs(300));
        assert_eq!(config.log_profile, Profile::Development);
    }

    #[test]
    fn test_cli_beats_env() {
        let args = ServeArgs {
            bind: Some("0.0.0.0:9000".to_string()),
            ..ServeArgs::default()
        };
        let env = env_from(&[(ENV_BIND, "127.0.0.1:1"), (ENV_CACHE_TTL, "0")]);
        let config = ServerConfig::resolve(args, env).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:9000");
        assert_eq!(config.cache_ttl, Duration::ZERO);
    }

    #[test]
    fn test_env_beats_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "bind_addr = \"10.0.0.1:80\"\ndatabase = \":memory:\"\ncache_ttl_secs = 60"
        )
        .unwrap();
        let args = ServeArgs {
            config: Some(file.path().to_path_buf()),
            ..ServeArgs::default()
        };
        let env = env_from(&[(ENV_BIND, "10.0.0.2:80"), (ENV_LOG, "production")]);
        let config = ServerConfig::resolve(args, env).unwrap();
        assert_eq!(config.bind_addr, "10.0.0.2:80");
        assert_eq!(config.backend, StoreBackend::SqliteInMemory);
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
        assert_eq!(config.log_profile, Profile::Production);
    }

    #[test]
    fn test_memory_storage() {
        let env = env_from(&[(ENV_STORAGE, "memory")]);
        let config = ServerConfig::resolve(ServeArgs::default(), env).unwrap();
        assert_eq!(config.backend, StoreBackend::Memory);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let env = env_from(&[(ENV_CACHE_TTL, "soon")]);
        assert!(matches!(
            ServerConfig::resolve(ServeArgs::default(), env),
            Err(ConfigError::Invalid { .. })
        ));

        let env = env_from(&[(ENV_STORAGE, "postgres")]);
        assert!(matches!(
            ServerConfig::resolve(ServeArgs::default(), env),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn test_unknown_file_keys_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = 80").unwrap();
        let args = ServeArgs {
            config: Some(file.path().to_path_buf()),
            ..ServeArgs::default()
        };
        assert!(matches!(
            ServerConfig::resolve(args, env_from(&[])),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::parse_from(["phonebook-server", "serve", "--bind", "0.0.0.0:1"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Serve(ServeArgs { bind: Some(_), .. }))
        ));

        let cli = Cli::parse_from(["phonebook-server", "migrate", "-d", "x.db"]);
        assert!(matches!(cli.command, Some(Commands::Migrate { .. })));

        let cli = Cli::parse_from(["phonebook-server"]);
        assert!(cli.command.is_none());
    }
}
