//! [`Config`]-related definitions.

use std::time::Duration;

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use service::infra::postgres;
use smart_default::SmartDefault;
use tracing_subscriber::filter::LevelFilter;

/// Prefix of the environment variables overriding the [`Config`] file.
pub const ENV_PREFIX: &str = "CONF";

/// Moodify server configuration.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration.
    pub server: Server,

    /// Identity provider configuration.
    pub service: Service,

    /// Postgres storage configuration.
    pub postgres: Postgres,

    /// Logging configuration.
    pub log: Log,
}

impl Config {
    /// Loads the [`Config`] from the file at the provided `path`.
    ///
    /// The file is optional. Its values are overridden by the
    /// [`ENV_PREFIX`]ed environment variables (`CONF.server.port=80`), and
    /// anything left unset falls back to its default.
    ///
    /// # Errors
    ///
    /// If the file or the environment variables hold malformed values.
    pub fn load(path: impl AsRef<str>) -> Result<Self, ConfigError> {
        config::Config::builder()
            .add_source(File::with_name(path.as_ref()).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("."))
            .build()?
            .try_deserialize()
    }
}

/// HTTP server configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Server {
    /// Host to listen on.
    #[default("0.0.0.0".to_owned())]
    pub host: String,

    /// Port to listen on.
    #[default(8080)]
    pub port: u16,

    /// [CORS] policy of the API.
    ///
    /// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
    pub cors: Cors,
}

/// [CORS] policy.
///
/// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Cors {
    /// Origins allowed to call the API, `*` allows any.
    #[default(vec!["*".to_owned()])]
    pub origins: Vec<String>,
}

/// Identity provider configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Service {
    /// Secret signing the session tokens.
    #[default("secret".to_owned())]
    pub jwt_secret: String,

    /// Lifetime of a session.
    #[default(Duration::from_secs(30 * 60))]
    #[serde(with = "humantime_serde")]
    pub session_ttl: Duration,
}

impl From<Service> for service::Config {
    fn from(conf: Service) -> Self {
        Self::with_secret(conf.jwt_secret.as_bytes(), conf.session_ttl)
    }
}

/// Postgres storage configuration.
///
/// Ignored when the server runs with the in-memory storage.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Postgres {
    /// Host of the database server.
    #[default("127.0.0.1".to_owned())]
    pub host: String,

    /// Port of the database server.
    #[default(5432)]
    pub port: u16,

    /// Role to connect as.
    #[default("postgres".to_owned())]
    pub user: String,

    /// Password of the [`Postgres::user`].
    #[default("postgres".to_owned())]
    pub password: String,

    /// Name of the database holding the Moodify schema.
    #[default("postgres".to_owned())]
    pub dbname: String,

    /// Maximum number of pooled connections.
    #[default(16)]
    pub max_connections: usize,
}

impl From<Postgres> for postgres::Config {
    fn from(conf: Postgres) -> Self {
        let mut pg = Self::new();
        pg.host = Some(conf.host);
        pg.port = Some(conf.port);
        pg.user = Some(conf.user);
        pg.password = Some(conf.password);
        pg.dbname = Some(conf.dbname);
        pg.pool = Some(postgres::PoolConfig::new(conf.max_connections));
        pg
    }
}

/// Logging configuration.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Log {
    /// Maximum level of the emitted logs.
    pub level: LogLevel,
}

/// Level of the emitted logs.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    /// Nothing is logged.
    Off,

    /// Only errors are logged.
    Error,

    /// Errors and warnings are logged.
    Warn,

    /// Regular server lifecycle is logged as well.
    #[default]
    Info,

    /// Details of every operation are logged as well.
    Debug,

    /// Everything is logged.
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => Self::OFF,
            LogLevel::Error => Self::ERROR,
            LogLevel::Warn => Self::WARN,
            LogLevel::Info => Self::INFO,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Trace => Self::TRACE,
        }
    }
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use service::infra::postgres;
    use tracing_subscriber::filter::LevelFilter;

    use super::{Config, LogLevel};

    #[test]
    fn defaults_to_half_hour_sessions() {
        let conf = Config::default();

        assert_eq!(conf.service.session_ttl, Duration::from_secs(1800));
        assert_eq!(conf.server.port, 8080);
        assert_eq!(conf.server.cors.origins, ["*"]);
        assert_eq!(conf.log.level, LogLevel::Info);

        let service: service::Config = conf.service.into();
        assert_eq!(service.session_ttl, Duration::from_secs(1800));
    }

    #[test]
    fn reads_missing_file_as_defaults() {
        let conf = Config::load("definitely-missing-moodify-config")
            .expect("missing file is optional");

        assert_eq!(conf.postgres.port, 5432);
        assert_eq!(conf.service.jwt_secret, "secret");
    }

    #[test]
    fn sizes_postgres_pool() {
        let mut conf = Config::default().postgres;
        conf.max_connections = 4;

        let pg = postgres::Config::from(conf);

        assert_eq!(pg.dbname.as_deref(), Some("postgres"));
        assert_eq!(pg.pool.map(|p| p.max_size), Some(4));
    }

    #[test]
    fn maps_log_levels() {
        assert_eq!(LevelFilter::from(LogLevel::Off), LevelFilter::OFF);
        assert_eq!(LevelFilter::from(LogLevel::Warn), LevelFilter::WARN);
        assert_eq!(LevelFilter::from(LogLevel::default()), LevelFilter::INFO);
    }
}
