#[derive(Debug, thiserror::Error)]
pub enum HastaneError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("missing environment variable: {0}")]
    MissingEnv(&'static str),
    #[error("invalid port {value:?}: {source}")]
    InvalidPort {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("invalid pool size {value:?}: {source}")]
    InvalidPoolSize {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("unknown route: {0}")]
    UnknownRoute(String),
    #[error("invalid database url: {0}")]
    DatabaseUrl(sqlx::Error),
    #[error("failed to connect to database: {0}")]
    DatabaseConnect(sqlx::Error),
}

pub type HastaneResult<T> = std::result::Result<T, HastaneError>;
