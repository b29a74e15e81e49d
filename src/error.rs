#[derive(Debug, Display, From)]
pub enum Error {
    #[display(fmt = "database error: {}", _0)]
    Database(sqlx::Error),

    #[display(fmt = "configuration error: {}", _0)]
    Config(config::ConfigError),

    #[display(fmt = "{}", _0)]
    #[from(ignore)]
    Environment(String),

    #[display(fmt = "database file not found: {}", _0)]
    #[from(ignore)]
    MissingDatabase(String),

    #[display(fmt = "dataset has no `{}` table", _0)]
    #[from(ignore)]
    MissingTable(&'static str),

    #[display(fmt = "dataset contains no measurements")]
    #[from(ignore)]
    EmptyDataset,

    #[display(fmt = "stored date is not YYYY-MM-DD: {}", _0)]
    #[from(ignore)]
    InvalidDate(String),
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Database(error) => Some(error),
            Error::Config(error) => Some(error),
            _ => None,
        }
    }
}
