use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("browser: {0}")]
    Browser(String),

    /// The browser process is gone; nothing more can be done in this scrape.
    #[error("browser session lost")]
    SessionLost,

    #[error("http: {0}")]
    Http(#[from] reqwest::Error),

    #[error("http status {status} for {url}")]
    Status { status: u16, url: String },

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid selector `{0}`")]
    Selector(String),

    #[error("malformed literal: {0}")]
    Literal(String),

    #[error("no table found")]
    NoTable,
}

impl Error {
    pub fn browser(err: impl std::fmt::Display) -> Self {
        Error::Browser(err.to_string())
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::SessionLost)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
