use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered with HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("media error: {0}")]
    Media(String),
    #[error("no track at index {0}")]
    NoTrack(usize),
}

pub type Result<T> = std::result::Result<T, PlayerError>;
