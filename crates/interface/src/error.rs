use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("other error: {0}")]
    Other(String),
}
