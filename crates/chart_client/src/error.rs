use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("invalid server url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("chart data request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("chart data response is missing labels")]
    MissingLabels,
    #[error("chart backend failed: {0}")]
    Backend(String),
}
