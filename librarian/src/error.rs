use thiserror::Error;
use warp::{http::StatusCode, reject::Reject, Rejection, Reply};

#[derive(Error, Debug)]
pub enum LibrarianError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Retrieval unavailable: {0}")]
    RetrievalUnavailable(String),

    #[error("Retrieval timed out")]
    RetrievalTimeout,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LibrarianError>;

impl LibrarianError {
    /// Classify a transport error raised on the retrieval path.
    pub fn from_retrieval(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LibrarianError::RetrievalTimeout
        } else {
            LibrarianError::RetrievalUnavailable(err.to_string())
        }
    }

    /// True for failures that mean "could not search at all".
    pub fn is_retrieval_failure(&self) -> bool {
        matches!(
            self,
            LibrarianError::RetrievalUnavailable(_) | LibrarianError::RetrievalTimeout
        )
    }
}

impl From<::config::ConfigError> for LibrarianError {
    fn from(err: ::config::ConfigError) -> Self {
        LibrarianError::Configuration(err.to_string())
    }
}

impl Reject for LibrarianError {}

pub async fn handle_rejection(err: Rejection) -> std::result::Result<impl Reply, Rejection> {
    if let Some(api_err) = err.find::<LibrarianError>() {
        let (code, message) = match api_err {
            LibrarianError::BadRequest(_) => (StatusCode::BAD_REQUEST, "Bad request"),
            LibrarianError::RetrievalUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "Search is unavailable")
            }
            LibrarianError::RetrievalTimeout => (StatusCode::GATEWAY_TIMEOUT, "Search timed out"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
        };

        let json = warp::reply::json(&serde_json::json!({
            "error": message,
            "details": api_err.to_string(),
        }));

        Ok(warp::reply::with_status(json, code))
    } else {
        Err(err)
    }
}
