use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

pub type AppResult<T> = Result<T, Error>;

/// everything the proxy can answer with instead of an upstream response
///
/// bodies are plain text on purpose, the caller is a video player or a curl session and
/// neither wants json here
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{0}")]
    BadRequest(String),

    // the fixed hop cap was hit, see UpstreamService::fetch_follow
    #[error("redirect loop")]
    RedirectLoop,

    #[error("proxy error: {0}")]
    BadGateway(String),

    #[error("{0}")]
    InternalServerErrorWithContext(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        // reqwest hides the useful part (dns, refused, tls) in the source chain
        let mut message = err.to_string();
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = std::error::Error::source(cause);
        }
        Error::BadGateway(message)
    }
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::RedirectLoop => StatusCode::LOOP_DETECTED,
            Error::BadGateway(_) => StatusCode::BAD_GATEWAY,
            Error::InternalServerErrorWithContext(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            Error::RedirectLoop => (
                status,
                [(header::CACHE_CONTROL, "no-store")],
                self.to_string(),
            )
                .into_response(),
            _ => (status, self.to_string()).into_response(),
        }
    }
}
