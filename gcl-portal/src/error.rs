use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use std::fmt::{Display, Formatter};

/// Errors that the portal can reply with.
///
/// These can be turned into an [`HttpResponse`].
#[derive(Debug)]
pub enum Error {
    Core(gcl_core::Error),
    Prometheus(prometheus::Error),
    Unauthenticated,
    NoCredentials,
    Tool(String),
    Unexpected,
}

/// Errors that can occur during setup/running of the portal.
pub enum PortalError {
    /// Error during setup, e.g., missing configuration.
    Setup(String),

    /// IO error.
    StdIO(std::io::Error),

    /// Credential store error outside of a request.
    Core(gcl_core::Error),
}

impl From<std::io::Error> for PortalError {
    fn from(e: std::io::Error) -> Self {
        PortalError::StdIO(e)
    }
}

impl From<gcl_core::Error> for PortalError {
    fn from(e: gcl_core::Error) -> Self {
        PortalError::Core(e)
    }
}

impl std::fmt::Debug for PortalError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PortalError::Setup(s) => write!(f, "error during portal setup: {s}"),
            PortalError::StdIO(e) => write!(f, "IO error: {e}"),
            PortalError::Core(e) => write!(f, "{e}"),
        }
    }
}

impl From<gcl_core::Error> for Error {
    fn from(e: gcl_core::Error) -> Self {
        Error::Core(e)
    }
}

/// Show the error as an HTTP response for Actix-web.
impl ResponseError for Error {
    fn error_response(&self) -> HttpResponse {
        let body = json!({
            "error": true,
            "message": format!("{}", self),
        });

        HttpResponse::build(self.status_code()).json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Error::Core(gcl_core::Error::InvalidUsername(_)) => StatusCode::FORBIDDEN,
            Error::Core(_) | Error::Prometheus(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Unauthenticated => StatusCode::INTERNAL_SERVER_ERROR,
            Error::NoCredentials => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Tool(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Unexpected => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            // Do not leak filesystem paths to the browser.
            Error::Core(gcl_core::Error::InvalidUsername(_)) => write!(f, "invalid username"),
            Error::Core(gcl_core::Error::Session(_)) => write!(f, "session error"),
            Error::Core(_) => write!(f, "credential store error"),
            Error::Prometheus(e) => write!(f, "prometheus error: {e}"),
            Error::Unauthenticated => write!(f, "no authenticated user"),
            Error::NoCredentials => write!(f, "no validated credentials"),
            Error::Tool(_) => write!(f, "could not inspect credential"),
            Error::Unexpected => write!(f, "unexpected"),
        }
    }
}
