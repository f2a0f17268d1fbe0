use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AeroError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
    #[error("invalid payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("api returned {status}: {body}")]
    Api { status: StatusCode, body: String },
    #[error("{entity}.{attribute} is read-only")]
    ReadOnly {
        entity: &'static str,
        attribute: String,
    },
    #[error("{entity} has no attribute named {attribute}")]
    UnknownAttribute {
        entity: &'static str,
        attribute: String,
    },
    /// The wire value is not a known state, or is absent (`None`).
    #[error("unknown content state {0:?}")]
    UnknownContentState(Option<String>),
    #[error("payload is missing field {0}")]
    MissingField(&'static str),
    #[error("response is missing the {0} header")]
    MissingHeader(&'static str),
    #[error("response header {0} is not valid text")]
    InvalidHeader(&'static str),
    #[error("{entity} has no id yet")]
    MissingId { entity: &'static str },
    #[error("{entity} {expected} cannot be repopulated from {found}")]
    IdentityMismatch {
        entity: &'static str,
        expected: String,
        found: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorClass {
    Auth,
    NotFound,
    PreconditionFailed,
    RateLimit,
    Transient,
    Permanent,
}

impl AeroError {
    pub fn classification(&self) -> Option<ApiErrorClass> {
        match self {
            AeroError::Api { status, .. } => Some(classify_api_status(*status)),
            _ => None,
        }
    }

    /// The server rejected a conditional write because the cached tag is stale.
    pub fn is_precondition_failed(&self) -> bool {
        self.classification() == Some(ApiErrorClass::PreconditionFailed)
    }
}

fn classify_api_status(status: StatusCode) -> ApiErrorClass {
    if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
        ApiErrorClass::Auth
    } else if status == StatusCode::NOT_FOUND {
        ApiErrorClass::NotFound
    } else if status == StatusCode::PRECONDITION_FAILED {
        ApiErrorClass::PreconditionFailed
    } else if status == StatusCode::TOO_MANY_REQUESTS {
        ApiErrorClass::RateLimit
    } else if status.is_server_error() || status == StatusCode::REQUEST_TIMEOUT {
        ApiErrorClass::Transient
    } else {
        ApiErrorClass::Permanent
    }
}
