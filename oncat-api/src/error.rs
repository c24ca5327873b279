use serde::{Deserialize, Serialize};
use tower_api_client::{Error as ApiError, StatusCode};

#[derive(Debug)]
pub enum OncatApiError {
    Oncat(StatusCode, String),
    Internal(ApiError),
}

impl OncatApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            OncatApiError::Oncat(status, _) => Some(*status),
            OncatApiError::Internal(_) => None,
        }
    }

    /// The server rejected the bearer token
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }
}

impl From<ApiError> for OncatApiError {
    fn from(value: ApiError) -> Self {
        match value {
            ApiError::ClientError(status, detail) | ApiError::ServerError(status, detail) => {
                // ONCat answers errors with {"error": "..."}, fall back to the raw body
                let message = serde_json::from_str::<ErrorResponse>(&detail)
                    .map(|response| response.error)
                    .unwrap_or(detail);
                OncatApiError::Oncat(status, message)
            }
            e => OncatApiError::Internal(e),
        }
    }
}

impl std::fmt::Display for OncatApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OncatApiError::Internal(e) => write!(f, "Internal error: {}", e),
            OncatApiError::Oncat(status, message) => write!(f, "({}) {}", status, message),
        }
    }
}

impl std::error::Error for OncatApiError {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
