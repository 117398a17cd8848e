use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Error code the REST layer returns when a single-row read matches no rows
pub const NO_ROWS_CODE: &str = "PGRST116";

/// API-specific errors
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Not authorized: {0}")]
    Unauthorized(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// Error bodies of the REST, auth and storage endpoints share no schema;
/// pick whichever fields are present.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    code: Option<String>,
    message: Option<String>,
    msg: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

impl ErrorBody {
    fn text(self) -> Option<String> {
        self.message
            .or(self.error_description)
            .or(self.msg)
            .or(self.error)
    }
}

impl ApiError {
    pub fn from_status(status: StatusCode, message: String) -> Self {
        let msg = if message.is_empty() {
            status.canonical_reason().unwrap_or("Unknown error").to_string()
        } else {
            message
        };

        match status {
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized(msg),
            StatusCode::FORBIDDEN => ApiError::Unauthorized(msg),
            StatusCode::NOT_FOUND => ApiError::NotFound(msg),
            StatusCode::BAD_REQUEST => ApiError::BadRequest(msg),
            status if status.is_server_error() => ApiError::ServerError(msg),
            status if status.is_client_error() => ApiError::BadRequest(msg),
            _ => ApiError::Unknown(msg),
        }
    }

    /// Classify a failed response, honouring the backend's JSON error code
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();

        if parsed.code.as_deref() == Some(NO_ROWS_CODE) {
            let msg = parsed.text().unwrap_or_else(|| "No rows returned".to_string());
            return ApiError::NotFound(msg);
        }

        let msg = parsed.text().unwrap_or_else(|| body.trim().to_string());
        Self::from_status(status, msg)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }
}

/// True if the error chain carries an `ApiError::NotFound`
pub fn is_not_found(err: &anyhow::Error) -> bool {
    err.downcast_ref::<ApiError>()
        .map(ApiError::is_not_found)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_rows_code_is_not_found() {
        let body = r#"{"code":"PGRST116","details":"The result contains 0 rows","hint":null,"message":"JSON object requested, multiple (or no) rows returned"}"#;
        let err = ApiError::from_response(StatusCode::NOT_ACCEPTABLE, body);
        assert!(err.is_not_found());
    }

    #[test]
    fn test_auth_error_description_is_used() {
        let body = r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#;
        let err = ApiError::from_response(StatusCode::BAD_REQUEST, body);
        match err {
            ApiError::BadRequest(msg) => assert_eq!(msg, "Invalid login credentials"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_plain_text_body() {
        let err = ApiError::from_response(StatusCode::INTERNAL_SERVER_ERROR, "");
        match err {
            ApiError::ServerError(msg) => assert_eq!(msg, "Internal Server Error"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_is_not_found_through_anyhow() {
        let err: anyhow::Error = ApiError::NotFound("x".into()).into();
        assert!(is_not_found(&err));
        let err = anyhow::anyhow!("other");
        assert!(!is_not_found(&err));
    }
}
