use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const NOT_FOUND: &str = "Not found";

/// Response envelope shared by every API route. The HTTP status mirrors `code`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiResult<T> {
    pub result: T,
    pub code: u16,
}

impl<T> ApiResult<T> {
    pub fn ok(result: T) -> Self {
        Self { result, code: 200 }
    }
}

impl ApiResult<String> {
    pub fn not_found() -> Self {
        Self { result: NOT_FOUND.to_string(), code: 404 }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("Not found")]
    NotFound,
    /// Malformed request value; reported to clients as not-found.
    #[error("{0}")]
    InvalidInput(String),
}

impl ApiError {
    pub fn code(&self) -> u16 {
        404
    }

    pub fn into_result(self) -> ApiResult<String> {
        ApiResult { code: self.code(), result: self.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_shape() {
        let v = serde_json::to_value(ApiResult::ok("started")).unwrap();
        assert_eq!(v, serde_json::json!({"result": "started", "code": 200}));

        let v = serde_json::to_value(ApiResult::not_found()).unwrap();
        assert_eq!(v, serde_json::json!({"result": "Not found", "code": 404}));
    }

    #[test]
    fn errors_become_404_envelopes() {
        assert_eq!(ApiError::NotFound.into_result(), ApiResult::not_found());
        let r = ApiError::InvalidInput("bad id".into()).into_result();
        assert_eq!(r.code, 404);
        assert_eq!(r.result, "bad id");
    }
}
