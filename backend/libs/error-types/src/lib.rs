use serde::{Deserialize, Serialize};

pub const STATUS_SUCCESS: &str = "SUCCESS";
pub const STATUS_FAIL: &str = "FAIL";

/// 统一的 API 响应格式（所有服务使用）
///
/// Success:
/// ```json
/// { "status": "SUCCESS", "message": "요청 성공", "data": "<token>" }
/// ```
///
/// Failure (`data` is always `null`):
/// ```json
/// { "status": "FAIL", "message": "Invalid credentials", "data": null }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: String,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: STATUS_SUCCESS.to_string(),
            message: "요청 성공".to_string(),
            data: Some(data),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }
}

impl ApiResponse<()> {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: STATUS_FAIL.to_string(),
            message: message.into(),
            data: None,
        }
    }
}
