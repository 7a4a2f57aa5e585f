use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Value};

/// Success envelope: `{ "success": true, "message"?, "count"?, "data"? }`.
/// Errors go through `ApiError` instead.
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    data: Option<T>,
    message: Option<String>,
    count: Option<usize>,
    status_code: StatusCode,
}

pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;

impl<T: Serialize> ApiResponse<T> {
    /// 200 OK with a data payload
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            message: None,
            count: None,
            status_code: StatusCode::OK,
        }
    }

    /// 201 Created with a data payload
    pub fn created(data: T) -> Self {
        Self {
            status_code: StatusCode::CREATED,
            ..Self::success(data)
        }
    }

    pub fn with_status(data: T, status_code: StatusCode) -> Self {
        Self {
            status_code,
            ..Self::success(data)
        }
    }

    /// Attach a human-readable message to the envelope
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl<T: Serialize> ApiResponse<Vec<T>> {
    /// 200 OK for listings; the envelope carries the item count
    pub fn list(items: Vec<T>) -> Self {
        Self {
            count: Some(items.len()),
            ..Self::success(items)
        }
    }
}

impl ApiResponse<()> {
    /// 200 OK with a message and no data payload
    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            data: None,
            message: Some(message.into()),
            count: None,
            status_code: StatusCode::OK,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let mut envelope = json!({ "success": true });

        if let Some(message) = self.message {
            envelope["message"] = Value::String(message);
        }
        if let Some(count) = self.count {
            envelope["count"] = Value::from(count);
        }
        if let Some(data) = self.data {
            match serde_json::to_value(&data) {
                Ok(value) => envelope["data"] = value,
                Err(e) => {
                    tracing::error!("Failed to serialize response data: {}", e);
                    return (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({
                            "success": false,
                            "message": "Failed to serialize response data",
                            "code": "INTERNAL_SERVER_ERROR",
                        })),
                    )
                        .into_response();
                }
            }
        }

        (self.status_code, Json(envelope)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_envelope_counts_items() {
        let response = ApiResponse::list(vec![1, 2, 3]);
        assert_eq!(response.count, Some(3));
        assert_eq!(response.status_code, StatusCode::OK);
    }

    #[test]
    fn created_sets_201() {
        let response = ApiResponse::created(json!({ "id": 1 }));
        assert_eq!(response.status_code, StatusCode::CREATED);
    }

    #[test]
    fn message_only_has_no_data() {
        let response = ApiResponse::message_only("Store deleted successfully");
        assert!(response.data.is_none());
        assert_eq!(response.message.as_deref(), Some("Store deleted successfully"));
    }
}
