use axum::{response::IntoResponse, Json};
use serde::Serialize;
use utoipa::ToSchema;

/// The `{"message": ...}` body every mutating route answers with.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl IntoResponse for MessageResponse {
    fn into_response(self) -> axum::response::Response {
        Json(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_message_field() {
        let body = serde_json::to_value(MessageResponse::new("Status updated")).unwrap();
        assert_eq!(body, serde_json::json!({ "message": "Status updated" }));
    }
}
