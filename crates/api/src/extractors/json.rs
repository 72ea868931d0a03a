//! JSON body extractor with API-shaped rejections.

use axum::extract::FromRequest;

use crate::error::ApiError;

/// Like [`axum::Json`], but malformed or mistyped bodies are rejected with
/// the standard `{error, code}` body and status 400.
#[derive(Debug, Clone, Copy, Default, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, http::StatusCode, response::IntoResponse};
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Payload {
        id: u32,
    }

    fn json_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_valid_body() {
        let AppJson(payload) = AppJson::<Payload>::from_request(json_request(r#"{"id": 7}"#), &())
            .await
            .unwrap();
        assert_eq!(payload.id, 7);
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let err = AppJson::<Payload>::from_request(json_request("{not json"), &())
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_wrong_type_is_bad_request() {
        let err = AppJson::<Payload>::from_request(json_request(r#"{"id": "seven"}"#), &())
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
