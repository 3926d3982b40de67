//! Extractors whose rejections render as [`AppError`] bodies.

use axum::extract::{rejection::JsonRejection, FromRequest};

use crate::error::AppError;

/// `axum::Json` with rejections mapped onto the standard error body.
///
/// Bodies that parse but do not match the target type (missing or unknown
/// fields, wrong types) are validation errors; anything else is a bad request.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(e) => AppError::validation(Vec::new(), e.body_text()),
            other => AppError::bad_request(other.body_text()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Router};
    use axum_test::TestServer;
    use serde::Deserialize;

    #[derive(Deserialize)]
    #[serde(deny_unknown_fields)]
    struct Payload {
        name: String,
    }

    fn server() -> TestServer {
        let app = Router::new().route(
            "/echo",
            post(|AppJson(payload): AppJson<Payload>| async move { payload.name }),
        );
        TestServer::new(app).unwrap()
    }

    #[tokio::test]
    async fn accepts_matching_body() {
        server()
            .post("/echo")
            .json(&serde_json::json!({"name": "suite"}))
            .await
            .assert_text("suite");
    }

    #[tokio::test]
    async fn unknown_fields_are_validation_errors() {
        let response = server()
            .post("/echo")
            .json(&serde_json::json!({"name": "suite", "extra": true}))
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body: serde_json::Value = response.json();
        assert_eq!(body["code"], "validation_error");
    }

    #[tokio::test]
    async fn malformed_json_is_a_bad_request() {
        server()
            .post("/echo")
            .content_type("application/json")
            .bytes("{not json".into())
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
