//! HTTP routes: `POST /send-text` and `GET /health`.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::trace::TraceLayer;

use crate::error::RelayError;
use crate::relay::{SendTextRequest, TextRelay};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<TextRelay>,
}

/// Build the Axum router for the relay.
pub fn relay_routes(relay: Arc<TextRelay>) -> Router {
    Router::new()
        .route("/send-text", post(send_text))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { relay })
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = match self {
            RelayError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            RelayError::Resolution(_) | RelayError::Delivery(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (
            status,
            Json(serde_json::json!({
                "success": false,
                "error": self.public_message(),
            })),
        )
            .into_response()
    }
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "mms-relay"
    }))
}

/// POST /send-text
///
/// Body: `{"phone_number": "+15551234567", "message_type": "hvac"}`.
/// Anything that does not decode to that shape is invalid input.
async fn send_text(
    State(state): State<AppState>,
    payload: Result<Json<SendTextRequest>, JsonRejection>,
) -> Result<impl IntoResponse, RelayError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::warn!("Unreadable send-text body: {}", rejection.body_text());
        RelayError::InvalidInput(rejection.body_text())
    })?;

    let delivery = state.relay.send_text(request).await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "gateway": delivery.gateway.address,
    })))
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, header};
    use serde_json::Value;
    use tower::ServiceExt;

    use async_trait::async_trait;

    use super::*;
    use crate::carrier::{CarrierLookup, CarrierMatch, GatewayResolver};
    use crate::error::{DeliveryError, LookupError};
    use crate::mailer::{MailTransport, OutboundText};
    use crate::tables::{CarrierGatewayTable, MessageTemplateTable};

    struct VerizonLookup;

    #[async_trait]
    impl CarrierLookup for VerizonLookup {
        fn name(&self) -> &str {
            "verizon"
        }

        async fn lookup(&self, _phone_number: &str) -> Result<CarrierMatch, LookupError> {
            Ok(CarrierMatch::Name("Verizon Wireless".into()))
        }
    }

    struct NullMailer;

    #[async_trait]
    impl MailTransport for NullMailer {
        async fn send(&self, _message: &OutboundText) -> Result<(), DeliveryError> {
            Ok(())
        }
    }

    fn app() -> Router {
        let resolver = GatewayResolver::new(
            Arc::new(VerizonLookup),
            Arc::new(CarrierGatewayTable::builtin()),
        );
        let relay = TextRelay::new(
            Arc::new(MessageTemplateTable::builtin()),
            resolver,
            Arc::new(NullMailer),
        );
        relay_routes(Arc::new(relay))
    }

    async fn call(request: Request<Body>) -> (StatusCode, Value) {
        let resp = app().oneshot(request).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_json(body: &str) -> Request<Body> {
        Request::post("/send-text")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_ok() {
        let (status, json) = call(Request::get("/health").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn send_text_success_echoes_gateway() {
        let (status, json) =
            call(post_json(r#"{"phone_number": "+15551234567", "message_type": "hvac"}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);
        assert_eq!(json["gateway"], "5551234567@vzwpix.com");
    }

    #[tokio::test]
    async fn malformed_json_is_invalid_input() {
        let (status, json) = call(post_json("{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json, serde_json::json!({"success": false, "error": "Invalid input"}));
    }

    #[tokio::test]
    async fn wrong_field_type_is_invalid_input() {
        let (status, json) =
            call(post_json(r#"{"phone_number": 15551234567, "message_type": "hvac"}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Invalid input");
    }

    #[tokio::test]
    async fn missing_content_type_is_invalid_input() {
        let request = Request::post("/send-text")
            .body(Body::from(r#"{"phone_number": "+15551234567", "message_type": "hvac"}"#))
            .unwrap();
        let (status, json) = call(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Invalid input");
    }
}
