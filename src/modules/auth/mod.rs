use async_trait::async_trait;
use axum::{
    extract::State,
    http::header,
    response::{AppendHeaders, IntoResponse},
    routing::post,
    Json, Router,
};
use ezbook_authz::{Identity, SessionAuth};
use ezbook_http::{error::AppError, extract::AppJson};
use ezbook_kernel::{InitCtx, Module};
use serde::Serialize;

/// Session login and logout
///
/// `POST /jwt` trusts the identity it is given; authenticating the user is the
/// client's job before it asks for a session.
pub struct AuthModule {
    auth: SessionAuth,
}

impl AuthModule {
    pub fn new(auth: SessionAuth) -> Self {
        Self { auth }
    }
}

#[derive(Debug, Serialize)]
pub struct Success {
    pub success: bool,
}

#[async_trait]
impl Module for AuthModule {
    fn name(&self) -> &'static str {
        "auth"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            production_cookies = ctx.settings.environment.is_production(),
            token_ttl_secs = self.auth.tokens().ttl_secs(),
            "auth module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/jwt", post(issue_session))
            .route("/logout", post(revoke_session))
            .with_state(self.auth.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(serde_json::json!({
            "paths": {
                "/jwt": {
                    "post": {
                        "summary": "Start a session",
                        "description": "Sets an http-only `token` cookie valid for one hour.",
                        "tags": ["Auth"],
                        "requestBody": { "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Identity" } } } },
                        "responses": { "200": { "description": "Cookie set" } }
                    }
                },
                "/logout": {
                    "post": {
                        "summary": "End a session",
                        "description": "Clears the cookie. The token itself stays valid until it expires.",
                        "tags": ["Auth"],
                        "responses": { "200": { "description": "Cookie cleared" } }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Identity": {
                        "type": "object",
                        "properties": { "email": { "type": "string" } },
                        "required": ["email"]
                    }
                }
            }
        }))
    }
}

async fn issue_session(
    State(auth): State<SessionAuth>,
    AppJson(identity): AppJson<Identity>,
) -> Result<impl IntoResponse, AppError> {
    let token = auth
        .tokens()
        .issue(&identity)
        .map_err(|e| AppError::Internal(e.into()))?;

    tracing::info!(email = %identity.email, "session issued");
    Ok((
        AppendHeaders([(header::SET_COOKIE, auth.cookie().issue(&token))]),
        Json(Success { success: true }),
    ))
}

async fn revoke_session(State(auth): State<SessionAuth>) -> impl IntoResponse {
    tracing::info!("session cookie cleared");
    (
        AppendHeaders([(header::SET_COOKIE, auth.cookie().clear())]),
        Json(Success { success: true }),
    )
}

/// Create a new instance of the auth module
pub fn create_module(auth: SessionAuth) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(AuthModule::new(auth))
}
