//! Route guard: a request reaches the handler only with a valid session.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use ezbook_http::error::AppError;

use crate::SessionAuth;

/// Reject the request with 401 unless its session cookie verifies; otherwise
/// insert the token's [`Identity`](crate::Identity) into the request extensions.
pub async fn require_session(
    State(auth): State<SessionAuth>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = auth.cookie().read(request.headers()).ok_or_else(|| {
        tracing::debug!(path = %request.uri().path(), "session cookie missing");
        AppError::unauthorized()
    })?;

    let identity = auth.tokens().verify(&token).map_err(|e| {
        tracing::debug!(path = %request.uri().path(), error = %e, "session rejected");
        AppError::unauthorized()
    })?;

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}
