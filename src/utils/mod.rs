//! Helpers shared by the domain modules.

use ezbook_db::{RecordId, StoreError};
use ezbook_http::error::AppError;

/// Parse a path identifier, rejecting malformed ids with 400.
pub fn parse_id(raw: &str) -> Result<RecordId, AppError> {
    RecordId::parse(raw).map_err(store_failure)
}

/// Map a store failure onto the HTTP error taxonomy.
pub fn store_failure(err: StoreError) -> AppError {
    match err {
        StoreError::InvalidId(id) => AppError::bad_request(format!("invalid id '{id}'")),
        other => AppError::Internal(other.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn malformed_ids_are_bad_requests() {
        let err = parse_id("not-an-id").unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn other_store_failures_are_internal() {
        let err = store_failure(StoreError::Corrupt("postTime".into()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
