pub mod models;
pub mod repository;

use async_trait::async_trait;
use axum::{
    extract::{Path, Query, State},
    handler::Handler,
    middleware::from_fn_with_state,
    routing::{post, put},
    Extension, Json, Router,
};
use ezbook_authz::{require_session, Identity, SessionAuth};
use ezbook_db::{DeleteResult, InsertResult, UpdateResult};
use ezbook_http::{error::AppError, extract::AppJson};
use ezbook_kernel::{InitCtx, Module};

use crate::utils::{parse_id, store_failure};
use models::{Booking, BookingDateUpdate, BookingsQuery, NewBooking};
use repository::DynBookingRepository;

/// Bookings module
///
/// Listing requires a session and only ever returns the caller's own
/// bookings. Create, reschedule and cancel are open to any caller that knows
/// the booking id.
pub struct BookingsModule {
    bookings: DynBookingRepository,
    auth: SessionAuth,
}

impl BookingsModule {
    pub fn new(bookings: DynBookingRepository, auth: SessionAuth) -> Self {
        Self { bookings, auth }
    }
}

#[async_trait]
impl Module for BookingsModule {
    fn name(&self) -> &'static str {
        "bookings"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "bookings module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        let gated_list = list_bookings.layer(from_fn_with_state(self.auth.clone(), require_session));

        Router::new()
            .route("/bookings", post(create_booking).get(gated_list))
            .route("/bookings/{id}", put(update_booking_date).delete(delete_booking))
            .with_state(self.bookings.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(serde_json::json!({
            "paths": {
                "/bookings": {
                    "post": {
                        "summary": "Create a booking",
                        "tags": ["Bookings"],
                        "requestBody": { "content": { "application/json": { "schema": { "$ref": "#/components/schemas/NewBooking" } } } },
                        "responses": {
                            "200": { "description": "Insert acknowledgement" },
                            "422": { "description": "Body does not match NewBooking" }
                        }
                    },
                    "get": {
                        "summary": "List the caller's bookings",
                        "tags": ["Bookings"],
                        "security": [{ "sessionCookie": [] }],
                        "responses": {
                            "200": {
                                "description": "Bookings owned by the session identity",
                                "content": { "application/json": { "schema": {
                                    "type": "array",
                                    "items": { "$ref": "#/components/schemas/Booking" }
                                } } }
                            },
                            "401": { "description": "Missing, invalid or expired session" }
                        }
                    }
                },
                "/bookings/{id}": {
                    "put": {
                        "summary": "Change the booked date",
                        "tags": ["Bookings"],
                        "responses": { "200": { "description": "Update acknowledgement" } }
                    },
                    "delete": {
                        "summary": "Cancel a booking",
                        "tags": ["Bookings"],
                        "responses": { "200": { "description": "Delete acknowledgement" } }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Booking": {
                        "type": "object",
                        "properties": {
                            "_id": { "type": "string" },
                            "userMail": { "type": "string" },
                            "room": { "type": "string" },
                            "formattedDate": { "type": "string" },
                            "price_per_night": { "type": "number" },
                            "room_name": { "type": "string" }
                        },
                        "required": ["_id", "userMail", "room", "formattedDate"]
                    },
                    "NewBooking": {
                        "type": "object",
                        "properties": {
                            "userMail": { "type": "string" },
                            "room": { "type": "string" },
                            "formattedDate": { "type": "string" },
                            "price_per_night": { "type": "number" },
                            "room_name": { "type": "string" }
                        },
                        "required": ["userMail", "room", "formattedDate"]
                    }
                }
            }
        }))
    }
}

async fn create_booking(
    State(bookings): State<DynBookingRepository>,
    AppJson(booking): AppJson<NewBooking>,
) -> Result<Json<InsertResult>, AppError> {
    let user_mail = booking.user_mail.clone();
    let result = bookings.create(booking).await.map_err(store_failure)?;
    tracing::info!(booking_id = %result.inserted_id, %user_mail, "booking created");
    Ok(Json(result))
}

async fn list_bookings(
    State(bookings): State<DynBookingRepository>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<BookingsQuery>,
) -> Result<Json<Vec<Booking>>, AppError> {
    if let Some(requested) = query.email.as_deref() {
        if requested != identity.email {
            tracing::debug!(%requested, "ignoring email filter that differs from the session identity");
        }
    }

    let bookings = bookings
        .list(Some(&identity.email))
        .await
        .map_err(store_failure)?;
    Ok(Json(bookings))
}

async fn update_booking_date(
    State(bookings): State<DynBookingRepository>,
    Path(id): Path<String>,
    AppJson(update): AppJson<BookingDateUpdate>,
) -> Result<Json<UpdateResult>, AppError> {
    let id = parse_id(&id)?;
    let result = bookings
        .update_date(&id, &update.formatted_date)
        .await
        .map_err(store_failure)?;
    tracing::info!(
        booking_id = %id,
        modified = result.modified_count,
        "booking date updated"
    );
    Ok(Json(result))
}

async fn delete_booking(
    State(bookings): State<DynBookingRepository>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResult>, AppError> {
    let id = parse_id(&id)?;
    let result = bookings.delete(&id).await.map_err(store_failure)?;
    tracing::info!(booking_id = %id, deleted = result.deleted_count, "booking deleted");
    Ok(Json(result))
}

/// Create a new instance of the bookings module
pub fn create_module(bookings: DynBookingRepository, auth: SessionAuth) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(BookingsModule::new(bookings, auth))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, HeaderValue, StatusCode};
    use axum_test::TestServer;
    use ezbook_authz::{SessionCookie, TokenService};
    use repository::MemoryBookingRepository;
    use serde_json::json;
    use std::sync::Arc;

    fn setup() -> (TestServer, SessionAuth) {
        let auth = SessionAuth::new(
            TokenService::new("bookings-secret", 3600),
            SessionCookie::new("token", false),
        );
        let module = BookingsModule::new(Arc::new(MemoryBookingRepository::new()), auth.clone());
        (TestServer::new(module.routes()).unwrap(), auth)
    }

    fn session_for(auth: &SessionAuth, email: &str) -> HeaderValue {
        let token = auth
            .tokens()
            .issue(&Identity {
                email: email.to_string(),
            })
            .unwrap();
        HeaderValue::from_str(&format!("token={token}")).unwrap()
    }

    async fn create(server: &TestServer, mail: &str, date: &str) -> InsertResult {
        let response = server
            .post("/bookings")
            .json(&json!({"userMail": mail, "room": "r1", "formattedDate": date}))
            .await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["acknowledged"], true);
        InsertResult::new(body["insertedId"].as_str().unwrap())
    }

    #[tokio::test]
    async fn listing_requires_a_session() {
        let (server, _) = setup();
        server
            .get("/bookings")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
        server
            .get("/bookings")
            .add_header(header::COOKIE, HeaderValue::from_static("token=garbage"))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn listing_is_scoped_to_the_session_identity() {
        let (server, auth) = setup();
        create(&server, "a@x.com", "2024-01-01").await;
        create(&server, "b@x.com", "2024-01-02").await;

        let bookings: Vec<Booking> = server
            .get("/bookings")
            .add_query_param("email", "b@x.com")
            .add_header(header::COOKIE, session_for(&auth, "a@x.com"))
            .await
            .json();

        assert_eq!(bookings.len(), 1);
        assert_eq!(bookings[0].user_mail, "a@x.com");
        assert_eq!(bookings[0].formatted_date, "2024-01-01");
    }

    #[tokio::test]
    async fn reschedule_and_cancel() {
        let (server, auth) = setup();
        let inserted = create(&server, "a@x.com", "2024-01-01").await;
        let path = format!("/bookings/{}", inserted.inserted_id);

        let response = server
            .put(&path)
            .json(&json!({"updatedFormattedUDate": "2024-05-05"}))
            .await;
        response.assert_status_ok();
        response.assert_json(&json!({
            "acknowledged": true,
            "matchedCount": 1,
            "modifiedCount": 1,
            "upsertedId": null
        }));

        let bookings: Vec<Booking> = server
            .get("/bookings")
            .add_header(header::COOKIE, session_for(&auth, "a@x.com"))
            .await
            .json();
        assert_eq!(bookings[0].formatted_date, "2024-05-05");

        let response = server.delete(&path).await;
        response.assert_json(&json!({"acknowledged": true, "deletedCount": 1}));
        let response = server.delete(&path).await;
        response.assert_json(&json!({"acknowledged": true, "deletedCount": 0}));
    }

    #[tokio::test]
    async fn malformed_ids_are_bad_requests() {
        let (server, _) = setup();
        server
            .delete("/bookings/not-an-id")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
        server
            .put("/bookings/not-an-id")
            .json(&json!({"updatedFormattedUDate": "2024-05-05"}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn create_rejects_incomplete_bodies() {
        let (server, _) = setup();
        server
            .post("/bookings")
            .json(&json!({"userMail": "a@x.com"}))
            .await
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }
}
