use axum::http::{header, HeaderValue, StatusCode};
use axum_test::TestServer;
use ezbook_app::{register_all, Storage};
use ezbook_authz::SessionAuth;
use ezbook_kernel::{settings::Settings, InitCtx, ModuleRegistry};
use serde_json::{json, Value};

const ROOM_ID: &str = "65a1b2c3d4e5f60718293a4b";

async fn app() -> TestServer {
    let mut settings = Settings::default();
    settings.auth.token_secret = "integration-secret".to_string();

    let rooms = serde_json::from_value(json!([
        {"_id": ROOM_ID, "price_per_night": 120, "availability": true, "room_name": "Harbor"},
        {"_id": "65a1b2c3d4e5f60718293a4c", "price_per_night": 80, "availability": false, "room_name": "Garden"}
    ]))
    .unwrap();
    let storage = Storage::memory(rooms);

    let mut registry = ModuleRegistry::new();
    register_all(
        &mut registry,
        &storage.repositories,
        SessionAuth::from_settings(&settings),
    );
    let ctx = InitCtx {
        settings: &settings,
    };
    registry.init_modules(&ctx).await.unwrap();
    registry.start_modules(&ctx).await.unwrap();

    TestServer::new(ezbook_http::build_router(&registry, &settings)).unwrap()
}

async fn login(server: &TestServer, email: &str) -> HeaderValue {
    let response = server.post("/jwt").json(&json!({ "email": email })).await;
    response.assert_status_ok();
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .unwrap()
        .to_string();
    let pair = set_cookie.split(';').next().unwrap().to_string();
    HeaderValue::from_str(&pair).unwrap()
}

#[tokio::test]
async fn liveness_and_health() {
    let server = app().await;
    server.get("/").await.assert_text("Ez Booking is running");
    server.get("/healthz").await.assert_status_ok();
}

#[tokio::test]
async fn a_user_books_a_room_and_sees_only_their_booking() {
    let server = app().await;

    let rooms: Vec<Value> = server.get("/rooms?sortBy=price_asc").await.json();
    assert_eq!(rooms[0]["room_name"], "Garden");
    assert_eq!(rooms[1]["_id"], ROOM_ID);

    let cookie = login(&server, "a@x.com").await;

    let created: Value = server
        .post("/bookings")
        .json(&json!({
            "userMail": "a@x.com",
            "room": ROOM_ID,
            "formattedDate": "2024-05-01",
            "price_per_night": 120,
            "room_name": "Harbor"
        }))
        .await
        .json();
    assert_eq!(created["acknowledged"], true);
    let booking_id = created["insertedId"].as_str().unwrap().to_string();

    server
        .post("/bookings")
        .json(&json!({"userMail": "b@x.com", "room": ROOM_ID, "formattedDate": "2024-06-01"}))
        .await
        .assert_status_ok();

    server.get("/bookings").await.assert_status(StatusCode::UNAUTHORIZED);

    let mine: Vec<Value> = server
        .get("/bookings")
        .add_header(header::COOKIE, cookie.clone())
        .await
        .json();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0]["_id"], booking_id.as_str());
    assert_eq!(mine[0]["formattedDate"], "2024-05-01");

    server
        .put(&format!("/rooms/{ROOM_ID}"))
        .json(&json!({"availability": "unavailable"}))
        .await
        .assert_json(&json!({"message": "Room availability updated successfully"}));
    let room: Value = server.get(&format!("/rooms/{ROOM_ID}")).await.json();
    assert_eq!(room["availability"], false);

    server
        .put(&format!("/bookings/{booking_id}"))
        .json(&json!({"updatedFormattedUDate": "2024-05-09"}))
        .await
        .assert_status_ok();
    let deleted: Value = server.delete(&format!("/bookings/{booking_id}")).await.json();
    assert_eq!(deleted["deletedCount"], 1);

    let mine: Vec<Value> = server
        .get("/bookings")
        .add_header(header::COOKIE, cookie)
        .await
        .json();
    assert!(mine.is_empty());
}

#[tokio::test]
async fn room_reviews_are_newest_first() {
    let server = app().await;
    for (time, comment) in [("2024-01-01", "january"), ("2024-02-01", "february")] {
        server
            .post("/reviews")
            .json(&json!({"roomId": ROOM_ID, "postTime": time, "comment": comment, "rating": 4}))
            .await
            .assert_status_ok();
    }

    let reviews: Vec<Value> = server.get(&format!("/rooms/{ROOM_ID}/reviews")).await.json();
    assert_eq!(reviews[0]["comment"], "february");
    assert_eq!(reviews[1]["comment"], "january");
}

#[tokio::test]
async fn errors_use_the_shared_body() {
    let server = app().await;
    let response = server.get("/rooms/not-an-id").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["message"].is_string());
    assert!(body["trace_id"].is_string());

    server
        .get("/rooms/65a1b2c3d4e5f60718293aff")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn openapi_lists_every_module() {
    let server = app().await;
    let doc: Value = server.get("/docs/openapi.json").await.json();
    for path in ["/jwt", "/rooms", "/bookings", "/allReviews"] {
        assert!(doc["paths"].get(path).is_some(), "{path}");
    }
}
