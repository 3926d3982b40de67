pub mod models;
pub mod repository;

use async_trait::async_trait;
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use ezbook_http::{error::AppError, extract::AppJson};
use ezbook_kernel::{InitCtx, Module};

use crate::utils::{parse_id, store_failure};
use models::{AvailabilityUpdate, Message, Room, RoomsQuery};
use repository::DynRoomRepository;

/// Rooms module: listing, lookup and availability updates
pub struct RoomsModule {
    rooms: DynRoomRepository,
}

impl RoomsModule {
    pub fn new(rooms: DynRoomRepository) -> Self {
        Self { rooms }
    }
}

#[async_trait]
impl Module for RoomsModule {
    fn name(&self) -> &'static str {
        "rooms"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "rooms module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/rooms", get(list_rooms))
            .route("/rooms/{id}", get(get_room).put(update_availability))
            .with_state(self.rooms.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(serde_json::json!({
            "paths": {
                "/rooms": {
                    "get": {
                        "summary": "List rooms",
                        "tags": ["Rooms"],
                        "parameters": [{
                            "name": "sortBy",
                            "in": "query",
                            "required": false,
                            "description": "price_asc or price_desc; anything else keeps store order",
                            "schema": { "type": "string" }
                        }],
                        "responses": {
                            "200": {
                                "description": "Rooms",
                                "content": { "application/json": { "schema": {
                                    "type": "array",
                                    "items": { "$ref": "#/components/schemas/Room" }
                                } } }
                            }
                        }
                    }
                },
                "/rooms/{id}": {
                    "get": {
                        "summary": "Get a room",
                        "tags": ["Rooms"],
                        "responses": {
                            "200": {
                                "description": "Room",
                                "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Room" } } }
                            },
                            "400": { "description": "Malformed id" },
                            "404": { "description": "No such room" }
                        }
                    },
                    "put": {
                        "summary": "Set room availability",
                        "tags": ["Rooms"],
                        "responses": {
                            "200": { "description": "Availability updated" },
                            "404": {
                                "description": "Room not found or availability unchanged",
                                "content": { "application/json": { "schema": { "$ref": "#/components/schemas/ErrorResponse" } } }
                            },
                            "500": { "description": "Internal server error" }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Room": {
                        "type": "object",
                        "properties": {
                            "_id": { "type": "string" },
                            "price_per_night": { "type": "number" },
                            "availability": { "type": "boolean" },
                            "room_name": { "type": "string" },
                            "description": { "type": "string" },
                            "room_size": { "type": "string" },
                            "images": { "type": "array", "items": { "type": "string" } },
                            "special_offer": { "type": "string" }
                        },
                        "required": ["_id", "price_per_night", "availability"]
                    }
                }
            }
        }))
    }
}

async fn list_rooms(
    State(rooms): State<DynRoomRepository>,
    Query(query): Query<RoomsQuery>,
) -> Result<Json<Vec<Room>>, AppError> {
    let rooms = rooms.list(query.sort()).await.map_err(store_failure)?;
    Ok(Json(rooms))
}

async fn get_room(
    State(rooms): State<DynRoomRepository>,
    Path(id): Path<String>,
) -> Result<Json<Room>, AppError> {
    let id = parse_id(&id)?;
    rooms
        .get(&id)
        .await
        .map_err(store_failure)?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Room not found"))
}

async fn update_availability(
    State(rooms): State<DynRoomRepository>,
    Path(id): Path<String>,
    AppJson(update): AppJson<AvailabilityUpdate>,
) -> Result<Json<Message>, AppError> {
    let id = parse_id(&id)?;
    let result = rooms
        .update_availability(&id, update.availability)
        .await
        .map_err(|e| {
            tracing::error!(room_id = %id, error = %e, "room availability update failed");
            store_failure(e)
        })?;

    if !result.modified_one() {
        return Err(AppError::not_found(
            "Room not found or availability not updated",
        ));
    }

    tracing::info!(room_id = %id, availability = ?update.availability, "room availability updated");
    Ok(Json(Message {
        message: "Room availability updated successfully".to_string(),
    }))
}

/// Create a new instance of the rooms module
pub fn create_module(rooms: DynRoomRepository) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(RoomsModule::new(rooms))
}
