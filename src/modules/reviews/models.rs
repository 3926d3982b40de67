use ezbook_db::RecordId;
use serde::{Deserialize, Serialize};
use time::{
    format_description::well_known::Rfc3339, macros::format_description, Date, OffsetDateTime,
    PrimitiveDateTime,
};

/// A guest review of a room. Reviews are never edited or removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    #[serde(rename = "_id")]
    pub id: RecordId,
    #[serde(rename = "roomId")]
    pub room_id: String,
    /// Timestamp as posted by the client; ordering uses [`parse_post_time`].
    #[serde(rename = "postTime")]
    pub post_time: String,
    pub comment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(rename = "userImage", default, skip_serializing_if = "Option::is_none")]
    pub user_image: Option<String>,
}

/// Body of `POST /reviews`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewReview {
    #[serde(rename = "roomId")]
    pub room_id: String,
    #[serde(rename = "postTime")]
    pub post_time: String,
    pub comment: String,
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(rename = "userImage", default)]
    pub user_image: Option<String>,
}

impl NewReview {
    pub fn into_review(self, id: RecordId) -> Review {
        Review {
            id,
            room_id: self.room_id,
            post_time: self.post_time,
            comment: self.comment,
            rating: self.rating,
            username: self.username,
            user_image: self.user_image,
        }
    }
}

/// Direction of the review listing by derived post date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostOrder {
    NewestFirst,
    OldestFirst,
}

/// Derive a point in time from a `postTime` string.
///
/// Accepts RFC 3339 (`2024-02-01T09:30:00.000Z`), a bare date (`2024-02-01`,
/// midnight UTC) and a date-time without offset (`2024-02-01T09:30:00`, with
/// optional fractional seconds, UTC).
pub fn parse_post_time(raw: &str) -> Option<OffsetDateTime> {
    let raw = raw.trim();
    if let Ok(parsed) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(parsed);
    }
    let without_offset = [
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    ];
    if let Some(parsed) = without_offset
        .iter()
        .find_map(|format| PrimitiveDateTime::parse(raw, *format).ok())
    {
        return Some(parsed.assume_utc());
    }
    Date::parse(raw, format_description!("[year]-[month]-[day]"))
        .ok()
        .map(|date| date.midnight().assume_utc())
}
