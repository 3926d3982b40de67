use std::fmt;

use ezbook_db::RecordId;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// A bookable room. Rooms are seeded outside this service; only
/// `availability` is ever written here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    #[serde(rename = "_id")]
    pub id: RecordId,
    pub price_per_night: f64,
    pub availability: Availability,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_size: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_offer: Option<String>,
}

/// Whether a room can currently be booked.
///
/// Written as a JSON bool. Reads also accept the strings `"available"` and
/// `"unavailable"` in any case, which older clients stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Available,
    Unavailable,
}

impl Availability {
    pub fn as_bool(self) -> bool {
        self == Availability::Available
    }
}

impl From<bool> for Availability {
    fn from(value: bool) -> Self {
        if value {
            Availability::Available
        } else {
            Availability::Unavailable
        }
    }
}

impl Serialize for Availability {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bool(self.as_bool())
    }
}

impl<'de> Deserialize<'de> for Availability {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AvailabilityVisitor;

        impl de::Visitor<'_> for AvailabilityVisitor {
            type Value = Availability;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a bool or one of \"available\" / \"unavailable\"")
            }

            fn visit_bool<E: de::Error>(self, value: bool) -> Result<Availability, E> {
                Ok(value.into())
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Availability, E> {
                if value.eq_ignore_ascii_case("available") {
                    Ok(Availability::Available)
                } else if value.eq_ignore_ascii_case("unavailable") {
                    Ok(Availability::Unavailable)
                } else {
                    Err(E::invalid_value(de::Unexpected::Str(value), &self))
                }
            }
        }

        deserializer.deserialize_any(AvailabilityVisitor)
    }
}

/// Ordering applied to the room listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomSort {
    PriceAsc,
    PriceDesc,
}

impl RoomSort {
    /// `None` for anything but the two known values; unknown values mean
    /// natural order, not an error.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "price_asc" => Some(RoomSort::PriceAsc),
            "price_desc" => Some(RoomSort::PriceDesc),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RoomsQuery {
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
}

impl RoomsQuery {
    pub fn sort(&self) -> Option<RoomSort> {
        self.sort_by.as_deref().and_then(RoomSort::parse)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AvailabilityUpdate {
    pub availability: Availability,
}

#[derive(Debug, Serialize)]
pub struct Message {
    pub message: String,
}
