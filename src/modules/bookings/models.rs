use ezbook_db::RecordId;
use serde::{Deserialize, Serialize};

/// A reservation owned by `user_mail`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    #[serde(rename = "_id")]
    pub id: RecordId,
    #[serde(rename = "userMail")]
    pub user_mail: String,
    /// Booked room; not checked against the rooms collection.
    #[serde(alias = "roomId")]
    pub room: String,
    #[serde(rename = "formattedDate")]
    pub formatted_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_per_night: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_name: Option<String>,
}

/// Body of `POST /bookings`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewBooking {
    #[serde(rename = "userMail")]
    pub user_mail: String,
    #[serde(alias = "roomId")]
    pub room: String,
    #[serde(rename = "formattedDate")]
    pub formatted_date: String,
    #[serde(default)]
    pub price_per_night: Option<f64>,
    #[serde(default)]
    pub room_name: Option<String>,
}

impl NewBooking {
    pub fn into_booking(self, id: RecordId) -> Booking {
        Booking {
            id,
            user_mail: self.user_mail,
            room: self.room,
            formatted_date: self.formatted_date,
            price_per_night: self.price_per_night,
            room_name: self.room_name,
        }
    }
}

/// Body of `PUT /bookings/{id}`; the field name is what existing clients send.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BookingDateUpdate {
    #[serde(rename = "updatedFormattedUDate")]
    pub formatted_date: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct BookingsQuery {
    pub email: Option<String>,
}
