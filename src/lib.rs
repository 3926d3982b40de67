//! EZ Booking application library
//!
//! Rooms, bookings and reviews over a document store, plus the cookie session
//! endpoints. The binary in `main.rs` wires these together; integration tests
//! build the same router over in-memory storage.

pub mod modules;
pub mod storage;
pub mod utils;

pub use modules::register_all;
pub use storage::{Repositories, Storage};
