pub mod auth;
pub mod bookings;
pub mod reviews;
pub mod rooms;
pub mod site;

use ezbook_authz::SessionAuth;
use ezbook_kernel::ModuleRegistry;

use crate::storage::Repositories;

/// Register every EZ Booking module with the registry
pub fn register_all(registry: &mut ModuleRegistry, repos: &Repositories, auth: SessionAuth) {
    registry.register(site::create_module());
    registry.register(auth::create_module(auth.clone()));
    registry.register(rooms::create_module(repos.rooms.clone()));
    registry.register(bookings::create_module(repos.bookings.clone(), auth));
    registry.register(reviews::create_module(repos.reviews.clone()));
}
