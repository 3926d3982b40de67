use axum::{routing::get, Router};
use ezbook_kernel::Module;

/// Liveness banner at `/`
pub struct SiteModule;

impl SiteModule {
    pub const fn new() -> Self {
        Self
    }
}

impl Module for SiteModule {
    fn name(&self) -> &'static str {
        "site"
    }

    fn routes(&self) -> Router {
        Router::new().route("/", get(banner))
    }
}

async fn banner() -> &'static str {
    "Ez Booking is running"
}

/// Create a new instance of the site module
pub fn create_module() -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(SiteModule::new())
}
