use anyhow::Context;
use ezbook_app::{register_all, Storage};
use ezbook_authz::SessionAuth;
use ezbook_kernel::{settings::Settings, InitCtx, ModuleRegistry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("failed to load EZ Booking settings")?;
    ezbook_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        driver = ?settings.database.driver,
        port = settings.server.port,
        "ezbook bootstrap starting"
    );

    let storage = Storage::open(&settings.database).await?;
    let auth = SessionAuth::from_settings(&settings);

    let mut registry = ModuleRegistry::new();
    register_all(&mut registry, &storage.repositories, auth);

    let ctx = InitCtx {
        settings: &settings,
    };
    registry.init_modules(&ctx).await?;
    registry.start_modules(&ctx).await?;

    let served = ezbook_http::start_server(&registry, &settings).await;

    if let Err(e) = registry.stop_modules().await {
        tracing::error!(error = %e, "module shutdown failed");
    }
    storage.close().await;

    tracing::info!("ezbook stopped");
    served
}
