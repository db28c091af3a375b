use anyhow::Context;
use bookshelf_app::{shutdown_signal, App};
use bookshelf_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load bookshelf settings")?;
    bookshelf_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        db = settings.database.scheme(),
        "bookshelf-app bootstrap starting"
    );

    let app = App::bootstrap(settings).await?;

    tracing::info!("bookshelf-app bootstrap complete");

    app.serve(shutdown_signal()).await
}
