//! Process wiring: database, module lifecycle and the HTTP server.

use std::future::Future;

use anyhow::Context;
use axum::Router;
use bookshelf_kernel::{settings::Settings, Database, InitCtx, ModuleRegistry};

use crate::modules;

/// A started application: store connected, migrations applied, modules running.
pub struct App {
    settings: Settings,
    db: Database,
    registry: ModuleRegistry,
}

impl App {
    /// Connect to the store and bring every module up.
    ///
    /// Fails, without serving anything, when the store cannot be reached.
    pub async fn bootstrap(settings: Settings) -> anyhow::Result<Self> {
        let db = connect(&settings).await?;

        let mut registry = ModuleRegistry::new();
        modules::register_all(&mut registry, &db);

        let ctx = InitCtx {
            settings: &settings,
            db: &db,
        };
        registry.init_modules(&ctx).await?;

        let applied = db
            .migrate(&registry.collect_migrations())
            .await
            .context("failed to apply migrations")?;
        tracing::info!(applied, "migrations complete");

        registry.start_modules(&ctx).await?;

        Ok(Self {
            settings,
            db,
            registry,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The full HTTP surface, middleware included.
    pub fn router(&self) -> Router {
        bookshelf_http::build_router(&self.registry, &self.settings)
    }

    /// Serve until `shutdown` resolves, then stop modules and release the store.
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let served = bookshelf_http::start_server(&self.registry, &self.settings, shutdown).await;
        let stopped = self.shutdown().await;
        served.and(stopped)
    }

    pub async fn shutdown(self) -> anyhow::Result<()> {
        let stopped = self.registry.stop_modules().await;
        self.db.close().await;
        stopped
    }
}

/// Apply pending migrations without serving. Returns how many ran.
pub async fn migrate(settings: &Settings) -> anyhow::Result<usize> {
    let db = connect(settings).await?;

    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, &db);

    let applied = db.migrate(&registry.collect_migrations()).await;
    db.close().await;
    applied
}

async fn connect(settings: &Settings) -> anyhow::Result<Database> {
    Database::connect(&settings.database.url, settings.database.max_connections)
        .await
        .context("database is unavailable")
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(%err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(%err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
