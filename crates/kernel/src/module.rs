use async_trait::async_trait;
use axum::Router;
use bookshelf_db::{Database, Migration};

use crate::settings::Settings;

/// Shared handles passed to every lifecycle hook.
pub struct InitCtx<'a> {
    pub settings: &'a Settings,
    pub db: &'a Database,
}

/// A feature slice of the service: its routes, schema and lifecycle.
///
/// Hooks run in this order: `init`, then the collected `migrations`, then
/// `start`. `stop` runs on shutdown, last-registered module first.
#[async_trait]
pub trait Module: Sync + Send {
    /// Registry key, also used to tag log lines and migration records.
    fn name(&self) -> &'static str;

    /// Check dependencies before any schema change is made. An error aborts startup.
    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Absolute-path routes, merged at the server root.
    fn routes(&self) -> Router {
        Router::new()
    }

    /// `paths` and `components` to fold into the service's OpenAPI document.
    fn openapi(&self) -> Option<serde_json::Value> {
        None
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
