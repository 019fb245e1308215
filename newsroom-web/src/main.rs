// main.rs only boots the state, router and server.

mod error;
mod filters;
mod handlers;
mod models;
mod router;
mod session;
mod state;
mod templates;

use std::sync::Arc;

use tracing::info;

use newsroom_core::cache::PostCache;
use newsroom_core::services::{ContentService, Hooks};
use newsroom_core::storage::{DatabaseStorage, Storage};
use newsroom_core::tasks::TaskQueue;
use newsroom_core::{DatabaseManager, Settings};

use session::SessionStore;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    tracing_subscriber::fmt::init();

    let settings = Arc::new(Settings::from_env());

    info!("Initializing database storage...");
    let db = DatabaseManager::new(&settings.database).await?;
    db.run_migrations().await?;
    let storage: Arc<dyn Storage> = Arc::new(DatabaseStorage::new(Arc::new(db)));

    let queue = TaskQueue::new(storage.clone());
    let hooks = Hooks::standard(storage.clone(), queue);
    let state = AppState {
        content: Arc::new(ContentService::new(storage.clone(), hooks)),
        storage,
        sessions: Arc::new(SessionStore::new()),
        post_cache: Arc::new(PostCache::default()),
        settings: settings.clone(),
    };

    let app = router::app_router(state);

    let listener = tokio::net::TcpListener::bind(&settings.bind_addr).await?;
    info!("Web server listening on {}", settings.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
