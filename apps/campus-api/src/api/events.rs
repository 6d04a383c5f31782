//! Events API routes

use axum::Router;
use domain_events::{EventService, MongoEventRepository, MongoUserDirectory, handlers};
use mongodb::Database;

use crate::state::AppState;

/// Create the events router backed by MongoDB
pub fn router(state: &AppState) -> Router {
    let repository = MongoEventRepository::new(state.db.clone());
    let directory = MongoUserDirectory::new(state.db.clone());
    let service = EventService::new(repository, directory);

    handlers::router(service)
}

/// Create MongoDB indexes for the events collection
pub async fn init_indexes(db: &Database) -> eyre::Result<()> {
    let repository = MongoEventRepository::new(db.clone());
    repository.create_indexes().await?;
    Ok(())
}
