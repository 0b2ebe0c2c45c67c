use std::sync::Arc;

use axum::{routing::get, Router};

use directory_cell::directory::InMemoryDirectory;
use directory_cell::router::directory_routes;
use scheduling_cell::router::scheduling_routes;
use scheduling_cell::services::scheduling::SchedulingService;
use scheduling_cell::store::InMemoryAppointmentStore;
use shared_config::AppConfig;
use shared_utils::clock::SystemClock;

pub fn create_router(config: &AppConfig) -> Router {
    let directory = Arc::new(InMemoryDirectory::new());
    let store = Arc::new(InMemoryAppointmentStore::new());

    let scheduling = Arc::new(SchedulingService::new(
        store,
        directory.clone(),
        directory.clone(),
        Arc::new(SystemClock),
        config.strict_transitions,
    ));

    Router::new()
        .route("/", get(|| async { "Clinic scheduler API is running!" }))
        .nest("/appointments", scheduling_routes(scheduling))
        .nest("/directory", directory_routes(directory))
}
