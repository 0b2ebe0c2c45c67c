// libs/directory-cell/src/router.rs
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::directory::InMemoryDirectory;
use crate::handlers;

pub fn directory_routes(directory: Arc<InMemoryDirectory>) -> Router {
    Router::new()
        .route("/patients", post(handlers::register_patient))
        .route("/patients/{patient_id}", get(handlers::get_patient))
        .route("/doctors", post(handlers::register_doctor))
        .route("/doctors/{doctor_id}", get(handlers::get_doctor))
        .with_state(directory)
}
