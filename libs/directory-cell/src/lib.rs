pub mod directory;
pub mod handlers;
pub mod models;
pub mod router;
