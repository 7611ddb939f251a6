pub mod app;
pub mod assessment;
pub mod chat;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod state;
pub mod storage;
pub mod tabs;
pub mod tasks;
pub mod ui;
pub mod weight;

pub use app::router;
pub use state::AppState;
pub use storage::{load_store, resolve_data_path};
