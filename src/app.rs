use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/console", get(handlers::console_page))
        .route("/api/tab/switch", post(handlers::switch_tab))
        .route("/api/tab/:name", get(handlers::get_tab))
        .route("/api/weight", get(handlers::get_weight).post(handlers::record_weight))
        .route("/api/weight/chart/:days", get(handlers::get_weight_chart))
        .route("/api/assessment", get(handlers::get_assessment))
        .route("/api/assessment/draft", post(handlers::autosave_draft))
        .route("/api/assessment/save", post(handlers::save_draft))
        .route("/api/assessment/submit", post(handlers::submit_assessment))
        .route("/api/assessment/send", post(handlers::send_to_nutritionist))
        .route("/api/chat/messages", get(handlers::get_chat_messages))
        .route("/api/chat/send", post(handlers::send_chat_message))
        .route("/api/chat/status", get(handlers::get_chat_status))
        .route("/api/console/athletes", get(handlers::get_console_athletes))
        .route("/api/console/status", post(handlers::set_console_status))
        .route(
            "/api/console/:athlete/messages",
            get(handlers::get_console_thread),
        )
        .route(
            "/api/console/:athlete/send",
            post(handlers::send_console_message),
        )
        .with_state(state)
}
