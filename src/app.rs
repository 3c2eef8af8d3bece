use crate::handlers;
use crate::state::AppState;
use axum::{routing::{delete, get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/reminders", post(handlers::create_reminder_form))
        .route("/reminders/:id/done", post(handlers::complete_reminder_form))
        .route("/reminders/:id/delete", post(handlers::delete_reminder_form))
        .route("/presets/:preset", post(handlers::toggle_preset_form))
        .route("/notifications/:id/read", post(handlers::read_notification_form))
        .route("/modal/dismiss", post(handlers::dismiss_modal_form))
        .route(
            "/api/reminders",
            get(handlers::list_reminders).post(handlers::create_reminder),
        )
        .route("/api/reminders/:id", delete(handlers::delete_reminder))
        .route("/api/reminders/:id/done", post(handlers::complete_reminder))
        .route("/api/presets", get(handlers::list_presets))
        .route("/api/presets/:preset", post(handlers::toggle_preset))
        .route("/api/notifications", get(handlers::list_notifications))
        .route("/api/notifications/read-all", post(handlers::read_all_notifications))
        .route("/api/notifications/:id/read", post(handlers::read_notification))
        .route("/api/toasts", get(handlers::get_toasts))
        .route("/api/modal", get(handlers::get_modal))
        .route("/api/modal/dismiss", post(handlers::dismiss_modal))
        .with_state(state)
}
