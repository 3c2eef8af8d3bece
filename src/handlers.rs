use crate::errors::{AppError, ReminderError};
use crate::models::{
    NewReminder, NotificationKind, NotificationView, NotificationsResponse, Preset, PresetState,
    PresetToggle, Reminder, ReminderModal, RemindersQuery, Toast,
};
use crate::notifications::{format_relative, DEFAULT_TOAST_MS};
use crate::state::AppState;
use crate::ui::render_index;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, Redirect},
    Form, Json,
};
use chrono::Local;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let now = Local::now().naive_local();
    let reminders = state.reminders.lock().await;
    let center = state.notifications.lock().await;
    Html(render_index(&reminders, &center, now))
}

pub async fn list_reminders(
    State(state): State<AppState>,
    Query(query): Query<RemindersQuery>,
) -> Json<Vec<Reminder>> {
    let store = state.reminders.lock().await;
    let reminders = if query.all {
        store.all().to_vec()
    } else {
        store.list_active().into_iter().cloned().collect()
    };
    Json(reminders)
}

pub async fn create_reminder(
    State(state): State<AppState>,
    Json(definition): Json<NewReminder>,
) -> Result<(StatusCode, Json<Reminder>), AppError> {
    let reminder = add_custom(&state, definition).await?;
    Ok((StatusCode::CREATED, Json(reminder)))
}

pub async fn create_reminder_form(
    State(state): State<AppState>,
    Form(definition): Form<NewReminder>,
) -> Redirect {
    // Failures surface as a warning toast on the page.
    let _ = add_custom(&state, definition).await;
    Redirect::to("/")
}

pub async fn delete_reminder(State(state): State<AppState>, Path(id): Path<u64>) -> StatusCode {
    remove(&state, id).await;
    StatusCode::NO_CONTENT
}

pub async fn delete_reminder_form(State(state): State<AppState>, Path(id): Path<u64>) -> Redirect {
    remove(&state, id).await;
    Redirect::to("/")
}

pub async fn complete_reminder(State(state): State<AppState>, Path(id): Path<u64>) -> StatusCode {
    complete(&state, id).await;
    StatusCode::NO_CONTENT
}

pub async fn complete_reminder_form(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Redirect {
    complete(&state, id).await;
    Redirect::to("/")
}

pub async fn list_presets(State(state): State<AppState>) -> Json<Vec<PresetState>> {
    Json(state.reminders.lock().await.preset_states())
}

pub async fn toggle_preset(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(toggle): Json<PresetToggle>,
) -> Result<Json<Vec<PresetState>>, AppError> {
    apply_preset(&state, &slug, toggle).await?;
    Ok(Json(state.reminders.lock().await.preset_states()))
}

pub async fn toggle_preset_form(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Form(toggle): Form<PresetToggle>,
) -> Result<Redirect, AppError> {
    match apply_preset(&state, &slug, toggle).await {
        Err(err) if err.status != StatusCode::BAD_REQUEST => Err(err),
        _ => Ok(Redirect::to("/")),
    }
}

pub async fn list_notifications(State(state): State<AppState>) -> Json<NotificationsResponse> {
    let now = Local::now().naive_local();
    let center = state.notifications.lock().await;
    let notifications = center
        .list_unread()
        .into_iter()
        .map(|notification| NotificationView {
            age: format_relative(notification.timestamp, now),
            notification: notification.clone(),
        })
        .collect();

    Json(NotificationsResponse {
        unread_count: center.unread_count(),
        notifications,
    })
}

pub async fn read_notification(State(state): State<AppState>, Path(id): Path<u64>) -> StatusCode {
    state.notifications.lock().await.mark_read(id).await;
    StatusCode::NO_CONTENT
}

pub async fn read_notification_form(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Redirect {
    state.notifications.lock().await.mark_read(id).await;
    Redirect::to("/")
}

pub async fn read_all_notifications(State(state): State<AppState>) -> StatusCode {
    state.notifications.lock().await.mark_all_read().await;
    StatusCode::NO_CONTENT
}

pub async fn get_toasts(State(state): State<AppState>) -> Json<Vec<Toast>> {
    let now = Local::now().naive_local();
    let center = state.notifications.lock().await;
    Json(center.active_toasts(now).into_iter().cloned().collect())
}

pub async fn get_modal(State(state): State<AppState>) -> Json<Option<ReminderModal>> {
    Json(state.notifications.lock().await.current_modal().cloned())
}

pub async fn dismiss_modal(State(state): State<AppState>) -> StatusCode {
    state.notifications.lock().await.dismiss_modal();
    StatusCode::NO_CONTENT
}

pub async fn dismiss_modal_form(State(state): State<AppState>) -> Redirect {
    state.notifications.lock().await.dismiss_modal();
    Redirect::to("/")
}

async fn add_custom(state: &AppState, definition: NewReminder) -> Result<Reminder, ReminderError> {
    let result = state.reminders.lock().await.add(definition).await;

    let mut center = state.notifications.lock().await;
    match &result {
        Ok(reminder) => center.show_toast(
            format!("✅ Reminder \"{}\" added!", reminder.title),
            NotificationKind::Success,
            DEFAULT_TOAST_MS,
        ),
        Err(err) => center.show_toast(err.to_string(), NotificationKind::Warning, DEFAULT_TOAST_MS),
    };
    result
}

async fn remove(state: &AppState, id: u64) {
    if state.reminders.lock().await.delete(id).await {
        state.notifications.lock().await.show_toast(
            "🗑️ Reminder deleted",
            NotificationKind::Info,
            DEFAULT_TOAST_MS,
        );
    }
}

async fn complete(state: &AppState, id: u64) {
    if state.reminders.lock().await.mark_done(id).await.is_some() {
        state.notifications.lock().await.show_toast(
            "✅ Great job! Reminder marked as done!",
            NotificationKind::Success,
            DEFAULT_TOAST_MS,
        );
    }
}

async fn apply_preset(state: &AppState, slug: &str, toggle: PresetToggle) -> Result<(), AppError> {
    let preset = Preset::from_slug(slug)
        .ok_or_else(|| AppError::not_found(format!("unknown preset '{slug}'")))?;

    if toggle.enabled {
        let result = state
            .reminders
            .lock()
            .await
            .enable_preset(preset, toggle.time.as_deref(), toggle.day)
            .await;

        let mut center = state.notifications.lock().await;
        match result {
            Ok(_) => {
                center.show_toast(
                    format!("✅ {} enabled!", preset.title()),
                    NotificationKind::Success,
                    DEFAULT_TOAST_MS,
                );
            }
            Err(err) => {
                center.show_toast(err.to_string(), NotificationKind::Warning, DEFAULT_TOAST_MS);
                return Err(err.into());
            }
        }
    } else if state.reminders.lock().await.disable_preset(preset).await {
        state.notifications.lock().await.show_toast(
            "❌ Reminder disabled",
            NotificationKind::Info,
            DEFAULT_TOAST_MS,
        );
    }

    Ok(())
}
