use crate::models::{Preset, Reminder};
use crate::notifications::{format_relative, NotificationCenter};
use crate::reminders::{ReminderStore, DEFAULT_PRESET_TIME};
use chrono::NaiveDateTime;
use std::fmt::Write;

pub fn render_index(reminders: &ReminderStore, center: &NotificationCenter, now: NaiveDateTime) -> String {
    // Single pass: rendered sections are never rescanned for placeholders.
    let mut html = String::with_capacity(INDEX_HTML.len() * 2);
    let mut rest = INDEX_HTML;
    while let Some(start) = rest.find("{{") {
        html.push_str(&rest[..start]);
        let tail = &rest[start + 2..];
        let Some(end) = tail.find("}}") else {
            rest = &rest[start..];
            break;
        };
        match &tail[..end] {
            "UNREAD" => html.push_str(&center.unread_count().to_string()),
            "PRESETS" => html.push_str(&render_presets(reminders)),
            "ACTIVE" => html.push_str(&render_active(reminders)),
            "NOTIFICATIONS" => html.push_str(&render_notifications(center, now)),
            "TOASTS" => html.push_str(&render_toasts(center, now)),
            "MODAL" => html.push_str(&render_modal(center)),
            other => {
                html.push_str("{{");
                html.push_str(other);
                html.push_str("}}");
            }
        }
        rest = &tail[end + 2..];
    }
    html.push_str(rest);
    html
}

fn render_presets(reminders: &ReminderStore) -> String {
    let states = reminders.preset_states();
    let mut html = String::new();
    for state in states {
        let preset = state.preset;
        let current = reminders.all().iter().find(|r| r.preset == Some(preset));
        let time = current
            .map(|r| r.time.to_string())
            .unwrap_or_else(|| DEFAULT_PRESET_TIME.to_string());
        let day_input = if preset == Preset::WeeklyBudget {
            let selected = current.and_then(|r| r.day).unwrap_or(1);
            day_select(selected)
        } else {
            String::new()
        };
        let (button, enabled) = if state.enabled {
            ("Turn off", "false")
        } else {
            ("Turn on", "true")
        };

        let _ = write!(
            html,
            r#"<form class="preset{on}" method="post" action="/presets/{slug}">
  <span class="preset-icon">{icon}</span>
  <div class="preset-body"><strong>{title}</strong><small>{message}</small></div>
  <input type="time" name="time" value="{time}" />{day_input}
  <input type="hidden" name="enabled" value="{enabled}" />
  <button type="submit">{button}</button>
</form>
"#,
            on = if state.enabled { " on" } else { "" },
            slug = preset.slug(),
            icon = preset.icon(),
            title = escape(preset.title()),
            message = escape(preset.message()),
        );
    }
    html
}

fn render_active(reminders: &ReminderStore) -> String {
    let active = reminders.list_active();
    if active.is_empty() {
        return r#"<p class="muted">No reminders set yet. Start by enabling a quick setup above! 🎯</p>"#
            .to_string();
    }
    active.into_iter().map(reminder_card).collect()
}

fn reminder_card(reminder: &Reminder) -> String {
    let day = reminder
        .day_name()
        .map(|name| format!("<span>🗓 {name}</span>"))
        .unwrap_or_default();
    format!(
        r#"<div class="reminder">
  <div class="reminder-head"><h3>{emoji} {title}</h3><span class="badge">{frequency}</span></div>
  <p>{message}</p>
  <div class="details"><span>🕒 {time}</span>{day}</div>
  <div class="reminder-actions">
    <form method="post" action="/reminders/{id}/done"><button type="submit">✅ Mark Done</button></form>
    <form method="post" action="/reminders/{id}/delete"><button type="submit" class="ghost">🗑️ Delete</button></form>
  </div>
</div>
"#,
        emoji = reminder.frequency.emoji(),
        title = escape(&reminder.title),
        frequency = reminder.frequency.as_str(),
        message = escape(&reminder.message),
        time = reminder.time,
        id = reminder.id,
    )
}

fn render_notifications(center: &NotificationCenter, now: NaiveDateTime) -> String {
    let unread = center.list_unread();
    if unread.is_empty() {
        return r#"<p class="muted">No new notifications</p>"#.to_string();
    }
    unread
        .into_iter()
        .rev()
        .map(|n| {
            format!(
                r#"<form class="notification" method="post" action="/notifications/{id}/read">
  <button type="submit" class="plain"><strong>{title}</strong><span>{message}</span><small>{age}</small></button>
</form>
"#,
                id = n.id,
                title = escape(&n.title),
                message = escape(&n.message),
                age = format_relative(n.timestamp, now),
            )
        })
        .collect()
}

fn render_toasts(center: &NotificationCenter, now: NaiveDateTime) -> String {
    center
        .active_toasts(now)
        .into_iter()
        .map(|toast| {
            format!(
                r#"<div class="toast {kind}"><strong>{icon} {heading}</strong><span>{message}</span></div>
"#,
                kind = toast.kind.as_str(),
                icon = toast.kind.icon(),
                heading = toast.kind.title(),
                message = escape(&toast.message),
            )
        })
        .collect()
}

fn render_modal(center: &NotificationCenter) -> String {
    let Some(modal) = center.current_modal() else {
        return String::new();
    };
    format!(
        r#"<div class="modal-backdrop">
  <div class="modal">
    <div class="modal-icon">{icon}</div>
    <h2>{title}</h2>
    <p>{message}</p>
    <form method="post" action="/modal/dismiss"><button type="submit">Got it! ✓</button></form>
  </div>
</div>
"#,
        icon = modal.icon,
        title = escape(&modal.title),
        message = escape(&modal.message),
    )
}

fn day_select(selected: u8) -> String {
    let mut html = String::from(r#"<select name="day">"#);
    for (value, name) in crate::models::WEEKDAY_NAMES.iter().enumerate() {
        let mark = if value == usize::from(selected) { " selected" } else { "" };
        let _ = write!(html, r#"<option value="{value}"{mark}>{name}</option>"#);
    }
    html.push_str("</select>");
    html
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>BudgetBuddy Reminders</title>
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');

    :root {
      --bg-1: #eef4f8;
      --bg-2: #c9e2f2;
      --ink: #23303a;
      --accent: #3a86ff;
      --accent-2: #2f4858;
      --card: rgba(255, 255, 255, 0.88);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #e3eef7 60%, #f4f8fb 100%);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(900px, 100%);
      background: var(--card);
      backdrop-filter: blur(12px);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 28px;
    }

    header {
      display: flex;
      justify-content: space-between;
      align-items: center;
    }

    h1 {
      font-family: "Fraunces", "Georgia", serif;
      font-weight: 600;
      font-size: clamp(2rem, 4vw, 2.6rem);
      margin: 0;
    }

    h2 {
      margin: 0 0 12px;
      font-size: 1.3rem;
    }

    .bell {
      position: relative;
      font-size: 1.8rem;
    }

    .bell .count {
      position: absolute;
      top: -6px;
      right: -12px;
      background: #ff6b4a;
      color: white;
      border-radius: 999px;
      font-size: 0.75rem;
      padding: 2px 7px;
    }

    .muted {
      color: #7a8590;
      text-align: center;
    }

    .preset, .reminder, .notification, .custom {
      background: white;
      border-radius: 18px;
      padding: 16px 18px;
      border: 1px solid rgba(47, 72, 88, 0.08);
      margin-bottom: 12px;
    }

    .preset {
      display: flex;
      flex-wrap: wrap;
      gap: 12px;
      align-items: center;
    }

    .preset.on {
      border-color: var(--accent);
    }

    .preset-icon {
      font-size: 1.6rem;
    }

    .preset-body {
      flex: 1;
      display: grid;
      gap: 4px;
    }

    .reminder-head, .details, .reminder-actions {
      display: flex;
      gap: 12px;
      align-items: center;
    }

    .reminder-head h3 {
      margin: 0;
      flex: 1;
    }

    .badge {
      background: rgba(58, 134, 255, 0.12);
      color: var(--accent);
      border-radius: 999px;
      padding: 4px 10px;
      font-size: 0.8rem;
    }

    .custom {
      display: grid;
      gap: 10px;
    }

    input, select {
      font: inherit;
      padding: 8px 10px;
      border-radius: 10px;
      border: 1px solid rgba(47, 72, 88, 0.2);
    }

    button {
      appearance: none;
      border: none;
      border-radius: 999px;
      padding: 10px 16px;
      font: inherit;
      font-weight: 600;
      cursor: pointer;
      background: var(--accent);
      color: white;
    }

    button.ghost {
      background: transparent;
      color: var(--accent-2);
      border: 1px solid rgba(47, 72, 88, 0.2);
    }

    button.plain {
      background: transparent;
      color: inherit;
      width: 100%;
      text-align: left;
      display: grid;
      gap: 4px;
      border-radius: 0;
      padding: 0;
      font-weight: 400;
    }

    .toasts {
      position: fixed;
      right: 18px;
      bottom: 18px;
      display: grid;
      gap: 10px;
    }

    .toast {
      background: white;
      border-left: 4px solid var(--accent);
      border-radius: 12px;
      box-shadow: var(--shadow);
      padding: 12px 16px;
      display: grid;
      gap: 4px;
      min-width: 240px;
    }

    .toast.success { border-color: #2a9d8f; }
    .toast.warning { border-color: #f4a261; }
    .toast.error { border-color: #e63946; }

    .modal-backdrop {
      position: fixed;
      inset: 0;
      background: rgba(35, 48, 58, 0.45);
      display: grid;
      place-items: center;
    }

    .modal {
      background: white;
      border-radius: 24px;
      padding: 32px;
      text-align: center;
      max-width: 420px;
    }

    .modal-icon {
      font-size: 3rem;
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>Reminders</h1>
      <span class="bell">🔔<span class="count">{{UNREAD}}</span></span>
    </header>

    <section>
      <h2>Quick setup</h2>
      {{PRESETS}}
    </section>

    <section>
      <h2>Custom reminder</h2>
      <form class="custom" method="post" action="/reminders">
        <input name="title" placeholder="Title" />
        <input name="message" placeholder="Message" />
        <select name="frequency">
          <option value="once">Once</option>
          <option value="daily" selected>Daily</option>
          <option value="weekly">Weekly</option>
          <option value="monthly">Monthly</option>
        </select>
        <input type="time" name="time" />
        <select name="day">
          <option value="">Day (weekly only)</option>
          <option value="0">Sun</option>
          <option value="1">Mon</option>
          <option value="2">Tue</option>
          <option value="3">Wed</option>
          <option value="4">Thu</option>
          <option value="5">Fri</option>
          <option value="6">Sat</option>
        </select>
        <button type="submit">Add reminder</button>
      </form>
    </section>

    <section>
      <h2>Active reminders</h2>
      {{ACTIVE}}
    </section>

    <section>
      <h2>Notifications</h2>
      {{NOTIFICATIONS}}
    </section>
  </main>

  <div class="toasts">
    {{TOASTS}}
  </div>

  {{MODAL}}

  <script>
    setTimeout(() => window.location.reload(), 30000);
  </script>
</body>
</html>
"#;
