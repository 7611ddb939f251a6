use crate::assessment;
use crate::chat;
use crate::errors::AppError;
use crate::models::{
    AssessmentRecord, AssessmentView, AvailabilityView, ChartData, ChatMessage, ChatSendRequest,
    ChatView, ConsoleAthlete, ConsoleThreadView, ConsoleView, DraftRequest, HomeTask, HomeView,
    MessageStatus, Sender, StatusRequest, SummaryEntry, TabSwitchRequest, TabView, WeightEntry,
    WeightRequest, WeightSummary, WeightView,
};
use crate::state::{AppState, Availability};
use crate::storage::{persist_store, Store};
use crate::tabs::{self, Switch, Tab};
use crate::ui;
use crate::weight;
use axum::{
    extract::{Path, State},
    response::Html,
    Json,
};
use chrono::Local;
use rand::Rng;
use serde_json::json;
use std::time::Duration;
use tracing::{error, info};

const AUTOSAVE_DELAY: Duration = Duration::from_secs(30);

fn weights_key() -> String {
    format!("weights_{}", chat::ATHLETE_ID)
}

fn summary_key() -> String {
    format!("weight_summary_{}", chat::ATHLETE_ID)
}

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let store = state.store.lock().await;
    let entries: Vec<WeightEntry> = store.get(&weights_key());
    let current = weight::current_weight(&entries).unwrap_or(68.5);
    Html(ui::render_index(current, weight::TARGET_WEIGHT))
}

pub async fn console_page() -> Html<String> {
    Html(ui::render_console())
}

// ---- tab navigation ----

pub async fn get_tab(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<TabView>, AppError> {
    let tab = Tab::parse(&name);
    let content = tab_content(&state, tab).await?;
    Ok(Json(TabView {
        tab,
        changed: true,
        fade_out_ms: tabs::FADE_OUT_MS,
        settle_ms: tabs::SETTLE_MS,
        content,
    }))
}

pub async fn switch_tab(
    State(state): State<AppState>,
    Json(request): Json<TabSwitchRequest>,
) -> Result<Json<TabView>, AppError> {
    let to = Tab::parse(&request.tab);
    let switch = { state.nav.lock().await.switch(to) };

    let changed = match switch {
        Switch::Same => false,
        Switch::Moved { from, to } => {
            info!("tab switch {} -> {}", from.as_str(), to.as_str());
            // Pending timers belong to the view being left.
            match from {
                Tab::Chat => {
                    state.tasks.cancel_prefix("chat:athlete:");
                    state
                        .typing
                        .lock()
                        .await
                        .remove(&chat::athlete_thread_key());
                }
                Tab::Assessment => state.tasks.cancel_prefix("assessment:"),
                _ => {}
            }
            true
        }
    };

    let content = tab_content(&state, to).await?;
    Ok(Json(TabView {
        tab: to,
        changed,
        fade_out_ms: tabs::FADE_OUT_MS,
        settle_ms: tabs::SETTLE_MS,
        content,
    }))
}

async fn tab_content(state: &AppState, tab: Tab) -> Result<serde_json::Value, AppError> {
    let content = match tab {
        Tab::Home => serde_json::to_value(home_view(state).await?),
        Tab::Weight => serde_json::to_value(weight_view(state, 14).await?),
        Tab::Assessment => serde_json::to_value(assessment_view(state).await?),
        Tab::Chat => serde_json::to_value(chat_view(state).await?),
    };
    content.map_err(AppError::internal)
}

fn home_tasks() -> Vec<HomeTask> {
    vec![
        HomeTask {
            id: "morning-weight",
            title: "שקילה בוקר",
            hint: "07:30",
            done: true,
        },
        HomeTask {
            id: "morning-supplements",
            title: "נטילת תוספי תזונה",
            hint: "עם ארוחת בוקר",
            done: true,
        },
        HomeTask {
            id: "water-intake",
            title: "הקפדה על שתיית מים",
            hint: "יעד: 2.5-3 ליטרים ליום",
            done: false,
        },
        HomeTask {
            id: "lunch",
            title: "ארוחת צהריים",
            hint: "12:30 - בקרוב",
            done: false,
        },
        HomeTask {
            id: "evening-weight",
            title: "שקילה ערב",
            hint: "לפני השינה",
            done: false,
        },
    ]
}

async fn home_view(state: &AppState) -> Result<HomeView, AppError> {
    let entries = ensure_weight_history(state).await?;
    let current = weight::current_weight(&entries);
    Ok(HomeView {
        athlete_name: "דני כהן",
        current_weight: current,
        target_weight: weight::TARGET_WEIGHT,
        difference: current.map(|value| value - weight::TARGET_WEIGHT),
        tasks: home_tasks(),
    })
}

// ---- weight tracker ----

/// Demo scaffolding: an athlete with no history gets a seeded 14-day
/// series on first view.
async fn ensure_weight_history(state: &AppState) -> Result<Vec<WeightEntry>, AppError> {
    let mut store = state.store.lock().await;
    let key = weights_key();
    let entries: Vec<WeightEntry> = store.get(&key);
    if !entries.is_empty() {
        return Ok(entries);
    }
    let seeded = weight::sample_series(Local::now().date_naive());
    store.set(&key, &seeded);
    persist_store(&state.data_path, &store).await?;
    Ok(seeded)
}

fn view_from(entries: &[WeightEntry], days: usize) -> WeightView {
    let current = weight::current_weight(entries);
    WeightView {
        current_weight: current,
        target_weight: weight::TARGET_WEIGHT,
        difference: current.map(|value| value - weight::TARGET_WEIGHT),
        progress_percent: weight::progress_percent(entries, weight::TARGET_WEIGHT),
        alert: weight::smart_alert(entries, weight::TARGET_WEIGHT),
        chart: weight::chart_window(entries, days, Local::now().date_naive()),
    }
}

async fn weight_view(state: &AppState, days: usize) -> Result<WeightView, AppError> {
    let entries = ensure_weight_history(state).await?;
    Ok(view_from(&entries, days))
}

pub async fn get_weight(State(state): State<AppState>) -> Result<Json<WeightView>, AppError> {
    Ok(Json(weight_view(&state, 14).await?))
}

pub async fn get_weight_chart(
    State(state): State<AppState>,
    Path(days): Path<usize>,
) -> Result<Json<ChartData>, AppError> {
    if !(1..=365).contains(&days) {
        return Err(AppError::bad_request("חלון ימים לא תקין"));
    }
    let entries = ensure_weight_history(&state).await?;
    Ok(Json(weight::chart_window(
        &entries,
        days,
        Local::now().date_naive(),
    )))
}

fn update_summary(store: &mut Store, entry: &WeightEntry) {
    let key = summary_key();
    let mut summary: WeightSummary = store.get(&key);
    summary.entries.insert(
        entry.date.clone(),
        SummaryEntry {
            weight: entry.weight,
            date: entry.date.clone(),
            source: entry.source.clone(),
        },
    );
    summary.latest_weight = Some(entry.weight);
    summary.last_updated = Some(entry.timestamp.clone());
    store.set(&key, &summary);
}

pub async fn record_weight(
    State(state): State<AppState>,
    Json(request): Json<WeightRequest>,
) -> Result<Json<WeightView>, AppError> {
    let (value, time) = weight::validate_entry(request.weight, request.time.as_deref())
        .map_err(AppError::bad_request)?;

    let now = Local::now();
    let entry = weight::entry_at(value, time, request.notes, None, now);

    let mut store = state.store.lock().await;
    let key = weights_key();
    let mut entries: Vec<WeightEntry> = store.get(&key);
    update_summary(&mut store, &entry);
    entries.push(entry);
    store.set(&key, &entries);
    persist_store(&state.data_path, &store).await?;

    Ok(Json(view_from(&entries, 14)))
}

// ---- weekly assessment ----

async fn assessment_view(state: &AppState) -> Result<AssessmentView, AppError> {
    let now = Local::now();
    let today = now.date_naive();

    let mut store = state.store.lock().await;
    let draft: Option<AssessmentRecord> = store.get(&assessment::draft_key(today));
    let mut answers = draft.map(|record| record.answers).unwrap_or_default();
    assessment::ensure_date(&mut answers, today);

    let submitted = store.contains(&assessment::completed_key(today));

    // The cycle question surfaces once per calendar month; the saved
    // applicability answer keeps it visible afterwards.
    let flag_key = assessment::month_flag_key(today);
    let show_cycle_question = if store.contains(&flag_key) {
        answers.menstrual_applicable
    } else {
        store.set(&flag_key, &true);
        persist_store(&state.data_path, &store).await?;
        true
    };

    let progress = assessment::progress(&answers);
    Ok(AssessmentView {
        week_key: assessment::week_key(today),
        week_label: assessment::week_label(today),
        answers,
        progress,
        submitted,
        show_cycle_question,
    })
}

pub async fn get_assessment(
    State(state): State<AppState>,
) -> Result<Json<AssessmentView>, AppError> {
    Ok(Json(assessment_view(&state).await?))
}

async fn flush_pending_draft(state: &AppState) -> Result<bool, AppError> {
    let taken = { state.pending_draft.lock().await.take() };
    let Some(mut answers) = taken else {
        return Ok(false);
    };
    let now = Local::now();
    assessment::ensure_date(&mut answers, now.date_naive());
    let record = assessment::draft_record(answers, now);

    let mut store = state.store.lock().await;
    store.set(assessment::draft_key(now.date_naive()), &record);
    persist_store(&state.data_path, &store).await?;
    Ok(true)
}

/// Field changes land here; each one restarts the 30-second idle timer
/// before the draft is persisted silently. A debounce, not a throttle.
pub async fn autosave_draft(
    State(state): State<AppState>,
    Json(request): Json<DraftRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    {
        *state.pending_draft.lock().await = Some(request.answers);
    }

    let task_state = state.clone();
    let handle = tokio::spawn(async move {
        tokio::time::sleep(AUTOSAVE_DELAY).await;
        match flush_pending_draft(&task_state).await {
            Ok(true) => info!("assessment draft autosaved"),
            Ok(false) => {}
            Err(err) => error!("assessment autosave failed: {}", err.message),
        }
    });
    state.tasks.replace("assessment:autosave", handle);

    Ok(Json(json!({ "scheduled": true })))
}

pub async fn save_draft(
    State(state): State<AppState>,
    Json(request): Json<DraftRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    {
        *state.pending_draft.lock().await = Some(request.answers);
    }
    state.tasks.cancel("assessment:autosave");
    flush_pending_draft(&state).await?;
    Ok(Json(
        json!({ "saved": true, "message": "הטיוטה נשמרה בהצלחה!" }),
    ))
}

pub async fn submit_assessment(
    State(state): State<AppState>,
    Json(request): Json<DraftRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let mut answers = request.answers;
    let now = Local::now();
    let today = now.date_naive();
    assessment::ensure_date(&mut answers, today);

    if !assessment::missing_required(&answers).is_empty() {
        return Err(AppError::bad_request(
            "אנא השלם את כל השדות הנדרשים לפני שליחת השאלון",
        ));
    }

    let weight_value = answers
        .daily_weight
        .as_deref()
        .and_then(|raw| raw.trim().parse::<f64>().ok());
    let record = assessment::submitted_record(answers, now);

    state.tasks.cancel("assessment:autosave");
    {
        *state.pending_draft.lock().await = None;
    }

    let mut store = state.store.lock().await;
    // A resubmission for the same week silently overwrites.
    store.set(assessment::completed_key(today), &record);

    if let Some(value) = weight_value {
        let key = weights_key();
        let mut entries: Vec<WeightEntry> = store.get(&key);
        let entry = weight::entry_at(
            value,
            "שאלון שבועי".to_string(),
            None,
            Some("questionnaire".to_string()),
            now,
        );
        update_summary(&mut store, &entry);
        entries.push(entry);
        store.set(&key, &entries);
    }

    store.remove(&assessment::draft_key(today));
    persist_store(&state.data_path, &store).await?;

    Ok(Json(json!({
        "submitted": true,
        "message": "השאלון נשלח בהצלחה! המשקל עודכן במסך המשקל. תודה על השתתפותך."
    })))
}

/// Writes to the timestamped outbox, independent of the week-keyed
/// submission path; only the weight field is required.
pub async fn send_to_nutritionist(
    State(state): State<AppState>,
    Json(request): Json<DraftRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let mut answers = request.answers;
    let now = Local::now();
    assessment::ensure_date(&mut answers, now.date_naive());

    let has_weight = answers
        .daily_weight
        .as_deref()
        .map(|raw| !raw.trim().is_empty())
        .unwrap_or(false);
    if !has_weight {
        return Err(AppError::bad_request(
            "יש להזין לפחות את המשקל לפני שליחה לתזונאית",
        ));
    }

    let record = assessment::outbox_record(answers, now);
    let mut store = state.store.lock().await;
    store.set(format!("to_nutritionist_{}", now.timestamp_millis()), &record);
    persist_store(&state.data_path, &store).await?;

    Ok(Json(json!({
        "sent": true,
        "message": "השאלון נשלח בהצלחה לתזונאית! היא תקבל את המידע ותוכל לפנות אליך."
    })))
}

// ---- athlete chat ----

fn availability_view(availability: &Availability) -> AvailabilityView {
    AvailabilityView {
        online: availability.online,
        label: availability.label.clone(),
        working_hours: chat::WORKING_HOURS.to_string(),
        last_seen: availability.last_seen.clone(),
    }
}

async fn chat_view(state: &AppState) -> Result<ChatView, AppError> {
    let thread_key = chat::athlete_thread_key();
    let now = Local::now();

    let mut store = state.store.lock().await;
    let mut messages: Vec<ChatMessage> = store.get(&thread_key);
    let mut dirty = false;

    if messages.is_empty() {
        messages = chat::welcome_messages(now);
        dirty = true;
    }

    // Loading the athlete view marks nutritionist-authored messages read.
    for message in &mut messages {
        if message.from == Sender::Nutritionist && message.status != MessageStatus::Read {
            message.advance_status(MessageStatus::Read);
            message.read = true;
            dirty = true;
        }
    }

    if dirty {
        store.set(&thread_key, &messages);
        persist_store(&state.data_path, &store).await?;
    }
    drop(store);

    let typing = state.typing.lock().await.contains(&thread_key);
    let availability = state.availability.lock().await.clone();

    Ok(ChatView {
        messages,
        typing,
        status: availability_view(&availability),
        quick_messages: chat::QUICK_MESSAGES.iter().map(|m| m.to_string()).collect(),
    })
}

pub async fn get_chat_messages(State(state): State<AppState>) -> Result<Json<ChatView>, AppError> {
    Ok(Json(chat_view(&state).await?))
}

pub async fn get_chat_status(State(state): State<AppState>) -> Json<AvailabilityView> {
    let availability = state.availability.lock().await.clone();
    Json(availability_view(&availability))
}

async fn append_message(
    state: &AppState,
    thread_key: &str,
    message: &ChatMessage,
    seed: Option<Vec<ChatMessage>>,
) -> Result<(), AppError> {
    let mut store = state.store.lock().await;
    let mut messages: Vec<ChatMessage> = store.get(thread_key);
    if messages.is_empty() {
        if let Some(seeded) = seed {
            messages = seeded;
        }
    }
    messages.push(message.clone());
    store.set(thread_key, &messages);
    persist_store(&state.data_path, &store).await
}

async fn mark_delivered(state: &AppState, thread_key: &str, message_id: i64) -> Result<(), AppError> {
    let mut store = state.store.lock().await;
    let mut messages: Vec<ChatMessage> = store.get(thread_key);
    if let Some(message) = messages.iter_mut().find(|message| message.id == message_id) {
        message.advance_status(MessageStatus::Delivered);
    }
    store.set(thread_key, &messages);
    persist_store(&state.data_path, &store).await
}

async fn sweep_read(state: &AppState, thread_key: &str, author: Sender) -> Result<(), AppError> {
    let mut store = state.store.lock().await;
    let mut messages: Vec<ChatMessage> = store.get(thread_key);
    for message in &mut messages {
        if message.from == author {
            message.advance_status(MessageStatus::Read);
            message.read = true;
        }
    }
    store.set(thread_key, &messages);
    persist_store(&state.data_path, &store).await
}

/// The just-sent message flips to delivered about a second later. One task
/// per message so rapid sends do not supersede each other.
fn schedule_delivery(state: &AppState, thread_key: String, message_id: i64, surface: &str) {
    let task_key = format!("chat:{surface}:deliver:{message_id}");
    let task_state = state.clone();
    let handle = tokio::spawn(async move {
        tokio::time::sleep(chat::DELIVER_DELAY).await;
        if let Err(err) = mark_delivered(&task_state, &thread_key, message_id).await {
            error!("delivery flip failed: {}", err.message);
        }
    });
    state.tasks.replace(task_key, handle);
}

struct ReplyPlan {
    thread_key: String,
    task_key: String,
    from: Sender,
    content: String,
    urgent: bool,
    read_sweep: Option<Sender>,
}

/// Simulate the counterpart: wait, show typing, wait again, land the
/// reply. A newer outgoing message on the same thread supersedes any
/// pending reply.
fn schedule_reply(state: &AppState, plan: ReplyPlan, typing_after: Duration, typing_for: Duration) {
    let ReplyPlan {
        thread_key,
        task_key,
        from,
        content,
        urgent,
        read_sweep,
    } = plan;
    let task_state = state.clone();
    let handle = tokio::spawn(async move {
        tokio::time::sleep(typing_after).await;
        task_state.typing.lock().await.insert(thread_key.clone());
        tokio::time::sleep(typing_for).await;
        task_state.typing.lock().await.remove(&thread_key);

        let now = Local::now();
        let mut reply = chat::message_at(now.timestamp_millis(), from, content, now);
        reply.status = MessageStatus::Delivered;
        reply.urgent = urgent;
        if let Err(err) = append_message(&task_state, &thread_key, &reply, None).await {
            error!("simulated reply failed: {}", err.message);
            return;
        }

        if let Some(author) = read_sweep {
            tokio::time::sleep(chat::READ_SWEEP_DELAY).await;
            if let Err(err) = sweep_read(&task_state, &thread_key, author).await {
                error!("read sweep failed: {}", err.message);
            }
        }
    });
    state.tasks.replace(task_key, handle);
}

pub async fn send_chat_message(
    State(state): State<AppState>,
    Json(request): Json<ChatSendRequest>,
) -> Result<Json<ChatMessage>, AppError> {
    let content = request.content.trim().to_string();
    if content.is_empty() {
        return Err(AppError::bad_request("אין תוכן לשליחה"));
    }

    let now = Local::now();
    let message = chat::message_at(now.timestamp_millis(), Sender::Athlete, content.clone(), now);
    let thread_key = chat::athlete_thread_key();
    // Seed ids sit before the outgoing message's id so the delivery flip
    // cannot pick up a welcome message instead.
    let seed = chat::welcome_messages(now - chrono::Duration::milliseconds(10));
    append_message(&state, &thread_key, &message, Some(seed)).await?;

    schedule_delivery(&state, thread_key.clone(), message.id, "athlete");

    let (typing_after, typing_for) = chat::reply_delays(&mut rand::thread_rng());
    let pick = rand::thread_rng().gen_range(0..chat::ATHLETE_GENERIC_REPLIES.len());
    let reply = chat::reply_content(
        chat::ATHLETE_RULES,
        &chat::ATHLETE_GENERIC_REPLIES,
        &content,
        pick,
    );
    schedule_reply(
        &state,
        ReplyPlan {
            thread_key,
            task_key: "chat:athlete:reply".to_string(),
            from: Sender::Nutritionist,
            content: reply.to_string(),
            urgent: chat::is_urgent(&content),
            read_sweep: Some(Sender::Nutritionist),
        },
        typing_after,
        typing_for,
    );

    Ok(Json(message))
}

// ---- nutritionist console ----

async fn seed_console_threads(state: &AppState) -> Result<(), AppError> {
    let now = Local::now();
    let mut store = state.store.lock().await;
    let mut dirty = false;
    for profile in chat::roster() {
        let key = chat::console_thread_key(profile.id);
        let messages: Vec<ChatMessage> = store.get(&key);
        if messages.is_empty() {
            store.set(&key, &chat::demo_thread(&profile, now));
            dirty = true;
        }
    }
    if dirty {
        persist_store(&state.data_path, &store).await?;
    }
    Ok(())
}

pub async fn get_console_athletes(
    State(state): State<AppState>,
) -> Result<Json<ConsoleView>, AppError> {
    seed_console_threads(&state).await?;

    let store = state.store.lock().await;
    let athletes = chat::roster()
        .into_iter()
        .map(|profile| {
            let messages: Vec<ChatMessage> = store.get(&chat::console_thread_key(profile.id));
            let unread = messages
                .iter()
                .filter(|message| message.from == Sender::Athlete && !message.read)
                .count();
            let has_urgent = messages
                .iter()
                .any(|message| message.urgent && message.from == Sender::Athlete && !message.read);
            ConsoleAthlete {
                profile,
                unread,
                has_urgent,
                last_message: messages.last().cloned(),
            }
        })
        .collect();
    drop(store);

    let availability = state.availability.lock().await.clone();
    Ok(Json(ConsoleView {
        athletes,
        templates: chat::MESSAGE_TEMPLATES.iter().map(|t| t.to_string()).collect(),
        status: availability_view(&availability),
    }))
}

pub async fn get_console_thread(
    State(state): State<AppState>,
    Path(athlete_id): Path<String>,
) -> Result<Json<ConsoleThreadView>, AppError> {
    let profile = chat::roster_profile(&athlete_id)
        .ok_or_else(|| AppError::not_found("ספורטאי לא נמצא"))?;
    let thread_key = chat::console_thread_key(&athlete_id);
    let now = Local::now();

    let mut store = state.store.lock().await;
    let mut messages: Vec<ChatMessage> = store.get(&thread_key);
    let mut dirty = false;
    if messages.is_empty() {
        messages = chat::demo_thread(&profile, now);
        dirty = true;
    }

    // Opening a thread marks the athlete's incoming messages read.
    for message in &mut messages {
        if message.from == Sender::Athlete && !message.read {
            message.advance_status(MessageStatus::Read);
            message.read = true;
            dirty = true;
        }
    }
    if dirty {
        store.set(&thread_key, &messages);
        persist_store(&state.data_path, &store).await?;
    }
    drop(store);

    let typing = state.typing.lock().await.contains(&thread_key);
    Ok(Json(ConsoleThreadView {
        profile,
        messages,
        typing,
        templates: chat::MESSAGE_TEMPLATES.iter().map(|t| t.to_string()).collect(),
    }))
}

pub async fn send_console_message(
    State(state): State<AppState>,
    Path(athlete_id): Path<String>,
    Json(request): Json<ChatSendRequest>,
) -> Result<Json<ChatMessage>, AppError> {
    let profile = chat::roster_profile(&athlete_id)
        .ok_or_else(|| AppError::not_found("ספורטאי לא נמצא"))?;
    let content = request.content.trim().to_string();
    if content.is_empty() {
        return Err(AppError::bad_request("אין תוכן לשליחה"));
    }

    let now = Local::now();
    let message =
        chat::message_at(now.timestamp_millis(), Sender::Nutritionist, content.clone(), now);
    let thread_key = chat::console_thread_key(&athlete_id);
    append_message(
        &state,
        &thread_key,
        &message,
        Some(chat::demo_thread(&profile, now)),
    )
    .await?;

    schedule_delivery(&state, thread_key.clone(), message.id, "console");

    let (typing_after, typing_for) = chat::reply_delays(&mut rand::thread_rng());
    let pick = rand::thread_rng().gen_range(0..chat::CONSOLE_GENERIC_REPLIES.len());
    let reply = chat::reply_content(
        chat::CONSOLE_RULES,
        &chat::CONSOLE_GENERIC_REPLIES,
        &content,
        pick,
    );
    schedule_reply(
        &state,
        ReplyPlan {
            thread_key,
            task_key: format!("chat:console:reply:{athlete_id}"),
            from: Sender::Athlete,
            content: reply.to_string(),
            urgent: false,
            read_sweep: None,
        },
        typing_after,
        typing_for,
    );

    Ok(Json(message))
}

pub async fn set_console_status(
    State(state): State<AppState>,
    Json(request): Json<StatusRequest>,
) -> Json<AvailabilityView> {
    let mut availability = state.availability.lock().await;
    availability.label = request.status.clone();
    availability.online = request.status != "לא זמינה";
    availability.last_seen = Local::now().to_rfc3339();
    Json(availability_view(&availability))
}
