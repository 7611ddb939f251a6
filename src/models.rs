use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::tabs::Tab;

/// One weight measurement. Entries are append-only per athlete; the last
/// element of the list is the "current weight" regardless of its date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightEntry {
    pub weight: f64,
    pub time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub timestamp: String,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Per-athlete summary record kept alongside the entry list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightSummary {
    pub entries: BTreeMap<String, SummaryEntry>,
    pub latest_weight: Option<f64>,
    pub target_weight: f64,
    pub last_updated: Option<String>,
}

impl Default for WeightSummary {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
            latest_weight: None,
            target_weight: crate::weight::TARGET_WEIGHT,
            last_updated: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryEntry {
    pub weight: f64,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WeightRequest {
    pub weight: Option<f64>,
    pub time: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Warning,
    Danger,
    Success,
}

/// Advisory derived from the two most recent weight entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmartAlert {
    pub level: AlertLevel,
    pub message: String,
}

/// Chart series for an N-day window ending today. Days without an entry
/// carry `null`, never zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub weights: Vec<Option<f64>>,
    pub targets: Vec<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeightView {
    pub current_weight: Option<f64>,
    pub target_weight: f64,
    pub difference: Option<f64>,
    pub progress_percent: f64,
    pub alert: Option<SmartAlert>,
    pub chart: ChartData,
}

/// Answers for the weekly assessment, shared by drafts and submissions.
/// Everything is optional so a partially filled form round-trips unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssessmentAnswers {
    #[serde(default)]
    pub assessment_date: Option<String>,
    #[serde(default)]
    pub daily_weight: Option<String>,
    #[serde(default)]
    pub sleep_hours: Option<String>,
    #[serde(default)]
    pub sleep_quality: Option<String>,
    #[serde(default)]
    pub sleep_time: Option<String>,
    #[serde(default)]
    pub wake_time: Option<String>,
    #[serde(default)]
    pub appetite: Option<String>,
    #[serde(default)]
    pub water_intake: Option<String>,
    #[serde(default)]
    pub water_unit: Option<String>,
    #[serde(default)]
    pub supplements: Vec<String>,
    #[serde(default)]
    pub menstrual_applicable: bool,
    #[serde(default)]
    pub menstrual_cycle: Option<String>,
    #[serde(default)]
    pub last_period_date: Option<String>,
    #[serde(default)]
    pub health_issues: Vec<HealthIssue>,
    #[serde(default)]
    pub mood: Option<String>,
    #[serde(default)]
    pub energy: Option<String>,
    #[serde(default)]
    pub recovery: Option<String>,
    #[serde(default)]
    pub additional_notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthIssue {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Stored assessment record, used for the week-keyed draft and submission
/// as well as the timestamped send-to-nutritionist outbox.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentRecord {
    pub timestamp: String,
    pub week: String,
    pub answers: AssessmentAnswers,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sent_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressReport {
    pub satisfied: u32,
    pub total: u32,
    pub percent: f64,
    pub submit_enabled: bool,
}

#[derive(Debug, Deserialize)]
pub struct DraftRequest {
    pub answers: AssessmentAnswers,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssessmentView {
    pub week_key: String,
    pub week_label: String,
    pub answers: AssessmentAnswers,
    pub progress: ProgressReport,
    pub submitted: bool,
    pub show_cycle_question: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    Athlete,
    Nutritionist,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Sent,
    Delivered,
    Read,
}

/// One chat message. `id` is creation-time epoch millis, monotonic-ish but
/// not guaranteed unique under clock skew. `status` only advances
/// sent -> delivered -> read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: i64,
    pub from: Sender,
    pub content: String,
    pub timestamp: String,
    pub status: MessageStatus,
    #[serde(default)]
    pub urgent: bool,
    #[serde(default)]
    pub read: bool,
}

impl ChatMessage {
    pub fn advance_status(&mut self, to: MessageStatus) {
        if to > self.status {
            self.status = to;
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatSendRequest {
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatView {
    pub messages: Vec<ChatMessage>,
    pub typing: bool,
    pub status: AvailabilityView,
    pub quick_messages: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AvailabilityView {
    pub online: bool,
    pub label: String,
    pub working_hours: String,
    pub last_seen: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

/// Demo roster entry for the nutritionist console.
#[derive(Debug, Clone, Serialize)]
pub struct AthleteProfile {
    pub id: &'static str,
    pub name: &'static str,
    pub age: u32,
    pub category: &'static str,
    pub days_to_competition: u32,
    pub avatar: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConsoleAthlete {
    #[serde(flatten)]
    pub profile: AthleteProfile,
    pub unread: usize,
    pub has_urgent: bool,
    pub last_message: Option<ChatMessage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConsoleView {
    pub athletes: Vec<ConsoleAthlete>,
    pub templates: Vec<String>,
    pub status: AvailabilityView,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConsoleThreadView {
    pub profile: AthleteProfile,
    pub messages: Vec<ChatMessage>,
    pub typing: bool,
    pub templates: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct TabSwitchRequest {
    pub tab: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TabView {
    pub tab: Tab,
    pub changed: bool,
    pub fade_out_ms: u64,
    pub settle_ms: u64,
    pub content: serde_json::Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct HomeTask {
    pub id: &'static str,
    pub title: &'static str,
    pub hint: &'static str,
    pub done: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct HomeView {
    pub athlete_name: &'static str,
    pub current_weight: Option<f64>,
    pub target_weight: f64,
    pub difference: Option<f64>,
    pub tasks: Vec<HomeTask>,
}
