use crate::models::{AssessmentAnswers, AssessmentRecord, ProgressReport};
use chrono::{DateTime, Datelike, Duration, Local, NaiveDate};

/// Fixed total the progress bar divides by.
pub const FIELD_COUNT: u32 = 14;
/// Soft gate: the submit button unlocks at this completion percentage,
/// independently of the hard required-field validation below.
pub const SUBMIT_THRESHOLD: f64 = 85.0;

pub fn draft_key(date: NaiveDate) -> String {
    format!("questionnaire_draft_{}", week_key(date))
}

pub fn completed_key(date: NaiveDate) -> String {
    format!("questionnaire_completed_{}", week_key(date))
}

/// ISO year + week number, e.g. `2026_week_32`.
pub fn week_key(date: NaiveDate) -> String {
    let iso = date.iso_week();
    format!("{}_week_{}", iso.year(), iso.week())
}

/// Human week descriptor, Sunday through Saturday around `date`.
pub fn week_label(date: NaiveDate) -> String {
    let start = date - Duration::days(date.weekday().num_days_from_sunday() as i64);
    let end = start + Duration::days(6);
    format!("{} - {}", start.format("%d/%m"), end.format("%d/%m"))
}

/// Month-stamped flag key gating the cycle-tracking question to one
/// appearance per calendar month.
pub fn month_flag_key(date: NaiveDate) -> String {
    format!("menstrual_shown_{}_{}", date.year(), date.month())
}

fn filled(value: &Option<String>) -> bool {
    value
        .as_deref()
        .map(|v| !v.trim().is_empty())
        .unwrap_or(false)
}

/// The date field is auto-filled with today when the form loads, so a blank
/// draft still counts it.
pub fn ensure_date(answers: &mut AssessmentAnswers, today: NaiveDate) {
    if !filled(&answers.assessment_date) {
        answers.assessment_date = Some(today.format("%Y-%m-%d").to_string());
    }
}

/// Per-field completeness, indexed 0..=13. Optional fields always count as
/// satisfied; the cycle question only requires an answer while its
/// applicability checkbox is set; the sleep-times field needs both ends.
fn field_satisfied(answers: &AssessmentAnswers, index: u32) -> bool {
    match index {
        0 => filled(&answers.assessment_date),
        1 => filled(&answers.daily_weight),
        2 => filled(&answers.sleep_hours),
        3 => filled(&answers.sleep_quality),
        4 => filled(&answers.sleep_time) && filled(&answers.wake_time),
        5 => filled(&answers.appetite),
        6 => filled(&answers.water_intake),
        7 => true,
        8 => !answers.menstrual_applicable || filled(&answers.menstrual_cycle),
        9 => true,
        10 => filled(&answers.mood),
        11 => filled(&answers.energy),
        12 => filled(&answers.recovery),
        13 => true,
        _ => false,
    }
}

pub fn progress(answers: &AssessmentAnswers) -> ProgressReport {
    let satisfied = (0..FIELD_COUNT)
        .filter(|index| field_satisfied(answers, *index))
        .count() as u32;
    let percent = f64::from(satisfied) / f64::from(FIELD_COUNT) * 100.0;
    ProgressReport {
        satisfied,
        total: FIELD_COUNT,
        percent,
        submit_enabled: percent >= SUBMIT_THRESHOLD,
    }
}

/// Hard-required fields checked at submit time, regardless of the progress
/// percentage.
pub fn missing_required(answers: &AssessmentAnswers) -> Vec<&'static str> {
    let checks: [(&'static str, bool); 10] = [
        ("daily_weight", filled(&answers.daily_weight)),
        ("sleep_hours", filled(&answers.sleep_hours)),
        ("sleep_quality", filled(&answers.sleep_quality)),
        ("sleep_time", filled(&answers.sleep_time)),
        ("wake_time", filled(&answers.wake_time)),
        ("appetite", filled(&answers.appetite)),
        ("water_intake", filled(&answers.water_intake)),
        ("mood", filled(&answers.mood)),
        ("energy", filled(&answers.energy)),
        ("recovery", filled(&answers.recovery)),
    ];
    checks
        .into_iter()
        .filter_map(|(name, ok)| (!ok).then_some(name))
        .collect()
}

pub fn draft_record(answers: AssessmentAnswers, now: DateTime<Local>) -> AssessmentRecord {
    AssessmentRecord {
        timestamp: now.to_rfc3339(),
        week: week_label(now.date_naive()),
        answers,
        status: None,
        submitted_at: None,
        sent_at: None,
    }
}

pub fn submitted_record(answers: AssessmentAnswers, now: DateTime<Local>) -> AssessmentRecord {
    AssessmentRecord {
        timestamp: now.to_rfc3339(),
        week: week_label(now.date_naive()),
        answers,
        status: Some("completed".to_string()),
        submitted_at: Some(now.to_rfc3339()),
        sent_at: None,
    }
}

/// Snapshot written to the timestamped outbox by the "send to nutritionist"
/// action; independent of the week-keyed submission path.
pub fn outbox_record(answers: AssessmentAnswers, now: DateTime<Local>) -> AssessmentRecord {
    AssessmentRecord {
        timestamp: now.to_rfc3339(),
        week: week_label(now.date_naive()),
        answers,
        status: None,
        submitted_at: None,
        sent_at: Some(now.to_rfc3339()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HealthIssue;
    use crate::storage::Store;

    fn required_filled() -> AssessmentAnswers {
        AssessmentAnswers {
            assessment_date: Some("2026-08-06".to_string()),
            daily_weight: Some("68.2".to_string()),
            sleep_hours: Some("7-8".to_string()),
            sleep_quality: Some("4".to_string()),
            sleep_time: Some("23:30".to_string()),
            wake_time: Some("07:00".to_string()),
            appetite: Some("3".to_string()),
            water_intake: Some("2.5".to_string()),
            mood: Some("4".to_string()),
            energy: Some("3".to_string()),
            recovery: Some("4".to_string()),
            ..AssessmentAnswers::default()
        }
    }

    #[test]
    fn all_required_filled_reports_full_progress() {
        let report = progress(&required_filled());
        assert_eq!(report.satisfied, 14);
        assert_eq!(report.percent, 100.0);
        assert!(report.submit_enabled);
    }

    #[test]
    fn one_required_blank_still_passes_soft_gate() {
        let mut answers = required_filled();
        answers.mood = None;

        let report = progress(&answers);
        assert_eq!(report.satisfied, 13);
        assert!((report.percent - 92.857).abs() < 0.01);
        assert!(report.submit_enabled, "soft gate allows 13/14");
        // ...but the hard validation still rejects it.
        assert_eq!(missing_required(&answers), vec!["mood"]);
    }

    #[test]
    fn cycle_question_only_required_when_applicable() {
        let mut answers = required_filled();
        answers.menstrual_applicable = true;
        assert_eq!(progress(&answers).satisfied, 13);

        answers.menstrual_cycle = Some("regular".to_string());
        assert_eq!(progress(&answers).satisfied, 14);
    }

    #[test]
    fn sleep_times_require_both_ends() {
        let mut answers = required_filled();
        answers.wake_time = None;
        assert_eq!(progress(&answers).satisfied, 13);
        assert!(missing_required(&answers).contains(&"wake_time"));
    }

    #[test]
    fn submit_rejected_when_required_field_empty() {
        let mut answers = required_filled();
        answers.water_intake = Some("   ".to_string());
        let missing = missing_required(&answers);
        assert_eq!(missing, vec!["water_intake"]);
    }

    #[test]
    fn date_field_is_auto_filled() {
        let mut answers = AssessmentAnswers::default();
        ensure_date(&mut answers, NaiveDate::from_ymd_opt(2026, 8, 6).unwrap());
        assert_eq!(answers.assessment_date.as_deref(), Some("2026-08-06"));

        answers.assessment_date = Some("2026-08-01".to_string());
        ensure_date(&mut answers, NaiveDate::from_ymd_opt(2026, 8, 6).unwrap());
        assert_eq!(answers.assessment_date.as_deref(), Some("2026-08-01"));
    }

    #[test]
    fn week_keys_use_iso_week() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        assert_eq!(week_key(date), "2026_week_2");
        assert_eq!(draft_key(date), "questionnaire_draft_2026_week_2");
        assert_eq!(completed_key(date), "questionnaire_completed_2026_week_2");
    }

    #[test]
    fn week_label_runs_sunday_to_saturday() {
        // 2026-08-06 is a Thursday; the surrounding week is 02/08 - 08/08.
        let date = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
        assert_eq!(week_label(date), "02/08 - 08/08");
    }

    #[test]
    fn month_flag_key_is_month_stamped() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
        assert_eq!(month_flag_key(date), "menstrual_shown_2026_8");
    }

    #[test]
    fn draft_round_trips_through_the_store() {
        let mut answers = required_filled();
        answers.supplements = vec!["magnesium".to_string(), "omega3".to_string()];
        answers.health_issues = vec![HealthIssue {
            kind: "injury".to_string(),
            detail: Some("כאב בברך".to_string()),
        }];
        answers.additional_notes = Some("שבוע עמוס".to_string());

        let record = draft_record(answers.clone(), Local::now());
        let mut store = Store::default();
        let key = draft_key(NaiveDate::from_ymd_opt(2026, 8, 6).unwrap());
        store.set(&key, &record);

        let loaded: Option<AssessmentRecord> = store.get(&key);
        let loaded = loaded.expect("draft present");
        assert_eq!(loaded.answers.daily_weight, answers.daily_weight);
        assert_eq!(loaded.answers.supplements, answers.supplements);
        assert_eq!(loaded.answers.sleep_time, answers.sleep_time);
        assert_eq!(loaded.answers.health_issues[0].kind, "injury");
        assert_eq!(
            loaded.answers.health_issues[0].detail.as_deref(),
            Some("כאב בברך")
        );
        assert_eq!(loaded.answers.additional_notes, answers.additional_notes);
    }
}
