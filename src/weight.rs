use crate::models::{AlertLevel, ChartData, SmartAlert, WeightEntry};
use chrono::{DateTime, Duration, Local, NaiveDate};
use rand::Rng;

/// Competition target weight for the demo athlete.
pub const TARGET_WEIGHT: f64 = 66.0;

const MIN_WEIGHT: f64 = 30.0;
const MAX_WEIGHT: f64 = 250.0;

/// Validate a weight-entry request. Both the weight and a time-of-day label
/// are required; violations surface as a user-facing message and nothing is
/// persisted.
pub fn validate_entry(
    weight: Option<f64>,
    time: Option<&str>,
) -> Result<(f64, String), &'static str> {
    let weight = weight.ok_or("אנא מלא את כל השדות הנדרשים")?;
    let time = time
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or("אנא מלא את כל השדות הנדרשים")?;
    if !weight.is_finite() || !(MIN_WEIGHT..=MAX_WEIGHT).contains(&weight) {
        return Err("משקל לא תקין");
    }
    Ok((weight, time.to_string()))
}

pub fn entry_at(
    weight: f64,
    time: String,
    notes: Option<String>,
    source: Option<String>,
    now: DateTime<Local>,
) -> WeightEntry {
    WeightEntry {
        weight,
        time,
        notes: notes.filter(|n| !n.trim().is_empty()),
        timestamp: now.to_rfc3339(),
        date: now.date_naive().format("%Y-%m-%d").to_string(),
        source,
    }
}

/// The displayed "current weight" is always the last-appended entry,
/// regardless of its date relative to other entries.
pub fn current_weight(entries: &[WeightEntry]) -> Option<f64> {
    entries.last().map(|entry| entry.weight)
}

/// Derive a smart alert from the two most recent entries. All thresholds
/// are strict; the significant-change check wins over the others.
pub fn smart_alert(entries: &[WeightEntry], target: f64) -> Option<SmartAlert> {
    if entries.len() < 2 {
        return None;
    }
    let latest = &entries[entries.len() - 1];
    let previous = &entries[entries.len() - 2];
    let change = latest.weight - previous.weight;

    if change.abs() > 1.0 {
        return Some(SmartAlert {
            level: AlertLevel::Warning,
            message: format!("שים לב: שינוי משמעותי במשקל ({change:+.1} ק\"ג)"),
        });
    }
    if change > 0.5 && latest.weight > target {
        return Some(SmartAlert {
            level: AlertLevel::Danger,
            message: "עליה במשקל - כדאי לשקול התאמת התזונה".to_string(),
        });
    }
    if change < -0.3 {
        return Some(SmartAlert {
            level: AlertLevel::Success,
            message: "כל הכבוד! ירידה במשקל - ממשיכים כך!".to_string(),
        });
    }
    None
}

/// Percentage of the way from the first recorded weight to the target,
/// clamped to 0..=100. No history reads as no progress.
pub fn progress_percent(entries: &[WeightEntry], target: f64) -> f64 {
    let (Some(first), Some(last)) = (entries.first(), entries.last()) else {
        return 0.0;
    };
    let total = first.weight - target;
    if total <= 0.0 {
        return if last.weight <= target { 100.0 } else { 0.0 };
    }
    (((first.weight - last.weight) / total) * 100.0).clamp(0.0, 100.0)
}

/// Build the chart series for a window of `days` calendar days ending
/// `today`: one label per day in ascending order, the day's recorded weight
/// or `None` as a gap, and a constant target line alongside.
pub fn chart_window(entries: &[WeightEntry], days: usize, today: NaiveDate) -> ChartData {
    let mut labels = Vec::with_capacity(days);
    let mut weights = Vec::with_capacity(days);
    let mut targets = Vec::with_capacity(days);

    for offset in (0..days).rev() {
        let date = today - Duration::days(offset as i64);
        let key = date.format("%Y-%m-%d").to_string();
        labels.push(date.format("%d/%m").to_string());
        weights.push(
            entries
                .iter()
                .find(|entry| entry.date == key)
                .map(|entry| entry.weight),
        );
        targets.push(TARGET_WEIGHT);
    }

    ChartData {
        labels,
        weights,
        targets,
    }
}

/// Demo scaffolding: when an athlete has no history, seed a strictly
/// descending 14-day series with small random daily deltas.
pub fn sample_series_at<R: Rng>(today: NaiveDate, rng: &mut R) -> Vec<WeightEntry> {
    let mut series = Vec::with_capacity(14);
    let mut weight = 70.5f64;

    for offset in (0..14).rev() {
        let date = today - Duration::days(offset);
        weight -= rng.gen_range(0.1..0.4);
        weight = (weight * 10.0).round() / 10.0;
        let date_key = date.format("%Y-%m-%d").to_string();
        series.push(WeightEntry {
            weight,
            time: "לפני ארוחת בוקר".to_string(),
            notes: None,
            timestamp: format!("{date_key}T08:00:00+03:00"),
            date: date_key,
            source: None,
        });
    }

    series
}

pub fn sample_series(today: NaiveDate) -> Vec<WeightEntry> {
    sample_series_at(today, &mut rand::thread_rng())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn entry(date: &str, weight: f64) -> WeightEntry {
        WeightEntry {
            weight,
            time: "בוקר".to_string(),
            notes: None,
            timestamp: format!("{date}T07:30:00+03:00"),
            date: date.to_string(),
            source: None,
        }
    }

    #[test]
    fn current_weight_is_last_appended_regardless_of_date() {
        let entries = vec![entry("2026-08-05", 69.0), entry("2026-08-01", 70.2)];
        assert_eq!(current_weight(&entries), Some(70.2));
    }

    #[test]
    fn validation_requires_weight_and_time() {
        assert!(validate_entry(None, Some("בוקר")).is_err());
        assert!(validate_entry(Some(68.0), None).is_err());
        assert!(validate_entry(Some(68.0), Some("  ")).is_err());
        assert!(validate_entry(Some(500.0), Some("בוקר")).is_err());
        let (weight, time) = validate_entry(Some(68.0), Some("ערב")).unwrap();
        assert_eq!(weight, 68.0);
        assert_eq!(time, "ערב");
    }

    #[test]
    fn significant_change_takes_precedence() {
        let entries = vec![entry("2026-08-05", 70.0), entry("2026-08-06", 68.9)];
        let alert = smart_alert(&entries, TARGET_WEIGHT).expect("alert expected");
        assert_eq!(alert.level, AlertLevel::Warning);
    }

    #[test]
    fn small_change_yields_no_alert() {
        let entries = vec![entry("2026-08-05", 70.0), entry("2026-08-06", 69.8)];
        assert!(smart_alert(&entries, TARGET_WEIGHT).is_none());
    }

    #[test]
    fn thresholds_are_strict() {
        // Exactly -0.3 fails the strict check.
        let entries = vec![entry("2026-08-05", 70.0), entry("2026-08-06", 69.7)];
        assert!(smart_alert(&entries, TARGET_WEIGHT).is_none());
    }

    #[test]
    fn steady_loss_is_good_progress() {
        let entries = vec![entry("2026-08-05", 70.0), entry("2026-08-06", 69.6)];
        let alert = smart_alert(&entries, TARGET_WEIGHT).expect("alert expected");
        assert_eq!(alert.level, AlertLevel::Success);
    }

    #[test]
    fn gaining_above_target_warns() {
        let entries = vec![entry("2026-08-05", 66.2), entry("2026-08-06", 67.0)];
        let alert = smart_alert(&entries, TARGET_WEIGHT).expect("alert expected");
        assert_eq!(alert.level, AlertLevel::Danger);
    }

    #[test]
    fn single_entry_yields_no_alert() {
        let entries = vec![entry("2026-08-06", 70.0)];
        assert!(smart_alert(&entries, TARGET_WEIGHT).is_none());
    }

    #[test]
    fn chart_window_has_one_point_per_day_with_gaps() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
        let entries = vec![entry("2026-08-04", 69.2), entry("2026-08-06", 69.0)];

        let chart = chart_window(&entries, 7, today);
        assert_eq!(chart.labels.len(), 7);
        assert_eq!(chart.weights.len(), 7);
        assert_eq!(chart.targets.len(), 7);

        // Ascending window ending today.
        assert_eq!(chart.labels[0], "31/07");
        assert_eq!(chart.labels[6], "06/08");

        // Days without an entry are gaps, not zeros.
        assert_eq!(chart.weights[4], Some(69.2));
        assert_eq!(chart.weights[5], None);
        assert_eq!(chart.weights[6], Some(69.0));
        assert!(chart.targets.iter().all(|t| *t == TARGET_WEIGHT));
    }

    #[test]
    fn same_day_duplicates_chart_first_recorded_value() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
        let entries = vec![entry("2026-08-06", 69.4), entry("2026-08-06", 69.0)];

        let chart = chart_window(&entries, 1, today);
        assert_eq!(chart.weights, vec![Some(69.4)]);
        // The current-weight card still reflects the last append.
        assert_eq!(current_weight(&entries), Some(69.0));
    }

    #[test]
    fn sample_series_is_strictly_descending() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let series = sample_series_at(today, &mut rng);

        assert_eq!(series.len(), 14);
        assert_eq!(series.last().unwrap().date, "2026-08-06");
        for pair in series.windows(2) {
            assert!(pair[1].weight < pair[0].weight);
            let delta = pair[0].weight - pair[1].weight;
            assert!(delta < 0.5, "daily delta stays bounded, got {delta}");
        }
    }

    #[test]
    fn progress_percent_tracks_distance_to_target() {
        let entries = vec![entry("2026-08-01", 70.0), entry("2026-08-06", 68.0)];
        let percent = progress_percent(&entries, TARGET_WEIGHT);
        assert!((percent - 50.0).abs() < 1e-9);
        assert_eq!(progress_percent(&[], TARGET_WEIGHT), 0.0);
    }
}
