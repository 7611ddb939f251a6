use crate::models::{AthleteProfile, ChatMessage, MessageStatus, Sender};
use chrono::{DateTime, Local, Timelike};
use rand::Rng;
use std::time::Duration;

/// Fixed demo identity backing the athlete-facing chat surface.
pub const ATHLETE_ID: &str = "demo_athlete_1";

pub const WORKING_HOURS: &str = "א-ה 8:00-18:00";

/// Delay before a just-sent message flips to delivered.
pub const DELIVER_DELAY: Duration = Duration::from_millis(1000);
/// Delay after a simulated reply before incoming messages sweep to read.
pub const READ_SWEEP_DELAY: Duration = Duration::from_millis(3000);

pub fn athlete_thread_key() -> String {
    format!("chat_messages_{ATHLETE_ID}")
}

pub fn console_thread_key(athlete_id: &str) -> String {
    format!("nutritionist_chat_{athlete_id}")
}

/// One entry in an ordered canned-reply rule list: the first rule whose any
/// keyword appears in the lowercased outgoing text wins; no match falls
/// through to the surface's generic replies, chosen uniformly at random.
pub struct ReplyRule {
    pub keywords: &'static [&'static str],
    pub reply: &'static str,
    pub urgent: bool,
}

pub const ATHLETE_RULES: &[ReplyRule] = &[
    ReplyRule {
        keywords: &["בעיה", "כאב", "לא טוב"],
        reply: "מצטערת לשמוע שיש בעיה. אנא פרט יותר על מה שאתה חווה, וננסה למצוא פתרון מתאים 🩺",
        urgent: true,
    },
    ReplyRule {
        keywords: &["תזונה", "אוכל", "ארוחה"],
        reply: "בוודאי! אני כאן לעזור עם כל נושא הקשור לתזונה. מה בדיוק מעניין אותך? 🥗",
        urgent: false,
    },
    ReplyRule {
        keywords: &["משקל", "שקילה"],
        reply: "נהדר שאתה עוקב אחרי המשקל! איך אתה מרגיש עם השינויים? יש משהו שמעניין אותך? ⚖️",
        urgent: false,
    },
    ReplyRule {
        keywords: &["תחרות", "הכנות"],
        reply: "מעולה! איך מתקדמות ההכנות? האם יש משהו ספציפי שנצטרך להתאים בתזונה? 🥇",
        urgent: false,
    },
];

pub const ATHLETE_GENERIC_REPLIES: [&str; 5] = [
    "תודה על העדכון! אני כאן אם יש עוד שאלות 👍",
    "מצוין! אתה עושה עבודה נהדרת 🌟",
    "המשך כך! אני רואה התקדמות יפה 💪",
    "אם יש לך עוד שאלות, אני כאן לעזור 😊",
    "נשמע טוב! איך אתה מרגיש באופן כללי?",
];

pub const CONSOLE_RULES: &[ReplyRule] = &[
    ReplyRule {
        keywords: &["תמונה", "ארוחה"],
        reply: "בסדר, אשלח תמונה של הארוחה הבאה 📸",
        urgent: false,
    },
    ReplyRule {
        keywords: &["פגישה", "שיחה"],
        reply: "כן, בוא נתאם! מתי נוח לך השבוע?",
        urgent: false,
    },
    ReplyRule {
        keywords: &["מים", "שתיה"],
        reply: "כן, אני משתדל לשתות הרבה מים. תודה על התזכורת! 💧",
        urgent: false,
    },
    ReplyRule {
        keywords: &["התקדמות", "כיוון"],
        reply: "תודה! אני מרגיש שאני משתפר. יש לי עוד שאלות על התזונה לפני האימון",
        urgent: false,
    },
];

pub const CONSOLE_GENERIC_REPLIES: [&str; 5] = [
    "תודה על המשוב! זה מאוד עזר לי",
    "מעולה, אני אמשיך כך 👍",
    "יש לי עוד שאלות, אפשר לדבר?",
    "אני מרגיש טוב עם השינויים החדשים",
    "תודה על התמיכה! זה ממש חשוב לי",
];

const URGENT_KEYWORDS: [&str; 8] = [
    "בעיה", "כאב", "חרב", "דחוף", "עזרה", "רע", "לא טוב", "בהול",
];

pub const QUICK_MESSAGES: [&str; 6] = [
    "איך אני במסלול?",
    "יש לי שאלה על התזונה",
    "דיווח על בעיה",
    "בקשה לשיחה",
    "מה לאכול לפני האימון?",
    "איך אני בהכנות לתחרות?",
];

pub const MESSAGE_TEMPLATES: [&str; 8] = [
    "המשך בתוכנית שלך, אתה בכיוון הנכון! 👍",
    "בוא נתאם פגישה השבוע לבדיקת התקדמות",
    "שלח לי תמונה של הארוחה הבאה שלך 📸",
    "זכור לשתות הרבה מים היום 💧",
    "איך אתה מרגיש עם השינויים בתזונה?",
    "הנתונים נראים מעולים! כל הכבוד 🌟",
    "יש לי כמה הצעות לשיפור - בוא נדבר",
    "זמן לעדכון משקל ומדידות",
];

pub fn match_rule<'a>(rules: &'a [ReplyRule], text: &str) -> Option<&'a ReplyRule> {
    let lowered = text.to_lowercase();
    rules
        .iter()
        .find(|rule| rule.keywords.iter().any(|keyword| lowered.contains(keyword)))
}

/// Resolve the reply content for an outgoing message; `pick` indexes the
/// generic pool when no rule matches.
pub fn reply_content(
    rules: &[ReplyRule],
    generic: &[&'static str],
    text: &str,
    pick: usize,
) -> &'static str {
    match match_rule(rules, text) {
        Some(rule) => rule.reply,
        None => generic[pick % generic.len()],
    }
}

/// Urgency of a reply derives from the triggering message, not from the
/// replier's intent.
pub fn is_urgent(text: &str) -> bool {
    let lowered = text.to_lowercase();
    URGENT_KEYWORDS
        .iter()
        .any(|keyword| lowered.contains(keyword))
}

/// sent -> "✓", delivered and read -> "✓✓"; read is distinguished only by
/// the console's unread label.
pub fn status_icon(status: MessageStatus) -> &'static str {
    match status {
        MessageStatus::Sent => "✓",
        MessageStatus::Delivered => "✓✓",
        MessageStatus::Read => "✓✓",
    }
}

/// Randomized pacing of the simulated counterpart: how long until the
/// typing indicator shows, then how long it types before the reply lands.
pub fn reply_delays<R: Rng>(rng: &mut R) -> (Duration, Duration) {
    let typing_after = rng.gen_range(1500..3500);
    let typing_for = rng.gen_range(2000..3500);
    (
        Duration::from_millis(typing_after),
        Duration::from_millis(typing_for),
    )
}

pub fn message_at(id: i64, from: Sender, content: impl Into<String>, now: DateTime<Local>) -> ChatMessage {
    ChatMessage {
        id,
        from,
        content: content.into(),
        timestamp: now.to_rfc3339(),
        status: MessageStatus::Sent,
        urgent: false,
        read: from == Sender::Nutritionist,
    }
}

/// Seed for an empty athlete-side thread.
pub fn welcome_messages(now: DateTime<Local>) -> Vec<ChatMessage> {
    let base = now.timestamp_millis();
    vec![
        ChatMessage {
            id: base,
            from: Sender::Nutritionist,
            content: "שלום דני! ברוך הבא למערכת המעקב התזונתי המתקדמת 🌟".to_string(),
            timestamp: now.to_rfc3339(),
            status: MessageStatus::Read,
            urgent: false,
            read: true,
        },
        ChatMessage {
            id: base + 1,
            from: Sender::Nutritionist,
            content: "אני כאן כדי לעזור לך להגיע ליעדים שלך. איך אתה מרגיש היום? יש משהו ספציפי שתרצה לדון עליו?"
                .to_string(),
            timestamp: now.to_rfc3339(),
            status: MessageStatus::Read,
            urgent: false,
            read: true,
        },
    ]
}

/// Seed for an empty console-side thread: a short demo exchange from the
/// day before.
pub fn demo_thread(profile: &AthleteProfile, now: DateTime<Local>) -> Vec<ChatMessage> {
    let base = now.timestamp_millis();
    let yesterday = now - chrono::Duration::hours(24);
    let first_name = profile.name.split(' ').next().unwrap_or(profile.name);
    vec![
        ChatMessage {
            id: base - 1_000_000,
            from: Sender::Nutritionist,
            content: format!("שלום {first_name}! איך אתה מרגיש עם התוכנית החדשה?"),
            timestamp: yesterday.to_rfc3339(),
            status: MessageStatus::Read,
            urgent: false,
            read: true,
        },
        ChatMessage {
            id: base - 900_000,
            from: Sender::Athlete,
            content: "שלום! אני מרגיש טוב, אבל יש לי שאלות על התזונה לפני האימון".to_string(),
            timestamp: (yesterday + chrono::Duration::hours(1)).to_rfc3339(),
            status: MessageStatus::Delivered,
            urgent: false,
            read: false,
        },
    ]
}

pub fn roster() -> Vec<AthleteProfile> {
    vec![
        AthleteProfile {
            id: "dani_cohen",
            name: "דני כהן",
            age: 24,
            category: "עד 73 ק\"ג",
            days_to_competition: 45,
            avatar: "DC",
        },
        AthleteProfile {
            id: "maya_israeli",
            name: "מאיה ישראלי",
            age: 22,
            category: "עד 57 ק\"ג",
            days_to_competition: 30,
            avatar: "MI",
        },
        AthleteProfile {
            id: "ron_david",
            name: "רון דוד",
            age: 26,
            category: "עד 81 ק\"ג",
            days_to_competition: 60,
            avatar: "RD",
        },
    ]
}

pub fn roster_profile(athlete_id: &str) -> Option<AthleteProfile> {
    roster().into_iter().find(|profile| profile.id == athlete_id)
}

/// Availability by local hour: offline outside working hours, otherwise
/// mostly available with an occasional busy spell.
pub fn availability_at(hour: u32, busy_roll: f64) -> (bool, &'static str) {
    if !(8..18).contains(&hour) {
        return (false, "לא זמינה");
    }
    if busy_roll > 0.8 {
        (true, "עסוקה")
    } else {
        (true, "זמינה")
    }
}

pub fn availability_now(busy_roll: f64) -> (bool, &'static str) {
    availability_at(Local::now().hour(), busy_roll)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pain_keyword_always_yields_urgent_reply() {
        let text = "יש לי כאב בברך אחרי האימון";
        let rule = match_rule(ATHLETE_RULES, text).expect("rule match");
        assert!(rule.urgent);
        assert!(is_urgent(text));
        assert_eq!(reply_content(ATHLETE_RULES, &ATHLETE_GENERIC_REPLIES, text, 3), rule.reply);
    }

    #[test]
    fn first_matching_rule_wins() {
        // Both the problem rule and the nutrition rule could match; order
        // decides.
        let text = "יש בעיה עם הארוחה של הצהריים";
        let rule = match_rule(ATHLETE_RULES, text).expect("rule match");
        assert!(rule.urgent);
    }

    #[test]
    fn keywordless_text_draws_from_the_five_generic_replies() {
        let text = "שלום, מה נשמע?";
        assert!(match_rule(ATHLETE_RULES, text).is_none());
        assert!(!is_urgent(text));
        for pick in 0..10 {
            let reply = reply_content(ATHLETE_RULES, &ATHLETE_GENERIC_REPLIES, text, pick);
            assert!(ATHLETE_GENERIC_REPLIES.contains(&reply));
        }
    }

    #[test]
    fn console_rules_answer_meal_photo_requests() {
        let text = "שלח לי תמונה של הארוחה הבאה שלך 📸";
        let rule = match_rule(CONSOLE_RULES, text).expect("rule match");
        assert_eq!(rule.reply, "בסדר, אשלח תמונה של הארוחה הבאה 📸");
    }

    #[test]
    fn status_icons_collapse_delivered_and_read() {
        assert_eq!(status_icon(MessageStatus::Sent), "✓");
        assert_eq!(status_icon(MessageStatus::Delivered), "✓✓");
        assert_eq!(status_icon(MessageStatus::Read), "✓✓");
    }

    #[test]
    fn status_only_advances() {
        let mut message = message_at(1, Sender::Athlete, "היי", Local::now());
        message.advance_status(MessageStatus::Delivered);
        assert_eq!(message.status, MessageStatus::Delivered);
        message.advance_status(MessageStatus::Sent);
        assert_eq!(message.status, MessageStatus::Delivered);
        message.advance_status(MessageStatus::Read);
        assert_eq!(message.status, MessageStatus::Read);
    }

    #[test]
    fn availability_follows_working_hours() {
        assert_eq!(availability_at(7, 0.0), (false, "לא זמינה"));
        assert_eq!(availability_at(8, 0.0), (true, "זמינה"));
        assert_eq!(availability_at(12, 0.9), (true, "עסוקה"));
        assert_eq!(availability_at(18, 0.0), (false, "לא זמינה"));
    }

    #[test]
    fn reply_delays_stay_in_range() {
        let mut rng = rand::thread_rng();
        for _ in 0..50 {
            let (typing_after, typing_for) = reply_delays(&mut rng);
            assert!((1500..3500).contains(&(typing_after.as_millis() as u64)));
            assert!((2000..3500).contains(&(typing_for.as_millis() as u64)));
        }
    }

    #[test]
    fn empty_threads_seed_welcome_content() {
        let now = Local::now();
        let welcome = welcome_messages(now);
        assert_eq!(welcome.len(), 2);
        assert!(welcome.iter().all(|m| m.from == Sender::Nutritionist));
        assert!(welcome.iter().all(|m| m.status == MessageStatus::Read));

        let profile = roster_profile("maya_israeli").expect("roster entry");
        let demo = demo_thread(&profile, now);
        assert_eq!(demo.len(), 2);
        assert_eq!(demo[1].from, Sender::Athlete);
        assert!(!demo[1].read);
        assert!(demo[0].content.contains("מאיה"));
    }
}
