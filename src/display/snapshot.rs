//! Typed, lenient reading of a [`DisplayStatus`].
//!
//! This is the only place that interprets the raw map. Everything downstream
//! (view selection, countdown, TV session) works on [`DisplaySnapshot`].

use serde_json::Value;

use super::status::DisplayStatus;

/// Value of the `content` key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentMode {
    /// Show the show logo.
    Logo,
    /// Show the current question.
    Question,
    /// Show the answer.
    Answer,
    /// Show the viewer who sent the question.
    Viewer,
    /// Show the full scoreboard.
    Score,
    /// Explicit blank screen.
    Black,
    /// Any other string; never selects a view on its own.
    Other(String),
}

impl From<&str> for ContentMode {
    fn from(value: &str) -> Self {
        match value {
            "logo" => Self::Logo,
            "question" => Self::Question,
            "answer" => Self::Answer,
            "viewer" => Self::Viewer,
            "score" => Self::Score,
            "black" => Self::Black,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Display status with every known key decoded.
///
/// Flags are `Some(bool)` only when the key holds a JSON boolean, strings only
/// when non-empty, numbers only when numeric. Anything else reads as absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplaySnapshot {
    pub content: Option<ContentMode>,
    pub show_question: Option<bool>,
    pub show_answer: Option<bool>,
    pub show_viewer: Option<bool>,
    pub show_score: Option<bool>,
    pub show_timer: Option<bool>,
    pub show_experts: Option<bool>,
    pub question_text: Option<String>,
    pub question_type: Option<String>,
    pub answer_text: Option<String>,
    pub media: Option<String>,
    pub viewer_name: Option<String>,
    pub viewer_city: Option<String>,
    pub viewer_photo: Option<String>,
    pub timer_seconds: Option<u32>,
    pub timer_start_time: Option<i64>,
}

impl DisplaySnapshot {
    /// Decode the known keys of `status`.
    pub fn from_status(status: &DisplayStatus) -> Self {
        Self {
            content: text(status, "content").map(|value| ContentMode::from(value.as_str())),
            show_question: flag(status, "show_question"),
            show_answer: flag(status, "show_answer"),
            show_viewer: flag(status, "show_viewer"),
            show_score: flag(status, "show_score"),
            show_timer: flag(status, "show_timer"),
            show_experts: flag(status, "show_experts"),
            question_text: text(status, "question_text"),
            question_type: text(status, "question_type"),
            answer_text: text(status, "answer_text"),
            media: text(status, "media"),
            viewer_name: text(status, "viewer_name"),
            viewer_city: text(status, "viewer_city"),
            viewer_photo: text(status, "viewer_photo"),
            timer_seconds: seconds(status, "timer_seconds"),
            timer_start_time: timestamp(status, "timer_start_time"),
        }
    }

    /// Whether `content` equals `mode`.
    pub fn content_is(&self, mode: &ContentMode) -> bool {
        self.content.as_ref() == Some(mode)
    }

    /// Whether a countdown should be running for this snapshot.
    pub fn timer_requested(&self) -> Option<u32> {
        match self.show_timer {
            Some(true) => self.timer_seconds,
            _ => None,
        }
    }
}

impl From<&DisplayStatus> for DisplaySnapshot {
    fn from(value: &DisplayStatus) -> Self {
        Self::from_status(value)
    }
}

fn flag(status: &DisplayStatus, key: &str) -> Option<bool> {
    status.get(key).and_then(Value::as_bool)
}

fn text(status: &DisplayStatus, key: &str) -> Option<String> {
    status
        .get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn seconds(status: &DisplayStatus, key: &str) -> Option<u32> {
    let value = status.get(key)?;
    if let Some(whole) = value.as_u64() {
        return Some(u32::try_from(whole).unwrap_or(u32::MAX));
    }
    // Negative or fractional durations clamp into range.
    value
        .as_f64()
        .filter(|float| float.is_finite())
        .map(|float| float.max(0.0).min(f64::from(u32::MAX)) as u32)
}

fn timestamp(status: &DisplayStatus, key: &str) -> Option<i64> {
    let value = status.get(key)?;
    value
        .as_i64()
        .or_else(|| value.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn snapshot(value: Value) -> DisplaySnapshot {
        let status: DisplayStatus = serde_json::from_value(value).unwrap();
        DisplaySnapshot::from_status(&status)
    }

    #[test]
    fn decodes_known_keys() {
        let snap = snapshot(json!({
            "content": "question",
            "show_timer": true,
            "timer_seconds": 60,
            "timer_start_time": 1_700_000_000_000_i64,
            "question_text": "Who?",
        }));

        assert_eq!(snap.content, Some(ContentMode::Question));
        assert_eq!(snap.timer_requested(), Some(60));
        assert_eq!(snap.timer_start_time, Some(1_700_000_000_000));
        assert_eq!(snap.question_text.as_deref(), Some("Who?"));
    }

    #[test]
    fn ill_typed_values_read_as_absent() {
        let snap = snapshot(json!({
            "show_question": "yes",
            "question_text": "",
            "timer_seconds": "60",
            "media": null,
        }));

        assert_eq!(snap.show_question, None);
        assert_eq!(snap.question_text, None);
        assert_eq!(snap.timer_seconds, None);
        assert_eq!(snap.media, None);
    }

    #[test]
    fn negative_durations_clamp_to_zero() {
        let snap = snapshot(json!({ "timer_seconds": -5 }));
        assert_eq!(snap.timer_seconds, Some(0));
    }

    #[test]
    fn unknown_content_is_preserved() {
        let snap = snapshot(json!({ "content": "credits" }));
        assert_eq!(snap.content, Some(ContentMode::Other("credits".into())));
    }

    #[test]
    fn timer_requires_visible_flag() {
        let snap = snapshot(json!({ "show_timer": false, "timer_seconds": 30 }));
        assert_eq!(snap.timer_requested(), None);
    }
}
