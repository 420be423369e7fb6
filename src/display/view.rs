//! Selection of the single view the TV display renders.

use serde::{Deserialize, Serialize};

use super::snapshot::{ContentMode, DisplaySnapshot};

const QUESTION_PLACEHOLDER: &str = "Waiting for question...";
const DEFAULT_QUESTION_TYPE: &str = "text";
const VIEWER_PLACEHOLDER: &str = "Viewer";

/// Experts versus viewers score pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScorePair {
    /// Experts' table score.
    pub experts: u32,
    /// Viewers' score.
    pub viewers: u32,
}

/// Mutually exclusive main-area views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewMode {
    /// Show logo, either the configured default or a custom media asset.
    Logo { image_url: String },
    /// Question text with optional media and countdown.
    Question {
        text: String,
        kind: String,
        media_url: Option<String>,
        /// Seconds shown on the clock when the timer is visible.
        timer: Option<u32>,
    },
    /// Correct answer.
    Answer { text: String },
    /// Profile of the viewer who sent the question.
    Viewer {
        name: String,
        city: Option<String>,
        photo_url: Option<String>,
    },
    /// Full-screen scoreboard.
    Scoreboard(ScorePair),
    /// Explicitly requested blank screen.
    Black,
    /// Nothing requested yet, or nothing recognised.
    Idle,
}

impl ViewMode {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Logo { .. } => "logo",
            Self::Question { .. } => "question",
            Self::Answer { .. } => "answer",
            Self::Viewer { .. } => "viewer",
            Self::Scoreboard(_) => "score",
            Self::Black => "black",
            Self::Idle => "idle",
        }
    }
}

/// Everything outside the display status that influences the view.
#[derive(Debug, Clone, Copy)]
pub struct ViewContext<'a> {
    /// Prefix for relative asset paths (e.g. `http://localhost:8080`).
    pub asset_base_url: &'a str,
    /// Relative path of the logo shown when no media is given.
    pub default_logo: &'a str,
    pub scores: ScorePair,
    /// Seconds left on the local countdown, if one is running or expired.
    pub countdown: Option<u32>,
    /// Latched banner visibility, driven by the last `show_score` flag seen.
    pub show_score_banner: bool,
}

/// One complete TV frame: main view plus the optional score banner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TvFrame {
    pub view: ViewMode,
    pub banner: Option<ScorePair>,
}

/// Pick the view for `snapshot`; first matching rule wins.
pub fn select_view(snapshot: &DisplaySnapshot, ctx: &ViewContext<'_>) -> ViewMode {
    let is = |mode: ContentMode, flag: Option<bool>| {
        snapshot.content_is(&mode) || flag == Some(true)
    };

    if snapshot.content_is(&ContentMode::Logo) {
        let image_url = match snapshot.media.as_deref() {
            Some(media) => resolve_asset(ctx.asset_base_url, media),
            None => resolve_asset(ctx.asset_base_url, ctx.default_logo),
        };
        return ViewMode::Logo { image_url };
    }

    if is(ContentMode::Question, snapshot.show_question) {
        let timer = (snapshot.show_timer == Some(true))
            .then(|| ctx.countdown.or(snapshot.timer_seconds).unwrap_or(0));
        return ViewMode::Question {
            text: snapshot
                .question_text
                .clone()
                .unwrap_or_else(|| QUESTION_PLACEHOLDER.to_string()),
            kind: snapshot
                .question_type
                .clone()
                .unwrap_or_else(|| DEFAULT_QUESTION_TYPE.to_string()),
            media_url: snapshot.media.clone(),
            timer,
        };
    }

    if is(ContentMode::Answer, snapshot.show_answer) {
        return ViewMode::Answer {
            text: snapshot.answer_text.clone().unwrap_or_default(),
        };
    }

    if is(ContentMode::Viewer, snapshot.show_viewer) {
        return ViewMode::Viewer {
            name: snapshot
                .viewer_name
                .clone()
                .unwrap_or_else(|| VIEWER_PLACEHOLDER.to_string()),
            city: snapshot.viewer_city.clone(),
            photo_url: snapshot.viewer_photo.clone(),
        };
    }

    if is(ContentMode::Score, snapshot.show_score) {
        return ViewMode::Scoreboard(ctx.scores);
    }

    if snapshot.content_is(&ContentMode::Black) {
        return ViewMode::Black;
    }

    ViewMode::Idle
}

/// Select the view and decide whether the score banner overlays it.
pub fn compose_frame(snapshot: &DisplaySnapshot, ctx: &ViewContext<'_>) -> TvFrame {
    let view = select_view(snapshot, ctx);
    let banner = match view {
        ViewMode::Scoreboard(_) => None,
        _ if ctx.show_score_banner => Some(ctx.scores),
        _ => None,
    };
    TvFrame { view, banner }
}

fn resolve_asset(base: &str, path: &str) -> String {
    if path.starts_with("http") {
        path.to_string()
    } else {
        format!("{}{}", base.trim_end_matches('/'), path)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::display::status::DisplayStatus;

    const BASE: &str = "http://tv.local:8080";
    const LOGO: &str = "/uploads/game_logo.jpg";

    fn ctx() -> ViewContext<'static> {
        ViewContext {
            asset_base_url: BASE,
            default_logo: LOGO,
            scores: ScorePair {
                experts: 3,
                viewers: 2,
            },
            countdown: None,
            show_score_banner: true,
        }
    }

    fn status(value: Value) -> DisplayStatus {
        serde_json::from_value(value).unwrap()
    }

    fn view(value: Value) -> ViewMode {
        select_view(&DisplaySnapshot::from_status(&status(value)), &ctx())
    }

    #[test]
    fn empty_status_is_idle() {
        assert_eq!(view(json!({})), ViewMode::Idle);
    }

    #[test]
    fn logo_uses_default_asset() {
        assert_eq!(
            view(json!({ "content": "logo" })),
            ViewMode::Logo {
                image_url: format!("{BASE}{LOGO}")
            }
        );
    }

    #[test]
    fn logo_keeps_absolute_media_urls() {
        assert_eq!(
            view(json!({ "content": "logo", "media": "https://cdn/x.png" })),
            ViewMode::Logo {
                image_url: "https://cdn/x.png".into()
            }
        );
    }

    #[test]
    fn logo_wins_over_every_flag() {
        let selected = view(json!({
            "content": "logo",
            "show_question": true,
            "show_score": true,
        }));
        assert!(matches!(selected, ViewMode::Logo { .. }));
    }

    #[test]
    fn question_flag_beats_answer_and_score_flags() {
        let selected = view(json!({
            "show_answer": true,
            "show_question": true,
            "show_score": true,
            "question_text": "Capital?",
        }));
        assert_eq!(selected.name(), "question");
    }

    #[test]
    fn question_timer_prefers_local_countdown() {
        let snapshot = DisplaySnapshot::from_status(&status(json!({
            "content": "question",
            "show_timer": true,
            "timer_seconds": 60,
        })));

        let mut context = ctx();
        assert!(matches!(
            select_view(&snapshot, &context),
            ViewMode::Question { timer: Some(60), .. }
        ));

        context.countdown = Some(42);
        assert!(matches!(
            select_view(&snapshot, &context),
            ViewMode::Question { timer: Some(42), .. }
        ));
    }

    #[test]
    fn hidden_timer_is_not_shown() {
        let selected = view(json!({ "content": "question", "timer_seconds": 60 }));
        assert!(matches!(selected, ViewMode::Question { timer: None, .. }));
    }

    #[test]
    fn question_falls_back_to_placeholder_text() {
        let selected = view(json!({ "show_question": true }));
        assert_eq!(
            selected,
            ViewMode::Question {
                text: QUESTION_PLACEHOLDER.into(),
                kind: DEFAULT_QUESTION_TYPE.into(),
                media_url: None,
                timer: None,
            }
        );
    }

    #[test]
    fn answer_then_viewer_then_score_then_black() {
        assert_eq!(
            view(json!({ "show_answer": true, "show_viewer": true, "answer_text": "Paris" })),
            ViewMode::Answer {
                text: "Paris".into()
            }
        );
        assert_eq!(
            view(json!({ "content": "viewer", "show_score": true })),
            ViewMode::Viewer {
                name: VIEWER_PLACEHOLDER.into(),
                city: None,
                photo_url: None,
            }
        );
        assert_eq!(
            view(json!({ "content": "black", "show_score": true })),
            ViewMode::Scoreboard(ScorePair {
                experts: 3,
                viewers: 2
            })
        );
        assert_eq!(view(json!({ "content": "black" })), ViewMode::Black);
    }

    #[test]
    fn false_flags_do_not_select_views() {
        assert_eq!(
            view(json!({ "show_question": false, "show_answer": false })),
            ViewMode::Idle
        );
    }

    #[test]
    fn merge_order_of_disjoint_keys_does_not_change_the_view() {
        let patches = [
            json!({ "content": "answer" }),
            json!({ "answer_text": "42" }),
            json!({ "show_viewer": true }),
        ];

        let mut forward = DisplayStatus::new();
        for patch in patches.iter() {
            forward.merge(status(patch.clone()));
        }
        let mut backward = DisplayStatus::new();
        for patch in patches.iter().rev() {
            backward.merge(status(patch.clone()));
        }

        let forward_view = select_view(&DisplaySnapshot::from_status(&forward), &ctx());
        let backward_view = select_view(&DisplaySnapshot::from_status(&backward), &ctx());
        assert_eq!(forward_view, backward_view);
        assert_eq!(forward_view, ViewMode::Answer { text: "42".into() });
    }

    #[test]
    fn banner_hidden_only_on_scoreboard_or_when_latched_off() {
        let snapshot = DisplaySnapshot::from_status(&status(json!({ "content": "score" })));
        assert_eq!(compose_frame(&snapshot, &ctx()).banner, None);

        let snapshot = DisplaySnapshot::from_status(&status(json!({ "content": "answer" })));
        assert_eq!(
            compose_frame(&snapshot, &ctx()).banner,
            Some(ScorePair {
                experts: 3,
                viewers: 2
            })
        );

        let mut context = ctx();
        context.show_score_banner = false;
        assert_eq!(compose_frame(&snapshot, &context).banner, None);
    }

    #[test]
    fn banner_stays_over_a_logo_that_outranks_the_scoreboard() {
        let snapshot = DisplaySnapshot::from_status(&status(json!({
            "content": "logo",
            "show_score": true
        })));
        let frame = compose_frame(&snapshot, &ctx());
        assert!(matches!(frame.view, ViewMode::Logo { .. }));
        assert!(frame.banner.is_some());
    }
}
