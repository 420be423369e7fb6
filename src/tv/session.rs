//! TV-side state fed by relay broadcasts.

use tracing::debug;

use crate::{
    config::{AppConfig, CueSounds},
    display::{
        Countdown, DisplaySnapshot, DisplayStatus, ScorePair, TimerCue, TvFrame, ViewContext,
        compose_frame,
    },
    dto::ws::RelayEvent,
};

/// Volume used for countdown cues.
const CUE_VOLUME: f64 = 1.0;

/// Side effects the TV must perform after an update.
#[derive(Debug, Clone, PartialEq)]
pub enum TvEffect {
    /// Play an audio file resolved against the asset base URL.
    PlaySound {
        /// File name or URL of the sound.
        file: String,
        /// Playback volume in `0.0..=1.0`.
        volume: f64,
    },
}

/// What the one-second countdown clock must do after an update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ClockCommand {
    /// Leave the clock as it is.
    #[default]
    Keep,
    /// Start ticking again from now.
    Restart,
    /// Stop ticking.
    Stop,
}

/// Outcome of feeding one relay event to the session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TvUpdate {
    /// Effects to perform, in order.
    pub effects: Vec<TvEffect>,
    /// Instruction for the countdown clock.
    pub clock: ClockCommand,
    /// Whether the rendered frame may have changed.
    pub redraw: bool,
}

/// Presentation settings of a TV screen.
#[derive(Debug, Clone)]
pub struct TvSettings {
    /// Base URL relative media and logo paths are resolved against.
    pub asset_base_url: String,
    /// Logo path shown when no custom logo is set.
    pub default_logo: String,
    /// Countdown cue files.
    pub cue_sounds: CueSounds,
}

impl TvSettings {
    /// Take the logo and cue sounds from `config`.
    pub fn from_config(config: &AppConfig, asset_base_url: impl Into<String>) -> Self {
        Self {
            asset_base_url: asset_base_url.into(),
            default_logo: config.default_logo.clone(),
            cue_sounds: config.cue_sounds.clone(),
        }
    }
}

/// State of one TV screen following a game room.
#[derive(Debug)]
pub struct TvSession {
    game_id: String,
    settings: TvSettings,
    scores: ScorePair,
    status: DisplayStatus,
    snapshot: DisplaySnapshot,
    show_score_banner: bool,
    countdown: Countdown,
}

impl TvSession {
    /// Fresh session for `game_id`: zero scores, empty display status, banner shown.
    pub fn new(game_id: impl Into<String>, settings: TvSettings) -> Self {
        Self {
            game_id: game_id.into(),
            settings,
            scores: ScorePair::default(),
            status: DisplayStatus::new(),
            snapshot: DisplaySnapshot::default(),
            show_score_banner: true,
            countdown: Countdown::new(),
        }
    }

    /// Game whose room this session follows.
    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    /// Last display status received.
    pub fn display_status(&self) -> &DisplayStatus {
        &self.status
    }

    /// Scores currently displayed.
    pub fn scores(&self) -> ScorePair {
        self.scores
    }

    /// Load the persisted state a TV missed before joining the room.
    ///
    /// `status` is the display status of the current round, if the game has one.
    /// Seeding again with an unchanged status replays no cue.
    pub fn seed(&mut self, scores: ScorePair, status: Option<DisplayStatus>) -> TvUpdate {
        self.scores = scores;
        match status {
            Some(status) => self.show(status),
            None => TvUpdate {
                redraw: true,
                ..TvUpdate::default()
            },
        }
    }

    /// Apply one broadcast from the game room.
    pub fn apply(&mut self, event: RelayEvent) -> TvUpdate {
        match event {
            RelayEvent::ScoreUpdate(score) => {
                if score.game_id != self.game_id {
                    debug!(game_id = %score.game_id, "ignoring score for another game");
                    return TvUpdate::default();
                }
                self.scores = ScorePair {
                    experts: score.experts_score,
                    viewers: score.viewers_score,
                };
                TvUpdate {
                    redraw: true,
                    ..TvUpdate::default()
                }
            }
            RelayEvent::DisplayChange(change) => self.show(change.display_status),
            RelayEvent::PlaySound(sound) => TvUpdate {
                effects: vec![TvEffect::PlaySound {
                    file: sound.file,
                    volume: sound.volume,
                }],
                ..TvUpdate::default()
            },
            RelayEvent::RoundStatusUpdate(_) | RelayEvent::QuestionSelected(_) => {
                TvUpdate::default()
            }
        }
    }

    /// Replace the display status with the full document broadcast by the relay.
    pub fn show(&mut self, status: DisplayStatus) -> TvUpdate {
        self.snapshot = DisplaySnapshot::from_status(&status);
        self.status = status;
        if let Some(visible) = self.snapshot.show_score {
            self.show_score_banner = visible;
        }

        let change = self.countdown.observe(&self.snapshot);
        let clock = if change.restart {
            ClockCommand::Restart
        } else if change.stop {
            ClockCommand::Stop
        } else {
            ClockCommand::Keep
        };

        TvUpdate {
            effects: change.cues.into_iter().map(|cue| self.cue_effect(cue)).collect(),
            clock,
            redraw: true,
        }
    }

    /// Advance the countdown by one second.
    pub fn tick(&mut self) -> TvUpdate {
        let effects = self
            .countdown
            .tick()
            .map(|cue| self.cue_effect(cue))
            .into_iter()
            .collect();
        let clock = if self.countdown.is_running() {
            ClockCommand::Keep
        } else {
            ClockCommand::Stop
        };
        TvUpdate {
            effects,
            clock,
            redraw: true,
        }
    }

    /// Countdown driven by the display status.
    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    /// The frame the screen should currently show.
    pub fn frame(&self) -> TvFrame {
        let ctx = ViewContext {
            asset_base_url: &self.settings.asset_base_url,
            default_logo: &self.settings.default_logo,
            scores: self.scores,
            countdown: self.countdown.remaining(),
            show_score_banner: self.show_score_banner,
        };
        compose_frame(&self.snapshot, &ctx)
    }

    fn cue_effect(&self, cue: TimerCue) -> TvEffect {
        let sounds = &self.settings.cue_sounds;
        let file = match cue {
            TimerCue::Start => &sounds.start,
            TimerCue::Warning => &sounds.warning,
            TimerCue::Finish => &sounds.finish,
        };
        TvEffect::PlaySound {
            file: file.clone(),
            volume: CUE_VOLUME,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::{
        display::ViewMode,
        dto::ws::{DisplayChanged, ScoreChanged, SoundCue},
    };

    fn session() -> TvSession {
        TvSession::new(
            "g1",
            TvSettings::from_config(&AppConfig::default(), "http://tv.local"),
        )
    }

    fn display(value: Value) -> RelayEvent {
        RelayEvent::DisplayChange(DisplayChanged {
            round_id: "r1".into(),
            display_status: serde_json::from_value(value).unwrap(),
        })
    }

    fn score(game_id: &str, experts: u32, viewers: u32) -> RelayEvent {
        RelayEvent::ScoreUpdate(ScoreChanged {
            game_id: game_id.into(),
            experts_score: experts,
            viewers_score: viewers,
        })
    }

    fn sounds(update: &TvUpdate) -> Vec<&str> {
        update
            .effects
            .iter()
            .map(|TvEffect::PlaySound { file, .. }| file.as_str())
            .collect()
    }

    #[test]
    fn scores_from_other_games_are_ignored() {
        let mut tv = session();
        tv.apply(score("g1", 3, 1));
        tv.apply(score("g2", 9, 9));
        assert_eq!(tv.scores(), ScorePair { experts: 3, viewers: 1 });
    }

    #[test]
    fn play_sound_becomes_an_effect() {
        let mut tv = session();
        let update = tv.apply(RelayEvent::PlaySound(SoundCue {
            file: "gong.mp3".into(),
            volume: 0.4,
            timestamp: 0,
        }));
        assert_eq!(
            update.effects,
            [TvEffect::PlaySound {
                file: "gong.mp3".into(),
                volume: 0.4
            }]
        );
    }

    #[test]
    fn countdown_plays_each_cue_once() {
        let mut tv = session();
        let started = tv.apply(display(json!({
            "content": "question",
            "show_timer": true,
            "timer_seconds": 12,
            "timer_start_time": 1000
        })));
        assert_eq!(started.clock, ClockCommand::Restart);
        assert_eq!(sounds(&started), ["question_time_start.mp3"]);

        let mut played = Vec::new();
        while tv.countdown().is_running() {
            let update = tv.tick();
            played.extend(sounds(&update).into_iter().map(str::to_owned));
        }
        assert_eq!(
            played,
            ["question_time_pre_finish.mp3", "question_time_finish.mp3"]
        );

        let again = tv.apply(display(json!({
            "content": "question",
            "show_timer": true,
            "timer_seconds": 12,
            "timer_start_time": 1000
        })));
        assert!(again.effects.is_empty());
    }

    #[test]
    fn question_frame_shows_remaining_seconds() {
        let mut tv = session();
        tv.apply(display(json!({
            "show_question": true,
            "question_text": "Who?",
            "show_timer": true,
            "timer_seconds": 60
        })));
        tv.tick();

        let ViewMode::Question { timer, .. } = tv.frame().view else {
            panic!("expected a question view");
        };
        assert_eq!(timer, Some(59));
    }

    #[test]
    fn banner_follows_the_last_show_score_flag() {
        let mut tv = session();
        assert!(tv.frame().banner.is_some());

        tv.apply(display(json!({"content": "black", "show_score": false})));
        assert!(tv.frame().banner.is_none());

        tv.apply(display(json!({"content": "black"})));
        assert!(tv.frame().banner.is_none());
    }

    #[test]
    fn hiding_the_timer_stops_the_clock() {
        let mut tv = session();
        tv.apply(display(json!({"show_timer": true, "timer_seconds": 30})));
        let update = tv.apply(display(json!({"show_timer": false, "timer_seconds": 30})));
        assert_eq!(update.clock, ClockCommand::Stop);
        assert!(!tv.countdown().is_running());
    }

    #[test]
    fn seeding_restores_scores_and_the_current_display() {
        let mut tv = session();
        let status = serde_json::from_value::<DisplayStatus>(json!({
            "content": "question",
            "question_text": "Who?",
            "show_timer": true,
            "timer_seconds": 30,
            "timer_start_time": 500
        }))
        .unwrap();

        let update = tv.seed(ScorePair { experts: 2, viewers: 5 }, Some(status.clone()));
        assert_eq!(tv.scores(), ScorePair { experts: 2, viewers: 5 });
        assert_eq!(update.clock, ClockCommand::Restart);
        assert!(matches!(tv.frame().view, ViewMode::Question { .. }));

        tv.tick();
        let again = tv.seed(ScorePair { experts: 2, viewers: 5 }, Some(status));
        assert!(again.effects.is_empty());
        assert_eq!(again.clock, ClockCommand::Keep);
        assert_eq!(tv.countdown().remaining(), Some(29));
    }

    #[test]
    fn seeding_without_a_round_keeps_the_idle_view() {
        let mut tv = session();
        let update = tv.seed(ScorePair { experts: 1, viewers: 0 }, None);
        assert!(update.redraw);
        assert_eq!(tv.frame().view, ViewMode::Idle);
        assert_eq!(tv.scores(), ScorePair { experts: 1, viewers: 0 });
    }

    #[test]
    fn reshowing_a_question_keeps_its_timer_instance() {
        let mut tv = session();
        let mut status = DisplayStatus::new();
        let mut push = |tv: &mut TvSession, patch: Value| {
            status.merge(serde_json::from_value(patch).unwrap());
            tv.show(status.clone())
        };

        let first = push(
            &mut tv,
            json!({
                "content": "question",
                "show_timer": true,
                "timer_seconds": 60,
                "timer_start_time": 1000
            }),
        );
        assert_eq!(sounds(&first), ["question_time_start.mp3"]);

        let hidden = push(&mut tv, json!({"content": "answer", "show_timer": false}));
        assert_eq!(hidden.clock, ClockCommand::Stop);

        let reshown = push(
            &mut tv,
            json!({"content": "question", "show_question": true, "show_timer": true}),
        );
        assert!(reshown.effects.is_empty());
        assert_eq!(reshown.clock, ClockCommand::Restart);
    }
}
