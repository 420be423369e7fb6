//! Restartable question countdown with one-shot sound cues.
//!
//! The countdown is a plain state machine: [`Countdown::observe`] is fed every
//! display snapshot, [`Countdown::tick`] once per second while running. The
//! caller owns the actual clock (see `tv::CountdownTicker`).

use super::snapshot::DisplaySnapshot;

/// Remaining seconds at which the warning cue fires.
pub const WARNING_AT_SECONDS: u32 = 10;

/// Sound cues emitted by the countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerCue {
    /// A new countdown instance started.
    Start,
    /// Ten seconds remain.
    Warning,
    /// The countdown reached zero.
    Finish,
}

/// Lifecycle of the countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownPhase {
    Idle,
    Running,
    Expired,
}

/// What an observed snapshot did to the countdown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountdownChange {
    /// Cues to play, in order.
    pub cues: Vec<TimerCue>,
    /// The one-second clock must be (re)started from now.
    pub restart: bool,
    /// The one-second clock must be stopped.
    pub stop: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct FiredCues {
    start: bool,
    warning: bool,
    finish: bool,
}

/// Inputs the countdown reacts to; identical inputs are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TimerInputs {
    visible: bool,
    seconds: Option<u32>,
    start_time: Option<i64>,
}

/// Countdown state tracked by a TV display.
#[derive(Debug, Clone)]
pub struct Countdown {
    phase: CountdownPhase,
    remaining: Option<u32>,
    /// Start marker of the last instance; `None` until a timer was first shown.
    instance: Option<Option<i64>>,
    fired: FiredCues,
    last_inputs: Option<TimerInputs>,
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Countdown {
    /// Idle countdown that has never tracked an instance.
    pub fn new() -> Self {
        Self {
            phase: CountdownPhase::Idle,
            remaining: None,
            instance: None,
            fired: FiredCues::default(),
            last_inputs: None,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> CountdownPhase {
        self.phase
    }

    /// Seconds left, `None` while idle.
    pub fn remaining(&self) -> Option<u32> {
        self.remaining
    }

    /// React to a new display snapshot.
    pub fn observe(&mut self, snapshot: &DisplaySnapshot) -> CountdownChange {
        let inputs = TimerInputs {
            visible: snapshot.show_timer == Some(true),
            seconds: snapshot.timer_seconds,
            start_time: snapshot.timer_start_time,
        };
        if self.last_inputs == Some(inputs) {
            return CountdownChange::default();
        }
        self.last_inputs = Some(inputs);

        match snapshot.timer_requested() {
            Some(duration) => self.start(duration, inputs.start_time),
            None => self.cancel(),
        }
    }

    fn start(&mut self, duration: u32, start_time: Option<i64>) -> CountdownChange {
        let is_new = self.instance != Some(start_time);
        let mut change = CountdownChange {
            restart: true,
            ..CountdownChange::default()
        };

        if is_new {
            self.fired = FiredCues::default();
            self.instance = Some(start_time);
        }

        self.phase = CountdownPhase::Running;
        self.remaining = Some(duration);

        if is_new && !self.fired.start {
            self.fired.start = true;
            change.cues.push(TimerCue::Start);
        }
        change
    }

    /// Stop the clock and clear the cue flags. The instance marker survives, so
    /// re-showing the same timer later is not a new instance.
    fn cancel(&mut self) -> CountdownChange {
        let was_active = self.phase != CountdownPhase::Idle;
        self.phase = CountdownPhase::Idle;
        self.remaining = None;
        self.fired = FiredCues::default();
        CountdownChange {
            stop: was_active,
            ..CountdownChange::default()
        }
    }

    /// Advance by one second; returns the cue crossing this tick, if any.
    pub fn tick(&mut self) -> Option<TimerCue> {
        if self.phase != CountdownPhase::Running {
            return None;
        }

        let current = self.remaining.unwrap_or(0);
        if current == 0 {
            self.phase = CountdownPhase::Expired;
            return None;
        }

        let next = current - 1;
        self.remaining = Some(next);

        if next == WARNING_AT_SECONDS && !self.fired.warning {
            self.fired.warning = true;
            return Some(TimerCue::Warning);
        }

        if next == 0 {
            self.phase = CountdownPhase::Expired;
            if !self.fired.finish {
                self.fired.finish = true;
                return Some(TimerCue::Finish);
            }
        }

        None
    }

    /// Whether the one-second clock should currently be ticking.
    pub fn is_running(&self) -> bool {
        self.phase == CountdownPhase::Running
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::display::status::DisplayStatus;

    fn snapshot(value: Value) -> DisplaySnapshot {
        let status: DisplayStatus = serde_json::from_value(value).unwrap();
        DisplaySnapshot::from_status(&status)
    }

    fn run_to_end(countdown: &mut Countdown) -> Vec<(u32, TimerCue)> {
        let mut cues = Vec::new();
        while countdown.is_running() {
            if let Some(cue) = countdown.tick() {
                cues.push((countdown.remaining().unwrap_or_default(), cue));
            }
        }
        cues
    }

    #[test]
    fn full_countdown_emits_each_cue_once() {
        let mut countdown = Countdown::new();
        let change = countdown.observe(&snapshot(json!({
            "show_timer": true,
            "timer_seconds": 60,
            "timer_start_time": 1000,
        })));

        assert_eq!(change.cues, vec![TimerCue::Start]);
        assert!(change.restart);
        assert_eq!(countdown.remaining(), Some(60));

        let cues = run_to_end(&mut countdown);
        assert_eq!(
            cues,
            vec![(10, TimerCue::Warning), (0, TimerCue::Finish)]
        );
        assert_eq!(countdown.phase(), CountdownPhase::Expired);
        assert_eq!(countdown.tick(), None);
    }

    #[test]
    fn identical_retrigger_is_silent() {
        let mut countdown = Countdown::new();
        let payload = json!({
            "show_timer": true,
            "timer_seconds": 60,
            "timer_start_time": 1000,
        });
        countdown.observe(&snapshot(payload.clone()));
        countdown.tick();

        let change = countdown.observe(&snapshot(payload));
        assert_eq!(change, CountdownChange::default());
        assert_eq!(countdown.remaining(), Some(59));
    }

    #[test]
    fn same_start_time_with_new_duration_restarts_without_cues() {
        let mut countdown = Countdown::new();
        countdown.observe(&snapshot(json!({
            "show_timer": true,
            "timer_seconds": 60,
            "timer_start_time": 1000,
        })));
        for _ in 0..55 {
            countdown.tick();
        }

        let change = countdown.observe(&snapshot(json!({
            "show_timer": true,
            "timer_seconds": 30,
            "timer_start_time": 1000,
        })));
        assert!(change.cues.is_empty());
        assert!(change.restart);

        // The warning already fired for this instance.
        assert_eq!(run_to_end(&mut countdown), vec![(0, TimerCue::Finish)]);
    }

    #[test]
    fn new_start_time_resets_cues() {
        let mut countdown = Countdown::new();
        countdown.observe(&snapshot(json!({
            "show_timer": true,
            "timer_seconds": 12,
            "timer_start_time": 1,
        })));
        run_to_end(&mut countdown);

        let change = countdown.observe(&snapshot(json!({
            "show_timer": true,
            "timer_seconds": 12,
            "timer_start_time": 2,
        })));
        assert_eq!(change.cues, vec![TimerCue::Start]);
        assert_eq!(
            run_to_end(&mut countdown),
            vec![(10, TimerCue::Warning), (0, TimerCue::Finish)]
        );
    }

    #[test]
    fn hiding_the_timer_cancels_but_remembers_the_instance() {
        let mut countdown = Countdown::new();
        let shown = json!({
            "show_timer": true,
            "timer_seconds": 60,
            "timer_start_time": 7,
        });
        countdown.observe(&snapshot(shown.clone()));

        let change = countdown.observe(&snapshot(json!({
            "show_timer": false,
            "timer_seconds": 60,
            "timer_start_time": 7,
        })));
        assert!(change.stop);
        assert_eq!(countdown.phase(), CountdownPhase::Idle);
        assert_eq!(countdown.remaining(), None);
        assert_eq!(countdown.tick(), None);

        let change = countdown.observe(&snapshot(shown));
        assert!(change.cues.is_empty());
        assert!(change.restart);
        assert_eq!(countdown.remaining(), Some(60));

        let change = countdown.observe(&snapshot(json!({
            "show_timer": true,
            "timer_seconds": 60,
            "timer_start_time": 8,
        })));
        assert_eq!(change.cues, vec![TimerCue::Start]);
    }

    #[test]
    fn cancel_clears_warning_and_finish_flags() {
        let mut countdown = Countdown::new();
        countdown.observe(&snapshot(json!({
            "show_timer": true,
            "timer_seconds": 12,
            "timer_start_time": 7,
        })));
        run_to_end(&mut countdown);
        countdown.observe(&snapshot(json!({ "show_timer": false })));

        countdown.observe(&snapshot(json!({
            "show_timer": true,
            "timer_seconds": 12,
            "timer_start_time": 7,
        })));
        assert_eq!(
            run_to_end(&mut countdown),
            vec![(10, TimerCue::Warning), (0, TimerCue::Finish)]
        );
    }

    #[test]
    fn missing_start_time_is_still_an_instance() {
        let mut countdown = Countdown::new();
        let change = countdown.observe(&snapshot(json!({
            "show_timer": true,
            "timer_seconds": 5,
        })));
        assert_eq!(change.cues, vec![TimerCue::Start]);
    }

    #[test]
    fn zero_duration_expires_without_finish_cue() {
        let mut countdown = Countdown::new();
        countdown.observe(&snapshot(json!({
            "show_timer": true,
            "timer_seconds": 0,
            "timer_start_time": 3,
        })));
        assert_eq!(countdown.tick(), None);
        assert_eq!(countdown.phase(), CountdownPhase::Expired);
    }

    #[test]
    fn idle_countdown_ignores_hidden_timer() {
        let mut countdown = Countdown::new();
        let change = countdown.observe(&snapshot(json!({ "content": "logo" })));
        assert_eq!(change, CountdownChange::default());
    }
}
