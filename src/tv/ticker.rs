use std::{future, time::Duration};

use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};

use super::session::ClockCommand;

/// Countdown resolution.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// One-second clock behind the question countdown. Stopped tickers never fire.
#[derive(Debug, Default)]
pub struct CountdownTicker {
    interval: Option<Interval>,
}

impl CountdownTicker {
    /// Stopped ticker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start ticking one period from now, discarding any running schedule.
    pub fn restart(&mut self) {
        let mut interval = interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.interval = Some(interval);
    }

    /// Stop ticking until the next restart.
    pub fn stop(&mut self) {
        self.interval = None;
    }

    pub fn is_active(&self) -> bool {
        self.interval.is_some()
    }

    /// Follow a session's clock instruction.
    pub fn apply(&mut self, command: ClockCommand) {
        match command {
            ClockCommand::Keep => {}
            ClockCommand::Restart => self.restart(),
            ClockCommand::Stop => self.stop(),
        }
    }

    /// Wait for the next tick. Cancel-safe, so it can sit in a `select!` loop.
    pub async fn tick(&mut self) {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
            }
            None => future::pending::<()>().await,
        }
    }
}
