//! TV display contract: the open display-status document, its typed snapshot,
//! the view reducer and the question countdown.

pub mod countdown;
pub mod snapshot;
pub mod status;
pub mod view;

pub use countdown::{Countdown, CountdownChange, CountdownPhase, TimerCue};
pub use snapshot::{ContentMode, DisplaySnapshot};
pub use status::DisplayStatus;
pub use view::{ScorePair, TvFrame, ViewContext, ViewMode, compose_frame, select_view};
