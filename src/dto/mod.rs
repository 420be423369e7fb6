use std::time::SystemTime;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

pub mod game;
pub mod health;
pub mod people;
pub mod question;
pub mod round;
pub mod upload;
pub mod validation;
pub mod ws;

fn format_system_time(time: SystemTime) -> String {
    OffsetDateTime::from(time)
        .format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}

fn format_optional_time(time: Option<SystemTime>) -> Option<String> {
    time.map(format_system_time)
}
