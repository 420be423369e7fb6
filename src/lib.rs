//! Library crate for quiz-show-back, exposing modules for binaries and integration tests.

pub mod config;
pub mod dao;
pub mod display;
pub mod dto;
pub mod error;
pub mod routes;
pub mod services;
pub mod state;
pub mod tv;
