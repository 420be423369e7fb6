/// Persisted entities of the show.
pub mod models;
/// Storage backends behind the [`show_store::ShowStore`] trait.
pub mod show_store;
/// Backend-agnostic storage errors.
pub mod storage;
