#[cfg(feature = "couch-store")]
pub mod couchdb;
pub mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use crate::dao::models::{ExpertEntity, GameEntity, QuestionEntity, RoundEntity, ViewerEntity};
use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;

pub use memory::MemoryShowStore;

/// Abstraction over the persistence layer for show records.
///
/// Saves are upserts keyed by the record id. Lists come back unordered; the
/// service layer applies the ordering each endpoint promises.
pub trait ShowStore: Send + Sync {
    fn save_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>>;
    fn find_game(&self, id: String) -> BoxFuture<'static, StorageResult<Option<GameEntity>>>;
    fn list_games(&self) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>>;

    fn save_round(&self, round: RoundEntity) -> BoxFuture<'static, StorageResult<()>>;
    fn find_round(&self, id: String) -> BoxFuture<'static, StorageResult<Option<RoundEntity>>>;
    /// List rounds, restricted to one game when `game_id` is set.
    fn list_rounds(
        &self,
        game_id: Option<String>,
    ) -> BoxFuture<'static, StorageResult<Vec<RoundEntity>>>;

    fn save_question(&self, question: QuestionEntity) -> BoxFuture<'static, StorageResult<()>>;
    fn find_question(
        &self,
        id: String,
    ) -> BoxFuture<'static, StorageResult<Option<QuestionEntity>>>;
    fn list_questions(&self) -> BoxFuture<'static, StorageResult<Vec<QuestionEntity>>>;

    fn save_viewer(&self, viewer: ViewerEntity) -> BoxFuture<'static, StorageResult<()>>;
    fn find_viewer(&self, id: String) -> BoxFuture<'static, StorageResult<Option<ViewerEntity>>>;
    fn list_viewers(&self) -> BoxFuture<'static, StorageResult<Vec<ViewerEntity>>>;
    /// Remove a viewer, returning whether a record was deleted.
    fn delete_viewer(&self, id: String) -> BoxFuture<'static, StorageResult<bool>>;

    fn save_expert(&self, expert: ExpertEntity) -> BoxFuture<'static, StorageResult<()>>;
    fn find_expert(&self, id: String) -> BoxFuture<'static, StorageResult<Option<ExpertEntity>>>;
    fn list_experts(&self) -> BoxFuture<'static, StorageResult<Vec<ExpertEntity>>>;
    /// Remove an expert, returning whether a record was deleted.
    fn delete_expert(&self, id: String) -> BoxFuture<'static, StorageResult<bool>>;

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
