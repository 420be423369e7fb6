//! Process-local store used for rehearsals and tests.

use std::sync::Arc;

use dashmap::DashMap;
use futures::future::{self, BoxFuture};

use crate::dao::{
    models::{ExpertEntity, GameEntity, QuestionEntity, RoundEntity, ViewerEntity},
    show_store::ShowStore,
    storage::StorageResult,
};

#[derive(Default)]
struct Tables {
    games: DashMap<String, GameEntity>,
    rounds: DashMap<String, RoundEntity>,
    questions: DashMap<String, QuestionEntity>,
    viewers: DashMap<String, ViewerEntity>,
    experts: DashMap<String, ExpertEntity>,
}

/// [`ShowStore`] keeping every record in memory; contents are lost on restart.
#[derive(Clone, Default)]
pub struct MemoryShowStore {
    tables: Arc<Tables>,
}

impl MemoryShowStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn values<T: Clone>(table: &DashMap<String, T>) -> Vec<T> {
    table.iter().map(|entry| entry.value().clone()).collect()
}

fn ready<T: Send + 'static>(value: T) -> BoxFuture<'static, StorageResult<T>> {
    Box::pin(future::ready(Ok(value)))
}

impl ShowStore for MemoryShowStore {
    fn save_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>> {
        self.tables.games.insert(game.id.clone(), game);
        ready(())
    }

    fn find_game(&self, id: String) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        ready(self.tables.games.get(&id).map(|entry| entry.clone()))
    }

    fn list_games(&self) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        ready(values(&self.tables.games))
    }

    fn save_round(&self, round: RoundEntity) -> BoxFuture<'static, StorageResult<()>> {
        self.tables.rounds.insert(round.id.clone(), round);
        ready(())
    }

    fn find_round(&self, id: String) -> BoxFuture<'static, StorageResult<Option<RoundEntity>>> {
        ready(self.tables.rounds.get(&id).map(|entry| entry.clone()))
    }

    fn list_rounds(
        &self,
        game_id: Option<String>,
    ) -> BoxFuture<'static, StorageResult<Vec<RoundEntity>>> {
        let rounds = self
            .tables
            .rounds
            .iter()
            .filter(|entry| game_id.as_ref().is_none_or(|id| &entry.game_id == id))
            .map(|entry| entry.value().clone())
            .collect();
        ready(rounds)
    }

    fn save_question(&self, question: QuestionEntity) -> BoxFuture<'static, StorageResult<()>> {
        self.tables.questions.insert(question.id.clone(), question);
        ready(())
    }

    fn find_question(
        &self,
        id: String,
    ) -> BoxFuture<'static, StorageResult<Option<QuestionEntity>>> {
        ready(self.tables.questions.get(&id).map(|entry| entry.clone()))
    }

    fn list_questions(&self) -> BoxFuture<'static, StorageResult<Vec<QuestionEntity>>> {
        ready(values(&self.tables.questions))
    }

    fn save_viewer(&self, viewer: ViewerEntity) -> BoxFuture<'static, StorageResult<()>> {
        self.tables.viewers.insert(viewer.id.clone(), viewer);
        ready(())
    }

    fn find_viewer(&self, id: String) -> BoxFuture<'static, StorageResult<Option<ViewerEntity>>> {
        ready(self.tables.viewers.get(&id).map(|entry| entry.clone()))
    }

    fn list_viewers(&self) -> BoxFuture<'static, StorageResult<Vec<ViewerEntity>>> {
        ready(values(&self.tables.viewers))
    }

    fn delete_viewer(&self, id: String) -> BoxFuture<'static, StorageResult<bool>> {
        ready(self.tables.viewers.remove(&id).is_some())
    }

    fn save_expert(&self, expert: ExpertEntity) -> BoxFuture<'static, StorageResult<()>> {
        self.tables.experts.insert(expert.id.clone(), expert);
        ready(())
    }

    fn find_expert(&self, id: String) -> BoxFuture<'static, StorageResult<Option<ExpertEntity>>> {
        ready(self.tables.experts.get(&id).map(|entry| entry.clone()))
    }

    fn list_experts(&self) -> BoxFuture<'static, StorageResult<Vec<ExpertEntity>>> {
        ready(values(&self.tables.experts))
    }

    fn delete_expert(&self, id: String) -> BoxFuture<'static, StorageResult<bool>> {
        ready(self.tables.experts.remove(&id).is_some())
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        ready(())
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        ready(())
    }
}
