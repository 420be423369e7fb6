use std::{sync::Arc, time::SystemTime};

use tracing::info;

use crate::{
    dao::{
        models::{GameEntity, GameStatus, new_record_id},
        show_store::ShowStore,
    },
    dto::game::{CreateGameRequest, GameView, UpdateGameRequest},
    error::ServiceError,
    state::SharedState,
};

/// Fetch a game or fail with `NotFound`.
pub(crate) async fn load_game(
    store: &Arc<dyn ShowStore>,
    id: &str,
) -> Result<GameEntity, ServiceError> {
    store
        .find_game(id.to_owned())
        .await?
        .ok_or_else(|| ServiceError::not_found("Game", id))
}

async fn save(store: &Arc<dyn ShowStore>, mut game: GameEntity) -> Result<GameView, ServiceError> {
    game.updated_at = SystemTime::now();
    store.save_game(game.clone()).await?;
    Ok(game.into())
}

/// All games, newest first.
pub async fn list_games(state: &SharedState) -> Result<Vec<GameView>, ServiceError> {
    let store = state.show_store().await?;
    let mut games = store.list_games().await?;
    games.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(games.into_iter().map(Into::into).collect())
}

/// Most recently created game whose status is `active`.
pub async fn find_active_game(state: &SharedState) -> Result<Option<GameView>, ServiceError> {
    let store = state.show_store().await?;
    let games = store.list_games().await?;
    Ok(games
        .into_iter()
        .filter(|game| game.status == GameStatus::Active)
        .max_by_key(|game| game.created_at)
        .map(Into::into))
}

pub async fn get_game(state: &SharedState, id: &str) -> Result<GameView, ServiceError> {
    let store = state.show_store().await?;
    Ok(load_game(&store, id).await?.into())
}

pub async fn create_game(
    state: &SharedState,
    request: CreateGameRequest,
) -> Result<GameView, ServiceError> {
    let store = state.show_store().await?;
    let game = request.into_entity(new_record_id());
    info!(game_id = %game.id, "creating game");
    save(&store, game).await
}

pub async fn update_game(
    state: &SharedState,
    id: &str,
    request: UpdateGameRequest,
) -> Result<GameView, ServiceError> {
    let store = state.show_store().await?;
    let mut game = load_game(&store, id).await?;
    request.apply_to(&mut game);
    save(&store, game).await
}

/// Mark a game as on air and stamp its start time.
pub async fn start_game(state: &SharedState, id: &str) -> Result<GameView, ServiceError> {
    let store = state.show_store().await?;
    let mut game = load_game(&store, id).await?;
    game.status = GameStatus::Active;
    game.start_time = Some(SystemTime::now());
    info!(game_id = %id, "game started");
    save(&store, game).await
}

/// Overwrite the sides of the score that are present; the other side keeps its stored value.
pub async fn update_score(
    state: &SharedState,
    id: &str,
    experts_score: Option<u32>,
    viewers_score: Option<u32>,
) -> Result<GameView, ServiceError> {
    let store = state.show_store().await?;
    let mut game = load_game(&store, id).await?;
    if let Some(score) = experts_score {
        game.experts_score = score;
    }
    if let Some(score) = viewers_score {
        game.viewers_score = score;
    }
    save(&store, game).await
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{config::AppConfig, dao::show_store::MemoryShowStore, state::AppState};

    fn state_with(store: MemoryShowStore) -> SharedState {
        AppState::with_store(AppConfig::default(), Arc::new(store))
    }

    #[tokio::test]
    async fn partial_score_update_keeps_the_other_side() {
        let store = MemoryShowStore::new();
        let mut game = GameEntity::new("g1".into());
        game.viewers_score = 7;
        store.save_game(game).await.unwrap();
        let state = state_with(store);

        let updated = update_score(&state, "g1", Some(5), None).await.unwrap();

        assert_eq!((updated.experts_score, updated.viewers_score), (5, 7));
    }

    #[tokio::test]
    async fn unknown_game_is_not_found() {
        let state = state_with(MemoryShowStore::new());
        let err = get_game(&state, "missing").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(message) if message.contains("missing")));
    }

    #[tokio::test]
    async fn active_game_is_the_newest_active_one() {
        let store = MemoryShowStore::new();
        let base = SystemTime::now();
        for (id, status, age) in [
            ("old", GameStatus::Active, 20),
            ("new", GameStatus::Active, 10),
            ("pending", GameStatus::Pending, 0),
        ] {
            let mut game = GameEntity::new(id.into());
            game.status = status;
            game.created_at = base - Duration::from_secs(age);
            store.save_game(game).await.unwrap();
        }
        let state = state_with(store);

        let active = find_active_game(&state).await.unwrap().unwrap();
        assert_eq!(active.id, "new");
    }

    #[tokio::test]
    async fn starting_a_game_stamps_start_time() {
        let store = MemoryShowStore::new();
        store.save_game(GameEntity::new("g1".into())).await.unwrap();
        let state = state_with(store);

        let started = start_game(&state, "g1").await.unwrap();

        assert_eq!(started.status, GameStatus::Active);
        assert!(started.start_time.is_some());
    }
}
