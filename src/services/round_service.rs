use std::{sync::Arc, time::SystemTime};

use tracing::{debug, info};

use crate::{
    dao::{
        models::{RoundEntity, RoundStatus, new_record_id},
        show_store::ShowStore,
    },
    display::DisplayStatus,
    dto::round::{CreateRoundRequest, RoundView, UpdateRoundRequest},
    error::ServiceError,
    services::game_service::load_game,
    state::SharedState,
};

async fn load_round(store: &Arc<dyn ShowStore>, id: &str) -> Result<RoundEntity, ServiceError> {
    store
        .find_round(id.to_owned())
        .await?
        .ok_or_else(|| ServiceError::not_found("Round", id))
}

async fn save(
    store: &Arc<dyn ShowStore>,
    mut round: RoundEntity,
) -> Result<RoundView, ServiceError> {
    round.updated_at = SystemTime::now();
    store.save_round(round.clone()).await?;
    Ok(round.into())
}

fn by_round_number(mut rounds: Vec<RoundEntity>) -> Vec<RoundView> {
    rounds.sort_by_key(|round| round.round_number);
    rounds.into_iter().map(Into::into).collect()
}

/// Every round of every game, ordered by round number.
pub async fn list_rounds(state: &SharedState) -> Result<Vec<RoundView>, ServiceError> {
    let store = state.show_store().await?;
    Ok(by_round_number(store.list_rounds(None).await?))
}

pub async fn list_game_rounds(
    state: &SharedState,
    game_id: &str,
) -> Result<Vec<RoundView>, ServiceError> {
    let store = state.show_store().await?;
    Ok(by_round_number(
        store.list_rounds(Some(game_id.to_owned())).await?,
    ))
}

/// The round of `game_id` with the highest round number, if any.
pub async fn current_round(
    state: &SharedState,
    game_id: &str,
) -> Result<Option<RoundView>, ServiceError> {
    let store = state.show_store().await?;
    let rounds = store.list_rounds(Some(game_id.to_owned())).await?;
    Ok(rounds
        .into_iter()
        .max_by_key(|round| round.round_number)
        .map(Into::into))
}

pub async fn get_round(state: &SharedState, id: &str) -> Result<RoundView, ServiceError> {
    let store = state.show_store().await?;
    Ok(load_round(&store, id).await?.into())
}

pub async fn create_round(
    state: &SharedState,
    request: CreateRoundRequest,
) -> Result<RoundView, ServiceError> {
    let store = state.show_store().await?;
    load_game(&store, &request.game_id).await?;
    let round = request.into_entity(new_record_id());
    info!(round_id = %round.id, game_id = %round.game_id, number = round.round_number, "creating round");
    save(&store, round).await
}

pub async fn update_round(
    state: &SharedState,
    id: &str,
    request: UpdateRoundRequest,
) -> Result<RoundView, ServiceError> {
    let store = state.show_store().await?;
    let mut round = load_round(&store, id).await?;
    request.apply_to(&mut round);
    save(&store, round).await
}

/// Set the round status; any string is accepted.
pub async fn update_status(
    state: &SharedState,
    id: &str,
    status: String,
) -> Result<RoundView, ServiceError> {
    let store = state.show_store().await?;
    let mut round = load_round(&store, id).await?;
    round.status = RoundStatus::from(status);
    save(&store, round).await
}

pub async fn select_question(
    state: &SharedState,
    id: &str,
    question_id: String,
) -> Result<RoundView, ServiceError> {
    let store = state.show_store().await?;
    let mut round = load_round(&store, id).await?;
    round.question_id = Some(question_id);
    save(&store, round).await
}

/// Shallow-merge `patch` into the stored display status and persist the result.
pub async fn merge_display_status(
    state: &SharedState,
    id: &str,
    patch: DisplayStatus,
) -> Result<RoundView, ServiceError> {
    let store = state.show_store().await?;
    let mut round = load_round(&store, id).await?;
    debug!(round_id = %id, keys = ?patch.keys().collect::<Vec<_>>(), "merging display status");
    round.display_status.merge(patch);
    save(&store, round).await
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::{models::GameEntity, show_store::MemoryShowStore},
        state::AppState,
    };

    async fn seeded_state() -> SharedState {
        let store = MemoryShowStore::new();
        store.save_game(GameEntity::new("g1".into())).await.unwrap();
        for (id, number) in [("r2", 2), ("r1", 1), ("r3", 3)] {
            store
                .save_round(RoundEntity::new(id.into(), "g1".into(), number))
                .await
                .unwrap();
        }
        store
            .save_round(RoundEntity::new("other".into(), "g2".into(), 9))
            .await
            .unwrap();
        AppState::with_store(AppConfig::default(), Arc::new(store))
    }

    fn patch(value: serde_json::Value) -> DisplayStatus {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn current_round_has_the_highest_number() {
        let state = seeded_state().await;
        let current = current_round(&state, "g1").await.unwrap().unwrap();
        assert_eq!(current.id, "r3");
        assert!(current_round(&state, "empty").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn game_rounds_are_ordered_by_number() {
        let state = seeded_state().await;
        let ids: Vec<_> = list_game_rounds(&state, "g1")
            .await
            .unwrap()
            .into_iter()
            .map(|round| round.id)
            .collect();
        assert_eq!(ids, ["r1", "r2", "r3"]);
    }

    #[tokio::test]
    async fn display_updates_merge_instead_of_replacing() {
        let state = seeded_state().await;
        merge_display_status(
            &state,
            "r1",
            patch(json!({"content": "question", "show_timer": true, "timer_seconds": 60})),
        )
        .await
        .unwrap();

        let round = merge_display_status(&state, "r1", patch(json!({"show_timer": false})))
            .await
            .unwrap();

        assert_eq!(
            serde_json::to_value(&round.display_status).unwrap(),
            json!({"content": "question", "show_timer": false, "timer_seconds": 60})
        );
    }

    #[tokio::test]
    async fn status_accepts_values_outside_the_known_set() {
        let state = seeded_state().await;
        let round = update_status(&state, "r2", "answer_shown".into())
            .await
            .unwrap();
        assert_eq!(round.status.as_str(), "answer_shown");
    }

    #[tokio::test]
    async fn creating_a_round_for_an_unknown_game_fails() {
        let state = seeded_state().await;
        let request = CreateRoundRequest {
            game_id: "nope".into(),
            round_number: 1,
            question_id: None,
            time_limit_seconds: None,
            status: None,
            display_status: None,
        };
        assert!(matches!(
            create_round(&state, request).await,
            Err(ServiceError::NotFound(_))
        ));
    }
}
