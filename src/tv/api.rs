//! REST lookups a TV makes before it trusts the relay for updates.

use std::sync::Arc;

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::{
    display::{DisplayStatus, ScorePair},
    dto::{game::GameView, round::RoundView},
};

/// Failures of a [`ShowApi`] lookup.
#[derive(Debug, Error)]
pub enum ShowApiError {
    /// The HTTP client could not be built.
    #[error("failed to build HTTP client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
    /// The request never got an answer.
    #[error("failed to send request to `{url}`")]
    RequestSend {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// The backend answered with an error status.
    #[error("unexpected response status {status} for `{url}`")]
    RequestStatus { url: String, status: StatusCode },
    /// The body was not the expected JSON.
    #[error("failed to decode response from `{url}`")]
    DecodeResponse {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Persisted state of a game as a TV needs it on (re)connect.
#[derive(Debug, Clone, PartialEq)]
pub struct InitialState {
    /// Scores of the game.
    pub scores: ScorePair,
    /// Display status of the current round, `None` before the first round.
    pub display_status: Option<DisplayStatus>,
}

/// Read-only client of the backend's REST surface.
#[derive(Debug, Clone)]
pub struct ShowApi {
    client: Client,
    base_url: Arc<str>,
}

impl ShowApi {
    /// Client for the backend at `base_url`, e.g. `http://localhost:8080`.
    pub fn new(base_url: &str) -> Result<Self, ShowApiError> {
        let client = Client::builder()
            .build()
            .map_err(|source| ShowApiError::ClientBuilder { source })?;
        Ok(Self {
            client,
            base_url: Arc::from(base_url.trim_end_matches('/')),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ShowApiError> {
        let url = format!("{}{}", self.base_url, path);
        let response: Response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| ShowApiError::RequestSend {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ShowApiError::RequestStatus { url, status });
        }

        response
            .json::<T>()
            .await
            .map_err(|source| ShowApiError::DecodeResponse { url, source })
    }

    /// Most recent active game, if any.
    pub async fn active_game(&self) -> Result<Option<GameView>, ShowApiError> {
        self.get_json("/api/games/active").await
    }

    /// One game by id.
    pub async fn game(&self, game_id: &str) -> Result<GameView, ShowApiError> {
        self.get_json(&format!("/api/games/{game_id}")).await
    }

    /// Highest-numbered round of the game, if any.
    pub async fn current_round(&self, game_id: &str) -> Result<Option<RoundView>, ShowApiError> {
        self.get_json(&format!("/api/rounds/game/{game_id}/current"))
            .await
    }

    /// Scores and current display status of `game_id`.
    pub async fn initial_state(&self, game_id: &str) -> Result<InitialState, ShowApiError> {
        let game = self.game(game_id).await?;
        let round = self.current_round(game_id).await?;
        Ok(InitialState {
            scores: ScorePair {
                experts: game.experts_score,
                viewers: game.viewers_score,
            },
            display_status: round.map(|round| round.display_status),
        })
    }
}
