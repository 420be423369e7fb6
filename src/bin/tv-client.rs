//! Headless TV screen: loads a game over REST, follows its room on the relay and logs what it
//! would render and play.

use std::{env, time::Duration};

use anyhow::Context;
use tokio::time::sleep;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quiz_show_back::{
    config::AppConfig,
    display::TvFrame,
    tv::{
        CountdownTicker, RelayConnection, ShowApi, TvEffect, TvSession, TvSettings, TvUpdate,
    },
};

const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(5);

struct Screen {
    session: TvSession,
    ticker: CountdownTicker,
    last_frame: Option<TvFrame>,
}

impl Screen {
    fn render(&mut self, update: TvUpdate) {
        self.ticker.apply(update.clock);

        for TvEffect::PlaySound { file, volume } in update.effects {
            info!(file = %file, volume, "playing sound");
        }

        if !update.redraw {
            return;
        }
        let frame = self.session.frame();
        if self.last_frame.as_ref() != Some(&frame) {
            info!(
                view = frame.view.name(),
                banner = frame.banner.is_some(),
                countdown = ?self.session.countdown().remaining(),
                "frame changed"
            );
            self.last_frame = Some(frame);
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let relay_url = env::var("RELAY_URL").unwrap_or_else(|_| "ws://localhost:8080/game".into());
    let api_url = env::var("API_URL").unwrap_or_else(|_| "http://localhost:8080".into());
    let asset_base_url = env::var("ASSET_BASE_URL").unwrap_or_else(|_| api_url.clone());
    let api = ShowApi::new(&api_url).context("failed to build REST client")?;

    let game_id = match env::var("GAME_ID") {
        Ok(game_id) => game_id,
        Err(_) => tokio::select! {
            game_id = wait_for_active_game(&api) => game_id,
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                return Ok(());
            }
        },
    };

    let config = AppConfig::load();
    let mut screen = Screen {
        session: TvSession::new(
            game_id.clone(),
            TvSettings::from_config(&config, asset_base_url),
        ),
        ticker: CountdownTicker::new(),
        last_frame: None,
    };

    tokio::select! {
        _ = follow(&relay_url, &api, &game_id, &mut screen) => {},
        _ = tokio::signal::ctrl_c() => info!("shutting down"),
    }

    Ok(())
}

/// Poll `GET /api/games/active` until a game is running.
async fn wait_for_active_game(api: &ShowApi) -> String {
    let mut backoff = INITIAL_BACKOFF;

    loop {
        match api.active_game().await {
            Ok(Some(game)) => {
                info!(game_id = %game.id, "following the active game");
                return game.id;
            }
            Ok(None) => info!("no active game yet"),
            Err(err) => warn!(error = %err, "active game lookup failed"),
        }

        sleep(backoff).await;
        backoff = (backoff * 2).min(MAX_BACKOFF);
    }
}

/// Stay connected to the relay, re-joining the room and reloading the game after every reconnect.
async fn follow(relay_url: &str, api: &ShowApi, game_id: &str, screen: &mut Screen) {
    let mut backoff = INITIAL_BACKOFF;

    loop {
        match RelayConnection::connect(relay_url).await {
            Ok(mut connection) => match connection.join(game_id).await {
                Ok(()) => {
                    info!(url = %connection.url(), game_id, "joined game room");
                    backoff = INITIAL_BACKOFF;
                    match api.initial_state(game_id).await {
                        Ok(state) => {
                            let update = screen.session.seed(state.scores, state.display_status);
                            screen.render(update);
                        }
                        Err(err) => warn!(error = %err, "failed to load game state; waiting for broadcasts"),
                    }
                    pump(&mut connection, screen).await;
                    warn!("relay connection lost");
                }
                Err(err) => warn!(error = %err, "failed to join game room"),
            },
            Err(err) => warn!(error = %err, "relay connection attempt failed"),
        }

        info!(delay = ?backoff, "reconnecting");
        sleep(backoff).await;
        backoff = (backoff * 2).min(MAX_BACKOFF);
    }
}

async fn pump(connection: &mut RelayConnection, screen: &mut Screen) {
    loop {
        tokio::select! {
            event = connection.next_event() => match event {
                Ok(Some(event)) => {
                    let update = screen.session.apply(event);
                    screen.render(update);
                }
                Ok(None) => return,
                Err(err) => {
                    warn!(error = %err, "relay read failed");
                    return;
                }
            },
            _ = screen.ticker.tick() => {
                let update = screen.session.tick();
                screen.render(update);
            }
        }
    }
}

fn init_tracing() {
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
