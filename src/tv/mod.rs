//! Headless TV screen: session state fed by relay broadcasts, the countdown
//! clock and, with the `tv-client` feature, the REST lookups and relay
//! connection themselves.

#[cfg(feature = "tv-client")]
pub mod api;
#[cfg(feature = "tv-client")]
pub mod connection;
pub mod session;
pub mod ticker;

#[cfg(feature = "tv-client")]
pub use api::{InitialState, ShowApi, ShowApiError};
#[cfg(feature = "tv-client")]
pub use connection::{RelayConnection, RelayConnectionError};
pub use session::{ClockCommand, TvEffect, TvSession, TvSettings, TvUpdate};
pub use ticker::CountdownTicker;

/// Serve the full router on an ephemeral local port.
#[cfg(all(test, feature = "tv-client"))]
pub(crate) async fn spawn_backend(state: crate::state::SharedState) -> std::net::SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, crate::routes::router(state))
            .await
            .unwrap();
    });
    addr
}
