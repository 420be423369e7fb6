use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Report `ok` or `degraded`, logging connectivity issues along the way.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    match state.show_store().await {
        Ok(store) => {
            if let Err(err) = store.health_check().await {
                warn!(error = %err, "storage health check failed");
                return HealthResponse::degraded();
            }
        }
        Err(_) => warn!("storage unavailable (degraded mode)"),
    }

    if state.is_degraded() {
        HealthResponse::degraded()
    } else {
        HealthResponse::ok()
    }
}
