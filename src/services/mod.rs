/// OpenAPI documentation generation.
pub mod documentation;
/// Games and their running score.
pub mod game_service;
/// Health check service.
pub mod health_service;
/// Viewers and experts.
pub mod people_service;
/// Question pool and approval.
pub mod question_service;
/// Relay event handling: persist, then broadcast to the game room.
pub mod relay_service;
/// Rounds, question selection and display status merges.
pub mod round_service;
/// Storage connection supervisor driving degraded mode.
pub mod storage_supervisor;
/// Media upload validation and storage.
pub mod upload_service;
/// WebSocket connection lifecycle for relay clients.
pub mod websocket_service;
