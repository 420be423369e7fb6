use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the quiz show backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::websocket::ws_handler,
        crate::routes::games::list_games,
        crate::routes::games::active_game,
        crate::routes::games::get_game,
        crate::routes::games::create_game,
        crate::routes::games::update_game,
        crate::routes::games::start_game,
        crate::routes::rounds::list_rounds,
        crate::routes::rounds::list_game_rounds,
        crate::routes::rounds::current_round,
        crate::routes::rounds::get_round,
        crate::routes::rounds::create_round,
        crate::routes::rounds::update_round,
        crate::routes::rounds::update_status,
        crate::routes::rounds::update_display_status,
        crate::routes::questions::list_questions,
        crate::routes::questions::list_approved,
        crate::routes::questions::get_question,
        crate::routes::questions::create_question,
        crate::routes::questions::update_question,
        crate::routes::questions::approve_question,
        crate::routes::people::list_viewers,
        crate::routes::people::get_viewer,
        crate::routes::people::create_viewer,
        crate::routes::people::update_viewer,
        crate::routes::people::delete_viewer,
        crate::routes::people::list_experts,
        crate::routes::people::get_expert,
        crate::routes::people::create_expert,
        crate::routes::people::update_expert,
        crate::routes::people::delete_expert,
        crate::routes::upload::upload_media,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::health::HealthStatus,
            crate::dto::game::GameView,
            crate::dto::game::CreateGameRequest,
            crate::dto::game::UpdateGameRequest,
            crate::dto::round::RoundView,
            crate::dto::round::CreateRoundRequest,
            crate::dto::round::UpdateRoundRequest,
            crate::dto::round::RoundStatusRequest,
            crate::dto::question::QuestionView,
            crate::dto::question::CreateQuestionRequest,
            crate::dto::question::UpdateQuestionRequest,
            crate::dto::people::ViewerView,
            crate::dto::people::CreateViewerRequest,
            crate::dto::people::UpdateViewerRequest,
            crate::dto::people::ExpertView,
            crate::dto::people::CreateExpertRequest,
            crate::dto::people::UpdateExpertRequest,
            crate::dto::upload::UploadResponse,
            crate::dto::upload::UploadForm,
            crate::dto::ws::JoinGame,
            crate::dto::ws::ScoreUpdate,
            crate::dto::ws::RoundStatusUpdate,
            crate::dto::ws::QuestionSelect,
            crate::dto::ws::DisplayUpdate,
            crate::dto::ws::PlaySound,
            crate::dto::ws::ScoreChanged,
            crate::dto::ws::RoundStatusChanged,
            crate::dto::ws::QuestionSelected,
            crate::dto::ws::DisplayChanged,
            crate::dto::ws::SoundCue,
            crate::display::DisplayStatus,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "relay", description = "WebSocket relay shared by operator consoles and TV screens"),
        (name = "games", description = "Games and their running score"),
        (name = "rounds", description = "Rounds and their display status"),
        (name = "questions", description = "Viewer question pool"),
        (name = "viewers", description = "Viewers submitting questions"),
        (name = "experts", description = "The experts' table"),
        (name = "upload", description = "Media uploads for the TV screen"),
    )
)]
pub struct ApiDoc;
