use std::{sync::Arc, time::SystemTime};

use tracing::info;

use crate::{
    dao::{
        models::{QuestionEntity, new_record_id},
        show_store::ShowStore,
    },
    dto::question::{CreateQuestionRequest, QuestionView, UpdateQuestionRequest},
    error::ServiceError,
    state::SharedState,
};

async fn load_question(
    store: &Arc<dyn ShowStore>,
    id: &str,
) -> Result<QuestionEntity, ServiceError> {
    store
        .find_question(id.to_owned())
        .await?
        .ok_or_else(|| ServiceError::not_found("Question", id))
}

async fn save(
    store: &Arc<dyn ShowStore>,
    mut question: QuestionEntity,
) -> Result<QuestionView, ServiceError> {
    question.updated_at = SystemTime::now();
    store.save_question(question.clone()).await?;
    Ok(question.into())
}

fn newest_first(mut questions: Vec<QuestionEntity>) -> Vec<QuestionView> {
    questions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    questions.into_iter().map(Into::into).collect()
}

pub async fn list_questions(state: &SharedState) -> Result<Vec<QuestionView>, ServiceError> {
    let store = state.show_store().await?;
    Ok(newest_first(store.list_questions().await?))
}

/// Approved questions only, newest first.
pub async fn list_approved(state: &SharedState) -> Result<Vec<QuestionView>, ServiceError> {
    let store = state.show_store().await?;
    let mut questions = store.list_questions().await?;
    questions.retain(|question| question.is_approved);
    Ok(newest_first(questions))
}

pub async fn get_question(state: &SharedState, id: &str) -> Result<QuestionView, ServiceError> {
    let store = state.show_store().await?;
    Ok(load_question(&store, id).await?.into())
}

pub async fn create_question(
    state: &SharedState,
    request: CreateQuestionRequest,
) -> Result<QuestionView, ServiceError> {
    let store = state.show_store().await?;
    let question = request.into_entity(new_record_id());
    info!(question_id = %question.id, kind = %question.kind, "question submitted");
    save(&store, question).await
}

pub async fn update_question(
    state: &SharedState,
    id: &str,
    request: UpdateQuestionRequest,
) -> Result<QuestionView, ServiceError> {
    let store = state.show_store().await?;
    let mut question = load_question(&store, id).await?;
    request.apply_to(&mut question);
    save(&store, question).await
}

/// Approve a question for air, stamping the approval time.
pub async fn approve_question(state: &SharedState, id: &str) -> Result<QuestionView, ServiceError> {
    let store = state.show_store().await?;
    let mut question = load_question(&store, id).await?;
    question.is_approved = true;
    question.approved_at = Some(SystemTime::now());
    info!(question_id = %id, "question approved");
    save(&store, question).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::AppConfig, dao::show_store::MemoryShowStore, state::AppState};

    fn request(text: &str) -> CreateQuestionRequest {
        serde_json::from_value(serde_json::json!({"text": text, "answer": "42"})).unwrap()
    }

    #[tokio::test]
    async fn approval_moves_a_question_into_the_approved_list() {
        let state = AppState::with_store(AppConfig::default(), Arc::new(MemoryShowStore::new()));
        let first = create_question(&state, request("first")).await.unwrap();
        create_question(&state, request("second")).await.unwrap();
        assert!(list_approved(&state).await.unwrap().is_empty());

        let approved = approve_question(&state, &first.id).await.unwrap();

        assert!(approved.is_approved);
        assert!(approved.approved_at.is_some());
        let ids: Vec<_> = list_approved(&state)
            .await
            .unwrap()
            .into_iter()
            .map(|question| question.id)
            .collect();
        assert_eq!(ids, [first.id]);
    }

    #[tokio::test]
    async fn approving_an_unknown_question_is_not_found() {
        let state = AppState::with_store(AppConfig::default(), Arc::new(MemoryShowStore::new()));
        assert!(matches!(
            approve_question(&state, "q404").await,
            Err(ServiceError::NotFound(_))
        ));
    }
}
