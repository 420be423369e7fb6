//! Viewers submitting questions and the experts answering them.

use std::{sync::Arc, time::SystemTime};

use tracing::info;

use crate::{
    dao::{
        models::{ExpertEntity, ViewerEntity, new_record_id},
        show_store::ShowStore,
    },
    dto::people::{
        CreateExpertRequest, CreateViewerRequest, ExpertView, UpdateExpertRequest,
        UpdateViewerRequest, ViewerView,
    },
    error::ServiceError,
    state::SharedState,
};

async fn load_viewer(store: &Arc<dyn ShowStore>, id: &str) -> Result<ViewerEntity, ServiceError> {
    store
        .find_viewer(id.to_owned())
        .await?
        .ok_or_else(|| ServiceError::not_found("Viewer", id))
}

async fn load_expert(store: &Arc<dyn ShowStore>, id: &str) -> Result<ExpertEntity, ServiceError> {
    store
        .find_expert(id.to_owned())
        .await?
        .ok_or_else(|| ServiceError::not_found("Expert", id))
}

/// Viewers, newest first.
pub async fn list_viewers(state: &SharedState) -> Result<Vec<ViewerView>, ServiceError> {
    let store = state.show_store().await?;
    let mut viewers = store.list_viewers().await?;
    viewers.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(viewers.into_iter().map(Into::into).collect())
}

pub async fn get_viewer(state: &SharedState, id: &str) -> Result<ViewerView, ServiceError> {
    let store = state.show_store().await?;
    Ok(load_viewer(&store, id).await?.into())
}

pub async fn create_viewer(
    state: &SharedState,
    request: CreateViewerRequest,
) -> Result<ViewerView, ServiceError> {
    let store = state.show_store().await?;
    let viewer = request.into_entity(new_record_id());
    store.save_viewer(viewer.clone()).await?;
    Ok(viewer.into())
}

pub async fn update_viewer(
    state: &SharedState,
    id: &str,
    request: UpdateViewerRequest,
) -> Result<ViewerView, ServiceError> {
    let store = state.show_store().await?;
    let mut viewer = load_viewer(&store, id).await?;
    request.apply_to(&mut viewer);
    store.save_viewer(viewer.clone()).await?;
    Ok(viewer.into())
}

pub async fn delete_viewer(state: &SharedState, id: &str) -> Result<(), ServiceError> {
    let store = state.show_store().await?;
    if !store.delete_viewer(id.to_owned()).await? {
        return Err(ServiceError::not_found("Viewer", id));
    }
    info!(viewer_id = %id, "viewer removed");
    Ok(())
}

/// Experts, alphabetically by name.
pub async fn list_experts(state: &SharedState) -> Result<Vec<ExpertView>, ServiceError> {
    let store = state.show_store().await?;
    let mut experts = store.list_experts().await?;
    experts.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(experts.into_iter().map(Into::into).collect())
}

pub async fn get_expert(state: &SharedState, id: &str) -> Result<ExpertView, ServiceError> {
    let store = state.show_store().await?;
    Ok(load_expert(&store, id).await?.into())
}

pub async fn create_expert(
    state: &SharedState,
    request: CreateExpertRequest,
) -> Result<ExpertView, ServiceError> {
    let store = state.show_store().await?;
    let expert = request.into_entity(new_record_id());
    info!(expert_id = %expert.id, name = %expert.name, "expert added");
    store.save_expert(expert.clone()).await?;
    Ok(expert.into())
}

pub async fn update_expert(
    state: &SharedState,
    id: &str,
    request: UpdateExpertRequest,
) -> Result<ExpertView, ServiceError> {
    let store = state.show_store().await?;
    let mut expert = load_expert(&store, id).await?;
    request.apply_to(&mut expert);
    expert.updated_at = SystemTime::now();
    store.save_expert(expert.clone()).await?;
    Ok(expert.into())
}

pub async fn delete_expert(state: &SharedState, id: &str) -> Result<(), ServiceError> {
    let store = state.show_store().await?;
    if !store.delete_expert(id.to_owned()).await? {
        return Err(ServiceError::not_found("Expert", id));
    }
    info!(expert_id = %id, "expert removed");
    Ok(())
}
