//! Viewers who send in questions and the experts' table.

use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dao::models::{ExpertEntity, ViewerEntity},
    dto::{format_system_time, validation::validate_not_blank},
};

const DEFAULT_EXPERT_STATUS: &str = "active";

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ViewerView {
    pub id: String,
    pub name: String,
    pub city: Option<String>,
    pub country: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub photo_url: Option<String>,
    pub created_at: String,
}

impl From<ViewerEntity> for ViewerView {
    fn from(viewer: ViewerEntity) -> Self {
        Self {
            id: viewer.id,
            name: viewer.name,
            city: viewer.city,
            country: viewer.country,
            email: viewer.email,
            phone: viewer.phone,
            photo_url: viewer.photo_url,
            created_at: format_system_time(viewer.created_at),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateViewerRequest {
    #[validate(custom(function = "validate_not_blank"), length(max = 200))]
    pub name: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    #[validate(email)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
}

impl CreateViewerRequest {
    pub fn into_entity(self, id: String) -> ViewerEntity {
        ViewerEntity {
            id,
            name: self.name,
            city: self.city,
            country: self.country,
            email: self.email,
            phone: self.phone,
            photo_url: self.photo_url,
            created_at: SystemTime::now(),
        }
    }
}

#[skip_serializing_none]
#[derive(Debug, Default, Serialize, Deserialize, ToSchema, Validate)]
#[serde(default)]
pub struct UpdateViewerRequest {
    #[validate(custom(function = "validate_not_blank"), length(max = 200))]
    pub name: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub photo_url: Option<String>,
}

impl UpdateViewerRequest {
    pub fn apply_to(self, viewer: &mut ViewerEntity) {
        if let Some(name) = self.name {
            viewer.name = name;
        }
        viewer.city = self.city.or(viewer.city.take());
        viewer.country = self.country.or(viewer.country.take());
        viewer.email = self.email.or(viewer.email.take());
        viewer.phone = self.phone.or(viewer.phone.take());
        viewer.photo_url = self.photo_url.or(viewer.photo_url.take());
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExpertView {
    pub id: String,
    pub name: String,
    pub status: String,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ExpertEntity> for ExpertView {
    fn from(expert: ExpertEntity) -> Self {
        Self {
            id: expert.id,
            name: expert.name,
            status: expert.status,
            avatar_url: expert.avatar_url,
            bio: expert.bio,
            created_at: format_system_time(expert.created_at),
            updated_at: format_system_time(expert.updated_at),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateExpertRequest {
    #[validate(custom(function = "validate_not_blank"), length(max = 200))]
    pub name: String,
    /// Defaults to `active`.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

impl CreateExpertRequest {
    pub fn into_entity(self, id: String) -> ExpertEntity {
        let now = SystemTime::now();
        ExpertEntity {
            id,
            name: self.name,
            status: self
                .status
                .unwrap_or_else(|| DEFAULT_EXPERT_STATUS.to_owned()),
            avatar_url: self.avatar_url,
            bio: self.bio,
            created_at: now,
            updated_at: now,
        }
    }
}

#[skip_serializing_none]
#[derive(Debug, Default, Serialize, Deserialize, ToSchema, Validate)]
#[serde(default)]
pub struct UpdateExpertRequest {
    #[validate(custom(function = "validate_not_blank"), length(max = 200))]
    pub name: Option<String>,
    #[validate(custom(function = "validate_not_blank"))]
    pub status: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
}

impl UpdateExpertRequest {
    pub fn apply_to(self, expert: &mut ExpertEntity) {
        if let Some(name) = self.name {
            expert.name = name;
        }
        if let Some(status) = self.status {
            expert.status = status;
        }
        expert.avatar_url = self.avatar_url.or(expert.avatar_url.take());
        expert.bio = self.bio.or(expert.bio.take());
    }
}
