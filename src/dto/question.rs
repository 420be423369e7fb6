use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dao::models::{QuestionEntity, QuestionStatus},
    dto::{
        format_optional_time, format_system_time,
        validation::{validate_entity_id, validate_not_blank},
    },
};

/// Public projection of a question from the pool.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QuestionView {
    pub id: String,
    pub viewer_id: Option<String>,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub answer: String,
    pub keywords: Vec<String>,
    pub media_url: Option<String>,
    pub media_thumbnail_url: Option<String>,
    pub difficulty: Option<u32>,
    pub category: Option<String>,
    pub is_approved: bool,
    pub approved_at: Option<String>,
    #[schema(value_type = String, example = "pending")]
    pub question_status: QuestionStatus,
    pub created_at: String,
    pub updated_at: String,
}

impl From<QuestionEntity> for QuestionView {
    fn from(question: QuestionEntity) -> Self {
        Self {
            id: question.id,
            viewer_id: question.viewer_id,
            text: question.text,
            kind: question.kind,
            answer: question.answer,
            keywords: question.keywords,
            media_url: question.media_url,
            media_thumbnail_url: question.media_thumbnail_url,
            difficulty: question.difficulty,
            category: question.category,
            is_approved: question.is_approved,
            approved_at: format_optional_time(question.approved_at),
            question_status: question.question_status,
            created_at: format_system_time(question.created_at),
            updated_at: format_system_time(question.updated_at),
        }
    }
}

fn default_kind() -> String {
    "text".into()
}

/// Payload used to add a question to the pool.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateQuestionRequest {
    #[serde(default)]
    #[validate(custom(function = "validate_entity_id"))]
    pub viewer_id: Option<String>,
    #[validate(custom(function = "validate_not_blank"))]
    pub text: String,
    /// Presentation type, `text` when omitted.
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
    #[validate(custom(function = "validate_not_blank"))]
    pub answer: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub media_url: Option<String>,
    #[serde(default)]
    pub media_thumbnail_url: Option<String>,
    #[serde(default)]
    #[validate(range(min = 1, max = 10))]
    pub difficulty: Option<u32>,
    #[serde(default)]
    pub category: Option<String>,
}

impl CreateQuestionRequest {
    pub fn into_entity(self, id: String) -> QuestionEntity {
        let now = std::time::SystemTime::now();
        QuestionEntity {
            id,
            viewer_id: self.viewer_id,
            text: self.text,
            kind: self.kind,
            answer: self.answer,
            keywords: self.keywords,
            media_url: self.media_url,
            media_thumbnail_url: self.media_thumbnail_url,
            difficulty: self.difficulty,
            category: self.category,
            is_approved: false,
            approved_at: None,
            question_status: QuestionStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update of a question; absent fields keep their stored value.
#[skip_serializing_none]
#[derive(Debug, Default, Serialize, Deserialize, ToSchema, Validate)]
#[serde(default)]
pub struct UpdateQuestionRequest {
    #[validate(custom(function = "validate_not_blank"))]
    pub text: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[validate(custom(function = "validate_not_blank"))]
    pub answer: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub media_url: Option<String>,
    pub media_thumbnail_url: Option<String>,
    #[validate(range(min = 1, max = 10))]
    pub difficulty: Option<u32>,
    pub category: Option<String>,
    #[schema(value_type = Option<String>)]
    pub question_status: Option<QuestionStatus>,
}

impl UpdateQuestionRequest {
    pub fn apply_to(self, question: &mut QuestionEntity) {
        if let Some(text) = self.text {
            question.text = text;
        }
        if let Some(kind) = self.kind {
            question.kind = kind;
        }
        if let Some(answer) = self.answer {
            question.answer = answer;
        }
        if let Some(keywords) = self.keywords {
            question.keywords = keywords;
        }
        question.media_url = self.media_url.or(question.media_url.take());
        question.media_thumbnail_url = self
            .media_thumbnail_url
            .or(question.media_thumbnail_url.take());
        question.difficulty = self.difficulty.or(question.difficulty);
        question.category = self.category.or(question.category.take());
        if let Some(status) = self.question_status {
            question.question_status = status;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_defaults_to_text_questions() {
        let request: CreateQuestionRequest =
            serde_json::from_str(r#"{"text": "Why is the sky blue?", "answer": "Scattering"}"#)
                .unwrap();
        assert!(request.validate().is_ok());

        let question = request.into_entity("q1".into());
        assert_eq!(question.kind, "text");
        assert!(!question.is_approved);
        assert_eq!(question.question_status, QuestionStatus::Pending);
    }

    #[test]
    fn blank_answer_is_rejected() {
        let request: CreateQuestionRequest =
            serde_json::from_str(r#"{"text": "Who?", "answer": ""}"#).unwrap();
        assert!(request.validate().is_err());
    }
}
