//! Request Types
//!
//! JSON bodies and query strings accepted by the HTTP endpoints.

use serde::{Deserialize, Serialize};

use noviq_core::AnswerSet;

/// AI completion proxy body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRequest {
    pub prompt: String,
    pub system_prompt: String,
}

/// Combined submit + analyze + store body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswersRequest {
    pub prompt: String,
    pub answers: AnswerSet,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// `?userId=` on the analysis reads
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    #[serde(default)]
    pub user_id: Option<String>,
}

impl UserQuery {
    /// The user id, treating an empty value as absent.
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref().filter(|id| !id.trim().is_empty())
    }
}

/// Account registration body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub prompt: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_request_from_browser_shape() {
        let req: SubmitAnswersRequest = serde_json::from_str(
            r#"{"prompt":"tea bar","answers":{"q1":{"question":"Who?","selected":"Students"}},"userId":"u1"}"#,
        )
        .unwrap();
        assert_eq!(req.answers.get("q1").unwrap().selected, "Students");
        assert_eq!(req.user_id.as_deref(), Some("u1"));
    }

    #[test]
    fn test_blank_user_id_is_absent() {
        let query = UserQuery {
            user_id: Some(" ".to_string()),
        };
        assert!(query.user_id().is_none());
        assert!(UserQuery::default().user_id().is_none());
    }
}
