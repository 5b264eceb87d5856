use serde::{Deserialize, Serialize};

use super::{EvalSessionId, EvaluationId};

/// Evaluation server credential pair. Holding both means "connected".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub session_id: EvalSessionId,
    pub evaluation_id: EvaluationId,
}

impl Credentials {
    pub fn new(session_id: impl Into<String>, evaluation_id: impl Into<String>) -> Self {
        Self {
            session_id: EvalSessionId::new(session_id),
            evaluation_id: EvaluationId::new(evaluation_id),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.session_id.is_blank() && !self.evaluation_id.is_blank()
    }
}

/// Body of a successful `POST /api/login`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(default)]
    pub message: Option<String>,
    pub session_id: EvalSessionId,
    pub evaluation_id: EvaluationId,
}

impl From<LoginResponse> for Credentials {
    fn from(response: LoginResponse) -> Self {
        Self {
            session_id: response.session_id,
            evaluation_id: response.evaluation_id,
        }
    }
}
