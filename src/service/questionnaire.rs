use tracing::info;

use crate::erx::{Erx, ResultE, ResultEX};
use crate::model::types::{QuestionnaireDetail, QuestionnaireDraft, ResponseRecord, ResponseSubmission};
use crate::model::SharedStore;

/// questionnaire and response operations on top of a store
#[derive(Clone)]
pub struct Questionnaires {
    store: SharedStore,
}

fn questionnaire_not_found() -> Erx {
    Erx::not_found("Questionnaire not found")
}

impl Questionnaires {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn create(&self, draft: &QuestionnaireDraft) -> ResultE<QuestionnaireDetail> {
        draft.check()?;
        let detail = self.store.create(draft).await?;
        info!("questionnaire {} created with {} questions", detail.id, detail.questions.len());
        Ok(detail)
    }

    pub async fn get(&self, id: &str) -> ResultE<QuestionnaireDetail> {
        self.store.detail(id).await?.ok_or_else(questionnaire_not_found)
    }

    pub async fn replace(&self, id: &str, draft: &QuestionnaireDraft) -> ResultE<QuestionnaireDetail> {
        draft.check()?;
        let detail = self.store.replace(id, draft).await?.ok_or_else(questionnaire_not_found)?;
        info!("questionnaire {} replaced", id);
        Ok(detail)
    }

    pub async fn delete(&self, id: &str) -> ResultEX {
        if !self.store.remove(id).await? {
            return Err(questionnaire_not_found());
        }
        info!("questionnaire {} deleted", id);
        Ok(())
    }

    /// store a response, every answer must reference a question of the questionnaire
    pub async fn submit(&self, id: &str, submission: &ResponseSubmission) -> ResultE<ResponseRecord> {
        let detail = self.get(id).await?;

        if submission.end_time < submission.start_time {
            return Err(Erx::validation("endTime must not be before startTime"));
        }
        if submission.completion_time.is_some_and(|seconds| seconds < 0) {
            return Err(Erx::validation("completionTime must not be negative"));
        }

        let unknown: Vec<&str> =
            submission.answers.iter().filter(|a| detail.question(&a.question_id).is_none()).map(|a| a.question_id.as_str()).collect();
        if !unknown.is_empty() {
            return Err(Erx::validation(&format!("Unknown question ids: {}", unknown.join(", "))));
        }

        let record = self.store.submit(id, submission).await?.ok_or_else(questionnaire_not_found)?;
        info!("response {} submitted for questionnaire {}", record.id, id);
        Ok(record)
    }

    /// newest first
    pub async fn responses(&self, id: &str) -> ResultE<Vec<ResponseRecord>> {
        self.get(id).await?;
        self.store.responses(id).await
    }

    pub async fn response(&self, response_id: &str) -> ResultE<ResponseRecord> {
        self.store.response(response_id).await?.ok_or_else(|| Erx::not_found("Response not found"))
    }
}
