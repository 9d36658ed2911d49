use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::erx::ResultE;
use crate::model::results::{Many, One};
use crate::model::store::{self, Boundary, Store};
use crate::model::types::{
    questions_from_draft, ListingItem, QuestionnaireDetail, QuestionnaireDraft, ResponseRecord, ResponseSubmission, Snapshot,
};
use crate::web::messages::pagination::Sort;

#[derive(Default)]
struct Shelves {
    questionnaires: HashMap<String, QuestionnaireDetail>,
    responses: Vec<ResponseRecord>,
}

/// In-process store. Every mutation runs under one write lock.
#[derive(Default)]
pub struct MemoryStore {
    shelves: RwLock<Shelves>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_page(&self, sort: Sort, after: Option<&Boundary>, take: u64) -> Many<ListingItem> {
        let shelves = self.shelves.read().await;
        let mut items: Vec<ListingItem> = shelves
            .questionnaires
            .values()
            .map(QuestionnaireDetail::listing_item)
            .filter(|item| after.map_or(true, |b| store::is_after(sort, item, b)))
            .collect();

        items.sort_by(|a, b| store::compare_items(sort, a, b));
        items.truncate(take as usize);
        Ok(items)
    }

    async fn boundary_of(&self, id: &str, sort: Sort) -> One<Boundary> {
        let shelves = self.shelves.read().await;
        Ok(shelves.questionnaires.get(id).map(|q| Boundary::of(&q.listing_item(), sort.by)))
    }

    async fn create(&self, draft: &QuestionnaireDraft) -> ResultE<QuestionnaireDetail> {
        let detail = QuestionnaireDetail::from_draft(draft, Utc::now());
        let mut shelves = self.shelves.write().await;
        shelves.questionnaires.insert(detail.id.clone(), detail.clone());
        Ok(detail)
    }

    async fn detail(&self, id: &str) -> One<QuestionnaireDetail> {
        Ok(self.shelves.read().await.questionnaires.get(id).cloned())
    }

    async fn replace(&self, id: &str, draft: &QuestionnaireDraft) -> One<QuestionnaireDetail> {
        let mut shelves = self.shelves.write().await;
        let Some(detail) = shelves.questionnaires.get_mut(id) else {
            return Ok(None);
        };

        detail.name = draft.name.clone();
        detail.description = draft.description.clone();
        detail.questions = questions_from_draft(draft);
        detail.updated_at = Utc::now();
        Ok(Some(detail.clone()))
    }

    async fn remove(&self, id: &str) -> ResultE<bool> {
        let mut shelves = self.shelves.write().await;
        if shelves.questionnaires.remove(id).is_none() {
            return Ok(false);
        }
        shelves.responses.retain(|r| r.questionnaire_id != id);
        Ok(true)
    }

    async fn submit(&self, questionnaire_id: &str, submission: &ResponseSubmission) -> One<ResponseRecord> {
        let mut shelves = self.shelves.write().await;
        let Some(detail) = shelves.questionnaires.get_mut(questionnaire_id) else {
            return Ok(None);
        };

        detail.response_count += 1;
        let record = ResponseRecord::from_submission(questionnaire_id, submission, Utc::now());
        shelves.responses.push(record.clone());
        Ok(Some(record))
    }

    async fn responses(&self, questionnaire_id: &str) -> Many<ResponseRecord> {
        let shelves = self.shelves.read().await;
        let mut responses: Vec<ResponseRecord> = shelves.responses.iter().filter(|r| r.questionnaire_id == questionnaire_id).cloned().collect();
        responses.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(responses)
    }

    async fn response(&self, response_id: &str) -> One<ResponseRecord> {
        Ok(self.shelves.read().await.responses.iter().find(|r| r.id == response_id).cloned())
    }

    async fn snapshot(&self) -> ResultE<Snapshot> {
        let shelves = self.shelves.read().await;
        Ok(Snapshot {
            questionnaires: shelves.questionnaires.values().map(QuestionnaireDetail::listing_item).collect(),
            question_types: shelves.questionnaires.values().flat_map(|q| q.questions.iter().map(|question| question.question_type)).collect(),
            responses: shelves.responses.iter().map(ResponseRecord::header).collect(),
        })
    }

    async fn import(&self, detail: QuestionnaireDetail) -> ResultE<()> {
        self.shelves.write().await.questionnaires.insert(detail.id.clone(), detail);
        Ok(())
    }
}
