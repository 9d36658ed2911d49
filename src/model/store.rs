use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::erx::ResultE;
use crate::model::results::{Many, One};
use crate::model::types::{ListingItem, QuestionnaireDetail, QuestionnaireDraft, ResponseRecord, ResponseSubmission, Snapshot};
use crate::web::messages::pagination::{Sort, SortBy};

/// value of the primary sort column for one item
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    CreatedAt(DateTime<Utc>),
    Name(String),
    Count(i64),
}

impl SortKey {
    pub fn of(item: &ListingItem, by: SortBy) -> SortKey {
        match by {
            SortBy::CreatedAt => SortKey::CreatedAt(item.created_at),
            SortBy::Name => SortKey::Name(item.name.clone()),
            SortBy::QuestionCount => SortKey::Count(item.question_count),
            SortBy::ResponseCount => SortKey::Count(item.response_count),
        }
    }

    /// whether this key can bound a listing sorted by `by`
    pub fn fits(&self, by: SortBy) -> bool {
        matches!(
            (self, by),
            (SortKey::CreatedAt(_), SortBy::CreatedAt)
                | (SortKey::Name(_), SortBy::Name)
                | (SortKey::Count(_), SortBy::QuestionCount)
                | (SortKey::Count(_), SortBy::ResponseCount)
        )
    }

    fn compare(&self, other: &SortKey) -> Ordering {
        match (self, other) {
            (SortKey::CreatedAt(a), SortKey::CreatedAt(b)) => a.cmp(b),
            (SortKey::Name(a), SortKey::Name(b)) => a.cmp(b),
            (SortKey::Count(a), SortKey::Count(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

/// Position in a listing, `(sort value, id)`.
/// Only the values are compared, so the row that produced them may be gone.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Boundary {
    pub key: SortKey,
    pub id: String,
}

impl Boundary {
    pub fn of(item: &ListingItem, by: SortBy) -> Boundary {
        Boundary { key: SortKey::of(item, by), id: item.id.clone() }
    }
}

/// total listing order, `(primary sortOrder, id asc)`
pub fn compare_items(sort: Sort, a: &ListingItem, b: &ListingItem) -> Ordering {
    compare_to(sort, &Boundary::of(a, sort.by), &Boundary::of(b, sort.by))
}

pub fn compare_to(sort: Sort, a: &Boundary, b: &Boundary) -> Ordering {
    sort.order.apply(a.key.compare(&b.key)).then_with(|| a.id.cmp(&b.id))
}

/// strictly after the boundary in listing order
pub fn is_after(sort: Sort, item: &ListingItem, boundary: &Boundary) -> bool {
    compare_to(sort, &Boundary::of(item, sort.by), boundary) == Ordering::Greater
}

/// Persistent store of questionnaires and responses.
///
/// `questionCount` and `responseCount` are kept materialised by the implementation, in the
/// same unit of work as the mutation that changes them.
#[async_trait]
pub trait Store: Send + Sync {
    /// up to `take` listing items strictly after `after`, in `(sort, id asc)` order
    async fn find_page(&self, sort: Sort, after: Option<&Boundary>, take: u64) -> Many<ListingItem>;

    /// boundary of an existing item, None when the id does not resolve
    async fn boundary_of(&self, id: &str, sort: Sort) -> One<Boundary>;

    async fn create(&self, draft: &QuestionnaireDraft) -> ResultE<QuestionnaireDetail>;

    async fn detail(&self, id: &str) -> One<QuestionnaireDetail>;

    /// replace name, description and the whole question set
    async fn replace(&self, id: &str, draft: &QuestionnaireDraft) -> One<QuestionnaireDetail>;

    /// delete with all questions, options, responses and answers
    async fn remove(&self, id: &str) -> ResultE<bool>;

    /// None when the questionnaire does not exist
    async fn submit(&self, questionnaire_id: &str, submission: &ResponseSubmission) -> One<ResponseRecord>;

    /// newest first
    async fn responses(&self, questionnaire_id: &str) -> Many<ResponseRecord>;

    async fn response(&self, response_id: &str) -> One<ResponseRecord>;

    async fn snapshot(&self) -> ResultE<Snapshot>;

    /// insert a complete questionnaire as is, keeping ids and timestamps
    async fn import(&self, detail: QuestionnaireDetail) -> ResultE<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::messages::pagination::SortOrder;
    use chrono::TimeZone;

    fn item(id: &str, name: &str, at: i64) -> ListingItem {
        let ts = Utc.timestamp_opt(at, 0).unwrap();
        ListingItem {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            created_at: ts,
            updated_at: ts,
            question_count: 1,
            response_count: 0,
        }
    }

    #[test]
    fn ties_break_on_id_ascending_in_both_directions() {
        let a = item("a", "same", 1);
        let b = item("b", "same", 1);
        for order in [SortOrder::Asc, SortOrder::Desc] {
            let sort = Sort::new(SortBy::Name, order);
            assert_eq!(compare_items(sort, &a, &b), Ordering::Less);
        }
    }

    #[test]
    fn after_boundary_respects_direction() {
        let old = item("a", "x", 1);
        let new = item("b", "x", 2);
        let desc = Sort::new(SortBy::CreatedAt, SortOrder::Desc);
        let boundary = Boundary::of(&new, SortBy::CreatedAt);
        assert!(is_after(desc, &old, &boundary));
        assert!(!is_after(desc, &new, &boundary));
    }

    #[test]
    fn key_fits_sort() {
        assert!(SortKey::Count(3).fits(SortBy::ResponseCount));
        assert!(SortKey::Count(3).fits(SortBy::QuestionCount));
        assert!(!SortKey::Name("n".into()).fits(SortBy::CreatedAt));
    }
}
