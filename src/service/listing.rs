use tracing::debug;

use crate::erx::{Erx, ResultE};
use crate::model::store::Boundary;
use crate::model::types::ListingItem;
use crate::model::SharedStore;
use crate::service::cursor::Cursor;
use crate::web::messages::pagination::{ListingPage, Page, PageRequest, Sort};

pub type ListingPageOf = Page<ListingItem, Cursor>;

/// Resolves listing page requests against a store.
///
/// Each call is one independent read. Nothing is held between pages, the cursor alone
/// carries the position.
#[derive(Clone)]
pub struct Resolver {
    store: SharedStore,
}

impl Resolver {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn resolve_page(&self, request: &PageRequest) -> ResultE<ListingPageOf> {
        let sort = request.sort();
        let after = match request.cursor() {
            None => None,
            Some(raw) => Some(self.boundary(raw, sort).await?),
        };

        let fetched = self.store.find_page(sort, after.as_ref(), request.limit() + 1).await?;
        debug!("listing {} after {:?}: fetched {} for limit {}", sort, after.as_ref().map(|b| &b.id), fetched.len(), request.limit());

        Ok(Page::from_peek(fetched, request.limit(), |item| Cursor::of(item, sort)))
    }

    /// resolve and encode for the wire
    pub async fn listing(&self, request: &PageRequest) -> ResultE<ListingPage<ListingItem>> {
        let page = self.resolve_page(request).await?;
        let next_cursor = match &page.next_cursor {
            Some(cursor) => Some(cursor.encode()?),
            None => None,
        };
        Ok(ListingPage { questionnaires: page.items, next_cursor, has_more: page.has_more })
    }

    /// encoded token first, bare item id second
    async fn boundary(&self, raw: &str, sort: Sort) -> ResultE<Boundary> {
        if let Some(cursor) = Cursor::decode(raw) {
            return cursor.boundary_for(sort);
        }

        match self.store.boundary_of(raw, sort).await? {
            Some(boundary) => Ok(boundary),
            None => Err(Erx::validation("Invalid cursor")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::memory::MemoryStore;
    use crate::model::types::QuestionnaireDetail;
    use crate::web::messages::pagination::{SortBy, SortOrder};
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    fn detail(id: &str, name: &str, at: i64, responses: i64) -> QuestionnaireDetail {
        let ts = Utc.timestamp_opt(at, 0).unwrap();
        QuestionnaireDetail {
            id: id.into(),
            name: name.into(),
            description: "seeded questionnaire".into(),
            created_at: ts,
            updated_at: ts,
            response_count: responses,
            questions: vec![],
        }
    }

    async fn seeded() -> (Resolver, SharedStore) {
        let store: SharedStore = Arc::new(MemoryStore::new());
        for (id, name, at, responses) in [("a", "Alpha", 1, 3), ("b", "Bravo", 2, 3), ("c", "Charlie", 3, 1)] {
            store.import(detail(id, name, at, responses)).await.unwrap();
        }
        (Resolver::new(store.clone()), store)
    }

    fn ids(page: &ListingPageOf) -> Vec<&str> {
        page.items.iter().map(|i| i.id.as_str()).collect()
    }

    #[tokio::test]
    async fn pages_follow_the_cursor() {
        let (resolver, _) = seeded().await;
        let first = resolver.resolve_page(&PageRequest::first(2, Sort::default()).unwrap()).await.unwrap();
        assert_eq!(ids(&first), vec!["c", "b"]);
        assert!(first.has_more);
        assert_eq!(first.next_cursor.as_ref().map(Cursor::id), Some("b"));

        let token = first.next_cursor.unwrap().encode().unwrap();
        let second = resolver.resolve_page(&PageRequest::new(Some(token), 2, Sort::default()).unwrap()).await.unwrap();
        assert_eq!(ids(&second), vec!["a"]);
        assert!(!second.has_more);
        assert!(second.next_cursor.is_none());
    }

    #[tokio::test]
    async fn bare_id_cursor_resolves_through_store() {
        let (resolver, store) = seeded().await;
        let sort = Sort::new(SortBy::ResponseCount, SortOrder::Desc);
        let page = resolver.resolve_page(&PageRequest::new(Some("a".into()), 5, sort).unwrap()).await.unwrap();
        assert_eq!(ids(&page), vec!["b", "c"]);

        store.remove("a").await.unwrap();
        let err = resolver.resolve_page(&PageRequest::new(Some("a".into()), 5, sort).unwrap()).await.unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn deleted_cursor_item_still_continues() {
        let (resolver, store) = seeded().await;
        let first = resolver.resolve_page(&PageRequest::first(1, Sort::default()).unwrap()).await.unwrap();
        let token = first.next_cursor.unwrap().encode().unwrap();
        store.remove("c").await.unwrap();

        let next = resolver.resolve_page(&PageRequest::new(Some(token), 5, Sort::default()).unwrap()).await.unwrap();
        assert_eq!(ids(&next), vec!["b", "a"]);
    }

    #[tokio::test]
    async fn listing_wire_form() {
        let (resolver, _) = seeded().await;
        let sort = Sort::new(SortBy::Name, SortOrder::Asc);
        let page = resolver.listing(&PageRequest::first(3, sort).unwrap()).await.unwrap();
        assert_eq!(page.questionnaires.len(), 3);
        assert_eq!(page.next_cursor, None);
        assert!(!page.has_more);
    }
}
