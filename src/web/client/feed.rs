use std::collections::HashSet;

use crate::erx::ResultE;
use crate::model::types::ListingItem;
use crate::web::messages::pagination::{ListingPage, PageRequest, Sort, DEFAULT_LIMIT};

/// Identifies one issued page request.
///
/// A ticket is current only while its generation matches the feed and no later request
/// has been issued.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
    serial: u64,
}

/// Accumulated listing state of a client.
///
/// Every operation returns a new feed and leaves `self` untouched.
#[derive(Clone, Debug, PartialEq)]
pub struct Feed {
    sort: Sort,
    limit: i64,
    items: Vec<ListingItem>,
    next_cursor: Option<String>,
    has_more: bool,
    generation: u64,
    issued: u64,
}

impl Default for Feed {
    fn default() -> Self {
        Feed::new(Sort::default(), DEFAULT_LIMIT)
    }
}

impl Feed {
    pub fn new(sort: Sort, limit: i64) -> Self {
        Feed { sort, limit, items: vec![], next_cursor: None, has_more: true, generation: 0, issued: 0 }
    }

    pub fn sort(&self) -> Sort {
        self.sort
    }

    pub fn items(&self) -> &[ListingItem] {
        &self.items
    }

    pub fn next_cursor(&self) -> Option<&str> {
        self.next_cursor.as_deref()
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Issue the next page request, None once the listing is exhausted.
    /// A request issued here supersedes every earlier ticket.
    pub fn begin(&self) -> ResultE<Option<(Feed, Ticket, PageRequest)>> {
        if !self.has_more {
            return Ok(None);
        }

        let request = PageRequest::new(self.next_cursor.clone(), self.limit, self.sort)?;
        let ticket = Ticket { generation: self.generation, serial: self.issued + 1 };
        let next = Feed { issued: ticket.serial, ..self.clone() };
        Ok(Some((next, ticket, request)))
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.generation == self.generation && ticket.serial == self.issued
    }

    /// append a fetched page, dropping it when the ticket is superseded
    pub fn apply(&self, ticket: Ticket, page: ListingPage<ListingItem>) -> Feed {
        if !self.is_current(ticket) {
            tracing::debug!("dropping superseded page, ticket {:?} feed generation {} issued {}", ticket, self.generation, self.issued);
            return self.clone();
        }

        let mut seen: HashSet<String> = self.items.iter().map(|i| i.id.clone()).collect();
        let mut items = self.items.clone();
        items.extend(page.questionnaires.into_iter().filter(|i| seen.insert(i.id.clone())));

        Feed { items, next_cursor: page.next_cursor, has_more: page.has_more, ..self.clone() }
    }

    /// switch sort; a different sort starts over and invalidates every in-flight request
    pub fn with_sort(&self, sort: Sort) -> Feed {
        if sort == self.sort {
            return self.clone();
        }
        Feed { sort, ..self.reset() }
    }

    /// start over under the same sort
    pub fn refresh(&self) -> Feed {
        self.reset()
    }

    /// drop a deleted item
    pub fn without(&self, id: &str) -> Feed {
        Feed { items: self.items.iter().filter(|i| i.id != id).cloned().collect(), ..self.clone() }
    }

    fn reset(&self) -> Feed {
        Feed { generation: self.generation + 1, issued: 0, ..Feed::new(self.sort, self.limit) }
    }
}
