use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::erx::{Erx, ResultE};

/// upper bound for `limit`, inclusive
pub const MAX_LIMIT: i64 = 50;

/// default page size when the request has none
pub const DEFAULT_LIMIT: i64 = 10;

/// sortable listing dimension
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    #[default]
    CreatedAt,
    Name,
    QuestionCount,
    ResponseCount,
}

/// sort direction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// (sortBy, sortOrder) pair; the listing default is `createdAt desc`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Sort {
    pub by: SortBy,
    pub order: SortOrder,
}

impl SortBy {
    pub const ALL: [SortBy; 4] = [SortBy::CreatedAt, SortBy::Name, SortBy::QuestionCount, SortBy::ResponseCount];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::CreatedAt => "createdAt",
            SortBy::Name => "name",
            SortBy::QuestionCount => "questionCount",
            SortBy::ResponseCount => "responseCount",
        }
    }

    pub fn parse(s: &str) -> Option<SortBy> {
        SortBy::ALL.into_iter().find(|by| by.as_str() == s)
    }
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    pub fn parse(s: &str) -> Option<SortOrder> {
        match s {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }

    /// orient an ascending comparison
    pub fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

impl Sort {
    pub fn new(by: SortBy, order: SortOrder) -> Self {
        Self { by, order }
    }

    /// Resolve raw query values.
    ///
    /// An unknown `sortBy` falls back to the whole default (`createdAt desc`), whatever the
    /// order said. An unknown `sortOrder` with a known `sortBy` falls back to `desc`.
    /// Neither case is an error.
    pub fn parse(by: Option<&str>, order: Option<&str>) -> Sort {
        let by = match by {
            None => SortBy::default(),
            Some(raw) => match SortBy::parse(raw) {
                Some(by) => by,
                None => {
                    tracing::warn!("unknown sortBy '{}', falling back to {}", raw, Sort::default());
                    return Sort::default();
                },
            },
        };

        let order = match order {
            None => SortOrder::default(),
            Some(raw) => SortOrder::parse(raw).unwrap_or_else(|| {
                tracing::warn!("unknown sortOrder '{}', falling back to desc", raw);
                SortOrder::Desc
            }),
        };

        Sort { by, order }
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.by.as_str(), self.order.as_str())
    }
}

/// raw listing query string, `?cursor=&limit=&sortBy=&sortOrder=`
///
/// limit is kept as text so that `-1` or `abc` surface as validation errors instead of
/// extractor rejections
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    pub cursor: Option<String>,
    pub limit: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl PageQuery {
    pub fn into_request(self, default_limit: i64) -> ResultE<PageRequest> {
        let limit = match self.limit.as_deref().map(str::trim) {
            None | Some("") => default_limit,
            Some(raw) => raw.parse::<i64>().map_err(|_| Erx::validation("Invalid limit parameter"))?,
        };

        let sort = Sort::parse(self.sort_by.as_deref(), self.sort_order.as_deref());
        let cursor = self.cursor.filter(|c| !c.trim().is_empty());

        PageRequest::new(cursor, limit, sort)
    }
}

/// validated page request, `0 < limit <= 50`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageRequest {
    cursor: Option<String>,
    limit: u64,
    sort: Sort,
}

impl PageRequest {
    pub fn new(cursor: Option<String>, limit: i64, sort: Sort) -> ResultE<Self> {
        if limit <= 0 || limit > MAX_LIMIT {
            return Err(Erx::validation("Invalid limit parameter"));
        }

        Ok(Self { cursor, limit: limit as u64, sort })
    }

    pub fn first(limit: i64, sort: Sort) -> ResultE<Self> {
        Self::new(None, limit, sort)
    }

    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn sort(&self) -> Sort {
        self.sort
    }

    /// query pairs for the listing endpoint
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("limit", self.limit.to_string()),
            ("sortBy", self.sort.by.as_str().to_string()),
            ("sortOrder", self.sort.order.as_str().to_string()),
        ];
        if let Some(cursor) = &self.cursor {
            pairs.push(("cursor", cursor.clone()));
        }
        pairs
    }
}

/// one resolved page
#[derive(Clone, Debug, PartialEq)]
pub struct Page<T, C> {
    pub items: Vec<T>,
    pub next_cursor: Option<C>,
    pub has_more: bool,
}

impl<T, C> Page<T, C> {
    pub fn empty() -> Self {
        Self { items: vec![], next_cursor: None, has_more: false }
    }

    /// Build a page from a `limit + 1` peek fetch.
    ///
    /// The extra row only signals that more rows exist and is dropped. The cursor comes
    /// from the last kept item.
    pub fn from_peek(mut fetched: Vec<T>, limit: u64, cursor_of: impl Fn(&T) -> C) -> Self {
        let limit = limit as usize;
        if fetched.len() <= limit {
            return Self { items: fetched, next_cursor: None, has_more: false };
        }

        fetched.truncate(limit);
        let next_cursor = fetched.last().map(cursor_of);
        let has_more = next_cursor.is_some();
        Self { items: fetched, next_cursor, has_more }
    }
}

/// listing wire body, `{ questionnaires, nextCursor, hasMore }`
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ListingPage<T> {
    pub questionnaires: Vec<T>,
    pub next_cursor: Option<String>,
    pub has_more: bool,
}
