use crate::model::SharedStore;
use crate::service::Services;
use crate::web::messages::pagination::DEFAULT_LIMIT;

/// state shared by every action
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    /// listing page size when the request has no `limit`
    pub default_limit: i64,
}

impl AppState {
    pub fn new(store: SharedStore) -> Self {
        AppState { services: Services::new(store), default_limit: DEFAULT_LIMIT }
    }

    pub fn with_default_limit(mut self, default_limit: i64) -> Self {
        self.default_limit = default_limit;
        self
    }
}
