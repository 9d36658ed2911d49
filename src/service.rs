pub mod cursor;
pub mod listing;
pub mod questionnaire;
pub mod statistics;

use crate::model::SharedStore;
use crate::service::listing::Resolver;
use crate::service::questionnaire::Questionnaires;
use crate::service::statistics::Statistics;

/// every service over one shared store
#[derive(Clone)]
pub struct Services {
    pub listing: Resolver,
    pub questionnaires: Questionnaires,
    pub statistics: Statistics,
}

impl Services {
    pub fn new(store: SharedStore) -> Self {
        Services {
            listing: Resolver::new(store.clone()),
            questionnaires: Questionnaires::new(store.clone()),
            statistics: Statistics::new(store),
        }
    }
}
