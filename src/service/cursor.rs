use base64::prelude::BASE64_URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::erx::{self, Erx, ResultE};
use crate::model::store::{Boundary, SortKey};
use crate::model::types::ListingItem;
use crate::web::messages::pagination::Sort;

/// Continuation token of the listing.
///
/// Carries the id of the last item of a page together with the sort it was issued under and
/// that item's sort value, so the next page can be located even after the item is deleted.
/// On the wire it is URL-safe base64 (no padding) of the JSON form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    id: String,
    sort: Sort,
    key: SortKey,
}

impl Cursor {
    pub fn of(item: &ListingItem, sort: Sort) -> Cursor {
        Cursor { id: item.id.clone(), sort, key: SortKey::of(item, sort.by) }
    }

    /// id of the item this cursor points at
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn sort(&self) -> Sort {
        self.sort
    }

    pub fn boundary(&self) -> Boundary {
        Boundary { key: self.key.clone(), id: self.id.clone() }
    }

    pub fn encode(&self) -> ResultE<String> {
        let json = serde_json::to_vec(self).map_err(erx::smp)?;
        Ok(BASE64_URL_SAFE_NO_PAD.encode(json))
    }

    /// None when `token` is not an encoded cursor, it may still be a bare item id
    pub fn decode(token: &str) -> Option<Cursor> {
        let bytes = BASE64_URL_SAFE_NO_PAD.decode(token.as_bytes()).ok()?;
        serde_json::from_slice::<Cursor>(&bytes).ok()
    }

    /// boundary for a listing under `sort`, rejecting tokens issued for another sort
    pub fn boundary_for(&self, sort: Sort) -> ResultE<Boundary> {
        if self.sort != sort || !self.key.fits(sort.by) {
            return Err(Erx::validation(&format!("Cursor was issued for sort '{}', not '{}'", self.sort, sort)));
        }
        Ok(self.boundary())
    }
}
