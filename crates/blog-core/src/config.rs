//! Process-wide blog settings passed explicitly to the services.

use crate::pagination::DEFAULT_PAGE_SIZE;

/// Whether post listings honour the publish flag for anonymous readers.
///
/// Detail and search always do. Listings historically did not, so
/// `ShowAll` is the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListingVisibility {
    #[default]
    ShowAll,
    HideUnpublished,
}

#[derive(Debug, Clone)]
pub struct BlogConfig {
    /// Posts per listing page.
    pub page_size: u64,
    pub listing_visibility: ListingVisibility,
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            listing_visibility: ListingVisibility::default(),
        }
    }
}
