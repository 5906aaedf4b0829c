use thiserror::Error;

use crate::db_types::{MenuItem, Vendor};

#[derive(Debug, Clone, Error)]
pub enum CatalogApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("The requested vendor {0} does not exist")]
    VendorNotFound(String),
}

impl From<sqlx::Error> for CatalogApiError {
    fn from(e: sqlx::Error) -> Self {
        CatalogApiError::DatabaseError(e.to_string())
    }
}

/// Read access to the vendor and menu catalog.
///
/// The catalog is the authoritative price source. [`OrderManagement`](super::OrderManagement) backends use
/// these queries during order creation so that client-supplied prices never enter the books.
#[allow(async_fn_in_trait)]
pub trait CatalogManagement: Clone {
    /// Fetches all vendors.
    async fn fetch_vendors(&self) -> Result<Vec<Vendor>, CatalogApiError>;

    /// Fetches the vendor with the given id, or `None` if it does not exist.
    async fn fetch_vendor(&self, vendor_id: &str) -> Result<Option<Vendor>, CatalogApiError>;

    /// Fetches the full menu for a vendor. Returns an empty list for an unknown vendor.
    async fn fetch_menu_for_vendor(&self, vendor_id: &str) -> Result<Vec<MenuItem>, CatalogApiError>;

    /// Fetches the menu items with the given ids, restricted to the given vendor. Unknown ids are simply
    /// absent from the result.
    async fn fetch_menu_items_by_ids(
        &self,
        vendor_id: &str,
        item_ids: &[String],
    ) -> Result<Vec<MenuItem>, CatalogApiError>;
}
