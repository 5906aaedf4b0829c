use crate::{
    db_types::{MenuItem, Vendor},
    traits::{CatalogApiError, CatalogManagement},
};

/// Read access to vendors and menus.
#[derive(Debug, Clone)]
pub struct CatalogApi<B> {
    db: B,
}

impl<B> CatalogApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> CatalogApi<B>
where B: CatalogManagement
{
    pub async fn vendors(&self) -> Result<Vec<Vendor>, CatalogApiError> {
        self.db.fetch_vendors().await
    }

    pub async fn vendor(&self, vendor_id: &str) -> Result<Vendor, CatalogApiError> {
        self.db.fetch_vendor(vendor_id).await?.ok_or_else(|| CatalogApiError::VendorNotFound(vendor_id.to_string()))
    }

    /// The full menu for a vendor. Fails if the vendor itself does not exist.
    pub async fn menu(&self, vendor_id: &str) -> Result<Vec<MenuItem>, CatalogApiError> {
        if self.db.fetch_vendor(vendor_id).await?.is_none() {
            return Err(CatalogApiError::VendorNotFound(vendor_id.to_string()));
        }
        self.db.fetch_menu_for_vendor(vendor_id).await
    }
}
