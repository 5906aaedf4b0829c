//! `SqliteDatabase` is a concrete implementation of an order-flow engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`crate::traits`]
//! module.
use std::fmt::Debug;

use log::*;
use sqlx::SqlitePool;

use super::db::{catalog, db_url, new_pool, orders, users};
use crate::{
    db_types::{MenuItem, NewOrder, NewUser, Order, OrderId, OrderStatusType, PaymentStatus, User, Vendor},
    traits::{
        AuthApiError,
        CatalogApiError,
        CatalogManagement,
        OrderFlowError,
        OrderManagement,
        UserManagement,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl OrderManagement for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        orders::insert_order(order, &mut conn).await
    }

    async fn fetch_order_by_id(&self, order_id: &OrderId) -> Result<Option<Order>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_id(order_id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_orders_for_user(&self, user_id: &str) -> Result<Vec<Order>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        let result = orders::fetch_orders_for_user(user_id, &mut conn).await?;
        Ok(result)
    }

    async fn update_status_with_precondition(
        &self,
        order_id: &OrderId,
        expected_status: OrderStatusType,
        new_status: OrderStatusType,
    ) -> Result<Option<Order>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        let result = orders::update_status_with_precondition(order_id, expected_status, new_status, &mut conn).await?;
        Ok(result)
    }

    async fn set_payment_status(
        &self,
        order_id: &OrderId,
        payment_status: PaymentStatus,
    ) -> Result<Order, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        orders::set_payment_status(order_id, payment_status, &mut conn).await
    }

    async fn update_verification_token(&self, order_id: &OrderId, token: &str) -> Result<Order, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        orders::update_verification_token(order_id, token, &mut conn).await
    }

    async fn fetch_progressable_orders(&self) -> Result<Vec<Order>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        let result = orders::fetch_progressable_orders(&mut conn).await?;
        Ok(result)
    }

    async fn close(&mut self) -> Result<(), OrderFlowError> {
        self.pool.close().await;
        Ok(())
    }
}

impl CatalogManagement for SqliteDatabase {
    async fn fetch_vendors(&self) -> Result<Vec<Vendor>, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        let vendors = catalog::fetch_vendors(&mut conn).await?;
        Ok(vendors)
    }

    async fn fetch_vendor(&self, vendor_id: &str) -> Result<Option<Vendor>, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        let vendor = catalog::fetch_vendor(vendor_id, &mut conn).await?;
        Ok(vendor)
    }

    async fn fetch_menu_for_vendor(&self, vendor_id: &str) -> Result<Vec<MenuItem>, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        let items = catalog::fetch_menu_for_vendor(vendor_id, &mut conn).await?;
        Ok(items)
    }

    async fn fetch_menu_items_by_ids(
        &self,
        vendor_id: &str,
        item_ids: &[String],
    ) -> Result<Vec<MenuItem>, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        let items = catalog::fetch_menu_items_by_ids(vendor_id, item_ids, &mut conn).await?;
        Ok(items)
    }
}

impl UserManagement for SqliteDatabase {
    async fn create_user(&self, user: NewUser) -> Result<User, AuthApiError> {
        let mut conn = self.pool.acquire().await?;
        users::create_user(user, &mut conn).await
    }

    async fn fetch_user_by_email(&self, email: &str) -> Result<Option<User>, AuthApiError> {
        let mut conn = self.pool.acquire().await?;
        let user = users::fetch_user_by_email(email, &mut conn).await?;
        Ok(user)
    }

    async fn fetch_user_by_id(&self, user_id: &str) -> Result<Option<User>, AuthApiError> {
        let mut conn = self.pool.acquire().await?;
        let user = users::fetch_user_by_id(user_id, &mut conn).await?;
        Ok(user)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        sqlx::migrate!("./migrations").run(&pool).await.map_err(|e| sqlx::Error::Migrate(Box::new(e)))?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
