use mockall::mock;
use smartq_engine::{
    db_types::{MenuItem, NewOrder, NewUser, Order, OrderId, OrderStatusType, PaymentStatus, User, Vendor},
    traits::{AuthApiError, CatalogApiError, CatalogManagement, OrderFlowError, OrderManagement, UserManagement},
};
use sq_common::Money;

use crate::integrations::{CheckoutSession, PaymentProvider, PaymentProviderError, SessionState};

mock! {
    pub Backend {}

    impl Clone for Backend {
        fn clone(&self) -> Self;
    }

    impl OrderManagement for Backend {
        fn url(&self) -> &str;
        async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderFlowError>;
        async fn fetch_order_by_id(&self, order_id: &OrderId) -> Result<Option<Order>, OrderFlowError>;
        async fn fetch_orders_for_user(&self, user_id: &str) -> Result<Vec<Order>, OrderFlowError>;
        async fn update_status_with_precondition(
            &self,
            order_id: &OrderId,
            expected_status: OrderStatusType,
            new_status: OrderStatusType,
        ) -> Result<Option<Order>, OrderFlowError>;
        async fn set_payment_status(
            &self,
            order_id: &OrderId,
            payment_status: PaymentStatus,
        ) -> Result<Order, OrderFlowError>;
        async fn update_verification_token(
            &self,
            order_id: &OrderId,
            token: &str,
        ) -> Result<Order, OrderFlowError>;
        async fn fetch_progressable_orders(&self) -> Result<Vec<Order>, OrderFlowError>;
        async fn close(&mut self) -> Result<(), OrderFlowError>;
    }

    impl CatalogManagement for Backend {
        async fn fetch_vendors(&self) -> Result<Vec<Vendor>, CatalogApiError>;
        async fn fetch_vendor(&self, vendor_id: &str) -> Result<Option<Vendor>, CatalogApiError>;
        async fn fetch_menu_for_vendor(&self, vendor_id: &str) -> Result<Vec<MenuItem>, CatalogApiError>;
        async fn fetch_menu_items_by_ids(
            &self,
            vendor_id: &str,
            item_ids: &[String],
        ) -> Result<Vec<MenuItem>, CatalogApiError>;
    }

    impl UserManagement for Backend {
        async fn create_user(&self, user: NewUser) -> Result<User, AuthApiError>;
        async fn fetch_user_by_email(&self, email: &str) -> Result<Option<User>, AuthApiError>;
        async fn fetch_user_by_id(&self, user_id: &str) -> Result<Option<User>, AuthApiError>;
    }
}

mock! {
    pub Gateway {}

    impl Clone for Gateway {
        fn clone(&self) -> Self;
    }

    impl PaymentProvider for Gateway {
        fn is_configured(&self) -> bool;
        async fn create_checkout_session<'a, 'b>(
            &self,
            order_id: &OrderId,
            amount: Money,
            success_url: Option<&'a str>,
            cancel_url: Option<&'b str>,
        ) -> Result<CheckoutSession, PaymentProviderError>;
        async fn fetch_session(&self, session_id: &str) -> Result<SessionState, PaymentProviderError>;
    }
}
