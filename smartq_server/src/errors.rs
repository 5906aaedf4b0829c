use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use log::error;
use smartq_engine::{AuthApiError, CatalogApiError, OrderFlowError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("Authentication Error. {0}")]
    AuthenticationError(#[from] AuthError),
    #[error("Could not serialize access token. {0}")]
    CouldNotSerializeAccessToken(String),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("Insufficient Permissions. {0}")]
    InsufficientPermissions(String),
    #[error("The request is not valid in the order's current state. {0}")]
    InvalidState(String),
    #[error("{0}")]
    ValidationError(String),
    #[error("The payment gateway is not configured on this server")]
    PaymentGatewayNotConfigured,
    #[error("Payment gateway error. {0}")]
    PaymentGatewayError(String),
    #[error("The payment for this session has not completed")]
    PaymentIncomplete,
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::InvalidState(_) => StatusCode::BAD_REQUEST,
            Self::CouldNotSerializeAccessToken(_) => StatusCode::BAD_REQUEST,
            Self::AuthenticationError(e) => match e {
                AuthError::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
                AuthError::ValidationError(_) => StatusCode::UNAUTHORIZED,
                AuthError::PoorlyFormattedToken(_) => StatusCode::BAD_REQUEST,
                AuthError::MissingToken => StatusCode::UNAUTHORIZED,
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::InvalidVerificationToken => StatusCode::UNAUTHORIZED,
                AuthError::AccountNotFound => StatusCode::FORBIDDEN,
            },
            Self::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::PaymentIncomplete => StatusCode::PAYMENT_REQUIRED,
            Self::PaymentGatewayNotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            Self::PaymentGatewayError(_) => StatusCode::BAD_GATEWAY,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("Insufficient Permissions. {0}")]
    InsufficientPermissions(String),
    #[error("Access token is invalid. {0}")]
    ValidationError(String),
    #[error("Access token is not in the correct format. {0}")]
    PoorlyFormattedToken(String),
    #[error("No access token was provided.")]
    MissingToken,
    #[error("The email or password presented is incorrect.")]
    InvalidCredentials,
    #[error("The pickup verification token is missing or incorrect.")]
    InvalidVerificationToken,
    #[error("User account not found.")]
    AccountNotFound,
}

impl From<AuthApiError> for ServerError {
    fn from(e: AuthApiError) -> Self {
        match e {
            AuthApiError::InvalidCredentials => Self::AuthenticationError(AuthError::InvalidCredentials),
            AuthApiError::UserNotFound => Self::AuthenticationError(AuthError::AccountNotFound),
            AuthApiError::EmailAlreadyRegistered(_) => Self::ValidationError(e.to_string()),
            AuthApiError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
            AuthApiError::PasswordHashError(e) => Self::BackendError(format!("Password hashing error: {e}")),
        }
    }
}

impl From<crate::integrations::PaymentProviderError> for ServerError {
    fn from(e: crate::integrations::PaymentProviderError) -> Self {
        use crate::integrations::PaymentProviderError::*;
        match e {
            NotConfigured => Self::PaymentGatewayNotConfigured,
            Initialization(e) => Self::InitializeError(e),
            RequestError(_) | QueryError { .. } | JsonError(_) => Self::PaymentGatewayError(e.to_string()),
        }
    }
}

impl From<CatalogApiError> for ServerError {
    fn from(e: CatalogApiError) -> Self {
        match e {
            CatalogApiError::VendorNotFound(_) => Self::NoRecordFound(e.to_string()),
            CatalogApiError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
        }
    }
}

impl From<OrderFlowError> for ServerError {
    fn from(e: OrderFlowError) -> Self {
        match e {
            OrderFlowError::OrderNotFound(_) => Self::NoRecordFound(e.to_string()),
            // Revealing that the order exists but is not yours leaks order ids, so both read as the same 404
            OrderFlowError::NotYourOrder(id) => Self::NoRecordFound(format!("The requested order {id} does not exist")),
            OrderFlowError::InvalidVerificationToken(_) => {
                Self::AuthenticationError(AuthError::InvalidVerificationToken)
            },
            OrderFlowError::CannotCancel(_, _) => Self::InvalidState(e.to_string()),
            OrderFlowError::TotalMismatch { .. } |
            OrderFlowError::EmptyOrder |
            OrderFlowError::InvalidAmount |
            OrderFlowError::InvalidQuantity(_) |
            OrderFlowError::ItemNotAvailable(_) => Self::ValidationError(e.to_string()),
            OrderFlowError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
            OrderFlowError::OrderAlreadyExists(_) => Self::BackendError(e.to_string()),
            OrderFlowError::CatalogError(e) => ServerError::from(e),
            OrderFlowError::RecordMalformed(e) => Self::BackendError(format!("Malformed record: {e}")),
        }
    }
}
