mod simulator;
mod stripe;

pub use simulator::PaymentSimulator;
pub use stripe::{CheckoutSession, PaymentProvider, PaymentProviderError, SessionState, StripeGateway};
