//! Small helpers for minting the unguessable identifiers the order flow hands out.

use rand::{distributions::Alphanumeric, Rng};

/// Length of a freshly minted verification token.
pub const VERIFICATION_TOKEN_LEN: usize = 32;

/// Mints a new pickup verification token: an unguessable alphanumeric secret.
pub fn mint_verification_token() -> String {
    random_alphanumeric(VERIFICATION_TOKEN_LEN)
}

/// Mints a new order id. Random rather than sequential so ids cannot be enumerated.
pub fn new_order_id() -> String {
    new_record_id()
}

/// Mints a random 32-hex-char record id.
pub fn new_record_id() -> String {
    let bytes: [u8; 16] = rand::thread_rng().gen();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn random_alphanumeric(len: usize) -> String {
    rand::thread_rng().sample_iter(&Alphanumeric).take(len).map(char::from).collect()
}
