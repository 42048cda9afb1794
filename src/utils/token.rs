use rand::RngCore;
use sha2::{Digest, Sha256};

/// 32 random bytes, hex encoded. Sent to the user once and never stored.
pub fn generate_login_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// What is persisted in `magic_link_tokens.token_hash`.
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}
