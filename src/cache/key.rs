//! Cache key derivation

use crate::search::SearchParams;
use sha2::{Digest, Sha256};

/// Provider component used when a key is not bound to one provider
pub const NO_PROVIDER: &str = "none";

/// Generate a cache key for a (query, provider, params) triple.
///
/// Parameters are digested in name order, so two requests that differ only
/// in parameter insertion order share a key. Every component is length
/// prefixed.
pub fn derive_key(query: &str, provider: Option<&str>, params: &SearchParams) -> String {
    let mut hasher = Sha256::new();
    update_field(&mut hasher, query.as_bytes());
    update_field(&mut hasher, provider.unwrap_or(NO_PROVIDER).as_bytes());

    hasher.update((params.len() as u64).to_le_bytes());
    for (name, value) in params.sorted() {
        update_field(&mut hasher, name.as_bytes());
        update_field(&mut hasher, value.to_string().as_bytes());
    }

    format!("{:x}", hasher.finalize())
}

fn update_field(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}
