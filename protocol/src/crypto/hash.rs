//! # Hashing Utilities
//!
//! BLAKE3, and only BLAKE3. SIGNET has no cross-chain compatibility
//! surface that would force SHA-256 on us, so there is exactly one hash
//! function in the protocol and exactly three ways to call it: plain,
//! domain-separated, and domain-separated over multiple parts.
//!
//! ## Domain separation
//!
//! Every protocol derivation — account salts, account addresses,
//! operation digests, module identifiers — uses [`domain_hash`] or
//! [`hash_parts`] with its own context string from
//! [`crate::config`]. BLAKE3's `derive_key` mode gives each context a
//! different internal IV, so cross-context collisions are impossible by
//! construction. Don't prepend tags manually; that's what amateurs do.

/// Compute the plain BLAKE3 hash of the input data.
///
/// The workhorse. Used where the input is already unambiguous on its own,
/// e.g. hashing a public key into an address payload.
pub fn blake3_hash(data: &[u8]) -> [u8; 32] {
    *blake3::hash(data).as_bytes()
}

/// Compute a domain-separated hash using BLAKE3's `derive_key` mode.
///
/// `domain_hash("ctx-a", data)` and `domain_hash("ctx-b", data)` never
/// collide, even for identical `data` — the context string selects a
/// different internal IV.
pub fn domain_hash(context: &str, data: &[u8]) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new_derive_key(context);
    hasher.update(data);
    *hasher.finalize().as_bytes()
}

/// Domain-separated hash over multiple byte slices, fed sequentially.
///
/// Equivalent to hashing the concatenation, without the temporary buffer.
/// Callers are responsible for making the part layout unambiguous: the
/// protocol only ever feeds fixed-width fields (addresses, ids, network
/// tags) with at most one variable-length part in final position.
pub fn hash_parts(context: &str, parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new_derive_key(context);
    for part in parts {
        hasher.update(part);
    }
    *hasher.finalize().as_bytes()
}
