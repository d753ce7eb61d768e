//! Derived short codes for cover records.
//!
//! When a cover arrives without a farmer, enumerator or society code, one is
//! derived from the corresponding free-text name: `PREFIX-SLG-A1B2C3`. The
//! slug keeps the code debuggable (it points back at the seed text); the
//! hashed, salted suffix makes collisions unlikely without promising global
//! uniqueness — the store's unique constraints remain the authority, and a
//! collision there is a retryable creation failure.

use rand_core::{OsRng, RngCore};
use sha2::{Digest, Sha256};

pub const FARMER_PREFIX: &str = "FARM";
pub const ENUMERATOR_PREFIX: &str = "ENUM";
pub const SOCIETY_PREFIX: &str = "SOC";

/// Derive a code for `seed` under `prefix`.
///
/// Each call salts the hash with fresh random bytes, so repeated calls for
/// the same seed produce distinct codes.
pub fn generate_code(seed: &str, prefix: &str) -> String {
  let slug: String = seed
    .chars()
    .filter(char::is_ascii_alphanumeric)
    .take(3)
    .collect::<String>()
    .to_ascii_uppercase();

  let mut salt = [0u8; 16];
  OsRng.fill_bytes(&mut salt);

  let mut hasher = Sha256::new();
  hasher.update(seed.as_bytes());
  hasher.update(salt);
  let digest = hasher.finalize();

  format!("{prefix}-{slug:X<3}-{}", hex::encode_upper(&digest[..3]))
}
