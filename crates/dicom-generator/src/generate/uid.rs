//! UID generation.

use rand::Rng;
use sha2::{Digest, Sha512};
use uuid::Uuid;

use crate::limits::DICOM_GENERATOR_ROOT_UID;

/// Maximum length of a UI value.
pub const MAX_UID_LEN: usize = 64;

/// Generates a UID under the generator root from RNG entropy.
///
/// The suffix is the decimal rendering of the first 128 bits of the SHA-512
/// digest of 100 random bits, cut to fit [`MAX_UID_LEN`]. The same seed
/// yields the same UID.
pub fn generate_uid(rng: &mut impl Rng) -> String {
    generate_uid_with_prefix(DICOM_GENERATOR_ROOT_UID, rng)
}

/// Generates a UID under `prefix`, which should end with a dot.
pub fn generate_uid_with_prefix(prefix: &str, rng: &mut impl Rng) -> String {
    let entropy: u128 = rng.r#gen::<u128>() >> 28;
    let digest = Sha512::digest(entropy.to_string().as_bytes());

    let mut high = [0u8; 16];
    high.copy_from_slice(&digest[..16]);
    let suffix = u128::from_be_bytes(high).max(1).to_string();

    let room = MAX_UID_LEN.saturating_sub(prefix.len());
    let mut uid = String::with_capacity(MAX_UID_LEN);
    uid.push_str(prefix);
    uid.push_str(&suffix[..suffix.len().min(room)]);
    uid
}

/// A fresh random UID in the `2.25.<uuid>` form.
pub fn uuid_uid() -> String {
    format!("2.25.{}", Uuid::new_v4().as_u128())
}

/// Returns true if `uid` is a syntactically valid UID.
pub fn is_valid_uid(uid: &str) -> bool {
    !uid.is_empty()
        && uid.len() <= MAX_UID_LEN
        && uid.split('.').all(|part| {
            !part.is_empty()
                && part.bytes().all(|b| b.is_ascii_digit())
                && (part == "0" || !part.starts_with('0'))
        })
}
