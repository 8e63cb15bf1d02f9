// Crypto helpers: tokens, password hashing, HMAC signatures

use crate::error::CryptoError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::{Sha256, Sha384, Sha512};

pub const PBKDF2_ROUNDS: u32 = 100_000;
const SALT_BYTES: usize = 16;

/// Hex-encoded token built from `length` random bytes
pub fn generate_token(length: usize) -> String {
    let mut bytes = vec![0u8; length];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Hash a password with PBKDF2-HMAC-SHA256
///
/// Returns `(hash, salt)`; the hash is base64 and a random hex salt is
/// generated when none is given.
pub fn hash_password(password: &str, salt: Option<&str>) -> (String, String) {
    let salt = match salt {
        Some(salt) => salt.to_string(),
        None => generate_token(SALT_BYTES),
    };

    let mut derived = [0u8; 32];
    pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt.as_bytes(), PBKDF2_ROUNDS, &mut derived);
    (STANDARD.encode(derived), salt)
}

pub fn verify_password(password: &str, hash: &str, salt: &str) -> bool {
    let (computed, _) = hash_password(password, Some(salt));
    constant_time_eq(computed.as_bytes(), hash.as_bytes())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HmacAlgorithm {
    #[default]
    Sha256,
    Sha384,
    Sha512,
}

fn mac_bytes<M: Mac + hmac::digest::KeyInit>(secret: &[u8], data: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let mut mac = <M as Mac>::new_from_slice(secret).map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Base64 HMAC signature of `data`
pub fn hmac_sign(data: impl AsRef<[u8]>, secret: &str, algorithm: HmacAlgorithm) -> Result<String, CryptoError> {
    let key = secret.as_bytes();
    let data = data.as_ref();
    let signature = match algorithm {
        HmacAlgorithm::Sha256 => mac_bytes::<Hmac<Sha256>>(key, data)?,
        HmacAlgorithm::Sha384 => mac_bytes::<Hmac<Sha384>>(key, data)?,
        HmacAlgorithm::Sha512 => mac_bytes::<Hmac<Sha512>>(key, data)?,
    };
    Ok(STANDARD.encode(signature))
}

pub fn hmac_verify(
    data: impl AsRef<[u8]>,
    signature: &str,
    secret: &str,
    algorithm: HmacAlgorithm,
) -> Result<bool, CryptoError> {
    let expected = hmac_sign(data, secret, algorithm)?;
    Ok(constant_time_eq(expected.as_bytes(), signature.as_bytes()))
}

/// Compare without short-circuiting on the first differing byte
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (byte_a, byte_b) in a.iter().zip(b.iter()) {
        result |= byte_a ^ byte_b;
    }

    result == 0
}
