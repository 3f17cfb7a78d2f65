//! Short code generation and validation utilities.
//!
//! Codes are derived from the long URL plus a fresh cryptographically secure
//! nonce, hashed with SHA-256 and rendered in base-62. Uniqueness is the
//! registry's job: two calls with the same seed are expected to differ.

use crate::error::AppError;
use serde_json::json;
use sha2::{Digest, Sha256};

/// Base-62 alphabet: `[a-z][A-Z][0-9]`.
pub const BASE62_ALPHABET: &[u8; 62] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of generated codes.
pub const DEFAULT_CODE_LENGTH: usize = 6;

/// Length of the last-resort code used after the retry budget is spent.
pub const FALLBACK_CODE_LENGTH: usize = 8;

/// Size of the random nonce mixed into every hash input.
const NONCE_LENGTH_BYTES: usize = 16;

/// Reserved codes that cannot be used as custom aliases.
///
/// These collide with routes mounted next to `/{code}`.
const RESERVED_CODES: &[&str] = &["health", "static", "create", "admin"];

/// Produces candidate short codes for a long URL.
///
/// This is the seam used by tests to force collisions.
pub trait CodeGenerator: Send + Sync {
    /// Returns a code of exactly `length` characters for `seed`.
    fn generate(&self, seed: &str, length: usize) -> String;
}

/// Production generator: `base62(sha256(seed || nonce))[..length]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntropyCodeGenerator;

impl CodeGenerator for EntropyCodeGenerator {
    fn generate(&self, seed: &str, length: usize) -> String {
        generate_code(seed, length)
    }
}

/// Generates a short code for `seed`.
///
/// # Panics
///
/// Panics if the system random number generator fails. There is no safe way
/// to continue issuing codes without entropy.
pub fn generate_code(seed: &str, length: usize) -> String {
    let mut nonce = [0u8; NONCE_LENGTH_BYTES];

    getrandom::fill(&mut nonce).expect("Failed to generate random bytes");

    let mut hasher = Sha256::new();
    hasher.update(seed.as_bytes());
    hasher.update(nonce);
    let digest = hasher.finalize();

    let mut code = to_base62(&digest);
    code.truncate(length);
    code
}

/// Encodes a big-endian unsigned integer in base-62.
///
/// Repeatedly divides the number by 62, collecting remainders least-significant
/// first, then reverses them. Zero encodes as the first alphabet symbol.
pub fn to_base62(bytes: &[u8]) -> String {
    let mut number: Vec<u8> = bytes.iter().copied().skip_while(|b| *b == 0).collect();

    if number.is_empty() {
        return (BASE62_ALPHABET[0] as char).to_string();
    }

    let mut digits = Vec::with_capacity(bytes.len() * 2);

    while !number.is_empty() {
        let mut remainder: u32 = 0;
        let mut quotient = Vec::with_capacity(number.len());

        for &byte in &number {
            let acc = (remainder << 8) | u32::from(byte);
            let q = acc / 62;
            remainder = acc % 62;

            if !(quotient.is_empty() && q == 0) {
                quotient.push(q as u8);
            }
        }

        digits.push(BASE62_ALPHABET[remainder as usize]);
        number = quotient;
    }

    digits.iter().rev().map(|&d| d as char).collect()
}

/// Returns true if every character belongs to the base-62 alphabet.
pub fn is_base62(code: &str) -> bool {
    code.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// Validates a user-provided custom alias.
///
/// # Rules
///
/// - Length: 6-8 characters
/// - Allowed characters: `[a-zA-Z0-9]`
/// - Cannot be a reserved route name
///
/// # Errors
///
/// Returns [`AppError::Validation`] if any validation rule is violated.
///
/// # Examples
///
/// ```ignore
/// assert!(validate_custom_code("promo25").is_ok());
/// assert!(validate_custom_code("abc").is_err());       // Too short
/// assert!(validate_custom_code("my-code").is_err());   // Hyphen
/// assert!(validate_custom_code("health").is_err());    // Reserved
/// ```
pub fn validate_custom_code(code: &str) -> Result<(), AppError> {
    if code.len() < DEFAULT_CODE_LENGTH || code.len() > FALLBACK_CODE_LENGTH {
        return Err(AppError::bad_request(
            "Custom alias must be 6-8 characters",
            json!({ "provided_length": code.len() }),
        ));
    }

    if !is_base62(code) {
        return Err(AppError::bad_request(
            "Custom alias can only contain letters and digits",
            json!({ "code": code }),
        ));
    }

    if RESERVED_CODES.contains(&code) {
        return Err(AppError::bad_request(
            "This alias is reserved",
            json!({ "code": code }),
        ));
    }

    Ok(())
}
