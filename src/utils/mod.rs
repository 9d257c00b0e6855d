pub mod password;
pub mod time_parser;
pub mod url_validator;

/// Short-code alphabet: upper, lower, digits (62 symbols).
const CODE_ALPHABET: &[u8; 62] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Default generated code length.
pub const DEFAULT_CODE_LENGTH: usize = 6;

/// Generate a candidate short code from an injected random source.
///
/// Uniform draw over the 62-symbol alphanumeric alphabet. No uniqueness
/// guarantee; callers resolve collisions against the store.
pub fn generate_code_with<R: rand::Rng + ?Sized>(rng: &mut R, length: usize) -> String {
    use rand::RngExt;
    std::iter::repeat_with(|| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .take(length)
        .collect()
}

/// Generate a candidate short code using the thread-local random source.
pub fn generate_code(length: usize) -> String {
    generate_code_with(&mut rand::rng(), length)
}

/// Custom aliases and generated codes share one charset: `[A-Za-z0-9]`,
/// case sensitive.
pub fn is_valid_alias(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_alphanumeric())
}
