//! Short-code assignment
//!
//! Validates custom aliases and resolves generated codes to an unused one.
//! The existence check here is check-then-act: two concurrent requests can
//! both see a code as free. The store's unique constraint on `short_code` is
//! the final arbiter, and insertion maps a lost race to `AliasAlreadyExists`.

use tracing::warn;

use crate::errors::{LinkcutError, Result};
use crate::storage::LinkStore;
use crate::utils::{DEFAULT_CODE_LENGTH, generate_code, is_valid_alias};

/// Bound on the generate-and-check loop. At 62^6 codes exhaustion is not a
/// practical concern; the cap exists so a pathological store cannot spin the
/// loop forever.
pub const MAX_GENERATION_ATTEMPTS: usize = 1000;

/// Resolve the short code for a new link.
///
/// With a custom alias: validated against the alphanumeric charset and
/// checked for collision, then returned unchanged. Without: random candidates
/// are generated until one is unused.
pub async fn assign_code(store: &dyn LinkStore, custom_alias: Option<&str>) -> Result<String> {
    if let Some(alias) = custom_alias {
        if !is_valid_alias(alias) {
            return Err(LinkcutError::invalid_alias_format(
                "Custom alias must be alphanumeric",
            ));
        }
        if store.find_by_code(alias).await?.is_some() {
            return Err(LinkcutError::alias_already_exists(
                "Custom alias already exists",
            ));
        }
        return Ok(alias.to_string());
    }

    for _ in 0..MAX_GENERATION_ATTEMPTS {
        let code = generate_code(DEFAULT_CODE_LENGTH);
        if store.find_by_code(&code).await?.is_none() {
            return Ok(code);
        }
    }

    warn!(
        "Code generation exhausted after {} attempts",
        MAX_GENERATION_ATTEMPTS
    );
    Err(LinkcutError::generation_exhausted(format!(
        "No unused code found after {} attempts",
        MAX_GENERATION_ATTEMPTS
    )))
}
