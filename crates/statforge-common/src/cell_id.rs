use crate::error::{ErrorKind, SfError, SfResult};

/// Validates that `id` matches the cell-reference identifier grammar
/// (`[A-Za-z_][A-Za-z0-9_]*`) used by `<name>` references in the DSL.
///
/// The original graph accepted any non-empty string as a key; a malformed
/// id can never be referenced from a formula, so this crate rejects it at
/// creation time instead of letting it silently become unreachable.
pub fn validate_cell_id(id: &str) -> SfResult<()> {
    let mut chars = id.chars();
    let Some(first) = chars.next() else {
        return Err(SfError::new(ErrorKind::InvalidDsl)
            .with_message("cell id must not be empty".to_string()));
    };
    if !(first.is_ascii_alphabetic() || first == '_') {
        return Err(SfError::new(ErrorKind::InvalidDsl).with_message(format!(
            "cell id \"{id}\" must start with a letter or underscore"
        )));
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(SfError::new(ErrorKind::InvalidDsl).with_message(format!(
            "cell id \"{id}\" must contain only letters, digits, and underscores"
        )));
    }
    Ok(())
}
