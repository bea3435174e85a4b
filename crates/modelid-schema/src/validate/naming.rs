use crate::{MAX_ENTITY_NAME_LEN, MAX_PROPERTY_NAME_LEN};

/// Ensure entity names are non-empty, ASCII, colon-free and within the maximum length.
pub fn validate_entity_name(name: &str) -> Result<(), String> {
    validate_name("entity", name, MAX_ENTITY_NAME_LEN)
}

/// Ensure property names follow the same rules as entity names.
pub fn validate_property_name(name: &str) -> Result<(), String> {
    validate_name("property", name, MAX_PROPERTY_NAME_LEN)
}

fn validate_name(kind: &str, name: &str, max_len: usize) -> Result<(), String> {
    if name.is_empty() {
        return Err(format!("{kind} name is empty"));
    }
    if name.len() > max_len {
        return Err(format!(
            "{kind} name '{name}' exceeds max length {max_len}"
        ));
    }
    if !name.is_ascii() {
        return Err(format!("{kind} name '{name}' must be ASCII"));
    }

    // names sit next to "seq:uid" pairs in diagnostics
    if name.contains(':') || name.chars().any(|c| c.is_ascii_whitespace()) {
        return Err(format!(
            "{kind} name '{name}' must not contain ':' or whitespace"
        ));
    }

    Ok(())
}
