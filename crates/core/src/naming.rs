//! Key naming agreement used when mapping request keys onto struct fields.
//!
//! Clients may send `userName`, `user-name`, `UserName` or `user_name`; all of
//! them bind to the Rust field `user_name`.

use serde_json::{Map, Value};

use crate::error::BindingError;

/// Normalize a request key to `snake_case`.
///
/// Acronym runs are kept together (`HTTPCode` → `http_code`).
pub fn to_snake_case(key: &str) -> String {
    let chars: Vec<char> = key.trim().chars().collect();
    let mut out = String::with_capacity(chars.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c == '-' || c == '_' || c == ' ' || c == '.' {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            continue;
        }

        if c.is_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.is_some_and(char::is_lowercase),
                _ => false,
            };
            if boundary && !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }

    while out.ends_with('_') {
        out.pop();
    }
    out
}

/// Recursively rename every object key in a JSON tree to `snake_case`.
///
/// Two keys of one object that normalize to the same name (`userName` and
/// `user_name`) are rejected with [`BindingError::DuplicateKey`].
pub fn normalize_keys(value: Value) -> Result<Value, BindingError> {
    match value {
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (key, v) in map {
                let normalized = to_snake_case(&key);
                if out.contains_key(&normalized) {
                    return Err(BindingError::DuplicateKey(normalized));
                }
                out.insert(normalized, normalize_keys(v)?);
            }
            Ok(Value::Object(out))
        }
        Value::Array(items) => items
            .into_iter()
            .map(normalize_keys)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        other => Ok(other),
    }
}
