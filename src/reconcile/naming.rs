//! Derivative naming convention.
//!
//! A derivative of `holiday.jpg` encoded as PNG is called
//! `filtered_holiday.png`. Object storage prefixes every stored name with a
//! fresh UUID and an underscore:
//! `9b2c6a4e-0d1f-4b4e-8f3a-2f0a6d7c1e55_filtered_holiday.png`.

use crate::core::types::OutputFormat;
use uuid::Uuid;

/// Prefix every derivative file name starts with.
pub const DERIVATIVE_PREFIX: &str = "filtered_";

/// Length of a hyphenated UUID.
const UUID_LEN: usize = 36;

/// File name without its last extension.
///
/// - `"holiday.jpg"` → `"holiday"`
/// - `"archive.tar.gz"` → `"archive.tar"`
/// - `".hidden"` → `".hidden"`
/// - `"README"` → `"README"`
pub fn base_name(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(0) | None => file_name,
        Some(dot) => &file_name[..dot],
    }
}

/// Name of the derivative produced from `original_file_name`.
pub fn derivative_file_name(original_file_name: &str, format: OutputFormat) -> String {
    format!(
        "{}{}.{}",
        DERIVATIVE_PREFIX,
        base_name(original_file_name),
        format.extension()
    )
}

/// The string a loose match looks for: prefix plus base name.
pub fn derivative_stem(original_base_name: &str) -> String {
    format!("{DERIVATIVE_PREFIX}{original_base_name}")
}

/// Storage key for `name` with a freshly generated UUID.
pub fn storage_key(name: &str) -> String {
    storage_key_with(Uuid::new_v4(), name)
}

pub fn storage_key_with(id: Uuid, name: &str) -> String {
    format!("{}_{}", id.hyphenated(), name)
}

/// Remove a `<uuid>_` storage prefix if there is one.
pub fn strip_storage_prefix(key: &str) -> &str {
    match (key.get(..UUID_LEN), key.get(UUID_LEN..UUID_LEN + 1)) {
        (Some(prefix), Some("_")) if Uuid::parse_str(prefix).is_ok() => &key[UUID_LEN + 1..],
        _ => key,
    }
}

/// Original base name a derivative name was produced from, if it follows
/// the convention.
pub fn original_base_of(derivative_name: &str) -> Option<&str> {
    let name = strip_storage_prefix(derivative_name);
    name.strip_prefix(DERIVATIVE_PREFIX)
        .map(base_name)
        .filter(|base| !base.is_empty())
}
