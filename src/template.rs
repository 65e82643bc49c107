//! Minimal `$name$` placeholder substitution.
//!
//! Request envelopes and the auth canonical string are both produced by
//! replacing `$name$` placeholders in a static template with parameter
//! values. Placeholders do not nest and substitution order does not matter.

use std::collections::BTreeMap;

use crate::error::{HuobiError, Result};

/// Replace every `$name$` placeholder in `template` with the corresponding
/// value from `params`.
///
/// Parameters without a matching placeholder are ignored. A placeholder left
/// unresolved after substitution is a programmer/configuration error and
/// fails with [`HuobiError::MissingPlaceholder`].
pub fn render(template: &str, params: &BTreeMap<String, String>) -> Result<String> {
    let mut rendered = template.to_owned();
    for (name, value) in params {
        rendered = rendered.replace(&format!("${name}$"), value);
    }
    match placeholders(&rendered).into_iter().next() {
        Some(name) => Err(HuobiError::MissingPlaceholder(name)),
        None => Ok(rendered),
    }
}

/// Extract every `$name$` placeholder name appearing in `template`.
pub(crate) fn placeholders(template: &str) -> Vec<String> {
    let mut found = Vec::new();
    let mut rest = template;
    while let Some(start) = rest.find('$') {
        let after = &rest[start + 1..];
        let name: String = after
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
            .collect();
        if !name.is_empty() && after[name.len()..].starts_with('$') {
            rest = &after[name.len() + 1..];
            found.push(name);
        } else {
            rest = after;
        }
    }
    found
}
