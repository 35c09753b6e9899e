//! Identifier sanitizing for generated interfaces and guest globals

/// Turn an arbitrary tool or namespace name into a valid bare identifier.
///
/// Every character outside `[A-Za-z0-9_]` is replaced with `_`, and a name
/// starting with a digit gets a `_` prefix. The mapping is deterministic but
/// not injective: distinct raw names may collide after sanitizing, in which
/// case stub installation is last-registration-wins.
pub fn sanitize_identifier(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 1);
    for (i, ch) in raw.chars().enumerate() {
        if i == 0 && ch.is_ascii_digit() {
            out.push('_');
        }
        if ch.is_ascii_alphanumeric() || ch == '_' {
            out.push(ch);
        } else {
            out.push('_');
        }
    }
    out
}
