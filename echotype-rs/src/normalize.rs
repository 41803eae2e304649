//! Canonical comparison form for typed answers.
//!
//! Lower-cases, turns anything that is not a letter or digit into a blank,
//! then collapses runs of whitespace. German umlauts and ß count as letters.

/// Reduce `text` to its canonical comparison form.
pub fn normalize(text: &str) -> String {
    let blanked: String = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();

    blanked.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Two texts are equivalent iff their canonical forms are identical.
pub fn equivalent(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}
