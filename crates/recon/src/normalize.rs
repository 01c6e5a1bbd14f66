//! Label normalization shared by the board and selection formatters.
//!
//! Both sides of the reconciliation join must pass through the same rules or
//! labels that render identically will silently fail to match.

/// Corrections applied after whitespace normalization. Known data-entry
/// inconsistencies in the source logs, matched literally.
pub const LITERAL_CORRECTIONS: &[(&str, &str)] =
    &[("BEETHOVEN AND DVORAK", "BEETHOVEN & DVORAK")];

/// Normalize a raw label: non-breaking spaces to spaces, trim, uppercase,
/// collapse internal whitespace runs, then apply literal corrections.
///
/// Returns `None` when nothing survives normalization.
pub fn normalize_label(raw: &str) -> Option<String> {
    normalize_label_with(raw, &[])
}

/// [`normalize_label`] with extra dataset-specific corrections applied after
/// the built-in ones.
pub fn normalize_label_with(raw: &str, extra: &[(String, String)]) -> Option<String> {
    let cleaned = raw.replace('\u{a0}', " ");
    let mut out = String::with_capacity(cleaned.len());
    for word in cleaned.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        for ch in word.chars() {
            out.extend(ch.to_uppercase());
        }
    }
    if out.is_empty() {
        return None;
    }
    for (from, to) in LITERAL_CORRECTIONS {
        if out.contains(from) {
            out = out.replace(from, to);
        }
    }
    for (from, to) in extra {
        if out.contains(from.as_str()) {
            out = out.replace(from.as_str(), to.as_str());
        }
    }
    Some(out)
}
