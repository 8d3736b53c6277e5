/// Trims and collapses internal runs of whitespace to a single space.
pub(crate) fn normalize_name(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub(crate) fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}
