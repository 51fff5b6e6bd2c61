/// Turn a stored package-list field into a list of requirement strings.
///
/// Stored fields look like `["numpy==1.0", "pandas"]`, `[git, curl]` or `None`.
/// Brackets, quotes, whitespace and the literal `None` are stripped before
/// splitting on commas; anything that leaves no text yields an empty list.
pub fn normalize_field(raw: &str) -> Vec<String> {
    let cleaned: String = raw
        .replace("None", "")
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | '"' | '\'') && !c.is_whitespace())
        .collect();

    cleaned
        .split(',')
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect()
}

/// [`normalize_field`] for a field that may be absent
pub fn normalize_optional(raw: Option<&str>) -> Vec<String> {
    raw.map(normalize_field).unwrap_or_default()
}
