//! Query clean-up and accent-insensitive variants

/// ASCII spellings users type for accented artist names
const ASCII_SPELLINGS: &[(&str, &str)] = &[
    ("kroyer", "Krøyer"),
    ("kroger", "Krøyer"),
    ("ancher", "Ancher"),
    ("hammershoi", "Hammershøi"),
    ("kobke", "Købke"),
    ("eckersberg", "Eckersberg"),
    ("cezanne", "Cézanne"),
    ("monet", "Monet"),
    ("renoir", "Renoir"),
    ("durer", "Dürer"),
];

/// Trim and collapse internal whitespace
pub fn normalize_query(query: &str) -> String {
    query.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The normalised query followed by accented variants, without
/// case-insensitive duplicates
pub fn query_variants(query: &str) -> Vec<String> {
    let query = normalize_query(query);
    if query.is_empty() {
        return Vec::new();
    }

    let lower = query.to_lowercase();
    let mut variants = vec![query];

    for (ascii, accented) in ASCII_SPELLINGS {
        if lower.contains(ascii) {
            variants.push(lower.replace(ascii, &accented.to_lowercase()));
            variants.push(accented.to_string());
        }
    }

    let mut seen = std::collections::HashSet::new();
    variants.retain(|v| seen.insert(v.to_lowercase()));
    variants
}
