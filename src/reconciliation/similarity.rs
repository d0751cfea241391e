//! Description similarity based on edit distance

/// Levenshtein distance between two strings, counted in chars
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    strsim::levenshtein(a, b)
}

/// Similarity in [0, 1] between two descriptions
///
/// Both sides are lowercased and trimmed first. Two empty strings are
/// identical.
pub fn string_similarity(a: &str, b: &str) -> f64 {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();

    if a == b {
        return 1.0;
    }

    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }

    let distance = strsim::levenshtein(&a, &b);
    1.0 - distance as f64 / longest as f64
}
