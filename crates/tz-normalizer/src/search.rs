//! Fuzzy title matching.
//!
//! Scores are partial ratios in `0..=100`: the shorter string is slid across
//! the longer one and each window is compared by longest common subsequence,
//! `2 * lcs / (len_a + len_b)`. The best window wins. Matching is
//! case-insensitive.

/// Score below which [`fuzzy_search`] drops an item by default.
pub const DEFAULT_THRESHOLD: u8 = 80;

/// Partial-ratio similarity between two strings, `0..=100`.
pub fn partial_ratio(a: &str, b: &str) -> u8 {
    let a: Vec<char> = a.to_lowercase().chars().collect();
    let b: Vec<char> = b.to_lowercase().chars().collect();
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let (short, long) = if a.len() <= b.len() { (&a, &b) } else { (&b, &a) };
    let m = short.len();

    let best = (0..=long.len() - m)
        .map(|offset| lcs_len(short, &long[offset..offset + m]))
        .max()
        .unwrap_or(0);

    ((2.0 * best as f64 / (2 * m) as f64) * 100.0).round() as u8
}

/// Keep the items whose title scores at least `threshold` against `query`,
/// best match first. Ties keep their input order.
pub fn fuzzy_search<'a, T, F>(items: &'a [T], query: &str, threshold: u8, title: F) -> Vec<&'a T>
where
    F: Fn(&T) -> &str,
{
    let mut scored: Vec<(u8, &T)> = items
        .iter()
        .map(|item| (partial_ratio(query, title(item)), item))
        .filter(|(score, _)| *score >= threshold)
        .collect();

    scored.sort_by(|x, y| y.0.cmp(&x.0));
    scored.into_iter().map(|(_, item)| item).collect()
}

fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}
