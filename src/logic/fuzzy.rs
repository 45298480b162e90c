//! Fuzzy name resolution used for operators and maps.

/// Minimum confidence (0-100) for a fuzzy match to be accepted.
pub const MATCH_THRESHOLD: u8 = 75;

/// Scores free text against a candidate list.
pub trait FuzzyMatcher {
    /// Best candidate and its confidence (0-100); `None` only when there are no candidates.
    fn best_match(&self, text: &str, candidates: &[String]) -> Option<(String, u8)>;
}

/// Levenshtein ratio that falls back to a scaled best-window ratio when lengths differ a lot,
/// so abbreviations like "cav" still find "Caveira". Word order is scored separately at 0.95.
#[derive(Clone, Copy, Debug, Default)]
pub struct WeightedRatio;

impl FuzzyMatcher for WeightedRatio {
    fn best_match(&self, text: &str, candidates: &[String]) -> Option<(String, u8)> {
        let query = normalize(text);
        let mut best: Option<(&String, u8)> = None;
        for candidate in candidates {
            let s = score(&query, &normalize(candidate));
            if best.map_or(true, |(_, top)| s > top) {
                best = Some((candidate, s));
            }
        }
        best.map(|(c, s)| (c.clone(), s))
    }
}

/// The accepted candidate for `text`, if its confidence reaches `MATCH_THRESHOLD`.
pub fn resolve<M: FuzzyMatcher + ?Sized>(
    matcher: &M,
    text: &str,
    candidates: &[String],
) -> Option<String> {
    match matcher.best_match(text, candidates) {
        Some((candidate, confidence)) if confidence >= MATCH_THRESHOLD => Some(candidate),
        _ => None,
    }
}

/// Lowercase, non-alphanumerics to single spaces.
fn normalize(s: &str) -> String {
    s.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn ratio(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(a, b) * 100.0
}

/// Words in sorted order, so "dostoyevsky kafe" compares equal to "kafe dostoyevsky".
fn token_sort(s: &str) -> String {
    let mut words: Vec<&str> = s.split(' ').collect();
    words.sort_unstable();
    words.join(" ")
}

/// Best ratio of the shorter string against every same-length window of the longer one.
fn partial_ratio(a: &str, b: &str) -> f64 {
    let (short, long): (Vec<char>, Vec<char>) = if a.chars().count() <= b.chars().count() {
        (a.chars().collect(), b.chars().collect())
    } else {
        (b.chars().collect(), a.chars().collect())
    };
    let short: String = short.into_iter().collect();
    long.windows(short.chars().count())
        .map(|w| ratio(&short, &w.iter().collect::<String>()))
        .fold(0.0_f64, f64::max)
}

fn score(a: &str, b: &str) -> u8 {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    if a == b {
        return 100;
    }
    let full = ratio(a, b);
    let (sorted_a, sorted_b) = (token_sort(a), token_sort(b));
    let (len_a, len_b) = (a.chars().count() as f64, b.chars().count() as f64);
    let len_ratio = len_a.max(len_b) / len_a.min(len_b);
    let best = if len_ratio < 1.5 {
        full.max(ratio(&sorted_a, &sorted_b) * 0.95)
    } else {
        let scale = if len_ratio < 8.0 { 0.9 } else { 0.6 };
        full.max(partial_ratio(a, b) * scale)
            .max(partial_ratio(&sorted_a, &sorted_b) * 0.95 * scale)
    };
    best.round().min(100.0) as u8
}
