use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Below this length no element of the second sequence is treated as popular.
const AUTOJUNK_MIN_LEN: usize = 200;

/// Lowercases, collapses whitespace runs to a single space and trims.
pub fn normalize_text(text: &str) -> String {
    WHITESPACE_RE
        .replace_all(&text.to_lowercase(), " ")
        .trim()
        .to_string()
}

/// Ratcliff/Obershelp matcher over two char sequences.
///
/// Mirrors the classic longest-matching-block recursion: the longest common
/// run is found, then the same search is repeated on the left and right
/// remainders. For long second sequences, characters that occur in more
/// than 1% of positions are not used to seed a match, although matches
/// may still extend across them.
struct Matcher {
    a: Vec<char>,
    b: Vec<char>,
    b2j: HashMap<char, Vec<usize>>,
}

impl Matcher {
    fn new(a: &str, b: &str) -> Self {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();

        let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
        for (j, c) in b.iter().enumerate() {
            b2j.entry(*c).or_default().push(j);
        }

        let n = b.len();
        if n >= AUTOJUNK_MIN_LEN {
            let ntest = n / 100 + 1;
            b2j.retain(|_, indices| indices.len() <= ntest);
        }

        Self { a, b, b2j }
    }

    fn longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> (usize, usize, usize) {
        let (mut besti, mut bestj, mut bestsize) = (alo, blo, 0usize);
        let mut j2len: HashMap<usize, usize> = HashMap::new();

        for i in alo..ahi {
            let mut new_j2len = HashMap::new();
            if let Some(indices) = self.b2j.get(&self.a[i]) {
                for &j in indices {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = j
                        .checked_sub(1)
                        .and_then(|prev| j2len.get(&prev))
                        .copied()
                        .unwrap_or(0)
                        + 1;
                    new_j2len.insert(j, k);
                    if k > bestsize {
                        besti = i + 1 - k;
                        bestj = j + 1 - k;
                        bestsize = k;
                    }
                }
            }
            j2len = new_j2len;
        }

        while besti > alo && bestj > blo && self.a[besti - 1] == self.b[bestj - 1] {
            besti -= 1;
            bestj -= 1;
            bestsize += 1;
        }
        while besti + bestsize < ahi
            && bestj + bestsize < bhi
            && self.a[besti + bestsize] == self.b[bestj + bestsize]
        {
            bestsize += 1;
        }

        (besti, bestj, bestsize)
    }

    fn matched_chars(&self) -> usize {
        let mut queue = vec![(0, self.a.len(), 0, self.b.len())];
        let mut total = 0;

        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let (i, j, k) = self.longest_match(alo, ahi, blo, bhi);
            if k == 0 {
                continue;
            }
            total += k;
            if alo < i && blo < j {
                queue.push((alo, i, blo, j));
            }
            if i + k < ahi && j + k < bhi {
                queue.push((i + k, ahi, j + k, bhi));
            }
        }

        total
    }
}

/// Similarity in `[0.0, 1.0]` as `2M / T`, where `M` is the number of
/// matched characters and `T` the combined length. Two empty strings are
/// identical.
pub fn ratio(a: &str, b: &str) -> f64 {
    let matcher = Matcher::new(a, b);
    let total = matcher.a.len() + matcher.b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matcher.matched_chars() as f64 / total as f64
}

/// Ratio of the normalised forms of both texts.
pub fn similarity(a: &str, b: &str) -> f64 {
    ratio(&normalize_text(a), &normalize_text(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  O Valor\n\nMensal\t é FIXO  "), "o valor mensal é fixo");
        assert_eq!(normalize_text("\n \t"), "");
    }

    #[test]
    fn test_ratio_edge_cases() {
        assert!(close(ratio("", ""), 1.0));
        assert!(close(ratio("abc", ""), 0.0));
        assert!(close(ratio("abc", "abc"), 1.0));
        assert!(close(ratio("abc", "xyz"), 0.0));
    }

    #[test]
    fn test_ratio_matches_known_values() {
        // difflib.SequenceMatcher(None, "abcd", "bcde").ratio() == 0.75
        assert!(close(ratio("abcd", "bcde"), 0.75));
        // difflib.SequenceMatcher(None, "abxcd", "abcd").ratio() == 8/9
        assert!(close(ratio("abxcd", "abcd"), 8.0 / 9.0));
        // Longest block is "ac", nothing matches on either side of it
        assert!(close(ratio("acb", "bac"), 4.0 / 6.0));
    }

    #[test]
    fn test_popular_characters_in_long_sequences() {
        // Every char of b is popular, so no match can be seeded
        let a = format!("x{}", "a".repeat(250));
        let b = "a".repeat(250);
        assert!(close(ratio(&a, &b), 0.0));

        // A match anchored at the start still extends across popular chars
        assert!(close(ratio(&b, &b), 1.0));

        let short = "a".repeat(150);
        let shifted = format!("x{}", short);
        assert!(close(ratio(&shifted, &short), 300.0 / 301.0));
    }

    #[test]
    fn test_similarity_ignores_case_and_spacing() {
        let base = "O valor mensal é fixo, sujeito a reajuste anual pelo IPCA.";
        let copy = "o valor   mensal é fixo,\nsujeito a reajuste anual pelo ipca.";
        assert!(close(similarity(base, copy), 1.0));

        let edited = "O valor mensal poderá ser reajustado a qualquer momento mediante notificação.";
        assert!(similarity(base, edited) < 0.97);
    }
}
