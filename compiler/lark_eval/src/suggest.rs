//! "Did you mean?" hints for unknown names, attributes and loaded symbols.

/// Levenshtein distance, two rows at a time.
#[expect(
    clippy::arithmetic_side_effects,
    reason = "indices and distances are bounded by the input lengths"
)]
fn edit_distance(a: &str, b: &str) -> usize {
    let b_len = b.chars().count();
    if a.is_empty() {
        return b_len;
    }
    if b_len == 0 {
        return a.chars().count();
    }

    let mut prev_row: Vec<usize> = (0..=b_len).collect();
    let mut curr_row: Vec<usize> = vec![0; b_len + 1];

    for (i, a_char) in a.chars().enumerate() {
        curr_row[0] = i + 1;
        for (j, b_char) in b.chars().enumerate() {
            let cost = usize::from(a_char != b_char);
            curr_row[j + 1] = (prev_row[j + 1] + 1)
                .min(curr_row[j] + 1)
                .min(prev_row[j] + cost);
        }
        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[b_len]
}

/// Edits tolerated for a name of `len` characters.
fn threshold(len: usize) -> usize {
    match len {
        0 => 0,
        1..=2 => 1,
        3..=5 => 2,
        6..=10 => 3,
        n => (n / 2).min(5),
    }
}

/// The closest candidate within the edit threshold.
///
/// Candidates usually come out of hash maps, so ties go to the
/// lexicographically smallest name to keep messages stable.
pub fn suggest<'a>(name: &str, candidates: impl IntoIterator<Item = &'a str>) -> Option<String> {
    if name.is_empty() {
        return None;
    }
    let limit = threshold(name.chars().count());
    let mut best: Option<(usize, &str)> = None;

    for candidate in candidates {
        if candidate == name || name.len().abs_diff(candidate.len()) > limit {
            continue;
        }
        let distance = edit_distance(name, candidate);
        if distance > limit {
            continue;
        }
        let better = match best {
            None => true,
            Some((best_distance, best_name)) => {
                (distance, candidate) < (best_distance, best_name)
            }
        };
        if better {
            best = Some((distance, candidate));
        }
    }

    best.map(|(_, s)| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance() {
        assert_eq!(edit_distance("hello", "hello"), 0);
        assert_eq!(edit_distance("hello", "helo"), 1);
        assert_eq!(edit_distance("kitten", "sitting"), 3);
        assert_eq!(edit_distance("", "abc"), 3);
    }

    #[test]
    fn closest_name_wins() {
        assert_eq!(
            suggest("lenght", ["length", "height", "width"]),
            Some("length".to_string())
        );
    }

    #[test]
    fn nothing_close_enough() {
        assert_eq!(suggest("xyz", ["alpha", "beta", "gamma"]), None);
    }

    #[test]
    fn exact_match_is_not_a_suggestion() {
        assert_eq!(suggest("foo", ["foo"]), None);
    }

    #[test]
    fn ties_are_broken_by_name() {
        assert_eq!(suggest("ab", ["ac", "aa"]), Some("aa".to_string()));
    }
}
