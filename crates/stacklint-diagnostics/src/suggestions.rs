// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Did-you-mean suggestions for mistyped rule ids.

/// Levenshtein distance over chars.
fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, a_ch) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, &b_ch) in b.iter().enumerate() {
            let cost = usize::from(a_ch != b_ch);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// The closest of `candidates` to `name`, if close enough to be a typo.
pub fn did_you_mean<'a>(name: &str, candidates: impl IntoIterator<Item = &'a str>) -> Option<String> {
    let max_distance = match name.len() {
        0..=2 => 1,
        3..=5 => 2,
        _ => 3,
    };

    candidates
        .into_iter()
        .filter(|c| name.len().abs_diff(c.len()) <= max_distance)
        .map(|c| (c, edit_distance(name, c)))
        .filter(|&(_, dist)| dist <= max_distance)
        .min_by_key(|&(_, dist)| dist)
        .map(|(closest, _)| format!("did you mean `{}`?", closest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distances() {
        assert_eq!(edit_distance("kitten", "sitting"), 3);
        assert_eq!(edit_distance("", "perf"), 4);
        assert_eq!(edit_distance("perf/*", "perf/*"), 0);
    }

    #[test]
    fn picks_the_closest() {
        let ids = ["perf/small-array-on-stack", "perf/small-array-on-heap"];
        assert_eq!(
            did_you_mean("perf/small-array-on-stak", ids.iter().copied()),
            Some("did you mean `perf/small-array-on-stack`?".to_string())
        );
        assert_eq!(did_you_mean("naming", ids.iter().copied()), None);
    }
}
