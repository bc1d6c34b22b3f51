//! Sequence matching over node sequences.
//!
//! Both routines are quadratic in the worst case: `find_window` is a direct
//! scan and `maximal_common_runs` fills an O(n·m) table one row at a time.
//! Paths in practice are short (tens to hundreds of nodes), so neither uses a
//! suffix structure.

use std::ops::Range;

/// Position of the first occurrence of `needle` as a contiguous window of
/// `haystack`. The empty needle matches at 0.
pub(crate) fn find_window<T: PartialEq>(haystack: &[T], needle: &[T]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    if needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Maximal common contiguous runs of `a` and `b` with at least `min_len`
/// elements, as ranges into `a`.
///
/// A run is reported once per distinct content, and runs whose content is a
/// window of another reported run are dropped. Ranges are ordered by their
/// position in `a`.
pub(crate) fn maximal_common_runs<T: PartialEq>(a: &[T], b: &[T], min_len: usize) -> Vec<Range<usize>> {
    let min_len = min_len.max(1);
    let (n, m) = (a.len(), b.len());
    let mut runs: Vec<Range<usize>> = Vec::new();
    // prev[j + 1] is the length of the common run ending at a[i - 1], b[j].
    let mut prev = vec![0usize; m + 1];
    let mut cur = vec![0usize; m + 1];

    for i in 0..n {
        for j in 0..m {
            cur[j + 1] = if a[i] == b[j] { prev[j] + 1 } else { 0 };
            let len = cur[j + 1];
            if len < min_len {
                continue;
            }
            let extends = i + 1 < n && j + 1 < m && a[i + 1] == b[j + 1];
            if !extends {
                runs.push(i + 1 - len..i + 1);
            }
        }
        std::mem::swap(&mut prev, &mut cur);
    }

    // Same content found at several places in `b`.
    let mut distinct: Vec<Range<usize>> = Vec::new();
    for run in runs {
        if !distinct.iter().any(|d| a[d.clone()] == a[run.clone()]) {
            distinct.push(run);
        }
    }

    let keep: Vec<bool> = distinct
        .iter()
        .map(|run| {
            !distinct.iter().any(|other| {
                other.len() > run.len() && find_window(&a[other.clone()], &a[run.clone()]).is_some()
            })
        })
        .collect();
    let mut maximal: Vec<Range<usize>> =
        distinct.into_iter().zip(keep).filter(|(_, k)| *k).map(|(r, _)| r).collect();
    maximal.sort_by_key(|r| r.start);
    maximal
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn runs(a: &str, b: &str, min_len: usize) -> Vec<String> {
        let a = chars(a);
        maximal_common_runs(&a, &chars(b), min_len).into_iter().map(|r| a[r].iter().collect()).collect()
    }

    #[rstest]
    #[case("abcd", "bc", Some(1))]
    #[case("abcd", "", Some(0))]
    #[case("abcd", "abcd", Some(0))]
    #[case("abcd", "ac", None)]
    #[case("ab", "abc", None)]
    #[case("abab", "ab", Some(0))]
    fn test_find_window(#[case] haystack: &str, #[case] needle: &str, #[case] expected: Option<usize>) {
        assert_eq!(find_window(&chars(haystack), &chars(needle)), expected);
    }

    #[rstest]
    #[case("abcdef", "xbcdy", 2, vec!["bcd"])]
    #[case("abcxyz", "xyzqabc", 2, vec!["abc", "xyz"])]
    #[case("abcde", "abcde", 2, vec!["abcde"])]
    #[case("abcd", "dcba", 2, vec![])]
    #[case("abcd", "dcba", 1, vec!["a", "b", "c", "d"])]
    #[case("abcbc", "bcabc", 2, vec!["abc"])]
    #[case("", "abc", 1, vec![])]
    fn test_maximal_common_runs(
        #[case] a: &str,
        #[case] b: &str,
        #[case] min_len: usize,
        #[case] expected: Vec<&str>,
    ) {
        assert_eq!(runs(a, b, min_len), expected);
    }
}
