//! Edit-distance alignment with operation tracing.
//!
//! Wagner–Fischer over generic tokens (words or characters) with unit costs.
//! The traceback follows a single minimal-cost path; on cost ties it prefers
//! substitution, then insertion, then deletion. Cost is O(n·m) time and
//! space, so callers cap sequence length before aligning.

use std::collections::BTreeSet;
use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Kind of edit needed to turn the reference into the candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    /// A reference token was replaced by a different candidate token.
    Substitution,
    /// The candidate has a token the reference does not.
    Insertion,
    /// A reference token is absent from the candidate.
    Deletion,
}

/// One traced edit.
///
/// `position` indexes the reference for substitutions and deletions, and the
/// candidate for insertions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    pub kind: OperationKind,
    pub position: usize,
    #[serde(default)]
    pub expected: Option<String>,
    #[serde(default)]
    pub actual: Option<String>,
}

/// Edit distance plus the traced operations, in reference order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentResult {
    pub edit_distance: usize,
    pub operations: Vec<Operation>,
}

impl AlignmentResult {
    /// Edit distance over the reference length (WER/CER).
    ///
    /// An empty reference has no defined rate and yields 0.
    pub fn error_rate(&self, reference_len: usize) -> f64 {
        if reference_len == 0 {
            return 0.0;
        }
        self.edit_distance as f64 / reference_len as f64
    }

    /// Number of operations of the given kind.
    pub fn count(&self, kind: OperationKind) -> usize {
        self.operations.iter().filter(|op| op.kind == kind).count()
    }
}

/// Align `candidate` against `reference`, returning distance and trace.
pub fn align<T>(reference: &[T], candidate: &[T]) -> AlignmentResult
where
    T: PartialEq + Display,
{
    let n = reference.len();
    let m = candidate.len();
    let width = m + 1;
    let mut dist = vec![0usize; (n + 1) * width];
    let at = |i: usize, j: usize| i * width + j;

    for i in 0..=n {
        dist[at(i, 0)] = i;
    }
    for j in 0..=m {
        dist[at(0, j)] = j;
    }
    for i in 1..=n {
        for j in 1..=m {
            let cost = usize::from(reference[i - 1] != candidate[j - 1]);
            let sub = dist[at(i - 1, j - 1)] + cost;
            let ins = dist[at(i, j - 1)] + 1;
            let del = dist[at(i - 1, j)] + 1;
            dist[at(i, j)] = sub.min(ins).min(del);
        }
    }

    let mut operations = Vec::new();
    let mut seen = BTreeSet::new();
    let mut push = |op: Operation| {
        if seen.insert((op.kind, op.position)) {
            operations.push(op);
        }
    };

    let (mut i, mut j) = (n, m);
    while i > 0 || j > 0 {
        let here = dist[at(i, j)];
        if i > 0 && j > 0 && reference[i - 1] == candidate[j - 1] && here == dist[at(i - 1, j - 1)]
        {
            i -= 1;
            j -= 1;
        } else if i > 0 && j > 0 && here == dist[at(i - 1, j - 1)] + 1 {
            push(Operation {
                kind: OperationKind::Substitution,
                position: i - 1,
                expected: Some(reference[i - 1].to_string()),
                actual: Some(candidate[j - 1].to_string()),
            });
            i -= 1;
            j -= 1;
        } else if j > 0 && here == dist[at(i, j - 1)] + 1 {
            push(Operation {
                kind: OperationKind::Insertion,
                position: j - 1,
                expected: None,
                actual: Some(candidate[j - 1].to_string()),
            });
            j -= 1;
        } else {
            push(Operation {
                kind: OperationKind::Deletion,
                position: i - 1,
                expected: Some(reference[i - 1].to_string()),
                actual: None,
            });
            i -= 1;
        }
    }
    operations.reverse();

    AlignmentResult {
        edit_distance: dist[at(n, m)],
        operations,
    }
}

/// Edit distance only, in O(min(n, m)) memory.
pub fn edit_distance<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    if short.is_empty() {
        return long.len();
    }
    let mut prev: Vec<usize> = (0..=short.len()).collect();
    let mut curr = vec![0usize; short.len() + 1];

    for i in 1..=long.len() {
        curr[0] = i;
        for j in 1..=short.len() {
            let cost = usize::from(long[i - 1] != short[j - 1]);
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[short.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(s: &str) -> Vec<String> {
        s.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn identical_sequences_have_no_operations() {
        let a = words("the quick brown fox");
        let result = align(&a, &a);
        assert_eq!(result.edit_distance, 0);
        assert!(result.operations.is_empty());
        assert_eq!(result.error_rate(a.len()), 0.0);
    }

    #[test]
    fn single_substitution() {
        let result = align(&words("hello world"), &words("hello earth"));
        assert_eq!(result.edit_distance, 1);
        assert_eq!(
            result.operations,
            vec![Operation {
                kind: OperationKind::Substitution,
                position: 1,
                expected: Some("world".into()),
                actual: Some("earth".into()),
            }]
        );
        assert!((result.error_rate(2) - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn trailing_deletions_when_candidate_is_short() {
        let result = align(&words("a b c d"), &words("a b"));
        assert_eq!(result.edit_distance, 2);
        assert_eq!(result.count(OperationKind::Deletion), 2);
        let positions: Vec<usize> = result.operations.iter().map(|op| op.position).collect();
        assert_eq!(positions, vec![2, 3]);
    }

    #[test]
    fn insertions_are_indexed_by_candidate_position() {
        let result = align(&words("a b"), &words("a x y b"));
        assert_eq!(result.edit_distance, 2);
        assert_eq!(result.count(OperationKind::Insertion), 2);
        let positions: Vec<usize> = result.operations.iter().map(|op| op.position).collect();
        assert_eq!(positions, vec![1, 2]);
    }

    #[test]
    fn ties_prefer_substitution() {
        // "ab" -> "ba" can be two substitutions or delete+insert; both cost 2.
        let a: Vec<char> = "ab".chars().collect();
        let b: Vec<char> = "ba".chars().collect();
        let result = align(&a, &b);
        assert_eq!(result.edit_distance, 2);
        assert!(result
            .operations
            .iter()
            .all(|op| op.kind == OperationKind::Substitution));
    }

    #[test]
    fn ties_prefer_insertion_over_deletion() {
        // The trailing "a"/"b" mismatch can be resolved either way at equal cost.
        let a: Vec<char> = "aba".chars().collect();
        let b: Vec<char> = "bab".chars().collect();
        let result = align(&a, &b);
        assert_eq!(result.edit_distance, 2);
        assert_eq!(
            result.operations,
            vec![
                Operation {
                    kind: OperationKind::Deletion,
                    position: 0,
                    expected: Some("a".into()),
                    actual: None,
                },
                Operation {
                    kind: OperationKind::Insertion,
                    position: 2,
                    expected: None,
                    actual: Some("b".into()),
                },
            ]
        );
    }

    #[test]
    fn empty_side_yields_single_kind() {
        let empty: Vec<char> = Vec::new();
        let b: Vec<char> = "xy".chars().collect();
        let result = align(&empty, &b);
        assert_eq!(result.count(OperationKind::Insertion), 2);

        let result = align(&b, &empty);
        assert_eq!(result.count(OperationKind::Deletion), 2);
    }

    #[test]
    fn operations_count_matches_distance() {
        let a: Vec<char> = "kitten".chars().collect();
        let b: Vec<char> = "sitting".chars().collect();
        let result = align(&a, &b);
        assert_eq!(result.edit_distance, 3);
        assert_eq!(result.operations.len(), 3);
    }

    #[test]
    fn deterministic_trace() {
        let a = words("one two three four five");
        let b = words("one too three for five six");
        assert_eq!(align(&a, &b), align(&a, &b));
    }

    #[test]
    fn edit_distance_agrees_with_align() {
        let pairs = [("kitten", "sitting"), ("", "abc"), ("flaw", "lawn"), ("same", "same")];
        for (x, y) in pairs {
            let a: Vec<char> = x.chars().collect();
            let b: Vec<char> = y.chars().collect();
            assert_eq!(edit_distance(&a, &b), align(&a, &b).edit_distance, "{x} vs {y}");
        }
    }

    #[test]
    fn empty_reference_rate_is_zero() {
        let result = align::<String>(&[], &words("extra words"));
        assert_eq!(result.edit_distance, 2);
        assert_eq!(result.error_rate(0), 0.0);
    }
}
