//! Text similarity scoring
//!
//! The score is the Dice coefficient over the equal runs of an optimal
//! character diff: `2 * equal / (len(a) + len(b))`. The equal total of an
//! optimal diff is the longest common subsequence, which is computed here
//! from the Myers edit distance without materialising the edit script.

/// Similarity of two texts in `[0, 1]`; `1.0` iff they are identical.
///
/// Lengths count Unicode scalar values, not UTF-16 code units. Texts with
/// characters outside the Basic Multilingual Plane (emoji, some CJK) can
/// therefore score slightly differently from JavaScript diff tooling, which
/// counts each such character twice.
#[must_use]
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    #[allow(clippy::cast_precision_loss)]
    let ratio = (2 * common_length(&a, &b)) as f64 / total as f64;
    ratio
}

/// Total length of the equal segments of an optimal diff (the LCS length).
#[must_use]
pub fn common_length(a: &[char], b: &[char]) -> usize {
    let prefix = a.iter().zip(b).take_while(|(x, y)| x == y).count();
    let (a, b) = (&a[prefix..], &b[prefix..]);
    let suffix = a
        .iter()
        .rev()
        .zip(b.iter().rev())
        .take_while(|(x, y)| x == y)
        .count();
    let (a, b) = (&a[..a.len() - suffix], &b[..b.len() - suffix]);

    let distance = edit_distance(a, b);
    prefix + suffix + (a.len() + b.len() - distance) / 2
}

/// Insert/delete edit distance by Myers' greedy O(ND) forward search.
fn edit_distance(a: &[char], b: &[char]) -> usize {
    let (n, m) = (a.len(), b.len());
    if n == 0 || m == 0 {
        return n + m;
    }

    let max = n + m;
    // diagonal k = x - y is stored at slot max + k
    let mut v = vec![0usize; 2 * max + 2];
    for d in 0..=max {
        for slot in (max - d..=max + d).step_by(2) {
            let mut x = if slot == max - d || (slot != max + d && v[slot - 1] < v[slot + 1]) {
                v[slot + 1]
            } else {
                v[slot - 1] + 1
            };
            let mut y = (x + max).saturating_sub(slot);
            while x < n && y < m && a[x] == b[y] {
                x += 1;
                y += 1;
            }
            v[slot] = x;
            if x >= n && y >= m {
                return d;
            }
        }
    }
    max
}
