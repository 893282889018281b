//! Sequence-matching similarity between answer strings.
//!
//! Implements the longest-matching-block ratio of the classic "gestalt pattern
//! matching" sequence matcher: find the longest contiguous match, recurse on
//! both sides of it, and score `2 * matched / (len(a) + len(b))`.
//!
//! Strings are compared as sequences of `char`s. When the second sequence has
//! 200 or more elements, elements occurring in more than 1% of it are treated
//! as "popular" and do not seed matches, although matches may still extend
//! across them.

use std::collections::HashMap;

const AUTOJUNK_MIN_LEN: usize = 200;

/// A matching block: `a[a..a + size] == b[b..b + size]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Match {
  pub a: usize,
  pub b: usize,
  pub size: usize,
}

/// Sequence matcher over two strings.
pub struct SequenceMatcher {
  a: Vec<char>,
  b: Vec<char>,
  /// Positions in `b` of every non-popular element
  b2j: HashMap<char, Vec<usize>>,
}

impl SequenceMatcher {
  pub fn new(a: &str, b: &str) -> Self {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
    for (j, &c) in b.iter().enumerate() {
      b2j.entry(c).or_default().push(j);
    }

    if b.len() >= AUTOJUNK_MIN_LEN {
      let threshold = b.len() / 100 + 1;
      b2j.retain(|_, positions| positions.len() <= threshold);
    }

    Self { a, b, b2j }
  }

  /// Longest matching block within `a[alo..ahi]` and `b[blo..bhi]`.
  ///
  /// Ties resolve to the earliest start in `a`, then the earliest in `b`.
  pub fn find_longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> Match {
    let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0);

    // j2len[j] = length of the longest match ending at a[i - 1], b[j]
    let mut j2len: HashMap<usize, usize> = HashMap::new();
    for i in alo..ahi {
      let mut next_j2len = HashMap::new();
      if let Some(positions) = self.b2j.get(&self.a[i]) {
        for &j in positions {
          if j < blo {
            continue;
          }
          if j >= bhi {
            break;
          }
          let k = j.checked_sub(1).and_then(|prev| j2len.get(&prev)).copied().unwrap_or(0) + 1;
          next_j2len.insert(j, k);
          if k > best_size {
            best_i = i + 1 - k;
            best_j = j + 1 - k;
            best_size = k;
          }
        }
      }
      j2len = next_j2len;
    }

    // Popular elements never seed a match; let the match grow across them.
    while best_i > alo && best_j > blo && self.a[best_i - 1] == self.b[best_j - 1] {
      best_i -= 1;
      best_j -= 1;
      best_size += 1;
    }
    while best_i + best_size < ahi && best_j + best_size < bhi && self.a[best_i + best_size] == self.b[best_j + best_size]
    {
      best_size += 1;
    }

    Match {
      a: best_i,
      b: best_j,
      size: best_size,
    }
  }

  /// All non-overlapping matching blocks in increasing order, adjacent blocks
  /// merged.
  pub fn matching_blocks(&self) -> Vec<Match> {
    let mut queue = vec![(0, self.a.len(), 0, self.b.len())];
    let mut blocks = Vec::new();

    while let Some((alo, ahi, blo, bhi)) = queue.pop() {
      let m = self.find_longest_match(alo, ahi, blo, bhi);
      if m.size == 0 {
        continue;
      }
      if alo < m.a && blo < m.b {
        queue.push((alo, m.a, blo, m.b));
      }
      if m.a + m.size < ahi && m.b + m.size < bhi {
        queue.push((m.a + m.size, ahi, m.b + m.size, bhi));
      }
      blocks.push(m);
    }

    blocks.sort();

    let mut merged: Vec<Match> = Vec::with_capacity(blocks.len());
    for block in blocks {
      match merged.last_mut() {
        Some(last) if last.a + last.size == block.a && last.b + last.size == block.b => last.size += block.size,
        _ => merged.push(block),
      }
    }
    merged
  }

  /// Similarity in `[0, 1]`. Two empty sequences are identical.
  pub fn ratio(&self) -> f64 {
    let total = self.a.len() + self.b.len();
    if total == 0 {
      return 1.0;
    }
    let matched: usize = self.matching_blocks().iter().map(|m| m.size).sum();
    2.0 * matched as f64 / total as f64
  }
}

/// Similarity ratio between a predicted answer and its ground truth.
pub fn ratio(predicted: &str, truth: &str) -> f64 {
  SequenceMatcher::new(predicted, truth).ratio()
}
