//! Symbol frequency counting
//!
//! Counts are kept in order of first appearance. That order is the
//! tie-break key the tree builder uses, so a given text always produces
//! the same tree.

use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: Vec<(char, u64)>,
    index: HashMap<char, usize>,
    total: u64,
    overflowed: bool,
}

impl FrequencyTable {
    /// Count every character of `text` exactly once.
    pub fn from_text(text: &str) -> Self {
        let mut table = Self::default();
        for ch in text.chars() {
            table.add(ch, 1);
        }
        table
    }

    /// Build a table from explicit counts. Repeated symbols are summed.
    pub fn from_counts<I>(counts: I) -> Self
    where
        I: IntoIterator<Item = (char, u64)>,
    {
        let mut table = Self::default();
        for (ch, n) in counts {
            table.add(ch, n);
        }
        table
    }

    fn add(&mut self, ch: char, n: u64) {
        match self.index.get(&ch) {
            Some(&i) => {
                let count = &mut self.counts[i].1;
                *count = count.checked_add(n).unwrap_or_else(|| {
                    self.overflowed = true;
                    u64::MAX
                });
            }
            None => {
                self.index.insert(ch, self.counts.len());
                self.counts.push((ch, n));
            }
        }
        self.total = self.total.checked_add(n).unwrap_or_else(|| {
            self.overflowed = true;
            u64::MAX
        });
    }

    pub fn get(&self, ch: char) -> Option<u64> {
        self.index.get(&ch).map(|&i| self.counts[i].1)
    }

    /// Number of distinct symbols.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts, saturated at `u64::MAX`.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// True when the counts do not sum within a `u64`. Such a table is
    /// rejected by the tree builder.
    pub fn overflowed(&self) -> bool {
        self.overflowed
    }

    /// Symbols with their counts, in order of first appearance.
    pub fn iter(&self) -> impl Iterator<Item = (char, u64)> + '_ {
        self.counts.iter().copied()
    }

    /// Shannon entropy in bits per symbol
    pub fn entropy_bits(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let len = self.total as f64;
        let mut entropy = 0.0;
        for &(_, f) in &self.counts {
            if f > 0 {
                let p = f as f64 / len;
                entropy -= p * p.log2();
            }
        }
        entropy
    }
}
