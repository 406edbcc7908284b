//! Code table generation from a Huffman tree

use crate::error::CompressError;
use crate::frequency::FrequencyTable;
use crate::huffman::{HuffNode, HuffmanTree};
use std::collections::BTreeMap;

/// Symbol to code word mapping. `false` is a 0 bit (left edge).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeTable {
    codes: BTreeMap<char, Vec<bool>>,
}

impl CodeTable {
    /// Record the root-to-leaf path of every leaf.
    ///
    /// Walks with an explicit worklist so very unbalanced trees cannot
    /// exhaust the call stack. A tree that is a single leaf assigns that
    /// symbol the one-bit code `0`.
    pub fn from_tree(tree: &HuffmanTree) -> Self {
        let mut codes = BTreeMap::new();
        let mut stack: Vec<(&HuffNode, Vec<bool>)> = vec![(tree.root(), Vec::new())];

        while let Some((node, path)) = stack.pop() {
            match node {
                HuffNode::Leaf { symbol, .. } => {
                    let code = if path.is_empty() { vec![false] } else { path };
                    codes.insert(*symbol, code);
                }
                HuffNode::Internal { left, right, .. } => {
                    let mut right_path = path.clone();
                    right_path.push(true);
                    stack.push((right.as_ref(), right_path));

                    let mut left_path = path;
                    left_path.push(false);
                    stack.push((left.as_ref(), left_path));
                }
            }
        }

        CodeTable { codes }
    }

    pub fn get(&self, symbol: char) -> Option<&[bool]> {
        self.codes.get(&symbol).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Entries in symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (char, &[bool])> + '_ {
        self.codes.iter().map(|(&s, c)| (s, c.as_slice()))
    }

    /// Payload length in bits for text with the given frequencies.
    pub fn encoded_len(&self, freqs: &FrequencyTable) -> Result<u64, CompressError> {
        freqs.iter().try_fold(0u64, |acc, (symbol, count)| {
            let code = self.get(symbol).ok_or(CompressError::MissingCode(symbol))?;
            (code.len() as u64)
                .checked_mul(count)
                .and_then(|bits| acc.checked_add(bits))
                .ok_or_else(|| CompressError::InvalidInput("payload length overflows u64".into()))
        })
    }

    /// True when no code word is a prefix of another.
    pub fn is_prefix_free(&self) -> bool {
        let mut words: Vec<&[bool]> = self.codes.values().map(Vec::as_slice).collect();
        words.sort();
        // a prefix sorts immediately before some word it prefixes
        words.windows(2).all(|pair| !pair[1].starts_with(pair[0]))
    }
}

/// Render a code word as `0`/`1` characters.
pub fn to_bit_string(bits: &[bool]) -> String {
    bits.iter().map(|&b| if b { '1' } else { '0' }).collect()
}
