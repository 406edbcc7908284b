//! Huffman tree construction
//!
//! Classic greedy merging over a min-priority queue. Each queued node
//! carries a sequence number (first appearance for leaves, creation order
//! for merged nodes) so equal weights always pop in the same order and the
//! resulting tree is reproducible across runs.

use crate::error::CompressError;
use crate::frequency::FrequencyTable;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A node of the code tree. Internal nodes own both children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HuffNode {
    Leaf {
        symbol: char,
        freq: u64,
    },
    Internal {
        freq: u64,
        left: Box<HuffNode>,
        right: Box<HuffNode>,
    },
}

impl HuffNode {
    pub fn leaf(symbol: char, freq: u64) -> Self {
        HuffNode::Leaf { symbol, freq }
    }

    /// Join two subtrees; `left` takes the 0 edge. Fails when the combined
    /// weight does not fit in a `u64`.
    pub fn merge(left: HuffNode, right: HuffNode) -> Result<Self, CompressError> {
        let freq = left.freq().checked_add(right.freq()).ok_or_else(|| {
            CompressError::InvalidInput("combined frequency overflows u64".into())
        })?;
        Ok(HuffNode::Internal {
            freq,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn freq(&self) -> u64 {
        match self {
            HuffNode::Leaf { freq, .. } => *freq,
            HuffNode::Internal { freq, .. } => *freq,
        }
    }

    pub fn symbol(&self) -> Option<char> {
        match self {
            HuffNode::Leaf { symbol, .. } => Some(*symbol),
            HuffNode::Internal { .. } => None,
        }
    }
}

struct QueueEntry {
    node: HuffNode,
    seq: usize,
}

impl Eq for QueueEntry {}
impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // min-heap on (freq, seq)
        other
            .node
            .freq()
            .cmp(&self.node.freq())
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTree {
    root: HuffNode,
}

impl HuffmanTree {
    /// Build the code tree for a non-empty frequency table.
    ///
    /// The first node popped from the queue becomes the left child of the
    /// merge. A single-symbol table yields a tree whose root is that leaf.
    pub fn build(freqs: &FrequencyTable) -> Result<Self, CompressError> {
        if freqs.is_empty() {
            return Err(CompressError::InvalidInput(
                "cannot build a tree from an empty alphabet".into(),
            ));
        }
        if freqs.overflowed() {
            return Err(CompressError::InvalidInput(
                "total frequency overflows u64".into(),
            ));
        }

        let mut heap = BinaryHeap::with_capacity(freqs.len());
        for (seq, (symbol, freq)) in freqs.iter().enumerate() {
            if freq == 0 {
                return Err(CompressError::InvalidInput(format!(
                    "symbol {:?} has zero frequency",
                    symbol
                )));
            }
            heap.push(QueueEntry {
                node: HuffNode::leaf(symbol, freq),
                seq,
            });
        }

        let mut next_seq = heap.len();
        let root = loop {
            let first = heap.pop().ok_or_else(|| {
                CompressError::InvalidInput("priority queue drained before root".into())
            })?;
            let Some(second) = heap.pop() else {
                break first.node;
            };
            heap.push(QueueEntry {
                node: HuffNode::merge(first.node, second.node)?,
                seq: next_seq,
            });
            next_seq += 1;
        };

        Ok(HuffmanTree { root })
    }

    pub(crate) fn from_root(root: HuffNode) -> Self {
        HuffmanTree { root }
    }

    pub fn root(&self) -> &HuffNode {
        &self.root
    }

    /// Total frequency, equal to the number of symbols encoded.
    pub fn weight(&self) -> u64 {
        self.root.freq()
    }

    /// Leaves as `(symbol, freq)` in pre-order (left before right).
    pub fn leaves(&self) -> Vec<(char, u64)> {
        let mut out = Vec::new();
        let mut stack = vec![&self.root];
        while let Some(node) = stack.pop() {
            match node {
                HuffNode::Leaf { symbol, freq } => out.push((*symbol, *freq)),
                HuffNode::Internal { left, right, .. } => {
                    stack.push(right);
                    stack.push(left);
                }
            }
        }
        out
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves().len()
    }

    /// Length of the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        let mut max = 0;
        let mut stack = vec![(&self.root, 0usize)];
        while let Some((node, depth)) = stack.pop() {
            match node {
                HuffNode::Leaf { .. } => max = max.max(depth),
                HuffNode::Internal { left, right, .. } => {
                    stack.push((left.as_ref(), depth + 1));
                    stack.push((right.as_ref(), depth + 1));
                }
            }
        }
        max
    }
}
