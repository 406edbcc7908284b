//! Compressed artifact format
//!
//! ```text
//! magic    4 bytes   "HUFZ"
//! version  1 byte    FORMAT_VERSION
//! tree     bit-packed pre-order, zero-filled to a byte boundary
//!            internal: 0, left subtree, right subtree
//!            leaf:     1, symbol (32 bits), frequency (64 bits)
//! payload  packed block (padding header first) up to end of file
//! ```

use crate::error::CompressError;
use crate::huffman::{HuffNode, HuffmanTree};
use bitstream_io::{BigEndian, BitRead, BitReader, BitWrite, BitWriter};
use std::collections::HashSet;
use std::io::{self, Cursor};
use tracing::warn;

pub const MAGIC: [u8; 4] = *b"HUFZ";
pub const FORMAT_VERSION: u8 = 1;

/// Deepest tree accepted on read. Huffman trees over 64-bit weights stay
/// well below this.
pub const MAX_TREE_DEPTH: usize = 128;

const HEADER_LEN: usize = MAGIC.len() + 1;

/// A decoded artifact: the code tree plus the packed payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub tree: HuffmanTree,
    pub payload: Vec<u8>,
}

impl Artifact {
    pub fn new(tree: HuffmanTree, payload: Vec<u8>) -> Self {
        Self { tree, payload }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, CompressError> {
        let mut header = Vec::with_capacity(HEADER_LEN + self.payload.len() + 16);
        header.extend_from_slice(&MAGIC);
        header.push(FORMAT_VERSION);

        let mut writer = BitWriter::endian(header, BigEndian);
        write_tree(&mut writer, &self.tree)?;
        writer.byte_align()?;

        let mut out = writer.into_writer();
        out.extend_from_slice(&self.payload);
        Ok(out)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CompressError> {
        if bytes.len() < HEADER_LEN {
            return Err(CompressError::corrupt("artifact shorter than its header"));
        }
        if bytes[..MAGIC.len()] != MAGIC {
            warn!("rejecting artifact with unknown magic");
            return Err(CompressError::corrupt("not a huffzip artifact"));
        }
        let version = bytes[MAGIC.len()];
        if version != FORMAT_VERSION {
            warn!(version, "rejecting artifact version");
            return Err(CompressError::UnsupportedVersion(version));
        }

        let mut reader = BitReader::endian(Cursor::new(&bytes[HEADER_LEN..]), BigEndian);
        let tree = read_tree(&mut reader)?;
        reader.byte_align();
        let tree_len = reader.into_reader().position() as usize;

        Ok(Self {
            tree,
            payload: bytes[HEADER_LEN + tree_len..].to_vec(),
        })
    }
}

fn write_tree<W: BitWrite>(writer: &mut W, tree: &HuffmanTree) -> io::Result<()> {
    let mut stack = vec![tree.root()];
    while let Some(node) = stack.pop() {
        match node {
            HuffNode::Internal { left, right, .. } => {
                writer.write_bit(false)?;
                stack.push(right);
                stack.push(left);
            }
            HuffNode::Leaf { symbol, freq } => {
                writer.write_bit(true)?;
                writer.write(32, u32::from(*symbol))?;
                writer.write(64, *freq)?;
            }
        }
    }
    Ok(())
}

fn truncated(_: io::Error) -> CompressError {
    CompressError::corrupt("tree section is truncated")
}

/// Rebuild the tree without recursion. `pending` holds one slot per open
/// internal node: `None` until its left subtree completes.
fn read_tree<R: BitRead>(reader: &mut R) -> Result<HuffmanTree, CompressError> {
    let mut pending: Vec<Option<HuffNode>> = Vec::new();
    let mut seen = HashSet::new();

    loop {
        let is_leaf = reader.read_bit().map_err(truncated)?;
        if !is_leaf {
            if pending.len() >= MAX_TREE_DEPTH {
                return Err(CompressError::corrupt(format!(
                    "tree deeper than {} levels",
                    MAX_TREE_DEPTH
                )));
            }
            pending.push(None);
            continue;
        }

        let raw: u32 = reader.read(32).map_err(truncated)?;
        let symbol = char::from_u32(raw).ok_or_else(|| {
            CompressError::corrupt(format!("leaf holds invalid scalar value {:#x}", raw))
        })?;
        let freq: u64 = reader.read(64).map_err(truncated)?;
        if freq == 0 {
            return Err(CompressError::corrupt(format!(
                "leaf {:?} has zero frequency",
                symbol
            )));
        }
        if !seen.insert(symbol) {
            return Err(CompressError::corrupt(format!(
                "symbol {:?} appears in more than one leaf",
                symbol
            )));
        }

        let mut node = HuffNode::leaf(symbol, freq);
        loop {
            match pending.pop() {
                None => return Ok(HuffmanTree::from_root(node)),
                Some(None) => {
                    pending.push(Some(node));
                    break;
                }
                Some(Some(left)) => {
                    node = HuffNode::merge(left, node)
                        .map_err(|_| CompressError::corrupt("tree weight overflows"))?;
                }
            }
        }
    }
}
