//! Encoder and decoder pipelines
//!
//! Encode: text -> frequencies -> tree -> codes -> bits -> packed bytes.
//! Decode: packed bytes -> bits -> tree walk -> text. The tree itself is
//! the decoding automaton; no reverse lookup table is built.

use crate::bitpack;
use crate::codes::{to_bit_string, CodeTable};
use crate::error::CompressError;
use crate::frequency::FrequencyTable;
use crate::huffman::{HuffNode, HuffmanTree};
use tracing::{debug, trace};

/// Everything produced by one encoding pass.
#[derive(Debug, Clone)]
pub struct Encoded {
    pub frequencies: FrequencyTable,
    pub tree: HuffmanTree,
    pub codes: CodeTable,
    /// Payload length in bits, before the header and padding.
    pub payload_bits: usize,
    pub padding: u8,
    /// Header, payload and padding packed into bytes.
    pub packed: Vec<u8>,
}

/// Run the full encoding pipeline over `text`.
pub fn encode(text: &str) -> Result<Encoded, CompressError> {
    let frequencies = FrequencyTable::from_text(text);
    if frequencies.is_empty() {
        return Err(CompressError::EmptyInput);
    }

    let tree = HuffmanTree::build(&frequencies)?;
    let codes = CodeTable::from_tree(&tree);
    for (symbol, code) in codes.iter() {
        trace!(?symbol, code = %to_bit_string(code), "code word");
    }

    let payload_bits = usize::try_from(codes.encoded_len(&frequencies)?).map_err(|_| {
        CompressError::InvalidInput("payload does not fit in addressable memory".into())
    })?;
    let (packed, padding) = bitpack::pack_words(payload_bits, translate(text, &codes))?;
    debug!(
        alphabet = frequencies.len(),
        symbols = frequencies.total(),
        payload_bits,
        padding,
        packed_bytes = packed.len(),
        "encoded text"
    );

    Ok(Encoded {
        payload_bits,
        frequencies,
        tree,
        codes,
        padding,
        packed,
    })
}

/// The code word of every character of `text`, in order.
pub fn translate<'a>(
    text: &'a str,
    codes: &'a CodeTable,
) -> impl Iterator<Item = Result<&'a [bool], CompressError>> + 'a {
    text.chars().map(move |ch| codes.get(ch).ok_or(CompressError::MissingCode(ch)))
}

/// Walk `tree` over the payload of `packed`. The number of decoded symbols
/// must match the tree weight, so a payload cut short at a code boundary is
/// still reported as corrupt.
pub fn decode(tree: &HuffmanTree, packed: &[u8]) -> Result<String, CompressError> {
    let payload = bitpack::payload_bits(packed)?;
    debug!(payload_bits = payload.len(), "unpacked payload");
    let text = walk(tree, payload)?;

    let decoded = text.chars().count() as u64;
    if decoded != tree.weight() {
        return Err(CompressError::corrupt(format!(
            "decoded {} symbols, tree holds {}",
            decoded,
            tree.weight()
        )));
    }
    Ok(text)
}

/// Decode a payload bit by bit: 0 goes left, 1 goes right, and each leaf
/// reached emits its symbol and restarts at the root.
pub fn walk<I>(tree: &HuffmanTree, bits: I) -> Result<String, CompressError>
where
    I: IntoIterator<Item = bool>,
{
    let bits = bits.into_iter();
    let root = tree.root();
    let mut out = String::new();

    // A lone leaf answers to the one-bit code 0.
    if let HuffNode::Leaf { symbol, .. } = root {
        for (pos, bit) in bits.enumerate() {
            if bit {
                return Err(CompressError::corrupt(format!(
                    "bit {} selects a missing child of a single-symbol tree",
                    pos
                )));
            }
            out.push(*symbol);
        }
        return Ok(out);
    }

    let mut node = root;
    for (pos, bit) in bits.enumerate() {
        let HuffNode::Internal { left, right, .. } = node else {
            return Err(CompressError::corrupt(format!(
                "walk stalled on a leaf at bit {}",
                pos
            )));
        };
        let next: &HuffNode = if bit { right } else { left };
        node = next;
        if let HuffNode::Leaf { symbol, .. } = node {
            out.push(*symbol);
            node = root;
        }
    }

    if !std::ptr::eq(node, root) {
        return Err(CompressError::corrupt("payload ends in the middle of a code word"));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits(s: &str) -> Vec<bool> {
        s.chars().map(|c| c == '1').collect()
    }

    #[test]
    fn test_abracadabra_packed_bytes() {
        let encoded = encode("abracadabra").unwrap();
        assert_eq!(encoded.payload_bits, 23);
        assert_eq!(encoded.padding, 1);
        assert_eq!(encoded.packed, vec![0x01, 0x6E, 0x8A, 0xDC]);
        // ceil((23 + 8) / 8)
        assert_eq!(encoded.packed.len(), (23 + 8 + 7) / 8);
    }

    #[test]
    fn test_abracadabra_roundtrip() {
        let encoded = encode("abracadabra").unwrap();
        let decoded = decode(&encoded.tree, &encoded.packed).unwrap();
        assert_eq!(decoded, "abracadabra");
    }

    #[test]
    fn test_empty_text_rejected() {
        assert!(matches!(encode(""), Err(CompressError::EmptyInput)));
    }

    #[test]
    fn test_single_symbol_roundtrip() {
        let encoded = encode("aaaa").unwrap();
        assert_eq!(encoded.payload_bits, 4);
        assert_eq!(encoded.packed, vec![0x04, 0x00]);
        assert_eq!(decode(&encoded.tree, &encoded.packed).unwrap(), "aaaa");
    }

    #[test]
    fn test_single_symbol_aligned_payload() {
        let encoded = encode("aaaaaaaa").unwrap();
        assert_eq!(encoded.padding, 8);
        assert_eq!(encoded.packed, vec![0x08, 0x00, 0x00]);
        assert_eq!(decode(&encoded.tree, &encoded.packed).unwrap(), "aaaaaaaa");
    }

    #[test]
    fn test_single_symbol_rejects_one_bit() {
        let tree = encode("zz").unwrap().tree;
        assert!(matches!(
            walk(&tree, bits("010")),
            Err(CompressError::CorruptStream(_))
        ));
    }

    #[test]
    fn test_translate_missing_code() {
        let codes = encode("abc").unwrap().codes;
        let words: Result<Vec<_>, _> = translate("abd", &codes).collect();
        assert!(matches!(words, Err(CompressError::MissingCode('d'))));
    }

    #[test]
    fn test_walk_truncated_code_word() {
        let tree = encode("abracadabra").unwrap().tree;
        // "a" then the first two bits of "b"
        assert!(matches!(
            walk(&tree, bits("011")),
            Err(CompressError::CorruptStream(_))
        ));
    }

    #[test]
    fn test_walk_empty_payload() {
        let tree = encode("abracadabra").unwrap().tree;
        assert_eq!(walk(&tree, Vec::new()).unwrap(), "");
    }

    #[test]
    fn test_payload_cut_at_code_boundary() {
        let tree = encode("abracadabra").unwrap().tree;
        // last payload byte dropped, header rewritten to keep the walk aligned
        assert_eq!(walk(&tree, bits("0110111010001010")).unwrap(), "abracada");
        assert!(matches!(
            decode(&tree, &[0x00, 0x6E, 0x8A]),
            Err(CompressError::CorruptStream(_))
        ));
    }

    #[test]
    fn test_single_symbol_extra_zero_bits() {
        let tree = encode("aaaa").unwrap().tree;
        // header 0 turns the four padding bits into payload
        assert!(matches!(
            decode(&tree, &[0x00, 0x00]),
            Err(CompressError::CorruptStream(_))
        ));
    }

    #[test]
    fn test_translate_yields_code_words() {
        let codes = encode("abracadabra").unwrap().codes;
        let words: Vec<&[bool]> = translate("abr", &codes).collect::<Result<_, _>>().unwrap();
        let rendered: Vec<String> = words.into_iter().map(to_bit_string).collect();
        assert_eq!(rendered, vec!["0", "110", "111"]);
    }

    #[test]
    fn test_unicode_roundtrip() {
        let text = "naïve café – 日本語テキスト 🎉🎉";
        let encoded = encode(text).unwrap();
        assert_eq!(decode(&encoded.tree, &encoded.packed).unwrap(), text);
    }

    #[test]
    fn test_encode_is_reproducible() {
        let text = "she sells sea shells by the sea shore";
        let first = encode(text).unwrap();
        let second = encode(text).unwrap();
        assert_eq!(first.packed, second.packed);
        assert_eq!(first.tree, second.tree);
    }
}
