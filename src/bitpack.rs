//! Bit packing with an 8-bit padding header
//!
//! Layout of a packed block, MSB first:
//!
//! ```text
//! [padding: 8 bits][payload bits][padding zero bits]
//! ```
//!
//! `padding = 8 - payload_len % 8`, so it is always in `1..=8`. A payload
//! that is already byte aligned gets a full zero byte appended. Readers
//! accept any count in `0..=8`.

use crate::error::CompressError;
use bitstream_io::{BigEndian, BitRead, BitReader, BitWrite, BitWriter};

pub const HEADER_BITS: usize = 8;
pub const MAX_PADDING: u8 = 8;

/// Number of zero bits appended after a payload of `payload_len` bits.
pub fn padding_for(payload_len: usize) -> u8 {
    (8 - payload_len % 8) as u8
}

/// Prefix the padding count and append the padding bits.
pub fn pad(payload: &[bool]) -> Vec<bool> {
    let padding = padding_for(payload.len());
    let mut out = Vec::with_capacity(HEADER_BITS + payload.len() + padding as usize);
    out.extend((0..HEADER_BITS).rev().map(|i| (padding >> i) & 1 == 1));
    out.extend_from_slice(payload);
    out.extend(std::iter::repeat(false).take(padding as usize));
    out
}

/// Pack a byte-aligned bit sequence into bytes, MSB first.
pub fn pack(bits: &[bool]) -> Result<Vec<u8>, CompressError> {
    if bits.len() % 8 != 0 {
        return Err(CompressError::InvalidInput(format!(
            "cannot pack {} bits into whole bytes",
            bits.len()
        )));
    }
    let mut writer = BitWriter::endian(Vec::with_capacity(bits.len() / 8), BigEndian);
    for &bit in bits {
        writer.write_bit(bit)?;
    }
    Ok(writer.into_writer())
}

/// Expand every byte into 8 bits, MSB first.
pub fn unpack(bytes: &[u8]) -> Result<Vec<bool>, CompressError> {
    let mut reader = BitReader::endian(bytes, BigEndian);
    let mut bits = Vec::with_capacity(bytes.len() * 8);
    for _ in 0..bytes.len() * 8 {
        bits.push(reader.read_bit()?);
    }
    Ok(bits)
}

/// Read the header, drop it, then drop the counted padding bits from the end.
pub fn remove_padding(bits: &[bool]) -> Result<Vec<bool>, CompressError> {
    if bits.len() < HEADER_BITS {
        return Err(CompressError::corrupt(format!(
            "block of {} bits has no padding header",
            bits.len()
        )));
    }
    let padding = bits[..HEADER_BITS]
        .iter()
        .fold(0usize, |acc, &bit| (acc << 1) | bit as usize);
    if padding > MAX_PADDING as usize {
        return Err(CompressError::corrupt(format!(
            "padding count {} exceeds {}",
            padding, MAX_PADDING
        )));
    }
    let body = &bits[HEADER_BITS..];
    if padding > body.len() {
        return Err(CompressError::corrupt(format!(
            "padding count {} larger than {} remaining bits",
            padding,
            body.len()
        )));
    }
    Ok(body[..body.len() - padding].to_vec())
}

/// Pad and pack a payload. Returns the bytes and the padding count used.
pub fn pack_payload(payload: &[bool]) -> Result<(Vec<u8>, u8), CompressError> {
    let padding = padding_for(payload.len());
    let bytes = pack(&pad(payload))?;
    Ok((bytes, padding))
}

/// Pack a payload given as a sequence of code words, writing straight into
/// the output bytes. `payload_len` is the total number of bits the words
/// hold; it fixes the padding header before the first word is written.
pub fn pack_words<'a, I>(payload_len: usize, words: I) -> Result<(Vec<u8>, u8), CompressError>
where
    I: IntoIterator<Item = Result<&'a [bool], CompressError>>,
{
    let padding = padding_for(payload_len);
    let mut writer = BitWriter::endian(Vec::with_capacity(payload_len / 8 + 2), BigEndian);
    writer.write(HEADER_BITS as u32, padding)?;

    let mut written = 0usize;
    for word in words {
        let word = word?;
        written += word.len();
        if written > payload_len {
            break;
        }
        for &bit in word {
            writer.write_bit(bit)?;
        }
    }
    if written != payload_len {
        return Err(CompressError::InvalidInput(format!(
            "code words hold {} bits, expected {}",
            written, payload_len
        )));
    }

    for _ in 0..padding {
        writer.write_bit(false)?;
    }
    Ok((writer.into_writer(), padding))
}

/// Payload bits of a packed block, read lazily from the borrowed bytes.
pub struct PayloadBits<'a> {
    reader: BitReader<&'a [u8], BigEndian>,
    remaining: usize,
}

impl Iterator for PayloadBits<'_> {
    type Item = bool;

    fn next(&mut self) -> Option<bool> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        // the length was checked against the body, so the read cannot run dry
        self.reader.read_bit().ok()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for PayloadBits<'_> {}

/// Validate the padding header of `bytes` and iterate the payload bits
/// that follow it.
pub fn payload_bits(bytes: &[u8]) -> Result<PayloadBits<'_>, CompressError> {
    let Some((&padding, body)) = bytes.split_first() else {
        return Err(CompressError::corrupt("block has no padding header"));
    };
    if padding > MAX_PADDING {
        return Err(CompressError::corrupt(format!(
            "padding count {} exceeds {}",
            padding, MAX_PADDING
        )));
    }
    let body_bits = body.len() * 8;
    if padding as usize > body_bits {
        return Err(CompressError::corrupt(format!(
            "padding count {} larger than {} remaining bits",
            padding, body_bits
        )));
    }
    Ok(PayloadBits {
        reader: BitReader::endian(body, BigEndian),
        remaining: body_bits - padding as usize,
    })
}

/// Inverse of [`pack_payload`].
pub fn unpack_payload(bytes: &[u8]) -> Result<Vec<bool>, CompressError> {
    Ok(payload_bits(bytes)?.collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits(s: &str) -> Vec<bool> {
        s.chars().map(|c| c == '1').collect()
    }

    #[test]
    fn test_padding_values() {
        assert_eq!(padding_for(0), 8);
        assert_eq!(padding_for(1), 7);
        assert_eq!(padding_for(7), 1);
        assert_eq!(padding_for(8), 8);
        assert_eq!(padding_for(23), 1);
    }

    #[test]
    fn test_pad_layout() {
        // header 5, payload 101, five zero bits
        let padded = pad(&bits("101"));
        assert_eq!(padded, bits("0000010110100000"));
    }

    #[test]
    fn test_pack_msb_first() {
        let packed = pack(&bits("1000000000000001")).unwrap();
        assert_eq!(packed, vec![0x80, 0x01]);
    }

    #[test]
    fn test_pack_rejects_unaligned() {
        assert!(matches!(
            pack(&bits("101")),
            Err(CompressError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_unpack_zero_fills_each_byte() {
        assert_eq!(unpack(&[0x05]).unwrap(), bits("00000101"));
        assert!(unpack(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_empty_payload_recoverable() {
        let (packed, padding) = pack_payload(&[]).unwrap();
        assert_eq!(padding, 8);
        assert_eq!(packed, vec![0x08, 0x00]);
        assert!(unpack_payload(&packed).unwrap().is_empty());
    }

    #[test]
    fn test_aligned_payload_gets_full_padding_byte() {
        let payload = bits("11001010");
        let (packed, padding) = pack_payload(&payload).unwrap();
        assert_eq!(padding, 8);
        assert_eq!(packed, vec![0x08, 0xCA, 0x00]);
        assert_eq!(unpack_payload(&packed).unwrap(), payload);
    }

    #[test]
    fn test_zero_padding_header_drops_nothing() {
        let recovered = remove_padding(&bits("0000000011110000")).unwrap();
        assert_eq!(recovered, bits("11110000"));
    }

    #[test]
    fn test_missing_header() {
        assert!(matches!(
            remove_padding(&bits("0101")),
            Err(CompressError::CorruptStream(_))
        ));
        assert!(matches!(
            unpack_payload(&[]),
            Err(CompressError::CorruptStream(_))
        ));
    }

    #[test]
    fn test_padding_count_out_of_range() {
        // header says 9
        assert!(matches!(
            unpack_payload(&[0x09, 0xFF, 0xFF]),
            Err(CompressError::CorruptStream(_))
        ));
    }

    #[test]
    fn test_pack_words_matches_pack_payload() {
        let words = [bits("0"), bits("110"), bits("111"), bits("0"), bits("10")];
        let joined: Vec<bool> = words.concat();
        let streamed = pack_words(joined.len(), words.iter().map(|w| Ok(w.as_slice()))).unwrap();
        assert_eq!(streamed, pack_payload(&joined).unwrap());
    }

    #[test]
    fn test_pack_words_length_mismatch() {
        let words = [bits("101"), bits("11")];
        for len in [4, 6] {
            assert!(matches!(
                pack_words(len, words.iter().map(|w| Ok(w.as_slice()))),
                Err(CompressError::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn test_pack_words_propagates_word_error() {
        let first = [true];
        let words = vec![Ok(&first[..]), Err(CompressError::MissingCode('x'))];
        assert!(matches!(
            pack_words(1, words),
            Err(CompressError::MissingCode('x'))
        ));
    }

    #[test]
    fn test_payload_bits_is_exact_size() {
        let payload = payload_bits(&[0x03, 0xA5]).unwrap();
        assert_eq!(payload.len(), 5);
        assert_eq!(payload.collect::<Vec<_>>(), bits("10100"));
    }

    #[test]
    fn test_padding_longer_than_body() {
        // header says 8 with no body
        assert!(matches!(
            unpack_payload(&[0x08]),
            Err(CompressError::CorruptStream(_))
        ));
    }
}
