//! Sequence map carried in the least-significant bits of an RGBA buffer.
//!
//! Wire format: the compact JSON pair array (`[[r,c],...]`), eight bits per
//! byte MSB first, followed by `DELIMITER_BITS` one bits. One payload bit
//! goes into every R, G and B byte in buffer order; alpha bytes are skipped.

use crate::byte_encodings::{is_alpha, merge_bits, split_byte, zip_bit};
use crate::error::{Error, Result};
use crate::SequenceMap;
use log::debug;
use std::iter;

/// Length of the all-ones terminator.
pub const DELIMITER_BITS: usize = 34;

/// Payload bits a buffer of `len` bytes can carry.
pub fn capacity_bits(len: usize) -> usize {
    len * 3 / 4
}

/// Bits needed to carry `sequence`, terminator included.
pub fn required_bits(sequence: &SequenceMap) -> Result<usize> {
    Ok(serde_json::to_vec(sequence)?.len() * 8 + DELIMITER_BITS)
}

/// Returns a modified copy of `pixels`. On error nothing is written.
pub fn embed(pixels: &[u8], sequence: &SequenceMap) -> Result<Vec<u8>> {
    check_rgba(pixels)?;

    let payload = serde_json::to_vec(sequence)?;
    let required = payload.len() * 8 + DELIMITER_BITS;
    let available = capacity_bits(pixels.len());

    debug!(
        "cover size: {} bytes, payload: {} bits, available: {} bits, utilisation: {:.4}%",
        pixels.len(),
        required,
        available,
        ((required as f64) / (available.max(1) as f64)) * 100.0,
    );

    if required > available {
        return Err(Error::CapacityExceeded {
            required,
            available,
        });
    }

    let bits = payload
        .iter()
        .flat_map(|byte| split_byte(*byte))
        .chain(iter::repeat(1).take(DELIMITER_BITS));

    let mut carrier = pixels.to_vec();
    carrier
        .iter_mut()
        .enumerate()
        .filter(|(offset, _)| !is_alpha(*offset))
        .map(|(_, byte)| byte)
        .zip(bits)
        .for_each(|(byte, bit)| *byte = zip_bit(*byte, bit));

    Ok(carrier)
}

pub fn extract(pixels: &[u8]) -> Result<SequenceMap> {
    check_rgba(pixels)?;

    let mut bits: Vec<u8> = Vec::new();
    let mut ones = 0;

    for (_, byte) in pixels.iter().enumerate().filter(|(offset, _)| !is_alpha(*offset)) {
        let bit = byte & 0x01;
        bits.push(bit);
        ones = if bit == 1 { ones + 1 } else { 0 };
        if ones == DELIMITER_BITS {
            break;
        }
    }

    if ones < DELIMITER_BITS {
        return Err(Error::DelimiterNotFound {
            bits_read: bits.len(),
        });
    }

    bits.truncate(bits.len() - DELIMITER_BITS);

    // The run is detected as soon as it is long enough, so trailing one bits
    // of the last payload byte are counted as terminator. Payload bytes are
    // ASCII and never all ones, so padding to a whole byte with ones restores
    // them.
    let whole = (bits.len() + 7) / 8 * 8;
    bits.resize(whole, 1);

    let payload: Vec<u8> = bits.chunks(8).map(merge_bits).collect();
    debug!("extracted payload: {} bytes", payload.len());

    let sequence: SequenceMap =
        serde_json::from_slice(&payload).map_err(|err| Error::PayloadParse {
            reason: err.to_string(),
        })?;

    if let Some(cell) = sequence.iter().find(|cell| !cell.in_bounds()) {
        return Err(Error::PayloadParse {
            reason: format!("cell ({}, {}) is off the board", cell.row, cell.col),
        });
    }

    Ok(sequence)
}

fn check_rgba(pixels: &[u8]) -> Result<()> {
    if pixels.len() % 4 == 0 {
        Ok(())
    } else {
        Err(Error::InvalidPixelBuffer { len: pixels.len() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Cell;
    use proptest::prelude::*;

    fn cells(pairs: &[(usize, usize)]) -> SequenceMap {
        pairs.iter().map(|p| Cell::from(*p)).collect()
    }

    // Write raw bits into the colour channels, for hand-built payloads.
    fn write_bits(pixels: &mut [u8], bits: &[u8]) {
        pixels
            .iter_mut()
            .enumerate()
            .filter(|(offset, _)| !is_alpha(*offset))
            .map(|(_, byte)| byte)
            .zip(bits)
            .for_each(|(byte, bit)| *byte = zip_bit(*byte, *bit));
    }

    fn payload_bits(text: &str) -> Vec<u8> {
        text.bytes()
            .flat_map(split_byte)
            .chain(iter::repeat(1).take(DELIMITER_BITS))
            .collect()
    }

    #[test]
    fn test_embed_extract() {
        let sequence = cells(&[(0, 0), (4, 7), (8, 8), (1, 2)]);
        let pixels = vec![0x55; 400];

        let carrier = embed(&pixels, &sequence).unwrap();
        assert_eq!(sequence, extract(&carrier).unwrap());
    }

    #[test]
    fn test_empty_sequence() {
        let sequence = SequenceMap::new();
        let carrier = embed(&vec![0; 128], &sequence).unwrap();
        assert_eq!(sequence, extract(&carrier).unwrap());
    }

    #[test]
    fn test_only_colour_lsbs_change() {
        let pixels: Vec<u8> = (0..=255).cycle().take(1024).collect();
        let carrier = embed(&pixels, &cells(&[(3, 3), (5, 1)])).unwrap();

        assert_eq!(pixels.len(), carrier.len());
        for (offset, (before, after)) in pixels.iter().zip(&carrier).enumerate() {
            assert_eq!(before & 0xFE, after & 0xFE);
            if is_alpha(offset) {
                assert_eq!(before, after);
            }
        }
    }

    #[test]
    fn test_bit_layout() {
        // "[]" = 0x5B 0x5D
        let carrier = embed(&vec![0; 128], &SequenceMap::new()).unwrap();
        let lsbs: Vec<u8> = carrier
            .iter()
            .enumerate()
            .filter(|(offset, _)| !is_alpha(*offset))
            .map(|(_, byte)| byte & 0x01)
            .take(16 + DELIMITER_BITS + 1)
            .collect();

        assert_eq!(vec![0u8, 1, 0, 1, 1, 0, 1, 1], lsbs[0..8].to_vec());
        assert_eq!(vec![0u8, 1, 0, 1, 1, 1, 0, 1], lsbs[8..16].to_vec());
        assert!(lsbs[16..16 + DELIMITER_BITS].iter().all(|b| *b == 1));
        assert_eq!(0, lsbs[16 + DELIMITER_BITS]);
    }

    #[test]
    fn test_exact_capacity() {
        let sequence = cells(&[(1, 1)]);
        let required = required_bits(&sequence).unwrap();
        assert_eq!(7 * 8 + DELIMITER_BITS, required);

        // 4 bytes carry 3 bits; round up to whole pixels
        let len = (required + 2) / 3 * 4;
        let pixels = vec![0xFF; len];
        let carrier = embed(&pixels, &sequence).unwrap();
        assert_eq!(sequence, extract(&carrier).unwrap());

        let too_small = vec![0xFF; len - 4];
        assert!(matches!(
            embed(&too_small, &sequence),
            Err(Error::CapacityExceeded { .. })
        ));
    }

    #[test]
    fn test_capacity_exceeded_reports_bits() {
        let sequence = cells(&[(0, 0), (1, 1), (2, 2)]);
        let pixels = vec![0xAB; 16];

        match embed(&pixels, &sequence) {
            Err(Error::CapacityExceeded {
                required,
                available,
            }) => {
                assert_eq!(required_bits(&sequence).unwrap(), required);
                assert_eq!(12, available);
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(pixels.iter().all(|b| *b == 0xAB));
    }

    #[test]
    fn test_rejects_non_rgba_length() {
        assert!(matches!(
            embed(&[0; 7], &SequenceMap::new()),
            Err(Error::InvalidPixelBuffer { len: 7 })
        ));
        assert!(matches!(
            extract(&[0; 5]),
            Err(Error::InvalidPixelBuffer { len: 5 })
        ));
    }

    #[test]
    fn test_delimiter_not_found() {
        match extract(&vec![0x10; 256]) {
            Err(Error::DelimiterNotFound { bits_read }) => assert_eq!(192, bits_read),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_payload_not_a_pair_array() {
        let mut pixels = vec![0; 512];
        write_bits(&mut pixels, &payload_bits("{\"a\":1}"));

        assert!(matches!(
            extract(&pixels),
            Err(Error::PayloadParse { .. })
        ));
    }

    #[test]
    fn test_payload_cell_off_board() {
        let mut pixels = vec![0; 512];
        write_bits(&mut pixels, &payload_bits("[[9,0]]"));

        assert!(matches!(
            extract(&pixels),
            Err(Error::PayloadParse { .. })
        ));
    }

    #[test]
    fn test_extract_ignores_bits_after_delimiter() {
        let sequence = cells(&[(2, 6)]);
        let mut carrier = embed(&vec![0; 512], &sequence).unwrap();
        let tail = carrier.len() - 40;
        carrier[tail..].iter_mut().for_each(|b| *b = 0xFF);

        assert_eq!(sequence, extract(&carrier).unwrap());
    }

    proptest! {
        #[test]
        fn prop_embed_extract(
            pairs in prop::collection::vec((0usize..9, 0usize..9), 0..81),
            fill in any::<u8>(),
        ) {
            let sequence = cells(&pairs);
            let len = (required_bits(&sequence).unwrap() + 2) / 3 * 4;
            let carrier = embed(&vec![fill; len], &sequence).unwrap();
            prop_assert_eq!(sequence, extract(&carrier).unwrap());
        }
    }
}
