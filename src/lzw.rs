//! An LZW codec with GIF's code semantics: a clear code, an end-of-information
//! code, and a code table that grows one entry per emitted code.
//!
//! The codec works in two layers. [`encode`] and [`decode`] translate between
//! index streams and streams of code *words*, with no bit packing involved.
//! [`pack`] and [`unpack`] translate between code words and the LSB-first,
//! variable-bit-width byte representation stored inside a GIF image block.

use std::collections::HashMap;

use crate::stream::ByteSink;
use crate::{Error, Result};

/// The largest code a GIF stream can hold; codes are at most 12 bits wide.
const MAX_CODE: u16 = 4095;

/// The widest code allowed in the packed representation.
const MAX_CODE_BITS: u32 = 12;

/// Check the minimum code size against GIF's supported pixel depths. The
/// value comes straight off the wire in the parse path, so it cannot be
/// trusted to fit a shift.
fn check_min_code_size(min_code_size: u8) -> Result<()> {
    if !(1..=8).contains(&min_code_size) {
        return Err(Error::UnsupportedCodeSize(min_code_size));
    }
    Ok(())
}

/// Seed a decode table with the single-index sequences `[0]..[clear - 1]`,
/// plus empty placeholders for the clear and end-of-information codes, so
/// that the next assignable code is always the table length.
fn seed_table(table: &mut Vec<Vec<u8>>, clear: u16) {
    table.clear();
    for i in 0..clear {
        table.push(vec![i as u8]);
    }
    table.push(Vec::new()); // clear code
    table.push(Vec::new()); // end-of-information code
}

/// Seed an encode dictionary with the single-index sequences.
fn seed_dict(dict: &mut HashMap<Vec<u8>, u16>, clear: u16) {
    dict.clear();
    for i in 0..clear {
        dict.insert(vec![i as u8], i);
    }
}

/// Decode a stream of code words into an index stream.
///
/// The clear code is inferred from the first word of the stream, as written
/// by [`encode`]. A clear code reappearing mid-stream resets the table and
/// the next code re-seeds the output. Decoding stops at the
/// end-of-information code, or at the end of the stream if none appears.
pub fn decode(codes: &[u16]) -> Result<Vec<u8>> {
    if codes.is_empty() {
        return Err(Error::EmptyIndexStream);
    }
    let clear = codes[0];
    if clear == 0 || clear > MAX_CODE {
        return Err(Error::InvalidLzwCode(clear));
    }
    let eoi = clear + 1;

    let mut table: Vec<Vec<u8>> = Vec::new();
    seed_table(&mut table, clear);

    let mut sink = ByteSink::with_capacity(codes.len() * 2);
    let mut prev: Option<Vec<u8>> = None;

    for &code in &codes[1..] {
        if code == clear {
            seed_table(&mut table, clear);
            prev = None;
            continue;
        }
        if code == eoi {
            break;
        }
        let slot = code as usize;
        match prev.take() {
            // The first code after a clear is emitted directly and must be a
            // single-index literal.
            None => {
                if code >= clear {
                    return Err(Error::InvalidLzwCode(code));
                }
                let seq = table[slot].clone();
                sink.write_bytes(&seq);
                prev = Some(seq);
            }
            Some(previous) => {
                if slot < table.len() {
                    let seq = table[slot].clone();
                    sink.write_bytes(&seq);
                    let mut entry = previous;
                    entry.push(seq[0]);
                    table.push(entry);
                    prev = Some(seq);
                } else if slot == table.len() {
                    // The classic special case: the code refers to the entry
                    // the encoder registered one step ahead of us. Derive it
                    // from the previous sequence.
                    let mut seq = previous;
                    seq.push(seq[0]);
                    sink.write_bytes(&seq);
                    table.push(seq.clone());
                    prev = Some(seq);
                } else {
                    return Err(Error::InvalidLzwCode(code));
                }
            }
        }
    }

    Ok(sink.finalize_bytes())
}

/// Encode an index stream into a stream of code words.
///
/// The first emitted word is always the clear code `1 << min_code_size`, and
/// the last is the end-of-information code. When the table reaches the
/// 12-bit ceiling the encoder emits another clear code and starts a fresh
/// table, so arbitrarily long inputs stay within GIF's code range.
pub fn encode(min_code_size: u8, indices: &[u8]) -> Result<Vec<u16>> {
    check_min_code_size(min_code_size)?;
    if indices.is_empty() {
        return Err(Error::EmptyIndexStream);
    }
    let clear: u16 = 1 << min_code_size;
    let eoi = clear + 1;

    let mut dict: HashMap<Vec<u8>, u16> = HashMap::new();
    seed_dict(&mut dict, clear);
    let mut next_code = eoi + 1;

    let mut sink = ByteSink::with_capacity(indices.len());
    sink.write_u16_le(clear);

    let mut buffer = vec![indices[0]];
    for &index in &indices[1..] {
        let mut extended = buffer.clone();
        extended.push(index);
        if dict.contains_key(&extended) {
            buffer = extended;
            continue;
        }

        let code = *dict
            .get(&buffer)
            .ok_or(Error::InvalidLzwCode(index as u16))?;
        sink.write_u16_le(code);

        if next_code >= MAX_CODE {
            // The table is full. Signal a reset instead of registering the
            // new sequence.
            sink.write_u16_le(clear);
            seed_dict(&mut dict, clear);
            next_code = eoi + 1;
        } else {
            dict.insert(extended, next_code);
            next_code += 1;
        }
        buffer.clear();
        buffer.push(index);
    }

    let code = *dict
        .get(&buffer)
        .ok_or(Error::InvalidLzwCode(buffer[0] as u16))?;
    sink.write_u16_le(code);
    sink.write_u16_le(eoi);
    sink.finalize_u16s()
}

/// Tracks the code width shared by the packed representation's reader and
/// writer. The counter advances once per processed code and the width grows
/// when the counter passes the current width's capacity, which mirrors the
/// one-entry lag between the encoder's and the decoder's table construction.
struct WidthTracker {
    min_code_size: u8,
    clear: u16,
    width: u32,
    running: u32,
}

impl WidthTracker {
    fn new(min_code_size: u8) -> Self {
        let clear = 1u16 << min_code_size;
        Self {
            min_code_size,
            clear,
            width: min_code_size as u32 + 1,
            running: clear as u32 + 2,
        }
    }

    /// Account for one processed code.
    fn advance(&mut self, code: u16) {
        if self.running < MAX_CODE as u32 + 2 {
            self.running += 1;
            if self.running > (1 << self.width) && self.width < MAX_CODE_BITS {
                self.width += 1;
            }
        }
        if code == self.clear {
            self.running = self.clear as u32 + 2;
            self.width = self.min_code_size as u32 + 1;
        }
    }
}

/// Pack a stream of code words into GIF's LSB-first variable-bit-width
/// bytes. `min_code_size` must be in `1..=8`; the container layer derives it
/// from the color-table bit depth and never passes less than 2.
pub fn pack(min_code_size: u8, codes: &[u16]) -> Vec<u8> {
    debug_assert!((1..=8).contains(&min_code_size));
    let mut tracker = WidthTracker::new(min_code_size);
    let mut sink = ByteSink::with_capacity(codes.len());
    let mut acc: u32 = 0;
    let mut n_bits: u32 = 0;

    for &code in codes {
        acc |= (code as u32) << n_bits;
        n_bits += tracker.width;
        while n_bits >= 8 {
            sink.write_u8(acc as u8);
            acc >>= 8;
            n_bits -= 8;
        }
        tracker.advance(code);
    }
    if n_bits > 0 {
        sink.write_u8(acc as u8);
    }
    sink.finalize_bytes()
}

/// Unpack GIF's variable-bit-width bytes back into code words. Reading stops
/// after the end-of-information code, or when the remaining bits cannot form
/// a whole code.
pub fn unpack(min_code_size: u8, bytes: &[u8]) -> Result<Vec<u16>> {
    check_min_code_size(min_code_size)?;
    let mut tracker = WidthTracker::new(min_code_size);
    let eoi = tracker.clear + 1;

    let mut sink = ByteSink::with_capacity(bytes.len() * 2);
    let mut acc: u32 = 0;
    let mut n_bits: u32 = 0;
    let mut bytes = bytes.iter();

    'stream: loop {
        while n_bits < tracker.width {
            match bytes.next() {
                Some(&b) => {
                    acc |= (b as u32) << n_bits;
                    n_bits += 8;
                }
                // The stream ended without an end-of-information code.
                None => break 'stream,
            }
        }
        let code = (acc & ((1u32 << tracker.width) - 1)) as u16;
        acc >>= tracker.width;
        n_bits -= tracker.width;
        sink.write_u16_le(code);
        if code == eoi {
            break;
        }
        tracker.advance(code);
    }
    sink.finalize_u16s()
}

#[test]
fn test_known_code_stream() {
    let codes = encode(1, &[0, 1, 0, 1, 0, 1, 0, 1, 0]).unwrap();
    assert_eq!(codes, [2, 0, 1, 4, 6, 5, 3]);
    assert_eq!(decode(&codes).unwrap(), [0, 1, 0, 1, 0, 1, 0, 1, 0]);
}

#[test]
fn test_packed_round_trip() {
    let indices = [1u8, 1, 1, 1, 2, 2, 2, 2, 1, 1, 1, 1, 0, 0, 0, 0];
    let codes = encode(2, &indices).unwrap();
    let bytes = pack(2, &codes);
    assert_eq!(unpack(2, &bytes).unwrap(), codes);
    assert_eq!(decode(&codes).unwrap(), indices);
}
