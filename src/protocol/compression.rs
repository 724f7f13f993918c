//! # Run-Length Payload Compression
//!
//! Data packets may carry their tiles run-length encoded. The compressed
//! stream is a sequence of runs, each introduced by one control byte:
//!
//! | Control byte | Meaning | Length range |
//! |--------------|---------|--------------|
//! | `0b0nnnnnnn` | copy the next `n + 1` bytes verbatim | 1–128 |
//! | `0b1nnnnnnn` | repeat the next single byte `n + 2` times | 2–129 |
//!
//! ```text
//! 03 AA BB CC DD   → AA BB CC DD            (literal, 4 bytes)
//! 85 00            → 00 00 00 00 00 00 00   (repeat, 7 bytes)
//! ```
//!
//! The whole compressed payload is consumed. A control byte that promises
//! more bytes than the payload still holds is a decompression error.

use crate::error::DecodeError;

/// Bit 7 of a control byte selects a repeat run
const REPEAT_FLAG: u8 = 0x80;

/// Longest literal run one control byte can describe
pub const MAX_LITERAL_RUN: usize = 128;

/// Longest repeat run one control byte can describe
pub const MAX_REPEAT_RUN: usize = 129;

/// Shortest run worth encoding as a repeat when compressing
const MIN_REPEAT_RUN: usize = 3;

/// Expand a run-length encoded payload.
///
/// ## Example
///
/// ```
/// use gbprinter::protocol::compression::decompress;
///
/// // One repeat run of the maximum length
/// let out = decompress(&[0xFF, 0xFF]).unwrap();
/// assert_eq!(out, vec![0xFF; 129]);
///
/// // A literal run followed by a repeat run
/// let out = decompress(&[0x01, 0x12, 0x34, 0x80, 0x00]).unwrap();
/// assert_eq!(out, vec![0x12, 0x34, 0x00, 0x00]);
/// ```
pub fn decompress(data: &[u8]) -> Result<Vec<u8>, DecodeError> {
    let mut out = Vec::with_capacity(data.len() * 2);
    let mut pos = 0;

    while pos < data.len() {
        let control = data[pos];
        pos += 1;

        if control & REPEAT_FLAG == 0 {
            let count = (control & !REPEAT_FLAG) as usize + 1;
            let literal = data.get(pos..pos + count).ok_or_else(|| DecodeError::Decompression {
                reason: format!(
                    "literal run of {} bytes at offset {} overruns payload ({} bytes left)",
                    count,
                    pos - 1,
                    data.len() - pos
                ),
            })?;
            out.extend_from_slice(literal);
            pos += count;
        } else {
            let count = (control & !REPEAT_FLAG) as usize + 2;
            let value = *data.get(pos).ok_or_else(|| DecodeError::Decompression {
                reason: format!(
                    "repeat run of {} at offset {} has no value byte",
                    count,
                    pos - 1
                ),
            })?;
            out.resize(out.len() + count, value);
            pos += 1;
        }
    }

    Ok(out)
}

/// Run-length encode a payload.
///
/// Runs of three or more identical bytes become repeat runs; everything else
/// is grouped into literal runs. Used to build compressed test traffic and
/// replay captures.
pub fn compress(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() + data.len() / MAX_LITERAL_RUN + 1);
    let mut literal_start = 0;
    let mut pos = 0;

    while pos < data.len() {
        let value = data[pos];
        let run = data[pos..]
            .iter()
            .take(MAX_REPEAT_RUN)
            .take_while(|&&b| b == value)
            .count();

        if run >= MIN_REPEAT_RUN {
            flush_literals(&mut out, &data[literal_start..pos]);
            out.push(REPEAT_FLAG | (run - 2) as u8);
            out.push(value);
            pos += run;
            literal_start = pos;
        } else {
            pos += 1;
        }
    }
    flush_literals(&mut out, &data[literal_start..]);

    out
}

fn flush_literals(out: &mut Vec<u8>, literals: &[u8]) {
    for chunk in literals.chunks(MAX_LITERAL_RUN) {
        out.push((chunk.len() - 1) as u8);
        out.extend_from_slice(chunk);
    }
}

// ============================================================================
// TESTS
// ============================================================================
