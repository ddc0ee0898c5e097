//! FastLZ (level 1) compression, as decompressed on chain by Solady's `LibZip.flzDecompress`
//!
//! Smart sessions expects the ENABLE mode payload compressed this way.

use crate::ModuleError;

const HASH_MASK: u32 = (1 << 13) - 1;
/// Matches reach at most this far back
const MAX_DISTANCE: usize = 8192;
/// Longest copy a single match instruction encodes
const MAX_COPY: usize = 262;
/// Literal runs are split in chunks of this size
const MAX_LITERALS: usize = 32;

fn u24(data: &[u8], i: usize) -> u32 {
    u32::from(data[i]) | (u32::from(data[i + 1]) << 8) | (u32::from(data[i + 2]) << 16)
}

fn hash(sequence: u32) -> usize {
    ((2_654_435_769u32.wrapping_mul(sequence) >> 19) & HASH_MASK) as usize
}

fn push_literals(out: &mut Vec<u8>, literals: &[u8]) {
    for chunk in literals.chunks(MAX_LITERALS) {
        out.push((chunk.len() - 1) as u8);
        out.extend_from_slice(chunk);
    }
}

/// Copy of `len + 2` bytes from `distance` bytes back
fn push_match(out: &mut Vec<u8>, distance: usize, len: usize) {
    let d = distance - 1;
    let (high, low) = ((d >> 8) as u8, (d & 0xff) as u8);
    let mut rest = len;
    while rest > MAX_COPY {
        out.extend_from_slice(&[0xe0 + high, 0xfd, low]);
        rest -= MAX_COPY;
    }
    if rest < 7 {
        out.extend_from_slice(&[((rest as u8) << 5) + high, low]);
    } else {
        out.extend_from_slice(&[0xe0 + high, (rest - 7) as u8, low]);
    }
}

/// Compresses `data`; the last bytes of the input always stay literal
pub fn flz_compress(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    let mut table = vec![0usize; HASH_MASK as usize + 1];
    let end = data.len().saturating_sub(13);
    let (mut anchor, mut i) = (0, 2);

    while i < end {
        let sequence = u24(data, i);
        let slot = hash(sequence);
        let reference = table[slot];
        table[slot] = i;
        let distance = i - reference;
        if distance >= MAX_DISTANCE || u24(data, reference) != sequence {
            i += 1;
            continue;
        }
        if i + 1 >= end {
            break;
        }

        let limit = data.len() - 7 - i;
        let extra = (0..limit).take_while(|&k| data[reference + 3 + k] == data[i + 3 + k]).count();
        let len = (extra + 1).min(limit);

        if i > anchor {
            push_literals(&mut out, &data[anchor..i]);
        }
        push_match(&mut out, distance, len);

        i += len;
        table[hash(u24(data, i))] = i;
        i += 1;
        table[hash(u24(data, i))] = i;
        i += 1;
        anchor = i;
    }

    push_literals(&mut out, &data[anchor..]);
    out
}

/// Inverse of [flz_compress], for any level 1 FastLZ stream
pub fn flz_decompress(data: &[u8]) -> Result<Vec<u8>, ModuleError> {
    let mut out = Vec::with_capacity(data.len() * 2);
    let mut i = 0;

    while i < data.len() {
        let control = data[i];
        let kind = control >> 5;
        if kind == 0 {
            let len = usize::from(control) + 1;
            let literals =
                data.get(i + 1..i + 1 + len).ok_or(ModuleError::MalformedCompression(i))?;
            out.extend_from_slice(literals);
            i += 1 + len;
            continue;
        }

        let (len, low, step) = if kind == 7 {
            let extra = data.get(i + 1).ok_or(ModuleError::MalformedCompression(i))?;
            let low = data.get(i + 2).ok_or(ModuleError::MalformedCompression(i))?;
            (9 + usize::from(*extra), *low, 3)
        } else {
            let low = data.get(i + 1).ok_or(ModuleError::MalformedCompression(i))?;
            (2 + usize::from(kind), *low, 2)
        };
        let distance = ((usize::from(control & 0x1f) << 8) | usize::from(low)) + 1;
        let start = out.len().checked_sub(distance).ok_or(ModuleError::MalformedCompression(i))?;
        for k in 0..len {
            let byte = out[start + k];
            out.push(byte);
        }
        i += step;
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::utils::hex;
    use pretty_assertions::assert_eq;

    fn hex_bytes(value: &str) -> Vec<u8> {
        hex::decode(value).unwrap()
    }

    #[test]
    fn zeros_vector() {
        let compressed = flz_compress(&[0u8; 100]);
        assert_eq!(compressed, hex_bytes("010000e05401040000000000"));
        assert_eq!(flz_decompress(&compressed).unwrap(), vec![0u8; 100]);
    }

    #[test]
    fn abi_words() {
        // two words with a shared zero prefix, then a zero word
        let mut data = vec![0u8; 31];
        data.push(0x20);
        data.extend_from_slice(&[0u8; 31]);
        data.push(0x01);
        data.extend_from_slice(&[0u8; 32]);
        let compressed = flz_compress(&data);
        assert_eq!(compressed, hex_bytes("010000e014010020e0141d020000012003e00f00040000000000"));
        assert_eq!(flz_decompress(&compressed).unwrap(), data);
    }

    #[test]
    fn short_input_is_literal() {
        let data: Vec<u8> = (0..10).collect();
        let compressed = flz_compress(&data);
        assert_eq!(compressed[0], 9);
        assert_eq!(&compressed[1..], &data[..]);
        assert!(flz_compress(&[]).is_empty());
    }

    #[test]
    fn long_runs_and_far_matches() {
        let mut data: Vec<u8> =
            (0..9000u32).map(|i| (i.wrapping_mul(2_654_435_761) >> 24) as u8).collect();
        data.extend_from_slice(&[0xab; 1000]);
        data.extend_from_within(100..400);
        assert_eq!(flz_decompress(&flz_compress(&data)).unwrap(), data);
    }

    #[test]
    fn truncated_stream() {
        assert_eq!(flz_decompress(&[0x05, 0x01]), Err(ModuleError::MalformedCompression(0)));
        // a match before any output
        assert_eq!(flz_decompress(&[0x20, 0x00]), Err(ModuleError::MalformedCompression(0)));
    }
}
