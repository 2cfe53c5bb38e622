//! Per-frame payload coding.

use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use super::ans::{encode_blob, read_blob};
use super::bytes::ByteReader;
use super::CodecVariant;
use crate::error::{EngineError, Result};

/// Glyph and color streams of one frame.
pub(crate) type Streams = (Vec<u8>, Vec<u8>);

/// Byte-wise XOR of `current` against `previous`; applying it twice
/// restores the input.
pub(crate) fn xor_delta(current: &[u8], previous: &[u8]) -> Vec<u8> {
    current.iter().zip(previous).map(|(a, b)| a ^ b).collect()
}

fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| EngineError::invalid(format!("deflate failed: {e}")))?;
    encoder
        .finish()
        .map_err(|e| EngineError::invalid(format!("deflate failed: {e}")))
}

/// Inflate exactly `expected` bytes; a stream that yields more or fewer is
/// rejected. `expected` comes from the container header, so the buffer only
/// grows as bytes actually arrive.
fn inflate(data: &[u8], expected: usize) -> Result<Vec<u8>> {
    let mut output = Vec::with_capacity(expected.min(1 << 20));
    ZlibDecoder::new(data)
        .take(expected as u64 + 1)
        .read_to_end(&mut output)
        .map_err(|e| EngineError::invalid(format!("corrupt deflate payload: {e}")))?;
    if output.len() != expected {
        return Err(EngineError::invalid(format!(
            "deflate payload inflates to {} bytes, expected {expected}",
            output.len()
        )));
    }
    Ok(output)
}

/// Build the payload of one frame from its (possibly delta) streams.
pub(crate) fn encode_payload(
    variant: CodecVariant,
    glyphs: &[u8],
    colors: &[u8],
) -> Result<Vec<u8>> {
    match variant {
        CodecVariant::Raw | CodecVariant::Deflate => {
            let mut joined = Vec::with_capacity(glyphs.len() + colors.len());
            joined.extend_from_slice(glyphs);
            joined.extend_from_slice(colors);
            if variant == CodecVariant::Raw {
                Ok(joined)
            } else {
                deflate(&joined)
            }
        }
        CodecVariant::Ans => {
            let mut out = encode_blob(glyphs)?;
            out.extend_from_slice(&encode_blob(colors)?);
            Ok(out)
        }
    }
}

/// Split a payload back into streams for a frame of `cells` cells.
pub(crate) fn decode_payload(
    variant: CodecVariant,
    payload: &[u8],
    cells: usize,
) -> Result<Streams> {
    let joined = match variant {
        CodecVariant::Raw => {
            if payload.len() != 3 * cells {
                return Err(EngineError::invalid(format!(
                    "raw frame holds {} bytes, expected {}",
                    payload.len(),
                    3 * cells
                )));
            }
            payload.to_vec()
        }
        CodecVariant::Deflate => inflate(payload, 3 * cells)?,
        CodecVariant::Ans => {
            let mut reader = ByteReader::new(payload);
            let glyphs = read_blob(&mut reader, Some(cells))?;
            let colors = read_blob(&mut reader, Some(2 * cells))?;
            if reader.remaining() != 0 {
                return Err(EngineError::invalid(format!(
                    "{} trailing bytes in entropy-coded frame",
                    reader.remaining()
                )));
            }
            return Ok((glyphs, colors));
        }
    };
    let mut glyphs = joined;
    let colors = glyphs.split_off(cells);
    Ok((glyphs, colors))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_xor_delta_is_involution() {
        let a = [128, 140, 159, 3];
        let b = [128, 141, 130, 3];
        let d = xor_delta(&a, &b);
        assert_eq!(d, vec![0, 1, 29, 0]);
        assert_eq!(xor_delta(&d, &b), a.to_vec());
    }

    #[test]
    fn test_payload_round_trip_every_variant() {
        let glyphs: Vec<u8> = (0..40).map(|i| 128 + (i % 32) as u8).collect();
        let colors: Vec<u8> = (0..80).map(|i| (i % 5) as u8).collect();
        for variant in CodecVariant::ALL {
            let payload = encode_payload(variant, &glyphs, &colors).unwrap();
            let (g, c) = decode_payload(variant, &payload, 40).unwrap();
            assert_eq!(g, glyphs, "{variant}");
            assert_eq!(c, colors, "{variant}");
        }
    }

    #[test]
    fn test_deflate_length_mismatch() {
        let payload = encode_payload(CodecVariant::Deflate, &[128; 4], &[0; 8]).unwrap();
        let err = decode_payload(CodecVariant::Deflate, &payload, 5).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        let err = decode_payload(CodecVariant::Deflate, &payload, 3).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_huge_declared_frame_is_rejected() {
        let payload = encode_payload(CodecVariant::Deflate, &[128; 2], &[0; 4]).unwrap();
        let cells = 0xFFFF * 0xFFFF;
        let err = decode_payload(CodecVariant::Deflate, &payload, cells).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_garbage_deflate_rejected() {
        let err = decode_payload(CodecVariant::Deflate, &[1, 2, 3, 4, 5], 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_ans_count_mismatch() {
        let payload = encode_payload(CodecVariant::Ans, &[128; 4], &[0; 8]).unwrap();
        let err = decode_payload(CodecVariant::Ans, &payload, 3).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
}
