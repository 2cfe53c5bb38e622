//! Static rANS entropy coder over byte alphabets.
//!
//! 32-bit state, 12-bit frequency precision and byte-wise renormalization.
//! Each blob carries its own frequency table, so glyph and color streams
//! are modelled independently.
//!
//! ```text
//! symbol_count u32   table_len u16   table_len × (symbol u8, freq u16)
//! bitstream_len u32  bitstream
//! ```

use super::bytes::ByteReader;
use crate::error::{EngineError, Result};

/// Frequencies are normalized to sum to `1 << SCALE_BITS`.
pub const SCALE_BITS: u32 = 12;
const SCALE: u32 = 1 << SCALE_BITS;
/// Lower bound of the normalized state interval `[RANS_L, RANS_L << 8)`.
const RANS_L: u32 = 1 << 23;

/// Normalized symbol frequencies with cumulative starts and a slot lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    freq: [u32; 256],
    cum: [u32; 256],
    lookup: Vec<u8>,
}

impl FrequencyTable {
    /// Normalize raw counts to sum exactly `4096`.
    ///
    /// Every symbol with a nonzero count keeps a frequency of at least 1.
    /// Rounding slack is taken from or given to the largest frequencies,
    /// lowest symbol first, so the result depends only on the histogram.
    /// Returns `None` for an all-zero histogram.
    pub fn from_histogram(histogram: &[u64; 256]) -> Option<Self> {
        let total: u64 = histogram.iter().sum();
        if total == 0 {
            return None;
        }

        let mut freq = [0u32; 256];
        for (f, &count) in freq.iter_mut().zip(histogram) {
            if count > 0 {
                *f = ((count * SCALE as u64) / total).max(1) as u32;
            }
        }

        let mut sum: u32 = freq.iter().sum();
        while sum != SCALE {
            // Largest frequency, lowest symbol on ties.
            let mut top = 0;
            for s in 1..256 {
                if freq[s] > freq[top] {
                    top = s;
                }
            }
            if sum < SCALE {
                freq[top] += SCALE - sum;
                sum = SCALE;
            } else {
                // At most 256 symbols share 4096 slots, so the largest
                // frequency is above 1 whenever the sum overshoots.
                freq[top] -= 1;
                sum -= 1;
            }
        }
        Self::from_frequencies(freq)
    }

    fn from_frequencies(freq: [u32; 256]) -> Option<Self> {
        if freq.iter().sum::<u32>() != SCALE {
            return None;
        }
        let mut cum = [0u32; 256];
        let mut lookup = Vec::with_capacity(SCALE as usize);
        let mut start = 0;
        for s in 0..256 {
            cum[s] = start;
            start += freq[s];
            lookup.extend(std::iter::repeat(s as u8).take(freq[s] as usize));
        }
        Some(Self { freq, cum, lookup })
    }

    /// Table of a symbol stream.
    pub fn of(symbols: &[u8]) -> Option<Self> {
        let mut histogram = [0u64; 256];
        for &s in symbols {
            histogram[s as usize] += 1;
        }
        Self::from_histogram(&histogram)
    }

    #[inline]
    pub fn frequency(&self, symbol: u8) -> u32 {
        self.freq[symbol as usize]
    }

    /// Symbols with a nonzero frequency, ascending.
    pub fn symbols(&self) -> impl Iterator<Item = (u8, u32)> + '_ {
        (0..=255u8)
            .map(|s| (s, self.freq[s as usize]))
            .filter(|&(_, f)| f > 0)
    }
}

/// Encodes symbols in reverse and emits a stream the decoder reads forward.
#[derive(Debug)]
pub struct RansEncoder<'t> {
    table: &'t FrequencyTable,
}

impl<'t> RansEncoder<'t> {
    pub fn new(table: &'t FrequencyTable) -> Self {
        Self { table }
    }

    /// Encode `symbols`; every one must have a nonzero frequency.
    pub fn encode(&self, symbols: &[u8]) -> Result<Vec<u8>> {
        let mut state = RANS_L;
        let mut out = Vec::with_capacity(symbols.len() / 2 + 4);
        for &s in symbols.iter().rev() {
            let freq = self.table.freq[s as usize];
            if freq == 0 {
                return Err(EngineError::invalid(format!(
                    "symbol {s} has no frequency in the table"
                )));
            }
            let x_max = ((RANS_L >> SCALE_BITS) << 8) * freq;
            while state >= x_max {
                out.push(state as u8);
                state >>= 8;
            }
            state = ((state / freq) << SCALE_BITS) + state % freq + self.table.cum[s as usize];
        }
        out.extend_from_slice(&state.to_le_bytes());
        out.reverse();
        Ok(out)
    }
}

/// Forward decoder over a bitstream produced by [`RansEncoder`].
#[derive(Debug)]
pub struct RansDecoder<'a, 't> {
    table: &'t FrequencyTable,
    input: &'a [u8],
    pos: usize,
    state: u32,
}

impl<'a, 't> RansDecoder<'a, 't> {
    /// # Errors
    ///
    /// - [`EngineError::Truncated`] if the stream is shorter than the state.
    /// - [`EngineError::InvalidInput`] if the initial state is out of range.
    pub fn new(table: &'t FrequencyTable, input: &'a [u8]) -> Result<Self> {
        let head: [u8; 4] = input
            .get(..4)
            .and_then(|b| b.try_into().ok())
            .ok_or(EngineError::Truncated {
                needed: 4,
                available: input.len(),
            })?;
        let state = u32::from_be_bytes(head);
        if !(RANS_L..RANS_L << 8).contains(&state) {
            return Err(EngineError::invalid("rANS state out of range"));
        }
        Ok(Self {
            table,
            input,
            pos: 4,
            state,
        })
    }

    pub fn decode_symbol(&mut self) -> Result<u8> {
        let slot = self.state & (SCALE - 1);
        let s = self.table.lookup[slot as usize];
        let freq = self.table.freq[s as usize];
        let cum = self.table.cum[s as usize];
        self.state = freq * (self.state >> SCALE_BITS) + slot - cum;
        while self.state < RANS_L {
            let byte = *self.input.get(self.pos).ok_or(EngineError::Truncated {
                needed: self.pos + 1,
                available: self.input.len(),
            })?;
            self.state = (self.state << 8) | byte as u32;
            self.pos += 1;
        }
        Ok(s)
    }

    /// Check that the whole stream was consumed and the state returned to
    /// its starting value.
    pub fn finish(self) -> Result<()> {
        if self.pos != self.input.len() || self.state != RANS_L {
            return Err(EngineError::invalid("rANS bitstream does not end cleanly"));
        }
        Ok(())
    }
}

/// Encode a symbol stream as a self-describing blob.
pub fn encode_blob(symbols: &[u8]) -> Result<Vec<u8>> {
    let count = u32::try_from(symbols.len())
        .map_err(|_| EngineError::invalid("stream too long for the rANS blob"))?;
    let mut out = Vec::new();
    out.extend_from_slice(&count.to_le_bytes());

    let Some(table) = FrequencyTable::of(symbols) else {
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        return Ok(out);
    };

    let entries: Vec<(u8, u32)> = table.symbols().collect();
    out.extend_from_slice(&(entries.len() as u16).to_le_bytes());
    for (symbol, freq) in entries {
        out.push(symbol);
        out.extend_from_slice(&(freq as u16).to_le_bytes());
    }

    let bits = RansEncoder::new(&table).encode(symbols)?;
    out.extend_from_slice(&(bits.len() as u32).to_le_bytes());
    out.extend_from_slice(&bits);
    Ok(out)
}

/// Decode one blob from the reader, leaving it positioned after the blob.
/// When `expected` is given, a blob declaring any other symbol count is
/// rejected before decoding starts.
pub(crate) fn read_blob(reader: &mut ByteReader<'_>, expected: Option<usize>) -> Result<Vec<u8>> {
    let count = reader.u32()? as usize;
    if let Some(expected) = expected.filter(|&e| e != count) {
        return Err(EngineError::invalid(format!(
            "rANS blob holds {count} symbols, expected {expected}"
        )));
    }
    let table_len = reader.u16()? as usize;
    if table_len > 256 {
        return Err(EngineError::invalid(format!(
            "rANS table lists {table_len} symbols"
        )));
    }

    let mut freq = [0u32; 256];
    let mut previous: Option<u8> = None;
    for _ in 0..table_len {
        let symbol = reader.u8()?;
        let f = reader.u16()? as u32;
        if f == 0 || previous.is_some_and(|p| symbol <= p) {
            return Err(EngineError::invalid("malformed rANS frequency table"));
        }
        freq[symbol as usize] = f;
        previous = Some(symbol);
    }

    let bits_len = reader.u32()? as usize;
    let bits = reader.take(bits_len)?;

    if count == 0 {
        if table_len != 0 || bits_len != 0 {
            return Err(EngineError::invalid("empty rANS blob carries data"));
        }
        return Ok(Vec::new());
    }

    let table = FrequencyTable::from_frequencies(freq)
        .ok_or_else(|| EngineError::invalid("rANS frequencies do not sum to 4096"))?;
    let mut decoder = RansDecoder::new(&table, bits)?;
    // The count is untrusted; grow past the first megabyte on demand.
    let mut out = Vec::with_capacity(count.min(1 << 20));
    for _ in 0..count {
        out.push(decoder.decode_symbol()?);
    }
    decoder.finish()?;
    Ok(out)
}

/// Decode a blob that spans exactly `data`.
pub fn decode_blob(data: &[u8]) -> Result<Vec<u8>> {
    let mut reader = ByteReader::new(data);
    let out = read_blob(&mut reader, None)?;
    if reader.remaining() != 0 {
        return Err(EngineError::invalid(format!(
            "{} trailing bytes after rANS blob",
            reader.remaining()
        )));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn round_trip(symbols: &[u8]) {
        let blob = encode_blob(symbols).unwrap();
        assert_eq!(decode_blob(&blob).unwrap(), symbols);
    }

    #[test]
    fn test_round_trips() {
        round_trip(&[]);
        round_trip(&[7]);
        round_trip(&[42; 1000]);
        round_trip(b"abracadabra, abracadabra");
        let all: Vec<u8> = (0..=255u8).cycle().take(5000).collect();
        round_trip(&all);
        let skewed: Vec<u8> = (0..10_000u32)
            .map(|i| if i % 97 == 0 { (i % 251) as u8 } else { 0 })
            .collect();
        round_trip(&skewed);
    }

    #[test]
    fn test_empty_blob_layout() {
        assert_eq!(encode_blob(&[]).unwrap(), vec![0; 10]);
    }

    #[test]
    fn test_normalization_sums_to_scale() {
        let mut histogram = [0u64; 256];
        histogram[0] = 1_000_000;
        for h in histogram.iter_mut().skip(1) {
            *h = 1;
        }
        let table = FrequencyTable::from_histogram(&histogram).unwrap();
        let total: u32 = table.symbols().map(|(_, f)| f).sum();
        assert_eq!(total, SCALE);
        assert!(table.symbols().all(|(_, f)| f >= 1));
        assert_eq!(table.symbols().count(), 256);
        assert_eq!(FrequencyTable::from_histogram(&[0; 256]), None);
    }

    #[test]
    fn test_single_symbol_takes_whole_scale() {
        let table = FrequencyTable::of(&[9, 9, 9]).unwrap();
        assert_eq!(table.frequency(9), SCALE);
        assert_eq!(table.frequency(8), 0);
    }

    #[test]
    fn test_skewed_stream_compresses() {
        let symbols: Vec<u8> = (0..4096).map(|i| if i % 16 == 0 { 1 } else { 0 }).collect();
        let blob = encode_blob(&symbols).unwrap();
        assert!(blob.len() < symbols.len() / 4, "blob is {} bytes", blob.len());
    }

    #[test]
    fn test_truncated_bitstream() {
        let blob = encode_blob(b"hello hello hello").unwrap();
        let err = decode_blob(&blob[..blob.len() - 2]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Truncated);
    }

    #[test]
    fn test_bad_table_rejected() {
        // Two symbols, frequencies summing to 4095.
        let mut blob = vec![2, 0, 0, 0, 2, 0];
        blob.extend_from_slice(&[1, 0xFF, 0x0F, 2, 0x00, 0x00]);
        blob.extend_from_slice(&[0, 0, 0, 0]);
        assert_eq!(decode_blob(&blob).unwrap_err().kind(), ErrorKind::InvalidInput);

        let mut blob = vec![1, 0, 0, 0, 1, 0];
        blob.extend_from_slice(&[1, 0xFF, 0x0F]);
        blob.extend_from_slice(&[0, 0, 0, 0]);
        assert_eq!(decode_blob(&blob).unwrap_err().kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let mut blob = encode_blob(b"xyz").unwrap();
        blob.push(0);
        assert_eq!(decode_blob(&blob).unwrap_err().kind(), ErrorKind::InvalidInput);
    }
}
