//! Raw DEFLATE (RFC 1951) decoder.
//!
//! Decodes one block per [`Inflater::step`] so async callers can yield
//! between blocks. Streams carry no zlib or gzip wrapper.

use thiserror::Error;

const MAX_BITS: usize = 15;
const MAX_LIT_CODES: usize = 286;
const MAX_DIST_CODES: usize = 30;
const FIXED_LIT_CODES: usize = 288;
const END_OF_BLOCK: u16 = 256;
/// Output preallocation is capped at this many bytes per input byte and
/// at `MAX_PREALLOC` overall. Declared sizes come from the archive.
const PREALLOC_RATIO: usize = 8;
const MAX_PREALLOC: usize = 1 << 24;

const LENGTH_BASE: [u16; 29] = [
    3, 4, 5, 6, 7, 8, 9, 10, 11, 13, 15, 17, 19, 23, 27, 31, 35, 43, 51, 59, 67, 83, 99, 115,
    131, 163, 195, 227, 258,
];
const LENGTH_EXTRA: [u8; 29] = [
    0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4, 5, 5, 5, 5, 0,
];
const DIST_BASE: [u16; 30] = [
    1, 2, 3, 4, 5, 7, 9, 13, 17, 25, 33, 49, 65, 97, 129, 193, 257, 385, 513, 769, 1025, 1537,
    2049, 3073, 4097, 6145, 8193, 12289, 16385, 24577,
];
const DIST_EXTRA: [u8; 30] = [
    0, 0, 0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7, 8, 8, 9, 9, 10, 10, 11, 11, 12, 12, 13,
    13,
];
/// Order in which code-length code lengths are transmitted.
const CODE_LENGTH_ORDER: [usize; 19] = [
    16, 17, 18, 0, 8, 7, 9, 6, 10, 5, 11, 4, 12, 3, 13, 2, 14, 1, 15,
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InflateError {
    #[error("deflate stream ended unexpectedly")]
    UnexpectedEof,
    #[error("invalid block type {0}")]
    InvalidBlockType(u32),
    #[error("stored block length {len} does not match its complement {nlen}")]
    StoredLengthMismatch { len: u16, nlen: u16 },
    #[error("over-subscribed huffman code lengths")]
    OversubscribedCode,
    #[error("invalid code length repeat")]
    InvalidRepeat,
    #[error("too many length or distance codes ({lit}/{dist})")]
    TooManyCodes { lit: usize, dist: usize },
    #[error("block has no end-of-block code")]
    MissingEndOfBlock,
    #[error("invalid huffman code")]
    InvalidCode,
    #[error("invalid length or distance symbol {0}")]
    InvalidSymbol(u16),
    #[error("distance {distance} reaches before start of output ({available} bytes)")]
    DistanceTooFar { distance: usize, available: usize },
}

type Result<T> = std::result::Result<T, InflateError>;

/// LSB-first bit reader over a byte slice.
struct BitReader<'a> {
    data: &'a [u8],
    pos: usize,
    bit_buf: u32,
    bit_count: u32,
}

impl<'a> BitReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            bit_buf: 0,
            bit_count: 0,
        }
    }

    /// Read `need` bits (at most 16).
    fn bits(&mut self, need: u32) -> Result<u32> {
        let mut val = self.bit_buf;
        while self.bit_count < need {
            let byte = *self.data.get(self.pos).ok_or(InflateError::UnexpectedEof)?;
            self.pos += 1;
            val |= (byte as u32) << self.bit_count;
            self.bit_count += 8;
        }
        self.bit_buf = val >> need;
        self.bit_count -= need;
        Ok(val & ((1u32 << need) - 1))
    }

    /// Drop any partial byte, returning to a byte boundary.
    fn align(&mut self) {
        self.bit_buf = 0;
        self.bit_count = 0;
    }

    fn byte(&mut self) -> Result<u8> {
        let byte = *self.data.get(self.pos).ok_or(InflateError::UnexpectedEof)?;
        self.pos += 1;
        Ok(byte)
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self.pos.checked_add(len).ok_or(InflateError::UnexpectedEof)?;
        let slice = self
            .data
            .get(self.pos..end)
            .ok_or(InflateError::UnexpectedEof)?;
        self.pos = end;
        Ok(slice)
    }
}

/// Canonical huffman code stored as per-length counts plus symbols sorted
/// by code.
struct Huffman {
    counts: [u16; MAX_BITS + 1],
    symbols: Vec<u16>,
}

impl Huffman {
    fn new(lengths: &[u8]) -> Result<Self> {
        let mut counts = [0u16; MAX_BITS + 1];
        for &len in lengths {
            counts[len as usize] += 1;
        }

        // Incomplete codes are tolerated (single distance code streams use
        // them); over-subscribed ones are not.
        let mut left: i32 = 1;
        for len in 1..=MAX_BITS {
            left <<= 1;
            left -= counts[len] as i32;
            if left < 0 {
                return Err(InflateError::OversubscribedCode);
            }
        }

        let mut offsets = [0u16; MAX_BITS + 2];
        for len in 1..=MAX_BITS {
            offsets[len + 1] = offsets[len] + counts[len];
        }

        let mut symbols = vec![0u16; lengths.len()];
        for (symbol, &len) in lengths.iter().enumerate() {
            if len != 0 {
                symbols[offsets[len as usize] as usize] = symbol as u16;
                offsets[len as usize] += 1;
            }
        }

        Ok(Self { counts, symbols })
    }

    fn fixed() -> Result<(Self, Self)> {
        let mut lengths = [0u8; FIXED_LIT_CODES];
        for (symbol, len) in lengths.iter_mut().enumerate() {
            *len = match symbol {
                0..=143 => 8,
                144..=255 => 9,
                256..=279 => 7,
                _ => 8,
            };
        }
        Ok((Self::new(&lengths)?, Self::new(&[5u8; MAX_DIST_CODES])?))
    }

    fn decode(&self, bits: &mut BitReader<'_>) -> Result<u16> {
        let mut code: i32 = 0;
        let mut first: i32 = 0;
        let mut index: i32 = 0;
        for len in 1..=MAX_BITS {
            code |= bits.bits(1)? as i32;
            let count = self.counts[len] as i32;
            if code - first < count {
                return Ok(self.symbols[(index + code - first) as usize]);
            }
            index += count;
            first += count;
            first <<= 1;
            code <<= 1;
        }
        Err(InflateError::InvalidCode)
    }
}

/// Incremental raw-deflate decoder producing one contiguous output buffer.
pub struct Inflater<'a> {
    bits: BitReader<'a>,
    out: Vec<u8>,
    finished: bool,
    blocks: usize,
}

impl<'a> Inflater<'a> {
    pub fn new(input: &'a [u8], size_hint: usize) -> Self {
        let capacity = size_hint
            .min(input.len().saturating_mul(PREALLOC_RATIO))
            .min(MAX_PREALLOC);
        Self {
            bits: BitReader::new(input),
            out: Vec::with_capacity(capacity),
            finished: false,
            blocks: 0,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn blocks_decoded(&self) -> usize {
        self.blocks
    }

    pub fn output_len(&self) -> usize {
        self.out.len()
    }

    /// Decode the next block. A no-op once the final block is done.
    pub fn step(&mut self) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        let last = self.bits.bits(1)? == 1;
        match self.bits.bits(2)? {
            0 => self.stored()?,
            1 => {
                let (lit, dist) = Huffman::fixed()?;
                self.codes(&lit, &dist)?;
            }
            2 => {
                let (lit, dist) = self.dynamic_tables()?;
                self.codes(&lit, &dist)?;
            }
            other => return Err(InflateError::InvalidBlockType(other)),
        }
        self.blocks += 1;
        self.finished = last;
        Ok(())
    }

    pub fn into_output(self) -> Vec<u8> {
        self.out
    }

    fn stored(&mut self) -> Result<()> {
        self.bits.align();
        let len = u16::from_le_bytes([self.bits.byte()?, self.bits.byte()?]);
        let nlen = u16::from_le_bytes([self.bits.byte()?, self.bits.byte()?]);
        if len != !nlen {
            return Err(InflateError::StoredLengthMismatch { len, nlen });
        }
        let data = self.bits.take(len as usize)?;
        self.out.extend_from_slice(data);
        Ok(())
    }

    fn dynamic_tables(&mut self) -> Result<(Huffman, Huffman)> {
        let nlit = self.bits.bits(5)? as usize + 257;
        let ndist = self.bits.bits(5)? as usize + 1;
        let ncode = self.bits.bits(4)? as usize + 4;
        if nlit > MAX_LIT_CODES || ndist > MAX_DIST_CODES {
            return Err(InflateError::TooManyCodes {
                lit: nlit,
                dist: ndist,
            });
        }

        let mut lengths = [0u8; MAX_LIT_CODES + MAX_DIST_CODES];
        for &slot in CODE_LENGTH_ORDER.iter().take(ncode) {
            lengths[slot] = self.bits.bits(3)? as u8;
        }
        let length_code = Huffman::new(&lengths[..19])?;

        lengths = [0u8; MAX_LIT_CODES + MAX_DIST_CODES];
        let total = nlit + ndist;
        let mut index = 0;
        while index < total {
            let symbol = length_code.decode(&mut self.bits)?;
            if symbol < 16 {
                lengths[index] = symbol as u8;
                index += 1;
                continue;
            }
            let (value, repeat) = match symbol {
                16 => {
                    if index == 0 {
                        return Err(InflateError::InvalidRepeat);
                    }
                    (lengths[index - 1], 3 + self.bits.bits(2)? as usize)
                }
                17 => (0, 3 + self.bits.bits(3)? as usize),
                _ => (0, 11 + self.bits.bits(7)? as usize),
            };
            if index + repeat > total {
                return Err(InflateError::InvalidRepeat);
            }
            lengths[index..index + repeat].fill(value);
            index += repeat;
        }

        if lengths[END_OF_BLOCK as usize] == 0 {
            return Err(InflateError::MissingEndOfBlock);
        }

        let lit = Huffman::new(&lengths[..nlit])?;
        let dist = Huffman::new(&lengths[nlit..total])?;
        Ok((lit, dist))
    }

    fn codes(&mut self, lit: &Huffman, dist: &Huffman) -> Result<()> {
        loop {
            let symbol = lit.decode(&mut self.bits)?;
            if symbol < END_OF_BLOCK {
                self.out.push(symbol as u8);
                continue;
            }
            if symbol == END_OF_BLOCK {
                return Ok(());
            }

            let idx = (symbol - 257) as usize;
            if idx >= LENGTH_BASE.len() {
                return Err(InflateError::InvalidSymbol(symbol));
            }
            let len = LENGTH_BASE[idx] as usize + self.bits.bits(LENGTH_EXTRA[idx] as u32)? as usize;

            let dsym = dist.decode(&mut self.bits)? as usize;
            if dsym >= DIST_BASE.len() {
                return Err(InflateError::InvalidSymbol(dsym as u16));
            }
            let distance =
                DIST_BASE[dsym] as usize + self.bits.bits(DIST_EXTRA[dsym] as u32)? as usize;
            if distance > self.out.len() {
                return Err(InflateError::DistanceTooFar {
                    distance,
                    available: self.out.len(),
                });
            }

            // Byte-wise copy: the source may overlap the bytes being written.
            let start = self.out.len() - distance;
            for i in 0..len {
                let byte = self.out[start + i];
                self.out.push(byte);
            }
        }
    }
}

/// Inflate a complete raw-deflate stream in one go.
pub fn inflate(input: &[u8]) -> Result<Vec<u8>> {
    let mut inflater = Inflater::new(input, input.len().saturating_mul(4));
    while !inflater.is_finished() {
        inflater.step()?;
    }
    Ok(inflater.into_output())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Vectors below come from a reference zlib at level 9 with wbits = -15.

    #[test]
    fn fixed_block_with_back_references() {
        let compressed = [0x2b, 0xc8, 0xcb, 0x51, 0x28, 0x40, 0xc5, 0x00];
        let out = inflate(&compressed).unwrap();
        assert_eq!(out, b"pnl pnl pnl pnl pnl");
    }

    #[test]
    fn classic_hello() {
        let compressed = [0xcb, 0x48, 0xcd, 0xc9, 0xc9, 0x07, 0x00];
        assert_eq!(inflate(&compressed).unwrap(), b"hello");
    }

    #[test]
    fn stored_block() {
        let compressed = [0x01, 0x06, 0x00, 0xf9, 0xff, b's', b't', b'o', b'r', b'e', b'd'];
        assert_eq!(inflate(&compressed).unwrap(), b"stored");
    }

    #[test]
    fn dynamic_block() {
        let compressed = [
            0x7d, 0xd1, 0x51, 0x0a, 0xc3, 0x30, 0x08, 0x06, 0xe0, 0xab, 0x94, 0x5c, 0xa0, 0x8b,
            0xd1, 0x24, 0x85, 0x34, 0xb0, 0x5d, 0xa5, 0x07, 0x18, 0x74, 0xa3, 0xbb, 0xfe, 0xba,
            0x5a, 0xc4, 0x8a, 0xec, 0x2d, 0xfe, 0xe2, 0x87, 0x98, 0xb6, 0x3e, 0x3f, 0xc3, 0x3a,
            0x87, 0x18, 0x7a, 0x5b, 0x7e, 0x8f, 0x7b, 0x0c, 0xc3, 0x7b, 0x0e, 0xaf, 0xbd, 0xde,
            0x7a, 0x6c, 0xe3, 0xd6, 0xdb, 0xb8, 0x9c, 0xbd, 0x47, 0x3c, 0xd2, 0x54, 0x24, 0x1e,
            0xf7, 0xf1, 0xde, 0x4e, 0x03, 0xc4, 0x00, 0x65, 0x80, 0x31, 0xe0, 0x48, 0x0b, 0xfa,
            0x46, 0x12, 0x23, 0x29, 0x23, 0x19, 0x23, 0xf1, 0x76, 0x31, 0xfa, 0x08, 0x0a, 0x82,
            0x0a, 0x41, 0x83, 0x20, 0x23, 0x58, 0x7d, 0x84, 0x04, 0x21, 0x85, 0x90, 0x41, 0x88,
            0x91, 0x4a, 0x3e, 0x92, 0x05, 0xc9, 0x0a, 0xc9, 0x06, 0xc9, 0x7c, 0x28, 0x00, 0x1f,
            0x29, 0x82, 0x14, 0x85, 0xdc, 0x0c, 0x52, 0x18, 0xa1, 0xc9, 0x47, 0xaa, 0x20, 0xf5,
            0xcf, 0x07, 0x57, 0x46, 0xa6, 0x7c, 0x45, 0xbe,
        ];
        let expected: String = (1..9)
            .map(|i| {
                format!(
                    "<row r=\"{i}\"><c r=\"A{i}\" t=\"s\"><v>{}</v></c><c r=\"B{i}\"><v>{}</v></c></row>",
                    i % 7,
                    i * 37 % 500
                )
            })
            .collect();

        let mut inflater = Inflater::new(&compressed, 0);
        inflater.step().unwrap();
        assert!(inflater.is_finished());
        assert_eq!(inflater.blocks_decoded(), 1);
        assert_eq!(inflater.into_output(), expected.as_bytes());
    }

    #[test]
    fn truncated_stream_is_an_error() {
        let compressed = [0x2b, 0xc8, 0xcb, 0x51];
        assert_eq!(inflate(&compressed), Err(InflateError::UnexpectedEof));
    }

    #[test]
    fn reserved_block_type_is_rejected() {
        // BFINAL=1, BTYPE=11
        assert_eq!(inflate(&[0x07]), Err(InflateError::InvalidBlockType(3)));
    }

    #[test]
    fn stored_length_complement_is_checked() {
        let compressed = [0x01, 0x02, 0x00, 0x00, 0x00, b'a', b'b'];
        assert!(matches!(
            inflate(&compressed),
            Err(InflateError::StoredLengthMismatch { len: 2, .. })
        ));
    }

    #[test]
    fn size_hint_is_capped_by_input_length() {
        let compressed = [0xcb, 0x48, 0xcd, 0xc9, 0xc9, 0x07, 0x00];
        let mut inflater = Inflater::new(&compressed, usize::MAX);
        inflater.step().unwrap();
        let out = inflater.into_output();
        assert_eq!(out, b"hello");
        assert!(out.capacity() <= compressed.len() * PREALLOC_RATIO);
    }

    #[test]
    fn step_after_finish_is_noop() {
        let compressed = [0xcb, 0x48, 0xcd, 0xc9, 0xc9, 0x07, 0x00];
        let mut inflater = Inflater::new(&compressed, 8);
        inflater.step().unwrap();
        inflater.step().unwrap();
        assert_eq!(inflater.blocks_decoded(), 1);
        assert_eq!(inflater.output_len(), 5);
    }
}
