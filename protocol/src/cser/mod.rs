pub mod binary;
pub mod bits;
pub mod buffer;

use derive_more::Display;
use num_bigint::BigUint;

use crate::{ProtocolError, ProtocolErrorKind};

use self::bits::{BitReader, BitWriter};
use self::buffer::{ByteReader, ByteWriter};

// The primitive layer of the canonical serialization format. Integers are
// split across the two streams: the byte-length rides in the bit stream and
// the little-endian bytes ride in the byte stream, so small values cost a
// few bits of overhead instead of a full length byte.
//
// Every value has exactly one accepted wire form. Decoders reject the rest.

/// Upper bound for a decoded arbitrary-precision integer, in bytes.
const BIG_UINT_MAX_LEN: usize = 512;

/// Largest value a U56 length can carry.
pub const U56_MAX: u64 = (1 << 56) - 1;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum CserError {
    #[display(fmt = "non canonical encoding: value is not packed minimally")]
    NonCanonicalEncoding,

    #[display(fmt = "malformed encoding: structure invalid or truncated")]
    MalformedEncoding,

    #[display(fmt = "too large allocation: declared size exceeds the limit")]
    TooLargeAlloc,
}

impl std::error::Error for CserError {}

impl From<CserError> for ProtocolError {
    fn from(err: CserError) -> ProtocolError {
        ProtocolError::new(ProtocolErrorKind::Cser, Box::new(err))
    }
}

/// Returns `b` left-padded with zeroes to at least `n` bytes.
pub fn padded_bytes(b: &[u8], n: usize) -> Vec<u8> {
    if b.len() >= n {
        return b.to_vec();
    }
    let mut padded = vec![0u8; n - b.len()];
    padded.extend_from_slice(b);
    padded
}

/// Writes `v` as little-endian bytes, at least `min_size` of them and no more
/// than the value requires. Returns the number of bytes written.
fn write_u64_bit_compact(bytes_w: &mut ByteWriter, mut v: u64, min_size: usize) -> usize {
    let mut size = 0;
    while size < min_size || v != 0 {
        bytes_w.write_byte(v as u8);
        size += 1;
        v >>= 8;
    }
    size
}

/// Reads `size` little-endian bytes back into an integer. A most significant
/// zero byte beyond `min_size` means the value was not packed minimally.
fn read_u64_bit_compact(
    bytes_r: &mut ByteReader<'_>,
    size: usize,
    min_size: usize,
) -> Result<u64, CserError> {
    let buf = bytes_r.read(size)?;
    let mut v = 0u64;
    let mut last = 0u8;
    for (i, b) in buf.iter().enumerate() {
        v |= (*b as u64) << (8 * i);
        last = *b;
    }
    if size > min_size && last == 0 {
        return Err(CserError::NonCanonicalEncoding);
    }
    Ok(v)
}

/// Writer over the two split streams.
pub struct Writer {
    pub bits:  BitWriter,
    pub bytes: ByteWriter,
}

impl Default for Writer {
    fn default() -> Self {
        Self::new()
    }
}

impl Writer {
    pub fn new() -> Self {
        Writer {
            bits:  BitWriter::with_capacity(32),
            bytes: ByteWriter::with_capacity(200),
        }
    }

    fn write_u64_bits(&mut self, min_size: usize, bits_for_size: usize, v: u64) {
        let size = write_u64_bit_compact(&mut self.bytes, v, min_size);
        self.bits.write(bits_for_size, (size - min_size) as u32);
    }

    pub fn write_u8(&mut self, v: u8) {
        self.bytes.write_byte(v);
    }

    pub fn write_u16(&mut self, v: u16) {
        self.write_u64_bits(1, 1, u64::from(v));
    }

    pub fn write_u32(&mut self, v: u32) {
        self.write_u64_bits(1, 2, u64::from(v));
    }

    pub fn write_u64(&mut self, v: u64) {
        self.write_u64_bits(1, 3, v);
    }

    pub fn write_var_uint(&mut self, v: u64) {
        self.write_u64_bits(1, 3, v);
    }

    /// 56-bit length field, zero stored in zero bytes.
    pub fn write_u56(&mut self, v: u64) -> Result<(), CserError> {
        if v > U56_MAX {
            return Err(CserError::MalformedEncoding);
        }
        self.write_u64_bits(0, 3, v);
        Ok(())
    }

    /// Sign bit plus the magnitude as U64. Zero is always written positive.
    pub fn write_i64(&mut self, v: i64) {
        self.write_bool(v < 0);
        self.write_u64(v.unsigned_abs());
    }

    pub fn write_bool(&mut self, v: bool) {
        self.bits.write(1, v as u32);
    }

    pub fn write_fixed_bytes(&mut self, v: &[u8]) {
        self.bytes.write(v);
    }

    pub fn write_slice_bytes(&mut self, v: &[u8]) -> Result<(), CserError> {
        self.write_u56(v.len() as u64)?;
        self.write_fixed_bytes(v);
        Ok(())
    }

    /// Big-endian magnitude behind a U56 length. Sign is never transmitted.
    pub fn write_big_uint(&mut self, v: &BigUint) -> Result<(), CserError> {
        let big_bytes = if v.bits() == 0 {
            Vec::new()
        } else {
            v.to_bytes_be()
        };
        self.write_slice_bytes(&big_bytes)
    }
}

/// Reader over the two split streams.
pub struct Reader<'a> {
    pub bits:  BitReader<'a>,
    pub bytes: ByteReader<'a>,
}

impl<'a> Reader<'a> {
    fn read_u64_bits(&mut self, min_size: usize, bits_for_size: usize) -> Result<u64, CserError> {
        let size = self.bits.read(bits_for_size)? as usize + min_size;
        read_u64_bit_compact(&mut self.bytes, size, min_size)
    }

    pub fn read_u8(&mut self) -> Result<u8, CserError> {
        self.bytes.read_byte()
    }

    pub fn read_u16(&mut self) -> Result<u16, CserError> {
        Ok(self.read_u64_bits(1, 1)? as u16)
    }

    pub fn read_u32(&mut self) -> Result<u32, CserError> {
        Ok(self.read_u64_bits(1, 2)? as u32)
    }

    pub fn read_u64(&mut self) -> Result<u64, CserError> {
        self.read_u64_bits(1, 3)
    }

    pub fn read_var_uint(&mut self) -> Result<u64, CserError> {
        self.read_u64_bits(1, 3)
    }

    pub fn read_u56(&mut self) -> Result<u64, CserError> {
        self.read_u64_bits(0, 3)
    }

    pub fn read_i64(&mut self) -> Result<i64, CserError> {
        let neg = self.read_bool()?;
        let abs = self.read_u64()?;
        if neg {
            // negative zero has no canonical form
            if abs == 0 {
                return Err(CserError::NonCanonicalEncoding);
            }
            if abs > 1 << 63 {
                return Err(CserError::MalformedEncoding);
            }
            Ok((abs as i64).wrapping_neg())
        } else {
            if abs > i64::MAX as u64 {
                return Err(CserError::MalformedEncoding);
            }
            Ok(abs as i64)
        }
    }

    pub fn read_bool(&mut self) -> Result<bool, CserError> {
        Ok(self.bits.read(1)? != 0)
    }

    pub fn read_fixed_bytes(&mut self, buf: &mut [u8]) -> Result<(), CserError> {
        let view = self.bytes.read(buf.len())?;
        buf.copy_from_slice(view);
        Ok(())
    }

    /// Length-prefixed bytes. The bound is checked before anything is
    /// allocated.
    pub fn read_slice_bytes(&mut self, max_len: usize) -> Result<Vec<u8>, CserError> {
        let size = self.read_u56()?;
        if size > max_len as u64 {
            return Err(CserError::TooLargeAlloc);
        }
        let view = self.bytes.read(size as usize)?;
        Ok(view.to_vec())
    }

    pub fn read_big_uint(&mut self) -> Result<BigUint, CserError> {
        let buf = self.read_slice_bytes(BIG_UINT_MAX_LEN)?;
        if buf.first() == Some(&0) {
            return Err(CserError::NonCanonicalEncoding);
        }
        Ok(BigUint::from_bytes_be(&buf))
    }
}
