use bytes::Bytes;

use crate::cser::bits::BitReader;
use crate::cser::buffer::ByteReader;
use crate::cser::{CserError, Reader, Writer};

// Frame packing for the split-stream format. A marshalled value is laid out
// as
//
//   [ byte region ] [ bit region ] [ reversed varint(len(bit region)) ]
//
// so a blob is self-delimited without outer framing: the decoder scans the
// suffix varint backwards from the end of the buffer.

/// A 64-bit varint never takes more than this many bytes.
const MAX_SIZE_SUFFIX: usize = 9;

/// Varint with 7 data bits per byte. The high bit marks the LAST byte, not a
/// continuation; this inversion is part of the wire format and must not be
/// normalized.
fn write_u64_compact(out: &mut Vec<u8>, mut v: u64) {
    loop {
        let mut chunk = (v & 0x7f) as u8;
        v >>= 7;
        if v == 0 {
            chunk |= 0x80;
        }
        out.push(chunk);
        if v == 0 {
            return;
        }
    }
}

fn read_u64_compact(bytes_r: &mut ByteReader<'_>) -> Result<u64, CserError> {
    let mut v = 0u64;
    let mut i = 0u32;
    loop {
        if i > 9 {
            return Err(CserError::MalformedEncoding);
        }
        let chunk = u64::from(bytes_r.read_byte()?);
        let stop = chunk & 0x80 != 0;
        let word = chunk & 0x7f;
        v |= word << (7 * i);

        // a terminator that carries no data is a longer-than-needed varint
        if i > 0 && stop && word == 0 {
            return Err(CserError::NonCanonicalEncoding);
        }
        if stop {
            return Ok(v);
        }
        i += 1;
    }
}

/// Runs `f` against a fresh writer and packs both streams into one blob.
pub fn marshal<E, F>(f: F) -> Result<Bytes, E>
where
    F: FnOnce(&mut Writer) -> Result<(), E>,
{
    let mut w = Writer::new();
    f(&mut w)?;
    Ok(pack(w))
}

fn pack(w: Writer) -> Bytes {
    let bits = w.bits.into_bytes();
    let mut out = w.bytes.into_vec();
    out.extend_from_slice(&bits);

    let mut size = Vec::with_capacity(4);
    write_u64_compact(&mut size, bits.len() as u64);
    size.reverse();
    out.extend_from_slice(&size);
    Bytes::from(out)
}

fn split(raw: &[u8]) -> Result<(&[u8], &[u8]), CserError> {
    let tail_start = raw.len().saturating_sub(MAX_SIZE_SUFFIX);
    let mut suffix = raw[tail_start..].to_vec();
    suffix.reverse();

    let mut size_reader = ByteReader::new(&suffix);
    let bits_size = read_u64_compact(&mut size_reader)?;
    let body_len = raw.len() - size_reader.position();

    if (body_len as u64) < bits_size {
        return Err(CserError::MalformedEncoding);
    }
    let split_at = body_len - bits_size as usize;
    Ok((&raw[split_at..body_len], &raw[..split_at]))
}

/// Splits `raw` into its two regions, runs `f`, then enforces the trailing
/// consumption rules: at most one unread bit byte, a zero bit tail, and an
/// exhausted byte region.
pub fn unmarshal<T, E, F>(raw: &[u8], f: F) -> Result<T, E>
where
    E: From<CserError>,
    F: FnOnce(&mut Reader<'_>) -> Result<T, E>,
{
    let (bbits, bbytes) = split(raw).map_err(E::from)?;
    let mut reader = Reader {
        bits:  BitReader::new(bbits),
        bytes: ByteReader::new(bbytes),
    };

    let res = f(&mut reader)?;

    if reader.bits.non_read_bytes() > 1 {
        return Err(CserError::NonCanonicalEncoding.into());
    }
    let tail = reader.bits.read(reader.bits.non_read_bits()).map_err(E::from)?;
    if tail != 0 {
        return Err(CserError::NonCanonicalEncoding.into());
    }
    if !reader.bytes.is_empty() {
        return Err(CserError::NonCanonicalEncoding.into());
    }
    Ok(res)
}
