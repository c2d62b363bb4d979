//! Chunk envelope walker.
//!
//! Validates and lists the framing of a produced SCN file: root header,
//! chunk envelopes, and their length fields. Payloads are exposed as raw
//! bytes with a small primitive cursor; scene semantics are not decoded.

use std::io::Cursor;
use std::ops::Range;

use byteorder::{LittleEndian, ReadBytesExt};

use super::format::*;
use crate::util::{Error, Result};

/// Decoded envelope of one chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    /// Byte offset of the `LIST` marker.
    pub offset: usize,
    pub tag: Tag,
    pub list_len: u32,
    pub version: u32,
    pub id: u32,
    pub data_len: u32,
}

impl ChunkHeader {
    /// Byte range of the payload.
    pub fn payload_range(&self) -> Range<usize> {
        let start = self.offset + ENVELOPE_SIZE as usize;
        start..start + self.data_len as usize
    }

    /// Offset one past the last byte of this chunk.
    pub fn end(&self) -> usize {
        self.offset + 8 + self.list_len as usize
    }

    /// Tag as a string.
    pub fn tag_str(&self) -> String {
        tag_str(&self.tag)
    }
}

/// Read-only view over a complete SCN file.
pub struct ChunkReader<'a> {
    data: &'a [u8],
}

impl<'a> ChunkReader<'a> {
    /// Validate the root header and its length field.
    pub fn new(data: &'a [u8]) -> Result<Self> {
        if data.len() < ROOT_HEADER_SIZE as usize {
            return Err(Error::invalid("file shorter than root header"));
        }
        if &data[0..4] != RIFF_MAGIC || &data[8..12] != SCENE_FORM {
            return Err(Error::invalid("missing RIFF/SCNE signature"));
        }
        let root_len = u32::from_le_bytes([data[4], data[5], data[6], data[7]]) as usize;
        if root_len + 8 != data.len() {
            return Err(Error::invalid(format!(
                "root length {} does not match file size {}",
                root_len,
                data.len()
            )));
        }
        Ok(Self { data })
    }

    /// Root length field (file size minus 8).
    pub fn root_len(&self) -> u32 {
        (self.data.len() - 8) as u32
    }

    /// Decode and validate the envelope starting at `offset`.
    pub fn header_at(&self, offset: usize) -> Result<ChunkHeader> {
        let end = offset + ENVELOPE_SIZE as usize;
        if end > self.data.len() {
            return Err(Error::invalid(format!("truncated chunk envelope at {offset}")));
        }
        let bytes = &self.data[offset..end];
        if &bytes[0..4] != LIST_MAGIC {
            return Err(Error::invalid(format!("expected LIST at {offset}")));
        }
        if &bytes[12..16] != INFO_MAGIC || &bytes[28..32] != DATA_MAGIC {
            return Err(Error::invalid(format!("malformed envelope at {offset}")));
        }

        let mut cur = Cursor::new(bytes);
        cur.set_position(4);
        let list_len = cur.read_u32::<LittleEndian>()?;
        let mut tag = [0u8; 4];
        tag.copy_from_slice(&bytes[8..12]);
        cur.set_position(16);
        let info_len = cur.read_u32::<LittleEndian>()?;
        let version = cur.read_u32::<LittleEndian>()?;
        let id = cur.read_u32::<LittleEndian>()?;
        cur.set_position(32);
        let data_len = cur.read_u32::<LittleEndian>()?;

        if info_len != INFO_LENGTH {
            return Err(Error::invalid(format!("INFO length {info_len} at {offset}")));
        }
        if list_len < ENVELOPE_OVERHEAD || data_len != list_len - ENVELOPE_OVERHEAD {
            return Err(Error::invalid(format!(
                "length mismatch at {offset}: list {list_len}, data {data_len}"
            )));
        }
        let header = ChunkHeader { offset, tag, list_len, version, id, data_len };
        if header.end() > self.data.len() {
            return Err(Error::invalid(format!("chunk at {offset} overruns file")));
        }
        Ok(header)
    }

    /// Top-level chunks in file order.
    pub fn chunks(&self) -> Result<Vec<ChunkHeader>> {
        self.chunks_in(ROOT_HEADER_SIZE as usize..self.data.len())
    }

    /// Chunks nested in `parent`'s payload, starting `skip` bytes in.
    pub fn children(&self, parent: &ChunkHeader, skip: usize) -> Result<Vec<ChunkHeader>> {
        let range = parent.payload_range();
        self.chunks_in(range.start + skip..range.end)
    }

    fn chunks_in(&self, range: Range<usize>) -> Result<Vec<ChunkHeader>> {
        let mut out = Vec::new();
        let mut pos = range.start;
        while pos < range.end {
            let header = self.header_at(pos)?;
            if header.end() > range.end {
                return Err(Error::invalid(format!("chunk at {pos} overruns its parent")));
            }
            pos = header.end();
            out.push(header);
        }
        Ok(out)
    }

    /// Payload bytes of a chunk.
    pub fn payload(&self, header: &ChunkHeader) -> &'a [u8] {
        &self.data[header.payload_range()]
    }

    /// Primitive cursor over a chunk's payload.
    pub fn payload_reader(&self, header: &ChunkHeader) -> PayloadReader<'a> {
        PayloadReader::new(self.payload(header))
    }
}

/// Little-endian primitive reader over a payload slice.
pub struct PayloadReader<'a> {
    cur: Cursor<&'a [u8]>,
}

impl<'a> PayloadReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { cur: Cursor::new(data) }
    }

    /// Current offset within the payload.
    pub fn pos(&self) -> usize {
        self.cur.position() as usize
    }

    pub fn skip(&mut self, n: usize) {
        let p = self.cur.position();
        self.cur.set_position(p + n as u64);
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.cur.read_u8()?)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(self.cur.read_u16::<LittleEndian>()?)
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(self.cur.read_i16::<LittleEndian>()?)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(self.cur.read_u32::<LittleEndian>()?)
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(self.cur.read_i32::<LittleEndian>()?)
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(self.cur.read_f32::<LittleEndian>()?)
    }

    pub fn read_tag(&mut self) -> Result<Tag> {
        let mut tag = [0u8; 4];
        std::io::Read::read_exact(&mut self.cur, &mut tag)?;
        Ok(tag)
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        let start = self.pos();
        let data = *self.cur.get_ref();
        if start + n > data.len() {
            return Err(Error::invalid("payload truncated"));
        }
        self.skip(n);
        Ok(&data[start..start + n])
    }

    /// Read a length-prefixed string, consuming its parity pad byte.
    pub fn read_string(&mut self) -> Result<String> {
        let len = self.read_u8()? as usize;
        let bytes = self.read_bytes(len)?;
        if len % 2 == 0 {
            self.skip(1);
        }
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}
