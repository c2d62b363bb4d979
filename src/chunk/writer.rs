//! Chunk framer and identifier allocator.
//!
//! Every chunk is a `LIST` envelope:
//!
//! ```text
//! LIST <list_len> <tag> INFO 8 <version> <id> DATA <data_len> <payload...>
//! ```
//!
//! Both length fields are written as placeholders and patched when the chunk
//! is closed. `list_len` counts everything after the `LIST` header and
//! `data_len` is `list_len - 28`.

use std::io::{Seek, Write};

use super::format::*;
use super::stream::OStream;
use crate::util::{Error, Result};

/// Run-scoped identifier counter.
///
/// Identifiers are dense and strictly increasing: the first issued value is
/// 0 and every chunk consumes exactly one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    /// Fresh counter whose first issued identifier is 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next identifier.
    #[inline]
    pub fn next_id(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Number of identifiers issued so far.
    #[inline]
    pub fn issued(&self) -> u32 {
        self.next
    }
}

/// Open chunk returned by [`ChunkWriter::begin`].
///
/// Must be passed back to [`ChunkWriter::end`] in LIFO order.
#[must_use = "an open chunk must be closed with ChunkWriter::end"]
#[derive(Debug)]
pub struct ChunkHandle {
    start: u64,
    id: u32,
}

impl ChunkHandle {
    /// Byte offset of the envelope start.
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Identifier assigned to this chunk.
    pub fn id(&self) -> u32 {
        self.id
    }
}

/// Writes the root container and framed chunks.
pub struct ChunkWriter<W: Write + Seek> {
    stream: OStream<W>,
    ids: IdAllocator,
}

impl<W: Write + Seek> ChunkWriter<W> {
    /// Write the root header (`RIFF` + length placeholder + `SCNE`).
    pub fn new(mut stream: OStream<W>) -> Result<Self> {
        stream.write_tag(RIFF_MAGIC)?;
        stream.write_u32(0)?;
        stream.write_tag(SCENE_FORM)?;
        Ok(Self { stream, ids: IdAllocator::new() })
    }

    /// Identifier state of this run.
    #[inline]
    pub fn ids(&self) -> &IdAllocator {
        &self.ids
    }

    /// Get access to the underlying stream for payload writes.
    #[inline]
    pub fn stream(&mut self) -> &mut OStream<W> {
        &mut self.stream
    }

    /// Open a chunk: write the envelope and mint its identifier.
    pub fn begin(&mut self, tag: &Tag, version: u32) -> Result<ChunkHandle> {
        if !tag.is_ascii() {
            return Err(Error::InvalidTag(tag_str(tag)));
        }
        let start = self.stream.pos();
        let id = self.ids.next_id();

        self.stream.write_tag(LIST_MAGIC)?;
        self.stream.write_u32(0)?;
        self.stream.write_tag(tag)?;

        self.stream.write_tag(INFO_MAGIC)?;
        self.stream.write_u32(INFO_LENGTH)?;
        self.stream.write_u32(version)?;
        self.stream.write_u32(id)?;

        self.stream.write_tag(DATA_MAGIC)?;
        self.stream.write_u32(0)?;

        Ok(ChunkHandle { start, id })
    }

    /// Close a chunk by patching both of its length fields.
    pub fn end(&mut self, handle: ChunkHandle) -> Result<u32> {
        let total = self.stream.pos() - handle.start;
        let list_len = u32::try_from(total - 8)
            .map_err(|_| Error::other("chunk exceeds 4 GiB"))?;
        let data_len = list_len - ENVELOPE_OVERHEAD;

        self.stream.patch_u32(handle.start + LIST_LENGTH_OFFSET, list_len)?;
        self.stream.patch_u32(handle.start + DATA_LENGTH_OFFSET, data_len)?;
        Ok(handle.id)
    }

    /// Write one complete chunk whose payload is produced by `body`.
    pub fn chunk<F>(&mut self, tag: &Tag, version: u32, body: F) -> Result<u32>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let handle = self.begin(tag, version)?;
        body(self)?;
        self.end(handle)
    }

    /// Patch the root length and hand back the stream.
    pub fn finish(mut self) -> Result<OStream<W>> {
        let end = self.stream.pos();
        let root_len = u32::try_from(end - 8)
            .map_err(|_| Error::other("file exceeds 4 GiB"))?;
        self.stream.patch_u32(ROOT_LENGTH_OFFSET, root_len)?;
        self.stream.flush()?;
        Ok(self.stream)
    }
}
