//! Low-level SCN chunk container.
//!
//! ## File Structure
//!
//! ```text
//! +------------------------+
//! | "RIFF"                 |  4 bytes
//! +------------------------+
//! | file length - 8        |  u32 LE (patched on finish)
//! +------------------------+
//! | "SCNE"                 |  4 bytes
//! +------------------------+
//! | chunk, chunk, ...      |
//! +------------------------+
//! ```
//!
//! Each chunk:
//!
//! ```text
//! "LIST" u32 list_len  tag[4]
//! "INFO" u32 8  u32 version  u32 id
//! "DATA" u32 data_len  payload[data_len]
//! ```

mod format;
mod reader;
mod stream;
mod writer;

pub use format::*;
pub use reader::*;
pub use stream::*;
pub use writer::*;

#[cfg(test)]
mod tests;
