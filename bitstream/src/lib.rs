//! Bounded little-endian byte packing primitives for netrep.
//!
//! This crate provides [`ByteWriter`] and [`ByteReader`], the substrate the
//! wire framing and value codec are built on. Every multi-byte value is
//! little-endian; strings carry a `u16` byte length, byte strings a `u32`.
//!
//! # Design Principles
//!
//! - **No unsafe code** - Safety is paramount.
//! - **Bounded operations** - All reads are bounds-checked.
//! - **No domain knowledge** - This crate knows nothing about actors, properties, or routing.
//! - **Explicit errors** - All failures return structured errors, never panic.
//!
//! # Example
//!
//! ```
//! use bitstream::{ByteReader, ByteWriter};
//!
//! let mut writer = ByteWriter::new();
//! writer.write_u16(0xFFFF);
//! writer.write_str_u16("bob").unwrap();
//!
//! let bytes = writer.finish();
//!
//! let mut reader = ByteReader::new(&bytes);
//! assert_eq!(reader.read_u16().unwrap(), 0xFFFF);
//! assert_eq!(reader.read_str_u16().unwrap(), "bob");
//! ```

mod error;
mod reader;
mod writer;

pub use error::{ByteError, ByteResult};
pub use reader::ByteReader;
pub use writer::ByteWriter;
