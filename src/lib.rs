//! Intel Hex and Motorola S-record to binary image conversion.
//!
//! Input text is decoded line by line into [`Record`]s, assembled into a
//! pad-filled [`MemoryImage`] over two passes, and optionally stamped with a
//! checksum, a CRC, or a forced value.
//!
//! ```
//! use hexbin::{convert, Encoding, Options};
//!
//! let text = ":0400100001020304E2\n:00000001FF\n";
//! let conversion = convert(Encoding::IntelHex, text, &Options::default()).unwrap();
//!
//! assert_eq!(conversion.image.lowest_address(), 0x10);
//! assert_eq!(conversion.image.as_bytes(), &[1, 2, 3, 4]);
//! ```

mod address;
mod assembler;
mod check;
mod checksum;
mod encoding;
mod error;
mod ihex;
mod image;
mod options;
mod parser;
mod record;
mod serializer;
mod srec;

pub mod crc;
pub mod io;
pub mod types;

#[cfg(feature = "cli")]
pub mod cli;

pub use address::{Addressing, AddressingMode};
pub use assembler::{convert, Conversion, Report, Session};
pub use check::{Algorithm, ChecksumRequest, CrcParams, Endianness, Stamp};
pub use encoding::Encoding;
pub use error::{CheckError, ConfigError, Error, ParseError, SerializeError};
pub use image::{MemoryImage, Placement, RangeTracker};
pub use options::{Options, MAX_LENGTH_LIMIT};
pub use parser::{ParseResult, Parser};
pub use record::{Decoded, Record, RecordChecksum};
pub use serializer::{encode_image, MAX_LINE_DATA};
