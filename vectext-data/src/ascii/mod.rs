//! Line-oriented ASCII vector exchange format.
//!
//! A document is an optional header block ended by [`HEADER_SENTINEL`],
//! followed by feature records:
//!
//! ```text
//! <type> <vertex-count> [<category-count>]
//!  <x> <y> [<z>]          one line per vertex
//!  <field> <category>     one line per category
//! ```
//!
//! Blank lines are ignored everywhere and lines starting with
//! [`COMMENT_MARKER`] are ignored between records.

mod decode;
mod encode;
mod error;
mod format;
mod header;
mod line;
mod select;

pub use decode::{AsciiReader, DecodeSummary};
pub use encode::{AsciiEncoder, EncodeOptions, EncodeSummary, OutputMode};
pub use error::{DecodeError, EncodeError, RecordSection, Warning};
pub use format::{format_decimal, trim_decimal};
pub use header::write_header;
pub use select::CategorySelector;

/// Line that ends the header block.
pub const HEADER_SENTINEL: &str = "VERTI:";

/// First character of a comment line.
pub const COMMENT_MARKER: char = '#';
