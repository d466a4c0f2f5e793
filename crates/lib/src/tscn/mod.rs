//! Ordered section text format used by engine manifests.
//!
//! A document is a sequence of sections. Each section has a heading, which may
//! carry inline properties, and an ordered list of `key = value` entries:
//!
//! ```text
//! [configuration]
//! entry_symbol = "swift_entry_point"
//! compatibility_minimum = 4.2
//!
//! [dependencies]
//! linux.debug.x86_64 = {"linux-x86_64/debug/SwiftGodot.so": ""}
//! ```

mod decode;
mod encode;
mod types;

pub use decode::{DecodeError, decode};
pub use encode::{EncodeError, Encoder, encode};
pub use types::*;
