//! Value types carried by meta event payloads

mod smpte_offset;
pub use smpte_offset::*;

mod signature;
pub use signature::*;
