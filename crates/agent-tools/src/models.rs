//! These models represent the objects passed between an agent, its tools and the model
//!
//! Data arrives in loosely typed shapes: wire payloads from provider streams, literals written
//! by hand, history replayed from storage. We always convert those shapes into the typed
//! structs here through the `from_data` helpers, which fail at construction time instead of
//! letting a malformed block travel further. The typed structs serialize back to the same
//! camelCase wire format with a `type` discriminator on every block.
pub mod content;
pub mod media;
pub mod message;
pub mod tool;
