//! Topology data model: devices and links
//!
//! The in-memory representation that both the DSL text and the visual graph
//! must agree on. Construction from wire records is total: missing or
//! malformed fields are replaced by documented defaults, never rejected.

pub mod device;
pub mod graph;

pub use device::{Device, Interface, Position};
pub use graph::{Link, Topology};
