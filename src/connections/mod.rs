//! Connections Module
//!
//! Declarations of the named data channels a task consumes and produces.

pub mod descriptor;
pub mod spec;

pub use descriptor::{ConnectionDescriptor, ConnectionKind};
pub use spec::{ConnectionsSpec, ConnectionsSpecBuilder};
