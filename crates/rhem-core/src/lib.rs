// crates/rhem-core/src/lib.rs
//
// rhem-core: Core types, errors, roles, clocks, and Merkle primitives for the
// RHEM platform.
//
// This is the leaf crate every other crate in the workspace depends on.

pub mod address;
pub mod crypto;
pub mod error;
pub mod roles;
pub mod traits;

// Re-export key types for ergonomic access from downstream crates.
pub use address::{Address, Amount, Timestamp, SECONDS_PER_DAY};
pub use error::RhemError;
pub use roles::{Component, Role};
pub use traits::{Clock, ManualClock, SystemClock};
