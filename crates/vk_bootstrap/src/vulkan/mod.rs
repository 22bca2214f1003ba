//! Vulkan bootstrap components
//!
//! Leaf-first: capability probing, scoped handles, the loaded API table,
//! debug reporting, logical devices and the instance builder that ties
//! them together.

pub mod application;
pub mod capabilities;
pub mod debug_report;
pub mod device;
pub mod error;
pub mod handle;
pub mod proc_table;

#[cfg(test)]
pub(crate) mod testing;

pub use application::*;
pub use debug_report::DebugReport;
pub use device::*;
pub use error::*;
pub use handle::*;
pub use proc_table::*;
