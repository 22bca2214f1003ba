//! # Vk Bootstrap
//!
//! Bootstrap lifecycle for a Vulkan execution context.
//!
//! ## Features
//!
//! - **Validated Instance Creation**: extensions and layers are probed before they are requested
//! - **Debug Reporting**: optional `VK_EXT_debug_report` attachment routed to the `log` facade
//! - **Device Selection**: first compatible physical device wins, in enumeration order
//! - **Scoped Ownership**: native handles are released exactly once
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::rc::Rc;
//! use vk_bootstrap::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = BootstrapConfig::new("My App");
//!     let table = Rc::new(AshProcTable::load()?);
//!     let application = VulkanApplication::new(
//!         Rc::clone(&table),
//!         &config.descriptor(),
//!         config.debugging_enabled(),
//!     );
//!
//!     if !application.is_valid() {
//!         return Err("could not create Vulkan instance".into());
//!     }
//!
//!     let device: Option<VulkanDevice> = application.acquire_first_compatible_logical_device();
//!     println!("device acquired: {}", device.is_some());
//!     Ok(())
//! }
//! ```

pub use ash;

pub mod config;
pub mod logging;
pub mod vulkan;

/// Common imports for library users
pub mod prelude {
    pub use crate::{
        config::{BootstrapConfig, Config, ConfigError},
        vulkan::{
            ApplicationDescriptor, AshProcTable, CompatibleDevice, DebugReport, ProcTable,
            ScopedHandle, VulkanApplication, VulkanDevice, VulkanError, VulkanResult,
        },
    };
}
