//! Vulkan-specific error types

use ash::vk;
use thiserror::Error;

/// Vulkan-specific error types
///
/// These only surface at the edges of the crate, such as loading the Vulkan
/// library. Instance and device bootstrap report failure through validity
/// flags instead.
#[derive(Error, Debug)]
pub enum VulkanError {
    /// General Vulkan API error with result code
    #[error("Vulkan API error: {0:?}")]
    Api(vk::Result),

    /// The Vulkan loader library could not be opened
    #[error("Vulkan loader unavailable: {0}")]
    LoaderUnavailable(String),

    /// Vulkan context initialization failed
    #[error("Initialization failed: {0}")]
    InitializationFailed(String),
}

impl From<vk::Result> for VulkanError {
    fn from(result: vk::Result) -> Self {
        Self::Api(result)
    }
}

/// Result type for Vulkan operations
pub type VulkanResult<T> = Result<T, VulkanError>;
