//! Logical device creation
//!
//! The instance builder does not decide which physical devices are usable;
//! it asks a [`CompatibleDevice`] to build itself for each candidate and
//! keeps the first one that reports valid.

use ash::vk;
use ash::Device;
use std::ffi::CStr;
use std::rc::Rc;

use super::error::{VulkanError, VulkanResult};
use super::proc_table::{AshProcTable, ProcTable};

/// A logical device that can be built from any physical device candidate
pub trait CompatibleDevice<P: ProcTable>: Sized {
    /// Build the device for `physical_device`
    ///
    /// Incompatible hardware is not an error; it yields an invalid device.
    fn new(table: &Rc<P>, physical_device: vk::PhysicalDevice) -> Self;

    /// Whether the physical device met every requirement
    fn is_valid(&self) -> bool;
}

/// Logical device wrapper with RAII cleanup
///
/// Owns one graphics-capable queue. Must be dropped before the application
/// that owns the instance it was created from.
pub struct VulkanDevice {
    physical_device: vk::PhysicalDevice,
    properties: vk::PhysicalDeviceProperties,
    graphics_family: u32,
    graphics_queue: vk::Queue,
    device: Option<Device>,
}

impl VulkanDevice {
    fn create(
        table: &AshProcTable,
        physical_device: vk::PhysicalDevice,
    ) -> VulkanResult<(vk::PhysicalDeviceProperties, u32, Device)> {
        let instance = table.instance_for(physical_device).ok_or_else(|| {
            VulkanError::InitializationFailed(
                "Physical device was not enumerated from a loaded instance".to_string(),
            )
        })?;

        let properties = unsafe { instance.get_physical_device_properties(physical_device) };
        let queue_families =
            unsafe { instance.get_physical_device_queue_family_properties(physical_device) };

        let graphics_family = queue_families
            .iter()
            .position(|family| {
                family.queue_count > 0 && family.queue_flags.contains(vk::QueueFlags::GRAPHICS)
            })
            .ok_or_else(|| {
                VulkanError::InitializationFailed("No graphics queue family found".to_string())
            })?;
        let graphics_family = u32::try_from(graphics_family).map_err(|_| {
            VulkanError::InitializationFailed("Queue family index out of range".to_string())
        })?;

        let priorities = [1.0_f32];
        let queue_infos = [vk::DeviceQueueCreateInfo::builder()
            .queue_family_index(graphics_family)
            .queue_priorities(&priorities)
            .build()];

        let create_info = vk::DeviceCreateInfo::builder().queue_create_infos(&queue_infos);

        let device = unsafe { instance.create_device(physical_device, &create_info, None)? };

        Ok((properties, graphics_family, device))
    }

    /// Physical device this logical device was built from
    pub fn physical_device(&self) -> vk::PhysicalDevice {
        self.physical_device
    }

    /// Device name reported by the driver
    pub fn name(&self) -> String {
        unsafe { CStr::from_ptr(self.properties.device_name.as_ptr()) }
            .to_string_lossy()
            .into_owned()
    }

    /// Physical device properties and limits
    pub fn properties(&self) -> &vk::PhysicalDeviceProperties {
        &self.properties
    }

    /// Index of the graphics queue family
    pub fn graphics_family(&self) -> u32 {
        self.graphics_family
    }

    /// Graphics operations queue
    pub fn graphics_queue(&self) -> vk::Queue {
        self.graphics_queue
    }

    /// The logical device, when creation succeeded
    pub fn device(&self) -> Option<&Device> {
        self.device.as_ref()
    }
}

impl CompatibleDevice<AshProcTable> for VulkanDevice {
    fn new(table: &Rc<AshProcTable>, physical_device: vk::PhysicalDevice) -> Self {
        match Self::create(table, physical_device) {
            Ok((properties, graphics_family, device)) => {
                let graphics_queue = unsafe { device.get_device_queue(graphics_family, 0) };
                let device = Self {
                    physical_device,
                    properties,
                    graphics_family,
                    graphics_queue,
                    device: Some(device),
                };
                log::info!("Created logical device on {}", device.name());
                device
            }
            Err(e) => {
                log::debug!("Physical device {physical_device:?} rejected: {e}");
                Self {
                    physical_device,
                    properties: vk::PhysicalDeviceProperties::default(),
                    graphics_family: 0,
                    graphics_queue: vk::Queue::null(),
                    device: None,
                }
            }
        }
    }

    fn is_valid(&self) -> bool {
        self.device.is_some()
    }
}

impl Drop for VulkanDevice {
    fn drop(&mut self) {
        if let Some(device) = self.device.take() {
            unsafe {
                // Ensure device is idle before destruction
                let _ = device.device_wait_idle();
                device.destroy_device(None);
            }
        }
    }
}

impl std::fmt::Debug for VulkanDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VulkanDevice")
            .field("physical_device", &self.physical_device)
            .field("name", &self.name())
            .field("graphics_family", &self.graphics_family)
            .field("valid", &self.device.is_some())
            .finish()
    }
}
