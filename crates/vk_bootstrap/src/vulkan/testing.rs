//! Recording test doubles for the loaded API table and logical devices

use ash::prelude::VkResult;
use ash::vk::{self, Handle};
use std::cell::{Cell, RefCell};
use std::ffi::{c_char, CStr};
use std::rc::Rc;

use super::debug_report::DebugReport;
use super::device::CompatibleDevice;
use super::proc_table::ProcTable;

/// Raw value handed out for the first created instance
pub const MOCK_INSTANCE: u64 = 0xA000;

/// Everything the mock table has been asked to do
#[derive(Debug, Default)]
pub struct CallLog {
    pub extension_queries: usize,
    pub layer_queries: usize,
    pub instances_created: usize,
    pub instances_destroyed: usize,
    pub destroyed_handles: Vec<u64>,
    pub proc_setups: usize,
    pub enumerations: usize,
    pub debug_callbacks_created: usize,
    pub debug_callbacks_destroyed: usize,
    pub requested_extensions: Vec<String>,
    pub requested_layers: Vec<String>,
    pub application_name: String,
    pub engine_name: String,
    pub application_version: u32,
    pub api_version: u32,
    pub probed_devices: Vec<u64>,
    /// Destruction calls in the order they happened
    pub events: Vec<&'static str>,
}

/// [`ProcTable`] double with switchable failures
#[derive(Default)]
pub struct MockProcTable {
    extensions: Vec<String>,
    layers: Vec<String>,
    physical_devices: Vec<u64>,
    compatible_devices: Vec<u64>,
    pub fail_extension_query: Cell<bool>,
    pub fail_layer_query: Cell<bool>,
    pub fail_create_instance: Cell<bool>,
    pub fail_proc_setup: Cell<bool>,
    pub fail_enumeration: Cell<bool>,
    pub fail_debug_callback: Cell<bool>,
    pub calls: RefCell<CallLog>,
}

impl MockProcTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_debug_extension(mut self) -> Self {
        self.extensions
            .push(DebugReport::extension_name().to_string_lossy().into_owned());
        self
    }

    pub fn with_layers(mut self, layers: &[&str]) -> Self {
        self.layers.extend(layers.iter().map(|layer| (*layer).to_string()));
        self
    }

    pub fn with_physical_devices(mut self, devices: &[u64]) -> Self {
        self.physical_devices.extend_from_slice(devices);
        self
    }

    pub fn with_compatible_devices(mut self, devices: &[u64]) -> Self {
        self.compatible_devices.extend_from_slice(devices);
        self
    }
}

fn fixed_name<const N: usize>(name: &str) -> [c_char; N] {
    let mut out = [0 as c_char; N];
    for (slot, byte) in out.iter_mut().zip(name.bytes().take(N - 1)) {
        *slot = byte as c_char;
    }
    out
}

unsafe fn read_names(count: u32, names: *const *const c_char) -> Vec<String> {
    if count == 0 || names.is_null() {
        return Vec::new();
    }
    std::slice::from_raw_parts(names, count as usize)
        .iter()
        .map(|name| CStr::from_ptr(*name).to_string_lossy().into_owned())
        .collect()
}

impl ProcTable for MockProcTable {
    fn enumerate_instance_extension_properties(&self) -> VkResult<Vec<vk::ExtensionProperties>> {
        self.calls.borrow_mut().extension_queries += 1;
        if self.fail_extension_query.get() {
            return Err(vk::Result::ERROR_OUT_OF_HOST_MEMORY);
        }
        Ok(self
            .extensions
            .iter()
            .map(|name| vk::ExtensionProperties {
                extension_name: fixed_name(name),
                spec_version: 1,
            })
            .collect())
    }

    fn enumerate_instance_layer_properties(&self) -> VkResult<Vec<vk::LayerProperties>> {
        self.calls.borrow_mut().layer_queries += 1;
        if self.fail_layer_query.get() {
            return Err(vk::Result::ERROR_OUT_OF_HOST_MEMORY);
        }
        Ok(self
            .layers
            .iter()
            .map(|name| vk::LayerProperties {
                layer_name: fixed_name(name),
                ..Default::default()
            })
            .collect())
    }

    unsafe fn create_instance(&self, create_info: &vk::InstanceCreateInfo) -> VkResult<vk::Instance> {
        let mut calls = self.calls.borrow_mut();
        calls.requested_extensions = read_names(
            create_info.enabled_extension_count,
            create_info.pp_enabled_extension_names,
        );
        calls.requested_layers = read_names(
            create_info.enabled_layer_count,
            create_info.pp_enabled_layer_names,
        );
        if let Some(info) = create_info.p_application_info.as_ref() {
            calls.application_name = CStr::from_ptr(info.p_application_name)
                .to_string_lossy()
                .into_owned();
            calls.engine_name = CStr::from_ptr(info.p_engine_name)
                .to_string_lossy()
                .into_owned();
            calls.application_version = info.application_version;
            calls.api_version = info.api_version;
        }

        if self.fail_create_instance.get() {
            return Err(vk::Result::ERROR_INCOMPATIBLE_DRIVER);
        }
        calls.instances_created += 1;
        Ok(vk::Instance::from_raw(MOCK_INSTANCE + calls.instances_created as u64 - 1))
    }

    fn setup_instance_proc_addresses(&self, _instance: vk::Instance) -> bool {
        self.calls.borrow_mut().proc_setups += 1;
        !self.fail_proc_setup.get()
    }

    fn destroy_instance(&self, instance: vk::Instance) {
        let mut calls = self.calls.borrow_mut();
        calls.instances_destroyed += 1;
        calls.events.push("destroy_instance");
        calls.destroyed_handles.push(instance.as_raw());
    }

    fn enumerate_physical_devices(&self, _instance: vk::Instance) -> VkResult<Vec<vk::PhysicalDevice>> {
        self.calls.borrow_mut().enumerations += 1;
        if self.fail_enumeration.get() {
            return Err(vk::Result::ERROR_INITIALIZATION_FAILED);
        }
        Ok(self
            .physical_devices
            .iter()
            .map(|raw| vk::PhysicalDevice::from_raw(*raw))
            .collect())
    }

    fn create_debug_report_callback(
        &self,
        _instance: vk::Instance,
        _create_info: &vk::DebugReportCallbackCreateInfoEXT,
    ) -> VkResult<vk::DebugReportCallbackEXT> {
        if self.fail_debug_callback.get() {
            return Err(vk::Result::ERROR_EXTENSION_NOT_PRESENT);
        }
        let mut calls = self.calls.borrow_mut();
        calls.debug_callbacks_created += 1;
        Ok(vk::DebugReportCallbackEXT::from_raw(0xD000 + calls.debug_callbacks_created as u64))
    }

    fn destroy_debug_report_callback(&self, _instance: vk::Instance, _callback: vk::DebugReportCallbackEXT) {
        let mut calls = self.calls.borrow_mut();
        calls.debug_callbacks_destroyed += 1;
        calls.events.push("destroy_debug_report_callback");
    }
}

/// Logical device double, valid when the table lists its physical device as compatible
#[derive(Debug)]
pub struct MockDevice {
    pub physical_device: vk::PhysicalDevice,
    valid: bool,
}

impl CompatibleDevice<MockProcTable> for MockDevice {
    fn new(table: &Rc<MockProcTable>, physical_device: vk::PhysicalDevice) -> Self {
        let raw = physical_device.as_raw();
        table.calls.borrow_mut().probed_devices.push(raw);
        Self {
            physical_device,
            valid: table.compatible_devices.contains(&raw),
        }
    }

    fn is_valid(&self) -> bool {
        self.valid
    }
}
