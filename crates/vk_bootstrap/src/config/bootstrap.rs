//! # Bootstrap Configuration
//!
//! Application metadata and debug settings used to build a Vulkan instance.
//! Configuration is turned into an [`ApplicationDescriptor`] before instance
//! creation.

use ash::vk;
use serde::{Deserialize, Serialize};

use super::{Config, ConfigError};
use crate::vulkan::ApplicationDescriptor;

/// # Bootstrap Configuration
///
/// Everything the instance builder needs from the outside world: the
/// application identity, the requested API version, extra instance
/// extensions and the debug toggle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    /// Application name reported to the driver
    pub application_name: String,
    /// Application version (major, minor, patch)
    pub application_version: (u32, u32, u32),
    /// Requested Vulkan API version (major, minor, patch)
    pub api_version: (u32, u32, u32),
    /// Instance extensions requested by the application
    pub extensions: Vec<String>,
    /// Whether to enable validation and debug reporting
    ///
    /// `None` follows the build type: enabled in debug builds only.
    pub enable_validation: Option<bool>,
    /// Default log filter used when `RUST_LOG` is not set
    pub log_level: String,
}

impl BootstrapConfig {
    /// Create a new configuration for the named application
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            application_name: app_name.into(),
            application_version: (1, 0, 0),
            api_version: (1, 0, 0),
            extensions: Vec::new(),
            enable_validation: None,
            log_level: "info".to_string(),
        }
    }

    /// Set application version
    #[must_use]
    pub fn with_version(mut self, major: u32, minor: u32, patch: u32) -> Self {
        self.application_version = (major, minor, patch);
        self
    }

    /// Set the requested API version
    #[must_use]
    pub fn with_api_version(mut self, major: u32, minor: u32, patch: u32) -> Self {
        self.api_version = (major, minor, patch);
        self
    }

    /// Request an additional instance extension
    #[must_use]
    pub fn with_extension(mut self, name: impl Into<String>) -> Self {
        self.extensions.push(name.into());
        self
    }

    /// Force validation on or off regardless of build type
    #[must_use]
    pub fn with_validation(mut self, enabled: bool) -> Self {
        self.enable_validation = Some(enabled);
        self
    }

    /// Set the default log filter
    #[must_use]
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Resolve the process-wide debugging toggle
    pub fn debugging_enabled(&self) -> bool {
        self.enable_validation.unwrap_or(cfg!(debug_assertions))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.application_name.is_empty() {
            return Err(ConfigError::Invalid(
                "Application name cannot be empty".to_string(),
            ));
        }

        if self.api_version.0 == 0 {
            return Err(ConfigError::Invalid(
                "API version must be at least 1.0".to_string(),
            ));
        }

        if let Some(ext) = self.extensions.iter().find(|ext| ext.is_empty()) {
            return Err(ConfigError::Invalid(format!(
                "Extension name cannot be empty: {ext:?}"
            )));
        }

        Ok(())
    }

    /// Build the descriptor consumed by instance creation
    pub fn descriptor(&self) -> ApplicationDescriptor {
        let (app_major, app_minor, app_patch) = self.application_version;
        let (api_major, api_minor, api_patch) = self.api_version;

        ApplicationDescriptor {
            name: self.application_name.clone(),
            extensions: self.extensions.clone(),
            application_version: vk::make_api_version(0, app_major, app_minor, app_patch),
            api_version: vk::make_api_version(0, api_major, api_minor, api_patch),
        }
    }
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self::new("Vk Bootstrap Application")
    }
}

impl Config for BootstrapConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = BootstrapConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.enable_validation, None);
    }

    #[test]
    fn test_empty_name_rejected() {
        let config = BootstrapConfig::new("");
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_zero_api_version_rejected() {
        let config = BootstrapConfig::new("app").with_api_version(0, 9, 0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_extension_rejected() {
        let config = BootstrapConfig::new("app").with_extension("");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debugging_toggle_follows_build_type() {
        let config = BootstrapConfig::new("app");
        assert_eq!(config.debugging_enabled(), cfg!(debug_assertions));

        assert!(config.clone().with_validation(true).debugging_enabled());
        assert!(!config.with_validation(false).debugging_enabled());
    }

    #[test]
    fn test_descriptor_packs_versions() {
        let config = BootstrapConfig::new("app")
            .with_version(2, 3, 4)
            .with_api_version(1, 2, 0)
            .with_extension("VK_KHR_surface");

        let descriptor = config.descriptor();
        assert_eq!(descriptor.name, "app");
        assert_eq!(descriptor.extensions, vec!["VK_KHR_surface".to_string()]);
        assert_eq!(descriptor.application_version, vk::make_api_version(0, 2, 3, 4));
        assert_eq!(descriptor.api_version, vk::API_VERSION_1_2);
    }

    #[test]
    fn test_parse_partial_toml_uses_defaults() {
        let config: BootstrapConfig = toml::from_str(
            r#"
            application_name = "probe"
            extensions = ["VK_KHR_surface"]
            enable_validation = true
            "#,
        )
        .unwrap();

        assert_eq!(config.application_name, "probe");
        assert_eq!(config.api_version, (1, 0, 0));
        assert_eq!(config.enable_validation, Some(true));
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_save_and_load_ron() {
        let path = std::env::temp_dir().join(format!("vk_bootstrap_{}.ron", std::process::id()));
        let path = path.to_str().unwrap();

        let config = BootstrapConfig::new("ron app").with_validation(false);
        config.save_to_file(path).unwrap();
        let loaded = BootstrapConfig::load_from_file(path).unwrap();
        let _ = std::fs::remove_file(path);

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_unsupported_extension() {
        let result = BootstrapConfig::load_from_file("settings.json");
        assert!(result.is_err());

        let result = BootstrapConfig::default().save_to_file("settings.json");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }
}
