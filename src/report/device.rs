//! Host identification block embedded in JSON reports.

use serde::{Deserialize, Serialize};

/// Host identification, included verbatim in JSON reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    /// Hardware model or architecture.
    pub model: String,
    /// Operating system name.
    pub system_name: String,
    /// Operating system or host application version.
    pub system_version: String,
    /// Stable per-install identifier, if the host has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
}

impl DeviceInfo {
    /// Create a device block from host-supplied values.
    #[must_use]
    pub fn new(
        model: impl Into<String>,
        system_name: impl Into<String>,
        system_version: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            system_name: system_name.into(),
            system_version: system_version.into(),
            identifier: None,
        }
    }

    /// Attach an identifier.
    #[must_use]
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    /// Describe the current process's platform.
    #[must_use]
    pub fn current() -> Self {
        Self::new(
            std::env::consts::ARCH,
            std::env::consts::OS,
            std::env::consts::FAMILY,
        )
    }
}

impl Default for DeviceInfo {
    fn default() -> Self {
        Self::current()
    }
}
