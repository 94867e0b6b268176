// Tool settings - the explicit home for everything the bench script
// used to keep as process-wide globals.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Name of the reserved config partition on the device.
pub const PARTITION_NAME: &str = "dev_config";

/// Size of the reserved partition, passed to the NVS image generator.
pub const NVS_PARTITION_SIZE: u32 = 0x3000;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    // Management server
    pub server_address: String,
    pub tenant: String,
    pub use_tls: u8,
    pub poll_time: i32,
    pub username: String,
    pub password: String,
    /// Accept self-signed certificates from the management server.
    /// Off by default; local bench servers usually need it.
    pub accept_invalid_certs: bool,

    // Device under provisioning
    pub serial_number: u32,
    pub port: String,

    // Working files, written next to the tool and consumed by the
    // vendor tools
    pub csv_file: PathBuf,
    pub bin_file: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_address: "192.168.1.136:8443".to_string(),
            tenant: "default".to_string(),
            use_tls: 1,
            poll_time: 100,
            username: "admin".to_string(),
            password: "test12345678".to_string(),
            accept_invalid_certs: false,
            serial_number: 5,
            port: "COM9".to_string(),
            csv_file: PathBuf::from("device_config.csv"),
            bin_file: PathBuf::from("device_config.bin"),
        }
    }
}

impl Settings {
    /// Loads settings from a JSON file. Missing fields keep their
    /// defaults; a missing or malformed file is an error.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        let settings = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse settings file {}", path.display()))?;
        Ok(settings)
    }

    /// Registration endpoint URL. The scheme follows the TLS flag that
    /// is also embedded into the device record.
    pub fn registration_url(&self) -> String {
        let scheme = if self.use_tls > 0 { "https" } else { "http" };
        format!("{}://{}/rest/v1/targets", scheme, self.server_address)
    }
}

/// ESP-IDF checkout root, from the environment. Both vendor tools live
/// under it.
pub fn idf_path() -> Result<PathBuf> {
    env::var_os("IDF_PATH")
        .map(PathBuf::from)
        .context("IDF_PATH is not set; point it at an ESP-IDF checkout")
}
