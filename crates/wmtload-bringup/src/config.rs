use std::path::PathBuf;
use std::time::Duration;

use wmtload_patch::DEFAULT_FIRMWARE_DIR;

use crate::commands::{detect, wmt};

/// Configuration for the detection pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectorConfig {
    /// Detection node.
    pub device_path: PathBuf,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            device_path: PathBuf::from(detect::DEVICE_PATH),
        }
    }
}

/// Configuration for the launcher and its workers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherConfig {
    /// WMT core node.
    pub device_path: PathBuf,
    /// Directory searched for patch files.
    pub firmware_dir: PathBuf,
    /// Config file name handed to the driver.
    pub cfg_name: String,
    /// UART baud rate packed into the mode word.
    pub baudrate: u32,
    /// FM transport mode (low nibble only).
    pub fm_mode: u8,
    /// Power-on attempts before giving up.
    pub power_on_attempts: u32,
    /// Pause after a failed power-on.
    pub power_on_backoff: Duration,
    /// Pause between chip id queries while the driver is not ready.
    pub chip_id_backoff: Duration,
    /// Upper bound on how long the request loop blocks before rechecking shutdown.
    pub poll_interval: Duration,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            device_path: PathBuf::from(wmt::DEVICE_PATH),
            firmware_dir: PathBuf::from(DEFAULT_FIRMWARE_DIR),
            cfg_name: "WMT_SOC.cfg".to_string(),
            baudrate: 4_000_000,
            fm_mode: 2,
            power_on_attempts: 20,
            power_on_backoff: Duration::from_secs(1),
            chip_id_backoff: Duration::from_millis(300),
            poll_interval: Duration::from_millis(500),
        }
    }
}
