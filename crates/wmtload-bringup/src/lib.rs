//! Combo-chip bring-up: the detection pass and the launcher.
//!
//! The [`Detector`] runs once against `/dev/wmtdetect` and leaves the chip
//! identified, powered and with its kernel modules re-initialized. The
//! [`Launcher`] then configures `/dev/stpwmt` and runs two workers for the
//! rest of the process lifetime: the power-on retry loop and the patch
//! request loop that answers `srh_patch` / `srh_rom_patch` from the driver.

pub mod commands;
pub mod config;
pub mod detector;
pub mod error;
pub mod identity;
pub mod launcher;
pub mod power;
pub mod service;
pub mod session;

#[cfg(test)]
pub(crate) mod mock;

pub use config::{DetectorConfig, LauncherConfig};
#[cfg(unix)]
pub use detector::detect;
pub use detector::Detector;
pub use error::{BringupError, Result};
pub use identity::{resolve_chip_type, ChipIdentity};
pub use launcher::{mode_word, uses_alternate_stp_mode, Launcher, RunningLauncher};
pub use power::{power_on_retry_loop, PowerOnOutcome};
pub use service::{PatchRequest, PatchRequestLoop, MESSAGE_LEN, RESPONSE_FAIL, RESPONSE_OK};
pub use session::BringupSession;
