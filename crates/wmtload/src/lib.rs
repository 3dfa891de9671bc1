//! Userspace bring-up for MediaTek WMT combo chips (WiFi/BT/FM).
//!
//! wmtload replaces the vendor `wmt_loader` / `wmt_launcher` pair: it
//! identifies the chip through `/dev/wmtdetect`, then configures `/dev/stpwmt`
//! and answers the driver's firmware patch requests.
//!
//! # Crate Structure
//!
//! - [`ioctl`]: control-call encoding and the device handle
//! - [`patch`]: patch file naming, validation and request records
//! - [`bringup`]: detector and launcher (behind the `bringup` feature)

/// Re-export control-call types.
pub mod ioctl {
    pub use wmtload_ioctl::*;
}

/// Re-export patch types.
pub mod patch {
    pub use wmtload_patch::*;
}

/// Re-export bring-up types (requires `bringup` feature).
#[cfg(feature = "bringup")]
pub mod bringup {
    pub use wmtload_bringup::*;
}
