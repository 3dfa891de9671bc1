//! Firmware patch selection for WMT combo chips.
//!
//! Patch files live in the firmware directory and are picked by a glob built
//! from the chip id. Every candidate carries a small binary header:
//! - bytes `0x16..0x18`: firmware version the patch was built for (big-endian)
//! - bytes `0x18..0x20`: the 8-byte [`PatchInfo`] block, starting with the `0x11` marker
//!
//! The driver is told about each accepted patch through a fixed 264-byte
//! record built by [`build_patch_request`] or [`build_rom_patch_request`].

pub mod error;
pub mod image;
pub mod metadata;
pub mod prefix;
pub mod request;
pub mod store;

pub use error::{PatchError, Result};
pub use image::{validate, Patch, PatchHeader, PatchInfo, PATCH_INFO_MARKER};
pub use metadata::{bluetooth_version, build_id};
pub use prefix::{
    patch_glob, resolve_patch_prefix, resolve_rom_patch_prefix, resolve_suffix, rom_patch_glob,
};
pub use request::{build_patch_request, build_rom_patch_request, REQUEST_LEN};
pub use store::{PatchStore, DEFAULT_FIRMWARE_DIR};
