use std::path::{Path, PathBuf};

use bytes::Bytes;

use crate::error::{PatchError, Result};

/// Offset of the big-endian firmware version.
pub const FW_VERSION_OFFSET: usize = 0x16;
/// Offset of the [`PatchInfo`] block.
pub const PATCH_INFO_OFFSET: usize = 0x18;
/// Length of the [`PatchInfo`] block.
pub const PATCH_INFO_LEN: usize = 8;
/// First byte of every valid [`PatchInfo`] block.
pub const PATCH_INFO_MARKER: u8 = 0x11;

/// The whole [`PatchInfo`] block must be present, so `0x1E` bytes is not enough.
const MIN_PATCH_LEN: usize = PATCH_INFO_OFFSET + PATCH_INFO_LEN;

/// A patch file read from the firmware directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    /// File name relative to the firmware directory. This is what the driver
    /// hands to `request_firmware`.
    pub filename: String,
    /// Absolute path the file was read from.
    pub path: PathBuf,
    /// Whole file contents.
    pub contents: Bytes,
}

impl Patch {
    pub fn new(
        filename: impl Into<String>,
        path: impl AsRef<Path>,
        contents: impl Into<Bytes>,
    ) -> Self {
        Self {
            filename: filename.into(),
            path: path.as_ref().to_path_buf(),
            contents: contents.into(),
        }
    }

    /// Validate the header and compare its firmware version with the chip's.
    pub fn accept_for(&self, chip_version: i64) -> Result<PatchHeader> {
        let header = validate(&self.contents)?;
        if i64::from(header.firmware_version) != chip_version {
            return Err(PatchError::VersionMismatch {
                name: self.filename.clone(),
                patch: header.firmware_version,
                chip: chip_version,
            });
        }
        Ok(header)
    }
}

/// The 8-byte patch information block at offset `0x18`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchInfo([u8; PATCH_INFO_LEN]);

impl PatchInfo {
    pub const fn from_bytes(bytes: [u8; PATCH_INFO_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; PATCH_INFO_LEN] {
        &self.0
    }

    /// Position of this patch in the download order (byte 0, low nibble).
    pub fn download_sequence(&self) -> u8 {
        self.0[0] & 0x0F
    }

    /// Number of patches in the set (byte 0, high nibble).
    pub fn patch_count(&self) -> u8 {
        self.0[0] >> 4
    }

    /// Byte 3; ROM patches carry `0xF0` here.
    pub fn address_tag(&self) -> u8 {
        self.0[3]
    }

    /// ROM patch type (byte 7).
    pub fn rom_patch_type(&self) -> u8 {
        self.0[7]
    }

    /// Load address: bytes 1..=3 in bits 8..32, low byte zero.
    pub fn address(&self) -> u32 {
        u32::from_le_bytes([0, self.0[1], self.0[2], self.0[3]])
    }
}

/// Fields extracted from a validated patch header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchHeader {
    pub info: PatchInfo,
    pub firmware_version: u16,
}

/// Check the `0x11` marker and extract [`PatchInfo`] and the firmware version.
pub fn validate(contents: &[u8]) -> Result<PatchHeader> {
    if contents.len() < MIN_PATCH_LEN {
        return Err(PatchError::Malformed(format!(
            "{} bytes is too short for a patch header (need {MIN_PATCH_LEN})",
            contents.len()
        )));
    }

    let mut info = [0u8; PATCH_INFO_LEN];
    info.copy_from_slice(&contents[PATCH_INFO_OFFSET..MIN_PATCH_LEN]);
    if info[0] != PATCH_INFO_MARKER {
        return Err(PatchError::Malformed(format!(
            "patch info starts with {:#04x}, expected {PATCH_INFO_MARKER:#04x}",
            info[0]
        )));
    }

    let firmware_version =
        u16::from_be_bytes([contents[FW_VERSION_OFFSET], contents[FW_VERSION_OFFSET + 1]]);

    Ok(PatchHeader {
        info: PatchInfo(info),
        firmware_version,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_bytes(fw: [u8; 2], info: [u8; 8]) -> Vec<u8> {
        let mut bytes = b"20190415154424a\n".to_vec();
        bytes.resize(FW_VERSION_OFFSET, 0);
        bytes.extend_from_slice(&fw);
        bytes.extend_from_slice(&info);
        bytes.extend_from_slice(&[0xAA; 16]);
        bytes
    }

    #[test]
    fn extracts_info_and_version() {
        let info = [0x11, 0x00, 0x09, 0x00, 0x00, 0x00, 0x00, 0x00];
        let bytes = header_bytes([0x01, 0x02], info);

        let header = validate(&bytes).unwrap();
        assert_eq!(header.firmware_version, 0x0102);
        assert_eq!(header.info.as_bytes(), &bytes[0x18..0x20]);
    }

    #[test]
    fn rejects_wrong_marker() {
        for first in [0x00, 0x10, 0x12, 0x21, 0xFF] {
            let bytes = header_bytes([0x8a, 0x00], [first, 0, 0, 0, 0, 0, 0, 0]);
            assert!(matches!(validate(&bytes), Err(PatchError::Malformed(_))));
        }
    }

    #[test]
    fn rejects_truncated_header() {
        let bytes = header_bytes([0x8a, 0x00], [0x11, 0, 0, 0, 0, 0, 0, 0]);
        assert!(matches!(validate(&bytes[..0x1E]), Err(PatchError::Malformed(_))));
        assert!(matches!(validate(&bytes[..0x1F]), Err(PatchError::Malformed(_))));
        assert!(matches!(validate(&[]), Err(PatchError::Malformed(_))));
        assert!(validate(&bytes[..MIN_PATCH_LEN]).is_ok());
    }

    #[test]
    fn info_fields() {
        let info = PatchInfo::from_bytes([0x21, 0x34, 0x12, 0xF0, 0, 0, 0, 5]);
        assert_eq!(info.download_sequence(), 1);
        assert_eq!(info.patch_count(), 2);
        assert_eq!(info.address_tag(), 0xF0);
        assert_eq!(info.rom_patch_type(), 5);
        assert_eq!(info.address(), 0xF012_3400);
    }

    #[test]
    fn accept_for_compares_versions() {
        let bytes = header_bytes([0x8a, 0x10], [0x11, 0, 0, 0, 0, 0, 0, 0]);
        let patch = Patch::new("ROMv4_be_patch_1_1_hdr.bin", "/lib/firmware/x", bytes);

        assert_eq!(patch.accept_for(0x8a10).unwrap().firmware_version, 0x8a10);
        assert!(matches!(
            patch.accept_for(0x8a00),
            Err(PatchError::VersionMismatch { patch: 0x8a10, chip: 0x8a00, .. })
        ));
    }
}
