use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{PatchError, Result};
use crate::image::PatchInfo;

/// Size of the driver's patch name field.
pub const PATCH_NAME_LEN: usize = 256;
/// Longest name that still leaves room for the terminating NUL.
pub const MAX_PATCH_NAME_LEN: usize = PATCH_NAME_LEN - 1;
/// Total record size: selector (4) + address (4) + name (256).
pub const REQUEST_LEN: usize = 8 + PATCH_NAME_LEN;

/// Byte 3 value that marks ROM patch info.
pub const ROM_PATCH_ADDRESS_TAG: u8 = 0xF0;
/// ROM patch types are `0..ROM_PATCH_TYPE_LIMIT`.
pub const ROM_PATCH_TYPE_LIMIT: u8 = 6;

/// Record for `WMT_IOCTL_SET_PATCH_INFO`; the selector is the download sequence.
pub fn build_patch_request(info: &PatchInfo, filename: &str) -> Result<Bytes> {
    encode_request(u32::from(info.download_sequence()), info.address(), filename)
}

/// Record for `WMT_IOCTL_SET_ROM_PATCH_INFO`; the selector is the ROM patch type.
pub fn build_rom_patch_request(info: &PatchInfo, filename: &str) -> Result<Bytes> {
    if info.address_tag() != ROM_PATCH_ADDRESS_TAG || info.rom_patch_type() >= ROM_PATCH_TYPE_LIMIT
    {
        return Err(PatchError::InvalidRomPatchInfo {
            address_tag: info.address_tag(),
            kind: info.rom_patch_type(),
        });
    }
    encode_request(u32::from(info.rom_patch_type()), info.address(), filename)
}

/// Wire format (little-endian):
/// ```text
/// ┌──────────────┬──────────────┬──────────────────────────────┐
/// │ Selector (4) │ Address (4)  │ File name, NUL-padded (256)  │
/// └──────────────┴──────────────┴──────────────────────────────┘
/// ```
fn encode_request(selector: u32, address: u32, filename: &str) -> Result<Bytes> {
    let name = filename.as_bytes();
    if name.len() > MAX_PATCH_NAME_LEN {
        return Err(PatchError::NameTooLong {
            len: name.len(),
            max: MAX_PATCH_NAME_LEN,
        });
    }

    let mut buf = BytesMut::with_capacity(REQUEST_LEN);
    buf.put_u32_le(selector);
    buf.put_u32_le(address);
    buf.put_slice(name);
    buf.put_bytes(0, PATCH_NAME_LEN - name.len());
    Ok(buf.freeze())
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAME: &str = "ROMv4_be_patch_1_1_hdr.bin";

    #[test]
    fn patch_request_layout() {
        let info = PatchInfo::from_bytes([0x13, 0x34, 0x12, 0x00, 0, 0, 0, 0]);
        let record = build_patch_request(&info, NAME).unwrap();

        assert_eq!(record.len(), REQUEST_LEN);
        assert_eq!(&record[0..4], &[3, 0, 0, 0]);
        assert_eq!(&record[4..8], &[0x00, 0x34, 0x12, 0x00]);
        assert_eq!(&record[8..8 + NAME.len()], NAME.as_bytes());
        assert!(record[8 + NAME.len()..].iter().all(|&b| b == 0));
    }

    #[test]
    fn name_limits() {
        let info = PatchInfo::from_bytes([0x11, 0, 0, 0, 0, 0, 0, 0]);

        let longest = "a".repeat(MAX_PATCH_NAME_LEN);
        let record = build_patch_request(&info, &longest).unwrap();
        assert_eq!(record.len(), REQUEST_LEN);
        assert_eq!(&record[8..8 + MAX_PATCH_NAME_LEN], longest.as_bytes());
        assert_eq!(record[REQUEST_LEN - 1], 0);

        let empty = build_patch_request(&info, "").unwrap();
        assert!(empty[8..].iter().all(|&b| b == 0));

        let too_long = "a".repeat(PATCH_NAME_LEN);
        assert!(matches!(
            build_patch_request(&info, &too_long),
            Err(PatchError::NameTooLong { len: 256, max: 255 })
        ));
    }

    #[test]
    fn rom_request_uses_type_selector() {
        let info = PatchInfo::from_bytes([0x11, 0x00, 0x20, 0xF0, 0, 0, 0, 2]);
        let record = build_rom_patch_request(&info, "soc1_0_ram_bt_1_1_hdr.bin").unwrap();

        assert_eq!(record.len(), REQUEST_LEN);
        assert_eq!(&record[0..4], &[2, 0, 0, 0]);
        assert_eq!(&record[4..8], &[0x00, 0x00, 0x20, 0xF0]);
    }

    #[test]
    fn rom_request_rejects_bad_info() {
        for tag in [0x00u8, 0x01, 0xEF, 0xF1, 0xFF] {
            let info = PatchInfo::from_bytes([0x11, 0, 0, tag, 0, 0, 0, 0]);
            assert!(matches!(
                build_rom_patch_request(&info, NAME),
                Err(PatchError::InvalidRomPatchInfo { .. })
            ));
        }
        for kind in ROM_PATCH_TYPE_LIMIT..=u8::MAX {
            let info = PatchInfo::from_bytes([0x11, 0, 0, ROM_PATCH_ADDRESS_TAG, 0, 0, 0, kind]);
            assert!(build_rom_patch_request(&info, NAME).is_err());
        }
        for kind in 0..ROM_PATCH_TYPE_LIMIT {
            let info = PatchInfo::from_bytes([0x11, 0, 0, ROM_PATCH_ADDRESS_TAG, 0, 0, 0, kind]);
            assert!(build_rom_patch_request(&info, NAME).is_ok());
        }
    }

    #[test]
    fn rom_request_rejects_long_name_after_info_checks() {
        let info = PatchInfo::from_bytes([0x11, 0, 0, ROM_PATCH_ADDRESS_TAG, 0, 0, 0, 1]);
        assert!(matches!(
            build_rom_patch_request(&info, &"b".repeat(300)),
            Err(PatchError::NameTooLong { .. })
        ));
    }
}
