//! Request tables for the two driver nodes.
//!
//! Integer-class commands carry their argument by value; pointer-class
//! commands take a buffer.

use wmtload_ioctl::{ControlCommand, SizeClass};

/// `/dev/wmtdetect`: chip detection and module init.
pub mod detect {
    use super::*;

    pub const DEVICE_PATH: &str = "/dev/wmtdetect";

    const MAGIC: u8 = b'w';

    pub const GET_CHIP_ID: ControlCommand = ControlCommand::read(MAGIC, 0, SizeClass::Int);
    pub const SET_CHIP_ID: ControlCommand = ControlCommand::write(MAGIC, 1, SizeClass::Int);
    pub const EXT_CHIP_DETECT: ControlCommand = ControlCommand::read(MAGIC, 2, SizeClass::Int);
    pub const GET_SOC_CHIP_ID: ControlCommand = ControlCommand::read(MAGIC, 3, SizeClass::Int);
    pub const DO_MODULE_INIT: ControlCommand = ControlCommand::read(MAGIC, 4, SizeClass::Int);
    pub const MODULE_CLEANUP: ControlCommand = ControlCommand::read(MAGIC, 5, SizeClass::Int);
    pub const EXT_CHIP_PWR_ON: ControlCommand = ControlCommand::read(MAGIC, 6, SizeClass::Int);
    pub const EXT_CHIP_PWR_OFF: ControlCommand = ControlCommand::read(MAGIC, 7, SizeClass::Int);
    pub const DO_SDIO_AUTOK: ControlCommand = ControlCommand::read(MAGIC, 8, SizeClass::Int);
    pub const GET_ADIE_CHIP_ID: ControlCommand = ControlCommand::read(MAGIC, 9, SizeClass::Int);
    pub const SOC_HW_INIT: ControlCommand = ControlCommand::read(MAGIC, 10, SizeClass::Int);
}

/// `/dev/stpwmt`: the WMT core driver.
pub mod wmt {
    use super::*;

    pub const DEVICE_PATH: &str = "/dev/stpwmt";

    const MAGIC: u8 = 0xA0;

    pub const SET_PATCH_NAME: ControlCommand = ControlCommand::write(MAGIC, 4, SizeClass::Pointer);
    pub const SET_STP_MODE: ControlCommand = ControlCommand::write(MAGIC, 5, SizeClass::Int);
    pub const FUNC_ONOFF_CTRL: ControlCommand = ControlCommand::write(MAGIC, 6, SizeClass::Int);
    pub const LPBK_POWER_CTRL: ControlCommand = ControlCommand::write(MAGIC, 7, SizeClass::Int);
    pub const LPBK_TEST: ControlCommand = ControlCommand::read_write(MAGIC, 8, SizeClass::Pointer);
    pub const GET_CHIP_INFO: ControlCommand = ControlCommand::read(MAGIC, 12, SizeClass::Int);
    pub const SET_LAUNCHER_KILL: ControlCommand = ControlCommand::write(MAGIC, 13, SizeClass::Int);
    pub const SET_PATCH_NUM: ControlCommand = ControlCommand::write(MAGIC, 14, SizeClass::Int);
    pub const SET_PATCH_INFO: ControlCommand = ControlCommand::write(MAGIC, 15, SizeClass::Pointer);
    pub const PORT_NAME: ControlCommand = ControlCommand::read_write(MAGIC, 20, SizeClass::Pointer);
    pub const WMT_CFG_NAME: ControlCommand =
        ControlCommand::read_write(MAGIC, 21, SizeClass::Pointer);
    pub const WMT_QUERY_CHIPID: ControlCommand = ControlCommand::read(MAGIC, 22, SizeClass::Int);
    pub const WMT_TELL_CHIPID: ControlCommand = ControlCommand::write(MAGIC, 23, SizeClass::Int);
    pub const WMT_COREDUMP_CTRL: ControlCommand = ControlCommand::write(MAGIC, 24, SizeClass::Int);
    pub const SEND_BGW_DS_CMD: ControlCommand =
        ControlCommand::write(MAGIC, 25, SizeClass::Pointer);
    pub const ADIE_LPBK_TEST: ControlCommand =
        ControlCommand::read_write(MAGIC, 26, SizeClass::Pointer);
    pub const WMT_STP_ASSERT_CTRL: ControlCommand =
        ControlCommand::write(MAGIC, 27, SizeClass::Int);
    pub const FW_DBGLOG_CTRL: ControlCommand = ControlCommand::read(MAGIC, 29, SizeClass::Int);
    pub const DYNAMIC_DUMP_CTRL: ControlCommand =
        ControlCommand::read(MAGIC, 30, SizeClass::Pointer);
    pub const SET_ROM_PATCH_INFO: ControlCommand =
        ControlCommand::write(MAGIC, 31, SizeClass::Pointer);
    pub const GET_EMI_PHY_SIZE: ControlCommand = ControlCommand::read(MAGIC, 33, SizeClass::Int);
    pub const FW_PATCH_UPDATE_RST: ControlCommand =
        ControlCommand::read(MAGIC, 34, SizeClass::Int);
    pub const GET_VENDOR_PATCH_NUM: ControlCommand =
        ControlCommand::write(MAGIC, 35, SizeClass::Int);
    pub const GET_VENDOR_PATCH_VERSION: ControlCommand =
        ControlCommand::read(MAGIC, 36, SizeClass::Pointer);
    pub const SET_VENDOR_PATCH_VERSION: ControlCommand =
        ControlCommand::write(MAGIC, 37, SizeClass::Pointer);
    pub const GET_CHECK_PATCH_STATUS: ControlCommand =
        ControlCommand::read(MAGIC, 38, SizeClass::Int);
    pub const SET_CHECK_PATCH_STATUS: ControlCommand =
        ControlCommand::write(MAGIC, 39, SizeClass::Int);
    pub const SET_ACTIVE_PATCH_VERSION: ControlCommand =
        ControlCommand::read(MAGIC, 40, SizeClass::Pointer);
    pub const GET_ACTIVE_PATCH_VERSION: ControlCommand =
        ControlCommand::read(MAGIC, 41, SizeClass::Pointer);
    pub const GET_DIRECT_PATH_EMI_SIZE: ControlCommand =
        ControlCommand::read(MAGIC, 42, SizeClass::Int);
}

/// Selector argument for [`wmt::GET_CHIP_INFO`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u64)]
pub enum ChipInfo {
    ChipId = 0,
    HwVersion = 1,
    /// Firmware version as mapped from the hardware revision. Patches are matched against this.
    MappingHwVersion = 2,
    FwVersion = 3,
    IpVersion = 4,
    AdieChipId = 5,
}

impl ChipInfo {
    pub const fn selector(self) -> u64 {
        self as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_codes() {
        assert_eq!(detect::GET_CHIP_ID.code(), 0x8004_7700);
        assert_eq!(detect::SET_CHIP_ID.code(), 0x4004_7701);
        assert_eq!(detect::GET_SOC_CHIP_ID.code(), 0x8004_7703);
        assert_eq!(detect::GET_ADIE_CHIP_ID.code(), 0x8004_7709);
        assert_eq!(detect::SOC_HW_INIT.code(), 0x8004_770a);
    }

    #[test]
    fn wmt_codes() {
        assert_eq!(wmt::SET_PATCH_NAME.code(), 0x4008_a004);
        assert_eq!(wmt::SET_STP_MODE.code(), 0x4004_a005);
        assert_eq!(wmt::LPBK_POWER_CTRL.code(), 0x4004_a007);
        assert_eq!(wmt::LPBK_TEST.code(), 0xc008_a008);
        assert_eq!(wmt::GET_CHIP_INFO.code(), 0x8004_a00c);
        assert_eq!(wmt::SET_PATCH_NUM.code(), 0x4004_a00e);
        assert_eq!(wmt::SET_PATCH_INFO.code(), 0x4008_a00f);
        assert_eq!(wmt::WMT_QUERY_CHIPID.code(), 0x8004_a016);
        assert_eq!(wmt::SET_ROM_PATCH_INFO.code(), 0x4008_a01f);
        assert_eq!(wmt::GET_DIRECT_PATH_EMI_SIZE.code(), 0x8004_a02a);
    }

    #[test]
    fn chip_info_selectors() {
        assert_eq!(ChipInfo::ChipId.selector(), 0);
        assert_eq!(ChipInfo::MappingHwVersion.selector(), 2);
        assert_eq!(ChipInfo::AdieChipId.selector(), 5);
    }
}
