//! Chip id to patch file naming rules.
//!
//! Patch files are named `<prefix>_patch_<n>_<m><suffix>` (RAM patches) or
//! `<prefix>_ram_<kind>_<n>_<m><suffix>` (ROM patches). The prefix names the
//! ROM generation the chip was taped out with.

use crate::error::{PatchError, Result};

/// Known chips with a fixed generation name. Checked before any range rule.
const EXACT_PREFIXES: &[(u32, &str)] = &[
    (0x6761, "ROMv4_be"),
    (0x6765, "ROMv4_be"),
    (0x6771, "ROMv4"),
    (0x6775, "ROMv4"),
    (0x6758, "ROMv3"),
    (0x6759, "ROMv3"),
    (0x6797, "ROMv3"),
    (0x8127, "ROMv1"),
    (0x8163, "ROMv2"),
    (0x8167, "ROMv2"),
    (0x6768, "soc1_0"),
    (0x6779, "soc1_0"),
    (0x6785, "soc1_0"),
    (0x6885, "soc2_0"),
    (0x6893, "soc2_0"),
];

/// Legacy chips, resolved through the generation sub-tables.
const LEGACY_RANGE: std::ops::RangeInclusive<u32> = 0x6570..=0x6799;

const LEGACY_PREFIXES: &[(&[u32], &str)] = &[
    (&[0x6571, 0x6572, 0x6580, 0x6582, 0x6592], "ROMv1"),
    (&[0x6755, 0x6757, 0x6763], "ROMv2_lm"),
    (&[0x6735, 0x6737, 0x6752, 0x6753], "ROMv2"),
    (&[0x6739], "soc1_0"),
];

/// Newer chips with no generation alias use `mt<hex id>`.
const NAMED_BY_ID_RANGE: std::ops::RangeInclusive<u32> = 0x6800..=0x6FFF;

/// ROM patch prefixes. Anything not listed uses [`DEFAULT_ROM_PREFIX`].
const ROM_PREFIXES: &[(u32, &str)] = &[
    (0x6885, "soc2_0"),
    (0x6893, "soc2_0"),
    (0x6877, "soc2_2"),
    (0x6983, "soc2_2"),
];

const DEFAULT_ROM_PREFIX: &str = "soc1_0";

/// Suffix shared by every patch file name.
pub const PATCH_SUFFIX: &str = "_hdr.bin";

/// RAM patch prefix for a chip.
pub fn resolve_patch_prefix(chip_id: u32) -> Result<String> {
    if let Some((_, prefix)) = EXACT_PREFIXES.iter().find(|(id, _)| *id == chip_id) {
        return Ok((*prefix).to_string());
    }

    if LEGACY_RANGE.contains(&chip_id) {
        if let Some((_, prefix)) = LEGACY_PREFIXES
            .iter()
            .find(|(ids, _)| ids.contains(&chip_id))
        {
            return Ok((*prefix).to_string());
        }
    }

    if NAMED_BY_ID_RANGE.contains(&chip_id) {
        return Ok(format!("mt{chip_id:x}"));
    }

    Err(PatchError::UnresolvableChip(chip_id))
}

/// ROM patch prefix for a chip.
pub fn resolve_rom_patch_prefix(chip_id: u32) -> String {
    ROM_PREFIXES
        .iter()
        .find(|(id, _)| *id == chip_id)
        .map_or(DEFAULT_ROM_PREFIX, |(_, prefix)| *prefix)
        .to_string()
}

/// File name suffix for a chip.
///
/// Always [`PATCH_SUFFIX`] for now; the vendor launcher varies it per chip
/// and that mapping is not known here.
pub fn resolve_suffix(_chip_id: u32) -> &'static str {
    PATCH_SUFFIX
}

/// Glob for the RAM patches of a chip.
pub fn patch_glob(chip_id: u32) -> Result<String> {
    let prefix = resolve_patch_prefix(chip_id)?;
    Ok(format!("{prefix}_patch_*{}", resolve_suffix(chip_id)))
}

/// Glob for the ROM patches of a chip.
pub fn rom_patch_glob(chip_id: u32) -> String {
    let prefix = resolve_rom_patch_prefix(chip_id);
    format!("{prefix}_ram_*{}", resolve_suffix(chip_id))
}
