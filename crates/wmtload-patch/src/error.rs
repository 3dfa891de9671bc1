use std::path::PathBuf;

/// Errors that can occur while locating, validating or encoding patches.
#[derive(Debug, thiserror::Error)]
pub enum PatchError {
    /// The patch header or build-info block is not in the expected shape.
    #[error("malformed patch: {0}")]
    Malformed(String),

    /// The patch was built for a different firmware version than the chip runs.
    #[error("patch {name} targets fwver {patch:#06x}, chip reports {chip:#x}")]
    VersionMismatch { name: String, patch: u16, chip: i64 },

    /// No prefix table knows the chip.
    #[error("no patch naming rule for chip {0:#x}")]
    UnresolvableChip(u32),

    /// The glob matched nothing in the firmware directory.
    #[error("no patch matches {pattern} in {dir}")]
    NoPatchFound { pattern: String, dir: PathBuf },

    /// The patch file name does not fit the driver's name field.
    #[error("patch name too long ({len} bytes, max {max})")]
    NameTooLong { len: usize, max: usize },

    /// ROM patch info failed the address-tag or type checks.
    #[error("invalid ROM patch info (address tag {address_tag:#04x}, type {kind})")]
    InvalidRomPatchInfo { address_tag: u8, kind: u8 },

    /// The glob itself could not be parsed.
    #[error("invalid patch pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// Reading the firmware directory or a patch file failed.
    #[error("failed reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, PatchError>;
