use std::path::PathBuf;

/// Fallback errno when an I/O error carries no OS code.
const EIO: i32 = 5;

/// Errors that can occur while opening or talking to a driver device node.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// The device node could not be opened.
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// An I/O error occurred on an open device.
    #[error("device I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A read returned end-of-file.
    #[error("device closed")]
    Closed,
}

pub type Result<T> = std::result::Result<T, DeviceError>;

/// Platform error number reported by a failed control call.
///
/// The driver reuses small negative values for its own statuses, so callers
/// usually compare against [`OsErrorCode::raw`] rather than matching errnos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
#[error("os error {0}")]
pub struct OsErrorCode(pub i32);

impl OsErrorCode {
    /// Capture the calling thread's last OS error.
    pub fn last() -> Self {
        Self::from_io(&std::io::Error::last_os_error())
    }

    pub fn from_io(err: &std::io::Error) -> Self {
        Self(err.raw_os_error().unwrap_or(EIO))
    }

    /// The positive errno value.
    pub fn errno(self) -> i32 {
        self.0
    }

    /// The negated errno, i.e. the value the call "returned".
    pub fn raw(self) -> i64 {
        -i64::from(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_is_negated_errno() {
        assert_eq!(OsErrorCode(1).raw(), -1);
        assert_eq!(OsErrorCode(25).raw(), -25);
    }

    #[test]
    fn from_io_without_os_code_falls_back_to_eio() {
        let err = std::io::Error::other("synthetic");
        assert_eq!(OsErrorCode::from_io(&err).errno(), EIO);
    }

    #[test]
    fn from_io_keeps_os_code() {
        let err = std::io::Error::from_raw_os_error(16);
        assert_eq!(OsErrorCode::from_io(&err), OsErrorCode(16));
    }
}
