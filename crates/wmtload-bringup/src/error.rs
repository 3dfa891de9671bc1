use wmtload_ioctl::{DeviceError, OsErrorCode};
use wmtload_patch::PatchError;

/// Errors that can occur during detection or while serving the launcher.
#[derive(Debug, thiserror::Error)]
pub enum BringupError {
    /// Opening or talking to a device node failed.
    #[error("device error: {0}")]
    Device(#[from] DeviceError),

    /// Patch lookup, validation or encoding failed.
    #[error("patch error: {0}")]
    Patch(#[from] PatchError),

    /// A control call returned a value the sequence cannot continue from.
    #[error("{step} failed (returned {code})")]
    ControlCall { step: &'static str, code: i64 },

    /// A control call failed at the OS level.
    #[error("{step} failed: {source}")]
    Os {
        step: &'static str,
        source: OsErrorCode,
    },

    /// The driver sent a request the launcher does not know.
    #[error("unknown patch request {0:?}")]
    UnknownRequest(String),

    /// The chip needs a path this launcher does not implement.
    #[error("unsupported: {0}")]
    Unsupported(&'static str),

    /// Shutdown was requested before the step completed.
    #[error("shutdown requested")]
    ShutdownRequested,

    /// A worker thread panicked.
    #[error("{0} worker panicked")]
    WorkerPanicked(&'static str),
}

impl From<std::io::Error> for BringupError {
    fn from(err: std::io::Error) -> Self {
        Self::Device(DeviceError::Io(err))
    }
}

pub type Result<T> = std::result::Result<T, BringupError>;
