use std::fmt;
use std::io;

use wmtload_bringup::BringupError;
use wmtload_ioctl::DeviceError;
use wmtload_patch::PatchError;

// Usage errors exit with 2 from clap itself.
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let hint = match err.kind() {
        io::ErrorKind::PermissionDenied => " (are you root?)",
        io::ErrorKind::NotFound => " (is the driver module loaded?)",
        _ => "",
    };
    CliError::new(FAILURE, format!("{context}: {err}{hint}"))
}

pub fn device_error(context: &str, err: DeviceError) -> CliError {
    match err {
        DeviceError::Open { path, source } => {
            io_error(&format!("{context}: cannot open {}", path.display()), source)
        }
        DeviceError::Io(source) => io_error(context, source),
        other => CliError::new(FAILURE, format!("{context}: {other}")),
    }
}

pub fn patch_error(context: &str, err: PatchError) -> CliError {
    match err {
        PatchError::Io { path, source } => {
            io_error(&format!("{context}: {}", path.display()), source)
        }
        other => CliError::new(FAILURE, format!("{context}: {other}")),
    }
}

pub fn bringup_error(context: &str, err: BringupError) -> CliError {
    match err {
        BringupError::Device(err) => device_error(context, err),
        BringupError::Patch(err) => patch_error(context, err),
        other => CliError::new(FAILURE, format!("{context}: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_failure_names_the_node() {
        let err = bringup_error(
            "detection failed",
            BringupError::Device(DeviceError::Open {
                path: "/dev/wmtdetect".into(),
                source: io::Error::from(io::ErrorKind::NotFound),
            }),
        );
        assert_eq!(err.code, FAILURE);
        assert!(err.message.starts_with("detection failed: cannot open /dev/wmtdetect"));
        assert!(err.message.ends_with("(is the driver module loaded?)"));
    }

    #[test]
    fn control_failures_are_fatal() {
        let err = bringup_error(
            "detection failed",
            BringupError::ControlCall {
                step: "read A-die chip id",
                code: -1,
            },
        );
        assert_eq!(err.code, FAILURE);
        assert_eq!(
            err.to_string(),
            "detection failed: read A-die chip id failed (returned -1)"
        );
    }

    #[test]
    fn patch_errors_keep_their_message() {
        let err = patch_error("inspect", PatchError::UnresolvableChip(0x1234));
        assert_eq!(err.to_string(), "inspect: no patch naming rule for chip 0x1234");
    }
}
