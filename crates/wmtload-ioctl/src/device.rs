use std::io;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::command::ControlCommand;
use crate::error::OsErrorCode;

/// Outcome of a control call: the raw success value, or the errno of a failed call.
///
/// What a success value means (data or status) is known only to the caller.
pub type IoctlResult = std::result::Result<i64, OsErrorCode>;

/// Argument passed as the third `ioctl(2)` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoctlArg<'a> {
    /// Zero.
    None,
    /// Integer passed by value.
    Int(u64),
    /// Buffer copied into an owned, NUL-terminated allocation whose address is passed.
    Buffer(&'a [u8]),
}

/// Single-integer view of an [`IoctlResult`].
///
/// The driver overloads its return channel: small negative values double as
/// statuses (`-1` for "SoC chip", "busy", ...). Callers that need those
/// sentinels compare against this value explicitly.
pub trait RawReturn {
    fn raw(&self) -> i64;
}

impl RawReturn for IoctlResult {
    fn raw(&self) -> i64 {
        match self {
            Ok(value) => *value,
            Err(code) => code.raw(),
        }
    }
}

/// An open driver node that accepts control calls.
///
/// All methods take `&self`: a file descriptor can be used from several
/// threads, and serialization is layered on top by [`crate::SharedDevice`].
pub trait ControlDevice: Send + Sync {
    /// Issue a request number with an argument.
    fn ioctl(&self, code: u32, arg: IoctlArg<'_>) -> IoctlResult;

    /// Read whatever the driver has queued.
    fn read(&self, buf: &mut [u8]) -> io::Result<usize>;

    /// Write a buffer to the driver.
    fn write(&self, buf: &[u8]) -> io::Result<usize>;

    /// Block until the node is readable. `None` waits forever.
    ///
    /// Returns `Ok(false)` when the timeout elapsed (or a signal interrupted the wait).
    fn wait_readable(&self, timeout: Option<Duration>) -> io::Result<bool>;
}

impl<D: ControlDevice + ?Sized> ControlDevice for &D {
    fn ioctl(&self, code: u32, arg: IoctlArg<'_>) -> IoctlResult {
        (**self).ioctl(code, arg)
    }

    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read(buf)
    }

    fn write(&self, buf: &[u8]) -> io::Result<usize> {
        (**self).write(buf)
    }

    fn wait_readable(&self, timeout: Option<Duration>) -> io::Result<bool> {
        (**self).wait_readable(timeout)
    }
}

impl<D: ControlDevice + ?Sized> ControlDevice for Arc<D> {
    fn ioctl(&self, code: u32, arg: IoctlArg<'_>) -> IoctlResult {
        (**self).ioctl(code, arg)
    }

    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read(buf)
    }

    fn write(&self, buf: &[u8]) -> io::Result<usize> {
        (**self).write(buf)
    }

    fn wait_readable(&self, timeout: Option<Duration>) -> io::Result<bool> {
        (**self).wait_readable(timeout)
    }
}

/// Issue `command` on `device` and log the request number with its result.
pub fn invoke<D: ControlDevice + ?Sized>(
    device: &D,
    command: ControlCommand,
    arg: IoctlArg<'_>,
) -> IoctlResult {
    let result = device.ioctl(command.code(), arg);
    match &result {
        Ok(value) => debug!(cmd = %command, result = *value, "ioctl"),
        Err(code) => debug!(cmd = %command, result = code.raw(), errno = code.errno(), "ioctl"),
    }
    result
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::command::SizeClass;

    struct Fixed {
        answer: IoctlResult,
        seen: Mutex<Vec<(u32, u64)>>,
    }

    impl ControlDevice for Fixed {
        fn ioctl(&self, code: u32, arg: IoctlArg<'_>) -> IoctlResult {
            let value = match arg {
                IoctlArg::None => 0,
                IoctlArg::Int(v) => v,
                IoctlArg::Buffer(b) => b.len() as u64,
            };
            self.seen.lock().unwrap().push((code, value));
            self.answer
        }

        fn read(&self, _buf: &mut [u8]) -> io::Result<usize> {
            Ok(0)
        }

        fn write(&self, buf: &[u8]) -> io::Result<usize> {
            Ok(buf.len())
        }

        fn wait_readable(&self, _timeout: Option<Duration>) -> io::Result<bool> {
            Ok(true)
        }
    }

    #[test]
    fn raw_flattens_both_arms() {
        let ok: IoctlResult = Ok(0x321);
        let err: IoctlResult = Err(OsErrorCode(1));
        assert_eq!(ok.raw(), 0x321);
        assert_eq!(err.raw(), -1);
    }

    #[test]
    fn invoke_passes_encoded_command_and_argument() {
        let dev = Fixed {
            answer: Ok(7),
            seen: Mutex::new(Vec::new()),
        };
        let cmd = ControlCommand::write(0xA0, 14, SizeClass::Int);

        assert_eq!(invoke(&dev, cmd, IoctlArg::Int(2)), Ok(7));
        assert_eq!(dev.seen.lock().unwrap().as_slice(), &[(cmd.code(), 2)]);
    }

    #[test]
    fn invoke_returns_errno_untouched() {
        let dev = Fixed {
            answer: Err(OsErrorCode(16)),
            seen: Mutex::new(Vec::new()),
        };
        let cmd = ControlCommand::read(b'w', 6, SizeClass::Int);
        assert_eq!(invoke(&dev, cmd, IoctlArg::None), Err(OsErrorCode(16)));
    }
}
