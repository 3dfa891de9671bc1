use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::os::fd::AsRawFd;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;

use crate::device::{ControlDevice, IoctlArg, IoctlResult};
use crate::error::{DeviceError, OsErrorCode, Result};

/// An opened driver character device (`/dev/wmtdetect`, `/dev/stpwmt`).
pub struct CharDevice {
    file: File,
    path: PathBuf,
}

impl CharDevice {
    /// Open a node for writing only (the detection node is opened this way).
    pub fn open_write_only(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path.as_ref(), OpenOptions::new().write(true))
    }

    /// Open a node for reading and writing.
    pub fn open_read_write(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path.as_ref(), OpenOptions::new().read(true).write(true))
    }

    fn open_with(path: &Path, options: &OpenOptions) -> Result<Self> {
        let file = options.open(path).map_err(|source| DeviceError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(?path, "opened device");
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    /// The path this device was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ControlDevice for CharDevice {
    fn ioctl(&self, code: u32, arg: IoctlArg<'_>) -> IoctlResult {
        let fd = self.file.as_raw_fd();

        let rc = match arg {
            // SAFETY: `fd` is an open descriptor owned by `self.file`; the
            // driver receives a plain integer and dereferences nothing.
            IoctlArg::None => unsafe { libc::ioctl(fd, code as _, 0 as libc::c_ulong) },
            // SAFETY: as above, the argument is passed by value.
            IoctlArg::Int(value) => unsafe { libc::ioctl(fd, code as _, value as libc::c_ulong) },
            IoctlArg::Buffer(bytes) => {
                let mut owned = Vec::with_capacity(bytes.len() + 1);
                owned.extend_from_slice(bytes);
                owned.push(0);
                // SAFETY: `owned` is a live, writable allocation of at least
                // `bytes.len() + 1` bytes for the duration of the call.
                unsafe { libc::ioctl(fd, code as _, owned.as_mut_ptr()) }
            }
        };

        if rc < 0 {
            Err(OsErrorCode::last())
        } else {
            Ok(i64::from(rc))
        }
    }

    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        (&self.file).read(buf)
    }

    fn write(&self, buf: &[u8]) -> io::Result<usize> {
        (&self.file).write(buf)
    }

    fn wait_readable(&self, timeout: Option<Duration>) -> io::Result<bool> {
        let mut pfd = libc::pollfd {
            fd: self.file.as_raw_fd(),
            events: libc::POLLIN,
            revents: 0,
        };
        let timeout_ms = match timeout {
            Some(timeout) => timeout.as_millis().min(libc::c_int::MAX as u128) as libc::c_int,
            None => -1,
        };

        // SAFETY: `pfd` is a valid pollfd for exactly one descriptor.
        let rc = unsafe { libc::poll(&mut pfd, 1, timeout_ms) };
        if rc < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                return Ok(false);
            }
            return Err(err);
        }

        // Errors and hangups count as readable so the next read surfaces them.
        Ok(rc > 0 && pfd.revents & (libc::POLLIN | libc::POLLERR | libc::POLLHUP) != 0)
    }
}

impl std::fmt::Debug for CharDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CharDevice")
            .field("path", &self.path)
            .field("fd", &self.file.as_raw_fd())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{ControlCommand, SizeClass};
    use crate::device::invoke;

    fn unique_temp_dir(tag: &str) -> PathBuf {
        let dir = PathBuf::from(format!(
            "/tmp/wmtload-{tag}-{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .expect("time should be after epoch")
                .as_nanos()
        ));
        std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
        dir
    }

    #[test]
    fn open_missing_node_is_open_error() {
        let result = CharDevice::open_read_write("/dev/wmtload-does-not-exist");
        assert!(matches!(result, Err(DeviceError::Open { .. })));
    }

    #[test]
    fn ioctl_on_regular_file_reports_enotty() {
        let dir = unique_temp_dir("enotty");
        let path = dir.join("node");
        std::fs::write(&path, b"").unwrap();

        let dev = CharDevice::open_read_write(&path).unwrap();
        let cmd = ControlCommand::read(0xA0, 22, SizeClass::Int);
        assert_eq!(
            invoke(&dev, cmd, IoctlArg::None),
            Err(OsErrorCode(libc::ENOTTY))
        );
        assert_eq!(
            invoke(&dev, cmd, IoctlArg::Buffer(b"WMT_SOC.cfg")),
            Err(OsErrorCode(libc::ENOTTY))
        );

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn read_write_and_readiness_on_plain_file() {
        let dir = unique_temp_dir("rw");
        let path = dir.join("node");
        std::fs::write(&path, b"srh_patch").unwrap();

        let dev = CharDevice::open_read_write(&path).unwrap();
        assert!(dev.wait_readable(Some(Duration::from_millis(10))).unwrap());

        let mut buf = [0u8; 256];
        let n = dev.read(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"srh_patch");
        assert_eq!(dev.write(b"ok").unwrap(), 2);
        assert_eq!(dev.path(), path.as_path());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
