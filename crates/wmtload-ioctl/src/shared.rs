use std::io::{self, ErrorKind};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::command::ControlCommand;
use crate::device::{invoke, ControlDevice, IoctlArg, IoctlResult};

/// A device handle shared between workers.
///
/// Control calls, reads and writes hold an internal lock for the duration of
/// one operation. Readiness waits do not, so a worker parked in
/// [`SharedDevice::wait_readable`] never blocks the others.
pub struct SharedDevice<D> {
    inner: D,
    io: Mutex<()>,
}

impl<D: ControlDevice> SharedDevice<D> {
    pub fn new(inner: D) -> Self {
        Self {
            inner,
            io: Mutex::new(()),
        }
    }

    /// Issue one control call.
    pub fn invoke(&self, command: ControlCommand, arg: IoctlArg<'_>) -> IoctlResult {
        let _guard = self.lock();
        invoke(&self.inner, command, arg)
    }

    /// Read once from the device.
    pub fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        let _guard = self.lock();
        loop {
            match self.inner.read(buf) {
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                other => return other,
            }
        }
    }

    /// Write the whole buffer.
    pub fn write_all(&self, buf: &[u8]) -> io::Result<()> {
        let _guard = self.lock();
        let mut offset = 0usize;
        while offset < buf.len() {
            match self.inner.write(&buf[offset..]) {
                Ok(0) => return Err(io::Error::from(ErrorKind::WriteZero)),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }

    /// Wait for readability without taking the lock.
    pub fn wait_readable(&self, timeout: Option<Duration>) -> io::Result<bool> {
        self.inner.wait_readable(timeout)
    }

    /// Borrow the underlying device.
    pub fn get_ref(&self) -> &D {
        &self.inner
    }

    /// Consume the wrapper and return the device.
    pub fn into_inner(self) -> D {
        self.inner
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.io.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<D> std::fmt::Debug for SharedDevice<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedDevice").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;

    use super::*;
    use crate::command::SizeClass;

    /// Fails if two calls ever overlap.
    #[derive(Default)]
    struct OverlapDetector {
        active: AtomicUsize,
        calls: AtomicUsize,
        chunk: usize,
    }

    impl OverlapDetector {
        fn enter(&self) {
            assert_eq!(self.active.fetch_add(1, Ordering::SeqCst), 0, "overlapping call");
            thread::sleep(Duration::from_millis(1));
            self.active.fetch_sub(1, Ordering::SeqCst);
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl ControlDevice for OverlapDetector {
        fn ioctl(&self, _code: u32, _arg: IoctlArg<'_>) -> IoctlResult {
            self.enter();
            Ok(0)
        }

        fn read(&self, _buf: &mut [u8]) -> io::Result<usize> {
            self.enter();
            Ok(0)
        }

        fn write(&self, buf: &[u8]) -> io::Result<usize> {
            self.enter();
            Ok(buf.len().min(self.chunk.max(1)))
        }

        fn wait_readable(&self, _timeout: Option<Duration>) -> io::Result<bool> {
            Ok(false)
        }
    }

    #[test]
    fn concurrent_calls_are_serialized() {
        let shared = Arc::new(SharedDevice::new(OverlapDetector::default()));
        let cmd = ControlCommand::write(0xA0, 7, SizeClass::Int);

        let workers: Vec<_> = (0..4)
            .map(|_| {
                let shared = Arc::clone(&shared);
                thread::spawn(move || {
                    for _ in 0..10 {
                        shared.invoke(cmd, IoctlArg::Int(1)).unwrap();
                        shared.read(&mut [0u8; 4]).unwrap();
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        assert_eq!(shared.get_ref().calls.load(Ordering::SeqCst), 80);
    }

    #[test]
    fn write_all_loops_over_short_writes() {
        let shared = SharedDevice::new(OverlapDetector {
            chunk: 3,
            ..OverlapDetector::default()
        });
        shared.write_all(b"fail").unwrap();
        assert_eq!(shared.get_ref().calls.load(Ordering::SeqCst), 2);
    }
}
