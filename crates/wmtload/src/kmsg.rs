//! Watches the kernel log for firmware the driver could not load.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

use tracing::{debug, warn};

const KMSG_PATH: &str = "/dev/kmsg";
const LOAD_FAILED_PREFIX: &str = "Direct firmware load for ";
const LOAD_FAILED_SUFFIX: &str = " failed";

/// The file name in a `Direct firmware load for <name> failed` line.
pub fn failed_firmware_name(line: &str) -> Option<&str> {
    let start = line.find(LOAD_FAILED_PREFIX)? + LOAD_FAILED_PREFIX.len();
    let rest = &line[start..];
    // The name is never empty.
    let first = rest.chars().next()?.len_utf8();
    let end = rest[first..].find(LOAD_FAILED_SUFFIX)? + first;
    Some(&rest[..end])
}

/// Scan log lines until end of input; returns how many load failures were seen.
pub fn watch<R: BufRead>(mut reader: R, firmware_dir: &Path) -> io::Result<usize> {
    let mut failures = 0;
    let mut line = Vec::new();
    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line) {
            Ok(0) => return Ok(failures),
            Ok(_) => {}
            // The ring buffer wrapped under us; the next read resumes at the oldest record.
            Err(err) if err.kind() == io::ErrorKind::BrokenPipe => continue,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }

        let text = String::from_utf8_lossy(&line);
        if let Some(name) = failed_firmware_name(&text) {
            failures += 1;
            warn!(file = name, "kernel failed to load a firmware file");
            warn!(
                dir = %firmware_dir.display(),
                "make sure the file exists in the firmware directory"
            );
            warn!("firmware may be incomplete, or the wrong patch set was picked for this device");
        }
    }
}

/// Follow `/dev/kmsg` on a background thread for the rest of the process.
pub fn spawn_listener(firmware_dir: PathBuf) -> io::Result<JoinHandle<()>> {
    let file = File::open(KMSG_PATH)?;
    thread::Builder::new()
        .name("kmsg".to_string())
        .spawn(move || match watch(BufReader::new(file), &firmware_dir) {
            Ok(failures) => debug!(failures, "kmsg closed"),
            Err(err) => warn!(error = %err, "kmsg listener stopped"),
        })
}
