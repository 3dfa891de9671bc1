//! Human-readable strings embedded in patch files.

use crate::error::{PatchError, Result};

const BUILD_INFO_START: &[u8] = b"BABEFACE";
const BUILD_INFO_END: &[u8] = b"DEADBEEF";
const NEPTUNE_MARKER: &[u8] = b"t-neptune";
const DEBUG_MARKER: &[u8] = b"= debug";
const DEBUG_WINDOW_LEN: usize = 0xE;
const BUILD_ID_LEN: usize = 0x10;

/// Bluetooth firmware version string from a `ram_bt` patch.
///
/// The string lives in the `BABEFACE`..`DEADBEEF` build-info block. Release
/// builds carry a `t-neptune` tag line; debug builds only carry `= debug`, in
/// which case the version is read from the fixed 14-byte window at the start
/// of the file. Either way the string ends at the first line feed.
pub fn bluetooth_version(contents: &[u8]) -> Result<String> {
    let start = find(contents, BUILD_INFO_START, 0)
        .ok_or_else(|| malformed("build info start marker BABEFACE not found"))?;
    let end = find(contents, BUILD_INFO_END, start)
        .ok_or_else(|| malformed("build info end marker DEADBEEF not found"))?;

    let window = match find(contents, NEPTUNE_MARKER, start) {
        Some(pos) if pos <= end => &contents[pos..end],
        Some(_) => return Err(malformed("t-neptune tag lies outside the build info block")),
        None => {
            if find(contents, DEBUG_MARKER, start).is_none() {
                return Err(malformed("no t-neptune or debug tag in build info"));
            }
            &contents[..DEBUG_WINDOW_LEN.min(contents.len())]
        }
    };

    let line_end = window
        .iter()
        .position(|&b| b == b'\n')
        .ok_or_else(|| malformed("firmware version is not terminated by a line feed"))?;

    decode(&window[..line_end])
}

/// The build identifier in the first 16 bytes of every patch.
pub fn build_id(contents: &[u8]) -> Result<String> {
    if contents.len() < BUILD_ID_LEN {
        return Err(malformed("file shorter than the build id"));
    }
    decode(&contents[..BUILD_ID_LEN])
}

fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    haystack
        .get(from..)?
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|pos| pos + from)
}

fn decode(bytes: &[u8]) -> Result<String> {
    String::from_utf8(bytes.to_vec()).map_err(|err| malformed(&format!("not valid text: {err}")))
}

fn malformed(reason: &str) -> PatchError {
    PatchError::Malformed(reason.to_string())
}
