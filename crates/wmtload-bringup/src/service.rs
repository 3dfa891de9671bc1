//! The launcher's patch request loop.
//!
//! The driver writes a short token naming what it wants (`srh_patch` or
//! `srh_rom_patch`); the launcher looks up the patches for the live chip,
//! tells the driver about each one through control calls, and answers
//! `ok` or `fail` on the same node.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};
use wmtload_ioctl::{ControlDevice, DeviceError, IoctlArg};
use wmtload_patch::{
    build_patch_request, build_rom_patch_request, patch_glob, rom_patch_glob, Patch, PatchHeader,
};

use crate::commands::{wmt, ChipInfo};
use crate::error::{BringupError, Result};
use crate::session::BringupSession;

pub const SEARCH_PATCH: &[u8] = b"srh_patch";
pub const SEARCH_ROM_PATCH: &[u8] = b"srh_rom_patch";
pub const RESPONSE_OK: &[u8] = b"ok";
pub const RESPONSE_FAIL: &[u8] = b"fail";

/// Every read from and write to the node is this size; responses are NUL-padded.
pub const MESSAGE_LEN: usize = 256;

/// A request token read from the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchRequest {
    Patch,
    RomPatch,
}

impl PatchRequest {
    /// Parse a token as read from the device. Trailing NULs are ignored.
    pub fn parse(token: &[u8]) -> Result<Self> {
        let end = token
            .iter()
            .rposition(|&b| b != 0)
            .map_or(0, |pos| pos + 1);
        match &token[..end] {
            SEARCH_PATCH => Ok(Self::Patch),
            SEARCH_ROM_PATCH => Ok(Self::RomPatch),
            other => Err(BringupError::UnknownRequest(
                String::from_utf8_lossy(other).into_owned(),
            )),
        }
    }
}

/// Serves patch requests until shutdown is requested or the device hangs up.
pub struct PatchRequestLoop<D> {
    session: Arc<BringupSession<D>>,
    shutdown: Arc<AtomicBool>,
}

impl<D: ControlDevice> PatchRequestLoop<D> {
    pub fn new(session: Arc<BringupSession<D>>, shutdown: Arc<AtomicBool>) -> Self {
        Self { session, shutdown }
    }

    /// Run the loop.
    ///
    /// Returns `Ok(())` once shutdown is observed. End-of-file on the device
    /// is [`DeviceError::Closed`].
    pub fn run(&self) -> Result<()> {
        let device = self.session.device();
        let poll = Some(self.session.config().poll_interval);
        let mut buf = [0u8; MESSAGE_LEN];

        info!("waiting for patch requests");
        while !self.shutdown.load(Ordering::Acquire) {
            if !device.wait_readable(poll)? {
                continue;
            }

            let n = device.read(&mut buf)?;
            if n == 0 {
                return Err(DeviceError::Closed.into());
            }

            let response = self.respond(&buf[..n]);
            let mut reply = [0u8; MESSAGE_LEN];
            reply[..response.len()].copy_from_slice(response);
            device.write_all(&reply)?;
        }

        debug!("patch request loop stopped");
        Ok(())
    }

    /// Handle one token and pick the response. Failures are logged here.
    pub fn respond(&self, token: &[u8]) -> &'static [u8] {
        match PatchRequest::parse(token).and_then(|request| self.serve(request)) {
            Ok(count) => {
                info!(count, "patch request served");
                RESPONSE_OK
            }
            Err(err) => {
                warn!(error = %err, "patch request failed");
                RESPONSE_FAIL
            }
        }
    }

    /// Serve one request; returns how many patches were announced.
    pub fn serve(&self, request: PatchRequest) -> Result<usize> {
        debug!(?request, "serving patch request");
        // Queried per request: the chip may have been re-enumerated since startup.
        let chip_id = self
            .session
            .call("query chip id", wmt::WMT_QUERY_CHIPID, IoctlArg::None)?
            as u32;
        let chip_version = self.session.call(
            "query firmware version",
            wmt::GET_CHIP_INFO,
            IoctlArg::Int(ChipInfo::MappingHwVersion.selector()),
        )?;
        debug!(
            chip_id = format_args!("{chip_id:#x}"),
            fwver = format_args!("{chip_version:#x}"),
            "live chip"
        );

        match request {
            PatchRequest::Patch => self.serve_patches(chip_id, chip_version),
            PatchRequest::RomPatch => self.serve_rom_patches(chip_id, chip_version),
        }
    }

    fn serve_patches(&self, chip_id: u32, chip_version: i64) -> Result<usize> {
        let accepted = self.accepted(&patch_glob(chip_id)?, chip_version)?;

        let records = accepted
            .iter()
            .map(|(patch, header)| build_patch_request(&header.info, &patch.filename))
            .collect::<wmtload_patch::Result<Vec<_>>>()?;

        if !self.session.patch_count_sent() {
            let count = accepted[0].1.info.patch_count();
            self.session.call(
                "set patch count",
                wmt::SET_PATCH_NUM,
                IoctlArg::Int(u64::from(count)),
            )?;
            self.session.mark_patch_count_sent();
            debug!(count, "told driver the patch count");
        }

        for ((patch, _), record) in accepted.iter().zip(&records) {
            self.session
                .call("set patch info", wmt::SET_PATCH_INFO, IoctlArg::Buffer(record))?;
            info!(patch = %patch.filename, "announced patch");
        }
        Ok(records.len())
    }

    fn serve_rom_patches(&self, chip_id: u32, chip_version: i64) -> Result<usize> {
        let accepted = self.accepted(&rom_patch_glob(chip_id), chip_version)?;

        let records = accepted
            .iter()
            .map(|(patch, header)| build_rom_patch_request(&header.info, &patch.filename))
            .collect::<wmtload_patch::Result<Vec<_>>>()?;

        for ((patch, _), record) in accepted.iter().zip(&records) {
            self.session.call(
                "set ROM patch info",
                wmt::SET_ROM_PATCH_INFO,
                IoctlArg::Buffer(record),
            )?;
            info!(patch = %patch.filename, "announced ROM patch");
        }
        Ok(records.len())
    }

    /// Every match, validated against the chip's firmware version.
    ///
    /// One bad candidate rejects the whole set, before anything is sent.
    fn accepted(&self, pattern: &str, chip_version: i64) -> Result<Vec<(Patch, PatchHeader)>> {
        let patches = self.session.store().find(pattern)?;
        let mut accepted = Vec::with_capacity(patches.len());
        for patch in patches {
            let header = patch.accept_for(chip_version)?;
            accepted.push((patch, header));
        }
        Ok(accepted)
    }
}
