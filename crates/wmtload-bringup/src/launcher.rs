use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, info, warn};
#[cfg(unix)]
use wmtload_ioctl::CharDevice;
use wmtload_ioctl::{ControlCommand, ControlDevice, IoctlArg, RawReturn, SharedDevice};

use crate::commands::{wmt, ChipInfo};
use crate::config::LauncherConfig;
use crate::error::{BringupError, Result};
use crate::identity::ChipIdentity;
use crate::power::{power_on_retry_loop, PowerOnOutcome};
use crate::service::PatchRequestLoop;
use crate::session::BringupSession;

/// Chip id query reply while the driver is still probing.
const CHIP_ID_NOT_READY: i64 = -1;
const DEFAULT_STP_MODE: u8 = 3;
const ALTERNATE_STP_FAMILY_BASE: u32 = 0x6620;
const ALTERNATE_STP_FAMILY_MASK: u32 = 0x311;

/// Whether the vendor launcher would pick STP mode 4 for this chip.
///
/// Reverse-engineered from the vendor binary and unverified on hardware. What
/// mode 4 means, and which chips really need it, is not known.
pub fn uses_alternate_stp_mode(chip_id: u32) -> bool {
    let index = chip_id.wrapping_sub(ALTERNATE_STP_FAMILY_BASE).rotate_right(1);
    index < 10 && (1u32 << index) & ALTERNATE_STP_FAMILY_MASK != 0
}

/// Pack the transport configuration for `WMT_IOCTL_SET_STP_MODE`.
///
/// Layout: baud rate in bits 8 and up, FM mode in bits 4..8, STP mode in bits 0..4.
pub fn mode_word(baudrate: u32, fm_mode: u8, stp_mode: u8) -> u64 {
    (u64::from(baudrate) << 8) | (u64::from(fm_mode & 0xF) << 4) | u64::from(stp_mode & 0xF)
}

/// Configures `/dev/stpwmt` and starts the launcher workers.
pub struct Launcher<D> {
    device: SharedDevice<D>,
    config: LauncherConfig,
    shutdown: Arc<AtomicBool>,
}

#[cfg(unix)]
impl Launcher<CharDevice> {
    /// Open the WMT node read-write.
    pub fn open(config: LauncherConfig) -> Result<Self> {
        let device = CharDevice::open_read_write(&config.device_path)?;
        Ok(Self::new(device, config))
    }
}

impl<D: ControlDevice + 'static> Launcher<D> {
    pub fn new(device: D, config: LauncherConfig) -> Self {
        Self {
            device: SharedDevice::new(device),
            config,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Share a shutdown flag, e.g. one set from a signal handler.
    pub fn with_shutdown(mut self, shutdown: Arc<AtomicBool>) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn config(&self) -> &LauncherConfig {
        &self.config
    }

    /// Query the chip id until the driver has one.
    ///
    /// Retries without bound; only a shutdown request ends the wait early.
    pub fn wait_for_chip_id(&self) -> Result<u32> {
        loop {
            let result = self.device.invoke(wmt::WMT_QUERY_CHIPID, IoctlArg::None);
            let chip_id = result.raw();
            if let Err(code) = result {
                if chip_id != CHIP_ID_NOT_READY {
                    warn!(error = %code, "chip id query failed, using its return value");
                }
            }
            if chip_id != CHIP_ID_NOT_READY {
                // The id is a 32-bit value on the driver side.
                return Ok(chip_id as u32);
            }
            if self.shutdown.load(Ordering::Acquire) {
                return Err(BringupError::ShutdownRequested);
            }
            debug!(
                "chip id not available yet, retrying in {:?}",
                self.config.chip_id_backoff
            );
            thread::sleep(self.config.chip_id_backoff);
        }
    }

    /// Tell the driver the config name and transport mode, then release it.
    ///
    /// Returns the mode word sent. The first failed call ends configuration.
    pub fn configure(&self, chip_id: u32) -> Result<u64> {
        if uses_alternate_stp_mode(chip_id) {
            return Err(BringupError::Unsupported("STP mode 4"));
        }

        let mode = mode_word(self.config.baudrate, self.config.fm_mode, DEFAULT_STP_MODE);
        let cfg_name = self.config.cfg_name.as_bytes();

        self.call("set config name", wmt::SET_PATCH_NAME, IoctlArg::Buffer(cfg_name))?;
        self.call("set STP mode", wmt::SET_STP_MODE, IoctlArg::Int(mode))?;
        self.call("signal launcher ready", wmt::SET_LAUNCHER_KILL, IoctlArg::None)?;

        info!(
            cfg = %self.config.cfg_name,
            mode = format_args!("{mode:#x}"),
            "launcher configured"
        );
        Ok(mode)
    }

    fn call(
        &self,
        step: &'static str,
        command: ControlCommand,
        arg: IoctlArg<'_>,
    ) -> Result<i64> {
        self.device
            .invoke(command, arg)
            .map_err(|source| BringupError::Os { step, source })
    }

    /// Configure the driver and spawn the power-on and patch request workers.
    ///
    /// `identity` comes from detection; without it the live chip id is used.
    pub fn start(self, identity: Option<ChipIdentity>) -> Result<RunningLauncher<D>> {
        let chip_id = self.wait_for_chip_id()?;
        let fwver = self
            .device
            .invoke(
                wmt::GET_CHIP_INFO,
                IoctlArg::Int(ChipInfo::MappingHwVersion.selector()),
            )
            .raw();
        info!(
            chip_id = format_args!("{chip_id:#x}"),
            fwver = format_args!("{fwver:#x}"),
            "launcher found chip"
        );

        let identity = match identity {
            Some(identity) => {
                if identity.raw_chip_id != chip_id {
                    warn!(
                        detected = format_args!("{:#x}", identity.raw_chip_id),
                        live = format_args!("{chip_id:#x}"),
                        "launcher sees a different chip id than detection"
                    );
                }
                identity
            }
            None => ChipIdentity::unresolved(chip_id),
        };

        self.configure(chip_id)?;

        let session = Arc::new(BringupSession::new(self.device, identity, self.config));

        let power_session = Arc::clone(&session);
        let power = thread::Builder::new()
            .name("wmt-power".to_string())
            .spawn(move || {
                let config = power_session.config();
                power_on_retry_loop(
                    power_session.device(),
                    config.power_on_attempts,
                    config.power_on_backoff,
                )
            })?;

        let requests = PatchRequestLoop::new(Arc::clone(&session), Arc::clone(&self.shutdown));
        let service = thread::Builder::new()
            .name("wmt-patch".to_string())
            .spawn(move || requests.run())?;

        Ok(RunningLauncher {
            session,
            shutdown: self.shutdown,
            power,
            service,
        })
    }
}

/// Handles to a started launcher.
pub struct RunningLauncher<D> {
    session: Arc<BringupSession<D>>,
    shutdown: Arc<AtomicBool>,
    power: JoinHandle<PowerOnOutcome>,
    service: JoinHandle<Result<()>>,
}

impl<D> RunningLauncher<D> {
    pub fn session(&self) -> &Arc<BringupSession<D>> {
        &self.session
    }

    /// Ask the patch request loop to stop at its next poll.
    pub fn request_shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
    }

    /// Wait for both workers.
    ///
    /// The request loop runs until shutdown or until the device hangs up;
    /// its error, if any, is returned.
    pub fn join(self) -> Result<PowerOnOutcome> {
        let outcome = self
            .power
            .join()
            .map_err(|_| BringupError::WorkerPanicked("power-on"))?;
        self.service
            .join()
            .map_err(|_| BringupError::WorkerPanicked("patch request"))??;
        Ok(outcome)
    }
}
