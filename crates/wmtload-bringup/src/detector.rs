use tracing::{debug, info, warn};
#[cfg(unix)]
use wmtload_ioctl::CharDevice;
use wmtload_ioctl::{invoke, ControlDevice, IoctlArg, RawReturn};

use crate::commands::detect;
use crate::config::DetectorConfig;
use crate::error::{BringupError, Result};
use crate::identity::{resolve_chip_type, ChipIdentity};

/// Power-on reply that means "SoC-integrated chip, nothing to power".
const SOC_CHIP: i64 = -1;
/// Allow-list reply from hardware init: a persisted chip id should be consulted.
const HW_INIT_ALLOW_LIST: i64 = 0;
/// A-die id reply that aborts detection.
const ADIE_READ_FAILED: i64 = -1;

/// One detection pass over `/dev/wmtdetect`.
///
/// The device is consumed and closed when [`Detector::run`] returns.
pub struct Detector<D> {
    device: D,
}

/// Open the detection node write-only and run one pass.
#[cfg(unix)]
pub fn detect(config: &DetectorConfig) -> Result<ChipIdentity> {
    let device = CharDevice::open_write_only(&config.device_path)?;
    Detector::new(device).run()
}

impl<D: ControlDevice> Detector<D> {
    pub fn new(device: D) -> Self {
        Self { device }
    }

    /// Identify, power and re-initialize the chip.
    pub fn run(self) -> Result<ChipIdentity> {
        self.hw_init();

        let is_soc_integrated = self.power_on()?;
        // Only the low 32 bits of the reply are meaningful.
        let raw_chip_id =
            invoke(&self.device, detect::GET_SOC_CHIP_ID, IoctlArg::None).raw() as u32;
        info!(chip_id = format_args!("{raw_chip_id:#x}"), "read chip id");

        let ack = invoke(
            &self.device,
            detect::SET_CHIP_ID,
            IoctlArg::Int(u64::from(raw_chip_id)),
        )
        .raw();
        let resolved_chip_type = resolve_chip_type(ack, raw_chip_id);

        match resolved_chip_type {
            Some(chip_type) => self.reinit_modules(chip_type),
            None => warn!(ack, "driver rejected the chip id, skipping module init"),
        }

        self.read_adie_id()?;

        Ok(ChipIdentity {
            raw_chip_id,
            resolved_chip_type,
            is_soc_integrated,
        })
    }

    fn hw_init(&self) {
        if invoke(&self.device, detect::SOC_HW_INIT, IoctlArg::None).raw() == HW_INIT_ALLOW_LIST {
            warn!("hardware init asked for the persisted chip id allow-list, not supported");
        }
    }

    /// Returns whether the chip is SoC-integrated.
    fn power_on(&self) -> Result<bool> {
        match invoke(&self.device, detect::EXT_CHIP_PWR_ON, IoctlArg::None).raw() {
            SOC_CHIP => {
                debug!("SoC-integrated chip, no external power-on needed");
                Ok(true)
            }
            0 => {
                debug!("external combo chip sequencing is not supported");
                Err(BringupError::ControlCall {
                    step: "external chip power-on",
                    code: 0,
                })
            }
            code => Err(BringupError::ControlCall {
                step: "external chip power-on",
                code,
            }),
        }
    }

    fn reinit_modules(&self, chip_type: u32) {
        let arg = IoctlArg::Int(u64::from(chip_type));

        let cleanup = invoke(&self.device, detect::MODULE_CLEANUP, arg).raw();
        if cleanup != 0 {
            warn!(
                chip_type = format_args!("{chip_type:#x}"),
                result = cleanup,
                "module cleanup failed"
            );
        }

        let init = invoke(&self.device, detect::DO_MODULE_INIT, arg).raw();
        if init != 0 {
            warn!(
                chip_type = format_args!("{chip_type:#x}"),
                result = init,
                "module init failed"
            );
        } else {
            info!(chip_type = format_args!("{chip_type:#x}"), "modules initialized");
        }
    }

    fn read_adie_id(&self) -> Result<()> {
        let adie = invoke(&self.device, detect::GET_ADIE_CHIP_ID, IoctlArg::Int(0)).raw();
        if adie == ADIE_READ_FAILED {
            return Err(BringupError::ControlCall {
                step: "read A-die chip id",
                code: adie,
            });
        }
        debug!(adie_chip_id = format_args!("{adie:#x}"), "read A-die chip id");
        Ok(())
    }
}
