use std::thread;
use std::time::Duration;

use tracing::{error, info, warn};
use wmtload_ioctl::{ControlDevice, IoctlArg, RawReturn, SharedDevice};

use crate::commands::wmt;

const POWER_ON: u64 = 1;
const POWER_OFF: u64 = 0;

/// How the power-on loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerOnOutcome {
    PoweredOn { attempts: u32 },
    /// Every attempt failed; the chip stays off.
    GaveUp { attempts: u32 },
}

/// Power the chip on, backing off and retrying on failure.
///
/// Each failed attempt is followed by an explicit power-off and a pause.
/// Running out of attempts is logged, not returned as an error.
pub fn power_on_retry_loop<D: ControlDevice>(
    device: &SharedDevice<D>,
    max_attempts: u32,
    backoff: Duration,
) -> PowerOnOutcome {
    for attempt in 1..=max_attempts {
        let result = device
            .invoke(wmt::LPBK_POWER_CTRL, IoctlArg::Int(POWER_ON))
            .raw();
        if result == 0 {
            info!(attempt, "chip powered on");
            return PowerOnOutcome::PoweredOn { attempts: attempt };
        }

        let _ = device.invoke(wmt::LPBK_POWER_CTRL, IoctlArg::Int(POWER_OFF));
        warn!(attempt, result, "power-on failed, retrying in {backoff:?}");
        thread::sleep(backoff);
    }

    error!(attempts = max_attempts, "giving up on power-on, chip left off");
    PowerOnOutcome::GaveUp {
        attempts: max_attempts,
    }
}

#[cfg(test)]
mod tests {
    use wmtload_ioctl::OsErrorCode;

    use super::*;
    use crate::mock::{CallArg, MockDevice};

    #[test]
    fn succeeds_on_first_attempt() {
        let device = SharedDevice::new(MockDevice::new());

        let outcome = power_on_retry_loop(&device, 20, Duration::ZERO);
        assert_eq!(outcome, PowerOnOutcome::PoweredOn { attempts: 1 });
        assert_eq!(
            device.get_ref().calls_to(wmt::LPBK_POWER_CTRL),
            [CallArg::Int(1)]
        );
    }

    #[test]
    fn retries_with_power_off_between_attempts() {
        let device = SharedDevice::new(MockDevice::new());
        device.get_ref().answer(
            wmt::LPBK_POWER_CTRL,
            &[Err(OsErrorCode(5)), Ok(0), Ok(3), Ok(0), Ok(0)],
        );

        let outcome = power_on_retry_loop(&device, 20, Duration::ZERO);
        assert_eq!(outcome, PowerOnOutcome::PoweredOn { attempts: 3 });
        assert_eq!(
            device.get_ref().calls_to(wmt::LPBK_POWER_CTRL),
            [
                CallArg::Int(1),
                CallArg::Int(0),
                CallArg::Int(1),
                CallArg::Int(0),
                CallArg::Int(1),
            ]
        );
    }

    #[test]
    fn gives_up_after_twenty_attempts() {
        let device = SharedDevice::new(MockDevice::new());
        device
            .get_ref()
            .always(wmt::LPBK_POWER_CTRL, Err(OsErrorCode(5)));

        let outcome = power_on_retry_loop(&device, 20, Duration::ZERO);
        assert_eq!(outcome, PowerOnOutcome::GaveUp { attempts: 20 });

        let calls = device.get_ref().calls_to(wmt::LPBK_POWER_CTRL);
        let on = calls.iter().filter(|arg| arg.int() == POWER_ON).count();
        let off = calls.iter().filter(|arg| arg.int() == POWER_OFF).count();
        assert_eq!((on, off), (20, 20));
    }
}
