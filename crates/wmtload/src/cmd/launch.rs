use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{info, warn};
use wmtload_bringup::{ChipIdentity, Launcher};

use crate::cmd::LauncherArgs;
use crate::exit::{bringup_error, CliError, CliResult, FAILURE, SUCCESS};
use crate::kmsg;

pub fn run(args: LauncherArgs) -> CliResult<i32> {
    serve(&args, None)
}

/// Start the launcher and block until Ctrl-C or until the driver hangs up.
pub fn serve(args: &LauncherArgs, identity: Option<ChipIdentity>) -> CliResult<i32> {
    let shutdown = Arc::new(AtomicBool::new(false));
    install_ctrlc_handler(shutdown.clone())?;

    if !args.no_kmsg {
        if let Err(err) = kmsg::spawn_listener(args.firmware_dir.clone()) {
            warn!(error = %err, "kmsg listener not started");
        }
    }

    let launcher = Launcher::open(args.to_config())
        .map_err(|err| bringup_error("launcher failed", err))?
        .with_shutdown(shutdown);
    let running = launcher
        .start(identity)
        .map_err(|err| bringup_error("launcher failed", err))?;

    let outcome = running
        .join()
        .map_err(|err| bringup_error("launcher stopped", err))?;
    info!(?outcome, "launcher stopped");
    Ok(SUCCESS)
}

fn install_ctrlc_handler(shutdown: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        shutdown.store(true, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(FAILURE, format!("signal handler setup failed: {err}")))
}
