use tracing::info;
use wmtload_bringup::ChipIdentity;

use crate::cmd::DetectArgs;
use crate::exit::{bringup_error, CliResult, SUCCESS};
use crate::output::{print_identity, OutputFormat};

pub fn run(args: DetectArgs, format: OutputFormat) -> CliResult<i32> {
    let identity = identify(&args)?;
    print_identity(&identity, format);
    Ok(SUCCESS)
}

/// Run one detection pass; any failure is fatal.
pub fn identify(args: &DetectArgs) -> CliResult<ChipIdentity> {
    let identity = wmtload_bringup::detect(&args.to_config())
        .map_err(|err| bringup_error("detection failed", err))?;
    info!(
        chip_id = format_args!("{:#x}", identity.raw_chip_id),
        chip_type = ?identity.resolved_chip_type,
        soc = identity.is_soc_integrated,
        "detection done"
    );
    Ok(identity)
}
