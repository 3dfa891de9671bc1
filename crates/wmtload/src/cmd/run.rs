use tracing::info;

use crate::cmd::{detect, launch, RunArgs};
use crate::exit::CliResult;

pub fn run(args: RunArgs) -> CliResult<i32> {
    let identity = if args.skip_detect {
        info!("skipping detection");
        None
    } else {
        Some(detect::identify(&args.detect)?)
    };

    launch::serve(&args.launcher, identity)
}
