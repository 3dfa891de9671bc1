use clap::{Args, Subcommand};
use std::path::PathBuf;

use wmtload_bringup::{DetectorConfig, LauncherConfig};
use wmtload_patch::DEFAULT_FIRMWARE_DIR;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod detect;
pub mod inspect;
pub mod launch;
pub mod run;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Detect the chip, then run the launcher until interrupted.
    Run(RunArgs),
    /// Run the detection pass only and print the chip identity.
    Detect(DetectArgs),
    /// Run the launcher only (detection already done).
    Launch(LauncherArgs),
    /// Print header fields and embedded metadata of patch files.
    Inspect(InspectArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Run(args) => run::run(args),
        Command::Detect(args) => detect::run(args, format),
        Command::Launch(args) => launch::run(args),
        Command::Inspect(args) => inspect::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct DetectArgs {
    /// Detection device node.
    #[arg(
        long,
        value_name = "PATH",
        default_value = wmtload_bringup::commands::detect::DEVICE_PATH
    )]
    pub detect_device: PathBuf,
}

impl DetectArgs {
    pub fn to_config(&self) -> DetectorConfig {
        DetectorConfig {
            device_path: self.detect_device.clone(),
        }
    }
}

#[derive(Args, Debug)]
pub struct LauncherArgs {
    /// WMT core device node.
    #[arg(
        long,
        value_name = "PATH",
        default_value = wmtload_bringup::commands::wmt::DEVICE_PATH
    )]
    pub wmt_device: PathBuf,
    /// Directory searched for patch files.
    #[arg(
        long,
        value_name = "DIR",
        env = "WMTLOAD_FIRMWARE_DIR",
        default_value = DEFAULT_FIRMWARE_DIR
    )]
    pub firmware_dir: PathBuf,
    /// Config file name handed to the driver.
    #[arg(long, value_name = "NAME", default_value = "WMT_SOC.cfg")]
    pub cfg_name: String,
    /// UART baud rate.
    #[arg(long, default_value_t = 4_000_000)]
    pub baudrate: u32,
    /// Power-on attempts before giving up.
    #[arg(long, default_value_t = 20)]
    pub power_on_attempts: u32,
    /// Do not watch the kernel log for failed firmware loads.
    #[arg(long)]
    pub no_kmsg: bool,
}

impl LauncherArgs {
    pub fn to_config(&self) -> LauncherConfig {
        LauncherConfig {
            device_path: self.wmt_device.clone(),
            firmware_dir: self.firmware_dir.clone(),
            cfg_name: self.cfg_name.clone(),
            baudrate: self.baudrate,
            power_on_attempts: self.power_on_attempts,
            ..LauncherConfig::default()
        }
    }
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Skip detection; the launcher uses the chip id the driver reports.
    #[arg(long)]
    pub skip_detect: bool,
    #[command(flatten)]
    pub detect: DetectArgs,
    #[command(flatten)]
    pub launcher: LauncherArgs,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Patch files to inspect.
    #[arg(required = true, value_name = "FILE")]
    pub files: Vec<PathBuf>,
    /// Also check each patch against this chip firmware version (hex).
    #[arg(long, value_name = "HEX", value_parser = parse_hex_u16)]
    pub fwver: Option<u16>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

fn parse_hex_u16(input: &str) -> Result<u16, String> {
    let digits = input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
        .unwrap_or(input);
    u16::from_str_radix(digits, 16)
        .map_err(|err| format!("invalid firmware version {input:?}: {err}"))
}
