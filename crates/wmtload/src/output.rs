use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use wmtload_bringup::ChipIdentity;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// One inspected patch file.
#[derive(Debug, Serialize)]
pub struct PatchReport {
    pub file: String,
    pub size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fwver: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_sequence: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch_count: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rom_patch_type: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bt_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize)]
struct IdentityOutput {
    raw_chip_id: String,
    resolved_chip_type: Option<String>,
    soc_integrated: bool,
}

pub fn print_identity(identity: &ChipIdentity, format: OutputFormat) {
    let out = IdentityOutput {
        raw_chip_id: format!("{:#x}", identity.raw_chip_id),
        resolved_chip_type: identity.resolved_chip_type.map(|t| format!("{t:#x}")),
        soc_integrated: identity.is_soc_integrated,
    };
    let resolved = out.resolved_chip_type.as_deref().unwrap_or("unresolved");

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["CHIP ID", "CHIP TYPE", "SOC"])
                .add_row(vec![
                    out.raw_chip_id.clone(),
                    resolved.to_string(),
                    out.soc_integrated.to_string(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("Chip:");
            println!("  Raw chip id:   {}", out.raw_chip_id);
            println!("  Chip type:     {resolved}");
            println!("  SoC:           {}", out.soc_integrated);
        }
    }
}

pub fn print_reports(reports: &[PatchReport], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(reports).unwrap_or_else(|_| "[]".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FILE", "FWVER", "SEQ", "COUNT", "ADDRESS", "BUILD", "STATUS"]);
            for report in reports {
                table.add_row(vec![
                    report.file.clone(),
                    cell(&report.fwver),
                    cell(&report.download_sequence),
                    cell(&report.patch_count),
                    cell(&report.address),
                    cell(&report.build_id.as_deref().map(str::trim_end)),
                    report.error.clone().unwrap_or_else(|| "ok".to_string()),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for report in reports {
                println!("{} ({} bytes)", report.file, report.size);
                if let Some(error) = &report.error {
                    println!("  error:      {error}");
                }
                if let Some(fwver) = &report.fwver {
                    println!("  fwver:      {fwver}");
                }
                if let Some(info) = &report.patch_info {
                    println!("  patch info: {info}");
                }
                if let Some(address) = &report.address {
                    println!("  address:    {address}");
                }
                if let Some(build_id) = &report.build_id {
                    println!("  build id:   {}", build_id.trim_end());
                }
                if let Some(version) = &report.bt_version {
                    println!("  bt version: {version}");
                }
            }
        }
    }
}

fn cell<T: ToString>(value: &Option<T>) -> String {
    value
        .as_ref()
        .map_or_else(|| "-".to_string(), ToString::to_string)
}
