use std::path::Path;

use wmtload_patch::{bluetooth_version, build_id, validate, Patch};

use crate::cmd::InspectArgs;
use crate::exit::{io_error, CliResult, FAILURE, SUCCESS};
use crate::output::{print_reports, OutputFormat, PatchReport};

/// File name fragment of Bluetooth ROM patches, which carry a build-info block.
const BLUETOOTH_PATCH_MARKER: &str = "ram_bt";

pub fn run(args: InspectArgs, format: OutputFormat) -> CliResult<i32> {
    let mut reports = Vec::with_capacity(args.files.len());
    for path in &args.files {
        let contents = std::fs::read(path)
            .map_err(|err| io_error(&format!("reading {}", path.display()), err))?;
        reports.push(inspect(path, contents, args.fwver));
    }

    print_reports(&reports, format);

    if reports.iter().any(|report| report.error.is_some()) {
        Ok(FAILURE)
    } else {
        Ok(SUCCESS)
    }
}

fn inspect(path: &Path, contents: Vec<u8>, chip_version: Option<u16>) -> PatchReport {
    let file = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let patch = Patch::new(file.clone(), path, contents);

    let mut report = PatchReport {
        file,
        size: patch.contents.len(),
        fwver: None,
        patch_info: None,
        download_sequence: None,
        patch_count: None,
        address: None,
        rom_patch_type: None,
        build_id: build_id(&patch.contents).ok(),
        bt_version: None,
        error: None,
    };

    if report.file.contains(BLUETOOTH_PATCH_MARKER) {
        match bluetooth_version(&patch.contents) {
            Ok(version) => report.bt_version = Some(version),
            Err(err) => report.error = Some(err.to_string()),
        }
    }

    let header = match validate(&patch.contents) {
        Ok(header) => header,
        Err(err) => {
            report.error = Some(err.to_string());
            return report;
        }
    };

    let info = header.info;
    report.fwver = Some(format!("{:#06x}", header.firmware_version));
    report.patch_info = Some(
        info.as_bytes()
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect::<Vec<_>>()
            .join(" "),
    );
    report.download_sequence = Some(info.download_sequence());
    report.patch_count = Some(info.patch_count());
    report.address = Some(format!("{:#010x}", info.address()));
    report.rom_patch_type = Some(info.rom_patch_type());

    if let Some(version) = chip_version {
        if let Err(err) = patch.accept_for(i64::from(version)) {
            report.error = Some(err.to_string());
        }
    }

    report
}
