// Vendor tool invocation - NVS image generation and partition flashing.
//
// Both steps shell out to the ESP-IDF Python tools. Children run to
// completion with captured output; a non-zero exit is an error carrying
// the tool's stderr, not a printed status code.

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{bail, Context, Result};
use tracing::debug;

use crate::settings::{Settings, NVS_PARTITION_SIZE, PARTITION_NAME};

const PYTHON: &str = "python3";

fn generator_script(idf_path: &Path) -> PathBuf {
    idf_path.join("components/nvs_flash/nvs_partition_generator/nvs_partition_gen.py")
}

fn parttool_script(idf_path: &Path) -> PathBuf {
    idf_path.join("components/partition_table/parttool.py")
}

fn run_tool(name: &str, cmd: &mut Command) -> Result<()> {
    debug!(tool = name, ?cmd, "running");
    let output = cmd
        .output()
        .with_context(|| format!("failed to run {name}"))?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    debug!(tool = name, status = %output.status, %stdout, %stderr, "finished");

    if !output.status.success() {
        bail!("{name} failed ({}): {}", output.status, stderr.trim());
    }
    Ok(())
}

/// Converts the rendered CSV into a binary NVS image sized to the
/// reserved partition.
pub fn generate_image(idf_path: &Path, settings: &Settings) -> Result<()> {
    let script = generator_script(idf_path);
    let mut cmd = Command::new(PYTHON);
    cmd.arg(&script)
        .arg("generate")
        .arg(&settings.csv_file)
        .arg(&settings.bin_file)
        .arg(format!("{NVS_PARTITION_SIZE:#x}"));
    run_tool("nvs_partition_gen.py", &mut cmd)
}

/// Writes the image into the dev_config partition over the serial port.
/// Overwrites the partition on the device; there is no rollback.
pub fn flash_image(idf_path: &Path, settings: &Settings, port: &str) -> Result<()> {
    let script = parttool_script(idf_path);
    let mut cmd = Command::new(PYTHON);
    cmd.arg(&script)
        .arg("--port")
        .arg(port)
        .arg("write_partition")
        .arg(format!("--partition-name={PARTITION_NAME}"))
        .arg("--input")
        .arg(&settings.bin_file);
    run_tool("parttool.py", &mut cmd)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_paths_live_under_idf() {
        let idf = Path::new("/opt/esp-idf");
        assert_eq!(
            generator_script(idf),
            Path::new("/opt/esp-idf/components/nvs_flash/nvs_partition_generator/nvs_partition_gen.py")
        );
        assert_eq!(
            parttool_script(idf),
            Path::new("/opt/esp-idf/components/partition_table/parttool.py")
        );
    }

    #[test]
    fn test_run_tool_succeeds_on_zero_exit() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "echo ok"]);
        assert!(run_tool("sh", &mut cmd).is_ok());
    }

    #[test]
    fn test_run_tool_reports_nonzero_exit_with_stderr() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "echo boom >&2; exit 3"]);
        let err = run_tool("sh", &mut cmd).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("sh failed"));
        assert!(msg.contains("boom"));
    }

    #[test]
    fn test_run_tool_reports_missing_binary() {
        let mut cmd = Command::new("definitely-not-a-real-tool");
        let err = run_tool("definitely-not-a-real-tool", &mut cmd).unwrap_err();
        assert!(err.to_string().contains("failed to run"));
    }
}
