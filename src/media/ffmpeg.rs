use anyhow::{bail, Result};
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::Path;
use std::process::Command;

use crate::workflows::executor::PlannedCommand;

/// Runs ffprobe over the subtitle streams of `path` and returns its JSON report.
pub fn get_streams_json(ffprobe: &str, path: &Path) -> Result<Vec<u8>> {
    let output = Command::new(ffprobe)
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_streams",
            "-select_streams",
            "s",
        ])
        .arg(path)
        .output();

    let output = match output {
        Ok(output) => output,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            bail!("{ffprobe} not found. Please install ffmpeg and ensure it's in your PATH.");
        }
        Err(e) => bail!("Failed to execute {ffprobe}: {e}"),
    };

    if !output.status.success() {
        bail!(
            "ffprobe failed on {path:?}: {}",
            String::from_utf8_lossy(&output.stderr)
        );
    }

    Ok(output.stdout)
}

/// Copies stream `track_index` of `input_path` into `output_name` without
/// re-encoding, refusing to overwrite an existing output.
pub fn subtitle_copy_command(
    ffmpeg: &str,
    input_path: &Path,
    track_index: u32,
    output_name: &str,
) -> PlannedCommand {
    PlannedCommand::new(
        ffmpeg,
        [
            OsString::from("-i"),
            input_path.as_os_str().to_os_string(),
            OsString::from("-n"),
            OsString::from("-codec"),
            OsString::from("copy"),
            OsString::from("-map"),
            OsString::from(format!(":{track_index}")),
            OsString::from(output_name),
        ],
    )
}

/// Dumps every attachment of `input_path` into `dest_dir`, each named after
/// its embedded filename tag. `input_path` must be absolute since the command
/// runs inside `dest_dir`.
///
/// ffmpeg refuses to run without an output, so a zero-length null output
/// follows the input; otherwise every successful dump would exit non-zero.
pub fn dump_attachments_command(ffmpeg: &str, input_path: &Path, dest_dir: &Path) -> PlannedCommand {
    PlannedCommand::new(
        ffmpeg,
        [
            OsString::from("-dump_attachment:t"),
            OsString::new(),
            OsString::from("-n"),
            OsString::from("-i"),
            input_path.as_os_str().to_os_string(),
            OsString::from("-t"),
            OsString::from("0"),
            OsString::from("-f"),
            OsString::from("null"),
            OsString::from("-"),
        ],
    )
    .in_dir(dest_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_subtitle_copy_command() {
        let command = subtitle_copy_command(
            "ffmpeg",
            Path::new("/v/Show 01 raw.mkv"),
            2,
            "Show 01 raw.ja.srt",
        );
        assert_eq!(command.program, "ffmpeg");
        assert_eq!(
            command.args,
            vec![
                "-i",
                "/v/Show 01 raw.mkv",
                "-n",
                "-codec",
                "copy",
                "-map",
                ":2",
                "Show 01 raw.ja.srt"
            ]
        );
        assert_eq!(command.working_dir, None);
    }

    #[test]
    fn test_dump_attachments_command() {
        let command = dump_attachments_command(
            "/opt/ffmpeg",
            Path::new("/v/Show 01 raw.mkv"),
            Path::new("/v/fonts-Show 01 raw"),
        );
        assert_eq!(command.program, "/opt/ffmpeg");
        assert_eq!(
            command.args,
            vec![
                "-dump_attachment:t",
                "",
                "-n",
                "-i",
                "/v/Show 01 raw.mkv",
                "-t",
                "0",
                "-f",
                "null",
                "-"
            ]
        );
        assert_eq!(
            command.working_dir,
            Some(PathBuf::from("/v/fonts-Show 01 raw"))
        );
    }
}
