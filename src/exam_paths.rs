//
// exam_paths.rs
// Dicom-Tagfix
//
// Wrapper around the scanner-side `pathExtract` tool, which lists image paths for an
// exam/series pair after one header line.
//

use std::path::PathBuf;
use std::process::Command;

use tracing::{debug, warn};

pub const DEFAULT_PATH_EXTRACT: &str = "pathExtract";

/// Run `<program> <exam> <series>` and return the listed paths.
///
/// Spawn failure, non-zero exit and empty output all yield an empty list.
pub fn image_paths(program: &str, exam: u32, series: u32) -> Vec<PathBuf> {
    let mut command = Command::new(program);
    command.arg(exam.to_string()).arg(series.to_string());
    run_listing(command)
}

fn run_listing(mut command: Command) -> Vec<PathBuf> {
    let output = match command.output() {
        Ok(output) => output,
        Err(e) => {
            warn!("failed to run {:?}: {}", command.get_program(), e);
            return Vec::new();
        }
    };
    if !output.status.success() {
        warn!(
            "{:?} exited with {}",
            command.get_program(),
            output.status
        );
        return Vec::new();
    }

    let paths = parse_listing(&String::from_utf8_lossy(&output.stdout));
    debug!("{:?} listed {} path(s)", command.get_program(), paths.len());
    paths
}

/// Drop the header line, keep every non-blank line after it.
pub fn parse_listing(stdout: &str) -> Vec<PathBuf> {
    stdout
        .trim_end()
        .lines()
        .skip(1)
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .map(PathBuf::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_line_is_discarded() {
        let listing =
            "Exam 1234 Series 5\n/usr/g/sdc/e1234/s5/i1.MRDC\n/usr/g/sdc/e1234/s5/i2.MRDC\n";
        assert_eq!(
            parse_listing(listing),
            vec![
                PathBuf::from("/usr/g/sdc/e1234/s5/i1.MRDC"),
                PathBuf::from("/usr/g/sdc/e1234/s5/i2.MRDC"),
            ]
        );
    }

    #[test]
    fn header_only_or_empty_output_yields_nothing() {
        assert!(parse_listing("Exam 1234 Series 5\n").is_empty());
        assert!(parse_listing("").is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn failing_tool_yields_empty_list() {
        assert!(image_paths("false", 1, 2).is_empty());
        // `echo 1 2` prints only a header line.
        assert!(image_paths("echo", 1, 2).is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn listing_from_a_real_process() {
        let mut command = Command::new("printf");
        command.arg("header\\n/a/i1\\n/a/i2\\n");
        assert_eq!(
            run_listing(command),
            vec![PathBuf::from("/a/i1"), PathBuf::from("/a/i2")]
        );
    }

    #[test]
    fn missing_tool_yields_empty_list() {
        assert!(image_paths("dicom-tagfix-no-such-tool", 1, 2).is_empty());
    }
}
