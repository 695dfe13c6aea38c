use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

/// Where run invocations are recorded, relative to the working directory.
pub const DEFAULT_HISTORY_FILE: &str = "CMDs/train.cmd";

/// Append the literal invocation command line to the run-history file,
/// creating its directory if absent. Called once before training starts.
pub fn append_invocation<P: AsRef<Path>>(history_file: P, args: &[String]) -> Result<()> {
    let path = history_file.as_ref();
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create history directory: {:?}", dir))?;
        }
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open history file: {:?}", path))?;
    writeln!(file, "{}", args.join(" "))
        .with_context(|| format!("Failed to append to history file: {:?}", path))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn appends_one_line_per_run() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("CMDs").join("train.cmd");

        let first = vec!["polarity-train".to_string(), "out.th".to_string()];
        let second = vec![
            "polarity-train".to_string(),
            "out.th".to_string(),
            "--B".to_string(),
            "8".to_string(),
        ];
        append_invocation(&path, &first).unwrap();
        append_invocation(&path, &second).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines, vec!["polarity-train out.th", "polarity-train out.th --B 8"]);
    }
}
