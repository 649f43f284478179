//! The per-run build log.
//!
//! All output from every executed step lands in one file. The first handle
//! opened during a run truncates it, every later one appends, so the file
//! always holds exactly one run in step order. Handles are scoped to a
//! single step: they are flushed and dropped before the next step starts.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use crate::error::{BuildError, Result};

/// Prefix of the header line that opens every step's section.
pub const SECTION_MARKER: &str = "==> ";

/// How a log handle opens the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogMode {
    /// Discard whatever a previous run left behind.
    Truncate,
    /// Continue after the sections already written this run.
    Append,
}

/// The single log target for a run.
#[derive(Debug)]
pub struct BuildLog {
    path: PathBuf,
    started: bool,
}

impl BuildLog {
    /// Create a log for the given path. Nothing is touched until the first step opens it.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            started: false,
        }
    }

    /// Open the log for one step and write its section header.
    pub fn open_step(&mut self, step: &str, detail: &str) -> Result<LogHandle> {
        let mode = if self.started {
            LogMode::Append
        } else {
            LogMode::Truncate
        };

        let mut options = OpenOptions::new();
        options.create(true);
        match mode {
            LogMode::Truncate => options.write(true).truncate(true),
            LogMode::Append => options.append(true),
        };

        let file = options
            .open(&self.path)
            .map_err(|e| BuildError::filesystem(&self.path, e))?;
        self.started = true;

        tracing::debug!("Opened {} ({:?}) for {}", self.path.display(), mode, step);

        let mut handle = LogHandle {
            path: self.path.clone(),
            writer: BufWriter::new(file),
        };
        handle.line(&format!("{}{}: {}", SECTION_MARKER, step, detail))?;
        Ok(handle)
    }
}

/// Write access to the log for the duration of one step.
#[derive(Debug)]
pub struct LogHandle {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl LogHandle {
    /// Write one line of text followed by a newline.
    pub fn line(&mut self, text: &str) -> Result<()> {
        writeln!(self.writer, "{}", text).map_err(|e| BuildError::filesystem(&self.path, e))
    }

    /// Append raw process output.
    pub fn write_chunk(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer
            .write_all(bytes)
            .map_err(|e| BuildError::filesystem(&self.path, e))
    }

    /// Flush buffered output to disk and release the file.
    pub fn finish(mut self) -> Result<()> {
        self.writer
            .flush()
            .and_then(|_| self.writer.get_ref().sync_data())
            .map_err(|e| BuildError::filesystem(&self.path, e))
    }
}

impl Drop for LogHandle {
    fn drop(&mut self) {
        // finish() already flushed on the success path; this covers early returns.
        let _ = self.writer.flush();
    }
}

/// Split a log into its step sections, in file order.
///
/// Each section is returned as (header, body). Text before the first header
/// is ignored.
pub fn sections(contents: &str) -> Vec<(String, String)> {
    let mut out: Vec<(String, String)> = Vec::new();
    for line in contents.split_inclusive('\n') {
        if let Some(header) = line.strip_prefix(SECTION_MARKER) {
            out.push((header.trim_end().to_string(), String::new()));
        } else if let Some((_, body)) = out.last_mut() {
            body.push_str(line);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn first_open_truncates_then_appends() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("build.log");
        let mut log = BuildLog::new(&path);

        for step in ["one", "two", "three"] {
            log.open_step(step, "cmd").unwrap().finish().unwrap();
        }
        assert_eq!(sections(&fs::read_to_string(&path).unwrap()).len(), 3);

        // A new run over the same file starts from scratch.
        let mut next_run = BuildLog::new(&path);
        next_run.open_step("four", "cmd").unwrap().finish().unwrap();

        let headers: Vec<_> = sections(&fs::read_to_string(&path).unwrap())
            .into_iter()
            .map(|(h, _)| h)
            .collect();
        assert_eq!(headers, ["four: cmd"]);
    }

    #[test]
    fn previous_run_is_discarded() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("build.log");
        fs::write(&path, "stale output from last time\n").unwrap();

        let mut log = BuildLog::new(&path);
        let mut handle = log.open_step("clone", "git clone").unwrap();
        handle.write_chunk(b"fresh\n").unwrap();
        handle.finish().unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(!contents.contains("stale"));
        assert!(contents.contains("fresh"));
    }

    #[test]
    fn nothing_is_created_before_first_step() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("build.log");
        let _log = BuildLog::new(&path);

        assert!(!path.exists());
    }

    #[test]
    fn sections_keep_step_order() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("build.log");
        let mut log = BuildLog::new(&path);

        for (name, body) in [("a", "alpha\n"), ("b", "beta\n"), ("c", "gamma\n")] {
            let mut handle = log.open_step(name, "cmd").unwrap();
            handle.write_chunk(body.as_bytes()).unwrap();
            handle.finish().unwrap();
        }

        let contents = fs::read_to_string(&path).unwrap();
        let parsed = sections(&contents);
        let headers: Vec<_> = parsed.iter().map(|(h, _)| h.as_str()).collect();
        assert_eq!(headers, ["a: cmd", "b: cmd", "c: cmd"]);
        assert_eq!(parsed[1].1, "beta\n");
    }

    #[test]
    fn dropped_handle_still_flushes() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("build.log");
        let mut log = BuildLog::new(&path);

        {
            let mut handle = log.open_step("sync", "gclient sync").unwrap();
            handle.write_chunk(b"partial output").unwrap();
        }

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("partial output"));
    }

    #[test]
    fn unwritable_path_is_filesystem_error() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("missing");
        let path = dir.join("build.log");
        let mut log = BuildLog::new(&path);

        let err = log.open_step("x", "y").unwrap_err();
        assert!(matches!(err, BuildError::Filesystem { .. }));

        // The failed open did not count: the next one still truncates.
        fs::create_dir(&dir).unwrap();
        fs::write(&path, "stale\n").unwrap();
        log.open_step("x", "y").unwrap().finish().unwrap();
        assert!(!fs::read_to_string(&path).unwrap().contains("stale"));
    }
}
