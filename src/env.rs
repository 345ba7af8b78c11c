//! Workspace environment
//!
//! The environment binds the tool to one geodatabase path and decides how
//! the report file is written.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Extension of a file geodatabase directory
pub const GDB_EXTENSION: &str = "gdb";

/// Extension of the generated report
pub const REPORT_EXTENSION: &str = "txt";

/// Environment settings for a geodatabase inspection run
#[derive(Debug, Clone)]
pub struct Environment {
    /// Path of the geodatabase bound as the workspace
    pub workspace: PathBuf,
    /// Whether an existing report file may be replaced
    pub overwrite_output: bool,
}

impl Environment {
    /// Bind a new environment to the given workspace path
    pub fn new(workspace: impl Into<PathBuf>) -> Self {
        Self {
            workspace: workspace.into(),
            overwrite_output: true,
        }
    }

    /// Set whether an existing report file may be replaced
    pub fn with_overwrite_output(mut self, overwrite: bool) -> Self {
        self.overwrite_output = overwrite;
        self
    }

    /// Path of the report written for this workspace
    pub fn report_path(&self) -> PathBuf {
        report_path_for(&self.workspace)
    }
}

/// Derive the report path from a geodatabase path
///
/// Trailing separators are dropped, then a trailing `.gdb` is replaced by
/// `.txt`. Paths without the extension get `.txt` appended. The file system
/// is never consulted and the path is never re-encoded.
pub fn report_path_for(path: &Path) -> PathBuf {
    match path.extension() {
        Some(ext) if ext == OsStr::new(GDB_EXTENSION) => path.with_extension(REPORT_EXTENSION),
        Some(ext) => {
            let mut ext = ext.to_os_string();
            ext.push(".");
            ext.push(REPORT_EXTENSION);
            path.with_extension(ext)
        }
        None if path.file_stem().is_some() => path.with_extension(REPORT_EXTENSION),
        None => {
            let mut report = path.as_os_str().to_os_string();
            report.push(".");
            report.push(REPORT_EXTENSION);
            PathBuf::from(report)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_overwrites() {
        let env = Environment::new("data/roads.gdb");
        assert!(env.overwrite_output);
        assert!(!env.with_overwrite_output(false).overwrite_output);
    }

    #[test]
    fn test_report_path_replaces_extension() {
        assert_eq!(
            report_path_for(Path::new("data/roads.gdb")),
            PathBuf::from("data/roads.txt")
        );
    }

    #[test]
    fn test_report_path_only_touches_suffix() {
        assert_eq!(
            report_path_for(Path::new("/srv/old.gdb.backup/city.gdb")),
            PathBuf::from("/srv/old.gdb.backup/city.txt")
        );
    }

    #[test]
    fn test_report_path_trailing_separator() {
        assert_eq!(
            report_path_for(Path::new("data/roads.gdb/")),
            PathBuf::from("data/roads.txt")
        );
    }

    #[test]
    fn test_report_path_without_extension() {
        assert_eq!(
            report_path_for(Path::new("data/roads")),
            PathBuf::from("data/roads.txt")
        );
    }

    #[test]
    fn test_report_path_keeps_other_extensions() {
        assert_eq!(
            report_path_for(Path::new("data/roads.v2")),
            PathBuf::from("data/roads.v2.txt")
        );
    }

    #[test]
    fn test_report_path_keeps_current_dir_components() {
        assert_eq!(
            report_path_for(Path::new("data/./roads.gdb")).as_os_str(),
            OsStr::new("data/./roads.txt")
        );
    }

    #[test]
    fn test_report_path_without_file_name() {
        assert_eq!(report_path_for(Path::new("..")), PathBuf::from("...txt"));
    }

    #[cfg(unix)]
    #[test]
    fn test_report_path_keeps_non_utf8_directories() {
        use std::os::unix::ffi::OsStrExt;

        let gdb = Path::new(OsStr::from_bytes(b"/tmp/caf\xe9/roads.gdb"));
        let report = report_path_for(gdb);

        assert_eq!(report.parent(), gdb.parent());
        assert_eq!(report.as_os_str().as_bytes(), b"/tmp/caf\xe9/roads.txt");
    }

    #[cfg(unix)]
    #[test]
    fn test_report_path_keeps_non_utf8_stem() {
        use std::os::unix::ffi::OsStrExt;

        let gdb = Path::new(OsStr::from_bytes(b"data/r\xf6ads.gdb/"));
        assert_eq!(
            report_path_for(gdb).as_os_str().as_bytes(),
            b"data/r\xf6ads.txt"
        );
    }
}
