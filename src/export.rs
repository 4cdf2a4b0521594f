use crate::error::{Error, Result};
use crate::types::BodyFormat;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Where a message ends up: `<output_dir>/<subject>/<subject>.<ext>`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportTarget {
    /// Subject with spaces replaced, also the first thing written to the file.
    pub sanitized_subject: String,
    pub directory: PathBuf,
    pub file_name: String,
}

impl ExportTarget {
    pub fn new(subject: &str, format: BodyFormat, output_dir: Option<&Path>) -> Self {
        let sanitized = sanitize_subject(subject);
        let directory = match output_dir {
            Some(dir) => dir.join(&sanitized),
            None => PathBuf::from(&sanitized),
        };
        Self {
            file_name: format!("{}.{}", sanitized, format.extension()),
            directory,
            sanitized_subject: sanitized,
        }
    }

    pub fn file_path(&self) -> PathBuf {
        self.directory.join(&self.file_name)
    }
}

pub fn sanitize_subject(subject: &str) -> String {
    subject.replace(' ', "_")
}

/// Writes the sanitized subject immediately followed by `body` into a fresh
/// directory named after it. Fails if that directory already exists or if
/// `output_dir` is missing; nothing is ever overwritten.
pub fn export(
    subject: &str,
    body: &str,
    format: BodyFormat,
    output_dir: Option<&Path>,
) -> Result<PathBuf> {
    let target = ExportTarget::new(subject, format, output_dir);

    // Single level only, the parent has to exist already
    fs::create_dir(&target.directory).map_err(|e| match e.kind() {
        ErrorKind::AlreadyExists => Error::DirectoryExists(target.directory.clone()),
        _ => Error::CreateDir {
            path: target.directory.clone(),
            source: e,
        },
    })?;

    let path = target.file_path();
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)?;
    file.write_all(target.sanitized_subject.as_bytes())?;
    file.write_all(body.as_bytes())?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_without_output_dir() {
        let target = ExportTarget::new("Hello World", BodyFormat::Plain, None);
        assert_eq!(target.directory, PathBuf::from("Hello_World"));
        assert_eq!(target.sanitized_subject, "Hello_World");
        assert_eq!(target.file_name, "Hello_World.txt");
        assert_eq!(
            target.file_path(),
            PathBuf::from("Hello_World").join("Hello_World.txt")
        );
    }

    #[test]
    fn test_target_html_with_output_dir() {
        let target = ExportTarget::new("Weekly  report", BodyFormat::Html, Some(Path::new("out")));
        assert_eq!(target.directory, Path::new("out").join("Weekly__report"));
        assert_eq!(target.file_name, "Weekly__report.html");
    }

    #[test]
    fn test_export_writes_subject_then_body() {
        let dir = tempfile::tempdir().unwrap();
        let path = export(
            "Hello World",
            "the body",
            BodyFormat::Plain,
            Some(dir.path()),
        )
        .unwrap();

        assert_eq!(path, dir.path().join("Hello_World").join("Hello_World.txt"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "Hello_Worldthe body");
    }

    #[test]
    fn test_export_existing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("Dup")).unwrap();

        let err = export("Dup", "b", BodyFormat::Plain, Some(dir.path())).unwrap_err();
        assert!(matches!(err, Error::DirectoryExists(p) if p == dir.path().join("Dup")));
    }

    #[test]
    fn test_export_missing_output_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");

        let err = export("Subject", "b", BodyFormat::Plain, Some(&missing)).unwrap_err();
        match err {
            Error::CreateDir { path, source } => {
                assert_eq!(path, missing.join("Subject"));
                assert_eq!(source.kind(), ErrorKind::NotFound);
            }
            other => panic!("expected CreateDir error, got {:?}", other),
        }
        assert!(!missing.exists());
    }
}
