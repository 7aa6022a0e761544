use std::{io, path::PathBuf};

use thiserror::Error;

/// Errors from reading global and sample configuration files
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{desc} configuration file not found at {}", .path.display())]
    NotFound {
        desc: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Error reading configuration file {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Could not parse configuration file {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ini::ParseError,
    },
    #[error("{}: entries found before any section header", .path.display())]
    MissingSectionHeader { path: PathBuf },
    #[error("{}: section [{section}] defined more than once", .path.display())]
    DuplicateSection { path: PathBuf, section: String },
    #[error("{}: key '{key}' defined more than once in section [{section}]", .path.display())]
    DuplicateKey {
        path: PathBuf,
        section: String,
        key: String,
    },
    #[error("{}: missing section [{section}]", .path.display())]
    MissingSection {
        path: PathBuf,
        section: &'static str,
    },
    #[error("{}: missing key '{key}' in section [{section}]", .path.display())]
    MissingKey {
        path: PathBuf,
        section: &'static str,
        key: &'static str,
    },
    #[error("{}: invalid value '{value}' for key '{key}' ({reason})", .path.display())]
    InvalidValue {
        path: PathBuf,
        key: &'static str,
        value: String,
        reason: String,
    },
    #[error("{}: sample {name} has {found} sequence files but {expected} are required for {replications} replicate(s) (paired end: {paired_end})", .path.display())]
    FilenameCount {
        path: PathBuf,
        name: String,
        replications: usize,
        paired_end: bool,
        expected: usize,
        found: usize,
    },
}
