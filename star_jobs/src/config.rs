use std::path::{Path, PathBuf};

/// Config
///
/// Configuration info for the program
/// This is generated from the command line arguments
/// Once set it is read only
///
/// config_dir - directory containing global.cfg
/// output_dir - directory for job scripts (current directory if not set)
/// samples - names of samples to generate jobs for, in processing order
///
pub struct Config {
    config_dir: PathBuf,
    output_dir: Option<PathBuf>,
    samples: Vec<String>,
}

impl Config {
    pub fn new(config_dir: PathBuf, samples: Vec<String>) -> Self {
        Self {
            config_dir,
            output_dir: None,
            samples,
        }
    }

    pub fn set_output_dir<P: AsRef<Path>>(&mut self, dir: P) {
        self.output_dir = Some(dir.as_ref().to_owned())
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn output_dir(&self) -> Option<&Path> {
        self.output_dir.as_deref()
    }

    pub fn samples(&self) -> &[String] {
        &self.samples
    }
}
