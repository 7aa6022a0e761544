use std::path::{Path, PathBuf};

use crate::{cfg_file::ConfigFile, error::ConfigError};

pub const GLOBAL_CONFIG_FILE: &str = "global.cfg";

/// GlobalOptions
///
/// Settings shared by all samples, read from global.cfg
/// Once set it is read only
///
/// genome_directory - STAR genome index directory
/// gtf_location - annotation (GTF) file
/// output_directory - base directory for alignment output
/// sample_config_dir - directory holding the per sample configuration files
/// header - lines written verbatim at the top of every job script
/// threads - number of aligner threads
/// star_location - path to the STAR binary
///
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    genome_directory: String,
    gtf_location: String,
    output_directory: String,
    sample_config_dir: PathBuf,
    header: Vec<String>,
    threads: usize,
    star_location: String,
}

impl GlobalOptions {
    pub fn from_config(cf: &ConfigFile) -> Result<Self, ConfigError> {
        let g = "global";
        Ok(Self {
            genome_directory: cf.get_nonempty(g, "genome_directory")?,
            gtf_location: cf.get_nonempty(g, "gtf_location")?,
            output_directory: cf.get_nonempty(g, "output_directory")?,
            sample_config_dir: PathBuf::from(
                cf.get_nonempty(g, "sample_configurations_directory")?,
            ),
            threads: cf.get_positive(g, "thread_number")?,
            star_location: cf.get_nonempty(g, "STAR_location")?,
            header: cf.values("header")?,
        })
    }

    pub fn genome_directory(&self) -> &str {
        &self.genome_directory
    }

    pub fn gtf_location(&self) -> &str {
        &self.gtf_location
    }

    pub fn output_directory(&self) -> &str {
        &self.output_directory
    }

    pub fn sample_config_dir(&self) -> &Path {
        &self.sample_config_dir
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    pub fn star_location(&self) -> &str {
        &self.star_location
    }
}

/// Read global options from global.cfg in `config_dir`
pub fn load_global_options(config_dir: &Path) -> Result<GlobalOptions, ConfigError> {
    let path = config_dir.join(GLOBAL_CONFIG_FILE);
    let cf = ConfigFile::open(&path, "global")?;
    let opt = GlobalOptions::from_config(&cf)?;
    debug!(
        "Global options: {} header lines, {} threads, samples from {}",
        opt.header().len(),
        opt.threads(),
        opt.sample_config_dir().display()
    );
    Ok(opt)
}
