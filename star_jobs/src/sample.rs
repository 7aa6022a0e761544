use std::path::Path;

use anyhow::Context;
use compress_io::compress::CompressIo;
use utils::get_next_line;

use crate::{cfg_file::ConfigFile, error::ConfigError};

/// Sequencing sample
///
/// name - used to generate the job script name and output prefixes
/// replications - number of biological replicates
/// paired_end - input files come in mate pairs
/// filenames - input files in replicate order (R1, R2 for each replicate if paired end)
///
#[derive(Debug, Clone)]
pub struct SampleConfig {
    name: String,
    replications: usize,
    paired_end: bool,
    filenames: Vec<String>,
}

impl SampleConfig {
    pub fn new(name: &str, replications: usize, paired_end: bool, filenames: Vec<String>) -> Self {
        Self {
            name: name.to_owned(),
            replications,
            paired_end,
            filenames,
        }
    }

    pub fn from_config(cf: &ConfigFile) -> Result<Self, ConfigError> {
        let g = "general";
        let s = Self::new(
            &cf.get_nonempty(g, "name")?,
            cf.get_positive(g, "replications")?,
            cf.get_bool(g, "paired_end")?,
            cf.values("seq_filenames")?,
        );

        let expected = s
            .files_per_replicate()
            .checked_mul(s.replications)
            .ok_or_else(|| ConfigError::InvalidValue {
                path: cf.path().to_owned(),
                key: "replications",
                value: s.replications.to_string(),
                reason: "too many replicates".to_owned(),
            })?;
        if s.filenames.len() != expected {
            Err(ConfigError::FilenameCount {
                path: cf.path().to_owned(),
                name: s.name,
                replications: s.replications,
                paired_end: s.paired_end,
                expected,
                found: s.filenames.len(),
            })
        } else {
            Ok(s)
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn replications(&self) -> usize {
        self.replications
    }

    pub fn paired_end(&self) -> bool {
        self.paired_end
    }

    pub fn filenames(&self) -> &[String] {
        &self.filenames
    }

    fn files_per_replicate(&self) -> usize {
        if self.paired_end {
            2
        } else {
            1
        }
    }

    /// Input files for each replicate in order (a mate pair or a single file)
    pub fn replicate_files(&self) -> impl Iterator<Item = &[String]> + '_ {
        self.filenames
            .chunks(self.files_per_replicate())
            .take(self.replications)
    }
}

/// Read configuration for sample `name` from `<dir>/<name>.cfg`
///
/// `dir` is always treated as a directory: a value such as `cfgs/sample_`
/// looks for `cfgs/sample_/<name>.cfg`, not `cfgs/sample_<name>.cfg`
///
/// The name given in the file is the one used from then on; if it
/// differs from the file name we just warn
pub fn load_sample_config(dir: &Path, name: &str) -> Result<SampleConfig, ConfigError> {
    let path = dir.join(format!("{}.cfg", name));
    let cf = ConfigFile::open(&path, &format!("Sample {}", name))?;
    let s = SampleConfig::from_config(&cf)?;
    if s.name() != name {
        warn!(
            "Sample configuration {} has name {}; using that for output",
            path.display(),
            s.name()
        );
    }
    debug!(
        "Sample {}: {} replicates, paired end: {}, {} input files",
        s.name(),
        s.replications(),
        s.paired_end(),
        s.filenames().len()
    );
    Ok(s)
}

/// Read sample names from file, one per line (first tab separated field)
/// Empty lines and lines starting with '#' are skipped
pub fn read_sample_list_from_file<P: AsRef<Path>>(fname: P) -> anyhow::Result<Vec<String>> {
    debug!("Reading in sample list from {}", fname.as_ref().display());

    trace!("Opening sample file for reading");
    let mut rdr = CompressIo::new()
        .path(&fname)
        .bufreader()
        .with_context(|| format!("Could not open {}", fname.as_ref().display()))?;

    trace!("Reading from file");
    let mut buf = String::new();
    let mut line = 0;
    let mut sample_vec = Vec::new();

    while let Some(fields) = get_next_line(&mut rdr, &mut buf).with_context(|| {
        format!(
            "Error after reading {} lines from {}",
            line,
            fname.as_ref().display()
        )
    })? {
        line += 1;
        if !(fields[0].is_empty() || fields[0].starts_with('#')) {
            sample_vec.push(fields[0].to_owned());
        }
    }

    debug!(
        "Finished reading in {} lines; found {} samples",
        line,
        sample_vec.len()
    );

    Ok(sample_vec)
}
