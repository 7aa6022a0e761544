use std::fs;

use anyhow::Context;

use crate::{config::Config, job, options, sample};

/// Load global options then generate one job script per sample
///
/// Samples are handled in order; the first failure aborts the run
pub fn process_samples(cfg: &Config) -> anyhow::Result<()> {
    debug!("Starting processing");
    let opt = options::load_global_options(cfg.config_dir())?;

    if let Some(d) = cfg.output_dir() {
        if !d.exists() {
            fs::create_dir_all(d)
                .with_context(|| format!("Error creating output directory {}", d.display()))?;
        }
    }

    for name in cfg.samples() {
        let s = sample::load_sample_config(opt.sample_config_dir(), name)?;
        job::generate_job(&s, &opt, cfg.output_dir())
            .with_context(|| format!("Error generating job for sample {}", s.name()))?;
    }

    info!("Generated {} job scripts", cfg.samples().len());
    Ok(())
}
