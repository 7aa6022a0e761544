use std::{
    fs,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::Context;

use crate::{options::GlobalOptions, sample::SampleConfig};

/// Fixed STAR options following the input and output prefix
const STAR_OUTPUT_OPTS: &str = "--outSAMtype BAM SortedByCoordinate \
--quantMode TranscriptomeSAM GeneCounts --genomeLoad NoSharedMemory --sjdbGTFfile $GTF_FILE";

fn job_file_name(sample: &SampleConfig) -> String {
    format!("{}_align.sh", sample.name())
}

/// Write job script for sample.
///
/// The date stamp is evaluated by the shell when the script is run, so
/// output directories reflect the time of alignment, not of generation.
/// Aligner calls for the replicates are chained with && so they run one
/// after the other and the script stops at the first failure.
pub fn write_job<W: Write>(
    w: &mut W,
    sample: &SampleConfig,
    opt: &GlobalOptions,
) -> io::Result<()> {
    for line in opt.header() {
        writeln!(w, "{}", line)?;
    }
    writeln!(w, "DATE_STAMP=$(date +%Y%m%d_%H%M)")?;
    writeln!(w, "RUN_STAMP=${{DATE_STAMP}}_{}", sample.name())?;
    writeln!(w, "THREAD_NUM={}", opt.threads())?;
    writeln!(w, "GENOME_DIR={}", opt.genome_directory())?;
    writeln!(w, "GTF_FILE={}", opt.gtf_location())?;
    writeln!(w, "OUT_DIR={}/\"$RUN_STAMP\"/", opt.output_directory())?;
    writeln!(w, "mkdir -p $OUT_DIR\n")?;

    let n = sample.replications();
    for (ix, files) in sample.replicate_files().enumerate() {
        write!(
            w,
            "{} --runThreadN $THREAD_NUM --genomeDir $GENOME_DIR --readFilesCommand zcat \
             --readFilesIn {} --outFileNamePrefix \"$OUT_DIR\"\"$RUN_STAMP\"_R{}_ {}",
            opt.star_location(),
            files.join(" "),
            ix + 1,
            STAR_OUTPUT_OPTS
        )?;
        if ix + 1 < n {
            write!(w, " &&")?
        }
        writeln!(w, "\n")?;
    }
    Ok(())
}

/// Create job script <sample name>_align.sh in `dir` (current directory if None).
/// Any existing file is overwritten.  Returns the path to the script
pub fn generate_job(
    sample: &SampleConfig,
    opt: &GlobalOptions,
    dir: Option<&Path>,
) -> anyhow::Result<PathBuf> {
    info!("Creating job for {}", sample.name());
    let mut p = dir.map(|d| d.to_owned()).unwrap_or_else(PathBuf::new);
    p.push(job_file_name(sample));

    let mut wrt = BufWriter::new(
        fs::File::create(&p)
            .with_context(|| format!("problem creating job file {}", p.display()))?,
    );
    write_job(&mut wrt, sample, opt)
        .and_then(|_| wrt.flush())
        .with_context(|| format!("Error writing job file {}", p.display()))?;
    debug!("Wrote {}", p.display());
    Ok(p)
}
