use std::{collections::HashSet, path::PathBuf};

use clap::{
    crate_authors, crate_description, crate_name, crate_version, value_parser, Arg, ArgAction,
    ArgMatches, Command,
};

use anyhow::Context;

use utils::{init_log, LogLevel};

use crate::{config::*, sample::read_sample_list_from_file};

/// Set up definition of command options for clap
fn cli_model() -> Command {
    Command::new(crate_name!())
        .about(crate_description!())
        .version(crate_version!())
        .author(crate_authors!())
        .arg(
            Arg::new("timestamp")
                .short('X')
                .long("timestamp")
                .value_parser(value_parser!(stderrlog::Timestamp))
                .value_name("GRANULARITY")
                .default_value("none")
                .help("Prepend log entries with a timestamp"),
        )
        .arg(
            Arg::new("loglevel")
                .short('l')
                .long("loglevel")
                .value_name("LOGLEVEL")
                .value_parser(value_parser!(LogLevel))
                .ignore_case(true)
                .default_value("info")
                .help("Set log level"),
        )
        .arg(
            Arg::new("quiet")
                .action(ArgAction::SetTrue)
                .long("quiet")
                .conflicts_with("loglevel")
                .help("Silence all output"),
        )
        .arg(
            Arg::new("config_dir")
                .short('c')
                .long("config-dir")
                .value_parser(value_parser!(PathBuf))
                .value_name("PATH")
                .default_value("configuration_files")
                .help("Set directory containing global.cfg"),
        )
        .arg(
            Arg::new("output_dir")
                .short('d')
                .long("output-dir")
                .value_parser(value_parser!(PathBuf))
                .value_name("PATH")
                .help("Set output directory for job scripts [default: current directory]"),
        )
        .arg(
            Arg::new("sample_list")
                .short('s')
                .long("sample-list")
                .value_parser(value_parser!(PathBuf))
                .value_name("PATH")
                .help("File with list of sample names (one per line)"),
        )
        .arg(
            Arg::new("samples")
                .value_parser(value_parser!(String))
                .value_name("SAMPLE")
                .num_args(1..)
                .action(ArgAction::Append)
                .help(concat!(
                    "Names of samples to generate alignment jobs for; each is read from ",
                    "<sample_configurations_directory>/<SAMPLE>.cfg (the setting is always a directory)"
                )),
        )
}

/// Handle command line options.  Set up Config structure
pub fn handle_cli() -> anyhow::Result<Config> {
    // Get matches from command line
    let m = cli_model().get_matches();

    // Setup logging
    init_log(&m);

    debug!("Processing command line options");
    config_from_matches(&m)
}

fn config_from_matches(m: &ArgMatches) -> anyhow::Result<Config> {
    let config_dir = m
        .get_one::<PathBuf>("config_dir")
        .expect("Missing default config dir")
        .clone();

    let mut samples: Vec<String> = m
        .get_many::<String>("samples")
        .map(|v| v.cloned().collect())
        .unwrap_or_default();

    // Samples from list file go after those on the command line
    if let Some(p) = m.get_one::<PathBuf>("sample_list") {
        let v = read_sample_list_from_file(p)
            .with_context(|| "Could not read sample list file")?;
        samples.extend(v);
    }
    let samples = remove_duplicates(samples);

    if samples.is_empty() {
        return Err(anyhow!(
            "No samples specified (give sample names on the command line or use --sample-list)"
        ));
    }
    debug!("Number of samples: {}", samples.len());

    let mut cfg = Config::new(config_dir, samples);

    if let Some(p) = m.get_one::<PathBuf>("output_dir") {
        cfg.set_output_dir(p)
    }

    Ok(cfg)
}

/// Remove repeated sample names, keeping the first occurrence
fn remove_duplicates(v: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    v.into_iter()
        .filter(|s| {
            let new = seen.insert(s.clone());
            if !new {
                warn!("Sample {} listed more than once", s);
            }
            new
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{fs, path::Path};

    fn parse(args: &[&str]) -> anyhow::Result<Config> {
        let m = cli_model().try_get_matches_from(args)?;
        config_from_matches(&m)
    }

    #[test]
    fn model_is_valid() {
        cli_model().debug_assert();
    }

    #[test]
    fn defaults() {
        let cfg = parse(&["star_jobs", "leaf_control", "leaf_short_drought"]).unwrap();
        assert_eq!(cfg.config_dir(), Path::new("configuration_files"));
        assert!(cfg.output_dir().is_none());
        assert_eq!(cfg.samples(), &["leaf_control", "leaf_short_drought"]);
    }

    #[test]
    fn options_and_sample_list() {
        let dir = tempfile::tempdir().unwrap();
        let list = dir.path().join("samples.txt");
        fs::write(&list, "root\nleaf_control\n").unwrap();
        let cfg = parse(&[
            "star_jobs",
            "-c",
            "cfg",
            "--output-dir",
            "jobs",
            "-s",
            list.to_str().unwrap(),
            "leaf_control",
        ])
        .unwrap();
        assert_eq!(cfg.config_dir(), Path::new("cfg"));
        assert_eq!(cfg.output_dir(), Some(Path::new("jobs")));
        assert_eq!(cfg.samples(), &["leaf_control", "root"]);
    }

    #[test]
    fn no_samples_is_error() {
        assert!(parse(&["star_jobs"]).is_err());
        assert!(parse(&["star_jobs", "-l", "debug"]).is_err());
    }

    #[test]
    fn help_shows_sample_config_location() {
        let help = cli_model().render_help().to_string();
        assert!(help.contains("<SAMPLE>.cfg"), "{}", help);
    }

    #[test]
    fn bad_loglevel_rejected() {
        assert!(cli_model()
            .try_get_matches_from(["star_jobs", "-l", "chatty", "s1"])
            .is_err());
    }
}
