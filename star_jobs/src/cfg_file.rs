use std::{
    collections::HashSet,
    io::Read,
    path::{Path, PathBuf},
};

use compress_io::compress::CompressIo;
use ini::{Ini, ParseOption, Properties};
use utils::parse_bool;

use crate::error::ConfigError;

/// Entries in this section are inherited by all other sections
const DEFAULT_SECTION: &str = "DEFAULT";

/// Values are taken literally: no quote or escape processing, no inline
/// comments.  Indented lines continue the value of the preceding key
fn parse_options() -> ParseOption {
    ParseOption {
        enabled_quote: false,
        enabled_escape: false,
        enabled_indented_mutiline_value: true,
        ..ParseOption::default()
    }
}

/// A parsed configuration file together with its path, so that
/// lookup errors can say where the problem is.
///
/// Section names are case sensitive, keys are not.
pub struct ConfigFile {
    path: PathBuf,
    ini: Ini,
}

impl ConfigFile {
    /// Open and parse a configuration file.  `desc` describes the file in
    /// the error message if it can not be opened
    pub fn open(path: &Path, desc: &str) -> Result<Self, ConfigError> {
        debug!("Reading {} configuration from {}", desc, path.display());
        let rdr = CompressIo::new()
            .path(path)
            .bufreader()
            .map_err(|source| ConfigError::NotFound {
                desc: desc.to_owned(),
                path: path.to_owned(),
                source,
            })?;
        Self::from_reader(path, rdr)
    }

    pub fn from_reader<R: Read>(path: &Path, mut rdr: R) -> Result<Self, ConfigError> {
        let mut s = String::new();
        rdr.read_to_string(&mut s)
            .map_err(|source| ConfigError::Read {
                path: path.to_owned(),
                source,
            })?;
        let ini = Ini::load_from_str_opt(&s, parse_options()).map_err(|source| {
            ConfigError::Parse {
                path: path.to_owned(),
                source,
            }
        })?;
        let cf = Self {
            path: path.to_owned(),
            ini,
        };
        cf.check_layout()?;
        Ok(cf)
    }

    /// Reject entries outside of a section, repeated sections and repeated keys
    fn check_layout(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for (name, props) in self.ini.iter() {
            let Some(name) = name else {
                if props.iter().next().is_some() {
                    return Err(ConfigError::MissingSectionHeader {
                        path: self.path.clone(),
                    });
                }
                continue;
            };
            if !seen.insert(name) {
                return Err(ConfigError::DuplicateSection {
                    path: self.path.clone(),
                    section: name.to_owned(),
                });
            }
            let mut keys = HashSet::new();
            for (k, _) in props.iter() {
                if !keys.insert(k.to_lowercase()) {
                    return Err(ConfigError::DuplicateKey {
                        path: self.path.clone(),
                        section: name.to_owned(),
                        key: k.to_owned(),
                    });
                }
            }
        }
        trace!("{}: {} sections", self.path.display(), seen.len());
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn section(&self, section: &'static str) -> Result<&Properties, ConfigError> {
        self.ini
            .section(Some(section))
            .ok_or_else(|| ConfigError::MissingSection {
                path: self.path.clone(),
                section,
            })
    }

    /// Entries of a section in file order, preceded by any inherited from
    /// [DEFAULT].  A key set in both keeps the position of the default
    /// entry with the value from the section
    fn entries(&self, section: &'static str) -> Result<Vec<(&str, &str)>, ConfigError> {
        let props = self.section(section)?;
        let mut v: Vec<(&str, &str)> = match self.ini.section(Some(DEFAULT_SECTION)) {
            Some(d) if section != DEFAULT_SECTION => d.iter().collect(),
            _ => Vec::new(),
        };
        for (k, val) in props.iter() {
            match v.iter_mut().find(|(x, _)| x.eq_ignore_ascii_case(k)) {
                Some(e) => e.1 = val,
                None => v.push((k, val)),
            }
        }
        Ok(v)
    }

    pub fn get(&self, section: &'static str, key: &'static str) -> Result<&str, ConfigError> {
        self.entries(section)?
            .into_iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
            .ok_or_else(|| ConfigError::MissingKey {
                path: self.path.clone(),
                section,
                key,
            })
    }

    /// Values of all entries in a section, in file order
    pub fn values(&self, section: &'static str) -> Result<Vec<String>, ConfigError> {
        Ok(self
            .entries(section)?
            .into_iter()
            .map(|(_, v)| v.to_owned())
            .collect())
    }

    pub fn get_nonempty(
        &self,
        section: &'static str,
        key: &'static str,
    ) -> Result<String, ConfigError> {
        let s = self.get(section, key)?;
        if s.is_empty() {
            Err(self.invalid(key, s, "empty value"))
        } else {
            Ok(s.to_owned())
        }
    }

    pub fn get_positive(
        &self,
        section: &'static str,
        key: &'static str,
    ) -> Result<usize, ConfigError> {
        let s = self.get(section, key)?;
        match s.parse::<usize>() {
            Ok(0) => Err(self.invalid(key, s, "must be greater than zero")),
            Ok(x) => Ok(x),
            Err(e) => Err(self.invalid(key, s, e)),
        }
    }

    pub fn get_bool(&self, section: &'static str, key: &'static str) -> Result<bool, ConfigError> {
        let s = self.get(section, key)?;
        parse_bool(s).ok_or_else(|| self.invalid(key, s, "not a boolean"))
    }

    fn invalid<T: ToString>(&self, key: &'static str, value: &str, reason: T) -> ConfigError {
        ConfigError::InvalidValue {
            path: self.path.clone(),
            key,
            value: value.to_owned(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use flate2::{write::GzEncoder, Compression};
    use std::{fs, io::Write};

    fn cfg(s: &str) -> ConfigFile {
        ConfigFile::from_reader(Path::new("test.cfg"), s.as_bytes()).unwrap()
    }

    #[test]
    fn typed_lookups() {
        let c = cfg("[a]\nn = 4\nz = 0\nx = four\nb = Yes\ne =\n");
        assert_eq!(c.get_positive("a", "n").unwrap(), 4);
        assert!(matches!(
            c.get_positive("a", "z"),
            Err(ConfigError::InvalidValue { key: "z", .. })
        ));
        assert!(matches!(
            c.get_positive("a", "x"),
            Err(ConfigError::InvalidValue { key: "x", .. })
        ));
        assert!(c.get_bool("a", "b").unwrap());
        assert!(c.get_bool("a", "x").is_err());
        assert!(c.get_nonempty("a", "e").is_err());
        assert_eq!(c.get_nonempty("a", "x").unwrap(), "four");
    }

    #[test]
    fn missing_entries() {
        let c = cfg("[a]\nn = 4\n");
        assert!(matches!(
            c.get("b", "n"),
            Err(ConfigError::MissingSection { section: "b", .. })
        ));
        let e = c.get("a", "m").unwrap_err();
        assert_eq!(e.to_string(), "test.cfg: missing key 'm' in section [a]");
    }

    #[test]
    fn open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("absent.cfg");
        match ConfigFile::open(&p, "global") {
            Err(e @ ConfigError::NotFound { .. }) => {
                assert!(e.to_string().contains(&p.display().to_string()))
            }
            _ => panic!("expected NotFound"),
        }
    }

    #[test]
    fn parse_error_has_path() {
        let r = ConfigFile::from_reader(Path::new("bad.cfg"), "[s]\njunk\n".as_bytes());
        match r {
            Err(e @ ConfigError::Parse { .. }) => {
                assert_eq!(e.to_string(), "Could not parse configuration file bad.cfg")
            }
            _ => panic!("expected Parse error"),
        }
    }

    #[test]
    fn sections_and_order() {
        let c = cfg("# comment\n\
             [global]\n\
             thread_number = 8\n\
             STAR_location: /opt/STAR\n\
             \n\
             [header]\n\
             z = #!/bin/bash\n\
             a = #SBATCH --mem=32G\n\
             m = module load star\n");
        assert_eq!(c.get("global", "thread_number").unwrap(), "8");
        assert_eq!(c.get("global", "STAR_location").unwrap(), "/opt/STAR");
        assert_eq!(c.get("global", "star_location").unwrap(), "/opt/STAR");
        assert_eq!(
            c.values("header").unwrap(),
            vec!["#!/bin/bash", "#SBATCH --mem=32G", "module load star"]
        );
        // Section names are case sensitive
        assert!(c.values("Header").is_err());
    }

    #[test]
    fn values_taken_literally() {
        let c = cfg("[s]\nurl = http://host:80/x=y\nk: a=b\nq = \"quoted\" \\t\nh = a # b\n");
        assert_eq!(c.get("s", "url").unwrap(), "http://host:80/x=y");
        assert_eq!(c.get("s", "k").unwrap(), "a=b");
        assert_eq!(c.get("s", "q").unwrap(), "\"quoted\" \\t");
        assert_eq!(c.get("s", "h").unwrap(), "a # b");
    }

    #[test]
    fn indented_line_continues_value() {
        let c = cfg("[s]\nk = one\n  two\nj = y\n");
        assert!(c.get("s", "k").unwrap().contains("two"));
        assert_eq!(c.get("s", "j").unwrap(), "y");
        assert_eq!(c.values("s").unwrap().len(), 2);
    }

    #[test]
    fn default_section_is_inherited() {
        let c = cfg("[DEFAULT]\nshell = #!/bin/bash\nmem = 8G\n\
             [header]\nqueue = #PBS -q long\nMEM = #PBS -l mem=64G\n");
        assert_eq!(
            c.values("header").unwrap(),
            vec!["#!/bin/bash", "#PBS -l mem=64G", "#PBS -q long"]
        );
        assert_eq!(c.get("header", "shell").unwrap(), "#!/bin/bash");
        assert_eq!(c.values("DEFAULT").unwrap().len(), 2);
    }

    #[test]
    fn layout_errors() {
        let parse = |s: &str| ConfigFile::from_reader(Path::new("t.cfg"), s.as_bytes());
        assert!(matches!(
            parse("k = v\n[s]\n"),
            Err(ConfigError::MissingSectionHeader { .. })
        ));
        assert!(matches!(
            parse("[s]\na = 1\n[t]\n[s]\nb = 2\n"),
            Err(ConfigError::DuplicateSection { .. })
        ));
        match parse("[s]\nKey = 1\nkey = 2\n") {
            Err(ConfigError::DuplicateKey { section, .. }) => assert_eq!(section, "s"),
            _ => panic!("expected DuplicateKey"),
        }
    }

    #[test]
    fn open_gzipped_file() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("global.cfg");
        let mut enc = GzEncoder::new(fs::File::create(&p).unwrap(), Compression::default());
        enc.write_all(b"[global]\nthread_number = 4\n\n[header]\nh1 = #!/bin/bash\n")
            .unwrap();
        enc.finish().unwrap();

        let c = ConfigFile::open(&p, "global").unwrap();
        assert_eq!(c.get_positive("global", "thread_number").unwrap(), 4);
        assert_eq!(c.values("header").unwrap(), vec!["#!/bin/bash"]);
    }
}
