use std::fs::read_to_string;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// The file listing the descriptors to compute, one name per line. Only
    /// used by the descriptor pipeline.
    pub descriptor_file: String,

    /// Name of the input SMILES file. `{}` is replaced by the run suffix.
    pub input_template: String,

    /// Name of the output CSV file. `{}` is replaced by the run suffix.
    pub output_template: String,

    /// Print a progress line every this many molecules. 0 turns progress
    /// lines off.
    pub progress_interval: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            descriptor_file: "rdkit_descriptors.txt".to_owned(),
            input_template: "tmpForRDKit_{}.txt".to_owned(),
            output_template: "tmpForRDKit_out_{}.txt".to_owned(),
            progress_interval: 1000,
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let s = read_to_string(path).map_err(Error::io(path))?;
        let config: Self = toml::from_str(&s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        for t in [&self.input_template, &self.output_template] {
            if !t.contains("{}") {
                return Err(Error::Template(t.clone()));
            }
        }
        Ok(())
    }

    pub fn descriptor_path(&self, dir: impl AsRef<Path>) -> PathBuf {
        dir.as_ref().join(&self.descriptor_file)
    }

    pub fn input_path(
        &self,
        dir: impl AsRef<Path>,
        suffix: &str,
    ) -> Result<PathBuf> {
        Ok(dir.as_ref().join(fill(&self.input_template, suffix)?))
    }

    pub fn output_path(
        &self,
        dir: impl AsRef<Path>,
        suffix: &str,
    ) -> Result<PathBuf> {
        Ok(dir.as_ref().join(fill(&self.output_template, suffix)?))
    }
}

/// replace every `{}` in `template` with `suffix`
fn fill(template: &str, suffix: &str) -> Result<String> {
    if !template.contains("{}") {
        return Err(Error::Template(template.to_owned()));
    }
    Ok(template.replace("{}", suffix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_paths() {
        let c = Config::default();
        assert_eq!(
            c.input_path(".", "42").unwrap(),
            Path::new("./tmpForRDKit_42.txt")
        );
        assert_eq!(
            c.output_path("run", "abc").unwrap(),
            Path::new("run/tmpForRDKit_out_abc.txt")
        );
        assert_eq!(
            c.descriptor_path("."),
            Path::new("./rdkit_descriptors.txt")
        );
    }

    #[test]
    fn load() {
        let got = Config::load("testfiles/rdesc.toml").unwrap();
        let want = Config {
            input_template: "in_{}.smi".to_owned(),
            progress_interval: 2,
            ..Config::default()
        };
        assert_eq!(got, want);
    }

    #[test]
    fn partial_file_uses_defaults() {
        let got: Config = toml::from_str("progress_interval = 0").unwrap();
        assert_eq!(got.progress_interval, 0);
        assert_eq!(got.descriptor_file, "rdkit_descriptors.txt");
    }

    #[test]
    fn bad_template() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "output_template = \"out.csv\"\n").unwrap();
        assert!(matches!(Config::load(&path), Err(Error::Template(_))));

        std::fs::write(&path, "progress_interval = \"often\"\n").unwrap();
        assert!(matches!(Config::load(&path), Err(Error::Config(_))));

        assert!(matches!(
            Config::load(dir.path().join("missing.toml")),
            Err(Error::Io { .. })
        ));
    }
}
