use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::warn;

use crate::error::{Error, Result};
use crate::pipeline::GradingPipeline;
use crate::GradeRow;

/// The three resolved paths a batch needs, read from a plain config
/// file of three newline-separated fields.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub submissions_dir: PathBuf,
    pub reference_input: PathBuf,
    pub reference_output: PathBuf,
}

impl BatchConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let mut lines = content.lines().map(|line| line.trim());

        let mut field = |name: &str| -> Result<PathBuf> {
            match lines.next() {
                Some(line) if !line.is_empty() => Ok(PathBuf::from(line)),
                _ => Err(Error::Config(format!("missing field `{}`", name))),
            }
        };

        let config = Self {
            submissions_dir: field("submissions directory")?,
            reference_input: field("reference input")?,
            reference_output: field("reference output")?,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !self.submissions_dir.is_dir() {
            return Err(Error::Config(format!(
                "`{}` is not a directory",
                self.submissions_dir.display()
            )));
        }
        if !self.reference_input.is_file() {
            return Err(Error::Config(format!(
                "input file `{}` does not exist",
                self.reference_input.display()
            )));
        }
        if !self.reference_output.is_file() {
            return Err(Error::Config(format!(
                "output file `{}` does not exist",
                self.reference_output.display()
            )));
        }
        Ok(())
    }
}

/// Grade every subdirectory of the configured parent, in name order.
/// A submission that hits an infrastructure fault is logged and
/// dropped from the rows rather than scored.
pub fn run_batch(config: &BatchConfig, pipeline: &GradingPipeline) -> Result<Vec<GradeRow>> {
    let mut entries = fs::read_dir(&config.submissions_dir)?
        .collect::<io::Result<Vec<_>>>()?;
    entries.sort_by_key(|entry| entry.file_name());

    let mut rows = Vec::new();
    for entry in entries {
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let submission = entry.file_name().to_string_lossy().to_string();
        match pipeline.grade(
            &entry.path(),
            &config.reference_input,
            &config.reference_output,
        ) {
            Ok(grade) => rows.push(GradeRow { submission, grade }),
            Err(err) => warn!("submission `{}` dropped: {}", submission, err),
        }
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;

    #[test]
    fn parses_three_fields() {
        let dir = tempfile::tempdir().unwrap();
        let submissions = dir.path().join("submissions");
        fs::create_dir(&submissions).unwrap();
        let input = dir.path().join("input.txt");
        File::create(&input).unwrap();
        let output = dir.path().join("expected.txt");
        File::create(&output).unwrap();

        let config_path = dir.path().join("config.txt");
        let mut file = File::create(&config_path).unwrap();
        writeln!(file, "{}", submissions.display()).unwrap();
        writeln!(file, "{}", input.display()).unwrap();
        writeln!(file, "{}", output.display()).unwrap();

        let config = BatchConfig::from_file(&config_path).unwrap();
        assert_eq!(config.submissions_dir, submissions);
        assert_eq!(config.reference_input, input);
        assert_eq!(config.reference_output, output);
    }

    #[test]
    fn rejects_truncated_config() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.txt");
        fs::write(&config_path, "/tmp\n").unwrap();
        assert!(matches!(
            BatchConfig::from_file(&config_path),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn rejects_missing_paths() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.txt");
        fs::write(
            &config_path,
            "/no/such/dir\n/no/such/input\n/no/such/output\n",
        )
        .unwrap();
        assert!(matches!(
            BatchConfig::from_file(&config_path),
            Err(Error::Config(_))
        ));
    }
}
