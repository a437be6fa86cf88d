use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Grading constants injected into the pipeline. The defaults are the
/// reference policy; a YAML file can override any of them per run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GradePolicy {
    /// Compiler command, resolved through PATH at environment check.
    pub compiler: String,
    /// Extension a submission's source file must carry.
    #[serde(rename = "sourceExtension")]
    pub source_extension: String,
    /// Name of the compiled artifact inside the submission directory.
    #[serde(rename = "artifactName")]
    pub artifact_name: String,
    /// Name of the per-submission captured-output file.
    #[serde(rename = "captureName")]
    pub capture_name: String,
    /// Name of the error log shared by all stages of a submission.
    #[serde(rename = "errorLogName")]
    pub error_log_name: String,
    /// Wall-clock deadline for the execute stage.
    #[serde(rename = "timeLimit")]
    pub time_limit_ms: u64,
    /// Comparator executable; defaults to `grader_cell` next to the
    /// current executable.
    pub comparator: Option<PathBuf>,
}

impl Default for GradePolicy {
    fn default() -> Self {
        Self {
            compiler: "gcc".into(),
            source_extension: "c".into(),
            artifact_name: "a.out".into(),
            capture_name: "output.txt".into(),
            error_log_name: "errors.txt".into(),
            time_limit_ms: 5000,
            comparator: None,
        }
    }
}

impl GradePolicy {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let policy = serde_yaml::from_str(&content)?;
        Ok(policy)
    }

    pub fn deadline(&self) -> Duration {
        Duration::from_millis(self.time_limit_ms)
    }

    pub fn comparator_path(&self) -> Result<PathBuf> {
        match &self.comparator {
            Some(path) => Ok(path.clone()),
            None => {
                let exe = std::env::current_exe()?;
                let dir = exe
                    .parent()
                    .ok_or_else(|| Error::NotFound("executable directory".into()))?;
                Ok(dir.join("grader_cell"))
            }
        }
    }

    /// Verify the compiler can be found at all before a batch starts.
    pub fn check_environment(&self) -> Result<PathBuf> {
        which::which(&self.compiler)
            .map_err(|_| Error::Environment(format!("compiler `{}` not found", self.compiler)))
    }
}
