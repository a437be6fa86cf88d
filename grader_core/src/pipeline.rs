use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::compare::CompareOutcome;
use crate::error::{Error, Result};
use crate::policy::GradePolicy;
use crate::runner::{self, RunOutcome, RunSpec};
use crate::Grade;

/// Per-submission working state. Built at the start of one pipeline
/// run and discarded (with its artifacts) at the end of it.
struct SubmissionContext {
    dir: PathBuf,
    artifact: PathBuf,
    capture: PathBuf,
    error_log: PathBuf,
}

impl SubmissionContext {
    fn new(dir: &Path, policy: &GradePolicy) -> Self {
        Self {
            dir: dir.to_path_buf(),
            artifact: dir.join(&policy.artifact_name),
            capture: dir.join(&policy.capture_name),
            error_log: dir.join(&policy.error_log_name),
        }
    }
}

/// Runs {locate, compile, execute, compare} over one submission
/// directory and reduces the stage outcomes to a single `Grade`.
/// The `Err` arm is the infrastructure-fault class: the caller drops
/// the submission from the batch instead of scoring it.
pub struct GradingPipeline {
    policy: GradePolicy,
}

impl GradingPipeline {
    pub fn new(policy: GradePolicy) -> Self {
        Self { policy }
    }

    pub fn grade(
        &self,
        submission_dir: &Path,
        reference_input: &Path,
        reference_output: &Path,
    ) -> Result<Grade> {
        let context = SubmissionContext::new(submission_dir, &self.policy);

        let source = match self.locate_source(&context.dir)? {
            Some(path) => path,
            None => return Ok(Grade::NoSourceFile),
        };
        debug!("located source `{}`", source.display());

        if !self.compile(&context, &source)? {
            return Ok(Grade::CompilationError);
        }

        // the artifact is removed no matter how the run went
        let executed = self.execute(&context, reference_input);
        let artifact_cleanup = remove(&context.artifact);
        let executed = executed?;
        artifact_cleanup?;

        match executed {
            RunOutcome::Exited(code) => {
                debug!("program exited with code {}", code);
            }
            RunOutcome::Signaled(signal) => {
                debug!("program died on signal {}", signal);
                return Ok(Grade::Timeout);
            }
            RunOutcome::TimedOut | RunOutcome::LaunchFailed(_) => {
                return Ok(Grade::Timeout);
            }
        }

        // likewise for the captured output
        let compared = self.compare_outputs(&context, reference_output);
        let capture_cleanup = remove(&context.capture);
        let grade = compared?;
        capture_cleanup?;

        info!(
            "graded `{}`: {} ({})",
            submission_dir.display(),
            grade.score(),
            grade.reason()
        );
        Ok(grade)
    }

    /// Non-recursive scan for a regular file with the policy's source
    /// extension. Ties are broken by lexicographically smallest name
    /// so a re-run grades the same file.
    fn locate_source(&self, dir: &Path) -> Result<Option<PathBuf>> {
        let mut candidates = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let path = entry.path();
            let eligible = path
                .extension()
                .and_then(|extension| extension.to_str())
                .map(|extension| extension == self.policy.source_extension)
                .unwrap_or(false);
            if eligible {
                candidates.push(path);
            }
        }
        candidates.sort();
        Ok(candidates.into_iter().next())
    }

    fn compile(&self, context: &SubmissionContext, source: &Path) -> Result<bool> {
        let spec = RunSpec {
            command: PathBuf::from(&self.policy.compiler),
            args: vec![
                source.as_os_str().to_os_string(),
                "-o".into(),
                context.artifact.as_os_str().to_os_string(),
            ],
            stdin: None,
            stdout: None,
            stderr: context.error_log.clone(),
            deadline: None,
        };

        match runner::run(&spec)? {
            RunOutcome::Exited(0) => Ok(true),
            outcome => {
                debug!("compile failed: {:?}", outcome);
                Ok(false)
            }
        }
    }

    fn execute(&self, context: &SubmissionContext, reference_input: &Path) -> Result<RunOutcome> {
        let spec = RunSpec {
            command: context.artifact.clone(),
            args: Vec::new(),
            stdin: Some(reference_input.to_path_buf()),
            stdout: Some(context.capture.clone()),
            stderr: context.error_log.clone(),
            deadline: Some(self.policy.deadline()),
        };
        runner::run(&spec)
    }

    fn compare_outputs(
        &self,
        context: &SubmissionContext,
        reference_output: &Path,
    ) -> Result<Grade> {
        let spec = RunSpec {
            command: self.policy.comparator_path()?,
            args: vec![
                reference_output.as_os_str().to_os_string(),
                context.capture.as_os_str().to_os_string(),
            ],
            stdin: None,
            stdout: None,
            stderr: context.error_log.clone(),
            deadline: None,
        };

        match runner::run(&spec)? {
            RunOutcome::Exited(code) => {
                let outcome = CompareOutcome::from_exit_code(code)?;
                Ok(outcome.into())
            }
            outcome => Err(Error::Compare(format!("comparator did not exit: {:?}", outcome))),
        }
    }
}

fn remove(path: &Path) -> Result<()> {
    fs::remove_file(path).map_err(|source| Error::Cleanup {
        path: path.display().to_string(),
        source,
    })
}
