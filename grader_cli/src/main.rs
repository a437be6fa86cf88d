use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use log::info;

use grader_core::batch::{run_batch, BatchConfig};
use grader_core::error::Result;
use grader_core::pipeline::GradingPipeline;
use grader_core::policy::GradePolicy;

#[derive(Parser)]
#[command(
    name = "grader",
    version,
    about = "Compile, run and grade a batch of submissions."
)]
struct Opts {
    /// batch config: parent directory, input file and expected
    /// output file, one per line
    config: PathBuf,
    /// optional grading policy overrides (YAML)
    #[arg(long)]
    policy: Option<PathBuf>,
    /// where the result rows go
    #[arg(long, default_value = "results.csv")]
    output: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();
    let opts = Opts::parse();

    let policy = match &opts.policy {
        Some(path) => GradePolicy::from_file(path)?,
        None => GradePolicy::default(),
    };
    let compiler = policy.check_environment()?;
    info!("compiling with `{}`", compiler.display());

    let config = BatchConfig::from_file(&opts.config)?;
    let pipeline = GradingPipeline::new(policy);
    let rows = run_batch(&config, &pipeline)?;

    let mut out = File::create(&opts.output)?;
    for row in &rows {
        writeln!(
            out,
            "{},{},{}",
            row.submission,
            row.grade.score(),
            row.grade.reason()
        )?;
    }
    info!(
        "wrote {} result rows to `{}`",
        rows.len(),
        opts.output.display()
    );

    Ok(())
}
