use std::path::PathBuf;
use std::process;

use clap::Parser;

use grader_core::byte_stream::ByteStream;
use grader_core::compare;
use grader_core::error::Result;

/// File comparator invoked by the grading pipeline as a subprocess.
/// The outcome travels in the exit status: 1 = identical,
/// 2 = different, 3 = similar; anything else means failure.
#[derive(Parser)]
#[command(name = "grader_cell", version)]
struct Opts {
    /// first file to compare
    file_a: PathBuf,
    /// second file to compare
    file_b: PathBuf,
}

fn main() {
    let opts = Opts::parse();
    let code = match classify(&opts) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("grader_cell: {}", err);
            0
        }
    };
    process::exit(code);
}

fn classify(opts: &Opts) -> Result<i32> {
    let mut stream_a = ByteStream::open(&opts.file_a)?;
    let mut stream_b = ByteStream::open(&opts.file_b)?;
    let outcome = compare::compare(&mut stream_a, &mut stream_b)?;
    Ok(outcome.exit_code())
}
