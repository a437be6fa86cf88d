pub mod batch;
pub mod byte_stream;
pub mod compare;
pub mod error;
pub mod pipeline;
pub mod policy;
pub mod runner;

use serde::{Deserialize, Serialize};

/// Final verdict for one submission, ordered from worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    NoSourceFile,
    CompilationError,
    Timeout,
    Wrong,
    Similar,
    Excellent,
}

impl Grade {
    pub fn score(&self) -> u32 {
        match self {
            Grade::NoSourceFile => 0,
            Grade::CompilationError => 10,
            Grade::Timeout => 20,
            Grade::Wrong => 50,
            Grade::Similar => 75,
            Grade::Excellent => 100,
        }
    }

    pub fn reason(&self) -> &'static str {
        match self {
            Grade::NoSourceFile => "NO_C_FILE",
            Grade::CompilationError => "COMPILATION_ERROR",
            Grade::Timeout => "TIMEOUT",
            Grade::Wrong => "WRONG",
            Grade::Similar => "SIMILAR",
            Grade::Excellent => "EXCELLENT",
        }
    }
}

/// One batch result: a submission together with its verdict.
/// Serialization of the row is the front end's business.
#[derive(Debug, Clone)]
pub struct GradeRow {
    pub submission: String,
    pub grade: Grade,
}
