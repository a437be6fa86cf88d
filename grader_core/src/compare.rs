use crate::byte_stream::ByteStream;
use crate::error::{Error, Result};
use crate::Grade;

/// Classification of two byte streams. `Identical` is strictly
/// stronger than `Similar` and is always decided first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOutcome {
    Identical,
    Different,
    Similar,
}

impl CompareOutcome {
    /// Process exit status used at the subprocess boundary.
    pub fn exit_code(&self) -> i32 {
        match self {
            CompareOutcome::Identical => 1,
            CompareOutcome::Different => 2,
            CompareOutcome::Similar => 3,
        }
    }

    pub fn from_exit_code(code: i32) -> Result<Self> {
        match code {
            1 => Ok(CompareOutcome::Identical),
            2 => Ok(CompareOutcome::Different),
            3 => Ok(CompareOutcome::Similar),
            other => Err(Error::Compare(format!("unexpected status {}", other))),
        }
    }
}

impl From<CompareOutcome> for Grade {
    fn from(v: CompareOutcome) -> Self {
        match v {
            CompareOutcome::Identical => Grade::Excellent,
            CompareOutcome::Similar => Grade::Similar,
            CompareOutcome::Different => Grade::Wrong,
        }
    }
}

/// Classify two streams in two passes: an exact byte-for-byte pass,
/// then (on freshly rewound streams, since the first pass consumes
/// bytes speculatively) a pass that skips whitespace runs and ignores
/// ASCII case.
pub fn compare(a: &mut ByteStream, b: &mut ByteStream) -> Result<CompareOutcome> {
    if are_identical(a, b)? {
        return Ok(CompareOutcome::Identical);
    }

    a.rewind()?;
    b.rewind()?;

    if are_similar(a, b)? {
        Ok(CompareOutcome::Similar)
    } else {
        Ok(CompareOutcome::Different)
    }
}

fn are_identical(a: &mut ByteStream, b: &mut ByteStream) -> Result<bool> {
    loop {
        match (a.next_byte()?, b.next_byte()?) {
            (None, None) => return Ok(true),
            (Some(x), Some(y)) if x == y => {}
            _ => return Ok(false),
        }
    }
}

fn next_non_space(stream: &mut ByteStream) -> Result<Option<u8>> {
    while let Some(byte) = stream.next_byte()? {
        if !byte.is_ascii_whitespace() {
            return Ok(Some(byte));
        }
    }
    Ok(None)
}

fn are_similar(a: &mut ByteStream, b: &mut ByteStream) -> Result<bool> {
    loop {
        match (next_non_space(a)?, next_non_space(b)?) {
            (None, None) => return Ok(true),
            (Some(x), Some(y)) => {
                if x.to_ascii_uppercase() != y.to_ascii_uppercase() {
                    return Ok(false);
                }
            }
            _ => return Ok(false),
        }
    }
}
