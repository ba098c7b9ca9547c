//! Closed error kinds, per spec section 7.
//!
//! Field extractors never fail (they read fixed bit ranges). The
//! classifier never fails either: an unrecognised encoding is the
//! `Tag::Invalid` value, not an `Err`. `StepError` is what an executor
//! returns when a step cannot complete; `StepOutcome` is the richer value
//! the hart driver reduces a step to.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum StepError {
    #[error("memory access out of bounds")]
    OutOfBounds,
    #[error("invalid instruction")]
    InvalidInstruction,
    #[error("invalid CSR index 0x{0:x}")]
    InvalidCsr(u16),
    #[error("illegal vtype")]
    IllegalVtype,
    #[error("unimplemented instruction family")]
    Failure,
}

/// What the hart driver observed after fetching and (attempting to)
/// execute one instruction. `Done` is the sentinel zero-word fetch; it is
/// deliberately not folded into [`StepError`] since reaching the
/// termination sentinel is not a failure.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum StepOutcome {
    Continue,
    Done,
    Failure(StepError),
}

#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum CsrError {
    #[error("CSR 0x{0:x} does not exist (illegal instruction)")]
    NonExistentCsr(u16),
    #[error("attempted write to read-only CSR 0x{0:x} (illegal instruction)")]
    ReadOnlyCsr(u16),
}

#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum VectorError {
    #[error("unsupported SEW/LMUL combination for vtype (vill)")]
    IllegalVtype,
    #[error("vector register group base {base} is not aligned to LMUL {lmul}")]
    Misaligned { base: u8, lmul: u8 },
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("I/O error reading program image: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse ELF file: {0}")]
    Elf(String),
    #[error("ELF file has no .text section")]
    MissingText,
    #[error("program image of {size} bytes does not fit at offset {offset} in {memory_size} bytes of memory")]
    TooLarge {
        size: usize,
        offset: usize,
        memory_size: usize,
    },
}
