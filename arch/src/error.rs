use crate::{cmd::ArgKind, Addr};
use std::fmt;
use thiserror::Error;

/// Where an error was detected: a source line or a byte offset in the binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Loc {
    Line(usize),
    Offset(Addr),
}

impl fmt::Display for Loc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Loc::Line(line) => write!(f, "line {}", line),
            Loc::Offset(addr) => write!(f, "offset 0x{:08X}", addr),
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Memory allocation failed: {0}")]
    AllocationFailure(String),

    #[error("Unknown command `{token}` at {at}")]
    UnknownCommand { token: String, at: Loc },

    #[error("Wrong token `{token}` at {at}")]
    WrongToken { token: String, at: Loc },

    #[error("Wrong argument `{token}` at {at}")]
    WrongArgument { token: String, at: Loc },

    #[error("Missing {kind} argument for `{cmd}` at {at}")]
    MissingArgument { cmd: String, kind: ArgKind, at: Loc },

    #[error("Label was not declared: `{name}` (first used at {at})")]
    UnknownLabel { name: String, at: Loc },

    #[error("Unknown instruction 0x{byte:02X} at {at}")]
    UnknownInstruction { byte: u8, at: Loc },

    #[error("Wrong signature: 0x{found:016X}")]
    WrongSignature { found: u64 },

    #[error("Incompatible file version: {found} > {supported}")]
    IncompatibleVersion { found: u32, supported: u32 },

    #[error("Operand of `{cmd}` runs past the end of the program at {at}")]
    TruncatedOperand { cmd: String, at: Loc },

    #[error("Pop from empty {stack} stack at {at}")]
    StackUnderflow { stack: &'static str, at: Loc },

    #[error("Address {addr} is out of range at {at}")]
    AddressOutOfRange { addr: i64, at: Loc },

    #[error("Arithmetic fault: {reason} at {at}")]
    ArithmeticFault { reason: &'static str, at: Loc },

    #[error("Processor already faulted at {at}")]
    Faulted { at: Loc },

    #[error("No input available at {at}")]
    InputFailure { at: Loc },

    #[error("Label target 0x{target:08X} is not on an instruction boundary (at {at})")]
    LabelMismatch { target: Addr, at: Loc },

    #[error("Wrong file extension: `{0}` (expected .{1})")]
    WrongExtension(String, &'static str),

    #[error("Failed to open file: {0}")]
    FileOpen(String, #[source] std::io::Error),

    #[error("Failed to read file: {0}")]
    FileRead(String, #[source] std::io::Error),

    #[error("Failed to create file: {0}")]
    FileCreate(String, #[source] std::io::Error),

    #[error("Failed to write file: {0}")]
    FileWrite(String, #[source] std::io::Error),
}

impl Error {
    /// Short kind name used as the diagnostic headline.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::AllocationFailure(_) => "allocation failure",
            Error::UnknownCommand { .. } => "unknown command",
            Error::WrongToken { .. } => "wrong token",
            Error::WrongArgument { .. } => "wrong argument",
            Error::MissingArgument { .. } => "missing argument",
            Error::UnknownLabel { .. } => "unknown label",
            Error::UnknownInstruction { .. } => "unknown instruction",
            Error::WrongSignature { .. } => "wrong signature",
            Error::IncompatibleVersion { .. } => "wrong signature",
            Error::TruncatedOperand { .. } => "truncated operand",
            Error::StackUnderflow { .. } => "stack underflow",
            Error::AddressOutOfRange { .. } => "address out of range",
            Error::ArithmeticFault { .. } => "arithmetic fault",
            Error::Faulted { .. } => "faulted",
            Error::InputFailure { .. } => "input failure",
            Error::LabelMismatch { .. } => "label mismatch",
            Error::WrongExtension(..) => "wrong extension",
            Error::FileOpen(..)
            | Error::FileRead(..)
            | Error::FileCreate(..)
            | Error::FileWrite(..) => "io",
        }
    }

    /// Source location, when the error has one.
    pub fn loc(&self) -> Option<Loc> {
        match self {
            Error::UnknownCommand { at, .. }
            | Error::WrongToken { at, .. }
            | Error::WrongArgument { at, .. }
            | Error::MissingArgument { at, .. }
            | Error::UnknownLabel { at, .. }
            | Error::UnknownInstruction { at, .. }
            | Error::TruncatedOperand { at, .. }
            | Error::StackUnderflow { at, .. }
            | Error::AddressOutOfRange { at, .. }
            | Error::ArithmeticFault { at, .. }
            | Error::Faulted { at }
            | Error::InputFailure { at }
            | Error::LabelMismatch { at, .. } => Some(*at),
            _ => None,
        }
    }

    /// Version mismatches are printed as warnings rather than hard errors.
    pub fn is_warning(&self) -> bool {
        matches!(self, Error::IncompatibleVersion { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
