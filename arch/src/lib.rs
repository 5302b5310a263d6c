//! Shared definitions of the PEGAS toolchain: the instruction set table,
//! register names, memory-operand encodings, the binary file format and the
//! error taxonomy used by the assembler, the emulator and the disassembler.

pub mod cmd;
pub mod codec;
pub mod error;
pub mod inst;
pub mod msg;
pub mod operand;
pub mod path;
pub mod reg;

pub use error::{Error, Loc, Result};

/// Value held by a register or a memory cell.
pub type Word = i32;

/// Absolute byte offset inside a binary file.
pub type Addr = u64;

/// Extension of source files.
pub const ASM_EXT: &str = "asm";
/// Extension of executables.
pub const EXEC_EXT: &str = "pegas";

pub const REGS_NUMBER: usize = reg::Reg::NUM;
pub const VIDEO_WIDTH: usize = 256;
pub const VIDEO_HEIGHT: usize = 256;
pub const VIDEO_MEM_SIZE: usize = VIDEO_WIDTH * VIDEO_HEIGHT;
pub const MEMORY_SIZE: usize = VIDEO_MEM_SIZE * 2;
/// Longest label name, in bytes.
pub const MAX_TOKEN_SIZE: usize = 63;
