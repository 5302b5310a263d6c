//! Two-pass assembler for PEGAS programs.

pub mod assembler;
pub mod label;
pub mod util;

pub use assembler::{Assembler, Program};

use arch::{path, Result, ASM_EXT};
use std::path::Path;

pub fn assemble_program(src: &str) -> Result<Program> {
    Assembler::new(src.as_bytes())?.assemble()
}

/// Assemble `src` into a complete binary image.
pub fn assemble(src: &str) -> Result<Vec<u8>> {
    assemble_program(src).map(|prog| prog.bin)
}

/// Assemble the file at `input` and write the binary to `output`.
///
/// Nothing is written unless assembly succeeds.
pub fn assemble_file(input: &Path, output: &Path) -> Result<Program> {
    path::expect_ext(input, ASM_EXT)?;
    let src = path::read_file(input)?;
    let prog = Assembler::new(&src)?.assemble()?;
    path::write_file(output, &prog.bin)?;
    log::info!(
        "{} -> {} ({} bytes, {} labels)",
        input.display(),
        output.display(),
        prog.bin.len(),
        prog.labels.len()
    );
    Ok(prog)
}
