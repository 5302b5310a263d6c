//! Disassembler for PEGAS binaries. Label names are synthesized as `L<n>`,
//! numbered in address order.

pub mod disassembler;
pub mod labels;

pub use disassembler::Disassembler;

use arch::{path, Result, EXEC_EXT};
use std::path::Path;

/// Disassemble a complete binary image into source text.
pub fn disassemble(bin: &[u8]) -> Result<String> {
    let mut out = vec![];
    Disassembler::new(bin)?.emit(&mut out, "<memory>")?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Disassemble the binary at `input` into `output`.
///
/// The text is built in memory first, so a failing binary leaves no file
/// behind.
pub fn disassemble_file(input: &Path, output: &Path) -> Result<()> {
    path::expect_ext(input, EXEC_EXT)?;
    let bin = path::read_file(input)?;
    let dis = Disassembler::new(&bin)?;
    let mut out = vec![];
    dis.emit(&mut out, &output.display().to_string())?;
    path::write_file(output, &out)?;
    log::info!(
        "{} -> {} ({} labels)",
        input.display(),
        output.display(),
        dis.labels().len()
    );
    Ok(())
}
