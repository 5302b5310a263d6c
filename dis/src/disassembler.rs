use crate::labels::{self, Labels};
use arch::{
    codec::{self, Header},
    inst::{Arg, Inst},
    Addr, Error, Loc, Result,
};
use std::io::Write;

/// Two-pass disassembler over a validated binary.
pub struct Disassembler<'a> {
    bin: &'a [u8],
    labels: Labels,
}

impl<'a> Disassembler<'a> {
    /// Check the header and collect every label target.
    pub fn new(bin: &'a [u8]) -> Result<Self> {
        Header::validate(bin)?;
        let mut labels = Labels::new();
        for item in codec::instructions(bin) {
            let (_, inst) = item?;
            if let Arg::Label(target) = inst.arg {
                labels.insert(target)?;
            }
        }
        log::info!("{} bytes, {} labels", bin.len(), labels.len());
        Ok(Disassembler { bin, labels })
    }

    pub fn labels(&self) -> &Labels {
        &self.labels
    }

    /// Write the source text to `out`; `name` identifies it in errors.
    pub fn emit(&self, out: &mut impl Write, name: &str) -> Result<()> {
        let mut put = |line: String| {
            writeln!(out, "{}", line).map_err(|e| Error::FileWrite(name.to_string(), e))
        };
        let mut next = 0;
        for item in codec::instructions(self.bin) {
            let (addr, inst) = item?;
            let addr = addr as Addr;
            while let Some(target) = self.labels.get(next) {
                if target > addr {
                    break;
                }
                if target < addr {
                    return Err(Error::LabelMismatch {
                        target,
                        at: Loc::Offset(addr),
                    });
                }
                put(format!("{}:", labels::name(next)))?;
                next += 1;
            }
            let line = self.line(&inst, addr)?;
            log::debug!("[{:08X}] {}", addr, line.trim_start());
            put(line)?;
        }

        let end = self.bin.len() as Addr;
        while let Some(target) = self.labels.get(next) {
            if target != end {
                return Err(Error::LabelMismatch {
                    target,
                    at: Loc::Offset(end),
                });
            }
            put(format!("{}:", labels::name(next)))?;
            next += 1;
        }
        Ok(())
    }

    fn line(&self, inst: &Inst, addr: Addr) -> Result<String> {
        let name = inst.cmd.mnemonic();
        Ok(match inst.arg {
            Arg::None => format!("\t{}", name),
            Arg::Label(target) => {
                let idx = self.labels.index_of(target).ok_or(Error::LabelMismatch {
                    target,
                    at: Loc::Offset(addr),
                })?;
                format!("\t{}\t{}", name, labels::name(idx))
            }
            Arg::Memory(op) => format!("\t{}\t{}", name, op),
        })
    }
}
