use crate::{cmd::Cmd, operand::Operand, Addr};

use color_print::cformat;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arg {
    None,
    Label(Addr),
    Memory(Operand),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inst {
    pub cmd: Cmd,
    pub arg: Arg,
}

impl Inst {
    pub fn new(cmd: Cmd, arg: Arg) -> Self {
        Inst { cmd, arg }
    }

    pub fn opcode(&self) -> u8 {
        let flags = match &self.arg {
            Arg::Memory(op) => op.flags(),
            _ => 0,
        };
        u8::from(self.cmd) | flags
    }

    /// Append the encoded instruction to `out`.
    pub fn encode(&self, out: &mut Vec<u8>) {
        out.push(self.opcode());
        match &self.arg {
            Arg::None => {}
            Arg::Label(addr) => out.extend_from_slice(&addr.to_le_bytes()),
            Arg::Memory(op) => op.encode(out),
        }
    }

    pub fn len(&self) -> usize {
        1 + match &self.arg {
            Arg::None => 0,
            Arg::Label(_) => std::mem::size_of::<Addr>(),
            Arg::Memory(op) => Operand::width(op.flags()),
        }
    }
}

impl fmt::Display for Inst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.arg {
            Arg::None => write!(f, "{}", self.cmd),
            Arg::Label(addr) => write!(f, "{} 0x{:08X}", self.cmd, addr),
            Arg::Memory(op) => write!(f, "{} {}", self.cmd, op),
        }
    }
}

impl Inst {
    pub fn cformat(&self) -> String {
        let name = self.cmd.mnemonic();
        match &self.arg {
            Arg::None => cformat!("<r>{:<6}</>", name),
            Arg::Label(addr) => cformat!("<r>{:<6}</><g>0x{:0>8X}</>", name, addr),
            Arg::Memory(op @ Operand::Imm(_)) => cformat!("<r>{:<6}</><y>{}</>", name, op),
            Arg::Memory(op) => cformat!("<r>{:<6}</><b>{}</>", name, op),
        }
    }
}
