use crate::{reg::Reg, Word};
use std::fmt;

/// Opcode bit 6: the operand names a register.
pub const REG_FLAG: u8 = 1 << 6;
/// Opcode bit 7: the operand names a memory cell.
pub const ADDR_FLAG: u8 = 1 << 7;

// ----------------------------------------------------------------------------
// Memory argument

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    /// `5`
    Imm(Word),
    /// `bx`
    Reg(Reg),
    /// `[100]`
    Addr(Word),
    /// `[bx]`, `8[bx]`
    RegOffset(Reg, i64),
}

impl Operand {
    pub fn flags(&self) -> u8 {
        match self {
            Operand::Imm(_) => 0,
            Operand::Reg(_) => REG_FLAG,
            Operand::Addr(_) => ADDR_FLAG,
            Operand::RegOffset(..) => REG_FLAG | ADDR_FLAG,
        }
    }

    /// Number of operand bytes that follow an opcode byte carrying `flags`.
    pub fn width(flags: u8) -> usize {
        match (flags & REG_FLAG != 0, flags & ADDR_FLAG != 0) {
            (false, _) => std::mem::size_of::<Word>(),
            (true, false) => 1,
            (true, true) => 1 + std::mem::size_of::<i64>(),
        }
    }

    pub fn is_writable(&self) -> bool {
        !matches!(self, Operand::Imm(_))
    }

    pub fn encode(&self, out: &mut Vec<u8>) {
        match self {
            Operand::Imm(v) | Operand::Addr(v) => out.extend_from_slice(&v.to_le_bytes()),
            Operand::Reg(r) => out.push(r.id()),
            Operand::RegOffset(r, offset) => {
                out.push(r.id());
                out.extend_from_slice(&offset.to_le_bytes());
            }
        }
    }

    /// Parse the surface syntax accepted by the assembler.
    ///
    /// Bracketed forms take precedence over bare registers, which take
    /// precedence over integer constants.
    pub fn parse(token: &str) -> Option<Operand> {
        if let Some(body) = token.strip_suffix(']') {
            let (offset, inner) = body.split_once('[')?;
            if let Some(reg) = Reg::parse(inner) {
                let offset = match offset {
                    "" => 0,
                    s => parse_with_prefix(s)?,
                };
                return Some(Operand::RegOffset(reg, offset));
            }
            if offset.is_empty() {
                let addr = parse_with_prefix(inner)?;
                return Word::try_from(addr).ok().map(Operand::Addr);
            }
            return None;
        }
        if let Some(reg) = Reg::parse(token) {
            return Some(Operand::Reg(reg));
        }
        let val = parse_with_prefix(token)?;
        Word::try_from(val).ok().map(Operand::Imm)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Imm(v) => write!(f, "{}", v),
            Operand::Reg(r) => write!(f, "{}", r),
            Operand::Addr(a) => write!(f, "[{}]", a),
            Operand::RegOffset(r, 0) => write!(f, "[{}]", r),
            Operand::RegOffset(r, offset) => write!(f, "{}[{}]", offset, r),
        }
    }
}

/// Signed integer with an optional `0b`/`0o`/`0x` prefix.
pub fn parse_with_prefix(s: &str) -> Option<i64> {
    let (neg, s) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let (radix, num) = match s.get(..2) {
        Some("0b") => (2, &s[2..]),
        Some("0o") => (8, &s[2..]),
        Some("0x") => (16, &s[2..]),
        _ => (10, s),
    };
    if num.starts_with(['+', '-']) {
        return None;
    }
    let mag = u64::from_str_radix(num, radix).ok()? as i128;
    i64::try_from(if neg { -mag } else { mag }).ok()
}
