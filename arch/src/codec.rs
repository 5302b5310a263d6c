use crate::{
    cmd::{Access, ArgKind, Cmd},
    error::{Error, Loc, Result},
    inst::{Arg, Inst},
    operand::{Operand, ADDR_FLAG, REG_FLAG},
    reg::Reg,
    Addr, Word,
};

/// `ITSPEGAS` read as a little-endian u64.
pub const SIGNATURE: u64 = 0x5341_4745_5053_5449;
pub const VERSION: u32 = 1;
pub const HEADER_LEN: usize = 8 + 4;

// ----------------------------------------------------------------------------
// Header

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub signature: u64,
    pub version: u32,
}

impl Header {
    pub fn current() -> Self {
        Header {
            signature: SIGNATURE,
            version: VERSION,
        }
    }

    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut buf = [0u8; HEADER_LEN];
        buf[..8].copy_from_slice(&self.signature.to_le_bytes());
        buf[8..].copy_from_slice(&self.version.to_le_bytes());
        buf
    }

    pub fn read(bin: &[u8]) -> Option<Self> {
        let signature = u64::from_le_bytes(bin.get(..8)?.try_into().ok()?);
        let version = u32::from_le_bytes(bin.get(8..HEADER_LEN)?.try_into().ok()?);
        Some(Header { signature, version })
    }

    /// Check that `bin` starts with a header this build can consume.
    /// Returns the offset of the first instruction.
    pub fn validate(bin: &[u8]) -> Result<usize> {
        let header = Header::read(bin).ok_or(Error::WrongSignature { found: 0 })?;
        if header.signature != SIGNATURE {
            return Err(Error::WrongSignature {
                found: header.signature,
            });
        }
        if header.version > VERSION {
            return Err(Error::IncompatibleVersion {
                found: header.version,
                supported: VERSION,
            });
        }
        Ok(HEADER_LEN)
    }
}

/// Decode the instruction at `ip`; returns it with the offset of the next one.
///
/// Shared by the processor fetch step and both disassembler passes so that
/// argument widths can never disagree between them.
pub fn decode(bin: &[u8], ip: usize) -> Result<(Inst, usize)> {
    let at = Loc::Offset(ip as Addr);
    let byte = *bin.get(ip).ok_or(Error::AddressOutOfRange {
        addr: ip as i64,
        at,
    })?;
    let cmd = Cmd::from_byte(byte).ok_or(Error::UnknownInstruction { byte, at })?;
    let flags = byte & (REG_FLAG | ADDR_FLAG);
    let mut rd = Reader {
        bin,
        pos: ip + 1,
        cmd,
        at,
    };

    let arg = match cmd.arg_kind() {
        ArgKind::NoArgs | ArgKind::Label if flags != 0 => {
            return Err(Error::WrongArgument {
                token: format!("{} with flags 0x{:02X}", cmd, flags),
                at,
            })
        }
        ArgKind::NoArgs => Arg::None,
        ArgKind::Label => Arg::Label(u64::from_le_bytes(rd.take()?)),
        ArgKind::Memory(access) => {
            let op = match (flags & REG_FLAG != 0, flags & ADDR_FLAG != 0) {
                (false, false) => Operand::Imm(Word::from_le_bytes(rd.take()?)),
                (true, false) => Operand::Reg(rd.reg()?),
                (false, true) => Operand::Addr(Word::from_le_bytes(rd.take()?)),
                (true, true) => {
                    let reg = rd.reg()?;
                    Operand::RegOffset(reg, i64::from_le_bytes(rd.take()?))
                }
            };
            if access == Access::Write && !op.is_writable() {
                return Err(Error::WrongArgument {
                    token: format!("{} {}", cmd, op),
                    at,
                });
            }
            Arg::Memory(op)
        }
    };
    Ok((Inst { cmd, arg }, rd.pos))
}

struct Reader<'a> {
    bin: &'a [u8],
    pos: usize,
    cmd: Cmd,
    at: Loc,
}

impl Reader<'_> {
    fn take<const N: usize>(&mut self) -> Result<[u8; N]> {
        let bytes = self
            .bin
            .get(self.pos..self.pos + N)
            .and_then(|s| <[u8; N]>::try_from(s).ok())
            .ok_or(Error::TruncatedOperand {
                cmd: self.cmd.to_string(),
                at: self.at,
            })?;
        self.pos += N;
        Ok(bytes)
    }

    fn reg(&mut self) -> Result<Reg> {
        let [id] = self.take::<1>()?;
        Reg::from_id(id).ok_or(Error::WrongArgument {
            token: format!("register #{}", id),
            at: self.at,
        })
    }
}

/// Iterate over every instruction after the header.
pub fn instructions(bin: &[u8]) -> Instructions<'_> {
    Instructions {
        bin,
        ip: HEADER_LEN,
    }
}

pub struct Instructions<'a> {
    bin: &'a [u8],
    ip: usize,
}

impl Iterator for Instructions<'_> {
    type Item = Result<(usize, Inst)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.ip >= self.bin.len() {
            return None;
        }
        match decode(self.bin, self.ip) {
            Ok((inst, next)) => {
                let addr = self.ip;
                self.ip = next;
                Some(Ok((addr, inst)))
            }
            Err(e) => {
                self.ip = self.bin.len();
                Some(Err(e))
            }
        }
    }
}
