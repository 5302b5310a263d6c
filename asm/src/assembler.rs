use crate::label::Labels;
use arch::{
    cmd::{Access, ArgKind, Cmd},
    codec::{Header, HEADER_LEN},
    inst::{Arg, Inst},
    operand::Operand,
    Addr, Error, Loc, Result, MAX_TOKEN_SIZE,
};

/// Result of a successful assembly.
#[derive(Debug)]
pub struct Program {
    /// Complete binary, header included.
    pub bin: Vec<u8>,
    pub labels: Labels,
}

/// Two-pass assembler over a single source buffer.
///
/// The first pass emits code with 8-byte placeholders for label operands and
/// records every use site. [`Assembler::finish`] then patches each site with
/// the label's address.
pub struct Assembler {
    src: Vec<u8>,
    pos: usize,
    line: usize,
    out: Vec<u8>,
    labels: Labels,
}

impl Assembler {
    pub fn new(src: &[u8]) -> Result<Self> {
        let mut text = Vec::new();
        text.try_reserve_exact(src.len())
            .map_err(|_| Error::AllocationFailure("source buffer".to_string()))?;
        text.extend_from_slice(src);
        strip_comments(&mut text);

        let mut out = Vec::new();
        out.try_reserve(HEADER_LEN + src.len())
            .map_err(|_| Error::AllocationFailure("output buffer".to_string()))?;
        out.extend_from_slice(&Header::current().to_bytes());

        Ok(Assembler {
            src: text,
            pos: 0,
            line: 1,
            out,
            labels: Labels::new()?,
        })
    }

    /// Run both passes and hand back the binary.
    pub fn assemble(mut self) -> Result<Program> {
        while self.statement()? {}
        self.finish()
    }

    /// Parse and emit one statement. Returns `false` at end of input.
    fn statement(&mut self) -> Result<bool> {
        self.skip_whitespace();
        if self.pos >= self.src.len() {
            return Ok(false);
        }
        let at = Loc::Line(self.line);
        let start = self.pos;
        let word = self.word(|b| b == b':');

        if self.src.get(self.pos) == Some(&b':') {
            self.pos += 1;
            if !is_label_name(&word) {
                return Err(Error::WrongToken {
                    token: format!("{}:", word),
                    at,
                });
            }
            let addr = self.out.len() as Addr;
            if let Some(prev) = self.labels.declare(&word, addr, self.line)? {
                log::warn!(
                    "label `{}` redefined at line {}: 0x{:08X} -> 0x{:08X}",
                    word,
                    self.line,
                    prev,
                    addr
                );
            }
            log::debug!("{:>5}: {}: 0x{:08X}", self.line, word, addr);
            return Ok(true);
        }

        // The mnemonic ends at the first non-letter; the rest is its operand.
        let len = word.bytes().take_while(u8::is_ascii_alphabetic).count();
        if len > 0 {
            self.pos = start + len;
            let name = &word[..len];
            let cmd = Cmd::parse(name).ok_or_else(|| Error::UnknownCommand {
                token: name.to_string(),
                at,
            })?;
            self.instruction(cmd)?;
            return Ok(true);
        }

        Err(Error::WrongToken { token: word, at })
    }

    fn instruction(&mut self, cmd: Cmd) -> Result<()> {
        let arg = match cmd.arg_kind() {
            ArgKind::NoArgs => Arg::None,
            ArgKind::Label => {
                let (token, at) = self.operand(cmd)?;
                if !is_label_name(&token) {
                    return Err(Error::WrongArgument { token, at });
                }
                // The opcode goes at out.len(), the address right after it.
                let site = self.out.len() + 1;
                self.labels.refer(&token, site, self.line)?;
                Arg::Label(site as Addr)
            }
            ArgKind::Memory(access) => {
                let (token, at) = self.operand(cmd)?;
                match Operand::parse(&token) {
                    Some(op) if access == Access::Write && !op.is_writable() => {
                        return Err(Error::WrongArgument { token, at })
                    }
                    Some(op) => Arg::Memory(op),
                    None => return Err(Error::WrongArgument { token, at }),
                }
            }
        };

        let inst = Inst::new(cmd, arg);
        self.out
            .try_reserve(inst.len())
            .map_err(|_| Error::AllocationFailure("output buffer".to_string()))?;
        log::debug!("{:>5}: [{:08X}] {}", self.line, self.out.len(), inst);
        inst.encode(&mut self.out);
        Ok(())
    }

    /// Next whitespace-delimited token, which must exist.
    fn operand(&mut self, cmd: Cmd) -> Result<(String, Loc)> {
        self.skip_whitespace();
        let at = Loc::Line(self.line);
        if self.pos >= self.src.len() {
            return Err(Error::MissingArgument {
                cmd: cmd.mnemonic().to_string(),
                kind: cmd.arg_kind(),
                at,
            });
        }
        Ok((self.word(|_| false), at))
    }

    /// Patch every label use with its address.
    fn finish(mut self) -> Result<Program> {
        for (name, label) in self.labels.iter() {
            let addr = label.addr.ok_or_else(|| Error::UnknownLabel {
                name: name.to_string(),
                at: Loc::Line(label.line),
            })?;
            for &site in &label.uses {
                self.out[site..site + std::mem::size_of::<Addr>()]
                    .copy_from_slice(&addr.to_le_bytes());
            }
        }
        Ok(Program {
            bin: self.out,
            labels: self.labels,
        })
    }

    fn skip_whitespace(&mut self) {
        while let Some(&b) = self.src.get(self.pos) {
            if !b.is_ascii_whitespace() {
                break;
            }
            if b == b'\n' {
                self.line += 1;
            }
            self.pos += 1;
        }
    }

    /// Consume bytes up to whitespace or a byte matching `stop`.
    fn word(&mut self, stop: impl Fn(u8) -> bool) -> String {
        let start = self.pos;
        while let Some(&b) = self.src.get(self.pos) {
            if b.is_ascii_whitespace() || stop(b) {
                break;
            }
            self.pos += 1;
        }
        String::from_utf8_lossy(&self.src[start..self.pos]).into_owned()
    }
}

/// Blank out every `;` comment up to the end of its line.
fn strip_comments(src: &mut [u8]) {
    let mut in_comment = false;
    for b in src.iter_mut() {
        match *b {
            b'\n' => in_comment = false,
            b';' => {
                in_comment = true;
                *b = b' ';
            }
            _ if in_comment => *b = b' ',
            _ => {}
        }
    }
}

/// `[A-Za-z_.][A-Za-z0-9_.]*`, at most [`MAX_TOKEN_SIZE`] bytes.
pub fn is_label_name(s: &str) -> bool {
    let mut bytes = s.bytes();
    match bytes.next() {
        Some(b) if b.is_ascii_alphabetic() || b == b'_' || b == b'.' => {}
        _ => return false,
    }
    s.len() <= MAX_TOKEN_SIZE && bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'.')
}
