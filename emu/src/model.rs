use crate::{device::Device, hooks::Hook};
use arch::{
    cmd::Cmd,
    codec::{self, Header, HEADER_LEN},
    inst::{Arg, Inst},
    operand::Operand,
    path,
    reg::Reg,
    Addr, Error, Loc, Result, Word, EXEC_EXT, MEMORY_SIZE, REGS_NUMBER, VIDEO_MEM_SIZE,
    VIDEO_WIDTH,
};
use std::path::Path;

/// How [`Processor::run`] stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// `hlt` or end of the instruction stream.
    Halted,
    /// The step limit was reached first.
    StepLimit,
}

/// Where a memory operand lives once its effective address is known.
#[derive(Debug, Clone, Copy)]
enum Place {
    Value(Word),
    Reg(Reg),
    Cell(usize),
}

pub struct Processor {
    code: Vec<u8>,
    ip: usize,
    regs: [Word; REGS_NUMBER],
    mem: Vec<Word>,
    stack: Vec<Word>,
    calls: Vec<Addr>,
    halted: bool,
    /// Address of the instruction that faulted; the machine is dead once set.
    fault: Option<Addr>,
}

// Loading
impl Processor {
    /// Validate the header of `bin` and prepare a fresh machine for it.
    pub fn load(bin: Vec<u8>) -> Result<Self> {
        let start = Header::validate(&bin)?;
        let mut mem = Vec::new();
        mem.try_reserve_exact(MEMORY_SIZE)
            .map_err(|_| Error::AllocationFailure("processor memory".to_string()))?;
        mem.resize(MEMORY_SIZE, 0);
        let halted = start == bin.len();
        Ok(Processor {
            code: bin,
            ip: start,
            regs: [0; REGS_NUMBER],
            mem,
            stack: Vec::new(),
            calls: Vec::new(),
            halted,
            fault: None,
        })
    }

    pub fn load_file(file: &Path) -> Result<Self> {
        path::expect_ext(file, EXEC_EXT)?;
        Self::load(path::read_file(file)?)
    }
}

// Inspection
impl Processor {
    pub fn ip(&self) -> Addr {
        self.ip as Addr
    }

    pub fn code(&self) -> &[u8] {
        &self.code
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn is_faulted(&self) -> bool {
        self.fault.is_some()
    }

    /// Offset of the instruction that faulted, if any.
    pub fn fault(&self) -> Option<Addr> {
        self.fault
    }

    pub fn reg(&self, reg: Reg) -> Word {
        self.regs[reg.index()]
    }

    pub fn set_reg(&mut self, reg: Reg, val: Word) {
        self.regs[reg.index()] = val;
    }

    pub fn mem(&self, addr: usize) -> Option<Word> {
        self.mem.get(addr).copied()
    }

    pub fn set_mem(&mut self, addr: usize, val: Word) -> Result<()> {
        let cell = self.mem.get_mut(addr).ok_or(Error::AddressOutOfRange {
            addr: addr as i64,
            at: Loc::Offset(self.ip as Addr),
        })?;
        *cell = val;
        Ok(())
    }

    /// Value stack, bottom first.
    pub fn stack(&self) -> &[Word] {
        &self.stack
    }

    /// Return addresses, innermost last.
    pub fn calls(&self) -> &[Addr] {
        &self.calls
    }

    /// Row-major snapshot of the video region.
    pub fn video(&self) -> &[Word] {
        &self.mem[..VIDEO_MEM_SIZE]
    }

    pub fn push_value(&mut self, val: Word) -> Result<()> {
        self.push(val)
    }
}

// Execution
impl Processor {
    /// Run until halt, fault or `tmax` executed instructions.
    pub fn run(
        &mut self,
        dev: &mut dyn Device,
        hooks: &mut [Box<dyn Hook>],
        tmax: Option<u64>,
    ) -> Result<Exit> {
        for hook in hooks.iter_mut() {
            hook.init(self);
        }
        let mut time = 0;
        while !self.halted {
            if tmax.is_some_and(|t| time >= t) {
                return Ok(Exit::StepLimit);
            }
            if let Some((addr, inst)) = self.step(dev)? {
                for hook in hooks.iter_mut() {
                    hook.exec(time, addr, &inst, self);
                }
            }
            time += 1;
        }
        Ok(Exit::Halted)
    }

    /// Fetch, decode and execute one instruction. Returns the address and
    /// decoded form of what was executed, or `None` once halted.
    ///
    /// A fault is terminal: `ip` stays on the faulting instruction and every
    /// later call fails with [`Error::Faulted`].
    pub fn step(&mut self, dev: &mut dyn Device) -> Result<Option<(Addr, Inst)>> {
        if let Some(addr) = self.fault {
            return Err(Error::Faulted {
                at: Loc::Offset(addr),
            });
        }
        if self.halted {
            return Ok(None);
        }
        let addr = self.ip;
        match self.cycle(addr, dev) {
            Ok(inst) => Ok(Some((addr as Addr, inst))),
            Err(err) => {
                log::info!("faulted at {:08X}: {}", addr, err);
                self.ip = addr;
                self.fault = Some(addr as Addr);
                Err(err)
            }
        }
    }

    fn cycle(&mut self, addr: usize, dev: &mut dyn Device) -> Result<Inst> {
        let (inst, next) = codec::decode(&self.code, addr)?;
        log::debug!("[{:08X}] {}", addr, inst);
        self.ip = next;
        self.exec(&inst, Loc::Offset(addr as Addr), dev)?;
        if self.ip >= self.code.len() {
            self.halted = true;
        }
        Ok(inst)
    }

    fn exec(&mut self, inst: &Inst, at: Loc, dev: &mut dyn Device) -> Result<()> {
        use Cmd::*;
        match inst.cmd {
            HLT => self.halted = true,
            PUSH => {
                let val = self.value(self.place(inst, at)?);
                self.push(val)?;
            }
            POP => {
                let place = self.place(inst, at)?;
                let val = self.pop(at)?;
                self.store(place, val, at)?;
            }
            ADD => self.binary(at, |a, b| Ok(a.wrapping_add(b)))?,
            SUB => self.binary(at, |a, b| Ok(a.wrapping_sub(b)))?,
            MUL => self.binary(at, |a, b| Ok(a.wrapping_mul(b)))?,
            DIV => self.binary(at, |a, b| match b {
                0 => Err(Error::ArithmeticFault {
                    reason: "division by zero",
                    at,
                }),
                _ => Ok(a.wrapping_div(b)),
            })?,
            SQRT => {
                let a = self.pop(at)?;
                if a < 0 {
                    return Err(Error::ArithmeticFault {
                        reason: "square root of a negative value",
                        at,
                    });
                }
                self.push((a as f64).sqrt() as Word)?;
            }
            DUP => {
                let top = *self.stack.last().ok_or(Error::StackUnderflow {
                    stack: "value",
                    at,
                })?;
                self.push(top)?;
            }
            IN => {
                let val = dev.input().ok_or(Error::InputFailure { at })?;
                self.push(val)?;
            }
            OUT => {
                let val = self.pop(at)?;
                dev.output(val);
            }
            INC => self.modify(inst, at, |v| v.wrapping_add(1))?,
            DEC => self.modify(inst, at, |v| v.wrapping_sub(1))?,
            JMP => {
                let target = self.target(inst, at)?;
                self.jump(target, at)?;
            }
            JA => self.branch(inst, at, |a, b| a > b)?,
            JAE => self.branch(inst, at, |a, b| a >= b)?,
            JB => self.branch(inst, at, |a, b| a < b)?,
            JBE => self.branch(inst, at, |a, b| a <= b)?,
            JE => self.branch(inst, at, |a, b| a == b)?,
            JNE => self.branch(inst, at, |a, b| a != b)?,
            CALL => {
                let target = self.target(inst, at)?;
                self.calls
                    .try_reserve(1)
                    .map_err(|_| Error::AllocationFailure("address stack".to_string()))?;
                self.calls.push(self.ip as Addr);
                self.jump(target, at)?;
            }
            RET => {
                let target = self.calls.pop().ok_or(Error::StackUnderflow {
                    stack: "address",
                    at,
                })?;
                self.jump(target, at)?;
            }
            DRAW => dev.redraw(self.video(), VIDEO_WIDTH),
        }
        Ok(())
    }

    fn push(&mut self, val: Word) -> Result<()> {
        self.stack
            .try_reserve(1)
            .map_err(|_| Error::AllocationFailure("value stack".to_string()))?;
        self.stack.push(val);
        Ok(())
    }

    fn pop(&mut self, at: Loc) -> Result<Word> {
        self.stack.pop().ok_or(Error::StackUnderflow {
            stack: "value",
            at,
        })
    }

    fn binary(&mut self, at: Loc, op: impl Fn(Word, Word) -> Result<Word>) -> Result<()> {
        let b = self.pop(at)?;
        let a = self.pop(at)?;
        self.push(op(a, b)?)
    }

    fn branch(&mut self, inst: &Inst, at: Loc, cond: impl Fn(Word, Word) -> bool) -> Result<()> {
        let target = self.target(inst, at)?;
        let b = self.pop(at)?;
        let a = self.pop(at)?;
        if cond(a, b) {
            self.jump(target, at)?;
        }
        Ok(())
    }

    fn modify(&mut self, inst: &Inst, at: Loc, f: impl Fn(Word) -> Word) -> Result<()> {
        let place = self.place(inst, at)?;
        let val = f(self.value(place));
        self.store(place, val, at)
    }

    fn target(&self, inst: &Inst, at: Loc) -> Result<Addr> {
        match inst.arg {
            Arg::Label(addr) => Ok(addr),
            _ => Err(Error::WrongArgument {
                token: inst.to_string(),
                at,
            }),
        }
    }

    /// Targets may point anywhere in the instruction stream, or just past it.
    fn jump(&mut self, target: Addr, at: Loc) -> Result<()> {
        match usize::try_from(target) {
            Ok(t) if (HEADER_LEN..=self.code.len()).contains(&t) => {
                self.ip = t;
                Ok(())
            }
            _ => Err(Error::AddressOutOfRange {
                addr: i64::try_from(target).unwrap_or(i64::MAX),
                at,
            }),
        }
    }

    fn place(&self, inst: &Inst, at: Loc) -> Result<Place> {
        let op = match inst.arg {
            Arg::Memory(op) => op,
            _ => {
                return Err(Error::WrongArgument {
                    token: inst.to_string(),
                    at,
                })
            }
        };
        Ok(match op {
            Operand::Imm(val) => Place::Value(val),
            Operand::Reg(reg) => Place::Reg(reg),
            Operand::Addr(addr) => Place::Cell(cell_index(addr as i64, at)?),
            Operand::RegOffset(reg, offset) => {
                let addr = (self.reg(reg) as i64).saturating_add(offset);
                Place::Cell(cell_index(addr, at)?)
            }
        })
    }

    fn value(&self, place: Place) -> Word {
        match place {
            Place::Value(val) => val,
            Place::Reg(reg) => self.reg(reg),
            Place::Cell(idx) => self.mem[idx],
        }
    }

    fn store(&mut self, place: Place, val: Word, at: Loc) -> Result<()> {
        match place {
            Place::Value(_) => {
                return Err(Error::WrongArgument {
                    token: format!("{}", val),
                    at,
                })
            }
            Place::Reg(reg) => self.set_reg(reg, val),
            Place::Cell(idx) => self.mem[idx] = val,
        }
        Ok(())
    }
}

fn cell_index(addr: i64, at: Loc) -> Result<usize> {
    usize::try_from(addr)
        .ok()
        .filter(|&idx| idx < MEMORY_SIZE)
        .ok_or(Error::AddressOutOfRange { addr, at })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn program(insts: &[Inst]) -> Vec<u8> {
        let mut bin = Header::current().to_bytes().to_vec();
        for inst in insts {
            inst.encode(&mut bin);
        }
        bin
    }

    #[test]
    fn empty_program_is_halted() {
        let cpu = Processor::load(program(&[])).unwrap();
        assert!(cpu.is_halted());
        assert_eq!(cpu.ip(), HEADER_LEN as Addr);
    }

    #[test]
    fn memory_is_zeroed() {
        let cpu = Processor::load(program(&[])).unwrap();
        assert_eq!(cpu.video().len(), VIDEO_MEM_SIZE);
        assert_eq!(cpu.mem(0), Some(0));
        assert_eq!(cpu.mem(MEMORY_SIZE - 1), Some(0));
        assert_eq!(cpu.mem(MEMORY_SIZE), None);
    }

    #[test]
    fn cell_bounds() {
        let at = Loc::Offset(12);
        assert_eq!(cell_index(0, at).unwrap(), 0);
        assert_eq!(cell_index(MEMORY_SIZE as i64 - 1, at).unwrap(), MEMORY_SIZE - 1);
        assert!(cell_index(MEMORY_SIZE as i64, at).is_err());
        assert!(cell_index(-1, at).is_err());
    }

    #[test]
    fn jump_bounds() {
        let bin = program(&[Inst::new(Cmd::HLT, Arg::None)]);
        let mut cpu = Processor::load(bin).unwrap();
        let at = Loc::Offset(12);
        assert!(cpu.jump(12, at).is_ok());
        assert!(cpu.jump(13, at).is_ok());
        assert!(matches!(
            cpu.jump(14, at),
            Err(Error::AddressOutOfRange { addr: 14, .. })
        ));
        assert!(cpu.jump(11, at).is_err());
        assert!(!cpu.is_faulted());
        assert!(matches!(
            cpu.jump(u64::MAX, at),
            Err(Error::AddressOutOfRange { addr: i64::MAX, .. })
        ));
    }
}
