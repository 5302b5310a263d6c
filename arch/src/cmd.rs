use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Low 6 bits of an opcode byte select the command.
pub const CMD_MASK: u8 = 0b0011_1111;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    TryFromPrimitive,
    IntoPrimitive,
    EnumString,
    EnumIter,
    IntoStaticStr,
    Display,
)]
#[repr(u8)]
#[strum(serialize_all = "lowercase")]
pub enum Cmd {
    HLT = 0,
    PUSH = 1,
    POP = 2,
    ADD = 3,
    SUB = 4,
    MUL = 5,
    DIV = 6,
    SQRT = 7,
    DUP = 8,
    IN = 9,
    OUT = 10,
    INC = 11,
    DEC = 12,
    JMP = 13,
    JA = 14,
    JAE = 15,
    JB = 16,
    JBE = 17,
    JE = 18,
    JNE = 19,
    CALL = 20,
    RET = 21,
    DRAW = 22,
}

/// How a memory argument is used by its command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Only the value is needed; every addressing mode is allowed.
    Read,
    /// The operand is a write target; immediates are rejected.
    Write,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    NoArgs,
    Label,
    Memory(Access),
}

impl std::fmt::Display for ArgKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArgKind::NoArgs => write!(f, "nothing"),
            ArgKind::Label => write!(f, "label"),
            ArgKind::Memory(Access::Read) => write!(f, "memory"),
            ArgKind::Memory(Access::Write) => write!(f, "writable memory"),
        }
    }
}

impl Cmd {
    pub fn parse(s: &str) -> Option<Self> {
        s.parse::<Self>().ok()
    }

    pub fn from_byte(byte: u8) -> Option<Self> {
        Self::try_from(byte & CMD_MASK).ok()
    }

    pub fn mnemonic(&self) -> &'static str {
        self.into()
    }

    pub fn arg_kind(&self) -> ArgKind {
        use Cmd::*;
        match self {
            HLT => ArgKind::NoArgs,
            PUSH => ArgKind::Memory(Access::Read),
            POP => ArgKind::Memory(Access::Write),
            ADD => ArgKind::NoArgs,
            SUB => ArgKind::NoArgs,
            MUL => ArgKind::NoArgs,
            DIV => ArgKind::NoArgs,
            SQRT => ArgKind::NoArgs,
            DUP => ArgKind::NoArgs,
            IN => ArgKind::NoArgs,
            OUT => ArgKind::NoArgs,
            INC => ArgKind::Memory(Access::Write),
            DEC => ArgKind::Memory(Access::Write),
            JMP => ArgKind::Label,
            JA => ArgKind::Label,
            JAE => ArgKind::Label,
            JB => ArgKind::Label,
            JBE => ArgKind::Label,
            JE => ArgKind::Label,
            JNE => ArgKind::Label,
            CALL => ArgKind::Label,
            RET => ArgKind::NoArgs,
            DRAW => ArgKind::NoArgs,
        }
    }
}
