use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::Deserialize;
use strum::{Display, EnumCount, EnumIter, EnumString};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Deserialize,
    TryFromPrimitive,
    IntoPrimitive,
    EnumString,
    EnumIter,
    EnumCount,
    Display,
)]
#[repr(u8)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Reg {
    AX,
    BX,
    CX,
    DX,
    EX,
    FX,
    GX,
    HX,
    IX,
    JX,
    KX,
    LX,
    MX,
    NX,
    OX,
    PX,
}

impl Reg {
    pub const NUM: usize = <Self as EnumCount>::COUNT;

    pub fn parse(s: &str) -> Option<Self> {
        s.parse::<Self>().ok()
    }

    pub fn from_id(id: u8) -> Option<Self> {
        Self::try_from(id).ok()
    }

    pub fn id(self) -> u8 {
        self.into()
    }

    pub fn index(self) -> usize {
        self.id() as usize
    }
}
