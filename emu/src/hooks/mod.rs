pub mod dump;

use crate::model::Processor;
use arch::{inst::Inst, Addr};

/// Observer attached to a run. Called once before the first instruction and
/// after every executed instruction.
pub trait Hook {
    fn init(&mut self, cpu: &Processor);
    fn exec(&mut self, time: u64, addr: Addr, inst: &Inst, cpu: &Processor);
}
