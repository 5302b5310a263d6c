//! PEGAS virtual machine: the processor model, the devices it talks to and
//! the debugger hooks that observe it.

pub mod device;
pub mod hooks;
pub mod model;

pub use device::{Device, Scripted, Serial};
pub use hooks::{dump::Dump, Hook};
pub use model::{Exit, Processor};
