use arch::{inst::Inst, reg::Reg, Addr, Error, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use strum::IntoEnumIterator;

use crate::model::Processor;

use super::Hook;

/// Prints processor state at configured addresses, or after every step.
#[derive(Debug)]
pub struct Dump {
    file: Option<PathBuf>,
    all: bool,
    list: List,
}

#[derive(Debug, Default, Deserialize)]
struct List(HashMap<Addr, Config>);

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Config {
    /// Registers to show; all of them when empty.
    regs: Vec<Reg>,
    stack: bool,
    heap: Vec<usize>,
}

impl Dump {
    pub fn arg(file: Option<&Path>, all: bool) -> Result<Self> {
        let list = match file {
            Some(file) => {
                let name = file.display().to_string();
                let text = std::fs::read_to_string(file)
                    .map_err(|e| Error::FileOpen(name.clone(), e))?;
                parse(&name, &text)?
            }
            None => List::default(),
        };
        Ok(Dump {
            file: file.map(Path::to_path_buf),
            all,
            list,
        })
    }

    pub fn from_yaml(yaml: &str, all: bool) -> Result<Self> {
        Ok(Dump {
            file: None,
            all,
            list: parse("<yaml>", yaml)?,
        })
    }

    /// Lines to print after the instruction at `addr` executed.
    pub fn report(&self, addr: Addr, cpu: &Processor) -> Vec<String> {
        let mut lines = vec![];
        if let Some(cfg) = self.list.0.get(&addr) {
            print_reg(&mut lines, cpu, &cfg.regs);
            if cfg.stack {
                print_stack(&mut lines, cpu);
            }
            if !cfg.heap.is_empty() {
                print_heap(&mut lines, cpu, &cfg.heap);
            }
        } else if self.all {
            print_reg(&mut lines, cpu, &[]);
        }
        lines
    }
}

fn parse(name: &str, yaml: &str) -> Result<List> {
    serde_yaml::from_str(yaml).map_err(|e| {
        Error::FileRead(
            name.to_string(),
            std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        )
    })
}

impl Hook for Dump {
    fn init(&mut self, _cpu: &Processor) {
        if self.all {
            println!(" * Dump all");
        }
        if let Some(file) = &self.file {
            println!(" * Dump[{}] {}", self.list.0.len(), file.display());
        }
    }

    fn exec(&mut self, time: u64, addr: Addr, inst: &Inst, cpu: &Processor) {
        let lines = self.report(addr, cpu);
        if !lines.is_empty() {
            println!(" [{:0>6}] {:08X}: {}", time, addr, inst);
            for line in lines {
                println!("{}", line);
            }
        }
    }
}

const RULE: &str = " +------------------+------------------+------------------+------------------+";

fn print_reg(lines: &mut Vec<String>, cpu: &Processor, regs: &[Reg]) {
    let regs: Vec<Reg> = match regs {
        [] => Reg::iter().collect(),
        some => some.to_vec(),
    };
    lines.push(RULE.to_string());
    for row in regs.chunks(4) {
        let cells: String = row
            .iter()
            .map(|&r| format!(" {}: {:>12} |", r, cpu.reg(r)))
            .collect();
        lines.push(format!(" |{}", cells));
    }
    lines.push(RULE.to_string());
}

fn print_stack(lines: &mut Vec<String>, cpu: &Processor) {
    for (depth, val) in cpu.stack().iter().rev().enumerate() {
        lines.push(format!(" | stack[{:>3}] : {:>12}", depth, val));
    }
    for (depth, addr) in cpu.calls().iter().rev().enumerate() {
        lines.push(format!(" | calls[{:>3}] : {:08X}", depth, addr));
    }
    lines.push(RULE.to_string());
}

fn print_heap(lines: &mut Vec<String>, cpu: &Processor, addrs: &[usize]) {
    for &addr in addrs {
        match cpu.mem(addr) {
            Some(val) => lines.push(format!(" | [{:>6}]    : {:>12}", addr, val)),
            None => lines.push(format!(" | [{:>6}]    : out of range", addr)),
        }
    }
    lines.push(RULE.to_string());
}
