use crate::assembler::Program;
use arch::{codec, Addr};
use color_print::cformat;
use std::collections::BTreeMap;

const BYTES_COLUMN: usize = 3 * 10;

/// Listing of an assembled program: addresses, raw bytes, decoded
/// instructions and the labels pointing at them.
pub fn dump(prog: &Program) -> Vec<String> {
    let mut by_addr: BTreeMap<Addr, Vec<&str>> = BTreeMap::new();
    for (name, label) in prog.labels.iter() {
        if let Some(addr) = label.addr {
            by_addr.entry(addr).or_default().push(name);
        }
    }
    let label_lines = |addr: Addr, lines: &mut Vec<String>| {
        for name in by_addr.get(&addr).into_iter().flatten() {
            let pad = format!("{:w$}| ", "", w = 11 + BYTES_COLUMN);
            lines.push(pad + &cformat!("<g>{}:</>", name));
        }
    };

    let mut lines = vec![];
    for item in codec::instructions(&prog.bin) {
        match item {
            Ok((addr, inst)) => {
                label_lines(addr as Addr, &mut lines);
                let bytes: String = prog.bin[addr..addr + inst.len()]
                    .iter()
                    .map(|b| format!("{:02X} ", b))
                    .collect();
                lines.push(format!(
                    "[{:08X}] {:w$}|   {}",
                    addr,
                    bytes,
                    inst.cformat(),
                    w = BYTES_COLUMN
                ));
            }
            Err(err) => {
                lines.push(cformat!("<r,s>{}</>", err));
                break;
            }
        }
    }
    label_lines(prog.bin.len() as Addr, &mut lines);
    lines
}

pub fn print_dump(prog: &Program) {
    for line in dump(prog) {
        println!("{}", line);
    }
    println!("{}+{}", "-".repeat(11 + BYTES_COLUMN), "-".repeat(40));
}
