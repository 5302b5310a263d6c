use clap::Parser;
use std::path::PathBuf;

use arch::msg::{self, Msg};
use pgemu::{Dump, Exit, Hook, Processor, Serial};

#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Executable (.pegas)
    input_file: PathBuf,

    /// Stop after this many instructions
    #[arg(short = 't', long)]
    tmax: Option<u64>,

    /// YAML file selecting state to print at given addresses
    #[arg(short, long)]
    dump_cfg: Option<PathBuf>,

    /// Print the register file after every instruction
    #[arg(short = 'a', long)]
    dump_all: bool,

    /// Read `in` values from this file instead of stdin
    #[arg(long)]
    input: Option<PathBuf>,

    /// Also write `out` values to this file
    #[arg(long)]
    output: Option<PathBuf>,

    /// Do not render the video region on `draw`
    #[arg(long)]
    headless: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("PEGAS_LOG", "warn"))
        .init();
    let args = Args::parse();
    if let Err(err) = run(&args) {
        msg::report(&err);
        Msg::Note(format!("while running {}", args.input_file.display())).print();
        std::process::exit(1);
    }
}

fn run(args: &Args) -> arch::Result<()> {
    let debug = args.dump_all || args.dump_cfg.is_some();
    if debug {
        println!("PEGAS Emulator");
        println!("+-----------------------------------------------+");
        println!("| {:<45} |", args.input_file.display());
        println!("+-----------------------------------------------+");
    }

    let mut cpu = Processor::load_file(&args.input_file)?;
    let mut serial = Serial::arg(
        debug,
        args.headless,
        args.input.as_deref(),
        args.output.as_deref(),
    )?;
    let mut hooks: Vec<Box<dyn Hook>> = vec![];
    if debug {
        println!("[INIT]");
        hooks.push(Box::new(Dump::arg(args.dump_cfg.as_deref(), args.dump_all)?));
    }

    let exit = cpu.run(&mut serial, &mut hooks, args.tmax)?;
    if exit == Exit::StepLimit {
        Msg::Warn(format!(
            "stopped after {} instructions at 0x{:08X}",
            args.tmax.unwrap_or_default(),
            cpu.ip()
        ))
        .print();
    }
    if debug {
        println!("=================================================");
    }
    Ok(())
}
