use arch::{msg, path, ASM_EXT};
use clap::Parser;
use color_print::cprintln;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[clap(author, version, about)]
struct Args {
    /// Executable (.pegas)
    input: PathBuf,

    /// Output file [default: <input>.asm]
    #[clap(short, long)]
    output: Option<PathBuf>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("PEGAS_LOG", "warn"))
        .init();
    let args = Args::parse();
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| path::with_ext(&args.input, ASM_EXT));

    println!("PEGAS Disassembler");
    println!("  < {}", args.input.display());
    match pgdis::disassemble_file(&args.input, &output) {
        Ok(()) => println!("  > {}", output.display()),
        Err(err) => {
            cprintln!("  <r,s>failed</>");
            msg::report(&err);
            std::process::exit(1);
        }
    }
}
