use arch::{msg, path, EXEC_EXT};
use clap::Parser;
use color_print::cprintln;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{bin} {version}
  {author}
  {about}

{usage-heading}
{tab}{usage}

{all-args}{after-help}";

#[derive(Debug, Parser)]
#[clap(author, version, about, help_template = HELP_TEMPLATE)]
struct Args {
    /// Source file (.asm)
    input: PathBuf,

    /// Output file [default: <input>.pegas]
    #[clap(short, long)]
    output: Option<PathBuf>,

    /// Dump the assembled listing
    #[clap(short, long)]
    dump: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("PEGAS_LOG", "warn"))
        .init();
    let args = Args::parse();
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| path::with_ext(&args.input, EXEC_EXT));

    println!("PEGAS Assembler");
    println!("  < {}", args.input.display());
    match pgasm::assemble_file(&args.input, &output) {
        Ok(prog) => {
            println!("  > {}", output.display());
            if args.dump {
                pgasm::util::print_dump(&prog);
            }
        }
        Err(err) => {
            cprintln!("  <r,s>failed</>");
            let file = args.input.display().to_string();
            match std::fs::read_to_string(&args.input) {
                Ok(source) => msg::report_in(&err, &file, &source),
                Err(_) => msg::report(&err),
            }
            std::process::exit(1);
        }
    }
}
