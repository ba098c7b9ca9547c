use clap::Parser;
use clap_num::maybe_hex;

use riscvemu::disasm::disassemble_chunk;
use riscvemu::elf_loader::{looks_like_elf, read_elf_text, read_raw_file};

/// Disassemble a RISC-V program image (raw binary or ELF `.text`)
#[derive(Parser, Debug)]
#[command(author, version, about, long_about)]
struct Args {
    /// Path to the program image
    input: String,

    /// Base address to print alongside each instruction (informational
    /// only; this disassembler does not resolve symbols)
    #[arg(short, long, value_parser=maybe_hex::<u64>, default_value = "0")]
    base_address: u64,
}

fn main() {
    let args = Args::parse();

    let bytes = match read_raw_file(&args.input) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("failed to read {}: {e}", args.input);
            std::process::exit(3);
        }
    };

    let text = if looks_like_elf(&bytes) {
        match read_elf_text(&bytes) {
            Ok(t) => t,
            Err(e) => {
                eprintln!("failed to parse {}: {e}", args.input);
                std::process::exit(3);
            }
        }
    } else {
        bytes
    };

    print!("{}", disassemble_chunk(&text, args.base_address));
}
