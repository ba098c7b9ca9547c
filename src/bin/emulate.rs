use clap::Parser;
use clap_num::maybe_hex;

use riscvemu::elf_loader::emulate_file;
use riscvemu::error::StepOutcome;
use riscvemu::hart::{Hart, HartConfig, System, SystemConfig};

/// Emulate a 64-bit RISC-V processor (RV64IMAFVC, Zicsr, Zifencei)
#[derive(Parser, Debug)]
#[command(author, version, about, long_about)]
struct Args {
    /// Path to the program image (raw binary or ELF)
    input: String,

    /// Address to load the program at (use 0x prefix for hexadecimal)
    #[arg(short, long, value_parser=maybe_hex::<u64>, default_value = "0")]
    load_address: u64,

    /// Number of bytes of main memory to allocate
    #[arg(short, long, default_value_t = 1 << 20)]
    memory_size: usize,

    /// Number of harts to create
    #[arg(long, default_value_t = 1)]
    hart_count: u8,

    /// Maximum number of instructions a hart may execute before the
    /// driver gives up and reports a timeout
    #[arg(long, default_value_t = 1_000_000)]
    max_steps: u64,

    /// Print each fetched instruction's tag and the resulting PC
    #[arg(short, long)]
    trace: bool,
}

fn main() {
    let args = Args::parse();

    let hart_configs: Vec<HartConfig> = (0..args.hart_count)
        .map(|i| HartConfig {
            hart_id: i as u64,
            pc: args.load_address,
            ..Default::default()
        })
        .collect();
    let config = SystemConfig {
        memory_size: args.memory_size,
        hart_configs,
    };

    let system = System::new(config.memory_size);
    {
        let mut memory = system.memory.lock().unwrap();
        if let Err(e) = emulate_file(&mut memory, &args.input, args.load_address) {
            eprintln!("failed to load {}: {e}", args.input);
            std::process::exit(3);
        }
    }

    let mut harts: Vec<Hart> = config.hart_configs.into_iter().map(Hart::new).collect();
    for hart in &mut harts {
        hart.trace = args.trace;
    }

    let mut exit_code = 0;
    for hart in &mut harts {
        for _ in 0..args.max_steps {
            match hart.step(&system) {
                StepOutcome::Continue => continue,
                StepOutcome::Done => break,
                StepOutcome::Failure(e) => {
                    eprintln!("hart {}: {e} at pc={:#x}", hart.hart_id, hart.pc);
                    exit_code = match e {
                        riscvemu::error::StepError::OutOfBounds => 2,
                        riscvemu::error::StepError::InvalidInstruction
                        | riscvemu::error::StepError::InvalidCsr(_)
                        | riscvemu::error::StepError::IllegalVtype => 1,
                        riscvemu::error::StepError::Failure => 1,
                    };
                    break;
                }
            }
        }
        println!("{hart}");
    }

    std::process::exit(exit_code);
}
