//! End-to-end scenarios exercising the fetch-decode-execute pipeline as a
//! whole, one per architectural feature area.

use riscvemu::elf_loader::emulate_chunk;
use riscvemu::error::StepOutcome;
use riscvemu::hart::{Hart, HartConfig, System};
use riscvemu::memory::Width;

fn run_program(bytes: &[u8], max_steps: u32) -> (Hart, System) {
    let system = System::new(1 << 16);
    {
        let mut memory = system.memory.lock().unwrap();
        emulate_chunk(&mut memory, bytes, 0).unwrap();
    }
    let mut hart = Hart::new(HartConfig::default());
    for _ in 0..max_steps {
        match hart.step(&system) {
            StepOutcome::Continue => continue,
            StepOutcome::Done => break,
            StepOutcome::Failure(e) => panic!("unexpected failure: {e:?} at pc={:#x}", hart.pc),
        }
    }
    (hart, system)
}

/// S1: `addi t0, t1, 5` with x[t1]=0 leaves x[t0]=5.
#[test]
fn s1_addi_immediate() {
    let program = 0x0053_0293u32.to_le_bytes();
    let (hart, _) = run_program(&program, 2);
    assert_eq!(hart.gpr.read(5), 5); // t0
}

/// S2: `jal` writes the link register to the instruction after the jump
/// and skips the intervening instruction.
#[test]
fn s2_jal_links_and_skips() {
    let mut program = Vec::new();
    program.extend_from_slice(&0x00c0_00efu32.to_le_bytes()); // jal ra, +12 @0
    program.extend_from_slice(&0x00a0_0313u32.to_le_bytes()); // addi t1, zero, 10 @4 (skipped)
    program.extend_from_slice(&0x0140_0393u32.to_le_bytes()); // addi t2, zero, 20 @8 (skipped)
    program.extend_from_slice(&0x01e0_0e13u32.to_le_bytes()); // addi t3, zero, 30 @12 (target)
    let (hart, _) = run_program(&program, 3);
    assert_eq!(hart.gpr.read(1), 4); // ra = pc_of_jal + 4
    assert_eq!(hart.gpr.read(6), 0); // t1 untouched
    assert_eq!(hart.gpr.read(7), 0); // t2 untouched
    assert_eq!(hart.gpr.read(28), 30); // t3
}

/// S3: `mul`/`mulhu` of -1 and 2.
#[test]
fn s3_mul_and_mulhu() {
    let mut program = Vec::new();
    // mul t0, t1, t2
    program.extend_from_slice(&((0b0000001u32 << 25) | (7 << 20) | (6 << 15) | (0b000 << 12) | (5 << 7) | 0b0110011).to_le_bytes());
    // mulhu t3, t1, t2
    program.extend_from_slice(&((0b0000001u32 << 25) | (7 << 20) | (6 << 15) | (0b011 << 12) | (28 << 7) | 0b0110011).to_le_bytes());
    let system = System::new(1 << 16);
    {
        let mut memory = system.memory.lock().unwrap();
        emulate_chunk(&mut memory, &program, 0).unwrap();
    }
    let mut hart = Hart::new(HartConfig::default());
    hart.gpr.write(6, u64::MAX); // t1
    hart.gpr.write(7, 2); // t2
    for _ in 0..3 {
        if hart.step(&system) != StepOutcome::Continue {
            break;
        }
    }
    assert_eq!(hart.gpr.read(5), 0xffff_ffff_ffff_fffe);
    assert_eq!(hart.gpr.read(28), 1);
}

/// S4: FP overflow sets OF|NX, and Inf-Inf invalidity sets NV.
#[test]
fn s4_fp_overflow_and_invalid() {
    let system = System::new(1 << 16);
    let mut hart = Hart::new(HartConfig::default());
    hart.fpr.write(1, f32::MAX);
    hart.fpr.write(2, f32::MAX);
    // fadd.s f0, f1, f2
    let raw = (0b0000000u32 << 25) | (2 << 20) | (1 << 15) | (0 << 12) | (0 << 7) | 0b1010011;
    riscvemu::exec::execute(&mut hart, &system, riscvemu::tag::Tag::FaddS, raw, 4).unwrap();
    assert!(hart.fpr.read(0).is_infinite());
    assert_eq!(hart.csr.fflags_frm.fflags() & 0b00100, 0b00100); // OF
    assert_eq!(hart.csr.fflags_frm.fflags() & 0b10000, 0b10000); // NX

    hart.fpr.write(1, f32::INFINITY);
    hart.fpr.write(2, f32::NEG_INFINITY);
    let raw2 = (0b0000000u32 << 25) | (2 << 20) | (1 << 15) | (0 << 12) | (3 << 7) | 0b1010011;
    riscvemu::exec::execute(&mut hart, &system, riscvemu::tag::Tag::FaddS, raw2, 4).unwrap();
    assert!(hart.fpr.read(3).is_nan());
    assert_eq!(hart.csr.fflags_frm.fflags() & 0b00001, 0b00001); // NV
}

/// S5: unit-stride vector load/store round-trips 16 bytes through v0,
/// driven through the real fetch/classify/execute path (`hart.step`)
/// rather than calling `exec::execute` with a hand-picked `Tag`, so the
/// test actually exercises `tag::classify`'s dispatch for these
/// encodings.
#[test]
fn s5_vector_load_store_round_trip() {
    let mut program = Vec::new();
    // vsetvli t0, x0, e8, m1 (rd != x0 so vl is set to VLMAX, not "keep current vl")
    program.extend_from_slice(&((0b000u32 << 20) | (0 << 15) | (0b111 << 12) | (1 << 7) | 0b1010111).to_le_bytes());
    // vle8.v v0, (a1), unmasked (vm=1)
    program.extend_from_slice(&((1u32 << 25) | (11 << 15) | (0b000 << 12) | (0 << 7) | 0b0000111).to_le_bytes());
    // vse8.v v0, (a2), unmasked (vm=1)
    program.extend_from_slice(&((1u32 << 25) | (12 << 15) | (0b000 << 12) | (0 << 7) | 0b0100111).to_le_bytes());

    let system = System::new(1 << 16);
    {
        let mut memory = system.memory.lock().unwrap();
        emulate_chunk(&mut memory, &program, 0).unwrap();
        for i in 0..16u8 {
            memory.write(0x2000 + i as u64, Width::Byte, i as u64).unwrap();
        }
    }
    let mut hart = Hart::new(HartConfig::default());
    hart.gpr.write(11, 0x2000); // a1
    hart.gpr.write(12, 0x2010); // a2

    for _ in 0..3 {
        match hart.step(&system) {
            StepOutcome::Continue => continue,
            other => panic!("unexpected outcome: {other:?} at pc={:#x}", hart.pc),
        }
    }

    assert_eq!(hart.csr.vl, 16);
    for i in 0..16usize {
        assert_eq!(hart.vector.read_elem(0, 8, i), i as u64);
    }
    let memory = system.memory.lock().unwrap();
    for i in 0..16u64 {
        assert_eq!(memory.read(0x2010 + i, Width::Byte).unwrap(), i);
    }
}

/// S6: `c.addi t1, t1, 16` expands to the equivalent 32-bit `addi`.
#[test]
fn s6_compressed_addi_expands_and_executes() {
    let expanded = riscvemu::compressed::expand_c(0x0341).expect("valid compressed encoding");
    assert_eq!(riscvemu::tag::classify(expanded), riscvemu::tag::Tag::Addi);

    // Compressed instructions are 2 bytes on the wire; the hart's fetch
    // path sees 0x0341 as the low halfword of the first fetched word.
    let bytes = [0x41, 0x03];
    let (hart, _) = run_program(&bytes, 2);
    assert_eq!(hart.gpr.read(6), 16); // t1
}
