//! RV64I base integer, Zicsr and Zifencei executors (spec section 4.4).

use super::ExecResult;
use crate::error::StepError;
use crate::fields;
use crate::hart::{Hart, System};
use crate::memory::Width;
use crate::tag::Tag;

fn alu_reg(hart: &mut Hart, raw: u32, f: impl FnOnce(u64, u64) -> u64) {
    let (rs2, rs1, rd) = fields::r_type(raw);
    let a = hart.gpr.read(rs1);
    let b = hart.gpr.read(rs2);
    hart.gpr.write(rd, f(a, b));
}

fn alu_imm(hart: &mut Hart, raw: u32, f: impl FnOnce(u64, i64) -> u64) {
    let (imm, rs1, rd) = fields::i_type(raw);
    let a = hart.gpr.read(rs1);
    hart.gpr.write(rd, f(a, imm));
}

pub fn execute(hart: &mut Hart, system: &System, tag: Tag, raw: u32, len: u64) -> ExecResult {
    use Tag::*;

    match tag {
        Lui => {
            let (imm20, rd) = fields::u_type(raw);
            let value = ((imm20 as i32) << 12) as i64 as u64;
            hart.gpr.write(rd, value);
        }
        Auipc => {
            let (imm20, rd) = fields::u_type(raw);
            let offset = ((imm20 as i32) << 12) as i64;
            hart.gpr.write(rd, hart.pc.wrapping_add(offset as u64));
        }
        Jal => {
            let (offset, rd) = fields::j_type(raw);
            hart.gpr.write(rd, hart.pc.wrapping_add(len));
            return Ok(Some(hart.pc.wrapping_add(offset as u64)));
        }
        Jalr => {
            let (imm, rs1, rd) = fields::i_type(raw);
            let target = hart.gpr.read(rs1).wrapping_add(imm as u64) & !1u64;
            hart.gpr.write(rd, hart.pc.wrapping_add(len));
            return Ok(Some(target));
        }
        Beq | Bne | Blt | Bge | Bltu | Bgeu => {
            let (offset, rs1, rs2) = fields::b_type(raw);
            let a = hart.gpr.read(rs1);
            let b = hart.gpr.read(rs2);
            let taken = match tag {
                Beq => a == b,
                Bne => a != b,
                Blt => (a as i64) < (b as i64),
                Bge => (a as i64) >= (b as i64),
                Bltu => a < b,
                Bgeu => a >= b,
                _ => unreachable!(),
            };
            if taken {
                return Ok(Some(hart.pc.wrapping_add(offset as u64)));
            }
        }
        Lb | Lh | Lw | Lbu | Lhu | Lwu | Ld => {
            let (imm, rs1, rd) = fields::i_type(raw);
            let addr = hart.gpr.read(rs1).wrapping_add(imm as u64);
            let value = match tag {
                Lb => system.read(addr, Width::Byte)? as i8 as i64 as u64,
                Lh => system.read(addr, Width::Half)? as i16 as i64 as u64,
                Lw => system.read(addr, Width::Word)? as i32 as i64 as u64,
                Lbu => system.read(addr, Width::Byte)?,
                Lhu => system.read(addr, Width::Half)?,
                Lwu => system.read(addr, Width::Word)?,
                Ld => system.read(addr, Width::Double)?,
                _ => unreachable!(),
            };
            hart.gpr.write(rd, value);
        }
        Sb | Sh | Sw | Sd => {
            let (imm, rs1, rs2) = fields::s_type(raw);
            let addr = hart.gpr.read(rs1).wrapping_add(imm as u64);
            let value = hart.gpr.read(rs2);
            let width = match tag {
                Sb => Width::Byte,
                Sh => Width::Half,
                Sw => Width::Word,
                Sd => Width::Double,
                _ => unreachable!(),
            };
            system.write(addr, width, value)?;
        }
        Addi => alu_imm(hart, raw, |a, imm| a.wrapping_add(imm as u64)),
        Slti => alu_imm(hart, raw, |a, imm| ((a as i64) < imm) as u64),
        Sltiu => alu_imm(hart, raw, |a, imm| (a < imm as u64) as u64),
        Xori => alu_imm(hart, raw, |a, imm| a ^ imm as u64),
        Ori => alu_imm(hart, raw, |a, imm| a | imm as u64),
        Andi => alu_imm(hart, raw, |a, imm| a & imm as u64),
        Slli => {
            let (shamt, rs1, rd) = fields::shift_type(raw);
            hart.gpr.write(rd, hart.gpr.read(rs1) << (shamt & 0x3f));
        }
        Srli => {
            let (shamt, rs1, rd) = fields::shift_type(raw);
            hart.gpr.write(rd, hart.gpr.read(rs1) >> (shamt & 0x3f));
        }
        Srai => {
            let (shamt, rs1, rd) = fields::shift_type(raw);
            hart.gpr.write(rd, ((hart.gpr.read(rs1) as i64) >> (shamt & 0x3f)) as u64);
        }
        Add => alu_reg(hart, raw, |a, b| a.wrapping_add(b)),
        Sub => alu_reg(hart, raw, |a, b| a.wrapping_sub(b)),
        Sll => alu_reg(hart, raw, |a, b| a << (b & 0x3f)),
        Slt => alu_reg(hart, raw, |a, b| ((a as i64) < (b as i64)) as u64),
        Sltu => alu_reg(hart, raw, |a, b| (a < b) as u64),
        Xor => alu_reg(hart, raw, |a, b| a ^ b),
        Srl => alu_reg(hart, raw, |a, b| a >> (b & 0x3f)),
        Sra => alu_reg(hart, raw, |a, b| ((a as i64) >> (b & 0x3f)) as u64),
        Or => alu_reg(hart, raw, |a, b| a | b),
        And => alu_reg(hart, raw, |a, b| a & b),
        Addiw => {
            let (imm, rs1, rd) = fields::i_type(raw);
            let a = hart.gpr.read(rs1) as i32;
            hart.gpr.write(rd, a.wrapping_add(imm as i32) as i64 as u64);
        }
        Slliw => {
            let (shamt, rs1, rd) = fields::shift_type(raw);
            let a = hart.gpr.read(rs1) as u32;
            hart.gpr.write(rd, ((a << (shamt & 0x1f)) as i32) as i64 as u64);
        }
        Srliw => {
            let (shamt, rs1, rd) = fields::shift_type(raw);
            let a = hart.gpr.read(rs1) as u32;
            hart.gpr.write(rd, ((a >> (shamt & 0x1f)) as i32) as i64 as u64);
        }
        Sraiw => {
            let (shamt, rs1, rd) = fields::shift_type(raw);
            let a = hart.gpr.read(rs1) as i32;
            hart.gpr.write(rd, (a >> (shamt & 0x1f)) as i64 as u64);
        }
        Addw => {
            let (rs2, rs1, rd) = fields::r_type(raw);
            let a = hart.gpr.read(rs1) as i32;
            let b = hart.gpr.read(rs2) as i32;
            hart.gpr.write(rd, a.wrapping_add(b) as i64 as u64);
        }
        Subw => {
            let (rs2, rs1, rd) = fields::r_type(raw);
            let a = hart.gpr.read(rs1) as i32;
            let b = hart.gpr.read(rs2) as i32;
            hart.gpr.write(rd, a.wrapping_sub(b) as i64 as u64);
        }
        Sllw => {
            let (rs2, rs1, rd) = fields::r_type(raw);
            let a = hart.gpr.read(rs1) as u32;
            let b = hart.gpr.read(rs2) & 0x1f;
            hart.gpr.write(rd, ((a << b) as i32) as i64 as u64);
        }
        Srlw => {
            let (rs2, rs1, rd) = fields::r_type(raw);
            let a = hart.gpr.read(rs1) as u32;
            let b = hart.gpr.read(rs2) & 0x1f;
            hart.gpr.write(rd, ((a >> b) as i32) as i64 as u64);
        }
        Sraw => {
            let (rs2, rs1, rd) = fields::r_type(raw);
            let a = hart.gpr.read(rs1) as i32;
            let b = hart.gpr.read(rs2) & 0x1f;
            hart.gpr.write(rd, (a >> b) as i64 as u64);
        }
        Fence | FenceTso | Pause | FenceI => {
            // No-op: this emulator has no caches or reorderable memory
            // system to order against (spec section 4.4).
        }
        Ecall | Ebreak => {
            // Default behaviour is to record the event and continue
            // execution (spec section 4.4); there is no environment or
            // debugger attached to trap into, so this is a no-op.
        }
        Csrrw | Csrrs | Csrrc | Csrrwi | Csrrsi | Csrrci => {
            csr_op(hart, tag, raw)?;
        }
        _ => unreachable!("non-integer tag routed to integer::execute"),
    }
    Ok(None)
}

fn csr_op(hart: &mut Hart, tag: Tag, raw: u32) -> Result<(), StepError> {
    use Tag::*;
    let (csr_addr, rs1, rd) = fields::csr_reg_type(raw);
    let is_immediate = matches!(tag, Csrrwi | Csrrsi | Csrrci);
    let operand = if is_immediate { rs1 as u64 } else { hart.gpr.read(rs1) };

    let old = match tag {
        Csrrw | Csrrwi => hart
            .csr
            .write(csr_addr, operand)
            .map_err(|_| StepError::InvalidCsr(csr_addr))?,
        Csrrs | Csrrsi => {
            let old = hart.csr.read(csr_addr).map_err(|_| StepError::InvalidCsr(csr_addr))?;
            if operand != 0 {
                hart.csr
                    .write(csr_addr, old | operand)
                    .map_err(|_| StepError::InvalidCsr(csr_addr))?;
            }
            old
        }
        Csrrc | Csrrci => {
            let old = hart.csr.read(csr_addr).map_err(|_| StepError::InvalidCsr(csr_addr))?;
            if operand != 0 {
                hart.csr
                    .write(csr_addr, old & !operand)
                    .map_err(|_| StepError::InvalidCsr(csr_addr))?;
            }
            old
        }
        _ => unreachable!(),
    };
    hart.gpr.write(rd, old);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hart::HartConfig;

    fn new_system() -> System {
        System::new(1024)
    }

    #[test]
    fn addi_adds_signed_immediate() {
        let system = new_system();
        let mut hart = Hart::new(HartConfig::default());
        hart.gpr.write(6, 10);
        // addi x5, x6, -3
        let raw = 0xffd3_0293u32;
        execute(&mut hart, &system, Tag::Addi, raw, 4).unwrap();
        assert_eq!(hart.gpr.read(5), 7);
    }

    #[test]
    fn beq_taken_branches_pc_relative() {
        let system = new_system();
        let mut hart = Hart::new(HartConfig { pc: 0x100, ..Default::default() });
        hart.gpr.write(1, 5);
        hart.gpr.write(2, 5);
        // beq x1, x2, +8 -> funct3=0 opcode=BRANCH, imm=8
        let raw = 0x0020_8463u32;
        let next = execute(&mut hart, &system, Tag::Beq, raw, 4).unwrap();
        assert_eq!(next, Some(0x108));
    }

    #[test]
    fn csrrw_swaps_old_value_into_rd() {
        let system = new_system();
        let mut hart = Hart::new(HartConfig::default());
        hart.csr.write(crate::csr::CSR_FFLAGS, 0b101).unwrap();
        hart.gpr.write(1, 0b010);
        // csrrw x5, fflags, x1
        let raw = (0x001u32 << 20) | (1 << 15) | (0b001 << 12) | (5 << 7) | 0b1110011;
        execute(&mut hart, &system, Tag::Csrrw, raw, 4).unwrap();
        assert_eq!(hart.gpr.read(5), 0b101);
        assert_eq!(hart.csr.read(crate::csr::CSR_FFLAGS).unwrap(), 0b010);
    }
}
