//! The disassembler (spec section 4.9): a mirror of the executors that
//! emits text instead of mutating state, built on the same classifier
//! and field extractors so the two can never disagree about what an
//! encoding means.

use crate::compressed::expand_c;
use crate::fields;
use crate::tag::{self, Tag};

const GPR_ABI_NAMES: [&str; 32] = [
    "zero", "ra", "sp", "gp", "tp", "t0", "t1", "t2", "s0", "s1", "a0", "a1", "a2", "a3", "a4",
    "a5", "a6", "a7", "s2", "s3", "s4", "s5", "s6", "s7", "s8", "s9", "s10", "s11", "t3", "t4",
    "t5", "t6",
];

fn gpr_name(index: u8) -> &'static str {
    GPR_ABI_NAMES[index as usize]
}

fn fpr_name(index: u8) -> String {
    format!("f{index}")
}

fn vreg_name(index: u8) -> String {
    format!("v{index}")
}

/// Map a 12-bit CSR address to its standard mnemonic. Unknown addresses
/// are the disassembler's responsibility to degrade gracefully for
/// (spec section 4.9): the caller falls back to `unknowncsr`.
fn csr_name(addr: u16) -> Option<&'static str> {
    use crate::csr::*;
    Some(match addr {
        CSR_FFLAGS => "fflags",
        CSR_FRM => "frm",
        CSR_FCSR => "fcsr",
        CSR_VSTART => "vstart",
        CSR_VXSAT => "vxsat",
        CSR_VXRM => "vxrm",
        CSR_VCSR => "vcsr",
        CSR_SEED => "seed",
        CSR_CYCLE => "cycle",
        CSR_INSTRET => "instret",
        CSR_VL => "vl",
        CSR_VTYPE => "vtype",
        CSR_VLENB => "vlenb",
        CSR_MVENDORID => "mvendorid",
        CSR_MARCHID => "marchid",
        CSR_MIMPID => "mimpid",
        CSR_MHARTID => "mhartid",
        CSR_MCONFIGPTR => "mconfigptr",
        CSR_MISA => "misa",
        _ => return None,
    })
}

fn mnemonic(tag: Tag) -> &'static str {
    use Tag::*;
    match tag {
        Lui => "lui",
        Auipc => "auipc",
        Jal => "jal",
        Jalr => "jalr",
        Beq => "beq",
        Bne => "bne",
        Blt => "blt",
        Bge => "bge",
        Bltu => "bltu",
        Bgeu => "bgeu",
        Lb => "lb",
        Lh => "lh",
        Lw => "lw",
        Lbu => "lbu",
        Lhu => "lhu",
        Lwu => "lwu",
        Ld => "ld",
        Sb => "sb",
        Sh => "sh",
        Sw => "sw",
        Sd => "sd",
        Addi => "addi",
        Slti => "slti",
        Sltiu => "sltiu",
        Xori => "xori",
        Ori => "ori",
        Andi => "andi",
        Slli => "slli",
        Srli => "srli",
        Srai => "srai",
        Add => "add",
        Sub => "sub",
        Sll => "sll",
        Slt => "slt",
        Sltu => "sltu",
        Xor => "xor",
        Srl => "srl",
        Sra => "sra",
        Or => "or",
        And => "and",
        Addiw => "addiw",
        Slliw => "slliw",
        Srliw => "srliw",
        Sraiw => "sraiw",
        Addw => "addw",
        Subw => "subw",
        Sllw => "sllw",
        Srlw => "srlw",
        Sraw => "sraw",
        Fence => "fence",
        FenceTso => "fence.tso",
        Pause => "pause",
        FenceI => "fence.i",
        Ecall => "ecall",
        Ebreak => "ebreak",
        Csrrw => "csrrw",
        Csrrs => "csrrs",
        Csrrc => "csrrc",
        Csrrwi => "csrrwi",
        Csrrsi => "csrrsi",
        Csrrci => "csrrci",
        Mul => "mul",
        Mulh => "mulh",
        Mulhsu => "mulhsu",
        Mulhu => "mulhu",
        Div => "div",
        Divu => "divu",
        Rem => "rem",
        Remu => "remu",
        Mulw => "mulw",
        Divw => "divw",
        Divuw => "divuw",
        Remw => "remw",
        Remuw => "remuw",
        LrW => "lr.w",
        ScW => "sc.w",
        LrD => "lr.d",
        ScD => "sc.d",
        AmoswapW => "amoswap.w",
        AmoaddW => "amoadd.w",
        AmoxorW => "amoxor.w",
        AmoandW => "amoand.w",
        AmoorW => "amoor.w",
        AmominW => "amomin.w",
        AmomaxW => "amomax.w",
        AmominuW => "amominu.w",
        AmomaxuW => "amomaxu.w",
        AmoswapD => "amoswap.d",
        AmoaddD => "amoadd.d",
        AmoxorD => "amoxor.d",
        AmoandD => "amoand.d",
        AmoorD => "amoor.d",
        AmominD => "amomin.d",
        AmomaxD => "amomax.d",
        AmominuD => "amominu.d",
        AmomaxuD => "amomaxu.d",
        AmocasW => "amocas.w",
        AmocasD => "amocas.d",
        AmoswapB => "amoswap.b",
        AmoaddB => "amoadd.b",
        AmoswapH => "amoswap.h",
        AmoaddH => "amoadd.h",
        Flw => "flw",
        Fsw => "fsw",
        FaddS => "fadd.s",
        FsubS => "fsub.s",
        FmulS => "fmul.s",
        FdivS => "fdiv.s",
        FsqrtS => "fsqrt.s",
        FsgnjS => "fsgnj.s",
        FsgnjnS => "fsgnjn.s",
        FsgnjxS => "fsgnjx.s",
        FminS => "fmin.s",
        FmaxS => "fmax.s",
        FcvtWS => "fcvt.w.s",
        FcvtWuS => "fcvt.wu.s",
        FcvtSW => "fcvt.s.w",
        FcvtSWu => "fcvt.s.wu",
        FcvtLS => "fcvt.l.s",
        FcvtLuS => "fcvt.lu.s",
        FcvtSL => "fcvt.s.l",
        FcvtSLu => "fcvt.s.lu",
        FmvXW => "fmv.x.w",
        FmvWX => "fmv.w.x",
        FeqS => "feq.s",
        FltS => "flt.s",
        FleS => "fle.s",
        FclassS => "fclass.s",
        FmaddS => "fmadd.s",
        FmsubS => "fmsub.s",
        FnmaddS => "fnmadd.s",
        FnmsubS => "fnmsub.s",
        FpUnsupportedFmt => "unknownfp",
        VsetVli => "vsetvli",
        VsetIvli => "vsetivli",
        VsetVl => "vsetvl",
        Vle8V => "vle8.v",
        Vle16V => "vle16.v",
        Vle32V => "vle32.v",
        Vle64V => "vle64.v",
        Vse8V => "vse8.v",
        Vse16V => "vse16.v",
        Vse32V => "vse32.v",
        Vse64V => "vse64.v",
        VaddVv => "vadd.vv",
        VaddVx => "vadd.vx",
        VaddVi => "vadd.vi",
        VsubVv => "vsub.vv",
        VsubVx => "vsub.vx",
        VrsubVx => "vrsub.vx",
        VrsubVi => "vrsub.vi",
        VArithUnsupported => "unknownv",
        Invalid => "unknown",
    }
}

/// Disassemble a single 32-bit instruction word at program-counter `pc`,
/// following the per-format templates in spec section 4.9.
pub fn disassemble_word(raw: u32, pc: u64) -> String {
    let tag = tag::classify(raw);
    let mn = mnemonic(tag);
    use Tag::*;
    match tag {
        Lui | Auipc => {
            let (imm20, rd) = fields::u_type(raw);
            format!("{mn} {}, {imm20:#x}", gpr_name(rd))
        }
        Jal => {
            let (offset, rd) = fields::j_type(raw);
            format!("{mn} {}, . + {offset}", gpr_name(rd))
        }
        Jalr => {
            let (imm, rs1, rd) = fields::i_type(raw);
            format!("{mn} {}, {imm}({})", gpr_name(rd), gpr_name(rs1))
        }
        Beq | Bne | Blt | Bge | Bltu | Bgeu => {
            let (offset, rs1, rs2) = fields::b_type(raw);
            let _ = pc;
            format!("{mn} {}, {}, . + {offset}", gpr_name(rs1), gpr_name(rs2))
        }
        Lb | Lh | Lw | Lbu | Lhu | Lwu | Ld => {
            let (imm, rs1, rd) = fields::i_type(raw);
            format!("{mn} {}, {imm}({})", gpr_name(rd), gpr_name(rs1))
        }
        Sb | Sh | Sw | Sd => {
            let (imm, rs1, rs2) = fields::s_type(raw);
            format!("{mn} {}, {imm}({})", gpr_name(rs2), gpr_name(rs1))
        }
        Slli | Srli | Srai | Slliw | Srliw | Sraiw => {
            let (shamt, rs1, rd) = fields::shift_type(raw);
            let mask = if matches!(tag, Slliw | Srliw | Sraiw) { 0x1f } else { 0x3f };
            format!("{mn} {}, {}, {}", gpr_name(rd), gpr_name(rs1), shamt & mask)
        }
        Addi | Slti | Sltiu | Xori | Ori | Andi | Addiw => {
            let (imm, rs1, rd) = fields::i_type(raw);
            format!("{mn} {}, {}, {imm}", gpr_name(rd), gpr_name(rs1))
        }
        Add | Sub | Sll | Slt | Sltu | Xor | Srl | Sra | Or | And | Addw | Subw | Sllw | Srlw
        | Sraw | Mul | Mulh | Mulhsu | Mulhu | Div | Divu | Rem | Remu | Mulw | Divw | Divuw
        | Remw | Remuw => {
            let (rs2, rs1, rd) = fields::r_type(raw);
            format!("{mn} {}, {}, {}", gpr_name(rd), gpr_name(rs1), gpr_name(rs2))
        }
        Fence | FenceTso | Pause | FenceI | Ecall | Ebreak => mn.to_string(),
        Csrrw | Csrrs | Csrrc => {
            let (csr, rs1, rd) = fields::csr_reg_type(raw);
            format!("{mn} {}, {}, {}", gpr_name(rd), csr_token(csr), gpr_name(rs1))
        }
        Csrrwi | Csrrsi | Csrrci => {
            let (csr, uimm, rd) = fields::csr_imm_type(raw);
            format!("{mn} {}, {}, {uimm}", gpr_name(rd), csr_token(csr))
        }
        LrW | LrD => {
            let (_aq, _rl, _rs2, rs1, rd) = fields::atomic_type(raw);
            format!("{mn} {}, ({})", gpr_name(rd), gpr_name(rs1))
        }
        ScW | ScD | AmoswapW | AmoaddW | AmoxorW | AmoandW | AmoorW | AmominW | AmomaxW
        | AmominuW | AmomaxuW | AmoswapD | AmoaddD | AmoxorD | AmoandD | AmoorD | AmominD
        | AmomaxD | AmominuD | AmomaxuD | AmocasW | AmocasD | AmoswapB | AmoaddB | AmoswapH
        | AmoaddH => {
            let (aq, rl, rs2, rs1, rd) = fields::atomic_type(raw);
            let suffix = match (aq, rl) {
                (true, true) => ".aqrl",
                (true, false) => ".aq",
                (false, true) => ".rl",
                (false, false) => "",
            };
            format!("{mn}{suffix} {}, {}, ({})", gpr_name(rd), gpr_name(rs2), gpr_name(rs1))
        }
        Flw => {
            let (imm, rs1, rd) = fields::i_type(raw);
            format!("{mn} {}, {imm}({})", fpr_name(rd), gpr_name(rs1))
        }
        Fsw => {
            let (imm, rs1, rs2) = fields::s_type(raw);
            format!("{mn} {}, {imm}({})", fpr_name(rs2), gpr_name(rs1))
        }
        FaddS | FsubS | FmulS | FdivS | FsgnjS | FsgnjnS | FsgnjxS | FminS | FmaxS => {
            let (rs2, rs1, rd) = fields::r_type(raw);
            format!("{mn} {}, {}, {}", fpr_name(rd), fpr_name(rs1), fpr_name(rs2))
        }
        FsqrtS | FclassS => {
            let (_rs2, rs1, rd) = fields::r_type(raw);
            format!("{mn} {}, {}", fpr_name(rd), fpr_name(rs1))
        }
        FcvtWS | FcvtWuS | FcvtLS | FcvtLuS | FmvXW => {
            let (_rs2, rs1, rd) = fields::r_type(raw);
            format!("{mn} {}, {}", gpr_name(rd), fpr_name(rs1))
        }
        FcvtSW | FcvtSWu | FcvtSL | FcvtSLu | FmvWX => {
            let (_rs2, rs1, rd) = fields::r_type(raw);
            format!("{mn} {}, {}", fpr_name(rd), gpr_name(rs1))
        }
        FeqS | FltS | FleS => {
            let (rs2, rs1, rd) = fields::r_type(raw);
            format!("{mn} {}, {}, {}", gpr_name(rd), fpr_name(rs1), fpr_name(rs2))
        }
        FmaddS | FmsubS | FnmaddS | FnmsubS => {
            let (rs3, _fmt, rs2, rs1, _rm, rd) = fields::r4_type(raw);
            format!("{mn} {}, {}, {}, {}", fpr_name(rd), fpr_name(rs1), fpr_name(rs2), fpr_name(rs3))
        }
        FpUnsupportedFmt => mn.to_string(),
        VsetVli | VsetIvli | VsetVl => {
            let fields::VsetFields { rd, rs1, zimm, vtypei } = fields::vset_type(raw);
            let vt = crate::csr::VType::decode(vtypei);
            let policy = format!(
                "e{}, m{}, {}, {}",
                vt.sew,
                vt.lmul_num,
                if vt.vta { "ta" } else { "tu" },
                if vt.vma { "ma" } else { "mu" }
            );
            match zimm {
                Some(uimm) => format!("{mn} {}, {uimm}, {policy}", gpr_name(rd)),
                None => format!("{mn} {}, {}, {policy}", gpr_name(rd), gpr_name(rs1)),
            }
        }
        Vle8V | Vle16V | Vle32V | Vle64V => {
            let (_vm, vd, rs1) = fields::vector_mem_type(raw);
            format!("{mn} {}, ({})", vreg_name(vd), gpr_name(rs1))
        }
        Vse8V | Vse16V | Vse32V | Vse64V => {
            let (_vm, vs3, rs1) = fields::vector_mem_type(raw);
            format!("{mn} {}, ({})", vreg_name(vs3), gpr_name(rs1))
        }
        VaddVv | VsubVv => {
            let (_vm, vs2, vs1, vd) = fields::opvv_type(raw);
            format!("{mn} {}, {}, {}", vreg_name(vd), vreg_name(vs2), vreg_name(vs1))
        }
        VaddVx | VsubVx | VrsubVx => {
            let (_vm, vs2, rs1, vd) = fields::opvx_type(raw);
            format!("{mn} {}, {}, {}", vreg_name(vd), vreg_name(vs2), gpr_name(rs1))
        }
        VaddVi | VrsubVi => {
            let (_vm, vs2, imm, vd) = fields::opvi_type(raw);
            format!("{mn} {}, {}, {imm}", vreg_name(vd), vreg_name(vs2))
        }
        VArithUnsupported => mn.to_string(),
        Invalid => "unknown".to_string(),
    }
}

fn csr_token(addr: u16) -> String {
    csr_name(addr).map(str::to_string).unwrap_or_else(|| "unknowncsr".to_string())
}

/// Disassemble a byte buffer into one line per instruction, per spec
/// section 6's `disassemble_chunk`. Stops (without erroring) at the
/// first byte offset that cannot hold a full fetch.
pub fn disassemble_chunk(bytes: &[u8], base_pc: u64) -> String {
    let mut out = String::new();
    let mut pc = 0usize;
    while pc < bytes.len() {
        if pc + 2 > bytes.len() {
            break;
        }
        let half = u16::from_le_bytes([bytes[pc], bytes[pc + 1]]);
        if half & 0b11 != 0b11 {
            match expand_c(half) {
                Some(expanded) => {
                    out.push_str(&disassemble_word(expanded, base_pc + pc as u64));
                    out.push('\n');
                }
                None => {
                    out.push_str("unknown\n");
                }
            }
            pc += 2;
        } else {
            if pc + 4 > bytes.len() {
                break;
            }
            let word = u32::from_le_bytes([bytes[pc], bytes[pc + 1], bytes[pc + 2], bytes[pc + 3]]);
            out.push_str(&disassemble_word(word, base_pc + pc as u64));
            out.push('\n');
            pc += 4;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disassembles_addi() {
        let s = disassemble_word(0x0053_0293, 0);
        assert_eq!(s, "addi t0, t1, 5");
    }

    #[test]
    fn disassembles_unknown_csr_gracefully() {
        let raw = (0x7ffu32 << 20) | (1 << 15) | (0b001 << 12) | (5 << 7) | 0b1110011;
        let s = disassemble_word(raw, 0);
        assert!(s.contains("unknowncsr"));
    }

    #[test]
    fn disassemble_chunk_handles_compressed_and_full_width() {
        // c.nop (2 bytes) followed by addi t0,t1,5 (4 bytes)
        let mut bytes = vec![0x01, 0x00];
        bytes.extend_from_slice(&0x0053_0293u32.to_le_bytes());
        let out = disassemble_chunk(&bytes, 0);
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "addi t0, t1, 5");
    }
}
