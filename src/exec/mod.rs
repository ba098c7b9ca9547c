//! Per-tag executors (spec sections 4.4-4.8): given a [`crate::tag::Tag`]
//! and the raw instruction word that produced it, re-extract whatever
//! operands that specific tag needs (never the bits another family would
//! use) and apply the defined semantics.
//!
//! Each family module returns `Ok(Some(pc))` when it set the program
//! counter itself (branches, jumps, vset* which may trap), or `Ok(None)`
//! to let [`execute`] advance `pc` by the fetched instruction's length.

mod atomic;
mod float;
mod integer;
mod muldiv;
mod vector;

use crate::error::{StepError, StepOutcome};
use crate::hart::{Hart, System};
use crate::tag::Tag;

pub(crate) type ExecResult = Result<Option<u64>, StepError>;

pub fn execute(hart: &mut Hart, system: &System, tag: Tag, raw: u32, len: u64) -> Result<StepOutcome, StepError> {
    use Tag::*;

    let next_pc = match tag {
        Lui | Auipc | Jal | Jalr | Beq | Bne | Blt | Bge | Bltu | Bgeu | Lb | Lh | Lw | Lbu
        | Lhu | Lwu | Ld | Sb | Sh | Sw | Sd | Addi | Slti | Sltiu | Xori | Ori | Andi | Slli
        | Srli | Srai | Add | Sub | Sll | Slt | Sltu | Xor | Srl | Sra | Or | And | Addiw
        | Slliw | Srliw | Sraiw | Addw | Subw | Sllw | Srlw | Sraw | Fence | FenceTso | Pause
        | FenceI | Ecall | Ebreak | Csrrw | Csrrs | Csrrc | Csrrwi | Csrrsi | Csrrci => {
            integer::execute(hart, system, tag, raw, len)?
        }

        Mul | Mulh | Mulhsu | Mulhu | Div | Divu | Rem | Remu | Mulw | Divw | Divuw | Remw
        | Remuw => muldiv::execute(hart, tag, raw)?,

        LrW | ScW | LrD | ScD | AmoswapW | AmoaddW | AmoxorW | AmoandW | AmoorW | AmominW
        | AmomaxW | AmominuW | AmomaxuW | AmoswapD | AmoaddD | AmoxorD | AmoandD | AmoorD
        | AmominD | AmomaxD | AmominuD | AmomaxuD | AmocasW | AmocasD | AmoswapB | AmoaddB
        | AmoswapH | AmoaddH => atomic::execute(hart, system, tag, raw)?,

        Flw | Fsw | FaddS | FsubS | FmulS | FdivS | FsqrtS | FsgnjS | FsgnjnS | FsgnjxS
        | FminS | FmaxS | FcvtWS | FcvtWuS | FcvtSW | FcvtSWu | FcvtLS | FcvtLuS | FcvtSL
        | FcvtSLu | FmvXW | FmvWX | FeqS | FltS | FleS | FclassS | FmaddS | FmsubS | FnmaddS
        | FnmsubS => float::execute(hart, system, tag, raw)?,

        FpUnsupportedFmt => return Err(StepError::Failure),

        VsetVli | VsetIvli | VsetVl | Vle8V | Vle16V | Vle32V | Vle64V | Vse8V | Vse16V
        | Vse32V | Vse64V | VaddVv | VaddVx | VaddVi | VsubVv | VsubVx | VrsubVx | VrsubVi => {
            vector::execute(hart, system, tag, raw)?
        }

        VArithUnsupported => return Err(StepError::Failure),

        Invalid => return Err(StepError::InvalidInstruction),
    };

    hart.pc = next_pc.unwrap_or(hart.pc.wrapping_add(len));
    Ok(StepOutcome::Continue)
}
