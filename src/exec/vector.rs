//! V-extension executors (spec section 4.8): the vset* family, unit-
//! stride loads/stores, and the VADD/VSUB/VRSUB arithmetic ops this
//! specification requires. Every other OPIVV/OPIVX/OPIVI/OPMVV/OPFVV
//! encoding is recognised by the classifier (`Tag::VArithUnsupported`)
//! but dispatched to a defined failure in `exec::execute` rather than
//! reaching here.

use super::ExecResult;
use crate::csr::VType;
use crate::error::StepError;
use crate::fields;
use crate::hart::{Hart, System};
use crate::memory::Width;
use crate::registers::check_group_alignment;
use crate::tag::Tag;

fn width_to_sew(width: Width) -> u32 {
    match width {
        Width::Byte => 8,
        Width::Half => 16,
        Width::Word => 32,
        Width::Double => 64,
    }
}

pub fn execute(hart: &mut Hart, system: &System, tag: Tag, raw: u32) -> ExecResult {
    use Tag::*;

    match tag {
        VsetVli | VsetIvli | VsetVl => {
            let fields::VsetFields { rd, rs1, zimm, vtypei } = fields::vset_type(raw);
            let vtype = if tag == VsetVl {
                VType::decode(hart.gpr.read(fields::rs2(raw)) as u32)
            } else {
                VType::decode(vtypei)
            };
            let vlmax = vtype.vlmax(hart.vector.vlen_bits());
            let requested = match zimm {
                Some(uimm) => uimm as u32,
                None if rs1 == 0 && rd == 0 => hart.csr.vl, // keep current vl
                None if rs1 == 0 => vlmax,                  // set vl to VLMAX
                None => hart.gpr.read(rs1) as u32,
            };
            let vl = requested.min(vlmax);
            hart.csr.set_vl_vtype(vl, vtype);
            hart.csr.vstart = 0;
            hart.gpr.write(rd, vl as u64);
        }
        Vle8V | Vle16V | Vle32V | Vle64V => {
            let (vm, vd, rs1) = fields::vector_mem_type(raw);
            let width = match tag {
                Vle8V => Width::Byte,
                Vle16V => Width::Half,
                Vle32V => Width::Word,
                Vle64V => Width::Double,
                _ => unreachable!(),
            };
            check_group_alignment(vd, hart.csr.vtype.lmul_int()).map_err(|_| StepError::IllegalVtype)?;
            let sew = width_to_sew(width);
            let base = hart.gpr.read(rs1);
            let vl = hart.csr.vl;
            for i in hart.csr.vstart as usize..vl as usize {
                if !vm && !hart.vector.mask_bit(i) {
                    continue;
                }
                let addr = base.wrapping_add((i as u64) * width.bytes() as u64);
                let value = system.read(addr, width)?;
                hart.vector.write_elem(vd, sew, i, value);
            }
            hart.csr.vstart = 0;
        }
        Vse8V | Vse16V | Vse32V | Vse64V => {
            let (vm, vs3, rs1) = fields::vector_mem_type(raw);
            let width = match tag {
                Vse8V => Width::Byte,
                Vse16V => Width::Half,
                Vse32V => Width::Word,
                Vse64V => Width::Double,
                _ => unreachable!(),
            };
            check_group_alignment(vs3, hart.csr.vtype.lmul_int()).map_err(|_| StepError::IllegalVtype)?;
            let sew = width_to_sew(width);
            let base = hart.gpr.read(rs1);
            let vl = hart.csr.vl;
            for i in hart.csr.vstart as usize..vl as usize {
                if !vm && !hart.vector.mask_bit(i) {
                    continue;
                }
                let addr = base.wrapping_add((i as u64) * width.bytes() as u64);
                let value = hart.vector.read_elem(vs3, sew, i);
                system.write(addr, width, value)?;
            }
            hart.csr.vstart = 0;
        }
        VaddVv | VsubVv => {
            let (vm, vs2, vs1, vd) = fields::opvv_type(raw);
            arith_loop(hart, vm, vs2, vs1, vd, |a, b| if tag == VaddVv { a.wrapping_add(b) } else { a.wrapping_sub(b) })?;
        }
        VaddVx | VsubVx | VrsubVx => {
            let (vm, vs2, rs1, vd) = fields::opvx_type(raw);
            let scalar = hart.gpr.read(rs1);
            arith_loop_scalar(hart, vm, vs2, scalar, vd, |elem, s| match tag {
                VaddVx => elem.wrapping_add(s),
                VsubVx => elem.wrapping_sub(s),
                VrsubVx => s.wrapping_sub(elem),
                _ => unreachable!(),
            })?;
        }
        VaddVi | VrsubVi => {
            let (vm, vs2, imm, vd) = fields::opvi_type(raw);
            let scalar = imm as u64;
            arith_loop_scalar(hart, vm, vs2, scalar, vd, |elem, s| match tag {
                VaddVi => elem.wrapping_add(s),
                VrsubVi => s.wrapping_sub(elem),
                _ => unreachable!(),
            })?;
        }
        _ => unreachable!("non-vector tag routed to vector::execute"),
    }
    Ok(None)
}

fn arith_loop(hart: &mut Hart, vm: bool, vs2: u8, vs1: u8, vd: u8, f: impl Fn(u64, u64) -> u64) -> Result<(), StepError> {
    let vtype = hart.csr.vtype;
    check_group_alignment(vd, vtype.lmul_int()).map_err(|_| StepError::IllegalVtype)?;
    let sew = vtype.sew;
    let vl = hart.csr.vl;
    for i in hart.csr.vstart as usize..vl as usize {
        if !vm && !hart.vector.mask_bit(i) {
            continue;
        }
        let a = hart.vector.read_elem(vs2, sew, i);
        let b = hart.vector.read_elem(vs1, sew, i);
        hart.vector.write_elem(vd, sew, i, truncate(f(a, b), sew));
    }
    hart.csr.vstart = 0;
    Ok(())
}

fn arith_loop_scalar(hart: &mut Hart, vm: bool, vs2: u8, scalar: u64, vd: u8, f: impl Fn(u64, u64) -> u64) -> Result<(), StepError> {
    let vtype = hart.csr.vtype;
    check_group_alignment(vd, vtype.lmul_int()).map_err(|_| StepError::IllegalVtype)?;
    let sew = vtype.sew;
    let vl = hart.csr.vl;
    for i in hart.csr.vstart as usize..vl as usize {
        if !vm && !hart.vector.mask_bit(i) {
            continue;
        }
        let a = hart.vector.read_elem(vs2, sew, i);
        hart.vector.write_elem(vd, sew, i, truncate(f(a, scalar), sew));
    }
    hart.csr.vstart = 0;
    Ok(())
}

fn truncate(value: u64, sew: u32) -> u64 {
    if sew >= 64 {
        value
    } else {
        value & ((1u64 << sew) - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hart::HartConfig;

    fn vset_raw(rd: u8, rs1: u8, vtypei: u32) -> u32 {
        (vtypei << 20) | ((rs1 as u32) << 15) | (0b111 << 12) | ((rd as u32) << 7) | 0b1010111
    }

    #[test]
    fn vsetvli_sets_vl_to_vlmax_when_rs1_is_zero() {
        let system = System::new(64);
        let mut hart = Hart::new(HartConfig::default());
        // vsetvli x1, x0, e32, m1 -> sew=32 (0b010<<3), lmul=1(0b000)
        let vtypei = 0b010 << 3;
        let raw = vset_raw(1, 0, vtypei);
        execute(&mut hart, &system, Tag::VsetVli, raw).unwrap();
        assert_eq!(hart.csr.vtype.sew, 32);
        assert_eq!(hart.csr.vl, hart.vector.vlen_bits() / 32);
        assert_eq!(hart.gpr.read(1), hart.csr.vl as u64);
    }

    #[test]
    fn vadd_vv_resumes_from_vstart_and_clears_it() {
        let system = System::new(64);
        let mut hart = Hart::new(HartConfig::default());
        let raw = vset_raw(0, 0, 0b010 << 3); // sew=32, lmul=1
        execute(&mut hart, &system, Tag::VsetVli, raw).unwrap();
        for i in 0..4usize {
            hart.vector.write_elem(1, 32, i, i as u64);
            hart.vector.write_elem(2, 32, i, 10);
            hart.vector.write_elem(3, 32, i, 999);
        }
        hart.csr.vstart = 2;
        let vm = 1u32 << 25;
        let add_raw = vm | (2 << 20) | (1 << 15) | (0b000 << 12) | (3 << 7) | 0b1010111;
        execute(&mut hart, &system, Tag::VaddVv, add_raw).unwrap();
        assert_eq!(hart.vector.read_elem(3, 32, 0), 999); // untouched, before vstart
        assert_eq!(hart.vector.read_elem(3, 32, 2), 12);
        assert_eq!(hart.csr.vstart, 0);
    }

    #[test]
    fn vadd_vv_adds_elementwise() {
        let system = System::new(64);
        let mut hart = Hart::new(HartConfig::default());
        let raw = vset_raw(0, 0, 0b010 << 3); // sew=32, lmul=1
        execute(&mut hart, &system, Tag::VsetVli, raw).unwrap();
        for i in 0..4usize {
            hart.vector.write_elem(1, 32, i, i as u64);
            hart.vector.write_elem(2, 32, i, 10);
        }
        let vm = 1u32 << 25; // vm=1 bit set -> unmasked field semantics (vm bit=1 means "no mask")
        let add_raw = vm | (2 << 20) | (1 << 15) | (0b000 << 12) | (3 << 7) | 0b1010111;
        execute(&mut hart, &system, Tag::VaddVv, add_raw).unwrap();
        for i in 0..4usize {
            assert_eq!(hart.vector.read_elem(3, 32, i), 10 + i as u64);
        }
    }
}
