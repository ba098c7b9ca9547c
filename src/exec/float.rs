//! F-extension (single precision) executors (spec section 4.7).
//!
//! Host `f32` arithmetic is used directly for the common case; fcsr
//! flags are derived from the operands/result rather than read from a
//! host floating-point status register, since Rust does not expose one
//! portably. Rounding modes beyond the host's round-to-nearest-even are
//! accepted (dynamic `rm`/static encodings are decoded) but do not
//! change the result: spec section 1 allows a single emulated rounding
//! behavior when bridging to host arithmetic.

use super::ExecResult;
use crate::error::StepError;
use crate::fields;
use crate::hart::{Hart, System};
use crate::memory::Width;
use crate::tag::Tag;

const FLAG_NV: u8 = 0b00001;
const FLAG_DZ: u8 = 0b00010;
const FLAG_OF: u8 = 0b00100;
const FLAG_NX: u8 = 0b10000;

/// Set NV when a result is NaN but neither operand was already NaN (an
/// invalid operation like inf-inf produced it, rather than ordinary NaN
/// propagation). Set OF when finite operands produce an infinite result
/// (the result magnitude overflowed the exponent range); OF is always
/// accompanied by NX per spec section 4.7. NX is otherwise not tracked:
/// detecting it precisely in the non-overflow case would require a host
/// rounding-exception flag this emulator does not have access to through
/// `f32` arithmetic (spec section 1 allows a single emulated rounding
/// behaviour at the cost of full flag fidelity).
fn accumulate_arith_flags(hart: &mut Hart, result: f32, a: f32, b: f32) {
    if result.is_nan() && !a.is_nan() && !b.is_nan() {
        hart.csr.fflags_frm.accumulate(FLAG_NV);
    } else if result.is_infinite() && a.is_finite() && b.is_finite() {
        hart.csr.fflags_frm.accumulate(FLAG_OF | FLAG_NX);
    }
}

pub fn execute(hart: &mut Hart, system: &System, tag: Tag, raw: u32) -> ExecResult {
    use Tag::*;

    match tag {
        Flw => {
            let (imm, rs1, rd) = fields::i_type(raw);
            let addr = hart.gpr.read(rs1).wrapping_add(imm as u64);
            let bits = system.read(addr, Width::Word)? as u32;
            hart.fpr.write_bits(rd, bits);
        }
        Fsw => {
            let (imm, rs1, rs2) = fields::s_type(raw);
            let addr = hart.gpr.read(rs1).wrapping_add(imm as u64);
            system.write(addr, Width::Word, hart.fpr.read_bits(rs2) as u64)?;
        }
        FaddS | FsubS | FmulS | FdivS => {
            let (rs2, rs1, rd) = fields::r_type(raw);
            let a = hart.fpr.read(rs1);
            let b = hart.fpr.read(rs2);
            let result = match tag {
                FaddS => a + b,
                FsubS => a - b,
                FmulS => a * b,
                FdivS => {
                    if b == 0.0 {
                        hart.csr.fflags_frm.accumulate(FLAG_DZ);
                    }
                    a / b
                }
                _ => unreachable!(),
            };
            hart.fpr.write(rd, result);
            accumulate_arith_flags(hart, result, a, b);
        }
        FsqrtS => {
            let (rs2, rs1, rd) = fields::r_type(raw);
            let _ = rs2;
            let a = hart.fpr.read(rs1);
            let result = a.sqrt();
            if a < 0.0 {
                hart.csr.fflags_frm.accumulate(FLAG_NV);
            }
            hart.fpr.write(rd, result);
        }
        FsgnjS | FsgnjnS | FsgnjxS => {
            let (rs2, rs1, rd) = fields::r_type(raw);
            let a = hart.fpr.read_bits(rs1);
            let b = hart.fpr.read_bits(rs2);
            let sign_a = a & 0x8000_0000;
            let sign_b = b & 0x8000_0000;
            let magnitude = a & 0x7fff_ffff;
            let sign = match tag {
                FsgnjS => sign_b,
                FsgnjnS => sign_b ^ 0x8000_0000,
                FsgnjxS => sign_a ^ sign_b,
                _ => unreachable!(),
            };
            hart.fpr.write_bits(rd, magnitude | sign);
        }
        FminS | FmaxS => {
            let (rs2, rs1, rd) = fields::r_type(raw);
            let a = hart.fpr.read(rs1);
            let b = hart.fpr.read(rs2);
            let result = match tag {
                FminS => a.min(b),
                FmaxS => a.max(b),
                _ => unreachable!(),
            };
            hart.fpr.write(rd, result);
        }
        FcvtWS | FcvtWuS | FcvtLS | FcvtLuS => {
            let (_rs2, rs1, rd) = fields::r_type(raw);
            let a = hart.fpr.read(rs1);
            if a.is_nan() || a.is_infinite() {
                hart.csr.fflags_frm.accumulate(FLAG_NV);
            }
            let value = match tag {
                FcvtWS => cvt_saturate_i32(a) as i64 as u64,
                FcvtWuS => cvt_saturate_u32(a) as u64,
                FcvtLS => cvt_saturate_i64(a) as u64,
                FcvtLuS => cvt_saturate_u64(a),
                _ => unreachable!(),
            };
            hart.gpr.write(rd, value);
        }
        FcvtSW | FcvtSWu | FcvtSL | FcvtSLu => {
            let (_rs2, rs1, rd) = fields::r_type(raw);
            let a = hart.gpr.read(rs1);
            let result = match tag {
                FcvtSW => a as i32 as f32,
                FcvtSWu => a as u32 as f32,
                FcvtSL => a as i64 as f32,
                FcvtSLu => a as f32,
                _ => unreachable!(),
            };
            hart.fpr.write(rd, result);
        }
        FmvXW => {
            let (_rs2, rs1, rd) = fields::r_type(raw);
            hart.gpr.write(rd, hart.fpr.read_bits(rs1) as i32 as i64 as u64);
        }
        FmvWX => {
            let (_rs2, rs1, rd) = fields::r_type(raw);
            hart.fpr.write_bits(rd, hart.gpr.read(rs1) as u32);
        }
        FeqS | FltS | FleS => {
            let (rs2, rs1, rd) = fields::r_type(raw);
            let a = hart.fpr.read(rs1);
            let b = hart.fpr.read(rs2);
            let result = match tag {
                FeqS => a == b,
                FltS => a < b,
                FleS => a <= b,
                _ => unreachable!(),
            };
            if (a.is_nan() || b.is_nan()) && tag != FeqS {
                hart.csr.fflags_frm.accumulate(FLAG_NV);
            }
            hart.gpr.write(rd, result as u64);
        }
        FclassS => {
            let (_rs2, rs1, rd) = fields::r_type(raw);
            let a = hart.fpr.read(rs1);
            hart.gpr.write(rd, fclass(a));
        }
        FmaddS | FmsubS | FnmaddS | FnmsubS => {
            let (rs3, _fmt, rs2, rs1, _rm, rd) = fields::r4_type(raw);
            let a = hart.fpr.read(rs1);
            let b = hart.fpr.read(rs2);
            let c = hart.fpr.read(rs3);
            let result = match tag {
                FmaddS => a.mul_add(b, c),
                FmsubS => a.mul_add(b, -c),
                FnmaddS => -a.mul_add(b, c),
                FnmsubS => -a.mul_add(b, -c),
                _ => unreachable!(),
            };
            hart.fpr.write(rd, result);
        }
        _ => unreachable!("non-F tag routed to float::execute"),
    }
    Ok(None)
}

/// Saturating float-to-int conversions (spec section 4.7/8): NaN and
/// out-of-range magnitudes (including +-Inf) clamp to the target type's
/// max/min rather than wrapping, matching the `(a as iN)` Rust cast's
/// behaviour only for in-range finite values. NV is raised by the caller.
fn cvt_saturate_i32(a: f32) -> i32 {
    if a.is_nan() || a >= i32::MAX as f32 {
        i32::MAX
    } else if a <= i32::MIN as f32 {
        i32::MIN
    } else {
        a as i32
    }
}

fn cvt_saturate_u32(a: f32) -> u32 {
    if a.is_nan() || a >= u32::MAX as f32 {
        u32::MAX
    } else if a <= -1.0 {
        0
    } else {
        a as u32
    }
}

fn cvt_saturate_i64(a: f32) -> i64 {
    if a.is_nan() || a >= i64::MAX as f32 {
        i64::MAX
    } else if a <= i64::MIN as f32 {
        i64::MIN
    } else {
        a as i64
    }
}

fn cvt_saturate_u64(a: f32) -> u64 {
    if a.is_nan() || a >= u64::MAX as f32 {
        u64::MAX
    } else if a <= -1.0 {
        0
    } else {
        a as u64
    }
}

fn fclass(a: f32) -> u64 {
    let bits = a.to_bits();
    let sign = bits >> 31;
    if a.is_nan() {
        let is_signaling = bits & 0x0040_0000 == 0;
        return if is_signaling { 1 << 8 } else { 1 << 9 };
    }
    if a.is_infinite() {
        return if sign == 1 { 1 << 0 } else { 1 << 7 };
    }
    if a == 0.0 {
        return if sign == 1 { 1 << 3 } else { 1 << 4 };
    }
    let is_subnormal = (bits & 0x7f80_0000) == 0;
    match (sign, is_subnormal) {
        (1, true) => 1 << 2,
        (1, false) => 1 << 1,
        (0, true) => 1 << 5,
        (0, false) => 1 << 6,
        _ => unreachable!(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hart::HartConfig;

    fn r_type_raw(funct7: u32, rs2: u8, rs1: u8, funct3: u32, rd: u8) -> u32 {
        (funct7 << 25) | ((rs2 as u32) << 20) | ((rs1 as u32) << 15) | (funct3 << 12) | ((rd as u32) << 7) | 0b1010011
    }

    #[test]
    fn fadd_s_adds_two_floats() {
        let system = System::new(64);
        let mut hart = Hart::new(HartConfig::default());
        hart.fpr.write(1, 1.5);
        hart.fpr.write(2, 2.5);
        let raw = r_type_raw(0b0000000, 2, 1, 0, 3);
        execute(&mut hart, &system, Tag::FaddS, raw).unwrap();
        assert_eq!(hart.fpr.read(3), 4.0);
    }

    #[test]
    fn fdiv_by_zero_sets_dz_flag() {
        let system = System::new(64);
        let mut hart = Hart::new(HartConfig::default());
        hart.fpr.write(1, 1.0);
        hart.fpr.write(2, 0.0);
        let raw = r_type_raw(0b0001100, 2, 1, 0, 3);
        execute(&mut hart, &system, Tag::FdivS, raw).unwrap();
        assert!(hart.fpr.read(3).is_infinite());
        assert_eq!(hart.csr.fflags_frm.fflags() & FLAG_DZ, FLAG_DZ);
    }

    #[test]
    fn fclass_identifies_positive_zero() {
        assert_eq!(fclass(0.0), 1 << 4);
    }

    #[test]
    fn fcvt_w_s_of_nan_saturates_to_int32_max_and_sets_nv() {
        let system = System::new(64);
        let mut hart = Hart::new(HartConfig::default());
        hart.fpr.write(1, f32::NAN);
        let raw = r_type_raw(0b1100000, 0, 1, 0, 5);
        execute(&mut hart, &system, Tag::FcvtWS, raw).unwrap();
        assert_eq!(hart.gpr.read(5) as i32, i32::MAX);
        assert_eq!(hart.csr.fflags_frm.fflags() & FLAG_NV, FLAG_NV);
    }

    #[test]
    fn fcvt_wu_s_of_neg_infinity_saturates_to_zero() {
        let system = System::new(64);
        let mut hart = Hart::new(HartConfig::default());
        hart.fpr.write(1, f32::NEG_INFINITY);
        let raw = r_type_raw(0b1100000, 1, 1, 0, 5);
        execute(&mut hart, &system, Tag::FcvtWuS, raw).unwrap();
        assert_eq!(hart.gpr.read(5) as u32, 0);
        assert_eq!(hart.csr.fflags_frm.fflags() & FLAG_NV, FLAG_NV);
    }

    #[test]
    fn fmv_x_w_and_back_round_trips_bits() {
        let system = System::new(64);
        let mut hart = Hart::new(HartConfig::default());
        hart.fpr.write(1, -3.25);
        let to_int = r_type_raw(0b1110000, 0, 1, 0, 5);
        execute(&mut hart, &system, Tag::FmvXW, to_int).unwrap();
        hart.gpr.write(6, hart.gpr.read(5));
        let to_float = r_type_raw(0b1111000, 0, 6, 0, 2);
        execute(&mut hart, &system, Tag::FmvWX, to_float).unwrap();
        assert_eq!(hart.fpr.read(2), -3.25);
    }
}
