//! Per-format field extractors (spec section 4.2).
//!
//! Each function returns the full operand tuple required for every tag in
//! that format, so dispatch in the executors is tag-based, never
//! bit-based: the executor never re-examines raw opcode/funct bits that
//! the classifier already consumed. Field positions follow spec section 6
//! exactly (bit 0 = LSB).

use crate::utils::{extract_field, sign_extend};

pub fn opcode(raw: u32) -> u32 {
    extract_field(raw, 6, 0)
}

pub fn funct3(raw: u32) -> u32 {
    extract_field(raw, 14, 12)
}

pub fn funct7(raw: u32) -> u32 {
    extract_field(raw, 31, 25)
}

pub fn funct12(raw: u32) -> u32 {
    extract_field(raw, 31, 20)
}

pub fn funct5(raw: u32) -> u32 {
    extract_field(raw, 31, 27)
}

pub fn funct6(raw: u32) -> u32 {
    extract_field(raw, 31, 26)
}

pub fn funct2(raw: u32) -> u32 {
    extract_field(raw, 26, 25)
}

pub fn rd(raw: u32) -> u8 {
    extract_field(raw, 11, 7) as u8
}

pub fn rs1(raw: u32) -> u8 {
    extract_field(raw, 19, 15) as u8
}

pub fn rs2(raw: u32) -> u8 {
    extract_field(raw, 24, 20) as u8
}

pub fn rs3(raw: u32) -> u8 {
    extract_field(raw, 31, 27) as u8
}

/// R-type: `(rs2, rs1, rd)`.
pub fn r_type(raw: u32) -> (u8, u8, u8) {
    (rs2(raw), rs1(raw), rd(raw))
}

/// I-type: `(imm12 sign-extended to i64, rs1, rd)`.
pub fn i_type(raw: u32) -> (i64, u8, u8) {
    let imm = extract_field(raw, 31, 20) as u64;
    (sign_extend(imm, 12), rs1(raw), rd(raw))
}

/// Shift-immediate specialisation of I-type: the shift amount is bits
/// 25..20 (6 bits, for doubleword shifts) with the distinguishing
/// arithmetic/logical bit at 30; word (`*W`) shifts use only the low 5
/// bits of that field. Returned unshifted/un-sign-extended: the caller
/// masks to 5 or 6 bits as appropriate for the tag.
pub fn shift_type(raw: u32) -> (u32, u8, u8) {
    let shamt = extract_field(raw, 25, 20);
    (shamt, rs1(raw), rd(raw))
}

/// S-type: `(imm12 sign-extended, rs1, rs2)`.
pub fn s_type(raw: u32) -> (i64, u8, u8) {
    let imm11_5 = extract_field(raw, 31, 25);
    let imm4_0 = extract_field(raw, 11, 7);
    let imm = (imm11_5 << 5) | imm4_0;
    (sign_extend(imm as u64, 12), rs1(raw), rs2(raw))
}

/// B-type: `(offset sign-extended, rs1, rs2)`.
pub fn b_type(raw: u32) -> (i64, u8, u8) {
    let imm12 = extract_field(raw, 31, 31);
    let imm10_5 = extract_field(raw, 30, 25);
    let imm4_1 = extract_field(raw, 11, 8);
    let imm11 = extract_field(raw, 7, 7);
    let imm = (imm12 << 12) | (imm11 << 11) | (imm10_5 << 5) | (imm4_1 << 1);
    (sign_extend(imm as u64, 13), rs1(raw), rs2(raw))
}

/// U-type: `(imm20, rd)`. The executor is responsible for shifting left
/// by 12 and sign-extending.
pub fn u_type(raw: u32) -> (u32, u8) {
    (extract_field(raw, 31, 12), rd(raw))
}

/// J-type: `(offset sign-extended, rd)`.
pub fn j_type(raw: u32) -> (i64, u8) {
    let imm20 = extract_field(raw, 31, 31);
    let imm10_1 = extract_field(raw, 30, 21);
    let imm11 = extract_field(raw, 20, 20);
    let imm19_12 = extract_field(raw, 19, 12);
    let imm = (imm20 << 20) | (imm19_12 << 12) | (imm11 << 11) | (imm10_1 << 1);
    (sign_extend(imm as u64, 21), rd(raw))
}

/// R4-type (fused multiply-add float instructions): `(rs3, fmt, rs2,
/// rs1, rm, rd)`.
pub fn r4_type(raw: u32) -> (u8, u32, u8, u8, u32, u8) {
    (rs3(raw), funct2(raw), rs2(raw), rs1(raw), funct3(raw), rd(raw))
}

/// CSR-register form: `(csr12, rs1, rd)`.
pub fn csr_reg_type(raw: u32) -> (u16, u8, u8) {
    (extract_field(raw, 31, 20) as u16, rs1(raw), rd(raw))
}

/// CSR-immediate form: `(csr12, uimm5, rd)`. The 5-bit immediate is
/// carried in the rs1 slot, zero-extended (never sign-extended).
pub fn csr_imm_type(raw: u32) -> (u16, u8, u8) {
    (extract_field(raw, 31, 20) as u16, rs1(raw), rd(raw))
}

/// Atomic form: `(aq, rl, rs2, rs1, rd)`.
pub fn atomic_type(raw: u32) -> (bool, bool, u8, u8, u8) {
    let aq = extract_field(raw, 26, 26) != 0;
    let rl = extract_field(raw, 25, 25) != 0;
    (aq, rl, rs2(raw), rs1(raw), rd(raw))
}

/// vsetvli/vsetivli/vsetvl share the OP-V opcode with funct3=0b111; this
/// extractor decodes all three sub-forms via the top bits of what would
/// otherwise be the I-type immediate.
pub struct VsetFields {
    pub rd: u8,
    pub rs1: u8,
    /// Immediate vtype value for vsetvli, 10-bit for vsetivli's zimm
    /// used as the new vl, or `None` when the vl source is a register
    /// (vsetvl/vsetvli).
    pub zimm: Option<u32>,
    pub vtypei: u32,
}

pub fn vset_type(raw: u32) -> VsetFields {
    let rd_ = rd(raw);
    let rs1_ = rs1(raw);
    if extract_field(raw, 31, 31) == 1 {
        // vsetivli: bit 31 = 1, vtypei in [29:20], uimm in [19:15]
        VsetFields {
            rd: rd_,
            rs1: 0,
            zimm: Some(extract_field(raw, 19, 15)),
            vtypei: extract_field(raw, 29, 20),
        }
    } else if extract_field(raw, 30, 25) == 0b100000 {
        // vsetvl: rs2 carries the vtype value, bit 31=0 bit 30..25=0b100000
        VsetFields {
            rd: rd_,
            rs1: rs1_,
            zimm: None,
            vtypei: 0,
        }
    } else {
        // vsetvli: bit 31 = 0, vtypei in [30:20]
        VsetFields {
            rd: rd_,
            rs1: rs1_,
            zimm: None,
            vtypei: extract_field(raw, 30, 20),
        }
    }
}

/// Unit-stride vector load/store: `(vm, vd_or_vs3, rs1)`. `vm` mirrors
/// the instruction's vm bit directly: `true` means unmasked, `false`
/// means the operation is masked by v0. The nf/mop/lumop fields beyond
/// unit-stride are decoded but unused at this specification's scope.
pub fn vector_mem_type(raw: u32) -> (bool, u8, u8) {
    let vm = extract_field(raw, 25, 25) != 0;
    (vm, rd(raw), rs1(raw))
}

/// OPIVV/OPFVV/OPMVV: `(vm, vs2, vs1, vd)`. `vm == true` means unmasked.
pub fn opvv_type(raw: u32) -> (bool, u8, u8, u8) {
    let vm = extract_field(raw, 25, 25) != 0;
    (vm, rs2(raw), rs1(raw), rd(raw))
}

/// OPIVX/OPFVF/OPMVX: `(vm, vs2, rs1, vd)`, identical bit layout to
/// `opvv_type` — the distinction is purely which register file rs1
/// addresses, decided by the classifier's funct3.
pub fn opvx_type(raw: u32) -> (bool, u8, u8, u8) {
    opvv_type(raw)
}

/// OPIVI: `(vm, vs2, imm5 sign-extended, vd)`. `vm == true` means
/// unmasked.
pub fn opvi_type(raw: u32) -> (bool, u8, i64, u8) {
    let vm = extract_field(raw, 25, 25) != 0;
    let imm5 = extract_field(raw, 19, 15) as u64;
    (vm, rs2(raw), sign_extend(imm5, 5), rd(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn i_type_decodes_addi_t0_t1_5() {
        // addi t0, t1, 5 -> 0x00530293
        let raw = 0x0053_0293;
        let (imm, rs1_, rd_) = i_type(raw);
        assert_eq!(imm, 5);
        assert_eq!(rs1_, 6); // t1 = x6
        assert_eq!(rd_, 5); // t0 = x5
    }

    #[test]
    fn s_type_reassembles_split_immediate() {
        // sd x1, 3(x2) -> imm=3, rs1=x2, rs2=x1
        let raw = 0x0011_31a3;
        let (imm, rs1_, rs2_) = s_type(raw);
        assert_eq!(imm, 3);
        assert_eq!(rs1_, 2);
        assert_eq!(rs2_, 1);
    }

    #[test]
    fn b_type_offset_is_always_even_and_sign_extended() {
        let (offset, _, _) = b_type(0xfe31_0ee3);
        assert_eq!(offset % 2, 0);
        assert!(offset < 0);
    }

    #[test]
    fn j_type_offset_low_bit_always_zero() {
        let (offset, rd_) = j_type(0x00c0_00ef); // jal ra, +12
        assert_eq!(offset, 12);
        assert_eq!(rd_, 1);
    }
}
