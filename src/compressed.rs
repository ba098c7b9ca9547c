//! The C-extension expander (spec section 4.3): maps a 16-bit compressed
//! instruction word to the 32-bit instruction it is defined to be
//! equivalent to, so the rest of the pipeline (`tag::classify`, the
//! field extractors, the executors) never has to know compression
//! happened. Illegal/reserved encodings expand to `None`.

use crate::utils::{extract_field16, sign_extend};

const fn rd_rs1_full(raw: u16) -> u8 {
    ((raw >> 7) & 0x1f) as u8
}

const fn rs2_full(raw: u16) -> u8 {
    ((raw >> 2) & 0x1f) as u8
}

/// Map a compressed 3-bit register field to the full x8..x15 range used
/// by the "quadrant 0/1 short" forms (C.LW, C.SW, C.ADDI4SPN, ...).
const fn rd_rs1_short(raw: u16, shift: u32) -> u8 {
    (((raw >> shift) & 0b111) as u8) + 8
}

fn r_type32(funct7: u32, rs2: u8, rs1: u8, funct3: u32, rd: u8, opcode: u32) -> u32 {
    (funct7 << 25)
        | ((rs2 as u32) << 20)
        | ((rs1 as u32) << 15)
        | (funct3 << 12)
        | ((rd as u32) << 7)
        | opcode
}

fn i_type32(imm12: i64, rs1: u8, funct3: u32, rd: u8, opcode: u32) -> u32 {
    let imm = (imm12 as u32) & 0xfff;
    (imm << 20) | ((rs1 as u32) << 15) | (funct3 << 12) | ((rd as u32) << 7) | opcode
}

fn s_type32(imm12: i64, rs1: u8, rs2: u8, funct3: u32, opcode: u32) -> u32 {
    let imm = (imm12 as u32) & 0xfff;
    let hi = (imm >> 5) & 0x7f;
    let lo = imm & 0x1f;
    (hi << 25) | ((rs2 as u32) << 20) | ((rs1 as u32) << 15) | (funct3 << 12) | (lo << 7) | opcode
}

fn b_type32(offset: i64, rs1: u8, rs2: u8, funct3: u32, opcode: u32) -> u32 {
    let imm = (offset as u32) & 0x1fff;
    let b12 = (imm >> 12) & 1;
    let b11 = (imm >> 11) & 1;
    let b10_5 = (imm >> 5) & 0x3f;
    let b4_1 = (imm >> 1) & 0xf;
    (b12 << 31)
        | (b10_5 << 25)
        | ((rs2 as u32) << 20)
        | ((rs1 as u32) << 15)
        | (funct3 << 12)
        | (b4_1 << 8)
        | (b11 << 7)
        | opcode
}

fn u_type32(imm20: u32, rd: u8, opcode: u32) -> u32 {
    (imm20 << 12) | ((rd as u32) << 7) | opcode
}

fn j_type32(offset: i64, rd: u8, opcode: u32) -> u32 {
    let imm = (offset as u32) & 0x1f_ffff;
    let b20 = (imm >> 20) & 1;
    let b19_12 = (imm >> 12) & 0xff;
    let b11 = (imm >> 11) & 1;
    let b10_1 = (imm >> 1) & 0x3ff;
    (b20 << 31) | (b10_1 << 21) | (b11 << 20) | (b19_12 << 12) | ((rd as u32) << 7) | opcode
}

use crate::tag::{OP, OP_32, OP_BRANCH, OP_IMM, OP_IMM_32, OP_JAL, OP_JALR, OP_LOAD, OP_LUI, OP_STORE, OP_SYSTEM};

/// Expand a 16-bit compressed instruction to its full-width equivalent.
/// Returns `None` for reserved/illegal encodings (including the all-zero
/// word, which is illegal by definition in both forms).
pub fn expand_c(raw: u16) -> Option<u32> {
    let op = extract_field16(raw, 1, 0);
    let funct3 = extract_field16(raw, 15, 13) as u32;
    if raw == 0 {
        return None;
    }
    match op {
        0b00 => expand_q0(raw, funct3),
        0b01 => expand_q1(raw, funct3),
        0b10 => expand_q2(raw, funct3),
        _ => None,
    }
}

fn expand_q0(raw: u16, funct3: u32) -> Option<u32> {
    let rd = rd_rs1_short(raw, 2);
    let rs1 = rd_rs1_short(raw, 7);
    match funct3 {
        0b000 => {
            // C.ADDI4SPN: nzuimm[5:4]=raw[12:11], nzuimm[9:6]=raw[10:7],
            // nzuimm[2]=raw[6], nzuimm[3]=raw[5]; rd' = x8+rd, rs1 = x2 (sp)
            let nz54 = ((raw >> 11) & 0b11) as u32;
            let nz96 = ((raw >> 7) & 0b1111) as u32;
            let nz2 = ((raw >> 6) & 1) as u32;
            let nz3 = ((raw >> 5) & 1) as u32;
            let imm = (nz96 << 6) | (nz54 << 4) | (nz3 << 3) | (nz2 << 2);
            if imm == 0 {
                return None;
            }
            Some(i_type32(imm as i64, 2, 0b000, rd, OP_IMM))
        }
        0b001 => {
            // C.FLD / C.LQ: not supported at F32-only scope; decode-only illegal.
            None
        }
        0b010 => {
            // C.LW: rd' = x8+rd, imm[5:3]=raw[12:10], imm[2]=raw[6], imm[6]=raw[5]
            let imm = (((raw >> 10) & 0b111) as i64) << 3
                | (((raw >> 6) & 1) as i64) << 2
                | (((raw >> 5) & 1) as i64) << 6;
            Some(i_type32(imm, rs1, 0b010, rd, OP_LOAD))
        }
        0b011 => {
            // C.LD: rd' = x8+rd, imm[5:3]=raw[12:10], imm[7:6]=raw[6:5]
            let imm = (((raw >> 10) & 0b111) as i64) << 3 | (((raw >> 5) & 0b11) as i64) << 6;
            Some(i_type32(imm, rs1, 0b011, rd, OP_LOAD))
        }
        0b110 => {
            // C.SW
            let imm = (((raw >> 10) & 0b111) as i64) << 3
                | (((raw >> 6) & 1) as i64) << 2
                | (((raw >> 5) & 1) as i64) << 6;
            let rs2 = rd; // rd' field reused as rs2' here
            Some(s_type32(imm, rs1, rs2, 0b010, OP_STORE))
        }
        0b111 => {
            // C.SD
            let imm = (((raw >> 10) & 0b111) as i64) << 3 | (((raw >> 5) & 0b11) as i64) << 6;
            let rs2 = rd;
            Some(s_type32(imm, rs1, rs2, 0b011, OP_STORE))
        }
        _ => None,
    }
}

fn expand_q1(raw: u16, funct3: u32) -> Option<u32> {
    let rd_rs1 = rd_rs1_full(raw);
    match funct3 {
        0b000 => {
            // C.ADDI (rd_rs1 == 0 is C.NOP, still valid, imm may be 0)
            let imm = nzimm6(raw);
            Some(i_type32(imm, rd_rs1, 0b000, rd_rs1, OP_IMM))
        }
        0b001 => {
            // C.ADDIW: rd_rs1 != 0 required
            if rd_rs1 == 0 {
                return None;
            }
            let imm = nzimm6(raw);
            Some(i_type32(imm, rd_rs1, 0b000, rd_rs1, OP_IMM_32))
        }
        0b010 => {
            // C.LI: rd != 0
            if rd_rs1 == 0 {
                return None;
            }
            let imm = nzimm6(raw);
            Some(i_type32(imm, 0, 0b000, rd_rs1, OP_IMM))
        }
        0b011 => {
            if rd_rs1 == 2 {
                // C.ADDI16SP: imm[9]=raw[12], imm[4]=raw[6], imm[6]=raw[5], imm[8:7]=raw[4:3], imm[5]=raw[2]
                let imm = (((raw >> 12) & 1) as i64) << 9
                    | (((raw >> 6) & 1) as i64) << 4
                    | (((raw >> 5) & 1) as i64) << 6
                    | (((raw >> 3) & 0b11) as i64) << 7
                    | (((raw >> 2) & 1) as i64) << 5;
                let imm = sign_extend(imm as u64, 10);
                if imm == 0 {
                    return None;
                }
                Some(i_type32(imm, 2, 0b000, 2, OP_IMM))
            } else if rd_rs1 != 0 {
                // C.LUI: nzimm[17]=raw[12], nzimm[16:12]=raw[6:2]
                let imm17 = ((raw >> 12) & 1) as u32;
                let imm16_12 = ((raw >> 2) & 0x1f) as u32;
                let raw20 = (imm17 << 17) | (imm16_12 << 12);
                if raw20 == 0 {
                    return None;
                }
                let signed = sign_extend((raw20 >> 12) as u64, 6) as u32 & 0xf_ffff;
                Some(u_type32(signed, rd_rs1, OP_LUI))
            } else {
                None
            }
        }
        0b100 => {
            let funct2 = (raw >> 10) & 0b11;
            let rd_rs1_short = rd_rs1_short(raw, 7);
            match funct2 {
                0b00 => {
                    // C.SRLI
                    let shamt = shamt6(raw);
                    Some(i_type32(shamt as i64, rd_rs1_short, 0b101, rd_rs1_short, OP_IMM))
                }
                0b01 => {
                    // C.SRAI
                    let shamt = shamt6(raw) as u32 | (0b010000 << 6);
                    Some(i_type32(shamt as i64, rd_rs1_short, 0b101, rd_rs1_short, OP_IMM))
                }
                0b10 => {
                    // C.ANDI
                    let imm = nzimm6(raw);
                    Some(i_type32(imm, rd_rs1_short, 0b111, rd_rs1_short, OP_IMM))
                }
                0b11 => {
                    let rs2_short = rd_rs1_short_from(raw);
                    let bit12 = (raw >> 12) & 1;
                    let funct2b = (raw >> 5) & 0b11;
                    match (bit12, funct2b) {
                        (0, 0b00) => Some(r_type32(0b0100000, rs2_short, rd_rs1_short, 0b000, rd_rs1_short, OP)), // SUB
                        (0, 0b01) => Some(r_type32(0b0000000, rs2_short, rd_rs1_short, 0b100, rd_rs1_short, OP)), // XOR
                        (0, 0b10) => Some(r_type32(0b0000000, rs2_short, rd_rs1_short, 0b110, rd_rs1_short, OP)), // OR
                        (0, 0b11) => Some(r_type32(0b0000000, rs2_short, rd_rs1_short, 0b111, rd_rs1_short, OP)), // AND
                        (1, 0b00) => Some(r_type32(0b0100000, rs2_short, rd_rs1_short, 0b000, rd_rs1_short, OP_32)), // SUBW
                        (1, 0b01) => Some(r_type32(0b0000000, rs2_short, rd_rs1_short, 0b000, rd_rs1_short, OP_32)), // ADDW
                        _ => None,
                    }
                }
                _ => None,
            }
        }
        0b101 => {
            // C.J
            let offset = cj_offset(raw);
            Some(j_type32(offset, 0, OP_JAL))
        }
        0b110 => {
            // C.BEQZ
            let rs1 = rd_rs1_short(raw, 7);
            let offset = cb_offset(raw);
            Some(b_type32(offset, rs1, 0, 0b000, OP_BRANCH))
        }
        0b111 => {
            // C.BNEZ
            let rs1 = rd_rs1_short(raw, 7);
            let offset = cb_offset(raw);
            Some(b_type32(offset, rs1, 0, 0b001, OP_BRANCH))
        }
        _ => None,
    }
}

fn expand_q2(raw: u16, funct3: u32) -> Option<u32> {
    let rd_rs1 = rd_rs1_full(raw);
    match funct3 {
        0b000 => {
            // C.SLLI
            if rd_rs1 == 0 {
                return None;
            }
            let shamt = shamt6(raw);
            Some(i_type32(shamt as i64, rd_rs1, 0b001, rd_rs1, OP_IMM))
        }
        0b010 => {
            // C.LWSP: rd != 0
            if rd_rs1 == 0 {
                return None;
            }
            let imm = (((raw >> 4) & 0b111) as i64) << 2
                | (((raw >> 12) & 1) as i64) << 5
                | (((raw >> 2) & 0b11) as i64) << 6;
            Some(i_type32(imm, 2, 0b010, rd_rs1, OP_LOAD))
        }
        0b011 => {
            // C.LDSP: rd != 0
            if rd_rs1 == 0 {
                return None;
            }
            let imm = (((raw >> 5) & 0b11) as i64) << 3
                | (((raw >> 12) & 1) as i64) << 5
                | (((raw >> 2) & 0b111) as i64) << 6;
            Some(i_type32(imm, 2, 0b011, rd_rs1, OP_LOAD))
        }
        0b100 => {
            let bit12 = (raw >> 12) & 1;
            let rs2 = rs2_full(raw);
            if bit12 == 0 {
                if rs2 == 0 {
                    // C.JR: rd_rs1 != 0
                    if rd_rs1 == 0 {
                        return None;
                    }
                    Some(i_type32(0, rd_rs1, 0b000, 0, OP_JALR))
                } else {
                    // C.MV: rd != 0
                    if rd_rs1 == 0 {
                        return None;
                    }
                    Some(r_type32(0, rs2, 0, 0b000, rd_rs1, OP))
                }
            } else if rs2 == 0 {
                if rd_rs1 == 0 {
                    // C.EBREAK
                    Some(0x0010_0073)
                } else {
                    // C.JALR
                    Some(i_type32(0, rd_rs1, 0b000, 1, OP_JALR))
                }
            } else {
                // C.ADD: rd != 0
                if rd_rs1 == 0 {
                    return None;
                }
                Some(r_type32(0, rs2, rd_rs1, 0b000, rd_rs1, OP))
            }
        }
        0b110 => {
            // C.SWSP
            let imm = (((raw >> 9) & 0b1111) as i64) << 2 | (((raw >> 7) & 0b11) as i64) << 6;
            let rs2 = rs2_full(raw);
            Some(s_type32(imm, 2, rs2, 0b010, OP_STORE))
        }
        0b111 => {
            // C.SDSP
            let imm = (((raw >> 10) & 0b111) as i64) << 3 | (((raw >> 7) & 0b111) as i64) << 6;
            let rs2 = rs2_full(raw);
            Some(s_type32(imm, 2, rs2, 0b011, OP_STORE))
        }
        _ => None,
    }
}

fn rd_rs1_short_from(raw: u16) -> u8 {
    rd_rs1_short(raw, 2)
}

/// The 6-bit non-zero immediate shared by C.ADDI/C.ADDIW/C.LI/C.ANDI:
/// imm[5]=raw[12], imm[4:0]=raw[6:2], sign-extended.
fn nzimm6(raw: u16) -> i64 {
    let bits = (((raw >> 12) & 1) as u32) << 5 | ((raw >> 2) & 0x1f) as u32;
    sign_extend(bits as u64, 6)
}

/// shamt for C.SLLI/C.SRLI/C.SRAI: shamt[5]=raw[12], shamt[4:0]=raw[6:2].
/// RV64 allows the full 6-bit shift amount (shamt[5] may be 1).
fn shamt6(raw: u16) -> u32 {
    (((raw >> 12) & 1) as u32) << 5 | ((raw >> 2) & 0x1f) as u32
}

/// C.J/C.JAL offset: 11-bit signed, scattered encoding per the C
/// extension's jump-target table.
fn cj_offset(raw: u16) -> i64 {
    let b = raw as u32;
    let imm = (((b >> 12) & 1) << 11)
        | (((b >> 11) & 1) << 4)
        | (((b >> 9) & 0b11) << 8)
        | (((b >> 8) & 1) << 10)
        | (((b >> 7) & 1) << 6)
        | (((b >> 6) & 1) << 7)
        | (((b >> 3) & 0b111) << 1)
        | (((b >> 2) & 1) << 5);
    sign_extend(imm as u64, 12)
}

/// C.BEQZ/C.BNEZ offset: 8-bit signed, scattered.
fn cb_offset(raw: u16) -> i64 {
    let b = raw as u32;
    let imm = (((b >> 12) & 1) << 8)
        | (((b >> 10) & 0b11) << 3)
        | (((b >> 5) & 0b11) << 6)
        | (((b >> 3) & 0b11) << 1)
        | (((b >> 2) & 1) << 5);
    sign_extend(imm as u64, 9)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::{self, Tag};

    #[test]
    fn c_nop_expands_to_addi_zero() {
        let expanded = expand_c(0x0001).unwrap();
        assert_eq!(tag::classify(expanded), Tag::Addi);
    }

    #[test]
    fn c_li_sets_rd_from_sign_extended_imm() {
        // c.li a0, -1 : 0101_0_10101_11111_01  (funct3=010, imm[5]=1, rd=10(a0), imm[4:0]=11111)
        let raw: u16 = 0b010_1_01010_11111_01;
        let expanded = expand_c(raw).unwrap();
        assert_eq!(tag::classify(expanded), Tag::Addi);
        let (imm, rs1, rd) = crate::fields::i_type(expanded);
        assert_eq!(imm, -1);
        assert_eq!(rs1, 0);
        assert_eq!(rd, 10);
    }

    #[test]
    fn c_addi4spn_zero_immediate_is_reserved() {
        assert_eq!(expand_c(0b000_00000000_000_00), None);
    }

    #[test]
    fn all_zero_word_is_illegal() {
        assert_eq!(expand_c(0), None);
    }

    #[test]
    fn c_jr_requires_nonzero_rd_rs1() {
        // funct3=100, bit12=0, rd_rs1=0, rs2=0 -> reserved, not C.JR
        assert_eq!(expand_c(0b100_0_00000_00000_10), None);
    }

    #[test]
    fn c_ebreak_expands_correctly() {
        let raw: u16 = 0b100_1_00000_00000_10;
        assert_eq!(expand_c(raw), Some(0x0010_0073));
    }
}
