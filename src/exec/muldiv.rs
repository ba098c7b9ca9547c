//! M-extension executors: multiply/divide/remainder, word and doubleword
//! forms (spec section 4.5). Division-by-zero and signed overflow follow
//! the RISC-V-defined non-trapping results rather than a host panic.

use super::ExecResult;
use crate::fields;
use crate::hart::Hart;
use crate::tag::Tag;

pub fn execute(hart: &mut Hart, tag: Tag, raw: u32) -> ExecResult {
    use Tag::*;
    let (rs2, rs1, rd) = fields::r_type(raw);
    let a = hart.gpr.read(rs1);
    let b = hart.gpr.read(rs2);

    let result = match tag {
        Mul => a.wrapping_mul(b),
        Mulh => (((a as i64 as i128) * (b as i64 as i128)) >> 64) as u64,
        Mulhsu => (((a as i64 as i128) * (b as u128 as i128)) >> 64) as u64,
        Mulhu => (((a as u128) * (b as u128)) >> 64) as u64,
        Div => div_signed(a as i64, b as i64) as u64,
        Divu => div_unsigned(a, b),
        Rem => rem_signed(a as i64, b as i64) as u64,
        Remu => rem_unsigned(a, b),
        Mulw => {
            let a32 = a as i32;
            let b32 = b as i32;
            a32.wrapping_mul(b32) as i64 as u64
        }
        Divw => (div_signed(a as i32 as i64, b as i32 as i64) as i32) as i64 as u64,
        Divuw => {
            let a32 = a as u32;
            let b32 = b as u32;
            (div_unsigned_32(a32, b32) as i32) as i64 as u64
        }
        Remw => (rem_signed(a as i32 as i64, b as i32 as i64) as i32) as i64 as u64,
        Remuw => {
            let a32 = a as u32;
            let b32 = b as u32;
            (rem_unsigned_32(a32, b32) as i32) as i64 as u64
        }
        _ => unreachable!("non-muldiv tag routed to muldiv::execute"),
    };
    hart.gpr.write(rd, result);
    Ok(None)
}

fn div_signed(a: i64, b: i64) -> i64 {
    if b == 0 {
        -1
    } else if a == i64::MIN && b == -1 {
        a
    } else {
        a.wrapping_div(b)
    }
}

fn rem_signed(a: i64, b: i64) -> i64 {
    if b == 0 {
        a
    } else if a == i64::MIN && b == -1 {
        0
    } else {
        a.wrapping_rem(b)
    }
}

fn div_unsigned(a: u64, b: u64) -> u64 {
    if b == 0 {
        u64::MAX
    } else {
        a / b
    }
}

fn rem_unsigned(a: u64, b: u64) -> u64 {
    if b == 0 {
        a
    } else {
        a % b
    }
}

fn div_unsigned_32(a: u32, b: u32) -> u32 {
    if b == 0 {
        u32::MAX
    } else {
        a / b
    }
}

fn rem_unsigned_32(a: u32, b: u32) -> u32 {
    if b == 0 {
        a
    } else {
        a % b
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hart::HartConfig;

    #[test]
    fn div_by_zero_is_all_ones() {
        let mut hart = Hart::new(HartConfig::default());
        hart.gpr.write(1, 10);
        hart.gpr.write(2, 0);
        // div x5, x1, x2
        let raw = (0b0000001 << 25) | (2 << 20) | (1 << 15) | (0b100 << 12) | (5 << 7) | 0b0110011;
        execute(&mut hart, Tag::Div, raw).unwrap();
        assert_eq!(hart.gpr.read(5), u64::MAX);
    }

    #[test]
    fn remu_by_zero_returns_dividend() {
        let mut hart = Hart::new(HartConfig::default());
        hart.gpr.write(1, 7);
        hart.gpr.write(2, 0);
        let raw = (0b0000001 << 25) | (2 << 20) | (1 << 15) | (0b111 << 12) | (5 << 7) | 0b0110011;
        execute(&mut hart, Tag::Remu, raw).unwrap();
        assert_eq!(hart.gpr.read(5), 7);
    }

    #[test]
    fn mulw_sign_extends_32_bit_result() {
        let mut hart = Hart::new(HartConfig::default());
        hart.gpr.write(1, 0x8000_0000);
        hart.gpr.write(2, 2);
        let raw = (0b0000001 << 25) | (2 << 20) | (1 << 15) | (0b000 << 12) | (5 << 7) | 0b0111011;
        execute(&mut hart, Tag::Mulw, raw).unwrap();
        assert_eq!(hart.gpr.read(5), 0);
    }
}
