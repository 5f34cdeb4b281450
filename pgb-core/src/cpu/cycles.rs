//! Per-opcode clock cycle costs. Conditional branches cost the value in [`OPCODE_CYCLES`] when
//! not taken and the value in [`OPCODE_CYCLES_BRANCH_TAKEN`] when taken.

#[rustfmt::skip]
pub const OPCODE_CYCLES: [u32; 256] = [
//  x0  x1  x2  x3  x4  x5  x6  x7  x8  x9  xA  xB  xC  xD  xE  xF
     4, 12,  8,  8,  4,  4,  8,  4, 20,  8,  8,  8,  4,  4,  8,  4, // 0x
     4, 12,  8,  8,  4,  4,  8,  4, 12,  8,  8,  8,  4,  4,  8,  4, // 1x
     8, 12,  8,  8,  4,  4,  8,  4,  8,  8,  8,  8,  4,  4,  8,  4, // 2x
     8, 12,  8,  8, 12, 12, 12,  4,  8,  8,  8,  8,  4,  4,  8,  4, // 3x
     4,  4,  4,  4,  4,  4,  8,  4,  4,  4,  4,  4,  4,  4,  8,  4, // 4x
     4,  4,  4,  4,  4,  4,  8,  4,  4,  4,  4,  4,  4,  4,  8,  4, // 5x
     4,  4,  4,  4,  4,  4,  8,  4,  4,  4,  4,  4,  4,  4,  8,  4, // 6x
     8,  8,  8,  8,  8,  8,  4,  8,  4,  4,  4,  4,  4,  4,  8,  4, // 7x
     4,  4,  4,  4,  4,  4,  8,  4,  4,  4,  4,  4,  4,  4,  8,  4, // 8x
     4,  4,  4,  4,  4,  4,  8,  4,  4,  4,  4,  4,  4,  4,  8,  4, // 9x
     4,  4,  4,  4,  4,  4,  8,  4,  4,  4,  4,  4,  4,  4,  8,  4, // Ax
     4,  4,  4,  4,  4,  4,  8,  4,  4,  4,  4,  4,  4,  4,  8,  4, // Bx
     8, 12, 12, 16, 12, 16,  8, 16,  8, 16, 12,  0, 12, 24,  8, 16, // Cx
     8, 12, 12,  0, 12, 16,  8, 16,  8, 16, 12,  0, 12,  0,  8, 16, // Dx
    12, 12,  8,  0,  0, 16,  8, 16, 16,  4, 16,  0,  0,  0,  8, 16, // Ex
    12, 12,  8,  4,  0, 16,  8, 16, 12,  8, 16,  4,  0,  0,  8, 16, // Fx
];

pub const OPCODE_CYCLES_BRANCH_TAKEN: [u32; 256] = branch_taken_table();

/// Costs for the CB-prefixed opcodes, including the prefix byte itself.
pub const CB_OPCODE_CYCLES: [u32; 256] = cb_table();

const fn branch_taken_table() -> [u32; 256] {
    let mut table = OPCODE_CYCLES;

    // JR cc, e
    table[0x20] = 12;
    table[0x28] = 12;
    table[0x30] = 12;
    table[0x38] = 12;

    // RET cc
    table[0xC0] = 20;
    table[0xC8] = 20;
    table[0xD0] = 20;
    table[0xD8] = 20;

    // JP cc, nn
    table[0xC2] = 16;
    table[0xCA] = 16;
    table[0xD2] = 16;
    table[0xDA] = 16;

    // CALL cc, nn
    table[0xC4] = 24;
    table[0xCC] = 24;
    table[0xD4] = 24;
    table[0xDC] = 24;

    table
}

const fn cb_table() -> [u32; 256] {
    let mut table = [8; 256];

    let mut opcode = 0;
    while opcode < 256 {
        // Low bits 110 address (HL); BIT only reads it back
        if opcode & 0x07 == 0x06 {
            table[opcode] = if opcode >= 0x40 && opcode < 0x80 {
                12
            } else {
                16
            };
        }
        opcode += 1;
    }

    table
}

/// Cycles consumed by one instruction. `cb_opcode` is only consulted when `opcode` is the CB
/// prefix.
pub fn instruction_cycles(opcode: u8, cb_opcode: u8, branch_taken: bool) -> u32 {
    if opcode == 0xCB {
        CB_OPCODE_CYCLES[usize::from(cb_opcode)]
    } else if branch_taken {
        OPCODE_CYCLES_BRANCH_TAKEN[usize::from(opcode)]
    } else {
        OPCODE_CYCLES[usize::from(opcode)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn branch_tables_only_differ_on_conditional_branches() {
        let conditional = [
            0x20, 0x28, 0x30, 0x38, 0xC0, 0xC8, 0xD0, 0xD8, 0xC2, 0xCA, 0xD2, 0xDA, 0xC4, 0xCC,
            0xD4, 0xDC,
        ];

        for opcode in 0..256 {
            if conditional.contains(&opcode) {
                assert!(OPCODE_CYCLES_BRANCH_TAKEN[opcode] > OPCODE_CYCLES[opcode]);
            } else {
                assert_eq!(OPCODE_CYCLES[opcode], OPCODE_CYCLES_BRANCH_TAKEN[opcode]);
            }
        }
    }

    #[test]
    fn cb_costs() {
        assert_eq!(8, instruction_cycles(0xCB, 0x00, false));
        assert_eq!(16, instruction_cycles(0xCB, 0x06, false));
        assert_eq!(12, instruction_cycles(0xCB, 0x46, false));
        assert_eq!(12, instruction_cycles(0xCB, 0x7E, false));
        assert_eq!(16, instruction_cycles(0xCB, 0x86, false));
        assert_eq!(16, instruction_cycles(0xCB, 0xFE, false));
        assert_eq!(8, instruction_cycles(0xCB, 0xFF, false));
    }
}
