use super::{hash_map, run_test, set_in_state, ExpectedState, ALL_REGISTERS};

#[test]
fn and_or_xor() {
    run_test(
        // LD A, 0xF0; LD B, 0x3C; AND B
        "3EF0063CA0",
        &ExpectedState {
            a: Some(0x30),
            f: Some(0x20),
            ..ExpectedState::empty()
        },
    );

    run_test(
        // LD A, 0x0F; AND 0xF0
        "3E0FE6F0",
        &ExpectedState {
            a: Some(0x00),
            f: Some(0xA0),
            ..ExpectedState::empty()
        },
    );

    run_test(
        // LD HL, 0xC000; LD (HL), 0x81; LD A, 0x18; OR (HL)
        "2100C036813E18B6",
        &ExpectedState {
            a: Some(0x99),
            f: Some(0x00),
            ..ExpectedState::empty()
        },
    );

    run_test(
        // SCF; LD A, 0x5A; XOR A
        "373E5AAF",
        &ExpectedState {
            a: Some(0x00),
            f: Some(0x80),
            ..ExpectedState::empty()
        },
    );
}

#[test]
fn complement_and_carry_flag() {
    run_test(
        // LD A, 0x35; CPL
        "3E352F",
        &ExpectedState {
            a: Some(0xCA),
            f: Some(0x60),
            ..ExpectedState::empty()
        },
    );

    run_test(
        // SCF
        "37",
        &ExpectedState {
            f: Some(0x10),
            ..ExpectedState::empty()
        },
    );

    run_test(
        // SCF; CCF
        "373F",
        &ExpectedState {
            f: Some(0x00),
            ..ExpectedState::empty()
        },
    );

    run_test(
        // XOR A; CCF
        "AF3F",
        &ExpectedState {
            // Zero is preserved, half carry cleared, carry toggled on
            f: Some(0x90),
            ..ExpectedState::empty()
        },
    );
}

#[test]
fn test_bit_register() {
    for r in ALL_REGISTERS {
        let ld = 0x06 | (r.to_opcode_bits() << 3);

        for bit in 0..8 {
            let opcode = 0x40 | (bit << 3) | r.to_opcode_bits();
            let n: u8 = rand::random();

            let mut expected_state = ExpectedState::empty();
            set_in_state(&mut expected_state, r, n);
            let expected_z_flag = u8::from(n & (1 << bit) == 0);
            expected_state.f = Some(0x20 | (expected_z_flag << 7));
            run_test(
                // LD <r>, <n>; BIT <b>, <r>
                &format!("{ld:02x}{n:02x}CB{opcode:02x}"),
                &expected_state,
            );
        }
    }

    run_test(
        // SCF; LD A, 0x08; BIT 3, A
        "373E08CB5F",
        &ExpectedState {
            a: Some(0x08),
            // Carry is left alone
            f: Some(0x30),
            ..ExpectedState::empty()
        },
    );
}

#[test]
fn test_bit_indirect_hl() {
    for bit in 0..8 {
        let opcode = 0x46 | (bit << 3);
        let n: u8 = rand::random();

        let expected_z_flag = u8::from(n & (1 << bit) == 0);
        run_test(
            // LD HL, 0xC000; LD (HL), <n>; BIT <b>, (HL)
            &format!("2100C036{n:02x}CB{opcode:02x}"),
            &ExpectedState {
                f: Some(0x20 | (expected_z_flag << 7)),
                memory: hash_map! { 0xC000: n },
                ..ExpectedState::empty()
            },
        );
    }
}

#[test]
fn set_and_reset_register() {
    for r in ALL_REGISTERS {
        let ld = 0x06 | (r.to_opcode_bits() << 3);

        for bit in 0..8 {
            let n: u8 = rand::random();

            let set_opcode = 0xC0 | (bit << 3) | r.to_opcode_bits();
            let mut expected_state = ExpectedState::empty();
            set_in_state(&mut expected_state, r, n | (1 << bit));
            expected_state.f = Some(0x00);
            run_test(
                // LD <r>, <n>; SET <b>, <r>
                &format!("{ld:02x}{n:02x}CB{set_opcode:02x}"),
                &expected_state,
            );

            let res_opcode = 0x80 | (bit << 3) | r.to_opcode_bits();
            let mut expected_state = ExpectedState::empty();
            set_in_state(&mut expected_state, r, n & !(1 << bit));
            expected_state.f = Some(0x00);
            run_test(
                // LD <r>, <n>; RES <b>, <r>
                &format!("{ld:02x}{n:02x}CB{res_opcode:02x}"),
                &expected_state,
            );
        }
    }
}

#[test]
fn set_and_reset_indirect_hl() {
    run_test(
        // LD HL, 0xC000; LD (HL), 0x00; SET 7, (HL); SET 0, (HL)
        "2100C03600CBFECBC6",
        &ExpectedState {
            memory: hash_map! { 0xC000: 0x81 },
            ..ExpectedState::empty()
        },
    );

    run_test(
        // LD HL, 0xC000; LD (HL), 0xFF; RES 4, (HL)
        "2100C036FFCBA6",
        &ExpectedState {
            memory: hash_map! { 0xC000: 0xEF },
            ..ExpectedState::empty()
        },
    );
}
