mod parse;

use crate::cpu::registers::{CpuRegister, CpuRegisterPair, CpuRegisters};
use crate::memory::AddressSpace;

pub use parse::{parse_next_instruction, ParseError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpCondition {
    NZ,
    Z,
    NC,
    C,
}

impl JumpCondition {
    fn check(self, cpu_registers: &CpuRegisters) -> bool {
        match self {
            Self::NZ => !cpu_registers.zero_flag(),
            Self::Z => cpu_registers.zero_flag(),
            Self::NC => !cpu_registers.carry_flag(),
            Self::C => cpu_registers.carry_flag(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadTarget {
    Register(CpuRegister),
    Immediate(u8),
    IndirectHL,
    Accumulator,
    IndirectBC,
    IndirectDE,
    Direct(u16),
    FFDirect(u8),
    FFIndirectC,
    IndirectHLInc,
    IndirectHLDec,
}

impl ReadTarget {
    fn read_value(self, address_space: &AddressSpace, cpu_registers: &mut CpuRegisters) -> u8 {
        match self {
            Self::Register(r) => cpu_registers.read_register(r),
            Self::Immediate(n) => n,
            Self::IndirectHL => address_space.read_address_u8(cpu_registers.hl()),
            Self::Accumulator => cpu_registers.accumulator,
            Self::IndirectBC => address_space.read_address_u8(cpu_registers.bc()),
            Self::IndirectDE => address_space.read_address_u8(cpu_registers.de()),
            Self::Direct(nn) => address_space.read_address_u8(nn),
            Self::FFDirect(n) => address_space.read_address_u8(u16::from_be_bytes([0xFF, n])),
            Self::FFIndirectC => {
                let c = cpu_registers.read_register(CpuRegister::C);
                address_space.read_address_u8(u16::from_be_bytes([0xFF, c]))
            }
            Self::IndirectHLInc => {
                let hl = cpu_registers.hl();
                cpu_registers.set_hl(hl.wrapping_add(1));
                address_space.read_address_u8(hl)
            }
            Self::IndirectHLDec => {
                let hl = cpu_registers.hl();
                cpu_registers.set_hl(hl.wrapping_sub(1));
                address_space.read_address_u8(hl)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteTarget {
    Register(CpuRegister),
    IndirectHL,
    Accumulator,
    IndirectBC,
    IndirectDE,
    Direct(u16),
    FFDirect(u8),
    FFIndirectC,
    IndirectHLInc,
    IndirectHLDec,
}

impl WriteTarget {
    fn write_value(
        self,
        value: u8,
        address_space: &mut AddressSpace,
        cpu_registers: &mut CpuRegisters,
    ) {
        match self {
            Self::Register(r) => cpu_registers.set_register(r, value),
            Self::IndirectHL => address_space.write_address_u8(cpu_registers.hl(), value),
            Self::Accumulator => cpu_registers.accumulator = value,
            Self::IndirectBC => address_space.write_address_u8(cpu_registers.bc(), value),
            Self::IndirectDE => address_space.write_address_u8(cpu_registers.de(), value),
            Self::Direct(nn) => address_space.write_address_u8(nn, value),
            Self::FFDirect(n) => {
                address_space.write_address_u8(u16::from_be_bytes([0xFF, n]), value);
            }
            Self::FFIndirectC => {
                let c = cpu_registers.read_register(CpuRegister::C);
                address_space.write_address_u8(u16::from_be_bytes([0xFF, c]), value);
            }
            Self::IndirectHLInc => {
                let hl = cpu_registers.hl();
                address_space.write_address_u8(hl, value);
                cpu_registers.set_hl(hl.wrapping_add(1));
            }
            Self::IndirectHLDec => {
                let hl = cpu_registers.hl();
                address_space.write_address_u8(hl, value);
                cpu_registers.set_hl(hl.wrapping_sub(1));
            }
        }
    }
}

/// Target of a read-modify-write instruction. `Accumulator` is the dedicated one-byte encoding
/// (RLCA and friends), which differs from `Register(A)` in how the zero flag is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifyTarget {
    Register(CpuRegister),
    IndirectHL,
    Accumulator,
}

impl ModifyTarget {
    fn read_value(self, address_space: &AddressSpace, cpu_registers: &CpuRegisters) -> u8 {
        match self {
            Self::Register(r) => cpu_registers.read_register(r),
            Self::IndirectHL => address_space.read_address_u8(cpu_registers.hl()),
            Self::Accumulator => cpu_registers.accumulator,
        }
    }

    fn write_value(
        self,
        value: u8,
        address_space: &mut AddressSpace,
        cpu_registers: &mut CpuRegisters,
    ) {
        match self {
            Self::Register(r) => cpu_registers.set_register(r, value),
            Self::IndirectHL => address_space.write_address_u8(cpu_registers.hl(), value),
            Self::Accumulator => cpu_registers.accumulator = value,
        }
    }

    fn zero_flag(self, value: u8) -> bool {
        match self {
            Self::Accumulator => false,
            Self::Register(_) | Self::IndirectHL => value == 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    // LD r, r' / LD r, n / LD r, (HL) / LD (HL), r / LD (HL), n / LD A, (rr) / LD (rr), A / LDH
    Load(WriteTarget, ReadTarget),
    // LD rr, nn
    LoadRegisterPairImmediate(CpuRegisterPair, u16),
    // LD (nn), SP
    LoadDirectStackPointer(u16),
    // LD SP, HL
    LoadStackPointerHL,
    // PUSH rr
    PushStack(CpuRegisterPair),
    // POP rr
    PopStack(CpuRegisterPair),
    // ADD n
    Add(ReadTarget),
    // ADC n
    AddWithCarry(ReadTarget),
    // SUB n
    Subtract(ReadTarget),
    // SBC n
    SubtractWithCarry(ReadTarget),
    // CP n
    Compare(ReadTarget),
    // INC r / INC (HL)
    Increment(ModifyTarget),
    // DEC r / DEC (HL)
    Decrement(ModifyTarget),
    // AND n
    And(ReadTarget),
    // OR n
    Or(ReadTarget),
    // XOR n
    Xor(ReadTarget),
    // ADD HL, rr
    AddHLRegister(CpuRegisterPair),
    // INC rr
    IncRegisterPair(CpuRegisterPair),
    // DEC rr
    DecRegisterPair(CpuRegisterPair),
    // ADD SP, e
    AddSPImmediate(i8),
    // LD HL, SP+e
    LoadHLStackPointerOffset(i8),
    // RLCA / RLC r / RLC (HL)
    RotateLeft(ModifyTarget),
    // RLA / RL r / RL (HL)
    RotateLeftThruCarry(ModifyTarget),
    // RRCA / RRC r / RRC (HL)
    RotateRight(ModifyTarget),
    // RRA / RR r / RR (HL)
    RotateRightThruCarry(ModifyTarget),
    // SLA r / SLA (HL)
    ShiftLeft(ModifyTarget),
    // SWAP r / SWAP (HL)
    Swap(ModifyTarget),
    // SRA r / SRA (HL)
    ArithmeticShiftRight(ModifyTarget),
    // SRL r / SRL (HL)
    LogicalShiftRight(ModifyTarget),
    // BIT n, r / BIT n, (HL)
    TestBit(u8, ReadTarget),
    // SET n, r / SET n, (HL)
    SetBit(u8, ModifyTarget),
    // RES n, r / RES n, (HL)
    ResetBit(u8, ModifyTarget),
    // CCF
    ComplementCarryFlag,
    // SCF
    SetCarryFlag,
    // DAA
    DecimalAdjustAccumulator,
    // CPL
    ComplementAccumulator,
    // JP nn
    Jump(u16),
    // JP HL
    JumpHL,
    // JP cc, nn
    JumpCond(JumpCondition, u16),
    // JR e
    RelativeJump(i8),
    // JR cc, e
    RelativeJumpCond(JumpCondition, i8),
    // CALL nn
    Call(u16),
    // CALL cc, nn
    CallCond(JumpCondition, u16),
    // RET
    Return,
    // RET cc
    ReturnCond(JumpCondition),
    // RETI
    ReturnFromInterruptHandler,
    // RST n
    RestartCall(u8),
    // HALT
    Halt,
    // STOP
    Stop,
    // DI
    DisableInterrupts,
    // EI
    EnableInterrupts,
    // NOP
    NoOp,
}

impl Instruction {
    /// Whether this instruction will branch when executed against the given registers. Always
    /// false for instructions that are not conditional branches.
    pub fn is_branch_taken(self, cpu_registers: &CpuRegisters) -> bool {
        match self {
            Self::JumpCond(cc, _)
            | Self::RelativeJumpCond(cc, _)
            | Self::CallCond(cc, _)
            | Self::ReturnCond(cc) => cc.check(cpu_registers),
            _ => false,
        }
    }

    /// Execute this instruction. PC is expected to already point past the instruction's bytes.
    pub fn execute(self, address_space: &mut AddressSpace, cpu_registers: &mut CpuRegisters) {
        match self {
            Self::Load(write_target, read_target) => {
                let value = read_target.read_value(address_space, cpu_registers);
                write_target.write_value(value, address_space, cpu_registers);
            }
            Self::LoadRegisterPairImmediate(rr, nn) => {
                cpu_registers.set_register_pair(rr, nn);
            }
            Self::LoadDirectStackPointer(nn) => {
                address_space.write_address_u16(nn, cpu_registers.sp);
            }
            Self::LoadStackPointerHL => {
                cpu_registers.sp = cpu_registers.hl();
            }
            Self::PushStack(rr) => {
                let value = cpu_registers.read_register_pair(rr);
                push_stack(address_space, cpu_registers, value);
            }
            Self::PopStack(rr) => {
                let value = pop_stack(address_space, cpu_registers);
                cpu_registers.set_register_pair(rr, value);
            }
            Self::Add(read_target) => {
                let value = read_target.read_value(address_space, cpu_registers);
                let (sum, carry, h_flag) = add(cpu_registers.accumulator, value, false);
                cpu_registers.accumulator = sum;
                cpu_registers.set_flags(sum == 0, false, h_flag, carry);
            }
            Self::AddWithCarry(read_target) => {
                let value = read_target.read_value(address_space, cpu_registers);
                let (sum, carry, h_flag) =
                    add(cpu_registers.accumulator, value, cpu_registers.carry_flag());
                cpu_registers.accumulator = sum;
                cpu_registers.set_flags(sum == 0, false, h_flag, carry);
            }
            Self::Subtract(read_target) => {
                let value = read_target.read_value(address_space, cpu_registers);
                let (difference, carry, h_flag) = sub(cpu_registers.accumulator, value, false);
                cpu_registers.accumulator = difference;
                cpu_registers.set_flags(difference == 0, true, h_flag, carry);
            }
            Self::SubtractWithCarry(read_target) => {
                let value = read_target.read_value(address_space, cpu_registers);
                let (difference, carry, h_flag) =
                    sub(cpu_registers.accumulator, value, cpu_registers.carry_flag());
                cpu_registers.accumulator = difference;
                cpu_registers.set_flags(difference == 0, true, h_flag, carry);
            }
            Self::Compare(read_target) => {
                let value = read_target.read_value(address_space, cpu_registers);
                let (difference, carry, h_flag) = sub(cpu_registers.accumulator, value, false);
                cpu_registers.set_flags(difference == 0, true, h_flag, carry);
            }
            Self::Increment(modify_target) => {
                let value = modify_target.read_value(address_space, cpu_registers);
                let (sum, _, h_flag) = add(value, 1, false);
                modify_target.write_value(sum, address_space, cpu_registers);
                cpu_registers.set_some_flags(Some(sum == 0), Some(false), Some(h_flag), None);
            }
            Self::Decrement(modify_target) => {
                let value = modify_target.read_value(address_space, cpu_registers);
                let (difference, _, h_flag) = sub(value, 1, false);
                modify_target.write_value(difference, address_space, cpu_registers);
                cpu_registers.set_some_flags(
                    Some(difference == 0),
                    Some(true),
                    Some(h_flag),
                    None,
                );
            }
            Self::And(read_target) => {
                let value =
                    cpu_registers.accumulator & read_target.read_value(address_space, cpu_registers);
                cpu_registers.accumulator = value;
                cpu_registers.set_flags(value == 0, false, true, false);
            }
            Self::Or(read_target) => {
                let value =
                    cpu_registers.accumulator | read_target.read_value(address_space, cpu_registers);
                cpu_registers.accumulator = value;
                cpu_registers.set_flags(value == 0, false, false, false);
            }
            Self::Xor(read_target) => {
                let value =
                    cpu_registers.accumulator ^ read_target.read_value(address_space, cpu_registers);
                cpu_registers.accumulator = value;
                cpu_registers.set_flags(value == 0, false, false, false);
            }
            Self::AddHLRegister(rr) => {
                let (sum, carry, h_flag) =
                    add_u16(cpu_registers.hl(), cpu_registers.read_register_pair(rr));
                cpu_registers.set_hl(sum);
                cpu_registers.set_some_flags(None, Some(false), Some(h_flag), Some(carry));
            }
            Self::IncRegisterPair(rr) => {
                let value = cpu_registers.read_register_pair(rr).wrapping_add(1);
                cpu_registers.set_register_pair(rr, value);
            }
            Self::DecRegisterPair(rr) => {
                let value = cpu_registers.read_register_pair(rr).wrapping_sub(1);
                cpu_registers.set_register_pair(rr, value);
            }
            Self::AddSPImmediate(e) => {
                let (sp, carry, h_flag) = add_sp_offset(cpu_registers.sp, e);
                cpu_registers.sp = sp;
                cpu_registers.set_flags(false, false, h_flag, carry);
            }
            Self::LoadHLStackPointerOffset(e) => {
                let (hl, carry, h_flag) = add_sp_offset(cpu_registers.sp, e);
                cpu_registers.set_hl(hl);
                cpu_registers.set_flags(false, false, h_flag, carry);
            }
            Self::RotateLeft(modify_target) => {
                let value = modify_target.read_value(address_space, cpu_registers);
                let (value, carry_flag) = rotate_left(value);
                modify_target.write_value(value, address_space, cpu_registers);
                cpu_registers.set_flags(modify_target.zero_flag(value), false, false, carry_flag);
            }
            Self::RotateLeftThruCarry(modify_target) => {
                let value = modify_target.read_value(address_space, cpu_registers);
                let (value, carry_flag) =
                    rotate_left_thru_carry(value, cpu_registers.carry_flag());
                modify_target.write_value(value, address_space, cpu_registers);
                cpu_registers.set_flags(modify_target.zero_flag(value), false, false, carry_flag);
            }
            Self::RotateRight(modify_target) => {
                let value = modify_target.read_value(address_space, cpu_registers);
                let (value, carry_flag) = rotate_right(value);
                modify_target.write_value(value, address_space, cpu_registers);
                cpu_registers.set_flags(modify_target.zero_flag(value), false, false, carry_flag);
            }
            Self::RotateRightThruCarry(modify_target) => {
                let value = modify_target.read_value(address_space, cpu_registers);
                let (value, carry_flag) =
                    rotate_right_thru_carry(value, cpu_registers.carry_flag());
                modify_target.write_value(value, address_space, cpu_registers);
                cpu_registers.set_flags(modify_target.zero_flag(value), false, false, carry_flag);
            }
            Self::ShiftLeft(modify_target) => {
                let value = modify_target.read_value(address_space, cpu_registers);
                let carry_flag = value & 0x80 != 0;
                let value = value << 1;
                modify_target.write_value(value, address_space, cpu_registers);
                cpu_registers.set_flags(value == 0, false, false, carry_flag);
            }
            Self::Swap(modify_target) => {
                let value = modify_target.read_value(address_space, cpu_registers);
                let value = value.rotate_left(4);
                modify_target.write_value(value, address_space, cpu_registers);
                cpu_registers.set_flags(value == 0, false, false, false);
            }
            Self::ArithmeticShiftRight(modify_target) => {
                let value = modify_target.read_value(address_space, cpu_registers);
                let carry_flag = value & 0x01 != 0;
                let value = (value >> 1) | (value & 0x80);
                modify_target.write_value(value, address_space, cpu_registers);
                cpu_registers.set_flags(value == 0, false, false, carry_flag);
            }
            Self::LogicalShiftRight(modify_target) => {
                let value = modify_target.read_value(address_space, cpu_registers);
                let carry_flag = value & 0x01 != 0;
                let value = value >> 1;
                modify_target.write_value(value, address_space, cpu_registers);
                cpu_registers.set_flags(value == 0, false, false, carry_flag);
            }
            Self::TestBit(n, read_target) => {
                let value = read_target.read_value(address_space, cpu_registers);
                let zero = value & (1 << n) == 0;
                cpu_registers.set_some_flags(Some(zero), Some(false), Some(true), None);
            }
            Self::SetBit(n, modify_target) => {
                let value = modify_target.read_value(address_space, cpu_registers);
                modify_target.write_value(value | (1 << n), address_space, cpu_registers);
            }
            Self::ResetBit(n, modify_target) => {
                let value = modify_target.read_value(address_space, cpu_registers);
                modify_target.write_value(value & !(1 << n), address_space, cpu_registers);
            }
            Self::ComplementCarryFlag => {
                cpu_registers.set_some_flags(
                    None,
                    Some(false),
                    Some(false),
                    Some(!cpu_registers.carry_flag()),
                );
            }
            Self::SetCarryFlag => {
                cpu_registers.set_some_flags(None, Some(false), Some(false), Some(true));
            }
            Self::DecimalAdjustAccumulator => {
                decimal_adjust_accumulator(cpu_registers);
            }
            Self::ComplementAccumulator => {
                cpu_registers.accumulator = !cpu_registers.accumulator;
                cpu_registers.set_some_flags(None, Some(true), Some(true), None);
            }
            Self::Jump(nn) => {
                cpu_registers.pc = nn;
            }
            Self::JumpHL => {
                cpu_registers.pc = cpu_registers.hl();
            }
            Self::JumpCond(cc, nn) => {
                if cc.check(cpu_registers) {
                    cpu_registers.pc = nn;
                }
            }
            Self::RelativeJump(e) => {
                cpu_registers.pc = cpu_registers.pc.wrapping_add_signed(e.into());
            }
            Self::RelativeJumpCond(cc, e) => {
                if cc.check(cpu_registers) {
                    cpu_registers.pc = cpu_registers.pc.wrapping_add_signed(e.into());
                }
            }
            Self::Call(nn) => {
                let pc = cpu_registers.pc;
                push_stack(address_space, cpu_registers, pc);
                cpu_registers.pc = nn;
            }
            Self::CallCond(cc, nn) => {
                if cc.check(cpu_registers) {
                    let pc = cpu_registers.pc;
                    push_stack(address_space, cpu_registers, pc);
                    cpu_registers.pc = nn;
                }
            }
            Self::Return => {
                cpu_registers.pc = pop_stack(address_space, cpu_registers);
            }
            Self::ReturnCond(cc) => {
                if cc.check(cpu_registers) {
                    cpu_registers.pc = pop_stack(address_space, cpu_registers);
                }
            }
            Self::ReturnFromInterruptHandler => {
                cpu_registers.pc = pop_stack(address_space, cpu_registers);
                cpu_registers.ime = true;
                cpu_registers.interrupt_delay = false;
            }
            Self::RestartCall(rst_address) => {
                let pc = cpu_registers.pc;
                push_stack(address_space, cpu_registers, pc);
                cpu_registers.pc = rst_address.into();
            }
            Self::Halt => {
                cpu_registers.halted = true;
            }
            Self::Stop | Self::NoOp => {}
            Self::DisableInterrupts => {
                cpu_registers.ime = false;
                cpu_registers.interrupt_delay = false;
            }
            Self::EnableInterrupts => {
                if !cpu_registers.ime {
                    cpu_registers.ime = true;
                    cpu_registers.interrupt_delay = true;
                }
            }
        }
    }
}

/// Push a 16-bit value onto the stack: high byte first, then low byte, each written after
/// decrementing SP.
pub fn push_stack(address_space: &mut AddressSpace, cpu_registers: &mut CpuRegisters, value: u16) {
    let [lsb, msb] = value.to_le_bytes();
    cpu_registers.sp = cpu_registers.sp.wrapping_sub(1);
    address_space.write_address_u8(cpu_registers.sp, msb);
    cpu_registers.sp = cpu_registers.sp.wrapping_sub(1);
    address_space.write_address_u8(cpu_registers.sp, lsb);
}

fn pop_stack(address_space: &AddressSpace, cpu_registers: &mut CpuRegisters) -> u16 {
    let lsb = address_space.read_address_u8(cpu_registers.sp);
    cpu_registers.sp = cpu_registers.sp.wrapping_add(1);
    let msb = address_space.read_address_u8(cpu_registers.sp);
    cpu_registers.sp = cpu_registers.sp.wrapping_add(1);
    u16::from_le_bytes([lsb, msb])
}

fn decimal_adjust_accumulator(cpu_registers: &mut CpuRegisters) {
    let flags = cpu_registers.flags;
    let mut value = cpu_registers.accumulator;
    let mut carry = flags.carry;

    if flags.subtract {
        if flags.carry {
            value = value.wrapping_sub(0x60);
        }
        if flags.half_carry {
            value = value.wrapping_sub(0x06);
        }
    } else {
        if flags.carry || value > 0x99 {
            value = value.wrapping_add(0x60);
            carry = true;
        }
        if flags.half_carry || value & 0x0F > 0x09 {
            value = value.wrapping_add(0x06);
        }
    }

    cpu_registers.accumulator = value;
    cpu_registers.set_some_flags(Some(value == 0), None, Some(false), Some(carry));
}

/// Returns (sum, carry, half carry).
fn add(l_value: u8, r_value: u8, carry: bool) -> (u8, bool, bool) {
    let carry = u8::from(carry);
    let sum = u16::from(l_value) + u16::from(r_value) + u16::from(carry);
    let h_flag = (l_value & 0x0F) + (r_value & 0x0F) + carry >= 0x10;

    (sum as u8, sum > 0xFF, h_flag)
}

fn add_u16(l_value: u16, r_value: u16) -> (u16, bool, bool) {
    let (sum, carry_flag) = l_value.overflowing_add(r_value);
    let h_flag = (l_value & 0x0FFF) + (r_value & 0x0FFF) >= 0x1000;

    (sum, carry_flag, h_flag)
}

// Carry and half carry come from unsigned addition on the low byte
fn add_sp_offset(sp: u16, offset: i8) -> (u16, bool, bool) {
    let offset_byte = offset as u8;
    let h_flag = (sp & 0x000F) + u16::from(offset_byte & 0x0F) >= 0x0010;
    let carry_flag = (sp & 0x00FF) + u16::from(offset_byte) >= 0x0100;

    (sp.wrapping_add_signed(offset.into()), carry_flag, h_flag)
}

/// Returns (difference, borrow, half borrow).
fn sub(l_value: u8, r_value: u8, carry: bool) -> (u8, bool, bool) {
    let carry = u8::from(carry);
    let difference = l_value.wrapping_sub(r_value).wrapping_sub(carry);
    let carry_flag = u16::from(l_value) < u16::from(r_value) + u16::from(carry);
    let h_flag = l_value & 0x0F < (r_value & 0x0F) + carry;

    (difference, carry_flag, h_flag)
}

fn rotate_left(value: u8) -> (u8, bool) {
    let leftmost_set = value & 0x80 != 0;
    let new_value = (value << 1) | u8::from(leftmost_set);

    (new_value, leftmost_set)
}

fn rotate_left_thru_carry(value: u8, carry: bool) -> (u8, bool) {
    let leftmost_set = value & 0x80 != 0;
    let new_value = (value << 1) | u8::from(carry);

    (new_value, leftmost_set)
}

fn rotate_right(value: u8) -> (u8, bool) {
    let rightmost_set = value & 0x01 != 0;
    let new_value = (value >> 1) | (u8::from(rightmost_set) << 7);

    (new_value, rightmost_set)
}

fn rotate_right_thru_carry(value: u8, carry: bool) -> (u8, bool) {
    let rightmost_set = value & 0x01 != 0;
    let new_value = (value >> 1) | (u8::from(carry) << 7);

    (new_value, rightmost_set)
}
