use crate::cpu::instructions::{Instruction, JumpCondition, ModifyTarget, ReadTarget, WriteTarget};
use crate::cpu::registers::{CpuRegister, CpuRegisterPair};
use crate::memory::AddressSpace;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid opcode {opcode:02X} at PC {pc:04X}")]
    InvalidOpcode { opcode: u8, pc: u16 },
}

/// Decode the instruction at `pc`, returning it along with the address of the instruction that
/// follows it.
pub fn parse_next_instruction(
    address_space: &AddressSpace,
    pc: u16,
) -> Result<(Instruction, u16), ParseError> {
    let opcode = address_space.read_address_u8(pc);

    let read_u8 = || address_space.read_address_u8(pc.wrapping_add(1));
    let read_u16 = || address_space.read_address_u16(pc.wrapping_add(1));
    let next_pc = |len: u16| pc.wrapping_add(len);

    let instruction = match opcode {
        0x00 => (Instruction::NoOp, next_pc(1)),
        0x01 | 0x11 | 0x21 | 0x31 => {
            let rr = register_pair_for_other_ops(opcode);
            (Instruction::LoadRegisterPairImmediate(rr, read_u16()), next_pc(3))
        }
        0x02 => (Instruction::Load(WriteTarget::IndirectBC, ReadTarget::Accumulator), next_pc(1)),
        0x03 | 0x13 | 0x23 | 0x33 => {
            let rr = register_pair_for_other_ops(opcode);
            (Instruction::IncRegisterPair(rr), next_pc(1))
        }
        0x04 | 0x0C | 0x14 | 0x1C | 0x24 | 0x2C | 0x34 | 0x3C => {
            let modify_target = CpuRegister::from_mid_opcode_bits(opcode)
                .map_or(ModifyTarget::IndirectHL, ModifyTarget::Register);
            (Instruction::Increment(modify_target), next_pc(1))
        }
        0x05 | 0x0D | 0x15 | 0x1D | 0x25 | 0x2D | 0x35 | 0x3D => {
            let modify_target = CpuRegister::from_mid_opcode_bits(opcode)
                .map_or(ModifyTarget::IndirectHL, ModifyTarget::Register);
            (Instruction::Decrement(modify_target), next_pc(1))
        }
        0x06 | 0x0E | 0x16 | 0x1E | 0x26 | 0x2E | 0x36 | 0x3E => {
            let write_target = CpuRegister::from_mid_opcode_bits(opcode)
                .map_or(WriteTarget::IndirectHL, WriteTarget::Register);
            (Instruction::Load(write_target, ReadTarget::Immediate(read_u8())), next_pc(2))
        }
        0x07 => (Instruction::RotateLeft(ModifyTarget::Accumulator), next_pc(1)),
        0x08 => (Instruction::LoadDirectStackPointer(read_u16()), next_pc(3)),
        0x09 | 0x19 | 0x29 | 0x39 => {
            let rr = register_pair_for_other_ops(opcode);
            (Instruction::AddHLRegister(rr), next_pc(1))
        }
        0x0A => (Instruction::Load(WriteTarget::Accumulator, ReadTarget::IndirectBC), next_pc(1)),
        0x0B | 0x1B | 0x2B | 0x3B => {
            let rr = register_pair_for_other_ops(opcode);
            (Instruction::DecRegisterPair(rr), next_pc(1))
        }
        0x0F => (Instruction::RotateRight(ModifyTarget::Accumulator), next_pc(1)),
        // STOP is followed by a padding byte
        0x10 => (Instruction::Stop, next_pc(2)),
        0x12 => (Instruction::Load(WriteTarget::IndirectDE, ReadTarget::Accumulator), next_pc(1)),
        0x17 => (Instruction::RotateLeftThruCarry(ModifyTarget::Accumulator), next_pc(1)),
        0x18 => (Instruction::RelativeJump(read_u8() as i8), next_pc(2)),
        0x1A => (Instruction::Load(WriteTarget::Accumulator, ReadTarget::IndirectDE), next_pc(1)),
        0x1F => (Instruction::RotateRightThruCarry(ModifyTarget::Accumulator), next_pc(1)),
        0x20 | 0x28 | 0x30 | 0x38 => {
            let cc = parse_jump_condition(opcode);
            (Instruction::RelativeJumpCond(cc, read_u8() as i8), next_pc(2))
        }
        0x22 => {
            (Instruction::Load(WriteTarget::IndirectHLInc, ReadTarget::Accumulator), next_pc(1))
        }
        0x27 => (Instruction::DecimalAdjustAccumulator, next_pc(1)),
        0x2A => {
            (Instruction::Load(WriteTarget::Accumulator, ReadTarget::IndirectHLInc), next_pc(1))
        }
        0x2F => (Instruction::ComplementAccumulator, next_pc(1)),
        0x32 => {
            (Instruction::Load(WriteTarget::IndirectHLDec, ReadTarget::Accumulator), next_pc(1))
        }
        0x37 => (Instruction::SetCarryFlag, next_pc(1)),
        0x3A => {
            (Instruction::Load(WriteTarget::Accumulator, ReadTarget::IndirectHLDec), next_pc(1))
        }
        0x3F => (Instruction::ComplementCarryFlag, next_pc(1)),
        0x76 => (Instruction::Halt, next_pc(1)),
        0x40..=0x7F => {
            let write_target = CpuRegister::from_mid_opcode_bits(opcode)
                .map_or(WriteTarget::IndirectHL, WriteTarget::Register);
            let read_target = CpuRegister::from_low_opcode_bits(opcode)
                .map_or(ReadTarget::IndirectHL, ReadTarget::Register);
            (Instruction::Load(write_target, read_target), next_pc(1))
        }
        0x80..=0xBF => {
            let read_target = CpuRegister::from_low_opcode_bits(opcode)
                .map_or(ReadTarget::IndirectHL, ReadTarget::Register);
            (alu_instruction(opcode, read_target), next_pc(1))
        }
        0xC0 | 0xC8 | 0xD0 | 0xD8 => {
            let cc = parse_jump_condition(opcode);
            (Instruction::ReturnCond(cc), next_pc(1))
        }
        0xC1 | 0xD1 | 0xE1 | 0xF1 => {
            let rr = register_pair_for_push_pop(opcode);
            (Instruction::PopStack(rr), next_pc(1))
        }
        0xC2 | 0xCA | 0xD2 | 0xDA => {
            let cc = parse_jump_condition(opcode);
            (Instruction::JumpCond(cc, read_u16()), next_pc(3))
        }
        0xC3 => (Instruction::Jump(read_u16()), next_pc(3)),
        0xC4 | 0xCC | 0xD4 | 0xDC => {
            let cc = parse_jump_condition(opcode);
            (Instruction::CallCond(cc, read_u16()), next_pc(3))
        }
        0xC5 | 0xD5 | 0xE5 | 0xF5 => {
            let rr = register_pair_for_push_pop(opcode);
            (Instruction::PushStack(rr), next_pc(1))
        }
        0xC6 | 0xCE | 0xD6 | 0xDE | 0xE6 | 0xEE | 0xF6 | 0xFE => {
            // Immediate forms share the ALU operation bits with 0x80-0xBF
            (alu_instruction(opcode, ReadTarget::Immediate(read_u8())), next_pc(2))
        }
        0xC7 | 0xCF | 0xD7 | 0xDF | 0xE7 | 0xEF | 0xF7 | 0xFF => {
            let rst_address = opcode & 0x38;
            (Instruction::RestartCall(rst_address), next_pc(1))
        }
        0xC9 => (Instruction::Return, next_pc(1)),
        0xCB => parse_cb_prefixed_opcode(address_space, pc),
        0xCD => (Instruction::Call(read_u16()), next_pc(3)),
        0xD9 => (Instruction::ReturnFromInterruptHandler, next_pc(1)),
        0xE0 => {
            let n = read_u8();
            (Instruction::Load(WriteTarget::FFDirect(n), ReadTarget::Accumulator), next_pc(2))
        }
        0xE2 => (Instruction::Load(WriteTarget::FFIndirectC, ReadTarget::Accumulator), next_pc(1)),
        0xE8 => (Instruction::AddSPImmediate(read_u8() as i8), next_pc(2)),
        0xE9 => (Instruction::JumpHL, next_pc(1)),
        0xEA => {
            let nn = read_u16();
            (Instruction::Load(WriteTarget::Direct(nn), ReadTarget::Accumulator), next_pc(3))
        }
        0xF0 => {
            let n = read_u8();
            (Instruction::Load(WriteTarget::Accumulator, ReadTarget::FFDirect(n)), next_pc(2))
        }
        0xF2 => (Instruction::Load(WriteTarget::Accumulator, ReadTarget::FFIndirectC), next_pc(1)),
        0xF3 => (Instruction::DisableInterrupts, next_pc(1)),
        0xF8 => (Instruction::LoadHLStackPointerOffset(read_u8() as i8), next_pc(2)),
        0xF9 => (Instruction::LoadStackPointerHL, next_pc(1)),
        0xFA => {
            let nn = read_u16();
            (Instruction::Load(WriteTarget::Accumulator, ReadTarget::Direct(nn)), next_pc(3))
        }
        0xFB => (Instruction::EnableInterrupts, next_pc(1)),
        0xD3 | 0xDB | 0xDD | 0xE3 | 0xE4 | 0xEB | 0xEC | 0xED | 0xF4 | 0xFC | 0xFD => {
            return Err(ParseError::InvalidOpcode { opcode, pc });
        }
    };

    Ok(instruction)
}

fn alu_instruction(opcode: u8, read_target: ReadTarget) -> Instruction {
    match opcode & 0x38 {
        0x00 => Instruction::Add(read_target),
        0x08 => Instruction::AddWithCarry(read_target),
        0x10 => Instruction::Subtract(read_target),
        0x18 => Instruction::SubtractWithCarry(read_target),
        0x20 => Instruction::And(read_target),
        0x28 => Instruction::Xor(read_target),
        0x30 => Instruction::Or(read_target),
        _ => Instruction::Compare(read_target),
    }
}

fn parse_cb_prefixed_opcode(address_space: &AddressSpace, pc: u16) -> (Instruction, u16) {
    let opcode = address_space.read_address_u8(pc.wrapping_add(1));
    let next_pc = pc.wrapping_add(2);

    let modify_target = CpuRegister::from_low_opcode_bits(opcode)
        .map_or(ModifyTarget::IndirectHL, ModifyTarget::Register);
    let bit = (opcode & 0x38) >> 3;

    let instruction = match opcode {
        0x00..=0x07 => Instruction::RotateLeft(modify_target),
        0x08..=0x0F => Instruction::RotateRight(modify_target),
        0x10..=0x17 => Instruction::RotateLeftThruCarry(modify_target),
        0x18..=0x1F => Instruction::RotateRightThruCarry(modify_target),
        0x20..=0x27 => Instruction::ShiftLeft(modify_target),
        0x28..=0x2F => Instruction::ArithmeticShiftRight(modify_target),
        0x30..=0x37 => Instruction::Swap(modify_target),
        0x38..=0x3F => Instruction::LogicalShiftRight(modify_target),
        0x40..=0x7F => {
            let read_target = CpuRegister::from_low_opcode_bits(opcode)
                .map_or(ReadTarget::IndirectHL, ReadTarget::Register);
            Instruction::TestBit(bit, read_target)
        }
        0x80..=0xBF => Instruction::ResetBit(bit, modify_target),
        0xC0..=0xFF => Instruction::SetBit(bit, modify_target),
    };

    (instruction, next_pc)
}

fn register_pair_for_other_ops(opcode: u8) -> CpuRegisterPair {
    match opcode & 0x30 {
        0x00 => CpuRegisterPair::BC,
        0x10 => CpuRegisterPair::DE,
        0x20 => CpuRegisterPair::HL,
        _ => CpuRegisterPair::SP,
    }
}

fn register_pair_for_push_pop(opcode: u8) -> CpuRegisterPair {
    match opcode & 0x30 {
        0x00 => CpuRegisterPair::BC,
        0x10 => CpuRegisterPair::DE,
        0x20 => CpuRegisterPair::HL,
        _ => CpuRegisterPair::AF,
    }
}

fn parse_jump_condition(opcode: u8) -> JumpCondition {
    match opcode & 0x18 {
        0x00 => JumpCondition::NZ,
        0x08 => JumpCondition::Z,
        0x10 => JumpCondition::NC,
        _ => JumpCondition::C,
    }
}
