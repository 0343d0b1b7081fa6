//! Property tests over the decode helpers and the flag/PC discipline.

use proptest::prelude::*;

use lc3_vm::instruction::sign_extend;
use lc3_vm::{BufferConsole, Memory, Register, Vm};

fn fresh_vm() -> Vm<BufferConsole> {
    Vm::new(Memory::new(), BufferConsole::new())
}

proptest! {
    #[test]
    fn sign_extend_round_trips_under_truncation(x in any::<u16>(), bits in 1u32..16) {
        let field = x & ((1 << bits) - 1);
        let widened = sign_extend(field, bits);
        prop_assert_eq!(widened & ((1 << bits) - 1), field);
    }

    #[test]
    fn sign_extend_fills_high_bits_uniformly(x in any::<u16>(), bits in 1u32..16) {
        let field = x & ((1 << bits) - 1);
        let widened = sign_extend(field, bits);
        let high = widened >> bits;
        if (field >> (bits - 1)) & 1 == 1 {
            prop_assert_eq!(high, 0xFFFF >> bits, "negative fields extend with ones");
        } else {
            prop_assert_eq!(high, 0, "positive fields extend with zeros");
        }
    }

    #[test]
    fn add_leaves_exactly_one_flag(lhs in any::<u16>(), imm in 0u16..32) {
        let mut vm = fresh_vm();
        vm.registers.write(Register::R1, lhs);
        // ADD R1, R1, imm5
        vm.memory.write(0x3000, 0x1260 | imm);
        vm.step().unwrap();
        prop_assert_eq!(vm.registers.cond().count_ones(), 1);
        prop_assert_eq!(
            vm.registers.read(Register::R1),
            lhs.wrapping_add(sign_extend(imm, 5))
        );
    }

    #[test]
    fn add_zero_is_identity_and_reads_sign(value in any::<u16>()) {
        let mut vm = fresh_vm();
        vm.registers.write(Register::R1, value);
        // ADD R1, R1, #0
        vm.memory.write(0x3000, 0x1260);
        vm.step().unwrap();
        prop_assert_eq!(vm.registers.read(Register::R1), value);
        let expected = if value == 0 {
            0b010
        } else if value >> 15 == 1 {
            0b100
        } else {
            0b001
        };
        prop_assert_eq!(vm.registers.cond(), expected);
    }

    #[test]
    fn double_not_restores_the_register(value in any::<u16>()) {
        let mut vm = fresh_vm();
        vm.registers.write(Register::R4, value);
        // NOT R4, R4 twice
        vm.memory.write(0x3000, 0x993F);
        vm.memory.write(0x3001, 0x993F);
        vm.step().unwrap();
        vm.step().unwrap();
        prop_assert_eq!(vm.registers.read(Register::R4), value);
    }

    #[test]
    fn unconditional_branch_lands_at_pc_plus_offset(offset in 0u16..0x200) {
        let mut vm = fresh_vm();
        // BRnzp with a 9-bit offset field
        vm.memory.write(0x3000, 0x0E00 | offset);
        vm.step().unwrap();
        let expected = 0x3001u16.wrapping_add(sign_extend(offset, 9));
        prop_assert_eq!(vm.registers.read(Register::Pc), expected);
    }

    #[test]
    fn stores_touch_only_their_target(addr in 0x0000u16..0xFE00, value in any::<u16>()) {
        let mut vm = fresh_vm();
        vm.registers.write(Register::R0, value);
        vm.registers.write(Register::R1, addr);
        // STR R0, R1, #0
        vm.memory.write(0x3000, 0x7040);
        vm.step().unwrap();
        prop_assert_eq!(vm.memory.peek(addr), value);
        // A neighbouring cell is untouched unless it holds the instruction.
        let neighbour = addr.wrapping_add(1);
        if neighbour != 0x3000 {
            prop_assert_eq!(vm.memory.peek(neighbour), 0);
        }
    }
}
