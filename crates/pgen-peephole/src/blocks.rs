//! Basic-block numbering and the jump-classification predicates the
//! rewrite pass shares with it.
//!
//! Grounded on `Python/peephole.c`'s `markblocks` and its `UNCONDITIONAL_JUMP`/
//! `CONDITIONAL_JUMP`/`ABSOLUTE_JUMP`/`JUMPS_ON_TRUE`/`GETJUMPTGT` macros.
//! Jump targets are unit offsets end-to-end here (see `wordcode`'s module
//! doc), so `GETJUMPTGT`'s `/ sizeof(_Py_CODEUNIT)` byte-to-unit conversion
//! has no counterpart — `jump_target` just adds `i + 1` for relative jumps.

use crate::wordcode::{self, op, Unit};

pub fn is_absolute_jump(opcode: u8) -> bool {
    matches!(
        opcode,
        op::JUMP_ABSOLUTE
            | op::POP_JUMP_IF_FALSE
            | op::POP_JUMP_IF_TRUE
            | op::JUMP_IF_FALSE_OR_POP
            | op::JUMP_IF_TRUE_OR_POP
    )
}

pub fn is_unconditional_jump(opcode: u8) -> bool {
    matches!(opcode, op::JUMP_ABSOLUTE | op::JUMP_FORWARD)
}

pub fn is_conditional_jump(opcode: u8) -> bool {
    matches!(
        opcode,
        op::POP_JUMP_IF_FALSE | op::POP_JUMP_IF_TRUE | op::JUMP_IF_FALSE_OR_POP | op::JUMP_IF_TRUE_OR_POP
    )
}

pub fn jumps_on_true(opcode: u8) -> bool {
    matches!(opcode, op::POP_JUMP_IF_TRUE | op::JUMP_IF_TRUE_OR_POP)
}

fn is_block_boundary_opcode(opcode: u8) -> bool {
    matches!(
        opcode,
        op::JUMP_FORWARD
            | op::JUMP_IF_FALSE_OR_POP
            | op::JUMP_IF_TRUE_OR_POP
            | op::POP_JUMP_IF_FALSE
            | op::POP_JUMP_IF_TRUE
            | op::JUMP_ABSOLUTE
            | op::SETUP_FINALLY
    )
}

/// `GETJUMPTGT`: the effective-opcode-index a jump instruction at `i` (also
/// an effective-opcode index) targets.
pub fn jump_target(codestr: &[Unit], i: usize) -> usize {
    let (opcode, _) = wordcode::unpack(codestr[i]);
    let arg = wordcode::get_arg(codestr, i) as usize;
    if is_absolute_jump(opcode) {
        arg
    } else {
        arg + i + 1
    }
}

/// `markblocks`: a per-unit block number, incrementing at every jump target.
/// Two positions are in the same basic block iff their block numbers match.
///
/// A target past the end of `codestr` is ignored rather than indexed: the
/// original trusts compiler-generated input to always resolve in range, but
/// nothing downstream here depends on that, so out-of-range targets just
/// don't introduce a block boundary.
pub fn mark_blocks(codestr: &[Unit]) -> Vec<u32> {
    let mut is_label = vec![false; codestr.len()];
    for i in 0..codestr.len() {
        let (opcode, _) = wordcode::unpack(codestr[i]);
        if is_block_boundary_opcode(opcode) {
            let target = jump_target(codestr, i);
            if let Some(slot) = is_label.get_mut(target) {
                *slot = true;
            }
        }
    }

    let mut blocks = vec![0u32; codestr.len()];
    let mut count = 0u32;
    for (i, &labeled) in is_label.iter().enumerate() {
        if labeled {
            count += 1;
        }
        blocks[i] = count;
    }
    blocks
}

/// `ISBASICBLOCK`.
pub fn same_block(blocks: &[u32], a: usize, b: usize) -> bool {
    blocks[a] == blocks[b]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wordcode::pack;

    #[test]
    fn a_straight_line_run_is_one_block() {
        let code = vec![pack(op::LOAD_CONST, 0), pack(op::LOAD_CONST, 1), pack(op::RETURN_VALUE, 0)];
        let blocks = mark_blocks(&code);
        assert!(same_block(&blocks, 0, 2));
    }

    #[test]
    fn a_jump_target_starts_a_new_block() {
        // 0: JUMP_FORWARD 1 (targets unit 2)
        // 1: NOP
        // 2: RETURN_VALUE
        let code = vec![pack(op::JUMP_FORWARD, 1), pack(op::NOP, 0), pack(op::RETURN_VALUE, 0)];
        let blocks = mark_blocks(&code);
        assert!(!same_block(&blocks, 0, 2));
    }

    #[test]
    fn jump_target_resolves_relative_and_absolute() {
        let code = vec![pack(op::JUMP_FORWARD, 2), pack(op::NOP, 0), pack(op::NOP, 0), pack(op::JUMP_ABSOLUTE, 0)];
        assert_eq!(jump_target(&code, 0), 3); // 2 + 0 + 1
        assert_eq!(jump_target(&code, 3), 0);
    }
}
