//! The rewrite pass and the compaction pass, together `PyCode_Optimize`.
//!
//! Grounded directly on `Python/peephole.c`. The two passes are kept as
//! separate functions (`rewrite`/`compact`) rather than the original's one
//! long function with inline gotos, as "two composable rewrite
//! rules tried in order" design note — though within `rewrite` the
//! conditional-jump-fusion-then-jump-threading fallthrough is still one
//! `match` arm calling into the next, since that fallthrough *is* the rule
//! (a `JUMP_IF_*_OR_POP` that isn't fused is itself a jump worth threading).

use crate::blocks::{self, mark_blocks, same_block};
use crate::consts::Const;
use crate::error::OptimizeError;
use crate::wordcode::{self, op, Unit};

/// `codelen > INT_MAX` bailout threshold.
pub const MAX_UNITS: usize = i32::MAX as usize;

/// One `(unit_offset_delta, line_delta)` entry. Offsets are expressed in
/// wordcode units rather than bytes, the same simplification `wordcode`
/// makes for jump targets (see that module's doc comment) — this format
/// owns its own convention end-to-end and never needs to match CPython's
/// on-disk `co_lnotab` byte layout.
pub type LineEntry = (u8, u8);

/// A bytecode buffer plus its line-number table: what the optimizer both
/// consumes and produces.
#[derive(Debug, Clone, PartialEq)]
pub struct Bytecode {
    pub code: Vec<Unit>,
    pub lines: Vec<LineEntry>,
}

/// `PyCode_Optimize`. `consts` is mutated in place (constants newly folded
/// from `BUILD_TUPLE` runs are appended) exactly as the original's list is —
/// including on the bailout path, where the rewritten `code`/`lines` are
/// discarded but any constants already folded before the bailout was hit
/// are not rolled back. This is a faithful quirk, not an oversight: see
/// DESIGN.md.
pub fn optimize(code: &[Unit], consts: &mut Vec<Const>, lines: &[LineEntry]) -> Result<Bytecode, OptimizeError> {
    if lines.iter().any(|&(delta, _)| delta == 255) {
        return Ok(Bytecode { code: code.to_vec(), lines: lines.to_vec() });
    }
    if code.len() > MAX_UNITS {
        return Ok(Bytecode { code: code.to_vec(), lines: lines.to_vec() });
    }

    let mut codestr = code.to_vec();
    rewrite(&mut codestr, consts)?;

    match compact(&codestr, lines) {
        Some(out) => Ok(out),
        None => Ok(Bytecode { code: code.to_vec(), lines: lines.to_vec() }),
    }
}

// ---- rewrite pass -------------------------------------------------------

fn rewrite(codestr: &mut [Unit], consts: &mut Vec<Const>) -> Result<(), OptimizeError> {
    let block_of = mark_blocks(codestr);

    let mut i = find_op(codestr, 0);
    let mut cumlc: u32 = 0;
    while i < codestr.len() {
        let (opcode, _) = wordcode::unpack(codestr[i]);
        let op_start = back_to_op_start(codestr, i);

        let mut nexti = i + 1;
        while nexti < codestr.len() && wordcode::unpack(codestr[nexti]).0 == op::EXTENDED_ARG {
            nexti += 1;
        }
        let nextop = if nexti < codestr.len() { wordcode::unpack(codestr[nexti]).0 } else { 0 };

        let lastlc = cumlc;
        cumlc = 0;

        match opcode {
            op::LOAD_CONST => {
                cumlc = lastlc + 1;
                if nextop == op::POP_JUMP_IF_FALSE && same_block(&block_of, op_start, i + 1) {
                    let idx = wordcode::get_arg(codestr, i) as usize;
                    if consts.get(idx).map(Const::is_truthy).unwrap_or(false) {
                        fill_nops(codestr, op_start, nexti + 1);
                        cumlc = 0;
                    }
                }
            }
            op::BUILD_TUPLE => {
                fold_build_tuple(codestr, consts, &block_of, op_start, i, nexti, nextop, lastlc)?;
            }
            op::JUMP_IF_FALSE_OR_POP | op::JUMP_IF_TRUE_OR_POP => {
                if let Some(new_i) = fuse_conditional_jump(codestr, opcode, i) {
                    nexti = new_i;
                } else {
                    thread_jump(codestr, opcode, op_start, i);
                }
            }
            op::POP_JUMP_IF_FALSE | op::POP_JUMP_IF_TRUE | op::JUMP_FORWARD | op::JUMP_ABSOLUTE => {
                thread_jump(codestr, opcode, op_start, i);
            }
            op::RETURN_VALUE => {
                nexti = trim_dead_code_after_return(codestr, &block_of, i, nexti);
            }
            _ => {}
        }

        i = nexti;
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn fold_build_tuple(
    codestr: &mut [Unit],
    consts: &mut Vec<Const>,
    block_of: &[u32],
    op_start: usize,
    i: usize,
    nexti: usize,
    nextop: u8,
    lastlc: u32,
) -> Result<(), OptimizeError> {
    let n = wordcode::get_arg(codestr, i);
    if n > 0 && lastlc >= n {
        let h = lastn_const_start(codestr, op_start, n as usize);
        if same_block(block_of, h, op_start) {
            fold_tuple_on_constants(codestr, h, i + 1, consts, n as usize)?;
            return Ok(());
        }
    }

    if nextop != op::UNPACK_SEQUENCE || !same_block(block_of, op_start, i + 1) || n != wordcode::get_arg(codestr, nexti)
    {
        return Ok(());
    }
    if n < 2 {
        fill_nops(codestr, op_start, nexti + 1);
    } else if n == 2 {
        codestr[op_start] = wordcode::pack(op::ROT_TWO, 0);
        fill_nops(codestr, op_start + 1, nexti + 1);
    } else if n == 3 {
        codestr[op_start] = wordcode::pack(op::ROT_THREE, 0);
        codestr[op_start + 1] = wordcode::pack(op::ROT_TWO, 0);
        fill_nops(codestr, op_start + 2, nexti + 1);
    }
    Ok(())
}

/// `fold_tuple_on_constants`: replaces `n` consecutive `LOAD_CONST`s ending
/// just before `opcode_end` with a single `LOAD_CONST` of a freshly appended
/// tuple constant.
fn fold_tuple_on_constants(
    codestr: &mut [Unit],
    c_start: usize,
    opcode_end: usize,
    consts: &mut Vec<Const>,
    n: usize,
) -> Result<(), OptimizeError> {
    let mut values = Vec::with_capacity(n);
    let mut pos = c_start;
    for _ in 0..n {
        pos = find_op(codestr, pos);
        debug_assert_eq!(wordcode::unpack(codestr[pos]).0, op::LOAD_CONST);
        let arg = wordcode::get_arg(codestr, pos) as usize;
        values.push(consts[arg].clone());
        pos += 1;
    }

    if consts.len() >= (u32::MAX as usize) - 1 {
        return Err(OptimizeError::ConstantsOverflow);
    }
    let index = consts.len() as u32;
    consts.push(Const::Tuple(values));

    copy_op_arg(codestr, c_start, op::LOAD_CONST, index, opcode_end);
    Ok(())
}

/// Collapses a chain of same-polarity `JUMP_IF_*_OR_POP`s, or rewrites an
/// opposite-polarity chain into a `POP_JUMP_IF_*` past the inner jump.
/// Returns the new `nexti` on success, `None` if the target wasn't itself a
/// conditional jump or the rewrite didn't fit in the original slot (in
/// which case the caller falls through to `thread_jump`, matching the
/// original's `/* Intentional fallthrough */`).
fn fuse_conditional_jump(codestr: &mut [Unit], opcode: u8, i: usize) -> Option<usize> {
    let h = blocks::jump_target(codestr, i);
    let tgt = find_op(codestr, h);
    let tgt_op = wordcode::unpack(codestr[tgt]).0;
    if !blocks::is_conditional_jump(tgt_op) {
        return None;
    }

    let (new_arg, new_op) = if blocks::jumps_on_true(tgt_op) == blocks::jumps_on_true(opcode) {
        (wordcode::get_arg(codestr, tgt), opcode)
    } else {
        let arg = (tgt + 1) as u32;
        let new_op = if opcode == op::JUMP_IF_TRUE_OR_POP { op::POP_JUMP_IF_TRUE } else { op::POP_JUMP_IF_FALSE };
        (arg, new_op)
    };

    let new_i = set_arg(codestr, i, new_arg)?;
    let (_, arg) = wordcode::unpack(codestr[new_i]);
    codestr[new_i] = wordcode::pack(new_op, arg);
    Some(new_i)
}

/// Replaces a jump to `RETURN_VALUE` with a direct `RETURN_VALUE`, or
/// forwards a jump-to-jump through the chain (upgrading a forward jump that
/// would need to go backward to `JUMP_ABSOLUTE`; never creates a backward
/// relative jump).
fn thread_jump(codestr: &mut [Unit], opcode: u8, op_start: usize, i: usize) {
    let h = blocks::jump_target(codestr, i);
    let tgt = find_op(codestr, h);
    let tgt_op = wordcode::unpack(codestr[tgt]).0;

    if blocks::is_unconditional_jump(opcode) && tgt_op == op::RETURN_VALUE {
        codestr[op_start] = wordcode::pack(op::RETURN_VALUE, 0);
        fill_nops(codestr, op_start + 1, i + 1);
        return;
    }

    if !blocks::is_unconditional_jump(tgt_op) {
        return;
    }

    let raw = wordcode::get_arg(codestr, tgt) as usize;
    let mut target = if blocks::is_absolute_jump(tgt_op) { raw } else { raw + tgt + 1 };
    let mut new_opcode = opcode;
    if opcode == op::JUMP_FORWARD {
        new_opcode = op::JUMP_ABSOLUTE;
    } else if !blocks::is_absolute_jump(opcode) {
        if target < i + 1 {
            return; // no backward relative jumps
        }
        target -= i + 1;
    }
    copy_op_arg(codestr, op_start, new_opcode, target as u32, i + 1);
}

/// NOPs out unreachable code after an unconditional `RETURN_VALUE`, up to
/// (but not past) the next `SETUP_FINALLY`/`RERAISE`, which stay in place as
/// block-limit markers. Returns the `nexti` to resume scanning from.
fn trim_dead_code_after_return(codestr: &mut [Unit], block_of: &[u32], i: usize, nexti: usize) -> usize {
    let mut h = i + 1;
    while h < codestr.len() && same_block(block_of, i, h) {
        let hop = wordcode::unpack(codestr[h]).0;
        if hop == op::SETUP_FINALLY || hop == op::RERAISE {
            while h > i + 1 && wordcode::unpack(codestr[h - 1]).0 == op::EXTENDED_ARG {
                h -= 1;
            }
            break;
        }
        h += 1;
    }
    if h > i + 1 {
        fill_nops(codestr, i + 1, h);
        find_op(codestr, h)
    } else {
        nexti
    }
}

// ---- compaction pass -----------------------------------------------------

/// Removes `NOP`s and retargets jumps to the new unit indices. Returns
/// `None` if a relocated jump would need more units than its original slot
/// (the final-emit bailout); the caller returns the unoptimized input then.
fn compact(codestr: &[Unit], lines: &[LineEntry]) -> Option<Bytecode> {
    let mut remap = vec![0usize; codestr.len()];
    let mut nops = 0usize;
    for (idx, unit) in codestr.iter().enumerate() {
        remap[idx] = idx - nops;
        if wordcode::unpack(*unit).0 == op::NOP {
            nops += 1;
        }
    }

    let new_lines = remap_line_table(lines, &remap);

    let mut out = Vec::with_capacity(codestr.len());
    let mut i = 0usize;
    while i < codestr.len() {
        let op_start = i;
        let (mut opcode, low) = wordcode::unpack(codestr[i]);
        let mut arg = low as u32;
        while opcode == op::EXTENDED_ARG {
            i += 1;
            let (next_op, next_arg) = wordcode::unpack(codestr[i]);
            arg = (arg << 8) | next_arg as u32;
            opcode = next_op;
        }

        if opcode == op::NOP {
            i += 1;
            continue;
        }

        let retargeted = match opcode {
            op::JUMP_ABSOLUTE | op::POP_JUMP_IF_FALSE | op::POP_JUMP_IF_TRUE | op::JUMP_IF_FALSE_OR_POP
            | op::JUMP_IF_TRUE_OR_POP => Some(remap[arg as usize] as u32),
            op::JUMP_FORWARD | op::SETUP_FINALLY => {
                Some((remap[arg as usize + i + 1] - remap[i] - 1) as u32)
            }
            _ => None,
        };
        let final_arg = retargeted.unwrap_or(arg);

        let ilen = i - op_start + 1;
        if wordcode::instrsize(final_arg) > ilen {
            return None;
        }
        wordcode::write_op_arg(&mut out, opcode, final_arg, ilen);
        i += 1;
    }

    Some(Bytecode { code: out, lines: new_lines })
}

fn remap_line_table(lines: &[LineEntry], remap: &[usize]) -> Vec<LineEntry> {
    let mut out = Vec::with_capacity(lines.len());
    let mut cum_orig = 0u32;
    let mut last_new = 0u32;
    for &(delta, line_delta) in lines {
        cum_orig += delta as u32;
        let new_offset = remap[cum_orig as usize] as u32;
        let offset_delta = new_offset - last_new;
        debug_assert!(offset_delta <= 255, "compaction only ever shrinks offsets");
        out.push((offset_delta as u8, line_delta));
        last_new = new_offset;
    }
    out
}

// ---- unit-level helpers ---------------------------------------------------

/// `find_op`: skip forward past any `EXTENDED_ARG` prefix at `i`.
fn find_op(codestr: &[Unit], mut i: usize) -> usize {
    while i < codestr.len() && wordcode::unpack(codestr[i]).0 == op::EXTENDED_ARG {
        i += 1;
    }
    i
}

/// Scan backward from the effective opcode at `i` to the start of its
/// `EXTENDED_ARG` prefix run.
fn back_to_op_start(codestr: &[Unit], mut i: usize) -> usize {
    while i >= 1 && wordcode::unpack(codestr[i - 1]).0 == op::EXTENDED_ARG {
        i -= 1;
    }
    i
}

fn fill_nops(codestr: &mut [Unit], start: usize, end: usize) {
    for slot in codestr[start..end].iter_mut() {
        *slot = wordcode::pack(op::NOP, 0);
    }
}

fn write_op_arg_slice(codestr: &mut [Unit], start: usize, opcode: u8, oparg: u32, size: usize) {
    let mut idx = start;
    if size >= 4 {
        codestr[idx] = wordcode::pack(op::EXTENDED_ARG, ((oparg >> 24) & 0xff) as u8);
        idx += 1;
    }
    if size >= 3 {
        codestr[idx] = wordcode::pack(op::EXTENDED_ARG, ((oparg >> 16) & 0xff) as u8);
        idx += 1;
    }
    if size >= 2 {
        codestr[idx] = wordcode::pack(op::EXTENDED_ARG, ((oparg >> 8) & 0xff) as u8);
        idx += 1;
    }
    codestr[idx] = wordcode::pack(opcode, (oparg & 0xff) as u8);
}

/// `set_arg`: overwrite the argument of the instruction whose effective
/// opcode is at `i`. Succeeds iff the new encoding fits within the old
/// one's unit count; returns the (possibly shifted) new effective-opcode
/// index.
fn set_arg(codestr: &mut [Unit], i: usize, new_arg: u32) -> Option<usize> {
    let cur_arg = wordcode::get_arg(codestr, i);
    if cur_arg == new_arg {
        return Some(i);
    }
    let cur_len = wordcode::instrsize(cur_arg);
    let new_len = wordcode::instrsize(new_arg);
    if cur_len < new_len {
        return None;
    }
    let (opcode, _) = wordcode::unpack(codestr[i]);
    write_op_arg_slice(codestr, i + 1 - cur_len, opcode, new_arg, new_len);
    fill_nops(codestr, i + 1 - cur_len + new_len, i + 1);
    Some(i - cur_len + new_len)
}

/// `copy_op_arg`: emit `opcode`/`oparg` right-aligned to end at `maxi`,
/// padding the head of `[i, maxi)` with `NOP`s. Returns `None` if it
/// doesn't fit.
fn copy_op_arg(codestr: &mut [Unit], i: usize, opcode: u8, oparg: u32, maxi: usize) -> Option<usize> {
    let ilen = wordcode::instrsize(oparg);
    if i + ilen > maxi {
        return None;
    }
    write_op_arg_slice(codestr, maxi - ilen, opcode, oparg, ilen);
    fill_nops(codestr, i, maxi - ilen);
    Some(maxi - 1)
}

/// `lastn_const_start`: scan backward from `i` across `LOAD_CONST`/
/// `EXTENDED_ARG` units to the start of the `n`-th-most-recent `LOAD_CONST`.
fn lastn_const_start(codestr: &[Unit], mut i: usize, mut n: usize) -> usize {
    loop {
        i -= 1;
        if wordcode::unpack(codestr[i]).0 == op::LOAD_CONST {
            n -= 1;
            if n == 0 {
                while i > 0 && wordcode::unpack(codestr[i - 1]).0 == op::EXTENDED_ARG {
                    i -= 1;
                }
                return i;
            }
        }
    }
}
