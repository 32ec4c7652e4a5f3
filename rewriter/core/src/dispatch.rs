//! Opcode-list walker shared by router commands and V4 actions
//!
//! Both levels of a router payload have the same shape: a byte string of
//! opcodes and a positionally matched list of ABI blobs. [`rewrite_plan`]
//! walks such a pair and lets a [`PlanStep`] rewrite the blobs it
//! recognises. The caller's list is never mutated; a copy is made the first
//! time a blob is replaced.

use alloy_primitives::Bytes;

use crate::error::RewriteError;

pub(crate) trait PlanStep {
    type Op: Copy;

    /// Maps a raw opcode byte to a recognised opcode. Unrecognised bytes are
    /// skipped and their blob is never looked at.
    fn opcode(&self, raw: u8) -> Option<Self::Op>;

    /// Returns the replacement blob, or `None` to keep the original.
    fn rewrite(&mut self, index: usize, op: Self::Op, arg: &Bytes)
    -> Result<Option<Bytes>, RewriteError>;

    /// Error for a recognised opcode whose blob is missing, or `None` to skip
    /// the position.
    fn missing(&self, index: usize, op: Self::Op) -> Option<RewriteError>;
}

/// Walks `opcodes` against `args`, returning the patched list if anything
/// changed.
pub(crate) fn rewrite_plan<S: PlanStep>(
    opcodes: &[u8],
    args: &[Bytes],
    step: &mut S,
) -> Result<Option<Vec<Bytes>>, RewriteError> {
    let mut patched: Option<Vec<Bytes>> = None;

    for (index, &raw) in opcodes.iter().enumerate() {
        let Some(op) = step.opcode(raw) else {
            continue;
        };
        let Some(arg) = args.get(index) else {
            match step.missing(index, op) {
                Some(err) => return Err(err),
                None => continue,
            }
        };
        if let Some(replacement) = step.rewrite(index, op, arg)? {
            patched.get_or_insert_with(|| args.to_vec())[index] = replacement;
        }
    }

    Ok(patched)
}
