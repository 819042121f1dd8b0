// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Ambient walker state.
//!
//! `CfgContext` is a small value copied on each recursive descent. The
//! `with_*` builders derive updated contexts and never mutate the parent,
//! so branch-local overrides (a new target, a new loop scope) stay scoped
//! to the subtree that needs them. The only mutable carriers during a walk
//! are the CFG itself and the temporary counter.

use mica_core::LocalVariable;

use crate::cfg::BlockId;
use crate::instructions::BlockLinkRef;

/// The context threaded through `walk`.
#[derive(Debug, Clone)]
pub struct CfgContext {
    /// Local receiving the value of the expression being walked.
    pub target: LocalVariable,
    /// Current loop nesting depth.
    pub loops: u32,
    /// Lexically enclosing block scope id; 0 is the method body.
    pub block_scope_id: u32,
    /// Where `next` jumps: the enclosing loop/block header.
    pub next_scope: Option<BlockId>,
    /// Where `break` jumps: the enclosing loop/block continuation.
    pub break_scope: Option<BlockId>,
    /// Where `retry` jumps: the enclosing rescue entry.
    pub rescue_scope: Option<BlockId>,
    /// Local a `break` value is ultimately assigned to.
    pub break_target: LocalVariable,
    /// Link of the innermost enclosing block body, if any.
    pub link: Option<BlockLinkRef>,
    pub is_inside_block: bool,
}

impl CfgContext {
    /// Context for a method body entry.
    pub fn method_entry(target: LocalVariable) -> Self {
        CfgContext {
            target,
            loops: 0,
            block_scope_id: 0,
            next_scope: None,
            break_scope: None,
            rescue_scope: None,
            break_target: target,
            link: None,
            is_inside_block: false,
        }
    }

    pub fn with_target(&self, target: LocalVariable) -> Self {
        let mut ctx = self.clone();
        ctx.target = target;
        ctx
    }

    /// Enters a loop: `next` re-enters `next_scope`, `break` leaves to
    /// `break_scope`, and the nesting depth increases by one.
    pub fn with_loop_scope(
        &self,
        next_scope: BlockId,
        break_scope: BlockId,
        inside_block: bool,
    ) -> Self {
        let mut ctx = self.clone();
        ctx.next_scope = Some(next_scope);
        ctx.break_scope = Some(break_scope);
        ctx.loops += 1;
        ctx.is_inside_block = inside_block;
        ctx
    }

    pub fn with_block_break_target(&self, target: LocalVariable) -> Self {
        let mut ctx = self.clone();
        ctx.break_target = target;
        ctx
    }

    pub fn with_rescue_scope(&self, scope: BlockId) -> Self {
        let mut ctx = self.clone();
        ctx.rescue_scope = Some(scope);
        ctx
    }

    pub fn with_send_and_block_link(&self, link: BlockLinkRef) -> Self {
        let mut ctx = self.clone();
        ctx.link = Some(link);
        ctx
    }

    pub fn with_block_scope_id(&self, id: u32) -> Self {
        let mut ctx = self.clone();
        ctx.block_scope_id = id;
        ctx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mica_core::names;

    #[test]
    fn builders_do_not_mutate_parent() {
        let target = LocalVariable::new(names::RETURN_METHOD_TEMP, 1);
        let ctx = CfgContext::method_entry(target);
        let derived = ctx
            .with_loop_scope(BlockId(2), BlockId(3), false)
            .with_target(LocalVariable::new(names::STAT_TEMP, 2));

        assert_eq!(ctx.loops, 0);
        assert!(ctx.next_scope.is_none());
        assert_eq!(derived.loops, 1);
        assert_eq!(derived.next_scope, Some(BlockId(2)));
        assert_eq!(derived.break_scope, Some(BlockId(3)));
        assert_eq!(ctx.target, target);
    }
}
