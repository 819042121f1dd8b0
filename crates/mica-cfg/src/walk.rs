// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The recursive lowering walk.
//!
//! `walk(ctx, node, current)` evaluates `node` starting in `current`,
//! stores the result into `ctx.target`, and returns the block in which
//! evaluation should proceed. Arms that always diverge (`return`, `break`,
//! `next`, `retry`) return the dead block.
//!
//! The walk never duplicates any part of the tree: a subtree is lowered
//! exactly once, so downstream typechecking stays linear in the source.

use std::rc::Rc;

use mica_ast::{BlockExpr, Expr, ExprKind, LiteralValue, RescueCase, Span};
use mica_core::{names, symbols, CastKind, LocalVariable, NameRef};

use crate::builder::CfgBuilder;
use crate::cfg::{BlockId, MIN_LOOP_LET};
use crate::context::CfgContext;
use crate::errors::{self, CfgError};
use crate::instructions::{ArgFlags, BlockLink, Op, SendOp};

impl CfgBuilder<'_> {
    /// Lowers `node`, returning the continuation block.
    pub(crate) fn walk(
        &mut self,
        ctx: &CfgContext,
        node: &Expr,
        current: BlockId,
    ) -> Result<BlockId, CfgError> {
        if self.cfg.block(current).exit.is_some() && current != self.cfg.dead_block() {
            return Err(CfgError::internal(
                "current block has already been finalized",
                node.span,
            ));
        }
        self.walk_node(ctx, node, current)
            .map_err(|err| err.with_breadcrumb(node_kind_name(&node.kind), node.span))
    }

    fn walk_node(
        &mut self,
        ctx: &CfgContext,
        node: &Expr,
        current: BlockId,
    ) -> Result<BlockId, CfgError> {
        let span = node.span;
        match &node.kind {
            ExprKind::Literal(value) => {
                self.emit(current, ctx.target, span, Op::Literal(value.clone()));
                Ok(current)
            }

            ExprKind::Local(local) => {
                self.emit(current, ctx.target, span, Op::Ident(*local));
                Ok(current)
            }

            ExprKind::UnresolvedIdent { kind, name } => {
                let local = self.unresolved_ident_to_local(*kind, *name, span)?;
                self.emit(current, ctx.target, span, Op::Ident(local));
                Ok(current)
            }

            ExprKind::Field(sym) => {
                let local = self.global_to_local(*sym);
                self.emit(current, ctx.target, span, Op::Ident(local));
                Ok(current)
            }

            ExprKind::ConstantLit { symbol, qualifier } => {
                if *symbol == symbols::STUB_MODULE {
                    self.emit(current, ctx.target, span, Op::Alias(symbols::UNTYPED));
                } else {
                    self.emit(current, ctx.target, span, Op::Alias(*symbol));
                }

                // Lower the resolved qualifier of a nested constant into a
                // throwaway so editor queries still see its locations; it
                // contributes nothing to dataflow.
                let mut current = current;
                if let Some(qualifier) = qualifier {
                    let keep = self.new_temporary(names::KEEP_FOR_IDE);
                    current = self.walk(&ctx.with_target(keep), qualifier, current)?;
                }
                Ok(current)
            }

            ExprKind::Assign { lhs, rhs } => {
                let lhs_local = match &lhs.kind {
                    ExprKind::ConstantLit { symbol, .. } => self.global_to_local(*symbol),
                    ExprKind::Field(sym) => self.global_to_local(*sym),
                    ExprKind::Local(local) => *local,
                    ExprKind::UnresolvedIdent { kind, name } => {
                        self.unresolved_ident_to_local(*kind, *name, lhs.span)?
                    }
                    _ => {
                        return Err(CfgError::internal(
                            "unexpected assignment target",
                            lhs.span,
                        ))
                    }
                };

                let cont = self.walk(&ctx.with_target(lhs_local), rhs, current)?;
                // The assignment expression itself has a value.
                self.emit(cont, ctx.target, span, Op::Ident(lhs_local));
                Ok(cont)
            }

            ExprKind::Seq { stats, expr } => {
                let mut current = current;
                for stat in stats {
                    let temp = self.new_temporary(names::STAT_TEMP);
                    current = self.walk(&ctx.with_target(temp), stat, current)?;
                }
                self.walk(ctx, expr, current)
            }

            ExprKind::If { cond, then_branch, else_branch } => {
                let if_temp = self.new_temporary(names::IF_TEMP);
                let cont = self.walk(&ctx.with_target(if_temp), cond, current)?;
                let then_block = self.cfg.fresh_block(ctx.loops, ctx.block_scope_id);
                let else_block = self.cfg.fresh_block(ctx.loops, ctx.block_scope_id);
                self.cfg
                    .conditional_jump(cont, if_temp, then_block, else_block, cond.span)?;

                let then_end = self.walk(ctx, then_branch, then_block)?;
                let else_end = self.walk(ctx, else_branch, else_block)?;
                let dead = self.cfg.dead_block();
                if then_end == dead && else_end == dead {
                    Ok(dead)
                } else if then_end == dead {
                    Ok(else_end)
                } else if else_end == dead {
                    Ok(then_end)
                } else {
                    let merge = self.cfg.fresh_block(ctx.loops, ctx.block_scope_id);
                    self.cfg.unconditional_jump(then_end, merge, span)?;
                    self.cfg.unconditional_jump(else_end, merge, span)?;
                    Ok(merge)
                }
            }

            ExprKind::While { cond, body } => self.walk_while(ctx, span, cond, body, current),

            ExprKind::Return { expr } => {
                let ret_temp = self.new_temporary(names::RETURN_TEMP);
                let cont = self.walk(&ctx.with_target(ret_temp), expr, current)?;
                // Dead assign; keeps every target assigned on the path.
                self.emit(cont, ctx.target, span, Op::Return(ret_temp));
                self.cfg.jump_to_dead(cont, span)?;
                Ok(self.cfg.dead_block())
            }

            ExprKind::Next { expr } => {
                let next_temp = self.new_temporary(names::NEXT_TEMP);
                let after = self.walk(&ctx.with_target(next_temp), expr, current)?;
                if after != self.cfg.dead_block() && ctx.is_inside_block {
                    let link = ctx.link.clone().ok_or_else(|| {
                        CfgError::internal("inside a block without a block link", span)
                    })?;
                    let throwaway = self.new_temporary(names::NEXT_TEMP);
                    self.emit(
                        after,
                        throwaway,
                        span,
                        Op::BlockReturn { link, value: next_temp },
                    );
                }

                match ctx.next_scope {
                    Some(scope) => self.cfg.unconditional_jump(after, scope, span)?,
                    None => {
                        self.sink.push(errors::no_scope("do", "next", span));
                        self.cfg.jump_to_dead(after, span)?;
                    }
                }
                Ok(self.cfg.dead_block())
            }

            ExprKind::Break { expr } => {
                let expr_temp = self.new_temporary(names::RETURN_TEMP);
                let after = self.walk(&ctx.with_target(expr_temp), expr, current)?;

                // Assign through <block_break_assign>; the inferencer keys
                // on that name to avoid reporting a changing-type-in-loop
                // error against the outer target.
                let break_assign = self.new_temporary(names::BLOCK_BREAK_ASSIGN);
                self.emit(after, break_assign, span, Op::Ident(expr_temp));
                self.emit(after, ctx.break_target, span, Op::Ident(break_assign));

                match ctx.break_scope {
                    Some(scope) => self.cfg.unconditional_jump(after, scope, span)?,
                    None => {
                        self.sink.push(errors::no_scope("do", "break", span));
                        self.cfg.jump_to_dead(after, span)?;
                    }
                }
                Ok(self.cfg.dead_block())
            }

            ExprKind::Retry => {
                match ctx.rescue_scope {
                    Some(scope) => self.cfg.unconditional_jump(current, scope, span)?,
                    None => {
                        self.sink.push(errors::no_scope("begin", "retry", span));
                        self.cfg.jump_to_dead(current, span)?;
                    }
                }
                Ok(self.cfg.dead_block())
            }

            ExprKind::Send { recv, method, args, is_private_ok, block } => self.walk_send(
                ctx,
                span,
                recv,
                *method,
                args,
                *is_private_ok,
                block.as_ref(),
                current,
            ),

            ExprKind::Block(_) => Err(CfgError::internal(
                "bare block outside a send",
                span,
            )),

            ExprKind::Rescue { body, cases, else_, ensure } => {
                self.walk_rescue(ctx, span, body, cases, else_, ensure, current)
            }

            ExprKind::Array { elems } => {
                let mut current = current;
                let mut vars = Vec::with_capacity(elems.len());
                let mut spans = Vec::with_capacity(elems.len());
                for elem in elems {
                    let temp = self.new_temporary(names::ARRAY_TEMP);
                    current = self.walk(&ctx.with_target(temp), elem, current)?;
                    vars.push(temp);
                    spans.push(span);
                }
                self.emit_magic_build(ctx, current, span, names::BUILD_ARRAY, vars, spans);
                Ok(current)
            }

            ExprKind::Hash { keys, values } => {
                let mut current = current;
                let mut vars = Vec::with_capacity(keys.len() * 2);
                let mut spans = Vec::with_capacity(keys.len() * 2);
                for (key, value) in keys.iter().zip(values) {
                    let key_temp = self.new_temporary(names::HASH_TEMP);
                    let val_temp = self.new_temporary(names::HASH_TEMP);
                    current = self.walk(&ctx.with_target(key_temp), key, current)?;
                    current = self.walk(&ctx.with_target(val_temp), value, current)?;
                    vars.push(key_temp);
                    vars.push(val_temp);
                    spans.push(key.span);
                    spans.push(value.span);
                }
                self.emit_magic_build(ctx, current, span, names::BUILD_HASH, vars, spans);
                Ok(current)
            }

            ExprKind::Cast { arg, ty, cast } => {
                let temp = self.new_temporary(names::CAST_TEMP);
                let current = self.walk(&ctx.with_target(temp), arg, current)?;
                self.emit(
                    current,
                    ctx.target,
                    span,
                    Op::Cast { value: temp, ty: *ty, cast: *cast },
                );
                if *cast == CastKind::Let {
                    self.cfg.min_loops.insert(ctx.target, MIN_LOOP_LET);
                }
                Ok(current)
            }

            ExprKind::EmptyTree => Ok(current),

            ExprKind::UnresolvedConstantLit => Err(CfgError::internal(
                "constant should have been resolved before CFG construction",
                span,
            )),
            ExprKind::ClassDef | ExprKind::MethodDef => Err(CfgError::internal(
                "definition should have been flattened out of expression position",
                span,
            )),
        }
    }

    /// Lowers a `while` loop.
    ///
    /// ```text
    ///   ┌──▶ header ───────────┐
    ///   │      │               ▼
    ///   │      ▼        break_not_called
    ///   └─── body         target = nil
    ///          │               │
    ///          ▼               │
    ///      continue ◀──────────┘
    /// ```
    ///
    /// `break` inside the body hops straight to `continue` after assigning
    /// the loop's value, so the loop evaluates to nil unless `break`
    /// supplied one.
    fn walk_while(
        &mut self,
        ctx: &CfgContext,
        span: Span,
        cond: &Expr,
        body: &Expr,
        current: BlockId,
    ) -> Result<BlockId, CfgError> {
        let header = self.cfg.fresh_block(ctx.loops + 1, ctx.block_scope_id);
        // Entered only when break is not called in the loop body.
        let break_not_called = self.cfg.fresh_block(ctx.loops, ctx.block_scope_id);
        let continue_block = self.cfg.fresh_block(ctx.loops, ctx.block_scope_id);
        self.cfg.unconditional_jump(current, header, span)?;

        let cond_temp = self.new_temporary(names::WHILE_TEMP);
        let header_end = self.walk(
            &ctx.with_target(cond_temp)
                .with_loop_scope(header, continue_block, false),
            cond,
            header,
        )?;
        let body_block = self.cfg.fresh_block(ctx.loops + 1, ctx.block_scope_id);
        self.cfg
            .conditional_jump(header_end, cond_temp, body_block, break_not_called, cond.span)?;

        let body_temp = self.new_temporary(names::STAT_TEMP);
        let body_end = self.walk(
            &ctx.with_target(body_temp)
                .with_loop_scope(header, continue_block, false)
                .with_block_break_target(ctx.target),
            body,
            body_block,
        )?;
        self.cfg.unconditional_jump(body_end, header, span)?;

        // The loop's value is nil unless break supplied one; the synthetic
        // assign keeps the join well-typed.
        self.synthesize(break_not_called, ctx.target, span, Op::Literal(LiteralValue::Nil));
        self.cfg.unconditional_jump(break_not_called, continue_block, span)?;
        Ok(continue_block)
    }

    /// Lowers a send, including the `T.absurd` special case and the block
    /// harness.
    ///
    /// A send with a block becomes:
    ///
    /// ```text
    ///   ┌──▶ header ─────────────────┐
    ///   │      │                     ▼
    ///   │      ▼         solve_constraint_block
    ///   └─ block body      target = solve(link)
    ///          │                     │
    ///          ▼                     │
    ///       post ◀───────────────────┘
    /// ```
    ///
    /// The header branches on the distinguished `<block_call>` local, which
    /// the inferencer treats as nondeterministic, so the body is analyzed
    /// as running zero or more times.
    #[allow(clippy::too_many_arguments)]
    fn walk_send(
        &mut self,
        ctx: &CfgContext,
        span: Span,
        recv: &Expr,
        method: NameRef,
        args: &[Expr],
        is_private_ok: bool,
        block: Option<&BlockExpr>,
        current: BlockId,
    ) -> Result<BlockId, CfgError> {
        // `T.absurd(x)` asserts exhaustiveness instead of calling anything.
        if method == names::ABSURD && is_t_module(recv) {
            if args.len() != 1 {
                self.sink.push(errors::absurd_wrong_arity(args.len(), span));
                return Ok(current);
            }
            if matches!(args[0].kind, ExprKind::Send { .. }) {
                // Passing a call is the most common way T.absurd is misused.
                self.sink.push(errors::absurd_on_call(span));
                return Ok(current);
            }

            let temp = self.new_temporary(names::STAT_TEMP);
            let current = self.walk(&ctx.with_target(temp), &args[0], current)?;
            self.emit(current, ctx.target, span, Op::TAbsurd(temp));
            return Ok(current);
        }

        let recv_temp = self.new_temporary(names::STAT_TEMP);
        let mut current = self.walk(&ctx.with_target(recv_temp), recv, current)?;

        let mut arg_temps = Vec::with_capacity(args.len());
        let mut arg_spans = Vec::with_capacity(args.len());
        for arg in args {
            let temp = self.new_temporary(names::STAT_TEMP);
            current = self.walk(&ctx.with_target(temp), arg, current)?;
            arg_temps.push(temp);
            arg_spans.push(arg.span);
        }

        let Some(block) = block else {
            self.emit(
                current,
                ctx.target,
                span,
                Op::Send(SendOp {
                    recv: recv_temp,
                    method,
                    recv_span: recv.span,
                    args: arg_temps,
                    arg_spans,
                    is_private_ok,
                    link: None,
                }),
            );
            return Ok(current);
        };

        self.cfg.max_block_scope_id += 1;
        let new_scope_id = self.cfg.max_block_scope_id;
        let arg_flags: Vec<ArgFlags> = block
            .params
            .iter()
            .map(|p| ArgFlags {
                keyword: p.keyword,
                repeated: p.repeated,
                has_default: p.has_default,
                shadow: p.shadow,
            })
            .collect();
        let link = Rc::new(BlockLink {
            method,
            arg_flags,
            block_scope_id: new_scope_id,
        });

        let send_temp = self.new_temporary(names::BLOCK_PRE_CALL_TEMP);
        self.emit(
            current,
            send_temp,
            span,
            Op::Send(SendOp {
                recv: recv_temp,
                method,
                recv_span: recv.span,
                args: arg_temps,
                arg_spans,
                is_private_ok,
                link: Some(link.clone()),
            }),
        );
        // Capture caller self; the callee may rebind it inside the block.
        let restore_self = self.new_temporary(names::SELF_RESTORE);
        self.synthesize(
            current,
            restore_self,
            Span::none(),
            Op::Ident(LocalVariable::self_local()),
        );

        let header = self.cfg.fresh_block(ctx.loops + 1, new_scope_id);
        // Entered only if break is not called in the block body.
        let solve_constraint_block = self.cfg.fresh_block(ctx.loops, ctx.block_scope_id);
        let post_block = self.cfg.fresh_block(ctx.loops, ctx.block_scope_id);
        let body_block = self.cfg.fresh_block(ctx.loops + 1, new_scope_id);

        let arg_temp = self.new_temporary(names::BLOCK_ARG_TEMP);
        let idx_temp = self.new_temporary(names::BLOCK_ARG_TEMP);
        self.emit(
            body_block,
            LocalVariable::self_local(),
            span,
            Op::LoadSelf { link: link.clone(), fallback: LocalVariable::self_local() },
        );
        self.emit(
            body_block,
            arg_temp,
            block.span,
            Op::LoadYieldParams { link: link.clone() },
        );

        for (i, param) in block.params.iter().enumerate() {
            if param.repeated {
                if i != 0 {
                    // Mixing positional and rest args in blocks is not
                    // supported; drop in an untyped.
                    self.emit(body_block, param.local, param.span, Op::Alias(symbols::UNTYPED));
                } else {
                    self.emit(body_block, param.local, param.span, Op::Ident(arg_temp));
                }
                continue;
            }

            // Positional formals index into the yielded tuple.
            let zero = param.span.zero_length();
            self.synthesize(
                body_block,
                idx_temp,
                zero,
                Op::Literal(LiteralValue::Int(i as i64)),
            );
            self.emit(
                body_block,
                param.local,
                param.span,
                Op::Send(SendOp {
                    recv: arg_temp,
                    method: names::SQUARE_BRACKETS,
                    recv_span: block.span,
                    args: vec![idx_temp],
                    arg_spans: vec![zero],
                    is_private_ok: false,
                    link: None,
                }),
            );
        }

        self.cfg.conditional_jump(
            header,
            LocalVariable::block_call(),
            body_block,
            solve_constraint_block,
            span,
        )?;
        self.cfg.unconditional_jump(current, header, span)?;

        let block_rv = self.new_temporary(names::BLOCK_RETURN_TEMP);
        let block_last = self.walk(
            &ctx.with_target(block_rv)
                .with_block_break_target(ctx.target)
                .with_loop_scope(header, post_block, true)
                .with_send_and_block_link(link.clone())
                .with_block_scope_id(new_scope_id),
            &block.body,
            body_block,
        )?;
        if block_last != self.cfg.dead_block() {
            let throwaway = self.new_temporary(names::BLOCK_RETURN_TEMP);
            self.synthesize(
                block_last,
                throwaway,
                block.span,
                Op::BlockReturn { link: link.clone(), value: block_rv },
            );
        }

        self.cfg.unconditional_jump(block_last, header, span)?;
        self.cfg.unconditional_jump(solve_constraint_block, post_block, span)?;
        self.emit(
            solve_constraint_block,
            ctx.target,
            span,
            Op::SolveConstraint { link, result: send_temp },
        );

        let current = post_block;
        self.synthesize(
            current,
            LocalVariable::self_local(),
            span,
            Op::Ident(restore_self),
        );
        Ok(current)
    }

    /// Lowers try/rescue/else/ensure.
    ///
    /// Control flow inside the body is simplified: rather than modelling
    /// that each expression could throw, the graph models only "nothing
    /// ran" or "everything ran". Two Unanalyzable gates — one at the top of
    /// the body, one after the else — can jump into the handlers, and the
    /// inferencer never concludes which way either goes.
    #[allow(clippy::too_many_arguments)]
    fn walk_rescue(
        &mut self,
        ctx: &CfgContext,
        span: Span,
        body: &Expr,
        cases: &[RescueCase],
        else_: &Expr,
        ensure: &Expr,
        current: BlockId,
    ) -> Result<BlockId, CfgError> {
        let rescue_start = self.cfg.fresh_block(ctx.loops, ctx.block_scope_id);
        self.cfg.unconditional_jump(current, rescue_start, span)?;
        let ctx = ctx.with_rescue_scope(rescue_start);

        // Remembers whether none of the rescues matched; seeded false so
        // every path to the ensure carries a value.
        let goto_dead_temp = self.new_temporary(names::GOTO_DEAD_TEMP);
        self.synthesize(
            rescue_start,
            goto_dead_temp,
            span,
            Op::Literal(LiteralValue::Bool(false)),
        );

        let rescue_handlers = self.cfg.fresh_block(ctx.loops, ctx.block_scope_id);
        let body_block = self.cfg.fresh_block(ctx.loops, ctx.block_scope_id);
        let rescue_start_temp = self.new_temporary(names::RESCUE_START_TEMP);
        self.synthesize(rescue_start, rescue_start_temp, span, Op::Unanalyzable);
        self.cfg.conditional_jump(
            rescue_start,
            rescue_start_temp,
            rescue_handlers,
            body_block,
            span,
        )?;

        // The loop depth should formally increase here, but doing so makes
        // the inferencer report a lot of false errors.
        let body_end = self.walk(&ctx, body, body_block)?;
        let else_block = self.cfg.fresh_block(ctx.loops, ctx.block_scope_id);
        self.cfg.unconditional_jump(body_end, else_block, span)?;

        let else_end = self.walk(&ctx, else_, else_block)?;
        let ensure_block = self.cfg.fresh_block(ctx.loops, ctx.block_scope_id);

        let should_ensure = self.cfg.fresh_block(ctx.loops, ctx.block_scope_id);
        self.cfg.unconditional_jump(else_end, should_ensure, span)?;
        let rescue_end_temp = self.new_temporary(names::RESCUE_END_TEMP);
        self.synthesize(should_ensure, rescue_end_temp, span, Op::Unanalyzable);
        self.cfg.conditional_jump(
            should_ensure,
            rescue_end_temp,
            rescue_handlers,
            ensure_block,
            span,
        )?;

        let mut handlers = rescue_handlers;
        for case in cases {
            let case_body = self.cfg.fresh_block(ctx.loops, ctx.block_scope_id);
            let bound = match &case.var.kind {
                ExprKind::Local(local) => *local,
                _ => {
                    return Err(CfgError::internal(
                        "rescue case variable must be a local",
                        case.var.span,
                    ))
                }
            };
            // The caught exception is opaque to the inferencer.
            self.emit(handlers, bound, case.var.span, Op::Unanalyzable);

            // A rescue without a class catches the default base exception.
            let default_case;
            let exceptions: &[Expr] = if case.exceptions.is_empty() {
                default_case = [Expr::new(
                    ExprKind::ConstantLit { symbol: symbols::STANDARD_ERROR, qualifier: None },
                    case.var.span,
                )];
                &default_case
            } else {
                &case.exceptions
            };

            for ex in exceptions {
                let ex_span = ex.span;
                let exception_class = self.new_temporary(names::EXCEPTION_CLASS_TEMP);
                handlers = self.walk(&ctx.with_target(exception_class), ex, handlers)?;

                let isa_check = self.new_temporary(names::ISA_CHECK_TEMP);
                self.emit(
                    handlers,
                    isa_check,
                    ex_span,
                    Op::Send(SendOp {
                        recv: bound,
                        method: names::IS_A_P,
                        recv_span: ex_span,
                        args: vec![exception_class],
                        arg_spans: vec![ex_span],
                        is_private_ok: false,
                        link: None,
                    }),
                );

                let other_handler = self.cfg.fresh_block(ctx.loops, ctx.block_scope_id);
                self.cfg
                    .conditional_jump(handlers, isa_check, case_body, other_handler, ex_span)?;
                handlers = other_handler;
            }

            let case_end = self.walk(&ctx, &case.body, case_body)?;
            self.cfg.unconditional_jump(case_end, ensure_block, span)?;
        }

        // No handler matched: after the ensure runs, control must go dead,
        // since the exception propagates up the stack.
        self.synthesize(
            handlers,
            goto_dead_temp,
            span,
            Op::Literal(LiteralValue::Bool(true)),
        );
        self.cfg.unconditional_jump(handlers, ensure_block, span)?;

        let throw_away = self.new_temporary(names::THROW_AWAY_TEMP);
        let ensure_end = self.walk(&ctx.with_target(throw_away), ensure, ensure_block)?;
        let cont = self.cfg.fresh_block(ctx.loops, ctx.block_scope_id);
        let dead = self.cfg.dead_block();
        self.cfg
            .conditional_jump(ensure_end, goto_dead_temp, dead, cont, span)?;
        Ok(cont)
    }

    fn emit_magic_build(
        &mut self,
        ctx: &CfgContext,
        current: BlockId,
        span: Span,
        method: NameRef,
        args: Vec<LocalVariable>,
        arg_spans: Vec<Span>,
    ) {
        let magic = self.new_temporary(names::MAGIC_TEMP);
        self.synthesize(current, magic, Span::none(), Op::Alias(symbols::MAGIC));
        self.emit(
            current,
            ctx.target,
            span,
            Op::Send(SendOp {
                recv: magic,
                method,
                recv_span: span,
                args,
                arg_spans,
                is_private_ok: false,
                link: None,
            }),
        );
    }
}

/// Whether an expression is a resolved reference to the `T` module.
fn is_t_module(expr: &Expr) -> bool {
    matches!(
        expr.kind,
        ExprKind::ConstantLit { symbol, .. } if symbol == symbols::T_MODULE
    )
}

/// Names a node kind for internal-error breadcrumbs.
fn node_kind_name(kind: &ExprKind) -> &'static str {
    match kind {
        ExprKind::Literal(_) => "Literal",
        ExprKind::Local(_) => "Local",
        ExprKind::UnresolvedIdent { .. } => "UnresolvedIdent",
        ExprKind::ConstantLit { .. } => "ConstantLit",
        ExprKind::Field(_) => "Field",
        ExprKind::Assign { .. } => "Assign",
        ExprKind::Seq { .. } => "Seq",
        ExprKind::If { .. } => "If",
        ExprKind::While { .. } => "While",
        ExprKind::Return { .. } => "Return",
        ExprKind::Next { .. } => "Next",
        ExprKind::Break { .. } => "Break",
        ExprKind::Retry => "Retry",
        ExprKind::Send { .. } => "Send",
        ExprKind::Block(_) => "Block",
        ExprKind::Rescue { .. } => "Rescue",
        ExprKind::Array { .. } => "Array",
        ExprKind::Hash { .. } => "Hash",
        ExprKind::Cast { .. } => "Cast",
        ExprKind::EmptyTree => "EmptyTree",
        ExprKind::ClassDef => "ClassDef",
        ExprKind::MethodDef => "MethodDef",
        ExprKind::UnresolvedConstantLit => "UnresolvedConstantLit",
    }
}
