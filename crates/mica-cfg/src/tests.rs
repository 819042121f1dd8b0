// SPDX-License-Identifier: (MIT OR Apache-2.0)

//! Walker tests — build CFGs from hand-assembled resolved trees and check
//! the produced block/instruction skeletons and invariants.

use mica_ast::{BlockExpr, BlockParam, Expr, ExprKind, IdentKind, LiteralValue, RescueCase, Span};
use mica_core::{names, symbols, CastKind, LocalVariable, NameRef, SymbolRef, SymbolTable, TypeRef};
use mica_diagnostics::{Diagnostic, DiagnosticSink};

use crate::context::CfgContext;
use crate::sanity;
use crate::{BlockId, CfgBuilder, MethodCfg, Op};

// ── AST construction helpers ────────────────────────────────

fn sp(start: usize, end: usize) -> Span {
    Span::new(start, end)
}

fn expr(kind: ExprKind) -> Expr {
    Expr::new(kind, sp(0, 1))
}

fn int(value: i64) -> Expr {
    expr(ExprKind::Literal(LiteralValue::Int(value)))
}

fn read(local: LocalVariable) -> Expr {
    expr(ExprKind::Local(local))
}

fn assign(lhs: Expr, rhs: Expr) -> Expr {
    expr(ExprKind::Assign { lhs: Box::new(lhs), rhs: Box::new(rhs) })
}

fn seq(stats: Vec<Expr>, trailing: Expr) -> Expr {
    expr(ExprKind::Seq { stats, expr: Box::new(trailing) })
}

fn if_(cond: Expr, then_branch: Expr, else_branch: Expr) -> Expr {
    expr(ExprKind::If {
        cond: Box::new(cond),
        then_branch: Box::new(then_branch),
        else_branch: Box::new(else_branch),
    })
}

fn while_(cond: Expr, body: Expr) -> Expr {
    expr(ExprKind::While { cond: Box::new(cond), body: Box::new(body) })
}

fn ret(value: Expr) -> Expr {
    expr(ExprKind::Return { expr: Box::new(value) })
}

fn brk(value: Expr) -> Expr {
    expr(ExprKind::Break { expr: Box::new(value) })
}

fn nxt(value: Expr) -> Expr {
    expr(ExprKind::Next { expr: Box::new(value) })
}

fn constant(symbol: SymbolRef) -> Expr {
    expr(ExprKind::ConstantLit { symbol, qualifier: None })
}

fn send(recv: Expr, method: NameRef, args: Vec<Expr>) -> Expr {
    expr(ExprKind::Send {
        recv: Box::new(recv),
        method,
        args,
        is_private_ok: false,
        block: None,
    })
}

fn send_block(recv: Expr, method: NameRef, args: Vec<Expr>, block: BlockExpr) -> Expr {
    expr(ExprKind::Send {
        recv: Box::new(recv),
        method,
        args,
        is_private_ok: false,
        block: Some(block),
    })
}

fn array(elems: Vec<Expr>) -> Expr {
    expr(ExprKind::Array { elems })
}

fn empty() -> Expr {
    expr(ExprKind::EmptyTree)
}

// ── Fixture ─────────────────────────────────────────────────

struct Fixture {
    symbols: SymbolTable,
    method: SymbolRef,
    klass: SymbolRef,
}

impl Fixture {
    fn new() -> Self {
        let mut symbols = SymbolTable::new();
        let klass = symbols.define_class("Widget", symbols::ROOT);
        let method = symbols.define_method("render", klass);
        Fixture { symbols, method, klass }
    }

    /// A namer-bound user local; source locals carry disambiguator 0.
    fn local(&mut self, name: &str) -> LocalVariable {
        LocalVariable::new(self.symbols.names_mut().intern(name), 0)
    }

    fn build(&self, body: Expr) -> (MethodCfg, Vec<Diagnostic>) {
        let mut sink = DiagnosticSink::new();
        let built = CfgBuilder::build_method(&self.symbols, self.method, &body, &mut sink)
            .expect("build should succeed");
        sanity::sanity_check(&built.cfg).expect("sanity check");
        (built, sink.into_vec())
    }

    /// Builds and additionally runs the defined-before-use dataflow with
    /// `formals` preseeded.
    fn build_checked(&self, body: Expr, formals: &[LocalVariable]) -> (MethodCfg, Vec<Diagnostic>) {
        let (built, diagnostics) = self.build(body);
        sanity::check_dominance(&built.cfg, formals).expect("dominance check");
        (built, diagnostics)
    }
}

fn ops(built: &MethodCfg, block: BlockId) -> Vec<&Op> {
    built.cfg.block(block).instructions.iter().map(|i| &i.op).collect()
}

// ── Straight-line lowering ──────────────────────────────────

#[test]
fn assign_literal_is_single_block() {
    let mut fix = Fixture::new();
    let a = fix.local("a");
    let (built, diagnostics) = fix.build_checked(assign(read(a), int(1)), &[]);

    assert!(diagnostics.is_empty());
    // Only the entry and dead blocks exist.
    assert_eq!(built.cfg.block_count(), 2);

    let entry = built.cfg.entry();
    let instructions = &built.cfg.block(entry).instructions;
    assert!(matches!(instructions[0].op, Op::Literal(LiteralValue::Int(1))));
    assert_eq!(instructions[0].target, a);
    assert!(matches!(instructions[1].op, Op::Ident(local) if local == a));
    assert!(matches!(instructions[2].op, Op::Return(_)));

    // Terminal: the continuation closes into dead.
    let exit = built.cfg.block(entry).exit.unwrap();
    assert!(exit.is_unconditional());
    assert_eq!(exit.then_block, built.cfg.dead_block());
}

#[test]
fn pure_literal_walk_is_one_instruction() {
    let fix = Fixture::new();
    let mut sink = DiagnosticSink::new();
    let mut builder = CfgBuilder::new(&fix.symbols, fix.method, &mut sink);
    let target = LocalVariable::new(names::STAT_TEMP, 100);
    let ctx = CfgContext::method_entry(target);

    let entry = builder.cfg.entry();
    let cont = builder.walk(&ctx, &int(42), entry).unwrap();

    assert_eq!(cont, entry);
    assert_eq!(builder.cfg.block(entry).instructions.len(), 1);
    assert_eq!(builder.cfg.block_count(), 2);
}

#[test]
fn building_twice_yields_isomorphic_graphs() {
    let mut fix = Fixture::new();
    let a = fix.local("a");
    let c = fix.local("c");
    let body = || assign(read(a), while_(read(c), brk(int(7))));

    let (first, _) = fix.build(body());
    let (second, _) = fix.build(body());
    assert_eq!(first.cfg.show(&fix.symbols), second.cfg.show(&fix.symbols));
}

// ── If ──────────────────────────────────────────────────────

#[test]
fn if_lowers_to_diamond() {
    let mut fix = Fixture::new();
    let c = fix.local("c");
    let x = fix.local("x");
    let y = fix.local("y");
    let (built, _) = fix.build_checked(if_(read(c), read(x), read(y)), &[c, x, y]);

    // entry, dead, then, else, merge
    assert_eq!(built.cfg.block_count(), 5);

    let entry = built.cfg.block(built.cfg.entry());
    let exit = entry.exit.unwrap();
    assert!(!exit.is_unconditional());
    assert_eq!(exit.cond.name, names::IF_TEMP);

    let then_exit = built.cfg.block(exit.then_block).exit.unwrap();
    let else_exit = built.cfg.block(exit.else_block).exit.unwrap();
    assert!(then_exit.is_unconditional());
    assert_eq!(then_exit.then_block, else_exit.then_block);

    let merge = built.cfg.block(then_exit.then_block);
    assert_eq!(merge.back_edges.len(), 2);
}

#[test]
fn if_with_one_diverging_branch_continues_in_the_live_one() {
    let mut fix = Fixture::new();
    let c = fix.local("c");
    let (built, _) = fix.build_checked(if_(read(c), ret(int(1)), int(2)), &[c]);

    // entry, dead, then, else; no merge block is allocated.
    assert_eq!(built.cfg.block_count(), 4);

    let exit = built.cfg.block(built.cfg.entry()).exit.unwrap();
    // The then branch diverges through Return.
    let then_block = built.cfg.block(exit.then_block);
    assert!(then_block.instructions.iter().any(|i| matches!(i.op, Op::Return(_))));
    assert_eq!(then_block.exit.unwrap().then_block, built.cfg.dead_block());

    // The implicit method return lands in the else continuation.
    let else_block = built.cfg.block(exit.else_block);
    assert!(else_block.instructions.iter().any(|i| matches!(i.op, Op::Return(_))));
}

#[test]
fn if_with_both_branches_diverging_returns_dead() {
    let mut fix = Fixture::new();
    let c = fix.local("c");
    let (built, _) = fix.build(if_(read(c), ret(int(1)), ret(int(2))));

    // The implicit method return was emitted into the dead block.
    let dead = built.cfg.block(built.cfg.dead_block());
    assert!(dead.exit.is_none());
    assert!(dead.instructions.iter().any(|i| matches!(i.op, Op::Return(_))));
}

// ── While / break / next ────────────────────────────────────

#[test]
fn while_break_assigns_through_the_double_hop() {
    let mut fix = Fixture::new();
    let a = fix.local("a");
    let c = fix.local("c");
    let (built, diagnostics) = fix.build_checked(assign(read(a), while_(read(c), brk(int(7)))), &[c]);
    assert!(diagnostics.is_empty());

    // entry jumps to the loop header.
    let entry_exit = built.cfg.block(built.cfg.entry()).exit.unwrap();
    assert!(entry_exit.is_unconditional());
    let header = built.cfg.block(entry_exit.then_block);
    assert_eq!(header.loop_depth, 1);

    let header_exit = header.exit.unwrap();
    assert_eq!(header_exit.cond.name, names::WHILE_TEMP);
    let body = built.cfg.block(header_exit.then_block);
    let break_not_called = built.cfg.block(header_exit.else_block);

    // Body: 7 -> <return_temp>, then the double hop into `a`.
    assert!(matches!(body.instructions[0].op, Op::Literal(LiteralValue::Int(7))));
    assert_eq!(body.instructions[1].target.name, names::BLOCK_BREAK_ASSIGN);
    assert_eq!(body.instructions[2].target, a);
    assert!(
        matches!(body.instructions[2].op, Op::Ident(src) if src.name == names::BLOCK_BREAK_ASSIGN)
    );

    // The fall-out path synthesizes `a = nil`.
    let nil_assign = &break_not_called.instructions[0];
    assert!(nil_assign.synthetic);
    assert_eq!(nil_assign.target, a);
    assert!(matches!(nil_assign.op, Op::Literal(LiteralValue::Nil)));

    // break hops to the continue block, same place the fall-out drains to.
    let continue_block = break_not_called.exit.unwrap().then_block;
    assert_eq!(body.exit.unwrap().then_block, continue_block);
    assert_eq!(built.cfg.block(continue_block).back_edges.len(), 2);
}

#[test]
fn while_loop_back_edge_reenters_the_header() {
    let mut fix = Fixture::new();
    let c = fix.local("c");
    let x = fix.local("x");
    let (built, _) = fix.build_checked(while_(read(c), read(x)), &[c, x]);

    let header_id = built.cfg.block(built.cfg.entry()).exit.unwrap().then_block;
    let header = built.cfg.block(header_id);
    let body_id = header.exit.unwrap().then_block;
    assert_eq!(built.cfg.block(body_id).exit.unwrap().then_block, header_id);
    assert!(header.back_edges.contains(&body_id));
}

#[test]
fn break_outside_a_loop_reports_and_goes_dead() {
    let fix = Fixture::new();
    let (built, diagnostics) = fix.build(brk(int(1)));

    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code.as_ref().unwrap().0, "C0003");
    let entry = built.cfg.block(built.cfg.entry());
    assert_eq!(entry.exit.unwrap().then_block, built.cfg.dead_block());
}

#[test]
fn next_outside_a_loop_reports_and_goes_dead() {
    let fix = Fixture::new();
    let (_, diagnostics) = fix.build(nxt(empty()));
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code.as_ref().unwrap().0, "C0003");
}

#[test]
fn statements_after_a_return_land_in_the_dead_block() {
    let mut fix = Fixture::new();
    let x = fix.local("x");
    let (built, diagnostics) = fix.build(seq(vec![ret(int(1))], read(x)));

    assert!(diagnostics.is_empty());
    let dead = built.cfg.block(built.cfg.dead_block());
    assert!(dead.exit.is_none());
    // The trailing read was lowered, but into the dead block.
    assert!(dead.instructions.iter().any(|i| matches!(i.op, Op::Ident(l) if l == x)));
}

// ── T.absurd ────────────────────────────────────────────────

#[test]
fn absurd_on_a_local_emits_tabsurd() {
    let mut fix = Fixture::new();
    let x = fix.local("x");
    let body = send(constant(symbols::T_MODULE), names::ABSURD, vec![read(x)]);
    let (built, diagnostics) = fix.build_checked(body, &[x]);

    assert!(diagnostics.is_empty());
    let entry_ops = ops(&built, built.cfg.entry());
    assert!(entry_ops.iter().any(|op| matches!(op, Op::TAbsurd(_))));
}

#[test]
fn absurd_on_a_call_reports_and_emits_nothing() {
    let mut fix = Fixture::new();
    let x = fix.local("x");
    let call = send(read(x), names::IS_A_P, vec![]);
    let body = send(constant(symbols::T_MODULE), names::ABSURD, vec![call]);
    let (built, diagnostics) = fix.build(body);

    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code.as_ref().unwrap().0, "C0002");
    let entry_ops = ops(&built, built.cfg.entry());
    assert!(!entry_ops.iter().any(|op| matches!(op, Op::TAbsurd(_))));
}

#[test]
fn absurd_with_wrong_arity_reports() {
    let mut fix = Fixture::new();
    let x = fix.local("x");
    let body = send(constant(symbols::T_MODULE), names::ABSURD, vec![read(x), read(x)]);
    let (_, diagnostics) = fix.build(body);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code.as_ref().unwrap().0, "C0002");
}

// ── Array / Hash ────────────────────────────────────────────

#[test]
fn array_literal_builds_through_the_magic_module() {
    let fix = Fixture::new();
    let (built, _) = fix.build_checked(array(vec![int(1), int(2), int(3)]), &[]);

    let entry = built.cfg.block(built.cfg.entry());
    let magic_alias = entry
        .instructions
        .iter()
        .find(|i| matches!(i.op, Op::Alias(sym) if sym == symbols::MAGIC))
        .expect("magic alias");
    assert!(magic_alias.synthetic);

    let build_send = entry
        .instructions
        .iter()
        .find_map(|i| match &i.op {
            Op::Send(s) if s.method == names::BUILD_ARRAY => Some(s),
            _ => None,
        })
        .expect("build_array send");
    assert_eq!(build_send.args.len(), 3);
    assert_eq!(build_send.recv, magic_alias.target);
}

#[test]
fn hash_literal_walks_keys_then_values() {
    let mut fix = Fixture::new();
    let k = fix.local("k");
    let v = fix.local("v");
    let (built, _) = fix.build_checked(
        expr(ExprKind::Hash { keys: vec![read(k)], values: vec![read(v)] }),
        &[k, v],
    );

    let entry = built.cfg.block(built.cfg.entry());
    let build_send = entry
        .instructions
        .iter()
        .find_map(|i| match &i.op {
            Op::Send(s) if s.method == names::BUILD_HASH => Some(s),
            _ => None,
        })
        .expect("build_hash send");
    assert_eq!(build_send.args.len(), 2);
}

// ── Sends with blocks ───────────────────────────────────────

#[test]
fn send_with_block_builds_the_full_harness() {
    let mut fix = Fixture::new();
    let items = fix.local("items");
    let x = fix.local("x");
    let each = fix.symbols.names_mut().intern("each");
    // `items.each { |x| x }`
    let block = BlockExpr {
        params: vec![BlockParam::positional(x, sp(0, 1))],
        body: Box::new(read(x)),
        span: sp(0, 1),
    };

    let body = send_block(read(items), each, vec![], block);
    let (built, diagnostics) = fix.build_checked(body, &[items]);
    assert!(diagnostics.is_empty());

    // The send itself lands in the entry block, carrying the link, and is
    // followed by the synthetic self capture.
    let entry = built.cfg.block(built.cfg.entry());
    let send_ins = entry
        .instructions
        .iter()
        .find(|i| matches!(&i.op, Op::Send(s) if s.link.is_some()))
        .expect("linked send");
    assert_eq!(send_ins.target.name, names::BLOCK_PRE_CALL_TEMP);
    let capture = entry
        .instructions
        .iter()
        .find(|i| i.target.name == names::SELF_RESTORE)
        .expect("self capture");
    assert!(capture.synthetic);

    // The header branches on <block_call> into the body.
    let header_id = entry.exit.unwrap().then_block;
    let header = built.cfg.block(header_id);
    assert_eq!(header.loop_depth, 1);
    let header_exit = header.exit.unwrap();
    assert_eq!(header_exit.cond, LocalVariable::block_call());

    // Block body: LoadSelf, LoadYieldParams, then positional binding by
    // index, in a fresh block scope.
    let body_block = built.cfg.block(header_exit.then_block);
    assert_eq!(body_block.block_scope_id, 1);
    assert!(matches!(body_block.instructions[0].op, Op::LoadSelf { .. }));
    assert_eq!(body_block.instructions[0].target, LocalVariable::self_local());
    assert!(matches!(body_block.instructions[1].op, Op::LoadYieldParams { .. }));
    assert!(matches!(body_block.instructions[2].op, Op::Literal(LiteralValue::Int(0))));
    assert!(body_block.instructions[2].synthetic);
    assert!(
        matches!(&body_block.instructions[3].op, Op::Send(s) if s.method == names::SQUARE_BRACKETS)
    );
    assert_eq!(body_block.instructions[3].target, x);

    // The body ends with a synthesized BlockReturn and loops to the header.
    let last = body_block.instructions.last().unwrap();
    assert!(matches!(last.op, Op::BlockReturn { .. }));
    assert!(last.synthetic);
    assert_eq!(body_block.exit.unwrap().then_block, header_id);

    // The other side solves constraints and drains into the post block,
    // which restores self.
    let solve_block = built.cfg.block(header_exit.else_block);
    assert!(matches!(solve_block.instructions[0].op, Op::SolveConstraint { .. }));
    let post = built.cfg.block(solve_block.exit.unwrap().then_block);
    let restore = &post.instructions[0];
    assert!(restore.synthetic);
    assert_eq!(restore.target, LocalVariable::self_local());
    assert!(matches!(restore.op, Op::Ident(src) if src.name == names::SELF_RESTORE));
}

#[test]
fn rest_formal_at_front_binds_the_whole_tuple() {
    let mut fix = Fixture::new();
    let items = fix.local("items");
    let rest = fix.local("rest");
    let each = fix.symbols.names_mut().intern("each");
    let block = BlockExpr {
        params: vec![BlockParam { repeated: true, ..BlockParam::positional(rest, sp(0, 1)) }],
        body: Box::new(int(0)),
        span: sp(0, 1),
    };
    let (built, _) = fix.build_checked(send_block(read(items), each, vec![], block), &[items]);

    let body_block = built
        .cfg
        .blocks()
        .find(|b| b.instructions.iter().any(|i| matches!(i.op, Op::LoadYieldParams { .. })))
        .expect("block body");
    let binding = body_block
        .instructions
        .iter()
        .find(|i| i.target == rest)
        .expect("rest binding");
    // Bound to the yielded tuple itself, not an index into it.
    assert!(matches!(binding.op, Op::Ident(_)));
}

#[test]
fn rest_formal_after_positionals_is_untyped() {
    let mut fix = Fixture::new();
    let items = fix.local("items");
    let first = fix.local("first");
    let rest = fix.local("rest");
    let each = fix.symbols.names_mut().intern("each");
    let block = BlockExpr {
        params: vec![
            BlockParam::positional(first, sp(0, 1)),
            BlockParam { repeated: true, ..BlockParam::positional(rest, sp(0, 1)) },
        ],
        body: Box::new(int(0)),
        span: sp(0, 1),
    };
    let (built, _) = fix.build_checked(send_block(read(items), each, vec![], block), &[items]);

    let body_block = built
        .cfg
        .blocks()
        .find(|b| b.instructions.iter().any(|i| matches!(i.op, Op::LoadYieldParams { .. })))
        .expect("block body");
    let binding = body_block
        .instructions
        .iter()
        .find(|i| i.target == rest)
        .expect("rest binding");
    assert!(matches!(binding.op, Op::Alias(sym) if sym == symbols::UNTYPED));
}

#[test]
fn next_inside_a_block_emits_blockreturn_then_reenters_the_header() {
    let mut fix = Fixture::new();
    let items = fix.local("items");
    let each = fix.symbols.names_mut().intern("each");
    let block = BlockExpr {
        params: vec![],
        body: Box::new(nxt(int(5))),
        span: sp(0, 1),
    };
    let (built, diagnostics) = fix.build_checked(send_block(read(items), each, vec![], block), &[items]);
    assert!(diagnostics.is_empty());

    let body_block = built
        .cfg
        .blocks()
        .find(|b| b.instructions.iter().any(|i| matches!(i.op, Op::LoadYieldParams { .. })))
        .expect("block body");
    let block_return = body_block
        .instructions
        .iter()
        .find(|i| matches!(i.op, Op::BlockReturn { .. }))
        .expect("block return");
    assert!(matches!(block_return.op, Op::BlockReturn { value, .. } if value.name == names::NEXT_TEMP));

    // next re-enters the header, where <block_call> decides the next round.
    let header_id = built.cfg.block(built.cfg.entry()).exit.unwrap().then_block;
    assert_eq!(body_block.exit.unwrap().then_block, header_id);
}

#[test]
fn break_inside_a_block_exits_to_the_post_block() {
    let mut fix = Fixture::new();
    let a = fix.local("a");
    let items = fix.local("items");
    let each = fix.symbols.names_mut().intern("each");
    let block = BlockExpr {
        params: vec![],
        body: Box::new(brk(int(9))),
        span: sp(0, 1),
    };
    let body = assign(read(a), send_block(read(items), each, vec![], block));
    let (built, diagnostics) = fix.build_checked(body, &[items]);
    assert!(diagnostics.is_empty());

    let body_block = built
        .cfg
        .blocks()
        .find(|b| b.instructions.iter().any(|i| matches!(i.op, Op::LoadYieldParams { .. })))
        .expect("block body");
    // The break value flows through the double hop into `a` and exits
    // straight to the post block, skipping the constraint solve.
    assert!(body_block.instructions.iter().any(|i| i.target == a));
    let post_id = body_block.exit.unwrap().then_block;
    let post = built.cfg.block(post_id);
    assert!(post.instructions.iter().any(
        |i| matches!(i.op, Op::Ident(src) if src.name == names::SELF_RESTORE)
    ));
}

// ── Rescue ──────────────────────────────────────────────────

fn rescue_case(fix: &mut Fixture, exceptions: Vec<Expr>, body: Expr) -> (RescueCase, LocalVariable) {
    let e = fix.local("e");
    let case = RescueCase {
        exceptions,
        var: Box::new(read(e)),
        body: Box::new(body),
        span: sp(0, 1),
    };
    (case, e)
}

#[test]
fn rescue_builds_the_two_gate_skeleton() {
    let mut fix = Fixture::new();
    let error_class = fix.symbols.define_class("ParseError", symbols::ROOT);
    let (case, e) = rescue_case(&mut fix, vec![constant(error_class)], int(2));
    let body = expr(ExprKind::Rescue {
        body: Box::new(int(1)),
        cases: vec![case],
        else_: Box::new(empty()),
        ensure: Box::new(int(3)),
    });
    // The handler-exhaustion path deliberately leaves the result local
    // unassigned (the exception propagates), so only the structural checks
    // run here.
    let (built, diagnostics) = fix.build(body);
    assert!(diagnostics.is_empty());

    // Two Unanalyzable gates plus the opaque bound exception.
    let unanalyzable: Vec<_> = built
        .cfg
        .blocks()
        .flat_map(|b| b.instructions.iter())
        .filter(|i| matches!(i.op, Op::Unanalyzable))
        .collect();
    assert_eq!(unanalyzable.len(), 3);
    assert!(unanalyzable.iter().any(|i| i.target == e));
    assert!(unanalyzable.iter().any(|i| i.target.name == names::RESCUE_START_TEMP));
    assert!(unanalyzable.iter().any(|i| i.target.name == names::RESCUE_END_TEMP));

    // Exactly one is_a? test, against the rescued class.
    let isa_sends: Vec<_> = built
        .cfg
        .blocks()
        .flat_map(|b| b.instructions.iter())
        .filter_map(|i| match &i.op {
            Op::Send(s) if s.method == names::IS_A_P => Some(s),
            _ => None,
        })
        .collect();
    assert_eq!(isa_sends.len(), 1);
    assert_eq!(isa_sends[0].recv, e);

    // Handler exhaustion raises again: <goto_dead_temp> = true, and the
    // ensure tail branches on it into dead versus the continuation.
    let ensure_exit = built
        .cfg
        .blocks()
        .filter_map(|b| b.exit)
        .find(|exit| exit.cond.name == names::GOTO_DEAD_TEMP)
        .expect("ensure exit");
    assert_eq!(ensure_exit.then_block, built.cfg.dead_block());
    assert_ne!(ensure_exit.else_block, built.cfg.dead_block());
}

#[test]
fn rescue_without_classes_matches_the_default_base_exception() {
    let mut fix = Fixture::new();
    let (case, _) = rescue_case(&mut fix, vec![], int(2));
    let body = expr(ExprKind::Rescue {
        body: Box::new(int(1)),
        cases: vec![case],
        else_: Box::new(empty()),
        ensure: Box::new(empty()),
    });
    let (built, _) = fix.build(body);

    let default_alias = built
        .cfg
        .blocks()
        .flat_map(|b| b.instructions.iter())
        .any(|i| matches!(i.op, Op::Alias(sym) if sym == symbols::STANDARD_ERROR));
    assert!(default_alias);
}

#[test]
fn retry_reenters_the_rescue_start() {
    let mut fix = Fixture::new();
    let (case, _) = rescue_case(&mut fix, vec![], expr(ExprKind::Retry));
    let body = expr(ExprKind::Rescue {
        body: Box::new(int(1)),
        cases: vec![case],
        else_: Box::new(empty()),
        ensure: Box::new(empty()),
    });
    let (built, diagnostics) = fix.build(body);
    assert!(diagnostics.is_empty());

    // The rescue entry has a back edge from the retrying case body.
    let rescue_start_id = built.cfg.block(built.cfg.entry()).exit.unwrap().then_block;
    let rescue_start = built.cfg.block(rescue_start_id);
    assert!(rescue_start.back_edges.len() >= 2);
}

#[test]
fn retry_outside_a_rescue_reports() {
    let fix = Fixture::new();
    let (_, diagnostics) = fix.build(expr(ExprKind::Retry));
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code.as_ref().unwrap().0, "C0003");
}

// ── Aliases and identifiers ─────────────────────────────────

#[test]
fn undeclared_variable_reports_once_and_reuses_the_local() {
    let mut fix = Fixture::new();
    let ivar = fix.symbols.names_mut().intern("@count");
    let uident = || expr(ExprKind::UnresolvedIdent { kind: IdentKind::Instance, name: ivar });
    let (built, diagnostics) = fix.build(seq(vec![uident()], uident()));

    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code.as_ref().unwrap().0, "C0001");
    assert_eq!(built.discovered_undeclared_fields.len(), 1);

    let cached = built.discovered_undeclared_fields[&ivar];
    let reads: Vec<_> = built
        .cfg
        .block(built.cfg.entry())
        .instructions
        .iter()
        .filter(|i| matches!(i.op, Op::Ident(src) if src == cached))
        .collect();
    assert_eq!(reads.len(), 2);
}

#[test]
fn declared_field_resolves_through_the_superclass() {
    let mut fix = Fixture::new();
    let base = fix.symbols.define_class("Base", symbols::ROOT);
    fix.symbols.set_superclass(fix.klass, base);
    let ivar = fix.symbols.names_mut().intern("@count");
    let field = fix.symbols.define_field(ivar, base);

    let body = expr(ExprKind::UnresolvedIdent { kind: IdentKind::Instance, name: ivar });
    let (built, diagnostics) = fix.build(body);

    assert!(diagnostics.is_empty());
    assert!(built.aliases.contains_key(&field));
    assert!(built.discovered_undeclared_fields.is_empty());
}

#[test]
fn constant_reads_alias_directly() {
    let mut fix = Fixture::new();
    let konst = fix.symbols.define_class("Config", symbols::ROOT);
    let body = seq(vec![constant(konst)], constant(konst));
    let (built, _) = fix.build(body);

    // Constant reads emit Alias instructions; the aliases map is only for
    // assignment targets and field reads.
    assert_eq!(built.aliases.len(), 0);
    let aliases: Vec<_> = built
        .cfg
        .block(built.cfg.entry())
        .instructions
        .iter()
        .filter(|i| matches!(i.op, Op::Alias(sym) if sym == konst))
        .collect();
    assert_eq!(aliases.len(), 2);
}

#[test]
fn constant_assignment_caches_one_alias_local() {
    let mut fix = Fixture::new();
    let konst = fix.symbols.define_class("Config", symbols::ROOT);
    let body = seq(
        vec![assign(constant(konst), int(1))],
        assign(constant(konst), int(2)),
    );
    let (built, _) = fix.build(body);

    assert_eq!(built.aliases.len(), 1);
    let alias_local = built.aliases[&konst];
    let writes: Vec<_> = built
        .cfg
        .block(built.cfg.entry())
        .instructions
        .iter()
        .filter(|i| i.target == alias_local)
        .collect();
    assert_eq!(writes.len(), 2);
}

#[test]
fn stub_module_constant_aliases_untyped() {
    let fix = Fixture::new();
    let (built, _) = fix.build(constant(symbols::STUB_MODULE));
    let entry_ops = ops(&built, built.cfg.entry());
    assert!(entry_ops.iter().any(|op| matches!(op, Op::Alias(sym) if *sym == symbols::UNTYPED)));
}

#[test]
fn nested_constant_qualifier_is_kept_for_the_ide() {
    let mut fix = Fixture::new();
    let outer = fix.symbols.define_class("Net", symbols::ROOT);
    let inner = fix.symbols.define_class("Http", outer);
    let body = expr(ExprKind::ConstantLit {
        symbol: inner,
        qualifier: Some(Box::new(constant(outer))),
    });
    let (built, _) = fix.build(body);

    let keep = built
        .cfg
        .block(built.cfg.entry())
        .instructions
        .iter()
        .find(|i| i.target.name == names::KEEP_FOR_IDE)
        .expect("keep_for_ide throwaway");
    assert!(matches!(keep.op, Op::Alias(sym) if sym == outer));
}

// ── Cast pinning ────────────────────────────────────────────

#[test]
fn let_cast_pins_the_target_below_any_loop() {
    let mut fix = Fixture::new();
    let a = fix.local("a");
    let body = assign(
        read(a),
        expr(ExprKind::Cast {
            arg: Box::new(int(1)),
            ty: TypeRef(7),
            cast: CastKind::Let,
        }),
    );
    let (built, _) = fix.build_checked(body, &[]);

    assert_eq!(built.cfg.min_loops.get(&a), Some(&crate::MIN_LOOP_LET));
    // The pinned local is the target of at least one instruction.
    let assigned = built
        .cfg
        .blocks()
        .flat_map(|b| b.instructions.iter())
        .any(|i| i.target == a);
    assert!(assigned);
}

#[test]
fn plain_cast_does_not_pin() {
    let fix = Fixture::new();
    let body = expr(ExprKind::Cast {
        arg: Box::new(int(1)),
        ty: TypeRef(7),
        cast: CastKind::Cast,
    });
    let (built, _) = fix.build(body);
    assert!(built.cfg.min_loops.is_empty());
}

// ── Internal errors ─────────────────────────────────────────

#[test]
fn class_def_in_expression_position_is_an_internal_error() {
    let fix = Fixture::new();
    let mut sink = DiagnosticSink::new();
    let body = seq(vec![expr(ExprKind::ClassDef)], empty());
    let result = CfgBuilder::build_method(&fix.symbols, fix.method, &body, &mut sink);

    assert!(result.is_err());
    let diagnostics = sink.into_vec();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code.as_ref().unwrap().0, "C0900");
    // Breadcrumbs name the enclosing nodes the error unwound through.
    assert!(diagnostics[0].notes.iter().any(|n| n.contains("Seq")));
}

#[test]
fn bare_block_is_an_internal_error() {
    let mut fix = Fixture::new();
    let x = fix.local("x");
    let mut sink = DiagnosticSink::new();
    let body = expr(ExprKind::Block(BlockExpr {
        params: vec![],
        body: Box::new(read(x)),
        span: sp(0, 1),
    }));
    assert!(CfgBuilder::build_method(&fix.symbols, fix.method, &body, &mut sink).is_err());
}

#[test]
fn send_as_assignment_target_is_an_internal_error() {
    let mut fix = Fixture::new();
    let x = fix.local("x");
    let mut sink = DiagnosticSink::new();
    let lhs = send(read(x), names::IS_A_P, vec![]);
    let body = assign(lhs, int(1));
    assert!(CfgBuilder::build_method(&fix.symbols, fix.method, &body, &mut sink).is_err());
}

// ── Display ─────────────────────────────────────────────────

#[test]
fn show_renders_blocks_and_exits() {
    let mut fix = Fixture::new();
    let a = fix.local("a");
    let (built, _) = fix.build(assign(read(a), int(1)));
    let rendered = built.cfg.show(&fix.symbols);

    assert!(rendered.contains("bb0"));
    assert!(rendered.contains("a = 1"));
    assert!(rendered.contains("-> bb1"));

    // show() is the to_string convenience over the Display adapter.
    assert_eq!(rendered, format!("{}", built.cfg.display(&fix.symbols)));
}
