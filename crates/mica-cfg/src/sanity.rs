// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Structural invariant checks over a built CFG.
//!
//! `sanity_check` validates the graph shape: exits set exactly once,
//! back-edge multisets mirroring outgoing edges, a quiescent dead block,
//! and block-entry placement of the load instructions. `check_dominance`
//! runs a forward must-be-defined dataflow to confirm every local read is
//! preceded by an assignment on all paths, and every `SolveConstraint` by
//! the `Send` that produced its link.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use mica_core::LocalVariable;

use crate::cfg::{BlockId, Cfg};
use crate::instructions::Op;

/// Validates the structural invariants of a completed graph.
pub fn sanity_check(cfg: &Cfg) -> Result<(), String> {
    let dead = cfg.dead_block();

    if cfg.block(dead).exit.is_some() {
        return Err("dead block must have no outgoing edges".to_string());
    }

    // Outgoing edge multiset per (pred, succ) pair.
    let mut outgoing: HashMap<(BlockId, BlockId), usize> = HashMap::new();
    for block in cfg.blocks() {
        if block.id == dead {
            continue;
        }
        let exit = match &block.exit {
            Some(exit) => exit,
            None => return Err(format!("block {} has no exit", block.id.0)),
        };
        if exit.cond.exists() && exit.then_block == exit.else_block {
            return Err(format!(
                "block {} branches to bb{} on both edges",
                block.id.0, exit.then_block.0
            ));
        }
        *outgoing.entry((block.id, exit.then_block)).or_default() += 1;
        if exit.else_block != exit.then_block {
            *outgoing.entry((block.id, exit.else_block)).or_default() += 1;
        }
    }

    // Back-edge multiset must mirror it.
    let mut incoming: HashMap<(BlockId, BlockId), usize> = HashMap::new();
    for block in cfg.blocks() {
        for &pred in &block.back_edges {
            *incoming.entry((pred, block.id)).or_default() += 1;
        }
    }
    if outgoing != incoming {
        return Err("back-edge multiset does not mirror outgoing edges".to_string());
    }

    // LoadSelf/LoadYieldParams only at the entry of their block body.
    for block in cfg.blocks() {
        for (i, ins) in block.instructions.iter().enumerate() {
            match &ins.op {
                Op::LoadSelf { link, .. } | Op::LoadYieldParams { link } => {
                    if block.block_scope_id != link.block_scope_id {
                        return Err(format!(
                            "load instruction in bb{} outside its block scope",
                            block.id.0
                        ));
                    }
                    if i > 1 {
                        return Err(format!(
                            "load instruction in bb{} not at block entry",
                            block.id.0
                        ));
                    }
                }
                _ => {}
            }
        }
    }

    Ok(())
}

/// Facts tracked by the dominance dataflow: assigned locals and the link
/// tokens materialized by `Send`s carrying a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Fact {
    Assigned(LocalVariable),
    LinkSent(usize),
}

/// Checks that every local read is assigned on all incoming paths, and
/// that every `SolveConstraint` is dominated by its `Send`.
///
/// `preseeded` names locals defined before the method body runs (formals);
/// `self` and `<block_call>` are always preseeded. Locals holding
/// unanalyzable values are ordinary targets, so no exemption is needed.
pub fn check_dominance(cfg: &Cfg, preseeded: &[LocalVariable]) -> Result<(), String> {
    let dead = cfg.dead_block();

    let mut seed: HashSet<Fact> = preseeded.iter().map(|&l| Fact::Assigned(l)).collect();
    seed.insert(Fact::Assigned(LocalVariable::self_local()));
    seed.insert(Fact::Assigned(LocalVariable::block_call()));

    // Forward must-analysis: facts holding at block entry, meet is
    // intersection. None stands for "not yet computed" (top).
    let mut entry_facts: Vec<Option<HashSet<Fact>>> = vec![None; cfg.block_count()];
    entry_facts[cfg.entry().0 as usize] = Some(seed.clone());

    let mut changed = true;
    while changed {
        changed = false;
        for block in cfg.blocks() {
            if block.id == dead {
                continue;
            }
            let Some(facts) = entry_facts[block.id.0 as usize].clone() else {
                continue;
            };
            let mut facts = facts;
            for ins in &block.instructions {
                transfer(&mut facts, &ins.op);
                facts.insert(Fact::Assigned(ins.target));
            }

            let Some(exit) = &block.exit else { continue };
            for succ in [exit.then_block, exit.else_block] {
                if succ == dead {
                    continue;
                }
                let slot = &mut entry_facts[succ.0 as usize];
                let updated = match slot {
                    None => Some(facts.clone()),
                    Some(existing) => {
                        let met: HashSet<Fact> =
                            existing.intersection(&facts).copied().collect();
                        if met == *existing {
                            None
                        } else {
                            Some(met)
                        }
                    }
                };
                if let Some(new_facts) = updated {
                    *slot = Some(new_facts);
                    changed = true;
                }
            }
        }
    }

    // With entry facts fixed, verify every read.
    for block in cfg.blocks() {
        if block.id == dead {
            continue;
        }
        let Some(facts) = entry_facts[block.id.0 as usize].clone() else {
            // Unreachable block; nothing flows through it.
            continue;
        };
        let mut facts = facts;
        for ins in &block.instructions {
            for read in op_reads(&ins.op) {
                if !facts.contains(&Fact::Assigned(read)) {
                    return Err(format!(
                        "bb{}: local read before assignment on some path",
                        block.id.0
                    ));
                }
            }
            if let Op::SolveConstraint { link, .. } = &ins.op {
                if !facts.contains(&Fact::LinkSent(Rc::as_ptr(link) as usize)) {
                    return Err(format!(
                        "bb{}: SolveConstraint not dominated by its Send",
                        block.id.0
                    ));
                }
            }
            transfer(&mut facts, &ins.op);
            facts.insert(Fact::Assigned(ins.target));
        }
        if let Some(exit) = &block.exit {
            if exit.cond.exists() && !facts.contains(&Fact::Assigned(exit.cond)) {
                return Err(format!(
                    "bb{}: branch condition read before assignment",
                    block.id.0
                ));
            }
        }
    }

    Ok(())
}

fn transfer(facts: &mut HashSet<Fact>, op: &Op) {
    if let Op::Send(send) = op {
        if let Some(link) = &send.link {
            facts.insert(Fact::LinkSent(Rc::as_ptr(link) as usize));
        }
    }
}

fn op_reads(op: &Op) -> Vec<LocalVariable> {
    match op {
        Op::Literal(_) | Op::Alias(_) | Op::LoadYieldParams { .. } | Op::Unanalyzable => Vec::new(),
        Op::Ident(local) | Op::Return(local) | Op::TAbsurd(local) => vec![*local],
        Op::Send(send) => {
            let mut reads = vec![send.recv];
            reads.extend_from_slice(&send.args);
            reads
        }
        Op::BlockReturn { value, .. } => vec![*value],
        Op::LoadSelf { fallback, .. } => vec![*fallback],
        Op::SolveConstraint { result, .. } => vec![*result],
        Op::Cast { value, .. } => vec![*value],
    }
}
