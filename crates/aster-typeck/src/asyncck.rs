//! Control-flow-sensitive async task scheduling checks.
//!
//! For each function body a forward walk maintains two sets per program
//! point:
//!
//! - `started`: tasks started on *every* path reaching the point;
//! - `may_start`: tasks started on *some* path.
//!
//! Branch merges intersect `started` and union `may_start`, which is what
//! makes `Start` in mutually exclusive branches legal while a sequential
//! duplicate is not. `Wait` requires membership in `started`; `Start`
//! conflicts with membership in `may_start`.

use aster_common::diag::Diagnostics;
use aster_common::span::Span;
use aster_ir::ir;
use rustc_hash::FxHashSet;

/// Check one function body.
pub fn check_body(body: &ir::Block, diags: &mut Diagnostics) {
    let mut flow = Flow::default();
    walk_block(body, &mut flow, diags);
}

#[derive(Debug, Default, Clone)]
struct Flow {
    started: FxHashSet<String>,
    may_start: FxHashSet<String>,
}

impl Flow {
    /// Merge the outcomes of exclusive branches into the fall-through
    /// state: guaranteed starts intersect, possible starts union.
    fn merge_branches(&mut self, branches: Vec<Flow>) {
        let mut started: Option<FxHashSet<String>> = None;
        for branch in &branches {
            started = Some(match started {
                Some(acc) => acc.intersection(&branch.started).cloned().collect(),
                None => branch.started.clone(),
            });
        }
        if let Some(started) = started {
            self.started = started;
        }
        for branch in branches {
            self.may_start.extend(branch.may_start);
        }
    }
}

fn walk_block(block: &ir::Block, flow: &mut Flow, diags: &mut Diagnostics) {
    for stmt in &block.statements {
        walk_stmt(stmt, flow, diags);
    }
}

fn walk_stmt(stmt: &ir::Stmt, flow: &mut Flow, diags: &mut Diagnostics) {
    match stmt {
        ir::Stmt::Start(start) => {
            if flow.may_start.contains(&start.task) {
                diags.emit(
                    "E502",
                    start.span.unwrap_or(Span::DUMMY),
                    &[("name", start.task.clone())],
                );
            }
            flow.started.insert(start.task.clone());
            flow.may_start.insert(start.task.clone());
        }
        ir::Stmt::Wait(wait) => {
            if !flow.started.contains(&wait.task) {
                diags.emit(
                    "E501",
                    wait.span.unwrap_or(Span::DUMMY),
                    &[("name", wait.task.clone())],
                );
            }
        }
        ir::Stmt::Match(stmt) => {
            let mut branches = Vec::with_capacity(stmt.arms.len() + 1);
            for arm in &stmt.arms {
                let mut branch = flow.clone();
                walk_block(&arm.body, &mut branch, diags);
                branches.push(branch);
            }
            if !is_exhaustive(&stmt.arms) {
                // Fall-through path: the entry state joins the merge.
                branches.push(flow.clone());
            }
            flow.merge_branches(branches);
        }
        ir::Stmt::Try(stmt) => {
            // The handler may run after any prefix of the try body, so the
            // two are merged like exclusive branches.
            let mut try_branch = flow.clone();
            walk_block(&stmt.body, &mut try_branch, diags);
            let mut catch_branch = flow.clone();
            walk_block(&stmt.handler, &mut catch_branch, diags);
            flow.merge_branches(vec![try_branch, catch_branch]);
        }
        ir::Stmt::Workflow(stmt) => {
            walk_block(&stmt.body, flow, diags);
        }
        ir::Stmt::Let(_) | ir::Stmt::Return(_) | ir::Stmt::ExprStmt(_) | ir::Stmt::Error(_) => {}
    }
}

/// Whether the arm set covers every value of the scrutinee without help
/// from enum definitions: a wildcard or binding arm, or both booleans.
fn is_exhaustive(arms: &[ir::MatchArm]) -> bool {
    let mut saw_true = false;
    let mut saw_false = false;
    for arm in arms {
        match &arm.pattern {
            ir::Pattern::Wildcard | ir::Pattern::Bind { .. } => return true,
            ir::Pattern::Bool { value: true } => saw_true = true,
            ir::Pattern::Bool { value: false } => saw_false = true,
            _ => {}
        }
    }
    saw_true && saw_false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_of(src: &str) -> ir::Block {
        let src = format!("Module demo.\n{src}");
        let mut diags = Diagnostics::new();
        let ast =
            aster_parser::parse_source(&src, &aster_lexer::Lexicon::english(), &mut diags);
        assert!(diags.is_empty(), "{:?}", diags.entries());
        let module = aster_ir::lower_module(ast);
        match module.decls.into_iter().next().unwrap() {
            ir::Decl::Func(func) => func.body,
            other => panic!("expected Func, got {other:?}"),
        }
    }

    fn check(src: &str) -> Vec<aster_common::diag::Diagnostic> {
        let body = body_of(src);
        let mut diags = Diagnostics::new();
        check_body(&body, &mut diags);
        diags.finish()
    }

    #[test]
    fn wait_before_start_is_reported_once() {
        let entries = check(
            "Rule r produce Int: Wait for job. Start job as async launch(). Wait for job.",
        );
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].code, "E501");
        assert!(entries[0].message.contains("job"));
    }

    #[test]
    fn exclusive_branches_both_starting_is_fine() {
        let src = "Rule r given flag: Bool, produce Int:\n  If flag:\n    Start s as async a().\n  Otherwise:\n    Start s as async b().\n  Wait for s.\n";
        assert!(check(src).is_empty());
    }

    #[test]
    fn sequential_duplicate_start_is_reported_once() {
        let entries = check(
            "Rule r produce Int: Start s as async a(). Start s as async b(). Wait for s.",
        );
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].code, "E502");
        assert!(entries[0].message.contains("s"));
    }

    #[test]
    fn start_after_exclusive_starts_conflicts() {
        let src = "Rule r given flag: Bool, produce Int:\n  If flag:\n    Start s as async a().\n  Otherwise:\n    Start s as async b().\n  Start s as async c().\n";
        let entries = check(src);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].code, "E502");
    }

    #[test]
    fn start_in_one_branch_only_does_not_guarantee() {
        let src = "Rule r given flag: Bool, produce Int:\n  If flag:\n    Start s as async a().\n  Wait for s.\n";
        let entries = check(src);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].code, "E501");
    }

    #[test]
    fn match_arms_merge_like_branches() {
        let src = "Rule r given n: Int, produce Int:\n  Match n:\n    When 1: Start s as async a().\n    Otherwise: Start s as async b().\n  Wait for s.\n";
        assert!(check(src).is_empty());
    }

    #[test]
    fn non_exhaustive_match_does_not_guarantee_start() {
        let src = "Rule r given n: Int, produce Int:\n  Match n:\n    When 1: Start s as async a().\n  Wait for s.\n";
        let entries = check(src);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].code, "E501");
    }

    #[test]
    fn try_catch_merges_conservatively() {
        let src = "Rule r produce Int:\n  Try: Start s as async a(). Catch e: Return 0.\n  Wait for s.\n";
        let entries = check(src);
        // The catch path never started `s`.
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].code, "E501");
    }

    #[test]
    fn workflow_is_sequential() {
        let src = "Rule r produce Int:\n  Workflow:\n    Start s as async a().\n    Wait for s.\n  Return 1.\n";
        assert!(check(src).is_empty());
    }
}
