//! Last-node analysis.
//!
//! Decides whether an expression's evaluation is the final action on
//! every execution path through its enclosing body. The analysis is
//! purely structural: it looks at the statement kinds between the
//! expression and the declaration body, never at values or flow state.
//!
//! The decision itself is [`is_last_path`], a pure function over the
//! ancestor-step view, so the rule is testable without an arena;
//! [`is_last_node`] extracts that view from a live tree.

use asyncify_syntax::{Node, NodeArena, NodeIndex, SyntaxKind};

/// Statement-level kinds as the analysis sees them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    /// A return statement whose operand is the expression under test.
    Return,
    /// An expression statement whose expression is the one under test.
    Expression,
    /// A plain block.
    Block,
    /// if / switch-like constructs.
    Branch,
    /// while / do / for constructs.
    Loop,
    /// try / catch / finally.
    Try,
    /// The declaration body boundary.
    Body,
    /// Anything else.
    Other,
}

/// One ancestor on the path from the expression to the declaration body.
#[derive(Debug, Clone, Copy)]
pub struct AncestorStep {
    pub kind: StatementKind,
    /// Whether the position we arrived from is the last reachable slot of
    /// this construct (the whole operand of a return, the final statement
    /// of a block).
    pub is_final: bool,
}

/// Pure last-node rule over an ancestor view, innermost step first.
///
/// The path proves the expression last iff it starts at a return or
/// expression statement holding the expression as its entire operand,
/// passes only through blocks in final position, and terminates at the
/// body boundary. Any branch, loop, or try ancestor disproves it: code
/// after the expression could run on some path.
pub fn is_last_path(steps: &[AncestorStep]) -> bool {
    let mut steps = steps.iter();
    match steps.next() {
        Some(step)
            if matches!(step.kind, StatementKind::Return | StatementKind::Expression)
                && step.is_final => {}
        _ => return false,
    }
    for step in steps {
        match step.kind {
            StatementKind::Block if step.is_final => {}
            StatementKind::Body => return true,
            _ => return false,
        }
    }
    false
}

/// Whether `expression` is the last node executed on every path through
/// its enclosing declaration body.
pub fn is_last_node(arena: &NodeArena, expression: NodeIndex) -> bool {
    is_last_path(&ancestor_steps(arena, expression))
}

/// Build the ancestor-step view for an expression: its directly enclosing
/// statement, then every construct up to (and including) the declaration
/// body.
fn ancestor_steps(arena: &NodeArena, expression: NodeIndex) -> Vec<AncestorStep> {
    let mut steps = Vec::new();

    let stmt = arena.parent(expression);
    let first = match arena.get(stmt) {
        Some(Node::ReturnStatement(ret)) => AncestorStep {
            kind: StatementKind::Return,
            is_final: ret.expression == expression,
        },
        Some(Node::ExpressionStatement(es)) => AncestorStep {
            kind: StatementKind::Expression,
            is_final: es.expression == expression,
        },
        _ => return steps,
    };
    steps.push(first);

    let mut current = stmt;
    let mut parent = arena.parent(current);
    while parent.is_some() {
        match arena.get(parent) {
            Some(Node::Block(block)) => {
                let is_final = block.statements.last() == current;
                let owner = arena.parent(parent);
                if arena.kind(owner).is_some_and(|k| k.is_function_like()) {
                    steps.push(AncestorStep {
                        kind: StatementKind::Block,
                        is_final,
                    });
                    steps.push(AncestorStep {
                        kind: StatementKind::Body,
                        is_final: true,
                    });
                    return steps;
                }
                steps.push(AncestorStep {
                    kind: StatementKind::Block,
                    is_final,
                });
            }
            Some(node) => {
                let kind = match node.kind() {
                    SyntaxKind::IfStatement => StatementKind::Branch,
                    SyntaxKind::WhileStatement | SyntaxKind::ForStatement => StatementKind::Loop,
                    SyntaxKind::TryStatement | SyntaxKind::CatchClause => StatementKind::Try,
                    _ => StatementKind::Other,
                };
                steps.push(AncestorStep {
                    kind,
                    is_final: false,
                });
            }
            None => break,
        }
        current = parent;
        parent = arena.parent(current);
    }
    steps
}
