//! Node model: base fields, payload structs, and the `Node` enum.

use serde::Serialize;

use crate::kind::SyntaxKind;
use crate::types::TypeId;

/// A handle to a node stored in a [`crate::arena::NodeArena`].
///
/// `NodeIndex::NONE` is the absent-node sentinel, used for optional child
/// slots (an `else` branch, a bare `return`, a missing body).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct NodeIndex(pub u32);

impl NodeIndex {
    pub const NONE: NodeIndex = NodeIndex(u32::MAX);

    pub fn is_none(self) -> bool {
        self == NodeIndex::NONE
    }

    pub fn is_some(self) -> bool {
        !self.is_none()
    }
}

/// An ordered list of child node handles.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NodeList {
    pub nodes: Vec<NodeIndex>,
}

impl NodeList {
    pub fn new(nodes: Vec<NodeIndex>) -> NodeList {
        NodeList { nodes }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn last(&self) -> NodeIndex {
        self.nodes.last().copied().unwrap_or(NodeIndex::NONE)
    }
}

/// Common fields present in all nodes.
#[derive(Debug, Clone, Serialize)]
pub struct NodeBase {
    pub kind: SyntaxKind,
    /// Structural flags, see [`crate::flags::node_flags`].
    pub flags: u32,
    /// Declaration modifiers, see [`crate::flags::modifier_flags`].
    pub modifier_flags: u32,
    pub parent: NodeIndex,
    /// Unique node ID, assigned by the arena on insertion.
    pub id: u32,
}

impl NodeBase {
    pub fn new(kind: SyntaxKind) -> NodeBase {
        NodeBase {
            kind,
            flags: 0,
            modifier_flags: 0,
            parent: NodeIndex::NONE,
            id: 0,
        }
    }

    pub fn with_modifiers(kind: SyntaxKind, modifier_flags: u32) -> NodeBase {
        NodeBase {
            modifier_flags,
            ..NodeBase::new(kind)
        }
    }
}

// ---------------------------------------------------------------------------
// Declarations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct SourceFile {
    pub base: NodeBase,
    pub statements: NodeList,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassDeclaration {
    pub base: NodeBase,
    pub name: NodeIndex,
    /// Identifier naming the extended base class, or NONE.
    pub heritage_name: NodeIndex,
    pub members: NodeList,
}

#[derive(Debug, Clone, Serialize)]
pub struct MethodDeclaration {
    pub base: NodeBase,
    pub name: NodeIndex,
    pub parameters: NodeList,
    pub return_type: TypeId,
    /// Body block; NONE for abstract members.
    pub body: NodeIndex,
}

#[derive(Debug, Clone, Serialize)]
pub struct FunctionDeclaration {
    pub base: NodeBase,
    pub name: NodeIndex,
    pub parameters: NodeList,
    pub return_type: TypeId,
    pub body: NodeIndex,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParameterDeclaration {
    pub base: NodeBase,
    pub name: NodeIndex,
    pub declared_type: TypeId,
}

// ---------------------------------------------------------------------------
// Statements
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct Block {
    pub base: NodeBase,
    pub statements: NodeList,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExpressionStatement {
    pub base: NodeBase,
    pub expression: NodeIndex,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReturnStatement {
    pub base: NodeBase,
    pub expression: NodeIndex,
}

#[derive(Debug, Clone, Serialize)]
pub struct IfStatement {
    pub base: NodeBase,
    pub expression: NodeIndex,
    pub then_statement: NodeIndex,
    pub else_statement: NodeIndex,
}

#[derive(Debug, Clone, Serialize)]
pub struct WhileStatement {
    pub base: NodeBase,
    pub expression: NodeIndex,
    pub statement: NodeIndex,
}

#[derive(Debug, Clone, Serialize)]
pub struct ForStatement {
    pub base: NodeBase,
    pub initializer: NodeIndex,
    pub condition: NodeIndex,
    pub incrementor: NodeIndex,
    pub statement: NodeIndex,
}

#[derive(Debug, Clone, Serialize)]
pub struct TryStatement {
    pub base: NodeBase,
    pub try_block: NodeIndex,
    pub catch_clause: NodeIndex,
    pub finally_block: NodeIndex,
}

#[derive(Debug, Clone, Serialize)]
pub struct CatchClause {
    pub base: NodeBase,
    pub block: NodeIndex,
}

#[derive(Debug, Clone, Serialize)]
pub struct ThrowStatement {
    pub base: NodeBase,
    pub expression: NodeIndex,
}

#[derive(Debug, Clone, Serialize)]
pub struct BreakStatement {
    pub base: NodeBase,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContinueStatement {
    pub base: NodeBase,
}

#[derive(Debug, Clone, Serialize)]
pub struct VariableStatement {
    pub base: NodeBase,
    pub declaration_list: NodeIndex,
}

#[derive(Debug, Clone, Serialize)]
pub struct VariableDeclarationList {
    pub base: NodeBase,
    pub declarations: NodeList,
}

#[derive(Debug, Clone, Serialize)]
pub struct VariableDeclaration {
    pub base: NodeBase,
    pub name: NodeIndex,
    pub declared_type: TypeId,
    pub initializer: NodeIndex,
}

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct CallExpression {
    pub base: NodeBase,
    /// Callee: an identifier or a property access.
    pub expression: NodeIndex,
    pub arguments: NodeList,
}

#[derive(Debug, Clone, Serialize)]
pub struct PropertyAccessExpression {
    pub base: NodeBase,
    pub expression: NodeIndex,
    pub name: NodeIndex,
}

#[derive(Debug, Clone, Serialize)]
pub struct AwaitExpression {
    pub base: NodeBase,
    pub expression: NodeIndex,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParenthesizedExpression {
    pub base: NodeBase,
    pub expression: NodeIndex,
}

#[derive(Debug, Clone, Serialize)]
pub struct BinaryExpression {
    pub base: NodeBase,
    pub left: NodeIndex,
    pub operator: SyntaxKind,
    pub right: NodeIndex,
}

#[derive(Debug, Clone, Serialize)]
pub struct Identifier {
    pub base: NodeBase,
    pub escaped_text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ThisExpression {
    pub base: NodeBase,
}

#[derive(Debug, Clone, Serialize)]
pub struct Literal {
    pub base: NodeBase,
    pub text: String,
}

// ---------------------------------------------------------------------------
// Node enum
// ---------------------------------------------------------------------------

/// A syntax node. One variant per payload struct; the variant set and the
/// `base()` accessor pair are the contract every traversal relies on.
#[derive(Debug, Clone, Serialize)]
pub enum Node {
    SourceFile(SourceFile),
    ClassDeclaration(ClassDeclaration),
    MethodDeclaration(MethodDeclaration),
    FunctionDeclaration(FunctionDeclaration),
    Parameter(ParameterDeclaration),
    Block(Block),
    ExpressionStatement(ExpressionStatement),
    ReturnStatement(ReturnStatement),
    IfStatement(IfStatement),
    WhileStatement(WhileStatement),
    ForStatement(ForStatement),
    TryStatement(TryStatement),
    CatchClause(CatchClause),
    ThrowStatement(ThrowStatement),
    BreakStatement(BreakStatement),
    ContinueStatement(ContinueStatement),
    VariableStatement(VariableStatement),
    VariableDeclarationList(VariableDeclarationList),
    VariableDeclaration(VariableDeclaration),
    CallExpression(CallExpression),
    PropertyAccessExpression(PropertyAccessExpression),
    AwaitExpression(AwaitExpression),
    ParenthesizedExpression(ParenthesizedExpression),
    BinaryExpression(BinaryExpression),
    Identifier(Identifier),
    ThisExpression(ThisExpression),
    NumericLiteral(Literal),
    StringLiteral(Literal),
}

impl Node {
    pub fn base(&self) -> &NodeBase {
        match self {
            Node::SourceFile(n) => &n.base,
            Node::ClassDeclaration(n) => &n.base,
            Node::MethodDeclaration(n) => &n.base,
            Node::FunctionDeclaration(n) => &n.base,
            Node::Parameter(n) => &n.base,
            Node::Block(n) => &n.base,
            Node::ExpressionStatement(n) => &n.base,
            Node::ReturnStatement(n) => &n.base,
            Node::IfStatement(n) => &n.base,
            Node::WhileStatement(n) => &n.base,
            Node::ForStatement(n) => &n.base,
            Node::TryStatement(n) => &n.base,
            Node::CatchClause(n) => &n.base,
            Node::ThrowStatement(n) => &n.base,
            Node::BreakStatement(n) => &n.base,
            Node::ContinueStatement(n) => &n.base,
            Node::VariableStatement(n) => &n.base,
            Node::VariableDeclarationList(n) => &n.base,
            Node::VariableDeclaration(n) => &n.base,
            Node::CallExpression(n) => &n.base,
            Node::PropertyAccessExpression(n) => &n.base,
            Node::AwaitExpression(n) => &n.base,
            Node::ParenthesizedExpression(n) => &n.base,
            Node::BinaryExpression(n) => &n.base,
            Node::Identifier(n) => &n.base,
            Node::ThisExpression(n) => &n.base,
            Node::NumericLiteral(n) => &n.base,
            Node::StringLiteral(n) => &n.base,
        }
    }

    pub fn base_mut(&mut self) -> &mut NodeBase {
        match self {
            Node::SourceFile(n) => &mut n.base,
            Node::ClassDeclaration(n) => &mut n.base,
            Node::MethodDeclaration(n) => &mut n.base,
            Node::FunctionDeclaration(n) => &mut n.base,
            Node::Parameter(n) => &mut n.base,
            Node::Block(n) => &mut n.base,
            Node::ExpressionStatement(n) => &mut n.base,
            Node::ReturnStatement(n) => &mut n.base,
            Node::IfStatement(n) => &mut n.base,
            Node::WhileStatement(n) => &mut n.base,
            Node::ForStatement(n) => &mut n.base,
            Node::TryStatement(n) => &mut n.base,
            Node::CatchClause(n) => &mut n.base,
            Node::ThrowStatement(n) => &mut n.base,
            Node::BreakStatement(n) => &mut n.base,
            Node::ContinueStatement(n) => &mut n.base,
            Node::VariableStatement(n) => &mut n.base,
            Node::VariableDeclarationList(n) => &mut n.base,
            Node::VariableDeclaration(n) => &mut n.base,
            Node::CallExpression(n) => &mut n.base,
            Node::PropertyAccessExpression(n) => &mut n.base,
            Node::AwaitExpression(n) => &mut n.base,
            Node::ParenthesizedExpression(n) => &mut n.base,
            Node::BinaryExpression(n) => &mut n.base,
            Node::Identifier(n) => &mut n.base,
            Node::ThisExpression(n) => &mut n.base,
            Node::NumericLiteral(n) => &mut n.base,
            Node::StringLiteral(n) => &mut n.base,
        }
    }

    pub fn kind(&self) -> SyntaxKind {
        self.base().kind
    }
}
