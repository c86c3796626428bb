//! Programmatic tree construction.
//!
//! `AstBuilder` is the host's stand-in for a parser: each constructor
//! allocates a node and wires its children's parent links, so a finished
//! tree is traversable in both directions without a fix-up pass.

use crate::arena::NodeArena;
use crate::ast::{
    AwaitExpression, BinaryExpression, Block, BreakStatement, CallExpression, CatchClause,
    ClassDeclaration, ContinueStatement, ExpressionStatement, ForStatement, FunctionDeclaration,
    Identifier, IfStatement, Literal, MethodDeclaration, Node, NodeBase, NodeIndex, NodeList,
    ParameterDeclaration, ParenthesizedExpression, PropertyAccessExpression, ReturnStatement,
    SourceFile, ThisExpression, ThrowStatement, TryStatement, VariableDeclaration,
    VariableDeclarationList, VariableStatement, WhileStatement,
};
use crate::kind::SyntaxKind;
use crate::types::TypeId;

pub struct AstBuilder<'a> {
    arena: &'a mut NodeArena,
}

impl<'a> AstBuilder<'a> {
    pub fn new(arena: &'a mut NodeArena) -> AstBuilder<'a> {
        AstBuilder { arena }
    }

    pub fn arena(&self) -> &NodeArena {
        self.arena
    }

    fn add(&mut self, node: Node) -> NodeIndex {
        self.arena.add(node)
    }

    fn adopt(&mut self, child: NodeIndex, parent: NodeIndex) {
        if child.is_some() {
            self.arena.set_parent(child, parent);
        }
    }

    fn adopt_all(&mut self, children: &[NodeIndex], parent: NodeIndex) {
        for &child in children {
            self.adopt(child, parent);
        }
    }

    // -----------------------------------------------------------------------
    // Expressions
    // -----------------------------------------------------------------------

    pub fn identifier(&mut self, text: &str) -> NodeIndex {
        self.add(Node::Identifier(Identifier {
            base: NodeBase::new(SyntaxKind::Identifier),
            escaped_text: text.to_string(),
        }))
    }

    pub fn this(&mut self) -> NodeIndex {
        self.add(Node::ThisExpression(ThisExpression {
            base: NodeBase::new(SyntaxKind::ThisExpression),
        }))
    }

    pub fn number(&mut self, text: &str) -> NodeIndex {
        self.add(Node::NumericLiteral(Literal {
            base: NodeBase::new(SyntaxKind::NumericLiteral),
            text: text.to_string(),
        }))
    }

    pub fn string(&mut self, text: &str) -> NodeIndex {
        self.add(Node::StringLiteral(Literal {
            base: NodeBase::new(SyntaxKind::StringLiteral),
            text: text.to_string(),
        }))
    }

    pub fn call(&mut self, callee: NodeIndex, arguments: Vec<NodeIndex>) -> NodeIndex {
        let idx = self.add(Node::CallExpression(CallExpression {
            base: NodeBase::new(SyntaxKind::CallExpression),
            expression: callee,
            arguments: NodeList::new(arguments.clone()),
        }));
        self.adopt(callee, idx);
        self.adopt_all(&arguments, idx);
        idx
    }

    /// `recv.name` — allocates the member name identifier.
    pub fn property_access(&mut self, expression: NodeIndex, name: &str) -> NodeIndex {
        let name_idx = self.identifier(name);
        let idx = self.add(Node::PropertyAccessExpression(PropertyAccessExpression {
            base: NodeBase::new(SyntaxKind::PropertyAccessExpression),
            expression,
            name: name_idx,
        }));
        self.adopt(expression, idx);
        self.adopt(name_idx, idx);
        idx
    }

    pub fn await_expr(&mut self, expression: NodeIndex) -> NodeIndex {
        let idx = self.add(Node::AwaitExpression(AwaitExpression {
            base: NodeBase::new(SyntaxKind::AwaitExpression),
            expression,
        }));
        self.adopt(expression, idx);
        idx
    }

    pub fn paren(&mut self, expression: NodeIndex) -> NodeIndex {
        let idx = self.add(Node::ParenthesizedExpression(ParenthesizedExpression {
            base: NodeBase::new(SyntaxKind::ParenthesizedExpression),
            expression,
        }));
        self.adopt(expression, idx);
        idx
    }

    pub fn binary(&mut self, left: NodeIndex, operator: SyntaxKind, right: NodeIndex) -> NodeIndex {
        let idx = self.add(Node::BinaryExpression(BinaryExpression {
            base: NodeBase::new(SyntaxKind::BinaryExpression),
            left,
            operator,
            right,
        }));
        self.adopt(left, idx);
        self.adopt(right, idx);
        idx
    }

    /// `left = right`.
    pub fn assign(&mut self, left: NodeIndex, right: NodeIndex) -> NodeIndex {
        self.binary(left, SyntaxKind::EqualsToken, right)
    }

    // -----------------------------------------------------------------------
    // Statements
    // -----------------------------------------------------------------------

    pub fn expr_stmt(&mut self, expression: NodeIndex) -> NodeIndex {
        let idx = self.add(Node::ExpressionStatement(ExpressionStatement {
            base: NodeBase::new(SyntaxKind::ExpressionStatement),
            expression,
        }));
        self.adopt(expression, idx);
        idx
    }

    /// `return expression;` — pass NONE for a bare `return;`.
    pub fn ret(&mut self, expression: NodeIndex) -> NodeIndex {
        let idx = self.add(Node::ReturnStatement(ReturnStatement {
            base: NodeBase::new(SyntaxKind::ReturnStatement),
            expression,
        }));
        self.adopt(expression, idx);
        idx
    }

    pub fn block(&mut self, statements: Vec<NodeIndex>) -> NodeIndex {
        let idx = self.add(Node::Block(Block {
            base: NodeBase::new(SyntaxKind::Block),
            statements: NodeList::new(statements.clone()),
        }));
        self.adopt_all(&statements, idx);
        idx
    }

    pub fn if_stmt(
        &mut self,
        expression: NodeIndex,
        then_statement: NodeIndex,
        else_statement: NodeIndex,
    ) -> NodeIndex {
        let idx = self.add(Node::IfStatement(IfStatement {
            base: NodeBase::new(SyntaxKind::IfStatement),
            expression,
            then_statement,
            else_statement,
        }));
        self.adopt(expression, idx);
        self.adopt(then_statement, idx);
        self.adopt(else_statement, idx);
        idx
    }

    pub fn while_stmt(&mut self, expression: NodeIndex, statement: NodeIndex) -> NodeIndex {
        let idx = self.add(Node::WhileStatement(WhileStatement {
            base: NodeBase::new(SyntaxKind::WhileStatement),
            expression,
            statement,
        }));
        self.adopt(expression, idx);
        self.adopt(statement, idx);
        idx
    }

    pub fn for_stmt(
        &mut self,
        initializer: NodeIndex,
        condition: NodeIndex,
        incrementor: NodeIndex,
        statement: NodeIndex,
    ) -> NodeIndex {
        let idx = self.add(Node::ForStatement(ForStatement {
            base: NodeBase::new(SyntaxKind::ForStatement),
            initializer,
            condition,
            incrementor,
            statement,
        }));
        self.adopt(initializer, idx);
        self.adopt(condition, idx);
        self.adopt(incrementor, idx);
        self.adopt(statement, idx);
        idx
    }

    pub fn try_stmt(
        &mut self,
        try_block: NodeIndex,
        catch_block: NodeIndex,
        finally_block: NodeIndex,
    ) -> NodeIndex {
        let catch_clause = if catch_block.is_some() {
            let idx = self.add(Node::CatchClause(CatchClause {
                base: NodeBase::new(SyntaxKind::CatchClause),
                block: catch_block,
            }));
            self.adopt(catch_block, idx);
            idx
        } else {
            NodeIndex::NONE
        };
        let idx = self.add(Node::TryStatement(TryStatement {
            base: NodeBase::new(SyntaxKind::TryStatement),
            try_block,
            catch_clause,
            finally_block,
        }));
        self.adopt(try_block, idx);
        self.adopt(catch_clause, idx);
        self.adopt(finally_block, idx);
        idx
    }

    pub fn throw_stmt(&mut self, expression: NodeIndex) -> NodeIndex {
        let idx = self.add(Node::ThrowStatement(ThrowStatement {
            base: NodeBase::new(SyntaxKind::ThrowStatement),
            expression,
        }));
        self.adopt(expression, idx);
        idx
    }

    pub fn break_stmt(&mut self) -> NodeIndex {
        self.add(Node::BreakStatement(BreakStatement {
            base: NodeBase::new(SyntaxKind::BreakStatement),
        }))
    }

    pub fn continue_stmt(&mut self) -> NodeIndex {
        self.add(Node::ContinueStatement(ContinueStatement {
            base: NodeBase::new(SyntaxKind::ContinueStatement),
        }))
    }

    /// `var name: declared_type = initializer;` — a variable statement
    /// wrapping a single-declaration list.
    pub fn var_stmt(
        &mut self,
        name: &str,
        declared_type: TypeId,
        initializer: NodeIndex,
    ) -> NodeIndex {
        let name_idx = self.identifier(name);
        let decl = self.add(Node::VariableDeclaration(VariableDeclaration {
            base: NodeBase::new(SyntaxKind::VariableDeclaration),
            name: name_idx,
            declared_type,
            initializer,
        }));
        self.adopt(name_idx, decl);
        self.adopt(initializer, decl);
        let list = self.add(Node::VariableDeclarationList(VariableDeclarationList {
            base: NodeBase::new(SyntaxKind::VariableDeclarationList),
            declarations: NodeList::new(vec![decl]),
        }));
        self.adopt(decl, list);
        let stmt = self.add(Node::VariableStatement(VariableStatement {
            base: NodeBase::new(SyntaxKind::VariableStatement),
            declaration_list: list,
        }));
        self.adopt(list, stmt);
        stmt
    }

    // -----------------------------------------------------------------------
    // Declarations
    // -----------------------------------------------------------------------

    pub fn parameter(&mut self, name: &str, declared_type: TypeId) -> NodeIndex {
        let name_idx = self.identifier(name);
        let idx = self.add(Node::Parameter(ParameterDeclaration {
            base: NodeBase::new(SyntaxKind::Parameter),
            name: name_idx,
            declared_type,
        }));
        self.adopt(name_idx, idx);
        idx
    }

    /// A class member method. Pass NONE as `body` for an abstract member
    /// (combine with `modifier_flags::ABSTRACT`).
    pub fn method(
        &mut self,
        name: &str,
        modifier_flags: u32,
        parameters: Vec<NodeIndex>,
        return_type: TypeId,
        body: NodeIndex,
    ) -> NodeIndex {
        let name_idx = self.identifier(name);
        let idx = self.add(Node::MethodDeclaration(MethodDeclaration {
            base: NodeBase::with_modifiers(SyntaxKind::MethodDeclaration, modifier_flags),
            name: name_idx,
            parameters: NodeList::new(parameters.clone()),
            return_type,
            body,
        }));
        self.adopt(name_idx, idx);
        self.adopt_all(&parameters, idx);
        self.adopt(body, idx);
        idx
    }

    /// A free function.
    pub fn function(
        &mut self,
        name: &str,
        modifier_flags: u32,
        parameters: Vec<NodeIndex>,
        return_type: TypeId,
        body: NodeIndex,
    ) -> NodeIndex {
        let name_idx = self.identifier(name);
        let idx = self.add(Node::FunctionDeclaration(FunctionDeclaration {
            base: NodeBase::with_modifiers(SyntaxKind::FunctionDeclaration, modifier_flags),
            name: name_idx,
            parameters: NodeList::new(parameters.clone()),
            return_type,
            body,
        }));
        self.adopt(name_idx, idx);
        self.adopt_all(&parameters, idx);
        self.adopt(body, idx);
        idx
    }

    pub fn class(
        &mut self,
        name: &str,
        extends: Option<&str>,
        members: Vec<NodeIndex>,
    ) -> NodeIndex {
        let name_idx = self.identifier(name);
        let heritage = match extends {
            Some(base_name) => self.identifier(base_name),
            None => NodeIndex::NONE,
        };
        let idx = self.add(Node::ClassDeclaration(ClassDeclaration {
            base: NodeBase::new(SyntaxKind::ClassDeclaration),
            name: name_idx,
            heritage_name: heritage,
            members: NodeList::new(members.clone()),
        }));
        self.adopt(name_idx, idx);
        self.adopt(heritage, idx);
        self.adopt_all(&members, idx);
        idx
    }

    pub fn source_file(&mut self, statements: Vec<NodeIndex>) -> NodeIndex {
        let idx = self.add(Node::SourceFile(SourceFile {
            base: NodeBase::new(SyntaxKind::SourceFile),
            statements: NodeList::new(statements.clone()),
        }));
        self.adopt_all(&statements, idx);
        idx
    }
}
