//! Node arena for AST storage.

use serde::Serialize;

use crate::ast::{AwaitExpression, Node, NodeBase, NodeIndex, NodeList};
use crate::flags::node_flags;
use crate::kind::SyntaxKind;
use crate::types::TypeId;

/// Arena-based storage for AST nodes.
/// Nodes are stored contiguously and referenced by index. Indices are
/// stable: edits mutate in place, removal detaches rather than deletes.
#[derive(Debug, Default, Serialize)]
pub struct NodeArena {
    pub nodes: Vec<Node>,
}

impl NodeArena {
    pub fn new() -> NodeArena {
        NodeArena { nodes: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> NodeArena {
        NodeArena {
            nodes: Vec::with_capacity(capacity),
        }
    }

    /// Add a node to the arena and return its index.
    pub fn add(&mut self, mut node: Node) -> NodeIndex {
        let index = self.nodes.len() as u32;
        node.base_mut().id = index;
        self.nodes.push(node);
        NodeIndex(index)
    }

    /// Get a node by index.
    pub fn get(&self, index: NodeIndex) -> Option<&Node> {
        if index.is_none() {
            None
        } else {
            self.nodes.get(index.0 as usize)
        }
    }

    /// Get a mutable node by index.
    pub fn get_mut(&mut self, index: NodeIndex) -> Option<&mut Node> {
        if index.is_none() {
            None
        } else {
            self.nodes.get_mut(index.0 as usize)
        }
    }

    /// Replace a node at the given index, returning the old node.
    /// The replacement inherits the slot's id; the old node is handed back
    /// detached from the tree.
    pub fn replace(&mut self, index: NodeIndex, mut new_node: Node) -> Option<Node> {
        if index.is_none() {
            return None;
        }
        new_node.base_mut().id = index.0;
        self.nodes
            .get_mut(index.0 as usize)
            .map(|old| std::mem::replace(old, new_node))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn kind(&self, index: NodeIndex) -> Option<SyntaxKind> {
        self.get(index).map(|n| n.kind())
    }

    pub fn parent(&self, index: NodeIndex) -> NodeIndex {
        self.get(index).map_or(NodeIndex::NONE, |n| n.base().parent)
    }

    pub fn set_parent(&mut self, index: NodeIndex, parent: NodeIndex) {
        if let Some(node) = self.get_mut(index) {
            node.base_mut().parent = parent;
        }
    }

    // -----------------------------------------------------------------------
    // Validity
    // -----------------------------------------------------------------------

    /// Whether the node exists and is still attached to its owning subtree.
    /// Must be consulted before every mutation; edits elsewhere in the tree
    /// may have detached the node since its handle was taken.
    pub fn is_valid(&self, index: NodeIndex) -> bool {
        self.get(index)
            .is_some_and(|n| n.base().flags & node_flags::DETACHED == 0)
    }

    /// Mark a node as removed from its owning subtree. Detachment is
    /// permanent; the slot stays allocated so outstanding handles stay
    /// in bounds, but `is_valid` reports false from now on.
    pub fn detach(&mut self, index: NodeIndex) {
        if let Some(node) = self.get_mut(index) {
            node.base_mut().flags |= node_flags::DETACHED;
        }
    }

    pub fn has_flag(&self, index: NodeIndex, flag: u32) -> bool {
        self.get(index).is_some_and(|n| n.base().flags & flag != 0)
    }

    pub fn set_flag(&mut self, index: NodeIndex, flag: u32) {
        if let Some(node) = self.get_mut(index) {
            node.base_mut().flags |= flag;
        }
    }

    pub fn has_modifier(&self, index: NodeIndex, flag: u32) -> bool {
        self.get(index)
            .is_some_and(|n| n.base().modifier_flags & flag != 0)
    }

    /// Set or clear a declaration modifier. Fails if the node is detached.
    pub fn set_modifier(&mut self, index: NodeIndex, flag: u32, on: bool) -> bool {
        if !self.is_valid(index) {
            return false;
        }
        if let Some(node) = self.get_mut(index) {
            if on {
                node.base_mut().modifier_flags |= flag;
            } else {
                node.base_mut().modifier_flags &= !flag;
            }
            true
        } else {
            false
        }
    }

    // -----------------------------------------------------------------------
    // Child access
    // -----------------------------------------------------------------------

    /// Child node handles of a node, in syntactic order. NONE slots are
    /// omitted.
    pub fn get_children(&self, index: NodeIndex) -> Vec<NodeIndex> {
        let node = match self.get(index) {
            Some(n) => n,
            None => return Vec::new(),
        };

        let add_opt = |children: &mut Vec<NodeIndex>, idx: NodeIndex| {
            if idx.is_some() {
                children.push(idx);
            }
        };
        let add_list = |children: &mut Vec<NodeIndex>, list: &NodeList| {
            children.extend(list.nodes.iter().copied());
        };

        let mut children = Vec::new();
        match node {
            Node::SourceFile(n) => add_list(&mut children, &n.statements),
            Node::ClassDeclaration(n) => {
                add_opt(&mut children, n.name);
                add_opt(&mut children, n.heritage_name);
                add_list(&mut children, &n.members);
            }
            Node::MethodDeclaration(n) => {
                add_opt(&mut children, n.name);
                add_list(&mut children, &n.parameters);
                add_opt(&mut children, n.body);
            }
            Node::FunctionDeclaration(n) => {
                add_opt(&mut children, n.name);
                add_list(&mut children, &n.parameters);
                add_opt(&mut children, n.body);
            }
            Node::Parameter(n) => add_opt(&mut children, n.name),
            Node::Block(n) => add_list(&mut children, &n.statements),
            Node::ExpressionStatement(n) => add_opt(&mut children, n.expression),
            Node::ReturnStatement(n) => add_opt(&mut children, n.expression),
            Node::IfStatement(n) => {
                add_opt(&mut children, n.expression);
                add_opt(&mut children, n.then_statement);
                add_opt(&mut children, n.else_statement);
            }
            Node::WhileStatement(n) => {
                add_opt(&mut children, n.expression);
                add_opt(&mut children, n.statement);
            }
            Node::ForStatement(n) => {
                add_opt(&mut children, n.initializer);
                add_opt(&mut children, n.condition);
                add_opt(&mut children, n.incrementor);
                add_opt(&mut children, n.statement);
            }
            Node::TryStatement(n) => {
                add_opt(&mut children, n.try_block);
                add_opt(&mut children, n.catch_clause);
                add_opt(&mut children, n.finally_block);
            }
            Node::CatchClause(n) => add_opt(&mut children, n.block),
            Node::ThrowStatement(n) => add_opt(&mut children, n.expression),
            Node::VariableStatement(n) => add_opt(&mut children, n.declaration_list),
            Node::VariableDeclarationList(n) => add_list(&mut children, &n.declarations),
            Node::VariableDeclaration(n) => {
                add_opt(&mut children, n.name);
                add_opt(&mut children, n.initializer);
            }
            Node::CallExpression(n) => {
                add_opt(&mut children, n.expression);
                add_list(&mut children, &n.arguments);
            }
            Node::PropertyAccessExpression(n) => {
                add_opt(&mut children, n.expression);
                add_opt(&mut children, n.name);
            }
            Node::AwaitExpression(n) => add_opt(&mut children, n.expression),
            Node::ParenthesizedExpression(n) => add_opt(&mut children, n.expression),
            Node::BinaryExpression(n) => {
                add_opt(&mut children, n.left);
                add_opt(&mut children, n.right);
            }
            Node::BreakStatement(_)
            | Node::ContinueStatement(_)
            | Node::Identifier(_)
            | Node::ThisExpression(_)
            | Node::NumericLiteral(_)
            | Node::StringLiteral(_) => {}
        }
        children
    }

    /// Rewire one child slot of `parent` from `old_child` to `new_child`,
    /// updating the new child's parent link. Returns false when
    /// `old_child` is not a direct child of `parent` (or `parent` is
    /// detached) and leaves the tree untouched in that case.
    pub fn replace_child(
        &mut self,
        parent: NodeIndex,
        old_child: NodeIndex,
        new_child: NodeIndex,
    ) -> bool {
        if !self.is_valid(parent) {
            return false;
        }

        let replace_opt = |slot: &mut NodeIndex| {
            if *slot == old_child {
                *slot = new_child;
                true
            } else {
                false
            }
        };
        let replace_in_list = |list: &mut NodeList| {
            for slot in &mut list.nodes {
                if *slot == old_child {
                    *slot = new_child;
                    return true;
                }
            }
            false
        };

        let node = match self.get_mut(parent) {
            Some(n) => n,
            None => return false,
        };
        let replaced = match node {
            Node::SourceFile(n) => replace_in_list(&mut n.statements),
            Node::ClassDeclaration(n) => {
                replace_opt(&mut n.name)
                    || replace_opt(&mut n.heritage_name)
                    || replace_in_list(&mut n.members)
            }
            Node::MethodDeclaration(n) => {
                replace_opt(&mut n.name)
                    || replace_in_list(&mut n.parameters)
                    || replace_opt(&mut n.body)
            }
            Node::FunctionDeclaration(n) => {
                replace_opt(&mut n.name)
                    || replace_in_list(&mut n.parameters)
                    || replace_opt(&mut n.body)
            }
            Node::Parameter(n) => replace_opt(&mut n.name),
            Node::Block(n) => replace_in_list(&mut n.statements),
            Node::ExpressionStatement(n) => replace_opt(&mut n.expression),
            Node::ReturnStatement(n) => replace_opt(&mut n.expression),
            Node::IfStatement(n) => {
                replace_opt(&mut n.expression)
                    || replace_opt(&mut n.then_statement)
                    || replace_opt(&mut n.else_statement)
            }
            Node::WhileStatement(n) => {
                replace_opt(&mut n.expression) || replace_opt(&mut n.statement)
            }
            Node::ForStatement(n) => {
                replace_opt(&mut n.initializer)
                    || replace_opt(&mut n.condition)
                    || replace_opt(&mut n.incrementor)
                    || replace_opt(&mut n.statement)
            }
            Node::TryStatement(n) => {
                replace_opt(&mut n.try_block)
                    || replace_opt(&mut n.catch_clause)
                    || replace_opt(&mut n.finally_block)
            }
            Node::CatchClause(n) => replace_opt(&mut n.block),
            Node::ThrowStatement(n) => replace_opt(&mut n.expression),
            Node::VariableStatement(n) => replace_opt(&mut n.declaration_list),
            Node::VariableDeclarationList(n) => replace_in_list(&mut n.declarations),
            Node::VariableDeclaration(n) => {
                replace_opt(&mut n.name) || replace_opt(&mut n.initializer)
            }
            Node::CallExpression(n) => {
                replace_opt(&mut n.expression) || replace_in_list(&mut n.arguments)
            }
            Node::PropertyAccessExpression(n) => {
                replace_opt(&mut n.expression) || replace_opt(&mut n.name)
            }
            Node::AwaitExpression(n) => replace_opt(&mut n.expression),
            Node::ParenthesizedExpression(n) => replace_opt(&mut n.expression),
            Node::BinaryExpression(n) => replace_opt(&mut n.left) || replace_opt(&mut n.right),
            Node::BreakStatement(_)
            | Node::ContinueStatement(_)
            | Node::Identifier(_)
            | Node::ThisExpression(_)
            | Node::NumericLiteral(_)
            | Node::StringLiteral(_) => false,
        };

        if replaced {
            self.set_parent(new_child, parent);
        }
        replaced
    }

    // -----------------------------------------------------------------------
    // Traversal
    // -----------------------------------------------------------------------

    /// All descendants of `index` in preorder, excluding `index` itself.
    pub fn descendants(&self, index: NodeIndex) -> Vec<NodeIndex> {
        let mut out = Vec::new();
        let mut stack = self.get_children(index);
        stack.reverse();
        while let Some(idx) = stack.pop() {
            out.push(idx);
            let mut children = self.get_children(idx);
            children.reverse();
            stack.extend(children);
        }
        out
    }

    /// Descendants of `index` in preorder, not crossing into nested
    /// function-like declarations: a method's own statements and
    /// expressions, but nothing inside a local function it declares.
    pub fn descendants_in_scope(&self, index: NodeIndex) -> Vec<NodeIndex> {
        let mut out = Vec::new();
        let mut stack = self.get_children(index);
        stack.reverse();
        while let Some(idx) = stack.pop() {
            let kind = match self.kind(idx) {
                Some(k) => k,
                None => continue,
            };
            if kind.is_function_like() {
                continue;
            }
            out.push(idx);
            let mut children = self.get_children(idx);
            children.reverse();
            stack.extend(children);
        }
        out
    }

    /// Ancestor chain of `index`, innermost first, root last.
    pub fn ancestors(&self, index: NodeIndex) -> Vec<NodeIndex> {
        let mut out = Vec::new();
        let mut cur = self.parent(index);
        while cur.is_some() {
            out.push(cur);
            cur = self.parent(cur);
        }
        out
    }

    /// Nearest enclosing function-like declaration, or NONE.
    pub fn enclosing_declaration(&self, index: NodeIndex) -> NodeIndex {
        let mut cur = self.parent(index);
        while cur.is_some() {
            if self.kind(cur).is_some_and(|k| k.is_function_like()) {
                return cur;
            }
            cur = self.parent(cur);
        }
        NodeIndex::NONE
    }

    // -----------------------------------------------------------------------
    // Typed accessors
    // -----------------------------------------------------------------------

    pub fn get_identifier_text(&self, index: NodeIndex) -> Option<&str> {
        match self.get(index)? {
            Node::Identifier(ident) => Some(&ident.escaped_text),
            _ => None,
        }
    }

    /// Rewrite an identifier's text. Fails if the node is detached or not
    /// an identifier.
    pub fn set_identifier_text(&mut self, index: NodeIndex, text: &str) -> bool {
        if !self.is_valid(index) {
            return false;
        }
        match self.get_mut(index) {
            Some(Node::Identifier(ident)) => {
                ident.escaped_text = text.to_string();
                true
            }
            _ => false,
        }
    }

    /// The identifier node that names the callee of a call expression:
    /// the callee itself for `f(…)`, the member name for `recv.m(…)`.
    pub fn callee_name_node(&self, call: NodeIndex) -> NodeIndex {
        let callee = match self.get(call) {
            Some(Node::CallExpression(c)) => c.expression,
            _ => return NodeIndex::NONE,
        };
        match self.get(callee) {
            Some(Node::Identifier(_)) => callee,
            Some(Node::PropertyAccessExpression(p)) => p.name,
            _ => NodeIndex::NONE,
        }
    }

    /// Declared name of a method/function declaration.
    pub fn declaration_name(&self, decl: NodeIndex) -> Option<&str> {
        let name = match self.get(decl)? {
            Node::MethodDeclaration(m) => m.name,
            Node::FunctionDeclaration(f) => f.name,
            Node::ClassDeclaration(c) => c.name,
            _ => return None,
        };
        self.get_identifier_text(name)
    }

    pub fn declaration_name_node(&self, decl: NodeIndex) -> NodeIndex {
        match self.get(decl) {
            Some(Node::MethodDeclaration(m)) => m.name,
            Some(Node::FunctionDeclaration(f)) => f.name,
            Some(Node::ClassDeclaration(c)) => c.name,
            _ => NodeIndex::NONE,
        }
    }

    pub fn declaration_body(&self, decl: NodeIndex) -> NodeIndex {
        match self.get(decl) {
            Some(Node::MethodDeclaration(m)) => m.body,
            Some(Node::FunctionDeclaration(f)) => f.body,
            _ => NodeIndex::NONE,
        }
    }

    pub fn declaration_return_type(&self, decl: NodeIndex) -> TypeId {
        match self.get(decl) {
            Some(Node::MethodDeclaration(m)) => m.return_type,
            Some(Node::FunctionDeclaration(f)) => f.return_type,
            _ => TypeId::NONE,
        }
    }

    /// Rewrite a declaration's return type. Fails if the node is detached
    /// or not a method/function declaration.
    pub fn set_declaration_return_type(&mut self, decl: NodeIndex, ty: TypeId) -> bool {
        if !self.is_valid(decl) {
            return false;
        }
        match self.get_mut(decl) {
            Some(Node::MethodDeclaration(m)) => {
                m.return_type = ty;
                true
            }
            Some(Node::FunctionDeclaration(f)) => {
                f.return_type = ty;
                true
            }
            _ => false,
        }
    }

    /// Allocate a fresh await expression wrapping `expression` at its
    /// current position in the tree. The old parent's child slot is
    /// rewired to the new await node. Returns NONE if the splice fails.
    pub fn wrap_in_await(&mut self, expression: NodeIndex) -> NodeIndex {
        if !self.is_valid(expression) {
            return NodeIndex::NONE;
        }
        let parent = self.parent(expression);
        let await_idx = self.add(Node::AwaitExpression(AwaitExpression {
            base: NodeBase::new(SyntaxKind::AwaitExpression),
            expression,
        }));
        if parent.is_some() && !self.replace_child(parent, expression, await_idx) {
            self.detach(await_idx);
            return NodeIndex::NONE;
        }
        if parent.is_none() {
            self.set_parent(await_idx, NodeIndex::NONE);
        }
        self.set_parent(expression, await_idx);
        await_idx
    }
}
