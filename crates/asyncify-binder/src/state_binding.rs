//! Declaration binding, heritage resolution, and call-reference binding.

use rustc_hash::FxHashMap;
use tracing::debug;

use asyncify_syntax::flags::modifier_flags;
use asyncify_syntax::{Node, NodeArena, NodeIndex, SyntaxKind, Ty, TypeId, TypeInterner};

use crate::state::BinderState;
use crate::{Symbol, SymbolId, SymbolTable, symbol_flags};

/// Bound on base-class chain walks; a heritage cycle in host input must
/// not hang the binder.
const MAX_BASE_CHAIN: usize = 1_000;

impl BinderState {
    /// Bind a source tree: declare classes, members, and free functions,
    /// resolve heritage into override edges, then record every resolvable
    /// call site into the reference index.
    pub fn bind_source_file(&mut self, arena: &NodeArena, types: &TypeInterner, root: NodeIndex) {
        let statements = match arena.get(root) {
            Some(Node::SourceFile(file)) => file.statements.nodes.clone(),
            _ => return,
        };

        let mut classes = Vec::new();
        for &stmt in &statements {
            match arena.get(stmt) {
                Some(Node::ClassDeclaration(_)) => {
                    if let Some(class_id) = self.bind_class_declaration(arena, stmt) {
                        classes.push((class_id, stmt));
                    }
                }
                Some(Node::FunctionDeclaration(_)) => {
                    self.bind_function_declaration(arena, stmt);
                }
                _ => {}
            }
        }

        for &(class_id, class_node) in &classes {
            self.resolve_heritage(arena, class_id, class_node);
        }
        for &(class_id, _) in &classes {
            self.record_override_edges(class_id);
        }

        // Reference binding runs last so receivers can resolve through
        // any class declared later in the file.
        for &(class_id, class_node) in &classes {
            let members = match arena.get(class_node) {
                Some(Node::ClassDeclaration(c)) => c.members.nodes.clone(),
                _ => continue,
            };
            for member in members {
                self.bind_references(arena, types, class_id, member);
            }
        }
        for &stmt in &statements {
            if arena.kind(stmt) == Some(SyntaxKind::FunctionDeclaration) {
                self.bind_references(arena, types, SymbolId::NONE, stmt);
            }
        }
    }

    fn declare_symbol(
        &mut self,
        name: &str,
        flags: u32,
        parent: SymbolId,
        decl: NodeIndex,
    ) -> SymbolId {
        let mut symbol = Symbol::new(name.to_string(), flags, parent);
        symbol.declarations.push(decl);
        let id = self.symbols.alloc(symbol);
        if decl.is_some() {
            self.node_symbols.insert(decl.0, id);
        }
        self.stats.symbols_declared += 1;
        debug!(name, flags, "declared symbol");
        id
    }

    fn bind_class_declaration(&mut self, arena: &NodeArena, decl: NodeIndex) -> Option<SymbolId> {
        let name = arena.declaration_name(decl)?.to_string();
        let class_id = self.declare_symbol(&name, symbol_flags::CLASS, SymbolId::NONE, decl);
        self.globals.insert(name, class_id);

        let members = match arena.get(decl) {
            Some(Node::ClassDeclaration(c)) => c.members.nodes.clone(),
            _ => return Some(class_id),
        };
        let mut table = SymbolTable::new();
        for member in members {
            if arena.kind(member) != Some(SyntaxKind::MethodDeclaration) {
                continue;
            }
            let Some(member_name) = arena.declaration_name(member) else {
                continue;
            };
            let member_name = member_name.to_string();
            let mut flags = symbol_flags::METHOD;
            if arena.has_modifier(member, modifier_flags::ABSTRACT) {
                flags |= symbol_flags::ABSTRACT;
            }
            let member_id = self.declare_symbol(&member_name, flags, class_id, member);
            table.insert(member_name, member_id);
        }
        self.class_members.insert(class_id, table);
        Some(class_id)
    }

    fn bind_function_declaration(&mut self, arena: &NodeArena, decl: NodeIndex) {
        let Some(name) = arena.declaration_name(decl) else {
            return;
        };
        let name = name.to_string();
        let id = self.declare_symbol(&name, symbol_flags::FUNCTION, SymbolId::NONE, decl);
        self.globals.insert(name, id);
    }

    fn resolve_heritage(&mut self, arena: &NodeArena, class_id: SymbolId, class_node: NodeIndex) {
        let heritage = match arena.get(class_node) {
            Some(Node::ClassDeclaration(c)) => c.heritage_name,
            _ => return,
        };
        let Some(base_name) = arena.get_identifier_text(heritage) else {
            return;
        };
        match self.globals.get(base_name) {
            Some(base_id) if self.is_class(base_id) => {
                self.class_bases.insert(class_id, base_id);
            }
            _ => debug!(base_name, "unresolved base class"),
        }
    }

    /// Link each member to the nearest base-class member with the same
    /// name, in both directions.
    fn record_override_edges(&mut self, class_id: SymbolId) {
        let members: Vec<(String, SymbolId)> = match self.class_members.get(&class_id) {
            Some(table) => table.iter().map(|(n, &id)| (n.clone(), id)).collect(),
            None => return,
        };
        for (name, member_id) in members {
            let mut base = self.class_bases.get(&class_id).copied();
            let mut remaining = MAX_BASE_CHAIN;
            while let Some(base_id) = base {
                remaining -= 1;
                if remaining == 0 {
                    break;
                }
                if let Some(overridden) = self
                    .class_members
                    .get(&base_id)
                    .and_then(|table| table.get(&name))
                {
                    if let Some(symbol) = self.symbols.get_mut(member_id) {
                        symbol.overrides.push(overridden);
                    }
                    if let Some(symbol) = self.symbols.get_mut(overridden) {
                        symbol.overridden_by.push(member_id);
                    }
                    self.stats.override_edges += 1;
                    break;
                }
                base = self.class_bases.get(&base_id).copied();
            }
        }
    }

    fn is_class(&self, id: SymbolId) -> bool {
        self.symbols
            .get(id)
            .is_some_and(|s| s.flags & symbol_flags::CLASS != 0)
    }

    // -----------------------------------------------------------------------
    // Reference binding
    // -----------------------------------------------------------------------

    /// Record every resolvable use inside one declaration's own scope:
    /// call sites keyed to their callee expression node, plus bare
    /// identifier references to callables in value position.
    fn bind_references(
        &mut self,
        arena: &NodeArena,
        types: &TypeInterner,
        class_id: SymbolId,
        decl: NodeIndex,
    ) {
        let body = arena.declaration_body(decl);
        if body.is_none() {
            return;
        }

        let locals = self.collect_locals(arena, decl, body);

        for idx in arena.descendants_in_scope(body) {
            match arena.kind(idx) {
                Some(SyntaxKind::CallExpression) => {
                    let target = self.resolve_callee(arena, types, class_id, &locals, idx);
                    if target.is_some() {
                        let callee = match arena.get(idx) {
                            Some(Node::CallExpression(c)) => c.expression,
                            _ => NodeIndex::NONE,
                        };
                        self.record_reference(target, callee, idx);
                        self.stats.calls_resolved += 1;
                    } else {
                        self.stats.calls_unresolved += 1;
                    }
                }
                Some(SyntaxKind::Identifier) => {
                    if !self.is_value_reference_position(arena, idx) {
                        continue;
                    }
                    let Some(name) = arena.get_identifier_text(idx) else {
                        continue;
                    };
                    let target = self.lookup_callable(class_id, name);
                    if target.is_some() {
                        self.references.entry(target).or_default().push(idx);
                    }
                }
                _ => {}
            }
        }
    }

    /// Parameter and hoisted variable declared types for one body.
    fn collect_locals(
        &self,
        arena: &NodeArena,
        decl: NodeIndex,
        body: NodeIndex,
    ) -> FxHashMap<String, TypeId> {
        let mut locals = FxHashMap::default();
        let parameters = match arena.get(decl) {
            Some(Node::MethodDeclaration(m)) => m.parameters.nodes.clone(),
            Some(Node::FunctionDeclaration(f)) => f.parameters.nodes.clone(),
            _ => Vec::new(),
        };
        for param in parameters {
            if let Some(Node::Parameter(p)) = arena.get(param) {
                if let Some(name) = arena.get_identifier_text(p.name) {
                    locals.insert(name.to_string(), p.declared_type);
                }
            }
        }
        for idx in arena.descendants_in_scope(body) {
            if let Some(Node::VariableDeclaration(v)) = arena.get(idx) {
                if let Some(name) = arena.get_identifier_text(v.name) {
                    locals.insert(name.to_string(), v.declared_type);
                }
            }
        }
        locals
    }

    fn resolve_callee(
        &self,
        arena: &NodeArena,
        types: &TypeInterner,
        class_id: SymbolId,
        locals: &FxHashMap<String, TypeId>,
        call: NodeIndex,
    ) -> SymbolId {
        let callee = match arena.get(call) {
            Some(Node::CallExpression(c)) => c.expression,
            _ => return SymbolId::NONE,
        };
        match arena.get(callee) {
            Some(Node::Identifier(ident)) => self.lookup_callable(class_id, &ident.escaped_text),
            Some(Node::PropertyAccessExpression(access)) => {
                let Some(member) = arena.get_identifier_text(access.name) else {
                    return SymbolId::NONE;
                };
                match arena.get(access.expression) {
                    Some(Node::ThisExpression(_)) => self.member_in_chain(class_id, member),
                    Some(Node::Identifier(recv)) => {
                        let Some(&declared) = locals.get(&recv.escaped_text) else {
                            return SymbolId::NONE;
                        };
                        let Some(Ty::Named(class_name)) = types.get(declared) else {
                            return SymbolId::NONE;
                        };
                        match self.globals.get(class_name) {
                            Some(recv_class) if self.is_class(recv_class) => {
                                self.member_in_chain(recv_class, member)
                            }
                            _ => SymbolId::NONE,
                        }
                    }
                    _ => SymbolId::NONE,
                }
            }
            _ => SymbolId::NONE,
        }
    }

    /// Bare-name lookup: enclosing class chain first, then global
    /// functions.
    fn lookup_callable(&self, class_id: SymbolId, name: &str) -> SymbolId {
        let member = self.member_in_chain(class_id, name);
        if member.is_some() {
            return member;
        }
        match self.globals.get(name) {
            Some(id)
                if self
                    .symbols
                    .get(id)
                    .is_some_and(|s| s.flags & symbol_flags::FUNCTION != 0) =>
            {
                id
            }
            _ => SymbolId::NONE,
        }
    }

    /// Member lookup walking the base-class chain.
    pub(crate) fn member_in_chain(&self, class_id: SymbolId, name: &str) -> SymbolId {
        let mut current = class_id;
        let mut remaining = MAX_BASE_CHAIN;
        while current.is_some() && remaining > 0 {
            remaining -= 1;
            if let Some(member) = self
                .class_members
                .get(&current)
                .and_then(|table| table.get(name))
            {
                return member;
            }
            current = self.class_bases.get(&current).copied().unwrap_or(SymbolId::NONE);
        }
        SymbolId::NONE
    }

    fn record_reference(&mut self, symbol: SymbolId, use_node: NodeIndex, call: NodeIndex) {
        if use_node.is_some() {
            self.references.entry(symbol).or_default().push(use_node);
        }
        if call.is_some() {
            self.call_targets.insert(call.0, symbol);
        }
    }

    /// A bare identifier in value position: not a declaration name, not a
    /// member-access name, and not the callee of a call (those are
    /// recorded through the call path).
    fn is_value_reference_position(&self, arena: &NodeArena, idx: NodeIndex) -> bool {
        let parent = arena.parent(idx);
        match arena.get(parent) {
            Some(Node::CallExpression(c)) => c.expression != idx,
            Some(Node::PropertyAccessExpression(p)) => p.name != idx,
            Some(Node::MethodDeclaration(_))
            | Some(Node::FunctionDeclaration(_))
            | Some(Node::ClassDeclaration(_))
            | Some(Node::Parameter(_)) => false,
            Some(Node::VariableDeclaration(v)) => v.name != idx,
            _ => true,
        }
    }
}
