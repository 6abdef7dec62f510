//! Static Optimizer
//!
//! Marks the subtrees of a template AST whose output can never change, then
//! picks the ones worth hoisting out of the render function as static
//! roots. Code generation renders a static root once and reuses it.

use crate::config::{CompilerOptions, TagPredicate};
use crate::ml_parser::ast::{Ast, AstElement, AstNode, NodeId};
use crate::ml_parser::tags::is_built_in_tag;
use crate::util::Memo;
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::sync::Arc;

/// Bookkeeping keys every element may carry and still be static
const BASE_STATIC_KEYS: &str =
    "type,tag,attrsList,attrsMap,plain,parent,children,attrs,start,end,rawAttrsMap";

static STATIC_KEY_SETS: Lazy<Memo<String, Arc<HashSet<String>>>> = Lazy::new(Memo::new);

/// The static key set for a comma separated list of extra keys.
pub fn static_keys(extra: &str) -> Arc<HashSet<String>> {
    STATIC_KEY_SETS.get_or_insert_with(extra.to_string(), |extra| {
        let mut keys: HashSet<String> = BASE_STATIC_KEYS.split(',').map(str::to_string).collect();
        keys.extend(
            extra
                .split(',')
                .map(str::trim)
                .filter(|key| !key.is_empty())
                .map(str::to_string),
        );
        Arc::new(keys)
    })
}

/// Annotate `ast` in place. Does nothing for an empty tree.
pub fn optimize(ast: &mut Ast, options: &CompilerOptions) {
    let Some(root) = ast.root else {
        return;
    };
    let optimizer = StaticOptimizer {
        static_keys: static_keys(&options.static_keys),
        is_reserved_tag: options.is_reserved_tag,
    };
    // first pass: mark all non-static nodes
    optimizer.mark_static(ast, root);
    // second pass: mark static roots
    optimizer.mark_static_roots(ast, root, false);
}

struct StaticOptimizer {
    static_keys: Arc<HashSet<String>>,
    is_reserved_tag: TagPredicate,
}

impl StaticOptimizer {
    fn mark_static(&self, ast: &mut Ast, id: NodeId) {
        let is_static = self.is_static(ast, id);
        ast.node_mut(id).set_static(is_static);

        let Some(element) = ast.element(id) else {
            return;
        };
        // Slot content of a component stays dynamic: the component owns it
        if self.is_component(element) {
            return;
        }

        let children = element.children.clone();
        let branches: Vec<NodeId> = element
            .if_conditions
            .iter()
            .skip(1)
            .map(|condition| condition.block)
            .collect();

        let mut subtree_static = is_static;
        for child in children.into_iter().chain(branches) {
            self.mark_static(ast, child);
            if ast.node(child).is_static() != Some(true) {
                subtree_static = false;
            }
        }
        ast.node_mut(id).set_static(subtree_static);
    }

    fn mark_static_roots(&self, ast: &mut Ast, id: NodeId, in_for: bool) {
        let Some(element) = ast.element(id) else {
            return;
        };
        let is_static = element.is_static == Some(true);
        let children = element.children.clone();
        let has_for = element.for_info.is_some();
        let branches: Vec<NodeId> = element
            .if_conditions
            .iter()
            .skip(1)
            .map(|condition| condition.block)
            .collect();

        // A lone text child is cheaper to re-render than to hoist
        let only_text_child =
            children.len() == 1 && matches!(ast.node(children[0]), AstNode::Text(_));
        let is_static_root = is_static && !children.is_empty() && !only_text_child;

        if let Some(element) = ast.element_mut(id) {
            if is_static || element.once {
                element.static_in_for = Some(in_for);
            }
            element.static_root = Some(is_static_root);
        }
        if is_static_root {
            return;
        }

        for child in children {
            self.mark_static_roots(ast, child, in_for || has_for);
        }
        for block in branches {
            self.mark_static_roots(ast, block, in_for);
        }
    }

    fn is_static(&self, ast: &Ast, id: NodeId) -> bool {
        match ast.node(id) {
            AstNode::Expression(_) => false,
            AstNode::Text(_) => true,
            AstNode::Element(element) => {
                element.pre
                    || (!element.has_bindings
                        && element.if_exp.is_none()
                        && element.for_info.is_none()
                        && !is_built_in_tag(&element.tag)
                        && (self.is_reserved_tag)(&element.tag)
                        && !is_direct_child_of_template_for(ast, element)
                        && element
                            .present_keys()
                            .iter()
                            .all(|key| self.static_keys.contains(*key)))
            }
        }
    }

    fn is_component(&self, element: &AstElement) -> bool {
        !(self.is_reserved_tag)(&element.tag)
            && element.tag != "slot"
            && !element.attrs_map.contains_key("inline-template")
    }
}

/// Whether the nearest non-`<template>` ancestor is reached only through
/// `<template>` wrappers, one of which carries `v-for`.
fn is_direct_child_of_template_for(ast: &Ast, element: &AstElement) -> bool {
    let mut parent = element.parent;
    while let Some(ancestor) = parent.and_then(|id| ast.element(id)) {
        if ancestor.tag != "template" {
            return false;
        }
        if ancestor.for_info.is_some() {
            return true;
        }
        parent = ancestor.parent;
    }
    false
}
