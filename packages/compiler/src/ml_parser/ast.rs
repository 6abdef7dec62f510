//! ML Parser AST
//!
//! Intermediate tree built from the token stream. Nodes live in an arena
//! owned by `Ast` and refer to each other by `NodeId`; parent links are
//! plain ids used for ancestor walks, never for ownership.

use super::tokens::Attribute;
use crate::expression_parser::text_parser::TextToken;
use indexmap::IndexMap;
use serde::Serialize;
use smallvec::SmallVec;

/// Index of a node in its `Ast` arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

/// Template AST: arena of nodes plus the root element, if any
#[derive(Debug, Clone, Default, Serialize)]
pub struct Ast {
    pub nodes: Vec<AstNode>,
    pub root: Option<NodeId>,
}

impl Ast {
    pub fn new() -> Self {
        Ast::default()
    }

    pub fn push(&mut self, node: AstNode) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub fn node(&self, id: NodeId) -> &AstNode {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut AstNode {
        &mut self.nodes[id.0]
    }

    pub fn element(&self, id: NodeId) -> Option<&AstElement> {
        match self.nodes.get(id.0) {
            Some(AstNode::Element(element)) => Some(element),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut AstElement> {
        match self.nodes.get_mut(id.0) {
            Some(AstNode::Element(element)) => Some(element),
            _ => None,
        }
    }

    pub fn root_element(&self) -> Option<&AstElement> {
        self.root.and_then(|id| self.element(id))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Node type union
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind")]
pub enum AstNode {
    Element(AstElement),
    Expression(AstExpression),
    Text(AstText),
}

impl AstNode {
    /// Optimizer verdict, `None` until `optimize` has visited the node
    pub fn is_static(&self) -> Option<bool> {
        match self {
            AstNode::Element(element) => element.is_static,
            AstNode::Expression(expression) => expression.is_static,
            AstNode::Text(text) => text.is_static,
        }
    }

    pub fn set_static(&mut self, value: bool) {
        match self {
            AstNode::Element(element) => element.is_static = Some(value),
            AstNode::Expression(expression) => expression.is_static = Some(value),
            AstNode::Text(text) => text.is_static = Some(value),
        }
    }

    /// Raw text of text and interpolation nodes
    pub fn text(&self) -> Option<&str> {
        match self {
            AstNode::Element(_) => None,
            AstNode::Expression(expression) => Some(&expression.text),
            AstNode::Text(text) => Some(&text.text),
        }
    }

    pub fn as_element(&self) -> Option<&AstElement> {
        match self {
            AstNode::Element(element) => Some(element),
            _ => None,
        }
    }
}

/// Text run containing interpolations
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AstExpression {
    pub expression: String,
    pub tokens: Vec<TextToken>,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<usize>,
    #[serde(rename = "static", skip_serializing_if = "Option::is_none")]
    pub is_static: Option<bool>,
}

/// Plain text, or a comment when `is_comment` is set
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AstText {
    pub text: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_comment: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<usize>,
    #[serde(rename = "static", skip_serializing_if = "Option::is_none")]
    pub is_static: Option<bool>,
}

/// One branch of a `v-if` chain. `exp` is `None` for `v-else`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IfCondition {
    pub exp: Option<String>,
    pub block: NodeId,
}

/// Parsed `v-for="(alias, iterator1, iterator2) in for_exp"`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForInfo {
    #[serde(rename = "for")]
    pub for_exp: String,
    pub alias: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iterator1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iterator2: Option<String>,
}

/// Attribute or DOM property set on the element. `value` is code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AstAttr {
    pub name: String,
    pub value: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub dynamic: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventHandler {
    pub value: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub dynamic: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub modifiers: Vec<String>,
}

/// Any `v-name:arg.modifier="value"` attribute that is not built in
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AstDirective {
    pub name: String,
    pub raw_name: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arg: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_dynamic_arg: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub modifiers: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AstElement {
    pub tag: String,
    /// Attributes not yet consumed by directive processing
    pub attrs_list: Vec<Attribute>,
    pub attrs_map: IndexMap<String, String>,
    pub raw_attrs_map: IndexMap<String, Attribute>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<usize>,
    pub plain: bool,
    pub has_bindings: bool,
    pub pre: bool,
    pub once: bool,

    #[serde(rename = "if", skip_serializing_if = "Option::is_none")]
    pub if_exp: Option<String>,
    #[serde(rename = "elseif", skip_serializing_if = "Option::is_none")]
    pub else_if: Option<String>,
    #[serde(rename = "else")]
    pub is_else: bool,
    #[serde(skip_serializing_if = "SmallVec::is_empty")]
    pub if_conditions: SmallVec<[IfCondition; 2]>,
    #[serde(flatten)]
    pub for_info: Option<ForInfo>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub ref_: Option<String>,
    pub ref_in_for: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    pub inline_template: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slot_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_binding: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style_binding: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attrs: Vec<AstAttr>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub props: Vec<AstAttr>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub events: IndexMap<String, Vec<EventHandler>>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub native_events: IndexMap<String, Vec<EventHandler>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub directives: Vec<AstDirective>,

    /// Side-effect tag, never attached to the tree
    #[serde(skip)]
    pub forbidden: bool,

    #[serde(rename = "static", skip_serializing_if = "Option::is_none")]
    pub is_static: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_root: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_in_for: Option<bool>,
}

impl AstElement {
    pub fn new(tag: impl Into<String>, attrs: Vec<Attribute>, parent: Option<NodeId>) -> Self {
        let attrs_map = attrs
            .iter()
            .map(|attr| (attr.name.clone(), attr.value.clone()))
            .collect();
        AstElement {
            tag: tag.into(),
            attrs_list: attrs,
            attrs_map,
            raw_attrs_map: IndexMap::new(),
            parent,
            children: Vec::new(),
            start: None,
            end: None,
            plain: false,
            has_bindings: false,
            pre: false,
            once: false,
            if_exp: None,
            else_if: None,
            is_else: false,
            if_conditions: SmallVec::new(),
            for_info: None,
            key: None,
            ref_: None,
            ref_in_for: false,
            component: None,
            inline_template: false,
            slot_name: None,
            static_class: None,
            class_binding: None,
            static_style: None,
            style_binding: None,
            attrs: Vec::new(),
            props: Vec::new(),
            events: IndexMap::new(),
            native_events: IndexMap::new(),
            directives: Vec::new(),
            forbidden: false,
            is_static: None,
            static_root: None,
            static_in_for: None,
        }
    }

    /// Names of the populated properties of this element, in the camelCase
    /// vocabulary of the static key set. Optimizer annotations are excluded.
    pub fn present_keys(&self) -> Vec<&'static str> {
        let mut keys = vec![
            "type",
            "tag",
            "attrsList",
            "attrsMap",
            "rawAttrsMap",
            "parent",
            "children",
            "plain",
        ];
        let optional = [
            ("start", self.start.is_some()),
            ("end", self.end.is_some()),
            ("attrs", !self.attrs.is_empty()),
            ("props", !self.props.is_empty()),
            ("hasBindings", self.has_bindings),
            ("pre", self.pre),
            ("if", self.if_exp.is_some()),
            ("elseif", self.else_if.is_some()),
            ("else", self.is_else),
            ("ifConditions", !self.if_conditions.is_empty()),
            ("for", self.for_info.is_some()),
            ("alias", self.for_info.is_some()),
            (
                "iterator1",
                self.for_info.as_ref().map_or(false, |f| f.iterator1.is_some()),
            ),
            (
                "iterator2",
                self.for_info.as_ref().map_or(false, |f| f.iterator2.is_some()),
            ),
            ("once", self.once),
            ("key", self.key.is_some()),
            ("ref", self.ref_.is_some()),
            ("refInFor", self.ref_.is_some()),
            ("component", self.component.is_some()),
            ("inlineTemplate", self.inline_template),
            ("slotName", self.slot_name.is_some()),
            ("staticClass", self.static_class.is_some()),
            ("classBinding", self.class_binding.is_some()),
            ("staticStyle", self.static_style.is_some()),
            ("styleBinding", self.style_binding.is_some()),
            ("events", !self.events.is_empty()),
            ("nativeEvents", !self.native_events.is_empty()),
            ("directives", !self.directives.is_empty()),
        ];
        keys.extend(optional.iter().filter(|(_, set)| *set).map(|(key, _)| *key));
        keys
    }
}

/// Tree visitor. `visit_all` walks children and the secondary branches of
/// `v-if` chains, in document order.
pub trait Visitor {
    /// Return `false` to skip the element's subtree
    fn visit_element(&mut self, _id: NodeId, _element: &AstElement) -> bool {
        true
    }

    fn leave_element(&mut self, _id: NodeId, _element: &AstElement) {}

    fn visit_expression(&mut self, _id: NodeId, _expression: &AstExpression) {}

    fn visit_text(&mut self, _id: NodeId, _text: &AstText) {}
}

pub fn visit_all<V: Visitor + ?Sized>(visitor: &mut V, ast: &Ast, ids: &[NodeId]) {
    for &id in ids {
        match ast.node(id) {
            AstNode::Element(element) => {
                if visitor.visit_element(id, element) {
                    visit_all(visitor, ast, &element.children);
                }
                visitor.leave_element(id, element);
                let branches: Vec<NodeId> = element
                    .if_conditions
                    .iter()
                    .skip(1)
                    .map(|condition| condition.block)
                    .collect();
                visit_all(visitor, ast, &branches);
            }
            AstNode::Expression(expression) => visitor.visit_expression(id, expression),
            AstNode::Text(text) => visitor.visit_text(id, text),
        }
    }
}
