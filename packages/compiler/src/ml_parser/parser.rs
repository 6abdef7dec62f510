//! ML Parser Tree Builder
//!
//! Consumes tokenizer events and assembles the template AST: element
//! nesting, directive extraction, text interpolation and whitespace policy.

use super::ast::{
    Ast, AstAttr, AstDirective, AstElement, AstExpression, AstNode, AstText, EventHandler,
    ForInfo, IfCondition, NodeId,
};
use super::entities::decode_text;
use super::lexer::{parse_html, TokenHandler};
use super::tokens::Attribute;
use crate::config::{CompilerOptions, WhitespaceMode};
use crate::error::Result;
use crate::expression_parser::{parse_filters, parse_text};
use crate::parse_util::{CompileWarning, SourceRange, WarningKind};
use crate::util::json_string;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

static FOR_ALIAS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^(.*?)\s+(?:in|of)\s+(.*)$").unwrap());
static FOR_ITERATOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r",([^,\}\]]*)(?:,([^,\}\]]*))?$").unwrap());
static STRIP_PARENS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\(|\)$").unwrap());
static INVALID_ATTRIBUTE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"[\s"'<>/=]"#).unwrap());
static CAMELIZE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"-(\w)").unwrap());
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \f\t\r\n]+").unwrap());

const ROOT_TEXT_MSG: &str = "Component template requires a root element, rather than just text.";
const MULTIPLE_ROOTS_MSG: &str = "Component template should contain exactly one root element. \
    If you are using v-if on multiple elements, use v-else-if to chain them instead.";

/// Tree building result
#[derive(Debug, Clone, Default)]
pub struct ParseResult {
    pub ast: Ast,
    pub warnings: Vec<CompileWarning>,
}

/// Parse `template` into an AST.
///
/// Only an invalid delimiter configuration fails; problems in the template
/// itself are reported as warnings.
pub fn parse(template: &str, options: &CompilerOptions) -> Result<ParseResult> {
    let delimiters = options.delimiter_pair()?;
    let mut builder = TreeBuilder {
        template,
        options,
        delimiters,
        ast: Ast::new(),
        stack: Vec::new(),
        in_v_pre: false,
        in_pre: false,
        warned: false,
        warnings: Vec::new(),
    };
    parse_html(template, options, &mut builder);
    Ok(ParseResult {
        ast: builder.ast,
        warnings: builder.warnings,
    })
}

struct TreeBuilder<'a> {
    template: &'a str,
    options: &'a CompilerOptions,
    delimiters: Option<(&'a str, &'a str)>,
    ast: Ast,
    stack: Vec<NodeId>,
    in_v_pre: bool,
    in_pre: bool,
    /// Root-level problems are reported once per template
    warned: bool,
    warnings: Vec<CompileWarning>,
}

impl<'a> TokenHandler for TreeBuilder<'a> {
    fn start_tag(&mut self, tag: &str, attrs: Vec<Attribute>, unary: bool, start: usize, end: usize) {
        let parent = self.stack.last().copied();
        let mut warnings = Vec::new();

        for (i, attr) in attrs.iter().enumerate() {
            if attrs[..i].iter().any(|seen| seen.name == attr.name) {
                warnings.push(CompileWarning::new(
                    WarningKind::TemplateStructure,
                    format!("duplicate attribute: {}", attr.name),
                    attr.range(),
                ));
            }
            if INVALID_ATTRIBUTE_RE.is_match(&attr.name) {
                warnings.push(CompileWarning::new(
                    WarningKind::TemplateStructure,
                    "Invalid dynamic argument expression: attribute names cannot contain \
                     spaces, quotes, <, >, / or =.",
                    attr.range(),
                ));
            }
        }

        let mut element = AstElement::new(tag, attrs, parent);
        if self.options.output_source_range {
            element.start = Some(start);
            element.end = Some(end);
            element.raw_attrs_map = element
                .attrs_list
                .iter()
                .map(|attr| (attr.name.clone(), attr.clone()))
                .collect();
        }

        if is_forbidden_tag(&element) {
            element.forbidden = true;
            warnings.push(CompileWarning::new(
                WarningKind::ForbiddenTag,
                format!(
                    "Templates should only be responsible for mapping the state to the UI. \
                     Avoid placing tags with side-effects in your templates, such as <{}>, \
                     as they will not be parsed.",
                    tag
                ),
                Some(SourceRange::at(start)),
            ));
        }

        if !self.in_v_pre {
            process_pre(&mut element);
            if element.pre {
                self.in_v_pre = true;
            }
        }
        if (self.options.is_pre_tag)(&element.tag) {
            self.in_pre = true;
        }
        if self.in_v_pre {
            process_raw_attrs(&mut element);
        } else {
            process_for(&mut element, &mut warnings);
            process_if(&mut element);
            process_once(&mut element);
        }

        let if_exp = element.if_exp.clone();
        let id = self.ast.push(AstNode::Element(element));
        if let (Some(exp), Some(element)) = (if_exp, self.ast.element_mut(id)) {
            element.if_conditions.push(IfCondition {
                exp: Some(exp),
                block: id,
            });
        }

        for warning in warnings {
            self.warn(warning);
        }

        if self.ast.root.is_none() {
            self.ast.root = Some(id);
            self.check_root_constraints(id);
        }

        if unary {
            self.close_element(id);
        } else {
            self.stack.push(id);
        }
    }

    fn end_tag(&mut self, _name: &str, _start: usize, end: usize) {
        let Some(id) = self.stack.pop() else {
            return;
        };
        if self.options.output_source_range {
            if let Some(element) = self.ast.element_mut(id) {
                element.end = Some(end);
            }
        }
        self.close_element(id);
    }

    fn text(&mut self, text: &str, start: usize, end: usize) {
        let Some(parent) = self.stack.last().copied() else {
            if text == self.template {
                self.warn_once(ROOT_TEXT_MSG.to_string(), start);
            } else {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    self.warn_once(
                        format!("text \"{}\" outside root element will be ignored.", trimmed),
                        start,
                    );
                }
            }
            return;
        };
        let Some(parent_element) = self.ast.element(parent) else {
            return;
        };

        let children = &parent_element.children;
        let last_is_space = children
            .last()
            .and_then(|&child| self.ast.node(child).text())
            .map_or(false, |last| last == " ");

        let mut text = if self.in_pre || !text.trim().is_empty() {
            if is_text_tag(&parent_element.tag) {
                text.to_string()
            } else {
                decode_text(text)
            }
        } else if children.is_empty() {
            // whitespace right after an opening tag
            String::new()
        } else {
            match self.options.whitespace {
                WhitespaceMode::Condense if text.contains(['\r', '\n']) => String::new(),
                WhitespaceMode::Condense => " ".to_string(),
                WhitespaceMode::Preserve if self.options.preserve_whitespace => " ".to_string(),
                WhitespaceMode::Preserve => String::new(),
            }
        };
        if text.is_empty() {
            return;
        }
        if !self.in_pre && self.options.whitespace == WhitespaceMode::Condense {
            text = WHITESPACE_RE.replace_all(&text, " ").into_owned();
        }

        let (start, end) = self.source_range(start, end);
        let parsed = if !self.in_v_pre && text != " " {
            parse_text(&text, self.delimiters)
        } else {
            None
        };
        let node = match parsed {
            Some(result) => AstNode::Expression(AstExpression {
                expression: result.expression,
                tokens: result.tokens,
                text,
                start,
                end,
                is_static: None,
            }),
            None if text != " " || children.is_empty() || !last_is_space => AstNode::Text(AstText {
                text,
                is_comment: false,
                start,
                end,
                is_static: None,
            }),
            None => return,
        };
        self.append_child(parent, node);
    }

    fn comment(&mut self, text: &str, start: usize, end: usize) {
        let Some(parent) = self.stack.last().copied() else {
            return;
        };
        let (start, end) = self.source_range(start, end);
        self.append_child(
            parent,
            AstNode::Text(AstText {
                text: text.to_string(),
                is_comment: true,
                start,
                end,
                is_static: None,
            }),
        );
    }

    fn warn(&mut self, warning: CompileWarning) {
        debug!("template warning: {}", warning);
        self.options.emit_warning(&warning);
        self.warnings.push(warning);
    }
}

impl<'a> TreeBuilder<'a> {
    fn warn_once(&mut self, msg: String, start: usize) {
        if !self.warned {
            self.warned = true;
            self.warn(CompileWarning::new(
                WarningKind::TemplateStructure,
                msg,
                Some(SourceRange::at(start)),
            ));
        }
    }

    fn source_range(&self, start: usize, end: usize) -> (Option<usize>, Option<usize>) {
        if self.options.output_source_range {
            (Some(start), Some(end))
        } else {
            (None, None)
        }
    }

    fn append_child(&mut self, parent: NodeId, node: AstNode) {
        let id = self.ast.push(node);
        if let Some(parent) = self.ast.element_mut(parent) {
            parent.children.push(id);
        }
    }

    fn close_element(&mut self, id: NodeId) {
        self.trim_ending_whitespace(id);
        if !self.in_v_pre {
            self.process_element(id);
        }

        let Some(element) = self.ast.element(id) else {
            return;
        };
        let is_branch = element.else_if.is_some() || element.is_else;
        let else_if = element.else_if.clone();
        let forbidden = element.forbidden;
        let start = element.start.unwrap_or(0);

        if self.stack.is_empty() && self.ast.root != Some(id) {
            // extra roots are only allowed as branches of a v-if root
            let root = self.ast.root;
            let root_has_if = self
                .ast
                .root_element()
                .map_or(false, |root| root.if_exp.is_some());
            match root {
                Some(root) if root_has_if && is_branch => {
                    self.check_root_constraints(id);
                    self.add_if_condition(root, else_if.clone(), id);
                }
                _ => self.warn_once(MULTIPLE_ROOTS_MSG.to_string(), start),
            }
        }

        if let Some(parent) = self.stack.last().copied() {
            if !forbidden {
                if is_branch {
                    self.process_if_conditions(id, parent);
                } else if let Some(parent) = self.ast.element_mut(parent) {
                    parent.children.push(id);
                }
            }
        }

        self.trim_ending_whitespace(id);

        if let Some(element) = self.ast.element(id) {
            if element.pre {
                self.in_v_pre = false;
            }
            if (self.options.is_pre_tag)(&element.tag) {
                self.in_pre = false;
            }
        }
    }

    fn trim_ending_whitespace(&mut self, id: NodeId) {
        if self.in_pre {
            return;
        }
        loop {
            let Some(&last) = self.ast.element(id).and_then(|el| el.children.last()) else {
                return;
            };
            match self.ast.node(last) {
                AstNode::Text(text) if text.text == " " => {}
                _ => return,
            }
            if let Some(element) = self.ast.element_mut(id) {
                element.children.pop();
            }
        }
    }

    fn check_root_constraints(&mut self, id: NodeId) {
        let Some(element) = self.ast.element(id) else {
            return;
        };
        let start = element.start.unwrap_or(0);
        if element.tag == "slot" || element.tag == "template" {
            let msg = format!(
                "Cannot use <{}> as component root element because it may contain multiple nodes.",
                element.tag
            );
            self.warn_once(msg, start);
        } else if element.attrs_map.contains_key("v-for") {
            self.warn_once(
                "Cannot use v-for on stateful component root element because it renders \
                 multiple elements."
                    .to_string(),
                start,
            );
        }
    }

    fn add_if_condition(&mut self, target: NodeId, exp: Option<String>, block: NodeId) {
        if let Some(element) = self.ast.element_mut(target) {
            element.if_conditions.push(IfCondition { exp, block });
        }
    }

    /// Attach a `v-else-if`/`v-else` element to the `v-if` sibling before it.
    fn process_if_conditions(&mut self, id: NodeId, parent: NodeId) {
        let prev = self.find_prev_element(parent);
        let has_if = prev
            .and_then(|prev| self.ast.element(prev))
            .map_or(false, |prev| prev.if_exp.is_some());
        let Some(element) = self.ast.element(id) else {
            return;
        };
        let else_if = element.else_if.clone();

        match prev {
            Some(prev) if has_if => self.add_if_condition(prev, else_if, id),
            _ => {
                let (directive, attr) = match &else_if {
                    Some(exp) => (format!("else-if=\"{}\"", exp), "v-else-if"),
                    None => ("else".to_string(), "v-else"),
                };
                let msg = format!(
                    "v-{} used on element <{}> without corresponding v-if.",
                    directive, element.tag
                );
                let range = element.raw_attrs_map.get(attr).and_then(Attribute::range);
                self.warn(CompileWarning::new(WarningKind::TemplateStructure, msg, range));
            }
        }
    }

    /// Last element child of `parent`. Text nodes after it are dropped.
    fn find_prev_element(&mut self, parent: NodeId) -> Option<NodeId> {
        loop {
            let &last = self.ast.element(parent)?.children.last()?;
            let node = self.ast.node(last);
            if node.as_element().is_some() {
                return Some(last);
            }
            let text = node.text().unwrap_or_default().to_string();
            if text != " " {
                let range = match node {
                    AstNode::Text(t) => t.start.map(SourceRange::at),
                    AstNode::Expression(e) => e.start.map(SourceRange::at),
                    AstNode::Element(_) => None,
                };
                self.warn(CompileWarning::new(
                    WarningKind::TemplateStructure,
                    format!(
                        "text \"{}\" between v-if and v-else(-if) will be ignored.",
                        text.trim()
                    ),
                    range,
                ));
            }
            if let Some(parent) = self.ast.element_mut(parent) {
                parent.children.pop();
            }
        }
    }

    fn is_in_for(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current.and_then(|id| self.ast.element(id)) {
            if node.for_info.is_some() {
                return true;
            }
            current = node.parent;
        }
        false
    }

    fn process_element(&mut self, id: NodeId) {
        let ref_in_for = self.is_in_for(id);
        let delimiters = self.delimiters;
        let mut warnings = Vec::new();

        if let Some(element) = self.ast.element_mut(id) {
            process_key(element, &mut warnings);
            // plain: nothing left to render beyond the tag itself
            element.plain = element.key.is_none() && element.attrs_list.is_empty();
            process_ref(element, ref_in_for);
            process_slot_outlet(element, &mut warnings);
            process_component(element);
            process_class(element, delimiters, &mut warnings);
            process_style(element, delimiters, &mut warnings);
            process_attrs(element, delimiters, &mut warnings);
        }

        for warning in warnings {
            self.warn(warning);
        }
    }
}

fn is_text_tag(tag: &str) -> bool {
    tag == "script" || tag == "style"
}

fn is_forbidden_tag(element: &AstElement) -> bool {
    element.tag == "style"
        || (element.tag == "script"
            && element
                .attrs_map
                .get("type")
                .map_or(true, |ty| ty.is_empty() || ty == "text/javascript"))
}

fn attr_range(element: &AstElement, name: &str) -> Option<SourceRange> {
    element.raw_attrs_map.get(name).and_then(Attribute::range)
}

/// Remove `name` from the unprocessed attribute list and return its value.
/// The attribute map keeps the entry unless `remove_from_map` is set.
fn get_and_remove_attr(element: &mut AstElement, name: &str, remove_from_map: bool) -> Option<String> {
    let value = element.attrs_map.get(name).cloned();
    if value.is_some() {
        if let Some(pos) = element.attrs_list.iter().position(|attr| attr.name == name) {
            element.attrs_list.remove(pos);
        }
    }
    if remove_from_map {
        element.attrs_map.shift_remove(name);
    }
    value
}

/// Value of `:name` / `v-bind:name` as code, falling back to the static
/// attribute as a string literal when `get_static` is set.
fn get_binding_attr(element: &mut AstElement, name: &str, get_static: bool) -> Option<String> {
    let dynamic = get_and_remove_attr(element, &format!(":{}", name), false)
        .filter(|value| !value.is_empty())
        .or_else(|| get_and_remove_attr(element, &format!("v-bind:{}", name), false));
    if let Some(dynamic) = dynamic {
        return Some(parse_filters(&dynamic));
    }
    if get_static {
        return get_and_remove_attr(element, name, false).map(|value| json_string(&value));
    }
    None
}

fn process_pre(element: &mut AstElement) {
    if get_and_remove_attr(element, "v-pre", false).is_some() {
        element.pre = true;
    }
}

fn process_raw_attrs(element: &mut AstElement) {
    if !element.attrs_list.is_empty() {
        element.attrs = element
            .attrs_list
            .iter()
            .map(|attr| AstAttr {
                name: attr.name.clone(),
                value: json_string(&attr.value),
                dynamic: false,
            })
            .collect();
    } else if !element.pre {
        // non-root element inside a v-pre block
        element.plain = true;
    }
}

/// Parse a `v-for` expression into its alias, iterators and source.
pub fn parse_for(exp: &str) -> Option<ForInfo> {
    let caps = FOR_ALIAS_RE.captures(exp)?;
    let for_exp = caps.get(2)?.as_str().trim().to_string();
    let alias = STRIP_PARENS_RE
        .replace_all(caps.get(1)?.as_str().trim(), "")
        .into_owned();

    match FOR_ITERATOR_RE.captures(&alias) {
        Some(iterators) => Some(ForInfo {
            for_exp,
            alias: FOR_ITERATOR_RE.replace(&alias, "").trim().to_string(),
            iterator1: iterators.get(1).map(|m| m.as_str().trim().to_string()),
            iterator2: iterators
                .get(2)
                .map(|m| m.as_str().trim().to_string())
                .filter(|it| !it.is_empty()),
        }),
        None => Some(ForInfo {
            for_exp,
            alias,
            iterator1: None,
            iterator2: None,
        }),
    }
}

fn process_for(element: &mut AstElement, warnings: &mut Vec<CompileWarning>) {
    let Some(exp) = get_and_remove_attr(element, "v-for", false).filter(|exp| !exp.is_empty()) else {
        return;
    };
    match parse_for(&exp) {
        Some(info) => element.for_info = Some(info),
        None => warnings.push(CompileWarning::new(
            WarningKind::TemplateStructure,
            format!("Invalid v-for expression: {}", exp),
            attr_range(element, "v-for"),
        )),
    }
}

fn process_if(element: &mut AstElement) {
    if let Some(exp) = get_and_remove_attr(element, "v-if", false).filter(|exp| !exp.is_empty()) {
        element.if_exp = Some(exp);
        return;
    }
    if get_and_remove_attr(element, "v-else", false).is_some() {
        element.is_else = true;
    }
    if let Some(exp) = get_and_remove_attr(element, "v-else-if", false).filter(|exp| !exp.is_empty()) {
        element.else_if = Some(exp);
    }
}

fn process_once(element: &mut AstElement) {
    if get_and_remove_attr(element, "v-once", false).is_some() {
        element.once = true;
    }
}

fn process_key(element: &mut AstElement, warnings: &mut Vec<CompileWarning>) {
    let Some(exp) = get_binding_attr(element, "key", true).filter(|exp| !exp.is_empty()) else {
        return;
    };
    if element.tag == "template" {
        warnings.push(CompileWarning::new(
            WarningKind::TemplateStructure,
            "<template> cannot be keyed. Place the key on real elements instead.",
            attr_range(element, "key").or_else(|| attr_range(element, ":key")),
        ));
    }
    element.key = Some(exp);
}

fn process_ref(element: &mut AstElement, in_for: bool) {
    if let Some(exp) = get_binding_attr(element, "ref", true).filter(|exp| !exp.is_empty()) {
        element.ref_ = Some(exp);
        element.ref_in_for = in_for;
    }
}

fn process_slot_outlet(element: &mut AstElement, warnings: &mut Vec<CompileWarning>) {
    if element.tag != "slot" {
        return;
    }
    element.slot_name = get_binding_attr(element, "name", true);
    if element.key.is_some() {
        warnings.push(CompileWarning::new(
            WarningKind::TemplateStructure,
            "`key` does not work on <slot> because slots are abstract outlets and can possibly \
             expand into multiple elements. Use the key on a wrapping element instead.",
            attr_range(element, "key"),
        ));
    }
}

fn process_component(element: &mut AstElement) {
    if let Some(binding) = get_binding_attr(element, "is", true) {
        element.component = Some(binding);
    }
    if get_and_remove_attr(element, "inline-template", false).is_some() {
        element.inline_template = true;
    }
}

fn interpolation_in_attr_warning(name: &str, value: &str) -> String {
    format!(
        "{}=\"{}\": Interpolation inside attributes has been removed. Use v-bind or the colon \
         shorthand instead. For example, instead of <div {}=\"{{{{ val }}}}\">, use <div :{}=\"val\">.",
        name, value, name, name
    )
}

fn process_class(
    element: &mut AstElement,
    delimiters: Option<(&str, &str)>,
    warnings: &mut Vec<CompileWarning>,
) {
    if let Some(static_class) = get_and_remove_attr(element, "class", false) {
        if parse_text(&static_class, delimiters).is_some() {
            warnings.push(CompileWarning::new(
                WarningKind::TemplateStructure,
                interpolation_in_attr_warning("class", &static_class),
                attr_range(element, "class"),
            ));
        }
        let collapsed = WHITESPACE_RE.replace_all(&static_class, " ");
        let collapsed = collapsed.trim();
        if !collapsed.is_empty() {
            element.static_class = Some(json_string(collapsed));
        }
    }
    if let Some(binding) = get_binding_attr(element, "class", false).filter(|b| !b.is_empty()) {
        element.class_binding = Some(binding);
    }
}

fn process_style(
    element: &mut AstElement,
    delimiters: Option<(&str, &str)>,
    warnings: &mut Vec<CompileWarning>,
) {
    if let Some(static_style) = get_and_remove_attr(element, "style", false) {
        if parse_text(&static_style, delimiters).is_some() {
            warnings.push(CompileWarning::new(
                WarningKind::TemplateStructure,
                interpolation_in_attr_warning("style", &static_style),
                attr_range(element, "style"),
            ));
        }
        if !static_style.is_empty() {
            element.static_style = Some(Value::Object(parse_style_text(&static_style)).to_string());
        }
    }
    if let Some(binding) = get_binding_attr(element, "style", false).filter(|b| !b.is_empty()) {
        element.style_binding = Some(binding);
    }
}

/// Split inline CSS into property/value pairs. Semicolons inside
/// parentheses (`url(data:...;base64,...)`) do not end a declaration.
pub fn parse_style_text(css: &str) -> Map<String, Value> {
    let mut declarations = Vec::new();
    let mut depth = 0i32;
    let mut last = 0;
    for (i, ch) in css.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth -= 1,
            ';' if depth <= 0 => {
                declarations.push(&css[last..i]);
                last = i + 1;
            }
            _ => {}
        }
    }
    declarations.push(&css[last..]);

    let mut style = Map::new();
    for declaration in declarations {
        if let Some((property, value)) = declaration.split_once(':') {
            style.insert(
                property.trim().to_string(),
                Value::String(value.trim().to_string()),
            );
        }
    }
    style
}

fn camelize(name: &str) -> String {
    CAMELIZE_RE
        .replace_all(name, |caps: &regex::Captures| caps[1].to_uppercase())
        .into_owned()
}

/// Strip `v-`, `@`, `:` or `#`
fn strip_directive_prefix(name: &str) -> Option<&str> {
    name.strip_prefix("v-")
        .or_else(|| name.strip_prefix('@'))
        .or_else(|| name.strip_prefix(':'))
        .or_else(|| name.strip_prefix('#'))
}

fn strip_bind_prefix(name: &str) -> Option<&str> {
    name.strip_prefix(':')
        .or_else(|| name.strip_prefix("v-bind:"))
}

fn strip_on_prefix(name: &str) -> Option<&str> {
    name.strip_prefix('@')
        .or_else(|| name.strip_prefix("v-on:"))
}

/// Split `name.mod1.mod2` into the name and its modifiers. Dots inside a
/// dynamic `[argument]` are not modifier separators.
fn split_modifiers(name: &str) -> (&str, Vec<String>) {
    let search_from = name.rfind(']').map_or(0, |i| i + 1);
    match name[search_from..].find('.') {
        None => (name, Vec::new()),
        Some(dot) => {
            let split = search_from + dot;
            let modifiers = name[split + 1..]
                .split('.')
                .filter(|m| !m.is_empty())
                .map(str::to_string)
                .collect();
            (&name[..split], modifiers)
        }
    }
}

/// `[arg]` to `(arg, true)`
fn dynamic_arg(name: &str) -> (String, bool) {
    if name.len() >= 2 && name.starts_with('[') && name.ends_with(']') {
        (name[1..name.len() - 1].to_string(), true)
    } else {
        (name.to_string(), false)
    }
}

fn process_attrs(
    element: &mut AstElement,
    delimiters: Option<(&str, &str)>,
    warnings: &mut Vec<CompileWarning>,
) {
    let list = element.attrs_list.clone();
    for attr in &list {
        let raw_name = attr.name.as_str();

        if strip_directive_prefix(raw_name).is_none() {
            if parse_text(&attr.value, delimiters).is_some() {
                warnings.push(CompileWarning::new(
                    WarningKind::TemplateStructure,
                    interpolation_in_attr_warning(raw_name, &attr.value),
                    attr.range(),
                ));
            }
            element.attrs.push(AstAttr {
                name: raw_name.to_string(),
                value: json_string(&attr.value),
                dynamic: false,
            });
            element.plain = false;
            continue;
        }

        element.has_bindings = true;
        let (name, mut modifiers) = split_modifiers(raw_name);

        if let Some(bound) = strip_bind_prefix(name) {
            let value = parse_filters(&attr.value);
            let (mut name, dynamic) = dynamic_arg(bound);
            if value.trim().is_empty() {
                warnings.push(CompileWarning::new(
                    WarningKind::TemplateStructure,
                    format!(
                        "The value for a v-bind expression cannot be empty. Found in \"v-bind:{}\"",
                        name
                    ),
                    attr.range(),
                ));
            }
            let is_prop = modifiers.iter().any(|m| m == "prop");
            if !dynamic && (is_prop || modifiers.iter().any(|m| m == "camel")) {
                name = camelize(&name);
                if name == "innerHtml" {
                    name = "innerHTML".to_string();
                }
            }
            let binding = AstAttr { name, value, dynamic };
            if is_prop {
                element.props.push(binding);
            } else {
                element.attrs.push(binding);
            }
            element.plain = false;
        } else if let Some(event) = strip_on_prefix(name) {
            let (mut name, dynamic) = dynamic_arg(event);
            // Mouse button modifiers only rename click listeners.
            if let Some(pos) = modifiers.iter().position(|m| m == "right") {
                if dynamic {
                    name = format!("({})==='click'?'contextmenu':({})", name, name);
                } else if name == "click" {
                    modifiers.remove(pos);
                    name = "contextmenu".to_string();
                }
            } else if modifiers.iter().any(|m| m == "middle") {
                if dynamic {
                    name = format!("({})==='click'?'mouseup':({})", name, name);
                } else if name == "click" {
                    name = "mouseup".to_string();
                }
            }
            add_handler(element, name, attr.value.trim(), modifiers, dynamic);
        } else {
            let directive = strip_directive_prefix(name).unwrap_or(name);
            let (directive_name, arg, is_dynamic_arg) = match directive.split_once(':') {
                Some((directive_name, arg)) => {
                    let (arg, dynamic) = dynamic_arg(arg);
                    (directive_name.to_string(), Some(arg), dynamic)
                }
                None => (directive.to_string(), None, false),
            };
            element.directives.push(AstDirective {
                name: directive_name,
                raw_name: raw_name.to_string(),
                value: attr.value.clone(),
                arg,
                is_dynamic_arg,
                modifiers,
            });
            element.plain = false;
        }
    }
}

/// Register an event handler. `capture`, `once` and `passive` become name
/// markers (`!`, `~`, `&`); `native` selects the component root listeners.
fn add_handler(
    element: &mut AstElement,
    mut name: String,
    value: &str,
    mut modifiers: Vec<String>,
    dynamic: bool,
) {
    for (modifier, marker) in [("capture", '!'), ("once", '~'), ("passive", '&')] {
        if let Some(pos) = modifiers.iter().position(|m| m == modifier) {
            modifiers.remove(pos);
            name.insert(0, marker);
        }
    }
    let native = match modifiers.iter().position(|m| m == "native") {
        Some(pos) => {
            modifiers.remove(pos);
            true
        }
        None => false,
    };

    let handler = EventHandler {
        value: value.to_string(),
        dynamic,
        modifiers,
    };
    let events = if native {
        &mut element.native_events
    } else {
        &mut element.events
    };
    events.entry(name).or_default().push(handler);
    element.plain = false;
}
