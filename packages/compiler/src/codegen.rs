//! Code Generation
//!
//! Turns an annotated AST into render function bodies. The generator only
//! reads the tree; bookkeeping about which nodes were already emitted lives
//! in a per-call state.

use crate::config::{CompilerOptions, TagPredicate};
use crate::ml_parser::ast::{Ast, AstAttr, AstElement, AstNode, EventHandler, IfCondition, NodeId};
use crate::util::json_string;
use indexmap::IndexMap;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;

static SIMPLE_PATH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^[A-Za-z_$][\w$]*(?:\.[A-Za-z_$][\w$]*|\['[^']*?'\]|\["[^"]*?"\]|\[\d+\]|\[[A-Za-z_$][\w$]*\])*$"#,
    )
    .unwrap()
});
static FN_EXP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([\w$]+|\([^)]*?\))\s*=>|^function(?:\s+[\w$]+)?\s*\(").unwrap());
static FN_INVOKE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\([^)]*?\);*$").unwrap());

/// Generated render function bodies. `static_render_fns[i]` is the body
/// referenced by `_m(i)` in the generated code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodegenResult {
    pub render: String,
    pub static_render_fns: Vec<String>,
}

/// Produces render code from an annotated AST. Must not mutate the tree.
pub trait CodeGenerator {
    fn generate(&self, ast: &Ast, options: &CompilerOptions) -> CodegenResult;
}

/// Default generator emitting `with(this){return ...}` bodies
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderCodegen;

impl CodeGenerator for RenderCodegen {
    fn generate(&self, ast: &Ast, options: &CompilerOptions) -> CodegenResult {
        let mut state = CodegenState {
            ast,
            is_reserved_tag: options.is_reserved_tag,
            static_render_fns: Vec::new(),
            static_processed: HashSet::new(),
            once_processed: HashSet::new(),
            for_processed: HashSet::new(),
            if_processed: HashSet::new(),
            once_id: 0,
            pre: false,
        };
        let code = match ast.root {
            Some(root) => state.gen_element(root),
            None => "_c('div')".to_string(),
        };
        CodegenResult {
            render: format!("with(this){{return {}}}", code),
            static_render_fns: state.static_render_fns,
        }
    }
}

struct CodegenState<'a> {
    ast: &'a Ast,
    is_reserved_tag: TagPredicate,
    static_render_fns: Vec<String>,
    static_processed: HashSet<NodeId>,
    once_processed: HashSet<NodeId>,
    for_processed: HashSet<NodeId>,
    if_processed: HashSet<NodeId>,
    once_id: usize,
    pre: bool,
}

impl<'a> CodegenState<'a> {
    fn gen_element(&mut self, id: NodeId) -> String {
        let ast = self.ast;
        let Some(el) = ast.element(id) else {
            return self.gen_node(id);
        };

        if el.static_root == Some(true) && !self.static_processed.contains(&id) {
            self.gen_static(id, el)
        } else if el.once && !self.once_processed.contains(&id) {
            self.gen_once(id, el)
        } else if el.for_info.is_some() && !self.for_processed.contains(&id) {
            self.gen_for(id, el)
        } else if el.if_exp.is_some() && !self.if_processed.contains(&id) {
            self.gen_if(id, el)
        } else if el.tag == "template" && !self.pre {
            self.gen_children(el, false)
                .unwrap_or_else(|| "void 0".to_string())
        } else if el.tag == "slot" {
            self.gen_slot(el)
        } else if let Some(component) = &el.component {
            let data = self.gen_data(el);
            let children = if el.inline_template {
                None
            } else {
                self.gen_children(el, true)
            };
            format!(
                "_c({},{}{})",
                component,
                data,
                children.map(|c| format!(",{}", c)).unwrap_or_default()
            )
        } else {
            let data = if !el.plain || (el.pre && self.maybe_component(el)) {
                Some(self.gen_data(el))
            } else {
                None
            };
            let children = if el.inline_template {
                None
            } else {
                self.gen_children(el, true)
            };
            format!(
                "_c('{}'{}{})",
                el.tag,
                data.map(|d| format!(",{}", d)).unwrap_or_default(),
                children.map(|c| format!(",{}", c)).unwrap_or_default()
            )
        }
    }

    /// Hoist into `static_render_fns` and reference it by index
    fn gen_static(&mut self, id: NodeId, el: &AstElement) -> String {
        self.static_processed.insert(id);
        let original_pre = self.pre;
        if el.pre {
            self.pre = true;
        }
        let body = self.gen_element(id);
        self.static_render_fns
            .push(format!("with(this){{return {}}}", body));
        self.pre = original_pre;
        format!(
            "_m({}{})",
            self.static_render_fns.len() - 1,
            if el.static_in_for == Some(true) { ",true" } else { "" }
        )
    }

    fn gen_once(&mut self, id: NodeId, el: &AstElement) -> String {
        self.once_processed.insert(id);
        if el.if_exp.is_some() && !self.if_processed.contains(&id) {
            return self.gen_if(id, el);
        }
        if el.static_in_for != Some(true) {
            return self.gen_static(id, el);
        }

        let ast = self.ast;
        let mut key = None;
        let mut parent = el.parent;
        while let Some(ancestor) = parent.and_then(|p| ast.element(p)) {
            if ancestor.for_info.is_some() {
                key = ancestor.key.clone();
                break;
            }
            parent = ancestor.parent;
        }
        match key {
            Some(key) => {
                let code = self.gen_element(id);
                let once_id = self.once_id;
                self.once_id += 1;
                format!("_o({},{},{})", code, once_id, key)
            }
            None => {
                debug!("v-once on <{}> inside an unkeyed v-for is ignored", el.tag);
                self.gen_element(id)
            }
        }
    }

    fn gen_if(&mut self, id: NodeId, el: &AstElement) -> String {
        self.if_processed.insert(id);
        let conditions: Vec<IfCondition> = el.if_conditions.to_vec();
        self.gen_if_conditions(&conditions)
    }

    fn gen_if_conditions(&mut self, conditions: &[IfCondition]) -> String {
        let Some((condition, rest)) = conditions.split_first() else {
            return "_e()".to_string();
        };
        let block = self.gen_ternary_exp(condition.block);
        match &condition.exp {
            Some(exp) => format!("({})?{}:{}", exp, block, self.gen_if_conditions(rest)),
            None => block,
        }
    }

    fn gen_ternary_exp(&mut self, id: NodeId) -> String {
        let ast = self.ast;
        match ast.element(id) {
            Some(el) if el.once => self.gen_once(id, el),
            _ => self.gen_element(id),
        }
    }

    fn gen_for(&mut self, id: NodeId, el: &AstElement) -> String {
        self.for_processed.insert(id);
        let Some(info) = &el.for_info else {
            return self.gen_element(id);
        };
        let iterator1 = info
            .iterator1
            .as_ref()
            .map(|it| format!(",{}", it))
            .unwrap_or_default();
        let iterator2 = info
            .iterator2
            .as_ref()
            .map(|it| format!(",{}", it))
            .unwrap_or_default();
        format!(
            "_l(({}),function({}{}{}){{return {}}})",
            info.for_exp,
            info.alias,
            iterator1,
            iterator2,
            self.gen_element(id)
        )
    }

    fn gen_children(&mut self, el: &AstElement, check_skip: bool) -> Option<String> {
        let ast = self.ast;
        let first = *el.children.first()?;

        if el.children.len() == 1 {
            if let Some(child) = ast.element(first) {
                // a single v-for child is returned as the array itself
                if child.for_info.is_some() && child.tag != "template" && child.tag != "slot" {
                    let normalization = match (check_skip, self.maybe_component(child)) {
                        (false, _) => "",
                        (true, true) => ",1",
                        (true, false) => ",0",
                    };
                    return Some(format!("{}{}", self.gen_element(first), normalization));
                }
            }
        }

        let normalization = if check_skip {
            self.normalization_type(&el.children)
        } else {
            0
        };
        let nodes: Vec<String> = el.children.iter().map(|&child| self.gen_node(child)).collect();
        Some(format!(
            "[{}]{}",
            nodes.join(","),
            if normalization > 0 {
                format!(",{}", normalization)
            } else {
                String::new()
            }
        ))
    }

    /// 0: none, 1: simple (component children), 2: full (lists, templates, slots)
    fn normalization_type(&self, children: &[NodeId]) -> u8 {
        let ast = self.ast;
        let mut res = 0;
        for &child in children {
            let Some(el) = ast.element(child) else {
                continue;
            };
            let branches = || el.if_conditions.iter().filter_map(|c| ast.element(c.block));
            if needs_normalization(el) || branches().any(needs_normalization) {
                return 2;
            }
            if self.maybe_component(el) || branches().any(|b| self.maybe_component(b)) {
                res = 1;
            }
        }
        res
    }

    fn maybe_component(&self, el: &AstElement) -> bool {
        el.component.is_some() || !(self.is_reserved_tag)(&el.tag)
    }

    fn gen_node(&mut self, id: NodeId) -> String {
        let ast = self.ast;
        match ast.node(id) {
            AstNode::Element(_) => self.gen_element(id),
            AstNode::Text(text) if text.is_comment => format!("_e({})", js_string(&text.text)),
            AstNode::Text(text) => format!("_v({})", js_string(&text.text)),
            AstNode::Expression(expression) => format!("_v({})", expression.expression),
        }
    }

    fn gen_slot(&mut self, el: &AstElement) -> String {
        let slot_name = el.slot_name.as_deref().unwrap_or("\"default\"");
        let children = self.gen_children(el, false);
        let mut res = format!("_t({}", slot_name);
        if let Some(children) = &children {
            res.push_str(&format!(",function(){{return {}}}", children));
        }
        if !el.attrs.is_empty() {
            if children.is_none() {
                res.push_str(",null");
            }
            res.push(',');
            res.push_str(&gen_props(&el.attrs));
        }
        res.push(')');
        res
    }

    fn gen_data(&self, el: &AstElement) -> String {
        let mut data = Vec::new();

        if !el.directives.is_empty() {
            let dirs: Vec<String> = el
                .directives
                .iter()
                .map(|dir| {
                    let mut code = format!(
                        "{{name:{},rawName:{}",
                        json_string(&dir.name),
                        json_string(&dir.raw_name)
                    );
                    if !dir.value.is_empty() {
                        code.push_str(&format!(
                            ",value:({}),expression:{}",
                            dir.value,
                            json_string(&dir.value)
                        ));
                    }
                    if let Some(arg) = &dir.arg {
                        if dir.is_dynamic_arg {
                            code.push_str(&format!(",arg:{}", arg));
                        } else {
                            code.push_str(&format!(",arg:{}", json_string(arg)));
                        }
                    }
                    if !dir.modifiers.is_empty() {
                        code.push_str(&format!(",modifiers:{}", modifiers_object(&dir.modifiers)));
                    }
                    code.push('}');
                    code
                })
                .collect();
            data.push(format!("directives:[{}]", dirs.join(",")));
        }
        if let Some(key) = &el.key {
            data.push(format!("key:{}", key));
        }
        if let Some(ref_) = &el.ref_ {
            data.push(format!("ref:{}", ref_));
        }
        if el.ref_in_for {
            data.push("refInFor:true".to_string());
        }
        if el.pre {
            data.push("pre:true".to_string());
        }
        if el.component.is_some() {
            data.push(format!("tag:\"{}\"", el.tag));
        }
        if let Some(static_class) = &el.static_class {
            data.push(format!("staticClass:{}", static_class));
        }
        if let Some(class_binding) = &el.class_binding {
            data.push(format!("class:{}", class_binding));
        }
        if let Some(static_style) = &el.static_style {
            data.push(format!("staticStyle:{}", static_style));
        }
        if let Some(style_binding) = &el.style_binding {
            data.push(format!("style:({})", style_binding));
        }
        if !el.attrs.is_empty() {
            data.push(format!("attrs:{}", gen_props(&el.attrs)));
        }
        if !el.props.is_empty() {
            data.push(format!("domProps:{}", gen_props(&el.props)));
        }
        if !el.events.is_empty() {
            data.push(gen_handlers(&el.events, false));
        }
        if !el.native_events.is_empty() {
            data.push(gen_handlers(&el.native_events, true));
        }

        format!("{{{}}}", data.join(","))
    }
}

fn needs_normalization(el: &AstElement) -> bool {
    el.for_info.is_some() || el.tag == "template" || el.tag == "slot"
}

/// JSON string literal that is also safe inside a JavaScript function body
fn js_string(s: &str) -> String {
    json_string(s)
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029")
}

fn modifiers_object(modifiers: &[String]) -> String {
    let entries: Vec<String> = modifiers
        .iter()
        .map(|m| format!("{}:true", json_string(m)))
        .collect();
    format!("{{{}}}", entries.join(","))
}

fn gen_props(props: &[AstAttr]) -> String {
    let mut static_props = Vec::new();
    let mut dynamic_props = Vec::new();
    for prop in props {
        let value = prop
            .value
            .replace('\u{2028}', "\\u2028")
            .replace('\u{2029}', "\\u2029");
        if prop.dynamic {
            dynamic_props.push(format!("{},{}", prop.name, value));
        } else {
            static_props.push(format!("\"{}\":{}", prop.name, value));
        }
    }
    let static_props = format!("{{{}}}", static_props.join(","));
    if dynamic_props.is_empty() {
        static_props
    } else {
        format!("_d({},[{}])", static_props, dynamic_props.join(","))
    }
}

fn gen_handlers(events: &IndexMap<String, Vec<EventHandler>>, native: bool) -> String {
    let prefix = if native { "nativeOn:" } else { "on:" };
    let mut static_handlers = Vec::new();
    let mut dynamic_handlers = Vec::new();
    for (name, handlers) in events {
        let code = if handlers.len() == 1 {
            gen_handler(&handlers[0])
        } else {
            let all: Vec<String> = handlers.iter().map(gen_handler).collect();
            format!("[{}]", all.join(","))
        };
        if handlers.iter().any(|h| h.dynamic) {
            dynamic_handlers.push(format!("{},{}", name, code));
        } else {
            static_handlers.push(format!("\"{}\":{}", name, code));
        }
    }
    let static_handlers = format!("{{{}}}", static_handlers.join(","));
    if dynamic_handlers.is_empty() {
        format!("{}{}", prefix, static_handlers)
    } else {
        format!(
            "{}_d({},[{}])",
            prefix,
            static_handlers,
            dynamic_handlers.join(",")
        )
    }
}

fn modifier_guard(modifier: &str) -> Option<&'static str> {
    match modifier {
        "stop" => Some("$event.stopPropagation();"),
        "prevent" => Some("$event.preventDefault();"),
        "self" => Some("if($event.target !== $event.currentTarget)return null;"),
        "ctrl" => Some("if(!$event.ctrlKey)return null;"),
        "shift" => Some("if(!$event.shiftKey)return null;"),
        "alt" => Some("if(!$event.altKey)return null;"),
        "meta" => Some("if(!$event.metaKey)return null;"),
        "left" => Some("if('button' in $event && $event.button !== 0)return null;"),
        "middle" => Some("if('button' in $event && $event.button !== 1)return null;"),
        "right" => Some("if('button' in $event && $event.button !== 2)return null;"),
        _ => None,
    }
}

/// Key code and `KeyboardEvent.key` values for the built-in key aliases.
fn key_alias(key: &str) -> Option<(&'static str, &'static str)> {
    match key {
        "esc" => Some(("27", r#"["Esc","Escape"]"#)),
        "tab" => Some(("9", r#""Tab""#)),
        "enter" => Some(("13", r#""Enter""#)),
        "space" => Some(("32", r#"[" ","Spacebar"]"#)),
        "up" => Some(("38", r#"["Up","ArrowUp"]"#)),
        "left" => Some(("37", r#"["Left","ArrowLeft"]"#)),
        "right" => Some(("39", r#"["Right","ArrowRight"]"#)),
        "down" => Some(("40", r#"["Down","ArrowDown"]"#)),
        "delete" => Some(("[8,46]", r#"["Backspace","Delete","Del"]"#)),
        _ => None,
    }
}

fn gen_key_check(key: &str) -> String {
    if let Ok(code) = key.parse::<u32>() {
        if code != 0 {
            return format!("$event.keyCode!=={}", code);
        }
    }
    let (code, name) = key_alias(key).unwrap_or(("undefined", "undefined"));
    format!(
        "_k($event.keyCode,{},{},$event.key,{})",
        json_string(key),
        code,
        name
    )
}

/// Guards for a modifier list, in order. Unknown modifiers are key names
/// checked through `_k`; `left` and `right` guard both mouse and keyboard.
fn gen_guards(modifiers: &[String]) -> String {
    let mut guards = String::new();
    let mut keys = Vec::new();
    for modifier in modifiers {
        if let Some(guard) = modifier_guard(modifier) {
            guards.push_str(guard);
            if key_alias(modifier).is_some() {
                keys.push(modifier.as_str());
            }
        } else if modifier == "exact" {
            let missing: Vec<String> = ["ctrl", "shift", "alt", "meta"]
                .iter()
                .filter(|m| !modifiers.iter().any(|other| other == *m))
                .map(|m| format!("$event.{}Key", m))
                .collect();
            guards.push_str(&format!("if({})return null;", missing.join("||")));
        } else {
            keys.push(modifier.as_str());
        }
    }
    if keys.is_empty() {
        return guards;
    }
    let checks: Vec<String> = keys.into_iter().map(gen_key_check).collect();
    format!(
        "if(!$event.type.indexOf('key')&&{})return null;{}",
        checks.join("&&"),
        guards
    )
}

fn gen_handler(handler: &EventHandler) -> String {
    let value = handler.value.as_str();
    let is_method_path = SIMPLE_PATH_RE.is_match(value);
    let is_function_expression = FN_EXP_RE.is_match(value);
    let is_function_invocation = SIMPLE_PATH_RE.is_match(&FN_INVOKE_RE.replace(value, ""));

    if handler.modifiers.is_empty() {
        if is_method_path || is_function_expression {
            return value.to_string();
        }
        return if is_function_invocation {
            format!("function($event){{return {}}}", value)
        } else {
            format!("function($event){{{}}}", value)
        };
    }

    let guards = gen_guards(&handler.modifiers);
    let handler_code = if is_method_path {
        format!("return {}.apply(null, arguments)", value)
    } else if is_function_expression {
        format!("return ({}).apply(null, arguments)", value)
    } else if is_function_invocation {
        format!("return {}", value)
    } else {
        value.to_string()
    };
    format!("function($event){{{}{}}}", guards, handler_code)
}
