/**
 * Tree Builder Tests
 *
 * Element trees, directive processing and structural warnings produced
 * while building the template AST.
 */

#[path = "util/mod.rs"]
mod utils;

#[cfg(test)]
mod tree_builder_tests {
    use super::utils::*;
    use std::sync::{Arc, Mutex};
    use template_compiler::ml_parser::{parse, Ast, AstElement, AstNode, ParseResult};
    use template_compiler::{
        CompileError, CompileWarning, CompilerOptions, WarningKind, WhitespaceMode,
    };

    fn parse_web(template: &str) -> ParseResult {
        parse(template, &CompilerOptions::web()).unwrap()
    }

    fn root(ast: &Ast) -> &AstElement {
        ast.root_element().expect("template has a root element")
    }

    /// First element child of the root
    fn first_child(ast: &Ast) -> &AstElement {
        root(ast)
            .children
            .iter()
            .find_map(|&child| ast.element(child))
            .expect("root has an element child")
    }

    mod structure {
        use super::*;

        #[test]
        fn should_build_nested_elements() {
            assert_eq!(
                parse_and_humanize("<div><span>hi</span>{{ msg }}</div>"),
                vec![
                    row(&["Element", "div", "0"]),
                    row(&["Element", "span", "1"]),
                    row(&["Text", "hi", "2"]),
                    row(&["Expression", "_s(msg)", "1"]),
                ]
            );
        }

        #[test]
        fn should_make_implicitly_closed_list_items_siblings() {
            assert_eq!(
                parse_and_humanize("<ul><li>A<li>B</ul>"),
                vec![
                    row(&["Element", "ul", "0"]),
                    row(&["Element", "li", "1"]),
                    row(&["Text", "A", "2"]),
                    row(&["Element", "li", "1"]),
                    row(&["Text", "B", "2"]),
                ]
            );
        }

        #[test]
        fn should_link_children_to_parents() {
            let result = parse_web("<div><p></p></div>");
            let root_id = result.ast.root.unwrap();
            let child = first_child(&result.ast);
            assert_eq!(child.parent, Some(root_id));
            assert_eq!(root(&result.ast).parent, None);
        }

        #[test]
        fn should_decode_entities_in_text() {
            assert_eq!(
                parse_and_humanize("<div>a &amp; b &lt;c&gt;</div>"),
                vec![
                    row(&["Element", "div", "0"]),
                    row(&["Text", "a & b <c>", "1"]),
                ]
            );
        }

        #[test]
        fn should_keep_comments_when_asked() {
            let options = CompilerOptions {
                should_keep_comments: true,
                ..CompilerOptions::web()
            };
            let result = parse("<div><!--c-->x</div>", &options).unwrap();
            assert_eq!(
                humanize_ast(&result.ast),
                vec![
                    row(&["Element", "div", "0"]),
                    row(&["Comment", "c", "1"]),
                    row(&["Text", "x", "1"]),
                ]
            );
        }

        #[test]
        fn should_record_source_ranges_when_asked() {
            let options = CompilerOptions {
                output_source_range: true,
                ..CompilerOptions::web()
            };
            let result = parse(r#"<div id="a"><p>x</p></div>"#, &options).unwrap();
            let div = root(&result.ast);
            assert_eq!((div.start, div.end), (Some(0), Some(26)));
            let p = first_child(&result.ast);
            assert_eq!((p.start, p.end), (Some(12), Some(20)));
            let id = &div.raw_attrs_map["id"];
            assert_eq!((id.start, id.end), (Some(5), Some(11)));
        }

        #[test]
        fn should_leave_ranges_out_by_default() {
            let result = parse_web(r#"<div id="a"></div>"#);
            let div = root(&result.ast);
            assert_eq!(div.start, None);
            assert!(div.raw_attrs_map.is_empty());
        }
    }

    mod whitespace {
        use super::*;

        const TEMPLATE: &str = "<div>\n  <span>a   b</span>\n  <span>c</span>\n</div>";

        #[test]
        fn should_preserve_inter_element_whitespace_as_one_space() {
            assert_eq!(
                parse_and_humanize(TEMPLATE),
                vec![
                    row(&["Element", "div", "0"]),
                    row(&["Element", "span", "1"]),
                    row(&["Text", "a   b", "2"]),
                    row(&["Text", " ", "1"]),
                    row(&["Element", "span", "1"]),
                    row(&["Text", "c", "2"]),
                ]
            );
        }

        #[test]
        fn should_condense_whitespace() {
            let options = CompilerOptions {
                whitespace: WhitespaceMode::Condense,
                ..CompilerOptions::web()
            };
            let result = parse(TEMPLATE, &options).unwrap();
            assert_eq!(
                humanize_ast(&result.ast),
                vec![
                    row(&["Element", "div", "0"]),
                    row(&["Element", "span", "1"]),
                    row(&["Text", "a b", "2"]),
                    row(&["Element", "span", "1"]),
                    row(&["Text", "c", "2"]),
                ]
            );
        }

        #[test]
        fn should_drop_whitespace_when_not_preserving() {
            let options = CompilerOptions {
                preserve_whitespace: false,
                ..CompilerOptions::web()
            };
            let result = parse(TEMPLATE, &options).unwrap();
            assert_eq!(root(&result.ast).children.len(), 2);
        }

        #[test]
        fn should_keep_whitespace_inside_pre() {
            assert_eq!(
                parse_and_humanize("<pre>  a\n  b </pre>"),
                vec![
                    row(&["Element", "pre", "0"]),
                    row(&["Text", "  a\n  b ", "1"]),
                ]
            );
        }
    }

    mod conditionals {
        use super::*;

        #[test]
        fn should_chain_else_branches_onto_the_if_element() {
            let result = parse_web(
                r#"<div><p v-if="a">1</p><p v-else-if="b">2</p><p v-else>3</p></div>"#,
            );
            assert!(result.warnings.is_empty());
            assert_eq!(root(&result.ast).children.len(), 1);

            let if_el = first_child(&result.ast);
            let exps: Vec<Option<&str>> = if_el
                .if_conditions
                .iter()
                .map(|condition| condition.exp.as_deref())
                .collect();
            assert_eq!(exps, vec![Some("a"), Some("b"), None]);
            assert_eq!(
                humanize_ast(&result.ast),
                vec![
                    row(&["Element", "div", "0"]),
                    row(&["Element", "p", "1"]),
                    row(&["Text", "1", "2"]),
                    row(&["Element", "p", "1"]),
                    row(&["Text", "2", "2"]),
                    row(&["Element", "p", "1"]),
                    row(&["Text", "3", "2"]),
                ]
            );
        }

        #[test]
        fn should_allow_else_branches_at_the_root() {
            let result = parse_web(r#"<p v-if="a">1</p><p v-else>2</p>"#);
            assert!(result.warnings.is_empty());
            assert_eq!(root(&result.ast).if_conditions.len(), 2);
        }

        #[test]
        fn should_drop_text_between_branches() {
            let result = parse_web(r#"<div><p v-if="a"></p>text<p v-else></p></div>"#);
            assert_eq!(
                humanize_warnings(&result.warnings),
                vec![row(&[
                    "TemplateStructure",
                    "text \"text\" between v-if and v-else(-if) will be ignored."
                ])]
            );
            assert_eq!(root(&result.ast).children.len(), 1);
        }

        #[test]
        fn should_warn_about_orphan_else() {
            let result = parse_web(r#"<div><p v-else-if="b"></p><span v-else></span></div>"#);
            assert_eq!(
                humanize_warnings(&result.warnings),
                vec![
                    row(&[
                        "TemplateStructure",
                        "v-else-if=\"b\" used on element <p> without corresponding v-if."
                    ]),
                    row(&[
                        "TemplateStructure",
                        "v-else used on element <span> without corresponding v-if."
                    ]),
                ]
            );
            assert!(root(&result.ast).children.is_empty());
        }
    }

    mod directives {
        use super::*;

        #[test]
        fn should_parse_v_for() {
            let result = parse_web(
                r#"<ul><li v-for="(item, i) in items" :key="item.id" ref="row"></li></ul>"#,
            );
            let li = first_child(&result.ast);
            let info = li.for_info.as_ref().unwrap();
            assert_eq!(info.alias, "item");
            assert_eq!(info.iterator1.as_deref(), Some("i"));
            assert_eq!(info.for_exp, "items");
            assert_eq!(li.key.as_deref(), Some("item.id"));
            assert_eq!(li.ref_.as_deref(), Some("\"row\""));
            assert!(li.ref_in_for);
        }

        #[test]
        fn should_split_attributes_by_kind() {
            let result = parse_web(
                r#"<div id="app" :title="msg | upper" :[name]="val" :text-content.prop="t" v-show="ok" v-my-dir:arg.mod="v"></div>"#,
            );
            let div = root(&result.ast);
            let attrs: Vec<(&str, &str, bool)> = div
                .attrs
                .iter()
                .map(|attr| (attr.name.as_str(), attr.value.as_str(), attr.dynamic))
                .collect();
            assert_eq!(
                attrs,
                vec![
                    ("id", "\"app\"", false),
                    ("title", "_f(\"upper\")(msg)", false),
                    ("name", "val", true),
                ]
            );
            assert_eq!(div.props.len(), 1);
            assert_eq!(div.props[0].name, "textContent");

            let dirs: Vec<(&str, Option<&str>, Vec<String>)> = div
                .directives
                .iter()
                .map(|dir| (dir.name.as_str(), dir.arg.as_deref(), dir.modifiers.clone()))
                .collect();
            assert_eq!(
                dirs,
                vec![
                    ("show", None, vec![]),
                    ("my-dir", Some("arg"), vec!["mod".to_string()]),
                ]
            );
            assert!(div.has_bindings);
            assert!(!div.plain);
        }

        #[test]
        fn should_register_event_handlers() {
            let result = parse_web(
                r#"<div @click.stop="go" @click.right="menu" v-on:keyup.capture="k" @focus.native.once="f"></div>"#,
            );
            let div = root(&result.ast);
            let events: Vec<&str> = div.events.keys().map(String::as_str).collect();
            assert_eq!(events, vec!["click", "contextmenu", "!keyup"]);
            assert_eq!(div.events["click"][0].value, "go");
            assert_eq!(div.events["click"][0].modifiers, vec!["stop".to_string()]);
            assert!(div.events["contextmenu"][0].modifiers.is_empty());
            let native: Vec<&str> = div.native_events.keys().map(String::as_str).collect();
            assert_eq!(native, vec!["~focus"]);
        }

        #[test]
        fn should_only_rename_click_for_mouse_button_modifiers() {
            let result = parse_web(
                r#"<div @click.middle="m" @keyup.right="next" @mousedown.middle="down"></div>"#,
            );
            let div = root(&result.ast);
            let events: Vec<&str> = div.events.keys().map(String::as_str).collect();
            assert_eq!(events, vec!["mouseup", "keyup", "mousedown"]);
            assert_eq!(div.events["mouseup"][0].modifiers, vec!["middle".to_string()]);
            assert_eq!(div.events["keyup"][0].modifiers, vec!["right".to_string()]);
            assert_eq!(div.events["mousedown"][0].modifiers, vec!["middle".to_string()]);
        }

        #[test]
        fn should_rename_dynamic_events_conditionally() {
            let result = parse_web(r#"<div @[evt].right="r"></div>"#);
            let div = root(&result.ast);
            let events: Vec<&str> = div.events.keys().map(String::as_str).collect();
            assert_eq!(events, vec!["(evt)==='click'?'contextmenu':(evt)"]);
            let handler = &div.events["(evt)==='click'?'contextmenu':(evt)"][0];
            assert!(handler.dynamic);
            assert_eq!(handler.modifiers, vec!["right".to_string()]);
        }

        #[test]
        fn should_collect_static_class_and_style() {
            let result = parse_web(
                r#"<div class="  a   b " :class="{ c: on }" style="color: red; font-size: 12px"></div>"#,
            );
            let div = root(&result.ast);
            assert_eq!(div.static_class.as_deref(), Some("\"a b\""));
            assert_eq!(div.class_binding.as_deref(), Some("{ c: on }"));
            assert_eq!(
                div.static_style.as_deref(),
                Some(r#"{"color":"red","font-size":"12px"}"#)
            );
            assert!(div.attrs.is_empty());
        }

        #[test]
        fn should_mark_plain_elements() {
            let result = parse_web(r#"<div><p></p><p id="x"></p></div>"#);
            let flags: Vec<bool> = root(&result.ast)
                .children
                .iter()
                .filter_map(|&child| result.ast.element(child))
                .map(|el| el.plain)
                .collect();
            assert_eq!(flags, vec![true, false]);
        }

        #[test]
        fn should_resolve_components_and_slots() {
            let result = parse_web(
                r#"<div><component :is="view"></component><slot name="footer"></slot></div>"#,
            );
            let children: Vec<&AstElement> = root(&result.ast)
                .children
                .iter()
                .filter_map(|&child| result.ast.element(child))
                .collect();
            assert_eq!(children[0].component.as_deref(), Some("view"));
            assert_eq!(children[1].slot_name.as_deref(), Some("\"footer\""));
        }

        #[test]
        fn should_keep_v_pre_content_raw() {
            let result = parse_web(r#"<div v-pre><span :id="x">{{ a }}</span></div>"#);
            assert!(root(&result.ast).pre);
            let span = first_child(&result.ast);
            assert_eq!(span.attrs[0].name, ":id");
            assert_eq!(span.attrs[0].value, "\"x\"");
            assert!(!span.has_bindings);
            assert!(matches!(
                result.ast.node(span.children[0]),
                AstNode::Text(text) if text.text == "{{ a }}"
            ));
        }

        #[test]
        fn should_use_custom_delimiters() {
            let options = CompilerOptions {
                delimiters: Some(("${".to_string(), "}".to_string())),
                ..CompilerOptions::web()
            };
            let result = parse("<div>${ a } {{ b }}</div>", &options).unwrap();
            assert_eq!(
                humanize_ast(&result.ast),
                vec![
                    row(&["Element", "div", "0"]),
                    row(&["Expression", "_s(a)+\" {{ b }}\"", "1"]),
                ]
            );
        }

        #[test]
        fn should_reject_empty_delimiters() {
            let options = CompilerOptions {
                delimiters: Some(("".to_string(), "}".to_string())),
                ..CompilerOptions::web()
            };
            assert!(matches!(
                parse("<div></div>", &options),
                Err(CompileError::InvalidDelimiters { .. })
            ));
        }
    }

    mod warnings {
        use super::*;

        #[test]
        fn should_warn_about_text_only_templates() {
            let result = parse_web("hello");
            assert_eq!(result.ast.root, None);
            assert_eq!(
                humanize_warnings(&result.warnings),
                vec![row(&[
                    "TemplateStructure",
                    "Component template requires a root element, rather than just text."
                ])]
            );
        }

        #[test]
        fn should_warn_about_text_outside_the_root() {
            let result = parse_web("<div></div>hello");
            assert_eq!(
                humanize_warnings(&result.warnings),
                vec![row(&[
                    "TemplateStructure",
                    "text \"hello\" outside root element will be ignored."
                ])]
            );
        }

        #[test]
        fn should_warn_about_multiple_roots_once() {
            let result = parse_web("<div></div><span></span><p></p>");
            assert_eq!(
                humanize_warnings(&result.warnings),
                vec![row(&[
                    "TemplateStructure",
                    "Component template should contain exactly one root element. \
                     If you are using v-if on multiple elements, use v-else-if to chain them instead."
                ])]
            );
            assert_eq!(root(&result.ast).tag, "div");
        }

        #[test]
        fn should_warn_about_unsuitable_roots() {
            let result = parse_web("<template><div></div></template>");
            assert_eq!(
                result.warnings[0].msg,
                "Cannot use <template> as component root element because it may contain multiple nodes."
            );
            let result = parse_web(r#"<div v-for="x in xs"></div>"#);
            assert_eq!(
                result.warnings[0].msg,
                "Cannot use v-for on stateful component root element because it renders multiple elements."
            );
        }

        #[test]
        fn should_exclude_forbidden_tags() {
            let result = parse_web("<div><style>a{}</style><p></p></div>");
            assert_eq!(result.warnings.len(), 1);
            assert_eq!(result.warnings[0].kind, WarningKind::ForbiddenTag);
            assert_eq!(
                humanize_ast(&result.ast),
                vec![row(&["Element", "div", "0"]), row(&["Element", "p", "1"])]
            );
        }

        #[test]
        fn should_allow_template_scripts() {
            let result = parse_web(r#"<div><script type="text/x-template"></script></div>"#);
            assert!(result.warnings.is_empty());
        }

        #[test]
        fn should_report_attribute_problems() {
            let result = parse_web(
                r#"<div id="a" id="b" title="{{ t }}" :foo=""><p v-for="items"></p></div>"#,
            );
            let messages: Vec<&str> = result.warnings.iter().map(|w| w.msg.as_str()).collect();
            assert_eq!(messages[0], "duplicate attribute: id");
            assert_eq!(messages[1], "Invalid v-for expression: items");
            assert!(messages[2].starts_with(
                "title=\"{{ t }}\": Interpolation inside attributes has been removed."
            ));
            assert_eq!(
                messages[3],
                "The value for a v-bind expression cannot be empty. Found in \"v-bind:foo\""
            );
        }

        #[test]
        fn should_forward_tokenizer_warnings() {
            let result = parse_web("<div><span></div>");
            assert_eq!(result.warnings[0].kind, WarningKind::UnmatchedEndTag);
        }

        #[test]
        fn should_deliver_warnings_to_the_sink() {
            let seen = Arc::new(Mutex::new(Vec::new()));
            let sink = Arc::clone(&seen);
            let options = CompilerOptions::web().with_warning_sink(Arc::new(move |warning: &CompileWarning| {
                sink.lock().unwrap().push(warning.kind);
            }));
            let result = parse("<div><span>", &options).unwrap();
            assert_eq!(result.warnings.len(), 2);
            assert_eq!(
                *seen.lock().unwrap(),
                vec![WarningKind::UnclosedTag, WarningKind::UnclosedTag]
            );
        }
    }
}
