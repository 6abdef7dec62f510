/**
 * HTML Tokenizer Tests
 *
 * Event sequences produced by the streaming tokenizer, including the
 * implicit-close rules and recovery from malformed markup.
 */

#[path = "util/mod.rs"]
mod utils;

#[cfg(test)]
mod html_lexer_tests {
    use super::utils::*;
    use template_compiler::ml_parser::{tokenize, Token};
    use template_compiler::{CompilerOptions, WarningKind};

    mod tags {
        use super::*;

        #[test]
        fn should_emit_events_in_source_order() {
            assert_eq!(
                tokenize_and_humanize("<div><span>hi</span></div>"),
                vec![
                    row(&["START_TAG", "div"]),
                    row(&["START_TAG", "span"]),
                    row(&["TEXT", "hi"]),
                    row(&["END_TAG", "span"]),
                    row(&["END_TAG", "div"]),
                ]
            );
        }

        #[test]
        fn should_parse_attributes_in_every_quoting_style() {
            assert_eq!(
                tokenize_and_humanize(r#"<input id="a" name='b' size=3 disabled>"#),
                vec![row(&[
                    "START_TAG", "input", "id=a", "name=b", "size=3", "disabled=", "/"
                ])]
            );
        }

        #[test]
        fn should_treat_self_closing_syntax_as_unary() {
            assert_eq!(
                tokenize_and_humanize("<div><my-comp/></div>"),
                vec![
                    row(&["START_TAG", "div"]),
                    row(&["START_TAG", "my-comp", "/"]),
                    row(&["END_TAG", "div"]),
                ]
            );
        }

        #[test]
        fn should_parse_dynamic_arguments() {
            assert_eq!(
                tokenize_and_humanize(r#"<a :[key]="url" @[evt].stop="go">x</a>"#),
                vec![
                    row(&["START_TAG", "a", ":[key]=url", "@[evt].stop=go"]),
                    row(&["TEXT", "x"]),
                    row(&["END_TAG", "a"]),
                ]
            );
        }

        #[test]
        fn should_decode_attribute_entities() {
            assert_eq!(
                tokenize_and_humanize(r#"<div title="a &lt; b &amp;&amp; c"></div>"#),
                vec![
                    row(&["START_TAG", "div", "title=a < b && c"]),
                    row(&["END_TAG", "div"]),
                ]
            );
        }

        #[test]
        fn should_decode_newlines_in_href_only_when_asked() {
            let options = CompilerOptions {
                should_decode_newlines_for_href: true,
                ..CompilerOptions::web()
            };
            let result = tokenize(r#"<a href="x&#10;y" title="x&#10;y"></a>"#, &options);
            assert_eq!(
                humanize_tokens(&result.tokens)[0],
                row(&["START_TAG", "a", "href=x\ny", "title=x&#10;y"])
            );
        }

        #[test]
        fn should_report_byte_ranges() {
            let result = tokenize("<p>ab</p>", &CompilerOptions::web());
            assert_eq!(
                humanize_token_ranges(&result.tokens),
                vec![
                    row(&["StartTag", "0..3"]),
                    row(&["Text", "3..5"]),
                    row(&["EndTag", "5..9"]),
                ]
            );
        }

        #[test]
        fn should_only_record_attribute_ranges_when_requested() {
            let plain = tokenize(r#"<div id="a"></div>"#, &CompilerOptions::web());
            let ranged = tokenize(
                r#"<div id="a"></div>"#,
                &CompilerOptions {
                    output_source_range: true,
                    ..CompilerOptions::web()
                },
            );
            match (&plain.tokens[0], &ranged.tokens[0]) {
                (
                    template_compiler::ml_parser::Token::StartTag { attrs: plain, .. },
                    template_compiler::ml_parser::Token::StartTag { attrs: ranged, .. },
                ) => {
                    assert_eq!(plain[0].start, None);
                    assert_eq!(ranged[0].start, Some(5));
                    assert_eq!(ranged[0].end, Some(11));
                }
                other => panic!("unexpected tokens {:?}", other),
            }
        }
    }

    mod implicit_close {
        use super::*;

        #[test]
        fn should_close_open_list_items() {
            let result = tokenize("<ul><li>A<li>B</ul>", &CompilerOptions::web());
            assert_eq!(
                humanize_tokens(&result.tokens),
                vec![
                    row(&["START_TAG", "ul"]),
                    row(&["START_TAG", "li"]),
                    row(&["TEXT", "A"]),
                    row(&["END_TAG", "li"]),
                    row(&["START_TAG", "li"]),
                    row(&["TEXT", "B"]),
                    row(&["END_TAG", "li"]),
                    row(&["END_TAG", "ul"]),
                ]
            );
        }

        #[test]
        fn should_close_a_paragraph_before_block_content() {
            assert_eq!(
                tokenize_and_humanize("<p>a<div>b</div>"),
                vec![
                    row(&["START_TAG", "p"]),
                    row(&["TEXT", "a"]),
                    row(&["END_TAG", "p"]),
                    row(&["START_TAG", "div"]),
                    row(&["TEXT", "b"]),
                    row(&["END_TAG", "div"]),
                ]
            );
        }

        #[test]
        fn should_keep_phrasing_content_inside_a_paragraph() {
            assert_eq!(
                tokenize_and_humanize("<p><span>x</span></p>"),
                vec![
                    row(&["START_TAG", "p"]),
                    row(&["START_TAG", "span"]),
                    row(&["TEXT", "x"]),
                    row(&["END_TAG", "span"]),
                    row(&["END_TAG", "p"]),
                ]
            );
        }

        #[test]
        fn should_not_apply_html_rules_without_expect_html() {
            let options = CompilerOptions {
                expect_html: false,
                ..CompilerOptions::web()
            };
            let result = tokenize("<p>a<div>b</div></p>", &options);
            assert_eq!(
                humanize_tokens(&result.tokens),
                vec![
                    row(&["START_TAG", "p"]),
                    row(&["TEXT", "a"]),
                    row(&["START_TAG", "div"]),
                    row(&["TEXT", "b"]),
                    row(&["END_TAG", "div"]),
                    row(&["END_TAG", "p"]),
                ]
            );
        }

        #[test]
        fn should_turn_stray_br_and_p_end_tags_into_elements() {
            assert_eq!(
                tokenize_and_humanize("<div></br></p></div>"),
                vec![
                    row(&["START_TAG", "div"]),
                    row(&["START_TAG", "br", "/"]),
                    row(&["START_TAG", "p"]),
                    row(&["END_TAG", "p"]),
                    row(&["END_TAG", "div"]),
                ]
            );
        }

        #[test]
        fn should_ignore_end_tags_without_an_open_element() {
            let result = tokenize("<div></span></div>", &CompilerOptions::web());
            assert_eq!(
                humanize_tokens(&result.tokens),
                vec![row(&["START_TAG", "div"]), row(&["END_TAG", "div"])]
            );
            assert!(result.warnings.is_empty());
        }

        #[test]
        fn should_match_end_tags_case_insensitively() {
            assert_eq!(
                tokenize_and_humanize("<DIV>x</div>"),
                vec![
                    row(&["START_TAG", "DIV"]),
                    row(&["TEXT", "x"]),
                    row(&["END_TAG", "DIV"]),
                ]
            );
        }
    }

    mod raw_text {
        use super::*;

        #[test]
        fn should_not_tokenize_script_content() {
            assert_eq!(
                tokenize_and_humanize("<script>if (a < b) { x = '</div>' }</script>"),
                vec![
                    row(&["START_TAG", "script"]),
                    row(&["TEXT", "if (a < b) { x = '</div>' }"]),
                    row(&["END_TAG", "script"]),
                ]
            );
        }

        #[test]
        fn should_drop_the_first_newline_of_textarea() {
            assert_eq!(
                tokenize_and_humanize("<textarea>\n<b>x</b></textarea>"),
                vec![
                    row(&["START_TAG", "textarea"]),
                    row(&["TEXT", "<b>x</b>"]),
                    row(&["END_TAG", "textarea"]),
                ]
            );
        }

        #[test]
        fn should_drop_the_first_newline_of_pre() {
            assert_eq!(
                tokenize_and_humanize("<pre>\nx</pre>"),
                vec![
                    row(&["START_TAG", "pre"]),
                    row(&["TEXT", "x"]),
                    row(&["END_TAG", "pre"]),
                ]
            );
        }

        #[test]
        fn should_unwrap_markers_in_extra_raw_text_tags() {
            fn is_raw(tag: &str) -> bool {
                tag == "xmp"
            }
            let options = CompilerOptions {
                is_raw_text_tag: is_raw,
                ..CompilerOptions::web()
            };
            let result = tokenize("<xmp><!--a--><![CDATA[b]]><i></xmp>", &options);
            assert_eq!(
                humanize_tokens(&result.tokens),
                vec![
                    row(&["START_TAG", "xmp"]),
                    row(&["TEXT", "ab<i>"]),
                    row(&["END_TAG", "xmp"]),
                ]
            );
        }
    }

    mod comments {
        use super::*;

        #[test]
        fn should_drop_comments_by_default() {
            assert_eq!(
                tokenize_and_humanize("<div><!-- note --></div>"),
                vec![row(&["START_TAG", "div"]), row(&["END_TAG", "div"])]
            );
        }

        #[test]
        fn should_keep_comments_when_asked() {
            let options = CompilerOptions {
                should_keep_comments: true,
                ..CompilerOptions::web()
            };
            let result = tokenize("<div><!-- note --></div>", &options);
            assert_eq!(
                humanize_tokens(&result.tokens),
                vec![
                    row(&["START_TAG", "div"]),
                    row(&["COMMENT", " note "]),
                    row(&["END_TAG", "div"]),
                ]
            );
        }

        #[test]
        fn should_skip_conditional_comments() {
            assert_eq!(
                tokenize_and_humanize("<div><![if !IE]>x</div>"),
                vec![
                    row(&["START_TAG", "div"]),
                    row(&["TEXT", "x"]),
                    row(&["END_TAG", "div"]),
                ]
            );
        }

        #[test]
        fn should_emit_doctype() {
            assert_eq!(
                tokenize_and_humanize("<!DOCTYPE html><div></div>"),
                vec![
                    row(&["DOC_TYPE", "<!DOCTYPE html>"]),
                    row(&["START_TAG", "div"]),
                    row(&["END_TAG", "div"]),
                ]
            );
        }
    }

    mod recovery {
        use super::*;

        #[test]
        fn should_treat_a_lone_less_than_as_text() {
            let result = tokenize("<div>a < b</div>", &CompilerOptions::web());
            assert_eq!(
                humanize_tokens(&result.tokens),
                vec![
                    row(&["START_TAG", "div"]),
                    row(&["TEXT", "a < b"]),
                    row(&["END_TAG", "div"]),
                ]
            );
            assert!(result.warnings.is_empty());
        }

        #[test]
        fn should_warn_about_malformed_tags_at_the_end() {
            let result = tokenize(r#"<div><span id="a"#, &CompilerOptions::web());
            assert_eq!(
                humanize_tokens(&result.tokens),
                vec![
                    row(&["START_TAG", "div"]),
                    row(&["TEXT", r#"<span id="a"#]),
                    row(&["END_TAG", "div"]),
                ]
            );
            assert_eq!(
                humanize_warnings(&result.warnings),
                vec![
                    row(&[
                        "MalformedTag",
                        r#"Mal-formatted tag at end of template: "<span id="a""#
                    ]),
                    row(&["UnclosedTag", "tag <div> has no matching end tag."]),
                ]
            );
        }

        #[test]
        fn should_warn_about_unclosed_elements() {
            let result = tokenize("<div><span>", &CompilerOptions::web());
            assert_eq!(
                humanize_tokens(&result.tokens),
                vec![
                    row(&["START_TAG", "div"]),
                    row(&["START_TAG", "span"]),
                    row(&["END_TAG", "span"]),
                    row(&["END_TAG", "div"]),
                ]
            );
            assert_eq!(
                humanize_warnings(&result.warnings),
                vec![
                    row(&["UnclosedTag", "tag <span> has no matching end tag."]),
                    row(&["UnclosedTag", "tag <div> has no matching end tag."]),
                ]
            );
        }

        #[test]
        fn should_warn_about_elements_closed_by_an_ancestor() {
            let result = tokenize("<div><span></div>", &CompilerOptions::web());
            assert_eq!(
                humanize_warnings(&result.warnings),
                vec![row(&["UnmatchedEndTag", "tag <span> has no matching end tag."])]
            );
            let range = result.warnings[0].range.unwrap();
            assert_eq!((range.start, range.end), (5, Some(11)));
        }

        #[test]
        fn should_close_a_raw_text_element_without_end_tag() {
            let result = tokenize("<textarea>abc", &CompilerOptions::web());
            assert_eq!(
                humanize_tokens(&result.tokens),
                vec![
                    row(&["START_TAG", "textarea"]),
                    row(&["END_TAG", "textarea"]),
                    row(&["TEXT", "abc"]),
                ]
            );
            assert_eq!(result.warnings[0].kind, WarningKind::MalformedTag);
        }

        #[test]
        fn should_leave_unterminated_raw_text_to_the_open_parent() {
            let result = tokenize("<div><textarea>abc", &CompilerOptions::web());
            assert_eq!(
                humanize_tokens(&result.tokens),
                vec![
                    row(&["START_TAG", "div"]),
                    row(&["START_TAG", "textarea"]),
                    row(&["END_TAG", "textarea"]),
                    row(&["TEXT", "abc"]),
                    row(&["END_TAG", "div"]),
                ]
            );
            assert_eq!(
                humanize_warnings(&result.warnings),
                vec![row(&["UnclosedTag", "tag <div> has no matching end tag."])]
            );
        }
    }

    mod nesting {
        use super::*;

        /// Serialize events back to markup, checking every end event closes
        /// the innermost open element.
        fn reassemble(tokens: &[Token]) -> String {
            let mut out = String::new();
            let mut open: Vec<&str> = Vec::new();
            for token in tokens {
                match token {
                    Token::StartTag {
                        name, attrs, unary, ..
                    } => {
                        out.push('<');
                        out.push_str(name);
                        for attr in attrs {
                            out.push_str(&format!(" {}=\"{}\"", attr.name, attr.value));
                        }
                        out.push('>');
                        if !unary {
                            open.push(name);
                        }
                    }
                    Token::EndTag { name, .. } => {
                        assert_eq!(open.pop(), Some(name.as_str()), "unbalanced </{}>", name);
                        out.push_str(&format!("</{}>", name));
                    }
                    Token::Text { text, .. } => out.push_str(text),
                    Token::Comment { text, .. } => out.push_str(&format!("<!--{}-->", text)),
                    Token::DocType { text, .. } => out.push_str(text),
                }
            }
            assert!(open.is_empty(), "unclosed elements: {:?}", open);
            out
        }

        #[test]
        fn should_reproduce_well_formed_templates() {
            let templates = [
                r#"<div id="app"><p class="a b">Hello <b>world</b></p><ul><li>1</li><li>2</li></ul></div>"#,
                r#"<section><img src="a.png"><br><span title="x">t</span></section>"#,
                "<table><tbody><tr><td>a</td><td>b</td></tr></tbody></table>",
                r#"<div><script type="text/x-template"><p>raw</p></script><textarea>a < b</textarea></div>"#,
                r#"<svg viewBox="0 0 1 1"><path d="M0 0"></path></svg>"#,
                "<div>\n  <p>{{ a }}</p>\n  <my-comp v-if=\"ok\"><span>x</span></my-comp>\n</div>",
            ];
            for template in templates {
                let result = tokenize(template, &CompilerOptions::web());
                assert!(result.warnings.is_empty(), "{}: {:?}", template, result.warnings);
                assert_eq!(reassemble(&result.tokens), template);
            }
        }

        #[test]
        fn should_keep_comments_when_asked() {
            let template = "<div><!-- note --><p>x</p></div>";
            let options = CompilerOptions {
                should_keep_comments: true,
                ..CompilerOptions::web()
            };
            let result = tokenize(template, &options);
            assert_eq!(reassemble(&result.tokens), template);
        }
    }
}
