/**
 * Text Parser Tests
 *
 * Interpolation splitting for the default and custom delimiters.
 */

#[cfg(test)]
mod tests {
    use template_compiler::expression_parser::{parse_text, TextToken};

    fn literal(text: &str) -> TextToken {
        TextToken::Literal(text.to_string())
    }

    fn binding(exp: &str) -> TextToken {
        TextToken::Binding {
            binding: exp.to_string(),
        }
    }

    mod default_delimiters {
        use super::*;

        #[test]
        fn should_return_none_without_interpolation() {
            assert_eq!(parse_text("hello", None), None);
            assert_eq!(parse_text("{ not } {{}}", None), None);
        }

        #[test]
        fn should_concatenate_literals_and_bindings() {
            let result = parse_text("Hi {{ name }}!", None).unwrap();
            assert_eq!(result.expression, "\"Hi \"+_s(name)+\"!\"");
            assert_eq!(
                result.tokens,
                vec![literal("Hi "), binding("name"), literal("!")]
            );
        }

        #[test]
        fn should_apply_filters_inside_interpolation() {
            let result = parse_text("{{ a | b | c(1) }}", None).unwrap();
            assert_eq!(result.expression, "_s(_f(\"c\")(_f(\"b\")(a),1))");
            assert_eq!(result.tokens, vec![binding("_f(\"c\")(_f(\"b\")(a),1)")]);
        }

        #[test]
        fn should_handle_adjacent_interpolations() {
            let result = parse_text("{{a}}{{b}}", None).unwrap();
            assert_eq!(result.expression, "_s(a)+_s(b)");
        }

        #[test]
        fn should_escape_literal_text() {
            let result = parse_text("\"quoted\"\n{{ x }}", None).unwrap();
            assert_eq!(result.expression, "\"\\\"quoted\\\"\\n\"+_s(x)");
        }

        #[test]
        fn should_span_lines_inside_interpolation() {
            let result = parse_text("{{ a +\n b }}", None).unwrap();
            assert_eq!(result.expression, "_s(a +\n b)");
        }
    }

    mod custom_delimiters {
        use super::*;

        #[test]
        fn should_use_the_given_delimiters() {
            let result = parse_text("${ a } and {{ b }}", Some(("${", "}"))).unwrap();
            assert_eq!(result.expression, "_s(a)+\" and {{ b }}\"");
        }

        #[test]
        fn should_escape_regex_metacharacters() {
            let result = parse_text("[[ a ]]", Some(("[[", "]]"))).unwrap();
            assert_eq!(result.expression, "_s(a)");
            assert_eq!(parse_text("{{ a }}", Some(("[[", "]]"))), None);
        }
    }
}
