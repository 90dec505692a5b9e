//! Tokenizer for template content.
//!
//! Template content supports two kinds of `{{...}}` tokens:
//!
//! - `{{name}}` - variable substitution; `name` is ASCII letters, digits and `_`
//! - `{{file: path}}` - inclusion of another file, relative to the template directory
//!
//! Anything else between braces, and an unterminated `{{`, is literal text.
//!
//! # Example
//!
//! ```
//! use promptkit::template::{tokenize, Segment};
//!
//! let segments = tokenize("Hi {{name}}! {{file: footer.md}}");
//! assert_eq!(segments[1], Segment::Variable {
//!     name: "name".to_string(),
//!     raw: "{{name}}".to_string(),
//! });
//! assert!(matches!(&segments[3], Segment::Include { path, .. } if path == "footer.md"));
//! ```

const OPEN: &str = "{{";
const CLOSE: &str = "}}";
const INCLUDE_PREFIX: &str = "file:";

/// A segment of template content.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Literal text
    Literal(String),
    /// Variable reference: {{name}}
    Variable { name: String, raw: String },
    /// File inclusion: {{file: path}}
    Include { path: String, raw: String },
}

impl Segment {
    /// The original text this segment was parsed from.
    pub fn source(&self) -> &str {
        match self {
            Self::Literal(text) => text,
            Self::Variable { raw, .. } | Self::Include { raw, .. } => raw,
        }
    }
}

/// Split template content into segments.
///
/// Concatenating the [`Segment::source`] of every segment reproduces the
/// input exactly.
pub fn tokenize(input: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut rest = input;

    while let Some(start) = rest.find(OPEN) {
        literal.push_str(&rest[..start]);
        let body = &rest[start + OPEN.len()..];

        let Some(end) = body.find(CLOSE) else {
            rest = &rest[start..];
            break;
        };

        let inner = &body[..end];
        match classify(inner, &rest[start..start + OPEN.len() + end + CLOSE.len()]) {
            Some(segment) => {
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(segment);
                rest = &body[end + CLOSE.len()..];
            }
            None => {
                // Not a token: keep one brace and rescan, so `{{{x}}}` still finds `{{x}}`.
                literal.push('{');
                rest = &rest[start + 1..];
            }
        }
    }

    literal.push_str(rest);
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }

    segments
}

fn classify(inner: &str, raw: &str) -> Option<Segment> {
    let trimmed = inner.trim();

    if let Some(path) = trimmed.strip_prefix(INCLUDE_PREFIX) {
        let path = path.trim();
        if path.is_empty() {
            return None;
        }
        return Some(Segment::Include {
            path: path.to_string(),
            raw: raw.to_string(),
        });
    }

    if is_variable_name(trimmed) {
        return Some(Segment::Variable {
            name: trimmed.to_string(),
            raw: raw.to_string(),
        });
    }

    None
}

/// Check whether `name` is a valid variable name.
pub fn is_variable_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Unique variable names in order of first appearance.
pub fn variable_names(input: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for segment in tokenize(input) {
        if let Segment::Variable { name, .. } = segment {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}

/// Inclusion paths in order of appearance (duplicates kept).
pub fn inclusion_paths(input: &str) -> Vec<String> {
    tokenize(input)
        .into_iter()
        .filter_map(|segment| match segment {
            Segment::Include { path, .. } => Some(path),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(name: &str) -> Segment {
        Segment::Variable {
            name: name.to_string(),
            raw: format!("{{{{{}}}}}", name),
        }
    }

    #[test]
    fn literal_only() {
        assert_eq!(
            tokenize("hello world"),
            vec![Segment::Literal("hello world".to_string())]
        );
    }

    #[test]
    fn empty_input_has_no_segments() {
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn single_variable() {
        assert_eq!(tokenize("{{name}}"), vec![var("name")]);
    }

    #[test]
    fn variable_with_surrounding_text() {
        assert_eq!(
            tokenize("Hello, {{name}}!"),
            vec![
                Segment::Literal("Hello, ".to_string()),
                var("name"),
                Segment::Literal("!".to_string()),
            ]
        );
    }

    #[test]
    fn variable_whitespace_is_trimmed() {
        let segments = tokenize("{{ topic }}");
        assert_eq!(
            segments,
            vec![Segment::Variable {
                name: "topic".to_string(),
                raw: "{{ topic }}".to_string(),
            }]
        );
    }

    #[test]
    fn include_token() {
        let segments = tokenize("{{file: parts/intro.md}}");
        assert_eq!(
            segments,
            vec![Segment::Include {
                path: "parts/intro.md".to_string(),
                raw: "{{file: parts/intro.md}}".to_string(),
            }]
        );
    }

    #[test]
    fn include_without_space_after_colon() {
        assert_eq!(inclusion_paths("{{file:a.md}}"), vec!["a.md"]);
    }

    #[test]
    fn empty_include_path_is_literal() {
        assert_eq!(
            tokenize("{{file: }}"),
            vec![Segment::Literal("{{file: }}".to_string())]
        );
    }

    #[test]
    fn non_identifier_braces_are_literal() {
        assert_eq!(
            tokenize("{{not a var}}"),
            vec![Segment::Literal("{{not a var}}".to_string())]
        );
    }

    #[test]
    fn unterminated_open_is_literal() {
        assert_eq!(
            tokenize("start {{name"),
            vec![Segment::Literal("start {{name".to_string())]
        );
    }

    #[test]
    fn triple_braces_find_inner_variable() {
        assert_eq!(
            tokenize("{{{x}}}"),
            vec![
                Segment::Literal("{".to_string()),
                var("x"),
                Segment::Literal("}".to_string()),
            ]
        );
    }

    #[test]
    fn sources_reproduce_input() {
        let input = "a {{x}} b {{ y }} {{file: z.md}} {{bad token}} {{{w}}} {{tail";
        let rebuilt: String = tokenize(input).iter().map(Segment::source).collect();
        assert_eq!(rebuilt, input);
    }

    #[test]
    fn multibyte_text_is_preserved() {
        let input = "héllo {{name}} — wörld";
        let rebuilt: String = tokenize(input).iter().map(Segment::source).collect();
        assert_eq!(rebuilt, input);
        assert_eq!(variable_names(input), vec!["name"]);
    }

    #[test]
    fn variable_names_are_unique_and_ordered() {
        assert_eq!(
            variable_names("{{b}} {{a}} {{b}} {{file: x.md}}"),
            vec!["b", "a"]
        );
    }

    #[test]
    fn inclusion_paths_keep_duplicates() {
        assert_eq!(
            inclusion_paths("{{file: a.md}} and {{file: a.md}}"),
            vec!["a.md", "a.md"]
        );
    }

    #[test]
    fn is_variable_name_rules() {
        assert!(is_variable_name("snake_case_1"));
        assert!(!is_variable_name(""));
        assert!(!is_variable_name("has-dash"));
        assert!(!is_variable_name("has space"));
    }
}
