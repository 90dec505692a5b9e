//! Variable substitution into template content.

use crate::template::{tokenize, Segment, VariableMap};

/// Replace every `{{name}}` that has a value with that value.
///
/// Tokens without a value and `{{file: ...}}` tokens are kept verbatim.
///
/// # Example
///
/// ```
/// use promptkit::executor::substitute;
/// use promptkit::template::{VariableMap, VariableValue};
///
/// let mut vars = VariableMap::new();
/// vars.insert("name".into(), VariableValue::String("Ada".into()));
///
/// assert_eq!(substitute("Hi {{ name }}!", &vars), "Hi Ada!");
/// ```
pub fn substitute(content: &str, variables: &VariableMap) -> String {
    let mut output = String::with_capacity(content.len());
    for segment in tokenize(content) {
        match segment {
            Segment::Literal(text) => output.push_str(&text),
            Segment::Variable { name, raw } => match variables.get(&name) {
                Some(value) => output.push_str(&value.to_string()),
                None => output.push_str(&raw),
            },
            Segment::Include { raw, .. } => output.push_str(&raw),
        }
    }
    output
}
