use super::ParserDef;

const USER_CAPTURE_PATTERN: &str = r"(?:[\w.]*|[\w.]+\{[^}]*\})";
const VARIABLE_NAME_CAPTURE_PATTERN: &str = r"[^,)]*";
const DEFAULT_VALUE_CAPTURE_PATTERN: &str = r"[^,)]*";

/// Go SDK accessors: `client.Variable(user, key, default)` and
/// `client.VariableValue(...)`; the user argument may be a struct literal.
pub(super) static DEF: ParserDef = ParserDef {
    identity: "golang",
    extensions: &["go"],
    variable_method_pattern: r"\.Variable(?:Value)?\(",
    ordered_parameter_patterns: [
        USER_CAPTURE_PATTERN,
        VARIABLE_NAME_CAPTURE_PATTERN,
        DEFAULT_VALUE_CAPTURE_PATTERN,
    ],
    named_parameters: &[],
    named_parameter_delimiter: "",
    comment_characters: &["//", "/*"],
};
