use super::ParserDef;

const USER_CAPTURE_PATTERN: &str = r"(?:\w*|new[^)]*\))";
const VARIABLE_NAME_CAPTURE_PATTERN: &str = r"[^,)]*";
const DEFAULT_VALUE_CAPTURE_PATTERN: &str = r"[^,)]*";

/// Java SDK accessors: `client.variable(user, key, default)` and
/// `client.variableValue(...)`.
pub(super) static DEF: ParserDef = ParserDef {
    identity: "java",
    extensions: &["java"],
    variable_method_pattern: r"\.variable(?:Value)?\(",
    ordered_parameter_patterns: [
        USER_CAPTURE_PATTERN,
        VARIABLE_NAME_CAPTURE_PATTERN,
        DEFAULT_VALUE_CAPTURE_PATTERN,
    ],
    named_parameters: &[],
    named_parameter_delimiter: "",
    comment_characters: &["//", "/*"],
};
