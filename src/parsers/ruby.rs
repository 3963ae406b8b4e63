use super::{NamedParam, ParamRole, ParserDef};

const USER_CAPTURE_PATTERN: &str = r"(?:\w*|\w+\.new\([^)]*\))";
const VARIABLE_NAME_CAPTURE_PATTERN: &str = r"[^,)]*";
const DEFAULT_VALUE_CAPTURE_PATTERN: &str = r"[^,)]*";

/// Ruby SDK accessors: `client.variable(user, key, default)` and
/// `client.variable_value(...)`, safe navigation and keyword arguments
/// included.
pub(super) static DEF: ParserDef = ParserDef {
    identity: "ruby",
    extensions: &["rb"],
    variable_method_pattern: r"&?\.variable(?:_value)?\(",
    ordered_parameter_patterns: [
        USER_CAPTURE_PATTERN,
        VARIABLE_NAME_CAPTURE_PATTERN,
        DEFAULT_VALUE_CAPTURE_PATTERN,
    ],
    named_parameters: &[
        NamedParam {
            role: ParamRole::User,
            name: "user",
            pattern: USER_CAPTURE_PATTERN,
        },
        NamedParam {
            role: ParamRole::Key,
            name: "key",
            pattern: VARIABLE_NAME_CAPTURE_PATTERN,
        },
        NamedParam {
            role: ParamRole::Default,
            name: "default",
            pattern: DEFAULT_VALUE_CAPTURE_PATTERN,
        },
    ],
    named_parameter_delimiter: ":",
    comment_characters: &["#", "=begin"],
};
