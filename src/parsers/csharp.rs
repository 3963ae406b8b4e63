use super::{NamedParam, ParamRole, ParserDef};

const USER_CAPTURE_PATTERN: &str = r"(?:\w*|\{[^})]*\}|new[^)]*\))";
const VARIABLE_NAME_CAPTURE_PATTERN: &str = r"[^,)]*";
const DEFAULT_VALUE_CAPTURE_PATTERN: &str = r"[^,)]*";

/// C# SDK accessors: `client.VariableAsync(user, key, defaultValue)`,
/// null-conditional invocation included, positionally or as named arguments.
pub(super) static DEF: ParserDef = ParserDef {
    identity: "csharp",
    extensions: &["cs"],
    variable_method_pattern: r"\??\.VariableAsync\(",
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
            name: "defaultValue",
            pattern: DEFAULT_VALUE_CAPTURE_PATTERN,
        },
    ],
    named_parameter_delimiter: ":",
    comment_characters: &["//", "/*"],
};
