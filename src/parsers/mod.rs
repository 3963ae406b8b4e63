//! # Pattern Registry
//!
//! One static parser definition per supported language, compiled once into a
//! process-wide registry keyed by file extension. Matching is lexical: a line
//! (or a bounded multi-line window when a call spans lines) is tested against
//! the language's accessor-call pattern, the argument list is isolated by
//! balanced-parenthesis scanning, and the variable key is extracted from
//! either positional or named arguments.

mod csharp;
mod golang;
mod java;
mod javascript;
mod python;
mod ruby;

use regex::Regex;
use std::sync::LazyLock;

use crate::errors::SweepError;
use crate::types::UsageMode;

/// Maximum number of source lines a single accessor call may span.
const MAX_CALL_LINES: usize = 8;

/// Logical role of an accessor argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamRole {
    User,
    Key,
    Default,
}

/// Extraction rule for one named argument: the parameter name as written in
/// source and the sub-pattern its value must match.
#[derive(Debug)]
pub struct NamedParam {
    pub role: ParamRole,
    pub name: &'static str,
    pub pattern: &'static str,
}

/// Raw per-language matching data a [`Parser`] is compiled from.
#[derive(Debug)]
pub struct ParserDef {
    pub identity: &'static str,
    pub extensions: &'static [&'static str],
    /// Matches the call syntax opening an accessor invocation, up to and
    /// including the open parenthesis. The argument list is parsed separately.
    pub variable_method_pattern: &'static str,
    /// Positional sub-patterns in (user, key, default) order.
    pub ordered_parameter_patterns: [&'static str; 3],
    /// Empty for languages without named-argument call styles.
    pub named_parameters: &'static [NamedParam],
    /// Separator between a named parameter and its value (`:` or `=`).
    pub named_parameter_delimiter: &'static str,
    pub comment_characters: &'static [&'static str],
}

struct NamedRule {
    role: ParamRole,
    regex: Regex,
}

/// Compiled matcher for one language.
pub struct Parser {
    identity: &'static str,
    extensions: &'static [&'static str],
    method: Regex,
    positional: Regex,
    named: Vec<NamedRule>,
    named_lookalike: Option<Regex>,
    comment_characters: &'static [&'static str],
}

/// One logical source line presented to a parser. `mode` carries the diff
/// side the line came from; whole-file scans use [`UsageMode::Regular`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    pub number: usize,
    pub mode: UsageMode,
    pub content: String,
}

/// An accessor call site before target/alias filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessorMatch {
    pub line: usize,
    pub mode: UsageMode,
    pub key: String,
}

impl Parser {
    fn compile(def: &ParserDef) -> Result<Self, SweepError> {
        let method = Regex::new(def.variable_method_pattern)?;
        let [user, key, default] = def.ordered_parameter_patterns;
        let positional = Regex::new(&format!(
            r"^\s*(?:(?P<user>{user})\s*,\s*)?(?P<key>{key})\s*(?:,\s*(?P<default>{default})\s*)?$"
        ))?;

        let mut named = Vec::with_capacity(def.named_parameters.len());
        let mut named_lookalike = None;
        if !def.named_parameters.is_empty() {
            if def.named_parameter_delimiter.is_empty() {
                return Err(SweepError::Config(format!(
                    "parser '{}' defines named parameters without a delimiter",
                    def.identity
                )));
            }
            if !def
                .named_parameters
                .iter()
                .any(|spec| spec.role == ParamRole::Key)
            {
                return Err(SweepError::Config(format!(
                    "parser '{}' defines named parameters but no rule extracts the key",
                    def.identity
                )));
            }
            let delimiter = regex::escape(def.named_parameter_delimiter);
            for spec in def.named_parameters {
                let regex = Regex::new(&format!(
                    r"\b{}\s*{}\s*({})",
                    spec.name, delimiter, spec.pattern
                ))?;
                named.push(NamedRule {
                    role: spec.role,
                    regex,
                });
            }
            named_lookalike = Some(Regex::new(&format!(r"^\w+\s*{delimiter}"))?);
        }

        Ok(Self {
            identity: def.identity,
            extensions: def.extensions,
            method,
            positional,
            named,
            named_lookalike,
            comment_characters: def.comment_characters,
        })
    }

    pub fn identity(&self) -> &'static str {
        self.identity
    }

    pub fn extensions(&self) -> &'static [&'static str] {
        self.extensions
    }

    /// Find every accessor call site in the given lines, in source order.
    ///
    /// Lines must be presented in file order. A call spanning multiple lines
    /// is attributed to the line that opens it; continuation lines are only
    /// consumed while they are contiguous and share the opening line's mode,
    /// so a call split across diff hunk boundaries never matches.
    pub fn find_accessors(&self, lines: &[SourceLine]) -> Vec<AccessorMatch> {
        let mut matches = Vec::new();
        for (index, line) in lines.iter().enumerate() {
            for found in self.method.find_iter(&line.content) {
                // Comment detection short-circuits before parameter extraction.
                if self.is_commented(&line.content, found.start()) {
                    continue;
                }
                let Some(args) = self.argument_window(lines, index, found.end()) else {
                    continue;
                };
                let Some(key) = self.extract_key(&args) else {
                    continue;
                };
                matches.push(AccessorMatch {
                    line: line.number,
                    mode: line.mode,
                    key,
                });
            }
        }
        matches
    }

    fn is_commented(&self, line: &str, call_start: usize) -> bool {
        let prefix = &line[..call_start];
        self.comment_characters
            .iter()
            .any(|marker| prefix.contains(marker))
    }

    /// Isolate the argument list by balanced-parenthesis scanning, starting
    /// just past the open parenthesis matched by the method pattern. Extends
    /// across following lines while the parentheses remain open, up to
    /// [`MAX_CALL_LINES`]. String literals are skipped so a parenthesis
    /// inside a quoted key or default cannot unbalance the scan.
    fn argument_window(
        &self,
        lines: &[SourceLine],
        start: usize,
        open_at: usize,
    ) -> Option<String> {
        let mut args = String::new();
        let mut depth = 1usize;
        let mut in_string: Option<char> = None;
        let mut escaped = false;
        let mut index = start;
        let mut text = &lines[start].content[open_at..];
        loop {
            for (pos, ch) in text.char_indices() {
                if let Some(quote) = in_string {
                    if escaped {
                        escaped = false;
                    } else if ch == '\\' {
                        escaped = true;
                    } else if ch == quote {
                        in_string = None;
                    }
                    continue;
                }
                match ch {
                    '"' | '\'' | '`' => in_string = Some(ch),
                    '(' => depth += 1,
                    ')' => {
                        depth -= 1;
                        if depth == 0 {
                            args.push_str(&text[..pos]);
                            return Some(args);
                        }
                    }
                    _ => {}
                }
            }
            args.push_str(text);
            args.push('\n');
            index += 1;
            if index >= lines.len() || index - start >= MAX_CALL_LINES {
                return None;
            }
            let previous = &lines[index - 1];
            let next = &lines[index];
            if next.mode != previous.mode || next.number != previous.number + 1 {
                return None;
            }
            text = &next.content;
        }
    }

    /// Extract the variable key from an argument list: positional shape
    /// first, named shape otherwise. Returns `None` when neither applies.
    fn extract_key(&self, args: &str) -> Option<String> {
        if let Some(caps) = self.positional.captures(args) {
            if let Some(found) = caps.name("key") {
                let key = trim_key(found.as_str());
                if !key.is_empty() && !self.is_named_argument(&key) {
                    return Some(key);
                }
            }
        }
        self.named_key(args)
    }

    /// A positional "key" that reads as `name<delimiter>` is a named argument
    /// the positional shape swallowed; reroute it to named extraction.
    fn is_named_argument(&self, text: &str) -> bool {
        self.named_lookalike
            .as_ref()
            .is_some_and(|re| re.is_match(text))
    }

    /// Named arguments resolve independently of their order in source.
    fn named_key(&self, args: &str) -> Option<String> {
        let rule = self.named.iter().find(|r| r.role == ParamRole::Key)?;
        let found = rule.regex.captures(args)?.get(1)?;
        let key = trim_key(found.as_str());
        if key.is_empty() { None } else { Some(key) }
    }
}

/// Strip surrounding whitespace and one layer of matching quotes.
fn trim_key(raw: &str) -> String {
    let trimmed = raw.trim();
    for quote in ['"', '\'', '`'] {
        let inner = trimmed
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote));
        if let Some(inner) = inner {
            return inner.to_string();
        }
    }
    trimmed.to_string()
}

static PARSERS: LazyLock<Vec<Parser>> = LazyLock::new(|| {
    [
        &javascript::DEF,
        &python::DEF,
        &java::DEF,
        &csharp::DEF,
        &golang::DEF,
        &ruby::DEF,
    ]
    .into_iter()
    .map(|def| Parser::compile(def).expect("builtin parser definition"))
    .collect()
});

/// Look up the parser responsible for a file extension.
pub fn parser_for_extension(extension: &str) -> Option<&'static Parser> {
    PARSERS
        .iter()
        .find(|parser| parser.extensions.iter().any(|ext| *ext == extension))
}

/// All compiled parsers, in registration order.
pub fn all_parsers() -> &'static [Parser] {
    &PARSERS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(content: &[&str]) -> Vec<SourceLine> {
        content
            .iter()
            .enumerate()
            .map(|(i, text)| SourceLine {
                number: i + 1,
                mode: UsageMode::Regular,
                content: (*text).to_string(),
            })
            .collect()
    }

    #[test]
    fn registry_resolves_every_declared_extension() {
        for parser in all_parsers() {
            for ext in parser.extensions() {
                let resolved = parser_for_extension(ext).unwrap();
                assert_eq!(resolved.identity(), parser.identity());
            }
        }
        assert!(parser_for_extension("xyz").is_none());
    }

    #[test]
    fn positional_key_extraction() {
        let parser = parser_for_extension("js").unwrap();
        let found = parser.find_accessors(&lines(&[
            "const v = client.variable(user, 'my-flag', false)",
        ]));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].key, "my-flag");
        assert_eq!(found[0].line, 1);
    }

    #[test]
    fn key_only_call_matches() {
        let parser = parser_for_extension("cs").unwrap();
        let found =
            parser.find_accessors(&lines(&["var v = await client.VariableAsync(\"k\", false);"]));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].key, "k");
    }

    #[test]
    fn named_arguments_resolve_in_any_order() {
        let parser = parser_for_extension("cs").unwrap();
        let ordered = parser.find_accessors(&lines(&[
            "client.VariableAsync(user: user, key: \"k\", defaultValue: false)",
        ]));
        let unordered = parser.find_accessors(&lines(&[
            "client.VariableAsync(defaultValue: false, user: user, key: \"k\")",
        ]));
        assert_eq!(ordered[0].key, "k");
        assert_eq!(unordered[0].key, "k");
    }

    #[test]
    fn commented_call_is_excluded() {
        let parser = parser_for_extension("py").unwrap();
        let found = parser.find_accessors(&lines(&[
            "# value = client.variable(user, 'dead-flag', False)",
            "value = client.variable(user, 'live-flag', False)  # live",
        ]));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].key, "live-flag");
        assert_eq!(found[0].line, 2);
    }

    #[test]
    fn multi_line_call_reports_opening_line() {
        let parser = parser_for_extension("java").unwrap();
        let found = parser.find_accessors(&lines(&[
            "Variable<Boolean> v = client.variable(",
            "    user,",
            "    \"spread-flag\",",
            "    false",
            ");",
        ]));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].key, "spread-flag");
        assert_eq!(found[0].line, 1);
    }

    #[test]
    fn call_exceeding_window_bound_is_skipped() {
        let mut content = vec!["v = client.variable(".to_string()];
        for _ in 0..MAX_CALL_LINES {
            content.push("    # filler".to_string());
        }
        content.push("    user, 'k', False)".to_string());
        let source: Vec<SourceLine> = content
            .iter()
            .enumerate()
            .map(|(i, text)| SourceLine {
                number: i + 1,
                mode: UsageMode::Regular,
                content: text.clone(),
            })
            .collect();
        let parser = parser_for_extension("py").unwrap();
        assert!(parser.find_accessors(&source).is_empty());
    }

    #[test]
    fn parenthesis_inside_string_does_not_unbalance() {
        let parser = parser_for_extension("js").unwrap();
        let found = parser.find_accessors(&lines(&[
            "client.variable(user, 'weird-flag', 'open ( paren')",
        ]));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].key, "weird-flag");
    }

    #[test]
    fn trim_key_strips_one_quote_layer() {
        assert_eq!(trim_key("  'my-flag'  "), "my-flag");
        assert_eq!(trim_key("\"my-flag\""), "my-flag");
        assert_eq!(trim_key("MY_FLAG"), "MY_FLAG");
    }
}
