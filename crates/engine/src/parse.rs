//! Token → typed value conversion for an action node's parameter list, and
//! the matching per-parameter completion.

use crate::parameter::{Parameter, ParameterKind};
use crate::types::{Arguments, ErrorCode, Value};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("Missing parameter: {0}")]
    MissingParameter(String),

    #[error("Quoted string for '{0}' must start with a quote (\").")]
    MissingOpeningQuote(String),

    #[error("Quoted string for '{0}' must end with a quote (\").")]
    MissingClosingQuote(String),

    #[error("Quoted string for '{0}' is missing content and end quote.")]
    EmptyQuotedString(String),

    #[error("Invalid number for parameter '{name}': {raw}")]
    InvalidNumber { name: String, raw: String },

    #[error("Invalid value for boolean parameter '{name}': '{raw}' - must be either 'true' or 'false'.")]
    InvalidBoolean { name: String, raw: String },

    #[error("Invalid value for enum parameter '{name}': {raw}. Expected one of: {}", .expected.join(", "))]
    InvalidEnum {
        name: String,
        raw: String,
        expected: Vec<String>,
    },

    #[error("No enum domain provided for parameter: {0}")]
    MissingEnumDomain(String),
}

impl ParseError {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            ParseError::MissingParameter(_) => ErrorCode::MissingParameter,
            ParseError::MissingOpeningQuote(_)
            | ParseError::MissingClosingQuote(_)
            | ParseError::EmptyQuotedString(_) => ErrorCode::MalformedQuotedString,
            ParseError::InvalidNumber { .. } => ErrorCode::InvalidNumber,
            ParseError::InvalidBoolean { .. } => ErrorCode::InvalidBoolean,
            ParseError::InvalidEnum { .. } => ErrorCode::InvalidEnum,
            ParseError::MissingEnumDomain(_) => ErrorCode::Misconfigured,
        }
    }
}

/// Fill `params` left to right from `tokens`.
///
/// Stops at the first failure. Tokens left over after the last parameter
/// are ignored.
pub fn parse_arguments(params: &[Parameter], tokens: &[String]) -> Result<Arguments, ParseError> {
    let mut parsed = Vec::with_capacity(params.len());
    let mut cursor = 0;

    for param in params {
        if cursor >= tokens.len() {
            return Err(ParseError::MissingParameter(param.name().to_string()));
        }
        let (value, consumed) = parse_one(param, &tokens[cursor..])?;
        parsed.push(value);
        cursor += consumed;
    }

    Ok(Arguments::new(parsed))
}

/// Parse a single parameter from the front of `rest` (never empty).
/// Returns the value and the number of tokens consumed.
fn parse_one(param: &Parameter, rest: &[String]) -> Result<(Value, usize), ParseError> {
    let raw = rest[0].as_str();
    let name = param.name();

    let value = match param.kind() {
        ParameterKind::String => Value::String(raw.to_string()),
        ParameterKind::QuotedString => return parse_quoted(name, rest),
        ParameterKind::GreedyString => return Ok((Value::String(rest.join(" ")), rest.len())),
        ParameterKind::Short => Value::Short(parse_number(name, raw)?),
        ParameterKind::Int => Value::Int(parse_number(name, raw)?),
        ParameterKind::Long => Value::Long(parse_number(name, raw)?),
        ParameterKind::Float => Value::Float(parse_decimal(name, raw)?),
        ParameterKind::Double => Value::Double(parse_decimal(name, raw)?),
        ParameterKind::Bool => {
            if raw.eq_ignore_ascii_case("true") {
                Value::Bool(true)
            } else if raw.eq_ignore_ascii_case("false") {
                Value::Bool(false)
            } else {
                return Err(ParseError::InvalidBoolean {
                    name: name.to_string(),
                    raw: raw.to_string(),
                });
            }
        }
        ParameterKind::Enum => {
            let Some(domain) = param.domain() else {
                tracing::warn!(parameter = %name, "enum parameter has no domain");
                return Err(ParseError::MissingEnumDomain(name.to_string()));
            };
            match domain.resolve(raw) {
                Some(case) => Value::Enum(case.to_string()),
                None => {
                    return Err(ParseError::InvalidEnum {
                        name: name.to_string(),
                        raw: raw.to_string(),
                        expected: domain.names().to_vec(),
                    })
                }
            }
        }
    };

    Ok((value, 1))
}

fn parse_number<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T, ParseError> {
    raw.parse::<T>().map_err(|_| ParseError::InvalidNumber {
        name: name.to_string(),
        raw: raw.to_string(),
    })
}

/// Decimal or exponential literal only; `inf` and `NaN` word forms are
/// rejected.
fn parse_decimal<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T, ParseError> {
    let literal = raw
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'));
    if !literal {
        return Err(ParseError::InvalidNumber {
            name: name.to_string(),
            raw: raw.to_string(),
        });
    }
    parse_number(name, raw)
}

/// Scan a quoted string starting at `rest[0]`, joining whole tokens with
/// single spaces until one ends with `"` or input runs out.
///
/// A lone `"` is always reported as empty content, whether or not more
/// tokens follow.
fn parse_quoted(name: &str, rest: &[String]) -> Result<(Value, usize), ParseError> {
    let first = rest[0].as_str();
    if !first.starts_with('"') {
        return Err(ParseError::MissingOpeningQuote(name.to_string()));
    }

    let mut quoted = first.to_string();
    let mut consumed = 1;
    let mut current = first;
    while !current.ends_with('"') && consumed < rest.len() {
        current = rest[consumed].as_str();
        quoted.push(' ');
        quoted.push_str(current);
        consumed += 1;
    }

    if quoted == "\"" {
        return Err(ParseError::EmptyQuotedString(name.to_string()));
    }
    if !quoted.ends_with('"') {
        return Err(ParseError::MissingClosingQuote(name.to_string()));
    }

    let content = quoted[1..quoted.len() - 1].to_string();
    Ok((Value::String(content), consumed))
}

/// Candidates for the token currently being typed (the last of `partial`),
/// taken from the parameter at the same index.
pub fn complete_arguments(params: &[Parameter], partial: &[String]) -> Vec<String> {
    let Some(typing) = partial.last() else {
        return Vec::new();
    };
    let Some(param) = params.get(partial.len() - 1) else {
        return Vec::new();
    };

    let needle = typing.to_lowercase();
    param
        .suggestions()
        .into_iter()
        .filter(|s| s.to_lowercase().starts_with(&needle))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameter::EnumDomain;

    fn toks(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_plain_string_and_numbers() {
        let params = vec![
            Parameter::string("player"),
            Parameter::short("s"),
            Parameter::int("i"),
            Parameter::long("l"),
            Parameter::float("f"),
            Parameter::double("d"),
        ];
        let args = parse_arguments(
            &params,
            &toks(&["alice", "-12", "42", "9000000000", "1.5", "-2e3"]),
        )
        .unwrap();
        assert_eq!(args.string(0), Some("alice"));
        assert_eq!(args.short(1), Some(-12));
        assert_eq!(args.int(2), Some(42));
        assert_eq!(args.long(3), Some(9_000_000_000));
        assert_eq!(args.float(4), Some(1.5));
        assert_eq!(args.double(5), Some(-2000.0));
    }

    #[test]
    fn test_number_out_of_range() {
        let err = parse_arguments(&[Parameter::short("amount")], &toks(&["40000"])).unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidNumber {
                name: "amount".into(),
                raw: "40000".into()
            }
        );
        assert_eq!(err.to_string(), "Invalid number for parameter 'amount': 40000");
        assert_eq!(err.error_code(), ErrorCode::InvalidNumber);
    }

    #[test]
    fn test_quoted_string_spanning_tokens() {
        let params = vec![Parameter::quoted("text"), Parameter::int("n")];
        let args = parse_arguments(&params, &toks(&["\"a", "b\"", "3"])).unwrap();
        assert_eq!(args.string(0), Some("a b"));
        assert_eq!(args.int(1), Some(3));
    }

    #[test]
    fn test_quoted_single_token() {
        let args = parse_arguments(&[Parameter::quoted("text")], &toks(&["\"hi\""])).unwrap();
        assert_eq!(args.string(0), Some("hi"));
        let args = parse_arguments(&[Parameter::quoted("text")], &toks(&["\"\""])).unwrap();
        assert_eq!(args.string(0), Some(""));
    }

    #[test]
    fn test_quoted_failures() {
        let q = [Parameter::quoted("text")];
        assert_eq!(
            parse_arguments(&q, &toks(&["hi\""])).unwrap_err(),
            ParseError::MissingOpeningQuote("text".into())
        );
        assert_eq!(
            parse_arguments(&q, &toks(&["\"hi", "there"])).unwrap_err(),
            ParseError::MissingClosingQuote("text".into())
        );
        assert_eq!(
            parse_arguments(&q, &toks(&["\""])).unwrap_err(),
            ParseError::EmptyQuotedString("text".into())
        );
        assert_eq!(
            parse_arguments(&q, &toks(&["\"", "more\""])).unwrap_err(),
            ParseError::EmptyQuotedString("text".into())
        );
    }

    #[test]
    fn test_greedy_consumes_rest() {
        let params = vec![Parameter::string("to"), Parameter::greedy("message")];
        let args = parse_arguments(&params, &toks(&["bob", "hello", "big", "world"])).unwrap();
        assert_eq!(args.string(1), Some("hello big world"));
        let args = parse_arguments(&params, &toks(&["bob", "hi"])).unwrap();
        assert_eq!(args.string(1), Some("hi"));
    }

    #[test]
    fn test_bool_is_case_insensitive() {
        let p = [Parameter::bool("flag")];
        assert_eq!(parse_arguments(&p, &toks(&["TRUE"])).unwrap().bool(0), Some(true));
        assert_eq!(parse_arguments(&p, &toks(&["False"])).unwrap().bool(0), Some(false));
        let err = parse_arguments(&p, &toks(&["1"])).unwrap_err();
        assert!(matches!(err, ParseError::InvalidBoolean { .. }));
        assert_eq!(
            err.to_string(),
            "Invalid value for boolean parameter 'flag': '1' - must be either 'true' or 'false'."
        );
    }

    #[test]
    fn test_enum_matching() {
        let p = [Parameter::enumeration("color", EnumDomain::new(["RED", "GREEN"]))];
        for raw in ["red", "RED", "Red"] {
            let args = parse_arguments(&p, &toks(&[raw])).unwrap();
            assert_eq!(args.get(0), Some(&Value::Enum("RED".into())));
        }
        let err = parse_arguments(&p, &toks(&["blue"])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid value for enum parameter 'color': blue. Expected one of: RED, GREEN"
        );
    }

    #[test]
    fn test_enum_error_lists_domain_not_override() {
        let p = [Parameter::enumeration("c", EnumDomain::new(["RED", "GREEN"]))
            .with_static_suggestions(["x"])];
        let err = parse_arguments(&p, &toks(&["blue"])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid value for enum parameter 'c': blue. Expected one of: RED, GREEN"
        );
        assert_eq!(complete_arguments(&p, &toks(&[""])), vec!["RED", "GREEN"]);
    }

    #[test]
    fn test_decimal_rejects_word_forms() {
        for raw in ["inf", "-INF", "infinity", "NaN", "Infinity"] {
            assert!(matches!(
                parse_arguments(&[Parameter::double("d")], &toks(&[raw])).unwrap_err(),
                ParseError::InvalidNumber { .. }
            ));
            assert!(matches!(
                parse_arguments(&[Parameter::float("f")], &toks(&[raw])).unwrap_err(),
                ParseError::InvalidNumber { .. }
            ));
        }
        let args = parse_arguments(&[Parameter::double("d")], &toks(&["+1.5E2"])).unwrap();
        assert_eq!(args.double(0), Some(150.0));
    }

    #[test]
    fn test_enum_without_domain() {
        let p = [Parameter::new("mode", ParameterKind::Enum)];
        assert_eq!(
            parse_arguments(&p, &toks(&["x"])).unwrap_err(),
            ParseError::MissingEnumDomain("mode".into())
        );
    }

    #[test]
    fn test_missing_parameter_names_first_unsatisfied() {
        let params = vec![
            Parameter::string("a"),
            Parameter::int("b"),
            Parameter::int("c"),
        ];
        assert_eq!(
            parse_arguments(&params, &toks(&["x"])).unwrap_err(),
            ParseError::MissingParameter("b".into())
        );
        assert_eq!(
            parse_arguments(&params, &[]).unwrap_err(),
            ParseError::MissingParameter("a".into())
        );
        // A bad earlier token wins over a missing later one.
        assert!(matches!(
            parse_arguments(&params, &toks(&["x", "nope"])).unwrap_err(),
            ParseError::InvalidNumber { .. }
        ));
    }

    #[test]
    fn test_complete_uses_current_index() {
        let params = vec![
            Parameter::string("player").with_static_suggestions(["Alice", "bob"]),
            Parameter::enumeration("color", EnumDomain::new(["RED", "GREEN", "GRAY"])),
        ];
        assert_eq!(complete_arguments(&params, &toks(&["a"])), vec!["Alice"]);
        assert_eq!(complete_arguments(&params, &toks(&["alice", "g"])), vec!["GREEN", "GRAY"]);
        assert_eq!(
            complete_arguments(&params, &toks(&["alice", ""])),
            vec!["RED", "GREEN", "GRAY"]
        );
        assert!(complete_arguments(&params, &toks(&["alice", "RED", ""])).is_empty());
        assert!(complete_arguments(&params, &[]).is_empty());
    }
}
