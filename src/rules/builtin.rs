//! Built-in rules
//!
//! The default rule set: `required`, one `is<Type>` rule per declared
//! type, bound checks, length checks, `enum`, `regex`, and `isEmail`.
//!
//! Coercions are strict by design. `"42"` parses to `42`, but a string
//! with an explicit sign prefix such as `"+42"` is left untouched rather
//! than guessed at. Date strings must be RFC 3339; anything already in
//! epoch-millisecond form passes through unchanged, which is what makes
//! every `tryParse` here idempotent.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Number, Value};

use super::descriptor::RuleDescriptor;

fn integer_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^-?[0-9]+$").expect("static pattern"))
}

fn number_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^-?[0-9]+(\.[0-9]+)?$").expect("static pattern"))
}

fn email_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static pattern"))
}

/// Returns the full built-in rule set.
pub fn all() -> Vec<RuleDescriptor> {
    vec![
        required(),
        is_string(),
        is_number(),
        is_integer(),
        is_boolean(),
        is_date(),
        is_id(),
        is_object(),
        is_array(),
        min(),
        max(),
        min_length(),
        max_length(),
        enumerated(),
        pattern(),
        is_email(),
    ]
}

fn required() -> RuleDescriptor {
    RuleDescriptor::new(
        "required",
        |value, _, _| Ok(!value.is_null()),
        "This field is required.",
    )
}

fn is_string() -> RuleDescriptor {
    RuleDescriptor::new(
        "isString",
        |value, _, _| Ok(value.is_string()),
        "Value was not a string.",
    )
}

fn is_number() -> RuleDescriptor {
    RuleDescriptor::new(
        "isNumber",
        |value, _, _| Ok(value.is_number()),
        "Value was not a number.",
    )
    .with_try_parse(|value| {
        let s = value.as_str()?;
        if !number_pattern().is_match(s) {
            return None;
        }
        let parsed: f64 = s.parse().ok()?;
        Number::from_f64(parsed).map(Value::Number)
    })
}

fn is_integer() -> RuleDescriptor {
    RuleDescriptor::new(
        "isInteger",
        |value, _, _| Ok(value.is_i64() || value.is_u64()),
        "Value was not an integer.",
    )
    .with_try_parse(|value| {
        let s = value.as_str()?;
        if !integer_pattern().is_match(s) {
            return None;
        }
        s.parse::<i64>().ok().map(Value::from)
    })
}

fn is_boolean() -> RuleDescriptor {
    RuleDescriptor::new(
        "isBoolean",
        |value, _, _| Ok(value.is_boolean()),
        "Value was not a boolean.",
    )
}

/// Dates are epoch milliseconds on the wire; RFC 3339 strings are parsed.
fn is_date() -> RuleDescriptor {
    RuleDescriptor::new(
        "isDate",
        |value, _, _| Ok(value.is_i64() || value.is_u64()),
        "Value was not a valid date.",
    )
    .with_try_parse(|value| {
        let s = value.as_str()?;
        let parsed = chrono::DateTime::parse_from_rfc3339(s).ok()?;
        Some(Value::from(parsed.timestamp_millis()))
    })
}

/// Ids are opaque non-empty strings; their exact format belongs to the
/// driver that assigns them.
fn is_id() -> RuleDescriptor {
    RuleDescriptor::new(
        "isId",
        |value, _, _| Ok(value.as_str().map(|s| !s.is_empty()).unwrap_or(false)),
        "Value was not a valid id.",
    )
}

fn is_object() -> RuleDescriptor {
    RuleDescriptor::new(
        "isObject",
        |value, _, _| Ok(value.is_object()),
        "Value was not an object.",
    )
}

fn is_array() -> RuleDescriptor {
    RuleDescriptor::new(
        "isArray",
        |value, _, _| Ok(value.is_array()),
        "Value was not an array.",
    )
}

fn numeric_arg(arg: &Value, rule: &str) -> Result<f64, String> {
    arg.as_f64()
        .ok_or_else(|| format!("The {} rule requires a numeric argument.", rule))
}

fn min() -> RuleDescriptor {
    RuleDescriptor::new(
        "min",
        |value, arg, _| {
            let bound = numeric_arg(arg, "min")?;
            Ok(value.as_f64().map(|v| v >= bound).unwrap_or(false))
        },
        "unused",
    )
    .with_formatter(|_, arg| format!("Value must be at least {}.", arg))
}

fn max() -> RuleDescriptor {
    RuleDescriptor::new(
        "max",
        |value, arg, _| {
            let bound = numeric_arg(arg, "max")?;
            Ok(value.as_f64().map(|v| v <= bound).unwrap_or(false))
        },
        "unused",
    )
    .with_formatter(|_, arg| format!("Value must be at most {}.", arg))
}

fn length_of(value: &Value) -> Option<usize> {
    match value {
        Value::String(s) => Some(s.chars().count()),
        Value::Array(a) => Some(a.len()),
        _ => None,
    }
}

fn min_length() -> RuleDescriptor {
    RuleDescriptor::new(
        "minLength",
        |value, arg, _| {
            let bound = numeric_arg(arg, "minLength")? as usize;
            Ok(length_of(value).map(|l| l >= bound).unwrap_or(false))
        },
        "unused",
    )
    .with_formatter(|_, arg| format!("Value must have a minimum length of {}.", arg))
    .ignoring_empty_string()
}

fn max_length() -> RuleDescriptor {
    RuleDescriptor::new(
        "maxLength",
        |value, arg, _| {
            let bound = numeric_arg(arg, "maxLength")? as usize;
            Ok(length_of(value).map(|l| l <= bound).unwrap_or(false))
        },
        "unused",
    )
    .with_formatter(|_, arg| format!("Value must have a maximum length of {}.", arg))
}

fn enumerated() -> RuleDescriptor {
    RuleDescriptor::new(
        "enum",
        |value, arg, _| {
            let allowed = arg
                .as_array()
                .ok_or_else(|| "The enum rule requires an array argument.".to_string())?;
            Ok(allowed.contains(value))
        },
        "unused",
    )
    .with_formatter(|_, arg| {
        let rendered = arg
            .as_array()
            .map(|a| {
                a.iter()
                    .map(|v| match v {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_default();
        format!("Value was not one of: {}.", rendered)
    })
}

fn pattern() -> RuleDescriptor {
    RuleDescriptor::new(
        "regex",
        |value, arg, _| {
            let pattern = arg
                .as_str()
                .ok_or_else(|| "The regex rule requires a string argument.".to_string())?;
            let compiled =
                Regex::new(pattern).map_err(|e| format!("Invalid regular expression: {}", e))?;
            Ok(value.as_str().map(|s| compiled.is_match(s)).unwrap_or(false))
        },
        "Value did not match the required pattern.",
    )
    .ignoring_empty_string()
}

fn is_email() -> RuleDescriptor {
    RuleDescriptor::new(
        "isEmail",
        |value, _, _| {
            Ok(value
                .as_str()
                .map(|s| email_pattern().is_match(s))
                .unwrap_or(false))
        },
        "Please enter a valid email address.",
    )
    .ignoring_empty_string()
}
