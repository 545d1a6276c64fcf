// src/prompt/input.rs
// Turning typed operator text into column values and back

use crate::database::{render_value, Affinity};
use rusqlite::types::Value;

/// Parse one line of operator input.
///
/// `\n` produces a newline and `\X` produces a literal `X`. A leading `/null`,
/// `/true` or `/false` (case-insensitive, ended by whitespace or end of input)
/// yields NULL, 1 or 0; a `/` anywhere else is kept as typed.
pub fn parse_input(input: &str) -> Value {
    if let Some(command) = leading_command(input) {
        return command;
    }

    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            output.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => output.push('\n'),
            Some(escaped) => output.push(escaped),
            None => output.push('\\'),
        }
    }
    Value::Text(output)
}

fn leading_command(input: &str) -> Option<Value> {
    let rest = input.strip_prefix('/')?;
    let word = rest.split(char::is_whitespace).next().unwrap_or_default();
    match word.to_lowercase().as_str() {
        "null" => Some(Value::Null),
        "true" => Some(Value::Integer(1)),
        "false" => Some(Value::Integer(0)),
        _ => None,
    }
}

/// Render `value` so that feeding it back through [`parse_input`] yields the
/// same value. Blobs cannot be typed and render as a size marker.
pub fn escape_for_input(value: &Value) -> String {
    match value {
        Value::Null => "/null".to_string(),
        Value::Text(text) => {
            let mut escaped = String::with_capacity(text.len());
            for c in text.chars() {
                match c {
                    '\\' | '/' => {
                        escaped.push('\\');
                        escaped.push(c);
                    }
                    '\n' => escaped.push_str("\\n"),
                    _ => escaped.push(c),
                }
            }
            escaped
        }
        // Debug formatting keeps the fraction, so a retyped 2.0 stays real.
        Value::Real(real) => format!("{:?}", real),
        other => render_value(other),
    }
}

/// Numeric affinities turn text that reads as a number into a number.
pub fn coerce_for_affinity(value: Value, affinity: Affinity) -> Value {
    if !affinity.is_numeric() {
        return value;
    }
    let Value::Text(text) = &value else {
        return value;
    };
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return value;
    }
    if let Ok(integer) = trimmed.parse::<i64>() {
        return Value::Integer(integer);
    }
    match trimmed.parse::<f64>() {
        Ok(real) if real.is_finite() => Value::Real(real),
        _ => value,
    }
}

/// Full pipeline for a typed value destined for a column of `affinity`.
pub fn parse_for_affinity(input: &str, affinity: Affinity) -> Value {
    coerce_for_affinity(parse_input(input), affinity)
}

pub fn friendly_column_name(column: &str) -> String {
    column.replace('_', " ")
}
