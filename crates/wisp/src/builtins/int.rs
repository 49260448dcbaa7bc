use std::io::Write;

use crate::error::{Error, Result};
use crate::value::Value;

/// `int(v)` — Boolean widens to 0/1, Float truncates toward zero, String
/// parses as a signed integer (`RuntimeError` on failure).
pub fn int(_out: &mut dyn Write, args: Vec<Value>) -> Result<Value> {
    match &args[0] {
        Value::Boolean(b) => Ok(Value::Integer(if *b { 1 } else { 0 })),
        Value::Integer(i) => Ok(Value::Integer(*i)),
        Value::Float(f) => Ok(Value::Integer(*f as i64)),
        Value::String(s) => s.trim().parse::<i64>().map(Value::Integer).map_err(|_| invalid(s)),
        other => Err(invalid(other)),
    }
}

fn invalid(value: impl std::fmt::Display) -> Error {
    Error::runtime(format!("Invalid argument '{value}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_floats_toward_zero() {
        let mut out = Vec::new();
        assert!(matches!(int(&mut out, vec![Value::Float(3.9)]).unwrap(), Value::Integer(3)));
        assert!(matches!(int(&mut out, vec![Value::Float(-3.9)]).unwrap(), Value::Integer(-3)));
    }

    #[test]
    fn parses_numeric_strings() {
        let mut out = Vec::new();
        assert!(matches!(int(&mut out, vec![Value::string("42")]).unwrap(), Value::Integer(42)));
    }

    #[test]
    fn non_numeric_string_is_a_runtime_error() {
        let mut out = Vec::new();
        assert!(int(&mut out, vec![Value::string("nope")]).is_err());
    }
}
