use std::io::Write;

use crate::error::{Error, Result};
use crate::value::Value;

/// `assert(condition, ...message)` — raises `LanguageError` on failure, per
/// the source's `assert` builtin.
pub fn assert(_out: &mut dyn Write, args: Vec<Value>) -> Result<Value> {
    let condition = args[0]
        .as_boolean()
        .ok_or_else(|| Error::runtime("Expect boolean argument type in 'assert' function call"))?;

    if !condition {
        let message = if args.len() > 1 {
            let tail: Vec<String> = args[1..].iter().map(|v| v.to_string()).collect();
            format!("Assertion failed: {}", tail.join(" "))
        } else {
            "Assertion failed".to_string()
        };
        return Err(Error::language(message));
    }

    Ok(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passing_assertion_returns_null() {
        let mut sink = Vec::new();
        assert_eq!(assert(&mut sink, vec![Value::Boolean(true)]).unwrap().type_tag(), "null");
    }

    #[test]
    fn failing_assertion_joins_the_remaining_args() {
        let mut sink = Vec::new();
        let err = assert(&mut sink, vec![Value::Boolean(false), Value::string("bad"), Value::Integer(1)]).unwrap_err();
        assert_eq!(err.message, "Assertion failed: bad 1");
    }
}
