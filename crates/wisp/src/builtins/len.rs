use std::io::Write;

use crate::error::{Error, Result};
use crate::value::Value;

/// `len(v)` — byte length of a String, element count of an Array.
pub fn len(_out: &mut dyn Write, args: Vec<Value>) -> Result<Value> {
    match &args[0] {
        Value::String(s) => Ok(Value::Integer(s.len() as i64)),
        Value::Array(a) => Ok(Value::Integer(a.borrow().len() as i64)),
        other => Err(Error::runtime(format!("Invalid argument '{other}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_length_is_byte_length() {
        let mut out = Vec::new();
        assert!(matches!(len(&mut out, vec![Value::string("hello")]).unwrap(), Value::Integer(5)));
    }

    #[test]
    fn non_string_non_array_is_a_runtime_error() {
        let mut out = Vec::new();
        assert!(len(&mut out, vec![Value::Integer(1)]).is_err());
    }
}
