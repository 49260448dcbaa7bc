use std::io::Write;

use crate::error::Result;
use crate::value::Value;

/// `type(v)` — the value's type tag string.
pub fn type_of(_out: &mut dyn Write, args: Vec<Value>) -> Result<Value> {
    Ok(Value::string(args[0].type_tag()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_the_declared_tags() {
        let mut out = Vec::new();
        assert_eq!(type_of(&mut out, vec![Value::Integer(1)]).unwrap().to_string(), "integer");
        assert_eq!(type_of(&mut out, vec![Value::Null]).unwrap().to_string(), "null");
    }
}
