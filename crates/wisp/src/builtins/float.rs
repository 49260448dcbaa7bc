use std::io::Write;

use crate::error::{Error, Result};
use crate::value::Value;

/// `float(v)` — Boolean widens to 0.0/1.0, Integer widens exactly, String
/// parses as a double.
pub fn float(_out: &mut dyn Write, args: Vec<Value>) -> Result<Value> {
    match &args[0] {
        Value::Boolean(b) => Ok(Value::Float(if *b { 1.0 } else { 0.0 })),
        Value::Integer(i) => Ok(Value::Float(*i as f64)),
        Value::Float(f) => Ok(Value::Float(*f)),
        Value::String(s) => s.trim().parse::<f64>().map(Value::Float).map_err(|_| invalid(s)),
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
    fn widens_integers_exactly() {
        let mut out = Vec::new();
        assert!(matches!(float(&mut out, vec![Value::Integer(2)]).unwrap(), Value::Float(f) if f == 2.0));
    }

    #[test]
    fn parses_floating_point_strings() {
        let mut out = Vec::new();
        assert!(matches!(float(&mut out, vec![Value::string("1.5")]).unwrap(), Value::Float(f) if f == 1.5));
    }
}
