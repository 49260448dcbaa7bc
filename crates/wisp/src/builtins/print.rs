use std::io::Write;

use crate::error::{Error, Result};
use crate::value::Value;

/// `print(...)` — space-joins its arguments' canonical string forms and
/// writes a trailing newline. Called with zero arguments, it writes
/// nothing at all (not even a blank line), matching the source.
pub fn print(out: &mut dyn Write, args: Vec<Value>) -> Result<Value> {
    if !args.is_empty() {
        let rendered: Vec<String> = args.iter().map(|v| v.to_string()).collect();
        writeln!(out, "{}", rendered.join(" ")).map_err(|e| Error::io(e.to_string()))?;
    }

    Ok(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_arguments_with_a_single_space() {
        let mut out = Vec::new();
        print(&mut out, vec![Value::Integer(1), Value::string("two")]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "1 two\n");
    }

    #[test]
    fn no_arguments_writes_nothing() {
        let mut out = Vec::new();
        print(&mut out, vec![]).unwrap();
        assert!(out.is_empty());
    }
}
