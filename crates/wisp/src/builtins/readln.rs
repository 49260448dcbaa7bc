use std::io::Write;

use crate::error::{Error, Result};
use crate::value::Value;

/// `readln()` — blocks on standard input, returning one line without its
/// trailing newline. End of input yields an empty string.
pub fn readln(_out: &mut dyn Write, _args: Vec<Value>) -> Result<Value> {
    let mut line = String::new();
    std::io::stdin().read_line(&mut line).map_err(|e| Error::io(e.to_string()))?;

    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }

    Ok(Value::string(line))
}
