use std::io::Write;

use crate::error::Result;
use crate::value::Value;

/// `str(v)` — canonical string form of any value.
pub fn str(_out: &mut dyn Write, args: Vec<Value>) -> Result<Value> {
    Ok(Value::string(args[0].to_string()))
}
