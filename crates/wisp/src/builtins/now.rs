use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use crate::error::Result;
use crate::value::Value;

/// `now()` — milliseconds since an unspecified, process-local epoch. The
/// epoch is this builtin's first call, not process start, but since the
/// source only requires a monotonic clock with an unspecified origin, that
/// is an implementation detail scripts cannot observe.
pub fn now(_out: &mut dyn Write, _args: Vec<Value>) -> Result<Value> {
    static EPOCH: OnceLock<Instant> = OnceLock::new();
    let epoch = EPOCH.get_or_init(Instant::now);
    Ok(Value::Integer(epoch.elapsed().as_millis() as i64))
}
