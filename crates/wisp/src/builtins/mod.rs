//! Native functions, one file per builtin.
//!
//! [`install`] interns each builtin's name and returns the globals map the
//! [`crate::interpreter::Interpreter`] consults once scope-chain lookup
//! misses.

mod assert;
mod float;
mod int;
mod len;
mod now;
mod print;
mod readln;
mod str_;
mod type_;

use std::collections::HashMap;
use std::rc::Rc;

use crate::intern::{Id, IdentifierPool};
use crate::value::{Arity, Function, NativeFunction, Value};

pub fn install(pool: &mut IdentifierPool) -> HashMap<Id, Value> {
    let mut globals = HashMap::new();

    macro_rules! register {
        ($name:literal, $arity:expr, $func:path) => {
            globals.insert(
                pool.intern($name),
                Value::Function(Rc::new(Function::Native(NativeFunction { name: $name, arity: $arity, func: $func }))),
            );
        };
    }

    register!("assert", Arity::Variadic { min: 1 }, assert::assert);
    register!("now", Arity::Exact(0), now::now);
    register!("print", Arity::Variadic { min: 0 }, print::print);
    register!("readln", Arity::Exact(0), readln::readln);
    register!("type", Arity::Exact(1), type_::type_of);
    register!("int", Arity::Exact(1), int::int);
    register!("float", Arity::Exact(1), float::float);
    register!("str", Arity::Exact(1), str_::str);
    register!("len", Arity::Exact(1), len::len);

    globals
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn installs_exactly_the_builtins_the_language_specifies() {
        let mut pool = IdentifierPool::new();
        let globals = install(&mut pool);
        assert_eq!(globals.len(), 9);
    }
}
