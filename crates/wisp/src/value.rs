use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::{self, Display};
use std::io::Write;
use std::rc::Rc;

use crate::error::Result;
use crate::intern::Id;
use crate::scope::ScopeRef;
use crate::statements::Stmt;

/// The closed tagged union of runtime values (`spec.md` §3).
///
/// `String`, `Function`, `Dictionary`, and `Array` are reference-counted:
/// literal values held in AST nodes are immutable, but composite values
/// created at runtime are shared — two bindings pointing at the same array
/// observe each other's mutations. There is no cycle collector; a closure
/// capturing a scope that (transitively) holds that closure leaks, which is
/// accepted per `spec.md` §5.
#[derive(Clone)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(Rc<str>),
    Function(Rc<Function>),
    Dictionary(Rc<RefCell<Dictionary>>),
    Array(Rc<RefCell<Array>>),
}

impl Value {
    pub fn string(s: impl Into<Rc<str>>) -> Self {
        Value::String(s.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Float(_))
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Tag name returned by the `type()` builtin.
    pub fn type_tag(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Function(_) => "function",
            Value::Dictionary(_) => "dict",
            Value::Array(_) => "array",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::String(s) => write!(f, "{s}"),
            Value::Function(func) => write!(f, "<fun {}>", func.name()),
            Value::Dictionary(dict) => dict.borrow().fmt(f),
            Value::Array(array) => array.borrow().fmt(f),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Value({self})")
    }
}

/// Ordered sequence of values, mutated only through `Member` assignment to
/// an array target.
#[derive(Debug, Default)]
pub struct Array {
    elements: Vec<Value>,
}

impl Array {
    pub fn new(elements: Vec<Value>) -> Self {
        Self { elements }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, index: i64) -> Result<Value> {
        self.checked_index(index).map(|i| self.elements[i].clone())
    }

    pub fn set(&mut self, index: i64, value: Value) -> Result<()> {
        let i = self.checked_index(index)?;
        self.elements[i] = value;
        Ok(())
    }

    fn checked_index(&self, index: i64) -> Result<usize> {
        if index < 0 || index as usize >= self.elements.len() {
            return Err(crate::error::Error::out_of_range(index, self.elements.len()));
        }
        Ok(index as usize)
    }
}

impl fmt::Display for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        if !self.elements.is_empty() {
            write!(f, " ")?;
            for (i, value) in self.elements.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{value}")?;
            }
            write!(f, " ")?;
        }
        write!(f, "]")
    }
}

/// Mapping from string key to value. Assigning `null` removes the key so no
/// stored value is ever `Value::Null`; iteration order is not observable.
#[derive(Debug, Default)]
pub struct Dictionary {
    entries: HashMap<String, Value>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Value {
        self.entries.get(key).cloned().unwrap_or(Value::Null)
    }

    pub fn set(&mut self, key: &str, value: Value) {
        if value.is_null() {
            self.entries.remove(key);
        } else {
            self.entries.insert(key.to_owned(), value);
        }
    }
}

impl fmt::Display for Dictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        if !self.entries.is_empty() {
            write!(f, " ")?;
            for (i, (key, value)) in self.entries.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}: {value}")?;
            }
            write!(f, " ")?;
        }
        write!(f, "}}")
    }
}

/// Known-or-variadic argument count for a callable.
#[derive(Debug, Clone, Copy)]
pub enum Arity {
    Exact(usize),
    Variadic { min: usize },
}

impl Arity {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exact(n) => n == count,
            Arity::Variadic { min } => count >= min,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exact(n) => write!(f, "{n}"),
            Arity::Variadic { min } => write!(f, "at least {min}"),
        }
    }
}

pub type NativeFn = fn(&mut dyn Write, Vec<Value>) -> Result<Value>;

pub struct NativeFunction {
    pub name: &'static str,
    pub arity: Arity,
    pub func: NativeFn,
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction").field("name", &self.name).finish()
    }
}

/// A function defined in the language: parameter list, body, and the scope
/// it closes over. Bodies are shared (`Rc<[Stmt]>`) rather than moved out of
/// the declaration on first execution, so re-executing a declaration (e.g.
/// a REPL line re-entered) is idempotent — see DESIGN.md.
#[derive(Debug)]
pub struct ScriptFunction {
    pub name: Rc<str>,
    pub params: Vec<Id>,
    pub body: Rc<[Stmt]>,
    pub closure: ScopeRef,
}

#[derive(Debug)]
pub enum Function {
    Script(ScriptFunction),
    Native(NativeFunction),
}

impl Function {
    pub fn name(&self) -> &str {
        match self {
            Function::Script(f) => &f.name,
            Function::Native(f) => f.name,
        }
    }

    pub fn arity(&self) -> Arity {
        match self {
            Function::Script(f) => Arity::Exact(f.params.len()),
            Function::Native(f) => f.arity,
        }
    }
}
