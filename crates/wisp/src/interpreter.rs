use std::io::{Read, Write};
use std::rc::Rc;

use crate::builtins;
use crate::error::{Error, Result};
use crate::expressions::Expr;
use crate::fold;
use crate::intern::IdentifierPool;
use crate::lexer::Lexer;
use crate::parser::Parser;
use crate::scope::{Scope, ScopeRef};
use crate::statements::Stmt;
use crate::token::TokenKind;
use crate::value::{Array, Dictionary, Function, ScriptFunction, Value};

/// Propagation flag for `break`/`return` across nested block execution —
/// `spec.md` §4.5's statement-result state machine.
#[derive(Debug, Clone)]
enum StatementResult {
    Empty,
    Break,
    Return(Value),
}

/// Owns the identifier pool, the builtin globals, and the current scope;
/// drives parsing and evaluation one top-level statement at a time.
///
/// One `Interpreter` is long-lived across an entire file run or an entire
/// REPL session — the identifier pool and globals persist so that a name
/// declared on one REPL line keeps meaning the same thing on the next.
pub struct Interpreter {
    pool: IdentifierPool,
    globals: std::collections::HashMap<crate::intern::Id, Value>,
    scope: ScopeRef,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        let mut pool = IdentifierPool::new();
        let globals = builtins::install(&mut pool);
        Self { pool, globals, scope: Scope::root() }
    }

    /// Parses and executes `source` one top-level statement at a time: a
    /// syntax error on statement N does not undo the effects of statements
    /// before it, which is what makes file-mode and REPL-mode the same code
    /// path.
    pub fn run(&mut self, mut source: impl Read, out: &mut dyn Write) -> Result<()> {
        let mut text = String::new();
        source.read_to_string(&mut text).map_err(|e| Error::io(e.to_string()))?;

        let lexer = Lexer::new(&text)?;
        let mut parser = Parser::new(lexer, &mut self.pool);

        while let Some(stmt) = parser.next_statement()? {
            match self.execute(&stmt, out)? {
                StatementResult::Empty => {}
                StatementResult::Break => return Err(Error::runtime("'break' used outside of a loop")),
                StatementResult::Return(_) => return Err(Error::runtime("'return' used outside of a function")),
            }
        }

        Ok(())
    }

    fn execute(&mut self, stmt: &Stmt, out: &mut dyn Write) -> Result<StatementResult> {
        match stmt {
            Stmt::VariableDeclaration { id, init } => {
                if self.scope.borrow().has(*id) {
                    return Err(Error::runtime(format!(
                        "Variable '{}' is already declared in this scope",
                        self.pool.resolve(*id)
                    )));
                }
                let value = match init {
                    Some(expr) => self.evaluate(expr, out)?,
                    None => Value::Null,
                };
                self.scope.borrow_mut().set(*id, value);
                Ok(StatementResult::Empty)
            }
            Stmt::FunctionDeclaration { id, params, body } => {
                if self.scope.borrow().has(*id) {
                    return Err(Error::runtime(format!("Function '{}' is already declared in this scope", self.pool.resolve(*id))));
                }
                let function = ScriptFunction {
                    name: Rc::from(self.pool.resolve(*id)),
                    params: params.clone(),
                    body: Rc::clone(body),
                    closure: Rc::clone(&self.scope),
                };
                self.scope.borrow_mut().set(*id, Value::Function(Rc::new(Function::Script(function))));
                Ok(StatementResult::Empty)
            }
            Stmt::Expression(expr) => {
                self.evaluate(expr, out)?;
                Ok(StatementResult::Empty)
            }
            Stmt::Block(statements) => {
                let child = Scope::child(&self.scope);
                self.execute_in_scope(statements, child, out)
            }
            Stmt::If { condition, then_branch, else_branch } => {
                let condition = self.evaluate_boolean(condition, out, "if")?;
                if condition {
                    self.execute(then_branch, out)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch, out)
                } else {
                    Ok(StatementResult::Empty)
                }
            }
            Stmt::While { condition, body } => {
                loop {
                    if !self.evaluate_boolean(condition, out, "while")? {
                        break;
                    }
                    match self.execute(body, out)? {
                        StatementResult::Break => break,
                        result @ StatementResult::Return(_) => return Ok(result),
                        StatementResult::Empty => {}
                    }
                }
                Ok(StatementResult::Empty)
            }
            Stmt::Break => Ok(StatementResult::Break),
            Stmt::Return(value) => {
                let value = match value {
                    Some(expr) => self.evaluate(expr, out)?,
                    None => Value::Null,
                };
                Ok(StatementResult::Return(value))
            }
        }
    }

    fn evaluate_boolean(&mut self, expr: &Expr, out: &mut dyn Write, context: &str) -> Result<bool> {
        self.evaluate(expr, out)?
            .as_boolean()
            .ok_or_else(|| Error::runtime(format!("Expect boolean value for '{context}' condition")))
    }

    /// Runs `statements` with `scope` installed as current, restoring the
    /// previous scope on every exit path (success, `break`/`return`, or
    /// error) — `spec.md` §4.5's Block invariant.
    fn execute_in_scope(&mut self, statements: &[Stmt], scope: ScopeRef, out: &mut dyn Write) -> Result<StatementResult> {
        let previous = std::mem::replace(&mut self.scope, scope);

        let outcome = (|| {
            for statement in statements {
                let result = self.execute(statement, out)?;
                if matches!(result, StatementResult::Break | StatementResult::Return(_)) {
                    return Ok(result);
                }
            }
            Ok(StatementResult::Empty)
        })();

        self.scope = previous;
        outcome
    }

    fn evaluate(&mut self, expr: &Expr, out: &mut dyn Write) -> Result<Value> {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Grouping(inner) => self.evaluate(inner, out),
            Expr::Array(elements) => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(self.evaluate(element, out)?);
                }
                Ok(Value::Array(Rc::new(std::cell::RefCell::new(Array::new(values)))))
            }
            Expr::Dictionary => Ok(Value::Dictionary(Rc::new(std::cell::RefCell::new(Dictionary::new())))),
            Expr::Identifier(id) => self.lookup(*id),
            Expr::Member { target, key } => {
                let target = self.evaluate(target, out)?;
                let key = self.evaluate(key, out)?;
                member_get(&target, &key)
            }
            Expr::Unary { operator, operand } => {
                let value = self.evaluate(operand, out)?;
                evaluate_unary(*operator, value)
            }
            Expr::Binary { left, operator, right } => {
                let left = self.evaluate(left, out)?;
                let right = self.evaluate(right, out)?;
                evaluate_binary(left, *operator, right)
            }
            Expr::Logical { left, operator, right } => self.evaluate_logical(left, *operator, right, out),
            Expr::Function { params, body } => Ok(Value::Function(Rc::new(Function::Script(ScriptFunction {
                name: Rc::from(""),
                params: params.clone(),
                body: Rc::clone(body),
                closure: Rc::clone(&self.scope),
            })))),
            Expr::Call { callee, arguments } => self.evaluate_call(callee, arguments, out),
            Expr::Assignment { target, value } => self.evaluate_assignment(target, value, out),
        }
    }

    fn lookup(&self, id: crate::intern::Id) -> Result<Value> {
        let mut current = Some(Rc::clone(&self.scope));
        while let Some(scope) = current {
            if let Some(value) = scope.borrow().try_get(id) {
                return Ok(value);
            }
            current = scope.borrow().parent();
        }

        self.globals.get(&id).cloned().ok_or_else(|| Error::runtime(format!("'{}' is not defined", self.pool.resolve(id))))
    }

    fn evaluate_logical(&mut self, left: &Expr, operator: TokenKind, right: &Expr, out: &mut dyn Write) -> Result<Value> {
        let left_value = self.evaluate(left, out)?;
        let left_bool = left_value
            .as_boolean()
            .ok_or_else(|| Error::runtime(format!("Expect boolean left value for operator '{operator:?}'")))?;

        match operator {
            TokenKind::And if !left_bool => Ok(Value::Boolean(false)),
            TokenKind::Or if left_bool => Ok(Value::Boolean(true)),
            TokenKind::And | TokenKind::Or => {
                let right_value = self.evaluate(right, out)?;
                let right_bool = right_value
                    .as_boolean()
                    .ok_or_else(|| Error::runtime(format!("Expect boolean right value for operator '{operator:?}'")))?;
                Ok(Value::Boolean(right_bool))
            }
            other => Err(Error::runtime(format!("Invalid logical operator '{other:?}'"))),
        }
    }

    fn evaluate_call(&mut self, callee: &Expr, arguments: &[Expr], out: &mut dyn Write) -> Result<Value> {
        let callee_value = self.evaluate(callee, out)?;
        let function = match callee_value {
            Value::Function(f) => f,
            _ => return Err(Error::runtime("Expect function for call expression")),
        };

        if !function.arity().accepts(arguments.len()) {
            return Err(Error::runtime(format!(
                "Expect {} parameters for '{}' function call, {} provided",
                function.arity(),
                function.name(),
                arguments.len()
            )));
        }

        let mut values = Vec::with_capacity(arguments.len());
        for argument in arguments {
            values.push(self.evaluate(argument, out)?);
        }

        match function.as_ref() {
            Function::Native(native) => (native.func)(out, values).map_err(|e| e.in_native_fn(native.name)),
            Function::Script(script) => self.call_script(script, values, out),
        }
    }

    /// Executes a script function's body directly in a scope binding its
    /// parameters (no extra nested child scope, unlike a `Block` statement)
    /// — matching the source's `InvokeScriptFunction`.
    fn call_script(&mut self, function: &ScriptFunction, arguments: Vec<Value>, out: &mut dyn Write) -> Result<Value> {
        let call_scope = Scope::child(&function.closure);
        for (param, argument) in function.params.iter().zip(arguments) {
            call_scope.borrow_mut().set(*param, argument);
        }

        match self.execute_in_scope(&function.body, call_scope, out)? {
            StatementResult::Return(value) => Ok(value),
            StatementResult::Empty => Ok(Value::Null),
            StatementResult::Break => Err(Error::runtime("'break' used outside of a loop")),
        }
    }

    fn evaluate_assignment(&mut self, target: &Expr, value: &Expr, out: &mut dyn Write) -> Result<Value> {
        match target {
            Expr::Member { target, key } => {
                let target_value = self.evaluate(target, out)?;
                let key_value = self.evaluate(key, out)?;
                let rhs = self.evaluate(value, out)?;
                member_set(&target_value, &key_value, rhs.clone())?;
                Ok(rhs)
            }
            Expr::Identifier(id) => {
                let rhs = self.evaluate(value, out)?;
                let mut current = Some(Rc::clone(&self.scope));
                while let Some(scope) = current {
                    if scope.borrow().has(*id) {
                        scope.borrow_mut().set(*id, rhs.clone());
                        return Ok(rhs);
                    }
                    current = scope.borrow().parent();
                }
                Err(Error::runtime(format!("'{}' is not defined", self.pool.resolve(*id))))
            }
            _ => Err(Error::runtime("Invalid assignment target")),
        }
    }
}

fn member_get(target: &Value, key: &Value) -> Result<Value> {
    match target {
        Value::Dictionary(dict) => match key {
            Value::String(s) => Ok(dict.borrow().get(s)),
            _ => Err(Error::runtime("Dictionary key must be a string")),
        },
        Value::Array(array) => match key {
            Value::Integer(i) => array.borrow().get(*i),
            _ => Err(Error::runtime("Array index must be an integer")),
        },
        _ => Err(Error::runtime("Failed to access member for non-object variable")),
    }
}

fn member_set(target: &Value, key: &Value, value: Value) -> Result<()> {
    match target {
        Value::Dictionary(dict) => match key {
            Value::String(s) => {
                dict.borrow_mut().set(s, value);
                Ok(())
            }
            _ => Err(Error::runtime("Dictionary key must be a string")),
        },
        Value::Array(array) => match key {
            Value::Integer(i) => array.borrow_mut().set(*i, value),
            _ => Err(Error::runtime("Array index must be an integer")),
        },
        _ => Err(Error::runtime("Failed to access member for non-object variable")),
    }
}

fn evaluate_unary(operator: TokenKind, value: Value) -> Result<Value> {
    match operator {
        TokenKind::Minus => match value {
            Value::Integer(i) => Ok(Value::Integer(i.wrapping_neg())),
            Value::Float(f) => Ok(Value::Float(-f)),
            _ => Err(Error::runtime("Invalid operand type for operator '-'")),
        },
        TokenKind::Bang => {
            let b = value.as_boolean().ok_or_else(|| Error::runtime("Invalid non-boolean operand type for operator '!'"))?;
            Ok(Value::Boolean(!b))
        }
        other => Err(Error::runtime(format!("Invalid unary operator '{other:?}'"))),
    }
}

fn evaluate_binary(left: Value, operator: TokenKind, right: Value) -> Result<Value> {
    match operator {
        TokenKind::Plus => {
            if let (Value::String(a), Value::String(b)) = (&left, &right) {
                return Ok(Value::string(format!("{a}{b}")));
            }
            numeric(&left, &right, "+", i64::wrapping_add, |a, b| a + b)
        }
        TokenKind::Minus => numeric(&left, &right, "-", i64::wrapping_sub, |a, b| a - b),
        TokenKind::Asterisk => numeric(&left, &right, "*", i64::wrapping_mul, |a, b| a * b),
        TokenKind::Power => numeric(&left, &right, "**", |a, b| (a as f64).powi(b as i32) as i64, f64::powf),
        TokenKind::Slash => division(&left, &right),
        TokenKind::Percent => modulo(&left, &right),
        TokenKind::GreaterThan => comparison(&left, &right, ">", |a, b| a > b, |a, b| a > b),
        TokenKind::GreaterThanOrEquals => comparison(&left, &right, ">=", |a, b| a >= b, |a, b| a >= b),
        TokenKind::LessThan => comparison(&left, &right, "<", |a, b| a < b, |a, b| a < b),
        TokenKind::LessThanOrEquals => comparison(&left, &right, "<=", |a, b| a <= b, |a, b| a <= b),
        TokenKind::Equals => equality(&left, &right),
        TokenKind::NotEquals => equality(&left, &right).map(|v| Value::Boolean(!v.as_boolean().expect("equality always yields a boolean"))),
        other => Err(Error::runtime(format!("Invalid binary operator '{other:?}'"))),
    }
}

fn numeric(left: &Value, right: &Value, op: &str, int_op: fn(i64, i64) -> i64, float_op: fn(f64, f64) -> f64) -> Result<Value> {
    if !left.is_number() {
        return Err(Error::runtime(format!("Invalid non-number left operand for operator '{op}'")));
    }
    if !right.is_number() {
        return Err(Error::runtime(format!("Invalid non-number right operand for operator '{op}'")));
    }

    if let (Value::Integer(a), Value::Integer(b)) = (left, right) {
        Ok(Value::Integer(int_op(*a, *b)))
    } else {
        Ok(Value::Float(float_op(
            left.as_float().expect("checked numeric above"),
            right.as_float().expect("checked numeric above"),
        )))
    }
}

fn comparison(left: &Value, right: &Value, op: &str, int_op: fn(i64, i64) -> bool, float_op: fn(f64, f64) -> bool) -> Result<Value> {
    if !left.is_number() {
        return Err(Error::runtime(format!("Invalid non-number left operand for operator '{op}'")));
    }
    if !right.is_number() {
        return Err(Error::runtime(format!("Invalid non-number right operand for operator '{op}'")));
    }

    if let (Value::Integer(a), Value::Integer(b)) = (left, right) {
        Ok(Value::Boolean(int_op(*a, *b)))
    } else {
        Ok(Value::Boolean(float_op(
            left.as_float().expect("checked numeric above"),
            right.as_float().expect("checked numeric above"),
        )))
    }
}

fn division(left: &Value, right: &Value) -> Result<Value> {
    if !left.is_number() {
        return Err(Error::runtime("Invalid non-number left operand for operator '/'"));
    }
    if !right.is_number() {
        return Err(Error::runtime("Invalid non-number right operand for operator '/'"));
    }

    if let (Value::Integer(a), Value::Integer(b)) = (left, right) {
        if *b == 0 {
            return Err(Error::runtime("Divide by zero exception"));
        }
        Ok(Value::Integer(a.wrapping_div(*b)))
    } else {
        let divisor = right.as_float().expect("checked numeric above");
        if divisor.classify() == std::num::FpCategory::Zero {
            return Err(Error::runtime("Divide by zero exception"));
        }
        Ok(Value::Float(left.as_float().expect("checked numeric above") / divisor))
    }
}

fn modulo(left: &Value, right: &Value) -> Result<Value> {
    let a = match left {
        Value::Integer(a) => *a,
        _ => return Err(Error::runtime("Invalid non-number left operand for operator '%'")),
    };
    let b = match right {
        Value::Integer(b) => *b,
        _ => return Err(Error::runtime("Invalid non-number right operand for operator '%'")),
    };
    if b == 0 {
        return Err(Error::runtime("Divide by zero exception"));
    }
    Ok(Value::Integer(a.wrapping_rem(b)))
}

/// Shared rule for `==`; `!=` is computed as its logical negation above,
/// including for floats — fixing the documented gap where the source only
/// implements `Float == Float`, leaving `Float != Float` unimplemented.
fn equality(left: &Value, right: &Value) -> Result<Value> {
    match (left, right) {
        (Value::Null, Value::Null) => Ok(Value::Boolean(true)),
        (Value::Null, _) | (_, Value::Null) => Ok(Value::Boolean(false)),
        (Value::Boolean(a), Value::Boolean(b)) => Ok(Value::Boolean(a == b)),
        (Value::Integer(a), Value::Integer(b)) => Ok(Value::Boolean(a == b)),
        (Value::Float(a), Value::Float(b)) => Ok(Value::Boolean((a - b).abs() <= f64::EPSILON)),
        (Value::String(a), Value::String(b)) => Ok(Value::Boolean(a == b)),
        _ => Err(Error::runtime("Invalid operand types for operator '=='")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(source: &str) -> String {
        let mut interpreter = Interpreter::new();
        let mut out = Vec::new();
        interpreter.run(source.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn scenario_constant_folded_arithmetic() {
        assert_eq!(run("var a = 1 + 2 * 3; print(a);"), "7\n");
    }

    #[test]
    fn scenario_recursive_factorial() {
        assert_eq!(run("fun f(n) { if (n <= 1) return 1; return n * f(n - 1); } print(f(5));"), "120\n");
    }

    #[test]
    fn scenario_array_index_assignment() {
        assert_eq!(run("var xs = [10, 20, 30]; xs[1] = 99; print(xs);"), "[ 10, 99, 30 ]\n");
    }

    #[test]
    fn scenario_dict_assignment_and_null_delete() {
        assert_eq!(run(r#"var d = {}; d["k"] = "v"; print(d["k"]); d["k"] = null; print(d["k"]);"#), "v\nnull\n");
    }

    #[test]
    fn scenario_closure_over_mutable_counter() {
        assert_eq!(
            run("fun make() { var c = 0; return fun() { c = c + 1; return c; }; } var g = make(); print(g()); print(g()); print(g());"),
            "1\n2\n3\n"
        );
    }

    #[test]
    fn scenario_break_exits_the_loop_early() {
        assert_eq!(run("var i = 0; while (i < 3) { if (i == 2) break; i = i + 1; } print(i);"), "2\n");
    }

    #[test]
    fn block_scope_does_not_leak_outward() {
        let mut interpreter = Interpreter::new();
        let mut out = Vec::new();
        let err = interpreter.run("{ var x = 1; } print(x);".as_bytes(), &mut out).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::RuntimeError);
    }

    #[test]
    fn a_local_declaration_shadows_a_builtin_global() {
        assert_eq!(run("var len = 42; print(len);"), "42\n");
    }

    #[test]
    fn break_outside_a_loop_is_a_runtime_error() {
        let mut interpreter = Interpreter::new();
        let mut out = Vec::new();
        let err = interpreter.run("break;".as_bytes(), &mut out);
        assert!(err.is_err());
    }

    #[test]
    fn break_inside_a_function_body_but_outside_any_loop_is_still_a_runtime_error() {
        let mut interpreter = Interpreter::new();
        let mut out = Vec::new();
        let err = interpreter.run("fun f() { break; } f();".as_bytes(), &mut out);
        assert!(err.is_err());
    }

    #[test]
    fn integer_overflow_wraps_instead_of_panicking() {
        assert_eq!(run("print(9223372036854775807 + 1);"), "-9223372036854775808\n");
    }

    #[test]
    fn syntax_error_on_a_later_statement_does_not_undo_earlier_ones() {
        let mut interpreter = Interpreter::new();
        let mut out = Vec::new();
        let result = interpreter.run("print(1); var".as_bytes(), &mut out);
        assert!(result.is_err());
        assert_eq!(String::from_utf8(out).unwrap(), "1\n");
    }
}
