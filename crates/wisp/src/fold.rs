use crate::expressions::Expr;
use crate::token::TokenKind;
use crate::value::Value;

/// Attempts to collapse an already-built expression into a single constant
/// value.
///
/// Returns `None` when the expression is not foldable, `Some(value)` when it
/// is — including `Some(Value::Null)` for a subtree that genuinely folds to
/// `null`. Using `Option` rather than a sentinel `Value::Null` (as the
/// original interpreter does) keeps "not foldable" and "folds to null"
/// distinguishable; it changes no observable behavior since the parser only
/// ever calls this on already-parsed, already-folded operands.
///
/// Never raises — any error in the folded shape is left for the evaluator to
/// report at runtime, with a real source location attached.
pub fn fold(expr: &Expr) -> Option<Value> {
    match expr {
        Expr::Literal(value) => Some(value.clone()),
        Expr::Grouping(inner) => fold(inner),
        Expr::Binary { left, operator, right } => fold_binary(left, *operator, right),
        Expr::Unary { operator, operand } => fold_unary(*operator, operand),
        Expr::Logical { left, operator, right } => fold_logical(left, *operator, right),
        _ => None,
    }
}

fn fold_binary(left: &Expr, operator: TokenKind, right: &Expr) -> Option<Value> {
    let left = fold(left)?;
    let right = fold(right)?;

    match operator {
        TokenKind::Plus => match (&left, &right) {
            (Value::String(a), Value::String(b)) => Some(Value::string(format!("{a}{b}"))),
            _ => fold_numeric(&left, &right, |a, b| a.wrapping_add(b), |a, b| a + b),
        },
        TokenKind::Minus => fold_numeric(&left, &right, |a, b| a.wrapping_sub(b), |a, b| a - b),
        TokenKind::Asterisk => fold_numeric(&left, &right, |a, b| a.wrapping_mul(b), |a, b| a * b),
        TokenKind::Power => fold_numeric(
            &left,
            &right,
            |a, b| (a as f64).powi(b as i32) as i64,
            |a, b| a.powf(b),
        ),
        TokenKind::Slash => fold_division(&left, &right),
        TokenKind::Percent => fold_modulo(&left, &right),
        TokenKind::GreaterThan => fold_comparison(&left, &right, |a, b| a > b, |a, b| a > b),
        TokenKind::GreaterThanOrEquals => fold_comparison(&left, &right, |a, b| a >= b, |a, b| a >= b),
        TokenKind::LessThan => fold_comparison(&left, &right, |a, b| a < b, |a, b| a < b),
        TokenKind::LessThanOrEquals => fold_comparison(&left, &right, |a, b| a <= b, |a, b| a <= b),
        TokenKind::Equals => fold_equality(&left, &right),
        TokenKind::NotEquals => fold_equality(&left, &right).map(|v| Value::Boolean(!v.as_boolean().unwrap())),
        _ => None,
    }
}

fn fold_numeric(left: &Value, right: &Value, int_op: fn(i64, i64) -> i64, float_op: fn(f64, f64) -> f64) -> Option<Value> {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => Some(Value::Integer(int_op(*a, *b))),
        (a, b) if a.is_number() && b.is_number() => Some(Value::Float(float_op(a.as_float()?, b.as_float()?))),
        _ => None,
    }
}

fn fold_division(left: &Value, right: &Value) -> Option<Value> {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => {
            if *b == 0 {
                None
            } else {
                Some(Value::Integer(a.wrapping_div(*b)))
            }
        }
        (a, b) if a.is_number() && b.is_number() => {
            let divisor = b.as_float()?;
            if divisor.classify() == std::num::FpCategory::Zero {
                None
            } else {
                Some(Value::Float(a.as_float()? / divisor))
            }
        }
        _ => None,
    }
}

fn fold_modulo(left: &Value, right: &Value) -> Option<Value> {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) if *b != 0 => Some(Value::Integer(a.wrapping_rem(*b))),
        _ => None,
    }
}

fn fold_comparison(left: &Value, right: &Value, int_op: fn(i64, i64) -> bool, float_op: fn(f64, f64) -> bool) -> Option<Value> {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => Some(Value::Boolean(int_op(*a, *b))),
        (a, b) if a.is_number() && b.is_number() => Some(Value::Boolean(float_op(a.as_float()?, b.as_float()?))),
        _ => None,
    }
}

/// Shared rule for `==`; `!=` is its logical negation (including for
/// floats — a deliberate fix of the documented gap where the original
/// folder and evaluator only handle `Float == Float`, not `!=`).
fn fold_equality(left: &Value, right: &Value) -> Option<Value> {
    match (left, right) {
        (Value::Null, Value::Null) => Some(Value::Boolean(true)),
        (Value::Null, _) | (_, Value::Null) => Some(Value::Boolean(false)),
        (Value::Boolean(a), Value::Boolean(b)) => Some(Value::Boolean(a == b)),
        (Value::Integer(a), Value::Integer(b)) => Some(Value::Boolean(a == b)),
        (Value::Float(a), Value::Float(b)) => Some(Value::Boolean((a - b).abs() <= f64::EPSILON)),
        (Value::String(a), Value::String(b)) => Some(Value::Boolean(a == b)),
        _ => None,
    }
}

fn fold_unary(operator: TokenKind, operand: &Expr) -> Option<Value> {
    let value = fold(operand)?;

    match operator {
        TokenKind::Minus => match value {
            Value::Integer(i) => Some(Value::Integer(i.wrapping_neg())),
            Value::Float(f) => Some(Value::Float(-f)),
            _ => None,
        },
        TokenKind::Bang => value.as_boolean().map(|b| Value::Boolean(!b)),
        _ => None,
    }
}

fn fold_logical(left: &Expr, operator: TokenKind, right: &Expr) -> Option<Value> {
    let left = fold(left)?.as_boolean()?;

    match operator {
        TokenKind::And if !left => Some(Value::Boolean(false)),
        TokenKind::Or if left => Some(Value::Boolean(true)),
        TokenKind::And | TokenKind::Or => {
            let right = fold(right)?.as_boolean()?;
            Some(Value::Boolean(match operator {
                TokenKind::And => left && right,
                _ => left || right,
            }))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intern::IdentifierPool;

    fn lit(value: Value) -> Expr {
        Expr::Literal(value)
    }

    fn binary(left: Expr, operator: TokenKind, right: Expr) -> Expr {
        Expr::Binary { left: Box::new(left), operator, right: Box::new(right) }
    }

    #[test]
    fn integer_addition_stays_integer() {
        let folded = fold(&binary(lit(Value::Integer(1)), TokenKind::Plus, lit(Value::Integer(2))));
        assert!(matches!(folded, Some(Value::Integer(3))));
    }

    #[test]
    fn mixed_int_float_addition_widens_to_float() {
        let folded = fold(&binary(lit(Value::Integer(1)), TokenKind::Plus, lit(Value::Float(2.5))));
        assert!(matches!(folded, Some(Value::Float(f)) if f == 3.5));
    }

    #[test]
    fn string_concatenation_folds() {
        let folded = fold(&binary(lit(Value::string("a")), TokenKind::Plus, lit(Value::string("b"))));
        match folded {
            Some(Value::String(s)) => assert_eq!(&*s, "ab"),
            other => panic!("expected folded string, got {other:?}"),
        }
    }

    #[test]
    fn integer_division_by_zero_does_not_fold() {
        let folded = fold(&binary(lit(Value::Integer(1)), TokenKind::Slash, lit(Value::Integer(0))));
        assert!(folded.is_none());
    }

    #[test]
    fn non_constant_operand_does_not_fold() {
        let mut pool = IdentifierPool::new();
        let expr = binary(Expr::Identifier(pool.intern("x")), TokenKind::Plus, lit(Value::Integer(1)));
        assert!(fold(&expr).is_none());
    }

    #[test]
    fn float_not_equals_is_the_negation_of_equals() {
        let folded = fold(&binary(lit(Value::Float(1.0)), TokenKind::NotEquals, lit(Value::Float(2.0))));
        assert!(matches!(folded, Some(Value::Boolean(true))));
    }

    #[test]
    fn logical_or_short_circuits_without_folding_the_right_side() {
        // An unfoldable right operand must not prevent the left `true` from
        // short-circuiting the fold.
        let mut pool = IdentifierPool::new();
        let expr = Expr::Logical {
            left: Box::new(lit(Value::Boolean(true))),
            operator: TokenKind::Or,
            right: Box::new(Expr::Identifier(pool.intern("x"))),
        };
        assert!(matches!(fold(&expr), Some(Value::Boolean(true))));
    }
}
