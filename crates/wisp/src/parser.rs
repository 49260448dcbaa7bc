use std::rc::Rc;

use crate::error::{Error, Result};
use crate::expressions::Expr;
use crate::fold;
use crate::intern::{Id, IdentifierPool};
use crate::lexer::Lexer;
use crate::statements::Stmt;
use crate::token::TokenKind;

/// Recursive-descent parser with opportunistic constant folding.
///
/// Owns nothing but the lexer and a shared identifier pool; `next_statement`
/// drives one top-level statement at a time so a syntax error on statement N
/// never prevents statements before it from having already executed.
pub struct Parser<'a> {
    lexer: Lexer,
    pool: &'a mut IdentifierPool,
}

impl<'a> Parser<'a> {
    pub fn new(lexer: Lexer, pool: &'a mut IdentifierPool) -> Self {
        Self { lexer, pool }
    }

    pub fn is_end_of_stream(&self) -> bool {
        self.lexer.is_end_of_stream()
    }

    /// Parses and returns the next top-level statement, or `None` at the end
    /// of the stream.
    pub fn next_statement(&mut self) -> Result<Option<Stmt>> {
        if self.is_end_of_stream() {
            return Ok(None);
        }
        self.statement().map(Some)
    }

    fn peek(&self) -> TokenKind {
        self.lexer.peek_token().kind
    }

    fn try_eat(&mut self, kind: TokenKind) -> Result<bool> {
        if self.peek() == kind {
            self.lexer.next_token()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn expect(&mut self, kind: TokenKind, message: &str) -> Result<()> {
        if self.try_eat(kind)? {
            Ok(())
        } else {
            Err(Error::syntax(self.lexer.location(), message))
        }
    }

    fn expect_identifier(&mut self, message: &str) -> Result<Id> {
        if self.peek() != TokenKind::Identifier {
            return Err(Error::syntax(self.lexer.location(), message));
        }
        let token = self.lexer.next_token()?;
        Ok(self.pool.intern(token.lexeme.expect("identifier token always carries a lexeme")))
    }

    fn statement(&mut self) -> Result<Stmt> {
        if self.try_eat(TokenKind::Var)? {
            self.variable_declaration()
        } else if self.try_eat(TokenKind::Fun)? {
            self.function_declaration()
        } else if self.try_eat(TokenKind::If)? {
            self.if_statement()
        } else if self.try_eat(TokenKind::While)? {
            self.while_statement()
        } else if self.try_eat(TokenKind::Break)? {
            self.expect(TokenKind::Semicolon, "Expect ';' after 'break'")?;
            Ok(Stmt::Break)
        } else if self.try_eat(TokenKind::Return)? {
            self.return_statement()
        } else {
            self.expression_statement()
        }
    }

    fn variable_declaration(&mut self) -> Result<Stmt> {
        let id = self.expect_identifier("Expect variable name")?;

        let init = if self.try_eat(TokenKind::Assign)? { Some(self.expression()?) } else { None };

        self.expect(TokenKind::Semicolon, "Expect ';' after variable declaration")?;
        Ok(Stmt::VariableDeclaration { id, init })
    }

    fn function_declaration(&mut self) -> Result<Stmt> {
        let id = self.expect_identifier("Expect function name")?;
        let params = self.parameter_list()?;
        self.expect(TokenKind::LeftBrace, "Expect '{' before function body")?;
        let body = self.block()?;
        Ok(Stmt::FunctionDeclaration { id, params, body })
    }

    fn parameter_list(&mut self) -> Result<Vec<Id>> {
        self.expect(TokenKind::LeftParenthesis, "Expect '(' after function name")?;

        let mut params = Vec::new();
        if self.peek() != TokenKind::RightParenthesis {
            loop {
                params.push(self.expect_identifier("Expect function parameter name or ')'")?);
                if !self.try_eat(TokenKind::Comma)? {
                    break;
                }
            }
        }

        self.expect(TokenKind::RightParenthesis, "Expect ')' after function parameter list")?;
        Ok(params)
    }

    fn if_statement(&mut self) -> Result<Stmt> {
        self.expect(TokenKind::LeftParenthesis, "Expect '(' after 'if'")?;
        let condition = self.expression()?;
        self.expect(TokenKind::RightParenthesis, "Expect ')' after 'if' condition")?;

        let then_branch = Box::new(self.statement()?);
        let else_branch = if self.try_eat(TokenKind::Else)? { Some(Box::new(self.statement()?)) } else { None };

        Ok(Stmt::If { condition, then_branch, else_branch })
    }

    fn while_statement(&mut self) -> Result<Stmt> {
        self.expect(TokenKind::LeftParenthesis, "Expect '(' after 'while'")?;
        let condition = self.expression()?;
        self.expect(TokenKind::RightParenthesis, "Expect ')' after 'while' condition")?;
        let body = Box::new(self.statement()?);
        Ok(Stmt::While { condition, body })
    }

    fn return_statement(&mut self) -> Result<Stmt> {
        let value = if self.peek() != TokenKind::Semicolon { Some(self.expression()?) } else { None };
        self.expect(TokenKind::Semicolon, "Expect ';' after 'return'")?;
        Ok(Stmt::Return(value))
    }

    fn expression_statement(&mut self) -> Result<Stmt> {
        if self.try_eat(TokenKind::LeftBrace)? {
            return Ok(Stmt::Block(self.block()?));
        }

        let expr = self.expression()?;
        self.expect(TokenKind::Semicolon, "Expect ';' after expression")?;
        Ok(Stmt::Expression(expr))
    }

    fn block(&mut self) -> Result<Rc<[Stmt]>> {
        let mut statements = Vec::new();

        while self.peek() != TokenKind::EndOfStream {
            if self.try_eat(TokenKind::RightBrace)? {
                return Ok(statements.into());
            }
            statements.push(self.statement()?);
        }

        Err(Error::syntax(self.lexer.location(), "Expect '}' after block"))
    }

    fn expression(&mut self) -> Result<Expr> {
        self.assignment()
    }

    fn assignment(&mut self) -> Result<Expr> {
        let target = self.or()?;

        if self.try_eat(TokenKind::Assign)? {
            let value = self.assignment()?;
            return Ok(Expr::Assignment { target: Box::new(target), value: Box::new(value) });
        }

        Ok(target)
    }

    fn or(&mut self) -> Result<Expr> {
        let mut result = self.and()?;

        while self.try_eat(TokenKind::Or)? {
            let right = self.and()?;
            result = self.fold_logical(result, TokenKind::Or, right);
        }

        Ok(result)
    }

    fn and(&mut self) -> Result<Expr> {
        let mut result = self.equality()?;

        while self.try_eat(TokenKind::And)? {
            let right = self.equality()?;
            result = self.fold_logical(result, TokenKind::And, right);
        }

        Ok(result)
    }

    fn equality(&mut self) -> Result<Expr> {
        let mut result = self.comparison()?;

        loop {
            let operator = self.peek();
            if !matches!(operator, TokenKind::Equals | TokenKind::NotEquals) {
                break;
            }
            self.lexer.next_token()?;
            let right = self.comparison()?;
            result = self.fold_binary(result, operator, right);
        }

        Ok(result)
    }

    fn comparison(&mut self) -> Result<Expr> {
        let mut result = self.term()?;

        loop {
            let operator = self.peek();
            if !matches!(
                operator,
                TokenKind::GreaterThan | TokenKind::GreaterThanOrEquals | TokenKind::LessThan | TokenKind::LessThanOrEquals
            ) {
                break;
            }
            self.lexer.next_token()?;
            let right = self.term()?;
            result = self.fold_binary(result, operator, right);
        }

        Ok(result)
    }

    fn term(&mut self) -> Result<Expr> {
        let mut result = self.factor()?;

        loop {
            let operator = self.peek();
            if !matches!(operator, TokenKind::Minus | TokenKind::Plus) {
                break;
            }
            self.lexer.next_token()?;
            let right = self.factor()?;
            result = self.fold_binary(result, operator, right);
        }

        Ok(result)
    }

    /// `**` binds at the same level as `*`, `/`, `%` — a source quirk
    /// preserved intentionally rather than given its own (conventionally
    /// higher, right-associative) precedence level.
    fn factor(&mut self) -> Result<Expr> {
        let mut result = self.unary()?;

        loop {
            let operator = self.peek();
            if !matches!(operator, TokenKind::Slash | TokenKind::Asterisk | TokenKind::Percent | TokenKind::Power) {
                break;
            }
            self.lexer.next_token()?;
            let right = self.unary()?;
            result = self.fold_binary(result, operator, right);
        }

        Ok(result)
    }

    fn unary(&mut self) -> Result<Expr> {
        let operator = self.peek();
        if matches!(operator, TokenKind::Bang | TokenKind::Minus) {
            self.lexer.next_token()?;
            let operand = self.unary()?;

            return Ok(match fold::fold(&Expr::Unary { operator, operand: Box::new(operand.clone()) }) {
                Some(value) => Expr::Literal(value),
                None => Expr::Unary { operator, operand: Box::new(operand) },
            });
        }

        self.call()
    }

    fn call(&mut self) -> Result<Expr> {
        let mut result = self.primary()?;

        loop {
            if self.try_eat(TokenKind::LeftParenthesis)? {
                let mut arguments = Vec::new();
                if self.peek() != TokenKind::RightParenthesis {
                    loop {
                        arguments.push(self.expression()?);
                        if !self.try_eat(TokenKind::Comma)? {
                            break;
                        }
                    }
                }
                self.expect(TokenKind::RightParenthesis, "Expect ')' after arguments")?;
                result = Expr::Call { callee: Box::new(result), arguments };
            } else if self.try_eat(TokenKind::Dot)? {
                let name_token = self.lexer.next_token()?;
                if name_token.kind != TokenKind::Identifier {
                    return Err(Error::syntax(self.lexer.location(), "Expect property name after '.'"));
                }
                let name = name_token.lexeme.expect("identifier token always carries a lexeme");
                result = Expr::Member { target: Box::new(result), key: Box::new(Expr::Literal(crate::value::Value::string(name))) };
            } else if self.try_eat(TokenKind::LeftBracket)? {
                let key = self.expression()?;
                self.expect(TokenKind::RightBracket, "Expect ']' after index")?;
                result = Expr::Member { target: Box::new(result), key: Box::new(key) };
            } else {
                break;
            }
        }

        Ok(result)
    }

    fn primary(&mut self) -> Result<Expr> {
        use crate::value::Value;

        if self.try_eat(TokenKind::False)? {
            return Ok(Expr::Literal(Value::Boolean(false)));
        }
        if self.try_eat(TokenKind::True)? {
            return Ok(Expr::Literal(Value::Boolean(true)));
        }
        if self.try_eat(TokenKind::Null)? {
            return Ok(Expr::Literal(Value::Null));
        }

        if self.try_eat(TokenKind::LeftParenthesis)? {
            let inner = self.expression()?;
            self.expect(TokenKind::RightParenthesis, "Expect ')' after expression")?;
            return Ok(match fold::fold(&Expr::Grouping(Box::new(inner.clone()))) {
                Some(value) => Expr::Literal(value),
                None => Expr::Grouping(Box::new(inner)),
            });
        }

        if self.try_eat(TokenKind::LeftBrace)? {
            self.expect(TokenKind::RightBrace, "Expect '}' after expression")?;
            return Ok(Expr::Dictionary);
        }

        if self.try_eat(TokenKind::LeftBracket)? {
            let mut values = Vec::new();
            if self.peek() != TokenKind::RightBracket {
                loop {
                    values.push(self.expression()?);
                    if !self.try_eat(TokenKind::Comma)? {
                        break;
                    }
                }
            }
            self.expect(TokenKind::RightBracket, "Expect ']' after values")?;
            return Ok(Expr::Array(values));
        }

        if self.peek() == TokenKind::Integer {
            let token = self.lexer.next_token()?;
            let lexeme = token.lexeme.expect("integer token always carries a lexeme");
            let value: i64 = lexeme
                .parse()
                .map_err(|_| Error::syntax(self.lexer.location(), format!("Invalid integer literal '{lexeme}'")))?;
            return Ok(Expr::Literal(Value::Integer(value)));
        }

        if self.peek() == TokenKind::Number {
            let token = self.lexer.next_token()?;
            let lexeme = token.lexeme.expect("number token always carries a lexeme");
            let value: f64 =
                lexeme.parse().map_err(|_| Error::syntax(self.lexer.location(), format!("Invalid number literal '{lexeme}'")))?;
            return Ok(Expr::Literal(Value::Float(value)));
        }

        if self.peek() == TokenKind::String {
            let token = self.lexer.next_token()?;
            let lexeme = token.lexeme.expect("string token always carries a lexeme");
            return Ok(Expr::Literal(Value::string(lexeme)));
        }

        if self.peek() == TokenKind::Identifier {
            let token = self.lexer.next_token()?;
            let lexeme = token.lexeme.expect("identifier token always carries a lexeme");
            return Ok(Expr::Identifier(self.pool.intern(lexeme)));
        }

        if self.try_eat(TokenKind::Fun)? {
            let params = self.parameter_list()?;
            self.expect(TokenKind::LeftBrace, "Expect '{' before function body")?;
            let body = self.block()?;
            return Ok(Expr::Function { params, body });
        }

        // Matches the original interpreter's quirk of raising a TypeError
        // (not a SyntaxError) for an unrecognized primary-position token.
        Err(Error::type_error(self.lexer.location(), format!("Expect expression, got '{:?}'", self.peek())))
    }

    fn fold_binary(&self, left: Expr, operator: TokenKind, right: Expr) -> Expr {
        let candidate = Expr::Binary { left: Box::new(left.clone()), operator, right: Box::new(right.clone()) };
        match fold::fold(&candidate) {
            Some(value) => Expr::Literal(value),
            None => Expr::Binary { left: Box::new(left), operator, right: Box::new(right) },
        }
    }

    fn fold_logical(&self, left: Expr, operator: TokenKind, right: Expr) -> Expr {
        let candidate = Expr::Logical { left: Box::new(left.clone()), operator, right: Box::new(right.clone()) };
        match fold::fold(&candidate) {
            Some(value) => Expr::Literal(value),
            None => Expr::Logical { left: Box::new(left), operator, right: Box::new(right) },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn parse_one(source: &str) -> (Stmt, IdentifierPool) {
        let mut pool = IdentifierPool::new();
        let stmt = {
            let lexer = Lexer::new(source).unwrap();
            let mut parser = Parser::new(lexer, &mut pool);
            parser.next_statement().unwrap().unwrap()
        };
        (stmt, pool)
    }

    #[test]
    fn constant_arithmetic_folds_to_a_single_literal() {
        let (stmt, _) = parse_one("var a = 1 + 2 * 3;");
        match stmt {
            Stmt::VariableDeclaration { init: Some(Expr::Literal(Value::Integer(n))), .. } => assert_eq!(n, 7),
            other => panic!("expected a folded literal initializer, got {other:?}"),
        }
    }

    #[test]
    fn power_binds_at_the_same_level_as_multiply() {
        let (stmt, _) = parse_one("var a = 2 * 3 ** 2;");
        match stmt {
            Stmt::VariableDeclaration { init: Some(Expr::Literal(Value::Integer(n))), .. } => assert_eq!(n, 36),
            other => panic!("expected (2 * 3) ** 2 == 36 by left-associativity, got {other:?}"),
        }
    }

    #[test]
    fn non_constant_subexpression_is_not_folded() {
        let (stmt, _) = parse_one("var a = 1 + x;");
        match stmt {
            Stmt::VariableDeclaration { init: Some(Expr::Binary { .. }), .. } => {}
            other => panic!("expected an unfolded binary node, got {other:?}"),
        }
    }

    #[test]
    fn empty_braces_in_primary_position_parse_as_an_empty_dict() {
        let (stmt, _) = parse_one("var a = {};");
        match stmt {
            Stmt::VariableDeclaration { init: Some(Expr::Dictionary), .. } => {}
            other => panic!("expected an empty dict literal, got {other:?}"),
        }
    }

    #[test]
    fn unknown_primary_token_raises_type_error() {
        let mut pool = IdentifierPool::new();
        let lexer = Lexer::new("var a = ;").unwrap();
        let mut parser = Parser::new(lexer, &mut pool);
        let err = parser.next_statement().unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::TypeError);
    }

    #[test]
    fn missing_semicolon_raises_syntax_error() {
        let mut pool = IdentifierPool::new();
        let lexer = Lexer::new("var a = 1").unwrap();
        let mut parser = Parser::new(lexer, &mut pool);
        let err = parser.next_statement().unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::SyntaxError);
    }

    #[test]
    fn function_literal_parses_params_and_body() {
        let (stmt, _) = parse_one("var f = fun(a, b) { return a + b; };");
        match stmt {
            Stmt::VariableDeclaration { init: Some(Expr::Function { params, body }), .. } => {
                assert_eq!(params.len(), 2);
                assert_eq!(body.len(), 1);
            }
            other => panic!("expected a function literal, got {other:?}"),
        }
    }
}
