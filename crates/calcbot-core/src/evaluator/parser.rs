//! Recursive-descent parser over the restricted calculator grammar.
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary | <implicit> power)*
//! unary   := ('+' | '-') unary | power
//! power   := postfix ('**' unary)?
//! postfix := atom '!'*
//! atom    := number | constant | function '(' expr ')' | '(' expr ')'
//! ```
//!
//! `**` binds tighter than unary minus and is right-associative, so
//! `-2**2 == -4` and `2**-1 == 0.5`. A postfix `!` binds tighter still.

use super::{
    ast::{BinOp, Expr, Function},
    lexer::{tokenize, Token},
    ParseError,
};

/// Limit for both parser recursion and the height of the built tree.
const MAX_DEPTH: usize = 200;

/// A subtree together with its height.
type Node = (Expr, usize);

pub fn parse(input: &str) -> Result<Expr, ParseError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
        end: input.chars().count(),
    };

    let (expr, _) = parser.expr()?;
    if let Some((at, tok)) = parser.tokens.get(parser.pos) {
        return Err(ParseError::new(*at, format!("unexpected {tok:?}")));
    }
    Ok(expr)
}

struct Parser {
    tokens: Vec<(usize, Token)>,
    pos: usize,
    depth: usize,
    end: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(_, t)| t)
    }

    fn offset(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map(|(at, _)| *at)
            .unwrap_or(self.end)
    }

    fn next(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).map(|(_, t)| t.clone());
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, want: Token) -> Result<(), ParseError> {
        let at = self.offset();
        match self.next() {
            Some(tok) if tok == want => Ok(()),
            Some(tok) => Err(ParseError::new(at, format!("expected {want:?}, got {tok:?}"))),
            None => Err(ParseError::new(at, format!("expected {want:?}, got end of input"))),
        }
    }

    fn too_deep(&self) -> ParseError {
        ParseError::new(self.offset(), "expression nested too deeply")
    }

    /// Wrap `height` in one more level, refusing trees evaluation could not walk.
    fn grow(&self, height: usize) -> Result<usize, ParseError> {
        let height = height + 1;
        if height > MAX_DEPTH {
            return Err(self.too_deep());
        }
        Ok(height)
    }

    fn binary(&self, op: BinOp, (lhs, lh): Node, (rhs, rh): Node) -> Result<Node, ParseError> {
        let height = self.grow(lh.max(rh))?;
        Ok((Expr::Binary(op, Box::new(lhs), Box::new(rhs)), height))
    }

    fn call(&self, f: Function, (arg, h): Node) -> Result<Node, ParseError> {
        let height = self.grow(h)?;
        Ok((Expr::Call(f, Box::new(arg)), height))
    }

    fn expr(&mut self) -> Result<Node, ParseError> {
        let mut lhs = self.term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinOp::Add,
                Some(Token::Minus) => BinOp::Sub,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.term()?;
            lhs = self.binary(op, lhs, rhs)?;
        }
    }

    fn term(&mut self) -> Result<Node, ParseError> {
        let mut lhs = self.unary()?;
        loop {
            let (op, rhs) = match self.peek() {
                Some(Token::Star) => {
                    self.pos += 1;
                    (BinOp::Mul, self.unary()?)
                }
                Some(Token::Slash) => {
                    self.pos += 1;
                    (BinOp::Div, self.unary()?)
                }
                Some(tok) if tok.starts_operand() => (BinOp::Mul, self.power()?),
                _ => return Ok(lhs),
            };
            lhs = self.binary(op, lhs, rhs)?;
        }
    }

    fn unary(&mut self) -> Result<Node, ParseError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(self.too_deep());
        }

        let out = match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                self.unary().and_then(|(e, h)| {
                    let height = self.grow(h)?;
                    Ok((Expr::Neg(Box::new(e)), height))
                })
            }
            Some(Token::Plus) => {
                self.pos += 1;
                self.unary()
            }
            _ => self.power(),
        };

        self.depth -= 1;
        out
    }

    fn power(&mut self) -> Result<Node, ParseError> {
        let base = self.postfix()?;
        if self.peek() == Some(&Token::DoubleStar) {
            self.pos += 1;
            let exp = self.unary()?;
            return self.binary(BinOp::Pow, base, exp);
        }
        Ok(base)
    }

    fn postfix(&mut self) -> Result<Node, ParseError> {
        let mut node = self.atom()?;
        while self.peek() == Some(&Token::Bang) {
            self.pos += 1;
            node = self.call(Function::Factorial, node)?;
        }
        Ok(node)
    }

    fn atom(&mut self) -> Result<Node, ParseError> {
        let at = self.offset();
        match self.next() {
            Some(Token::Num(v)) => Ok((Expr::Num(v), 1)),
            Some(Token::Const(c)) => Ok((Expr::Const(c), 1)),
            Some(Token::Func(f)) => {
                self.expect(Token::LParen)?;
                let arg = self.expr()?;
                self.expect(Token::RParen)?;
                self.call(f, arg)
            }
            Some(Token::LParen) => {
                let inner = self.expr()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Some(tok) => Err(ParseError::new(at, format!("unexpected {tok:?}"))),
            None => Err(ParseError::new(at, "unexpected end of input")),
        }
    }
}
