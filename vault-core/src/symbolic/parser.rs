//! Tokenizer and recursive-descent parser for algebraic expressions.
//!
//! Grammar (both `**` and `^` are accepted for powers):
//!
//! ```text
//! expr   := term (('+' | '-') term)*
//! term   := unary (('*' | '/') unary)*
//! unary  := ('+' | '-') unary | power
//! power  := atom (('**' | '^') unary)?
//! atom   := number | 'x' | 'pi' | func '(' expr ')' | '(' expr ')'
//! ```

use num_rational::Rational64;

use super::expr::{Expr, Func};
use super::SymbolicError;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Num(Rational64),
    Ident(String),
    Plus,
    Minus,
    Star,
    DoubleStar,
    Slash,
    LParen,
    RParen,
}

fn tokenize(input: &str) -> Result<Vec<Token>, SymbolicError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' | '\t' | '\n' | '\r' => i += 1,
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '*' => {
                if chars.get(i + 1) == Some(&'*') {
                    tokens.push(Token::DoubleStar);
                    i += 2;
                } else {
                    tokens.push(Token::Star);
                    i += 1;
                }
            }
            '^' => {
                tokens.push(Token::DoubleStar);
                i += 1;
            }
            '/' => {
                tokens.push(Token::Slash);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            '0'..='9' | '.' => {
                let start = i;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
                let int_part: String = chars[start..i].iter().collect();
                let mut frac_part = String::new();
                if i < chars.len() && chars[i] == '.' {
                    i += 1;
                    let frac_start = i;
                    while i < chars.len() && chars[i].is_ascii_digit() {
                        i += 1;
                    }
                    frac_part = chars[frac_start..i].iter().collect();
                }
                if int_part.is_empty() && frac_part.is_empty() {
                    return Err(SymbolicError::Parse(format!(
                        "malformed number at position {}",
                        start + 1
                    )));
                }
                tokens.push(Token::Num(parse_decimal(&int_part, &frac_part, start)?));
            }
            c if c.is_ascii_alphabetic() => {
                let start = i;
                while i < chars.len() && chars[i].is_ascii_alphabetic() {
                    i += 1;
                }
                tokens.push(Token::Ident(chars[start..i].iter().collect()));
            }
            other => {
                return Err(SymbolicError::Parse(format!(
                    "unexpected character '{}' at position {}",
                    other,
                    i + 1
                )));
            }
        }
    }

    Ok(tokens)
}

/// Decimal literals become exact rationals: "0.5" -> 1/2.
fn parse_decimal(int_part: &str, frac_part: &str, pos: usize) -> Result<Rational64, SymbolicError> {
    let too_large = || SymbolicError::Parse(format!("number too large at position {}", pos + 1));

    let mut numer: i64 = if int_part.is_empty() {
        0
    } else {
        int_part.parse().map_err(|_| too_large())?
    };
    let mut denom: i64 = 1;
    for d in frac_part.chars() {
        numer = numer
            .checked_mul(10)
            .and_then(|n| n.checked_add((d as u8 - b'0') as i64))
            .ok_or_else(too_large)?;
        denom = denom.checked_mul(10).ok_or_else(too_large)?;
    }
    Ok(Rational64::new(numer, denom))
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.pos).cloned();
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn expect(&mut self, token: Token, what: &str) -> Result<(), SymbolicError> {
        match self.bump() {
            Some(t) if t == token => Ok(()),
            Some(t) => Err(SymbolicError::Parse(format!(
                "expected {} but found {:?}",
                what, t
            ))),
            None => Err(SymbolicError::Parse(format!(
                "expected {} but the expression ended",
                what
            ))),
        }
    }

    fn expr(&mut self) -> Result<Expr, SymbolicError> {
        let mut lhs = self.term()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.bump();
                    lhs = Expr::add(lhs, self.term()?);
                }
                Some(Token::Minus) => {
                    self.bump();
                    lhs = Expr::sub(lhs, self.term()?);
                }
                _ => return Ok(lhs),
            }
        }
    }

    fn term(&mut self) -> Result<Expr, SymbolicError> {
        let mut lhs = self.unary()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.bump();
                    lhs = Expr::mul(lhs, self.unary()?);
                }
                Some(Token::Slash) => {
                    self.bump();
                    lhs = Expr::div(lhs, self.unary()?);
                }
                _ => return Ok(lhs),
            }
        }
    }

    fn unary(&mut self) -> Result<Expr, SymbolicError> {
        match self.peek() {
            Some(Token::Minus) => {
                self.bump();
                Ok(Expr::neg(self.unary()?))
            }
            Some(Token::Plus) => {
                self.bump();
                self.unary()
            }
            _ => self.power(),
        }
    }

    fn power(&mut self) -> Result<Expr, SymbolicError> {
        let base = self.atom()?;
        if matches!(self.peek(), Some(Token::DoubleStar)) {
            self.bump();
            // right-associative; exponent may carry its own sign
            let exp = self.unary()?;
            return Ok(Expr::pow(base, exp));
        }
        Ok(base)
    }

    fn atom(&mut self) -> Result<Expr, SymbolicError> {
        match self.bump() {
            Some(Token::Num(r)) => Ok(Expr::Num(r)),
            Some(Token::LParen) => {
                let inner = self.expr()?;
                self.expect(Token::RParen, "')'")?;
                Ok(inner)
            }
            Some(Token::Ident(name)) => match name.as_str() {
                "x" => Ok(Expr::Var),
                "pi" => Ok(Expr::Pi),
                _ => {
                    if let Some(f) = Func::from_name(&name) {
                        self.expect(Token::LParen, "'(' after function name")?;
                        let arg = self.expr()?;
                        self.expect(Token::RParen, "')'")?;
                        Ok(Expr::fun(f, arg))
                    } else {
                        Err(SymbolicError::Parse(format!("unknown symbol '{}'", name)))
                    }
                }
            },
            Some(t) => Err(SymbolicError::Parse(format!("unexpected token {:?}", t))),
            None => Err(SymbolicError::Parse(
                "the expression ended unexpectedly".to_string(),
            )),
        }
    }
}

/// Parse an algebraic expression in `x` into an AST.
pub fn parse(input: &str) -> Result<Expr, SymbolicError> {
    if input.trim().is_empty() {
        return Err(SymbolicError::Parse("the expression is empty".to_string()));
    }
    let tokens = tokenize(input)?;
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.expr()?;
    if parser.pos != parser.tokens.len() {
        return Err(SymbolicError::Parse(format!(
            "unexpected trailing input starting at token {:?}",
            parser.tokens[parser.pos]
        )));
    }
    Ok(expr)
}
