use super::error::ExprError;
use rust_decimal::Decimal;
use std::fmt;
use std::iter::Peekable;
use std::str::{CharIndices, FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
        };
        f.write_str(symbol)
    }
}

/// Parsed arithmetic expression. Variables are resolved at evaluation time.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(Decimal),
    Variable(String),
    Negate(Box<Expr>),
    Paren(Box<Expr>),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(String),
    Ident(String),
    Op(BinaryOp),
    LParen,
    RParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(text) | Token::Ident(text) => f.write_str(text),
            Token::Op(op) => write!(f, "{op}"),
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, ExprError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(offset, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '+' | '-' | '*' | '/' => {
                chars.next();
                let op = match c {
                    '+' => BinaryOp::Add,
                    '-' => BinaryOp::Sub,
                    '*' => BinaryOp::Mul,
                    _ => BinaryOp::Div,
                };
                tokens.push(Token::Op(op));
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            c if c.is_ascii_digit() || c == '.' => {
                tokens.push(Token::Number(lex_number(input, &mut chars)));
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = offset;
                let mut end = input.len();
                while let Some(&(i, c)) = chars.peek() {
                    if c.is_alphanumeric() || c == '_' {
                        chars.next();
                    } else {
                        end = i;
                        break;
                    }
                }
                tokens.push(Token::Ident(input[start..end].to_string()));
            }
            found => return Err(ExprError::UnexpectedChar { found, offset }),
        }
    }

    Ok(tokens)
}

/// Consume digits, an optional fraction and an optional exponent
fn lex_number(input: &str, chars: &mut Peekable<CharIndices<'_>>) -> String {
    let start = chars.peek().map(|&(i, _)| i).unwrap_or(input.len());
    let mut end = input.len();
    let mut prev = '\0';

    while let Some(&(i, c)) = chars.peek() {
        let exponent_sign = (c == '+' || c == '-') && (prev == 'e' || prev == 'E');
        if c.is_ascii_digit() || c == '.' || c == 'e' || c == 'E' || exponent_sign {
            prev = c;
            chars.next();
        } else {
            end = i;
            break;
        }
    }

    input[start..end].to_string()
}

fn parse_number(text: &str) -> Result<Decimal, ExprError> {
    let parsed = if text.contains(['e', 'E']) {
        Decimal::from_scientific(text)
    } else {
        Decimal::from_str(text)
    };
    parsed.map_err(|_| ExprError::InvalidNumber(text.to_string()))
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    // expr := term (('+' | '-') term)*
    fn expr(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.term()?;
        while let Some(Token::Op(op @ (BinaryOp::Add | BinaryOp::Sub))) = self.peek() {
            let op = *op;
            self.pos += 1;
            let rhs = self.term()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    // term := unary (('*' | '/') unary)*
    fn term(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.unary()?;
        while let Some(Token::Op(op @ (BinaryOp::Mul | BinaryOp::Div))) = self.peek() {
            let op = *op;
            self.pos += 1;
            let rhs = self.unary()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, ExprError> {
        match self.peek() {
            Some(Token::Op(BinaryOp::Sub)) => {
                self.pos += 1;
                Ok(Expr::Negate(Box::new(self.unary()?)))
            }
            Some(Token::Op(BinaryOp::Add)) => {
                self.pos += 1;
                self.unary()
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<Expr, ExprError> {
        const EXPECTED: &str = "a number, a field name or '('";
        match self.advance() {
            Some(Token::Number(text)) => Ok(Expr::Number(parse_number(&text)?)),
            Some(Token::Ident(name)) => Ok(Expr::Variable(name)),
            Some(Token::LParen) => {
                let inner = self.expr()?;
                match self.advance() {
                    Some(Token::RParen) => Ok(Expr::Paren(Box::new(inner))),
                    Some(found) => Err(ExprError::UnexpectedToken {
                        found: found.to_string(),
                        expected: "')'",
                    }),
                    None => Err(ExprError::UnexpectedEnd("')'")),
                }
            }
            Some(found) => Err(ExprError::UnexpectedToken {
                found: found.to_string(),
                expected: EXPECTED,
            }),
            None => Err(ExprError::UnexpectedEnd(EXPECTED)),
        }
    }
}

/// Parse an arithmetic expression such as `(resptime - upstream_resptime) * 1000`
pub fn parse_expr(input: &str) -> Result<Expr, ExprError> {
    let mut parser = Parser {
        tokens: tokenize(input)?,
        pos: 0,
    };
    let expr = parser.expr()?;
    if let Some(found) = parser.peek() {
        return Err(ExprError::UnexpectedToken {
            found: found.to_string(),
            expected: "an operator or end of expression",
        });
    }
    Ok(expr)
}
