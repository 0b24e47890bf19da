use crate::algebra::{BinaryOperation, Expression, Parameter};
use smol_str::SmolStr;
use std::{iter::Peekable, ops::Range, str::FromStr};

/// Greek letters which may be used as single-symbol names (e.g. `\rho`).
pub(crate) const GREEK_LETTERS: &[&str] = &[
    "alpha", "beta", "gamma", "delta", "epsilon", "varepsilon", "zeta", "eta",
    "theta", "iota", "kappa", "lambda", "mu", "nu", "xi", "pi", "rho", "sigma",
    "tau", "upsilon", "phi", "varphi", "chi", "psi", "omega", "Gamma", "Delta",
    "Theta", "Lambda", "Xi", "Pi", "Sigma", "Phi", "Psi", "Omega",
];

/// Functions which are recognised either as a LaTeX command (`\ln`) or as a
/// plain name immediately followed by an opening bracket (`ln(x)`).
pub(crate) const FUNCTIONS: &[&str] =
    &["sqrt", "exp", "sin", "cos", "tan", "log", "ln"];

/// Parse an [`Expression`] tree from some LaTeX-flavoured text.
pub fn parse(s: &str) -> Result<Expression, ParseError> {
    Parser::new(s).parse()
}

impl FromStr for Expression {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> { parse(s) }
}

/// A simple recursive descent parser (`LL(1)`) for converting a string into an
/// expression tree.
///
/// The grammar:
///
/// ```text
/// expression     := term (("+" | "-") term)*
///
/// term           := signed (("*" | "/")? signed)*
///
/// signed         := "-" signed
///                 | "+" signed
///                 | power
///
/// power          := atom ("^" exponent)?
///
/// exponent       := "-" exponent
///                 | "+" exponent
///                 | atom
///
/// atom           := NUMBER
///                 | IDENTIFIER
///                 | FUNCTION argument
///                 | "\frac" group group
///                 | "\sqrt" ("[" expression "]")? argument
///                 | "(" expression ")"
///                 | "{" expression "}"
///                 | "[" expression "]"
/// ```
///
/// A factor written directly after another (`2P`, `0.8(Y - T)`) is an
/// implicit multiplication.
#[derive(Debug, Clone)]
pub(crate) struct Parser<'a> {
    tokens: Peekable<Tokens<'a>>,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(src: &'a str) -> Self {
        Parser {
            tokens: Tokens::new(src).peekable(),
        }
    }

    pub(crate) fn parse(mut self) -> Result<Expression, ParseError> {
        let expr = self.expression()?;

        match self.tokens.next() {
            None => Ok(expr),
            Some(Ok(token)) => Err(ParseError::UnexpectedToken {
                found: token.kind,
                span: token.span,
                expected: &[
                    TokenKind::Plus,
                    TokenKind::Minus,
                    TokenKind::Times,
                    TokenKind::Divide,
                    TokenKind::Caret,
                ],
            }),
            Some(Err(e)) => Err(e),
        }
    }

    fn peek(&mut self) -> Option<TokenKind> {
        self.tokens
            .peek()
            .and_then(|result| result.as_ref().ok())
            .map(|tok| tok.kind)
    }

    fn advance(&mut self) -> Result<Token<'a>, ParseError> {
        match self.tokens.next() {
            Some(result) => result,
            None => Err(ParseError::UnexpectedEndOfInput),
        }
    }

    fn expect(
        &mut self,
        expected: &'static [TokenKind],
    ) -> Result<Token<'a>, ParseError> {
        let token = self.advance()?;

        if expected.contains(&token.kind) {
            Ok(token)
        } else {
            Err(ParseError::UnexpectedToken {
                found: token.kind,
                span: token.span,
                expected,
            })
        }
    }

    fn expression(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.term()?;

        loop {
            let op = match self.peek() {
                Some(TokenKind::Plus) => BinaryOperation::Plus,
                Some(TokenKind::Minus) => BinaryOperation::Minus,
                _ => break,
            };
            // skip past the operator
            let _ = self.advance()?;
            let right = self.term()?;

            left = Expression::binary(left, op, right);
        }

        Ok(left)
    }

    fn term(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.signed()?;

        loop {
            let op = match self.peek() {
                Some(TokenKind::Times) => {
                    let _ = self.advance()?;
                    BinaryOperation::Times
                },
                Some(TokenKind::Divide) => {
                    let _ = self.advance()?;
                    BinaryOperation::Divide
                },
                Some(kind) if kind.starts_atom() => BinaryOperation::Times,
                _ => break,
            };
            let right = self.signed()?;

            left = Expression::binary(left, op, right);
        }

        Ok(left)
    }

    fn signed(&mut self) -> Result<Expression, ParseError> {
        match self.peek() {
            Some(TokenKind::Minus) => {
                let _ = self.advance()?;
                Ok(-self.signed()?)
            },
            Some(TokenKind::Plus) => {
                let _ = self.advance()?;
                self.signed()
            },
            _ => self.power(),
        }
    }

    fn power(&mut self) -> Result<Expression, ParseError> {
        let base = self.atom()?;

        if self.peek() == Some(TokenKind::Caret) {
            let _ = self.advance()?;
            let exponent = self.exponent()?;
            Ok(base.pow(exponent))
        } else {
            Ok(base)
        }
    }

    fn exponent(&mut self) -> Result<Expression, ParseError> {
        match self.peek() {
            Some(TokenKind::Minus) => {
                let _ = self.advance()?;
                Ok(-self.exponent()?)
            },
            Some(TokenKind::Plus) => {
                let _ = self.advance()?;
                self.exponent()
            },
            _ => self.atom(),
        }
    }

    fn atom(&mut self) -> Result<Expression, ParseError> {
        match self.peek() {
            Some(TokenKind::Number) => return self.number(),
            Some(TokenKind::Identifier) => {
                let ident = self.advance()?;
                return Ok(Expression::Parameter(Parameter::named(
                    normalize_identifier(ident.text),
                )));
            },
            Some(TokenKind::Function) => return self.function_call(),
            Some(TokenKind::Fraction) => {
                let _ = self.advance()?;
                let numerator = self.group()?;
                let denominator = self.group()?;
                return Ok(numerator / denominator);
            },
            Some(TokenKind::Root) => return self.root(),
            Some(TokenKind::OpenParen) => {
                return self.delimited(&[TokenKind::CloseParen])
            },
            Some(TokenKind::OpenBrace) => {
                return self.delimited(&[TokenKind::CloseBrace])
            },
            Some(TokenKind::OpenBracket) => {
                return self.delimited(&[TokenKind::CloseBracket])
            },
            _ => {},
        }

        // we couldn't parse the atom, return a nice error
        match self.tokens.next() {
            Some(Ok(Token { span, kind, .. })) => {
                Err(ParseError::UnexpectedToken {
                    found: kind,
                    expected: &[
                        TokenKind::Number,
                        TokenKind::Identifier,
                        TokenKind::Function,
                        TokenKind::OpenParen,
                    ],
                    span,
                })
            },
            Some(Err(e)) => Err(e),
            None => Err(ParseError::UnexpectedEndOfInput),
        }
    }

    /// Parse a bracketed expression, skipping past the opening bracket.
    fn delimited(
        &mut self,
        close: &'static [TokenKind],
    ) -> Result<Expression, ParseError> {
        let _ = self.advance()?;
        let expr = self.expression()?;
        self.expect(close)?;

        Ok(expr)
    }

    /// The operand of a `\frac`, either `{...}` or a single atom.
    fn group(&mut self) -> Result<Expression, ParseError> {
        if self.peek() == Some(TokenKind::OpenBrace) {
            self.delimited(&[TokenKind::CloseBrace])
        } else {
            self.atom()
        }
    }

    /// The argument to a function, either bracketed or a bare power
    /// (`\ln x`).
    fn argument(&mut self) -> Result<Expression, ParseError> {
        match self.peek() {
            Some(TokenKind::OpenParen)
            | Some(TokenKind::OpenBrace)
            | Some(TokenKind::OpenBracket) => self.atom(),
            _ => self.power(),
        }
    }

    fn function_call(&mut self) -> Result<Expression, ParseError> {
        let ident = self.advance()?;
        debug_assert_eq!(ident.kind, TokenKind::Function);
        let argument = self.argument()?;

        Ok(Expression::call(ident.text, argument))
    }

    fn root(&mut self) -> Result<Expression, ParseError> {
        let _ = self.advance()?;

        let index = if self.peek() == Some(TokenKind::OpenBracket) {
            Some(self.delimited(&[TokenKind::CloseBracket])?)
        } else {
            None
        };
        let radicand = self.argument()?;

        match index {
            Some(index) => {
                Ok(radicand.pow(Expression::Constant(1.0) / index))
            },
            None => Ok(Expression::call("sqrt", radicand)),
        }
    }

    fn number(&mut self) -> Result<Expression, ParseError> {
        let token = self.advance()?;
        debug_assert_eq!(token.kind, TokenKind::Number);

        token
            .text
            .parse()
            .map(Expression::Constant)
            .map_err(|_| ParseError::InvalidNumber { span: token.span })
    }
}

/// `Q_{dem}` and `Q_dem` name the same thing.
fn normalize_identifier(text: &str) -> SmolStr {
    if text.contains('{') {
        text.chars().filter(|c| *c != '{' && *c != '}').collect()
    } else {
        text.into()
    }
}

/// Possible errors that may occur while parsing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid character {character:?} at index {index}")]
    InvalidCharacter { character: char, index: usize },
    #[error("unknown command \"\\{name}\" at index {index}")]
    UnknownCommand { name: SmolStr, index: usize },
    #[error("invalid number at {span:?}")]
    InvalidNumber { span: Range<usize> },
    #[error("unexpected end of input")]
    UnexpectedEndOfInput,
    #[error("found {found:?} at {span:?} but expected one of {expected:?}")]
    UnexpectedToken {
        found: TokenKind,
        span: Range<usize>,
        expected: &'static [TokenKind],
    },
    #[error("the equation is empty")]
    EmptyEquation,
    #[error("an equation may contain at most one \"=\", found {count}")]
    TooManyEqualsSigns { count: usize },
}

#[derive(Debug, Clone, PartialEq)]
struct Tokens<'a> {
    src: &'a str,
    cursor: usize,
}

impl<'a> Tokens<'a> {
    fn new(src: &'a str) -> Self { Tokens { src, cursor: 0 } }

    fn rest(&self) -> &'a str { &self.src[self.cursor..] }

    fn peek(&self) -> Option<char> { self.rest().chars().next() }

    fn peek_second(&self) -> Option<char> { self.rest().chars().nth(1) }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.cursor += c.len_utf8();
        Some(c)
    }

    fn chomp(
        &mut self,
        kind: TokenKind,
    ) -> Option<Result<Token<'a>, ParseError>> {
        let start = self.cursor;
        self.advance()?;
        let end = self.cursor;

        Some(Ok(Token::from_text(self.src, start..end, kind)))
    }

    fn take_while<P>(
        &mut self,
        mut predicate: P,
    ) -> Option<(&'a str, Range<usize>)>
    where
        P: FnMut(char) -> bool,
    {
        let start = self.cursor;

        while let Some(c) = self.peek() {
            if !predicate(c) {
                break;
            }

            self.advance();
        }

        let end = self.cursor;

        if start != end {
            let text = &self.src[start..end];
            Some((text, start..end))
        } else {
            None
        }
    }

    fn chomp_number(&mut self) -> Result<Token<'a>, ParseError> {
        let start = self.cursor;
        self.take_while(|c| c.is_ascii_digit());

        if self.peek() == Some('.') {
            // skip past the decimal
            self.advance();
            self.take_while(|c| c.is_ascii_digit());
        }

        if self.peek() == Some('.') {
            // "1.2.3" is a typo, not 1.2 * 0.3
            self.take_while(|c| c.is_ascii_digit() || c == '.');
            return Err(ParseError::InvalidNumber {
                span: start..self.cursor,
            });
        }

        Ok(Token::from_text(
            self.src,
            start..self.cursor,
            TokenKind::Number,
        ))
    }

    /// A single letter, optionally followed by a subscript (`Q_d`,
    /// `Q_{dem}`).
    fn chomp_identifier(&mut self) -> Result<Token<'a>, ParseError> {
        let start = self.cursor;
        self.advance();

        if self.peek() == Some('_') {
            self.advance();

            match self.advance() {
                Some('{') => {
                    self.take_while(|c| c.is_alphanumeric());
                    self.expect_char('}')?;
                },
                Some(c) if c.is_alphanumeric() => {},
                Some(other) => {
                    return Err(ParseError::InvalidCharacter {
                        character: other,
                        index: self.cursor - other.len_utf8(),
                    })
                },
                None => return Err(ParseError::UnexpectedEndOfInput),
            }
        }

        Ok(Token::from_text(
            self.src,
            start..self.cursor,
            TokenKind::Identifier,
        ))
    }

    /// A plain function name like `ln` only counts when it is applied to
    /// something in brackets, otherwise `ln` is `l*n`.
    fn chomp_plain_function(&mut self) -> Option<Token<'a>> {
        let rest = self.rest();
        let name = FUNCTIONS.iter().find(|name| {
            rest.starts_with(*name)
                && rest[name.len()..].trim_start().starts_with('(')
        })?;

        let start = self.cursor;
        self.cursor += name.len();

        Some(Token::from_text(
            self.src,
            start..self.cursor,
            TokenKind::Function,
        ))
    }

    fn expect_char(&mut self, expected: char) -> Result<(), ParseError> {
        match self.advance() {
            Some(c) if c == expected => Ok(()),
            Some(other) => Err(ParseError::InvalidCharacter {
                character: other,
                index: self.cursor - other.len_utf8(),
            }),
            None => Err(ParseError::UnexpectedEndOfInput),
        }
    }

    /// Lex a LaTeX command. Spacing and sizing commands produce no token.
    fn chomp_command(&mut self) -> Result<Option<Token<'a>>, ParseError> {
        let start = self.cursor;
        // skip the backslash
        self.advance();

        let name = match self.take_while(|c| c.is_ascii_alphabetic()) {
            Some((name, _)) => name,
            None => {
                self.advance().ok_or(ParseError::UnexpectedEndOfInput)?;
                &self.src[start + 1..self.cursor]
            },
        };
        let span = start..self.cursor;

        let kind = match name {
            "," | ";" | ":" | "!" | " " | "quad" | "qquad" | "left"
            | "right" | "displaystyle" => return Ok(None),
            "cdot" | "times" => TokenKind::Times,
            "div" => TokenKind::Divide,
            "frac" | "dfrac" | "tfrac" => TokenKind::Fraction,
            "sqrt" => TokenKind::Root,
            "text" | "mathrm" | "mathit" | "operatorname" => {
                return self.chomp_text_identifier(start).map(Some);
            },
            _ if FUNCTIONS.contains(&name) => TokenKind::Function,
            _ if GREEK_LETTERS.contains(&name) => TokenKind::Identifier,
            _ => {
                return Err(ParseError::UnknownCommand {
                    name: name.into(),
                    index: start,
                })
            },
        };

        Ok(Some(Token {
            text: name,
            span,
            kind,
        }))
    }

    /// `\text{rate}` is a single identifier called `rate`.
    fn chomp_text_identifier(
        &mut self,
        start: usize,
    ) -> Result<Token<'a>, ParseError> {
        self.take_while(char::is_whitespace);
        self.expect_char('{')?;

        let name_start = self.cursor;
        self.take_while(|c| c.is_alphanumeric() || c == '_' || c == ' ');
        let text = self.src[name_start..self.cursor].trim();

        self.expect_char('}')?;

        if text.is_empty() {
            return Err(ParseError::UnexpectedToken {
                found: TokenKind::CloseBrace,
                span: self.cursor - 1..self.cursor,
                expected: &[TokenKind::Identifier],
            });
        }

        Ok(Token {
            text,
            span: start..self.cursor,
            kind: TokenKind::Identifier,
        })
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Result<Token<'a>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            return match self.peek()? {
                space if space.is_whitespace() => {
                    self.advance();
                    continue;
                },
                '(' => self.chomp(TokenKind::OpenParen),
                ')' => self.chomp(TokenKind::CloseParen),
                '{' => self.chomp(TokenKind::OpenBrace),
                '}' => self.chomp(TokenKind::CloseBrace),
                '[' => self.chomp(TokenKind::OpenBracket),
                ']' => self.chomp(TokenKind::CloseBracket),
                '+' => self.chomp(TokenKind::Plus),
                '-' => self.chomp(TokenKind::Minus),
                '*' => self.chomp(TokenKind::Times),
                '/' => self.chomp(TokenKind::Divide),
                '^' => self.chomp(TokenKind::Caret),
                '\\' => match self.chomp_command() {
                    Ok(Some(token)) => Some(Ok(token)),
                    Ok(None) => continue,
                    Err(e) => Some(Err(e)),
                },
                'a'..='z' | 'A'..='Z' => match self.chomp_plain_function() {
                    Some(token) => Some(Ok(token)),
                    None => Some(self.chomp_identifier()),
                },
                '0'..='9' => Some(self.chomp_number()),
                '.' if matches!(self.peek_second(), Some('0'..='9')) => {
                    Some(self.chomp_number())
                },
                other => Some(Err(ParseError::InvalidCharacter {
                    character: other,
                    index: self.cursor,
                })),
            };
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Token<'a> {
    text: &'a str,
    span: Range<usize>,
    kind: TokenKind,
}

impl<'a> Token<'a> {
    fn from_text(
        src: &'a str,
        span: Range<usize>,
        kind: TokenKind,
    ) -> Self {
        Token {
            text: &src[span.clone()],
            span,
            kind,
        }
    }
}

/// The kinds of token that can appear in an [`Expression`]'s text form.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    Number,
    /// A builtin function, `\ln` or `ln(`.
    Function,
    /// `\frac`.
    Fraction,
    /// `\sqrt`.
    Root,
    OpenParen,
    CloseParen,
    OpenBrace,
    CloseBrace,
    OpenBracket,
    CloseBracket,
    Plus,
    Minus,
    Times,
    Divide,
    Caret,
}

impl TokenKind {
    fn starts_atom(self) -> bool {
        matches!(
            self,
            TokenKind::Identifier
                | TokenKind::Number
                | TokenKind::Function
                | TokenKind::Fraction
                | TokenKind::Root
                | TokenKind::OpenParen
                | TokenKind::OpenBrace
                | TokenKind::OpenBracket
        )
    }
}


#[cfg(test)]
mod parser_tests {
    use super::*;

    macro_rules! parser_test {
        ($name:ident, $src:expr) => {
            parser_test!($name, $src, $src);
        };
        ($name:ident, $src:expr, $should_be:expr) => {
            #[test]
            fn $name() {
                let got = Parser::new($src).parse().unwrap();

                let round_tripped = got.to_string();
                assert_eq!(round_tripped, $should_be);
            }
        };
    }

    parser_test!(simple_integer, "1");
    parser_test!(one_plus_one, "1 + 1");
    parser_test!(one_plus_one_plus_negative_one, "1 + -1");
    parser_test!(one_plus_one_times_three, "1 + 1*3");
    parser_test!(one_plus_one_all_times_three, "(1 + 1)*3");
    parser_test!(negative_one, "-1");
    parser_test!(negative_one_plus_one, "-1 + 1");
    parser_test!(negative_one_plus_x, "-1 + x");
    parser_test!(number_in_parens, "(1)", "1");
    parser_test!(bimdas, "1*2 + 3*4/(5 - 2)*1 - 3");
    parser_test!(subtraction_is_left_associative, "10 - 4 - 3");
    parser_test!(division_is_left_associative, "8/4/2");
    parser_test!(function_call, "\\sin(1)", "sin(1)");
    parser_test!(function_call_with_expression, "ln(1/x)");
    parser_test!(implicit_multiplication, "100 - 2P", "100 - 2*P");
    parser_test!(
        implicit_multiplication_with_brackets,
        "200 + 0.8(Y - T)",
        "200 + 0.8*(Y - T)"
    );
    parser_test!(cdot_is_multiplication, "2 \\cdot P", "2*P");
    parser_test!(fraction, "\\frac{1}{2}Q", "1/2*Q");
    parser_test!(powers, "P^2 + Q^{-1}", "P^2 + Q^(-1)");
    parser_test!(powers_bind_tighter_than_negation, "-P^2", "-(P^2)");
    parser_test!(square_root, "\\sqrt{Q}", "sqrt(Q)");
    parser_test!(nth_root, "\\sqrt[3]{Q}", "Q^(1/3)");
    parser_test!(greek_letters, "50\\rho", "50*\\rho");
    parser_test!(text_names, "\\text{rate}", "\\text{rate}");
    parser_test!(subscripts, "Q_{d} + Q_s", "Q_{d} + Q_{s}");
    parser_test!(latex_brackets, "\\left(1 + x\\right)\\cdot 2", "(1 + x)*2");
    parser_test!(bare_function_argument, "\\ln x", "ln(x)");

    #[test]
    fn leftover_tokens_are_an_error() {
        let got = Parser::new("(1 + 2))").parse();

        assert!(matches!(
            got,
            Err(ParseError::UnexpectedToken {
                found: TokenKind::CloseParen,
                ..
            })
        ));
    }

    #[test]
    fn equals_signs_are_not_expressions() {
        let got = Parser::new("Q = 5").parse();

        assert_eq!(
            got,
            Err(ParseError::InvalidCharacter {
                character: '=',
                index: 2
            })
        );
    }

    #[test]
    fn subtraction_associates_to_the_left() {
        let got = Parser::new("10 - 4 - 3").parse().unwrap();

        let should_be = (Expression::Constant(10.0) - Expression::Constant(4.0))
            - Expression::Constant(3.0);
        assert_eq!(got, should_be);
    }
}
