use log::{debug, trace};
use std::{
    fmt::{self, Display, Formatter},
    ops::Range,
};

use crate::error::{Error, Result};

/// Keyword spellings that lex correctly but have no grammar production.
pub const RESERVED: [&str; 20] = [
    "vagai",
    "ennam",
    "ezhuthu",
    "unmai_poi",
    "maaththu",
    "kanakku",
    "listu",
    "ottu",
    "settu",
    "agarathi",
    "matchu",
    "foru",
    "varambu",
    "seyal",
    "thiruppu",
    "arrayu",
    "suththi",
    "thoguppu",
    "thethi",
    "kanakku_math",
];

pub const TRUE_SPELLING: &str = "unmai";
pub const FALSE_SPELLING: &str = "poi";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Comment,
    Assign,
    Print,
    If,
    Else,
    While,
    Reserved(&'static str),
}

impl Keyword {
    pub fn lookup(word: &str) -> Option<Self> {
        match word {
            "karuthu" => Some(Keyword::Comment),
            "vaippu" => Some(Keyword::Assign),
            "kaattu" => Some(Keyword::Print),
            "endraal" => Some(Keyword::If),
            "illai" => Some(Keyword::Else),
            "thirumba" => Some(Keyword::While),
            _ => RESERVED
                .iter()
                .find(|&&reserved| reserved == word)
                .map(|&reserved| Keyword::Reserved(reserved)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Comment => "karuthu",
            Keyword::Assign => "vaippu",
            Keyword::Print => "kaattu",
            Keyword::If => "endraal",
            Keyword::Else => "illai",
            Keyword::While => "thirumba",
            Keyword::Reserved(spelling) => *spelling,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Plus,
    Minus,
    Star,
    Slash,
    Bang,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    EqualEqual,
    BangEqual,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Plus => "+",
            Operator::Minus => "-",
            Operator::Star => "*",
            Operator::Slash => "/",
            Operator::Bang => "!",
            Operator::Less => "<",
            Operator::LessEqual => "<=",
            Operator::Greater => ">",
            Operator::GreaterEqual => ">=",
            Operator::EqualEqual => "==",
            Operator::BangEqual => "!=",
        }
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            Operator::Less
                | Operator::LessEqual
                | Operator::Greater
                | Operator::GreaterEqual
                | Operator::EqualEqual
                | Operator::BangEqual
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Integer(i64),
    Float(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenType {
    Number(Number),
    String(String),
    Boolean(bool),
    Identifier(String),
    Keyword(Keyword),
    Operator(Operator),
    Assign,
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    EOF,
}

impl Display for TokenType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TokenType::Number(Number::Integer(n)) => write!(f, "number {}", n),
            TokenType::Number(Number::Float(n)) => write!(f, "number {:?}", n),
            TokenType::String(s) => write!(f, "string {}", snailquote::escape(s)),
            TokenType::Boolean(true) => write!(f, "boolean '{}'", TRUE_SPELLING),
            TokenType::Boolean(false) => write!(f, "boolean '{}'", FALSE_SPELLING),
            TokenType::Identifier(name) => write!(f, "identifier '{}'", name),
            TokenType::Keyword(keyword) => write!(f, "keyword '{}'", keyword.as_str()),
            TokenType::Operator(operator) => write!(f, "'{}'", operator.as_str()),
            TokenType::Assign => write!(f, "'='"),
            TokenType::LeftParen => write!(f, "'('"),
            TokenType::RightParen => write!(f, "')'"),
            TokenType::LeftBrace => write!(f, "'{{'"),
            TokenType::RightBrace => write!(f, "'}}'"),
            TokenType::EOF => write!(f, "end of input"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub token_type: TokenType,
    pub byte_span: Range<usize>,
    pub line: usize,
    pub column: usize,
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token_type)
    }
}

impl Token {
    /// One line of a token dump: `line:column  description`.
    pub fn listing(&self) -> String {
        format!("{}:{}  {}", self.line, self.column, self.token_type)
    }
}

/// Line and column of the next unread byte. Columns count characters, not bytes.
#[derive(Debug, Clone, Copy)]
struct Position {
    line: usize,
    column: usize,
}

impl Position {
    fn advance(&mut self, consumed: &[u8]) {
        for &byte in consumed {
            if byte == b'\n' {
                self.line += 1;
                self.column = 1;
            } else if byte & 0xC0 != 0x80 {
                self.column += 1;
            }
        }
    }
}

pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    let bytes = source.as_bytes();
    let n = bytes.len();
    let mut cursor = 0;
    let mut position = Position { line: 1, column: 1 };
    let mut tokens = Vec::new();

    loop {
        let skipped = skip_trivia(&source[cursor..]);
        position.advance(&bytes[cursor..cursor + skipped]);
        cursor += skipped;

        match next_token(&source[cursor..]) {
            Ok((_, TokenType::EOF)) => {
                tokens.push(Token {
                    token_type: TokenType::EOF,
                    byte_span: n..n,
                    line: position.line,
                    column: position.column,
                });
                trace!("tokenized {} tokens", tokens.len());

                return Ok(tokens);
            }
            Ok((bytes_read, token_type)) => {
                tokens.push(Token {
                    token_type,
                    byte_span: cursor..cursor + bytes_read,
                    line: position.line,
                    column: position.column,
                });
                position.advance(&bytes[cursor..cursor + bytes_read]);
                cursor += bytes_read;
            }
            Err(reason) => {
                debug!(
                    "{} on line {}, column {}",
                    reason, position.line, position.column
                );
                return Err(Error::Lex {
                    line: position.line,
                    column: position.column,
                    reason,
                });
            }
        }
    }
}

/// Length in bytes of the whitespace and `#` comments at the front of `text`.
fn skip_trivia(text: &str) -> usize {
    let mut cursor = 0;

    loop {
        cursor += text[cursor..]
            .chars()
            .take_while(|c| c.is_whitespace())
            .map(char::len_utf8)
            .sum::<usize>();

        if !text[cursor..].starts_with('#') {
            return cursor;
        }

        cursor += text[cursor..].find('\n').unwrap_or(text.len() - cursor);
    }
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

fn next_token(text: &str) -> std::result::Result<(usize, TokenType), String> {
    let bytes = text.as_bytes();
    let n = bytes.len();
    if n == 0 {
        return Ok((0, TokenType::EOF));
    }

    let followed_by_equal = bytes.get(1) == Some(&b'=');
    let comparison = match bytes[0] {
        b'=' if !followed_by_equal => return Ok((1, TokenType::Assign)),
        b'=' => Some(Operator::EqualEqual),
        b'<' if followed_by_equal => Some(Operator::LessEqual),
        b'>' if followed_by_equal => Some(Operator::GreaterEqual),
        b'!' if followed_by_equal => Some(Operator::BangEqual),
        _ => None,
    };

    if let Some(operator) = comparison {
        return Ok((2, TokenType::Operator(operator)));
    }

    let token = match bytes[0] {
        b'(' => Some(TokenType::LeftParen),
        b')' => Some(TokenType::RightParen),
        b'{' => Some(TokenType::LeftBrace),
        b'}' => Some(TokenType::RightBrace),
        b'+' => Some(TokenType::Operator(Operator::Plus)),
        b'-' => Some(TokenType::Operator(Operator::Minus)),
        b'*' => Some(TokenType::Operator(Operator::Star)),
        b'/' => Some(TokenType::Operator(Operator::Slash)),
        b'<' => Some(TokenType::Operator(Operator::Less)),
        b'>' => Some(TokenType::Operator(Operator::Greater)),
        b'!' => Some(TokenType::Operator(Operator::Bang)),
        _ => None,
    };

    if let Some(token) = token {
        return Ok((1, token));
    }

    if bytes[0] == b'"' {
        let mut value = Vec::new();
        let mut end_byte = 1;

        while end_byte < n && bytes[end_byte] != b'"' {
            if bytes[end_byte] == b'\\' && end_byte + 1 < n {
                value.push(match bytes[end_byte + 1] {
                    b'n' => b'\n',
                    b't' => b'\t',
                    b'r' => b'\r',
                    other => other,
                });
                end_byte += 2;
            } else {
                value.push(bytes[end_byte]);
                end_byte += 1;
            }
        }

        if end_byte >= n {
            return Err("unterminated string literal".to_string());
        }

        let value = String::from_utf8(value)
            .map_err(|_| "string literal is not valid UTF-8".to_string())?;

        return Ok((end_byte + 1, TokenType::String(value)));
    }

    if bytes[0].is_ascii_digit() {
        let end_byte = count_digits(bytes);

        if end_byte < n && bytes[end_byte] == b'.' {
            let fraction_end = end_byte + 1 + count_digits(&bytes[end_byte + 1..]);
            if fraction_end == end_byte + 1 {
                return Err(format!(
                    "malformed number literal '{}'",
                    &text[..end_byte + 1]
                ));
            }

            let literal = &text[..fraction_end];
            let value = literal
                .parse()
                .map_err(|err| format!("invalid number literal '{}': {}", literal, err))?;

            return Ok((fraction_end, TokenType::Number(Number::Float(value))));
        }

        let literal = &text[..end_byte];
        let value = literal
            .parse()
            .map_err(|_| format!("integer literal '{}' is out of range", literal))?;

        return Ok((end_byte, TokenType::Number(Number::Integer(value))));
    }

    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    if text.starts_with(|c: char| c.is_alphabetic() || c == '_') {
        let end_byte = text
            .char_indices()
            .find(|&(_, c)| !is_word(c))
            .map_or(n, |(index, _)| index);

        let word = &text[..end_byte];
        let token = match word {
            TRUE_SPELLING => TokenType::Boolean(true),
            FALSE_SPELLING => TokenType::Boolean(false),
            _ => match Keyword::lookup(word) {
                Some(keyword) => TokenType::Keyword(keyword),
                None => TokenType::Identifier(word.to_string()),
            },
        };

        return Ok((end_byte, token));
    }

    let invalid = text.chars().next().unwrap_or(char::REPLACEMENT_CHARACTER);
    Err(format!("invalid character {:?}", invalid))
}
