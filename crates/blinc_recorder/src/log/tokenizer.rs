//! Tokenizer for replay log lines.
//!
//! A line is a flat stream of parentheses and words. Words that name an
//! event kind or a field are classified; every other word, numbers included,
//! is an opaque symbol.

use std::fmt;

use crate::record::EventKind;

/// A field keyword inside a record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    Window,
    Time,
    Xy,
    State,
    Keycode,
    Button,
    IsHint,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::Window,
        Field::Time,
        Field::Xy,
        Field::State,
        Field::Keycode,
        Field::Button,
        Field::IsHint,
    ];

    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Window => "window",
            Self::Time => "time",
            Self::Xy => "xy",
            Self::State => "state",
            Self::Keycode => "keycode",
            Self::Button => "button",
            Self::IsHint => "is_hint",
        }
    }

    pub fn from_keyword(word: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.keyword() == word)
    }
}

/// One token of a log line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Token<'a> {
    LParen,
    RParen,
    Kind(EventKind),
    Field(Field),
    Symbol(&'a str),
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
            Token::Kind(kind) => f.write_str(kind.keyword()),
            Token::Field(field) => f.write_str(field.keyword()),
            Token::Symbol(text) => f.write_str(text),
        }
    }
}

/// Cursor over a single line with one token of lookahead.
#[derive(Debug)]
pub struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
    peeked: Option<Option<Token<'a>>>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            peeked: None,
        }
    }

    /// Look at the next token without consuming it.
    pub fn peek(&mut self) -> Option<Token<'a>> {
        if let Some(token) = self.peeked {
            return token;
        }
        let token = self.scan();
        self.peeked = Some(token);
        token
    }

    fn scan(&mut self) -> Option<Token<'a>> {
        let rest = &self.input[self.pos..];
        let trimmed = rest.trim_start();
        self.pos += rest.len() - trimmed.len();

        let first = trimmed.chars().next()?;
        match first {
            '(' => {
                self.pos += 1;
                Some(Token::LParen)
            }
            ')' => {
                self.pos += 1;
                Some(Token::RParen)
            }
            _ => {
                let len = trimmed
                    .find(|c: char| c.is_whitespace() || c == '(' || c == ')')
                    .unwrap_or(trimmed.len());
                let word = &trimmed[..len];
                self.pos += len;
                Some(classify(word))
            }
        }
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    /// Consume the next token. `None` once the line is exhausted.
    fn next(&mut self) -> Option<Token<'a>> {
        match self.peeked.take() {
            Some(token) => token,
            None => self.scan(),
        }
    }
}

fn classify(word: &str) -> Token<'_> {
    if let Some(kind) = EventKind::from_keyword(word) {
        Token::Kind(kind)
    } else if let Some(field) = Field::from_keyword(word) {
        Token::Field(field)
    } else {
        Token::Symbol(word)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(input: &str) -> Vec<Token<'_>> {
        Tokenizer::new(input).collect()
    }

    #[test]
    fn test_token_classes() {
        assert_eq!(
            collect("(button_press (xy 10 -4) (wobble))"),
            vec![
                Token::LParen,
                Token::Kind(EventKind::ButtonPress),
                Token::LParen,
                Token::Field(Field::Xy),
                Token::Symbol("10"),
                Token::Symbol("-4"),
                Token::RParen,
                Token::LParen,
                Token::Symbol("wobble"),
                Token::RParen,
                Token::RParen,
            ]
        );
    }

    #[test]
    fn test_whitespace_is_skipped() {
        assert_eq!(
            collect("  (\tmap_notify\n)  "),
            vec![
                Token::LParen,
                Token::Kind(EventKind::MapNotify),
                Token::RParen
            ]
        );
        assert!(collect("   ").is_empty());
    }

    #[test]
    fn test_parens_split_symbols() {
        assert_eq!(
            collect("(time 5)"),
            vec![
                Token::LParen,
                Token::Field(Field::Time),
                Token::Symbol("5"),
                Token::RParen
            ]
        );
    }

    #[test]
    fn test_peek_does_not_advance() {
        let mut tokenizer = Tokenizer::new("(window 3)");
        assert_eq!(tokenizer.peek(), Some(Token::LParen));
        assert_eq!(tokenizer.peek(), Some(Token::LParen));
        assert_eq!(tokenizer.next(), Some(Token::LParen));
        assert_eq!(tokenizer.peek(), Some(Token::Field(Field::Window)));
        assert_eq!(tokenizer.next(), Some(Token::Field(Field::Window)));
        assert_eq!(tokenizer.next(), Some(Token::Symbol("3")));
        assert_eq!(tokenizer.next(), Some(Token::RParen));
        assert_eq!(tokenizer.peek(), None);
        assert_eq!(tokenizer.next(), None);
    }

    #[test]
    fn test_peeked_token_is_yielded_by_iterator() {
        let mut tokenizer = Tokenizer::new("(time 5)");
        assert_eq!(tokenizer.peek(), Some(Token::LParen));
        let rest: Vec<_> = tokenizer.by_ref().skip(1).collect();
        assert_eq!(rest, vec![Token::Field(Field::Time), Token::Symbol("5"), Token::RParen]);
        assert_eq!(tokenizer.peek(), None);
    }
}
