//! Recursive-descent parser for replay log records.
//!
//! ```text
//! record  := '(' KIND field* ')'
//! field   := '(' FIELD SYMBOL+ ')'
//! ```
//!
//! Which fields a kind accepts, and how each one is stored, comes from
//! [`FIELD_RULES`]. Fields are optional, may repeat and may appear in any
//! order; the last occurrence wins.

use std::str::FromStr;

use crate::error::{ParseError, ParseErrorKind};
use crate::record::{EventClass, EventRecord, WindowBase};

use super::tokenizer::{Field, Token, Tokenizer};

type Setter = fn(&mut EventRecord, &mut Tokenizer<'_>, WindowBase) -> Result<(), ParseErrorKind>;

struct FieldRule {
    field: Field,
    classes: &'static [EventClass],
    apply: Setter,
}

const INPUT: &[EventClass] = &[EventClass::Key, EventClass::Button, EventClass::Motion];
const ANY: &[EventClass] = &[
    EventClass::Key,
    EventClass::Button,
    EventClass::Motion,
    EventClass::Structural,
];

const FIELD_RULES: &[FieldRule] = &[
    FieldRule {
        field: Field::Window,
        classes: ANY,
        apply: set_window,
    },
    FieldRule {
        field: Field::Time,
        classes: INPUT,
        apply: set_time,
    },
    FieldRule {
        field: Field::Xy,
        classes: INPUT,
        apply: set_xy,
    },
    FieldRule {
        field: Field::State,
        classes: INPUT,
        apply: set_state,
    },
    FieldRule {
        field: Field::Keycode,
        classes: &[EventClass::Key],
        apply: set_keycode,
    },
    FieldRule {
        field: Field::Button,
        classes: &[EventClass::Button],
        apply: set_button,
    },
    FieldRule {
        field: Field::IsHint,
        classes: &[EventClass::Motion],
        apply: set_hint,
    },
];

fn set_window(
    record: &mut EventRecord,
    tokens: &mut Tokenizer<'_>,
    base: WindowBase,
) -> Result<(), ParseErrorKind> {
    let relative: i64 = number(tokens)?;
    let window = base
        .from_log(relative)
        .ok_or(ParseErrorKind::WindowOutOfRange(relative))?;
    record.window = Some(window);
    Ok(())
}

fn set_time(
    record: &mut EventRecord,
    tokens: &mut Tokenizer<'_>,
    _: WindowBase,
) -> Result<(), ParseErrorKind> {
    record.time = number(tokens)?;
    Ok(())
}

fn set_xy(
    record: &mut EventRecord,
    tokens: &mut Tokenizer<'_>,
    _: WindowBase,
) -> Result<(), ParseErrorKind> {
    let x = number(tokens)?;
    let y = number(tokens)?;
    record.set_position(x, y);
    Ok(())
}

fn set_state(
    record: &mut EventRecord,
    tokens: &mut Tokenizer<'_>,
    _: WindowBase,
) -> Result<(), ParseErrorKind> {
    record.set_state(number(tokens)?);
    Ok(())
}

fn set_keycode(
    record: &mut EventRecord,
    tokens: &mut Tokenizer<'_>,
    _: WindowBase,
) -> Result<(), ParseErrorKind> {
    record.set_keycode(number(tokens)?);
    Ok(())
}

fn set_button(
    record: &mut EventRecord,
    tokens: &mut Tokenizer<'_>,
    _: WindowBase,
) -> Result<(), ParseErrorKind> {
    record.set_button(number(tokens)?);
    Ok(())
}

fn set_hint(
    record: &mut EventRecord,
    tokens: &mut Tokenizer<'_>,
    _: WindowBase,
) -> Result<(), ParseErrorKind> {
    record.set_hint(number::<u32>(tokens)? != 0);
    Ok(())
}

fn number<T: FromStr>(tokens: &mut Tokenizer<'_>) -> Result<T, ParseErrorKind> {
    let text = symbol(tokens)?;
    text.parse()
        .map_err(|_| ParseErrorKind::InvalidNumber(text.to_string()))
}

fn symbol<'a>(tokens: &mut Tokenizer<'a>) -> Result<&'a str, ParseErrorKind> {
    match tokens.next() {
        Some(Token::Symbol(text)) => Ok(text),
        Some(other) => Err(unexpected("a value", other)),
        None => Err(ParseErrorKind::UnexpectedEnd {
            expected: "a value",
        }),
    }
}

fn expect_rparen(tokens: &mut Tokenizer<'_>) -> Result<(), ParseErrorKind> {
    match tokens.next() {
        Some(Token::RParen) => Ok(()),
        Some(other) => Err(unexpected("`)`", other)),
        None => Err(ParseErrorKind::UnexpectedEnd { expected: "`)`" }),
    }
}

fn unexpected(expected: &'static str, found: Token<'_>) -> ParseErrorKind {
    ParseErrorKind::UnexpectedToken {
        expected,
        found: found.to_string(),
    }
}

/// Parses log lines into records, resolving window ids against a base.
#[derive(Clone, Copy, Debug, Default)]
pub struct Parser {
    base: WindowBase,
}

impl Parser {
    pub fn new(base: WindowBase) -> Self {
        Self { base }
    }

    pub fn base(&self) -> WindowBase {
        self.base
    }

    /// Parse one line.
    ///
    /// Blank lines and records of an unknown kind yield `Ok(None)`. A line
    /// that names a known kind but then breaks the grammar is an error.
    pub fn parse_line(&self, line: &str) -> Result<Option<EventRecord>, ParseError> {
        self.parse_tokens(&mut Tokenizer::new(line))
            .map_err(ParseError::new)
    }

    fn parse_tokens(
        &self,
        tokens: &mut Tokenizer<'_>,
    ) -> Result<Option<EventRecord>, ParseErrorKind> {
        match tokens.next() {
            None => return Ok(None),
            Some(Token::LParen) => {}
            Some(_) => return Err(ParseErrorKind::NotARecord),
        }

        let kind = match tokens.next() {
            Some(Token::Kind(kind)) => kind,
            Some(_) => return Ok(None),
            None => {
                return Err(ParseErrorKind::UnexpectedEnd {
                    expected: "an event kind",
                })
            }
        };

        let mut record = EventRecord::new(kind);
        loop {
            match tokens.peek() {
                Some(Token::RParen) => {
                    tokens.next();
                    return Ok(Some(record));
                }
                Some(Token::LParen) => {
                    tokens.next();
                    self.parse_field(&mut record, tokens)?;
                }
                Some(other) => return Err(unexpected("`(` or `)`", other)),
                None => {
                    return Err(ParseErrorKind::UnexpectedEnd {
                        expected: "`(` or `)`",
                    })
                }
            }
        }
    }

    fn parse_field(
        &self,
        record: &mut EventRecord,
        tokens: &mut Tokenizer<'_>,
    ) -> Result<(), ParseErrorKind> {
        let field = match tokens.next() {
            Some(Token::Field(field)) => field,
            Some(other) => return Err(unexpected("a field name", other)),
            None => {
                return Err(ParseErrorKind::UnexpectedEnd {
                    expected: "a field name",
                })
            }
        };

        let class = record.class();
        let rule = FIELD_RULES
            .iter()
            .find(|rule| rule.field == field && rule.classes.contains(&class))
            .ok_or(ParseErrorKind::FieldNotAllowed {
                field: field.keyword(),
                kind: record.kind().keyword(),
            })?;
        (rule.apply)(record, tokens, self.base)?;
        expect_rparen(tokens)
    }
}

/// Parse a single line against a window base.
pub fn parse(line: &str, base: WindowBase) -> Result<Option<EventRecord>, ParseError> {
    Parser::new(base).parse_line(line)
}
