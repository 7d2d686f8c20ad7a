use crate::error::ParseError;
use crate::models::{HttpMethod, LogRecord};
use crate::parsers::LineGrammar;

/// Grammar for the country-tagged access log format:
///
/// ```text
/// <ip> - <country> - [<datetime>] "<method> <path> HTTP/1.<digit>" <status> <size> "-" "<ua>" <duration>
/// ```
///
/// Implemented as a hand-written scanner. Tokens are separated by exactly one
/// whitespace character. The record is taken from the leftmost position where
/// the format matches, so a leading prefix (a syslog header, say) and anything
/// after the duration are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessLogGrammar;

/// Process-wide grammar instance
pub const ACCESS_LOG_GRAMMAR: AccessLogGrammar = AccessLogGrammar;

impl AccessLogGrammar {
    pub const FORMAT: &'static str =
        r#"<ip> - <country> - [<datetime>] "<method> <path> HTTP/1.<digit>" <status> <size> "-" "<ua>" <duration>"#;

    pub const fn new() -> Self {
        AccessLogGrammar
    }
}

impl LineGrammar for AccessLogGrammar {
    /// On failure the error describes the attempt at the start of the line
    fn parse_line(&self, line: &str) -> Result<LogRecord, ParseError> {
        let first_attempt = match parse_at(line, 0) {
            Ok(record) => return Ok(record),
            Err(e) => e,
        };

        // A record always begins with an ip digit
        line.char_indices()
            .skip(1)
            .filter(|(_, c)| c.is_ascii_digit())
            .find_map(|(start, _)| parse_at(line, start).ok())
            .ok_or(first_attempt)
    }
}

fn parse_at(line: &str, start: usize) -> Result<LogRecord, ParseError> {
    let mut scanner = Scanner::at(line, start);

    let ip = scanner.dotted_quad()?;
    scanner.separator()?;
    scanner.literal("-", "'-' after ip")?;
    scanner.separator()?;
    let country = scanner.exact(2, |c| c.is_ascii_uppercase(), "two uppercase letters for country")?;
    scanner.separator()?;
    scanner.literal("-", "'-' after country")?;
    scanner.separator()?;

    scanner.literal("[", "'[' opening datetime")?;
    let datetime = scanner.one_or_more(|c| c != ']', "datetime text")?;
    scanner.literal("]", "']' closing datetime")?;
    scanner.separator()?;

    scanner.literal("\"", "'\"' opening request")?;
    let method_start = scanner.pos;
    let method_token = scanner.one_or_more(|c| !c.is_whitespace(), "method")?;
    let method = HttpMethod::from_token(method_token)
        .ok_or_else(|| fail("method GET, POST or HEAD", method_start))?;
    scanner.separator()?;
    let path = scanner.one_or_more(|c| !c.is_whitespace(), "path")?;
    scanner.separator()?;
    scanner.literal("HTTP/1.", "protocol HTTP/1.<digit>")?;
    scanner.exact(1, |c| c.is_ascii_digit(), "protocol minor version digit")?;
    scanner.literal("\"", "'\"' closing request")?;
    scanner.separator()?;

    let status = scanner.exact(3, |c| c.is_ascii_digit(), "three-digit status")?;
    scanner.separator()?;
    let size = scanner.one_or_more(|c| c.is_ascii_digit(), "size digits")?;
    scanner.separator()?;
    scanner.literal("\"-\"", "referer \"-\"")?;
    scanner.separator()?;

    scanner.literal("\"", "'\"' opening user agent")?;
    let ua = scanner.one_or_more(|c| c != '"', "user agent text")?;
    scanner.literal("\"", "'\"' closing user agent")?;
    scanner.separator()?;
    let duration = scanner.one_or_more(|c| c.is_ascii_digit(), "duration digits")?;

    Ok(LogRecord {
        ip: ip.to_string(),
        country: country.to_string(),
        datetime: datetime.to_string(),
        method,
        path: path.to_string(),
        status: status.to_string(),
        size: size.to_string(),
        ua: ua.to_string(),
        duration: duration.to_string(),
    })
}

fn fail(expected: &str, position: usize) -> ParseError {
    ParseError::MalformedLine {
        expected: expected.to_string(),
        position,
    }
}

/// Byte-offset cursor over one line
struct Scanner<'a> {
    line: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn at(line: &'a str, pos: usize) -> Self {
        Self { line, pos }
    }

    fn rest(&self) -> &'a str {
        &self.line[self.pos..]
    }

    fn literal(&mut self, literal: &str, expected: &str) -> Result<(), ParseError> {
        if self.rest().starts_with(literal) {
            self.pos += literal.len();
            Ok(())
        } else {
            Err(fail(expected, self.pos))
        }
    }

    /// Exactly one whitespace character
    fn separator(&mut self) -> Result<(), ParseError> {
        match self.rest().chars().next() {
            Some(c) if c.is_whitespace() => {
                self.pos += c.len_utf8();
                Ok(())
            }
            _ => Err(fail("whitespace separator", self.pos)),
        }
    }

    fn one_or_more(&mut self, accept: impl Fn(char) -> bool, expected: &str) -> Result<&'a str, ParseError> {
        let rest = self.rest();
        let len = rest
            .char_indices()
            .find(|&(_, c)| !accept(c))
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        if len == 0 {
            return Err(fail(expected, self.pos));
        }
        self.pos += len;
        Ok(&rest[..len])
    }

    /// Exactly `count` accepted chars, not followed by another accepted char
    fn exact(&mut self, count: usize, accept: impl Fn(char) -> bool, expected: &str) -> Result<&'a str, ParseError> {
        let rest = self.rest();
        let mut len = 0;
        for (taken, c) in rest.chars().enumerate() {
            if taken == count || !accept(c) {
                break;
            }
            len += c.len_utf8();
        }
        let token = &rest[..len];
        if token.chars().count() != count {
            return Err(fail(expected, self.pos));
        }
        self.pos += len;
        Ok(token)
    }

    fn dotted_quad(&mut self) -> Result<&'a str, ParseError> {
        let start = self.pos;
        for octet in 0..4 {
            if octet > 0 {
                self.literal(".", "'.' in ip")?;
            }
            self.one_or_more(|c| c.is_ascii_digit(), "ip digits")?;
        }
        Ok(&self.line[start..self.pos])
    }
}
