//! Decoding of quoted string literals as the model writes them: `"..."` with backslash escapes,
//! `'x'` single-character literals, and `` `...` `` raw literals.
//!
//! Escapes: `\a \b \f \n \r \t \v \\`, the enclosing quote (`\"` or `\'`), `\xHH`, octal `\OOO`,
//! `\uHHHH` and `\UHHHHHHHH`. Inside double quotes `\x`/octal produce raw bytes, so the decoded
//! bytes must still form valid UTF-8.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UnquoteError {
    #[error("not a quoted literal")]
    NotQuoted,
    #[error("invalid escape sequence")]
    InvalidEscape,
    #[error("unescaped quote inside literal")]
    BareQuote,
    #[error("newline inside literal")]
    Newline,
    #[error("character literal must hold exactly one character")]
    CharLength,
    #[error("decoded literal is not valid UTF-8")]
    InvalidUtf8,
}

/// Decodes a quoted literal. The input must start and end with the same quote character.
pub fn unquote(s: &str) -> Result<String, UnquoteError> {
    let quote = match (s.chars().next(), s.chars().next_back()) {
        (Some(first), Some(last)) if s.len() >= 2 && first == last => first,
        _ => return Err(UnquoteError::NotQuoted),
    };
    if !matches!(quote, '"' | '\'' | '`') {
        return Err(UnquoteError::NotQuoted);
    }
    let body = &s[1..s.len() - 1];

    if quote == '`' {
        if body.contains('`') {
            return Err(UnquoteError::BareQuote);
        }
        return Ok(body.replace('\r', ""));
    }
    if body.contains('\n') {
        return Err(UnquoteError::Newline);
    }

    let decoded = decode_escapes(body, quote)?;
    if quote == '\'' && decoded.chars().count() != 1 {
        return Err(UnquoteError::CharLength);
    }
    Ok(decoded)
}

fn decode_escapes(body: &str, quote: char) -> Result<String, UnquoteError> {
    if !body.contains('\\') && !body.contains(quote) {
        return Ok(body.to_string());
    }

    let mut out: Vec<u8> = Vec::with_capacity(body.len());
    let mut rest = body;
    while let Some(c) = rest.chars().next() {
        rest = &rest[c.len_utf8()..];
        if c == quote {
            return Err(UnquoteError::BareQuote);
        }
        if c != '\\' {
            push_char(&mut out, c);
            continue;
        }

        let e = rest.chars().next().ok_or(UnquoteError::InvalidEscape)?;
        rest = &rest[e.len_utf8()..];
        match e {
            'a' => out.push(0x07),
            'b' => out.push(0x08),
            'f' => out.push(0x0c),
            'n' => out.push(b'\n'),
            'r' => out.push(b'\r'),
            't' => out.push(b'\t'),
            'v' => out.push(0x0b),
            '\\' => out.push(b'\\'),
            '\'' | '"' => {
                if e != quote {
                    return Err(UnquoteError::InvalidEscape);
                }
                out.push(e as u8);
            }
            'x' => {
                let v = take_digits(&mut rest, 2, 16)?;
                push_byte_value(&mut out, v, quote)?;
            }
            'u' => {
                let v = take_digits(&mut rest, 4, 16)?;
                push_char(&mut out, char::from_u32(v).ok_or(UnquoteError::InvalidEscape)?);
            }
            'U' => {
                let v = take_digits(&mut rest, 8, 16)?;
                push_char(&mut out, char::from_u32(v).ok_or(UnquoteError::InvalidEscape)?);
            }
            '0'..='7' => {
                let tail = take_digits(&mut rest, 2, 8)?;
                let v = (e as u32 - '0' as u32) * 64 + tail;
                if v > 0xff {
                    return Err(UnquoteError::InvalidEscape);
                }
                push_byte_value(&mut out, v, quote)?;
            }
            _ => return Err(UnquoteError::InvalidEscape),
        }
    }

    String::from_utf8(out).map_err(|_| UnquoteError::InvalidUtf8)
}

/// Reads exactly `count` digits in `radix` from the front of `rest`.
fn take_digits(rest: &mut &str, count: usize, radix: u32) -> Result<u32, UnquoteError> {
    let mut value = 0u32;
    for _ in 0..count {
        let c = rest.chars().next().ok_or(UnquoteError::InvalidEscape)?;
        let digit = c.to_digit(radix).ok_or(UnquoteError::InvalidEscape)?;
        value = value * radix + digit;
        *rest = &rest[c.len_utf8()..];
    }
    Ok(value)
}

fn push_char(out: &mut Vec<u8>, c: char) {
    let mut buf = [0u8; 4];
    out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
}

/// `\x` and octal escapes: raw byte in a string literal, code point in a character literal.
fn push_byte_value(out: &mut Vec<u8>, v: u32, quote: char) -> Result<(), UnquoteError> {
    if quote == '\'' {
        push_char(out, char::from_u32(v).ok_or(UnquoteError::InvalidEscape)?);
    } else {
        out.push(v as u8);
    }
    Ok(())
}
