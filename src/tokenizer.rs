//! Command-line tokenizer.
//!
//! Splits a command line into name + argv, respecting single/double quotes
//! and backslash escapes inside double quotes. Leading `VAR=value`
//! assignments are stripped before either operation. The tokenizer never
//! fails; unbalanced quotes yield whatever tokens accumulated.

use lazy_static::lazy_static;
use regex_lite::Regex;

lazy_static! {
    static ref NAME_RE: Regex = Regex::new(r"^[A-Za-z0-9_\-./]+").unwrap();
    static ref ASSIGNMENT_RE: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*=").unwrap();
}

/// Strip leading `VAR=value` assignment words. The value may be quoted and
/// contain whitespace.
pub fn strip_assignments(line: &str) -> &str {
    let mut rest = line.trim_start();
    while ASSIGNMENT_RE.is_match(rest) {
        let end = word_end(rest);
        rest = rest[end..].trim_start();
    }
    rest
}

/// Index just past the first word, honoring quotes.
fn word_end(s: &str) -> usize {
    let mut in_single = false;
    let mut in_double = false;
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_double => escaped = true,
            '\'' if !in_double => in_single = !in_single,
            '"' if !in_single => in_double = !in_double,
            c if c.is_whitespace() && !in_single && !in_double => return i,
            _ => {}
        }
    }
    s.len()
}

/// Extract the command name: the basename of the first run of
/// `[A-Za-z0-9_\-./]` after assignment stripping. Empty string if the line
/// has no command word.
pub fn command_name(line: &str) -> String {
    let rest = strip_assignments(line);
    match NAME_RE.find(rest) {
        Some(m) => m
            .as_str()
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string(),
        None => String::new(),
    }
}

/// Tokenize a command line into words, quotes stripped. The first word is
/// the command name; `argv` discards it.
pub fn tokenize(line: &str) -> Vec<String> {
    let rest = strip_assignments(line);
    let mut tokens: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut started = false;
    let mut in_single = false;
    let mut in_double = false;

    let mut chars = rest.chars().peekable();
    while let Some(c) = chars.next() {
        if in_single {
            if c == '\'' {
                in_single = false;
            } else {
                current.push(c);
            }
            continue;
        }
        if in_double {
            match c {
                '\\' => {
                    // Backslash escapes the next character. Only `\"` is
                    // unescaped; other pairs are kept verbatim.
                    match chars.next() {
                        Some('"') => current.push('"'),
                        Some(other) => {
                            current.push('\\');
                            current.push(other);
                        }
                        None => current.push('\\'),
                    }
                }
                '"' => in_double = false,
                _ => current.push(c),
            }
            continue;
        }
        match c {
            '\'' => {
                in_single = true;
                started = true;
            }
            '"' => {
                in_double = true;
                started = true;
            }
            c if c.is_whitespace() => {
                if started {
                    tokens.push(std::mem::take(&mut current));
                    started = false;
                }
            }
            _ => {
                current.push(c);
                started = true;
            }
        }
    }
    if started {
        tokens.push(current);
    }
    tokens
}

/// Arguments of a command line: all tokens after the command word.
pub fn argv(line: &str) -> Vec<String> {
    let mut tokens = tokenize(line);
    if tokens.is_empty() {
        return Vec::new();
    }
    tokens.remove(0);
    tokens
}
