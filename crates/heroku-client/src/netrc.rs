//! Minimal `.netrc` parser.
//!
//! Supports `machine`, `default`, `login`, `password`, `account` and `macdef`
//! (whose body runs until the next blank line). A token starting with `#`
//! comments out the rest of its line.

use std::collections::HashMap;

/// Credentials stored for one host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Authenticator {
    pub login: Option<String>,
    pub password: Option<String>,
    pub account: Option<String>,
}

/// Parse failure with the 1-based line it occurred on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetrcParseError {
    pub line: usize,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct Netrc {
    hosts: HashMap<String, Authenticator>,
}

struct Token<'a> {
    text: &'a str,
    line: usize,
}

enum Entry {
    Machine(String),
    Default,
}

impl Netrc {
    pub fn parse(input: &str) -> Result<Self, NetrcParseError> {
        let tokens = tokenize(input);
        let mut netrc = Netrc::default();
        let mut current: Option<(Entry, Authenticator)> = None;
        let mut iter = tokens.iter();

        while let Some(token) = iter.next() {
            match token.text {
                "machine" => {
                    let host = next_value(&mut iter, token)?;
                    netrc.finish(current.take());
                    current = Some((Entry::Machine(host.to_string()), Authenticator::default()));
                }
                "default" => {
                    netrc.finish(current.take());
                    current = Some((Entry::Default, Authenticator::default()));
                }
                "login" | "password" | "account" => {
                    let value = next_value(&mut iter, token)?.to_string();
                    let (_, auth) = current.as_mut().ok_or_else(|| NetrcParseError {
                        line: token.line,
                        message: format!("'{}' outside of a machine entry", token.text),
                    })?;
                    match token.text {
                        "login" => auth.login = Some(value),
                        "password" => auth.password = Some(value),
                        _ => auth.account = Some(value),
                    }
                }
                "macdef" => {
                    next_value(&mut iter, token)?;
                }
                other => {
                    return Err(NetrcParseError {
                        line: token.line,
                        message: format!("unexpected token '{other}'"),
                    });
                }
            }
        }

        netrc.finish(current);
        Ok(netrc)
    }

    /// Entry for an explicitly named machine. The `default` entry is never
    /// returned; it is parsed for syntax only.
    pub fn machine(&self, host: &str) -> Option<&Authenticator> {
        self.hosts.get(host)
    }

    fn finish(&mut self, entry: Option<(Entry, Authenticator)>) {
        match entry {
            // First entry for a host wins, as with most netrc consumers.
            Some((Entry::Machine(host), auth)) => {
                self.hosts.entry(host).or_insert(auth);
            }
            Some((Entry::Default, _)) | None => {}
        }
    }
}

fn next_value<'a>(
    iter: &mut std::slice::Iter<'_, Token<'a>>,
    keyword: &Token<'_>,
) -> Result<&'a str, NetrcParseError> {
    match iter.next() {
        Some(token) if !is_keyword(token.text) => Ok(token.text),
        _ => Err(NetrcParseError {
            line: keyword.line,
            message: format!("missing value after '{}'", keyword.text),
        }),
    }
}

fn is_keyword(text: &str) -> bool {
    matches!(
        text,
        "machine" | "default" | "login" | "password" | "account" | "macdef"
    )
}

fn tokenize(input: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut in_macdef = false;

    for (idx, line) in input.lines().enumerate() {
        if in_macdef {
            if line.trim().is_empty() {
                in_macdef = false;
            }
            continue;
        }

        let mut words = line.split_whitespace();
        while let Some(word) = words.next() {
            if word.starts_with('#') {
                break;
            }
            tokens.push(Token {
                text: word,
                line: idx + 1,
            });
            if word == "macdef" {
                if let Some(name) = words.next() {
                    tokens.push(Token {
                        text: name,
                        line: idx + 1,
                    });
                }
                in_macdef = true;
                break;
            }
        }
    }

    tokens
}
