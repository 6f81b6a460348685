//! Restricted evaluator for module-style RC files
//!
//! Accepts a single literal export and nothing else:
//!
//! ```js
//! 'use strict';
//! // comments are fine
//! module.exports = {
//!   environments: {
//!     development: { NODE_ENV: 'development', PORT: 3000, },
//!   },
//! };
//! ```
//!
//! Also recognised: `module.exports.environments = {...}`,
//! `exports.environments = {...}` and `export default {...}`. The literal uses
//! JavaScript object syntax (bare keys, single quotes, trailing commas). No
//! code is executed; anything computed is rejected.

use serde_json::{Map, Number, Value};

/// Evaluate `source` into the exported value.
pub fn evaluate(source: &str) -> Result<Value, String> {
    let mut parser = Parser::new(source);
    let value = parser.program()?;
    Ok(value)
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(source: &str) -> Self {
        Self { chars: source.trim_start_matches('\u{feff}').chars().collect(), pos: 0 }
    }

    fn program(&mut self) -> Result<Value, String> {
        self.skip_trivia()?;
        if matches!(self.peek(), Some('\'' | '"')) {
            let save = self.pos;
            if self.quoted()? == "use strict" {
                self.end_statement()?;
            } else {
                self.pos = save;
            }
        }

        let value = self.export()?;
        self.end_statement()?;
        self.skip_trivia()?;
        if self.pos < self.chars.len() {
            return Err(self.error("unexpected content after the export"));
        }
        Ok(value)
    }

    fn export(&mut self) -> Result<Value, String> {
        let head = self.identifier().ok_or_else(|| self.error("expected an export statement"))?;
        match head.as_str() {
            "module" => {
                self.expect('.')?;
                self.keyword("exports")?;
                self.skip_trivia()?;
                if self.peek() == Some('.') {
                    self.pos += 1;
                    self.keyword("environments")?;
                    self.expect('=')?;
                    return Ok(wrap_environments(self.literal()?));
                }
                self.expect('=')?;
                self.literal()
            }
            "exports" => {
                self.expect('.')?;
                self.keyword("environments")?;
                self.expect('=')?;
                Ok(wrap_environments(self.literal()?))
            }
            "export" => {
                self.keyword("default")?;
                self.literal()
            }
            other => Err(self.error(&format!("unsupported statement starting with '{}'", other))),
        }
    }

    fn end_statement(&mut self) -> Result<(), String> {
        self.skip_trivia()?;
        if self.peek() == Some(';') {
            self.pos += 1;
        }
        self.skip_trivia()
    }

    fn literal(&mut self) -> Result<Value, String> {
        self.skip_trivia()?;
        match self.peek() {
            Some('{') => self.object(),
            Some('[') => self.array(),
            Some('\'' | '"' | '`') => self.quoted().map(Value::String),
            Some(c) if c == '-' || c == '.' || c.is_ascii_digit() => self.number(),
            Some(_) => match self.identifier().as_deref() {
                Some("true") => Ok(Value::Bool(true)),
                Some("false") => Ok(Value::Bool(false)),
                Some("null") => Ok(Value::Null),
                Some(other) => Err(self.error(&format!("'{}' is not a literal value", other))),
                None => Err(self.error("expected a literal value")),
            },
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn object(&mut self) -> Result<Value, String> {
        self.expect('{')?;
        let mut map = Map::new();
        loop {
            self.skip_trivia()?;
            if self.peek() == Some('}') {
                self.pos += 1;
                return Ok(Value::Object(map));
            }

            let key = match self.peek() {
                Some('\'' | '"' | '`') => self.quoted()?,
                Some(c) if c.is_ascii_digit() => self.number()?.to_string(),
                _ => self.identifier().ok_or_else(|| self.error("expected a property name"))?,
            };
            self.expect(':')?;
            let value = self.literal()?;
            map.insert(key, value);

            self.skip_trivia()?;
            match self.peek() {
                Some(',') => self.pos += 1,
                Some('}') => {}
                _ => return Err(self.error("expected ',' or '}'")),
            }
        }
    }

    fn array(&mut self) -> Result<Value, String> {
        self.expect('[')?;
        let mut items = Vec::new();
        loop {
            self.skip_trivia()?;
            if self.peek() == Some(']') {
                self.pos += 1;
                return Ok(Value::Array(items));
            }
            items.push(self.literal()?);
            self.skip_trivia()?;
            match self.peek() {
                Some(',') => self.pos += 1,
                Some(']') => {}
                _ => return Err(self.error("expected ',' or ']'")),
            }
        }
    }

    fn quoted(&mut self) -> Result<String, String> {
        let quote = self.peek().ok_or_else(|| self.error("expected a string"))?;
        let start = self.pos;
        self.pos += 1;
        let mut out = String::new();
        while let Some(ch) = self.peek() {
            self.pos += 1;
            match ch {
                c if c == quote => return Ok(out),
                '\\' => out.push(self.escape()?),
                '$' if quote == '`' && self.peek() == Some('{') => {
                    return Err(self.error("template interpolation is not supported"));
                }
                '\n' if quote != '`' => break,
                c => out.push(c),
            }
        }
        self.pos = start;
        Err(self.error("unterminated string"))
    }

    fn escape(&mut self) -> Result<char, String> {
        let ch = self.peek().ok_or_else(|| self.error("unterminated escape"))?;
        self.pos += 1;
        Ok(match ch {
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            '0' => '\0',
            'u' => {
                let hex: String = self.chars.iter().skip(self.pos).take(4).collect();
                let code = u32::from_str_radix(&hex, 16)
                    .ok()
                    .filter(|_| hex.len() == 4)
                    .and_then(char::from_u32)
                    .ok_or_else(|| self.error("invalid unicode escape"))?;
                self.pos += 4;
                code
            }
            other => other,
        })
    }

    fn number(&mut self) -> Result<Value, String> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E') {
                self.pos += 1;
            } else {
                break;
            }
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        if let Ok(int) = text.parse::<i64>() {
            return Ok(Value::Number(int.into()));
        }
        text.parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| self.error(&format!("invalid number '{}'", text)))
    }

    fn identifier(&mut self) -> Option<String> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            let valid = c == '_' || c == '$' || c.is_alphanumeric();
            if !valid || (self.pos == start && c.is_ascii_digit()) {
                break;
            }
            self.pos += 1;
        }
        (self.pos > start).then(|| self.chars[start..self.pos].iter().collect())
    }

    fn keyword(&mut self, word: &str) -> Result<(), String> {
        self.skip_trivia()?;
        match self.identifier() {
            Some(found) if found == word => Ok(()),
            _ => Err(self.error(&format!("expected '{}'", word))),
        }
    }

    fn expect(&mut self, ch: char) -> Result<(), String> {
        self.skip_trivia()?;
        if self.peek() == Some(ch) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(&format!("expected '{}'", ch)))
        }
    }

    fn skip_trivia(&mut self) -> Result<(), String> {
        loop {
            match (self.peek(), self.chars.get(self.pos + 1).copied()) {
                (Some(c), _) if c.is_whitespace() => self.pos += 1,
                (Some('/'), Some('/')) => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.pos += 1;
                    }
                }
                (Some('/'), Some('*')) => {
                    let start = self.pos;
                    self.pos += 2;
                    loop {
                        match (self.peek(), self.chars.get(self.pos + 1).copied()) {
                            (Some('*'), Some('/')) => {
                                self.pos += 2;
                                break;
                            }
                            (Some(_), _) => self.pos += 1,
                            (None, _) => {
                                self.pos = start;
                                return Err(self.error("unterminated block comment"));
                            }
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn error(&self, message: &str) -> String {
        let consumed = &self.chars[..self.pos.min(self.chars.len())];
        let line = consumed.iter().filter(|&&c| c == '\n').count() + 1;
        let column = consumed.iter().rev().take_while(|&&c| c != '\n').count() + 1;
        format!("{} at line {}, column {}", message, line, column)
    }
}

fn wrap_environments(environments: Value) -> Value {
    let mut root = Map::new();
    root.insert("environments".to_string(), environments);
    Value::Object(root)
}
