//! Restricted integer expression evaluator shared by `expr` and `bc`.
//!
//! Accepts integers, `+ - * / %`, unary minus, and parentheses. Nothing
//! else — no identifiers, no function calls, no bitwise operators. The
//! evaluator is the only arithmetic path in the crate; attacker-controlled
//! text never reaches a general-purpose evaluator.

/// Evaluate a restricted integer expression.
pub fn eval(input: &str) -> Result<i64, String> {
    let mut parser = Parser {
        chars: input.chars().collect(),
        pos: 0,
    };
    parser.skip_ws();
    if parser.at_end() {
        return Err("missing expression".to_string());
    }
    let value = parser.parse_expr()?;
    parser.skip_ws();
    if !parser.at_end() {
        return Err(format!(
            "unexpected character '{}'",
            parser.chars[parser.pos]
        ));
    }
    Ok(value)
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while self.peek().map_or(false, |c| c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn parse_expr(&mut self) -> Result<i64, String> {
        let mut left = self.parse_term()?;
        loop {
            self.skip_ws();
            match self.peek() {
                Some('+') => {
                    self.pos += 1;
                    let right = self.parse_term()?;
                    left = left
                        .checked_add(right)
                        .ok_or_else(|| "integer overflow".to_string())?;
                }
                Some('-') => {
                    self.pos += 1;
                    let right = self.parse_term()?;
                    left = left
                        .checked_sub(right)
                        .ok_or_else(|| "integer overflow".to_string())?;
                }
                _ => return Ok(left),
            }
        }
    }

    fn parse_term(&mut self) -> Result<i64, String> {
        let mut left = self.parse_factor()?;
        loop {
            self.skip_ws();
            match self.peek() {
                Some('*') => {
                    self.pos += 1;
                    let right = self.parse_factor()?;
                    left = left
                        .checked_mul(right)
                        .ok_or_else(|| "integer overflow".to_string())?;
                }
                Some('/') => {
                    self.pos += 1;
                    let right = self.parse_factor()?;
                    if right == 0 {
                        return Err("division by zero".to_string());
                    }
                    left /= right;
                }
                Some('%') => {
                    self.pos += 1;
                    let right = self.parse_factor()?;
                    if right == 0 {
                        return Err("division by zero".to_string());
                    }
                    left %= right;
                }
                _ => return Ok(left),
            }
        }
    }

    fn parse_factor(&mut self) -> Result<i64, String> {
        self.skip_ws();
        match self.peek() {
            Some('-') => {
                self.pos += 1;
                let value = self.parse_factor()?;
                value
                    .checked_neg()
                    .ok_or_else(|| "integer overflow".to_string())
            }
            Some('(') => {
                self.pos += 1;
                let value = self.parse_expr()?;
                self.skip_ws();
                if self.peek() != Some(')') {
                    return Err("missing closing parenthesis".to_string());
                }
                self.pos += 1;
                Ok(value)
            }
            Some(c) if c.is_ascii_digit() => {
                let start = self.pos;
                while self.peek().map_or(false, |c| c.is_ascii_digit()) {
                    self.pos += 1;
                }
                let text: String = self.chars[start..self.pos].iter().collect();
                text.parse::<i64>()
                    .map_err(|_| format!("number out of range: {}", text))
            }
            Some(c) => Err(format!("unexpected character '{}'", c)),
            None => Err("unexpected end of expression".to_string()),
        }
    }
}
