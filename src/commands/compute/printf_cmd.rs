use async_trait::async_trait;

use crate::commands::{Command, CommandContext, CommandResult};

pub struct PrintfCommand;

#[async_trait]
impl Command for PrintfCommand {
    fn name(&self) -> &'static str {
        "printf"
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        if ctx.args.is_empty() {
            return CommandResult::error("printf: usage: printf format [arguments]\n".to_string());
        }
        let format = &ctx.args[0];
        let args = &ctx.args[1..];

        let mut out = String::new();
        let mut consumed = 0;
        // The format string is reused until all arguments are consumed,
        // and applied at least once.
        loop {
            match render(format, args, consumed) {
                Ok((chunk, used)) => {
                    out.push_str(&chunk);
                    consumed += used;
                    if used == 0 || consumed >= args.len() {
                        break;
                    }
                }
                Err(e) => return CommandResult::error(format!("printf: {}\n", e)),
            }
        }
        CommandResult::success(out)
    }
}

/// Apply the format once; returns the rendered text and the number of
/// arguments consumed.
fn render(format: &str, args: &[String], offset: usize) -> Result<(String, usize), String> {
    let mut out = String::new();
    let mut used = 0;
    let mut chars = format.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('r') => out.push('\r'),
                Some('\\') => out.push('\\'),
                Some('a') => out.push('\x07'),
                Some('0') => out.push('\0'),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            },
            '%' => {
                if chars.peek() == Some(&'%') {
                    chars.next();
                    out.push('%');
                    continue;
                }
                // Optional flags and width: %[-][0][width]
                let mut left_align = false;
                let mut zero_pad = false;
                let mut width = String::new();
                while let Some(&next) = chars.peek() {
                    match next {
                        '-' if width.is_empty() => {
                            left_align = true;
                            chars.next();
                        }
                        '0' if width.is_empty() => {
                            zero_pad = true;
                            chars.next();
                        }
                        d if d.is_ascii_digit() => {
                            width.push(d);
                            chars.next();
                        }
                        _ => break,
                    }
                }
                let width: usize = width.parse().unwrap_or(0);
                let conv = chars
                    .next()
                    .ok_or_else(|| "missing format character".to_string())?;
                let arg = args.get(offset + used).map(String::as_str).unwrap_or("");
                if offset + used < args.len() {
                    used += 1;
                }
                let rendered = match conv {
                    's' => arg.to_string(),
                    'd' | 'i' => parse_int(arg)?.to_string(),
                    'x' => format!("{:x}", parse_int(arg)?),
                    'o' => format!("{:o}", parse_int(arg)?),
                    other => return Err(format!("%{}: invalid conversion", other)),
                };
                out.push_str(&pad(&rendered, width, left_align, zero_pad && conv != 's'));
            }
            _ => out.push(c),
        }
    }
    Ok((out, used))
}

fn parse_int(s: &str) -> Result<i64, String> {
    if s.is_empty() {
        return Ok(0);
    }
    s.trim()
        .parse::<i64>()
        .map_err(|_| format!("'{}': expected a numeric value", s))
}

fn pad(s: &str, width: usize, left_align: bool, zero_pad: bool) -> String {
    if s.len() >= width {
        return s.to_string();
    }
    let fill = width - s.len();
    if left_align {
        format!("{}{}", s, " ".repeat(fill))
    } else if zero_pad {
        if let Some(stripped) = s.strip_prefix('-') {
            format!("-{}{}", "0".repeat(fill), stripped)
        } else {
            format!("{}{}", "0".repeat(fill), s)
        }
    } else {
        format!("{}{}", " ".repeat(fill), s)
    }
}
