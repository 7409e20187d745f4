use async_trait::async_trait;

use super::read_input;
use crate::commands::{Command, CommandContext, CommandResult};

pub struct OdCommand;

#[derive(Debug, Clone, Copy, PartialEq)]
enum OutputType {
    Octal2,
    Hex2,
    Decimal2,
    Octal1,
    Hex1,
    Decimal1,
    Unsigned1,
    Chars,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum AddressRadix {
    Octal,
    Decimal,
    Hex,
    None,
}

#[async_trait]
impl Command for OdCommand {
    fn name(&self) -> &'static str {
        "od"
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        let mut output_type = OutputType::Octal2;
        let mut radix = AddressRadix::Octal;
        let mut width = 16usize;
        let mut skip = 0usize;
        let mut limit: Option<usize> = None;
        let mut file: Option<String> = None;

        let mut i = 0;
        while i < ctx.args.len() {
            let arg = &ctx.args[i];
            match arg.as_str() {
                "-A" => {
                    i += 1;
                    radix = match ctx.args.get(i).map(String::as_str) {
                        Some("o") => AddressRadix::Octal,
                        Some("d") => AddressRadix::Decimal,
                        Some("x") => AddressRadix::Hex,
                        Some("n") => AddressRadix::None,
                        _ => {
                            return CommandResult::error(
                                "od: invalid output address radix\n".to_string(),
                            )
                        }
                    };
                }
                "-t" => {
                    i += 1;
                    output_type = match ctx.args.get(i).map(String::as_str) {
                        Some("o2") => OutputType::Octal2,
                        Some("x2") => OutputType::Hex2,
                        Some("d2") => OutputType::Decimal2,
                        Some("o1") => OutputType::Octal1,
                        Some("x1") => OutputType::Hex1,
                        Some("d1") => OutputType::Decimal1,
                        Some("u1") => OutputType::Unsigned1,
                        Some("c") => OutputType::Chars,
                        Some(other) => {
                            return CommandResult::error(format!(
                                "od: unsupported type string '{}'\n",
                                other
                            ))
                        }
                        None => {
                            return CommandResult::error(
                                "od: option requires an argument -- 't'\n".to_string(),
                            )
                        }
                    };
                }
                "-x" => output_type = OutputType::Hex2,
                "-c" => output_type = OutputType::Chars,
                "-d" => output_type = OutputType::Decimal2,
                "-o" => output_type = OutputType::Octal2,
                "-w" => {
                    i += 1;
                    width = match ctx.args.get(i).and_then(|n| n.parse().ok()) {
                        Some(n) if n > 0 => n,
                        _ => return CommandResult::error("od: invalid width\n".to_string()),
                    };
                }
                "-j" => {
                    i += 1;
                    skip = ctx.args.get(i).and_then(|n| n.parse().ok()).unwrap_or(0);
                }
                "-N" => {
                    i += 1;
                    limit = ctx.args.get(i).and_then(|n| n.parse().ok());
                }
                a if a.starts_with("-w") => {
                    width = a[2..].parse().unwrap_or(16);
                }
                "-" => file = Some("-".to_string()),
                a if a.starts_with('-') => {
                    return CommandResult::error(format!("od: invalid option -- '{}'\n", a))
                }
                a => file = Some(a.to_string()),
            }
            i += 1;
        }

        let content = match read_input(&ctx, file.as_deref(), "od").await {
            Ok(c) => c,
            Err(e) => return e,
        };
        let bytes = content.as_bytes();
        let start = skip.min(bytes.len());
        let end = match limit {
            Some(n) => (start + n).min(bytes.len()),
            None => bytes.len(),
        };
        let data = &bytes[start..end];

        let mut out = String::new();
        for (row, chunk) in data.chunks(width).enumerate() {
            let offset = start + row * width;
            push_offset(&mut out, offset, radix);
            out.push_str(&format_chunk(chunk, output_type));
            out.push('\n');
        }
        push_offset(&mut out, end, radix);
        if radix != AddressRadix::None {
            out.push('\n');
        }
        CommandResult::success(out)
    }
}

fn push_offset(out: &mut String, offset: usize, radix: AddressRadix) {
    match radix {
        AddressRadix::Octal => out.push_str(&format!("{:07o}", offset)),
        AddressRadix::Decimal => out.push_str(&format!("{:07}", offset)),
        AddressRadix::Hex => out.push_str(&format!("{:06x}", offset)),
        AddressRadix::None => {}
    }
}

fn format_chunk(chunk: &[u8], output_type: OutputType) -> String {
    let mut out = String::new();
    match output_type {
        OutputType::Octal2 | OutputType::Hex2 | OutputType::Decimal2 => {
            for pair in chunk.chunks(2) {
                let word =
                    pair[0] as u16 | ((pair.get(1).copied().unwrap_or(0) as u16) << 8);
                match output_type {
                    OutputType::Octal2 => out.push_str(&format!(" {:06o}", word)),
                    OutputType::Hex2 => out.push_str(&format!(" {:04x}", word)),
                    _ => out.push_str(&format!(" {:5}", word)),
                }
            }
        }
        OutputType::Octal1 => {
            for b in chunk {
                out.push_str(&format!(" {:03o}", b));
            }
        }
        OutputType::Hex1 => {
            for b in chunk {
                out.push_str(&format!(" {:02x}", b));
            }
        }
        OutputType::Decimal1 => {
            for b in chunk {
                out.push_str(&format!(" {:4}", *b as i8));
            }
        }
        OutputType::Unsigned1 => {
            for b in chunk {
                out.push_str(&format!(" {:3}", b));
            }
        }
        OutputType::Chars => {
            for b in chunk {
                let rendered = match *b {
                    b'\n' => "\\n".to_string(),
                    b'\t' => "\\t".to_string(),
                    b'\r' => "\\r".to_string(),
                    0 => "\\0".to_string(),
                    b if b.is_ascii_graphic() || b == b' ' => (b as char).to_string(),
                    b => format!("{:03o}", b),
                };
                out.push_str(&format!(" {:>3}", rendered));
            }
        }
    }
    out
}
