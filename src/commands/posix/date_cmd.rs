use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::commands::{Command, CommandContext, CommandResult};

pub struct DateCommand;

#[async_trait]
impl Command for DateCommand {
    fn name(&self) -> &'static str {
        "date"
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        let mut utc = false;
        let mut date_str: Option<String> = None;
        let mut format: Option<String> = None;

        let mut i = 0;
        while i < ctx.args.len() {
            let arg = &ctx.args[i];
            if arg == "-u" || arg == "--utc" {
                utc = true;
            } else if arg == "-d" || arg == "--date" {
                i += 1;
                match ctx.args.get(i) {
                    Some(s) => date_str = Some(s.clone()),
                    None => {
                        return CommandResult::error(
                            "date: option requires an argument -- 'd'\n".to_string(),
                        )
                    }
                }
            } else if let Some(s) = arg.strip_prefix("--date=") {
                date_str = Some(s.to_string());
            } else if let Some(f) = arg.strip_prefix('+') {
                format = Some(f.to_string());
            } else if arg.starts_with('-') {
                return CommandResult::error(format!("date: invalid option '{}'\n", arg));
            }
            i += 1;
        }

        let now = match &date_str {
            Some(s) => match parse_date(s) {
                Some(dt) => dt,
                None => {
                    return CommandResult::error(format!("date: invalid date '{}'\n", s));
                }
            },
            None => Utc::now(),
        };

        // The runtime has no local timezone; output is UTC either way and
        // -u is accepted for compatibility.
        let _ = utc;
        let rendered = render(&now, format.as_deref());
        CommandResult::success(format!("{}\n", rendered))
    }
}

/// Parse `@epoch`, `YYYY-MM-DD`, or `YYYY-MM-DDTHH:MM:SS`.
fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    if let Some(epoch) = s.strip_prefix('@') {
        let secs: i64 = epoch.parse().ok()?;
        return Utc.timestamp_opt(secs, 0).single();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(Utc.from_utc_datetime(&dt));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(Utc.from_utc_datetime(&dt));
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(Utc.from_utc_datetime(&d.and_hms_opt(0, 0, 0)?));
    }
    None
}

const SUPPORTED_SPECIFIERS: &[char] = &[
    'Y', 'm', 'd', 'H', 'M', 'S', 's', 'F', 'T', 'e', 'a', 'b', 'j', 'u', '%',
];

fn render(dt: &DateTime<Utc>, format: Option<&str>) -> String {
    match format {
        // chrono shares the strftime vocabulary the command exposes
        // (%Y %m %d %H %M %S %s %F %T). Unknown specifiers are dropped
        // rather than handed to chrono, whose formatter rejects them at
        // render time.
        Some(f) => dt.format(&sanitize_format(f)).to_string(),
        None => dt.format("%a %b %e %H:%M:%S UTC %Y").to_string(),
    }
}

fn sanitize_format(format: &str) -> String {
    let mut out = String::with_capacity(format.len());
    let mut chars = format.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some(n) if SUPPORTED_SPECIFIERS.contains(&n) => {
                out.push('%');
                out.push(n);
            }
            Some(n) => out.push(n),
            None => {}
        }
    }
    out
}
