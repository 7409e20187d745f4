use std::collections::HashMap;

use async_trait::async_trait;
use base64::Engine;

use crate::commands::types::{FetchFn, FetchResponse};
use crate::fs::FsCapability;
use crate::commands::{Command, CommandContext, CommandResult};

const MAX_REDIRECTS: usize = 10;

#[derive(Debug, Clone, Default)]
struct RequestOptions {
    method: Option<String>,
    headers: Vec<(String, String)>,
    data: Option<String>,
    output: Option<String>,
    remote_name: bool,
    silent: bool,
    follow_redirects: bool,
    head_only: bool,
    include_headers: bool,
    user: Option<String>,
    url: Option<String>,
}

fn parse_curl_args(args: &[String]) -> Result<RequestOptions, String> {
    let mut opts = RequestOptions::default();
    let mut i = 0;
    while i < args.len() {
        let arg = &args[i];
        let take_next = |i: &mut usize| -> Result<String, String> {
            *i += 1;
            args.get(*i)
                .cloned()
                .ok_or_else(|| format!("option {} requires an argument", arg))
        };
        match arg.as_str() {
            "-X" | "--request" => opts.method = Some(take_next(&mut i)?),
            "-H" | "--header" => {
                let header = take_next(&mut i)?;
                if let Some((name, value)) = header.split_once(':') {
                    opts.headers
                        .push((name.trim().to_string(), value.trim().to_string()));
                }
            }
            "-d" | "--data" | "--data-raw" => {
                let chunk = take_next(&mut i)?;
                opts.data = Some(match opts.data.take() {
                    Some(existing) => format!("{}&{}", existing, chunk),
                    None => chunk,
                });
                if opts.method.is_none() {
                    opts.method = Some("POST".to_string());
                }
            }
            "-o" | "--output" => opts.output = Some(take_next(&mut i)?),
            "-O" | "--remote-name" => opts.remote_name = true,
            "-s" | "--silent" => opts.silent = true,
            "-S" | "--show-error" => {}
            "-L" | "--location" => opts.follow_redirects = true,
            "-I" | "--head" => opts.head_only = true,
            "-i" | "--include" => opts.include_headers = true,
            "-u" | "--user" => opts.user = Some(take_next(&mut i)?),
            "-q" => opts.silent = true,
            a if a.starts_with("-X") && a.len() > 2 => {
                opts.method = Some(a[2..].to_string());
            }
            a if a.starts_with('-') && a.len() > 1 => {
                return Err(format!("unsupported option '{}'", a));
            }
            a => opts.url = Some(a.to_string()),
        }
        i += 1;
    }
    Ok(opts)
}

/// Missing protocol means https.
fn normalize_url(url: &str) -> String {
    if url.contains("://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}

fn remote_filename(url: &str) -> String {
    let path = url.splitn(2, "://").nth(1).unwrap_or(url);
    let name = path.rsplit('/').next().unwrap_or("");
    if name.is_empty() || !path.contains('/') {
        "index.html".to_string()
    } else {
        name.to_string()
    }
}

async fn perform(
    fetch_fn: &FetchFn,
    opts: &RequestOptions,
    url: &str,
) -> Result<FetchResponse, String> {
    let method = if opts.head_only {
        "HEAD".to_string()
    } else {
        opts.method.clone().unwrap_or_else(|| "GET".to_string())
    };
    let mut headers: HashMap<String, String> = opts.headers.iter().cloned().collect();
    if let Some(user) = &opts.user {
        let token = base64::engine::general_purpose::STANDARD.encode(user.as_bytes());
        headers.insert("Authorization".to_string(), format!("Basic {}", token));
    }

    let mut current = url.to_string();
    let mut hops = 0;
    loop {
        let response = fetch_fn(
            current.clone(),
            method.clone(),
            headers.clone(),
            opts.data.clone(),
        )
        .await?;
        let redirect = (300..400).contains(&response.status)
            && opts.follow_redirects
            && response.header("location").is_some();
        if !redirect {
            return Ok(response);
        }
        hops += 1;
        if hops > MAX_REDIRECTS {
            return Err("too many redirects".to_string());
        }
        current = response.header("location").unwrap().to_string();
    }
}

fn render_headers(response: &FetchResponse) -> String {
    let mut out = format!("HTTP/1.1 {}\r\n", response.status);
    let mut names: Vec<&String> = response.headers.keys().collect();
    names.sort();
    for name in names {
        out.push_str(&format!("{}: {}\r\n", name, response.headers[name]));
    }
    out.push_str("\r\n");
    out
}

async fn deliver(
    ctx: &CommandContext,
    command: &str,
    destination: Option<&str>,
    body: &str,
) -> Result<String, CommandResult> {
    match destination {
        None | Some("-") => Ok(body.to_string()),
        Some(path) => {
            let fs = ctx.require_fs(command)?;
            let resolved = ctx.resolve(&fs, path);
            fs.write(&resolved, body.as_bytes())
                .await
                .map_err(|e| CommandResult::error(format!("{}: {}: {}\n", command, path, e)))?;
            Ok(String::new())
        }
    }
}

pub struct CurlCommand;

#[async_trait]
impl Command for CurlCommand {
    fn name(&self) -> &'static str {
        "curl"
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        let opts = match parse_curl_args(&ctx.args) {
            Ok(o) => o,
            Err(e) => return CommandResult::with_exit_code(String::new(), format!("curl: {}\n", e), 2),
        };
        let Some(url) = &opts.url else {
            return CommandResult::with_exit_code(
                String::new(),
                "curl: no URL specified\n".to_string(),
                2,
            );
        };
        let Some(fetch_fn) = ctx.fetch_fn.clone() else {
            return CommandResult::error("curl: network capability not available\n".to_string());
        };

        let url = normalize_url(url);
        let response = match perform(&fetch_fn, &opts, &url).await {
            Ok(r) => r,
            Err(e) => {
                return CommandResult::error(format!("curl: (6) {}\n", e));
            }
        };

        let mut out = String::new();
        if opts.head_only {
            out.push_str(&render_headers(&response));
        } else {
            if opts.include_headers {
                out.push_str(&render_headers(&response));
            }
            let destination = if opts.remote_name {
                Some(remote_filename(&url))
            } else {
                opts.output.clone()
            };
            match deliver(&ctx, "curl", destination.as_deref(), &response.body).await {
                Ok(body) => out.push_str(&body),
                Err(e) => return e,
            }
        }

        let exit_code = i32::from(response.status >= 400);
        let stderr = if exit_code != 0 && !opts.silent {
            format!("curl: server returned HTTP {}\n", response.status)
        } else {
            String::new()
        };
        CommandResult::with_exit_code(out, stderr, exit_code)
    }
}

pub struct WgetCommand;

#[async_trait]
impl Command for WgetCommand {
    fn name(&self) -> &'static str {
        "wget"
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        let mut quiet = false;
        let mut print_headers = false;
        let mut output: Option<String> = None;
        let mut url: Option<String> = None;

        let mut i = 0;
        while i < ctx.args.len() {
            let arg = &ctx.args[i];
            match arg.as_str() {
                "-q" | "--quiet" => quiet = true,
                "-S" | "--server-response" => print_headers = true,
                "-O" | "--output-document" => {
                    i += 1;
                    match ctx.args.get(i) {
                        Some(o) => output = Some(o.clone()),
                        None => {
                            return CommandResult::error(
                                "wget: option requires an argument -- 'O'\n".to_string(),
                            )
                        }
                    }
                }
                a if a.starts_with('-') && a.len() > 1 => {
                    return CommandResult::error(format!("wget: invalid option -- '{}'\n", a))
                }
                a => url = Some(a.to_string()),
            }
            i += 1;
        }

        let Some(url) = url else {
            return CommandResult::error("wget: missing URL\n".to_string());
        };
        let Some(fetch_fn) = ctx.fetch_fn.clone() else {
            return CommandResult::error("wget: network capability not available\n".to_string());
        };

        let url = normalize_url(&url);
        let opts = RequestOptions {
            follow_redirects: true,
            ..Default::default()
        };
        let response = match perform(&fetch_fn, &opts, &url).await {
            Ok(r) => r,
            Err(e) => return CommandResult::error(format!("wget: {}\n", e)),
        };
        if response.status >= 400 {
            return CommandResult::error(format!(
                "wget: server returned error: HTTP {}\n",
                response.status
            ));
        }

        let destination = output.unwrap_or_else(|| remote_filename(&url));
        let body = match deliver(&ctx, "wget", Some(destination.as_str()), &response.body).await {
            Ok(body) => body,
            Err(e) => return e,
        };

        let mut stderr = String::new();
        if print_headers {
            stderr.push_str(&render_headers(&response));
        }
        if !quiet && destination != "-" {
            stderr.push_str(&format!("Saving to: '{}'\n", destination));
        }
        CommandResult::with_exit_code(body, stderr, 0)
    }
}
