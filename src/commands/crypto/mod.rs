//! Crypto-class commands: digests, checksums, UUIDs, and a very narrow
//! `openssl`.

use async_trait::async_trait;
use md5::Md5;
use rand::RngCore;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha384, Sha512};

use super::registry::CommandRegistry;
use super::types::{Command, CommandContext, CommandResult};
use crate::fs::FsCapability;

pub fn register(reg: &mut CommandRegistry) {
    reg.register(Box::new(DigestCommand::new("sha256sum")));
    reg.register(Box::new(DigestCommand::new("sha1sum")));
    reg.register(Box::new(DigestCommand::new("sha512sum")));
    reg.register(Box::new(DigestCommand::new("sha384sum")));
    reg.register(Box::new(DigestCommand::new("md5sum")));
    reg.register(Box::new(UuidgenCommand::new("uuidgen")));
    reg.register(Box::new(UuidgenCommand::new("uuid")));
    reg.register(Box::new(CksumCommand));
    reg.register(Box::new(SumCommand));
    reg.register(Box::new(OpensslCommand));
}

fn digest_hex(algorithm: &str, data: &[u8]) -> String {
    match algorithm {
        "sha1sum" | "sha1" => hex::encode(Sha1::digest(data)),
        "sha384sum" | "sha384" => hex::encode(Sha384::digest(data)),
        "sha512sum" | "sha512" => hex::encode(Sha512::digest(data)),
        "md5sum" | "md5" => hex::encode(Md5::digest(data)),
        _ => hex::encode(Sha256::digest(data)),
    }
}

/// sha256sum / sha1sum / sha512sum / sha384sum / md5sum. Canonical output
/// `<hex>  <name>`, `-` for stdin.
pub struct DigestCommand {
    name: &'static str,
}

impl DigestCommand {
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }
}

#[async_trait]
impl Command for DigestCommand {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        let files: Vec<&String> = ctx.args.iter().filter(|a| !a.starts_with('-')).collect();
        if files.is_empty() {
            let hex = digest_hex(self.name, ctx.stdin.as_bytes());
            return CommandResult::success(format!("{}  -\n", hex));
        }

        let mut out = String::new();
        let mut err = String::new();
        let mut exit_code = 0;
        for file in files {
            let fs = match ctx.require_fs(self.name) {
                Ok(fs) => fs,
                Err(e) => return e,
            };
            let resolved = ctx.resolve(&fs, file);
            match fs.read_bytes(&resolved).await {
                Ok(bytes) => {
                    out.push_str(&format!("{}  {}\n", digest_hex(self.name, &bytes), file));
                }
                Err(_) => {
                    err.push_str(&format!(
                        "{}: {}: No such file or directory\n",
                        self.name, file
                    ));
                    exit_code = 1;
                }
            }
        }
        CommandResult::with_exit_code(out, err, exit_code)
    }
}

pub struct UuidgenCommand {
    name: &'static str,
}

impl UuidgenCommand {
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }
}

#[async_trait]
impl Command for UuidgenCommand {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn execute(&self, _ctx: CommandContext) -> CommandResult {
        CommandResult::success(format!("{}\n", uuid::Uuid::new_v4()))
    }
}

/// POSIX cksum: CRC-32 (polynomial 0x04C11DB7) over the data followed by
/// its length, complemented.
fn posix_crc(data: &[u8]) -> u32 {
    fn feed(crc: u32, byte: u8) -> u32 {
        let mut crc = crc ^ ((byte as u32) << 24);
        for _ in 0..8 {
            crc = if crc & 0x8000_0000 != 0 {
                (crc << 1) ^ 0x04C1_1DB7
            } else {
                crc << 1
            };
        }
        crc
    }
    let mut crc = 0u32;
    for &b in data {
        crc = feed(crc, b);
    }
    let mut len = data.len() as u64;
    while len != 0 {
        crc = feed(crc, (len & 0xff) as u8);
        len >>= 8;
    }
    !crc
}

pub struct CksumCommand;

#[async_trait]
impl Command for CksumCommand {
    fn name(&self) -> &'static str {
        "cksum"
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        match ctx.args.first() {
            None => {
                let data = ctx.stdin.as_bytes();
                CommandResult::success(format!("{} {}\n", posix_crc(data), data.len()))
            }
            Some(file) => {
                let fs = match ctx.require_fs("cksum") {
                    Ok(fs) => fs,
                    Err(e) => return e,
                };
                let resolved = ctx.resolve(&fs, file);
                match fs.read_bytes(&resolved).await {
                    Ok(bytes) => CommandResult::success(format!(
                        "{} {} {}\n",
                        posix_crc(&bytes),
                        bytes.len(),
                        file
                    )),
                    Err(_) => CommandResult::error(format!(
                        "cksum: {}: No such file or directory\n",
                        file
                    )),
                }
            }
        }
    }
}

/// BSD sum: rotating 16-bit checksum, 1024-byte block count.
fn bsd_sum(data: &[u8]) -> (u16, usize) {
    let mut checksum: u32 = 0;
    for &b in data {
        checksum = (checksum >> 1) + ((checksum & 1) << 15);
        checksum = (checksum + b as u32) & 0xffff;
    }
    let blocks = data.len().div_ceil(1024);
    (checksum as u16, blocks)
}

pub struct SumCommand;

#[async_trait]
impl Command for SumCommand {
    fn name(&self) -> &'static str {
        "sum"
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        let (checksum, blocks) = match ctx.args.first() {
            None => bsd_sum(ctx.stdin.as_bytes()),
            Some(file) => {
                let fs = match ctx.require_fs("sum") {
                    Ok(fs) => fs,
                    Err(e) => return e,
                };
                let resolved = ctx.resolve(&fs, file);
                match fs.read_bytes(&resolved).await {
                    Ok(bytes) => bsd_sum(&bytes),
                    Err(_) => {
                        return CommandResult::error(format!(
                            "sum: {}: No such file or directory\n",
                            file
                        ))
                    }
                }
            }
        };
        CommandResult::success(format!("{:05} {:5}\n", checksum, blocks))
    }
}

/// Narrow openssl: `rand -hex N`, `dgst -<algo> [-hex]`, `base64 [-d]`.
pub struct OpensslCommand;

#[async_trait]
impl Command for OpensslCommand {
    fn name(&self) -> &'static str {
        "openssl"
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        match ctx.args.first().map(String::as_str) {
            Some("rand") => {
                let hex_output = ctx.args.iter().any(|a| a == "-hex");
                let count: usize = match ctx
                    .args
                    .iter()
                    .skip(1)
                    .find(|a| !a.starts_with('-'))
                    .and_then(|n| n.parse().ok())
                {
                    Some(n) => n,
                    None => {
                        return CommandResult::error(
                            "openssl rand: missing byte count\n".to_string(),
                        )
                    }
                };
                let mut bytes = vec![0u8; count];
                rand::thread_rng().fill_bytes(&mut bytes);
                if hex_output {
                    CommandResult::success(format!("{}\n", hex::encode(bytes)))
                } else {
                    CommandResult::success(String::from_utf8_lossy(&bytes).to_string())
                }
            }
            Some("dgst") => {
                let algorithm = ctx
                    .args
                    .iter()
                    .skip(1)
                    .find_map(|a| match a.as_str() {
                        "-sha256" => Some("sha256"),
                        "-sha1" => Some("sha1"),
                        "-md5" => Some("md5"),
                        _ => None,
                    })
                    .unwrap_or("sha256");
                let hex = digest_hex(algorithm, ctx.stdin.as_bytes());
                CommandResult::success(format!("(stdin)= {}\n", hex))
            }
            Some("base64") => {
                use base64::Engine;
                let engine = base64::engine::general_purpose::STANDARD;
                if ctx.args.iter().any(|a| a == "-d") {
                    match engine.decode(ctx.stdin.trim().as_bytes()) {
                        Ok(bytes) => {
                            CommandResult::success(String::from_utf8_lossy(&bytes).to_string())
                        }
                        Err(_) => CommandResult::error(
                            "openssl base64: invalid input\n".to_string(),
                        ),
                    }
                } else {
                    CommandResult::success(format!(
                        "{}\n",
                        engine.encode(ctx.stdin.as_bytes())
                    ))
                }
            }
            Some(other) => CommandResult::error(format!(
                "openssl: unsupported command '{}'\n",
                other
            )),
            None => CommandResult::error("openssl: missing command\n".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::types::test_support::{ctx, ctx_with_files, ctx_with_stdin};

    #[tokio::test]
    async fn test_sha256sum_stdin() {
        let result = DigestCommand::new("sha256sum")
            .execute(ctx_with_stdin(vec![], "hello\n"))
            .await;
        assert_eq!(
            result.stdout,
            "5891b5b522d5df086d0ff0b110fbd9d21bb4fc7163af34d08286a2e846f6be03  -\n"
        );
    }

    #[tokio::test]
    async fn test_md5sum_stdin() {
        let result = DigestCommand::new("md5sum")
            .execute(ctx_with_stdin(vec![], "hello\n"))
            .await;
        assert_eq!(result.stdout, "b1946ac92492d2347c6235b4d2611184  -\n");
    }

    #[tokio::test]
    async fn test_sha1sum_file() {
        let c = ctx_with_files(vec!["/f.txt"], &[("/f.txt", "abc")]).await;
        let result = DigestCommand::new("sha1sum").execute(c).await;
        assert_eq!(
            result.stdout,
            "a9993e364706816aba3e25717850c26c9cd0d89d  /f.txt\n"
        );
    }

    #[tokio::test]
    async fn test_digest_missing_file() {
        let c = ctx_with_files(vec!["/none"], &[]).await;
        let result = DigestCommand::new("sha256sum").execute(c).await;
        assert_eq!(result.exit_code, 1);
        assert!(result.stderr.contains("No such file"));
    }

    #[tokio::test]
    async fn test_uuidgen_shape() {
        let result = UuidgenCommand::new("uuidgen").execute(ctx(vec![])).await;
        let id = result.stdout.trim();
        assert_eq!(id.len(), 36);
        assert_eq!(id.matches('-').count(), 4);
        // v4
        assert_eq!(&id[14..15], "4");
    }

    #[tokio::test]
    async fn test_uuidgen_unique() {
        let a = UuidgenCommand::new("uuid").execute(ctx(vec![])).await;
        let b = UuidgenCommand::new("uuid").execute(ctx(vec![])).await;
        assert_ne!(a.stdout, b.stdout);
    }

    #[test]
    fn test_posix_crc_reference_values() {
        assert_eq!(posix_crc(b""), 4294967295);
        assert_eq!(posix_crc(b"123456789"), 930766865);
        assert_eq!(posix_crc(b"hello\n"), 3015617425);
    }

    #[tokio::test]
    async fn test_cksum_stdin() {
        let result = CksumCommand.execute(ctx_with_stdin(vec![], "hello\n")).await;
        assert_eq!(result.stdout, "3015617425 6\n");
    }

    #[test]
    fn test_bsd_sum_reference() {
        assert_eq!(bsd_sum(b"hello\n").0, 36979);
    }

    #[tokio::test]
    async fn test_sum_stdin() {
        let result = SumCommand.execute(ctx_with_stdin(vec![], "hello\n")).await;
        assert_eq!(result.stdout, "36979     1\n");
    }

    #[tokio::test]
    async fn test_openssl_rand_hex() {
        let result = OpensslCommand
            .execute(ctx(vec!["rand", "-hex", "8"]))
            .await;
        assert_eq!(result.stdout.trim().len(), 16);
        assert!(result.stdout.trim().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn test_openssl_dgst() {
        let result = OpensslCommand
            .execute(ctx_with_stdin(vec!["dgst", "-sha256"], "hello\n"))
            .await;
        assert_eq!(
            result.stdout,
            "(stdin)= 5891b5b522d5df086d0ff0b110fbd9d21bb4fc7163af34d08286a2e846f6be03\n"
        );
    }

    #[tokio::test]
    async fn test_openssl_base64_round_trip() {
        let encoded = OpensslCommand
            .execute(ctx_with_stdin(vec!["base64"], "hi"))
            .await;
        assert_eq!(encoded.stdout, "aGk=\n");
        let decoded = OpensslCommand
            .execute(ctx_with_stdin(vec!["base64", "-d"], "aGk=\n"))
            .await;
        assert_eq!(decoded.stdout, "hi");
    }

    #[tokio::test]
    async fn test_openssl_unsupported() {
        let result = OpensslCommand.execute(ctx(vec!["s_client"])).await;
        assert_eq!(result.exit_code, 1);
    }
}
