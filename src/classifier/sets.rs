//! Static command sets. Identity is fixed for the process lifetime; the
//! native-lane registries are asserted against these in tests so the two
//! never drift.

use std::collections::HashSet;

use lazy_static::lazy_static;

lazy_static! {
    /// Commands that need the filesystem capability. Without one they are
    /// downgraded to the sandbox lane at classification time.
    /// `[` is served by the same handler as `test` but is not listed here:
    /// the command-name grammar cannot produce it, so it can never reach
    /// the fast path by name.
    pub static ref TIER1_FS_COMMANDS: HashSet<&'static str> = [
        "cat", "ls", "head", "tail", "test", "stat", "readlink", "find", "grep",
        "mkdir", "rmdir", "rm", "cp", "mv", "touch", "truncate", "ln", "chmod", "chown",
    ]
    .into_iter()
    .collect();

    pub static ref TIER1_HTTP_COMMANDS: HashSet<&'static str> =
        ["curl", "wget"].into_iter().collect();

    pub static ref TIER1_DATA_COMMANDS: HashSet<&'static str> =
        ["jq", "yq", "base64", "envsubst"].into_iter().collect();

    pub static ref TIER1_CRYPTO_COMMANDS: HashSet<&'static str> = [
        "sha256sum", "sha1sum", "sha512sum", "sha384sum", "md5sum",
        "uuidgen", "uuid", "cksum", "sum", "openssl",
    ]
    .into_iter()
    .collect();

    pub static ref TIER1_TEXT_COMMANDS: HashSet<&'static str> =
        ["sed", "awk", "diff", "patch", "tee", "xargs"].into_iter().collect();

    pub static ref TIER1_POSIX_COMMANDS: HashSet<&'static str> = [
        "cut", "sort", "tr", "uniq", "wc", "basename", "dirname", "date", "dd", "od", "shuf",
    ]
    .into_iter()
    .collect();

    pub static ref TIER1_SYSTEM_COMMANDS: HashSet<&'static str> =
        ["yes", "whoami", "hostname", "printenv"].into_iter().collect();

    pub static ref TIER1_EXTENDED_COMMANDS: HashSet<&'static str> =
        ["env", "id", "uname", "tac"].into_iter().collect();

    pub static ref TIER1_COMPUTE_COMMANDS: HashSet<&'static str> = [
        "true", "false", "pwd", "echo", "printf", "seq", "expr", "bc", "sleep", "timeout", "rev",
    ]
    .into_iter()
    .collect();

    /// Union of all native sets.
    pub static ref TIER1_NATIVE_COMMANDS: HashSet<&'static str> = {
        let mut all = HashSet::new();
        for set in [
            &*TIER1_FS_COMMANDS,
            &*TIER1_HTTP_COMMANDS,
            &*TIER1_DATA_COMMANDS,
            &*TIER1_CRYPTO_COMMANDS,
            &*TIER1_TEXT_COMMANDS,
            &*TIER1_POSIX_COMMANDS,
            &*TIER1_SYSTEM_COMMANDS,
            &*TIER1_EXTENDED_COMMANDS,
            &*TIER1_COMPUTE_COMMANDS,
        ] {
            all.extend(set.iter().copied());
        }
        all
    };

    /// Read-only npm subcommands served natively from the registry.
    pub static ref TIER1_NPM_NATIVE_SUBCOMMANDS: HashSet<&'static str> =
        ["view", "info", "show", "search", "find", "s"].into_iter().collect();

    /// Modules that a worker loader can usually provide.
    pub static ref TIER3_LOADABLE_MODULES: HashSet<&'static str> = [
        "prettier", "esbuild", "terser", "eslint", "marked", "typescript",
    ]
    .into_iter()
    .collect();

    /// Known-expensive commands that always need the full sandbox.
    pub static ref TIER4_SANDBOX_COMMANDS: HashSet<&'static str> = [
        "apt", "apt-get", "apk", "yum", "dnf", "docker", "podman", "kubectl",
        "make", "cmake", "gcc", "g++", "clang", "cargo", "rustc", "go",
        "javac", "mvn", "gradle", "ssh", "scp", "rsync", "systemctl", "service",
        "mount", "umount", "sudo", "su", "chroot", "ps", "top", "htop",
        "kill", "killall", "bash", "sh", "zsh",
    ]
    .into_iter()
    .collect();
}

/// The capability tag for a native command name, if any.
pub fn native_capability(name: &str) -> Option<&'static str> {
    if TIER1_FS_COMMANDS.contains(name) {
        Some("fs")
    } else if TIER1_HTTP_COMMANDS.contains(name) {
        Some("http")
    } else if TIER1_DATA_COMMANDS.contains(name) {
        Some("data")
    } else if TIER1_CRYPTO_COMMANDS.contains(name) {
        Some("crypto")
    } else if TIER1_TEXT_COMMANDS.contains(name) {
        Some("text")
    } else if TIER1_POSIX_COMMANDS.contains(name) {
        Some("posix")
    } else if TIER1_SYSTEM_COMMANDS.contains(name) {
        Some("system")
    } else if TIER1_EXTENDED_COMMANDS.contains(name) {
        Some("extended")
    } else if TIER1_COMPUTE_COMMANDS.contains(name) {
        Some("compute")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_name_in_two_classes() {
        let sets = [
            &*TIER1_FS_COMMANDS,
            &*TIER1_HTTP_COMMANDS,
            &*TIER1_DATA_COMMANDS,
            &*TIER1_CRYPTO_COMMANDS,
            &*TIER1_TEXT_COMMANDS,
            &*TIER1_POSIX_COMMANDS,
            &*TIER1_SYSTEM_COMMANDS,
            &*TIER1_EXTENDED_COMMANDS,
            &*TIER1_COMPUTE_COMMANDS,
        ];
        let total: usize = sets.iter().map(|s| s.len()).sum();
        assert_eq!(total, TIER1_NATIVE_COMMANDS.len());
    }

    #[test]
    fn test_capability_lookup() {
        assert_eq!(native_capability("echo"), Some("compute"));
        assert_eq!(native_capability("cat"), Some("fs"));
        assert_eq!(native_capability("curl"), Some("http"));
        assert_eq!(native_capability("sha256sum"), Some("crypto"));
        assert_eq!(native_capability("docker"), None);
        assert_eq!(native_capability("nope"), None);
    }

    #[test]
    fn test_sandbox_set_disjoint_from_native() {
        for name in TIER4_SANDBOX_COMMANDS.iter() {
            assert!(
                !TIER1_NATIVE_COMMANDS.contains(name),
                "{} is in both the native and sandbox sets",
                name
            );
        }
    }
}
