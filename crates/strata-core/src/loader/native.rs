//! Out-of-process decryptor.
//!
//! Runs an external binary speaking the `decrypt-file` protocol:
//!
//! ```text
//! <binary> decrypt-file --file <artifact> --domain <local|distribution>
//! ```
//!
//! The passphrase travels in the child's environment (never argv), the
//! plaintext JSON comes back on stdout, and exit status 0 means success.
//! The child is killed once the timeout elapses, and its output must arrive
//! within the same deadline.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use super::decryptor::Decryptor;
use super::{DISTRIBUTION_KEY_ENV, LOCAL_KEY_ENV};
use crate::domain::Domain;
use crate::error::{Result, StrataError};

/// Default upper bound on one native decrypt.
pub const DEFAULT_NATIVE_TIMEOUT: Duration = Duration::from_secs(10);

const POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Clone)]
pub struct NativeDecryptor {
    binary: PathBuf,
    timeout: Duration,
}

impl NativeDecryptor {
    pub fn new(binary: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    fn key_env(domain: Domain) -> Result<&'static str> {
        match domain {
            Domain::Local => Ok(LOCAL_KEY_ENV),
            Domain::Distribution => Ok(DISTRIBUTION_KEY_ENV),
            Domain::Wrapper => Err(StrataError::NativeDecryptor(
                "the wrapper domain has no artifacts".to_string(),
            )),
        }
    }

    fn timed_out(&self) -> StrataError {
        StrataError::NativeDecryptor(format!("timed out after {} ms", self.timeout.as_millis()))
    }

    fn wait_until(&self, child: &mut Child, deadline: Instant) -> Result<ExitStatus> {
        loop {
            let polled = match child.try_wait() {
                Ok(polled) => polled,
                Err(err) => {
                    reap(child);
                    return Err(err.into());
                }
            };
            if let Some(status) = polled {
                return Ok(status);
            }
            if Instant::now() >= deadline {
                reap(child);
                return Err(self.timed_out());
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

fn reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

impl Decryptor for NativeDecryptor {
    fn name(&self) -> &'static str {
        "native"
    }

    fn decrypt(
        &self,
        artifact: &Path,
        passphrase: &SecretString,
        domain: Domain,
    ) -> Result<Vec<u8>> {
        if !self.binary.is_file() {
            return Err(StrataError::NativeDecryptor(format!(
                "binary not found: {}",
                self.binary.display()
            )));
        }

        let mut child = Command::new(&self.binary)
            .arg("decrypt-file")
            .arg("--file")
            .arg(artifact)
            .arg("--domain")
            .arg(domain.as_str())
            .env(Self::key_env(domain)?, passphrase.expose_secret())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| StrataError::NativeDecryptor(format!("spawn failed: {}", e)))?;

        let deadline = Instant::now() + self.timeout;

        // Drain stdout on a helper thread so a large payload cannot block the
        // child. If a grandchild keeps the pipe open past the deadline, the
        // reader thread is abandoned.
        let mut stdout = match child.stdout.take() {
            Some(stdout) => stdout,
            None => {
                reap(&mut child);
                return Err(StrataError::NativeDecryptor("stdout not captured".to_string()));
            }
        };
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = tx.send(stdout.read_to_end(&mut buf).map(|_| buf));
        });

        let status = self.wait_until(&mut child, deadline)?;
        let output = match rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
            Ok(read) => read?,
            Err(mpsc::RecvTimeoutError::Timeout) => return Err(self.timed_out()),
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                return Err(StrataError::NativeDecryptor("stdout reader panicked".to_string()))
            }
        };

        if !status.success() {
            return Err(StrataError::NativeDecryptor(format!(
                "exited with {}",
                status
            )));
        }
        debug!(bytes = output.len(), "native decryptor returned output");
        Ok(output)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
        path
    }

    fn secret() -> SecretString {
        SecretString::from("test-passphrase-secure-123".to_string())
    }

    #[test]
    fn test_stdout_returned_and_key_passed_by_env() {
        let temp = tempfile::tempdir().unwrap();
        let bin = script(
            temp.path(),
            "echo-key",
            &format!("printf '{{\"key\":\"%s\",\"arg\":\"%s\"}}' \"${}\" \"$1\"", LOCAL_KEY_ENV),
        );
        let native = NativeDecryptor::new(bin, Duration::from_secs(5));
        let out = native
            .decrypt(Path::new("/nonexistent.enc"), &secret(), Domain::Local)
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["key"], "test-passphrase-secure-123");
        assert_eq!(value["arg"], "decrypt-file");
    }

    #[test]
    fn test_non_zero_exit_is_error() {
        let temp = tempfile::tempdir().unwrap();
        let bin = script(temp.path(), "fail", "echo '{}'; exit 1");
        let native = NativeDecryptor::new(bin, Duration::from_secs(5));
        assert!(matches!(
            native.decrypt(Path::new("x.enc"), &secret(), Domain::Local),
            Err(StrataError::NativeDecryptor(_))
        ));
    }

    #[test]
    fn test_timeout_kills_child() {
        let temp = tempfile::tempdir().unwrap();
        let bin = script(temp.path(), "slow", "exec sleep 30");
        let native = NativeDecryptor::new(bin, Duration::from_millis(200));
        let started = Instant::now();
        let result = native.decrypt(Path::new("x.enc"), &secret(), Domain::Local);
        assert!(matches!(result, Err(StrataError::NativeDecryptor(msg)) if msg.contains("timed out")));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn test_inherited_stdout_does_not_outlive_timeout() {
        let temp = tempfile::tempdir().unwrap();
        let bin = script(temp.path(), "forks", "sleep 5 &\nprintf '{}'");
        let native = NativeDecryptor::new(bin, Duration::from_millis(300));
        let started = Instant::now();
        let result = native.decrypt(Path::new("x.enc"), &secret(), Domain::Local);
        assert!(matches!(result, Err(StrataError::NativeDecryptor(msg)) if msg.contains("timed out")));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn test_missing_binary() {
        let native = NativeDecryptor::new("/definitely/not/here", DEFAULT_NATIVE_TIMEOUT);
        assert!(native
            .decrypt(Path::new("x.enc"), &secret(), Domain::Local)
            .is_err());
    }
}
