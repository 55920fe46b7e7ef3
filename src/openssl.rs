//! Thin wrapper around the external `openssl` command-line toolkit.
//!
//! All cryptography is delegated to `openssl`; this module only shapes
//! argument lists, runs the subprocess, and turns a non-zero exit status
//! into a step-tagged error carrying the captured stderr.

use std::io;
use std::path::Path;
use std::process::{Command, ExitStatus};
use thiserror::Error;

pub const TOOL: &str = "openssl";

const CA_KEY_BITS: &str = "4096";
const LEAF_KEY_BITS: &str = "2048";

/// The issuance step a failed invocation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    CaKeyGen,
    CaSelfSign,
    PemConvert,
    KeyGen,
    CsrGen,
    Sign,
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Step::CaKeyGen => "root CA key generation",
            Step::CaSelfSign => "root CA self-signing",
            Step::PemConvert => "PEM conversion",
            Step::KeyGen => "key generation",
            Step::CsrGen => "CSR generation",
            Step::Sign => "certificate signing",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum OpensslError {
    #[error("openssl is not installed or not available in system PATH")]
    ToolMissing,
    #[error("failed to launch {TOOL}: {0}")]
    Spawn(io::Error),
    #[error("{step} failed ({status}): {stderr}")]
    Step {
        step: Step,
        status: ExitStatus,
        stderr: String,
    },
}

/// Check that the toolkit resolves on the search path.
pub fn ensure_available() -> Result<(), OpensslError> {
    probe(TOOL)
}

fn probe(program: &str) -> Result<(), OpensslError> {
    match Command::new(program).arg("version").output() {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(OpensslError::ToolMissing),
        Err(e) => Err(OpensslError::Spawn(e)),
    }
}

fn run(step: Step, cmd: &mut Command) -> Result<(), OpensslError> {
    let output = cmd.output().map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => OpensslError::ToolMissing,
        _ => OpensslError::Spawn(e),
    })?;
    if output.status.success() {
        return Ok(());
    }
    Err(OpensslError::Step {
        step,
        status: output.status,
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
    })
}

fn pass_arg(passphrase: &str) -> String {
    format!("pass:{passphrase}")
}

/// `openssl genrsa -des3`: passphrase-protected 4096-bit root CA key.
pub fn generate_ca_key(key: &Path, passphrase: &str) -> Result<(), OpensslError> {
    run(
        Step::CaKeyGen,
        Command::new(TOOL)
            .args(["genrsa", "-des3", "-passout"])
            .arg(pass_arg(passphrase))
            .arg("-out")
            .arg(key)
            .arg(CA_KEY_BITS),
    )
}

/// `openssl req -x509`: self-signed root certificate for the CA key.
pub fn self_sign_ca(
    key: &Path,
    cert: &Path,
    subject: &str,
    days: u64,
    passphrase: &str,
) -> Result<(), OpensslError> {
    run(
        Step::CaSelfSign,
        Command::new(TOOL)
            .args(["req", "-x509", "-new", "-nodes", "-key"])
            .arg(key)
            .args(["-sha256", "-days"])
            .arg(days.to_string())
            .arg("-passin")
            .arg(pass_arg(passphrase))
            .arg("-out")
            .arg(cert)
            .arg("-subj")
            .arg(subject),
    )
}

/// `openssl x509 -outform PEM`: PEM-encoded copy of the root certificate.
pub fn convert_to_pem(cert: &Path, pem: &Path) -> Result<(), OpensslError> {
    run(
        Step::PemConvert,
        Command::new(TOOL)
            .args(["x509", "-in"])
            .arg(cert)
            .arg("-out")
            .arg(pem)
            .args(["-outform", "PEM"]),
    )
}

/// `openssl genrsa`: 2048-bit leaf private key.
pub fn generate_key(key: &Path) -> Result<(), OpensslError> {
    run(
        Step::KeyGen,
        Command::new(TOOL)
            .args(["genrsa", "-out"])
            .arg(key)
            .arg(LEAF_KEY_BITS),
    )
}

/// `openssl req -new`: CSR bound to the leaf key and generated config.
pub fn generate_csr(key: &Path, config: &Path, csr: &Path) -> Result<(), OpensslError> {
    run(
        Step::CsrGen,
        Command::new(TOOL)
            .args(["req", "-new", "-key"])
            .arg(key)
            .arg("-out")
            .arg(csr)
            .arg("-config")
            .arg(config),
    )
}

/// `openssl x509 -req`: root-CA-signed certificate with `v3_req` extensions.
pub fn sign_certificate(
    csr: &Path,
    ca_cert: &Path,
    ca_key: &Path,
    passphrase: &str,
    config: &Path,
    cert: &Path,
    days: u64,
) -> Result<(), OpensslError> {
    run(
        Step::Sign,
        Command::new(TOOL)
            .args(["x509", "-req", "-in"])
            .arg(csr)
            .arg("-CA")
            .arg(ca_cert)
            .arg("-CAkey")
            .arg(ca_key)
            .arg("-passin")
            .arg(pass_arg(passphrase))
            .args(["-CAcreateserial", "-out"])
            .arg(cert)
            .arg("-days")
            .arg(days.to_string())
            .args(["-sha256", "-extfile"])
            .arg(config)
            .args(["-extensions", "v3_req"]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_reports_missing_tool() {
        let err = probe("localca-no-such-tool").unwrap_err();
        assert!(matches!(err, OpensslError::ToolMissing));
    }

    #[cfg(unix)]
    #[test]
    fn run_tags_failures_with_step_and_stderr() {
        let err = run(
            Step::Sign,
            Command::new("sh").args(["-c", "echo boom >&2; exit 3"]),
        )
        .unwrap_err();
        match err {
            OpensslError::Step { step, stderr, .. } => {
                assert_eq!(step, Step::Sign);
                assert_eq!(stderr, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn step_names_are_user_facing() {
        assert_eq!(Step::CsrGen.to_string(), "CSR generation");
        assert_eq!(Step::CaKeyGen.to_string(), "root CA key generation");
    }
}
