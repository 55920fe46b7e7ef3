use crate::config::{self, DnFields, DomainConfig};
use crate::openssl;
use crate::prompt;
use anyhow::{Context, Result, bail};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DOMAINS_DIR: &str = "domains";

/// Shared parameters for every issuance flow, resolved from the CLI.
#[derive(Debug)]
pub struct IssueParams<'a> {
    pub workdir: &'a Path,
    pub ca_name: &'a str,
    pub ca_passphrase: Option<&'a str>,
    pub expires_in: Duration,
    pub ca_expires_in: Duration,
    pub organization: &'a str,
    pub country: &'a str,
    pub state: &'a str,
    pub locality: &'a str,
}

/// Root CA artifact locations under the base output directory.
pub struct RootCaPaths {
    pub key: PathBuf,
    pub cert: PathBuf,
    pub pem: PathBuf,
}

impl RootCaPaths {
    pub fn in_dir(dir: &Path, name: &str) -> Self {
        Self {
            key: dir.join(format!("{name}.key")),
            cert: dir.join(format!("{name}.crt")),
            pem: dir.join(format!("{name}.pem")),
        }
    }

    /// Existence-only check; contents are never validated.
    pub fn all_exist(&self) -> bool {
        self.key.exists() && self.cert.exists() && self.pem.exists()
    }
}

/// Per-domain artifact locations, keyed by the wildcard-stripped base name.
pub struct DomainPaths {
    pub dir: PathBuf,
    pub config: PathBuf,
    pub key: PathBuf,
    pub csr: PathBuf,
    pub cert: PathBuf,
}

impl DomainPaths {
    pub fn for_domain(workdir: &Path, domain: &str) -> Self {
        let base = config::base_name(domain);
        let dir = workdir.join(DOMAINS_DIR).join(base);
        Self {
            config: dir.join(config::CONFIG_FILE_NAME),
            key: dir.join(format!("{base}.key")),
            csr: dir.join(format!("{base}.csr")),
            cert: dir.join(format!("{base}.crt")),
            dir,
        }
    }
}

/// `root-ca` subcommand: create the root CA material and stop.
pub fn handle_root_ca(params: &IssueParams) -> Result<()> {
    openssl::ensure_available()?;
    let ca = RootCaPaths::in_dir(params.workdir, params.ca_name);
    if ca.all_exist() {
        println!("Root CA material already present:");
        println!("  {}", ca.key.display());
        println!("  {}", ca.cert.display());
        println!("  {}", ca.pem.display());
        return Ok(());
    }
    let passphrase = resolve_passphrase(params)?;
    create_root_ca(params, &ca, &passphrase)
}

/// `issue` subcommand: the full driver flow. Prompts fill whatever the
/// flags left out; operator-declined steps abort with a message.
pub fn handle(
    params: &IssueParams,
    domain: Option<String>,
    alt_names: Option<Vec<String>>,
) -> Result<()> {
    openssl::ensure_available()?;
    print_banner();

    let ca = RootCaPaths::in_dir(params.workdir, params.ca_name);
    let passphrase;
    if ca.all_exist() {
        passphrase = resolve_passphrase(params)?;
    } else {
        if !prompt::confirm("Root CA certificate not found. Do you want to create it?")? {
            println!("Cannot proceed without root CA certificate.");
            return Ok(());
        }
        passphrase = resolve_passphrase(params)?;
        create_root_ca(params, &ca, &passphrase)?;
    }

    let domain = match domain {
        Some(d) => d.trim().to_owned(),
        None => prompt::line("Enter the main domain (e.g., example.com or *.example.com): ")?,
    };
    if domain.is_empty() {
        println!("Domain cannot be empty!");
        return Ok(());
    }

    let supplied = match alt_names {
        Some(list) => list,
        None => {
            println!("\nEnter alternate domain names (comma-separated)");
            println!("Examples:");
            println!("- For wildcard subdomains: *.app.example.com");
            println!("- For specific domains: admin.example.com");
            prompt::csv_list("Alternate names: ")?
        }
    };
    let supplied: Vec<String> = supplied
        .iter()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
        .collect();
    let alt_names = config::with_primary(&domain, &supplied);

    let paths = DomainPaths::for_domain(params.workdir, &domain);
    if !paths.dir.exists() {
        fs::create_dir_all(&paths.dir)
            .with_context(|| format!("create directory {}", paths.dir.display()))?;
        println!("Created directory: {}", paths.dir.display());
    }

    let cnf = DomainConfig {
        common_name: &domain,
        dn: DnFields {
            country: params.country,
            state: params.state,
            locality: params.locality,
            organization: params.organization,
            organizational_unit: "Development",
        },
        alt_names: &alt_names,
    };
    cnf.write_to(&paths.dir)
        .with_context(|| format!("write {}", paths.config.display()))?;
    println!("Generated OpenSSL config: {}", paths.config.display());

    issue_domain(params, &ca, &paths, &passphrase)?;
    report_completion(&domain);
    Ok(())
}

/// Root CA issuance: key, self-signed certificate, PEM copy. Each step
/// checks the toolkit's exit status before the next runs.
pub fn create_root_ca(
    params: &IssueParams,
    ca: &RootCaPaths,
    passphrase: &str,
) -> Result<()> {
    println!("Creating root CA certificate...");
    if let Some(parent) = ca.key.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    openssl::generate_ca_key(&ca.key, passphrase).context("generate root CA key")?;
    openssl::self_sign_ca(
        &ca.key,
        &ca.cert,
        &ca_subject(params),
        days(params.ca_expires_in),
        passphrase,
    )
    .context("self-sign root CA certificate")?;
    openssl::convert_to_pem(&ca.cert, &ca.pem).context("convert root CA certificate to PEM")?;
    println!("\nRoot CA created successfully!");
    println!(
        "Location: {}, {} and {}",
        ca.key.display(),
        ca.cert.display(),
        ca.pem.display()
    );
    Ok(())
}

/// Leaf issuance: key, CSR bound to the generated config, CA-signed
/// certificate with `v3_req` extensions.
pub fn issue_domain(
    params: &IssueParams,
    ca: &RootCaPaths,
    paths: &DomainPaths,
    passphrase: &str,
) -> Result<()> {
    openssl::generate_key(&paths.key).context("generate domain key")?;
    println!("Generated key: {}", paths.key.display());

    openssl::generate_csr(&paths.key, &paths.config, &paths.csr)
        .context("generate certificate signing request")?;
    println!("Generated CSR: {}", paths.csr.display());

    openssl::sign_certificate(
        &paths.csr,
        &ca.cert,
        &ca.key,
        passphrase,
        &paths.config,
        &paths.cert,
        days(params.expires_in),
    )
    .context("sign domain certificate")?;
    println!("Generated Certificate: {}", paths.cert.display());
    Ok(())
}

fn resolve_passphrase(params: &IssueParams) -> Result<String> {
    match params.ca_passphrase {
        Some(p) if !p.is_empty() => Ok(p.to_owned()),
        _ => {
            let p = prompt::line("Root CA key passphrase: ")?;
            if p.is_empty() {
                bail!("root CA passphrase cannot be empty");
            }
            Ok(p)
        }
    }
}

fn ca_subject(params: &IssueParams) -> String {
    format!(
        "/C={}/ST={}/L={}/O={} CA/OU=Development/CN={}",
        params.country, params.state, params.locality, params.organization, params.ca_name,
    )
}

/// Whole days for the toolkit's `-days` argument; never below one.
fn days(validity: Duration) -> u64 {
    (validity.as_secs() / 86_400).max(1)
}

fn print_banner() {
    println!("\nCertificate Generator with Wildcard Support");
    println!("-----------------------------------------");
    println!("For wildcard certificates, use the following format:");
    println!("- Main domain: example.com");
    println!("- To include wildcard: *.example.com");
    println!("Example alternate names: ");
    println!("- *.subdomain.example.com");
    println!("- specific.example.com\n");
}

fn report_completion(domain: &str) {
    println!("\nCertificate generation complete!");
    println!("\nUsage Instructions:");
    println!("1. Your certificate files are in the '{DOMAINS_DIR}' directory");
    if domain.contains('*') {
        println!("2. This wildcard certificate will work for all subdomains at the specified level");
        println!("   For example, if your domain is *.example.com, it will work for:");
        println!("   - test.example.com");
        println!("   - dev.example.com");
        println!("   But NOT for: sub.test.example.com (different level)");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn root_ca_paths_use_the_ca_basename() {
        let ca = RootCaPaths::in_dir(Path::new("/tmp/out"), "LocalRootCA");
        assert_eq!(ca.key, Path::new("/tmp/out/LocalRootCA.key"));
        assert_eq!(ca.cert, Path::new("/tmp/out/LocalRootCA.crt"));
        assert_eq!(ca.pem, Path::new("/tmp/out/LocalRootCA.pem"));
    }

    #[test]
    fn root_ca_exists_only_when_all_three_files_do() {
        let dir = tempdir().unwrap();
        let ca = RootCaPaths::in_dir(dir.path(), "LocalRootCA");
        assert!(!ca.all_exist());

        fs::write(&ca.key, "key").unwrap();
        fs::write(&ca.cert, "crt").unwrap();
        assert!(!ca.all_exist());

        fs::write(&ca.pem, "pem").unwrap();
        assert!(ca.all_exist());
    }

    #[test]
    fn domain_paths_for_plain_domain() {
        let paths = DomainPaths::for_domain(Path::new("/tmp/out"), "example.com");
        assert_eq!(paths.dir, Path::new("/tmp/out/domains/example.com"));
        assert_eq!(
            paths.config,
            Path::new("/tmp/out/domains/example.com/openssl.cnf")
        );
        assert_eq!(
            paths.key,
            Path::new("/tmp/out/domains/example.com/example.com.key")
        );
        assert_eq!(
            paths.csr,
            Path::new("/tmp/out/domains/example.com/example.com.csr")
        );
        assert_eq!(
            paths.cert,
            Path::new("/tmp/out/domains/example.com/example.com.crt")
        );
    }

    #[test]
    fn domain_paths_strip_wildcard_marker() {
        let wildcard = DomainPaths::for_domain(Path::new("/tmp/out"), "*.example.com");
        let plain = DomainPaths::for_domain(Path::new("/tmp/out"), "example.com");
        assert_eq!(wildcard.dir, plain.dir);
        assert_eq!(wildcard.cert, plain.cert);
    }

    #[test]
    fn days_rounds_down_but_never_below_one() {
        assert_eq!(days(Duration::from_secs(365 * 86_400)), 365);
        assert_eq!(days(Duration::from_secs(86_400 + 3_600)), 1);
        assert_eq!(days(Duration::from_secs(60)), 1);
    }

    #[test]
    fn ca_subject_contains_all_dn_fields() {
        let params = IssueParams {
            workdir: Path::new("."),
            ca_name: "LocalRootCA",
            ca_passphrase: None,
            expires_in: Duration::from_secs(365 * 86_400),
            ca_expires_in: Duration::from_secs(3650 * 86_400),
            organization: "Local",
            country: "US",
            state: "State",
            locality: "City",
        };
        assert_eq!(
            ca_subject(&params),
            "/C=US/ST=State/L=City/O=Local CA/OU=Development/CN=LocalRootCA"
        );
    }
}
