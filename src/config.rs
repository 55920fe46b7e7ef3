//! Synthesis of the per-domain `openssl.cnf` handed to the toolkit for
//! CSR generation and signing.

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "openssl.cnf";

/// Directory basename for a domain: a leading `*.` wildcard marker is
/// stripped, so `*.example.com` and `example.com` share one directory.
pub fn base_name(domain: &str) -> &str {
    domain.strip_prefix("*.").unwrap_or(domain)
}

/// Alt-name list with the main domain guaranteed present: prepended when
/// missing, untouched when already listed. Input order is preserved.
pub fn with_primary(domain: &str, alt_names: &[String]) -> Vec<String> {
    let mut names: Vec<String> = alt_names.to_vec();
    if !names.iter().any(|name| name == domain) {
        names.insert(0, domain.to_owned());
    }
    names
}

pub struct DnFields<'a> {
    pub country: &'a str,
    pub state: &'a str,
    pub locality: &'a str,
    pub organization: &'a str,
    pub organizational_unit: &'a str,
}

/// Contents of a generated `openssl.cnf`: distinguished-name block with
/// the input domain as common name, plus the ordered SAN list.
pub struct DomainConfig<'a> {
    pub common_name: &'a str,
    pub dn: DnFields<'a>,
    pub alt_names: &'a [String],
}

impl DomainConfig<'_> {
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(
            "[ req ]\n\
             default_bits       = 2048\n\
             distinguished_name = req_distinguished_name\n\
             req_extensions     = req_ext\n\
             x509_extensions    = v3_req\n\
             prompt             = no\n\n",
        );
        let _ = write!(
            out,
            "[ req_distinguished_name ]\n\
             C  = {}\n\
             ST = {}\n\
             L  = {}\n\
             O  = {}\n\
             OU = {}\n\
             CN = {}\n\n",
            self.dn.country,
            self.dn.state,
            self.dn.locality,
            self.dn.organization,
            self.dn.organizational_unit,
            self.common_name,
        );
        out.push_str(
            "[ req_ext ]\n\
             subjectAltName = @alt_names\n\n\
             [ v3_req ]\n\
             subjectAltName = @alt_names\n\n\
             [ alt_names ]\n",
        );
        for (i, alt_name) in self.alt_names.iter().enumerate() {
            let _ = writeln!(out, "DNS.{} = {}", i + 1, alt_name);
        }
        out
    }

    /// Write `openssl.cnf` into the domain directory, overwriting any
    /// previous generation, and return its path.
    pub fn write_to(&self, dir: &Path) -> io::Result<PathBuf> {
        let path = dir.join(CONFIG_FILE_NAME);
        fs::write(&path, self.render())?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn dn() -> DnFields<'static> {
        DnFields {
            country: "US",
            state: "State",
            locality: "City",
            organization: "Local",
            organizational_unit: "Development",
        }
    }

    fn names(ss: &[&str]) -> Vec<String> {
        ss.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn base_name_is_identity_without_wildcard() {
        assert_eq!(base_name("example.com"), "example.com");
    }

    #[test]
    fn base_name_strips_leading_wildcard_marker() {
        assert_eq!(base_name("*.example.com"), "example.com");
    }

    #[test]
    fn with_primary_prepends_missing_domain() {
        let list = with_primary("example.com", &names(&["a.example.com", "b.example.com"]));
        assert_eq!(list, names(&["example.com", "a.example.com", "b.example.com"]));
    }

    #[test]
    fn with_primary_keeps_list_when_domain_present() {
        let input = names(&["a.example.com", "example.com"]);
        assert_eq!(with_primary("example.com", &input), input);
    }

    #[test]
    fn render_numbers_alt_names_in_input_order() {
        let alt_names = names(&["a", "b", "c"]);
        let config = DomainConfig {
            common_name: "example.com",
            dn: dn(),
            alt_names: &alt_names,
        };
        let rendered = config.render();
        let dns_lines: Vec<&str> = rendered
            .lines()
            .filter(|line| line.starts_with("DNS."))
            .collect();
        assert_eq!(dns_lines, ["DNS.1 = a", "DNS.2 = b", "DNS.3 = c"]);
    }

    #[test]
    fn render_uses_domain_as_common_name() {
        let alt_names = names(&["*.example.com"]);
        let config = DomainConfig {
            common_name: "*.example.com",
            dn: dn(),
            alt_names: &alt_names,
        };
        let rendered = config.render();
        assert!(rendered.contains("CN = *.example.com\n"));
        assert!(rendered.contains("subjectAltName = @alt_names"));
    }

    #[test]
    fn wildcard_example_run_alt_name_list() {
        let supplied = names(&["admin.example.com", "*.app.example.com"]);
        let list = with_primary("*.example.com", &supplied);
        assert_eq!(
            list,
            names(&["*.example.com", "admin.example.com", "*.app.example.com"])
        );
        let config = DomainConfig {
            common_name: "*.example.com",
            dn: dn(),
            alt_names: &list,
        };
        let rendered = config.render();
        assert!(rendered.contains("DNS.1 = *.example.com\n"));
        assert!(rendered.contains("DNS.2 = admin.example.com\n"));
        assert!(rendered.contains("DNS.3 = *.app.example.com\n"));
    }

    #[test]
    fn write_to_places_config_in_domain_directory() {
        let dir = tempdir().unwrap();
        let alt_names = names(&["example.com"]);
        let config = DomainConfig {
            common_name: "example.com",
            dn: dn(),
            alt_names: &alt_names,
        };

        let path = config.write_to(dir.path()).unwrap();

        assert_eq!(path, dir.path().join("openssl.cnf"));
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, config.render());
    }
}
