use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
pub struct GlobalCommonArgs {
    #[arg(
        short,
        long,
        global = true,
        help = "base output directory for all generated artifacts",
        default_value = "./",
        value_name = "DIR",
        value_hint = clap::ValueHint::DirPath,
    )]
    pub workdir: PathBuf,
    #[arg(
        long,
        global = true,
        default_value = "LocalRootCA",
        help = "basename for the root CA key/certificate files",
        value_name = "STRING"
    )]
    pub ca_name: String,
    #[arg(
        long,
        global = true,
        default_value = None,
        help = "passphrase protecting the root CA private key (prompted when omitted)",
        value_name = "STRING"
    )]
    pub ca_passphrase: Option<String>,
    #[arg(
        short,
        long,
        global = true,
        default_value = "365days",
        value_parser = humantime::parse_duration,
        help = "leaf certificate validity",
        value_name = "DURATION",
    )]
    pub expires: std::time::Duration,
    #[arg(
        long,
        global = true,
        default_value = "3650days",
        value_parser = humantime::parse_duration,
        help = "root CA certificate validity",
        value_name = "DURATION",
    )]
    pub ca_expires: std::time::Duration,
    #[arg(
        long,
        global = true,
        default_value = "Local",
        help = "organization's name",
        value_name = "STRING"
    )]
    pub org: String,
    #[arg(
        long,
        global = true,
        default_value = "US",
        help = "country name's code",
        value_name = "STRING"
    )]
    pub country: String,
    #[arg(
        long,
        global = true,
        default_value = "State",
        help = "state's name",
        value_name = "STRING"
    )]
    pub state: String,
    #[arg(
        long,
        global = true,
        default_value = "City",
        help = "locality's name",
        value_name = "STRING"
    )]
    pub locality: String,
}

#[derive(Debug, Parser)]
#[command(version, about = "local development CA and certificate generator", long_about = None)]
#[command(next_line_help = true)]
pub struct Cli {
    #[clap(flatten)]
    pub shared: GlobalCommonArgs,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[command(about = "create the root CA key and certificate, then exit")]
    RootCa,
    #[command(about = "issue a CA-signed certificate for a domain")]
    Issue {
        #[arg(
            short,
            long,
            help = "main domain, e.g. example.com or *.example.com (prompted when omitted)",
            value_name = "STRING"
        )]
        domain: Option<String>,
        #[arg(
            short,
            long,
            value_delimiter = ',',
            help = "alternate names for the certificate (prompted when omitted)",
            value_name = "[STRING]"
        )]
        alt_names: Option<Vec<String>>,
    },
}
