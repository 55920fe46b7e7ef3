mod cli;
mod config;
mod handlers;
mod openssl;
mod prompt;

use clap::Parser;
use cli::{Cli, Commands};
use handlers::issue;

fn main() -> anyhow::Result<()> {
    let parsed_args = Cli::parse();
    let params = issue::IssueParams {
        workdir: &parsed_args.shared.workdir,
        ca_name: &parsed_args.shared.ca_name,
        ca_passphrase: parsed_args.shared.ca_passphrase.as_deref(),
        expires_in: parsed_args.shared.expires,
        ca_expires_in: parsed_args.shared.ca_expires,
        organization: &parsed_args.shared.org,
        country: &parsed_args.shared.country,
        state: &parsed_args.shared.state,
        locality: &parsed_args.shared.locality,
    };
    match parsed_args.command {
        Commands::RootCa => issue::handle_root_ca(&params),
        Commands::Issue { domain, alt_names } => issue::handle(&params, domain, alt_names),
    }
}
