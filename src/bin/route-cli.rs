use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::json;

use sovoli_router::config::{self, loader, RouterConfig};
use sovoli_router::lookup;
use sovoli_router::observability::logging;
use sovoli_router::{RequestContext, TenantRouter};

#[derive(Parser)]
#[command(name = "route-cli")]
#[command(about = "Inspect routing decisions of the Sovoli tenant router", long_about = None)]
struct Cli {
    /// Router configuration; defaults are used when omitted.
    #[arg(short, long, env = "SOVOLI_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show how a request would be routed
    Explain {
        /// Host header, e.g. acme.sovoli.com
        host: String,
        /// Request path with optional query, e.g. /catalog?page=2
        #[arg(default_value = "/")]
        target: String,
        /// Cookie header value, e.g. "sovoli_admin_pin=ok"
        #[arg(long)]
        cookie: Option<String>,
    },
    /// Validate the configuration and summarize it
    Check,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    logging::init_logging("warn");

    let config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => {
            let mut config = RouterConfig::default();
            loader::apply_root_domain_override(&mut config, std::env::var(loader::ROOT_DOMAIN_ENV).ok());
            loader::finalize(config)?
        }
    };

    match cli.command {
        Commands::Explain { host, target, cookie } => {
            let lookup = lookup::from_config(&config.lookup)?;
            let router = TenantRouter::from_config(&config, lookup);

            let (path, query) = match target.split_once('?') {
                Some((path, query)) => (path, Some(query)),
                None => (target.as_str(), None),
            };
            let mut ctx = RequestContext::new(&host, path);
            if let Some(query) = query {
                ctx = ctx.with_query(query);
            }
            if let Some(cookie) = &cookie {
                ctx = ctx.with_cookie_header(cookie);
            }

            let decision = router.route(&ctx).await;
            println!("{}", serde_json::to_string_pretty(&decision)?);
        }
        Commands::Check => {
            let custom_domains = config
                .lookup
                .orgs
                .iter()
                .filter(|o| o.domain.is_some())
                .count();
            let summary = json!({
                "root_domain": config.tenancy.root_domain,
                "upstream": config.upstream.address,
                "orgs": config.lookup.orgs.len(),
                "custom_domains": custom_domains,
                "http_lookup": config.lookup.http.as_ref().map(|h| h.url.clone()),
                "tls": config.listener.tls.is_some(),
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}
