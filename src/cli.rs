use clap::{crate_authors, crate_description, crate_version, Arg, ArgAction, Command};
use pretty_env_logger::env_logger::Builder;
use std::env;
use std::io::Write;
use std::process::exit;

use dns_zone_sync::common::Service;
use dns_zone_sync::service::DNSSync;
use dns_zone_sync::{azure, google, Config};

const CLOUD_GOOGLE: &str = "google";
const CLOUD_AZURE: &str = "azure";

fn set_logger_level(b: &mut Builder) {
    let mut b = b;
    if env::var("RUST_LOG").is_err() {
        b = b.filter_level(log::LevelFilter::Info)
    }
    b.init();
}

fn setup_logger() {
    // Adapted from env_logger examples. <3 Systemd support
    match std::env::var("RUST_LOG_STYLE") {
        Ok(s) if s == "SYSTEMD" => {
            let builder = &mut pretty_env_logger::env_logger::builder();
            builder.format(|buf, record| {
                writeln!(
                    buf,
                    "<{}>{}: {}",
                    match record.level() {
                        log::Level::Error => 3,
                        log::Level::Warn => 4,
                        log::Level::Info => 6,
                        log::Level::Debug => 7,
                        log::Level::Trace => 7,
                    },
                    record.target(),
                    record.args()
                )
            });
            set_logger_level(builder);
        }
        _ => {
            let builder = &mut pretty_env_logger::formatted_builder();
            set_logger_level(builder);
        }
    };
}

/// Provider settings come from the environment, e.g. GOOGLE_PROJECT.
fn google_service() -> Result<google::GoogleCloudDns, String> {
    let cfg: google::Config = config::Config::builder()
        .add_source(config::Environment::with_prefix("GOOGLE"))
        .build()
        .and_then(|c| c.try_deserialize())
        .map_err(|err| format!("{}: {err}", google::BACKEND_NAME))?;
    google::GoogleCloudDns::try_from(cfg).map_err(|err| err.to_string())
}

/// Reads AZURE_SUBSCRIPTION, AZURE_RESOURCE_GROUP and AZURE_ACCESS_TOKEN.
fn azure_service() -> Result<azure::AzureDns, String> {
    let cfg: azure::Config = config::Config::builder()
        .add_source(config::Environment::with_prefix("AZURE"))
        .build()
        .and_then(|c| c.try_deserialize())
        .map_err(|err| format!("{}: {err}", azure::BACKEND_NAME))?;
    azure::AzureDns::try_from(cfg).map_err(|err| err.to_string())
}

fn get_service(cloud: &str) -> Result<Box<dyn Service>, String> {
    match cloud {
        CLOUD_GOOGLE => Ok(Box::new(google_service()?)),
        CLOUD_AZURE => Ok(Box::new(azure_service()?)),
        other => Err(format!("Unsupported cloud DNS provider {other}")),
    }
}

pub(crate) fn main() {
    let cli = Command::new("DNS Zone Sync")
        .about(format!(
            "{}\n{} {}",
            crate_description!(),
            "Provider credentials are read from environment variables.",
            "See the docs for more information.",
        ))
        .arg(
            Arg::new("config")
                .required(true)
                .long("config")
                .help("Path to the zone and records document (YAML or JSON)"),
        )
        .arg(
            Arg::new("cloud")
                .long("cloud")
                .default_value(CLOUD_GOOGLE)
                .help("Which cloud DNS provider to use, currently 'google' or 'azure'"),
        )
        .arg(
            Arg::new("check")
                .action(ArgAction::SetTrue)
                .short('t')
                .long("test")
                .help("Check the configuration"),
        )
        .arg(
            Arg::new("dry-run")
                .action(ArgAction::SetTrue)
                .long("dry-run")
                .help("Show changes without applying them"),
        )
        .version(crate_version!())
        .author(crate_authors!("\n"));

    let args = cli.get_matches();

    setup_logger();

    let config_path: &String = args.get_one("config").expect("config is required");
    let config = match Config::load(config_path) {
        Ok(c) => c,
        Err(err) => {
            println!("{err}");
            exit(2);
        }
    };

    let cloud: &String = args.get_one("cloud").expect("cloud has a default");
    let service = match get_service(cloud) {
        Ok(s) => s,
        Err(err) => {
            println!("{err}");
            exit(2);
        }
    };

    if args.get_flag("check") {
        tracing::info!(
            zone = config.zone.name,
            records = config.records.len(),
            cloud,
            "Configuration is valid."
        );
        exit(0);
    }

    let mut sync = DNSSync::new(service).dry_run(args.get_flag("dry-run"));
    if let Err(err) = sync.sync(&config.zone, &config.records) {
        tracing::error!("{err}");
        exit(1);
    }
    tracing::info!("Synchronized.");
}
