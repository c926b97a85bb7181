use anyhow::Result;
use bjj_clip_catalog::{
    catalog::{CatalogStore, JsonCatalogStore},
    thumbnails, ClipId, Config, SyncService,
};
use clap::{Arg, ArgAction, ArgMatches, Command};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    let root_arg = Arg::new("root")
        .value_name("ROOT")
        .help("Absolute path of the folder to reconcile")
        .required(true);

    let mut command = Command::new("bjj-catalog")
        .version(env!("CARGO_PKG_VERSION"))
        .author("TigreRoll")
        .about("Keeps the BJJ clip catalog in step with video folders on disk")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file (TOML)")
                .global(true),
        )
        .arg(
            Arg::new("catalog")
                .long("catalog")
                .value_name("FILE")
                .help("Catalog file, overrides the configured path")
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("sync")
                .about("Add new files and remove clips whose files are gone")
                .arg(root_arg.clone()),
        )
        .subcommand(
            Command::new("preview")
                .about("Show what a sync would change without changing anything")
                .arg(root_arg.clone()),
        )
        .subcommand(
            Command::new("selective")
                .about("Apply only the listed additions and removals")
                .arg(root_arg)
                .arg(
                    Arg::new("add")
                        .long("add")
                        .value_name("PATH")
                        .help("File to add (repeatable)")
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("remove")
                        .long("remove")
                        .value_name("ID")
                        .help("Clip id to remove (repeatable)")
                        .value_parser(clap::value_parser!(ClipId))
                        .action(ArgAction::Append),
                ),
        )
        .subcommand(Command::new("clips").about("List local clips in the catalog"));

    if cfg!(feature = "api") {
        command = command.subcommand(
            Command::new("serve").about("Serve the JSON API").arg(
                Arg::new("port")
                    .short('p')
                    .long("port")
                    .value_name("PORT")
                    .help("Port to listen on, overrides the configured port")
                    .value_parser(clap::value_parser!(u16)),
            ),
        );
    }

    command
}

fn init_logging(verbose: bool, level: &str) {
    if verbose {
        tracing_subscriber::fmt()
            .with_target(true)
            .with_env_filter(EnvFilter::new("debug"))
            .with_writer(std::io::stderr)
            .init();
    } else {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
        tracing_subscriber::fmt()
            .with_target(false)
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn load_config(matches: &ArgMatches) -> Result<Config> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => Config::from_file(path)?,
        None => Config::load()?,
    };

    if let Some(catalog) = matches.get_one::<String>("catalog") {
        config.catalog.path = PathBuf::from(catalog);
    }

    config.validate()?;
    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();
    let config = load_config(&matches)?;
    init_logging(matches.get_flag("verbose"), &config.logging.level);

    info!("🚀 BJJ Clip Catalog starting...");
    for line in config.summary().lines() {
        info!("{}", line);
    }

    let store: Arc<dyn CatalogStore> = Arc::new(JsonCatalogStore::open(config.catalog.path.clone()).await?);
    let thumbnails = thumbnails::initialize(&config.thumbnails).await;
    let service = SyncService::from_config(&config, Arc::clone(&store), thumbnails);

    match matches.subcommand() {
        Some(("sync", sub)) => {
            let root = sub.get_one::<String>("root").map(String::as_str).unwrap_or_default();
            let report = service.sync(root).await;
            if report.has_errors() {
                warn!("Sync finished with {} errors", report.errors.len());
            }
            print_json(&report)?;
        }
        Some(("preview", sub)) => {
            let root = sub.get_one::<String>("root").map(String::as_str).unwrap_or_default();
            print_json(&service.preview(root).await)?;
        }
        Some(("selective", sub)) => {
            let root = sub.get_one::<String>("root").map(String::as_str).unwrap_or_default();
            let files_to_add: Vec<String> = sub
                .get_many::<String>("add")
                .map(|values| values.cloned().collect())
                .unwrap_or_default();
            let clip_ids: Vec<ClipId> = sub
                .get_many::<ClipId>("remove")
                .map(|values| values.copied().collect())
                .unwrap_or_default();

            print_json(&service.selective_sync(root, &files_to_add, &clip_ids).await)?;
        }
        Some(("clips", _)) => {
            print_json(&store.list_local_records().await?)?;
        }
        #[cfg(feature = "api")]
        Some(("serve", sub)) => {
            let port = sub.get_one::<u16>("port").copied().unwrap_or(config.server.port);
            let server = bjj_clip_catalog::api::ApiServer::new(
                Arc::new(service),
                config.server.host.clone(),
                port,
            );
            server.start().await?;
        }
        _ => unreachable!("subcommand_required is set"),
    }

    Ok(())
}
