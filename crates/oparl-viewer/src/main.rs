use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use oparl_filter::FilterDimension;
use oparl_search::SKIP_SEARCH_ENV;
use oparl_viewer::commands::{self, SearchAction, Settings, TableRequest, DEFAULT_STORAGE_FILE};
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("oparl-viewer")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Browse a static OParl council archive from the command line")
        .arg(
            Arg::new("base-url")
                .long("base-url")
                .global(true)
                .help("Base URL of the published collections"),
        )
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Read collections from a local mirror of the base URL"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("max-chunks")
                .long("max-chunks")
                .global(true)
                .value_parser(value_parser!(usize))
                .help("Stop loading extracted text after this many chunks"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Output as JSON"),
        )
        .subcommand_required(true)
        .subcommand(Command::new("facets").about("List the filter options of every dimension"))
        .subcommand(
            Command::new("paper")
                .about("Show one paper with its resolved references")
                .arg(Arg::new("slug").required(true).help("Internal reference, e.g. 2024-0815")),
        )
        .subcommand(Command::new("years").about("List the years that have papers"))
        .subcommand(Command::new("preload").about("Load all extracted file text"))
        .subcommand(table_command())
        .subcommand(
            Command::new("searches")
                .about("Manage saved searches")
                .arg(
                    Arg::new("storage")
                        .long("storage")
                        .default_value(DEFAULT_STORAGE_FILE)
                        .value_parser(value_parser!(PathBuf))
                        .help("File holding the saved searches"),
                )
                .arg(
                    Arg::new("site-url")
                        .long("site-url")
                        .default_value("/")
                        .help("Site base used for result links"),
                )
                .subcommand(Command::new("save").arg(Arg::new("query").required(true)))
                .subcommand(Command::new("remove").arg(Arg::new("query").required(true)))
                .subcommand(Command::new("clear")),
        )
        .subcommand(
            Command::new("search-status")
                .about("Report whether full-text search is offered")
                .arg(
                    Arg::new("dev")
                        .long("dev")
                        .action(ArgAction::SetTrue)
                        .help("Evaluate for the dev server"),
                )
                .arg(
                    Arg::new("site-dir")
                        .long("site-dir")
                        .value_parser(value_parser!(PathBuf))
                        .help("Built site to look for a local index in"),
                ),
        )
}

const TABLE_FILTERS: [(&str, FilterDimension); 6] = [
    ("year", FilterDimension::Year),
    ("type", FilterDimension::Type),
    ("org", FilterDimension::Organization),
    ("role", FilterDimension::Role),
    ("result", FilterDimension::Result),
    ("stadtteil", FilterDimension::Stadtteil),
];

fn table_command() -> Command {
    let mut command = Command::new("table")
        .about("Render the paper list and apply filters")
        .arg(
            Arg::new("pages")
                .long("pages")
                .default_value("1")
                .value_parser(value_parser!(usize))
                .help("Number of batches to reveal"),
        )
        .arg(
            Arg::new("batch-size")
                .long("batch-size")
                .default_value("500")
                .value_parser(value_parser!(usize))
                .help("Rows revealed per batch"),
        );
    for (name, dimension) in TABLE_FILTERS {
        command = command.arg(Arg::new(name).long(name).help(dimension.label()));
    }
    command
}

fn table_request(args: &ArgMatches) -> TableRequest {
    let filters = TABLE_FILTERS
        .into_iter()
        .filter_map(|(name, dimension)| {
            args.get_one::<String>(name)
                .map(|value| (dimension, value.clone()))
        })
        .collect();

    let defaults = TableRequest::default();
    TableRequest {
        filters,
        pages: args.get_one::<usize>("pages").copied().unwrap_or(defaults.pages),
        batch_size: args
            .get_one::<usize>("batch-size")
            .copied()
            .unwrap_or(defaults.batch_size),
        ..defaults
    }
}

fn settings(matches: &ArgMatches) -> Settings {
    Settings {
        config_path: matches.get_one::<PathBuf>("config").cloned(),
        base_url: matches.get_one::<String>("base-url").cloned(),
        data_dir: matches.get_one::<PathBuf>("data-dir").cloned(),
        max_chunks: matches.get_one::<usize>("max-chunks").copied(),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).context("cannot encode output")?);
    Ok(())
}

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(err) = run().await {
        error!(error = %err, "command failed");
        for cause in err.chain().skip(1) {
            error!(cause = %cause, "caused by");
        }
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let matches = cli().get_matches();
    let json = matches.get_flag("json");

    match matches.subcommand() {
        Some(("searches", args)) => {
            let storage = args
                .get_one::<PathBuf>("storage")
                .cloned()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_FILE));
            let site_url = args.get_one::<String>("site-url").map_or("/", String::as_str);
            let action = match args.subcommand() {
                Some(("save", sub)) => SearchAction::Save(query_arg(sub)),
                Some(("remove", sub)) => SearchAction::Remove(query_arg(sub)),
                Some(("clear", _)) => SearchAction::Clear,
                _ => SearchAction::List,
            };
            print!("{}", commands::saved_searches(&storage, site_url, &action));
            return Ok(());
        }
        Some(("search-status", args)) => {
            let skip = std::env::var(SKIP_SEARCH_ENV).ok();
            let status = commands::search_status(
                skip.as_deref(),
                args.get_flag("dev"),
                args.get_one::<PathBuf>("site-dir").map(PathBuf::as_path),
            );
            match status.disabled_message {
                Some(message) => println!("{message}"),
                None => println!("Suche ist verfügbar."),
            }
            return Ok(());
        }
        _ => {}
    }

    let settings = settings(&matches);
    let config = commands::load_config(&settings, |key| std::env::var(key).ok())?;
    let archive = commands::open_archive(config, settings.data_dir.as_deref())?;

    match matches.subcommand() {
        Some(("facets", _)) => {
            if json {
                print_json(&archive.filter_data().await.filter_options)?;
            } else {
                print!("{}", commands::format_facets(&commands::facets(&archive).await));
            }
        }
        Some(("paper", args)) => {
            let slug = args.get_one::<String>("slug").map_or("", String::as_str);
            let detail = commands::paper_detail(&archive, slug).await?;
            if json {
                print_json(&detail)?;
            } else {
                print!("{}", detail.to_text());
            }
        }
        Some(("years", _)) => {
            for year in archive.available_years().await.iter() {
                println!("{year}");
            }
        }
        Some(("preload", _)) => {
            let report = archive.preload_all_contents().await;
            println!("{}", commands::format_chunk_report(&report));
        }
        Some(("table", args)) => {
            let report = commands::table(&archive, &table_request(args)).await?;
            if json {
                print_json(&report)?;
            } else {
                print!("{}", commands::format_table(&report));
            }
        }
        _ => {}
    }
    Ok(())
}

fn query_arg(args: &ArgMatches) -> String {
    args.get_one::<String>("query").cloned().unwrap_or_default()
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
