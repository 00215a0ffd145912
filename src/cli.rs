//! CLI definition and dispatch.

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_catalogue_adapter::JsonCatalogueAdapter;
use crate::adapters::json_output_adapter::JsonOutputAdapter;
use crate::domain::config::{
    HierarchyConfig, Mode, NormalizeConfig, RangeFilter, ScreenConfig, ViewConfig,
    DEFAULT_COMPANY_KEY_LEN, DEFAULT_LIQUIDITY_MIN, DEFAULT_MAX_BOXES, DEFAULT_MIN_ITEMS,
    DEFAULT_TOP_N, MAX_TOP_N,
};
use crate::domain::config_validation::{
    validate_config, validate_hierarchy_config, validate_normalize_config,
    validate_screen_config, RANGE_KEYS,
};
use crate::domain::error::SectormapError;
use crate::domain::instrument::RatioField;
use crate::domain::navigation::{self, NavEvent};
use crate::domain::normalizer::normalize;
use crate::domain::search::{available_sectors, filter_sectors, suggest_tickers};
use crate::domain::session::Session;
use crate::domain::taxonomy::{canonical_name, PREFERRED_TICKERS};
use crate::ports::catalogue_port::{Catalogue, CataloguePort};
use crate::ports::config_port::ConfigPort;
use crate::ports::output_port::{OutputPort, Snapshot};

#[derive(Parser, Debug)]
#[command(
    name = "sectormap",
    about = "Sector hierarchy and fundamental screening for exchange-listed instruments"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Catalogue and configuration inputs shared by every data command.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Catalogue file (.json envelope or .csv)
    #[arg(short, long)]
    pub input: PathBuf,
    /// INI configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the sector hierarchy and emit the visible level as JSON
    Map {
        #[command(flatten)]
        source: SourceArgs,
        /// Comma-separated sector allow-list
        #[arg(long, value_delimiter = ',')]
        sectors: Vec<String>,
        /// Drill into a sector
        #[arg(long)]
        sector: Option<String>,
        /// Drill into a subsector of --sector
        #[arg(long, requires = "sector")]
        subsector: Option<String>,
        /// Jump to the level containing a ticker
        #[arg(long, conflicts_with = "sector")]
        ticker: Option<String>,
        /// Emit the whole tree instead of the visible level
        #[arg(long)]
        full: bool,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Rank instruments by a priority ratio after range filtering
    Screen {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long, value_delimiter = ',')]
        sectors: Vec<String>,
        /// p_l, net_margin, roe, roic or dy
        #[arg(long)]
        priority: Option<RatioField>,
        #[arg(long)]
        top_n: Option<usize>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List the sectors present in the catalogue
    Sectors {
        #[command(flatten)]
        source: SourceArgs,
        /// Keep sectors containing this term
        #[arg(long)]
        filter: Option<String>,
    },
    /// Suggest tickers and show where they sit in the hierarchy
    Search {
        #[command(flatten)]
        source: SourceArgs,
        query: String,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Command-line values that take precedence over the configuration file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub sectors: Vec<String>,
    pub screening: bool,
    pub priority: Option<RatioField>,
    pub top_n: Option<usize>,
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Map {
            source,
            sectors,
            sector,
            subsector,
            ticker,
            full,
            output,
        } => {
            let overrides = Overrides {
                sectors,
                ..Overrides::default()
            };
            let target = match (ticker, sector) {
                (Some(t), _) => Target::Ticker(t),
                (None, Some(s)) => Target::Drill(s, subsector),
                (None, None) => Target::Market,
            };
            report(run_map(&source, &overrides, &target, full, output))
        }
        Command::Screen {
            source,
            sectors,
            priority,
            top_n,
            output,
        } => {
            let overrides = Overrides {
                sectors,
                screening: true,
                priority,
                top_n,
            };
            report(run_screen(&source, &overrides, output))
        }
        Command::Sectors { source, filter } => report(run_sectors(&source, filter.as_deref())),
        Command::Search { source, query } => report(run_search(&source, &query)),
        Command::Validate { config } => report(run_validate(&config)),
    }
}

fn report(result: Result<(), SectormapError>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Where `map` should anchor the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Market,
    Drill(String, Option<String>),
    Ticker(String),
}

/// Loads the INI file, or an empty configuration when none is given.
pub fn load_config(path: Option<&Path>) -> Result<FileConfigAdapter, SectormapError> {
    match path {
        Some(path) => {
            eprintln!("Loading config from {}", path.display());
            FileConfigAdapter::from_file(path)
        }
        None => Ok(FileConfigAdapter::empty()),
    }
}

/// Picks the catalogue reader from the file extension; anything but `.csv` is JSON.
pub fn catalogue_adapter(path: &Path) -> Box<dyn CataloguePort> {
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
    if is_csv {
        Box::new(CsvAdapter::new(path.to_path_buf()))
    } else {
        Box::new(JsonCatalogueAdapter::new(path.to_path_buf()))
    }
}

pub fn load_catalogue(path: &Path) -> Result<Catalogue, SectormapError> {
    eprintln!("Loading catalogue from {}", path.display());
    let catalogue = catalogue_adapter(path).fetch_catalogue()?;
    match catalogue.generated_at {
        Some(ts) => eprintln!("Loaded {} records (generated {})", catalogue.records.len(), ts.to_rfc3339()),
        None => eprintln!("Loaded {} records", catalogue.records.len()),
    }
    Ok(catalogue)
}

pub fn build_normalize_config(adapter: &dyn ConfigPort) -> Result<NormalizeConfig, SectormapError> {
    validate_normalize_config(adapter)?;
    Ok(NormalizeConfig {
        liquidity_min: adapter.get_double("normalize", "liquidity_min", DEFAULT_LIQUIDITY_MIN),
        company_key_len: adapter.get_int("normalize", "company_key_len", DEFAULT_COMPANY_KEY_LEN as i64)
            as usize,
        preferred_tickers: PREFERRED_TICKERS.iter().map(|t| t.to_string()).collect(),
    })
}

pub fn build_hierarchy_config(adapter: &dyn ConfigPort) -> Result<HierarchyConfig, SectormapError> {
    validate_hierarchy_config(adapter)?;
    Ok(HierarchyConfig {
        min_items: adapter.get_int("hierarchy", "min_items", DEFAULT_MIN_ITEMS as i64) as usize,
        max_boxes: adapter.get_int("hierarchy", "max_boxes", DEFAULT_MAX_BOXES as i64) as usize,
    })
}

pub fn build_screen_config(
    adapter: &dyn ConfigPort,
    overrides: &Overrides,
) -> Result<ScreenConfig, SectormapError> {
    validate_screen_config(adapter)?;
    let defaults = ScreenConfig::default();

    let priority = match overrides.priority {
        Some(p) => p,
        None => match adapter.get_string("screen", "priority") {
            Some(raw) => raw
                .parse::<RatioField>()
                .map_err(|reason| SectormapError::invalid("screen", "priority", reason))?,
            None => defaults.priority,
        },
    };

    let top_n = match overrides.top_n {
        Some(n) if n == 0 || n > MAX_TOP_N => {
            return Err(SectormapError::invalid(
                "screen",
                "top_n",
                format!("top_n must be between 1 and {}", MAX_TOP_N),
            ));
        }
        Some(n) => n,
        None => adapter.get_int("screen", "top_n", DEFAULT_TOP_N as i64) as usize,
    };

    let ranges = RANGE_KEYS
        .iter()
        .map(|(field, key, min, max)| {
            RangeFilter::new(
                *field,
                adapter.get_double("screen", &format!("{}_min", key), *min),
                adapter.get_double("screen", &format!("{}_max", key), *max),
            )
        })
        .collect();

    Ok(ScreenConfig {
        top_n,
        priority,
        ranges,
    })
}

/// Assembles the full view configuration. Sector names are canonicalized so
/// raw catalogue names and display names both work.
pub fn build_view_config(
    adapter: &dyn ConfigPort,
    overrides: &Overrides,
) -> Result<ViewConfig, SectormapError> {
    let screening = overrides.screening || adapter.get_bool("screen", "enabled", false);
    let mode = if screening { Mode::Screening } else { Mode::Hierarchy };

    let sectors = if !overrides.sectors.is_empty() {
        overrides.sectors.clone()
    } else if screening {
        adapter.get_list("screen", "sectors")
    } else {
        adapter.get_list("view", "sectors")
    };
    let sectors = sectors
        .iter()
        .map(|s| canonical_name(s))
        .filter(|s| !s.is_empty())
        .collect();

    Ok(ViewConfig {
        mode,
        sectors,
        hierarchy: build_hierarchy_config(adapter)?,
        screen: build_screen_config(adapter, overrides)?,
    })
}

fn open_session(source: &SourceArgs, overrides: &Overrides) -> Result<Session, SectormapError> {
    let adapter = load_config(source.config.as_deref())?;
    let normalize_config = build_normalize_config(&adapter)?;
    let view_config = build_view_config(&adapter, overrides)?;
    let catalogue = load_catalogue(&source.input)?;

    let session = Session::new(&catalogue.records, &normalize_config, view_config);
    eprintln!(
        "{} instruments after normalization, {} top-level nodes",
        session.instruments().len(),
        session.nodes().len()
    );
    Ok(session)
}

/// Drives the session's navigation towards `target`. Unknown names leave the
/// view where it was, with a warning.
pub fn navigate_to(session: &mut Session, target: &Target) {
    match target {
        Target::Market => {}
        Target::Ticker(ticker) => {
            let ticker = ticker.trim().to_uppercase();
            let before = session.view().clone();
            if *session.navigate(&NavEvent::SelectTicker(ticker.clone())) == before {
                eprintln!("warning: ticker {} not found in the hierarchy", ticker);
            }
        }
        Target::Drill(sector, subsector) => {
            let before = session.view().clone();
            if *session.navigate(&NavEvent::Select(sector.clone())) == before {
                eprintln!("warning: sector '{}' not found or has no children", sector);
                return;
            }
            if let Some(sub) = subsector {
                let before = session.view().clone();
                if *session.navigate(&NavEvent::Select(sub.clone())) == before {
                    eprintln!("warning: subsector '{}' not found or has no children", sub);
                }
            }
        }
    }
}

fn run_map(
    source: &SourceArgs,
    overrides: &Overrides,
    target: &Target,
    full: bool,
    output: Option<PathBuf>,
) -> Result<(), SectormapError> {
    let mut session = open_session(source, overrides)?;
    navigate_to(&mut session, target);

    let view = session.view().clone();
    let nodes = if full { session.nodes().to_vec() } else { session.visible() };
    eprintln!("View: {}", navigation::breadcrumbs(&view).join(" > "));

    JsonOutputAdapter::new(output).write(&Snapshot {
        view: &view,
        breadcrumbs: navigation::breadcrumbs(&view),
        nodes: &nodes,
    })
}

fn run_screen(
    source: &SourceArgs,
    overrides: &Overrides,
    output: Option<PathBuf>,
) -> Result<(), SectormapError> {
    let session = open_session(source, overrides)?;
    let screen = &session.config().screen;
    eprintln!(
        "Top {} by {} ({} matched)",
        screen.top_n,
        screen.priority,
        session.nodes().len()
    );

    JsonOutputAdapter::new(output).write(&Snapshot {
        view: session.view(),
        breadcrumbs: navigation::breadcrumbs(session.view()),
        nodes: session.nodes(),
    })
}

fn run_sectors(source: &SourceArgs, term: Option<&str>) -> Result<(), SectormapError> {
    let adapter = load_config(source.config.as_deref())?;
    let normalize_config = build_normalize_config(&adapter)?;
    let catalogue = load_catalogue(&source.input)?;
    let instruments = normalize(&catalogue.records, &normalize_config);

    let sectors = available_sectors(&instruments);
    for sector in filter_sectors(&sectors, term.unwrap_or_default()) {
        println!("{}", sector);
    }
    Ok(())
}

fn run_search(source: &SourceArgs, query: &str) -> Result<(), SectormapError> {
    let session = open_session(source, &Overrides::default())?;
    let suggestions = suggest_tickers(session.instruments(), query);
    if suggestions.is_empty() {
        eprintln!("No tickers match '{}'", query);
    }
    for ticker in suggestions {
        match navigation::select_ticker(session.nodes(), &ticker) {
            Some(state) => {
                let trail = navigation::breadcrumbs(&state);
                println!("{}\t{}", ticker, trail[1..].join(" > "));
            }
            None => println!("{}", ticker),
        }
    }
    Ok(())
}

fn run_validate(config_path: &Path) -> Result<(), SectormapError> {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = FileConfigAdapter::from_file(config_path)?;
    validate_config(&adapter)?;
    let view = build_view_config(&adapter, &Overrides::default())?;
    eprintln!(
        "Mode: {:?}, {} sector filter(s), max_boxes {}, top_n {}",
        view.mode,
        view.sectors.len(),
        view.hierarchy.max_boxes,
        view.screen.top_n
    );
    eprintln!("Configuration is valid.");
    Ok(())
}
