use clap::Parser;
use colored::Colorize;
use miette::{IntoDiagnostic, Result, WrapErr};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use xmlgui::builder::WidgetTree;
use xmlgui::client::{GuiClient, ReverseStateChange};
use xmlgui::config::{ClientConfig, Config};
use xmlgui::dom::{parse_document, to_xml_string};
use xmlgui::factory::{Factory, LoggingObserver};
use xmlgui::report::{Composition, ReportFormat, Reporter};
use xmlgui::watch::FileWatcher;

/// xmlgui - compose menus and toolbars from XML GUI documents
#[derive(Parser, Debug)]
#[command(name = "xmlgui")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding the manifest and the client documents
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Path to the manifest (default: xmlgui.yml / xmlgui.toml in PATH)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "terminal")]
    format: OutputFormat,

    /// Output file (for json format)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Remove a client after composing (can be specified multiple times)
    #[arg(long, value_name = "ID")]
    remove: Vec<String>,

    /// Shortcut scheme to activate
    #[arg(long, value_name = "NAME")]
    scheme: Option<String>,

    /// Warn about actions referenced by documents but not provided
    #[arg(long)]
    strict: bool,

    /// Write the documents of removed clients, with saved container state, here
    #[arg(long, value_name = "DIR")]
    dump_documents: Option<PathBuf>,

    /// Watch mode - recompose when documents or the manifest change
    #[arg(long)]
    watch: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode - only output results
    #[arg(short, long)]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug, Default)]
enum OutputFormat {
    #[default]
    Terminal,
    Json,
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Terminal => ReportFormat::Terminal,
            OutputFormat::Json => ReportFormat::Json,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    info!("xmlgui v{}", env!("CARGO_PKG_VERSION"));

    if cli.watch {
        run_watch_mode(&cli)?;
    } else {
        let config = load_config(&cli)?;
        run_composition(&config, &cli)?;
    }

    Ok(())
}

fn run_watch_mode(cli: &Cli) -> Result<()> {
    let mut paths = vec![cli.path.clone()];
    if let Some(config) = &cli.config {
        if !config.starts_with(&cli.path) {
            paths.push(config.clone());
        }
    }

    FileWatcher::new()
        .watch(&paths, || {
            // the manifest itself may have changed
            let result = load_config(cli).and_then(|config| run_composition(&config, cli));
            match result {
                Ok(()) => {
                    println!();
                    println!("{}", "✓ Composed. Waiting for changes...".green());
                }
                Err(e) => eprintln!("{}: {:?}", "Composition error".red(), e),
            }
            true
        })
        .map_err(|e| miette::miette!("Watch error: {}", e))
}

fn init_logging(verbose: bool, quiet: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let (mut config, base) = if let Some(config_path) = &cli.config {
        let base = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| cli.path.clone());
        (Config::from_file(config_path)?, base)
    } else {
        (Config::from_default_locations(&cli.path)?, cli.path.clone())
    };

    config.resolve_paths(&base);

    // Override with CLI arguments
    if let Some(scheme) = &cli.scheme {
        config.shortcut_scheme = scheme.clone();
    }
    if cli.strict {
        config.strict_actions = true;
    }

    let mut seen = HashSet::new();
    for client in &config.clients {
        if !seen.insert(client.id.as_str()) {
            miette::bail!("Client id '{}' is used more than once", client.id);
        }
    }

    Ok(config)
}

fn run_composition(config: &Config, cli: &Cli) -> Result<()> {
    let mut factory = Factory::new(WidgetTree::new(), config.vocabulary.clone());
    factory.set_strict_actions(config.strict_actions);
    factory.add_observer(Box::new(LoggingObserver));
    if config.shortcut_scheme != config.vocabulary.default_scheme {
        factory.change_shortcut_scheme(&config.shortcut_scheme);
    }

    for client_config in config.clients.iter().filter(|c| c.parent.is_none()) {
        let client = build_client(client_config, config)?;
        factory.add_client(client);
    }
    for client_config in &config.clients {
        if client_config.parent.as_deref().is_some_and(|p| config.client(p).is_none()) {
            warn!(
                "Client {} names unknown parent, skipping it",
                client_config.id
            );
        }
    }

    for client_config in &config.clients {
        let Some(id) = factory.find_client(&client_config.id) else {
            continue;
        };
        for (list, actions) in &client_config.action_lists {
            let actions: Vec<_> = actions.iter().map(|a| a.to_action()).collect();
            factory.plug_action_list(id, list, &actions);
        }
        for state in &client_config.states {
            factory.state_changed(id, state, ReverseStateChange::StateNoReverse);
        }
    }

    for name in &cli.remove {
        let Some(id) = factory.find_client(name) else {
            warn!("No client with id {}", name);
            continue;
        };
        let Some(client) = factory.remove_client(id) else {
            continue;
        };
        if let Some(dir) = &cli.dump_documents {
            dump_documents(&client, dir)?;
        }
    }

    let reporter = Reporter::new(cli.format.clone().into(), cli.output.clone());
    reporter.report(&Composition::from_factory(&factory))
}

/// Build a client and the clients nested under it
fn build_client(client_config: &ClientConfig, config: &Config) -> Result<GuiClient> {
    let mut client =
        GuiClient::new(client_config.id.as_str()).with_vocabulary(config.vocabulary.clone());

    for action in &client_config.actions {
        client.add_action(action.to_action());
    }
    if let Some(standards) = &client_config.standards {
        client.set_standards_file(standards);
    }
    if let Some(local) = &client_config.local_file {
        client.set_local_xml_file(local);
    }
    client
        .set_xml_file(&client_config.file, false)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to load client {}", client_config.id))?;

    for (scheme, path) in &client_config.shortcut_schemes {
        let contents = std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to read shortcut scheme: {}", path.display()))?;
        let doc = parse_document(&contents).into_diagnostic()?;
        client.add_shortcut_scheme(scheme.as_str(), doc);
    }

    for child in config
        .clients
        .iter()
        .filter(|c| c.parent.as_deref() == Some(client_config.id.as_str()))
    {
        client.insert_child_client(build_client(child, config)?);
    }

    Ok(client)
}

/// Write the documents of a removed client and its children
fn dump_documents(client: &GuiClient, dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to create {}", dir.display()))?;

    if let Some(doc) = client.build_document().or(client.dom_document()) {
        let path = dir.join(format!("{}.rc", client.component_name()));
        let xml = to_xml_string(doc).into_diagnostic()?;
        std::fs::write(&path, xml)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to write {}", path.display()))?;
        info!("Wrote {}", path.display());
    }

    for child in client.child_clients() {
        dump_documents(child, dir)?;
    }
    Ok(())
}
