//! kenv CLI - Inject environment variables into Kubernetes workload manifests

use std::io::Write;
use std::path::PathBuf;

use clap::{CommandFactory, Parser};
use console::style;
use kenv_core::DerivedKind;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod error;
mod exit_codes;
mod inject;
mod input;
mod output;

use error::{CliError, Result};
use inject::{DerivedTarget, InjectOptions};
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "kenv")]
#[command(version)]
#[command(about = "Inject environment variables into Kubernetes workload manifests", long_about = None)]
#[command(after_help = "Examples:\n  \
    kenv -v fixtures/vars.env fixtures/deployment.yaml\n  \
    cat fixtures/deployment.yaml | kenv -v fixtures/vars.env\n  \
    kenv -v fixtures/vars.env -c app-env -n production fixtures/deployment.yaml")]
struct Cli {
    /// Manifest file (read from stdin when omitted)
    file: Option<PathBuf>,

    /// File containing environment variables (repeatable)
    #[arg(short = 'v', long = "vars")]
    vars: Vec<PathBuf>,

    /// Store variables in a ConfigMap with this name
    #[arg(short = 'c', long, conflicts_with = "secret")]
    configmap: Option<String>,

    /// Store variables in a Secret with this name
    #[arg(short = 's', long)]
    secret: Option<String>,

    /// Namespace of the generated ConfigMap/Secret
    #[arg(short, long, env = "KENV_NAMESPACE", default_value = "default")]
    namespace: String,

    /// Lowercase keys and replace '_' with '-' (Kubernetes < 1.4)
    #[arg(long)]
    convert: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    output: OutputFormat,

    /// Bundle all resources into a single v1 List
    #[arg(long)]
    list: bool,

    /// Pass documents of unsupported kinds through instead of failing
    #[arg(long)]
    skip_unsupported: bool,

    /// Enable debug output
    #[arg(long)]
    debug: bool,
}

impl Cli {
    fn inject_options(&self) -> InjectOptions {
        let derived = match (&self.configmap, &self.secret) {
            (Some(name), _) => Some(DerivedTarget {
                kind: DerivedKind::ConfigMap,
                name: name.clone(),
            }),
            (None, Some(name)) => Some(DerivedTarget {
                kind: DerivedKind::Secret,
                name: name.clone(),
            }),
            (None, None) => None,
        };

        InjectOptions {
            vars_files: self.vars.clone(),
            derived,
            namespace: self.namespace.clone(),
            convert: self.convert,
            output: self.output,
            list: self.list,
            skip_unsupported: self.skip_unsupported,
        }
    }
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let Some(manifest) = input::read_manifest(cli.file.as_deref())? else {
        eprintln!(
            "{} no manifest given and stdin is a terminal\n",
            style("hint:").yellow().bold()
        );
        Cli::command()
            .print_help()
            .map_err(|e| CliError::output(e.to_string()))?;
        return Ok(());
    };

    let rendered = inject::run(&cli.inject_options(), &manifest)?;

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", rendered.trim_end())?;
    Ok(())
}

fn main() {
    // Setup miette for nice error display
    miette::set_panic_hook();

    let cli = Cli::parse();
    init_tracing(cli.debug);

    if let Err(err) = run(&cli) {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}
