use anyhow::Result;
use aursmith::aur::{AurClient, build_http_client};
use aursmith::config::Config;
use aursmith::discover;
use aursmith::error::PkgError;
use aursmith::pacman::Pacman;
use aursmith::recipe::Makepkg;
use aursmith::runtime::{RealRuntime, Runtime};
use aursmith::search;
use aursmith::sync::{SyncOptions, Syncer};
use clap::Parser;
use std::path::PathBuf;

/// aursmith - AUR build-directory synchronizer
///
/// Keeps one git checkout per package under a mirror root, compares the
/// version each recipe would build against what pacman reports as
/// installed, and drives makepkg to rebuild what moved.
///
/// Examples:
///   aursmith sync foo-bin    # fetch/refresh the mirror and rebuild it
///   aursmith update          # pull all mirrors, rebuild the stale ones
#[derive(Parser, Debug)]
#[command(author, version = env!("AURSMITH_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Mirror root directory, one checkout per package (also via AURSMITH_PKGDIR)
    #[arg(
        long = "pkgdir",
        short = 'd',
        env = "AURSMITH_PKGDIR",
        value_name = "PATH",
        global = true
    )]
    pub pkgdir: Option<PathBuf>,

    /// Package index URL (defaults to https://aur.archlinux.org)
    #[arg(long = "aur-url", value_name = "URL", global = true)]
    pub aur_url: Option<String>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Fetch or refresh one package mirror and rebuild it
    Sync(SyncArgs),

    /// Search the package index
    Search(SearchArgs),

    /// Rebuild every mirrored package whose recipe differs from the installed version
    Update(UpdateArgs),

    /// List foreign installed packages, cloning mirrors for any that lack one
    Foreign,
}

#[derive(clap::Args, Debug)]
pub struct SyncArgs {
    /// Package name
    #[arg(value_name = "NAME")]
    pub name: String,
}

#[derive(clap::Args, Debug)]
pub struct SearchArgs {
    /// Search term
    #[arg(value_name = "QUERY")]
    pub query: String,
}

#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    /// Do not pull the mirrors before planning
    #[arg(short = 'n', long = "no-pull")]
    pub no_pull: bool,
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let runtime = RealRuntime;

    if let Err(err) = run(cli, &runtime).await {
        eprintln!("error: {:#}", err);
        let code = err
            .downcast_ref::<PkgError>()
            .map(PkgError::exit_code)
            .unwrap_or(1);
        std::process::exit(code);
    }
}

async fn run<R: Runtime>(cli: Cli, runtime: &R) -> Result<()> {
    match cli.command {
        Commands::Search(args) => {
            let aur = AurClient::new(build_http_client()?, cli.aur_url);
            search::search(&aur, &args.query).await
        }
        Commands::Sync(args) => {
            let config = Config::new(runtime, cli.pkgdir, cli.aur_url)?;
            let db = Pacman::new(runtime);
            let eval = Makepkg::new(runtime);
            Syncer::new(runtime, &config, &db, &eval).sync_one(&args.name, SyncOptions::default())
        }
        Commands::Update(args) => {
            let config = Config::new(runtime, cli.pkgdir, cli.aur_url)?;
            let db = Pacman::new(runtime);
            let eval = Makepkg::new(runtime);
            Syncer::new(runtime, &config, &db, &eval).sync_all(!args.no_pull)
        }
        Commands::Foreign => {
            let config = Config::new(runtime, cli.pkgdir, cli.aur_url)?;
            let db = Pacman::new(runtime);
            discover::reconcile(runtime, &config, &db)
        }
    }
}
