use clap::{Parser, Subcommand};
use onboard_client::api::SetupApi;
use onboard_client::http::HttpClient;
use onboard_client::poller;
use onboard_core::install::InstallProgress;
use onboard_gui::{run_gui, GuiConfig};

mod output;

const DEFAULT_URL: &str = "http://localhost:8080";

#[derive(Parser)]
#[command(name = "onboard", version, about = "First-run setup wizard")]
struct Cli {
    /// Server base URL (falls back to ONBOARD_URL)
    #[arg(long)]
    url: Option<String>,
    /// Disable the GUI (GUI is the default)
    #[arg(long)]
    no_gui: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the server's setup state and install jobs
    Status,
    /// List the curated plugin catalog
    Plugins,
    /// Install plugins and follow progress until done
    Install {
        names: Vec<String>,
    },
    /// Print whether a restart is required/supported
    RestartStatus,
}

fn base_url(cli: &Cli) -> String {
    cli.url
        .clone()
        .or_else(|| std::env::var("ONBOARD_URL").ok())
        .unwrap_or_else(|| DEFAULT_URL.to_string())
}

fn locale() -> String {
    std::env::var("LANG")
        .ok()
        .and_then(|lang| lang.split('.').next().map(str::to_string))
        .unwrap_or_else(|| "en".to_string())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let url = base_url(&cli);

    match cli.command {
        None => {
            if cli.no_gui {
                let api = SetupApi::new(HttpClient::new(&url));
                let status = api.install_status(None)?;
                output::print_install_status(&status);
                return Ok(());
            }
            run_gui(GuiConfig::default(), &url, &locale())?;
        }
        Some(Commands::Status) => {
            let api = SetupApi::new(HttpClient::new(&url));
            let status = api.install_status(None)?;
            output::print_install_status(&status);
        }
        Some(Commands::Plugins) => {
            let api = SetupApi::new(HttpClient::new(&url));
            let catalog = api.load_catalog()?;
            output::print_catalog(&catalog);
        }
        Some(Commands::Install { names }) => {
            if names.is_empty() {
                output::print_error("No plugin names given");
                std::process::exit(2);
            }
            let api = SetupApi::new(HttpClient::new(&url));
            let catalog = api.load_catalog()?;
            let mut progress = InstallProgress::from_selection(&catalog, &names);
            let correlation_id = api.install(&names)?;
            output::print_info(&format!("Install submitted ({correlation_id})"));
            let failed = poller::poll_until_complete(
                &api,
                Some(&correlation_id),
                &mut progress,
                output::print_progress_tick,
            )?;
            if failed.is_empty() {
                output::print_info("All plugins installed");
            } else {
                output::print_error(&format!("Failed: {}", failed.join(", ")));
                std::process::exit(1);
            }
        }
        Some(Commands::RestartStatus) => {
            let api = SetupApi::new(HttpClient::new(&url));
            let status = api.restart_status()?;
            output::print_restart_status(&status);
        }
    }

    Ok(())
}
