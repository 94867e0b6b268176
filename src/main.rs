use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use provision_tool::record::ConfigRecord;
use provision_tool::registration;
use provision_tool::settings::{self, Settings, PARTITION_NAME};
use provision_tool::tools;
use provision_tool::version;

#[derive(Parser)]
#[command(name = "provision")]
#[command(about = "Registers a device with the management server and flashes its config partition", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Serial port of the attached device
    #[arg(value_name = "PORT")]
    port: Option<String>,

    /// Device serial number
    #[arg(short = 'n', long, global = true)]
    serial: Option<u32>,

    /// Settings file (JSON) overriding the built-in defaults
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Accept self-signed certificates from the management server
    #[arg(long, global = true)]
    insecure: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Register the device and print its security token
    Register,
    /// Print the rendered configuration CSV without touching the device
    Render {
        /// Token to embed in the preview
        #[arg(long, default_value = "<token>")]
        token: String,
    },
    /// Render, generate and flash with a known token (skips registration)
    Write {
        /// Security token to embed
        #[arg(long)]
        token: String,

        /// Serial port of the attached device
        #[arg(value_name = "PORT")]
        port: Option<String>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "❌".red(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if let Some(serial) = cli.serial {
        settings.serial_number = serial;
    }
    if cli.insecure {
        settings.accept_invalid_certs = true;
    }
    if let Some(port) = &cli.port {
        settings.port = port.clone();
    }

    info!(version = %version::full_version(), "provision tool starting");

    match cli.command {
        Some(Commands::Register) => {
            let token = fetch_token(&settings)?;
            println!("{token}");
        }
        Some(Commands::Render { token }) => {
            println!("{}", ConfigRecord::new(&settings, &token).to_csv());
        }
        Some(Commands::Write { token, port }) => {
            if let Some(port) = port {
                settings.port = port;
            }
            banner(&settings);
            write_config(&settings, &token)?;
            println!("\n{} {}", "✨".green(), "Provisioning completed!".green());
        }
        None => {
            banner(&settings);
            let token = fetch_token(&settings)?;
            write_config(&settings, &token)?;
            println!("\n{} {}", "✨".green(), "Provisioning completed!".green());
        }
    }
    Ok(())
}

fn banner(settings: &Settings) {
    let version = version::full_version();
    println!("{} Device provisioning {}", "🚀".blue(), version.as_str().dimmed());
    println!("{}Serial: {}", "   ".dimmed(), settings.serial_number);
    println!("{}Server: {}", "   ".dimmed(), settings.server_address);
    println!("{}Port:   {}", "   ".dimmed(), settings.port);
}

fn fetch_token(settings: &Settings) -> anyhow::Result<String> {
    let pb = spinner("Registering with management server...");
    let result = registration::register_device(settings);
    pb.finish_and_clear();
    let token = result?;
    println!(
        "   {} Registered {}",
        "✓".green(),
        registration::controller_id(settings.serial_number)
    );
    Ok(token)
}

fn write_config(settings: &Settings, token: &str) -> anyhow::Result<()> {
    let idf_path = settings::idf_path()?;

    ConfigRecord::new(settings, token).write_to(&settings.csv_file)?;
    println!("   {} Rendered {}", "✓".green(), settings.csv_file.display());

    tools::generate_image(&idf_path, settings)?;
    println!("   {} Generated {}", "✓".green(), settings.bin_file.display());

    tools::flash_image(&idf_path, settings, &settings.port)?;
    println!(
        "   {} Wrote {} partition on {}",
        "✓".green(),
        PARTITION_NAME,
        settings.port
    );
    Ok(())
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("   {spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
