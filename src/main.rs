//! Addressbook CLI - serve the HTTP API or work on the database directly

use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use addressbook::config::{self, AddressBookConfig};
use addressbook::{Address, AddressPayload, AddressService};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "addressbook")]
#[command(version = "0.0.1")]
#[command(about = "Address book service with a planar proximity lookup")]
#[command(long_about = r#"
Stores address records in SQLite and serves them over HTTP.

Example usage:
  addressbook serve --port 8000
  addressbook add --street "1 Main St" --city Springfield --state IL \
      --country US --postal-code 62701 --latitude 39.8 --longitude -89.6
  addressbook near --latitude 40 --longitude -90 --distance 1.5
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the database file (overrides the config file)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Address fields shared by `add` and `update`
#[derive(clap::Args)]
struct PayloadArgs {
    #[arg(long)]
    street: String,
    #[arg(long)]
    city: String,
    #[arg(long)]
    state: String,
    #[arg(long)]
    country: String,
    #[arg(long)]
    postal_code: String,
    #[arg(long, allow_hyphen_values = true)]
    latitude: f64,
    #[arg(long, allow_hyphen_values = true)]
    longitude: f64,
}

impl From<PayloadArgs> for AddressPayload {
    fn from(args: PayloadArgs) -> Self {
        AddressPayload {
            street: args.street,
            city: args.city,
            state: args.state,
            country: args.country,
            postal_code: args.postal_code,
            latitude: args.latitude,
            longitude: args.longitude,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Address to bind (defaults to config, then 0.0.0.0)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (defaults to config, then 8000)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Write a config file with the current settings
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Add an address
    Add {
        #[command(flatten)]
        payload: PayloadArgs,
    },

    /// Show one address
    Get {
        id: i64,
    },

    /// List every address
    List,

    /// Replace every field of an address
    Update {
        id: i64,

        #[command(flatten)]
        payload: PayloadArgs,
    },

    /// Delete an address
    Delete {
        id: i64,
    },

    /// List addresses within a planar distance (in degrees) of a point
    Near {
        #[arg(long, allow_hyphen_values = true)]
        latitude: f64,
        #[arg(long, allow_hyphen_values = true)]
        longitude: f64,
        #[arg(long)]
        distance: f64,
    },
}

fn print_address(address: &Address) {
    println!(
        "#{} {}, {}, {} {}, {} ({}, {})",
        address.id,
        address.street,
        address.city,
        address.state,
        address.postal_code,
        address.country,
        address.latitude,
        address.longitude
    );
}

fn print_addresses(addresses: &[Address]) {
    if addresses.is_empty() {
        println!("∅ No addresses found.");
    } else {
        for address in addresses {
            print_address(address);
        }
    }
}

/// Make sure the database directory exists, then open the service on it
fn open_service(database: &Path) -> anyhow::Result<AddressService> {
    config::ensure_db_dir(database)?;
    Ok(AddressService::open(database)?)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let config_path = cli.config.clone().unwrap_or_else(config::default_config_path);
    let mut settings = config::load_config(Some(&config_path))?.unwrap_or_default();
    if let Some(database) = &cli.database {
        settings.database = Some(database.to_string_lossy().to_string());
    }
    let database = settings.database_path();

    match cli.command {
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| settings.host().to_string());
            let port = port.unwrap_or_else(|| settings.port());
            let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

            let service = open_service(&database)?;
            tracing::info!("Serving {:?}", database);

            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(addressbook::server::start_server(addr, service))?;
        }

        Commands::Init { force } => {
            let written = AddressBookConfig {
                database: Some(database.to_string_lossy().to_string()),
                host: Some(settings.host().to_string()),
                port: Some(settings.port()),
            };
            config::write_config(&config_path, &written, force)?;
            println!("✅ Wrote {:?}", config_path);
        }

        Commands::Add { payload } => {
            let service = open_service(&database)?;
            let address = service.add_address(payload.into())?;
            print_address(&address);
        }

        Commands::Get { id } => {
            let service = open_service(&database)?;
            print_address(&service.get_address_by_id(id)?);
        }

        Commands::List => {
            let service = open_service(&database)?;
            print_addresses(&service.get_all_addresses()?);
        }

        Commands::Update { id, payload } => {
            let service = open_service(&database)?;
            service.update_address(id, payload.into())?;
            println!("✅ Address {} updated", id);
        }

        Commands::Delete { id } => {
            let service = open_service(&database)?;
            service.delete_address(id)?;
            println!("✅ Address {} deleted", id);
        }

        Commands::Near { latitude, longitude, distance } => {
            let service = open_service(&database)?;
            print_addresses(&service.get_addresses_within_distance(latitude, longitude, distance)?);
        }
    }

    Ok(())
}
