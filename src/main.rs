use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};

use leadcollect::client::{Backend, HttpBackend, LocalBackend};
use leadcollect::config::Config;
use leadcollect::logging;
use leadcollect::models::ImageFile;
use leadcollect::rest::{self, ApiDoc, ApiState};
use leadcollect::session::gate::resolve_route;
use leadcollect::session::FileKeyValueStore;
use leadcollect::wizard::{ProductForm, SellerForm, Wizard, WizardError};

#[derive(Parser)]
#[command(name = "leadcollect")]
#[command(about = "Seller onboarding and product lead capture")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long)]
    config: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Use the local database instead of the REST API
    #[arg(long)]
    local: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the REST API server
    Serve {
        /// Port to listen on (default: api.port from config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Authenticate with a name and phone number
    Login {
        #[arg(long)]
        name: String,

        #[arg(long)]
        phone: String,
    },

    /// Create the seller for this session
    Seller {
        #[arg(long)]
        name: String,

        #[arg(long)]
        phone: String,

        /// 15-character GST number
        #[arg(long)]
        gst: String,

        /// Shop image file
        #[arg(long)]
        shop_image: PathBuf,
    },

    /// Manage the products in this session
    #[command(subcommand)]
    Product(ProductCommand),

    /// Submit the session's products as one batch
    Submit,

    /// Show the session and whether it can be submitted
    Status,

    /// Discard the session
    Reset,

    /// Export the OpenAPI document
    Openapi {
        #[arg(short, long, value_enum, default_value_t = SpecFormat::Json)]
        format: SpecFormat,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum ProductCommand {
    /// Add a product
    Add(ProductArgs),

    /// Replace the product at INDEX
    Edit {
        index: usize,

        #[command(flatten)]
        product: ProductArgs,
    },

    /// Remove the product at INDEX
    Remove { index: usize },
}

#[derive(Args)]
struct ProductArgs {
    #[arg(long)]
    name: String,

    /// Maximum retail price
    #[arg(long)]
    mrp: f64,

    /// Minimum selling price
    #[arg(long)]
    msp: f64,

    #[arg(long)]
    front: PathBuf,

    #[arg(long)]
    side: PathBuf,

    #[arg(long)]
    back: PathBuf,
}

#[derive(Clone, Copy, ValueEnum)]
enum SpecFormat {
    Json,
    Yaml,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;

    let is_server = matches!(cli.command, Commands::Serve { .. });
    let logging_handle = logging::init_logging(&config, is_server, cli.debug)?;

    match cli.command {
        Commands::Serve { port } => {
            cmd_serve(config, port, logging_handle.log_file_path).await?;
        }
        Commands::Openapi { format, output } => {
            cmd_openapi(format, output)?;
        }
        command if cli.local => {
            let service = rest::state::build_service(&config)?;
            run_session(&config, LocalBackend::new(service), command).await?;
        }
        command => {
            let backend = HttpBackend::from_config(&config)?;
            run_session(&config, backend, command).await?;
        }
    }

    Ok(())
}

async fn cmd_serve(config: Config, port: Option<u16>, log_file_path: Option<PathBuf>) -> Result<()> {
    let port = port.unwrap_or(config.api.port);
    if let Some(path) = log_file_path {
        eprintln!("Logging to {}", path.display());
    }

    let state = ApiState::from_config(config)?;
    println!("Serving on http://localhost:{}", port);
    rest::serve(state, port).await
}

fn cmd_openapi(format: SpecFormat, output: Option<PathBuf>) -> Result<()> {
    let spec = match format {
        SpecFormat::Json => ApiDoc::json().context("Failed to generate OpenAPI JSON")?,
        SpecFormat::Yaml => ApiDoc::yaml().context("Failed to generate OpenAPI YAML")?,
    };

    match output {
        Some(path) => {
            std::fs::write(&path, spec)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote {}", path.display());
        }
        None => println!("{}", spec),
    }
    Ok(())
}

async fn run_session<B: Backend>(config: &Config, backend: B, command: Commands) -> Result<()> {
    let store = FileKeyValueStore::new(config.state_path());
    let capacity = config.capacity().context("Invalid product capacity")?;
    let mut wizard = Wizard::open(backend, store, capacity)?;

    match command {
        Commands::Login { name, phone } => {
            let user = wizard.authenticate(&name, &phone).await.map_err(explain)?;
            println!(
                "Signed in as {} ({})",
                user.name.unwrap_or_default(),
                user.id.unwrap_or_default()
            );
            if let Some(stats) = user.stats {
                println!(
                    "  {} sellers, {} products so far",
                    stats.total_sellers, stats.total_products
                );
            }
        }
        Commands::Seller {
            name,
            phone,
            gst,
            shop_image,
        } => {
            let form = SellerForm {
                name,
                phone,
                gst_number: gst,
                shop_image: read_image(&shop_image)?,
            };
            let seller = wizard.create_seller(form).await.map_err(explain)?;
            println!("Seller created: {}", seller.id.unwrap_or_default());
            println!(
                "Add between {} and {} products next",
                wizard.capacity().minimum(),
                wizard.capacity().maximum()
            );
        }
        Commands::Product(ProductCommand::Add(args)) => {
            let index = wizard
                .add_product(args.into_form()?)
                .await
                .map_err(explain)?;
            println!(
                "Added product #{} ({}/{})",
                index,
                wizard.state().products.len(),
                wizard.capacity().maximum()
            );
        }
        Commands::Product(ProductCommand::Edit { index, product }) => {
            wizard
                .update_product(index, product.into_form()?)
                .await
                .map_err(explain)?;
            println!("Updated product #{}", index);
        }
        Commands::Product(ProductCommand::Remove { index }) => {
            wizard.remove_product(index).map_err(explain)?;
            println!("Removed product #{}", index);
        }
        Commands::Submit => {
            let receipt = wizard.submit().await.map_err(explain)?;
            println!("{} ({} products)", receipt.message, receipt.count);
        }
        Commands::Status => print_status(&wizard),
        Commands::Reset => {
            wizard.reset()?;
            println!("Session cleared");
        }
        Commands::Serve { .. } | Commands::Openapi { .. } => {
            bail!("not a session command")
        }
    }
    Ok(())
}

fn print_status<B: Backend>(wizard: &Wizard<B, FileKeyValueStore>) {
    let state = wizard.state();
    println!("Step:    {}", state.current_step);
    println!("Route:   {}", resolve_route(state));

    match &state.user {
        Some(user) => println!(
            "User:    {} ({})",
            user.name.as_deref().unwrap_or("-"),
            user.phone.as_deref().unwrap_or("-")
        ),
        None => println!("User:    not signed in"),
    }
    match &state.seller {
        Some(seller) => println!(
            "Seller:  {} [{}]",
            seller.name.as_deref().unwrap_or("-"),
            seller.gst_number.as_deref().unwrap_or("-")
        ),
        None => println!("Seller:  none"),
    }

    println!(
        "Products ({}/{}):",
        state.products.len(),
        wizard.capacity().maximum()
    );
    for (i, product) in state.products.iter().enumerate() {
        println!(
            "  #{} {}  MRP {}  MSP {}",
            i,
            product.name.as_deref().unwrap_or("-"),
            product.mrp.map(|v| v.to_string()).unwrap_or_default(),
            product.msp.map(|v| v.to_string()).unwrap_or_default()
        );
    }

    match wizard.session().check_submission() {
        Ok(()) => println!("Ready to submit"),
        Err(blocked) => println!("Not ready: {}", blocked),
    }
}

impl ProductArgs {
    fn into_form(self) -> Result<ProductForm> {
        Ok(ProductForm {
            name: self.name,
            mrp: self.mrp,
            msp: self.msp,
            front_image: read_image(&self.front)?,
            side_image: read_image(&self.side)?,
            back_image: read_image(&self.back)?,
        })
    }
}

fn read_image(path: &Path) -> Result<ImageFile> {
    ImageFile::read(path).with_context(|| format!("Failed to read image {}", path.display()))
}

/// Attach field-level detail from a rejected request to the error
fn explain(err: WizardError) -> anyhow::Error {
    use leadcollect::client::BackendError;

    match &err {
        WizardError::Backend(BackendError::Rejected {
            details: Some(details),
            ..
        }) => {
            let detail = serde_json::to_string_pretty(details).unwrap_or_default();
            anyhow::anyhow!("{}\n{}", err, detail)
        }
        _ => err.into(),
    }
}
