use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;

use resource_gateway::client::{
    ApiClient, CreateBooking, CreateParc, CreateUser, Resource, ResourceClient,
};
use resource_gateway::config::{ObservabilityConfig, UpstreamConfig};
use resource_gateway::observability::init_logging;
use resource_gateway::{ApiError, RetryPolicy};

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Call the upstream resource API with retries", long_about = None)]
struct Cli {
    #[arg(short, long, env = "EUROCAMP_API_URL", default_value = "http://localhost:3001")]
    url: String,

    /// Per-attempt timeout in milliseconds.
    #[arg(long, env = "CLIENT_SERVICE_TIMEOUT", default_value_t = 5000)]
    timeout_ms: u64,

    /// Retries after the first attempt.
    #[arg(long, env = "CLIENT_SERVICE_RETRY_ATTEMPTS", default_value_t = 3)]
    retries: u32,

    /// Delay between attempts in milliseconds.
    #[arg(long, env = "CLIENT_SERVICE_RETRY_DELAY", default_value_t = 1000)]
    delay_ms: u64,

    /// Log retries to stderr.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage users
    Users {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Manage parcs
    Parcs {
        #[command(subcommand)]
        action: ParcAction,
    },
    /// Manage bookings
    Bookings {
        #[command(subcommand)]
        action: BookingAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// List every user
    List,
    /// Fetch one user by id
    Get { id: String },
    /// Create a user
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
    },
    /// Delete a user by id
    Delete { id: String },
}

#[derive(Subcommand)]
enum ParcAction {
    /// List every parc
    List,
    /// Fetch one parc by id
    Get { id: String },
    /// Create a parc
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: String,
    },
    /// Delete a parc by id
    Delete { id: String },
}

#[derive(Subcommand)]
enum BookingAction {
    /// List every booking
    List,
    /// Fetch one booking by id
    Get { id: String },
    /// Create a booking
    Create {
        /// User id
        #[arg(long)]
        user: String,
        /// Parc id
        #[arg(long)]
        parc: String,
        /// Date as YYYY-MM-DD
        #[arg(long)]
        date: String,
        #[arg(long, default_value = "")]
        comments: String,
    },
    /// Delete a booking by id
    Delete { id: String },
}

/// One resource operation, independent of the resource kind.
enum Op<C> {
    List,
    Get(String),
    Create(C),
    Delete(String),
}

impl From<UserAction> for Op<CreateUser> {
    fn from(action: UserAction) -> Self {
        match action {
            UserAction::List => Op::List,
            UserAction::Get { id } => Op::Get(id),
            UserAction::Create { name, email } => Op::Create(CreateUser { name, email }),
            UserAction::Delete { id } => Op::Delete(id),
        }
    }
}

impl From<ParcAction> for Op<CreateParc> {
    fn from(action: ParcAction) -> Self {
        match action {
            ParcAction::List => Op::List,
            ParcAction::Get { id } => Op::Get(id),
            ParcAction::Create { name, description } => {
                Op::Create(CreateParc { name, description })
            }
            ParcAction::Delete { id } => Op::Delete(id),
        }
    }
}

impl From<BookingAction> for Op<CreateBooking> {
    fn from(action: BookingAction) -> Self {
        match action {
            BookingAction::List => Op::List,
            BookingAction::Get { id } => Op::Get(id),
            BookingAction::Create { user, parc, date, comments } => Op::Create(CreateBooking {
                user,
                parc,
                booking_date: date,
                comments,
            }),
            BookingAction::Delete { id } => Op::Delete(id),
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.verbose {
        let observability = ObservabilityConfig {
            log_level: "debug".to_string(),
            json: false,
        };
        init_logging(&observability)?;
    }

    let upstream = UpstreamConfig {
        base_url: cli.url,
        timeout_ms: cli.timeout_ms,
    };
    let client = ApiClient::new(&upstream, RetryPolicy::new(cli.retries, cli.delay_ms))?;

    let outcome = match cli.command {
        Commands::Users { action } => run(client.users(), action.into()).await,
        Commands::Parcs { action } => run(client.parcs(), action.into()).await,
        Commands::Bookings { action } => run(client.bookings(), action.into()).await,
    };

    match outcome {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            eprintln!("Error ({}): {}", e.status_code(), e);
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn run<R: Resource>(client: &ResourceClient<R>, op: Op<R::Create>) -> Result<(), ApiError> {
    match op {
        Op::List => print_json(&client.list_all().await?),
        Op::Get(id) => print_json(&client.get_by_id(&id).await?),
        Op::Create(payload) => print_json(&client.create(&payload).await?),
        Op::Delete(id) => {
            client.delete_by_id(&id).await?;
            println!("Deleted {} {}", R::NAME, id);
        }
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("Failed to render response: {}", e),
    }
}
