//! `dpav` — command-line client for the DPAV admin API.
//!
//! Manages contexts and the login session, and lists, searches, creates,
//! updates and deletes dogs and breeds.

mod commands;
mod config;
mod render;

use std::io::Write;

use clap::{Args, Parser, Subcommand};

use commands::resource::{BreedFields, DogFields};

#[derive(Parser, Debug)]
#[command(name = "dpav", about = "DPAV admin CLI")]
struct Cli {
    /// Path to client config file (default: ~/.dpav/config.toml).
    #[arg(long = "config", global = true)]
    config: Option<String>,

    /// Output format: table or json.
    #[arg(long = "output", short = 'o', global = true, default_value = "table")]
    output: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage contexts.
    Context {
        #[command(subcommand)]
        action: ContextAction,
    },

    /// Switch the current context.
    #[command(name = "use")]
    Use {
        #[command(subcommand)]
        what: UseWhat,
    },

    /// Log in to the current context's API.
    Login {
        #[arg(long)]
        email: Option<String>,
        /// Password (not recommended — use interactive prompt).
        #[arg(long)]
        password: Option<String>,
    },

    /// Log out: forget the stored session.
    Logout,

    /// Create a new user account.
    Register(RegisterArgs),

    /// Dogs (`perros`).
    Dogs {
        #[command(subcommand)]
        action: DogAction,
    },

    /// Breeds (`razas`).
    Breeds {
        #[command(subcommand)]
        action: BreedAction,
    },

    /// Show context, session and API reachability.
    Status,

    Version,
}

#[derive(Subcommand, Debug)]
enum ContextAction {
    /// Create a new context.
    Create {
        name: String,
        /// API base URL (default: http://127.0.0.1:8000/api).
        #[arg(long)]
        server: Option<String>,
    },
    List,
    /// Set properties on a context.
    Set {
        name: String,
        #[arg(long)]
        server: Option<String>,
    },
    Delete { name: String },
}

#[derive(Subcommand, Debug)]
enum UseWhat {
    /// Switch to a context.
    Context { name: String },
}

#[derive(Args, Debug)]
struct RegisterArgs {
    #[arg(long)]
    nombre: Option<String>,
    #[arg(long = "apellido-paterno")]
    apellido_paterno: Option<String>,
    /// Ten digits; anything else is stripped.
    #[arg(long)]
    telefono: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    password: Option<String>,
}

#[derive(Subcommand, Debug)]
enum DogAction {
    List {
        /// Case-insensitive filter on name or breed.
        #[arg(long, short = 's')]
        search: Option<String>,
    },
    Create(DogFields),
    Update {
        id: String,
        #[command(flatten)]
        fields: DogFields,
    },
    Delete {
        id: String,
        /// Skip confirmation.
        #[arg(long = "yes", short = 'y')]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
enum BreedAction {
    List {
        /// Case-insensitive filter on name.
        #[arg(long, short = 's')]
        search: Option<String>,
    },
    Create(BreedFields),
    Update {
        id: String,
        #[command(flatten)]
        fields: BreedFields,
    },
}

fn prompt(label: &str) -> anyhow::Result<String> {
    eprint!("{}: ", label);
    std::io::stderr().flush()?;
    let mut s = String::new();
    std::io::stdin().read_line(&mut s)?;
    Ok(s.trim().to_string())
}

fn or_prompt(value: Option<String>, label: &str) -> anyhow::Result<String> {
    match value {
        Some(v) => Ok(v),
        None => prompt(label),
    }
}

fn or_prompt_password(value: Option<String>, label: &str) -> anyhow::Result<String> {
    match value {
        Some(v) => Ok(v),
        None => Ok(rpassword::prompt_password(format!("{}: ", label))?),
    }
}

fn confirm(question: &str) -> anyhow::Result<bool> {
    let answer = prompt(&format!("{} [y/N]", question))?;
    Ok(answer.eq_ignore_ascii_case("y"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();

    let config_path = cli
        .config
        .map(std::path::PathBuf::from)
        .unwrap_or_else(config::ClientConfig::default_path);
    let json_output = cli.output == "json";

    match cli.command {
        Commands::Context { action } => match action {
            ContextAction::Create { name, server } => {
                commands::context::create(&name, server.as_deref(), &config_path)?;
            }
            ContextAction::List => {
                commands::context::list(&config_path)?;
            }
            ContextAction::Set { name, server } => {
                commands::context::set(&name, server.as_deref(), &config_path)?;
            }
            ContextAction::Delete { name } => {
                commands::context::delete(&name, &config_path)?;
            }
        },

        Commands::Use { what } => match what {
            UseWhat::Context { name } => {
                commands::context::use_context(&name, &config_path)?;
            }
        },

        Commands::Login { email, password } => {
            let email = or_prompt(email, "Correo electrónico")?;
            let password = or_prompt_password(password, "Contraseña")?;
            commands::auth::login(&email, &password, &config_path).await?;
        }

        Commands::Logout => {
            commands::auth::logout(&config_path).await?;
        }

        Commands::Register(args) => {
            let registration = dpav_client::Registration {
                nombre: or_prompt(args.nombre, "Nombre")?,
                apellido_paterno: or_prompt(args.apellido_paterno, "Apellido paterno")?,
                telefono: or_prompt(args.telefono, "Teléfono")?,
                email: or_prompt(args.email, "Correo electrónico")?,
                password: or_prompt_password(args.password, "Contraseña")?,
            };
            commands::auth::register(registration, &config_path).await?;
        }

        Commands::Dogs { action } => match action {
            DogAction::List { search } => {
                commands::resource::list_dogs(search.as_deref(), json_output, &config_path)
                    .await?;
            }
            DogAction::Create(fields) => {
                commands::resource::create_dog(&fields, &config_path).await?;
            }
            DogAction::Update { id, fields } => {
                commands::resource::update_dog(&id, &fields, &config_path).await?;
            }
            DogAction::Delete { id, yes } => {
                if !yes && !confirm(&format!("¿Eliminar el perro {}?", id))? {
                    println!("Cancelado.");
                    return Ok(());
                }
                commands::resource::delete_dog(&id, &config_path).await?;
            }
        },

        Commands::Breeds { action } => match action {
            BreedAction::List { search } => {
                commands::resource::list_breeds(search.as_deref(), json_output, &config_path)
                    .await?;
            }
            BreedAction::Create(fields) => {
                commands::resource::create_breed(&fields, &config_path).await?;
            }
            BreedAction::Update { id, fields } => {
                commands::resource::update_breed(&id, &fields, &config_path).await?;
            }
        },

        Commands::Status => {
            commands::auth::status(&config_path).await?;
        }

        Commands::Version => {
            println!("dpav cli v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
