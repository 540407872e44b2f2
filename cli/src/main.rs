use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use boardgate::auth::{AuthError, AuthFlow, Credentials, RegistrationError};
use boardgate::session::{FileSessionStore, SessionStore};
use boardgate::transport::{CredentialTransport, HttpTransport};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("cannot locate home directory; pass --session-file or set BOARDGATE_SESSION_FILE")]
    NoHomeDir,
    #[error("{0}")]
    Auth(#[from] AuthError),
    #[error("{0}")]
    Registration(#[from] RegistrationError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "boardgate", about = "Sign in to the identity service from a terminal")]
struct Cli {
    #[arg(long, env = "BOARDGATE_API_URL", default_value = "http://localhost:8000")]
    api_url: String,

    #[arg(long, env = "BOARDGATE_SESSION_FILE", help = "Token file, default ~/.boardgate/session")]
    session_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Exchange email and password for a stored token.
    Login(CredentialArgs),
    /// Create an account, then sign in with it.
    Register(CredentialArgs),
    /// Print the identity behind the stored token.
    Whoami,
    /// Forget the stored token.
    Logout,
}

#[derive(Args, Debug)]
struct CredentialArgs {
    #[arg(long)]
    email: String,

    #[arg(long, env = "BOARDGATE_PASSWORD", help = "Read from stdin when omitted")]
    password: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let store = FileSessionStore::new(session_path(cli.session_file)?);
    let transport: Arc<dyn CredentialTransport> = Arc::new(HttpTransport::new(&cli.api_url));
    let flow = AuthFlow::new(transport, store);

    match cli.command {
        Command::Login(args) => run_login(&flow, args).await,
        Command::Register(args) => run_register(&flow, args).await,
        Command::Whoami => run_whoami(&flow).await,
        Command::Logout => run_logout(&flow),
    }
}

fn session_path(explicit: Option<PathBuf>) -> Result<PathBuf, CliError> {
    if let Some(path) = explicit {
        return Ok(path);
    }
    let home = dirs::home_dir().ok_or(CliError::NoHomeDir)?;
    Ok(home.join(".boardgate").join("session"))
}

async fn run_login(flow: &AuthFlow<FileSessionStore>, args: CredentialArgs) -> Result<(), CliError> {
    let credentials = read_credentials(args)?;
    flow.login(&credentials).await?;
    println!("signed in as {}", credentials.email());
    Ok(())
}

async fn run_register(flow: &AuthFlow<FileSessionStore>, args: CredentialArgs) -> Result<(), CliError> {
    let credentials = read_credentials(args)?;
    let registered = flow.begin_registration(&credentials).await.map_err(RegistrationError::Register)?;
    println!("account created for {}", registered.identity().email);
    flow.complete_registration(registered).await?;
    println!("signed in as {}", credentials.email());
    Ok(())
}

async fn run_whoami(flow: &AuthFlow<FileSessionStore>) -> Result<(), CliError> {
    let identity = flow.current_user().await?;
    print_json(&serde_json::to_value(identity)?)
}

fn run_logout(flow: &AuthFlow<FileSessionStore>) -> Result<(), CliError> {
    let had_session = flow.store().get().is_some();
    flow.logout()?;
    if had_session {
        println!("signed out");
    } else {
        println!("no session");
    }
    Ok(())
}

fn read_credentials(args: CredentialArgs) -> Result<Credentials, CliError> {
    let password = match args.password {
        Some(password) => password,
        None => prompt_password(&mut io::stdin().lock(), &mut io::stderr())?,
    };
    Ok(Credentials::new(&args.email, &password)?)
}

fn prompt_password(input: &mut impl BufRead, prompt: &mut impl Write) -> Result<String, CliError> {
    write!(prompt, "password: ")?;
    prompt.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_owned())
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
