use clap::{Args, Parser};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub client: ClientArgs,
}

#[derive(Args, Debug, Clone)]
pub struct ClientArgs {
    /// Host name or IP address of the game server.
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Port the game server listens on.
    #[arg(long, default_value_t = 8080)]
    pub port: u16,

    /// Name to play under. When omitted the server's suggestion is shown and
    /// can be replaced at the prompt.
    #[arg(long)]
    pub name: Option<String>,
}
