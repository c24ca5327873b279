use clap::Parser;

#[derive(Debug, Parser)]
#[command(
    name = "oncat-login",
    about = "Log in to ONCat and list its instruments",
    disable_version_flag = true
)]
pub struct Cli {
    /// Print the version and exit
    #[arg(long = "version", visible_alias = "v")]
    pub version: bool,

    /// Identity key selecting the client id and token file
    #[arg(long, default_value = "shiver")]
    pub key: String,

    /// Configuration file (defaults to $ONCAT_LOGIN_CONFIG or ./config.toml)
    #[arg(long)]
    pub config: Option<String>,
}
