mod config;
mod dirs;
mod logs;
mod rsa;
mod server;
mod time;
mod types;

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};

use config::PathSet;
use server::config::ServerConfig;
use server::factory::ServerFactory;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct ServerArgs {
    /// The config directory, default is `~/.config/tourism` (or
    /// `/etc/tourism` for root).
    #[arg(long)]
    pub config_path: Option<PathBuf>,

    /// The data directory, default is `~/.local/share/tourism` (or
    /// `/var/lib/tourism` for root).
    #[arg(long)]
    pub data_path: Option<PathBuf>,

    /// Print server configuration data (JSON) and exit.
    #[arg(long)]
    pub print_config: bool,
}

async fn run(args: ServerArgs) -> Result<()> {
    let ps = PathSet::new(args.config_path, args.data_path)?;
    let cfg: ServerConfig = ps.load_config("server")?;

    if args.print_config {
        let json = serde_json::to_string_pretty(&cfg).context("encode config")?;
        println!("{json}");
        return Ok(());
    }

    cfg.logs.init().context("init logger")?;

    let factory = ServerFactory::new(cfg)?;
    let server = factory.build_server()?;

    server.run().await.context("run restful server")?;

    info!("Server exited by user");
    Ok(())
}

#[tokio::main]
async fn main() {
    let args = ServerArgs::parse();
    if let Err(e) = run(args).await {
        error!("Error: {:#}", e);
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}
