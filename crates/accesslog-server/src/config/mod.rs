//! Server config from command-line flags.

pub mod schema;

use clap::Parser;

use accesslog_core::error::Result;

pub use schema::{BackendMode, PathProfile, ServerConfig, StoragePaths};

/// accesslog: record usernames with access timestamps.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Use SQLite database for username and access timestamp logging
    #[arg(long)]
    pub sqlite: bool,

    /// Use it if you run app in k8s (data files under /data)
    #[arg(long)]
    pub k8s: bool,

    /// HTTP bind address
    #[arg(long, default_value_t = schema::default_listen())]
    pub listen: String,
}

pub fn from_args(args: Args) -> Result<ServerConfig> {
    let backend = if args.sqlite {
        BackendMode::Sqlite
    } else {
        BackendMode::File
    };
    let profile = if args.k8s {
        PathProfile::Container
    } else {
        PathProfile::Local
    };

    let cfg = ServerConfig {
        listen: args.listen,
        backend,
        storage: profile.paths(),
    };
    cfg.validate()?;
    Ok(cfg)
}
