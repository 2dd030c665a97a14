use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use sfs::{
    disk::{
        init::open_volume,
        types::{DEFAULT_SECTOR_SIZE, DEFAULT_TOTAL_SECTORS},
    },
    fs::config::DEFAULT_MAX_RETRIES,
    FsOptions, Geometry,
};

use crate::shell::start_shell;

mod shell;

#[derive(Parser, Debug)]
#[command(name = "sfs", about = "Interactive shell over a simple sector file system")]
struct Args {
    /// Disk image backing the volume; created when missing.
    #[arg(long, env = "SFS_DISK", default_value = "disk.img")]
    disk: PathBuf,

    #[arg(long, env = "SFS_SECTORS", default_value_t = DEFAULT_TOTAL_SECTORS)]
    sectors: u32,

    #[arg(long, env = "SFS_SECTOR_SIZE", default_value_t = DEFAULT_SECTOR_SIZE)]
    sector_size: usize,

    /// Retries after a transient device failure.
    #[arg(long, env = "SFS_MAX_RETRIES", default_value_t = DEFAULT_MAX_RETRIES)]
    max_retries: u32,

    /// Format the image even if it already holds a file system.
    #[arg(long)]
    format: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let geometry = Geometry::new(args.sectors, args.sector_size);
    let options = FsOptions {
        max_retries: args.max_retries,
    };

    match open_volume(&args.disk, geometry, options, args.format) {
        Ok((fs, boot)) => start_shell(fs, boot),
        Err(e) => {
            eprintln!("sfs: cannot open {}: {}", args.disk.display(), e);
            std::process::exit(1);
        }
    }
}
