//! `cosapi` command-line entry point.

mod config;
mod progress;

use std::path::PathBuf;
use std::sync::mpsc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use cosapi_client::{CosClient, ListOptions, SliceOptions, Transport, UploadOutcome};
use cosapi_protocol::constants::ListPattern;
use tracing_subscriber::EnvFilter;

/// Upload files to and manage objects in COS buckets.
#[derive(Parser, Debug)]
#[command(name = "cosapi", version, about)]
struct Cli {
    /// Configuration file (defaults to the platform config directory).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload a file in one request.
    Upload(UploadArgs),
    /// Upload a file in resumable slices.
    UploadSlice {
        #[command(flatten)]
        target: UploadArgs,
        /// Desired slice size in bytes (512 KiB to 3 MiB; 0 lets the service choose).
        #[arg(long)]
        slice_size: Option<u64>,
        /// Session id of an interrupted upload to resume.
        #[arg(long)]
        session: Option<String>,
    },
    /// Upload a file, slicing it when it is large.
    UploadAuto(UploadArgs),
    /// Create a folder (path must end with '/').
    Mkdir {
        bucket: String,
        path: String,
        #[arg(long)]
        overwrite: bool,
        #[arg(long)]
        biz_attr: Option<String>,
    },
    /// List a folder.
    Ls {
        bucket: String,
        #[arg(default_value = "/")]
        path: String,
        #[arg(long, default_value_t = 20)]
        num: u32,
        /// both, dir or file.
        #[arg(long, default_value = "both")]
        pattern: ListPattern,
        /// Cursor returned as `context` by the previous page.
        #[arg(long, default_value = "")]
        offset: String,
        /// 0 ascending, 1 descending.
        #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=1))]
        order: u8,
    },
    /// Show the attributes of a file or folder.
    Stat { bucket: String, path: String },
    /// Replace the business attributes of a file or folder.
    Update {
        bucket: String,
        path: String,
        #[arg(long)]
        biz_attr: String,
    },
    /// Delete a file or an empty folder.
    Rm { bucket: String, path: String },
}

#[derive(clap::Args, Debug)]
struct UploadArgs {
    /// Local file.
    src: PathBuf,
    bucket: String,
    /// Remote path, starting with '/'.
    dst: String,
    #[arg(long)]
    biz_attr: Option<String>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = config::load(cli.config.as_deref())?;

    let transport = Transport::initialize(&config).context("initializing HTTP transport")?;
    let (tx, rx) = mpsc::channel();
    let reporter = progress::spawn_reporter(rx);

    let mut client = CosClient::connect(&transport, config)?.with_events(tx);
    let outcome = run(&mut client, cli.command);
    drop(client);
    progress::finish(reporter);
    transport.shutdown();

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    if !outcome.is_success() {
        std::process::exit(1);
    }
    Ok(())
}

fn run(client: &mut CosClient, command: Command) -> UploadOutcome {
    match command {
        Command::Upload(args) => {
            client.upload(&args.src, &args.bucket, &args.dst, args.biz_attr.as_deref())
        }
        Command::UploadSlice {
            target,
            slice_size,
            session,
        } => {
            let options = SliceOptions {
                biz_attr: target.biz_attr,
                slice_size,
                session,
            };
            client.upload_slice(&target.src, &target.bucket, &target.dst, &options)
        }
        Command::UploadAuto(args) => {
            client.upload_auto(&args.src, &args.bucket, &args.dst, args.biz_attr.as_deref())
        }
        Command::Mkdir {
            bucket,
            path,
            overwrite,
            biz_attr,
        } => client.create_folder(&bucket, &path, overwrite, biz_attr.as_deref()),
        Command::Ls {
            bucket,
            path,
            num,
            pattern,
            offset,
            order,
        } => {
            let options = ListOptions {
                num,
                pattern,
                offset,
                order,
            };
            client.list(&bucket, &path, &options)
        }
        Command::Stat { bucket, path } => client.stat(&bucket, &path),
        Command::Update {
            bucket,
            path,
            biz_attr,
        } => client.update(&bucket, &path, Some(&biz_attr)),
        Command::Rm { bucket, path } => client.delete(&bucket, &path),
    }
}
