//! # crashtrace - Main Entry Point
//!
//! Exercises both capture paths against this process's own stack:
//! - **capture**: resolved, demangled trace printed to stdout
//! - **dump**: signal-safe raw dump to a file descriptor
//! - **regions**: the loaded-region table used for attribution

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};

use crashtrace::cli::{with_stack_depth, Args, Command};
use crashtrace::domain::CliError;
use crashtrace::symbolization::RegionTable;
use crashtrace::{dumper, safe_write, walker};

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_USAGE: i32 = 2;

fn main() {
    env_logger::init();
    std::process::exit(match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            let code = exit_code_for(&e);
            eprintln!("error: {e:#}");
            code
        }
    });
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<CliError>() {
        Some(CliError::InvalidFd(_) | CliError::DepthTooLarge { .. }) => EXIT_USAGE,
        _ => EXIT_ERROR,
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    // Load the unwinder before anything might need the signal-safe path
    dumper::prime();

    if !args.quiet {
        eprintln!("crashtrace v{}", env!("CARGO_PKG_VERSION"));
        eprintln!("pid: {}", std::process::id());
    }

    match args.command {
        Command::Capture { skip, depth } => {
            info!("Capturing trace (skip: {skip}, padding: {depth})");
            let trace = with_stack_depth(depth, || walker::capture_trace(skip))?;
            print!("{trace}");
        }
        Command::Dump { fd, depth, signal } => {
            if fd < 0 {
                return Err(CliError::InvalidFd(fd).into());
            }
            debug!("Dumping to fd {fd} (padding: {depth})");
            with_stack_depth(depth, || {
                if let Some(sig) = signal {
                    safe_write::write_bytes(fd, b"signal ");
                    safe_write::write_int(fd, i64::from(sig));
                    safe_write::write_bytes(fd, b"\n");
                }
                dumper::dump_to_fd(fd);
            })?;
        }
        Command::Regions { exec_only, modules } => {
            let table = RegionTable::current_process()
                .context("Failed to build region table for this process")?;
            info!("Found {} regions", table.len());
            if modules {
                for (path, range) in table.modules() {
                    println!("{:#x}-{:#x} {:>8} KB {path}", range.start, range.end, range.size() / 1024);
                }
            } else {
                for region in table.iter().filter(|r| !exec_only || r.is_executable()) {
                    println!("{region}");
                }
            }
        }
    }

    Ok(())
}
