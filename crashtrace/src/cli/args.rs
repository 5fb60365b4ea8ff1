//! CLI argument definitions

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "crashtrace",
    about = "Capture and print the current call stack",
    after_help = "\
EXAMPLES:
    crashtrace capture                       Resolved trace of this process
    crashtrace capture --skip 2 --depth 20   Hide 2 frames, pad the stack by 20
    crashtrace dump --fd 2 --signal 11       Signal-safe dump to stderr with a header
    crashtrace regions                       List loaded memory regions"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Render a resolved stack trace (allocating path)
    Capture {
        /// Number of innermost frames to omit
        #[arg(short, long, default_value = "0")]
        skip: usize,

        /// Extra recursive frames to place on the stack before capturing
        #[arg(short, long, default_value = "0")]
        depth: usize,
    },

    /// Write raw frame symbols to a file descriptor (signal-safe path)
    Dump {
        /// Destination file descriptor
        #[arg(long, default_value = "2")]
        fd: i32,

        /// Extra recursive frames to place on the stack before dumping
        #[arg(short, long, default_value = "0")]
        depth: usize,

        /// Write "signal <N>" ahead of the frames
        #[arg(long, value_name = "N")]
        signal: Option<i32>,
    },

    /// List the memory regions mapped into this process
    Regions {
        /// Only show executable mappings
        #[arg(long)]
        exec_only: bool,

        /// Show one merged range per loaded module instead of every mapping
        #[arg(long, conflicts_with = "exec_only")]
        modules: bool,
    },
}
