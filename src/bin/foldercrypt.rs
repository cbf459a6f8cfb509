//! Foldercrypt CLI - encrypt or decrypt a whole directory tree
//!
//! Walks the source folder, mirrors its structure under the destination
//! root, and runs every regular file through AES keyed by the given
//! passphrase bytes.

use std::error::Error;
use std::process;

use foldercrypt::cli;

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Err(e) = cli::run(&args) {
        eprintln!("Error: {}", e);
        let mut cause = e.source();
        while let Some(c) = cause {
            eprintln!("  caused by: {}", c);
            cause = c.source();
        }
        process::exit(1);
    }
}
