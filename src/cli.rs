//! Command-line surface
//!
//! Single-dash options take the following argument as their value
//! (`-src <path>`), double-dash options are booleans (`--encrypt`). That
//! grammar rules out clap, so the scanner is hand-rolled. Unknown flags are
//! tolerated, and when both `--encrypt` and `--decrypt` are given the last
//! one wins.

use std::io;
use std::path::Path;

use crate::cipher::Mode;
use crate::error::{ErrorCategory, ErrorKind, FoldercryptError, Result};
use crate::keysource::{ArgKeySource, KeySource, ReaderKeySource};
use crate::mirror;

const USAGE: &str = "\
Usage: [--encrypt | --decrypt | --help] -src <path> -dst <path> -key <key>

--help - Show help information
--version - Show library version
--encrypt - Encrypt files
--decrypt - Decrypt files
--key-stdin - Read the cipher key from stdin instead of -key
-src <path> - Path to folder with source files
-dst <path> - Path to folder with output files
-key <key> - Cipher key (16, 24 or 32 bytes)";

/// Raw scan result: `-opt value` pairs and `--opt` flags, in order.
struct ParsedArgs {
    opts: Vec<(String, String)>,
    flags: Vec<String>,
}

fn parse_arguments(args: &[String]) -> Result<ParsedArgs> {
    let mut opts = Vec::new();
    let mut flags = Vec::new();

    let mut i = 0;
    while i < args.len() {
        let arg = &args[i];
        if let Some(rest) = arg.strip_prefix("--") {
            if rest.is_empty() {
                return Err(usage_error(format!("Not a valid argument: {}", arg)));
            }
            flags.push(rest.to_string());
        } else if let Some(rest) = arg.strip_prefix('-') {
            if rest.is_empty() {
                return Err(usage_error(format!("Not a valid argument: {}", arg)));
            }
            let value = args.get(i + 1).ok_or_else(|| {
                usage_error(format!("Expected arg after: {}", arg))
            })?;
            opts.push((rest.to_string(), value.clone()));
            i += 1;
        }
        // Bare tokens are ignored.
        i += 1;
    }

    Ok(ParsedArgs { opts, flags })
}

fn usage_error(msg: impl Into<String>) -> FoldercryptError {
    FoldercryptError::with_kind(ErrorCategory::User, ErrorKind::Usage, msg)
}

/// Last occurrence of a repeated `-opt` wins.
fn last_opt<'a>(parsed: &'a ParsedArgs, name: &str) -> Option<&'a str> {
    parsed
        .opts
        .iter()
        .rev()
        .find(|(flag, _)| flag == name)
        .map(|(_, value)| value.as_str())
}

/// Parse the arguments and perform the requested operation.
///
/// `--help` and `--version` print and return without touching the
/// filesystem. Anything fatal comes back as an error; the caller decides
/// the exit code.
pub fn run(args: &[String]) -> Result<()> {
    if args.is_empty() {
        return Err(usage_error(
            "No parameters found! Print --help for more information",
        ));
    }

    let parsed = parse_arguments(args)?;

    if parsed.flags.iter().any(|f| f == "version") {
        println!("Version: {}", env!("CARGO_PKG_VERSION"));
    }
    if parsed.flags.iter().any(|f| f == "help") {
        println!("{}", USAGE);
    }
    if parsed
        .flags
        .iter()
        .any(|f| f == "help" || f == "version")
    {
        return Ok(());
    }

    // Last mode flag wins.
    let mode = parsed
        .flags
        .iter()
        .rev()
        .find_map(|f| match f.as_str() {
            "encrypt" => Some(Mode::Encrypt),
            "decrypt" => Some(Mode::Decrypt),
            _ => None,
        })
        .ok_or_else(|| usage_error("no operation requested; use --encrypt or --decrypt"))?;

    let src = last_opt(&parsed, "src").ok_or_else(|| usage_error("Expected arg \"-src\""))?;
    let dst = last_opt(&parsed, "dst").ok_or_else(|| usage_error("Expected arg \"-dst\""))?;

    let mut key_source: Box<dyn KeySource> = if parsed.flags.iter().any(|f| f == "key-stdin") {
        Box::new(ReaderKeySource::new(Box::new(io::stdin())))
    } else {
        let key = last_opt(&parsed, "key").ok_or_else(|| usage_error("Expected arg \"-key\""))?;
        Box::new(ArgKeySource::new(key))
    };

    let report = mirror::run(mode, Path::new(src), Path::new(dst), &mut *key_source)?;

    // Best-effort policy: the run reports success even when individual
    // entries were skipped. The skips have already been logged as they
    // happened.
    if !report.is_complete() {
        log::warn!(
            "{} of {} entries were skipped",
            report.failures().count(),
            report.outcomes().len()
        );
    }
    println!("{}", mode.done_message());
    Ok(())
}
