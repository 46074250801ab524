//! Command-line arguments.

use std::ffi::OsString;
use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;

use hound_lib::hound_core::types::UnitPreference;

/// Ask Houndify a question and print the written answer
#[derive(Parser, Debug)]
#[command(name = "hound", version, about)]
pub struct Cli {
    /// Verbose mode
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Unit system, 'metric' or 'imperial' (saved for later runs)
    #[arg(long, value_name = "SYSTEM", value_parser = UnitPreference::from_str)]
    pub units: Option<UnitPreference>,

    /// Send the caller's approximate location with the query
    #[arg(short = 'l', long)]
    pub locate: bool,

    /// Do not send the unit preference
    #[arg(long)]
    pub no_units: bool,

    /// Config file [default: per-user config dir, or $HOUND_CONFIG]
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Query words; joined with single spaces
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub query: Vec<String>,
}

/// Long flags also accepted with a single dash (`-units imperial`).
const LONG_FLAGS: &[&str] = &["units", "locate", "no-units", "config", "verbose"];
/// Long flags that take a separate value.
const VALUE_FLAGS: &[&str] = &["units", "config"];

/// Rewrite single-dash long flags to double-dash before clap sees them.
///
/// Stops at `--` or at the first query word, so query text is never touched.
pub fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut iter = args.into_iter();
    let mut out: Vec<OsString> = iter.next().into_iter().collect();
    let mut expect_value = false;

    for arg in iter.by_ref() {
        if expect_value {
            expect_value = false;
            out.push(arg);
            continue;
        }

        let Some(s) = arg.to_str() else {
            out.push(arg);
            break;
        };

        if s == "--" || !s.starts_with('-') {
            out.push(arg);
            break;
        }

        let long = s.strip_prefix("--").or_else(|| s.strip_prefix('-'));
        let (name, has_inline_value) = match long {
            Some(rest) => match rest.split_once('=') {
                Some((name, _)) => (name, true),
                None => (rest, false),
            },
            None => (s, false),
        };

        if LONG_FLAGS.contains(&name) {
            expect_value = VALUE_FLAGS.contains(&name) && !has_inline_value;
            if s.starts_with("--") {
                out.push(arg);
            } else {
                out.push(OsString::from(format!("-{s}")));
            }
        } else {
            out.push(arg);
        }
    }

    out.extend(iter);
    out
}
