use clap::{ArgAction, Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const AFTER_HELP: &str = "\
Examples:
  $ echo \"foo:aaa\\tbar:bbb\" | lltsv -k foo,bar
  $ lltsv -k foo,bar -K file*.log
  $ lltsv -k resptime,status,uri -f 'resptime > 6' -f 'uri =~ ^/foo' access_log
  $ lltsv -k resptime,upstream_resptime,diff_ms \\
        -e 'diff_ms = (resptime - upstream_resptime) * 1000' access_log
  $ lltsv -t 'localtime=2018-01-01T00:00:00+0900~2018-03-30T23:59:59+0900,iso8601' access_log

Filter operators:
  > >= < <=          arithmetic comparison (f64)
  == ==* != !=*      string comparison
  =~ !~ =~* !~*      regular expression
  Operators ending with * are case-insensitive. Multiple -f combine with AND.

Expression operators:
  + - * / and parentheses over field names and numbers.

Time formats for -t:
  iso8601   2006-01-02T15:04:05-0700
  common    02/Jan/2006:15:04:05 -0700

The output is colorized when writing to a terminal.";

/// List specified keys of LTSV (Labeled Tab Separated Values)
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None, after_help = AFTER_HELP)]
pub struct Cli {
    /// Keys to output (multiple keys separated by ,)
    #[arg(short = 'k', long = "key", value_delimiter = ',')]
    pub keys: Vec<String>,

    /// Output without keys (and without color)
    #[arg(short = 'K', long)]
    pub no_key: bool,

    /// Keys to leave out (multiple keys separated by ,); ignored with --key
    #[arg(short = 'i', long = "ignore-key", value_delimiter = ',')]
    pub ignore_keys: Vec<String>,

    /// Filter expression, e.g. 'resptime > 6' (repeatable, AND)
    #[arg(short = 'f', long = "filter")]
    pub filters: Vec<String>,

    /// Derive a field, e.g. 'diff = resptime - upstream_resptime' (repeatable)
    #[arg(short = 'e', long = "expr")]
    pub exprs: Vec<String>,

    /// Keep a period of time, e.g. 'time=<from>~<to>,iso8601' (repeatable, AND)
    #[arg(short = 't', long = "timegrep")]
    pub timegreps: Vec<String>,

    /// When to colorize the output
    #[arg(long, value_enum)]
    pub color: Option<ColorMode>,

    /// Profile file (json5) with default options
    #[arg(short, long, env = "LLTSV_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase diagnostic output (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only report errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Input files; standard input when none are given
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Colorize when stdout is a terminal
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    /// Resolve against the terminal probe made by the caller
    pub fn enabled(&self, is_terminal: bool) -> bool {
        match self {
            ColorMode::Auto => is_terminal,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

pub fn cli_parse() -> Cli {
    Cli::parse()
}
