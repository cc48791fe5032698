//! Terminal output for the CLI.
//!
//! Per-target status lines go through [`print_status`]: successes to stdout,
//! failures and warnings to stderr, colored only when the stream supports it.

use std::time::Duration;

use anyhow::Context;
use clap::ValueEnum;
use owo_colors::{AnsiColors, OwoColorize, Stream};

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

impl OutputFormat {
  pub fn is_json(self) -> bool {
    matches!(self, OutputFormat::Json)
  }
}

pub const ARROW: &str = "→";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
  Success,
  Failure,
  Warning,
}

impl Status {
  fn symbol(self) -> &'static str {
    match self {
      Status::Success => "✓",
      Status::Failure => "✗",
      Status::Warning => "⚠",
    }
  }

  fn color(self) -> AnsiColors {
    match self {
      Status::Success => AnsiColors::Green,
      Status::Failure => AnsiColors::Red,
      Status::Warning => AnsiColors::Yellow,
    }
  }

  fn stream(self) -> Stream {
    match self {
      Status::Success => Stream::Stdout,
      Status::Failure | Status::Warning => Stream::Stderr,
    }
  }
}

/// `1m 5s`, `1.50s` or `50ms`, depending on magnitude.
pub fn format_duration(duration: Duration) -> String {
  let secs = duration.as_secs();
  match secs {
    0 => format!("{}ms", duration.subsec_millis()),
    1..60 => format!("{}.{:02}s", secs, duration.subsec_millis() / 10),
    _ => format!("{}m {}s", secs / 60, secs % 60),
  }
}

pub fn print_status(status: Status, message: &str) {
  let stream = status.stream();
  let symbol_text = status.symbol();
  let symbol = symbol_text.if_supports_color(stream, |s| s.color(status.color()));
  match status {
    Status::Success => println!("{} {}", symbol, message),
    Status::Failure | Status::Warning => {
      eprintln!("{} {}", symbol, message.if_supports_color(stream, |s| s.color(status.color())))
    }
  }
}

/// An indented `label: value` line under a status line.
pub fn print_detail(label: &str, value: &str) {
  println!("  {}: {}", label.if_supports_color(Stream::Stdout, |s| s.dimmed()), value);
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
  println!("{}", json);
  Ok(())
}
