//! Alerts, prompts and the activity spinner used by every screen.

use anyhow::Result;
use colored::Colorize;
use dialoguer::{Confirm, Input};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::time::Duration;

use crate::api::is_not_found;

pub fn is_interactive() -> bool {
    std::io::stdin().is_terminal() && std::io::stdout().is_terminal()
}

pub fn success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

pub fn next_step(command: &str) {
    println!();
    println!("  → {}", command.cyan());
}

/// Error alert; the full context chain on one line
pub fn error(err: &anyhow::Error) {
    eprintln!("{} {:#}", "✗ Error:".red().bold(), err);
}

/// Give "not found" errors the screen's own wording
pub fn label_not_found(err: anyhow::Error, message: &'static str) -> anyhow::Error {
    if is_not_found(&err) {
        err.context(message)
    } else {
        err
    }
}

pub fn header(title: &str) {
    println!("{}", title.bold());
    println!("────────────────────────────────");
}

/// Activity indicator shown while a request is in flight
pub fn spinner(message: &str) -> ProgressBar {
    if !is_interactive() {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Use the flag value if given, otherwise ask (pre-filled with `initial`).
/// Without a terminal the initial value is kept.
pub fn text_or_prompt(value: Option<String>, prompt: &str, initial: &str) -> Result<String> {
    if let Some(value) = value {
        return Ok(value);
    }
    if !is_interactive() {
        return Ok(initial.to_string());
    }

    let text = Input::<String>::new()
        .with_prompt(prompt)
        .with_initial_text(initial)
        .allow_empty(true)
        .interact_text()?;
    Ok(text)
}

/// Ask for confirmation unless `force` is set. Without a terminal, refuse.
pub fn confirm(prompt: &str, force: bool) -> Result<bool> {
    if force {
        return Ok(true);
    }
    if !is_interactive() {
        println!("Usa --force para confirmar sin preguntar");
        return Ok(false);
    }
    Ok(Confirm::new().with_prompt(prompt).default(false).interact()?)
}
