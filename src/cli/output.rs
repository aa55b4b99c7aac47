//! Terminal output for deploy runs. Colors are dropped when NO_COLOR is set.

use console::{style, StyledObject};
use std::fmt::Display;

const RULE_WIDTH: usize = 56;

fn colors_enabled() -> bool {
    std::env::var("NO_COLOR").is_err()
}

fn paint<D: Display>(value: D, f: impl FnOnce(StyledObject<D>) -> StyledObject<D>) -> String {
    paint_if(colors_enabled(), value, f)
}

fn paint_if<D: Display>(
    enabled: bool,
    value: D,
    f: impl FnOnce(StyledObject<D>) -> StyledObject<D>,
) -> String {
    if enabled {
        f(style(value)).to_string()
    } else {
        value.to_string()
    }
}

pub fn info(msg: &str) {
    println!("{}", msg);
}

/// Example: `✓ deployed orders_sp`
pub fn success(msg: &str) {
    println!("{} {}", paint("✓", |s| s.green()), msg);
}

/// Printed to stderr. Example: `✗ secret not found`
pub fn error(msg: &str) {
    eprintln!("{} {}", paint("✗", |s| s.red()), msg);
}

/// Example: `⚠ skipping steps/foo, no snowflake.yml found`
pub fn warn(msg: &str) {
    println!("{} {}", paint("⚠", |s| s.yellow()), msg);
}

/// Example: `→ pass --secrets-file`
pub fn hint(msg: &str) {
    println!("{} {}", paint("→", |s| s.cyan()), paint(msg, |s| s.cyan()));
}

/// Example: `  database:  PROD`
pub fn kv(label: &str, value: impl Display) {
    println!("  {}  {}", paint(label, |s| s.dim()), paint(value, |s| s.bold()));
}

pub fn list_item(item: &str) {
    println!("  • {}", item);
}

/// Inline project path.
pub fn path(p: &str) -> String {
    paint(p, |s| s.cyan())
}

/// Output captured from `snow`, indented and dimmed. Blank lines are dropped.
pub fn captured(text: &str) {
    for line in text.lines().filter(|l| !l.trim().is_empty()) {
        println!("    {}", paint(line, |s| s.dim()));
    }
}

/// Bold title under a blank line, followed by a rule.
pub fn section(title: &str) {
    println!();
    println!("{}", paint(title, |s| s.bold()));
    println!("{}", paint("─".repeat(RULE_WIDTH), |s| s.dim()));
}
