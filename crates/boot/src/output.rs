//! Terminal output for command summaries
//!
//! Per-file transfer lines go through tracing; these helpers only print the
//! framing around them.

use console::style;

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", style("✓").green().bold(), msg);
}

/// Print an error message, including its cause chain
pub fn error(msg: &str) {
    eprintln!("{} {}", style("✗").red().bold(), msg);
}

/// Print a dry-run notice
pub fn dry_run(msg: &str) {
    eprintln!("{} {}", style("(dry run)").yellow().bold(), msg);
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", style("ℹ").blue().bold(), msg);
}

/// Print a section header
pub fn header(msg: &str) {
    println!("\n{}", style(msg).bold().underlined());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", style(key).dim(), value);
}

/// Print a key followed by a comma-separated list, or `none`
pub fn kv_list<'a>(key: &str, items: impl IntoIterator<Item = &'a str>) {
    kv(key, &join_or_none(items));
}

fn join_or_none<'a>(items: impl IntoIterator<Item = &'a str>) -> String {
    let joined = items.into_iter().collect::<Vec<_>>().join(", ");
    if joined.is_empty() {
        "none".to_string()
    } else {
        joined
    }
}
