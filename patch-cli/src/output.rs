// Output formatting helpers for CLI commands

/// Print a status message: "  Status message"
pub fn status(action: &str, message: &str) {
    eprintln!("\x1b[1;36m{:>12}\x1b[0m {}", action, message);
}

/// Print a success message with checkmark
pub fn success(message: &str) {
    eprintln!("\x1b[1;32m  \u{2713}\x1b[0m {}", message);
}

/// Print a check/pass item
pub fn check(message: &str) {
    eprintln!("\x1b[32m  \u{2713}\x1b[0m {}", message);
}

/// Print a warning message
pub fn warning(message: &str) {
    eprintln!("\x1b[33m  !\x1b[0m {}", message);
}

/// Print an error message
pub fn error(message: &str) {
    eprintln!("\x1b[1;31merror:\x1b[0m {}", message);
}

/// Print an info message
pub fn info(message: &str) {
    eprintln!("\x1b[36m  i\x1b[0m {}", message);
}

/// Print a dim/muted message
pub fn dim(message: &str) {
    eprintln!("\x1b[2m{}\x1b[0m", message);
}

/// Print a variant header
pub fn variant_header(name: &str, total_tasks: usize) {
    println!("\x1b[1;34mVariant\x1b[0m '{}' ({} tasks)", name, total_tasks);
}

/// Print one task under a variant header
pub fn task_line(name: &str) {
    println!("    {}", name);
}

/// Print an excluded pair (dim red)
pub fn excluded(pair: &str, reason: &str) {
    eprintln!("\x1b[31m  \u{2717}\x1b[0m {} \x1b[2m({})\x1b[0m", pair, reason);
}
