//! CLI output formatting utilities.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print an indexed source summary line.
    pub fn source_info(source: &str, chunks: u32) {
        println!(
            "  {} {} ({} chunks)",
            style("*").cyan(),
            style(source).bold(),
            chunks
        );
    }

    /// Print a retrieved chunk.
    pub fn search_result(source: &str, chunk_index: i32, content: &str) {
        println!(
            "\n{} {} {}",
            style(">>").green(),
            style(source).bold(),
            style(format!("(chunk {})", chunk_index)).dim()
        );
        println!("   {}", content_preview(content, 200));
    }

    /// Print a literal scan match.
    pub fn scan_match(file: &str, timestamp: &str, snippet: &str) {
        println!(
            "\n{} {} @ {}",
            style(">>").green(),
            style(file).bold(),
            style(timestamp).cyan()
        );
        println!("   {}", content_preview(snippet, 240));
    }

    /// Create a progress bar.
    pub fn progress_bar(len: u64, msg: &str) -> ProgressBar {
        let pb = ProgressBar::new(len);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("#>-"),
        );
        pb.set_message(msg.to_string());
        pb
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap(),
        );
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

/// Truncate content to a character limit, flattening newlines.
///
/// Counts characters, not bytes; transcript text is full of multi-byte
/// accented characters and byte slicing would panic mid-character.
fn content_preview(content: &str, max_chars: usize) -> String {
    let flat = content.replace('\n', " ");
    if flat.chars().count() <= max_chars {
        flat
    } else {
        let truncated: String = flat.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_flattens_and_truncates() {
        let preview = content_preview("uno\ndos", 100);
        assert_eq!(preview, "uno dos");

        let long = "x".repeat(300);
        let preview = content_preview(&long, 200);
        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), 203);
    }

    #[test]
    fn test_preview_is_multibyte_safe() {
        let text = "ñ".repeat(250);
        let preview = content_preview(&text, 200);
        assert!(preview.starts_with('ñ'));
        assert_eq!(preview.chars().count(), 203);
    }
}
