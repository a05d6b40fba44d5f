//! Terminal display helpers for report tables.
//!
//! Widths are measured with `unicode-width` so titles with CJK or accented
//! characters do not break column alignment.

use std::io::{self, IsTerminal};
use std::sync::OnceLock;
use terminal_size::terminal_size;
use unicode_width::UnicodeWidthChar;

/// Terminal size and capabilities, probed once.
#[derive(Debug, Clone)]
pub struct Terminal {
    width: usize,
    is_tty: bool,
}

static TERMINAL_INFO: OnceLock<Terminal> = OnceLock::new();

/// Width used when the terminal size cannot be determined.
pub const DEFAULT_WIDTH: usize = 100;

pub fn terminal_info() -> &'static Terminal {
    TERMINAL_INFO.get_or_init(|| Terminal {
        width: terminal_size()
            .map(|(w, _)| w.0 as usize)
            .unwrap_or(DEFAULT_WIDTH),
        is_tty: io::stdout().is_terminal(),
    })
}

#[inline]
pub fn terminal_width() -> usize {
    terminal_info().width
}

/// Check if stdout is a terminal.
#[inline]
pub fn is_terminal() -> bool {
    terminal_info().is_tty
}

fn char_width(c: char) -> usize {
    c.width().unwrap_or(1)
}

/// Display width of `text` in terminal columns.
pub fn display_width(text: &str) -> usize {
    text.chars().map(char_width).sum()
}

/// Truncate text to `max_width` columns, appending `...` when cut.
///
/// ```
/// use scholar_selfcite::utils::truncate_with_ellipsis;
///
/// assert_eq!(truncate_with_ellipsis("Hello World", 8), "Hello...");
/// assert_eq!(truncate_with_ellipsis("Hi", 8), "Hi");
/// ```
pub fn truncate_with_ellipsis(text: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }
    if display_width(text) <= max_width {
        return text.to_string();
    }

    let budget = max_width.saturating_sub(3);
    let mut used = 0;
    let mut truncated = String::new();
    for c in text.chars() {
        let w = char_width(c);
        if used + w > budget {
            break;
        }
        used += w;
        truncated.push(c);
    }

    format!("{}...", truncated)
}

/// Like [`truncate_with_ellipsis`], but prefers to cut at the last word boundary.
pub fn truncate_at_word(text: &str, max_width: usize) -> String {
    let cut = truncate_with_ellipsis(text, max_width);
    let Some(prefix) = cut.strip_suffix("...") else {
        return cut;
    };
    if cut == text {
        return cut;
    }

    match prefix.rfind(' ') {
        Some(space) if space > 0 => format!("{}...", prefix[..space].trim_end()),
        _ => cut,
    }
}

/// Width constraints for one table column.
#[derive(Debug, Clone, Copy)]
pub struct ColumnConfig {
    pub min_width: usize,
    pub max_width: usize,
    pub weight: usize,
}

impl ColumnConfig {
    pub fn new(min_width: usize) -> Self {
        ColumnConfig {
            min_width,
            max_width: usize::MAX,
            weight: 1,
        }
    }

    pub fn max(mut self, max_width: usize) -> Self {
        self.max_width = max_width;
        self
    }

    pub fn weight(mut self, weight: usize) -> Self {
        self.weight = weight;
        self
    }
}

/// Distribute `terminal_width` across columns: minimums first, then the rest by weight.
pub fn column_widths(terminal_width: usize, configs: &[ColumnConfig]) -> Vec<usize> {
    let mut widths: Vec<usize> = configs.iter().map(|c| c.min_width).collect();

    // Three characters of border/padding per column.
    let overhead = configs.len() * 3 + 1;
    let available = terminal_width.saturating_sub(overhead);
    let min_sum: usize = widths.iter().sum();
    if min_sum >= available {
        return widths;
    }

    let mut remaining = available - min_sum;
    let total_weight: usize = configs.iter().map(|c| c.weight).sum();
    if total_weight == 0 {
        return widths;
    }

    let pool = remaining;
    for (width, config) in widths.iter_mut().zip(configs) {
        let share = pool * config.weight / total_weight;
        let room = config.max_width.saturating_sub(*width);
        let take = share.min(room).min(remaining);
        *width += take;
        remaining -= take;
    }

    widths
}

/// Widths of the per-publication report table:
/// (title, authors, year, citations, self, percentage).
pub fn report_table_columns(terminal_width: usize) -> [usize; 6] {
    let configs = [
        ColumnConfig::new(24).max(80).weight(3),
        ColumnConfig::new(14).max(40).weight(1),
        ColumnConfig::new(4).max(4).weight(0),
        ColumnConfig::new(5).max(5).weight(0),
        ColumnConfig::new(4).max(4).weight(0),
        ColumnConfig::new(6).max(6).weight(0),
    ];

    let widths = column_widths(terminal_width, &configs);
    [widths[0], widths[1], widths[2], widths[3], widths[4], widths[5]]
}

/// Year column text.
pub fn format_year(year: Option<i32>) -> String {
    year.map(|y| y.to_string()).unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_with_ellipsis_basic() {
        assert_eq!(truncate_with_ellipsis("Hello", 10), "Hello");
        assert_eq!(truncate_with_ellipsis("Hello World", 8), "Hello...");
    }

    #[test]
    fn test_truncate_with_ellipsis_empty() {
        assert_eq!(truncate_with_ellipsis("", 10), "");
        assert_eq!(truncate_with_ellipsis("Hello", 0), "");
        assert_eq!(truncate_with_ellipsis("Hello", 1), "...");
    }

    #[test]
    fn test_truncate_wide_characters() {
        // Each CJK character is two columns wide.
        let cut = truncate_with_ellipsis("引用分析の研究", 9);
        assert_eq!(cut, "引用分...");
        assert!(display_width(&cut) <= 9);
    }

    #[test]
    fn test_truncate_at_word() {
        assert_eq!(truncate_at_word("The quick brown fox", 14), "The quick...");
        assert_eq!(truncate_at_word("Short", 14), "Short");
        assert_eq!(truncate_at_word("Unbreakablewordhere", 10), "Unbreak...");
    }

    #[test]
    fn test_truncate_at_word_multibyte() {
        let cut = truncate_at_word("Müller und Schröder über Zitate", 20);
        assert!(cut.ends_with("..."));
        assert!(display_width(&cut) <= 20);
    }

    #[test]
    fn test_column_widths_respect_max_and_terminal() {
        let widths = report_table_columns(120);
        assert!(widths.iter().sum::<usize>() + 6 * 3 + 1 <= 120);
        assert_eq!(widths[2], 4);
        assert!(widths[0] > widths[1]);
        assert!(widths[0] <= 80);
    }

    #[test]
    fn test_column_widths_narrow_terminal_uses_minimums() {
        let widths = report_table_columns(30);
        assert_eq!(widths, [24, 14, 4, 5, 4, 6]);
    }

    #[test]
    fn test_format_year() {
        assert_eq!(format_year(Some(2019)), "2019");
        assert_eq!(format_year(None), "-");
    }
}
