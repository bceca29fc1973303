//! Text output formatting with progress bars and colors.

use chrono::{DateTime, Duration, Utc};

use super::json::{LoginOutput, NamespacesOutput, ScrapeOutput, StatusOutput, TokenOutput};

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";

// Progress bar characters
const BAR_FULL: char = '█';
const BAR_EMPTY: char = '░';

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
    bar_width: usize,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self {
            use_colors,
            bar_width: 20,
        }
    }

    /// Formats the result of `login`.
    pub fn format_login(&self, login: &LoginOutput) -> String {
        let mut lines = Vec::new();

        if let Some(url) = &login.authorization_url {
            lines.push("Open this URL while logged in to the Epic Games Store:".to_string());
            lines.push(format!("  {}", self.cyan(url)));
            lines.push(String::new());
            lines.push(format!(
                "Then run {} with the {} value shown there.",
                self.bold("egs-scraper login --code <code>"),
                self.bold("authorizationCode")
            ));
        }

        if let Some(token) = &login.token {
            lines.push(format!("{} as client {}", self.green("Logged in"), login.client_id));
            lines.extend(self.token_lines(token, Utc::now()));
        }

        lines.push(format!("State:   {}", self.dim(&login.state_file)));
        lines.push(format!("Output:  {}", login.output_folder));
        lines.join("\n")
    }

    /// Formats the result of `status`.
    pub fn format_status(&self, status: &StatusOutput, now: DateTime<Utc>) -> String {
        let mut lines = Vec::new();

        lines.push(self.bold("egs-scraper Status"));
        lines.push("─".repeat(40));
        lines.push(format!("State:   {}", status.state_file));
        lines.push(format!("Output:  {}", status.output_folder));
        lines.push(format!("Client:  {}", status.client_id));
        lines.push(String::new());

        match &status.token {
            Some(token) => lines.extend(self.token_lines(token, now)),
            None => lines.push(format!("Token:   {}", self.red("not logged in"))),
        }
        lines.push(String::new());

        match status.namespaces {
            Some(total) => {
                lines.push(format!(
                    "Scraped: {} {}/{}",
                    self.progress_bar(status.completed, total),
                    status.completed,
                    total
                ));
                if let Some(remaining) = status.remaining() {
                    lines.push(format!("Pending: {remaining}"));
                }
            }
            None => lines.push(format!(
                "Namespaces: {}",
                self.dim("not discovered yet, run `egs-scraper namespaces`")
            )),
        }

        if !status.interrupted.is_empty() {
            lines.push(format!(
                "{} {}",
                self.yellow("Interrupted:"),
                status.interrupted.join(", ")
            ));
        }

        lines.join("\n")
    }

    /// Formats the result of `namespaces`.
    pub fn format_namespaces(&self, output: &NamespacesOutput) -> String {
        format!(
            "{} namespaces in {}",
            self.bold(&output.namespaces.to_string()),
            output.mapping_file
        )
    }

    /// Formats the result of `scrape`.
    pub fn format_scrape(&self, output: &ScrapeOutput) -> String {
        let mut lines = vec![format!(
            "Scraped {} namespaces ({} items), skipped {}",
            self.green(&output.completed.to_string()),
            output.items,
            output.skipped
        )];

        if !output.failed.is_empty() {
            lines.push(self.red(&format!("{} failed:", output.failed.len())));
            for failure in &output.failed {
                lines.push(format!("  {:<34} {}", failure.namespace, self.dim(&failure.error)));
            }
        }

        lines.join("\n")
    }

    /// Renders `done` out of `total` as a bar.
    pub fn progress_bar(&self, done: usize, total: usize) -> String {
        let filled = if total == 0 {
            self.bar_width
        } else {
            (done.min(total) * self.bar_width + total / 2) / total
        };

        let bar = format!(
            "{}{}",
            BAR_FULL.to_string().repeat(filled),
            BAR_EMPTY.to_string().repeat(self.bar_width - filled)
        );

        if filled == self.bar_width {
            self.green(&bar)
        } else {
            self.yellow(&bar)
        }
    }

    fn token_lines(&self, token: &TokenOutput, now: DateTime<Utc>) -> Vec<String> {
        let access = if token.access_valid {
            self.green(&format!("valid, expires {}", relative_time(token.expires_at, now)))
        } else {
            self.yellow(&format!("expired {}", relative_time(token.expires_at, now)))
        };

        let refresh = if token.refresh_valid {
            self.green(&format!("valid, expires {}", relative_time(token.refresh_expires_at, now)))
        } else {
            self.red(&format!(
                "expired {}, run `egs-scraper login`",
                relative_time(token.refresh_expires_at, now)
            ))
        };

        vec![format!("Access:  {access}"), format!("Refresh: {refresh}")]
    }

    fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    fn green(&self, text: &str) -> String {
        self.paint(GREEN, text)
    }

    fn yellow(&self, text: &str) -> String {
        self.paint(YELLOW, text)
    }

    fn red(&self, text: &str) -> String {
        self.paint(RED, text)
    }

    fn cyan(&self, text: &str) -> String {
        self.paint(CYAN, text)
    }

    fn paint(&self, color: &str, text: &str) -> String {
        if self.use_colors {
            format!("{color}{text}{RESET}")
        } else {
            text.to_string()
        }
    }
}

/// Describes `at` relative to `now`, e.g. "in 2 hours" or "3 days ago".
fn relative_time(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let delta = at - now;
    let (span, future) = if delta >= Duration::zero() {
        (delta, true)
    } else {
        (-delta, false)
    };

    if span < Duration::minutes(1) {
        return "now".to_string();
    }

    let text = if span < Duration::hours(1) {
        plural(span.num_minutes(), "minute")
    } else if span < Duration::days(2) {
        plural(span.num_hours(), "hour")
    } else {
        plural(span.num_days(), "day")
    };

    if future {
        format!("in {text}")
    } else {
        format!("{text} ago")
    }
}

fn plural(n: i64, unit: &str) -> String {
    format!("{n} {unit}{}", if n == 1 { "" } else { "s" })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_bar_full() {
        let formatter = TextFormatter::new(false);
        assert_eq!(formatter.progress_bar(4, 4), "█".repeat(20));
    }

    #[test]
    fn test_progress_bar_empty() {
        let formatter = TextFormatter::new(false);
        assert_eq!(formatter.progress_bar(0, 4), "░".repeat(20));
    }

    #[test]
    fn test_progress_bar_half() {
        let formatter = TextFormatter::new(false);
        assert_eq!(formatter.progress_bar(1, 2), format!("{}{}", "█".repeat(10), "░".repeat(10)));
    }

    #[test]
    fn test_progress_bar_no_namespaces() {
        let formatter = TextFormatter::new(false);
        assert_eq!(formatter.progress_bar(0, 0), "█".repeat(20));
    }

    #[test]
    fn test_progress_bar_colors() {
        let formatter = TextFormatter::new(true);
        assert!(formatter.progress_bar(1, 3).contains(YELLOW));
        assert!(formatter.progress_bar(3, 3).contains(GREEN));
    }

    #[test]
    fn test_relative_time() {
        let now = Utc::now();
        assert_eq!(relative_time(now + Duration::seconds(20), now), "now");
        assert_eq!(relative_time(now + Duration::minutes(5), now), "in 5 minutes");
        assert_eq!(relative_time(now + Duration::hours(1), now), "in 1 hour");
        assert_eq!(relative_time(now - Duration::hours(3), now), "3 hours ago");
        assert_eq!(relative_time(now + Duration::days(30), now), "in 30 days");
    }
}
