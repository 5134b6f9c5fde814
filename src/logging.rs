use crate::utils::truncate_str;
use crate::{PreviewCard, VisualChoice};
use std::path::PathBuf;
use tracing::{debug, error, info};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt as subscriber_fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};
use unicode_width::UnicodeWidthStr;

#[derive(Debug)]
pub struct LogConfig {
    pub log_dir: PathBuf,
    pub log_level: String,
    pub console_output: bool,
    pub file_output: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_dir: "logs".into(),
            log_level: "info".into(),
            console_output: true,
            file_output: true,
        }
    }
}

fn describe_visual(visual: &VisualChoice) -> String {
    match visual {
        VisualChoice::Svg { url } => format!("svg {url}"),
        VisualChoice::Image { url } => format!("image {url}"),
        VisualChoice::Favicon { url } => format!("favicon {url}"),
        VisualChoice::Placeholder => "placeholder".to_string(),
    }
}

/// Greedy word wrap that stops after `max_lines`, marking the cut with `…`
/// the way the card itself clips text.
fn clamp_lines(text: &str, width: usize, max_lines: u32) -> Vec<String> {
    let max_lines = max_lines.max(1) as usize;
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if !current.is_empty() && current.width() + 1 + word.width() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }

    if lines.len() > max_lines {
        lines.truncate(max_lines);
        if let Some(last) = lines.last_mut() {
            while !last.is_empty() && last.width() + 1 > width {
                last.pop();
            }
            last.push('…');
        }
    }
    lines
}

fn card_row(label: &str, lines: &[String]) -> String {
    let indent = " ".repeat(label.width() + 2);
    match lines.split_first() {
        None => format!("{label}: -"),
        Some((first, rest)) => rest.iter().fold(format!("{label}: {first}"), |row, line| {
            format!("{row}\n{indent}{line}")
        }),
    }
}

/// Logs a resolved card as it would be drawn: title and description clipped
/// to the card's line limits.
pub fn log_preview_card(card: &PreviewCard, source: &str) {
    const WIDTH: usize = 72;

    let rows = [
        card_row("Source", &[truncate_str(source, WIDTH)]),
        card_row(
            "Title",
            &card
                .title
                .as_deref()
                .map(|t| clamp_lines(t, WIDTH, card.title_number_of_lines))
                .unwrap_or_default(),
        ),
        card_row("Site", &card.subtitle.iter().cloned().collect::<Vec<_>>()),
        card_row(
            "Desc",
            &card
                .description
                .as_deref()
                .map(|d| clamp_lines(d, WIDTH, card.description_number_of_lines))
                .unwrap_or_default(),
        ),
        card_row("Visual", &[describe_visual(&card.visual)]),
        card_row("Opens", &card.tap_target.iter().cloned().collect::<Vec<_>>()),
    ];

    info!(visual = %describe_visual(&card.visual), "\n{}", rows.join("\n"));
}

/// Logs a failed resolution with the error and its cause chain.
pub fn log_error_card<E: std::error::Error>(source: &str, error: &E) {
    const WIDTH: usize = 72;

    let mut details = error.to_string();
    let mut cause = error.source();
    while let Some(inner) = cause {
        details = format!("{details} (cause: {inner})");
        cause = inner.source();
    }

    error!(
        "\n{}\n{}",
        card_row("Source", &[truncate_str(source, WIDTH)]),
        card_row("Error", &clamp_lines(&details, WIDTH, 3)),
    );
}

pub fn setup_logging(config: LogConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let mut layers = Vec::new();

    if config.console_output {
        let console_layer = subscriber_fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_line_number(true)
            .with_file(true)
            .with_span_events(subscriber_fmt::format::FmtSpan::CLOSE)
            .pretty();
        layers.push(console_layer.boxed());
    }

    if config.file_output {
        std::fs::create_dir_all(&config.log_dir).expect("Failed to create log directory");

        let file_appender =
            RollingFileAppender::new(Rotation::DAILY, &config.log_dir, "url-preview-card.log");

        let file_layer = subscriber_fmt::layer()
            .with_ansi(false)
            .with_target(true)
            .with_line_number(true)
            .with_file(true)
            .with_writer(file_appender);

        layers.push(file_layer.boxed());
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layers)
        .try_init()
        .expect("Failed to set global default subscriber");

    debug!("Logging system initialized with config: {:?}", config);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_visual() {
        assert_eq!(
            describe_visual(&VisualChoice::Favicon { url: "f.ico".into() }),
            "favicon f.ico"
        );
        assert_eq!(describe_visual(&VisualChoice::Placeholder), "placeholder");
    }

    #[test]
    fn test_clamp_lines_wraps_within_width() {
        assert_eq!(
            clamp_lines("one two three four", 9, 3),
            vec!["one two", "three", "four"]
        );
        assert!(clamp_lines("", 10, 2).is_empty());
    }

    #[test]
    fn test_clamp_lines_marks_cut() {
        let lines = clamp_lines("one two three four", 9, 2);
        assert_eq!(lines, vec!["one two".to_string(), "three…".to_string()]);
        assert_eq!(clamp_lines("alpha beta", 20, 0), vec!["alpha beta"]);
    }

    #[test]
    fn test_card_row_indents_continuation() {
        assert_eq!(
            card_row("Title", &["a".to_string(), "b".to_string()]),
            "Title: a\n       b"
        );
        assert_eq!(card_row("Site", &[]), "Site: -");
    }
}
