//! Colored output and prompts for the `rf` binary.

use owo_colors::{OwoColorize, Style, colors::css};

/// Whether stdout accepts ANSI colors.
pub fn supports_color() -> bool {
    supports_color::on(supports_color::Stream::Stdout).is_some()
}

fn paint(text: &str, style: Style) -> String {
    if supports_color() {
        text.style(style).to_string()
    } else {
        text.to_string()
    }
}

/// Styles for the pieces of a framework listing.
pub trait Colorize {
    /// Completed actions and indicators.
    fn success(&self) -> String;
    /// Things the user should look at.
    fn warning(&self) -> String;
    /// Node kinds.
    fn info(&self) -> String;
    /// Ids, placeholders and hidden targets.
    fn dim(&self) -> String;
    /// Headings and new ids.
    fn strong(&self) -> String;
}

impl<T: AsRef<str> + ?Sized> Colorize for T {
    fn success(&self) -> String {
        paint(self.as_ref(), Style::new().fg::<css::Green>())
    }

    fn warning(&self) -> String {
        paint(self.as_ref(), Style::new().fg::<css::Orange>())
    }

    fn info(&self) -> String {
        paint(self.as_ref(), Style::new().fg::<css::LightBlue>())
    }

    fn dim(&self) -> String {
        paint(self.as_ref(), Style::new().dimmed())
    }

    fn strong(&self) -> String {
        paint(self.as_ref(), Style::new().bold())
    }
}

/// Asks a yes/no question, defaulting to no.
pub fn confirm(prompt: &str) -> anyhow::Result<bool> {
    Ok(dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()?)
}
