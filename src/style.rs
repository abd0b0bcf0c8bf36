//! Terminal colors.

const RESET: &str = "\x1b[0m";

/// What a piece of output text is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Prompts.
    Prompt,
    /// Listing indices.
    Index,
    /// Artist names.
    Artist,
    /// Album names.
    Album,
    /// Track titles.
    Title,
    /// Progress and completion messages.
    Success,
    /// Warnings and failures.
    Failure,
}

impl Tone {
    /// ANSI escape sequence for this tone.
    pub fn code(&self) -> &'static str {
        match self {
            Tone::Prompt | Tone::Index => "\x1b[33m",
            Tone::Artist => "\x1b[36m",
            Tone::Album => "\x1b[34m",
            Tone::Title => "\x1b[35m",
            Tone::Success => "\x1b[32m",
            Tone::Failure => "\x1b[31m",
        }
    }
}

/// Decorates text with ANSI colors, or leaves it alone when disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Painter {
    enabled: bool,
}

impl Painter {
    /// A painter that colors when `enabled` is set.
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// A painter that never colors.
    pub fn plain() -> Self {
        Self::new(false)
    }

    /// Colors on unless `NO_COLOR` is set to a non-empty value.
    pub fn from_env() -> Self {
        let no_color = std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
        Self::new(!no_color)
    }

    /// Wrap `text` in the tone's color.
    pub fn paint(&self, tone: Tone, text: impl AsRef<str>) -> String {
        if self.enabled {
            format!("{}{}{}", tone.code(), text.as_ref(), RESET)
        } else {
            text.as_ref().to_string()
        }
    }
}
