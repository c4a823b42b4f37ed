use std::path::{Path, PathBuf};

use rand::seq::IndexedRandom;
use rand::Rng;
use thiserror::Error;

use crate::models::Couple;

/// Announcements used when no template file is configured
///
/// Each `{}` is replaced by a member mention, in pair order.
pub const DEFAULT_TEMPLATES: &[&str] = &[
    "{} and {}, time for a coffee together :coffee:",
    "Hey {}! {} would love to grab a coffee with you this week.",
    "{} meet {}. Coffee, tea or a walk, your call!",
    "Today's lucky pair: {} and {} :tada:",
    "{}, have you met {}? Now is a good time over a coffee.",
];

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("cannot read templates from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no templates found in {0}")]
    Empty(PathBuf),
}

/// Announcement sentences, one of which is picked for each pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Templates {
    lines: Vec<String>,
}

impl Templates {
    /// Parse one template per line, ignoring blank lines
    pub fn parse(text: &str) -> Self {
        let lines = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect();
        Self { lines }
    }

    /// Load templates from a file, failing when none are usable
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TemplateError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| TemplateError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let templates = Self::parse(&text);
        if templates.is_empty() {
            return Err(TemplateError::Empty(path.to_path_buf()));
        }
        Ok(templates)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Pick a template uniformly at random
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        self.lines
            .choose(rng)
            .map(String::as_str)
            .unwrap_or(DEFAULT_TEMPLATES[0])
    }
}

impl Default for Templates {
    fn default() -> Self {
        Self {
            lines: DEFAULT_TEMPLATES.iter().map(|t| t.to_string()).collect(),
        }
    }
}

/// Slack mention markup for a member id
pub fn mention(member: &str) -> String {
    format!("<@{}>", member)
}

/// Fill the two `{}` placeholders of `template` with the pair's mentions
pub fn render_match(template: &str, couple: &Couple) -> String {
    template
        .replacen("{}", &mention(&couple.first), 1)
        .replacen("{}", &mention(&couple.second), 1)
}
