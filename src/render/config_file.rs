//! Ordered configuration documents
//!
//! Slurm reads plain `Key=Value` files where the order of entries matters
//! and some keys (e.g. `SlurmctldHost`) are legitimately repeated. The
//! builders here are append-only; once built, a [`ConfigFile`] only renders.

use std::fmt::Display;

use crate::error::{RenderError, RenderResult};

/// Marker prepended to comment lines
pub const COMMENT_MARKER: &str = "#";

/// Separator between a property key and its value
pub const PROPERTY_SEPARATOR: char = '=';

/// A single entry of a properties document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Property { key: String, value: String },
    Comment(String),
}

impl Entry {
    fn render(&self) -> String {
        match self {
            Entry::Property { key, value } => format!("{key}{PROPERTY_SEPARATOR}{value}"),
            Entry::Comment(text) if text.is_empty() => String::new(),
            Entry::Comment(text) => format!("{COMMENT_MARKER} {text}"),
        }
    }
}

/// Builder for `Key=Value` documents with interleaved comments
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertiesConfig {
    entries: Vec<Entry>,
}

impl PropertiesConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a property. Any `Display` scalar is accepted and stored in its
    /// textual form.
    pub fn add_property(&mut self, key: impl Into<String>, value: impl Display) -> &mut Self {
        self.entries.push(Entry::Property {
            key: key.into(),
            value: value.to_string(),
        });
        self
    }

    /// Append a comment. An empty comment renders as a blank line.
    pub fn add_comment(&mut self, text: impl Into<String>) -> &mut Self {
        self.entries.push(Entry::Comment(text.into()));
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::Properties(self)
    }
}

/// Builder for documents made of raw lines
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultilineConfig {
    lines: Vec<String>,
}

impl MultilineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_line(&mut self, line: impl Into<String>) -> &mut Self {
        self.lines.push(line.into());
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::Multiline(self)
    }
}

/// A finished configuration document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigFile {
    Properties(PropertiesConfig),
    Multiline(MultilineConfig),
}

impl ConfigFile {
    /// Render the document, one entry per line, in insertion order.
    pub fn render(&self) -> String {
        match self {
            ConfigFile::Properties(config) => config
                .entries
                .iter()
                .map(Entry::render)
                .collect::<Vec<_>>()
                .join("\n"),
            ConfigFile::Multiline(config) => config.lines.join("\n"),
        }
    }

    /// Check that every entry renders to exactly the line it was meant to.
    ///
    /// Appending never rejects input, so a key containing `=` or a value
    /// containing a newline would silently corrupt the rendered file. This
    /// is the opt-in check for that.
    pub fn validate(&self) -> RenderResult<()> {
        match self {
            ConfigFile::Properties(config) => {
                for entry in &config.entries {
                    match entry {
                        Entry::Property { key, value } => validate_property(key, value)?,
                        Entry::Comment(text) => reject_newline(text, text)?,
                    }
                }
            }
            ConfigFile::Multiline(config) => {
                for line in &config.lines {
                    reject_newline(line, line)?;
                }
            }
        }
        Ok(())
    }
}

impl Display for ConfigFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}

impl From<PropertiesConfig> for ConfigFile {
    fn from(config: PropertiesConfig) -> Self {
        config.build()
    }
}

impl From<MultilineConfig> for ConfigFile {
    fn from(config: MultilineConfig) -> Self {
        config.build()
    }
}

fn validate_property(key: &str, value: &str) -> RenderResult<()> {
    let invalid = |reason: &str| RenderError::InvalidEntry {
        key: key.to_string(),
        reason: reason.to_string(),
    };

    if key.is_empty() {
        return Err(invalid("key is empty"));
    }
    if key.contains(PROPERTY_SEPARATOR) {
        return Err(invalid("key contains '='"));
    }
    if key.starts_with(COMMENT_MARKER) {
        return Err(invalid("key starts with the comment marker"));
    }
    if key.chars().any(char::is_whitespace) {
        return Err(invalid("key contains whitespace"));
    }
    reject_newline(key, value)
}

fn reject_newline(key: &str, text: &str) -> RenderResult<()> {
    if text.contains('\n') || text.contains('\r') {
        return Err(RenderError::InvalidEntry {
            key: key.to_string(),
            reason: "entry spans multiple lines".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_properties_in_insertion_order() {
        let mut config = PropertiesConfig::new();
        config
            .add_property("Zeta", "last-alphabetically")
            .add_property("Alpha", 1)
            .add_property("Zeta", "again");

        assert_eq!(
            config.build().render(),
            "Zeta=last-alphabetically\nAlpha=1\nZeta=again"
        );
    }

    #[test]
    fn test_render_comments() {
        let mut config = PropertiesConfig::new();
        config
            .add_comment("SCHEDULING")
            .add_comment("")
            .add_property("SchedulerType", "sched/backfill");

        assert_eq!(
            config.build().render(),
            "# SCHEDULING\n\nSchedulerType=sched/backfill"
        );
    }

    #[test]
    fn test_render_scalars() {
        let mut config = PropertiesConfig::new();
        config
            .add_property("Port", 6817u16)
            .add_property("Limit", -1)
            .add_property("Enabled", true);

        assert_eq!(config.build().render(), "Port=6817\nLimit=-1\nEnabled=true");
    }

    #[test]
    fn test_render_multiline() {
        let mut config = MultilineConfig::new();
        config.add_line("required a.so").add_line("optional b.so x=1");

        let file: ConfigFile = config.into();
        assert_eq!(file.render(), "required a.so\noptional b.so x=1");
        assert_eq!(file.to_string(), file.render());
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(PropertiesConfig::new().build().render(), "");
        assert_eq!(MultilineConfig::new().build().render(), "");
    }

    #[test]
    fn test_malformed_key_is_accepted_but_fails_validation() {
        let mut config = PropertiesConfig::new();
        config.add_property("Bad=Key", "value");
        let file = config.build();

        assert_eq!(file.render(), "Bad=Key=value");
        assert!(matches!(
            file.validate(),
            Err(RenderError::InvalidEntry { ref key, .. }) if key == "Bad=Key"
        ));
    }

    #[test]
    fn test_validate_rejects_newlines() {
        let mut config = PropertiesConfig::new();
        config.add_property("Key", "one\ntwo");
        assert!(config.build().validate().is_err());

        let mut config = MultilineConfig::new();
        config.add_line("a\nb");
        assert!(config.build().validate().is_err());
    }

    #[test]
    fn test_validate_accepts_well_formed() {
        let mut config = PropertiesConfig::new();
        config
            .add_property("PartitionName", "main Nodes=ALL Default=YES")
            .add_comment("")
            .add_comment("note");
        assert!(config.build().validate().is_ok());
    }
}
