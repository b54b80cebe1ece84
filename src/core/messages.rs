// Severity-tagged messages collected during encode and decode
//
// Non-fatal issues are accumulated and handed back to the caller once the
// top-level operation finishes. Each message records the item stack, i.e. the
// path to the configuration object being processed when it was raised.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Hint,
    Warning,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Hint => write!(f, "hint"),
            Severity::Warning => write!(f, "warning"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub severity: Severity,
    pub stack: Vec<String>,
    pub text: String,
}

impl Message {
    pub fn is_critical(&self) -> bool {
        self.severity == Severity::Critical
    }

    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }

    /// Item stack joined with '/'
    pub fn path(&self) -> String {
        self.stack.join("/")
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.stack.is_empty() {
            write!(f, "[{}] {}", self.severity, self.text)
        } else {
            write!(f, "[{}] {}: {}", self.severity, self.path(), self.text)
        }
    }
}

/// Accumulates messages and tracks the current item stack
#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    stack: Vec<String>,
    messages: Vec<Message>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter an item, e.g. `"channel 12"`
    pub fn push(&mut self, item: impl Into<String>) {
        self.stack.push(item.into());
    }

    /// Leave the current item
    pub fn pop(&mut self) {
        self.stack.pop();
    }

    /// Current item stack joined with '/'
    pub fn path(&self) -> String {
        self.stack.join("/")
    }

    pub fn add(&mut self, severity: Severity, text: impl Into<String>) {
        let message = Message {
            severity,
            stack: self.stack.clone(),
            text: text.into(),
        };
        match severity {
            Severity::Hint => tracing::debug!("{}", message),
            Severity::Warning | Severity::Critical => tracing::warn!("{}", message),
        }
        self.messages.push(message);
    }

    pub fn hint(&mut self, text: impl Into<String>) {
        self.add(Severity::Hint, text);
    }

    pub fn warning(&mut self, text: impl Into<String>) {
        self.add(Severity::Warning, text);
    }

    pub fn critical(&mut self, text: impl Into<String>) {
        self.add(Severity::Critical, text);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn has_critical(&self) -> bool {
        self.messages.iter().any(|m| m.is_critical())
    }

    pub fn has_warnings(&self) -> bool {
        self.messages.iter().any(|m| m.is_warning())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Message> {
        self.messages
            .iter()
            .filter(|m| m.severity == Severity::Warning)
    }

    pub fn hints(&self) -> impl Iterator<Item = &Message> {
        self.messages
            .iter()
            .filter(|m| m.severity == Severity::Hint)
    }

    /// Texts of all messages with exactly `severity`
    pub fn texts(&self, severity: Severity) -> Vec<String> {
        self.messages
            .iter()
            .filter(|m| m.severity == severity)
            .map(|m| m.text.clone())
            .collect()
    }

    /// Append the messages of another log
    pub fn extend(&mut self, other: MessageLog) {
        self.messages.extend(other.messages);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_stack() {
        let mut log = MessageLog::new();
        log.push("zones");
        log.push("zone 3");
        log.warning("member list truncated");
        log.pop();
        log.hint("done");
        log.pop();

        let msgs = log.messages();
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].path(), "zones/zone 3");
        assert_eq!(msgs[1].path(), "zones");
        assert_eq!(
            msgs[0].to_string(),
            "[warning] zones/zone 3: member list truncated"
        );
        assert_eq!(log.path(), "");
    }

    #[test]
    fn test_severity_helpers() {
        let mut log = MessageLog::new();
        log.hint("a");
        assert!(!log.has_warnings());
        log.warning("b");
        log.critical("c");
        assert!(log.has_warnings());
        assert!(log.has_critical());
        assert_eq!(log.texts(Severity::Warning), vec!["b".to_string()]);
        assert_eq!(log.warnings().count(), 1);
        assert_eq!(log.hints().next().map(|m| m.text.as_str()), Some("a"));
        assert!(Severity::Critical > Severity::Hint);
    }
}
