//! Parse diagnostics
//!
//! Warnings and errors from a markup parser, addressed by source URL,
//! line and column, plus a stable problem key for grouping.

/// Sink for parser warnings and errors. Warnings and errors report
/// independently; a sink may route them differently.
pub trait DiagnosticSink {
    fn warning(&self, message: &str, url: &str, line: u32, column: u32, key: &str);
    fn error(&self, message: &str, url: &str, line: u32, column: u32, key: &str);
}

/// Default sink: log at the matching severity.
#[derive(Debug, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn warning(&self, message: &str, url: &str, line: u32, column: u32, key: &str) {
        tracing::warn!(key, "{}", format_message(message, url, line, column));
    }

    fn error(&self, message: &str, url: &str, line: u32, column: u32, key: &str) {
        tracing::error!(key, "{}", format_message(message, url, line, column));
    }
}

fn format_message(message: &str, url: &str, line: u32, column: u32) -> String {
    format!("{message} ({url} {line}:{column})")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_message_format() {
        assert_eq!(
            format_message("unexpected end tag", "http://example.com/a", 12, 7),
            "unexpected end tag (http://example.com/a 12:7)"
        );
    }

    #[test]
    fn test_sink_routes_severities_independently() {
        #[derive(Default)]
        struct Collecting {
            warnings: RefCell<Vec<String>>,
            errors: RefCell<Vec<String>>,
        }
        impl DiagnosticSink for Collecting {
            fn warning(&self, message: &str, _: &str, _: u32, _: u32, key: &str) {
                self.warnings.borrow_mut().push(format!("{key}: {message}"));
            }
            fn error(&self, message: &str, _: &str, _: u32, _: u32, key: &str) {
                self.errors.borrow_mut().push(format!("{key}: {message}"));
            }
        }

        let sink = Collecting::default();
        sink.warning("odd nesting", "about:blank", 1, 1, "nesting");
        sink.error("unclosed tag", "about:blank", 2, 5, "unclosed");

        assert_eq!(sink.warnings.borrow().len(), 1);
        assert_eq!(sink.errors.borrow()[0], "unclosed: unclosed tag");
    }
}
