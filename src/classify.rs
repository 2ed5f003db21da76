//! Recover structured error codes from the free-text messages the service returns.
//!
//! The service only forwards the server's message, never its error number, so every known
//! message template is compiled once into an anchored pattern and tried in catalog order.

use std::sync::LazyLock;

use regex::Regex;

mod catalog;

use catalog::SERVER_ERRORS;

/// Code used for the proxy's "Communications link failure".
pub const PROXY_CONNECTION_ERROR: u16 = 6000;

/// Classification of one message. Both fields are `None` when nothing matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ErrorDescriptor {
    pub code: Option<u16>,
    pub symbolic_name: Option<&'static str>,
}

impl ErrorDescriptor {
    #[must_use]
    pub fn is_known(&self) -> bool {
        self.code.is_some()
    }
}

struct CatalogEntry {
    code: u16,
    symbolic_name: &'static str,
    pattern: Regex,
}

static CATALOG: LazyLock<Vec<CatalogEntry>> = LazyLock::new(|| {
    SERVER_ERRORS
        .iter()
        .filter_map(|&(code, symbolic_name, template)| {
            match Regex::new(&template_to_pattern(template)) {
                Ok(pattern) => Some(CatalogEntry {
                    code,
                    symbolic_name,
                    pattern,
                }),
                Err(e) => {
                    tracing::error!(code, "error template failed to compile: {e}");
                    None
                }
            }
        })
        .collect()
});

/// Literal text is escaped, each `%s` spans anything (newlines included), and the whole
/// message must match.
fn template_to_pattern(template: &str) -> String {
    let body = template
        .split("%s")
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    format!("(?s)^(?:{body})$")
}

/// Classify a raw server message; the first catalog entry whose template matches wins.
#[must_use]
pub fn classify(message: &str) -> ErrorDescriptor {
    CATALOG
        .iter()
        .find(|entry| entry.pattern.is_match(message))
        .map_or_else(ErrorDescriptor::default, |entry| ErrorDescriptor {
            code: Some(entry.code),
            symbolic_name: Some(entry.symbolic_name),
        })
}
