//! Whitelist/blacklist filtering of whole objects by FQN.

use crate::sink::{DependencySink, ObjectDecl, ObjectHandle};
use anyhow::{Context, Result};
use regex::Regex;
use tracing::debug;

/// Forwards an object only if its FQN fully matches at least one whitelist
/// pattern and no blacklist pattern; rejected objects get the null handle, so
/// none of their members or edges reach downstream.
pub struct PatternFilter {
    whitelist: Vec<Regex>,
    blacklist: Vec<Regex>,
    next: Box<dyn DependencySink>,
}

impl PatternFilter {
    pub fn new(
        whitelist: &[String],
        blacklist: &[String],
        next: Box<dyn DependencySink>,
    ) -> Result<Self> {
        Ok(Self {
            whitelist: compile_anchored(whitelist)?,
            blacklist: compile_anchored(blacklist)?,
            next,
        })
    }
}

/// Patterns match the whole FQN, not a substring.
fn compile_anchored(patterns: &[String]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|pattern| {
            Regex::new(&format!("^(?:{pattern})$"))
                .with_context(|| format!("invalid filter pattern: {pattern}"))
        })
        .collect()
}

fn matches_any(fqn: &str, patterns: &[Regex]) -> bool {
    patterns.iter().any(|pattern| pattern.is_match(fqn))
}

impl DependencySink for PatternFilter {
    fn open_object(&mut self, decl: &ObjectDecl) -> ObjectHandle {
        if matches_any(&decl.fqn, &self.whitelist) && !matches_any(&decl.fqn, &self.blacklist) {
            self.next.open_object(decl)
        } else {
            debug!(class = %decl.fqn, "filtered out");
            ObjectHandle::null()
        }
    }

    fn close(&mut self) {
        self.next.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patterns_are_anchored_to_the_whole_fqn() {
        let patterns = compile_anchored(&["a.B".to_string()]).unwrap();
        assert!(matches_any("a.B", &patterns));
        assert!(!matches_any("xa.Bc", &patterns));
        assert!(!matches_any("a.Bx", &patterns));
    }

    #[test]
    fn invalid_pattern_is_a_construction_error() {
        assert!(compile_anchored(&["(".to_string()]).is_err());
    }
}
