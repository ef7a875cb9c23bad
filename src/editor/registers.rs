//! The unnamed register used by yank, delete and paste.

/// Content of the unnamed register.
///
/// Character-wise text spanning several lines is stored as one entry per
/// line; the first and last entries are partial lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Register {
    pub text: Vec<String>,
    pub linewise: bool,
}

impl Register {
    pub fn new(text: Vec<String>, linewise: bool) -> Self {
        Self { text, linewise }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The register content as one string, lines joined with `\n`.
    pub fn joined(&self) -> String {
        self.text.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_empty() {
        assert!(Register::default().is_empty());
        assert!(!Register::default().linewise);
    }

    #[test]
    fn test_joined() {
        let reg = Register::new(vec!["a".to_string(), "b".to_string()], true);
        assert_eq!(reg.joined(), "a\nb");
    }
}
