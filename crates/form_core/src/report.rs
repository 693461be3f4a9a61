/// Prefix every reported line carries in the error region.
pub const ERROR_LINE_PREFIX: &str = "Upload error: ";

/// The designated error region. Reports accumulate until the next clear,
/// so every problem from one failed attempt stays visible at once.
#[derive(Debug, Clone, Default)]
pub struct ErrorPanel {
    lines: Vec<String>,
    visible: bool,
}

impl ErrorPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empties and hides the region. Safe to call repeatedly.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.visible = false;
    }

    /// Appends a prefixed line and makes the region visible. Returns the
    /// rendered line for event emission.
    pub fn report(&mut self, message: &str) -> String {
        let line = format!("{ERROR_LINE_PREFIX}{message}");
        self.lines.push(line.clone());
        self.visible = true;
        line
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_accumulate_with_prefix() {
        let mut panel = ErrorPanel::new();
        panel.report("title must be of minimum length 3");
        panel.report("The author's name cannot be empty");
        assert_eq!(
            panel.lines(),
            [
                "Upload error: title must be of minimum length 3",
                "Upload error: The author's name cannot be empty",
            ]
        );
        assert!(panel.is_visible());
    }

    #[test]
    fn clear_is_idempotent() {
        let mut panel = ErrorPanel::new();
        panel.report("boom");
        panel.clear();
        assert!(panel.lines().is_empty());
        assert!(!panel.is_visible());
        panel.clear();
        assert!(panel.lines().is_empty());
        assert!(!panel.is_visible());
    }
}
