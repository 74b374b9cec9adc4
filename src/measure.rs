use unicode_width::UnicodeWidthStr;

/// Monospace estimate for edge label plates.
pub struct TextMetrics {
    pub char_width: f64,
    pub line_height: f64,
    pub padding_x: f64,
    pub padding_y: f64,
}

impl Default for TextMetrics {
    fn default() -> Self {
        Self {
            char_width: 7.0,
            line_height: 14.0,
            padding_x: 4.0,
            padding_y: 2.0,
        }
    }
}

impl TextMetrics {
    pub fn text_width(&self, text: &str) -> f64 {
        let width = UnicodeWidthStr::width(text);
        width as f64 * self.char_width
    }

    /// Size of the background plate drawn behind a label.
    pub fn label_size(&self, text: &str) -> (f64, f64) {
        (
            self.text_width(text) + self.padding_x * 2.0,
            self.line_height + self.padding_y * 2.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_width() {
        let m = TextMetrics::default();
        assert_eq!(m.text_width("flow"), 4.0 * 7.0);
    }

    #[test]
    fn test_unicode_width() {
        let m = TextMetrics::default();
        // 全角文字は幅2
        assert_eq!(m.text_width("接続"), 4.0 * 7.0);
    }

    #[test]
    fn test_label_size_adds_padding() {
        let m = TextMetrics::default();
        let (w, h) = m.label_size("ok");
        assert_eq!(w, 2.0 * 7.0 + 8.0);
        assert_eq!(h, 18.0);
    }

    #[test]
    fn test_empty_label() {
        let m = TextMetrics::default();
        assert_eq!(m.label_size("").0, 8.0);
    }
}
