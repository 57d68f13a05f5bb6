/// Markup escaping for the HTML and spreadsheet writers
pub struct MarkupEscape;

impl MarkupEscape {
    /// Escape text content inside tags
    /// Escapes: &, <, >
    pub fn escape_text(text: &str) -> String {
        text.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
    }

    /// Escape attribute values
    /// Escapes: &, <, >, ", '
    pub fn escape_attribute(text: &str) -> String {
        Self::escape_text(text)
            .replace('"', "&quot;")
            .replace('\'', "&#39;")
    }

    /// Escape text for an XML part, dropping characters XML 1.0 cannot carry
    pub fn escape_xml(text: &str) -> String {
        let cleaned: String = text
            .chars()
            .filter(|&c| matches!(c, '\t' | '\n' | '\r') || c >= ' ')
            .collect();
        Self::escape_text(&cleaned)
    }
}
