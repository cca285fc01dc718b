use serde::Serialize;

/// Text accumulated by key presses and speech results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TextBuffer {
    text: String,
}

impl TextBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_key(&mut self, key: char) {
        self.text.push(key);
    }

    pub fn push_space(&mut self) {
        self.text.push(' ');
    }

    /// Recognized speech is appended after a separating space, even when the
    /// buffer is empty.
    pub fn push_transcript(&mut self, transcript: &str) {
        self.text.push(' ');
        self.text.push_str(transcript);
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn trimmed(&self) -> &str {
        self.text.trim()
    }

    pub fn is_blank(&self) -> bool {
        self.trimmed().is_empty()
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presses_concatenate_in_order() {
        let mut buffer = TextBuffer::new();
        let presses = ['O', 'L', ' ', 'A', ' ', ' ', 'Z'];
        let mut expected = String::new();
        for key in presses {
            if key == ' ' {
                buffer.push_space();
            } else {
                buffer.push_key(key);
            }
            expected.push(key);
        }
        assert_eq!(buffer.as_str(), expected);
    }

    #[test]
    fn whitespace_only_is_blank() {
        let mut buffer = TextBuffer::new();
        buffer.push_space();
        buffer.push_space();
        assert!(buffer.is_blank());
        assert_eq!(buffer.as_str(), "  ");
    }

    #[test]
    fn transcript_gets_leading_space() {
        let mut buffer = TextBuffer::new();
        buffer.push_transcript("bom dia");
        assert_eq!(buffer.as_str(), " bom dia");
        assert_eq!(buffer.trimmed(), "bom dia");
    }
}
