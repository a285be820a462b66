/// Keys typed since the last successful match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypingBuffer {
    chars: Vec<char>,
}

impl TypingBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, c: char) {
        self.chars.push(c);
    }

    /// Drops the last character; does nothing on an empty buffer.
    pub fn backspace(&mut self) {
        self.chars.pop();
    }

    pub fn clear(&mut self) {
        self.chars.clear();
    }

    /// Current contents, uppercased to match `ActiveWord::text`.
    pub fn snapshot(&self) -> String {
        self.chars.iter().collect::<String>().to_uppercase()
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }
}
