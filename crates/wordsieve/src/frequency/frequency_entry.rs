use crate::types::Count;

/// Default field delimiter for frequency lists.
pub const DEFAULT_FREQUENCY_DELIMITER: char = '\t';

/// One `(token, count)` row of a frequency list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FrequencyEntry {
    /// The token text.
    pub token: String,

    /// The number of occurrences of the token in the source corpus.
    pub count: Count,
}

impl FrequencyEntry {
    /// Create a new entry.
    pub fn new<S: Into<String>>(
        token: S,
        count: Count,
    ) -> Self {
        Self {
            token: token.into(),
            count,
        }
    }
}

impl<S: Into<String>> From<(S, Count)> for FrequencyEntry {
    fn from((token, count): (S, Count)) -> Self {
        Self::new(token, count)
    }
}

/// Options for reading and writing frequency lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrequencyListOptions {
    /// The token/count field delimiter.
    pub delimiter: char,
}

impl Default for FrequencyListOptions {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_FREQUENCY_DELIMITER,
        }
    }
}

impl FrequencyListOptions {
    /// Set the field delimiter.
    pub fn with_delimiter(
        self,
        delimiter: char,
    ) -> Self {
        Self { delimiter }
    }
}
