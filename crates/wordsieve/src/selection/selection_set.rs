use crate::{
    errors::WSResult,
    frequency::FrequencySource,
    types::{WSHashSet, hash_set_new},
};

/// The set of selected tokens.
///
/// Membership in this set is what `is_selected` means in lexical data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    tokens: WSHashSet<String>,
}

impl SelectionSet {
    /// Build a set from tokens.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = hash_set_new();
        set.extend(tokens.into_iter().map(Into::into));
        Self { tokens: set }
    }

    /// Load the set from a pruned frequency list.
    pub fn from_frequency_source<F>(source: &F) -> WSResult<Self>
    where
        F: FrequencySource + ?Sized,
    {
        let mut tokens = hash_set_new();
        for entry in source.open_entries()? {
            tokens.insert(entry?.token);
        }
        Ok(Self { tokens })
    }

    /// Is `token` selected?
    pub fn contains(
        &self,
        token: &str,
    ) -> bool {
        self.tokens.contains(token)
    }

    /// The number of selected tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Is the set empty?
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Iterate over the selected tokens, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for SelectionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::from_tokens(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frequency::FrequencyEntry;

    #[test]
    fn test_membership() {
        let set: SelectionSet = ["kissa", "talo"].into_iter().collect();
        assert_eq!(set.len(), 2);
        assert!(set.contains("kissa"));
        assert!(!set.contains("koira"));

        let mut tokens: Vec<&str> = set.iter().collect();
        tokens.sort();
        assert_eq!(tokens, vec!["kissa", "talo"]);
    }

    #[test]
    fn test_from_frequency_source() {
        let pruned = vec![FrequencyEntry::new("kissa", 100), FrequencyEntry::new("talo", 80)];
        let set = SelectionSet::from_frequency_source(&pruned).unwrap();
        assert_eq!(set, SelectionSet::from_tokens(["talo", "kissa"]));
        assert!(SelectionSet::default().is_empty());
    }
}
