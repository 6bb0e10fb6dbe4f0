//! Per-sentence variable numbering.

use indexmap::IndexSet;
use smartstring::alias::String;

/// Maps variable names to the 0-based ordinal of their first occurrence
/// within one sentence.  Repeated names yield the same ordinal, which is
/// how both wire formats express variable sharing.
#[derive(Debug, Default, Clone)]
pub struct VarCache {
    names: IndexSet<String>,
}

impl VarCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ordinal of `name`, assigning the next one on first sight.
    #[inline]
    pub fn ordinal(&mut self, name: &str) -> usize {
        if let Some(i) = self.names.get_index_of(name) {
            return i;
        }
        self.names.insert_full(String::from(name)).0
    }

    /// Number of distinct variables seen.
    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.names.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_occurrence_numbering() {
        let mut c = VarCache::new();
        assert_eq!(c.ordinal("X"), 0);
        assert_eq!(c.ordinal("Y"), 1);
        assert_eq!(c.ordinal("X"), 0);
        assert_eq!(c.ordinal("_Long_variable_name_beyond_inline"), 2);
        assert_eq!(c.ordinal("Y"), 1);
        assert_eq!(c.len(), 3);
        c.clear();
        assert!(c.is_empty());
        assert_eq!(c.ordinal("Y"), 0);
    }
}
