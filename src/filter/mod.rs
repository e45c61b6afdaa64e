use crate::store::Record;

/// Transient filter state, recomputed on every search or category event.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub name_substring: String,
    pub category: Option<String>,
}

impl FilterCriteria {
    pub fn is_active(&self) -> bool {
        !self.name_substring.trim().is_empty() || self.category.is_some()
    }

    pub fn clear(&mut self) {
        self.name_substring.clear();
        self.category = None;
    }
}

/// Pure, order-preserving filter over the accumulated store. A record is
/// included iff its name contains the substring (case-insensitive) and its
/// categories contain the selected category (exact, case-sensitive). An empty
/// result is not an error; callers distinguish "no matches" from "no filter"
/// by inspecting the criteria.
pub fn apply_filter(records: &[Record], criteria: &FilterCriteria) -> Vec<Record> {
    let needle = criteria.name_substring.trim().to_lowercase();
    records
        .iter()
        .filter(|r| needle.is_empty() || r.name.to_lowercase().contains(&needle))
        .filter(|r| match criteria.category.as_deref() {
            Some(category) => r.categories.iter().any(|c| c == category),
            None => true,
        })
        .cloned()
        .collect()
}
