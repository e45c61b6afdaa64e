use crate::api::DetailDocument;

/// One fetched catalog record, immutable once decoded. Categories keep the
/// order they arrive in from the detail document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    pub id: u32,
    pub name: String,
    pub categories: Vec<String>,
    pub height: Option<u32>,
    pub weight: Option<u32>,
    pub base_experience: Option<u32>,
}

impl From<DetailDocument> for Record {
    fn from(doc: DetailDocument) -> Self {
        Self {
            id: doc.id,
            name: doc.name,
            categories: doc.types.into_iter().map(|s| s.category.name).collect(),
            height: doc.height,
            weight: doc.weight,
            base_experience: doc.base_experience,
        }
    }
}

/// All records fetched so far, in fetch order. Records are not deduplicated
/// by id; repeated loads against a warm cache re-append what the cache
/// serves.
#[derive(Debug, Default)]
pub struct RecordStore {
    records: Vec<Record>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn append_page(&mut self, page: Vec<Record>) {
        self.records.extend(page);
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

#[cfg(test)]
pub(crate) fn record(id: u32, name: &str, categories: &[&str]) -> Record {
    Record {
        id,
        name: name.to_string(),
        categories: categories.iter().map(|c| c.to_string()).collect(),
        height: None,
        weight: None,
        base_experience: None,
    }
}
