use crate::record::{Fields, Record, RecordKey};

/// One named collection: insertion-ordered records plus a monotonic id counter.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Collection {
    pub(crate) records: Vec<Record>,
    pub(crate) next_id: u64,
}

impl Default for Collection {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            next_id: 1,
        }
    }
}

impl Collection {
    /// Assign the next id and append. The counter never moves backwards.
    pub(crate) fn insert(&mut self, fields: Fields) -> Record {
        let record = Record::new(self.next_id, fields);
        self.next_id += 1;
        self.records.push(record.clone());
        record
    }

    pub(crate) fn position(&self, key: &RecordKey) -> Option<usize> {
        self.records.iter().position(|record| record.matches(key))
    }

    pub(crate) fn get(&self, key: &RecordKey) -> Option<&Record> {
        self.records.iter().find(|record| record.matches(key))
    }
}
