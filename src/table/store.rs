use super::{Record, RecordId, TableError};

/// Hands out record ids that are never reused within a store's lifetime.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdGenerator {
    next: RecordId,
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdGenerator {
    pub fn next_id(&mut self) -> RecordId {
        let id = self.next;
        self.next = self.next.saturating_add(1);
        id
    }

    pub fn observe(&mut self, id: RecordId) {
        if id >= self.next {
            self.next = id.saturating_add(1);
        }
    }
}

/// Ordered in-memory rows backing one screen.
#[derive(Clone, Debug)]
pub struct RecordStore<R> {
    records: Vec<R>,
    ids: IdGenerator,
}

impl<R: Record> Default for RecordStore<R> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<R: Record> RecordStore<R> {
    /// Seeds a store. Later duplicates of an id are dropped.
    pub fn new(seed: Vec<R>) -> Self {
        let mut ids = IdGenerator::default();
        let mut records: Vec<R> = Vec::with_capacity(seed.len());
        for record in seed {
            if records.iter().any(|r| r.id() == record.id()) {
                log::warn!("dropping duplicate seed record with id {}", record.id());
                continue;
            }
            ids.observe(record.id());
            records.push(record);
        }
        Self { records, ids }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn get(&self, id: RecordId) -> Option<&R> {
        self.records.iter().find(|r| r.id() == id)
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.get(id).is_some()
    }

    pub fn next_id(&mut self) -> RecordId {
        self.ids.next_id()
    }

    pub fn append(&mut self, record: R) -> Result<RecordId, TableError> {
        let id = record.id();
        if self.contains(id) {
            return Err(TableError::DuplicateId { id });
        }
        self.ids.observe(id);
        self.records.push(record);
        Ok(id)
    }

    pub fn replace(&mut self, record: R) -> Result<(), TableError> {
        let id = record.id();
        let slot = self
            .records
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or(TableError::UnknownRecord { id })?;
        *slot = record;
        Ok(())
    }

    pub fn update<F>(&mut self, id: RecordId, f: F) -> Result<(), TableError>
    where
        F: FnOnce(&mut R),
    {
        let record = self
            .records
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or(TableError::UnknownRecord { id })?;
        f(record);
        Ok(())
    }

    pub fn remove(&mut self, id: RecordId) -> Result<R, TableError> {
        let index = self
            .records
            .iter()
            .position(|r| r.id() == id)
            .ok_or(TableError::UnknownRecord { id })?;
        Ok(self.records.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::testing::{rows, Row};

    #[test]
    fn ids_continue_after_highest_seed() {
        let mut store = RecordStore::new(vec![Row::new(4, "a", true), Row::new(9, "b", false)]);
        assert_eq!(store.next_id(), 10);
        assert_eq!(store.next_id(), 11);
    }

    #[test]
    fn removed_ids_are_not_handed_out_again() {
        let mut store = RecordStore::new(rows(&["a", "b", "c"]));
        let id = store.next_id();
        store.append(Row::new(id, "d", true)).unwrap();
        store.remove(id).unwrap();
        assert_ne!(store.next_id(), id);
    }

    #[test]
    fn append_rejects_duplicate_ids() {
        let mut store = RecordStore::new(rows(&["a"]));
        assert_eq!(
            store.append(Row::new(1, "again", true)),
            Err(TableError::DuplicateId { id: 1 })
        );
    }

    #[test]
    fn append_of_external_id_moves_generator_forward() {
        let mut store = RecordStore::new(rows(&["a"]));
        store.append(Row::new(50, "far", true)).unwrap();
        assert_eq!(store.next_id(), 51);
    }

    #[test]
    fn seed_duplicates_are_dropped() {
        let store = RecordStore::new(vec![Row::new(1, "a", true), Row::new(1, "b", true)]);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(1).unwrap().name, "a");
    }

    #[test]
    fn replace_and_update_target_existing_records() {
        let mut store = RecordStore::new(rows(&["a", "b"]));
        store.replace(Row::new(2, "bee", true)).unwrap();
        store.update(1, |r| r.active = false).unwrap();
        assert_eq!(store.get(2).unwrap().name, "bee");
        assert!(!store.get(1).unwrap().active);
        assert_eq!(
            store.replace(Row::new(7, "x", true)),
            Err(TableError::UnknownRecord { id: 7 })
        );
    }
}
