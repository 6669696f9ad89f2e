//! redb-based persistent fact store

use std::path::{Path, PathBuf};

use redb::{Database, ReadableTable, TableDefinition};
use tracing::trace;

use crate::{Fact, FactError, FactStore, InterfaceId, Result};

/// Facts of every namespace, keyed by `<namespace>/<interface>`
const FACTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("facts");

/// redb-based persistent fact store
///
/// Several namespaces may share one database file; each store instance
/// only sees the facts of its own namespace.
pub struct RedbFactStore {
    db: Database,
    path: PathBuf,
    namespace: String,
}

impl RedbFactStore {
    /// Create or open a fact database at the given path
    pub fn open(path: impl AsRef<Path>, namespace: impl Into<String>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let db = Database::create(&path)?;

        let write_txn = db.begin_write()?;
        {
            write_txn.open_table(FACTS_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self {
            db,
            path,
            namespace: namespace.into(),
        })
    }

    /// Get the file path of this store
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn prefix(&self) -> String {
        format!("{}/", self.namespace)
    }

    fn key(&self, interface: &InterfaceId) -> String {
        format!("{}/{}", self.namespace, interface)
    }
}

impl FactStore for RedbFactStore {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn export(&mut self, fact: &Fact) -> Result<()> {
        let key = self.key(&fact.interface);
        trace!(key = %key, implementors = fact.len(), "export fact");

        let bytes = bincode::serialize(fact)?;
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(FACTS_TABLE)?;
            table.insert(key.as_str(), bytes.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn retract_unit(&mut self, unit: &str) -> Result<usize> {
        let prefix = self.prefix();
        let write_txn = self.db.begin_write()?;
        let retracted = {
            let mut table = write_txn.open_table(FACTS_TABLE)?;
            let mut keys = Vec::new();
            for entry in table.iter()? {
                let (key, value) = entry?;
                if !key.value().starts_with(&prefix) {
                    continue;
                }
                let fact: Fact = bincode::deserialize(value.value())?;
                if fact.interface.unit == unit {
                    keys.push(key.value().to_string());
                }
            }
            for key in &keys {
                table.remove(key.as_str())?;
            }
            keys.len()
        };
        write_txn.commit()?;
        trace!(namespace = %self.namespace, unit, retracted, "retract facts");
        Ok(retracted)
    }

    fn import(&self, interface: &InterfaceId) -> Result<Option<Fact>> {
        let key = self.key(interface);
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(FACTS_TABLE)?;

        let fact: Fact = match table.get(key.as_str())? {
            Some(bytes) => bincode::deserialize(bytes.value())?,
            None => return Ok(None),
        };
        if &fact.interface != interface {
            return Err(FactError::KeyMismatch {
                key,
                found: fact.interface.to_string(),
            });
        }
        Ok(Some(fact))
    }

    fn facts(&self) -> Result<Vec<Fact>> {
        let prefix = self.prefix();
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(FACTS_TABLE)?;

        let mut facts = Vec::new();
        for entry in table.iter()? {
            let (key, value) = entry?;
            if key.value().starts_with(&prefix) {
                facts.push(bincode::deserialize::<Fact>(value.value())?);
            }
        }

        facts.sort_by(|a, b| a.interface.cmp(&b.interface));
        Ok(facts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VariantId;
    use tempfile::tempdir;

    fn sum_foo() -> Fact {
        Fact::new(
            InterfaceId::new("example.com/sum", "SumFoo"),
            [
                VariantId::new("example.com/sum", "A"),
                VariantId::new("example.com/sum", "B"),
            ],
        )
    }

    #[test]
    fn test_export_import() {
        let dir = tempdir().unwrap();
        let mut store = RedbFactStore::open(dir.path().join("facts.redb"), "sumlint").unwrap();

        let id = InterfaceId::new("example.com/sum", "SumFoo");
        assert!(store.import(&id).unwrap().is_none());

        store.export(&sum_foo()).unwrap();
        assert_eq!(store.import(&id).unwrap(), Some(sum_foo()));
    }

    #[test]
    fn test_persistence() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("nested").join("facts.redb");

        {
            let mut store = RedbFactStore::open(&db_path, "sumlint").unwrap();
            store.export(&sum_foo()).unwrap();
        }

        let store = RedbFactStore::open(&db_path, "sumlint").unwrap();
        assert_eq!(store.path(), db_path.as_path());
        let facts = store.facts().unwrap();
        assert_eq!(facts.len(), 1);
        assert_eq!(facts[0].to_string(), "example.com/sum.A,example.com/sum.B");
    }

    #[test]
    fn test_retract_unit_keeps_other_namespaces() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("facts.redb");

        {
            let mut oneof = RedbFactStore::open(&db_path, "oneoflint").unwrap();
            oneof.export(&sum_foo()).unwrap();
        }
        let mut sum = RedbFactStore::open(&db_path, "sumlint").unwrap();
        sum.export(&sum_foo()).unwrap();
        sum.export(&Fact::new(
            InterfaceId::new("example.com/other", "SumBar"),
            [VariantId::new("example.com/other", "X")],
        ))
        .unwrap();

        assert_eq!(sum.retract_unit("example.com/sum").unwrap(), 1);
        let left: Vec<_> = sum.facts().unwrap().iter().map(|f| f.interface.to_string()).collect();
        assert_eq!(left, vec!["example.com/other.SumBar"]);
        drop(sum);

        let oneof = RedbFactStore::open(&db_path, "oneoflint").unwrap();
        assert_eq!(oneof.facts().unwrap(), vec![sum_foo()]);
    }

    #[test]
    fn test_namespaces_are_isolated() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("facts.redb");

        {
            let mut sum = RedbFactStore::open(&db_path, "sumlint").unwrap();
            sum.export(&sum_foo()).unwrap();
        }

        let oneof = RedbFactStore::open(&db_path, "oneoflint").unwrap();
        assert!(oneof.facts().unwrap().is_empty());
        assert!(oneof
            .import(&InterfaceId::new("example.com/sum", "SumFoo"))
            .unwrap()
            .is_none());
    }
}
