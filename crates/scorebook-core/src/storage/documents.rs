//! Id-keyed document tables and their postcard codec.

use super::storage_err;
use crate::{Admin, Class, EntityKind, Mark, ScorebookError, Session, Student, Subject};
use redb::{ReadTransaction, ReadableTable, TableDefinition, WriteTransaction};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// An id-table value: `u64` key -> postcard bytes.
pub(crate) type DocTable = TableDefinition<'static, u64, &'static [u8]>;

/// A record stored in its own id-keyed table.
pub(crate) trait Document: Serialize + DeserializeOwned {
    const KIND: EntityKind;
    const TABLE: DocTable;

    fn id(&self) -> u64;
}

macro_rules! document {
    ($ty:ty, $kind:expr, $table:literal) => {
        impl Document for $ty {
            const KIND: EntityKind = $kind;
            const TABLE: DocTable = TableDefinition::new($table);

            fn id(&self) -> u64 {
                self.id
            }
        }
    };
}

document!(Session, EntityKind::Session, "sessions");
document!(Class, EntityKind::Class, "classes");
document!(Student, EntityKind::Student, "students");
document!(Subject, EntityKind::Subject, "subjects");
document!(Mark, EntityKind::Mark, "marks");
document!(Admin, EntityKind::Admin, "admins");

// =============================================================================
// CODEC
// =============================================================================

pub(crate) fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, ScorebookError> {
    postcard::to_allocvec(value).map_err(|e| ScorebookError::SerializationError(e.to_string()))
}

pub(crate) fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ScorebookError> {
    postcard::from_bytes(bytes).map_err(|e| ScorebookError::SerializationError(e.to_string()))
}

// =============================================================================
// TABLE ACCESS
// =============================================================================

/// Decode every row of an id table, in ascending id order.
fn scan<D, T>(table: &T) -> Result<Vec<D>, ScorebookError>
where
    D: Document,
    T: ReadableTable<u64, &'static [u8]>,
{
    let mut docs = Vec::new();
    for entry in table.iter().map_err(storage_err)? {
        let (_, value) = entry.map_err(storage_err)?;
        docs.push(decode(value.value())?);
    }
    Ok(docs)
}

fn fetch<D, T>(table: &T, id: u64) -> Result<Option<D>, ScorebookError>
where
    D: Document,
    T: ReadableTable<u64, &'static [u8]>,
{
    table
        .get(id)
        .map_err(storage_err)?
        .map(|value| decode(value.value()))
        .transpose()
}

/// All documents of one kind, read inside a write transaction.
pub(crate) fn load_all<D: Document>(txn: &WriteTransaction) -> Result<Vec<D>, ScorebookError> {
    let table = txn.open_table(D::TABLE).map_err(storage_err)?;
    scan(&table)
}

/// All documents of one kind matching `keep`.
pub(crate) fn load_where<D, F>(txn: &WriteTransaction, keep: F) -> Result<Vec<D>, ScorebookError>
where
    D: Document,
    F: Fn(&D) -> bool,
{
    Ok(load_all::<D>(txn)?.into_iter().filter(|d| keep(d)).collect())
}

pub(crate) fn load<D: Document>(
    txn: &WriteTransaction,
    id: u64,
) -> Result<Option<D>, ScorebookError> {
    let table = txn.open_table(D::TABLE).map_err(storage_err)?;
    fetch(&table, id)
}

/// Like [`load`], but a missing document is a `NotFound` error.
pub(crate) fn load_required<D: Document>(
    txn: &WriteTransaction,
    id: u64,
) -> Result<D, ScorebookError> {
    load::<D>(txn, id)?.ok_or(ScorebookError::not_found(D::KIND, id))
}

/// Insert or overwrite a document under its own id.
pub(crate) fn store<D: Document>(txn: &WriteTransaction, doc: &D) -> Result<(), ScorebookError> {
    let bytes = encode(doc)?;
    let mut table = txn.open_table(D::TABLE).map_err(storage_err)?;
    table
        .insert(doc.id(), bytes.as_slice())
        .map_err(storage_err)?;
    Ok(())
}

/// Remove a document; returns whether it existed.
pub(crate) fn erase<D: Document>(txn: &WriteTransaction, id: u64) -> Result<bool, ScorebookError> {
    let mut table = txn.open_table(D::TABLE).map_err(storage_err)?;
    let existed = table.remove(id).map_err(storage_err)?.is_some();
    Ok(existed)
}

/// All documents of one kind, read from a snapshot.
pub(crate) fn read_all<D: Document>(txn: &ReadTransaction) -> Result<Vec<D>, ScorebookError> {
    let table = txn.open_table(D::TABLE).map_err(storage_err)?;
    scan(&table)
}

pub(crate) fn read<D: Document>(
    txn: &ReadTransaction,
    id: u64,
) -> Result<Option<D>, ScorebookError> {
    let table = txn.open_table(D::TABLE).map_err(storage_err)?;
    fetch(&table, id)
}
