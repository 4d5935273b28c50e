//! # Identifier Allocation
//!
//! Per-collection counters emulating auto-increment. The counter row and the
//! record it numbers are written in the same redb transaction, so a failed
//! commit neither consumes an id nor leaves a record without one. Ids start
//! at 1 and are never reused, even after deletes.

use super::{COUNTERS, storage_err};
use crate::{EntityKind, ScorebookError};
use redb::{ReadableTable, WriteTransaction};

/// Issue the next id for `kind` inside `txn`.
pub(crate) fn allocate(txn: &WriteTransaction, kind: EntityKind) -> Result<u64, ScorebookError> {
    let mut counters = txn.open_table(COUNTERS).map_err(storage_err)?;
    let current = counters
        .get(kind.collection())
        .map_err(storage_err)?
        .map(|v| v.value())
        .unwrap_or(0);
    let next = current.checked_add(1).ok_or_else(|| {
        ScorebookError::StorageError(format!("{} id counter exhausted", kind.collection()))
    })?;
    counters
        .insert(kind.collection(), next)
        .map_err(storage_err)?;
    Ok(next)
}
