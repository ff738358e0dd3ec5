//! Managed record instances.

use std::sync::{Arc, OnceLock};

use smallvec::SmallVec;

use crate::error::{MdsError, Result};
use crate::id::UniformId;
use crate::msv::{ConflictGenerator, Msv};
use crate::record_type::{FieldDescriptor, RecordType};

type SlotArray = SmallVec<[OnceLock<Arc<Msv>>; 4]>;

/// An instance of a [`RecordType`]: an immutable type pointer plus a slot
/// array of lazily-created [`Msv`]s, one per declared field.
///
/// The slot array is sized once, from `r_type.n_fields()` at construction
/// time, and never grows: a field added to `r_type` after a record was
/// constructed is unreachable through that record (see
/// [`FieldDescriptor::read`](crate::record_type::FieldDescriptor) and the
/// `field-out-of-range` error).
#[derive(Debug)]
pub struct ManagedRecord {
    id: UniformId,
    r_type: RecordType,
    fields: SlotArray,
}

impl ManagedRecord {
    pub(crate) fn new(id: UniformId, r_type: RecordType) -> Self {
        let n = r_type.n_fields();
        ManagedRecord {
            id,
            r_type,
            fields: (0..n).map(|_| OnceLock::new()).collect(),
        }
    }

    pub fn id(&self) -> UniformId {
        self.id
    }

    pub fn r_type(&self) -> &RecordType {
        &self.r_type
    }

    /// Atomic slot access. `create_if_null=false` never allocates; the
    /// first caller to pass `create_if_null=true` on an empty slot wins the
    /// race to install its `Msv` (via `OnceLock`), and every racer —
    /// winner or not — observes the same instance afterward.
    pub(crate) fn field_slot(&self, index: usize, field: &FieldDescriptor, create_if_null: bool) -> Result<Option<Arc<Msv>>> {
        let slot = match self.fields.get(index) {
            Some(slot) => slot,
            None => {
                return if create_if_null {
                    Err(MdsError::field_out_of_range(field.name().clone()))
                } else {
                    Ok(None)
                };
            }
        };
        if !create_if_null {
            return Ok(slot.get().cloned());
        }
        let msv = slot.get_or_init(|| {
            Arc::new(Msv::new(
                field.kind(),
                ConflictGenerator {
                    record: self.id,
                    field: field.id(),
                },
            ))
        });
        Ok(Some(msv.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::UniformIdSource;
    use crate::intern::Interner;
    use crate::kind::Kind;
    use crate::record_type::RecordTypeRegistry;

    #[test]
    fn field_out_of_range_on_write_but_not_on_read() {
        let ids = UniformIdSource::new();
        let registry = RecordTypeRegistry::new();
        let interner = Interner::new();
        let name = interner.intern("P");
        let rt = registry.declare(&ids, name, None).unwrap();
        let x = interner.intern("x");
        let field = registry.field_in(&ids, &rt, x, Kind::Int, true).unwrap().unwrap();
        rt.ensure_created().unwrap();

        // Construct the record before any later field growth (there is
        // none here, but emulate the slot-sizing boundary directly).
        let record = ManagedRecord::new(ids.next(), rt.clone());
        assert!(record.field_slot(5, &field, false).unwrap().is_none());
        assert!(record.field_slot(5, &field, true).is_err());
    }

    #[test]
    fn concurrent_slot_creation_has_a_single_winner() {
        use std::sync::Barrier;
        use std::thread;

        let ids = UniformIdSource::new();
        let registry = RecordTypeRegistry::new();
        let interner = Interner::new();
        let name = interner.intern("P");
        let rt = registry.declare(&ids, name, None).unwrap();
        let x = interner.intern("x");
        let field = registry.field_in(&ids, &rt, x, Kind::Int, true).unwrap().unwrap();
        rt.ensure_created().unwrap();

        let record = Arc::new(ManagedRecord::new(ids.next(), rt));
        let barrier = Arc::new(Barrier::new(20));
        let handles: Vec<_> = (0..20)
            .map(|_| {
                let record = record.clone();
                let field = field.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    record.field_slot(field.num(), &field, true).unwrap().unwrap()
                })
            })
            .collect();
        let slots: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for s in &slots[1..] {
            assert!(Arc::ptr_eq(&slots[0], s));
        }
    }
}
