//! The record type registry: declaration, forwarding, and field tables.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use smallvec::SmallVec;

use crate::error::{MdsError, Result};
use crate::hash::FxDashMap;
use crate::id::{UniformId, UniformIdSource};
use crate::intern::Symbol;
use crate::kind::Kind;
use crate::tracing::debug;

/// Most record types carry a handful of fields; inline storage avoids a
/// heap allocation for the common case without giving up growth.
type FieldTable = SmallVec<[Arc<FieldDescriptor>; 4]>;

pub struct RecordTypeData {
    id: UniformId,
    name: Symbol,
    super_type: Option<RecordType>,
    /// `None` for a candidate that is itself canonical.
    forward: Option<RecordType>,
    fields: Mutex<FieldTable>,
    created: AtomicBool,
    valid: AtomicBool,
}

impl std::fmt::Debug for RecordTypeData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordTypeData")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("created", &self.created.load(Ordering::Relaxed))
            .field("valid", &self.valid.load(Ordering::Relaxed))
            .field("forward", &self.forward.is_some())
            .finish()
    }
}

/// A handle to a declared record type.
///
/// Distinct `RecordType` handles can refer to the same logical type: one
/// forwards to the other. Use [`RecordType::compare_types`] rather than
/// `==`-on-identity when comparing two handles a caller obtained separately.
#[derive(Debug, Clone)]
pub struct RecordType(Arc<RecordTypeData>);

impl RecordType {
    fn new(id: UniformId, name: Symbol, super_type: Option<RecordType>, forward: Option<RecordType>) -> Self {
        let created = forward.is_some();
        RecordType(Arc::new(RecordTypeData {
            id,
            name,
            super_type,
            forward,
            fields: Mutex::new(FieldTable::new()),
            created: AtomicBool::new(created),
            valid: AtomicBool::new(true),
        }))
    }

    pub fn id(&self) -> UniformId {
        self.0.id
    }

    pub fn name(&self) -> &Symbol {
        &self.0.name
    }

    pub fn super_type(&self) -> Option<RecordType> {
        self.0.super_type.clone()
    }

    fn forward(&self) -> Option<RecordType> {
        self.0.forward.clone()
    }

    /// Chase `_forward` to the canonical type this handle ultimately refers
    /// to (itself, if it is already canonical).
    fn canonical(&self) -> RecordType {
        let mut cur = self.clone();
        while let Some(next) = cur.forward() {
            cur = next;
        }
        cur
    }

    /// Two handles are equivalent iff identical, or either forwards
    /// (transitively) to the other, or both forward to the same canonical
    /// type.
    pub fn compare_types(a: &RecordType, b: &RecordType) -> bool {
        Arc::ptr_eq(&a.canonical().0, &b.canonical().0)
    }

    fn is_valid(&self) -> bool {
        self.0.valid.load(Ordering::Acquire)
    }

    /// Transition to created state. Returns `Ok(None)` if canonical,
    /// `Ok(Some(forwardee))` if forwarded, raises if invalid.
    pub fn ensure_created(&self) -> Result<Option<RecordType>> {
        if !self.is_valid() {
            return Err(MdsError::incompatible_record_type(self.0.name.clone()));
        }
        if let Some(fwd) = self.forward() {
            return Ok(Some(fwd));
        }
        self.0.created.store(true, Ordering::Release);
        Ok(None)
    }

    fn is_created(&self) -> bool {
        self.0.created.load(Ordering::Acquire)
    }

    /// Chase `other`'s supertype chain (inclusive of `other` itself),
    /// comparing each link against `self` with [`Self::compare_types`].
    pub fn is_super_of(&self, other: &RecordType) -> bool {
        let mut cur = Some(other.clone());
        while let Some(c) = cur {
            if Self::compare_types(self, &c) {
                return true;
            }
            cur = c.super_type();
        }
        false
    }

    /// The (possibly forwarded) field table, in insertion order.
    pub fn fields(&self) -> Vec<Arc<FieldDescriptor>> {
        self.canonical().0.fields.lock().iter().cloned().collect()
    }

    pub fn n_fields(&self) -> usize {
        self.canonical().0.fields.lock().len()
    }

    /// Linear scan of the (possibly forwarded) field table.
    pub fn lookup_field(&self, name: &Symbol) -> Option<Arc<FieldDescriptor>> {
        self.fields().into_iter().find(|f| &f.name == name)
    }

    /// Append a field. `creator` is handed the index the new field will
    /// occupy. Fails once this type has been created.
    pub fn add_field(&self, creator: impl FnOnce(usize) -> FieldDescriptor) -> Result<Arc<FieldDescriptor>> {
        if self.is_created() {
            return Err(MdsError::unmodifiable_record_type(self.0.name.clone()));
        }
        let mut fields = self.0.fields.lock();
        if self.is_created() {
            return Err(MdsError::unmodifiable_record_type(self.0.name.clone()));
        }
        let index = fields.len();
        let field = Arc::new(creator(index));
        debug!(type_name = %self.0.name, field_name = %field.name, index, "field added");
        fields.push(field.clone());
        Ok(field)
    }

    fn downgrade(&self) -> Weak<RecordTypeData> {
        Arc::downgrade(&self.0)
    }

    /// Copy `super_type`'s field table in as this type's starting table.
    /// Only meaningful for a freshly constructed canonical candidate, before
    /// any caller has observed its (empty) field list.
    fn seed_fields_from(&self, super_type: &RecordType) {
        *self.0.fields.lock() = super_type.fields().into();
    }
}

impl PartialEq for RecordType {
    fn eq(&self, other: &Self) -> bool {
        RecordType::compare_types(self, other)
    }
}

impl Eq for RecordType {}

/// Binds `(record type × name × kind)` to a slot index.
pub struct FieldDescriptor {
    id: UniformId,
    kind: Kind,
    name: Symbol,
    num: usize,
    r_type: Weak<RecordTypeData>,
    validity: crate::validity::ValidityCache,
}

impl std::fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("num", &self.num)
            .finish()
    }
}

impl FieldDescriptor {
    pub fn id(&self) -> UniformId {
        self.id
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn name(&self) -> &Symbol {
        &self.name
    }

    pub fn num(&self) -> usize {
        self.num
    }

    /// The type that declared this field. `None` only if the declaring
    /// type's registry has been torn down while this descriptor outlived
    /// it, which does not happen through the public `Runtime` API.
    pub fn r_type(&self) -> Option<RecordType> {
        self.r_type.upgrade().map(RecordType)
    }

    /// Three-state validity cache over `r_type.ensure_created()`.
    pub fn is_valid(&self) -> Result<()> {
        let ok = self.validity.get_or_init(|| match self.r_type() {
            Some(rt) => rt.ensure_created().is_ok(),
            None => false,
        });
        if ok {
            Ok(())
        } else {
            Err(MdsError::incompatible_record_type(self.name.clone()))
        }
    }
}

/// Declares, uniques, and forwards record types.
#[derive(Debug, Default)]
pub struct RecordTypeRegistry {
    types: FxDashMap<Symbol, RecordType>,
}

impl RecordTypeRegistry {
    pub(crate) fn new() -> Self {
        RecordTypeRegistry::default()
    }

    pub fn find(&self, name: &Symbol) -> Option<RecordType> {
        self.types.get(name).map(|r| r.clone())
    }

    /// Idempotently register a record type. See the module docs for the
    /// full forwarding contract.
    pub(crate) fn declare(&self, ids: &UniformIdSource, name: Symbol, super_type: Option<RecordType>) -> Result<RecordType> {
        use dashmap::mapref::entry::Entry;

        match self.types.entry(name.clone()) {
            Entry::Vacant(v) => {
                let rt = RecordType::new(ids.next(), name.clone(), super_type.clone(), None);
                if let Some(ref st) = super_type {
                    rt.seed_fields_from(st);
                }
                debug!(type_name = %name, "declared new canonical record type");
                v.insert(rt.clone());
                Ok(rt)
            }
            Entry::Occupied(o) => {
                let old_rt = o.get().clone();
                let rt = RecordType::new(ids.next(), name.clone(), super_type.clone(), Some(old_rt.clone()));
                debug!(type_name = %name, "declared forwarding record type");
                match super_type {
                    None => Ok(rt),
                    Some(requested_super) => {
                        let requested_super = match requested_super.ensure_created()? {
                            Some(canonical) => canonical,
                            None => requested_super,
                        };
                        let ok = old_rt
                            .super_type()
                            .map(|old_super| old_super.is_super_of(&requested_super))
                            .unwrap_or(false);
                        if ok {
                            Ok(rt)
                        } else {
                            Err(MdsError::incompatible_superclass(name))
                        }
                    }
                }
            }
        }
    }

    /// Find-or-create a field by name, checking kind compatibility against
    /// any existing field of the same name.
    pub(crate) fn field_in(
        &self,
        ids: &UniformIdSource,
        rt: &RecordType,
        name: Symbol,
        kind: Kind,
        create_if_absent: bool,
    ) -> Result<Option<Arc<FieldDescriptor>>> {
        if let Some(found) = rt.lookup_field(&name) {
            if found.kind() != kind {
                return Err(MdsError::incompatible_type(name));
            }
            return Ok(Some(found));
        }
        if !create_if_absent {
            return Ok(None);
        }
        let weak = rt.downgrade();
        let field = rt.add_field(move |index| FieldDescriptor {
            id: ids.next(),
            kind,
            name,
            num: index,
            r_type: weak,
            validity: crate::validity::ValidityCache::default(),
        })?;
        Ok(Some(field))
    }
}
