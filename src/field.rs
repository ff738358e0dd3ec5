//! Field accessors: the read/write/modify surface bound to a
//! [`FieldDescriptor`](crate::record_type::FieldDescriptor).

use crate::branch::Branch;
use crate::context::IsolationContext;
use crate::error::{MdsError, Result};
use crate::kind::{ModifyOp, ResMode, Value};
use crate::record::ManagedRecord;
use crate::record_type::FieldDescriptor;

impl FieldDescriptor {
    fn check_applicable(&self, record: &ManagedRecord) -> Result<()> {
        self.is_valid()?;
        let r_type = self
            .r_type()
            .expect("field outlived the registry that declared it");
        if !r_type.is_super_of(record.r_type()) {
            return Err(MdsError::incompatible_record_type(self.name().clone()));
        }
        Ok(())
    }

    fn check_numeric(&self) -> Result<()> {
        if self.kind().is_numeric() {
            Ok(())
        } else {
            Err(MdsError::incompatible_type(self.name().clone()))
        }
    }

    pub fn read(&self, record: &ManagedRecord, branch: &Branch, ctxt: &IsolationContext) -> Result<Value> {
        self.check_applicable(record)?;
        match record.field_slot(self.num(), self, false)? {
            None => Ok(self.kind().absent()),
            Some(msv) => Ok(msv.read(&ctxt.shadow(branch))),
        }
    }

    /// Like [`Self::read`], but returns the last-published value, ignoring
    /// uncommitted writes on descendant branches.
    pub fn read_frozen(&self, record: &ManagedRecord, branch: &Branch, ctxt: &IsolationContext) -> Result<Value> {
        self.check_applicable(record)?;
        match record.field_slot(self.num(), self, false)? {
            None => Ok(self.kind().absent()),
            Some(msv) => Ok(msv.read_frozen(&ctxt.shadow(branch))),
        }
    }

    pub fn has_value(&self, record: &ManagedRecord, branch: &Branch, ctxt: &IsolationContext) -> Result<bool> {
        self.check_applicable(record)?;
        match record.field_slot(self.num(), self, false)? {
            None => Ok(false),
            Some(msv) => Ok(msv.has_value(&ctxt.shadow(branch))),
        }
    }

    /// Apply `op` to the value currently visible on `branch`, returning the
    /// value observable immediately beforehand.
    pub fn modify(
        &self,
        record: &ManagedRecord,
        branch: &Branch,
        ctxt: &IsolationContext,
        op: ModifyOp,
        arg: Option<Value>,
        res_mode: ResMode,
    ) -> Result<Value> {
        self.check_applicable(record)?;
        if matches!(op, ModifyOp::Add | ModifyOp::Sub | ModifyOp::Mul | ModifyOp::Div) {
            self.check_numeric()?;
        }
        if let Some(arg) = &arg {
            if arg.kind() != self.kind() {
                return Err(MdsError::incompatible_type(self.name().clone()));
            }
        }
        let slot = record
            .field_slot(self.num(), self, true)?
            .expect("create_if_null=true always yields a slot");
        let shadowed = ctxt.shadow(branch);
        Ok(slot.modify(&shadowed, op, res_mode, arg))
    }

    pub fn write(&self, record: &ManagedRecord, branch: &Branch, ctxt: &IsolationContext, value: Value) -> Result<Value> {
        self.modify(record, branch, ctxt, ModifyOp::Set, Some(value), ResMode::NonResolving)
    }

    pub fn add(&self, record: &ManagedRecord, branch: &Branch, ctxt: &IsolationContext, arg: Value) -> Result<Value> {
        self.modify(record, branch, ctxt, ModifyOp::Add, Some(arg), ResMode::NonResolving)
    }

    pub fn sub(&self, record: &ManagedRecord, branch: &Branch, ctxt: &IsolationContext, arg: Value) -> Result<Value> {
        self.modify(record, branch, ctxt, ModifyOp::Sub, Some(arg), ResMode::NonResolving)
    }

    pub fn mul(&self, record: &ManagedRecord, branch: &Branch, ctxt: &IsolationContext, arg: Value) -> Result<Value> {
        self.modify(record, branch, ctxt, ModifyOp::Mul, Some(arg), ResMode::NonResolving)
    }

    pub fn div(&self, record: &ManagedRecord, branch: &Branch, ctxt: &IsolationContext, arg: Value) -> Result<Value> {
        self.modify(record, branch, ctxt, ModifyOp::Div, Some(arg), ResMode::NonResolving)
    }

    pub fn set_to_parent(&self, record: &ManagedRecord, branch: &Branch, ctxt: &IsolationContext) -> Result<Value> {
        self.modify(record, branch, ctxt, ModifyOp::ParentVal, None, ResMode::NonResolving)
    }

    pub fn resolve_to_parent(&self, record: &ManagedRecord, branch: &Branch, ctxt: &IsolationContext) -> Result<Value> {
        self.modify(record, branch, ctxt, ModifyOp::ParentVal, None, ResMode::Resolving)
    }

    pub fn resolve_to_current(&self, record: &ManagedRecord, branch: &Branch, ctxt: &IsolationContext) -> Result<Value> {
        self.modify(record, branch, ctxt, ModifyOp::CurrentVal, None, ResMode::Resolving)
    }

    pub fn roll_back(&self, record: &ManagedRecord, branch: &Branch, ctxt: &IsolationContext) -> Result<Value> {
        self.modify(record, branch, ctxt, ModifyOp::LastStableVal, None, ResMode::NonResolving)
    }

    pub fn resolve_by_rollback(&self, record: &ManagedRecord, branch: &Branch, ctxt: &IsolationContext) -> Result<Value> {
        self.modify(record, branch, ctxt, ModifyOp::LastStableVal, None, ResMode::Resolving)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::UniformIdSource;
    use crate::intern::Interner;
    use crate::kind::Kind;
    use crate::record_type::RecordTypeRegistry;

    fn declared_int_field() -> (UniformIdSource, RecordTypeRegistry, Interner, std::sync::Arc<crate::record_type::FieldDescriptor>, crate::record_type::RecordType) {
        let ids = UniformIdSource::new();
        let registry = RecordTypeRegistry::new();
        let interner = Interner::new();
        let name = interner.intern("P");
        let rt = registry.declare(&ids, name, None).unwrap();
        let x = interner.intern("x");
        let field = registry.field_in(&ids, &rt, x, Kind::Int, true).unwrap().unwrap();
        rt.ensure_created().unwrap();
        (ids, registry, interner, field, rt)
    }

    #[test]
    fn declare_add_create_write_read() {
        let (ids, _registry, _interner, field, rt) = declared_int_field();
        let top = Branch::root(&ids);
        let ctxt = IsolationContext::top_level(ids.next());
        let record = ManagedRecord::new(ids.next(), rt);

        assert_eq!(field.read(&record, &top, &ctxt).unwrap(), Value::Int(0));
        let prior = field.write(&record, &top, &ctxt, Value::Int(7)).unwrap();
        assert_eq!(prior, Value::Int(0));
        assert_eq!(field.read(&record, &top, &ctxt).unwrap(), Value::Int(7));
    }

    #[test]
    fn write_on_wrong_record_type_is_rejected() {
        let (ids, registry, interner, field, _rt) = declared_int_field();
        let other_name = interner.intern("Unrelated");
        let other_rt = registry.declare(&ids, other_name, None).unwrap();
        other_rt.ensure_created().unwrap();
        let top = Branch::root(&ids);
        let ctxt = IsolationContext::top_level(ids.next());
        let record = ManagedRecord::new(ids.next(), other_rt);
        let err = field.write(&record, &top, &ctxt, Value::Int(1)).unwrap_err();
        assert!(matches!(err.kind(), crate::error::ErrorKind::IncompatibleRecordType { .. }));
    }
}
