use std::thread;

use mds_core::{ErrorKind, Kind, ModifyOp, ResMode, Runtime, Value};

#[test]
fn declare_add_create_write_read() {
    let rt = Runtime::default();
    let p = rt.declare_type("P", None).unwrap();
    let x = rt.field_in(&p, "x", Kind::Int, true).unwrap().unwrap();
    assert!(p.ensure_created().unwrap().is_none());

    let ctxt = rt.top_level_context();
    let (record, branch) = rt.create_record(&p, &ctxt).unwrap();
    assert_eq!(x.read(&record, &branch, &ctxt).unwrap(), Value::Int(0));
    let prior = x.write(&record, &branch, &ctxt, Value::Int(7)).unwrap();
    assert_eq!(prior, Value::Int(0));
    assert_eq!(x.read(&record, &branch, &ctxt).unwrap(), Value::Int(7));
}

#[test]
fn create_record_freezes_the_type_without_an_explicit_ensure_created() {
    let rt = Runtime::default();
    let p = rt.declare_type("P", None).unwrap();
    rt.field_in(&p, "x", Kind::Int, true).unwrap();

    let ctxt = rt.top_level_context();
    // No explicit `ensure_created()` call here: `create_record` alone must
    // freeze the type's field table.
    rt.create_record(&p, &ctxt).unwrap();

    let err = rt.field_in(&p, "y", Kind::Int, true).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::UnmodifiableRecordType { .. }));
}

#[test]
fn type_forwarding_and_superclass_check() {
    let rt = Runtime::default();
    let first = rt.declare_type("P", None).unwrap();
    let second = rt.declare_type("P", None).unwrap();
    assert_eq!(second.ensure_created().unwrap(), Some(first.clone()));

    rt.declare_type("Q", Some(&first)).unwrap();
    rt.declare_type("Q", Some(&first)).unwrap();

    let z = rt.declare_type("Z", None).unwrap();
    let err = rt.declare_type("Q", Some(&z)).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::IncompatibleSuperclass { .. }));
}

#[test]
fn create_record_through_a_forwarding_handle_uses_the_canonical_type() {
    let rt = Runtime::default();
    let first = rt.declare_type("P", None).unwrap();
    let x = rt.field_in(&first, "x", Kind::Int, true).unwrap().unwrap();
    let second = rt.declare_type("P", None).unwrap();

    let ctxt = rt.top_level_context();
    let (record, branch) = rt.create_record(&second, &ctxt).unwrap();
    assert_eq!(record.r_type(), &first);
    assert_eq!(x.read(&record, &branch, &ctxt).unwrap(), Value::Int(0));
}

#[test]
fn field_kind_mismatch_and_clean_absence() {
    let rt = Runtime::default();
    let p = rt.declare_type("P", None).unwrap();
    rt.field_in(&p, "x", Kind::Int, true).unwrap();

    let err = rt.field_in(&p, "x", Kind::String, true).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::IncompatibleType { .. }));

    let absent = rt.field_in(&p, "y", Kind::Int, false).unwrap();
    assert!(absent.is_none());
}

#[test]
fn branch_isolation_between_two_contexts() {
    let rt = Runtime::default();
    let p = rt.declare_type("P", None).unwrap();
    let x = rt.field_in(&p, "x", Kind::Int, true).unwrap().unwrap();
    p.ensure_created().unwrap();

    let ca = rt.top_level_context();
    let cb = rt.isolate(&rt.top_level_context());
    let top = rt.top_level_branch();

    assert_eq!(ca.shadow(&top), top);
    assert_ne!(cb.shadow(&top), top);

    let (record, _) = rt.create_record(&p, &ca).unwrap();
    x.write(&record, &top, &ca, Value::Int(1)).unwrap();
    x.write(&record, &top, &cb, Value::Int(2)).unwrap();
    assert_eq!(x.read(&record, &top, &ca).unwrap(), Value::Int(1));
    assert_eq!(x.read(&record, &top, &cb).unwrap(), Value::Int(2));

    x.set_to_parent(&record, &top, &cb).unwrap();
    assert_eq!(x.read(&record, &top, &cb).unwrap(), Value::Int(1));
}

#[test]
fn twenty_threads_race_on_first_write() {
    let rt = Runtime::default();
    let p = rt.declare_type("P", None).unwrap();
    let x = rt.field_in(&p, "x", Kind::Int, true).unwrap().unwrap();
    p.ensure_created().unwrap();

    let ctxt = rt.top_level_context();
    let (record, branch) = rt.create_record(&p, &ctxt).unwrap();

    thread::scope(|scope| {
        for i in 0..20 {
            let record = &record;
            let x = &x;
            let branch = &branch;
            let ctxt = &ctxt;
            scope.spawn(move || {
                x.write(record, branch, ctxt, Value::Int(i)).unwrap();
            });
        }
    });

    // Exactly one MSV backs the slot regardless of who won the race; every
    // subsequent read observes a single, consistent value.
    let observed = x.read(&record, &branch, &ctxt).unwrap();
    assert!(matches!(observed, Value::Int(_)));
}

#[test]
fn rollback_is_idempotent_through_the_public_api() {
    let rt = Runtime::default();
    let p = rt.declare_type("P", None).unwrap();
    let x = rt.field_in(&p, "x", Kind::Int, true).unwrap().unwrap();
    p.ensure_created().unwrap();

    let ctxt = rt.top_level_context();
    let (record, branch) = rt.create_record(&p, &ctxt).unwrap();

    x.write(&record, &branch, &ctxt, Value::Int(5)).unwrap();
    x.write(&record, &branch, &ctxt, Value::Int(9)).unwrap();

    let rolled = x.roll_back(&record, &branch, &ctxt).unwrap();
    assert_eq!(rolled, Value::Int(9));
    assert_eq!(x.read(&record, &branch, &ctxt).unwrap(), Value::Int(5));

    let rolled_again = x.roll_back(&record, &branch, &ctxt).unwrap();
    assert_eq!(rolled_again, Value::Int(5));
    assert_eq!(x.read(&record, &branch, &ctxt).unwrap(), Value::Int(5));
}

#[test]
fn modify_with_explicit_op_matches_convenience_wrapper() {
    let rt = Runtime::default();
    let p = rt.declare_type("Counter", None).unwrap();
    let n = rt.field_in(&p, "n", Kind::Int, true).unwrap().unwrap();
    p.ensure_created().unwrap();

    let ctxt = rt.top_level_context();
    let (record, branch) = rt.create_record(&p, &ctxt).unwrap();

    n.modify(&record, &branch, &ctxt, ModifyOp::Set, Some(Value::Int(3)), ResMode::NonResolving)
        .unwrap();
    let prior = n.add(&record, &branch, &ctxt, Value::Int(4)).unwrap();
    assert_eq!(prior, Value::Int(3));
    assert_eq!(n.read(&record, &branch, &ctxt).unwrap(), Value::Int(7));
}
