use orevm::object::{LookupStatus, ObjectData, ObjectKind, ObjectOps, SlotKind};
use orevm::symbol::SymbolKey;
use std::rc::Rc;

fn plain() -> orevm::object::ObjectRef {
    ObjectData::new(ObjectKind::Plain)
}

#[test]
fn add_slot_then_get_slot_round_trips_and_rejects_duplicates() {
    let object = plain();
    let value = plain();
    let name = SymbolKey::new("greeting", 0);

    assert!(object.add_slot(name.clone(), SlotKind::default(), value.clone()));
    assert!(Rc::ptr_eq(&object.get_slot(&name).unwrap(), &value));
    assert!(!object.add_slot(name, SlotKind::default(), plain()));
}

#[test]
fn del_slot_removes_and_reports_absence_afterward() {
    let object = plain();
    let name = SymbolKey::new("x", 0);
    object.add_slot(name.clone(), SlotKind::default(), plain());

    assert!(object.del_slot(&name));
    assert!(!object.del_slot(&name));
    assert!(object.get_slot(&name).is_none());
}

#[test]
fn select_slots_filters_by_kind_in_insertion_order() {
    let object = plain();
    object.add_slot(SymbolKey::new("a", 0), SlotKind::default(), plain());
    object.add_slot(SymbolKey::new("parent_one", 0), SlotKind::parent(), plain());
    object.add_slot(SymbolKey::new("b", 0), SlotKind::default(), plain());
    object.add_slot(SymbolKey::new("parent_two", 0), SlotKind::parent(), plain());

    let parents = object.select_slots(|kind| kind.is_parent);
    let names: Vec<String> = parents.iter().map(|(name, _)| name.to_string()).collect();
    assert_eq!(names, vec!["parent_one".to_string(), "parent_two".to_string()]);
}

#[test]
fn lookup_slot_shadowing_ambiguity_and_absence() {
    let name = SymbolKey::new("shared", 0);

    let left = plain();
    left.add_slot(name.clone(), SlotKind::default(), plain());
    let right = plain();
    right.add_slot(name.clone(), SlotKind::default(), plain());

    let receiver = plain();
    receiver.add_slot(SymbolKey::new("left", 0), SlotKind::parent(), left.clone());
    receiver.add_slot(SymbolKey::new("right", 0), SlotKind::parent(), right);

    let (status, _) = receiver.lookup_slot(&name);
    assert_eq!(status, LookupStatus::FoundMany);

    // Shadowing: defining the name directly on the receiver wins outright.
    receiver.add_slot(name.clone(), SlotKind::default(), plain());
    let (status, location) = receiver.lookup_slot(&name);
    assert_eq!(status, LookupStatus::FoundOne);
    assert!(Rc::ptr_eq(&location.unwrap(), &receiver));

    let (status, location) = receiver.lookup_slot(&SymbolKey::new("nowhere", 0));
    assert_eq!(status, LookupStatus::FoundNone);
    assert!(location.is_none());
}

#[test]
fn lookup_slot_terminates_on_a_diamond_shaped_parent_graph() {
    let name = SymbolKey::new("only_on_root", 0);
    let root = plain();
    root.add_slot(name.clone(), SlotKind::default(), plain());

    let left = plain();
    left.add_slot(SymbolKey::new("root", 0), SlotKind::parent(), root.clone());
    let right = plain();
    right.add_slot(SymbolKey::new("root", 0), SlotKind::parent(), root);

    let bottom = plain();
    bottom.add_slot(SymbolKey::new("left", 0), SlotKind::parent(), left);
    bottom.add_slot(SymbolKey::new("right", 0), SlotKind::parent(), right);

    let (status, location) = bottom.lookup_slot(&name);
    assert_eq!(status, LookupStatus::FoundOne);
    assert!(location.is_some());
}
