use orevm::bytecode::{LiteralTag, MODULE_MAGIC};
use orevm::deserializer::deserialize_module;
use orevm::object::{kinds, ObjectOps};
use orevm::symbol::SymbolKey;
use orevm::universe::Universe;

fn push_i64(bytes: &mut Vec<u8>, value: i64) {
    bytes.extend_from_slice(&value.to_be_bytes());
}

fn push_symbol(bytes: &mut Vec<u8>, text: &str, arity: i64) {
    bytes.push(LiteralTag::Symbol as u8);
    push_i64(bytes, arity);
    push_i64(bytes, text.len() as i64);
    bytes.extend_from_slice(text.as_bytes());
}

/// Builds: magic + CODE(stack_usage=1, literals=[STRING("hi"), ASSIGNMENT(x)],
/// bytecode=[PUSH_LITERAL 0, RETURN_EXPLICIT]).
#[test]
fn decodes_string_and_assignment_literals_inside_a_code_module() {
    let mut bytes = MODULE_MAGIC.to_vec();
    bytes.push(LiteralTag::Code as u8);
    push_i64(&mut bytes, 1);

    bytes.push(LiteralTag::ObjectArray as u8);
    push_i64(&mut bytes, 2);

    bytes.push(LiteralTag::String as u8);
    push_i64(&mut bytes, 2);
    bytes.extend_from_slice(b"hi");

    bytes.push(LiteralTag::Assignment as u8);
    push_symbol(&mut bytes, "x", 0);

    bytes.push(LiteralTag::ByteArray as u8);
    push_i64(&mut bytes, 4);
    bytes.extend_from_slice(&[0x11, 0x00, 0x30, 0x00]);

    let universe = Universe::init_clean_universe();
    let code = deserialize_module(&universe, &bytes).unwrap();

    assert_eq!(kinds::code_stack_usage(&code), 1);
    assert_eq!(kinds::code_instruction_count(&code), 2);

    let literals = kinds::code_literals(&code).unwrap();
    let text_literal = kinds::object_array_get(&literals, 0).unwrap();
    assert_eq!(kinds::string_text(&text_literal).as_deref(), Some("hi"));

    let assignment_literal = kinds::object_array_get(&literals, 1).unwrap();
    let target = kinds::assignment_target(&assignment_literal).unwrap();
    assert_eq!(target, SymbolKey::new("x", 0));
}

/// Builds an OBJECT literal with an explicit `parent` slot pointing at a
/// second, sibling OBJECT literal embedded in the same literal table --
/// the deserializer must not additionally wire in the Rust-side `Plain`
/// trait's own `parent` slot, or this would fail as a duplicate.
#[test]
fn object_literal_with_explicit_parent_slot_does_not_collide() {
    let mut bytes = MODULE_MAGIC.to_vec();
    bytes.push(LiteralTag::Code as u8);
    push_i64(&mut bytes, 0);

    bytes.push(LiteralTag::ObjectArray as u8);
    push_i64(&mut bytes, 1);

    // OBJECT { parent -> OBJECT {} } with no code attached.
    bytes.push(LiteralTag::Object as u8);
    push_i64(&mut bytes, 1);
    bytes.push(0b10); // kind: parent
    push_symbol(&mut bytes, "parent", 0);
    bytes.push(LiteralTag::Object as u8);
    push_i64(&mut bytes, 0);
    bytes.push(LiteralTag::None as u8);
    bytes.push(LiteralTag::None as u8);

    bytes.push(LiteralTag::ByteArray as u8);
    push_i64(&mut bytes, 0);

    let universe = Universe::init_clean_universe();
    let code = deserialize_module(&universe, &bytes).unwrap();
    let literals = kinds::code_literals(&code).unwrap();
    let object = kinds::object_array_get(&literals, 0).unwrap();
    assert!(object.get_slot(&SymbolKey::new("parent", 0)).is_some());
}
