//! The factory and root namespace.
//!
//! A `Universe` owns every trait singleton, interns symbols by
//! `(text, arity)`, and is the only place new objects get created so that
//! the "every object has a parent slot" invariant can't be forgotten at a
//! call site.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::ProcessErrorKind;
use crate::object::{kinds, CodeData, FrameData, NativeCall, ObjectData, ObjectKind, ObjectOps, ObjectRef, PrimitiveData, ProcessData, SlotKind};
use crate::symbol::SymbolKey;

const TRAIT_LABELS: &[&str] = &[
    "Plain",
    "Symbol",
    "SmallInteger",
    "ByteArray",
    "ObjectArray",
    "String",
    "Code",
    "Assignment",
    "PrimitiveMethod",
    "Frame",
    "Process",
    "Error",
    "None",
    "True",
    "False",
];

pub struct Universe {
    none: ObjectRef,
    true_obj: ObjectRef,
    false_obj: ObjectRef,
    lobby: ObjectRef,
    globals: ObjectRef,
    primitives: ObjectRef,
    traits: HashMap<&'static str, ObjectRef>,
    symbols: RefCell<HashMap<SymbolKey, ObjectRef>>,
}

impl Universe {
    /// Builds traits, globals, the lobby and a `primitives` holder. Does
    /// not populate `primitives` with actual `PrimitiveMethod` slots --
    /// that is the `primitives` module's job, run once after this
    /// returns.
    pub fn init_clean_universe() -> Rc<Universe> {
        let mut traits = HashMap::new();
        for label in TRAIT_LABELS {
            traits.insert(*label, ObjectData::new(ObjectKind::Plain));
        }
        let plain_trait = traits.get("Plain").expect("Plain trait registered").clone();
        for (label, trait_object) in traits.iter() {
            if *label == "Plain" {
                continue;
            }
            trait_object.add_slot(SymbolKey::new("parent", 0), SlotKind::parent(), plain_trait.clone());
        }

        let none = ObjectData::new(ObjectKind::Plain);
        none.add_slot(SymbolKey::new("parent", 0), SlotKind::parent(), traits["None"].clone());

        let true_obj = ObjectData::new(ObjectKind::Plain);
        true_obj.add_slot(SymbolKey::new("parent", 0), SlotKind::parent(), traits["True"].clone());

        let false_obj = ObjectData::new(ObjectKind::Plain);
        false_obj.add_slot(SymbolKey::new("parent", 0), SlotKind::parent(), traits["False"].clone());

        let lobby = ObjectData::new(ObjectKind::Plain);
        lobby.add_slot(SymbolKey::new("parent", 0), SlotKind::parent(), plain_trait.clone());

        let globals = ObjectData::new(ObjectKind::Plain);
        globals.add_slot(SymbolKey::new("parent", 0), SlotKind::parent(), plain_trait.clone());

        let primitives = ObjectData::new(ObjectKind::Plain);
        primitives.add_slot(SymbolKey::new("parent", 0), SlotKind::parent(), plain_trait);

        let universe = Rc::new(Universe {
            none,
            true_obj,
            false_obj,
            lobby: lobby.clone(),
            globals: globals.clone(),
            primitives: primitives.clone(),
            traits,
            symbols: RefCell::new(HashMap::new()),
        });

        // Ordinary symbol creation: the "parent" symbol gets a `parent`
        // slot pointing at the Symbol trait exactly like any other symbol.
        universe.new_symbol("parent", 0);

        let traits_object = universe.new_plain_object();
        for (label, trait_object) in universe.traits.iter() {
            traits_object.add_slot(SymbolKey::new(*label, 0), SlotKind::default(), trait_object.clone());
        }

        globals.add_slot(SymbolKey::new("True", 0), SlotKind::default(), universe.true_obj.clone());
        globals.add_slot(SymbolKey::new("False", 0), SlotKind::default(), universe.false_obj.clone());
        globals.add_slot(SymbolKey::new("None", 0), SlotKind::default(), universe.none.clone());
        globals.add_slot(SymbolKey::new("traits", 0), SlotKind::default(), traits_object);

        lobby.add_slot(SymbolKey::new("lobby", 0), SlotKind::default(), lobby.clone());
        lobby.add_slot(SymbolKey::new("globals", 0), SlotKind::default(), globals);
        lobby.add_slot(SymbolKey::new("primitives", 0), SlotKind::default(), primitives);

        universe
    }

    fn attach(&self, object: &ObjectRef, trait_name: &'static str) {
        let trait_object = self
            .traits
            .get(trait_name)
            .unwrap_or_else(|| panic!("unknown trait {trait_name}"))
            .clone();
        object.add_slot(SymbolKey::new("parent", 0), SlotKind::parent(), trait_object);
    }

    pub fn get_none_object(&self) -> ObjectRef {
        self.none.clone()
    }

    pub fn get_true_object(&self) -> ObjectRef {
        self.true_obj.clone()
    }

    pub fn get_false_object(&self) -> ObjectRef {
        self.false_obj.clone()
    }

    pub fn get_lobby_object(&self) -> ObjectRef {
        self.lobby.clone()
    }

    pub fn globals_object(&self) -> ObjectRef {
        self.globals.clone()
    }

    pub fn primitives_object(&self) -> ObjectRef {
        self.primitives.clone()
    }

    pub fn new_plain_object(&self) -> ObjectRef {
        let object = ObjectData::new(ObjectKind::Plain);
        self.attach(&object, "Plain");
        object
    }

    /// Interns by `(text, arity)`: repeated calls with the same pair
    /// return the same `ObjectRef` -- interning is permitted, not
    /// required, but is what makes selector comparisons in `SEND` cheap.
    pub fn new_symbol(&self, text: impl Into<Rc<str>>, arity: u32) -> ObjectRef {
        let key = SymbolKey::new(text, arity);
        if let Some(existing) = self.symbols.borrow().get(&key) {
            return existing.clone();
        }
        let object = ObjectData::new(ObjectKind::Symbol(key.clone()));
        self.attach(&object, "Symbol");
        self.symbols.borrow_mut().insert(key, object.clone());
        object
    }

    pub fn new_small_integer(&self, value: i64) -> ObjectRef {
        let object = ObjectData::new(ObjectKind::SmallInteger(value));
        self.attach(&object, "SmallInteger");
        object
    }

    pub fn new_byte_array(&self, count: usize) -> ObjectRef {
        let object = ObjectData::new(ObjectKind::ByteArray(vec![0u8; count]));
        self.attach(&object, "ByteArray");
        object
    }

    pub fn new_object_array(&self, count: usize) -> ObjectRef {
        let object = ObjectData::new(ObjectKind::ObjectArray(vec![self.none.clone(); count]));
        self.attach(&object, "ObjectArray");
        object
    }

    pub fn new_string(&self, text: impl Into<String>) -> ObjectRef {
        let object = ObjectData::new(ObjectKind::String(text.into()));
        self.attach(&object, "String");
        object
    }

    pub fn new_code(&self, stack_usage: u32, literals: ObjectRef, bytecode: ObjectRef) -> ObjectRef {
        let object = ObjectData::new(ObjectKind::Code(CodeData {
            stack_usage,
            literals,
            bytecode,
        }));
        self.attach(&object, "Code");
        object
    }

    pub fn new_assignment(&self, target: SymbolKey) -> ObjectRef {
        let object = ObjectData::new(ObjectKind::Assignment(target));
        self.attach(&object, "Assignment");
        object
    }

    pub fn new_primitive(&self, parameter_count: u32, native_call: NativeCall) -> ObjectRef {
        let object = ObjectData::new(ObjectKind::PrimitiveMethod(PrimitiveData {
            parameter_count,
            native_call,
        }));
        self.attach(&object, "PrimitiveMethod");
        object
    }

    pub fn new_frame(&self, stack: ObjectRef, method_activation: ObjectRef) -> ObjectRef {
        let object = ObjectData::new(ObjectKind::Frame(FrameData {
            previous: None,
            stack,
            stack_top: 0,
            method_activation,
            instruction_index: 0,
        }));
        self.attach(&object, "Frame");
        object
    }

    pub fn new_frame_with_stack_size(&self, size: usize, method_activation: ObjectRef) -> ObjectRef {
        let stack = self.new_object_array(size);
        self.new_frame(stack, method_activation)
    }

    pub fn new_frame_with_code_stack_usage(&self, method_activation: ObjectRef) -> ObjectRef {
        let code = method_activation
            .borrow()
            .code
            .clone()
            .expect("method activation must carry code");
        let stack_usage = kinds::code_stack_usage(&code) as usize;
        self.new_frame_with_stack_size(stack_usage, method_activation)
    }

    pub fn new_process(&self, root_frame: ObjectRef) -> ObjectRef {
        let object = ObjectData::new(ObjectKind::Process(ProcessData {
            active_frame: Some(root_frame),
            result: self.none.clone(),
            error_handler: self.none.clone(),
        }));
        self.attach(&object, "Process");
        object
    }

    pub fn new_error_object(&self, symbol_name: ObjectRef) -> ObjectRef {
        let object = ObjectData::new(ObjectKind::Plain);
        self.attach(&object, "Error");
        object.add_slot(SymbolKey::new("name", 0), SlotKind::default(), symbol_name);
        object
    }

    pub fn new_process_error(&self, kind: ProcessErrorKind) -> ObjectRef {
        let name = self.new_symbol(kind.symbol_text(), 0);
        self.new_error_object(name)
    }
}
