#![no_main]

use codec::{decode_update, CodecLimits, LocalGuidTable};
use libfuzzer_sys::fuzz_target;
use schema::{PropertySet, TypeTag, TypedValue};

fn layout() -> PropertySet {
    let mut set = PropertySet::new();
    let _ = set.add_property("hp", TypedValue::Int(100));
    let _ = set.add_property("name", TypedValue::from(""));
    let _ = set.add_property("alive", TypedValue::Bool(true));
    let _ = set.add_property("spot", TypeTag::Vector);
    let _ = set.add_property("target", TypeTag::Object);
    let _ = set.add_property("kind", TypeTag::Class);
    set
}

fuzz_target!(|data: &[u8]| {
    let mut set = layout();
    let guids = LocalGuidTable::new();
    let limits = CodecLimits::for_testing();

    if let Ok(update) = decode_update(&set, data, &guids, &limits) {
        let count = update.entries.len();
        let names = update.apply(&mut set).expect("decoded update applies");
        assert_eq!(names.len(), count);
    }
});
