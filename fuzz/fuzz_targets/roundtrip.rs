#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(docs) = yamltree::deserialize_docs(data) else {
        return;
    };
    let text = yamltree::serialize_docs(&docs).expect("parsed documents serialize");
    let reparsed = yamltree::deserialize_docs(text.as_str()).expect("emitted text parses");
    assert_eq!(docs, reparsed);
});
