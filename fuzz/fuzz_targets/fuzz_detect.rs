#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mime = mimetree::detect(data);
    let root = mime.hierarchy().last().unwrap();
    assert!(root.parent().is_none());
    let _ = mime.to_string();
});
