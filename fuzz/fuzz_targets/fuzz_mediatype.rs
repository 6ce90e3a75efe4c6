#![no_main]

use libfuzzer_sys::fuzz_target;
use mimetree::mediatype;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok((media_type, params)) = mediatype::parse(s) {
            if let Some(formatted) = mediatype::format(&media_type, &params) {
                let (again, reparsed) = mediatype::parse(&formatted).unwrap();
                assert_eq!(again, media_type);
                assert_eq!(reparsed, params);
            }
        }
        let _ = mediatype::essence(s);
    }
});
