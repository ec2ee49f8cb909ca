#![no_main]

use gifcodec::lzw;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(codes) = lzw::unpack(8, data) {
        let _ = lzw::decode(&codes);
    }
});
