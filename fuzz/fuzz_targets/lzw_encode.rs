#![no_main]

use gifcodec::lzw;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }
    // Clamp the indices into a 4-bit alphabet and require the full
    // pipeline to reproduce them.
    let indices: Vec<u8> = data.iter().map(|&b| b & 0x0f).collect();
    let codes = lzw::encode(4, &indices).unwrap();
    let packed = lzw::pack(4, &codes);
    let unpacked = lzw::unpack(4, &packed).unwrap();
    assert_eq!(lzw::decode(&unpacked).unwrap(), indices);
});
