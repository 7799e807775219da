#![no_main]
use libfuzzer_sys::fuzz_target;
use mcapshrink::wire::Cursor;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must decode to Ok or TruncatedRecord, never a panic.
    let _ = mcapshrink::record::read_image(&mut Cursor::new(data));
    let _ = mcapshrink::record::read_shrunk_image(&mut Cursor::new(data));
});
