#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    use psd_rgb::zune_core::bytestream::ZCursor;
    use psd_rgb::zune_core::options::DecoderOptions;

    let options = DecoderOptions::default().set_strict_mode(false);
    let mut decoder = psd_rgb::PSDDecoder::new_with_options(ZCursor::new(data), options);

    if let Ok(image) = decoder.decode() {
        assert_eq!(image.pixels.len(), image.width * image.height);
    }
});
