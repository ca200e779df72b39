#![no_main]
use libfuzzer_sys::fuzz_target;
use weighid_core::{ObjectDetector, RECORD_LEN};
use weighid_hardware::MemoryEeprom;

// Arbitrary store image + readings: loading and classifying must never panic,
// and a decoded record must re-encode to the same bytes.
fuzz_target!(|input: (Vec<u8>, Vec<f32>)| {
    let (image, readings) = input;
    if image.len() >= RECORD_LEN {
        let mut raw = [0u8; RECORD_LEN];
        raw.copy_from_slice(&image[..RECORD_LEN]);
        let record = weighid_core::CalibrationRecord::from_bytes(&raw);
        assert_eq!(record.to_bytes(), raw);
    }

    let mut det = ObjectDetector::new(MemoryEeprom::from_image(image), 0);
    let _ = det.load_config();
    for v in readings {
        let _ = det.process(v);
    }
});
