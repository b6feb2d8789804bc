#![no_main]

use bitstream::ByteReader;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut reader = ByteReader::new(data);
    let mut idx = 0usize;

    // Input bytes pick a bounded sequence of reads.
    while idx < data.len() && idx < 1024 {
        let op = data[idx] % 7;
        idx += 1;

        let ok = match op {
            0 => reader.read_u8().is_ok(),
            1 => reader.read_u16().is_ok(),
            2 => reader.read_u32().is_ok(),
            3 => reader.read_f32().is_ok(),
            4 => reader.read_str_u16().is_ok(),
            5 => reader.read_bytes_u32().is_ok(),
            _ => {
                let len = usize::from(data[idx.saturating_sub(1)] % 16);
                reader.read_raw(len).is_ok()
            }
        };
        if !ok {
            break;
        }
    }
    assert!(reader.position() <= data.len());
});
