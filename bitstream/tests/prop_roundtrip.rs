use bitstream::{ByteReader, ByteWriter};
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Op {
    U8(u8),
    U16(u16),
    U32(u32),
    I32(i32),
    F32(f32),
    Str(String),
    Bytes(Vec<u8>),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        any::<u8>().prop_map(Op::U8),
        any::<u16>().prop_map(Op::U16),
        any::<u32>().prop_map(Op::U32),
        any::<i32>().prop_map(Op::I32),
        any::<f32>().prop_map(Op::F32),
        ".{0,32}".prop_map(Op::Str),
        prop::collection::vec(any::<u8>(), 0..64).prop_map(Op::Bytes),
    ]
}

proptest! {
    #[test]
    fn prop_roundtrip_ops(ops in prop::collection::vec(op_strategy(), 1..64)) {
        let mut writer = ByteWriter::new();

        for op in &ops {
            match op {
                Op::U8(v) => writer.write_u8(*v),
                Op::U16(v) => writer.write_u16(*v),
                Op::U32(v) => writer.write_u32(*v),
                Op::I32(v) => writer.write_i32(*v),
                Op::F32(v) => writer.write_f32(*v),
                Op::Str(v) => writer.write_str_u16(v).unwrap(),
                Op::Bytes(v) => writer.write_bytes_u32(v).unwrap(),
            }
        }

        let bytes = writer.finish();
        let mut reader = ByteReader::new(&bytes);

        for op in &ops {
            match op {
                Op::U8(v) => {
                    prop_assert_eq!(reader.read_u8().unwrap(), *v);
                }
                Op::U16(v) => {
                    prop_assert_eq!(reader.read_u16().unwrap(), *v);
                }
                Op::U32(v) => {
                    prop_assert_eq!(reader.read_u32().unwrap(), *v);
                }
                Op::I32(v) => {
                    prop_assert_eq!(reader.read_i32().unwrap(), *v);
                }
                Op::F32(v) => {
                    prop_assert_eq!(reader.read_f32().unwrap().to_bits(), v.to_bits());
                }
                Op::Str(v) => {
                    prop_assert_eq!(reader.read_str_u16().unwrap(), v.as_str());
                }
                Op::Bytes(v) => {
                    prop_assert_eq!(reader.read_bytes_u32().unwrap(), v.as_slice());
                }
            }
        }
        prop_assert!(reader.is_empty());
    }

    #[test]
    fn prop_truncated_never_panics(data in prop::collection::vec(any::<u8>(), 0..32)) {
        let mut reader = ByteReader::new(&data);
        while reader.read_str_u16().is_ok() {}
        let mut reader = ByteReader::new(&data);
        while reader.read_bytes_u32().is_ok() {}
    }
}
