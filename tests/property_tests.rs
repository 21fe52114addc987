//! Property-based tests for escaping and buffering.
//!
//! Rows are encoded, read back with the reverse grammar and compared with the
//! input; buffered output is compared across buffer sizes and flush patterns.

mod common;

use common::{decode, Row};
use copy_text::{CopyOptions, CopySerializer};
use proptest::prelude::*;

const FIELDS: usize = 3;

fn encode(rows: &[Row], options: CopyOptions) -> Vec<u8> {
    let mut ser = CopySerializer::new(Vec::<u8>::new(), FIELDS, options).unwrap();
    for row in rows {
        for field in row {
            match field {
                Some(value) => ser.add_str(value).unwrap(),
                None => ser.add_null().unwrap(),
            }
        }
        ser.end_row().unwrap();
    }
    ser.close().unwrap()
}

fn options_strategy() -> impl Strategy<Value = CopyOptions> {
    prop_oneof![
        Just(CopyOptions::new()),
        Just(
            CopyOptions::new()
                .with_delimiter("|")
                .with_separator("\r")
                .with_escape("~")
                .with_null("~N")
        ),
        Just(CopyOptions::new().with_delimiter(",")),
        Just(CopyOptions::new().with_delimiter("é").with_separator(";")),
    ]
}

fn field_strategy() -> impl Strategy<Value = Option<String>> {
    proptest::option::of("[a-zN \\t\\n\\r\\\\|~,;é日\\x01\\x08]{0,24}")
}

fn rows_strategy() -> impl Strategy<Value = Vec<Row>> {
    prop::collection::vec(prop::collection::vec(field_strategy(), FIELDS), 0..8)
}

#[derive(Clone, Debug)]
enum Op {
    Field(String),
    Null,
    EndRow,
    FlushRows,
    FlushFields,
    Flush,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => "[a-z\\t\\n\\\\]{0,12}".prop_map(Op::Field),
        1 => Just(Op::Null),
        2 => Just(Op::EndRow),
        1 => Just(Op::FlushRows),
        1 => Just(Op::FlushFields),
        1 => Just(Op::Flush),
    ]
}

fn run_ops(ops: &[Op], capacity: usize, with_flushes: bool) -> Vec<u8> {
    let options = CopyOptions::new().with_buffer_capacity(capacity);
    let mut ser = CopySerializer::new(Vec::<u8>::new(), FIELDS, options).unwrap();
    for op in ops {
        match op {
            Op::Field(value) if ser.fields_in_row() < FIELDS => ser.add_str(value).unwrap(),
            Op::Null if ser.fields_in_row() < FIELDS => ser.add_null().unwrap(),
            Op::Field(_) | Op::Null | Op::EndRow => ser.end_row().unwrap(),
            Op::FlushRows if with_flushes => ser.flush_rows().unwrap(),
            Op::FlushFields if with_flushes => ser.flush_fields().unwrap(),
            Op::Flush if with_flushes => ser.flush().unwrap(),
            Op::FlushRows | Op::FlushFields | Op::Flush => {}
        }
    }
    ser.close().unwrap()
}

proptest! {
    #[test]
    fn prop_any_string_round_trips(s in any::<String>()) {
        let mut ser = CopySerializer::new(Vec::<u8>::new(), 1, CopyOptions::new()).unwrap();
        ser.add_str(&s).unwrap();
        ser.end_row().unwrap();
        let bytes = ser.close().unwrap();
        prop_assert_eq!(decode(&bytes, &CopyOptions::new()), vec![vec![Some(s)]]);
    }

    #[test]
    fn prop_rows_round_trip(options in options_strategy(), rows in rows_strategy()) {
        let bytes = encode(&rows, options.clone());
        prop_assert_eq!(decode(&bytes, &options), rows);
    }

    #[test]
    fn prop_output_independent_of_capacity(rows in rows_strategy(), capacity in 1usize..32) {
        let small = encode(&rows, CopyOptions::new().with_buffer_capacity(capacity));
        let reference = encode(&rows, CopyOptions::new());
        prop_assert_eq!(small, reference);
    }

    #[test]
    fn prop_flushes_do_not_change_output(
        ops in prop::collection::vec(op_strategy(), 0..40),
        capacity in 1usize..24,
    ) {
        let flushed = run_ops(&ops, capacity, true);
        let reference = run_ops(&ops, 8192, false);
        prop_assert_eq!(flushed, reference);
    }
}
