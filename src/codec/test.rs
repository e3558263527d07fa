#[cfg(test)]
mod codec_tests {
    use std::sync::LazyLock;

    use bytes::{
        Bytes,
        BytesMut,
    };
    use proptest::{
        collection::vec,
        option,
        prelude::*,
        proptest,
    };

    use crate::{
        binary::{
            TBinaryInputProtocol,
            TBinaryOutputProtocol,
        },
        codec::StructCodec,
        config::{
            CodecConfig,
            Validation,
        },
        errs::{
            CodecError,
            StreamError,
        },
        protocol::{
            TInputProtocol,
            TOutputProtocol,
        },
        schema::{
            StructSchema,
            TypeDescriptor,
        },
        ttype::TType,
        value::{
            StructInstance,
            Value,
        },
    };

    static LOCK: LazyLock<StructSchema> = LazyLock::new(|| {
        StructSchema::builder("LockResponse")
            .required(1, "lockid", TypeDescriptor::I64)
            .required(2, "state", TypeDescriptor::I32)
            .optional(3, "errorMessage", TypeDescriptor::String)
            .build()
    });

    static ITEM: LazyLock<StructSchema> = LazyLock::new(|| {
        StructSchema::builder("Item")
            .required(1, "key", TypeDescriptor::String)
            .optional(2, "weight", TypeDescriptor::Double)
            .build()
    });

    static BASKET: LazyLock<StructSchema> = LazyLock::new(|| {
        StructSchema::builder("Basket")
            .optional(5, "labels", TypeDescriptor::map(TypeDescriptor::String, TypeDescriptor::I64))
            .optional(1, "owner", TypeDescriptor::String)
            .optional(3, "items", TypeDescriptor::list(TypeDescriptor::Struct(&ITEM)))
            .optional(2, "flag", TypeDescriptor::Bool)
            .optional(4, "tags", TypeDescriptor::set(TypeDescriptor::String))
            .optional(6, "tiny", TypeDescriptor::I8)
            .optional(7, "small", TypeDescriptor::I16)
            .optional(8, "blob", TypeDescriptor::Binary)
            .optional(9, "best", TypeDescriptor::Struct(&ITEM))
            .optional(
                10,
                "grid",
                TypeDescriptor::list(TypeDescriptor::list(TypeDescriptor::I32)),
            )
            .build()
    });

    static INNER: LazyLock<StructSchema> = LazyLock::new(|| {
        StructSchema::builder("Inner")
            .optional(1, "grid", TypeDescriptor::list(TypeDescriptor::list(TypeDescriptor::I8)))
            .build()
    });

    static MID: LazyLock<StructSchema> = LazyLock::new(|| {
        StructSchema::builder("Mid")
            .optional(1, "inner", TypeDescriptor::Struct(&INNER))
            .build()
    });

    static OUTER: LazyLock<StructSchema> = LazyLock::new(|| {
        StructSchema::builder("Outer")
            .optional(1, "mid", TypeDescriptor::Struct(&MID))
            .build()
    });

    fn codec() -> StructCodec {
        StructCodec::default()
    }

    fn encode(instance: &StructInstance, schema: &StructSchema) -> Bytes {
        codec().encode_to_bytes(instance, schema).unwrap()
    }

    fn decode(schema: &StructSchema, src: Bytes) -> StructInstance {
        codec().decode_from_bytes(schema, src).unwrap()
    }

    fn item(key: &str) -> StructInstance {
        StructInstance::new().with("key", key)
    }

    #[test]
    fn test_lock_response_scenario() {
        let instance = StructInstance::new().with("lockid", 42i64).with("state", 1i32);
        let bytes = encode(&instance, &LOCK);

        assert_eq!(
            bytes.as_ref(),
            &[
                0x0a, 0x00, 0x01, 0, 0, 0, 0, 0, 0, 0, 42, // lockid
                0x08, 0x00, 0x02, 0, 0, 0, 1, // state
                0x00, // stop
            ]
        );

        let decoded = decode(&LOCK, bytes);
        assert_eq!(decoded.get("lockid"), Some(&Value::I64(42)));
        assert_eq!(decoded.get("state"), Some(&Value::I32(1)));
        assert!(!decoded.is_set("errorMessage"));
        assert_eq!(decoded, instance);
    }

    #[test]
    fn test_encode_reports_bytes_written() {
        let instance = StructInstance::new()
            .with("lockid", 7i64)
            .with("errorMessage", "busy");
        let mut out = TBinaryOutputProtocol::new(BytesMut::new());
        let written = codec().encode(&instance, &LOCK, &mut out).unwrap();
        assert_eq!(written, out.get_ref().len());
        assert_eq!(written, 3 + 8 + 3 + 4 + 4 + 1);
    }

    #[test]
    fn test_fields_written_in_id_order() {
        let instance = StructInstance::new()
            .with("labels", std::collections::BTreeMap::from([("a".to_string(), 1i64)]))
            .with("flag", true)
            .with("owner", "sam");
        let bytes = encode(&instance, &BASKET);

        let mut input = TBinaryInputProtocol::new(bytes);
        let mut ids = Vec::new();
        loop {
            let header = input.read_field_begin().unwrap();
            if header.is_stop() {
                break;
            }
            ids.push(header.id);
            input.skip(header.ttype).unwrap();
        }
        assert_eq!(ids, vec![1, 2, 5]);
    }

    #[test]
    fn test_list_of_structs_scenario() {
        let instance = StructInstance::new().with(
            "items",
            vec![
                Value::from(item("first")),
                item("second").with("weight", 0.5).into(),
                item("third").into(),
            ],
        );
        let bytes = encode(&instance, &BASKET);

        // field header then list header
        assert_eq!(&bytes[..3], &[0x0f, 0x00, 0x03]);
        assert_eq!(&bytes[3..8], &[0x0c, 0, 0, 0, 3]);

        let decoded = decode(&BASKET, bytes);
        let Some(Value::List(items)) = decoded.get("items") else {
            panic!("items missing: {:?}", decoded);
        };
        let keys: Vec<_> = items
            .iter()
            .map(|v| match v {
                | Value::Struct(s) => s.get("key").cloned(),
                | _ => None,
            })
            .collect();
        assert_eq!(
            keys,
            vec![
                Some(Value::from("first")),
                Some(Value::from("second")),
                Some(Value::from("third"))
            ]
        );
        assert_eq!(decoded, instance);
    }

    #[test]
    fn test_non_collection_for_list_is_type_error() {
        let instance = StructInstance::new()
            .with("owner", "sam")
            .with("items", 3i32);

        let mut backing = BytesMut::new();
        let mut out = TBinaryOutputProtocol::new(&mut backing);
        let err = codec().encode(&instance, &BASKET, &mut out).unwrap_err();
        match err {
            | CodecError::Type {
                field,
                expected,
                found,
            } => {
                assert_eq!(field, "items");
                assert_eq!(expected, TType::List);
                assert_eq!(found, TType::I32);
            },
            | other => panic!("expected type error, got {:?}", other),
        }

        // owner (id 1) went out, nothing for items (id 3) did
        let mut expected: Vec<u8> = vec![0x0b, 0x00, 0x01, 0, 0, 0, 3];
        expected.extend_from_slice(b"sam");
        assert_eq!(backing.as_ref(), expected.as_slice());
    }

    #[test]
    fn test_nested_shape_error_names_path() {
        let instance = StructInstance::new().with(
            "items",
            vec![Value::from(item("ok")), StructInstance::new().with("key", 9i64).into()],
        );
        let err = codec().encode_to_bytes(&instance, &BASKET).unwrap_err();
        assert!(matches!(
            err,
            CodecError::Type { ref field, expected: TType::String, found: TType::I64 }
                if field == "items[1].key"
        ));
    }

    #[test]
    fn test_optional_field_omitted() {
        let with = StructInstance::new().with("owner", "a").with("flag", false);
        let without = StructInstance::new().with("owner", "a");

        let with_bytes = encode(&with, &BASKET);
        let without_bytes = encode(&without, &BASKET);
        assert_eq!(with_bytes.len(), without_bytes.len() + 4);

        let decoded = decode(&BASKET, without_bytes);
        assert!(!decoded.is_set("flag"));
        assert_eq!(decoded.get("flag"), None);
    }

    #[test]
    fn test_required_not_enforced_by_default() {
        let instance = StructInstance::new().with("state", 2i32);
        let bytes = encode(&instance, &LOCK);
        let decoded = decode(&LOCK, bytes);
        assert!(!decoded.is_set("lockid"));
    }

    #[test]
    fn test_validation_rejects_missing_required_on_encode() {
        let strict = StructCodec::new(CodecConfig::default().with_validation(Validation::Required));
        let instance = StructInstance::new().with("lockid", 1i64);

        let mut backing = BytesMut::new();
        let mut out = TBinaryOutputProtocol::new(&mut backing);
        let err = strict.encode(&instance, &LOCK, &mut out).unwrap_err();
        assert!(matches!(
            err,
            CodecError::MissingRequired { name: "LockResponse", field: "state" }
        ));
        assert!(backing.is_empty());
    }

    #[test]
    fn test_validation_reaches_nested_structs() {
        let strict = StructCodec::new(CodecConfig::default().with_validation(Validation::Required));
        let instance = StructInstance::new().with(
            "items",
            vec![Value::from(item("ok")), StructInstance::new().with("weight", 1.0).into()],
        );
        let err = strict.encode_to_bytes(&instance, &BASKET).unwrap_err();
        assert!(matches!(
            err,
            CodecError::MissingRequired { name: "Item", field: "key" }
        ));
    }

    #[test]
    fn test_validation_rejects_missing_required_on_decode() {
        let bytes = encode(&StructInstance::new().with("lockid", 5i64), &LOCK);
        let strict = StructCodec::new(CodecConfig::default().with_validation(Validation::Required));
        let err = strict.decode_from_bytes(&LOCK, bytes).unwrap_err();
        assert!(matches!(
            err,
            CodecError::MissingRequired { name: "LockResponse", field: "state" }
        ));
    }

    /// Writes a LockResponse with an extra field carrying `extra`.
    fn lock_with_extra(extra: impl FnOnce(&mut TBinaryOutputProtocol<BytesMut>)) -> Bytes {
        let mut out = TBinaryOutputProtocol::new(BytesMut::new());
        out.write_field_begin("lockid", TType::I64, 1).unwrap();
        out.write_i64(42).unwrap();
        extra(&mut out);
        out.write_field_begin("state", TType::I32, 2).unwrap();
        out.write_i32(1).unwrap();
        out.write_field_stop().unwrap();
        out.into_inner().freeze()
    }

    #[test]
    fn test_unknown_field_skipped() {
        let plain = lock_with_extra(|_| {});
        let extended = lock_with_extra(|out| {
            out.write_field_begin("future", TType::Struct, 99).unwrap();
            out.write_field_begin("inner", TType::List, 1).unwrap();
            out.write_list_begin(TType::String, 2).unwrap();
            out.write_string("a").unwrap();
            out.write_string("b").unwrap();
            out.write_field_stop().unwrap();
        });

        assert_eq!(decode(&LOCK, extended), decode(&LOCK, plain));
    }

    #[test]
    fn test_type_mismatch_skipped() {
        // errorMessage (id 3) arrives as an i32 instead of a string
        let bytes = lock_with_extra(|out| {
            out.write_field_begin("errorMessage", TType::I32, 3).unwrap();
            out.write_i32(-1).unwrap();
        });

        let decoded = decode(&LOCK, bytes);
        assert!(!decoded.is_set("errorMessage"));
        assert_eq!(decoded.get("state"), Some(&Value::I32(1)));
    }

    #[test]
    fn test_element_type_mismatch_skips_collection() {
        let mut out = TBinaryOutputProtocol::new(BytesMut::new());
        out.write_field_begin("tags", TType::Set, 4).unwrap();
        out.write_set_begin(TType::I64, 2).unwrap();
        out.write_i64(1).unwrap();
        out.write_i64(2).unwrap();
        out.write_field_begin("flag", TType::Bool, 2).unwrap();
        out.write_bool(true).unwrap();
        out.write_field_stop().unwrap();

        let decoded = decode(&BASKET, out.into_inner().freeze());
        assert!(!decoded.is_set("tags"));
        assert_eq!(decoded.get("flag"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_empty_collection_header_types_ignored() {
        let mut out = TBinaryOutputProtocol::new(BytesMut::new());
        out.write_field_begin("labels", TType::Map, 5).unwrap();
        out.write_map_begin(TType::Stop, TType::Stop, 0).unwrap();
        out.write_field_stop().unwrap();

        let decoded = decode(&BASKET, out.into_inner().freeze());
        assert_eq!(decoded.get("labels"), Some(&Value::Map(Vec::new())));
    }

    #[test]
    fn test_wire_order_independent() {
        let mut out = TBinaryOutputProtocol::new(BytesMut::new());
        out.write_field_begin("state", TType::I32, 2).unwrap();
        out.write_i32(4).unwrap();
        out.write_field_begin("errorMessage", TType::String, 3).unwrap();
        out.write_string("nope").unwrap();
        out.write_field_begin("lockid", TType::I64, 1).unwrap();
        out.write_i64(8).unwrap();
        out.write_field_stop().unwrap();

        let decoded = decode(&LOCK, out.into_inner().freeze());
        let expected = StructInstance::new()
            .with("lockid", 8i64)
            .with("state", 4i32)
            .with("errorMessage", "nope");
        assert_eq!(decoded, expected);
    }

    #[test]
    fn test_truncated_input_propagates() {
        let bytes = encode(
            &StructInstance::new().with("lockid", 1i64).with("state", 1i32),
            &LOCK,
        );
        let err = codec()
            .decode_from_bytes(&LOCK, bytes.slice(..bytes.len() - 3))
            .unwrap_err();
        assert!(matches!(
            err,
            CodecError::Stream(StreamError::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn test_missing_stop_is_eof() {
        let bytes = encode(&StructInstance::new().with("lockid", 1i64), &LOCK);
        let err = codec()
            .decode_from_bytes(&LOCK, bytes.slice(..bytes.len() - 1))
            .unwrap_err();
        assert!(matches!(
            err,
            CodecError::Stream(StreamError::UnexpectedEof { needed: 1, remaining: 0 })
        ));
    }

    #[test]
    fn test_decode_depth_limit() {
        let instance = StructInstance::new().with(
            "grid",
            vec![Value::from(vec![1i32, 2]), Value::from(vec![3i32])],
        );
        let bytes = encode(&instance, &BASKET);

        let shallow = StructCodec::new(CodecConfig::default().with_max_depth(2));
        assert!(matches!(
            shallow.decode_from_bytes(&BASKET, bytes.clone()),
            Err(CodecError::DepthLimit(2))
        ));
        assert_eq!(decode(&BASKET, bytes), instance);
    }

    /// Outer -> Mid -> Inner -> list<list<i8>>, with the grid under `grid_id`.
    fn nested_grid(grid_id: u16) -> Bytes {
        let mut out = TBinaryOutputProtocol::new(BytesMut::new());
        out.write_field_begin("mid", TType::Struct, 1).unwrap();
        out.write_field_begin("inner", TType::Struct, 1).unwrap();
        out.write_field_begin("grid", TType::List, grid_id).unwrap();
        out.write_list_begin(TType::List, 1).unwrap();
        out.write_list_begin(TType::I8, 1).unwrap();
        out.write_i8(7).unwrap();
        out.write_field_stop().unwrap();
        out.write_field_stop().unwrap();
        out.write_field_stop().unwrap();
        out.into_inner().freeze()
    }

    #[test]
    fn test_skipped_fields_share_depth_limit() {
        for max_depth in [3, 4] {
            let codec = StructCodec::new(CodecConfig::default().with_max_depth(max_depth));
            for grid_id in [1, 99] {
                let res = codec.decode_from_bytes(&OUTER, nested_grid(grid_id));
                assert!(
                    matches!(&res, Err(CodecError::DepthLimit(d)) if *d == max_depth),
                    "grid id {} at depth {}: {:?}",
                    grid_id,
                    max_depth,
                    res
                );
            }
        }

        let codec = StructCodec::new(CodecConfig::default().with_max_depth(5));
        let known = codec.decode_from_bytes(&OUTER, nested_grid(1)).unwrap();
        let unknown = codec.decode_from_bytes(&OUTER, nested_grid(99)).unwrap();
        let inner_of = |outer: &StructInstance| match outer.get("mid") {
            | Some(Value::Struct(mid)) => match mid.get("inner") {
                | Some(Value::Struct(inner)) => inner.clone(),
                | other => panic!("inner: {:?}", other),
            },
            | other => panic!("mid: {:?}", other),
        };
        assert!(inner_of(&known).is_set("grid"));
        assert!(inner_of(&unknown).is_empty());
    }

    #[test]
    fn test_nested_element_mismatch_drops_enclosing_field() {
        // grid is list<list<i32>>; the second inner list claims i64
        let mut out = TBinaryOutputProtocol::new(BytesMut::new());
        out.write_field_begin("grid", TType::List, 10).unwrap();
        out.write_list_begin(TType::List, 2).unwrap();
        out.write_list_begin(TType::I32, 1).unwrap();
        out.write_i32(1).unwrap();
        out.write_list_begin(TType::I64, 1).unwrap();
        out.write_i64(2).unwrap();
        out.write_field_begin("flag", TType::Bool, 2).unwrap();
        out.write_bool(true).unwrap();
        out.write_field_stop().unwrap();

        let decoded = decode(&BASKET, out.into_inner().freeze());
        assert!(!decoded.is_set("grid"));
        assert_eq!(decoded.get("flag"), Some(&Value::Bool(true)));
        assert_eq!(decoded.len(), 1);
    }

    #[test]
    fn test_map_entry_type_mismatch_skips_map() {
        // labels is map<string, i64>; values arrive as i32
        let mut out = TBinaryOutputProtocol::new(BytesMut::new());
        out.write_field_begin("labels", TType::Map, 5).unwrap();
        out.write_map_begin(TType::String, TType::I32, 1).unwrap();
        out.write_string("a").unwrap();
        out.write_i32(1).unwrap();
        out.write_field_begin("flag", TType::Bool, 2).unwrap();
        out.write_bool(true).unwrap();
        out.write_field_stop().unwrap();

        let decoded = decode(&BASKET, out.into_inner().freeze());
        assert!(!decoded.is_set("labels"));
        assert_eq!(decoded.get("flag"), Some(&Value::Bool(true)));

        // and with the key type wrong instead
        let mut out = TBinaryOutputProtocol::new(BytesMut::new());
        out.write_field_begin("labels", TType::Map, 5).unwrap();
        out.write_map_begin(TType::I16, TType::I64, 1).unwrap();
        out.write_i16(1).unwrap();
        out.write_i64(1).unwrap();
        out.write_field_begin("flag", TType::Bool, 2).unwrap();
        out.write_bool(false).unwrap();
        out.write_field_stop().unwrap();

        let decoded = decode(&BASKET, out.into_inner().freeze());
        assert!(!decoded.is_set("labels"));
        assert_eq!(decoded.get("flag"), Some(&Value::Bool(false)));
    }

    #[test]
    fn test_decoder_leaves_trailing_bytes() {
        let mut src = BytesMut::from(encode(&item("k"), &ITEM).as_ref());
        src.extend_from_slice(&[0xde, 0xad]);

        let mut input = TBinaryInputProtocol::new(src.freeze());
        let decoded = codec().decode(&ITEM, &mut input).unwrap();
        assert_eq!(decoded, item("k"));
        assert_eq!(input.remaining(), 2);
    }

    fn arb_item() -> impl Strategy<Value = StructInstance> {
        ("[a-z]{0,8}", option::of(-1.0e6f64..1.0e6)).prop_map(|(key, weight)| {
            StructInstance::new()
                .with("key", key)
                .with_opt("weight", weight)
        })
    }

    fn arb_basket() -> impl Strategy<Value = StructInstance> {
        (
            option::of("\\PC{0,16}"),
            option::of(any::<bool>()),
            option::of(vec(arb_item(), 0..5)),
            option::of(vec("[a-z]{1,4}", 0..4)),
            option::of(vec(("[a-z]{1,6}", any::<i64>()), 0..4)),
            option::of(any::<i8>()),
            option::of(any::<i16>()),
            option::of(vec(any::<u8>(), 0..32)),
            option::of(arb_item()),
            option::of(vec(vec(any::<i32>(), 0..4), 0..3)),
        )
            .prop_map(
                |(owner, flag, items, tags, labels, tiny, small, blob, best, grid)| {
                    StructInstance::new()
                        .with_opt("owner", owner)
                        .with_opt("flag", flag)
                        .with_opt("items", items)
                        .with_opt(
                            "tags",
                            tags.map(|t| Value::Set(t.into_iter().map(Value::from).collect())),
                        )
                        .with_opt(
                            "labels",
                            labels.map(|l| {
                                Value::Map(
                                    l.into_iter()
                                        .map(|(k, v)| (Value::from(k), Value::from(v)))
                                        .collect(),
                                )
                            }),
                        )
                        .with_opt("tiny", tiny)
                        .with_opt("small", small)
                        .with_opt("blob", blob.map(Bytes::from))
                        .with_opt("best", best)
                        .with_opt("grid", grid)
                },
            )
    }

    proptest! {
        #[test]
        fn test_round_trip(instance in arb_basket()) {
            let bytes = encode(&instance, &BASKET);
            prop_assert_eq!(decode(&BASKET, bytes), instance);
        }

        #[test]
        fn test_unknown_fields_never_change_result(
            instance in arb_basket(),
            extra_id in 11u16..1000,
            extra in vec(any::<u8>(), 0..16),
        ) {
            let bytes = encode(&instance, &BASKET);

            // splice an unknown binary field in front of the encoded fields
            let mut out = TBinaryOutputProtocol::new(BytesMut::new());
            out.write_field_begin("extra", TType::String, extra_id).unwrap();
            out.write_binary(&extra).unwrap();
            let mut spliced = out.into_inner();
            spliced.extend_from_slice(&bytes);

            prop_assert_eq!(decode(&BASKET, spliced.freeze()), decode(&BASKET, bytes));
        }

        #[test]
        fn test_garbage_never_panics(raw in vec(any::<u8>(), 0..64)) {
            let _ = codec().decode_from_bytes(&BASKET, Bytes::from(raw));
        }
    }
}
