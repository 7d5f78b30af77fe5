#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use proptest::prelude::*;
    use primitives_core::config::PrimitivesConfig;
    use primitives_core::crypto::sha256;
    use primitives_core::pipeline::{
        derive_session_keys, generate_salt, BatchCompressor, BatchDecompressor, PacketDecryptor,
        PacketEncryptor, PacketError, SessionKeys, BATCH_FLUSH_THRESHOLD,
    };
    use primitives_core::{Backend, PrimitiveError};

    fn keys() -> SessionKeys {
        derive_session_keys(Backend::Native, b"0123456789abcdef", b"shared secret")
    }

    fn pair(backend: Backend) -> (PacketEncryptor, PacketDecryptor) {
        let k = keys();
        (
            PacketEncryptor::new(backend, backend, &k).unwrap(),
            PacketDecryptor::new(backend, backend, &k).unwrap(),
        )
    }

    #[test]
    fn key_derivation_hashes_salt_then_secret() {
        let k = keys();
        let expected = sha256(b"0123456789abcdefshared secret");
        assert_eq!(k.key, expected);
        assert_eq!(&k.iv[..], &expected[..16]);

        let portable = derive_session_keys(Backend::Portable, b"0123456789abcdef", b"shared secret");
        assert_eq!(portable.key, k.key);
        assert_eq!(format!("{k:?}"), "SessionKeys { .. }");
    }

    #[test]
    fn salts_are_random() {
        let a = generate_salt();
        let b = generate_salt();
        assert_eq!(a.len(), 16);
        assert_ne!(a, b);
    }

    #[test]
    fn sealed_packets_open_in_order() {
        for backend in Backend::ALL {
            let (mut enc, mut dec) = pair(backend);
            for msg in [&b"hello"[..], b"", b"a somewhat longer third packet"] {
                let sealed = enc.seal(msg);
                assert_eq!(sealed.len(), msg.len() + 8);
                assert_eq!(dec.open(&sealed).unwrap(), msg);
            }
            assert_eq!(enc.counter(), 3);
            assert_eq!(dec.counter(), 3);
        }
    }

    #[test]
    fn backends_produce_identical_packets() {
        let (mut native, _) = pair(Backend::Native);
        let (mut portable, _) = pair(Backend::Portable);
        for msg in [&b"one"[..], b"two", b"three"] {
            assert_eq!(native.seal(msg), portable.seal(msg));
        }
    }

    #[test]
    fn same_payload_seals_differently_each_time() {
        let (mut enc, _) = pair(Backend::Native);
        let first = enc.seal(b"repeat");
        let second = enc.seal(b"repeat");
        assert_ne!(first, second);
    }

    #[test]
    fn tampered_packet_is_rejected_and_stream_stays_in_sync() {
        let (mut enc, mut dec) = pair(Backend::Portable);
        // Long enough that the flipped byte has left the 16-byte feedback register.
        let mut bad = enc.seal(b"first packet, padded well past one cipher block");
        let good = enc.seal(b"second");

        bad[2] ^= 0x01;
        assert_eq!(dec.open(&bad).unwrap_err(), PacketError::ChecksumMismatch { counter: 0 });
        assert_eq!(dec.open(&good).unwrap(), b"second");
    }

    #[test]
    fn reordered_packets_fail_the_checksum() {
        let (mut enc, mut dec) = pair(Backend::Native);
        let _skipped = enc.seal(b"first");
        let second = enc.seal(b"second");
        assert!(matches!(dec.open(&second), Err(PacketError::ChecksumMismatch { counter: 0 })));
    }

    #[test]
    fn short_packet_is_truncated() {
        let (_, mut dec) = pair(Backend::Native);
        assert_eq!(dec.open(&[1, 2, 3]).unwrap_err(), PacketError::Truncated { len: 3, min: 8 });
        assert_eq!(dec.counter(), 1);
    }

    #[test]
    fn packet_error_wraps_primitive_errors() {
        let e: PacketError = PrimitiveError::Poisoned.into();
        assert_eq!(e.to_string(), PrimitiveError::Poisoned.to_string());
    }

    fn packets() -> Vec<Vec<u8>> {
        let mut out: Vec<Vec<u8>> = (0..50u32)
            .map(|i| format!("packet number {i} with some shared text").into_bytes())
            .collect();
        // Larger than the staging area: deflated directly.
        out.push((0..20_000u32).map(|i| (i % 251) as u8).collect());
        out.push(b"tail".to_vec());
        out
    }

    #[test]
    fn batch_round_trip_all_backend_pairs() {
        for raw in [true, false] {
            for enc_backend in Backend::ALL {
                for dec_backend in Backend::ALL {
                    let mut comp = BatchCompressor::new(enc_backend, 7, raw, 8192, 512).unwrap();
                    let mut decomp = BatchDecompressor::new(dec_backend, raw, 8192, 512).unwrap();

                    for _round in 0..2 {
                        for p in packets() {
                            comp.push(&p).unwrap();
                        }
                        assert_eq!(comp.pending_packets(), 52);
                        let batch = comp.flush().unwrap().unwrap();
                        assert_eq!(comp.pending_packets(), 0);

                        let decoded = decomp.decode(&batch).unwrap();
                        let expected: Vec<Bytes> = packets().into_iter().map(Bytes::from).collect();
                        assert_eq!(decoded, expected, "{enc_backend} -> {dec_backend}, raw={raw}");
                    }
                }
            }
        }
    }

    #[test]
    fn empty_batch_flushes_to_none() {
        let mut comp = BatchCompressor::new(Backend::Portable, 7, true, 8192, 512).unwrap();
        assert_eq!(comp.flush().unwrap(), None);
        comp.push(&[]).unwrap();
        assert_eq!(comp.pending_packets(), 0);
        assert_eq!(comp.flush().unwrap(), None);
    }

    #[test]
    fn batch_from_config_uses_config_fields() {
        let config = PrimitivesConfig { raw_deflate: false, ..PrimitivesConfig::with_backend(Backend::Portable) };
        let mut comp = BatchCompressor::from_config(&config).unwrap();
        let mut decomp = BatchDecompressor::from_config(&config).unwrap();
        comp.push(b"configured").unwrap();
        let batch = comp.flush().unwrap().unwrap();
        // zlib framing was requested.
        assert_eq!(batch[0], 0x78);
        assert_eq!(decomp.decode(&batch).unwrap(), vec![Bytes::from_static(b"configured")]);
    }

    #[test]
    fn should_flush_after_threshold() {
        let mut comp = BatchCompressor::new(Backend::Native, 0, true, 8192, 512).unwrap();
        assert!(!comp.should_flush());
        // Level 0 stores, so output tracks input closely.
        let big = vec![0xabu8; 16 * 1024];
        for _ in 0..(BATCH_FLUSH_THRESHOLD / big.len() + 6) {
            comp.push(&big).unwrap();
        }
        assert!(comp.should_flush());
        comp.flush().unwrap().unwrap();
        assert!(!comp.should_flush());
    }

    fn raw_batch(framed: &[u8]) -> Bytes {
        let mut comp = flate2::write::DeflateEncoder::new(Vec::new(), flate2::Compression::default());
        std::io::Write::write_all(&mut comp, framed).unwrap();
        Bytes::from(comp.finish().unwrap())
    }

    #[test]
    fn overrunning_length_is_malformed() {
        let mut decomp = BatchDecompressor::new(Backend::Portable, true, 8192, 512).unwrap();
        let batch = raw_batch(&[0x10, b'a', b'b']);
        assert!(matches!(decomp.decode(&batch), Err(PacketError::MalformedBatch(_))));
    }

    #[test]
    fn cut_varint_is_malformed() {
        let mut decomp = BatchDecompressor::new(Backend::Native, true, 8192, 512).unwrap();
        let batch = raw_batch(&[0x01, b'a', 0x80]);
        assert!(matches!(decomp.decode(&batch), Err(PacketError::MalformedBatch(_))));
    }

    #[test]
    fn truncated_batch_fails_then_decoder_recovers() {
        for backend in Backend::ALL {
            let mut comp = BatchCompressor::new(backend, 6, true, 8192, 512).unwrap();
            let mut decomp = BatchDecompressor::new(backend, true, 8192, 512).unwrap();
            for p in packets() {
                comp.push(&p).unwrap();
            }
            let batch = comp.flush().unwrap().unwrap();

            assert!(
                matches!(decomp.decode(&batch[..batch.len() / 2]), Err(PacketError::MalformedBatch(_))),
                "backend {backend}"
            );
            assert_eq!(decomp.decode(&batch).unwrap().len(), 52);
        }
    }

    #[test]
    fn corrupt_batch_is_a_primitive_error_then_recovers() {
        let mut decomp = BatchDecompressor::new(Backend::Portable, false, 8192, 512).unwrap();
        let err = decomp.decode(&[0x78, 0x9c, 0xff, 0xff]).unwrap_err();
        assert!(matches!(err, PacketError::Primitive(PrimitiveError::CompressionFault { .. })));

        let mut comp = BatchCompressor::new(Backend::Portable, 6, false, 8192, 512).unwrap();
        comp.push(b"after the fault").unwrap();
        let batch = comp.flush().unwrap().unwrap();
        assert_eq!(decomp.decode(&batch).unwrap(), vec![Bytes::from_static(b"after the fault")]);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn seal_open_round_trip(payloads in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..300), 1..8)) {
            let (mut enc, mut dec) = pair(Backend::Portable);
            for p in &payloads {
                let sealed = enc.seal(p);
                prop_assert_eq!(&dec.open(&sealed).unwrap(), p);
            }
        }

        #[test]
        fn batch_round_trip_small_chunks(payloads in prop::collection::vec(prop::collection::vec(any::<u8>(), 1..600), 1..10)) {
            let mut comp = BatchCompressor::new(Backend::Portable, 5, true, 256, 32).unwrap();
            let mut decomp = BatchDecompressor::new(Backend::Native, true, 256, 32).unwrap();
            for p in &payloads {
                comp.push(p).unwrap();
            }
            let batch = comp.flush().unwrap().unwrap();
            let decoded = decomp.decode(&batch).unwrap();
            prop_assert_eq!(decoded.len(), payloads.len());
            for (got, want) in decoded.iter().zip(&payloads) {
                prop_assert_eq!(&got[..], &want[..]);
            }
        }
    }
}
