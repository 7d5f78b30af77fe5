#[cfg(test)]
mod tests {
    use primitives_core::compression::{status, Mode};
    use primitives_core::crypto::{sha256, Direction};
    use primitives_core::{Backend, Handle, PrimitiveError, Primitives};

    const KEY: [u8; 32] = [0x11; 32];
    const IV: [u8; 16] = [0x22; 16];

    fn is_use_after_free<T: std::fmt::Debug>(r: Result<T, PrimitiveError>) -> bool {
        matches!(r, Err(PrimitiveError::UseAfterFree { .. }))
    }

    #[test]
    fn null_handle_fails_every_operation() {
        let mut p = Primitives::default();
        let mut out = [0u8; 4];
        let mut buf = [0u8; 4];

        assert!(is_use_after_free(p.cipher_process(Handle::NULL, b"abcd", &mut out)));
        assert!(is_use_after_free(p.cipher_process_in_place(Handle::NULL, &mut buf)));
        assert!(is_use_after_free(p.hasher_update(Handle::NULL, b"x")));
        assert!(is_use_after_free(p.hasher_digest(Handle::NULL)));
        assert!(is_use_after_free(p.compressor_process(Handle::NULL, b"x", &mut out)));
        assert!(is_use_after_free(p.compressor_reset(Handle::NULL)));
    }

    #[test]
    fn freed_handles_fail_and_free_is_idempotent() {
        for backend in Backend::ALL {
            let mut p = Primitives::with_backend(backend);
            let cipher = p.cipher_init(Direction::Encrypt, &KEY, &IV).unwrap();
            let hasher = p.hasher_init();
            let comp = p.compressor_init(Mode::Compress, 6, false).unwrap();
            assert_eq!(p.live_handles(), 3);

            p.cipher_free(cipher);
            p.hasher_free(hasher);
            p.compressor_free(comp);
            assert_eq!(p.live_handles(), 0);

            // Second free and null free are ignored.
            p.cipher_free(cipher);
            p.hasher_free(hasher);
            p.compressor_free(comp);
            p.cipher_free(Handle::NULL);
            assert_eq!(p.counters().cipher_sessions_freed, 1);

            let mut out = [0u8; 8];
            assert!(is_use_after_free(p.cipher_process(cipher, b"12345678", &mut out)));
            assert!(is_use_after_free(p.hasher_digest(hasher)));
            assert!(is_use_after_free(p.compressor_process(comp, b"", &mut out)));
        }
    }

    #[test]
    fn stale_handle_does_not_reach_a_recycled_slot() {
        let mut p = Primitives::with_backend(Backend::Portable);
        let old = p.hasher_init();
        p.hasher_free(old);

        let fresh = p.hasher_init();
        assert_ne!(old, fresh);
        p.hasher_update(fresh, b"abc").unwrap();

        assert!(is_use_after_free(p.hasher_update(old, b"junk")));
        p.hasher_free(old);
        assert_eq!(p.hasher_digest(fresh).unwrap(), sha256(b"abc"));
    }

    #[test]
    fn handles_are_never_null_and_raw_round_trips() {
        let mut p = Primitives::default();
        let h = p.hasher_init();
        assert!(!h.is_null());
        assert_eq!(Handle::from_raw(h.as_raw()), h);
        assert!(Handle::NULL.is_null());
        assert_eq!(Handle::default(), Handle::NULL);
    }

    #[test]
    fn handle_kinds_do_not_cross() {
        let mut p = Primitives::default();
        let hasher = p.hasher_init();
        let mut out = [0u8; 1];
        // Same raw value, different table: no cipher lives there.
        assert!(is_use_after_free(p.cipher_process(hasher, b"a", &mut out)));
    }

    #[test]
    fn cipher_round_trip_through_handles() {
        for backend in Backend::ALL {
            let mut p = Primitives::with_backend(backend);
            let enc = p.cipher_init(Direction::Encrypt, &KEY, &IV).unwrap();
            let dec = p.cipher_init(Direction::Decrypt, &KEY, &IV).unwrap();

            let msg = b"stream cipher through opaque handles";
            let mut ct = vec![0u8; msg.len()];
            p.cipher_process(enc, msg, &mut ct).unwrap();
            assert_ne!(&ct[..], &msg[..]);

            p.cipher_process_in_place(dec, &mut ct).unwrap();
            assert_eq!(&ct[..], &msg[..]);
            p.cipher_free(enc);
            p.cipher_free(dec);
        }
    }

    #[test]
    fn cipher_buffer_length_mismatch_is_an_error() {
        let mut p = Primitives::default();
        let h = p.cipher_init(Direction::Encrypt, &KEY, &IV).unwrap();
        let mut out = [0u8; 3];
        assert_eq!(
            p.cipher_process(h, b"abcd", &mut out).unwrap_err(),
            PrimitiveError::LengthMismatch { input: 4, output: 3 }
        );
        assert_eq!(p.counters().bytes_ciphered, 0);
    }

    #[test]
    fn cipher_init_rejects_bad_lengths() {
        let mut p = Primitives::default();
        assert_eq!(
            p.cipher_init(Direction::Encrypt, &KEY[..16], &IV).unwrap_err(),
            PrimitiveError::InvalidKeyLength { expected: 32, actual: 16 }
        );
        assert_eq!(
            p.cipher_init(Direction::Decrypt, &KEY, &IV[..8]).unwrap_err(),
            PrimitiveError::InvalidIvLength { expected: 16, actual: 8 }
        );
        assert_eq!(p.live_handles(), 0);
        assert_eq!(p.counters().cipher_sessions_opened, 0);
    }

    #[test]
    fn hasher_resets_after_digest() {
        let mut p = Primitives::with_backend(Backend::Portable);
        let h = p.hasher_init();
        p.hasher_update(h, b"a").unwrap();
        p.hasher_update(h, b"bc").unwrap();
        assert_eq!(
            hex::encode(p.hasher_digest(h).unwrap()),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(p.hasher_digest(h).unwrap(), sha256(b""));
    }

    #[test]
    fn compressor_level_out_of_range() {
        let mut p = Primitives::default();
        let err = p.compressor_init(Mode::Compress, 10, false).unwrap_err();
        assert_eq!(err, PrimitiveError::AlgorithmInitFault { algorithm: "deflate", code: status::Z_STREAM_ERROR });
        assert_eq!(p.live_handles(), 0);
    }

    #[test]
    fn poisoned_compressor_through_facade() {
        for backend in Backend::ALL {
            let mut p = Primitives::with_backend(backend);
            let h = p.compressor_init(Mode::Decompress, 0, false).unwrap();
            let mut out = [0u8; 64];

            let err = p.compressor_process(h, &[0x78, 0x9c, 0xff, 0xff, 0xff], &mut out).unwrap_err();
            assert_eq!(err.status_code(), Some(status::Z_DATA_ERROR), "backend {backend}");
            assert_eq!(p.counters().faults, 1);

            assert_eq!(p.compressor_process(h, &[], &mut out).unwrap_err(), PrimitiveError::Poisoned);
            assert_eq!(p.compressor_reset(h).unwrap_err(), PrimitiveError::Poisoned);
            assert!(p.compressor(h).unwrap().is_poisoned());

            // Poisoned calls are not counted as new faults; free still works.
            assert_eq!(p.counters().faults, 1);
            p.compressor_free(h);
            assert!(is_use_after_free(p.compressor_reset(h)));
        }
    }

    #[test]
    fn compressor_round_trip_through_handles() {
        let input = b"handle driven deflate, handle driven inflate. ".repeat(40);
        for backend in Backend::ALL {
            let mut p = Primitives::with_backend(backend);
            let c = p.compressor_init(Mode::Compress, 6, true).unwrap();
            let d = p.compressor_init(Mode::Decompress, 0, true).unwrap();

            let mut compressed = Vec::new();
            let mut buf = [0u8; 256];
            let mut rest = &input[..];
            while !rest.is_empty() {
                let step = p.compressor_process(c, rest, &mut buf).unwrap();
                compressed.extend_from_slice(&buf[..step.produced]);
                rest = &rest[step.consumed..];
            }
            loop {
                let step = p.compressor_process(c, &[], &mut buf).unwrap();
                compressed.extend_from_slice(&buf[..step.produced]);
                if step.finished {
                    break;
                }
            }

            let mut plain = Vec::new();
            let mut rest = &compressed[..];
            loop {
                let step = p.compressor_process(d, rest, &mut buf).unwrap();
                plain.extend_from_slice(&buf[..step.produced]);
                rest = &rest[step.consumed..];
                if step.finished {
                    break;
                }
            }
            assert_eq!(plain, input, "backend {backend}");

            // Reset makes the compressor reusable for a second stream.
            p.compressor_reset(c).unwrap();
            let again = p.compressor_process(c, b"x", &mut buf).unwrap();
            assert_eq!(again.consumed, 1);
        }
    }
}
