#[cfg(test)]
mod tests {
    use primitives_core::compression::Mode;
    use primitives_core::crypto::Direction;
    use primitives_core::telemetry::{Primitive, PrimitiveCounters, TelemetrySnapshot};
    use primitives_core::{Backend, Primitives};

    #[test]
    fn fresh_facade_reports_zero() {
        let p = Primitives::default();
        let snap = p.snapshot();
        assert_eq!(snap.counters, PrimitiveCounters::default());
        assert_eq!(snap.live_sessions(), 0);
        assert_eq!(snap.compression_ratio, 0.0);
        assert!(snap.sanity_check());
    }

    #[test]
    fn facade_counts_sessions_and_bytes() {
        let mut p = Primitives::with_backend(Backend::Portable);

        let c = p.cipher_init(Direction::Encrypt, &[7; 32], &[9; 16]).unwrap();
        let mut buf = [0u8; 10];
        p.cipher_process_in_place(c, &mut buf).unwrap();

        let h = p.hasher_init();
        p.hasher_update(h, b"12345").unwrap();
        p.hasher_digest(h).unwrap();
        p.hasher_free(h);

        let z = p.compressor_init(Mode::Compress, 6, true).unwrap();
        let input = vec![b'z'; 4096];
        let mut out = [0u8; 512];
        let step = p.compressor_process(z, &input, &mut out).unwrap();
        assert_eq!(step.consumed, input.len());
        loop {
            if p.compressor_process(z, &[], &mut out).unwrap().finished {
                break;
            }
        }

        let counters = p.counters();
        assert_eq!(counters.cipher_sessions_opened, 1);
        assert_eq!(counters.bytes_ciphered, 10);
        assert_eq!(counters.digest_sessions_opened, 1);
        assert_eq!(counters.digest_sessions_freed, 1);
        assert_eq!(counters.bytes_hashed, 5);
        assert_eq!(counters.digests_emitted, 1);
        assert_eq!(counters.bytes_compress_in, 4096);
        assert!(counters.bytes_compress_out > 0);

        let snap = p.snapshot();
        assert_eq!(snap.live_cipher_sessions, 1);
        assert_eq!(snap.live_digest_sessions, 0);
        assert_eq!(snap.live_compressor_sessions, 1);
        assert_eq!(snap.live_sessions(), p.live_handles() as u64);
        assert!(snap.compression_ratio > 0.0 && snap.compression_ratio < 0.1);
        assert!(snap.sanity_check());
    }

    #[test]
    fn faults_are_counted() {
        let mut p = Primitives::with_backend(Backend::Native);
        let d = p.compressor_init(Mode::Decompress, 0, false).unwrap();
        let mut out = [0u8; 16];
        assert!(p.compressor_process(d, &[0x78, 0x9c, 0xff], &mut out).is_err());
        assert_eq!(p.snapshot().counters.faults, 1);
    }

    #[test]
    fn merge_and_live() {
        let mut a = PrimitiveCounters::default();
        a.opened(Primitive::Cipher);
        a.opened(Primitive::Cipher);
        a.freed(Primitive::Cipher);
        a.add_compression(Mode::Decompress, 10, 40);

        let mut b = PrimitiveCounters::default();
        b.opened(Primitive::Compressor);
        b.add_compression(Mode::Decompress, 10, 20);
        b.add_fault();

        a.merge(&b);
        assert_eq!(a.live(Primitive::Cipher), 1);
        assert_eq!(a.live(Primitive::Compressor), 1);
        assert_eq!(a.faults, 1);

        let snap = TelemetrySnapshot::from(&a);
        assert_eq!(snap.expansion_ratio, 3.0);
        assert_eq!(snap.live_sessions(), 2);
    }

    #[test]
    fn inconsistent_counters_fail_sanity_check() {
        let mut c = PrimitiveCounters::default();
        c.freed(Primitive::Digest);
        let snap: TelemetrySnapshot = (&c).into();
        assert!(!snap.sanity_check());
    }

    #[test]
    fn snapshot_serializes_to_json() {
        let mut p = Primitives::default();
        let h = p.hasher_init();
        p.hasher_update(h, b"abc").unwrap();

        let json = p.snapshot().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["counters"]["bytes_hashed"], 3);
        assert_eq!(value["live_digest_sessions"], 1);

        let back: TelemetrySnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p.snapshot());
    }
}
