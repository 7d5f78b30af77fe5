#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use primitives_core::crypto::{sha256, DigestSession};
    use primitives_core::Backend;

    const EMPTY: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";
    const ABC: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";
    const TWO_BLOCK: &str = "248d6a61d20638b8e5c026930c3e6039a33ce45964ff2167f6ecedd419db06c1";
    const MILLION_A: &str = "cdc76e5c9914fb9281a1c7e284d73e67f1809a48a497200e046d39ccc7112cd0";

    fn digest_hex(backend: Backend, data: &[u8]) -> String {
        let mut session = DigestSession::new(backend);
        session.update(data);
        hex::encode(session.digest())
    }

    #[test]
    fn known_answers() {
        for backend in Backend::ALL {
            assert_eq!(digest_hex(backend, b""), EMPTY);
            assert_eq!(digest_hex(backend, b"abc"), ABC);
            assert_eq!(
                digest_hex(backend, b"abcdbcdecdefdefgefghfghighijhijkijkljklmklmnlmnomnopnopq"),
                TWO_BLOCK
            );
        }
        assert_eq!(hex::encode(sha256(b"abc")), ABC);
    }

    #[test]
    fn million_a_in_uneven_updates() {
        for backend in Backend::ALL {
            let mut session = DigestSession::new(backend);
            let block = [b'a'; 1000];
            for i in 0..1000 {
                // alternate update sizes to cross block boundaries
                let split = (i * 37) % 1000;
                session.update(&block[..split]);
                session.update(&block[split..]);
            }
            assert_eq!(session.pending_bytes(), 1_000_000);
            assert_eq!(hex::encode(session.digest()), MILLION_A);
        }
    }

    #[test]
    fn digest_resets_session() {
        for backend in Backend::ALL {
            let mut session = DigestSession::new(backend);
            session.update(b"first message");
            let _ = session.digest();
            assert_eq!(session.pending_bytes(), 0);
            assert_eq!(hex::encode(session.digest()), EMPTY);
            session.update(b"abc");
            assert_eq!(hex::encode(session.digest()), ABC);
        }
    }

    #[test]
    fn empty_update_is_a_no_op() {
        let mut session = DigestSession::new(Backend::Portable);
        session.update(b"");
        session.update(b"abc");
        session.update(b"");
        assert_eq!(hex::encode(session.digest()), ABC);
    }

    proptest! {
        #[test]
        fn prop_backends_agree(data in proptest::collection::vec(any::<u8>(), 0..1024), split in 0usize..1024) {
            let split = split.min(data.len());
            let mut portable = DigestSession::new(Backend::Portable);
            let mut native = DigestSession::new(Backend::Native);
            portable.update(&data[..split]);
            portable.update(&data[split..]);
            native.update(&data);
            prop_assert_eq!(portable.digest(), native.digest());
        }
    }
}
