use cipher::{KeyIvInit, StreamCipher};
use hc_128::{Hc128, Hc128ByteWise};
use hex_literal::hex;

const KEY: [u8; 16] = hex!("101112131415161718191a1b1c1d1e1f");
const IV: [u8; 16] = hex!("202122232425262728292a2b2c2d2e2f");

/// Keystream of `len` bytes from a freshly keyed cipher.
fn keystream<C: KeyIvInit + StreamCipher>(key: &[u8; 16], iv: &[u8; 16], len: usize) -> Vec<u8> {
    let mut cipher = C::new_from_slices(key, iv).unwrap();
    let mut buf = vec![0u8; len];
    cipher.apply_keystream(&mut buf);
    buf
}

#[test]
fn keystream_is_deterministic() {
    let a = keystream::<Hc128>(&KEY, &IV, 256);
    let b = keystream::<Hc128>(&KEY, &IV, 256);
    assert_eq!(a, b);
    assert!(a.iter().any(|&v| v != 0));

    let a = keystream::<Hc128ByteWise>(&KEY, &IV, 256);
    let b = keystream::<Hc128ByteWise>(&KEY, &IV, 256);
    assert_eq!(a, b);
    assert!(a.iter().any(|&v| v != 0));
}

#[test]
fn keystream_depends_on_key_and_iv() {
    let base = keystream::<Hc128>(&KEY, &IV, 64);

    let mut key = KEY;
    key[0] ^= 1;
    assert_ne!(base, keystream::<Hc128>(&key, &IV, 64));

    let mut iv = IV;
    iv[15] ^= 0x80;
    assert_ne!(base, keystream::<Hc128>(&KEY, &iv, 64));
}

#[test]
fn granularities_produce_distinct_keystreams() {
    let word = keystream::<Hc128>(&KEY, &IV, 64);
    let byte = keystream::<Hc128ByteWise>(&KEY, &IV, 64);
    assert_ne!(word, byte);
}

#[test]
fn encrypt_decrypt_round_trip() {
    let plaintext = *b"This is my program";

    let mut buf = plaintext;
    let mut cipher = Hc128::new(&KEY.into(), &IV.into());
    cipher.apply_keystream(&mut buf);
    let ciphertext = buf;
    assert_ne!(ciphertext, plaintext);

    // decryption is the same operation from a freshly keyed state
    let mut cipher = Hc128::new(&KEY.into(), &IV.into());
    cipher.apply_keystream(&mut buf);
    assert_eq!(buf, plaintext);

    // re-encrypting reproduces the ciphertext byte for byte
    let mut buf = plaintext;
    let mut cipher = Hc128::new(&KEY.into(), &IV.into());
    cipher.apply_keystream(&mut buf);
    assert_eq!(buf, ciphertext);
}

#[test]
fn byte_wise_round_trip() {
    let plaintext = *b"This is my program";
    let mut buf = plaintext;

    let mut cipher = Hc128ByteWise::new(&KEY.into(), &IV.into());
    cipher.apply_keystream(&mut buf);
    assert_ne!(buf, plaintext);

    let mut cipher = Hc128ByteWise::new(&KEY.into(), &IV.into());
    cipher.apply_keystream(&mut buf);
    assert_eq!(buf, plaintext);
}

// The reference keystream spans several table refills in both granularities,
// so every chunked walk below crosses the refill boundary mid-buffer.
const CHUNKED_LEN: usize = 4 * 1024 + 19;

#[test]
fn chunked_keystream_matches_one_shot() {
    let reference = keystream::<Hc128>(&KEY, &IV, CHUNKED_LEN);
    let mut splits: Vec<usize> = (1..48).collect();
    splits.extend_from_slice(&[511, 512, 513, 1024, 2047]);
    for n in splits {
        let mut cipher = Hc128::new(&KEY.into(), &IV.into());
        let mut buf = reference.clone();
        for chunk in buf.chunks_mut(n) {
            cipher.apply_keystream(chunk);
        }
        assert!(buf.iter().all(|&v| v == 0), "chunk size {n}");
    }
}

#[test]
fn chunked_keystream_matches_one_shot_byte_wise() {
    let reference = keystream::<Hc128ByteWise>(&KEY, &IV, CHUNKED_LEN);
    let mut splits: Vec<usize> = (1..48).collect();
    splits.extend_from_slice(&[511, 512, 513, 1024, 2047]);
    for n in splits {
        let mut cipher = Hc128ByteWise::new(&KEY.into(), &IV.into());
        let mut buf = reference.clone();
        for chunk in buf.chunks_mut(n) {
            cipher.apply_keystream(chunk);
        }
        assert!(buf.iter().all(|&v| v == 0), "chunk size {n}");
    }
}

#[test]
fn empty_input_is_a_no_op() {
    let mut cipher = Hc128::new(&KEY.into(), &IV.into());
    let mut buf = [0u8; 0];
    cipher.apply_keystream(&mut buf);

    // an empty application must not advance the keystream
    let mut buf = [0u8; 32];
    cipher.apply_keystream(&mut buf);
    assert_eq!(buf.to_vec(), keystream::<Hc128>(&KEY, &IV, 32));
}

#[test]
fn rejects_bad_key_and_iv_lengths() {
    assert!(Hc128::new_from_slices(&[0u8; 15], &[0u8; 16]).is_err());
    assert!(Hc128::new_from_slices(&[0u8; 17], &[0u8; 16]).is_err());
    assert!(Hc128::new_from_slices(&[0u8; 16], &[0u8; 15]).is_err());
    assert!(Hc128::new_from_slices(&[0u8; 16], &[0u8; 32]).is_err());
    assert!(Hc128::new_from_slices(&[0u8; 16], &[0u8; 16]).is_ok());
    assert!(Hc128ByteWise::new_from_slices(&[0u8; 15], &[0u8; 16]).is_err());
}
