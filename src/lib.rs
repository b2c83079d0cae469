//! Implementation of the HC-128 stream cipher keystream generator.
//!
//! Cipher functionality is accessed using traits from re-exported [`cipher`] crate.
//!
//! # ⚠️ Security Warning: Hazmat!
//!
//! This crate does not ensure ciphertexts are authentic! Thus ciphertext integrity
//! is not verified, which can lead to serious vulnerabilities!
//!
//! The caller must also guarantee that an IV is never reused with the same key.
//!
//! USE AT YOUR OWN RISK!
//!
//! # Output granularity
//!
//! The generator consumes one `(P, Q)` table pair per step. How much of that
//! pair becomes keystream is selected with the [`Granularity`] type parameter:
//! [`WordWise`] emits the full 32-bit word `x ^ y` (four bytes per step), while
//! [`ByteWise`] emits the single byte `x ^ (y >> 16)` per step. [`Hc128`] is
//! the word-wise cipher and the recommended choice; [`Hc128ByteWise`] exists
//! for callers that need the narrower extraction.
//!
//! # Example
//! ```
//! use hc_128::Hc128;
//! // Import relevant traits
//! use hc_128::cipher::{KeyIvInit, StreamCipher};
//!
//! let key = [0x42; 16];
//! let iv = [0x24; 16];
//!
//! // Key and IV must be references to the `Array` type.
//! // Here we use the `Into` trait to convert arrays into it.
//! let mut cipher = Hc128::new(&key.into(), &iv.into());
//!
//! let mut buffer = *b"stream cipher input";
//! // apply keystream (encrypt)
//! cipher.apply_keystream(&mut buffer);
//! assert_ne!(&buffer, b"stream cipher input");
//!
//! // decrypt ciphertext by applying keystream again
//! let mut cipher = Hc128::new(&key.into(), &iv.into());
//! cipher.apply_keystream(&mut buffer);
//! assert_eq!(&buffer, b"stream cipher input");
//!
//! // stream ciphers can be used with streaming messages
//! let mut cipher = Hc128::new(&key.into(), &iv.into());
//! for chunk in buffer.chunks_mut(3) {
//!     cipher.apply_keystream(chunk);
//! }
//! ```

#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc(
    html_logo_url = "https://raw.githubusercontent.com/RustCrypto/media/8f1a9894/logo.svg",
    html_favicon_url = "https://raw.githubusercontent.com/RustCrypto/media/8f1a9894/logo.svg"
)]
#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub use cipher;

use core::fmt;
use core::marker::PhantomData;

use cipher::{
    Block, BlockSizeUser, IvSizeUser, KeyIvInit, KeySizeUser, ParBlocksSizeUser,
    StreamCipherBackend, StreamCipherClosure, StreamCipherCore, StreamCipherCoreWrapper,
    consts::{U1, U4, U16},
};

#[cfg(feature = "zeroize")]
use cipher::zeroize::{Zeroize, ZeroizeOnDrop};

/// Words per table. All table indices reduce modulo this size.
const TABLE_WORDS: usize = 512;
const TABLE_MASK: usize = TABLE_WORDS - 1;
const KEY_WORDS: usize = 4;
const IV_WORDS: usize = 4;
/// Steps run and discarded after table setup, before any output is released.
const WARMUP_STEPS: usize = 1024;

/// HC-128 stream cipher key (128 bits).
pub type Key = cipher::Key<Hc128Core<WordWise>>;

/// HC-128 stream cipher initialization vector (128 bits).
pub type Iv = cipher::Iv<Hc128Core<WordWise>>;

/// The HC-128 stream cipher emitting one 32-bit word per step.
pub type Hc128 = StreamCipherCoreWrapper<Hc128Core<WordWise>>;

/// The HC-128 stream cipher emitting one byte per step.
pub type Hc128ByteWise = StreamCipherCoreWrapper<Hc128Core<ByteWise>>;

/// Keystream extraction granularity.
///
/// Each generator step reads the word pair `x = P[cnt]`, `y = Q[cnt]`;
/// implementations decide how that pair is serialized into a keystream block.
pub trait Granularity: BlockSizeUser + Clone {
    /// Write the keystream block derived from the pair `(x, y)`.
    fn write_block(x: u32, y: u32, block: &mut Block<Self>);
}

/// Emits the full word `x ^ y` as four little-endian keystream bytes.
#[derive(Clone, Debug)]
pub struct WordWise;

impl BlockSizeUser for WordWise {
    type BlockSize = U4;
}

impl Granularity for WordWise {
    #[inline(always)]
    fn write_block(x: u32, y: u32, block: &mut Block<Self>) {
        block.copy_from_slice(&(x ^ y).to_le_bytes());
    }
}

/// Emits the single keystream byte `x ^ (y >> 16)` per step.
#[derive(Clone, Debug)]
pub struct ByteWise;

impl BlockSizeUser for ByteWise {
    type BlockSize = U1;
}

impl Granularity for ByteWise {
    #[inline(always)]
    fn write_block(x: u32, y: u32, block: &mut Block<Self>) {
        block[0] = (x ^ (y >> 16)) as u8;
    }
}

/// Core state of the HC-128 keystream generator.
///
/// Holds the two 512-word tables and the step counter. The state is owned and
/// mutated in place; a table refill is a multi-word read-modify-write pass, so
/// sharing a core across concurrent users requires external exclusion.
#[derive(Clone)]
pub struct Hc128Core<G: Granularity> {
    p: [u32; TABLE_WORDS],
    q: [u32; TABLE_WORDS],
    cnt: u32,
    granularity: PhantomData<G>,
}

impl<G: Granularity> KeySizeUser for Hc128Core<G> {
    type KeySize = U16;
}

impl<G: Granularity> IvSizeUser for Hc128Core<G> {
    type IvSize = U16;
}

impl<G: Granularity> BlockSizeUser for Hc128Core<G> {
    type BlockSize = G::BlockSize;
}

impl<G: Granularity> KeyIvInit for Hc128Core<G> {
    fn new(key: &cipher::Key<Self>, iv: &cipher::Iv<Self>) -> Self {
        let mut core = Self {
            p: [0; TABLE_WORDS],
            q: [0; TABLE_WORDS],
            cnt: 0,
            granularity: PhantomData,
        };
        core.init(key, iv);
        core
    }
}

impl<G: Granularity> Hc128Core<G> {
    fn init(&mut self, key: &[u8], iv: &[u8]) {
        // Key and IV are each repeated once: P[0..8] = K ‖ K, P[8..16] = IV ‖ IV.
        for (i, chunk) in key.chunks_exact(4).enumerate() {
            let w = u32::from_le_bytes(chunk.try_into().unwrap());
            self.p[i] = w;
            self.p[i + KEY_WORDS] = w;
        }
        for (i, chunk) in iv.chunks_exact(4).enumerate() {
            let w = u32::from_le_bytes(chunk.try_into().unwrap());
            self.p[i + 2 * KEY_WORDS] = w;
            self.p[i + 2 * KEY_WORDS + IV_WORDS] = w;
        }

        for i in 16..TABLE_WORDS {
            self.p[i] = expand(self.p[i - 16], self.p[i - 15], self.p[i - 7], self.p[i - 2]);
        }

        // Q is derived from P; the low bits of each entry select the source word.
        for i in 0..TABLE_WORDS {
            self.q[i] = self.p[self.p[i] as usize & TABLE_MASK];
        }

        self.cnt = 0;

        // Warm-up: run the steady-state loop with output discarded.
        for _ in 0..WARMUP_STEPS {
            self.step();
        }
    }

    /// Mixing function `f`: reversed-index `P` lookups.
    #[inline]
    fn f(&self, x: u32) -> u32 {
        self.q[(x & 0xff) as usize]
            .wrapping_add(self.q[256 + ((x >> 8) & 0xff) as usize])
            .wrapping_add(self.p[TABLE_MASK - ((x >> 16) & 0xff) as usize])
            .wrapping_add(self.p[(256 + TABLE_MASK - ((x >> 24) & 0xff) as usize) & TABLE_MASK])
    }

    /// Mixing function `g`, the direct-index counterpart of `f`. The
    /// steady-state refill consults `f` only.
    #[inline]
    #[allow(dead_code)]
    fn g(&self, x: u32) -> u32 {
        self.q[(x & 0xff) as usize]
            .wrapping_add(self.q[256 + ((x >> 8) & 0xff) as usize])
            .wrapping_add(self.p[((x >> 16) & 0xff) as usize])
            .wrapping_add(self.p[256 + ((x >> 24) & 0xff) as usize])
    }

    /// Regenerates a 16-word slice of `P` and re-derives `Q` in full.
    ///
    /// The tail of `P` is rebuilt sequentially, so the `f` lookups observe the
    /// slid table plus any tail words already written this pass.
    fn refill(&mut self) {
        self.p.copy_within(16.., 0);
        for j in 0..16 {
            let x = self.p[j]
                .wrapping_add(self.p[j + 1])
                .wrapping_add(self.p[j + 14])
                .wrapping_add(self.p[j + 15]);
            self.p[TABLE_WORDS - 16 + j] = self.f(x);
        }
        for j in 0..TABLE_WORDS {
            self.q[j] = self.p[self.p[j] as usize & TABLE_MASK];
        }
    }

    /// Advances the generator one step, yielding the `(P, Q)` word pair.
    ///
    /// `cnt` stays in `[0, 512]` between steps; observing the block boundary
    /// triggers a refill before the pair for this step is read.
    fn step(&mut self) -> (u32, u32) {
        if self.cnt as usize % TABLE_WORDS == 0 {
            self.refill();
            self.cnt = 0;
        }
        let i = self.cnt as usize;
        let x = self.p[i];
        let y = self.q[i];
        self.cnt += 1;
        (x, y)
    }
}

impl<G: Granularity> StreamCipherCore for Hc128Core<G> {
    #[inline(always)]
    fn remaining_blocks(&self) -> Option<usize> {
        // The table refill extends the keystream indefinitely; callers are
        // expected to rekey long before any practical block count is reached.
        None
    }

    fn process_with_backend(&mut self, f: impl StreamCipherClosure<BlockSize = Self::BlockSize>) {
        f.call(&mut Backend(self));
    }
}

impl<G: Granularity> fmt::Debug for Hc128Core<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Table contents and position are key material equivalents.
        f.write_str("Hc128Core { ... }")
    }
}

struct Backend<'a, G: Granularity>(&'a mut Hc128Core<G>);

impl<G: Granularity> BlockSizeUser for Backend<'_, G> {
    type BlockSize = G::BlockSize;
}

impl<G: Granularity> ParBlocksSizeUser for Backend<'_, G> {
    type ParBlocksSize = U1;
}

impl<G: Granularity> StreamCipherBackend for Backend<'_, G> {
    #[inline(always)]
    fn gen_ks_block(&mut self, block: &mut Block<Self>) {
        let (x, y) = self.0.step();
        G::write_block(x, y, block);
    }
}

#[cfg(feature = "zeroize")]
impl<G: Granularity> Drop for Hc128Core<G> {
    fn drop(&mut self) {
        self.p.zeroize();
        self.q.zeroize();
        self.cnt.zeroize();
    }
}

#[cfg(feature = "zeroize")]
impl<G: Granularity> ZeroizeOnDrop for Hc128Core<G> {}

/// Feedback-shift-register expansion step, wrapping mod 2^32:
/// `w16 + rotl(w15, 7) + w7 + rotl(w2, 16)` for offsets 16, 15, 7 and 2
/// behind the word being produced.
#[inline]
fn expand(w16: u32, w15: u32, w7: u32, w2: u32) -> u32 {
    w16.wrapping_add(w15.rotate_left(7))
        .wrapping_add(w7)
        .wrapping_add(w2.rotate_left(16))
}
