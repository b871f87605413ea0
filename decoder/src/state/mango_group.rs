use enumflags2::{bitflags, BitFlags};
use log::debug;
use solana_program::pubkey::Pubkey;

use crate::{
    cursor::{check_min_len, read_pubkey, read_pubkeys, read_u64, read_u8, PUBKEY_SIZE, U64_SIZE},
    error::LayoutResult,
    state::U64F64,
};

/// Number of tokens listed in a mango group
pub const NUM_TOKENS: usize = 5;
/// Number of spot markets, every token but the quote token has one
pub const NUM_MARKETS: usize = NUM_TOKENS - 1;

const ACCOUNT_FLAGS_LEN: usize = 8;
const TOKENS_OFFSET: usize = ACCOUNT_FLAGS_LEN;
const VAULTS_OFFSET: usize = TOKENS_OFFSET + PUBKEY_SIZE * NUM_TOKENS;
const INDEXES_OFFSET: usize = VAULTS_OFFSET + PUBKEY_SIZE * NUM_TOKENS;
const SPOT_MARKETS_OFFSET: usize = INDEXES_OFFSET + MangoIndex::LEN * NUM_TOKENS;
const ORACLES_OFFSET: usize = SPOT_MARKETS_OFFSET + PUBKEY_SIZE * NUM_MARKETS;
const SIGNER_NONCE_OFFSET: usize = ORACLES_OFFSET + PUBKEY_SIZE * NUM_MARKETS;
const SIGNER_KEY_OFFSET: usize = SIGNER_NONCE_OFFSET + U64_SIZE;
const DEX_PROGRAM_ID_OFFSET: usize = SIGNER_KEY_OFFSET + PUBKEY_SIZE;
const TOTAL_DEPOSITS_OFFSET: usize = DEX_PROGRAM_ID_OFFSET + PUBKEY_SIZE;
const TOTAL_BORROWS_OFFSET: usize = TOTAL_DEPOSITS_OFFSET + U64F64::LEN * NUM_TOKENS;

/// Tags the type of a mango account. Groups only use the low byte.
#[bitflags]
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum MangoAccountFlag {
    Initialized = 1 << 0,
    MangoGroup = 1 << 1,
    MarginAccount = 1 << 2,
    MangoSrmAccount = 1 << 3,
}

/// Lending index of a single token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MangoIndex {
    /// Unix timestamp of the last index update
    pub last_update: u64,
    #[allow(missing_docs)]
    pub borrow: U64F64,
    #[allow(missing_docs)]
    pub deposit: U64F64,
}

impl MangoIndex {
    /// Serialized size in bytes
    pub const LEN: usize = U64_SIZE + 2 * U64F64::LEN;

    fn read(data: &[u8], offset: usize) -> LayoutResult<Self> {
        Ok(Self {
            last_update: read_u64(data, offset)?,
            borrow: U64F64::read(data, offset + U64_SIZE)?,
            deposit: U64F64::read(data, offset + U64_SIZE + U64F64::LEN)?,
        })
    }
}

/// A decoded mango margin group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MangoGroup {
    #[allow(missing_docs)]
    pub account_flags: BitFlags<MangoAccountFlag>,
    /// Mints of the listed tokens, the last one being the quote currency
    pub tokens: [Pubkey; NUM_TOKENS],
    #[allow(missing_docs)]
    pub vaults: [Pubkey; NUM_TOKENS],
    #[allow(missing_docs)]
    pub indexes: [MangoIndex; NUM_TOKENS],
    #[allow(missing_docs)]
    pub spot_markets: [Pubkey; NUM_MARKETS],
    #[allow(missing_docs)]
    pub oracles: [Pubkey; NUM_MARKETS],
    #[allow(missing_docs)]
    pub signer_nonce: u64,
    #[allow(missing_docs)]
    pub signer_key: Pubkey,
    /// The serum dex program the spot markets belong to
    pub dex_program_id: Pubkey,
    #[allow(missing_docs)]
    pub total_deposits: [U64F64; NUM_TOKENS],
    #[allow(missing_docs)]
    pub total_borrows: [U64F64; NUM_TOKENS],
}

fn read_fixed_points<const N: usize>(data: &[u8], offset: usize) -> LayoutResult<[U64F64; N]> {
    let mut out = [U64F64::default(); N];
    for (i, value) in out.iter_mut().enumerate() {
        *value = U64F64::read(data, offset + i * U64F64::LEN)?;
    }
    Ok(out)
}

fn read_pubkey_array<const N: usize>(data: &[u8], offset: usize) -> LayoutResult<[Pubkey; N]> {
    let mut out = [Pubkey::default(); N];
    for (slot, key) in out.iter_mut().zip(read_pubkeys(data, offset, N)?) {
        *slot = key;
    }
    Ok(out)
}

impl MangoGroup {
    /// Minimum number of bytes holding every decoded field
    pub const MIN_LEN: usize = TOTAL_BORROWS_OFFSET + U64F64::LEN * NUM_TOKENS;

    /// Decodes a mango group. Fields past the total borrows are ignored.
    pub fn decode(data: &[u8]) -> LayoutResult<Self> {
        check_min_len(data, Self::MIN_LEN)?;

        let mut indexes = [MangoIndex {
            last_update: 0,
            borrow: U64F64::default(),
            deposit: U64F64::default(),
        }; NUM_TOKENS];
        for (i, index) in indexes.iter_mut().enumerate() {
            *index = MangoIndex::read(data, INDEXES_OFFSET + i * MangoIndex::LEN)?;
        }

        let group = Self {
            account_flags: BitFlags::from_bits_truncate(read_u8(data, 0)?),
            tokens: read_pubkey_array(data, TOKENS_OFFSET)?,
            vaults: read_pubkey_array(data, VAULTS_OFFSET)?,
            indexes,
            spot_markets: read_pubkey_array(data, SPOT_MARKETS_OFFSET)?,
            oracles: read_pubkey_array(data, ORACLES_OFFSET)?,
            signer_nonce: read_u64(data, SIGNER_NONCE_OFFSET)?,
            signer_key: read_pubkey(data, SIGNER_KEY_OFFSET)?,
            dex_program_id: read_pubkey(data, DEX_PROGRAM_ID_OFFSET)?,
            total_deposits: read_fixed_points(data, TOTAL_DEPOSITS_OFFSET)?,
            total_borrows: read_fixed_points(data, TOTAL_BORROWS_OFFSET)?,
        };
        debug!("Decoded mango group with signer {}", group.signer_key);
        Ok(group)
    }
}
