//! Deployment addresses for packed conditions.
//!
//! Each unique condition is stored once, as the runtime code of a data
//! contract deployed with CREATE2. The init code is a minimal loader that
//! returns `0x00 ‖ packed` as runtime code (the leading STOP keeps the data
//! from being executable):
//!
//! ```text
//! init_code = 0x61 ‖ u16(len + 1) ‖ 0x80600a3d393df3 ‖ 0x00 ‖ packed
//! address   = keccak256(0xff ‖ deployer ‖ salt ‖ keccak256(init_code))[12..]
//! ```
//!
//! Identical canonical conditions therefore always resolve to the same
//! address, no matter how many roles reference them.

use std::fmt;

use rolescope_core::{Condition, Error, Result, decode_hex};
use sha3::{Digest, Keccak256};

use crate::pack::pack;

/// The EIP-2470 singleton factory.
pub const SINGLETON_FACTORY: [u8; 20] = [
    0xce, 0x00, 0x42, 0xb8, 0x68, 0x30, 0x00, 0x00, 0xd4, 0x4a, 0x59, 0x00, 0x4d, 0xa5, 0x4a, 0x00,
    0x5f, 0xfd, 0xcf, 0x9f,
];

const LOADER: [u8; 7] = [0x80, 0x60, 0x0a, 0x3d, 0x39, 0x3d, 0xf3];

/// A 20-byte account address.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address([u8; 20]);

impl Address {
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Parse a `0x`-prefixed hex address. The checksum is not enforced.
    pub fn parse(value: &str) -> Result<Self> {
        let bytes = decode_hex(value)?;
        let bytes: [u8; 20] = bytes
            .try_into()
            .map_err(|b: Vec<u8>| Error::Encoding(format!("address must be 20 bytes, got {}", b.len())))?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// EIP-55 mixed-case checksum encoding.
    pub fn to_checksum(&self) -> String {
        let lower = hex::encode(self.0);
        let hash = Keccak256::digest(lower.as_bytes());
        let mut out = String::with_capacity(42);
        out.push_str("0x");
        for (i, ch) in lower.chars().enumerate() {
            let nibble = if i % 2 == 0 { hash[i / 2] >> 4 } else { hash[i / 2] & 0x0f };
            if ch.is_ascii_alphabetic() && nibble >= 8 {
                out.push(ch.to_ascii_uppercase());
            } else {
                out.push(ch);
            }
        }
        out
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_checksum())
    }
}

/// CREATE2 deployment parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Create2Params {
    pub deployer: Address,
    pub salt: [u8; 32],
}

impl Default for Create2Params {
    fn default() -> Self {
        Self {
            deployer: Address(SINGLETON_FACTORY),
            salt: [0u8; 32],
        }
    }
}

/// Init code that deploys `packed` as data-contract runtime code.
pub fn init_code(packed: &[u8]) -> Result<Vec<u8>> {
    let size = u16::try_from(packed.len() + 1)
        .map_err(|_| Error::Encoding(format!("{} bytes is too large to deploy", packed.len())))?;
    let mut code = Vec::with_capacity(LOADER.len() + 4 + packed.len());
    code.push(0x61);
    code.extend_from_slice(&size.to_be_bytes());
    code.extend_from_slice(&LOADER);
    code.push(0x00);
    code.extend_from_slice(packed);
    Ok(code)
}

/// The CREATE2 address of `init_code` under `params`.
pub fn create2_address(params: &Create2Params, init_code: &[u8]) -> Address {
    let code_hash = Keccak256::digest(init_code);
    let mut hasher = Keccak256::new();
    hasher.update([0xff]);
    hasher.update(params.deployer.as_bytes());
    hasher.update(params.salt);
    hasher.update(code_hash);
    let digest = hasher.finalize();
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&digest[12..]);
    Address(bytes)
}

/// The deployment address of `condition`. Pass a normalized tree: only the
/// canonical form is deduplicated.
pub fn address(condition: &Condition, params: &Create2Params) -> Result<Address> {
    let packed = pack(condition)?;
    Ok(create2_address(params, &init_code(&packed)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;

    #[test]
    fn eip1014_vector() {
        let params = Create2Params {
            deployer: Address::from_bytes([0u8; 20]),
            salt: [0u8; 32],
        };
        let addr = create2_address(&params, &[0x00]);
        assert_eq!(addr.to_checksum(), "0x4D1A2e2bB4F88F0250f26Ffff098B0b30B26BF38");
    }

    #[test]
    fn eip55_checksum() {
        let addr = Address::parse("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").unwrap();
        assert_eq!(addr.to_string(), "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed");
    }

    #[test]
    fn address_parse_rejects_wrong_length() {
        assert!(Address::parse("0x1234").is_err());
    }

    #[test]
    fn init_code_layout() {
        let code = init_code(&[0xaa, 0xbb]).unwrap();
        assert_eq!(code, vec![0x61, 0x00, 0x03, 0x80, 0x60, 0x0a, 0x3d, 0x39, 0x3d, 0xf3, 0x00, 0xaa, 0xbb]);
        // the loader copies from offset 0x0a, right after itself
        assert_eq!(code[10], 0x00);
    }

    #[test]
    fn address_is_content_addressed() {
        let params = Create2Params::default();
        let a = address(&calldata(vec![c(1)]), &params).unwrap();
        let b = address(&calldata(vec![c(1)]), &params).unwrap();
        let other = address(&calldata(vec![c(2)]), &params).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, other);

        let salted = Create2Params {
            salt: [1u8; 32],
            ..params
        };
        assert_ne!(address(&calldata(vec![c(1)]), &salted).unwrap(), a);
    }

    #[test]
    fn default_deployer_is_singleton_factory() {
        assert_eq!(
            Create2Params::default().deployer.to_checksum(),
            "0xce0042B868300000d44A59004Da54A005ffdcf9f"
        );
    }
}
