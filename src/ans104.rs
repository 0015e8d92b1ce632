//! ANS-104 data items.
//!
//! Committed spawns and messages travel as signed ANS-104 data items. This
//! module builds the binary form the messenger units accept: avro-encoded
//! tags, the deep-hash signature payload, and the final byte layout. The
//! item id is base64url(sha256(signature)) and becomes the message id (or
//! process id, for spawns) once a unit accepts the item.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use bytes::Bytes;
use sha2::{Digest, Sha256, Sha384};

use crate::tags::Tag;
use crate::types::{Error, MessageId, Result};
use crate::wallet::Signer;

/// Signature type 1: Arweave RSA-PSS.
const SIG_TYPE_ARWEAVE: u16 = 1;
const SIG_LENGTH: usize = 512;
const OWNER_LENGTH: usize = 512;

/// A signed, wire-ready data item.
#[derive(Debug, Clone)]
pub struct SignedItem {
    pub id: MessageId,
    pub bytes: Bytes,
}

/// Build and sign a data item.
///
/// `target` must be a 32-byte base64url identifier when present (a process
/// id). The anchor field is left empty; messenger units deduplicate by item
/// id.
pub fn sign_item(
    signer: &dyn Signer,
    target: Option<&str>,
    tags: &[Tag],
    data: &[u8],
) -> Result<SignedItem> {
    let owner = signer.owner();
    if owner.len() != OWNER_LENGTH {
        return Err(Error::transport(format!(
            "owner key is {} bytes, expected {OWNER_LENGTH}",
            owner.len()
        )));
    }

    let target_bytes = match target {
        Some(encoded) => {
            let decoded = URL_SAFE_NO_PAD.decode(encoded).map_err(|err| {
                Error::validation(format!("target is not base64url: {err}"))
            })?;
            if decoded.len() != 32 {
                return Err(Error::validation(format!(
                    "target must decode to 32 bytes, got {}",
                    decoded.len()
                )));
            }
            decoded
        }
        None => Vec::new(),
    };

    let tag_bytes = encode_tags(tags);
    let signature_payload = deep_hash(&DeepHashChunk::List(vec![
        DeepHashChunk::Blob(b"dataitem"),
        DeepHashChunk::Blob(b"1"),
        DeepHashChunk::Blob(b"1"),
        DeepHashChunk::Blob(owner),
        DeepHashChunk::Blob(&target_bytes),
        DeepHashChunk::Blob(&[]),
        DeepHashChunk::Blob(&tag_bytes),
        DeepHashChunk::Blob(data),
    ]));

    let signature = signer.sign(&signature_payload)?;
    if signature.len() != SIG_LENGTH {
        return Err(Error::transport(format!(
            "signature is {} bytes, expected {SIG_LENGTH}",
            signature.len()
        )));
    }

    let id = URL_SAFE_NO_PAD.encode(Sha256::digest(&signature));
    let id = MessageId::from_string(id).map_err(Error::transport)?;

    let mut out = Vec::with_capacity(
        2 + SIG_LENGTH + OWNER_LENGTH + 2 + target_bytes.len() + 16 + tag_bytes.len() + data.len(),
    );
    out.extend_from_slice(&SIG_TYPE_ARWEAVE.to_le_bytes());
    out.extend_from_slice(&signature);
    out.extend_from_slice(owner);
    if target_bytes.is_empty() {
        out.push(0);
    } else {
        out.push(1);
        out.extend_from_slice(&target_bytes);
    }
    // No anchor.
    out.push(0);
    out.extend_from_slice(&(tags.len() as u64).to_le_bytes());
    out.extend_from_slice(&(tag_bytes.len() as u64).to_le_bytes());
    out.extend_from_slice(&tag_bytes);
    out.extend_from_slice(data);

    Ok(SignedItem {
        id,
        bytes: Bytes::from(out),
    })
}

/// Avro encoding of the tag array: zigzag block count, each string as
/// zigzag-length-prefixed bytes, zero terminator. Empty tag lists encode to
/// zero bytes.
fn encode_tags(tags: &[Tag]) -> Vec<u8> {
    if tags.is_empty() {
        return Vec::new();
    }
    let mut out = Vec::new();
    encode_long(tags.len() as i64, &mut out);
    for tag in tags {
        encode_string(&tag.name, &mut out);
        encode_string(&tag.value, &mut out);
    }
    out.push(0);
    out
}

fn encode_string(s: &str, out: &mut Vec<u8>) {
    encode_long(s.len() as i64, out);
    out.extend_from_slice(s.as_bytes());
}

/// Avro long: zigzag then LEB128 varint.
fn encode_long(value: i64, out: &mut Vec<u8>) {
    let mut n = ((value << 1) ^ (value >> 63)) as u64;
    loop {
        let mut byte = (n & 0x7f) as u8;
        n >>= 7;
        if n != 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if n == 0 {
            break;
        }
    }
}

/// Input to the Arweave deep-hash algorithm.
#[derive(Debug)]
pub enum DeepHashChunk<'a> {
    Blob(&'a [u8]),
    List(Vec<DeepHashChunk<'a>>),
}

/// Arweave deep hash: a SHA-384 chain over length-tagged chunks.
pub fn deep_hash(chunk: &DeepHashChunk<'_>) -> [u8; 48] {
    match chunk {
        DeepHashChunk::Blob(data) => {
            let tag_hash = sha384(format!("blob{}", data.len()).as_bytes());
            let data_hash = sha384(data);
            let mut pair = [0u8; 96];
            pair[..48].copy_from_slice(&tag_hash);
            pair[48..].copy_from_slice(&data_hash);
            sha384(&pair)
        }
        DeepHashChunk::List(items) => {
            let mut acc = sha384(format!("list{}", items.len()).as_bytes());
            for item in items {
                let mut pair = [0u8; 96];
                pair[..48].copy_from_slice(&acc);
                pair[48..].copy_from_slice(&deep_hash(item));
                acc = sha384(&pair);
            }
            acc
        }
    }
}

fn sha384(data: &[u8]) -> [u8; 48] {
    Sha384::digest(data).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Result;

    #[derive(Debug)]
    struct TestSigner {
        owner: Vec<u8>,
    }

    impl Signer for TestSigner {
        fn owner(&self) -> &[u8] {
            &self.owner
        }

        fn address(&self) -> &str {
            "test-signer"
        }

        fn sign(&self, _message: &[u8]) -> Result<Vec<u8>> {
            Ok(vec![7u8; 512])
        }
    }

    #[test]
    fn encodes_longs_with_zigzag_varints() {
        let mut out = Vec::new();
        encode_long(0, &mut out);
        assert_eq!(out, [0x00]);

        out.clear();
        encode_long(1, &mut out);
        assert_eq!(out, [0x02]);

        out.clear();
        encode_long(-1, &mut out);
        assert_eq!(out, [0x01]);

        out.clear();
        encode_long(64, &mut out);
        assert_eq!(out, [0x80, 0x01]);
    }

    #[test]
    fn encodes_tags_as_avro_blocks() {
        let tags = vec![Tag::new("Action", "Eval")];
        let bytes = encode_tags(&tags);
        let mut expected = vec![0x02, 0x0c];
        expected.extend_from_slice(b"Action");
        expected.push(0x08);
        expected.extend_from_slice(b"Eval");
        expected.push(0x00);
        assert_eq!(bytes, expected);
    }

    #[test]
    fn empty_tag_list_encodes_to_zero_bytes() {
        assert!(encode_tags(&[]).is_empty());
    }

    #[test]
    fn deep_hash_distinguishes_blob_shapes() {
        let a = deep_hash(&DeepHashChunk::Blob(b"hello"));
        let b = deep_hash(&DeepHashChunk::Blob(b"hellp"));
        let c = deep_hash(&DeepHashChunk::List(vec![DeepHashChunk::Blob(b"hello")]));
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(a, deep_hash(&DeepHashChunk::Blob(b"hello")));
    }

    #[test]
    fn item_layout_matches_ans104() {
        let signer = TestSigner {
            owner: vec![3u8; 512],
        };
        let tags = vec![Tag::new("Action", "Eval")];
        let item = sign_item(&signer, None, &tags, b"print('hi')").unwrap();

        let bytes = &item.bytes;
        // Signature type 1, little-endian.
        assert_eq!(&bytes[0..2], &[1, 0]);
        // Signature then owner.
        assert_eq!(&bytes[2..514], &[7u8; 512][..]);
        assert_eq!(&bytes[514..1026], &[3u8; 512][..]);
        // No target, no anchor.
        assert_eq!(bytes[1026], 0);
        assert_eq!(bytes[1027], 0);
        // Tag count and byte length, little-endian u64.
        assert_eq!(&bytes[1028..1036], &1u64.to_le_bytes()[..]);
        let tag_len = u64::from_le_bytes(bytes[1036..1044].try_into().unwrap()) as usize;
        assert_eq!(tag_len, encode_tags(&tags).len());
        // Data trails the tags.
        assert_eq!(&bytes[1044 + tag_len..], b"print('hi')");
    }

    #[test]
    fn item_id_is_sha256_of_signature() {
        let signer = TestSigner {
            owner: vec![3u8; 512],
        };
        let item = sign_item(&signer, None, &[], b"").unwrap();
        let expected = URL_SAFE_NO_PAD.encode(Sha256::digest(vec![7u8; 512]));
        assert_eq!(item.id.as_str(), expected);
    }

    #[test]
    fn target_must_be_32_bytes() {
        let signer = TestSigner {
            owner: vec![3u8; 512],
        };
        let err = sign_item(&signer, Some("AQID"), &[], b"").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn target_is_embedded_when_present() {
        let signer = TestSigner {
            owner: vec![3u8; 512],
        };
        let target = URL_SAFE_NO_PAD.encode([9u8; 32]);
        let item = sign_item(&signer, Some(&target), &[], b"").unwrap();
        assert_eq!(item.bytes[1026], 1);
        assert_eq!(&item.bytes[1027..1059], &[9u8; 32][..]);
    }
}
