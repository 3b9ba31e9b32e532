//! Cursor strings of the in-memory backend.
//!
//! The layout follows libsystemd: `s=<seqnum id>;i=<seqnum>;b=<boot id>;t=<realtime>`,
//! followed by `;x=<checksum>`. The checksum is a siphash of everything before
//! it, keyed with the seqnum id, so any edit to a cursor string is detected.

use siphasher::sip::SipHasher24;
use std::ffi::CString;
use std::hash::Hasher;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct CursorKey {
    pub seqnum_id: Uuid,
    pub seqnum: u64,
    pub boot_id: Uuid,
    pub realtime: u64,
}

fn checksum(body: &str, seqnum_id: &Uuid) -> u64 {
    let key = seqnum_id.as_bytes();
    let mut k0 = [0u8; 8];
    let mut k1 = [0u8; 8];
    k0.copy_from_slice(&key[..8]);
    k1.copy_from_slice(&key[8..]);

    let mut hasher = SipHasher24::new_with_keys(u64::from_le_bytes(k0), u64::from_le_bytes(k1));
    hasher.write(body.as_bytes());
    hasher.finish()
}

impl CursorKey {
    pub fn format(&self) -> Option<CString> {
        let body = format!(
            "s={};i={:x};b={};t={:x}",
            self.seqnum_id.simple(),
            self.seqnum,
            self.boot_id.simple(),
            self.realtime
        );
        let x = checksum(&body, &self.seqnum_id);
        CString::new(format!("{body};x={x:x}")).ok()
    }

    pub fn parse(cursor: &[u8]) -> Option<Self> {
        let cursor = std::str::from_utf8(cursor).ok()?;
        let (body, x) = cursor.rsplit_once(";x=")?;

        let mut seqnum_id = None;
        let mut seqnum = None;
        let mut boot_id = None;
        let mut realtime = None;

        for item in body.split(';') {
            let (key, value) = item.split_once('=')?;
            match key {
                "s" => seqnum_id = Some(Uuid::try_parse(value).ok()?),
                "i" => seqnum = Some(u64::from_str_radix(value, 16).ok()?),
                "b" => boot_id = Some(Uuid::try_parse(value).ok()?),
                "t" => realtime = Some(u64::from_str_radix(value, 16).ok()?),
                _ => return None,
            }
        }

        let key = Self {
            seqnum_id: seqnum_id?,
            seqnum: seqnum?,
            boot_id: boot_id?,
            realtime: realtime?,
        };

        let x = u64::from_str_radix(x, 16).ok()?;
        (x == checksum(body, &key.seqnum_id)).then_some(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> CursorKey {
        CursorKey {
            seqnum_id: Uuid::from_u128(0x1234),
            seqnum: 42,
            boot_id: Uuid::from_u128(0x5678),
            realtime: 1_700_000_000_000_000,
        }
    }

    #[test]
    fn formatted_cursors_parse_back() {
        let cursor = key().format().unwrap();
        assert_eq!(CursorKey::parse(cursor.as_bytes()), Some(key()));
    }

    #[test]
    fn any_single_edit_is_rejected() {
        let cursor = key().format().unwrap().into_bytes();
        for idx in 0..cursor.len() {
            let mut edited = cursor.clone();
            edited[idx] = if edited[idx] == b'0' { b'1' } else { b'0' };
            assert_eq!(CursorKey::parse(&edited), None, "edit at {idx} accepted");
        }
    }

    #[test]
    fn garbage_is_rejected() {
        assert_eq!(CursorKey::parse(b""), None);
        assert_eq!(CursorKey::parse(b"s=1;i=2"), None);
        assert_eq!(CursorKey::parse(&[0xff, 0xfe]), None);
    }
}
