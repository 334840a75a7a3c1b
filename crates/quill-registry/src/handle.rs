//! # Opaque Handles
//!
//! The host receives a `u64` for every accepted operation and passes it
//! back only to `quill_abort`. Internally it packs the registry key and a
//! generation stamp, so a stale handle can never cancel an identifier's
//! later incarnation:
//!
//! ```text
//! bit 63      bits 62..32       bits 31..0
//! [kind]      [generation]      [identifier]
//! ```
//!
//! Generation `0` is never issued, so the all-zero handle doubles as the
//! "rejected" return value of the exported entry functions. The low 32 bits
//! equal the delivery identifier; that much is documented ABI so stream
//! callers can correlate callbacks with the subscription they opened.

use shared_types::OperationKind;

/// Opaque operation handle crossing the C boundary.
pub type RawHandle = u64;

/// The never-issued handle value returned when an operation is rejected.
pub const INVALID_HANDLE: RawHandle = 0;

/// Generations use 31 bits; the counter must stay below this bound.
pub(crate) const MAX_GENERATION: u32 = (1 << 31) - 1;

const KIND_BIT: u64 = 1 << 63;
const GENERATION_SHIFT: u64 = 32;
const GENERATION_MASK: u64 = (MAX_GENERATION as u64) << GENERATION_SHIFT;

/// Pack an operation's key and generation into the host-visible handle.
#[must_use]
pub(crate) fn pack(kind: OperationKind, id: i32, generation: u32) -> RawHandle {
    debug_assert!(generation > 0 && generation <= MAX_GENERATION);

    let kind_bit = if kind.is_stream() { KIND_BIT } else { 0 };
    let generation = (u64::from(generation) << GENERATION_SHIFT) & GENERATION_MASK;
    let id = u64::from(id as u32);

    kind_bit | generation | id
}

/// Unpack a host-supplied handle. Returns `None` for the invalid handle or
/// a zero generation, which no live entry can ever match.
#[must_use]
pub(crate) fn unpack(handle: RawHandle) -> Option<(OperationKind, i32, u32)> {
    let generation = ((handle & GENERATION_MASK) >> GENERATION_SHIFT) as u32;
    if generation == 0 {
        return None;
    }

    let kind = if handle & KIND_BIT != 0 {
        OperationKind::Stream
    } else {
        OperationKind::Once
    };
    let id = (handle & 0xFFFF_FFFF) as u32 as i32;

    Some((kind, id, generation))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_unpack_round_trip() {
        let cases = [
            (OperationKind::Once, 7, 1),
            (OperationKind::Stream, 42, 13),
            (OperationKind::Once, -5, MAX_GENERATION),
            (OperationKind::Stream, i32::MAX, 2),
        ];

        for (kind, id, generation) in cases {
            let handle = pack(kind, id, generation);
            assert_eq!(unpack(handle), Some((kind, id, generation)));
        }
    }

    #[test]
    fn test_low_bits_expose_identifier() {
        let handle = pack(OperationKind::Stream, 42, 9);
        assert_eq!((handle & 0xFFFF_FFFF) as u32 as i32, 42);
    }

    #[test]
    fn test_invalid_handle_never_unpacks() {
        assert_eq!(unpack(INVALID_HANDLE), None);
    }

    #[test]
    fn test_distinct_generations_distinct_handles() {
        let first = pack(OperationKind::Once, 7, 1);
        let second = pack(OperationKind::Once, 7, 2);
        assert_ne!(first, second);
    }
}
