//! Sportiduino checksum algorithm
//!
//! The checksum is the plain sum of every byte between the start byte and
//! the checksum itself (command/response code, length, payload), truncated
//! to 8 bits.

use tracing::trace;

/// Calculate frame checksum
///
/// # Examples
///
/// ```
/// use sportiduino_core::checksum;
///
/// assert_eq!(checksum::calculate(&[0x46, 0x00]), 0x46);
/// assert_eq!(checksum::calculate(&[0xFF, 0x02]), 0x01);
/// ```
pub fn calculate(bytes: &[u8]) -> u8 {
    let checksum = bytes.iter().fold(0u8, |sum, &b| sum.wrapping_add(b));
    
    trace!(
        len = bytes.len(),
        checksum = format!("0x{:02X}", checksum),
        "Calculated checksum"
    );
    
    checksum
}

/// Verify checksum
pub fn verify(bytes: &[u8], expected: u8) -> bool {
    calculate(bytes) == expected
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    
    #[test]
    fn test_checksum_empty() {
        assert_eq!(calculate(&[]), 0);
    }
    
    #[test]
    fn test_checksum_version_request() {
        // READ_VERSION frame body: code 0x46, no parameters
        assert_eq!(calculate(&[0x46, 0x00]), 0x46);
    }
    
    #[test]
    fn test_checksum_wraps() {
        assert_eq!(calculate(&[0xFF; 4]), 0xFC);
        assert_eq!(calculate(&[0x80, 0x80]), 0x00);
    }
    
    #[test]
    fn test_checksum_verify() {
        let bytes = [0x66, 0x01, 0x67];
        let checksum = calculate(&bytes);
        
        assert!(verify(&bytes, checksum));
        assert!(!verify(&bytes, checksum.wrapping_add(1)));
    }
    
    proptest! {
        #[test]
        fn prop_verify_accepts_own_checksum(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
            prop_assert!(verify(&bytes, calculate(&bytes)));
        }
        
        #[test]
        fn prop_checksum_bit_flip_detected(
            bytes in proptest::collection::vec(any::<u8>(), 0..64),
            bit in 0u8..8,
        ) {
            let checksum = calculate(&bytes);
            prop_assert!(!verify(&bytes, checksum ^ (1 << bit)));
        }
        
        #[test]
        fn prop_payload_bit_flip_detected(
            bytes in proptest::collection::vec(any::<u8>(), 1..64),
            index in any::<proptest::sample::Index>(),
            bit in 0u8..8,
        ) {
            let checksum = calculate(&bytes);
            let mut corrupted = bytes.clone();
            let i = index.index(corrupted.len());
            corrupted[i] ^= 1 << bit;
            // A single bit flip changes the sum by +-2^bit, never a multiple of 256
            prop_assert!(!verify(&corrupted, checksum));
        }
    }
}
