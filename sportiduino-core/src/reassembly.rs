//! Reassembly of responses split over continuation fragments
//!
//! A response too large for one frame is sent as continuation fragments
//! with indices 1, 2, 3, ... followed by one ordinary frame that ends the
//! response. Every fragment must carry the response code of the first one.

use bytes::{Bytes, BytesMut};
use tracing::trace;

use crate::{
    constants::MAX_FRAGMENTS,
    error::{Error, Result},
    frame::Frame,
};

/// Accumulates the frames of one logical response
///
/// # Examples
///
/// ```
/// use sportiduino_core::{Frame, Reassembler};
///
/// let mut reassembler = Reassembler::new();
/// let first = Frame::continuation(0x63, 1, vec![0xAA; 25]).unwrap();
/// assert!(reassembler.push(first).unwrap().is_none());
///
/// let last = Frame::new(0x63, vec![0xBB; 3]).unwrap();
/// let (code, data) = reassembler.push(last).unwrap().unwrap();
/// assert_eq!(code, 0x63);
/// assert_eq!(data.len(), 28);
/// ```
#[derive(Debug)]
pub struct Reassembler {
    code: Option<u8>,
    last_index: u8,
    fragments: usize,
    max_fragments: usize,
    data: BytesMut,
}

impl Reassembler {
    pub fn new() -> Self {
        Self::with_max_fragments(MAX_FRAGMENTS)
    }
    
    pub fn with_max_fragments(max_fragments: usize) -> Self {
        Self {
            code: None,
            last_index: 0,
            fragments: 0,
            max_fragments,
            data: BytesMut::new(),
        }
    }
    
    /// Feed the next received frame
    ///
    /// Returns the complete `(code, data)` once a frame without the
    /// continuation marker arrives, `None` while more fragments are expected.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FragmentSequence`] when a fragment carries a different
    /// response code or an index that is not one above the previous one, and
    /// [`Error::TooManyFragments`] once the fragment limit is exceeded.
    pub fn push(&mut self, frame: Frame) -> Result<Option<(u8, Bytes)>> {
        match self.code {
            None => self.code = Some(frame.code),
            Some(code) if code != frame.code => {
                return Err(Error::FragmentSequence {
                    expected: format!("response code 0x{:02X}", code),
                    actual: format!("response code 0x{:02X}", frame.code),
                });
            }
            Some(_) => {}
        }
        
        if let Some(index) = frame.fragment_index() {
            let expected = self.last_index.wrapping_add(1);
            if index != expected {
                return Err(Error::FragmentSequence {
                    expected: format!("fragment {}", expected),
                    actual: format!("fragment {}", index),
                });
            }
            
            self.fragments += 1;
            if self.fragments > self.max_fragments {
                return Err(Error::TooManyFragments {
                    max: self.max_fragments,
                });
            }
            
            trace!(code = frame.code, index, "Received continuation fragment");
            
            self.last_index = index;
            self.data.extend_from_slice(&frame.payload);
            return Ok(None);
        }
        
        self.data.extend_from_slice(&frame.payload);
        
        let code = frame.code;
        let data = std::mem::take(&mut self.data).freeze();
        self.code = None;
        self.last_index = 0;
        self.fragments = 0;
        
        Ok(Some((code, data)))
    }
    
    /// Check if a response is partially received
    pub fn in_progress(&self) -> bool {
        self.code.is_some()
    }
}

impl Default for Reassembler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    
    fn fragment(index: u8, fill: u8) -> Frame {
        Frame::continuation(0x63, index, vec![fill; 25]).unwrap()
    }
    
    #[test]
    fn test_single_frame() {
        let mut reassembler = Reassembler::new();
        let frame = Frame::new(0x79, Vec::new()).unwrap();
        
        let (code, data) = reassembler.push(frame).unwrap().unwrap();
        assert_eq!(code, 0x79);
        assert!(data.is_empty());
        assert!(!reassembler.in_progress());
    }
    
    #[test]
    fn test_in_order_fragments() {
        let mut reassembler = Reassembler::new();
        
        assert!(reassembler.push(fragment(1, 0x01)).unwrap().is_none());
        assert!(reassembler.push(fragment(2, 0x02)).unwrap().is_none());
        assert!(reassembler.push(fragment(3, 0x03)).unwrap().is_none());
        assert!(reassembler.in_progress());
        
        let last = Frame::new(0x63, vec![0x04; 5]).unwrap();
        let (code, data) = reassembler.push(last).unwrap().unwrap();
        
        let mut expected = Vec::new();
        expected.extend_from_slice(&[0x01; 25]);
        expected.extend_from_slice(&[0x02; 25]);
        expected.extend_from_slice(&[0x03; 25]);
        expected.extend_from_slice(&[0x04; 5]);
        
        assert_eq!(code, 0x63);
        assert_eq!(data.as_ref(), expected.as_slice());
        assert!(!reassembler.in_progress());
    }
    
    #[test]
    fn test_continuation_is_never_terminal() {
        let mut reassembler = Reassembler::new();
        for index in 1..=5 {
            assert!(reassembler.push(fragment(index, index)).unwrap().is_none());
        }
        assert!(reassembler.in_progress());
    }
    
    #[test]
    fn test_out_of_order_fragment() {
        let mut reassembler = Reassembler::new();
        reassembler.push(fragment(1, 0x01)).unwrap();
        
        let result = reassembler.push(fragment(3, 0x03));
        assert!(matches!(result, Err(Error::FragmentSequence { .. })));
    }
    
    #[test]
    fn test_first_fragment_must_be_one() {
        let mut reassembler = Reassembler::new();
        let result = reassembler.push(fragment(2, 0x02));
        assert!(matches!(result, Err(Error::FragmentSequence { .. })));
    }
    
    #[test]
    fn test_mismatched_response_code() {
        let mut reassembler = Reassembler::new();
        reassembler.push(fragment(1, 0x01)).unwrap();
        
        let other = Frame::continuation(0x65, 2, vec![0; 25]).unwrap();
        assert!(matches!(
            reassembler.push(other),
            Err(Error::FragmentSequence { .. })
        ));
        
        let mut reassembler = Reassembler::new();
        reassembler.push(fragment(1, 0x01)).unwrap();
        let last = Frame::new(0x79, Vec::new()).unwrap();
        assert!(matches!(
            reassembler.push(last),
            Err(Error::FragmentSequence { .. })
        ));
    }
    
    #[test]
    fn test_fragment_limit() {
        let mut reassembler = Reassembler::with_max_fragments(2);
        reassembler.push(fragment(1, 0x01)).unwrap();
        reassembler.push(fragment(2, 0x02)).unwrap();
        
        assert!(matches!(
            reassembler.push(fragment(3, 0x03)),
            Err(Error::TooManyFragments { max: 2 })
        ));
    }
}
