//! Payload parsers for master station responses

use byteorder::{BigEndian, ByteOrder};
use tracing::trace;

use sportiduino_types::{CardData, LogEntry, Punch, RawCardData, ReadMode, VersionInfo};

use crate::{
    constants::{card, stations},
    error::{Error, Result},
};

/// Parse the payload of a card data response
///
/// # Layout
///
/// ```text
/// card number (BE u16) | page 6 (4) | page 7 (4) | { checkpoint (1) | time (BE u32) }*
/// ```
///
/// Records for the start and finish stations fill [`CardData::start`] and
/// [`CardData::finish`] instead of the punch list.
///
/// # Errors
///
/// Returns [`Error::Truncated`] if the header or the last punch record is
/// incomplete, and [`Error::InvalidPayload`] if the start or finish station
/// appears twice.
pub fn parse_card_data(data: &[u8]) -> Result<CardData> {
    if data.len() < card::HEADER_LEN {
        return Err(Error::Truncated {
            expected: card::HEADER_LEN,
            actual: data.len(),
        });
    }
    
    let records = &data[card::HEADER_LEN..];
    check_records(records, card::PUNCH_RECORD_LEN)?;
    
    let mut card = CardData::new(BigEndian::read_u16(&data[0..2]));
    card.page6.copy_from_slice(&data[2..6]);
    card.page7.copy_from_slice(&data[6..10]);
    
    for record in records.chunks_exact(card::PUNCH_RECORD_LEN) {
        let checkpoint = record[0];
        let timestamp = BigEndian::read_u32(&record[1..5]);
        
        let slot = match checkpoint {
            stations::START => &mut card.start,
            stations::FINISH => &mut card.finish,
            _ => {
                card.punches.push(Punch::new(checkpoint, timestamp));
                continue;
            }
        };
        
        if slot.replace(timestamp).is_some() {
            return Err(Error::InvalidPayload(format!(
                "station {} recorded twice on card {}",
                checkpoint, card.card_number
            )));
        }
    }
    
    trace!(card_number = card.card_number, punches = card.punches.len(), "Parsed card data");
    
    Ok(card)
}

/// Parse the payload of a raw card dump
///
/// Each 5-byte record is a page number followed by the 4 page bytes.
pub fn parse_raw_card_data(data: &[u8]) -> Result<RawCardData> {
    check_records(data, card::RAW_PAGE_RECORD_LEN)?;
    
    let mut raw = RawCardData::new();
    for record in data.chunks_exact(card::RAW_PAGE_RECORD_LEN) {
        let mut content = [0u8; 4];
        content.copy_from_slice(&record[1..5]);
        raw.insert(record[0], content);
    }
    
    Ok(raw)
}

/// Parse the payload of a log reader response
///
/// The first byte is the checkpoint number, followed by big-endian 16-bit
/// card numbers.
pub fn parse_log(data: &[u8]) -> Result<LogEntry> {
    let (&checkpoint, cards) = data.split_first().ok_or(Error::Truncated {
        expected: 1,
        actual: 0,
    })?;
    check_records(cards, 2)?;
    
    let mut entry = LogEntry::new(checkpoint);
    entry.card_numbers = cards.chunks_exact(2).map(BigEndian::read_u16).collect();
    
    Ok(entry)
}

/// Parse the payload of a version response
pub fn parse_version(data: &[u8]) -> Result<VersionInfo> {
    data.first()
        .map(|&raw| VersionInfo::new(raw))
        .ok_or(Error::Truncated {
            expected: 1,
            actual: 0,
        })
}

/// Parse the payload of a read mode response
pub fn parse_read_mode(data: &[u8]) -> Result<ReadMode> {
    let &mode = data.first().ok_or(Error::Truncated {
        expected: 1,
        actual: 0,
    })?;
    ReadMode::try_from(mode).map_err(|e| Error::InvalidPayload(e.to_string()))
}

/// Encode an unsigned value as a fixed-width big-endian field
///
/// # Errors
///
/// Returns [`Error::Overflow`] if the value needs more than `width` bytes.
///
/// # Examples
///
/// ```
/// use sportiduino_core::parse::to_bytes;
///
/// assert_eq!(to_bytes(0x0102, 3).unwrap(), vec![0x00, 0x01, 0x02]);
/// assert!(to_bytes(0x1_0000, 2).is_err());
/// ```
pub fn to_bytes(value: u64, width: usize) -> Result<Vec<u8>> {
    let fits = match width {
        0 => value == 0,
        1..=7 => value >> (8 * width) == 0,
        8 => true,
        _ => false,
    };
    if !fits {
        return Err(Error::Overflow { value, width });
    }
    
    Ok(value.to_be_bytes()[8 - width..].to_vec())
}

fn check_records(data: &[u8], record_len: usize) -> Result<()> {
    let partial = data.len() % record_len;
    if partial != 0 {
        return Err(Error::Truncated {
            expected: data.len() - partial + record_len,
            actual: data.len(),
        });
    }
    Ok(())
}
