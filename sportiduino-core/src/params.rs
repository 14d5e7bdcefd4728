//! Parameter encoders for outbound commands
//!
//! Each function validates its input and returns the parameter bytes of one
//! command frame. None of them perform I/O.

use chrono::{Datelike, Timelike};

use sportiduino_types::ReadMode;

use crate::{
    constants::card::PAGE_PARAM_LEN,
    error::{Error, Result},
    parse::to_bytes,
};

/// First year the station clock can represent
pub const BASE_YEAR: i32 = 2000;

/// Parameters for `SET_TIME`: year since 2000, month, day, hour, minute, second
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use sportiduino_core::params;
///
/// let time = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap().and_hms_opt(3, 4, 5).unwrap();
/// assert_eq!(params::set_time(&time).unwrap(), vec![24, 1, 2, 3, 4, 5]);
/// ```
pub fn set_time<T: Datelike + Timelike>(time: &T) -> Result<Vec<u8>> {
    let year = time.year() - BASE_YEAR;
    let year = u8::try_from(year).map_err(|_| Error::Overflow {
        value: time.year().unsigned_abs().into(),
        width: 1,
    })?;
    
    // chrono guarantees the remaining fields are below 256
    Ok(vec![
        year,
        time.month() as u8,
        time.day() as u8,
        time.hour() as u8,
        time.minute() as u8,
        time.second() as u8,
    ])
}

/// Parameters for `SET_CP_NUM`
pub fn set_cp_number(checkpoint: u8) -> Vec<u8> {
    vec![checkpoint]
}

/// Parameters for `SET_PASSWD`: old password, new password, settings byte
///
/// Passwords are 24-bit values sent big-endian.
pub fn set_password(old: u32, new: u32, settings: u8) -> Result<Vec<u8>> {
    let mut params = to_bytes(old.into(), 3)?;
    params.extend(to_bytes(new.into(), 3)?);
    params.push(settings);
    Ok(params)
}

/// Parameters for `INIT_CARD`: card number, init time, pages 6 and 7
///
/// Pages hold up to 5 bytes each. Page 6 is zero-padded to 5 bytes when
/// page 7 follows, so page 7 always starts at the same offset; trailing
/// empty pages are omitted.
pub fn init_card(card_number: u16, timestamp: u32, page6: &[u8], page7: &[u8]) -> Result<Vec<u8>> {
    check_page(page6)?;
    check_page(page7)?;
    
    let mut params = Vec::with_capacity(6 + 2 * PAGE_PARAM_LEN);
    params.extend_from_slice(&card_number.to_be_bytes());
    params.extend_from_slice(&timestamp.to_be_bytes());
    params.extend_from_slice(page6);
    
    if !page7.is_empty() {
        params.resize(6 + PAGE_PARAM_LEN, 0);
        params.extend_from_slice(page7);
    }
    
    Ok(params)
}

/// Parameters for `WRITE_PAGES6_7`: both pages zero-padded to 5 bytes
pub fn write_pages6_7(page6: &[u8], page7: &[u8]) -> Result<Vec<u8>> {
    check_page(page6)?;
    check_page(page7)?;
    
    let mut params = vec![0u8; 2 * PAGE_PARAM_LEN];
    params[..page6.len()].copy_from_slice(page6);
    params[PAGE_PARAM_LEN..PAGE_PARAM_LEN + page7.len()].copy_from_slice(page7);
    Ok(params)
}

/// Parameters for `SET_READ_MODE`
pub fn set_read_mode(mode: ReadMode) -> Vec<u8> {
    vec![mode.into()]
}

fn check_page(page: &[u8]) -> Result<()> {
    if page.len() > PAGE_PARAM_LEN {
        return Err(Error::ParameterTooLong {
            size: page.len(),
            max: PAGE_PARAM_LEN,
        });
    }
    Ok(())
}
