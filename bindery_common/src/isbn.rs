use thiserror::Error;

/// Why a str could not be read as an isbn-13
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IsbnError {
    /// the str did not contain exactly 13 digits (optionally after a `13` prefix)
    #[error("expected 13 digits, found {0}")]
    WrongLength(usize),
    /// a 15-digit str whose first two digits were not the `13` of an `ISBN-13` prefix
    #[error("unrecognised prefix before isbn digits")]
    BadPrefix,
    /// the final digit did not match the checksum of the first twelve
    #[error("check digit should be {expected}, found {found}")]
    BadCheckDigit {
        /// the check digit computed from the first twelve digits
        expected: u32,
        /// the check digit present in the str
        found: u32,
    },
}

fn isbn_to_array(isbn: &str) -> Result<[u32; 13], IsbnError> {
    let mut digits = isbn
        .chars()
        .filter_map(|c| c.to_digit(10))
        .take(16)
        .collect::<Vec<_>>();

    match digits.len() {
        13 => (),
        15 => {
            // this could have been a prefix like ISBN-13
            if digits[..2] != [1, 3] {
                return Err(IsbnError::BadPrefix);
            }
            let _prefix = digits.drain(0..2);
        }
        n => return Err(IsbnError::WrongLength(n)),
    }

    let mut arr = [0; 13];
    arr.copy_from_slice(&digits);
    Ok(arr)
}

fn calculate_check_digit(digits: &[u32]) -> u32 {
    let sum: u32 = digits
        .iter()
        .take(12)
        .enumerate()
        .map(|(i, &d)| if i % 2 == 0 { d } else { d * 3 })
        .sum();
    (10 - (sum % 10)) % 10
}

fn check(isbn: &[u32; 13]) -> Result<(), IsbnError> {
    let expected = calculate_check_digit(&isbn[..12]);
    if expected == isbn[12] {
        Ok(())
    } else {
        Err(IsbnError::BadCheckDigit {
            expected,
            found: isbn[12],
        })
    }
}

/// Validate that a `str` can be interpreted as an isbn-13.
/// Non-digit characters are ignored, so prefixed or hyphenated isbns validate:
/// ```
/// use bindery_common::validate_isbn;
/// assert!(validate_isbn("ISBN13 978-1-4920-6766-5").is_ok());
/// assert!(validate_isbn("978-1-4920-6766-5").is_ok());
/// assert!(validate_isbn("9781492067665").is_ok());
/// assert!(validate_isbn("978-1-4920-6766-6").is_err());
/// ```
pub fn validate_isbn<S: AsRef<str>>(isbn: S) -> Result<(), IsbnError> {
    let arr = isbn_to_array(isbn.as_ref())?;
    check(&arr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_isbn_to_array() {
        let expected = [9, 7, 8, 1, 4, 9, 2, 0, 6, 7, 6, 6, 5];

        assert_eq!(isbn_to_array("ISBN13 978-1-4920-6766-5").unwrap(), expected);
        assert_eq!(isbn_to_array("978-1-4920-6766-5").unwrap(), expected);
        assert_eq!(isbn_to_array("9781492067665").unwrap(), expected);
        assert_eq!(isbn_to_array("97814920"), Err(IsbnError::WrongLength(8)));
        assert_eq!(isbn_to_array("ISBN99 9781492067665"), Err(IsbnError::BadPrefix));
    }

    #[test]
    fn test_validate_isbn() {
        assert!(validate_isbn("ISBN-13 9781492067665").is_ok());
        assert_eq!(
            validate_isbn("978-1-4920-6766-6"),
            Err(IsbnError::BadCheckDigit {
                expected: 5,
                found: 6
            })
        );
    }
}
