use serde::{Deserialize, Serialize};

use crate::error::{BookcaseError, Result};

/// A checksum-validated ISBN, always carried in its 13-digit form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Isbn {
    pub isbn13: String,
    /// Only `978`-prefixed ISBN-13s have an ISBN-10 form.
    pub isbn10: Option<String>,
}

impl Isbn {
    pub fn parse(input: &str) -> Result<Self> {
        let stripped: String = input
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_uppercase();

        let invalid = || BookcaseError::InvalidIsbn(input.to_string());

        match stripped.len() {
            13 => {
                let digits = decimal_digits(&stripped).ok_or_else(invalid)?;
                if isbn13_checksum(&digits[..12]) != digits[12] {
                    return Err(invalid());
                }
                let isbn10 = stripped
                    .starts_with("978")
                    .then(|| isbn10_from_body(&digits[3..12]));
                Ok(Self {
                    isbn13: stripped,
                    isbn10,
                })
            }
            10 => {
                let (body, check) = stripped.split_at(9);
                let body = decimal_digits(body).ok_or_else(invalid)?;
                let check = match check {
                    "X" => 10,
                    d => d.parse::<u8>().map_err(|_| invalid())?,
                };
                if isbn10_checksum(&body) != check {
                    return Err(invalid());
                }

                let mut d13 = vec![9, 7, 8];
                d13.extend_from_slice(&body);
                let check13 = isbn13_checksum(&d13);
                d13.push(check13);

                Ok(Self {
                    isbn13: digits_to_string(&d13),
                    isbn10: Some(stripped),
                })
            }
            _ => Err(invalid()),
        }
    }
}

fn decimal_digits(s: &str) -> Option<Vec<u8>> {
    s.chars()
        .map(|c| c.to_digit(10).map(|d| d as u8))
        .collect()
}

fn digits_to_string(digits: &[u8]) -> String {
    digits.iter().map(|d| char::from(b'0' + d)).collect()
}

fn isbn13_checksum(first12: &[u8]) -> u8 {
    let sum: u32 = first12
        .iter()
        .enumerate()
        .map(|(i, &d)| if i % 2 == 0 { d as u32 } else { d as u32 * 3 })
        .sum();
    ((10 - sum % 10) % 10) as u8
}

fn isbn10_checksum(first9: &[u8]) -> u8 {
    let sum: u32 = first9
        .iter()
        .enumerate()
        .map(|(i, &d)| (10 - i as u32) * d as u32)
        .sum();
    ((11 - sum % 11) % 11) as u8
}

fn isbn10_from_body(body: &[u8]) -> String {
    let mut out = digits_to_string(body);
    match isbn10_checksum(body) {
        10 => out.push('X'),
        d => out.push(char::from(b'0' + d)),
    }
    out
}
