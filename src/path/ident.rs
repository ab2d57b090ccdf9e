//! Identifier generation and ICS-24 identifier validation

use crate::error::PathError;

use rand::Rng;

/// Length of every generated client, connection and channel identifier
pub const GENERATED_ID_LEN: usize = 10;

/// Returns a lowercase letter string of given length drawn from `rng`
pub fn rand_lower_case_letter_string<R: Rng + ?Sized>(rng: &mut R, length: usize) -> String {
    (0..length)
        .map(|_| char::from(rng.gen_range(b'a'..=b'z')))
        .collect()
}

/// Generate a fresh identifier for a client, connection or channel
pub fn generate_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    rand_lower_case_letter_string(rng, GENERATED_ID_LEN)
}

fn validate_identifier(
    kind: &'static str,
    id: &str,
    min: usize,
    max: usize,
) -> Result<(), PathError> {
    let invalid = |reason: String| PathError::InvalidIdentifier {
        kind,
        id: id.to_string(),
        reason,
    };

    if id.trim().is_empty() {
        return Err(invalid("identifier cannot be blank".to_string()));
    }
    if id.contains('/') {
        return Err(invalid("identifier cannot contain a path separator".to_string()));
    }
    if id.len() < min || id.len() > max {
        return Err(invalid(format!(
            "length {} must be between {} and {}",
            id.len(),
            min,
            max
        )));
    }
    if let Some(c) = id.chars().find(|c| !is_valid_id_char(*c)) {
        return Err(invalid(format!("invalid character {:?}", c)));
    }

    Ok(())
}

fn is_valid_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '+' | '-' | '#' | '[' | ']' | '<' | '>')
}

pub fn validate_client_id(id: &str) -> Result<(), PathError> {
    validate_identifier("client", id, 9, 64)
}

pub fn validate_connection_id(id: &str) -> Result<(), PathError> {
    validate_identifier("connection", id, 10, 64)
}

pub fn validate_channel_id(id: &str) -> Result<(), PathError> {
    validate_identifier("channel", id, 8, 64)
}

pub fn validate_port_id(id: &str) -> Result<(), PathError> {
    validate_identifier("port", id, 2, 128)
}
