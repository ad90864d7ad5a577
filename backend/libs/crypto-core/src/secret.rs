//! Signing-secret strength validation
//!
//! HS256 keys are only as strong as the shared secret behind them. Services
//! refuse to start with a weak `JWT_SECRET` instead of issuing forgeable tokens.

use thiserror::Error;

const MIN_SECRET_LENGTH: usize = 32; // 256 bits minimum for HMAC-SHA256
const RECOMMENDED_SECRET_LENGTH: usize = 64; // 512 bits recommended
const MIN_ENTROPY_BITS_PER_BYTE: f64 = 3.5;
const STRONG_ENTROPY_BITS_PER_BYTE: f64 = 4.5;

/// Secret strength classification for secrets that passed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretStrength {
    /// Meets the minimum, startup should warn
    Acceptable,
    /// Meets the recommended length and entropy
    Strong,
}

#[derive(Debug, Error, PartialEq)]
pub enum SecretError {
    #[error("signing secret too short: {0} bytes, at least {MIN_SECRET_LENGTH} required")]
    TooShort(usize),

    #[error("signing secret entropy too low: {0:.2} bits/byte")]
    LowEntropy(f64),

    #[error("signing secret contains an obvious repeating or sequential pattern")]
    Pattern,
}

/// Validate a symmetric signing secret
///
/// **Criteria**:
/// - Minimum 32 bytes (256 bits)
/// - Shannon entropy >= 3.5 bits/byte
/// - No run of 4+ identical or ascending bytes
pub fn validate_secret_strength(secret: &str) -> Result<SecretStrength, SecretError> {
    let bytes = secret.as_bytes();

    if bytes.len() < MIN_SECRET_LENGTH {
        return Err(SecretError::TooShort(bytes.len()));
    }

    let entropy = calculate_shannon_entropy(bytes);
    if entropy < MIN_ENTROPY_BITS_PER_BYTE {
        return Err(SecretError::LowEntropy(entropy));
    }

    if has_obvious_patterns(bytes) {
        return Err(SecretError::Pattern);
    }

    if bytes.len() >= RECOMMENDED_SECRET_LENGTH && entropy >= STRONG_ENTROPY_BITS_PER_BYTE {
        Ok(SecretStrength::Strong)
    } else {
        Ok(SecretStrength::Acceptable)
    }
}

/// Shannon entropy of a byte sequence, in bits per byte (0-8)
fn calculate_shannon_entropy(data: &[u8]) -> f64 {
    let mut freq = [0u32; 256];
    let len = data.len() as f64;

    for &byte in data {
        freq[byte as usize] += 1;
    }

    freq.iter()
        .filter(|&&count| count > 0)
        .map(|&count| {
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

fn has_obvious_patterns(data: &[u8]) -> bool {
    const RUN: usize = 4;

    let mut same = 1;
    let mut ascending = 1;
    for window in data.windows(2) {
        same = if window[0] == window[1] { same + 1 } else { 1 };
        ascending = if window[1] as i16 - window[0] as i16 == 1 {
            ascending + 1
        } else {
            1
        };

        if same >= RUN || ascending >= RUN {
            return true;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_secret_rejected() {
        assert_eq!(
            validate_secret_strength("too-short"),
            Err(SecretError::TooShort(9))
        );
    }

    #[test]
    fn test_repeated_secret_rejected() {
        let secret = "a".repeat(40);
        assert!(matches!(
            validate_secret_strength(&secret),
            Err(SecretError::LowEntropy(_))
        ));
    }

    #[test]
    fn test_sequential_run_rejected() {
        // High entropy overall, but contains "wxyz"
        let secret = "Qm9vTrP3kLw7xNc2Hj8VbF5dGs1ZaYe6wxyz";
        assert_eq!(validate_secret_strength(secret), Err(SecretError::Pattern));
    }

    #[test]
    fn test_acceptable_secret() {
        let secret = "Qm9vTrP3kLw7xNc2Hj8VbF5dGs1ZaYe6Ut4R";
        assert_eq!(
            validate_secret_strength(secret),
            Ok(SecretStrength::Acceptable)
        );
    }

    #[test]
    fn test_strong_secret() {
        let secret = "Qm9vTrP3kLw7xNc2Hj8VbF5dGs1ZaYe6Ut4RpK0sWq7EhJ3nMx9CvB2gLf5DiA8o";
        assert_eq!(validate_secret_strength(secret), Ok(SecretStrength::Strong));
    }
}
