//! Transaction reference generation
//!
//! References are the externally shareable lookup keys (`TXN-...`), distinct
//! from the internal UUID primary key. The store's unique constraint is the
//! final authority on collisions; the transfer executor retries once with a
//! fresh reference when an insert hits it.

use chrono::Utc;
use rand::Rng;

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

fn to_base36(mut v: u64) -> String {
    if v == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while v > 0 {
        digits.push(BASE36[(v % 36) as usize]);
        v /= 36;
    }
    digits.iter().rev().map(|&b| b as char).collect()
}

/// Generate a reference of the form `TXN-<millis base36>-<6 random base36>`,
/// upper-cased.
pub fn generate_transaction_reference() -> String {
    let timestamp = to_base36(Utc::now().timestamp_millis() as u64);
    let mut rng = rand::thread_rng();
    let random: String = (0..6)
        .map(|_| BASE36[rng.gen_range(0..36)] as char)
        .collect();
    format!("TXN-{}-{}", timestamp, random).to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_to_base36() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(36 * 36 + 1), "101");
    }

    #[test]
    fn test_reference_shape() {
        let reference = generate_transaction_reference();
        assert!(reference.starts_with("TXN-"));
        assert_eq!(reference, reference.to_uppercase());

        let parts: Vec<&str> = reference.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[2].len(), 6);
        assert!(
            parts[1]
                .chars()
                .chain(parts[2].chars())
                .all(|c| c.is_ascii_alphanumeric())
        );
    }

    #[test]
    fn test_references_do_not_trivially_collide() {
        let refs: HashSet<String> = (0..100).map(|_| generate_transaction_reference()).collect();
        assert_eq!(refs.len(), 100);
    }
}
