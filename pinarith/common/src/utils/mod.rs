pub mod serde_ark;

use {
    crate::FieldElement,
    ark_ff::{BigInteger, PrimeField},
    num_bigint::BigUint,
};

/// Parses a decimal field literal, reducing modulo the field order.
#[must_use]
pub fn field_from_decimal(digits: &str) -> Option<FieldElement> {
    let value = BigUint::parse_bytes(digits.as_bytes(), 10)?;
    Some(FieldElement::from_le_bytes_mod_order(&value.to_bytes_le()))
}

/// Parses an unprefixed hexadecimal literal into a field element, reducing
/// modulo the field order.
#[must_use]
pub fn field_from_hex(digits: &str) -> Option<FieldElement> {
    let value = BigUint::parse_bytes(digits.as_bytes(), 16)?;
    Some(FieldElement::from_le_bytes_mod_order(&value.to_bytes_le()))
}

/// Canonical big-integer representative of a field element.
#[must_use]
pub fn field_to_biguint(value: &FieldElement) -> BigUint {
    BigUint::from_bytes_le(&value.into_bigint().to_bytes_le())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_and_decimal_literals_agree() {
        assert_eq!(field_from_hex("ff"), Some(FieldElement::from(255u64)));
        assert_eq!(field_from_decimal("255"), Some(FieldElement::from(255u64)));
        assert_eq!(field_from_hex("0"), Some(FieldElement::from(0u64)));
    }

    #[test]
    fn rejects_bad_digits() {
        assert_eq!(field_from_hex(""), None);
        assert_eq!(field_from_hex("0xff"), None);
        assert_eq!(field_from_decimal("12a"), None);
    }

    #[test]
    fn round_trips_through_biguint() {
        let value = field_from_decimal("1234567890123456789").unwrap();
        assert_eq!(field_to_biguint(&value).to_string(), "1234567890123456789");
    }
}
