//! Serde adapter for field elements, serialized as decimal strings so that
//! JSON artifacts match the field's display form.

use {
    crate::{utils::field_from_decimal, FieldElement},
    serde::{de::Error as _, Deserialize, Deserializer, Serializer},
};

pub fn serialize<S: Serializer>(value: &FieldElement, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<FieldElement, D::Error> {
    let repr = String::deserialize(deserializer)?;
    field_from_decimal(&repr).ok_or_else(|| D::Error::custom(format!("invalid field element '{repr}'")))
}

/// Adapter for `Vec<FieldElement>` fields.
pub mod vec {
    use super::*;

    pub fn serialize<S: Serializer>(values: &[FieldElement], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(values.iter().map(ToString::to_string))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<FieldElement>, D::Error> {
        let reprs = Vec::<String>::deserialize(deserializer)?;
        reprs
            .iter()
            .map(|repr| {
                field_from_decimal(repr)
                    .ok_or_else(|| D::Error::custom(format!("invalid field element '{repr}'")))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use {super::*, serde::Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Wrapper(#[serde(with = "super")] FieldElement);

    #[test]
    fn decimal_string_round_trip() {
        let value = Wrapper(FieldElement::from(42u64));
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, "\"42\"");
        assert_eq!(serde_json::from_str::<Wrapper>(&json).unwrap(), value);
    }

    #[test]
    fn rejects_garbage() {
        assert!(serde_json::from_str::<Wrapper>("\"not a number\"").is_err());
    }
}
