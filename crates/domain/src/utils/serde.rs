//! Serialization helpers for domain types

/// Serialize a [`std::time::Duration`] as whole milliseconds (u64).
///
/// ```rust
/// use std::time::Duration;
///
/// use riskwatch_domain::utils::duration_millis;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Example {
///     #[serde(with = "duration_millis")]
///     timeout: Duration,
/// }
/// ```
pub mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    type SerializeResult<S> = Result<<S as Serializer>::Ok, <S as Serializer>::Error>;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> SerializeResult<S>
    where
        S: Serializer,
    {
        let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(millis)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde::{Deserialize, Serialize};

    use super::duration_millis;

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Wrapper {
        #[serde(with = "duration_millis")]
        timeout: Duration,
    }

    #[test]
    fn test_duration_millis_serialize() {
        let json = serde_json::to_string(&Wrapper { timeout: Duration::from_millis(1500) }).unwrap();
        assert_eq!(json, r#"{"timeout":1500}"#);
    }

    #[test]
    fn test_duration_millis_deserialize_zero() {
        let parsed: Wrapper = serde_json::from_str(r#"{"timeout":0}"#).unwrap();
        assert_eq!(parsed.timeout, Duration::ZERO);
    }
}
