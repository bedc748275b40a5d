//! # Amounts
//!
//! All balances, allowances and locked amounts are unsigned integers in
//! the token's smallest unit (10^-18 FAIRC). The full supply is
//! 1.2 x 10^27 base units, so `u128` leaves eleven orders of magnitude of
//! headroom. Arithmetic on amounts is always `checked_*`.
//!
//! JSON numbers cannot carry a 27-digit integer through most tooling, so
//! amounts cross serialization boundaries as decimal strings via
//! [`amount_str`].

/// Token quantity in base units.
pub type Amount = u128;

/// Converts a whole-token quantity into base units for the given number of
/// decimals. Returns `None` on overflow.
pub fn to_base_units(whole: Amount, decimals: u8) -> Option<Amount> {
    10u128
        .checked_pow(u32::from(decimals))
        .and_then(|scale| whole.checked_mul(scale))
}

/// Renders a base-unit amount as a decimal token quantity, trimming
/// trailing zeros from the fractional part (`1500000000000000000` with 18
/// decimals renders as `"1.5"`).
pub fn format_units(amount: Amount, decimals: u8) -> String {
    let Some(scale) = 10u128.checked_pow(u32::from(decimals)) else {
        return amount.to_string();
    };
    let whole = amount / scale;
    let frac = amount % scale;
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{:0width$}", frac, width = decimals as usize);
    format!("{}.{}", whole, frac.trim_end_matches('0'))
}

/// Serde helper serializing an [`Amount`] as a decimal string.
///
/// Deserialization accepts either a string or a JSON integer that fits in
/// a `u64`.
///
/// ```ignore
/// #[derive(Serialize, Deserialize)]
/// struct Step {
///     #[serde(with = "faireum_protocol::amount::amount_str")]
///     amount: Amount,
/// }
/// ```
pub mod amount_str {
    use super::Amount;
    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S: Serializer>(amount: &Amount, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(amount)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Amount, D::Error> {
        deserializer.deserialize_any(AmountVisitor)
    }

    struct AmountVisitor;

    impl<'de> Visitor<'de> for AmountVisitor {
        type Value = Amount;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a non-negative integer amount, preferably as a decimal string")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
            Ok(Amount::from(v))
        }

        fn visit_u128<E: de::Error>(self, v: u128) -> Result<Amount, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Amount, E> {
            Amount::try_from(v).map_err(|_| E::custom(format!("negative amount: {v}")))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
            let cleaned: String = v.chars().filter(|c| *c != '_').collect();
            cleaned
                .parse::<Amount>()
                .map_err(|e| E::custom(format!("invalid amount {v:?}: {e}")))
        }
    }
}

/// Serde helper for `BTreeMap<K, Amount>` with decimal-string values.
pub mod amount_map {
    use super::Amount;
    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::BTreeMap;

    pub fn serialize<K, S>(map: &BTreeMap<K, Amount>, serializer: S) -> Result<S::Ok, S::Error>
    where
        K: Serialize,
        S: Serializer,
    {
        let mut out = serializer.serialize_map(Some(map.len()))?;
        for (key, value) in map {
            out.serialize_entry(key, &value.to_string())?;
        }
        out.end()
    }

    pub fn deserialize<'de, K, D>(deserializer: D) -> Result<BTreeMap<K, Amount>, D::Error>
    where
        K: Deserialize<'de> + Ord,
        D: Deserializer<'de>,
    {
        let raw: BTreeMap<K, String> = BTreeMap::deserialize(deserializer)?;
        raw.into_iter()
            .map(|(key, value)| {
                value
                    .parse::<Amount>()
                    .map(|amount| (key, amount))
                    .map_err(serde::de::Error::custom)
            })
            .collect()
    }
}
