//! Serialization and Deserialization implementation
//!
//! A [`PrefixTrie`] is stored as a sequence of `(prefix, value)` pairs, and an [`AddressSet`] as
//! a sequence of masks in their textual form (`"!10.0.0.0/8"`). Both keep the insertion order.

use ::serde::de::Error as _;
use ::serde::{Deserialize, Deserializer, Serialize, Serializer};
use ipnet::IpNet;

use super::*;

impl<V: Serialize> Serialize for PrefixTrie<V> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.iter())
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for PrefixTrie<V> {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let entries: Vec<(IpNet, V)> = Vec::deserialize(deserializer)?;
        Ok(Self::from_iter(entries))
    }
}

impl Serialize for AddressSet {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.to_string_list())
    }
}

impl<'de> Deserialize<'de> for AddressSet {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let masks: Vec<String> = Vec::deserialize(deserializer)?;
        let mut set = AddressSet::new();
        for mask in masks {
            set.add_mask_str(&mask, true).map_err(D::Error::custom)?;
        }
        Ok(set)
    }
}
