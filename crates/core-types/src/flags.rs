use crate::enums::TransactionFlag;
use serde::de::{SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A fixed set of `TransactionFlag`s stored as a bitmask.
///
/// Serializes as a list of flag names so the shell can render it directly.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FlagSet(u8);

impl FlagSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn insert(&mut self, flag: TransactionFlag) {
        self.0 |= flag.bit();
    }

    pub fn extend<I: IntoIterator<Item = TransactionFlag>>(&mut self, flags: I) {
        for flag in flags {
            self.insert(flag);
        }
    }

    pub fn contains(&self, flag: TransactionFlag) -> bool {
        self.0 & flag.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterates flags in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = TransactionFlag> + '_ {
        TransactionFlag::ALL
            .into_iter()
            .filter(move |flag| self.contains(*flag))
    }
}

impl FromIterator<TransactionFlag> for FlagSet {
    fn from_iter<I: IntoIterator<Item = TransactionFlag>>(iter: I) -> Self {
        let mut set = FlagSet::empty();
        set.extend(iter);
        set
    }
}

impl fmt::Debug for FlagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl Serialize for FlagSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for flag in self.iter() {
            seq.serialize_element(&flag)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for FlagSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FlagSetVisitor;

        impl<'de> Visitor<'de> for FlagSetVisitor {
            type Value = FlagSet;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a list of transaction flags")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<FlagSet, A::Error> {
                let mut set = FlagSet::empty();
                while let Some(flag) = seq.next_element::<TransactionFlag>()? {
                    set.insert(flag);
                }
                Ok(set)
            }
        }

        deserializer.deserialize_seq(FlagSetVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_contains() {
        let mut flags = FlagSet::empty();
        assert!(flags.is_empty());

        flags.insert(TransactionFlag::Wire);
        flags.insert(TransactionFlag::Wire);
        flags.insert(TransactionFlag::NonSufficientFunds);

        assert_eq!(flags.len(), 2);
        assert!(flags.contains(TransactionFlag::Wire));
        assert!(!flags.contains(TransactionFlag::Overdraft));
    }

    #[test]
    fn test_iter_is_declaration_order() {
        let flags: FlagSet = [TransactionFlag::LenderMatch, TransactionFlag::PeerToPeerReview]
            .into_iter()
            .collect();

        let ordered: Vec<_> = flags.iter().collect();
        assert_eq!(
            ordered,
            vec![TransactionFlag::PeerToPeerReview, TransactionFlag::LenderMatch]
        );
    }

    #[test]
    fn test_serializes_as_flag_names() {
        let flags: FlagSet = [TransactionFlag::Overdraft].into_iter().collect();
        let json = serde_json::to_string(&flags).unwrap();
        assert_eq!(json, r#"["overdraft"]"#);

        let back: FlagSet = serde_json::from_str(r#"["wire","overdraft"]"#).unwrap();
        assert!(back.contains(TransactionFlag::Wire));
        assert!(back.contains(TransactionFlag::Overdraft));
    }
}
