// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Attribute values, keys, and the attribute sets carried by runs.
//!
//! The storage engine never knows the concrete type of an attribute value. Values are stored
//! behind [`ErasedAttributeValue`], which only provides equality, hashing, and downcasting, and
//! are identified by a string key. Typed access goes through [`AttributeKey`] implementations,
//! which pair a key name with the value type stored under it.

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::{Any, TypeId};
use core::fmt::{self, Debug};
use core::hash::{BuildHasher, Hash, Hasher};

use foldhash::fast::FixedState;
use hashbrown::HashMap;

/// An attribute value whose concrete type has been erased.
///
/// This is implemented for every `'static` type that is `Debug + Eq + Hash + Send + Sync`, so
/// it never needs to be implemented by hand.
pub trait ErasedAttributeValue: Any + Debug + Send + Sync {
    /// Returns `true` if `other` has the same concrete type and compares equal.
    fn dyn_eq(&self, other: &dyn ErasedAttributeValue) -> bool;

    /// Feeds the concrete type and the value into `state`.
    fn dyn_hash(&self, state: &mut dyn Hasher);

    /// Upcasts to [`Any`] for downcasting to the concrete type.
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any + Debug + Eq + Hash + Send + Sync> ErasedAttributeValue for T {
    fn dyn_eq(&self, other: &dyn ErasedAttributeValue) -> bool {
        other
            .as_any()
            .downcast_ref::<Self>()
            .is_some_and(|other| self == other)
    }

    fn dyn_hash(&self, mut state: &mut dyn Hasher) {
        TypeId::of::<Self>().hash(&mut state);
        self.hash(&mut state);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A shared, type-erased attribute value.
///
/// Cloning is cheap: the value itself is reference counted.
#[derive(Clone)]
pub struct AttributeValue(Arc<dyn ErasedAttributeValue>);

impl AttributeValue {
    /// Wraps `value`.
    pub fn new<T: ErasedAttributeValue>(value: T) -> Self {
        Self(Arc::new(value))
    }

    /// Returns the value as a `T`, if that is its concrete type.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        (*self.0).as_any().downcast_ref::<T>()
    }

    /// Returns `true` if the concrete type of the value is `T`.
    pub fn is<T: Any>(&self) -> bool {
        (*self.0).as_any().is::<T>()
    }
}

impl PartialEq for AttributeValue {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0.dyn_eq(&*other.0)
    }
}

impl Eq for AttributeValue {}

impl Hash for AttributeValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.dyn_hash(state);
    }
}

impl Debug for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Debug::fmt(&*self.0, f)
    }
}

/// A typed attribute key.
///
/// Implementors name an attribute and fix the type of the values stored under that name.
///
/// ```
/// use attributed_text::AttributeKey;
///
/// enum Bold {}
///
/// impl AttributeKey for Bold {
///     const NAME: &'static str = "bold";
///     type Value = bool;
/// }
/// ```
pub trait AttributeKey {
    /// The name the value is stored under.
    const NAME: &'static str;

    /// The type of the value.
    type Value: ErasedAttributeValue + Clone;
}

/// How conflicting keys are resolved when merging one [`AttributeSet`] into another.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MergePolicy {
    /// Values from the incoming set replace existing values.
    #[default]
    KeepNew,
    /// Existing values are kept; only missing keys are added.
    KeepCurrent,
}

/// The set of attributes carried by one run of text.
///
/// Two sets are equal when they have the same keys and every value compares equal. Hashing is
/// independent of insertion order.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AttributeSet {
    entries: HashMap<Arc<str>, AttributeValue>,
}

impl AttributeSet {
    /// Creates an empty attribute set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of this set with `value` stored under `K`.
    #[must_use]
    pub fn with<K: AttributeKey>(mut self, value: K::Value) -> Self {
        self.insert::<K>(value);
        self
    }

    /// The number of attributes in the set.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the set has no attributes.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The value stored under `K`, if present and of the expected type.
    pub fn get<K: AttributeKey>(&self) -> Option<&K::Value> {
        self.value(K::NAME)?.downcast_ref::<K::Value>()
    }

    /// The value stored under `name`.
    pub fn value(&self, name: &str) -> Option<&AttributeValue> {
        self.entries.get(name)
    }

    /// Returns `true` if a value is stored under `name`.
    pub fn contains_key(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Stores `value` under `K`, returning the previous value.
    pub fn insert<K: AttributeKey>(&mut self, value: K::Value) -> Option<AttributeValue> {
        self.insert_value(K::NAME, AttributeValue::new(value))
    }

    /// Stores an already erased `value` under `name`, returning the previous value.
    pub fn insert_value(
        &mut self,
        name: impl Into<Arc<str>>,
        value: AttributeValue,
    ) -> Option<AttributeValue> {
        self.entries.insert(name.into(), value)
    }

    /// Removes the value stored under `K`.
    pub fn remove<K: AttributeKey>(&mut self) -> Option<AttributeValue> {
        self.remove_key(K::NAME)
    }

    /// Removes the value stored under `name`.
    pub fn remove_key(&mut self, name: &str) -> Option<AttributeValue> {
        self.entries.remove(name)
    }

    /// Iterates over the attributes in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> + '_ {
        self.entries.iter().map(|(name, value)| (&**name, value))
    }

    /// Iterates over the attribute names in unspecified order.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.keys().map(|name| &**name)
    }

    /// Merges `other` into this set, resolving shared keys with `policy`.
    pub fn merge(&mut self, other: &Self, policy: MergePolicy) {
        for (name, value) in &other.entries {
            match policy {
                MergePolicy::KeepNew => {
                    self.entries.insert(name.clone(), value.clone());
                }
                MergePolicy::KeepCurrent => {
                    self.entries
                        .entry(name.clone())
                        .or_insert_with(|| value.clone());
                }
            }
        }
    }

    /// Returns a copy of this set with `other` merged in.
    #[must_use]
    pub fn merging(&self, other: &Self, policy: MergePolicy) -> Self {
        let mut merged = self.clone();
        merged.merge(other, policy);
        merged
    }

    /// Returns `true` if every attribute in `other` is present in this set with an equal value.
    pub fn contains_all(&self, other: &Self) -> bool {
        other
            .entries
            .iter()
            .all(|(name, value)| self.entries.get(name) == Some(value))
    }

    /// Returns `true` if both sets agree on every key in `names`.
    ///
    /// A key missing from both sets counts as agreement.
    pub fn equal_on<S: AsRef<str>>(&self, other: &Self, names: &[S]) -> bool {
        names.iter().all(|name| {
            let name = name.as_ref();
            self.entries.get(name) == other.entries.get(name)
        })
    }

    /// Returns the subset of this set restricted to `names`.
    #[must_use]
    pub fn projected<S: AsRef<str>>(&self, names: &[S]) -> Self {
        let entries = names
            .iter()
            .filter_map(|name| {
                self.entries
                    .get_key_value(name.as_ref())
                    .map(|(name, value)| (name.clone(), value.clone()))
            })
            .collect();
        Self { entries }
    }

    /// Keeps only the attributes whose name satisfies `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.entries.retain(|name, _| keep(name));
    }

    /// Drops every attribute that `other` does not hold with an equal value.
    pub(crate) fn intersect(&mut self, other: &Self) {
        self.entries
            .retain(|name, value| other.entries.get(name) == Some(value));
    }

    fn sorted_entries(&self) -> Vec<(&str, &AttributeValue)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_unstable_by_key(|(name, _)| *name);
        entries
    }
}

impl Hash for AttributeSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Entry hashes are summed so that iteration order does not matter.
        let build = FixedState::default();
        let mut combined = 0_u64;
        for (name, value) in &self.entries {
            let mut hasher = build.build_hasher();
            name.hash(&mut hasher);
            value.hash(&mut hasher);
            combined = combined.wrapping_add(hasher.finish());
        }
        state.write_usize(self.entries.len());
        state.write_u64(combined);
    }
}

impl Debug for AttributeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.sorted_entries()).finish()
    }
}

impl fmt::Display for AttributeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{{")?;
        for (name, value) in self.sorted_entries() {
            writeln!(f, "\t{name} = {value:?}")?;
        }
        write!(f, "}}")
    }
}

impl<'a> FromIterator<(&'a str, AttributeValue)> for AttributeSet {
    fn from_iter<I: IntoIterator<Item = (&'a str, AttributeValue)>>(iter: I) -> Self {
        let entries = iter
            .into_iter()
            .map(|(name, value)| (Arc::from(name), value))
            .collect();
        Self { entries }
    }
}

#[cfg(test)]
mod tests {
    use super::{AttributeKey, AttributeSet, AttributeValue, MergePolicy};
    use alloc::format;
    use alloc::string::{String, ToString};
    use core::hash::{BuildHasher, Hash, Hasher};
    use foldhash::fast::FixedState;

    enum Size {}
    impl AttributeKey for Size {
        const NAME: &'static str = "size";
        type Value = u32;
    }

    enum Link {}
    impl AttributeKey for Link {
        const NAME: &'static str = "link";
        type Value = String;
    }

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = FixedState::default().build_hasher();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn erased_values_compare_by_type_and_value() {
        assert_eq!(AttributeValue::new(1_u32), AttributeValue::new(1_u32));
        assert_ne!(AttributeValue::new(1_u32), AttributeValue::new(2_u32));
        // Same numeric value, different type.
        assert_ne!(AttributeValue::new(1_u32), AttributeValue::new(1_u64));

        let value = AttributeValue::new("x".to_string());
        assert!(value.is::<String>());
        assert_eq!(value.downcast_ref::<String>().map(String::as_str), Some("x"));
        assert!(value.downcast_ref::<u32>().is_none());
    }

    #[test]
    fn typed_access() {
        let mut set = AttributeSet::new().with::<Size>(12);
        assert_eq!(set.get::<Size>(), Some(&12));
        assert_eq!(set.get::<Link>(), None);

        let previous = set.insert::<Size>(14);
        assert_eq!(previous, Some(AttributeValue::new(12_u32)));
        assert_eq!(set.get::<Size>(), Some(&14));

        // A value of the wrong type under a known name is not returned.
        set.insert_value("link", AttributeValue::new(3_u8));
        assert!(set.contains_key("link"));
        assert_eq!(set.get::<Link>(), None);

        assert!(set.remove::<Link>().is_some());
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn hash_ignores_insertion_order() {
        let a = AttributeSet::new()
            .with::<Size>(1)
            .with::<Link>("a".into());
        let b = AttributeSet::new()
            .with::<Link>("a".into())
            .with::<Size>(1);
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
        assert_ne!(hash_of(&a), hash_of(&AttributeSet::new().with::<Size>(1)));
    }

    #[test]
    fn merge_policies() {
        let current = AttributeSet::new().with::<Size>(1);
        let incoming = AttributeSet::new()
            .with::<Size>(2)
            .with::<Link>("l".into());

        let kept_new = current.merging(&incoming, MergePolicy::KeepNew);
        assert_eq!(kept_new.get::<Size>(), Some(&2));
        assert_eq!(kept_new.len(), 2);

        let kept_current = current.merging(&incoming, MergePolicy::KeepCurrent);
        assert_eq!(kept_current.get::<Size>(), Some(&1));
        assert_eq!(kept_current.get::<Link>().map(String::as_str), Some("l"));
    }

    #[test]
    fn projection_and_partial_equality() {
        let a = AttributeSet::new()
            .with::<Size>(1)
            .with::<Link>("a".into());
        let b = AttributeSet::new()
            .with::<Size>(1)
            .with::<Link>("b".into());
        assert!(a.equal_on(&b, &["size"]));
        assert!(!a.equal_on(&b, &["size", "link"]));
        // Absent from both.
        assert!(a.equal_on(&b, &["missing"]));

        let projected = a.projected(&["size", "missing"]);
        assert_eq!(projected, AttributeSet::new().with::<Size>(1));
        assert!(a.contains_all(&projected));
        assert!(!projected.contains_all(&a));
    }

    #[test]
    fn intersect_keeps_agreeing_entries() {
        let mut a = AttributeSet::new()
            .with::<Size>(1)
            .with::<Link>("a".into());
        let b = AttributeSet::new()
            .with::<Size>(1)
            .with::<Link>("b".into());
        a.intersect(&b);
        assert_eq!(a, AttributeSet::new().with::<Size>(1));
    }

    #[test]
    fn display_is_sorted() {
        let set = AttributeSet::new()
            .with::<Size>(3)
            .with::<Link>("x".into());
        assert_eq!(format!("{set}"), "{\n\tlink = \"x\"\n\tsize = 3\n}");
        assert_eq!(format!("{set:?}"), "{\"link\": \"x\", \"size\": 3}");
    }
}
