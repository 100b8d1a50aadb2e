//! Caller-supplied values consulted while resolving `$NAME` references.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap, btree_set};

use bon::Builder;

/// Prefix of names that are never resolved from the ambient namespace.
pub const DEFAULT_RESERVED_PREFIX: &str = "HTTP_";

/// A read-only namespace of already-defined variables.
pub trait VariableSource: Send + Sync {
    /// Looks up the value of the named variable, if it is defined in this source.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the variable.
    fn lookup(&self, name: &str) -> Option<Cow<'_, str>>;
}

impl<T: VariableSource + ?Sized> VariableSource for &T {
    fn lookup(&self, name: &str) -> Option<Cow<'_, str>> {
        (**self).lookup(name)
    }
}

impl<S: std::hash::BuildHasher + Send + Sync> VariableSource for HashMap<String, String, S> {
    fn lookup(&self, name: &str) -> Option<Cow<'_, str>> {
        self.get(name).map(|value| Cow::Borrowed(value.as_str()))
    }
}

impl VariableSource for BTreeMap<String, String> {
    fn lookup(&self, name: &str) -> Option<Cow<'_, str>> {
        self.get(name).map(|value| Cow::Borrowed(value.as_str()))
    }
}

impl<S: std::hash::BuildHasher + Send + Sync> VariableSource
    for indexmap::IndexMap<String, String, S>
{
    fn lookup(&self, name: &str) -> Option<Cow<'_, str>> {
        self.get(name).map(|value| Cow::Borrowed(value.as_str()))
    }
}

/// A source that defines no variables at all.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoVariables;

impl VariableSource for NoVariables {
    fn lookup(&self, _name: &str) -> Option<Cow<'_, str>> {
        None
    }
}

/// Read-only view of the current process's environment.
///
/// Values that are not valid Unicode are treated as undefined.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessEnvironment;

impl VariableSource for ProcessEnvironment {
    fn lookup(&self, name: &str) -> Option<Cow<'_, str>> {
        std::env::var(name).ok().map(Cow::Owned)
    }
}

/// The set of names a previous load has already materialized.
///
/// References to these names prefer values assigned earlier in the text being parsed over
/// any external value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoadedVars(BTreeSet<String>);

impl LoadedVars {
    /// Returns an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a comma-separated list of names; empty items are ignored.
    ///
    /// # Arguments
    ///
    /// * `list` - The comma-separated names.
    pub fn from_list(list: &str) -> Self {
        list.split(',')
            .filter(|name| !name.is_empty())
            .map(ToOwned::to_owned)
            .collect()
    }

    /// Renders the set as a sorted, comma-separated list.
    pub fn to_list(&self) -> String {
        self.0.iter().map(String::as_str).collect::<Vec<_>>().join(",")
    }

    /// Returns whether the named variable has been loaded.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    /// Records the named variable as loaded.
    pub fn insert(&mut self, name: impl Into<String>) {
        self.0.insert(name.into());
    }

    /// Returns the number of names in the set.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the names in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.into_iter()
    }
}

impl<'a> IntoIterator for &'a LoadedVars {
    type Item = &'a str;
    type IntoIter = std::iter::Map<btree_set::Iter<'a, String>, fn(&String) -> &str>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter().map(String::as_str as fn(&String) -> &str)
    }
}

impl<S: Into<String>> FromIterator<S> for LoadedVars {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<String>> Extend<S> for LoadedVars {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.0.extend(iter.into_iter().map(Into::into));
    }
}

/// Identifies which source satisfied a variable reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ResolvedFrom {
    /// A loaded variable assigned earlier in the same text.
    LoadedInText,
    /// The applied namespace.
    Applied,
    /// The ambient namespace.
    Ambient,
    /// An assignment earlier in the same text.
    Text,
    /// The fallback source.
    Fallback,
    /// Nothing defined the variable.
    Undefined,
}

/// Everything outside the parsed text that variable resolution may consult.
///
/// A reference to `NAME` is resolved by trying, in order:
///
/// 1. the value assigned earlier in the text, if `NAME` is in `loaded_vars`;
/// 2. the `applied` namespace;
/// 3. the `ambient` namespace, unless `NAME` starts with `reserved_prefix`;
/// 4. the value assigned earlier in the text;
/// 5. the `fallback` source, or the empty string.
#[derive(Builder, Clone)]
pub struct ParseContext<'a> {
    /// Names materialized by a previous load.
    #[builder(default)]
    loaded_vars: LoadedVars,
    /// Variables already applied by the caller.
    #[builder(default = &NoVariables as &dyn VariableSource)]
    applied: &'a dyn VariableSource,
    /// Variables present in the surrounding environment.
    #[builder(default = &NoVariables as &dyn VariableSource)]
    ambient: &'a dyn VariableSource,
    /// Last-resort source for otherwise undefined variables.
    #[builder(default = &NoVariables as &dyn VariableSource)]
    fallback: &'a dyn VariableSource,
    /// Names with this prefix are never taken from `ambient`.
    #[builder(default = DEFAULT_RESERVED_PREFIX.to_owned(), into)]
    reserved_prefix: String,
}

impl Default for ParseContext<'_> {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl std::fmt::Debug for ParseContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParseContext")
            .field("loaded_vars", &self.loaded_vars)
            .field("reserved_prefix", &self.reserved_prefix)
            .finish_non_exhaustive()
    }
}

impl ParseContext<'_> {
    /// Returns the names materialized by a previous load.
    pub const fn loaded_vars(&self) -> &LoadedVars {
        &self.loaded_vars
    }

    /// Returns the prefix excluded from the ambient namespace.
    pub fn reserved_prefix(&self) -> &str {
        &self.reserved_prefix
    }

    /// Resolves `name` against this context and the values assigned so far.
    pub(crate) fn resolve<'v>(
        &'v self,
        name: &str,
        values: &'v crate::Variables,
    ) -> (Cow<'v, str>, ResolvedFrom) {
        if self.loaded_vars.contains(name) {
            if let Some(value) = values.get(name) {
                return (Cow::Borrowed(value.as_str()), ResolvedFrom::LoadedInText);
            }
        }

        if let Some(value) = self.applied.lookup(name) {
            return (value, ResolvedFrom::Applied);
        }

        if !name.starts_with(self.reserved_prefix.as_str()) || self.reserved_prefix.is_empty() {
            if let Some(value) = self.ambient.lookup(name) {
                return (value, ResolvedFrom::Ambient);
            }
        }

        if let Some(value) = values.get(name) {
            return (Cow::Borrowed(value.as_str()), ResolvedFrom::Text);
        }

        match self.fallback.lookup(name) {
            Some(value) => (value, ResolvedFrom::Fallback),
            None => (Cow::Borrowed(""), ResolvedFrom::Undefined),
        }
    }
}
