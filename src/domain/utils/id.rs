use serde::{Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;

/// Characters that are embedded in generated variable names and therefore not allowed in identifiers.
pub const RESERVED_ID_CHARACTERS: [char; 3] = ['[', ']', ','];

#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Hash)]
pub struct Id<T> {
    pub id: String,
    _marker: PhantomData<T>,
}

impl<T> Id<T> {
    pub fn new(id: impl Into<String>) -> Self {
        Id { id: id.into(), _marker: PhantomData }
    }

    pub fn as_str(&self) -> &str {
        &self.id
    }

    /// Returns the first reserved character contained in the identifier, if any.
    pub fn reserved_character(&self) -> Option<char> {
        self.id.chars().find(|c| RESERVED_ID_CHARACTERS.contains(c))
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl<T> From<Id<T>> for String {
    fn from(id_wrapper: Id<T>) -> Self {
        id_wrapper.id
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let full_name = std::any::type_name::<T>();
        let clean_name = full_name.split("::").last().unwrap_or(full_name);
        let display_name = clean_name.replace("Tag", "Id");

        write!(f, "{}: {:?}", display_name, self.id)
    }
}

// Ids are plain strings on the wire.
impl<T> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.id)
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Hash, Copy)]
pub struct LinkTag;
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Hash, Copy)]
pub struct ConnectionTag;

pub type LinkId = Id<LinkTag>;
pub type ConnectionId = Id<ConnectionTag>;
