use std::fmt::{Debug, Display};
use std::marker::PhantomData;

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

pub trait TypedIdMarker {
    fn tag() -> &'static str;
}

/// Backend-assigned record identifier.
///
/// Each backend has its own native key type (auto-increment integers for
/// postgres, object ids for mongodb). Both are rendered to text when records
/// are read back so callers only ever see one representation.
pub struct TypedId<T: TypedIdMarker>(String, PhantomData<T>);

impl<T: TypedIdMarker> TypedId<T> {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<T: TypedIdMarker> Clone for TypedId<T> {
    fn clone(&self) -> TypedId<T> {
        TypedId(self.0.clone(), PhantomData)
    }
}

impl<T: TypedIdMarker> PartialEq for TypedId<T> {
    fn eq(&self, other: &TypedId<T>) -> bool {
        self.0 == other.0
    }
}

impl<T: TypedIdMarker> Eq for TypedId<T> {}

impl<T: TypedIdMarker> Display for TypedId<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        f.write_str(&self.0)
    }
}

impl<T: TypedIdMarker> Debug for TypedId<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}({})", T::tag(), self.0)
    }
}

impl<T: TypedIdMarker> From<i64> for TypedId<T> {
    fn from(id: i64) -> TypedId<T> {
        TypedId(id.to_string(), PhantomData)
    }
}

impl<T: TypedIdMarker> From<ObjectId> for TypedId<T> {
    fn from(id: ObjectId) -> TypedId<T> {
        TypedId(id.to_hex(), PhantomData)
    }
}

impl<T: TypedIdMarker> From<String> for TypedId<T> {
    fn from(id: String) -> TypedId<T> {
        TypedId(id, PhantomData)
    }
}

impl<T: TypedIdMarker> Serialize for TypedId<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de, T: TypedIdMarker> Deserialize<'de> for TypedId<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(TypedId(s, PhantomData))
    }
}
