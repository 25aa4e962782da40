//! Borrowed view records
//!
//! Views point into the caller's input buffer and own nothing. They are
//! bound to the input's lifetime, so they stay valid while the reader moves
//! on. `into_owned` produces the independently allocated counterparts from
//! [`crate::tree`].

use std::borrow::Cow;
use std::fmt;

use crate::core::unit::{valid_up_to, Unit};
use crate::error::{Error, Result};
use crate::tree;

/// XML version; the major version is always 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct XmlVersion {
    pub minor: u32,
}

impl XmlVersion {
    pub const MAJOR: u32 = 1;
    pub const V1_0: XmlVersion = XmlVersion { minor: 0 };
    pub const V1_1: XmlVersion = XmlVersion { minor: 1 };
}

impl fmt::Display for XmlVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", Self::MAJOR, self.minor)
    }
}

/// XML declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XmlDecl<'a, U> {
    pub version: XmlVersion,
    pub encoding: Option<&'a [U]>,
    pub standalone: Option<bool>,
}

impl<'a, U: Unit> XmlDecl<'a, U> {
    pub fn into_owned(self) -> Result<tree::XmlDeclaration> {
        Ok(tree::XmlDeclaration {
            version: self.version,
            encoding: self.encoding.map(owned_string).transpose()?,
            standalone: self.standalone,
        })
    }
}

/// SYSTEM or PUBLIC identifier of a doctype
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExternalId<'a, U> {
    System { system: &'a [U] },
    Public { public: &'a [U], system: &'a [U] },
}

/// DOCTYPE declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocTypeDecl<'a, U> {
    pub name: &'a [U],
    pub external_id: Option<ExternalId<'a, U>>,
}

impl<'a, U: Unit> DocTypeDecl<'a, U> {
    pub fn into_owned(self) -> Result<tree::DocType> {
        let external_id = match self.external_id {
            None => None,
            Some(ExternalId::System { system }) => Some(tree::ExternalIdentifier::System {
                system: owned_string(system)?,
            }),
            Some(ExternalId::Public { public, system }) => Some(tree::ExternalIdentifier::Public {
                public: owned_string(public)?,
                system: owned_string(system)?,
            }),
        };
        Ok(tree::DocType {
            name: owned_string(self.name)?,
            external_id,
        })
    }
}

/// Name and raw value of a processing instruction or an unresolved attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameValue<'a, U> {
    pub name: &'a [U],
    pub value: &'a [U],
}

impl<'a, U> NameValue<'a, U> {
    pub fn new(name: &'a [U], value: &'a [U]) -> Self {
        NameValue { name, value }
    }
}

/// Attribute with its value normalized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute<'a, U: Unit> {
    pub name: &'a [U],
    /// Borrowed from the input unless normalization changed it
    pub value: Cow<'a, [U]>,
}

impl<'a, U: Unit> Attribute<'a, U> {
    pub fn into_owned(self) -> Result<tree::Attribute> {
        let name = owned_string(self.name)?;
        let value = match self.value {
            Cow::Borrowed(v) => owned_string(v)?,
            Cow::Owned(v) => {
                let position = valid_up_to(&v);
                U::into_string(v).ok_or(Error::Encoding { position })?
            }
        };
        Ok(tree::Attribute { name, value })
    }

    /// Borrow as a raw pair, e.g. to hand the attribute to a writer
    pub fn as_name_value(&self) -> NameValue<'_, U> {
        NameValue::new(self.name, &self.value)
    }
}

pub(crate) fn owned_string<U: Unit>(units: &[U]) -> Result<String> {
    U::to_str(units)
        .map(Cow::into_owned)
        .ok_or_else(|| Error::Encoding {
            position: valid_up_to(units),
        })
}
