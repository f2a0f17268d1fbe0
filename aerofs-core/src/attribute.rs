//! Per-entity attribute schemas.
//!
//! Every entity declares its attributes once in a static [`Schema`]. The
//! `readonly!` and `synced!` macros generate the matching accessors: a getter
//! that loads the entity on first access, and for synced attributes a setter
//! that only buffers the value and records it as pending.

use std::collections::BTreeSet;

use serde_json::Value;

use crate::error::AeroError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    ReadOnly,
    Synced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attribute {
    pub name: &'static str,
    pub access: Access,
    /// Part of the remote record and of pending-change accounting.
    pub sync: bool,
}

impl Attribute {
    pub const fn readonly(name: &'static str) -> Self {
        Self {
            name,
            access: Access::ReadOnly,
            sync: true,
        }
    }

    /// Read-only bookkeeping kept out of pending-change tracking (ids, tags).
    pub const fn readonly_local(name: &'static str) -> Self {
        Self {
            name,
            access: Access::ReadOnly,
            sync: false,
        }
    }

    pub const fn synced(name: &'static str) -> Self {
        Self {
            name,
            access: Access::Synced,
            sync: true,
        }
    }

    pub fn is_writable(&self) -> bool {
        self.access == Access::Synced
    }
}

#[derive(Debug)]
pub struct Schema {
    entity: &'static str,
    attributes: &'static [Attribute],
}

impl Schema {
    pub const fn new(entity: &'static str, attributes: &'static [Attribute]) -> Self {
        Self { entity, attributes }
    }

    pub fn entity(&self) -> &'static str {
        self.entity
    }

    pub fn attributes(&self) -> &'static [Attribute] {
        self.attributes
    }

    pub fn get(&self, name: &str) -> Option<&'static Attribute> {
        self.attributes.iter().find(|attribute| attribute.name == name)
    }

    /// Resolves `name` for assignment, rejecting unknown and read-only names.
    pub fn writable(&self, name: &str) -> Result<&'static Attribute, AeroError> {
        let attribute = self.get(name).ok_or_else(|| AeroError::UnknownAttribute {
            entity: self.entity,
            attribute: name.to_string(),
        })?;
        if !attribute.is_writable() {
            return Err(AeroError::ReadOnly {
                entity: self.entity,
                attribute: name.to_string(),
            });
        }
        Ok(attribute)
    }

    pub fn synced(&self) -> impl Iterator<Item = &'static str> + use<> {
        let attributes = self.attributes;
        attributes
            .iter()
            .filter(|attribute| attribute.is_writable())
            .map(|attribute| attribute.name)
    }

    /// Names populated from the remote record.
    pub fn record_fields(&self) -> impl Iterator<Item = &'static str> + use<> {
        let attributes = self.attributes;
        attributes
            .iter()
            .filter(|attribute| attribute.sync)
            .map(|attribute| attribute.name)
    }
}

/// Common surface of every remote entity.
pub trait Entity {
    const SCHEMA: Schema;

    /// The id this entity is bound to, without triggering a load.
    fn remote_id(&self) -> Option<&str>;

    fn pending(&self) -> &BTreeSet<&'static str>;

    /// Stores a decoded value for a synced attribute and marks it pending.
    fn assign(&mut self, attribute: &'static Attribute, value: Value) -> Result<(), AeroError>;

    /// Name-based assignment. Fails before touching any state when `name` is
    /// unknown or read-only.
    fn set_attr(&mut self, name: &str, value: Value) -> Result<(), AeroError> {
        let attribute = Self::SCHEMA.writable(name)?;
        self.assign(attribute, value)
    }

    fn is_pending(&self, name: &str) -> bool {
        self.pending().contains(name)
    }
}

macro_rules! readonly {
    ($(#[$meta:meta])* $field:ident -> $ret:ty = |$this:ident| $get:expr) => {
        $(#[$meta])*
        pub async fn $field(&mut self) -> Result<$ret, crate::error::AeroError> {
            if self.$field.is_none() {
                self.ensure_loaded().await?;
            }
            let $this = &*self;
            Ok($get)
        }
    };
}

macro_rules! synced {
    ($(#[$meta:meta])* $field:ident / $setter:ident($value:ty) -> $ret:ty = |$this:ident| $get:expr) => {
        crate::attribute::readonly!($(#[$meta])* $field -> $ret = |$this| $get);

        /// Buffers a new value until the next save; no remote call is made.
        pub fn $setter(&mut self, value: $value) {
            self.$field = Some(value.into());
            self.object.mark_pending(stringify!($field));
        }
    };
}

pub(crate) use readonly;
pub(crate) use synced;
