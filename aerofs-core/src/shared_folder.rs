use std::fmt;

use crate::object::ApiObject;

/// Reference to a shared folder by its share id. Shared-folder management is
/// not modelled beyond the reference itself.
pub struct SharedFolder<'a, A: ?Sized> {
    object: ApiObject<'a, A>,
    id: String,
}

impl<'a, A: ?Sized> SharedFolder<'a, A> {
    pub fn referenced(api: &'a A, id: impl Into<String>) -> Self {
        Self {
            object: ApiObject::new(api),
            id: id.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn api(&self) -> &'a A {
        self.object.api()
    }
}

impl<A: ?Sized> PartialEq for SharedFolder<'_, A> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<A: ?Sized> fmt::Debug for SharedFolder<'_, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedFolder").field("id", &self.id).finish()
    }
}
