// src/aspects.rs
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::rc::Rc;

/// Capability objects associated with a hand, keyed by their concrete type.
///
/// The registry holds shared handles only; whoever registered an aspect
/// decides its lifetime.
#[derive(Default)]
pub struct AspectRegistry {
    aspects: HashMap<TypeId, Rc<dyn Any>>,
}

impl AspectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `aspect` under its type, returning the one it replaced.
    pub fn register<T: Any>(&mut self, aspect: Rc<T>) -> Option<Rc<dyn Any>> {
        tracing::debug!("Registering hand aspect {}", std::any::type_name::<T>());
        self.aspects.insert(TypeId::of::<T>(), aspect)
    }

    pub fn remove<T: Any>(&mut self) -> Option<Rc<T>> {
        self.aspects
            .remove(&TypeId::of::<T>())
            .and_then(|a| a.downcast::<T>().ok())
    }

    pub fn get<T: Any>(&self) -> Option<Rc<T>> {
        self.find(TypeId::of::<T>())
            .and_then(|a| a.downcast::<T>().ok())
    }

    pub fn find(&self, type_id: TypeId) -> Option<Rc<dyn Any>> {
        self.aspects.get(&type_id).cloned()
    }

    pub fn contains<T: Any>(&self) -> bool {
        self.aspects.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.aspects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aspects.is_empty()
    }
}

impl std::fmt::Debug for AspectRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AspectRegistry")
            .field("count", &self.aspects.len())
            .finish()
    }
}
