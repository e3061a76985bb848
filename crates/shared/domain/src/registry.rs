//! Type-erased registry entries for feature slices.
//!
//! Each feature builds its state once at startup and hands it to the kernel as an
//! [`InitializedSlice`]; handlers later look it up by concrete type.

use std::any::{Any, TypeId, type_name};
use std::fmt::Debug;

/// Feature state that can be shared across request handlers.
pub trait FeatureSlice: Any + Debug + Send + Sync {
    /// Upcast used for downcasting back to the concrete slice.
    fn as_any(&self) -> &dyn Any;
}

/// A feature slice ready to be registered in the API state.
#[derive(Debug)]
pub struct InitializedSlice {
    pub id: TypeId,
    /// Type name of the slice, for diagnostics.
    pub name: &'static str,
    pub state: Box<dyn FeatureSlice>,
}

impl InitializedSlice {
    pub fn new<T: FeatureSlice>(state: T) -> Self {
        Self { id: TypeId::of::<T>(), name: type_name::<T>(), state: Box::new(state) }
    }

    /// Returns the slice as `T` when it was built from that type.
    #[must_use]
    pub fn downcast_ref<T: FeatureSlice>(&self) -> Option<&T> {
        self.state.as_any().downcast_ref::<T>()
    }
}
