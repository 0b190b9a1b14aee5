//! Partial-update helpers.
//!
//! Update endpoints overwrite a stored field only when the supplied value
//! is "truthy": a non-empty string or a non-zero number. Arrays and
//! objects count as truthy whenever they are present, even when empty.
//! A falsy value such as `deliveryFee: 0` is treated as not provided.

/// Values that can be tested for truthiness.
pub trait Truthy {
    fn is_truthy(&self) -> bool;
}

impl Truthy for String {
    fn is_truthy(&self) -> bool {
        !self.is_empty()
    }
}

impl Truthy for f64 {
    fn is_truthy(&self) -> bool {
        *self != 0.0 && !self.is_nan()
    }
}

impl Truthy for u32 {
    fn is_truthy(&self) -> bool {
        *self != 0
    }
}

impl Truthy for u8 {
    fn is_truthy(&self) -> bool {
        *self != 0
    }
}

impl<T> Truthy for Vec<T> {
    fn is_truthy(&self) -> bool {
        true
    }
}

/// Implement [`Truthy`] for object-shaped types, which are always truthy.
#[macro_export]
macro_rules! always_truthy {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::models::patch::Truthy for $ty {
                fn is_truthy(&self) -> bool {
                    true
                }
            }
        )+
    };
}

/// Overwrite `slot` with `update` when it is present and truthy.
pub fn overwrite_if_truthy<T: Truthy>(slot: &mut T, update: Option<T>) {
    if let Some(value) = update {
        if value.is_truthy() {
            *slot = value;
        }
    }
}

/// Same as [`overwrite_if_truthy`] for optional stored fields.
pub fn overwrite_opt_if_truthy<T: Truthy>(slot: &mut Option<T>, update: Option<T>) {
    if let Some(value) = update {
        if value.is_truthy() {
            *slot = Some(value);
        }
    }
}
