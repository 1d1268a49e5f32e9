/// Declares a typed wrapper around [`Model`](crate::Model) with one accessor pair per attribute.
///
/// For every listed attribute `name`, the wrapper gets `get_name()` (read through the attribute's
/// getter) and `set_name(value)` (write through its setter). Everything else is reachable via
/// `Deref` to the underlying model, so `id()` still returns the [`Model::id`](crate::Model::id)
/// of the wrapped instance.
///
/// ```rust
/// use resource_model::mock::MockStore;
/// use resource_model::{model_type, ModelClass};
/// use serde_json::json;
///
/// model_type! {
///     /// A car.
///     pub struct Car { id, name, color }
/// }
///
/// let cars = ModelClass::extend(Car::schema().base_url("/cars").build(), MockStore::new());
/// let mut car = Car::from(cars.new_instance(Default::default()));
/// car.set_name("Super Car!");
///
/// assert_eq!(car.get_name(), json!("Super Car!"));
/// assert!(!car.is_pristine());
/// assert!(car.id().is_none());
/// assert_eq!(Car::ATTRIBUTES, ["id", "name", "color"]);
/// ```
#[macro_export]
macro_rules! model_type {
    ($(#[$meta:meta])* $vis:vis struct $name:ident { $($attr:ident),+ $(,)? }) => {
        $(#[$meta])*
        $vis struct $name($crate::Model);

        impl $name {
            /// Declared attribute keys, in order.
            pub const ATTRIBUTES: &'static [&'static str] = &[$(stringify!($attr)),+];

            /// A schema builder with every attribute declared as a raw passthrough.
            pub fn schema() -> $crate::ModelSchemaBuilder {
                $crate::ModelSchema::builder().attributes(Self::ATTRIBUTES.iter().copied())
            }

            pub fn into_inner(self) -> $crate::Model {
                self.0
            }

            $crate::__paste::paste! {
                $(
                    pub fn [<get_ $attr>](&self) -> $crate::Value {
                        self.0.attribute(stringify!($attr))
                    }

                    pub fn [<set_ $attr>](&mut self, value: impl Into<$crate::Value>) {
                        self.0.set_attribute(stringify!($attr), value)
                    }
                )+
            }
        }

        impl From<$crate::Model> for $name {
            fn from(model: $crate::Model) -> Self {
                Self(model)
            }
        }

        impl ::std::ops::Deref for $name {
            type Target = $crate::Model;

            fn deref(&self) -> &$crate::Model {
                &self.0
            }
        }

        impl ::std::ops::DerefMut for $name {
            fn deref_mut(&mut self) -> &mut $crate::Model {
                &mut self.0
            }
        }

        impl ::std::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.debug_tuple(stringify!($name)).field(&self.0).finish()
            }
        }
    };
}
