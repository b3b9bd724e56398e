/// Declare a parameter struct.
///
/// Every field becomes a public slot. A field with `= default` is optional,
/// one without is mandatory. The default takes the field's type, so
/// floating-point fields need a floating-point literal (`5.0`, not `5`);
/// string fields also accept a `&str`. Doc comments become the slot
/// description and `#[param(...)]` takes the slot options: `min = ..`,
/// `max = ..`, `constant`, `configurable` and `global`. Doc comments go
/// before `#[param(...)]`.
///
/// The node namespaces are kept in a hidden field named `__base`, so no slot
/// may use that name.
///
/// The struct gets `Debug`, `Clone`, `Display` and a
/// [`Parameters`](crate::Parameters) implementation.
///
/// ```
/// use rosparam_handler::{MemoryRegistry, NodeIdentity, Parameters};
///
/// rosparam_handler::parameters! {
///     pub struct PlannerParameters {
///         /// Detection threshold
///         #[param(min = 0.0, max = 10.0)]
///         threshold: f64 = 5.0,
///         /// Operating mode
///         mode: String,
///     }
/// }
///
/// let registry = MemoryRegistry::with_entries([("/planner/mode", "fast")]);
/// let node = NodeIdentity::new("planner", "/").unwrap();
/// let mut params = PlannerParameters::new(&node);
/// params.from_param_server(&registry).unwrap();
/// assert_eq!(params.mode, "fast");
/// assert_eq!(params.threshold, 5.0);
/// ```
#[macro_export]
macro_rules! parameters {
    (
        $(#[$meta:meta])*
        $vis:vis struct $Name:ident {
            $(
                $(#[doc = $doc:literal])*
                $(#[param($($opt:ident $(= $v:expr)?),* $(,)?)])?
                $field:ident : $ty:ty $(= $default:expr)?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        $vis struct $Name {
            $(
                $(#[doc = $doc])*
                pub $field: $ty,
            )*
            __base: $crate::ParametersBase,
        }

        impl $Name {
            /// Slot declarations in field order.
            pub fn slot_specs() -> ::std::vec::Vec<$crate::SlotSpec> {
                ::std::vec![
                    $(
                        $crate::SlotSpec::new(
                            ::std::stringify!($field),
                            <$ty as $crate::Param>::TYPE,
                        )
                        $(.describe($doc))*
                        $(.default_value::<$ty>(
                            <_ as $crate::SlotDefault<$ty>>::into_slot($default)
                        ))?
                        $($(.$opt($($v)?))*)?
                    ),*
                ]
            }

            /// A struct holding the declared defaults, not yet loaded.
            pub fn new(node: &$crate::NodeIdentity) -> Self {
                #[allow(unused_mut, unused_variables)]
                let mut specs = Self::slot_specs().into_iter();
                Self {
                    $(
                        $field: specs
                            .next()
                            .and_then(|spec| spec.default_as::<$ty>())
                            .unwrap_or_default(),
                    )*
                    __base: $crate::ParametersBase::new(node),
                }
            }
        }

        impl ::std::fmt::Display for $Name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                ::std::write!(
                    f,
                    "[{}]\nNode {} has the following parameters:",
                    self.__base.node_name,
                    self.__base.node_name
                )?;
                #[allow(unused_mut, unused_variables)]
                let mut specs = Self::slot_specs().into_iter();
                $(
                    if let Some(spec) = specs.next() {
                        ::std::write!(
                            f,
                            "\n\t{}: {}",
                            self.__base.key(&spec),
                            <$ty as $crate::Param>::to_value(&self.$field)
                        )?;
                    }
                )*
                Ok(())
            }
        }

        impl $crate::Parameters for $Name {
            fn base(&self) -> &$crate::ParametersBase {
                &self.__base
            }

            fn slots(&self) -> ::std::vec::Vec<$crate::SlotSpec> {
                Self::slot_specs()
            }

            fn load(&mut self, loader: &mut $crate::ParamLoader<'_>) {
                #[allow(unused_mut, unused_variables)]
                let mut specs = Self::slot_specs().into_iter();
                $(
                    if let Some(spec) = specs.next() {
                        if let Some(value) = loader.load::<$ty>(&self.__base.key(&spec), &spec) {
                            self.$field = value;
                        }
                    }
                )*
            }

            fn to_param_server(&self, registry: &dyn $crate::Registry) {
                #[allow(unused_mut, unused_variables)]
                let mut specs = Self::slot_specs().into_iter();
                $(
                    if let Some(spec) = specs.next() {
                        self.__base.store(
                            registry,
                            &spec,
                            <$ty as $crate::Param>::to_value(&self.$field),
                        );
                    }
                )*
            }

            fn from_config_impl(&mut self, config: &dyn $crate::ReconfigureConfig, _level: u32) {
                #[allow(unused_mut, unused_variables)]
                let mut specs = Self::slot_specs().into_iter();
                $(
                    if let Some(spec) = specs.next() {
                        if let Some(value) = $crate::reconfigure::read_field::<$ty>(config, &spec) {
                            self.$field = value;
                        }
                    }
                )*
            }
        }
    };
}
