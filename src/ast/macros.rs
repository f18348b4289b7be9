macro_rules! impl_from {
    ($(($to:ty, $from:ty, $fn:expr),)*) => {
        $(
            impl From<$from> for $to {
                fn from(val: $from) -> Self {
                    $fn(val)
                }
            }
        )*
    }
}

/// Generates accessors on a closed enum that forward to a field shared by
/// every variant's payload.
macro_rules! impl_delegators {
    (
        enum $enum_name:ident {
            $(
                $constr_name:ident($subtype:ty),
            )*
        }
        $field_name:ident: $field_ty:ty,
        $($rest:tt)*
    ) => {
        impl $enum_name {
            pub fn $field_name(&self) -> &$field_ty {
                match self {
                    $(
                        $enum_name::$constr_name(sub) => &sub.$field_name,
                    )*
                }
            }
        }
        impl_delegators!(
            enum $enum_name {
                $($constr_name($subtype),)*
            }
            $($rest)*
        );
    };
    (
        enum $enum_name:ident {
            $($enum_decl_body:tt)*
        }
    ) => {};
}
