//! Boilerplate for string-backed status enums.

/// Implement `as_str`, `ALL`, `Display` and `FromStr` for a fieldless enum
/// whose database and JSON spelling is the given literal.
macro_rules! db_enum_strings {
    ($name:ident, $label:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Return the database/JSON spelling.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = questhub_core::AppError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($text => Ok(Self::$variant),)+
                    _ => {
                        let expected: Vec<&str> = Self::ALL.iter().map(|v| v.as_str()).collect();
                        Err(questhub_core::AppError::validation(format!(
                            "Invalid {}: '{s}'. Expected one of: {}",
                            $label,
                            expected.join(", ")
                        )))
                    }
                }
            }
        }
    };
}

pub(crate) use db_enum_strings;
