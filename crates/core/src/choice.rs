//! String-backed enumerations with a fixed value set.
//!
//! [`define_choice_enum!`] generates an enum whose wire form is a fixed
//! string per variant, together with `as_str`, `from_str_value`, the full
//! `VALUES` list, and serde impls that reject anything outside the set.

macro_rules! define_choice_enum {
    (
        $(#[$meta:meta])*
        $name:ident ($label:literal) {
            $( $(#[$vmeta:meta])* $variant:ident => $val:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Every accepted wire value, in declaration order.
            pub const VALUES: &'static [&'static str] = &[$($val),+];

            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Convert to the wire / database string value.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( Self::$variant => $val ),+
                }
            }

            /// Parse from the wire string value.
            pub fn from_str_value(s: &str) -> Result<Self, String> {
                match s {
                    $( $val => Ok(Self::$variant), )+
                    _ => Err(format!(
                        "Invalid {} '{s}'. Must be one of: {}",
                        $label,
                        Self::VALUES.join(", ")
                    )),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = <String as serde::Deserialize>::deserialize(deserializer)?;
                Self::from_str_value(&raw).map_err(serde::de::Error::custom)
            }
        }
    };
}

pub(crate) use define_choice_enum;

#[cfg(test)]
mod tests {
    define_choice_enum! {
        Flavour ("flavour") {
            Plain => "plain",
            Spicy => "extra-spicy",
        }
    }

    #[test]
    fn test_round_trip_through_strings() {
        assert_eq!(Flavour::Spicy.as_str(), "extra-spicy");
        assert_eq!(Flavour::from_str_value("plain"), Ok(Flavour::Plain));
        assert_eq!(Flavour::VALUES, &["plain", "extra-spicy"]);
        assert_eq!(Flavour::ALL.len(), 2);
    }

    #[test]
    fn test_unknown_value_lists_choices() {
        let err = Flavour::from_str_value("mild").unwrap_err();
        assert_eq!(err, "Invalid flavour 'mild'. Must be one of: plain, extra-spicy");
    }

    #[test]
    fn test_serde_uses_wire_value() {
        let json = serde_json::to_value(Flavour::Spicy).unwrap();
        assert_eq!(json, serde_json::json!("extra-spicy"));
        let parsed: Result<Flavour, _> = serde_json::from_value(serde_json::json!("hot"));
        assert!(parsed.is_err());
    }
}
