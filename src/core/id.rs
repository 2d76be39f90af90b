//! Validated machine and state identifiers.
//!
//! An identifier is non-empty, contains no `:` (the separator used in full
//! state names such as `Parser:Start`) and does not start with `__`, which is
//! reserved for the library's own machines and placeholder states.
//!
//! Literal identifiers can be checked at compile time through the
//! [`machine_id!`](crate::machine_id) and [`state_id!`](crate::state_id)
//! macros; everything else is checked when the builder receives it.

use crate::builder::BuildError;
use std::borrow::Cow;
use std::fmt;

/// Name of the main machine. Its entry state always compiles to index 0.
pub const MAIN_MACHINE_NAME: &str = "__main__";

/// Name of the dedicated error machine.
pub const ERROR_MACHINE_NAME: &str = "__error__";

/// Placeholder state name standing in for "the main machine's entry state"
/// until the builder is finalized.
pub const RESTART_STATE_NAME: &str = "__restart__";

/// Separator between machine and state in a full state name.
pub const FULL_NAME_SEPARATOR: char = ':';

pub(crate) const RESTART_PLACEHOLDER: &str = "__error__:__restart__";

/// Reason an identifier was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierViolation {
    Empty,
    ContainsSeparator,
    Reserved,
}

/// Check an identifier. Usable in const contexts.
pub const fn identifier_violation(name: &str) -> Option<IdentifierViolation> {
    let bytes = name.as_bytes();
    if bytes.is_empty() {
        return Some(IdentifierViolation::Empty);
    }
    if bytes.len() >= 2 && bytes[0] == b'_' && bytes[1] == b'_' {
        return Some(IdentifierViolation::Reserved);
    }

    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b':' {
            return Some(IdentifierViolation::ContainsSeparator);
        }
        i += 1;
    }

    None
}

fn check_identifier(name: &str) -> Result<(), BuildError> {
    match identifier_violation(name) {
        None => Ok(()),
        Some(IdentifierViolation::Empty) => Err(BuildError::EmptyIdentifier),
        Some(IdentifierViolation::ContainsSeparator) => Err(BuildError::InvalidIdentifier {
            name: name.to_string(),
        }),
        Some(IdentifierViolation::Reserved) => Err(BuildError::ReservedIdentifier {
            name: name.to_string(),
        }),
    }
}

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident, $into:ident, $into_fn:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(Cow<'static, str>);

        impl $name {
            /// Validate a runtime name.
            pub fn new(name: impl Into<String>) -> Result<Self, BuildError> {
                let name = name.into();
                check_identifier(&name)?;
                Ok(Self(Cow::Owned(name)))
            }

            /// Validate a static name, panicking when it is invalid.
            ///
            /// Evaluated in a const item (as the literal macros do), an
            /// invalid name becomes a compile error.
            pub const fn from_static(name: &'static str) -> Self {
                match identifier_violation(name) {
                    None => Self(Cow::Borrowed(name)),
                    Some(IdentifierViolation::Empty) => panic!("identifier must not be empty"),
                    Some(IdentifierViolation::ContainsSeparator) => {
                        panic!("identifier must not contain ':'")
                    }
                    Some(IdentifierViolation::Reserved) => {
                        panic!("identifiers starting with '__' are reserved")
                    }
                }
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        /// Anything the builder accepts in place of a validated identifier.
        pub trait $into {
            fn $into_fn(self) -> Result<$name, BuildError>;
        }

        impl $into for $name {
            fn $into_fn(self) -> Result<$name, BuildError> {
                Ok(self)
            }
        }

        impl $into for &$name {
            fn $into_fn(self) -> Result<$name, BuildError> {
                Ok(self.clone())
            }
        }

        impl $into for &str {
            fn $into_fn(self) -> Result<$name, BuildError> {
                $name::new(self)
            }
        }

        impl $into for String {
            fn $into_fn(self) -> Result<$name, BuildError> {
                $name::new(self)
            }
        }

        impl $into for &String {
            fn $into_fn(self) -> Result<$name, BuildError> {
                $name::new(self.as_str())
            }
        }
    };
}

identifier!(
    /// Name of a user-declared submachine.
    MachineId,
    IntoMachineId,
    into_machine_id
);

identifier!(
    /// Name of a state, unique within its machine.
    StateId,
    IntoStateId,
    into_state_id
);

/// Join a machine and a state name into a full state name.
pub fn full_state_name(machine: &str, state: &str) -> String {
    format!("{machine}{FULL_NAME_SEPARATOR}{state}")
}

/// Split a full state name at its first separator.
pub fn split_full_state_name(full_name: &str) -> Result<(&str, &str), BuildError> {
    full_name
        .split_once(FULL_NAME_SEPARATOR)
        .ok_or_else(|| BuildError::InvalidFullStateName {
            name: full_name.to_string(),
        })
}
