//! Macros for identifiers checked at compile time.

/// Create a [`MachineId`](crate::core::MachineId) from a literal, validated
/// during constant evaluation.
///
/// # Example
///
/// ```
/// use hfsm::machine_id;
///
/// let parser = machine_id!("Parser");
/// assert_eq!(parser.as_str(), "Parser");
/// ```
///
/// An invalid literal does not compile:
///
/// ```compile_fail
/// let reserved = hfsm::machine_id!("__main__");
/// ```
#[macro_export]
macro_rules! machine_id {
    ($name:literal) => {{
        const ID: $crate::core::MachineId = $crate::core::MachineId::from_static($name);
        ID
    }};
}

/// Create a [`StateId`](crate::core::StateId) from a literal, validated
/// during constant evaluation.
///
/// # Example
///
/// ```
/// use hfsm::state_id;
///
/// let start = state_id!("Start");
/// assert_eq!(start.to_string(), "Start");
/// ```
///
/// ```compile_fail
/// let empty = hfsm::state_id!("");
/// ```
#[macro_export]
macro_rules! state_id {
    ($name:literal) => {{
        const ID: $crate::core::StateId = $crate::core::StateId::from_static($name);
        ID
    }};
}
