//! Type-level markers for the kind of machine being declared.
//!
//! The markers restrict which transitions a state may declare: only the
//! main machine and submachines may call submachines, finish, or escalate
//! into the error machine, and only the error machine may restart.

mod sealed {
    pub trait Sealed {}
}

/// Kind of machine a builder phase is declaring.
pub trait MachineKind: sealed::Sealed + 'static {}

/// Kinds whose states may call submachines, finish, and raise errors.
pub trait CallerKind: MachineKind {}

/// The main machine. Its entry state is where every agent starts.
#[derive(Debug)]
pub enum MainMachine {}

/// A named submachine, callable from machines declared after it.
#[derive(Debug)]
pub enum Submachine {}

/// The dedicated error machine.
#[derive(Debug)]
pub enum ErrorMachine {}

impl sealed::Sealed for MainMachine {}
impl sealed::Sealed for Submachine {}
impl sealed::Sealed for ErrorMachine {}

impl MachineKind for MainMachine {}
impl MachineKind for Submachine {}
impl MachineKind for ErrorMachine {}

impl CallerKind for MainMachine {}
impl CallerKind for Submachine {}
