//! [`Handler`] abstraction.
//!
//! Commands, queries and storage operations are all expressed as a
//! [`Handler`] implemented for an argument type, so that a single
//! `execute()` call site dispatches on what is being asked.

use std::future::Future;

/// Something able to handle `Args` asynchronously.
pub trait Handler<Args = ()> {
    /// Successful outcome of handling `Args`.
    type Ok;

    /// Error of handling `Args`.
    type Err;

    /// Handles the provided `args`.
    fn execute(
        &self,
        args: Args,
    ) -> impl Future<Output = Result<Self::Ok, Self::Err>>;
}
