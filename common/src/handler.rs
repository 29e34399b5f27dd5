//! [`Handler`] abstractions.

use std::{future::Future, rc::Rc, sync::Arc};

/// Executable handler of an operation described by `Args`.
///
/// Backends, databases, commands and queries are all [`Handler`]s of their
/// own operation types, so a single type may handle many operations.
pub trait Handler<Args = ()> {
    /// Type of successful [`Handler`] result.
    type Ok;

    /// Type of this [`Handler`] error.
    type Err;

    /// Executes this [`Handler`] with the provided arguments.
    fn execute(
        &self,
        args: Args,
    ) -> impl Future<Output = Result<Self::Ok, Self::Err>>;
}

impl<Args, H: Handler<Args> + ?Sized> Handler<Args> for &H {
    type Ok = H::Ok;
    type Err = H::Err;

    fn execute(
        &self,
        args: Args,
    ) -> impl Future<Output = Result<Self::Ok, Self::Err>> {
        (**self).execute(args)
    }
}

impl<Args, H: Handler<Args> + ?Sized> Handler<Args> for Rc<H> {
    type Ok = H::Ok;
    type Err = H::Err;

    fn execute(
        &self,
        args: Args,
    ) -> impl Future<Output = Result<Self::Ok, Self::Err>> {
        (**self).execute(args)
    }
}

impl<Args, H: Handler<Args> + ?Sized> Handler<Args> for Arc<H> {
    type Ok = H::Ok;
    type Err = H::Err;

    fn execute(
        &self,
        args: Args,
    ) -> impl Future<Output = Result<Self::Ok, Self::Err>> {
        (**self).execute(args)
    }
}
