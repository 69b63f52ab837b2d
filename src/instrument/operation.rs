//! Operation and Layer traits
//!
//! An [`Operation`] turns an input into a result; a [`Layer`] wraps one
//! operation in another to add behavior around it.

use std::sync::Arc;

use crate::error::Result;

// == Operation ==
/// A blocking, fallible call that middleware can wrap.
pub trait Operation<In>: Send + Sync {
    /// The value produced on success.
    type Out;

    /// Runs the operation.
    fn invoke(&self, input: In) -> Result<Self::Out>;
}

impl<S, In> Operation<In> for Box<S>
where
    S: Operation<In> + ?Sized,
{
    type Out = S::Out;

    fn invoke(&self, input: In) -> Result<Self::Out> {
        (**self).invoke(input)
    }
}

impl<S, In> Operation<In> for Arc<S>
where
    S: Operation<In> + ?Sized,
{
    type Out = S::Out;

    fn invoke(&self, input: In) -> Result<Self::Out> {
        (**self).invoke(input)
    }
}

// == Execute ==
/// Turns a closure into an [`Operation`].
///
/// ```
/// use call_cache::instrument::{Execute, Operation};
///
/// let double = Execute::new(|x: i64| Ok(x * 2));
/// assert_eq!(double.invoke(21).unwrap(), 42);
/// ```
#[derive(Clone)]
pub struct Execute<F>(F);

impl<F> Execute<F> {
    pub fn new<In, Out>(f: F) -> Self
    where
        F: Fn(In) -> Result<Out> + Send + Sync,
    {
        Self(f)
    }
}

impl<F, In, Out> Operation<In> for Execute<F>
where
    F: Fn(In) -> Result<Out> + Send + Sync,
{
    type Out = Out;

    fn invoke(&self, input: In) -> Result<Out> {
        (self.0)(input)
    }
}

// == Layer ==
/// Builds middleware around an inner operation.
pub trait Layer<S> {
    /// The middleware produced.
    type Operation;

    fn layer(&self, inner: S) -> Self::Operation;
}
