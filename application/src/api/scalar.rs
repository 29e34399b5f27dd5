//! Helpers for GraphQL scalars.

use std::{fmt, marker::PhantomData, str::FromStr};

use juniper::{
    GraphQLType, InputValue, ParseScalarResult, ParseScalarValue, ScalarToken,
    ScalarValue, Value,
};

/// Adapter for `#[graphql(with = ..)]` attribute, representing a scalar as a
/// GraphQL string.
///
/// The string is produced with the [`Display`] impl of the `As` type the
/// scalar wraps, and parsed back with its [`FromStr`] impl, so the target type
/// must implement [`AsRef`] and [`TryFrom`] for `As`.
///
/// [`Display`]: fmt::Display
#[derive(Debug)]
pub struct Via<As>(PhantomData<As>);

impl<As> Via<As> {
    /// Outputs the provided `value` as a GraphQL string.
    pub fn to_output<T, S>(value: &T) -> Value<S>
    where
        As: fmt::Display,
        T: AsRef<As>,
        S: ScalarValue,
    {
        Value::scalar(value.as_ref().to_string())
    }

    /// Parses the target type out of the provided GraphQL string.
    ///
    /// # Errors
    ///
    /// If the `input` is not a string, or doesn't represent a valid `As`
    /// value, or the target type rejects it.
    pub fn from_input<T, S>(input: &InputValue<S>) -> Result<T, String>
    where
        As: FromStr,
        As::Err: fmt::Display,
        T: TryFrom<As> + GraphQLType<S, TypeInfo = ()>,
        T::Error: fmt::Display,
        S: ScalarValue,
    {
        let name = T::name(&()).unwrap_or("scalar");
        let raw = input.as_string_value().ok_or_else(|| {
            format!("`{name}` expects a string, found: {input}")
        })?;
        let parsed = raw.parse::<As>().map_err(|e| {
            format!("`{name}` cannot be parsed from \"{raw}\": {e}")
        })?;
        T::try_from(parsed).map_err(|e| format!("`{name}` is invalid: {e}"))
    }

    /// Parses the provided [`ScalarToken`] as a string.
    ///
    /// # Errors
    ///
    /// If the token is not a string.
    pub fn parse_token<S: ScalarValue>(
        token: ScalarToken<'_>,
    ) -> ParseScalarResult<S> {
        <String as ParseScalarValue<S>>::from_str(token)
    }
}
