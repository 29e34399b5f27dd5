//! [`DateTime`] definitions.

#[cfg(feature = "postgres")]
use std::error::Error as StdError;
use std::{cmp::Ordering, marker::PhantomData, ops, time::Duration};

use derive_more::Debug;
#[cfg(feature = "postgres")]
use postgres_types::{
    accepts, private::BytesMut, to_sql_checked, FromSql, IsNull, ToSql, Type,
};
use time::{
    format_description::well_known::Rfc3339, macros::format_description,
    OffsetDateTime, UtcOffset,
};

/// [`DateTimeOf`] not bound to any particular event.
pub type DateTime = DateTimeOf;

/// Moment in UTC, precise up to microseconds.
///
/// `Of` tells which event the moment marks (creation of an entity, expiration
/// of a session, etc.), so moments of different events are not mixed up
/// unnoticed. [`DateTimeOf::coerce()`] turns one into another explicitly.
#[derive(Debug)]
pub struct DateTimeOf<Of: ?Sized = ()> {
    /// Moment itself, always in UTC and truncated to microseconds.
    utc: OffsetDateTime,

    /// Event this moment marks.
    #[debug(skip)]
    of: PhantomData<Of>,
}

impl<Of: ?Sized> DateTimeOf<Of> {
    /// Unix epoch (`1970-01-01T00:00:00Z`).
    pub const UNIX_EPOCH: Self = Self::wrap(OffsetDateTime::UNIX_EPOCH);

    /// Wraps the provided moment, which must be in UTC and truncated to
    /// microseconds already.
    const fn wrap(utc: OffsetDateTime) -> Self {
        Self {
            utc,
            of: PhantomData,
        }
    }

    /// Returns the current moment.
    #[must_use]
    pub fn now() -> Self {
        OffsetDateTime::now_utc().into()
    }

    /// Returns the moment the provided number of seconds after the
    /// [`UNIX_EPOCH`].
    ///
    /// [`None`] is returned if the moment is out of the supported range.
    ///
    /// [`UNIX_EPOCH`]: Self::UNIX_EPOCH
    #[must_use]
    pub fn from_unix_timestamp(secs: i64) -> Option<Self> {
        OffsetDateTime::from_unix_timestamp(secs).ok().map(Self::wrap)
    }

    /// Returns the number of whole seconds passed since the [`UNIX_EPOCH`].
    ///
    /// [`UNIX_EPOCH`]: Self::UNIX_EPOCH
    #[must_use]
    pub fn unix_timestamp(&self) -> i64 {
        self.utc.unix_timestamp()
    }

    /// Parses the moment out of the provided [RFC 3339] string.
    ///
    /// # Errors
    ///
    /// If the `input` is not an [RFC 3339] date and time.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    pub fn from_rfc3339(input: &str) -> Result<Self, time::error::Parse> {
        OffsetDateTime::parse(input, &Rfc3339).map(Into::into)
    }

    /// Formats this moment as an [RFC 3339] string.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    #[must_use]
    pub fn to_rfc3339(&self) -> String {
        self.utc.format(&Rfc3339).unwrap_or_else(|e| {
            unreachable!("UTC moment is always RFC 3339 formattable: {e}")
        })
    }

    /// Formats this moment as a short `YYYY-MM-DD HH:MM` string in the
    /// provided [`UtcOffset`].
    #[must_use]
    pub fn to_short_string_at(&self, offset: UtcOffset) -> String {
        self.utc
            .to_offset(offset)
            .format(format_description!("[year]-[month]-[day] [hour]:[minute]"))
            .unwrap_or_else(|e| {
                unreachable!("short format has no fallible components: {e}")
            })
    }

    /// Returns the hour of the day (`0..=23`) of this moment in the provided
    /// [`UtcOffset`].
    #[must_use]
    pub fn hour_at(&self, offset: UtcOffset) -> u8 {
        self.utc.to_offset(offset).hour()
    }

    /// Marks this moment as the one of another event.
    #[must_use]
    pub fn coerce<NewOf: ?Sized>(self) -> DateTimeOf<NewOf> {
        DateTimeOf::wrap(self.utc)
    }
}

impl<Of: ?Sized> Copy for DateTimeOf<Of> {}
impl<Of: ?Sized> Clone for DateTimeOf<Of> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Of: ?Sized> Eq for DateTimeOf<Of> {}
impl<Of: ?Sized> PartialEq for DateTimeOf<Of> {
    fn eq(&self, other: &Self) -> bool {
        self.utc == other.utc
    }
}

impl<Of: ?Sized> Ord for DateTimeOf<Of> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.utc.cmp(&other.utc)
    }
}
impl<Of: ?Sized> PartialOrd for DateTimeOf<Of> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<Of: ?Sized> From<OffsetDateTime> for DateTimeOf<Of> {
    /// Converts the provided moment into UTC, dropping its nanoseconds.
    fn from(dt: OffsetDateTime) -> Self {
        let nanos = i64::from(dt.nanosecond() % 1_000);
        Self::wrap(
            dt.to_offset(UtcOffset::UTC) - time::Duration::nanoseconds(nanos),
        )
    }
}

impl<Of: ?Sized> From<DateTimeOf<Of>> for OffsetDateTime {
    fn from(dt: DateTimeOf<Of>) -> Self {
        dt.utc
    }
}

impl<Of: ?Sized> ops::Add<Duration> for DateTimeOf<Of> {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self {
        (self.utc + rhs).into()
    }
}

impl<Of: ?Sized> ops::Sub<Duration> for DateTimeOf<Of> {
    type Output = Self;

    fn sub(self, rhs: Duration) -> Self {
        (self.utc - rhs).into()
    }
}

impl<Of: ?Sized> ops::Sub for DateTimeOf<Of> {
    type Output = Duration;

    /// Returns the time passed from `rhs` till `self`.
    ///
    /// Saturates to [`Duration::ZERO`] if `rhs` is later than `self`.
    fn sub(self, rhs: Self) -> Duration {
        Duration::try_from(self.utc - rhs.utc).unwrap_or(Duration::ZERO)
    }
}

#[cfg(feature = "postgres")]
impl<Of: ?Sized> FromSql<'_> for DateTimeOf<Of> {
    accepts!(TIMESTAMPTZ);

    fn from_sql(
        ty: &Type,
        raw: &[u8],
    ) -> Result<Self, Box<dyn StdError + Sync + Send>> {
        Ok(OffsetDateTime::from_sql(ty, raw)?.into())
    }
}

#[cfg(feature = "postgres")]
impl<Of: ?Sized> ToSql for DateTimeOf<Of> {
    accepts!(TIMESTAMPTZ);
    to_sql_checked!();

    fn to_sql(
        &self,
        ty: &Type,
        w: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn StdError + Sync + Send>> {
        self.utc.to_sql(ty, w)
    }
}

#[cfg(feature = "serde")]
pub mod serde {
    //! [`serde`] representations of a [`DateTimeOf`].

    pub mod unix_timestamp {
        //! [`DateTimeOf`] as a number of seconds since the Unix epoch, like the
        //! `exp` claim of a JSON Web Token.

        use serde::{de, Deserialize as _, Deserializer, Serializer};

        use crate::DateTimeOf;

        /// Serializes the provided [`DateTimeOf`] as a Unix timestamp.
        ///
        /// # Errors
        ///
        /// If the `serializer` fails.
        pub fn serialize<Of, S>(
            dt: &DateTimeOf<Of>,
            serializer: S,
        ) -> Result<S::Ok, S::Error>
        where
            Of: ?Sized,
            S: Serializer,
        {
            serializer.serialize_i64(dt.unix_timestamp())
        }

        /// Deserializes a [`DateTimeOf`] from a Unix timestamp.
        ///
        /// # Errors
        ///
        /// If the timestamp is not an integer, or is out of range.
        pub fn deserialize<'de, Of, D>(
            deserializer: D,
        ) -> Result<DateTimeOf<Of>, D::Error>
        where
            Of: ?Sized,
            D: Deserializer<'de>,
        {
            let secs = i64::deserialize(deserializer)?;
            DateTimeOf::from_unix_timestamp(secs).ok_or_else(|| {
                de::Error::custom(format!("timestamp {secs} is out of range"))
            })
        }
    }
}

#[cfg(feature = "juniper")]
mod juniper {
    //! [`juniper`] scalar of a [`DateTime`].
    //!
    //! [`DateTime`]: crate::DateTime

    use juniper::{graphql_scalar, InputValue, ScalarValue, Value};

    /// Moment in [RFC 3339] format, precise up to microseconds.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    #[graphql_scalar(with = Self, parse_token(String))]
    type DateTime = crate::DateTime;

    impl DateTime {
        fn to_output<S: ScalarValue>(dt: &DateTime) -> Value<S> {
            Value::scalar(dt.to_rfc3339())
        }

        fn from_input<S: ScalarValue>(
            input: &InputValue<S>,
        ) -> Result<Self, String> {
            let s = input.as_string_value().ok_or_else(|| {
                format!("`DateTime` expects an RFC 3339 string, found: {input}")
            })?;
            Self::from_rfc3339(s)
                .map_err(|e| format!("`DateTime` cannot be parsed: {e}"))
        }
    }
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use time::{macros::datetime, OffsetDateTime, UtcOffset};

    use super::DateTime;

    #[test]
    fn formats_short_string() {
        let dt = DateTime::from_rfc3339("2024-03-05T07:09:11.123456Z").unwrap();

        assert_eq!(dt.to_short_string_at(UtcOffset::UTC), "2024-03-05 07:09");
        assert_eq!(
            dt.to_short_string_at(UtcOffset::from_hms(-8, 0, 0).unwrap()),
            "2024-03-04 23:09",
        );
    }

    #[test]
    fn round_trips_rfc3339_with_microseconds() {
        let dt = DateTime::from_rfc3339("2024-03-05T07:09:11.123456Z").unwrap();

        assert_eq!(dt.to_rfc3339(), "2024-03-05T07:09:11.123456Z");
        assert!(DateTime::from_rfc3339("yesterday").is_err());
    }

    #[test]
    fn drops_nanoseconds_and_offset() {
        let dt = DateTime::from(datetime!(2024-03-05 09:09:11.123456789 +2));

        assert_eq!(
            OffsetDateTime::from(dt),
            datetime!(2024-03-05 07:09:11.123456 UTC),
        );
    }

    #[test]
    fn subtraction_saturates_at_zero() {
        let earlier = DateTime::from_unix_timestamp(100).unwrap();
        let later = earlier + Duration::from_secs(30);

        assert_eq!(later - earlier, Duration::from_secs(30));
        assert_eq!(earlier - later, Duration::ZERO);
        assert_eq!(later - Duration::from_secs(30), earlier);
    }

    #[test]
    fn hour_respects_offset() {
        let dt = DateTime::from_rfc3339("2024-03-05T23:30:00Z").unwrap();

        assert_eq!(dt.hour_at(UtcOffset::UTC), 23);
        assert_eq!(dt.hour_at(UtcOffset::from_hms(2, 0, 0).unwrap()), 1);
    }
}
