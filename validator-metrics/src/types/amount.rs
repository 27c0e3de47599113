//! Exact token amounts as returned by the Cosmos SDK REST API.
//!
//! Bank balances and validator tokens are serialized as integer strings
//! (`sdk.Int`), while commission and rewards are decimal strings with up to
//! 18 fractional digits (`sdk.Dec`). Both are parsed into [`Amount`], an
//! arbitrary precision count of 10^-18 units, so summing many reward entries
//! never loses precision whatever the token's decimals.

use std::fmt;
use std::ops::Add;
use std::str::FromStr;

use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};
use thiserror::Error;

/// Number of fractional digits carried by an `sdk.Dec`.
pub const DEC_PRECISION: u32 = 18;

/// Largest exponent accepted by [`Amount::scaled`].
pub const MAX_EXPONENT: u32 = 38;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("empty amount")]
    Empty,

    #[error("malformed amount: {0:?}")]
    Malformed(String),

    #[error("amount out of range: {0}")]
    Overflow(String),

    #[error("exponent {0} is too large to scale by")]
    ExponentTooLarge(u32),
}

/// Non-negative token amount in the chain's smallest unit.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(BigUint);

fn dec_scale() -> BigUint {
    BigUint::from(10u32).pow(DEC_PRECISION)
}

impl Amount {
    /// Zero value
    pub fn zero() -> Self {
        Self(BigUint::zero())
    }

    /// Builds an amount with no fractional part.
    pub fn from_whole(whole: u128) -> Self {
        Self(BigUint::from(whole) * dec_scale())
    }

    /// Parses `"123"` or `"123.456"`.
    ///
    /// Fractional digits beyond [`DEC_PRECISION`] are truncated. Signs,
    /// exponents and whitespace are rejected.
    pub fn parse(raw: &str) -> Result<Self, AmountError> {
        if raw.is_empty() {
            return Err(AmountError::Empty);
        }

        let (whole_str, frac_str) = match raw.split_once('.') {
            Some((w, f)) => (w, f),
            None => (raw, ""),
        };

        if whole_str.is_empty() || !is_digits(whole_str) || !is_digits(frac_str) {
            return Err(AmountError::Malformed(raw.to_string()));
        }
        if raw.contains('.') && frac_str.is_empty() {
            return Err(AmountError::Malformed(raw.to_string()));
        }

        let kept = &frac_str[..frac_str.len().min(DEC_PRECISION as usize)];
        let mut digits = String::with_capacity(whole_str.len() + DEC_PRECISION as usize);
        digits.push_str(whole_str);
        digits.push_str(kept);
        digits.extend(std::iter::repeat_n('0', DEC_PRECISION as usize - kept.len()));

        digits
            .parse::<BigUint>()
            .map(Self)
            .map_err(|_| AmountError::Malformed(raw.to_string()))
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Converts from the smallest unit to the display unit:
    /// `floor(amount / 10^exponent)`.
    ///
    /// Fails if the result does not fit a `u128`.
    pub fn scaled(&self, exponent: u32) -> Result<u128, AmountError> {
        if exponent > MAX_EXPONENT {
            return Err(AmountError::ExponentTooLarge(exponent));
        }
        let divisor = BigUint::from(10u32).pow(DEC_PRECISION + exponent);
        (&self.0 / divisor)
            .to_u128()
            .ok_or_else(|| AmountError::Overflow(self.to_string()))
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, other: Amount) -> Amount {
        Self(self.0 + other.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Amount::parse(s)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scale = dec_scale();
        let whole = &self.0 / &scale;
        let frac = &self.0 % &scale;
        if frac.is_zero() {
            return write!(f, "{whole}");
        }
        let frac = format!("{:0>18}", frac.to_string());
        write!(f, "{whole}.{}", frac.trim_end_matches('0'))
    }
}

fn is_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}
