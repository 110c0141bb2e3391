//! Identifiers interpolated into provider URLs.
//!
//! Profile and transfer identifiers become path segments of the funding endpoint, so they are
//! restricted to characters that never need percent-encoding. The provider issues them as
//! integers; both integer and string forms are accepted on input.

// self
use crate::_prelude::*;

const SEGMENT_MAX_LEN: usize = 64;

/// Error returned when an identifier cannot be used as a URL path segment.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum IdentifierError {
	/// Nothing was supplied.
	#[error("{kind} identifier cannot be empty.")]
	Empty {
		/// Identifier kind.
		kind: &'static str,
	},
	/// A character outside `[A-Za-z0-9_-]` was found.
	#[error("{kind} identifier contains `{found}`, which is not allowed in a path segment.")]
	InvalidChar {
		/// Identifier kind.
		kind: &'static str,
		/// First offending character.
		found: char,
	},
	/// Longer than the segment limit.
	#[error("{kind} identifier exceeds {max} characters.")]
	TooLong {
		/// Identifier kind.
		kind: &'static str,
		/// Maximum permitted length.
		max: usize,
	},
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawIdentifier {
	Number(u64),
	Text(String),
}

macro_rules! def_path_id {
	($(#[$meta:meta])* $name:ident => $kind:literal) => {
		$(#[$meta])*
		#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
		#[serde(into = "String")]
		pub struct $name(String);
		impl $name {
			/// Validates `value` as a path segment.
			pub fn new(value: impl Into<String>) -> Result<Self, IdentifierError> {
				let value = value.into();

				check_segment($kind, &value)?;

				Ok(Self(value))
			}
		}
		impl From<u64> for $name {
			fn from(value: u64) -> Self {
				Self(value.to_string())
			}
		}
		impl From<$name> for String {
			fn from(value: $name) -> Self {
				value.0
			}
		}
		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				write!(f, "{}({})", $kind, self.0)
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(&self.0)
			}
		}
		impl<'de> Deserialize<'de> for $name {
			fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
			where
				D: serde::Deserializer<'de>,
			{
				match RawIdentifier::deserialize(deserializer)? {
					RawIdentifier::Number(n) => Ok(Self::from(n)),
					RawIdentifier::Text(s) => Self::new(s).map_err(serde::de::Error::custom),
				}
			}
		}
	};
}

def_path_id! {
	/// Provider profile that owns the balance and the transfer.
	ProfileId => "Profile"
}
def_path_id! {
	/// Provider-issued identifier of a pending transfer.
	TransferId => "Transfer"
}
def_path_id! {
	/// Label of a provider descriptor, used in diagnostics.
	ProviderId => "Provider"
}

fn check_segment(kind: &'static str, value: &str) -> Result<(), IdentifierError> {
	if value.is_empty() {
		return Err(IdentifierError::Empty { kind });
	}
	if let Some(found) =
		value.chars().find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_')))
	{
		return Err(IdentifierError::InvalidChar { kind, found });
	}
	if value.len() > SEGMENT_MAX_LEN {
		return Err(IdentifierError::TooLong { kind, max: SEGMENT_MAX_LEN });
	}

	Ok(())
}
