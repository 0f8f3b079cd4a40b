//! Strongly typed GitHub owner and repository identifiers.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::{_prelude::*, error::ConfigError};

macro_rules! def_id {
	($name:ident, $doc:literal, $kind:literal) => {
		#[doc = $doc]
		#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(try_from = "String", into = "String")]
		pub struct $name(String);
		impl $name {
			/// Creates a new identifier after validation.
			pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
				let view = value.as_ref();

				validate_view($kind, view)?;

				Ok(Self(view.to_owned()))
			}
		}
		impl Deref for $name {
			type Target = str;

			fn deref(&self) -> &Self::Target {
				&self.0
			}
		}
		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}
		impl From<$name> for String {
			fn from(value: $name) -> Self {
				value.0
			}
		}
		impl TryFrom<String> for $name {
			type Error = IdentifierError;

			fn try_from(value: String) -> Result<Self, Self::Error> {
				validate_view($kind, &value)?;

				Ok(Self(value))
			}
		}
		impl Borrow<str> for $name {
			fn borrow(&self) -> &str {
				&self.0
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				write!(f, concat!($kind, "({})"), self.0)
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(&self.0)
			}
		}
		impl FromStr for $name {
			type Err = IdentifierError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Self::new(s)
			}
		}
	};
}

const IDENTIFIER_MAX_LEN: usize = 100;

/// Error returned when identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty.
	#[error("{kind} identifier cannot be empty.")]
	Empty {
		/// Kind of identifier (owner, repository).
		kind: &'static str,
	},
	/// The identifier contains whitespace or a path separator.
	#[error("{kind} identifier contains an invalid character.")]
	InvalidCharacter {
		/// Kind of identifier (owner, repository).
		kind: &'static str,
	},
	/// The identifier exceeded the allowed character count.
	#[error("{kind} identifier exceeds {max} characters.")]
	TooLong {
		/// Kind of identifier (owner, repository).
		kind: &'static str,
		/// Maximum permitted character count.
		max: usize,
	},
}

def_id! { Organization, "GitHub user or organization owning the repository.", "Organization" }
def_id! { RepositoryName, "Repository name without its owner prefix.", "Repository" }

/// Parsed `owner/name` repository slug.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RepositorySlug {
	/// Owning user or organization.
	pub owner: Organization,
	/// Repository name.
	pub name: RepositoryName,
}
impl RepositorySlug {
	/// Parses a slug that must consist of exactly two non-empty segments.
	pub fn parse(raw: &str) -> Result<Self, ConfigError> {
		let malformed = || ConfigError::MalformedRepository { slug: raw.to_owned() };
		let mut segments = raw.split('/');
		let (Some(owner), Some(name), None) = (segments.next(), segments.next(), segments.next())
		else {
			return Err(malformed());
		};
		let owner = Organization::new(owner).map_err(|_| malformed())?;
		let name = RepositoryName::new(name).map_err(|_| malformed())?;

		Ok(Self { owner, name })
	}
}
impl Display for RepositorySlug {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "{}/{}", self.owner, self.name)
	}
}
impl FromStr for RepositorySlug {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}

fn validate_view(kind: &'static str, view: &str) -> Result<(), IdentifierError> {
	if view.is_empty() {
		return Err(IdentifierError::Empty { kind });
	}
	if view.chars().any(|c| c.is_whitespace() || c == '/') {
		return Err(IdentifierError::InvalidCharacter { kind });
	}
	if view.len() > IDENTIFIER_MAX_LEN {
		return Err(IdentifierError::TooLong { kind, max: IDENTIFIER_MAX_LEN });
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn identifiers_validate() {
		assert!(Organization::new(" saml-to").is_err(), "Leading whitespace must be rejected.");
		assert!(RepositoryName::new("a/b").is_err(), "Path separators must be rejected.");
		assert!(RepositoryName::new("").is_err());
		assert!(RepositoryName::new("a".repeat(IDENTIFIER_MAX_LEN + 1)).is_err());

		let org = Organization::new("saml-to").expect("Organization fixture should be valid.");

		assert_eq!(org.as_ref(), "saml-to");
		assert_eq!(format!("{org:?}"), "Organization(saml-to)");
	}

	#[test]
	fn slug_requires_two_non_empty_segments() {
		let slug = RepositorySlug::parse("saml-to/assume-aws-role-action")
			.expect("Well-formed slug should parse.");

		assert_eq!(slug.owner.as_ref(), "saml-to");
		assert_eq!(slug.name.as_ref(), "assume-aws-role-action");
		assert_eq!(slug.to_string(), "saml-to/assume-aws-role-action");

		for raw in ["", "solo", "/repo", "org/", "/", "a/b/c", "org//repo", "or g/repo"] {
			let err = RepositorySlug::parse(raw).expect_err("Malformed slug should be rejected.");

			assert!(
				matches!(&err, ConfigError::MalformedRepository { slug } if slug == raw),
				"Unexpected error for {raw:?}: {err:?}"
			);
		}
	}

	#[test]
	fn serde_round_trip_enforces_validation() {
		let org: Organization =
			serde_json::from_str("\"octo-org\"").expect("Organization should deserialize.");

		assert_eq!(org.as_ref(), "octo-org");
		assert!(serde_json::from_str::<Organization>("\"with space\"").is_err());
	}
}
