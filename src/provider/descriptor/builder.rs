// self
use crate::{
	_prelude::*,
	auth::ProviderId,
	provider::{ProviderDescriptor, ProviderEnvironment, ProviderQuirks},
};

/// Errors raised while constructing or validating descriptors.
#[derive(Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum ProviderDescriptorError {
	/// Base URL must use HTTPS unless it points at a loopback host.
	#[error("The base URL must use HTTPS: {url}.")]
	InsecureBaseUrl {
		/// Base URL that failed validation.
		url: String,
	},
	/// Base URL cannot carry relative paths (e.g., `mailto:`).
	#[error("The base URL cannot be used as a base: {url}.")]
	CannotBeABase {
		/// Base URL that failed validation.
		url: String,
	},
	/// A configured header name is empty or contains characters outside the HTTP token set.
	#[error("The {quirk} header name `{name}` is invalid.")]
	InvalidHeaderName {
		/// Quirk field that failed validation.
		quirk: &'static str,
		/// Supplied header name.
		name: String,
	},
}

/// Builder for [`ProviderDescriptor`] values.
#[derive(Debug)]
pub struct ProviderDescriptorBuilder {
	/// Identifier for the descriptor being constructed.
	pub id: ProviderId,
	/// Targeted deployment.
	pub environment: ProviderEnvironment,
	/// Optional base URL override; defaults to the environment's URL.
	pub base_url: Option<Url>,
	/// Provider-specific header names.
	pub quirks: ProviderQuirks,
}
impl ProviderDescriptorBuilder {
	/// Creates a new builder seeded with the provided identifier.
	pub fn new(id: ProviderId) -> Self {
		Self {
			id,
			environment: ProviderEnvironment::default(),
			base_url: None,
			quirks: ProviderQuirks::default(),
		}
	}

	/// Selects the targeted deployment.
	pub fn environment(mut self, environment: ProviderEnvironment) -> Self {
		self.environment = environment;

		self
	}

	/// Overrides the base URL (gateways, mock servers).
	pub fn base_url(mut self, url: Url) -> Self {
		self.base_url = Some(url);

		self
	}

	/// Overrides the provider quirks.
	pub fn quirks(mut self, quirks: ProviderQuirks) -> Self {
		self.quirks = quirks;

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<ProviderDescriptor, ProviderDescriptorError> {
		let mut base_url = match self.base_url {
			Some(url) => url,
			None => Url::parse(self.environment.default_base_url())
				.map_err(|_| ProviderDescriptorError::CannotBeABase {
					url: self.environment.default_base_url().into(),
				})?,
		};

		if !base_url.path().ends_with('/') {
			let path = format!("{}/", base_url.path());

			base_url.set_path(&path);
		}

		let descriptor = ProviderDescriptor {
			id: self.id,
			environment: self.environment,
			base_url,
			quirks: self.quirks,
		};

		descriptor.validate()?;

		Ok(descriptor)
	}
}

impl ProviderDescriptor {
	/// Validates invariants for the descriptor.
	fn validate(&self) -> Result<(), ProviderDescriptorError> {
		validate_base_url(&self.base_url)?;

		for (quirk, name) in self.quirks.header_names() {
			validate_header_name(quirk, name)?;
		}

		Ok(())
	}
}

fn validate_base_url(url: &Url) -> Result<(), ProviderDescriptorError> {
	if url.cannot_be_a_base() {
		return Err(ProviderDescriptorError::CannotBeABase { url: url.to_string() });
	}
	if url.scheme() == "https" || is_loopback(url) {
		Ok(())
	} else {
		Err(ProviderDescriptorError::InsecureBaseUrl { url: url.to_string() })
	}
}

fn is_loopback(url: &Url) -> bool {
	match url.host() {
		Some(url::Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
		Some(url::Host::Ipv4(ip)) => ip.is_loopback(),
		Some(url::Host::Ipv6(ip)) => ip.is_loopback(),
		None => false,
	}
}

fn validate_header_name(quirk: &'static str, name: &str) -> Result<(), ProviderDescriptorError> {
	let valid = !name.is_empty()
		&& name.bytes().all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_'));

	if valid {
		Ok(())
	} else {
		Err(ProviderDescriptorError::InvalidHeaderName { quirk, name: name.to_owned() })
	}
}
