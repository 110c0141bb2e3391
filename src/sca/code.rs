//! One-time code supply for SMS challenges.
//!
//! The resolver never knows where a code comes from: sandbox deployments answer every SMS
//! challenge with a fixed code, live deployments ask a human. Both sit behind
//! [`CodeProvider`], which callers may implement for their own delivery channel.

// crates.io
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader, Lines, Stdin};
// self
use crate::{_prelude::*, provider::ProviderEnvironment, sca::ChallengeDescriptor};

/// Code accepted by the provider sandbox for every SMS challenge.
pub const SANDBOX_SMS_CODE: &str = "111111";

/// Boxed future returned by [`CodeProvider::supply_code`].
pub type CodeFuture<'a> =
	Pin<Box<dyn Future<Output = Result<OneTimeCode, CodeProviderError>> + 'a + Send>>;

/// Source of one-time codes; may block on human input.
pub trait CodeProvider
where
	Self: Send + Sync,
{
	/// Produces the code for `challenge`, whose delivery target is set once known.
	fn supply_code<'a>(&'a self, challenge: &'a ChallengeDescriptor) -> CodeFuture<'a>;
}

/// Failures raised by code providers.
#[derive(Debug, ThisError)]
pub enum CodeProviderError {
	/// The provider produced an empty code.
	#[error("One-time code is empty.")]
	Empty,
	/// Input closed before a code arrived.
	#[error("Code input closed before a code was entered.")]
	InputClosed,
	/// Reading the code failed.
	#[error(transparent)]
	Io(#[from] std::io::Error),
}

/// Ephemeral one-time code; redacted when formatted.
#[derive(Clone, PartialEq, Eq)]
pub struct OneTimeCode(String);
impl OneTimeCode {
	/// Trims `value` and rejects empty codes.
	pub fn new(value: impl AsRef<str>) -> Result<Self, CodeProviderError> {
		let trimmed = value.as_ref().trim();

		if trimmed.is_empty() {
			return Err(CodeProviderError::Empty);
		}

		Ok(Self(trimmed.to_owned()))
	}

	/// Returns the code. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl Debug for OneTimeCode {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("OneTimeCode(<redacted>)")
	}
}
impl Display for OneTimeCode {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Answers every challenge with the same code.
#[derive(Clone, Debug)]
pub struct FixedCodeProvider(OneTimeCode);
impl FixedCodeProvider {
	/// Wraps a fixed code.
	pub fn new(code: OneTimeCode) -> Self {
		Self(code)
	}

	/// Provider for the sandbox, which accepts [`SANDBOX_SMS_CODE`].
	pub fn sandbox() -> Self {
		Self(OneTimeCode(SANDBOX_SMS_CODE.to_owned()))
	}
}
impl CodeProvider for FixedCodeProvider {
	fn supply_code<'a>(&'a self, _challenge: &'a ChallengeDescriptor) -> CodeFuture<'a> {
		Box::pin(async move { Ok(self.0.clone()) })
	}
}

/// Prompts on stderr and reads each code from the next input line.
///
/// One buffered line reader lives for the provider's lifetime, so lines typed ahead are kept
/// for later challenges. A read abandoned by a timeout or cancellation loses nothing: the next
/// call resumes the same reader.
pub struct PromptCodeProvider<R = Stdin> {
	lines: AsyncMutex<Lines<BufReader<R>>>,
}
impl PromptCodeProvider {
	/// Reads codes from standard input.
	pub fn stdin() -> Self {
		Self::from_reader(tokio::io::stdin())
	}
}
impl<R> PromptCodeProvider<R>
where
	R: AsyncRead + Unpin,
{
	/// Reads codes from `reader`, one per line.
	pub fn from_reader(reader: R) -> Self {
		Self { lines: AsyncMutex::new(BufReader::new(reader).lines()) }
	}
}
impl Default for PromptCodeProvider {
	fn default() -> Self {
		Self::stdin()
	}
}
impl<R> Debug for PromptCodeProvider<R> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("PromptCodeProvider(..)")
	}
}
impl<R> CodeProvider for PromptCodeProvider<R>
where
	R: AsyncRead + Unpin + Send,
{
	fn supply_code<'a>(&'a self, challenge: &'a ChallengeDescriptor) -> CodeFuture<'a> {
		Box::pin(async move {
			let mut lines = self.lines.lock().await;
			let target = challenge.delivery_target.as_deref().unwrap_or("your device");
			let mut stderr = tokio::io::stderr();

			stderr
				.write_all(format!("Enter the {} code sent to {target}: ", challenge.kind).as_bytes())
				.await?;
			stderr.flush().await?;

			// `next_line` is cancel safe; a partial line stays buffered.
			match lines.next_line().await? {
				Some(line) => OneTimeCode::new(line),
				None => Err(CodeProviderError::InputClosed),
			}
		})
	}
}

/// Code provider matching the environment: fixed sandbox code, or a stdin prompt live.
pub fn default_code_provider(environment: ProviderEnvironment) -> Box<dyn CodeProvider> {
	match environment {
		ProviderEnvironment::Sandbox => Box::new(FixedCodeProvider::sandbox()),
		ProviderEnvironment::Live => Box::new(PromptCodeProvider::stdin()),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::sca::ChallengeKind;

	#[test]
	fn codes_are_trimmed_and_redacted() {
		let code = OneTimeCode::new(" 123456\n").expect("Code fixture should be valid.");

		assert_eq!(code.expose(), "123456");
		assert_eq!(format!("{code:?}"), "OneTimeCode(<redacted>)");
		assert!(matches!(OneTimeCode::new("  "), Err(CodeProviderError::Empty)));
	}

	#[tokio::test]
	async fn sandbox_provider_returns_fixed_code() {
		let provider = default_code_provider(ProviderEnvironment::Sandbox);
		let challenge = ChallengeDescriptor::new(ChallengeKind::Sms);
		let code =
			provider.supply_code(&challenge).await.expect("Sandbox provider should supply a code.");

		assert_eq!(code.expose(), SANDBOX_SMS_CODE);
	}

	#[tokio::test]
	async fn prompt_provider_keeps_typed_ahead_lines() {
		let input = std::io::Cursor::new(b"111111\n 222222 \n\n".to_vec());
		let provider = PromptCodeProvider::from_reader(input);
		let challenge = ChallengeDescriptor::new(ChallengeKind::Sms).with_delivery_target("***42");
		let first = provider.supply_code(&challenge).await.expect("First line should be read.");
		let second = provider.supply_code(&challenge).await.expect("Second line should be read.");

		assert_eq!(first.expose(), "111111");
		assert_eq!(second.expose(), "222222");
		assert!(matches!(provider.supply_code(&challenge).await, Err(CodeProviderError::Empty)));
		assert!(matches!(
			provider.supply_code(&challenge).await,
			Err(CodeProviderError::InputClosed)
		));
	}

	#[tokio::test]
	async fn abandoned_read_does_not_drop_input() {
		let (mut writer, reader) = tokio::io::duplex(64);
		let provider = PromptCodeProvider::from_reader(reader);
		let challenge = ChallengeDescriptor::new(ChallengeKind::Sms);

		writer.write_all(b"123").await.expect("Partial line should be written.");

		let abandoned =
			tokio::time::timeout(StdDuration::from_millis(20), provider.supply_code(&challenge)).await;

		assert!(abandoned.is_err(), "An unterminated line must not yield a code.");

		writer.write_all(b"456\n").await.expect("Line end should be written.");

		let code = provider.supply_code(&challenge).await.expect("Buffered input should complete.");

		assert_eq!(code.expose(), "123456");
	}
}
