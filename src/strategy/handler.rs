//! Strategy handler capability and the registration-time factory table.

// self
use crate::{
	_prelude::*,
	config::Environment,
	context::RequestContext,
	envelope::AuthEnvelope,
	error::BoxError,
	strategy::StrategyDescriptor,
};

/// Failure type returned by strategy handlers.
pub type HandlerError = BoxError;

/// Constructs a handler for one request from the environment and the strategy descriptor.
pub type StrategyFactory =
	Arc<dyn Fn(&Environment, &StrategyDescriptor) -> Box<dyn StrategyHandler> + Send + Sync>;

/// Capability implemented by provider integrations.
///
/// A handler is constructed per request, so it may keep request-local state in `self`.
pub trait StrategyHandler
where
	Self: Send,
{
	/// Runs the named action; `None` selects the handler's default action.
	fn call_action(
		&mut self,
		action: Option<&str>,
		ctx: &RequestContext<'_>,
	) -> Result<ActionResponse, HandlerError>;
}

/// What a strategy action asks the host to do next.
#[derive(Clone, Debug, PartialEq)]
pub enum ActionResponse {
	/// Redirect the user agent (typically to the provider's authorize endpoint).
	Redirect(String),
	/// Render a body produced by the strategy.
	Content(String),
	/// Authentication finished; hand the envelope to the configured transport.
	Envelope(AuthEnvelope),
}

/// Maps handler identifiers to factories; fixed once the front controller is built.
#[derive(Clone, Default)]
pub struct HandlerTable {
	factories: HashMap<String, StrategyFactory>,
}
impl HandlerTable {
	/// Creates an empty table.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds (or replaces) a factory and returns the table.
	pub fn with<F>(mut self, handler_id: impl Into<String>, factory: F) -> Self
	where
		F: 'static + Fn(&Environment, &StrategyDescriptor) -> Box<dyn StrategyHandler> + Send + Sync,
	{
		self.register(handler_id, factory);

		self
	}

	/// Adds (or replaces) a factory.
	pub fn register<F>(&mut self, handler_id: impl Into<String>, factory: F)
	where
		F: 'static + Fn(&Environment, &StrategyDescriptor) -> Box<dyn StrategyHandler> + Send + Sync,
	{
		self.factories.insert(handler_id.into(), Arc::new(factory));
	}

	/// Returns true when a factory is registered for the identifier.
	pub fn contains(&self, handler_id: &str) -> bool {
		self.factories.contains_key(handler_id)
	}

	/// Constructs a handler, or `None` when the identifier is unknown.
	pub fn instantiate(
		&self,
		env: &Environment,
		descriptor: &StrategyDescriptor,
	) -> Option<Box<dyn StrategyHandler>> {
		self.factories.get(&descriptor.handler_id).map(|factory| factory(env, descriptor))
	}
}
impl Debug for HandlerTable {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let mut ids = self.factories.keys().collect::<Vec<_>>();

		ids.sort_unstable();

		f.debug_struct("HandlerTable").field("handler_ids", &ids).finish()
	}
}
