//! Front controller: routes each request to the callback handler or a strategy handler.

// self
use crate::{
	_prelude::*,
	callback::{CallbackHandler, CallbackReport},
	config::{Config, Environment},
	context::{RequestContext, RequestOrigin},
	error::{ConfigError, RoutingError},
	obs::{self, RequestSpan, Stage},
	router::RouteParams,
	security::{ResponseValidator, ValidationResult},
	strategy::{ActionResponse, HandlerTable, StrategyRegistry},
};

/// Reserved first segment (matched case-insensitively) that selects the callback handler.
///
/// It is checked before the registry, so a strategy whose slug is `callback` is unreachable.
pub const CALLBACK_SLUG: &str = "callback";

/// Result of handling one request.
#[derive(Clone, Debug, PartialEq)]
pub enum DispatchOutcome {
	/// No strategy segment; nothing was dispatched.
	Idle,
	/// The callback handler ran.
	Callback(CallbackReport),
	/// A strategy handler ran.
	Strategy {
		/// Canonical name of the strategy.
		strategy: String,
		/// Action segment, if present.
		action: Option<String>,
		/// What the strategy asked the host to do.
		response: ActionResponse,
	},
}

/// Immutable front controller built once at startup and shared across requests.
#[derive(Debug)]
pub struct FrontController {
	env: Environment,
	registry: StrategyRegistry,
	handlers: HandlerTable,
}
impl FrontController {
	/// Indexes the environment's strategies and checks that each has a handler factory.
	pub fn new(env: Environment, handlers: HandlerTable) -> Result<Self> {
		let registry = StrategyRegistry::from_environment(&env)?;

		if let Some(missing) = registry.iter().find(|d| !handlers.contains(&d.handler_id)) {
			return Err(ConfigError::UnknownHandler {
				strategy: missing.canonical_name.clone(),
				handler_id: missing.handler_id.clone(),
			}
			.into());
		}

		Ok(Self { env, registry, handlers })
	}

	/// Resolves `config` against `origin` and builds the controller.
	pub fn from_config(config: &Config, origin: &RequestOrigin, handlers: HandlerTable) -> Result<Self> {
		Self::new(Environment::resolve(config, origin)?, handlers)
	}

	/// Resolved environment.
	pub fn env(&self) -> &Environment {
		&self.env
	}

	/// Strategy registry.
	pub fn registry(&self) -> &StrategyRegistry {
		&self.registry
	}

	/// Parses the request URI against the configured base path.
	pub fn route(&self, ctx: &RequestContext<'_>) -> RouteParams {
		RouteParams::parse(&ctx.request_uri, &self.env.path)
	}

	/// Routes and dispatches one request.
	pub fn handle(&self, ctx: &RequestContext<'_>) -> Result<DispatchOutcome> {
		let route = self.route(ctx);

		self.dispatch(&route, ctx)
	}

	/// Dispatches already-parsed route parameters.
	///
	/// An unknown slug is a fatal [`RoutingError`]; callback failures are reported inside
	/// [`DispatchOutcome::Callback`].
	pub fn dispatch(&self, route: &RouteParams, ctx: &RequestContext<'_>) -> Result<DispatchOutcome> {
		let Some(slug) = route.strategy_slug() else {
			return Ok(DispatchOutcome::Idle);
		};

		if slug.eq_ignore_ascii_case(CALLBACK_SLUG) {
			return Ok(DispatchOutcome::Callback(CallbackHandler::new(&self.env).handle(ctx)));
		}

		let _guard = RequestSpan::new(Stage::Dispatch).entered();
		let descriptor = self
			.registry
			.get(slug)
			.ok_or_else(|| RoutingError::UnsupportedStrategy { slug: slug.to_owned() })?;
		let mut handler = self.handlers.instantiate(&self.env, descriptor).ok_or_else(|| {
			ConfigError::UnknownHandler {
				strategy: descriptor.canonical_name.clone(),
				handler_id: descriptor.handler_id.clone(),
			}
		})?;

		obs::strategy_dispatched(&descriptor.canonical_name, route.action());

		let response = handler.call_action(route.action(), ctx).map_err(|source| Error::Handler {
			strategy: descriptor.canonical_name.clone(),
			source,
		})?;

		Ok(DispatchOutcome::Strategy {
			strategy: descriptor.canonical_name.clone(),
			action: route.action().map(ToOwned::to_owned),
			response,
		})
	}

	/// Validates a precomputed canonical input directly, without going through a transport.
	pub fn validate(&self, canonical_input: &str, timestamp: &str, signature: &str) -> ValidationResult {
		ResponseValidator::new(&self.env.security).validate(canonical_input, timestamp, signature)
	}
}
