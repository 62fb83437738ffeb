//! Fixtures shared by the integration tests.

#![allow(dead_code)]

// crates.io
use serde_json::{Map, Value, json};
// self
use auth_relay::{
	config::{Config, Environment},
	context::{RequestContext, RequestOrigin},
	envelope::EnvelopeSigner,
	security::SecuritySettings,
	strategy::{ActionResponse, HandlerError, HandlerTable, StrategyDescriptor, StrategyHandler},
};

pub const TEST_SALT: &str = "integration-test-salt-3b9f0e27c4d1";
pub const STATIC_HANDLER: &str = "Static";
pub const AUTHORIZE_URL: &str = "https://provider.example.com/authorize";

pub fn origin() -> RequestOrigin {
	RequestOrigin::new("auth.example.com", "/").with_https(true)
}

pub fn config(strategies: Value) -> Config {
	Config::new().set("security_salt", TEST_SALT).set("Strategy", strategies)
}

pub fn environment(strategies: Value) -> Environment {
	Environment::resolve(&config(strategies), &origin())
		.expect("Fixture configuration should resolve.")
}

pub fn auth(provider: &str, uid: &str) -> Map<String, Value> {
	let mut auth = Map::new();

	auth.insert("provider".into(), json!(provider));
	auth.insert("uid".into(), json!(uid));
	auth.insert("info".into(), json!({ "name": "Ada", "email": "ada@example.com" }));

	auth
}

/// Stand-in provider integration: `request` redirects to a fixed authorize URL, `callback`
/// signs an envelope for `uid-1`, and anything else fails.
pub struct StaticStrategy {
	security: SecuritySettings,
	descriptor: StrategyDescriptor,
}
impl StrategyHandler for StaticStrategy {
	fn call_action(
		&mut self,
		action: Option<&str>,
		ctx: &RequestContext<'_>,
	) -> Result<ActionResponse, HandlerError> {
		match action.unwrap_or("request") {
			"request" => Ok(ActionResponse::Redirect(format!(
				"{AUTHORIZE_URL}?client={}",
				self.descriptor.url_slug
			))),
			"callback" => {
				let envelope = EnvelopeSigner::new(&self.security)
					.sign_at(auth(&self.descriptor.canonical_name, "uid-1"), ctx.clock.now())?;

				Ok(ActionResponse::Envelope(envelope))
			},
			other => Err(format!("Action `{other}` is not supported.").into()),
		}
	}
}

pub fn handlers() -> HandlerTable {
	HandlerTable::new().with(STATIC_HANDLER, |env: &Environment, descriptor: &StrategyDescriptor| {
		Box::new(StaticStrategy { security: env.security.clone(), descriptor: descriptor.clone() })
			as Box<dyn StrategyHandler>
	})
}
