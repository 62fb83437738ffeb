//! Demonstrates a full request cycle: a strategy redirects to its provider, signs an envelope
//! on return, hands it over through the session transport, and the callback route verifies it.

// crates.io
use color_eyre::{Result, eyre::eyre};
use serde_json::{Map, json};
// self
use auth_relay::{
	config::{Config, Environment},
	context::{RequestContext, RequestOrigin},
	dispatch::{DispatchOutcome, FrontController},
	envelope::EnvelopeSigner,
	security::{Salt, SecuritySettings},
	strategy::{ActionResponse, HandlerError, HandlerTable, StrategyDescriptor, StrategyHandler},
	transport::{MemorySession, RequestTransports, deliver_to_session},
};

struct DemoStrategy {
	security: SecuritySettings,
	descriptor: StrategyDescriptor,
}
impl StrategyHandler for DemoStrategy {
	fn call_action(
		&mut self,
		action: Option<&str>,
		_ctx: &RequestContext<'_>,
	) -> Result<ActionResponse, HandlerError> {
		match action.unwrap_or("request") {
			"request" => {
				let client_id = self
					.descriptor
					.option("client_id")
					.and_then(|v| v.as_str())
					.ok_or("client_id is not configured")?;

				Ok(ActionResponse::Redirect(format!(
					"https://id.example.com/authorize?client_id={client_id}"
				)))
			},
			"callback" => {
				let mut auth = Map::new();

				auth.insert("provider".into(), json!(self.descriptor.canonical_name));
				auth.insert("uid".into(), json!("1138"));
				auth.insert("info".into(), json!({ "name": "Demo User" }));

				Ok(ActionResponse::Envelope(EnvelopeSigner::new(&self.security).sign(auth)?))
			},
			other => Err(format!("unknown action `{other}`").into()),
		}
	}
}

fn main() -> Result<()> {
	color_eyre::install()?;

	let salt = Salt::generate();
	let config = Config::from_json_str(
		r#"{
			"path": "/auth/",
			"security_iteration": 50,
			"Strategy": { "Demo": { "client_id": "demo-client" } }
		}"#,
	)?
	.set("security_salt", salt.expose());
	let origin = RequestOrigin::new("localhost:8080", "/auth/");
	let handlers = HandlerTable::new().with(
		"Demo",
		|env: &Environment, descriptor: &StrategyDescriptor| {
			Box::new(DemoStrategy { security: env.security.clone(), descriptor: descriptor.clone() })
				as Box<dyn StrategyHandler>
		},
	);
	let controller = FrontController::from_config(&config, &origin, handlers)?;
	let session = MemorySession::default();
	let transports = RequestTransports::new().with_session(&session);

	println!("Callback endpoint: {}.", controller.env().callback_endpoint()?);

	for uri in ["/auth/demo", "/auth/demo/callback"] {
		match controller.handle(&RequestContext::new(uri, &transports))? {
			DispatchOutcome::Strategy { response: ActionResponse::Redirect(url), .. } =>
				println!("{uri} -> redirect to {url}."),
			DispatchOutcome::Strategy { response: ActionResponse::Envelope(envelope), .. } => {
				println!("{uri} -> envelope issued; delivering through the session.");

				deliver_to_session(&session, &envelope);
			},
			other => return Err(eyre!("Unexpected outcome for {uri}: {other:?}.")),
		}
	}

	let DispatchOutcome::Callback(report) =
		controller.handle(&RequestContext::new("/auth/callback", &transports))?
	else {
		return Err(eyre!("The callback route did not run the callback handler."));
	};

	println!("Callback via {}: {}.", report.transport, report.outcome);

	Ok(())
}
