mod common;

// crates.io
use serde_json::{Map, json};
use time::{Duration, OffsetDateTime, macros};
// self
use auth_relay::{
	callback::{CallbackHandler, CallbackOutcome, CallbackReport},
	config::Environment,
	context::{FixedClock, RequestContext},
	dispatch::FrontController,
	envelope::{AuthEnvelope, EnvelopeSigner, canonical_input},
	security::{RejectReason, ResponseValidator},
	transport::{
		ENVELOPE_FIELD, MemorySession, RequestPayload, RequestTransports, SessionStore,
		callback_form_fields, callback_redirect_url, deliver_to_session,
	},
	url::form_urlencoded,
};
use common::*;

const SIGNED_AT: OffsetDateTime = macros::datetime!(2026-03-01 09:30 UTC);

fn environment_with(transport: &str) -> Environment {
	let config = config(json!({ "Static": null })).set("callback_transport", transport);

	Environment::resolve(&config, &origin()).expect("Fixture configuration should resolve.")
}

fn signed(env: &Environment) -> AuthEnvelope {
	EnvelopeSigner::new(&env.security)
		.sign_at(auth("Static", "uid-1"), SIGNED_AT)
		.expect("Fixture envelope should sign.")
}

fn session_outcome(env: &Environment, envelope: &AuthEnvelope, now: OffsetDateTime) -> CallbackReport {
	let session = MemorySession::default();

	deliver_to_session(&session, envelope);

	let transports = RequestTransports::new().with_session(&session);
	let clock = FixedClock(now);

	CallbackHandler::new(env).handle(&RequestContext::new("/callback", &transports).with_clock(&clock))
}

fn with_signature(envelope: &AuthEnvelope, signature: String) -> AuthEnvelope {
	match envelope.clone() {
		AuthEnvelope::Signed { auth, timestamp, .. } => AuthEnvelope::Signed { auth, timestamp, signature },
		other => other,
	}
}

#[test]
fn session_envelope_is_single_use() {
	let env = environment_with("session");
	let envelope = signed(&env);
	let session = MemorySession::default();

	deliver_to_session(&session, &envelope);

	let transports = RequestTransports::new().with_session(&session);
	let clock = FixedClock(SIGNED_AT + Duration::seconds(30));
	let ctx = RequestContext::new("/callback", &transports).with_clock(&clock);
	let handler = CallbackHandler::new(&env);
	let first = handler.handle(&ctx);

	assert_eq!(first.outcome, CallbackOutcome::Validated);
	assert_eq!(first.envelope, Some(envelope.to_value()));
	assert!(!session.contains(ENVELOPE_FIELD));

	let second = handler.handle(&ctx);

	assert_eq!(second.outcome, CallbackOutcome::MissingComponents);
	assert_eq!(second.envelope, None);
}

#[test]
fn get_transport_reads_query_string() {
	let env = environment_with("get");
	let envelope = signed(&env);
	let url = callback_redirect_url(&env, &envelope).expect("Redirect URL should build.");

	assert_eq!(url.path(), "/callback");
	assert_eq!(url.host_str(), Some("auth.example.com"));

	let request_uri = format!("{}?{}", url.path(), url.query().unwrap_or_default());
	let query = RequestPayload::from_request_uri(&request_uri);
	let transports = RequestTransports::new().with_query(&query);
	let clock = FixedClock(SIGNED_AT + Duration::minutes(1));
	let report = CallbackHandler::new(&env)
		.handle(&RequestContext::new(request_uri.as_str(), &transports).with_clock(&clock));

	assert_eq!(report.transport, "get");
	assert_eq!(report.outcome, CallbackOutcome::Validated);
}

#[test]
fn post_transport_reads_form_body() {
	let env = environment_with("post");
	let envelope = signed(&env);
	let body = form_urlencoded::Serializer::new(String::new())
		.extend_pairs(callback_form_fields(&envelope))
		.finish();
	let form = RequestPayload::parse(&body);
	let transports = RequestTransports::new().with_form(&form);
	let clock = FixedClock(SIGNED_AT + Duration::minutes(1));
	let report = CallbackHandler::new(&env)
		.handle(&RequestContext::new("/callback", &transports).with_clock(&clock));

	assert_eq!(report.outcome, CallbackOutcome::Validated);

	// The envelope rides in the form body, not the query string.
	let empty = RequestTransports::new();
	let report =
		CallbackHandler::new(&env).handle(&RequestContext::new("/callback", &empty).with_clock(&clock));

	assert_eq!(report.outcome, CallbackOutcome::MissingComponents);
}

#[test]
fn malformed_payload_reads_as_missing() {
	let env = environment_with("get");
	let query = RequestPayload::parse(&format!("{ENVELOPE_FIELD}=not-base64-json!"));
	let transports = RequestTransports::new().with_query(&query);
	let report = CallbackHandler::new(&env).handle(&RequestContext::new("/callback", &transports));

	assert_eq!(report.outcome, CallbackOutcome::MissingComponents);
}

#[test]
fn provider_errors_are_reported_without_validation() {
	let env = environment_with("session");
	let mut details = Map::new();

	details.insert("code".into(), json!("access_denied"));
	details.insert("message".into(), json!("User cancelled the consent screen."));

	let envelope = AuthEnvelope::error(details);
	let report = session_outcome(&env, &envelope, SIGNED_AT);

	assert_eq!(report.outcome, CallbackOutcome::ProviderError);
	assert_eq!(report.envelope, Some(envelope.to_value()));
	assert!(!report.outcome.is_ok());
}

#[test]
fn unsupported_transport_reads_nothing() {
	let env = environment_with("cookie");
	let session = MemorySession::default();

	deliver_to_session(&session, &signed(&env));

	let transports = RequestTransports::new().with_session(&session);
	let report = CallbackHandler::new(&env).handle(&RequestContext::new("/callback", &transports));

	assert_eq!(report.outcome, CallbackOutcome::UnsupportedTransport("cookie".into()));
	assert_eq!(report.envelope, None);
	assert!(session.contains(ENVELOPE_FIELD));
}

#[test]
fn freshness_window_is_inclusive() {
	let env = environment_with("session");
	let envelope = signed(&env);
	let timeout = env.security.timeout;

	assert_eq!(timeout, Duration::minutes(2));

	for (offset, expected) in [
		(Duration::ZERO, CallbackOutcome::Validated),
		(timeout - Duration::seconds(1), CallbackOutcome::Validated),
		(timeout, CallbackOutcome::Validated),
		(timeout + Duration::seconds(1), CallbackOutcome::Rejected(RejectReason::Expired)),
		(-Duration::seconds(1), CallbackOutcome::Rejected(RejectReason::Expired)),
	] {
		assert_eq!(
			session_outcome(&env, &envelope, SIGNED_AT + offset).outcome,
			expected,
			"offset = {offset}"
		);
	}
}

#[test]
fn oversized_timeout_accepts_old_envelopes() {
	let config = config(json!({ "Static": null })).set("security_timeout", "5000000 days");
	let env = Environment::resolve(&config, &origin()).expect("Large timeouts should resolve.");
	let envelope = signed(&env);

	assert_eq!(
		session_outcome(&env, &envelope, SIGNED_AT + Duration::days(3650)).outcome,
		CallbackOutcome::Validated
	);

	let claims = auth("Static", "uid-1");
	let current = EnvelopeSigner::new(&env.security)
		.sign(claims.clone())
		.expect("Envelope should sign at the current time.");
	let AuthEnvelope::Signed { timestamp, signature, .. } = &current else {
		panic!("Fixture envelope should be signed.");
	};

	assert!(
		ResponseValidator::new(&env.security)
			.validate(&canonical_input(&claims), timestamp, signature)
			.valid
	);
}

#[test]
fn float_claims_survive_query_transport() {
	let env = environment_with("get");
	let mut claims = auth("Static", "uid-1");

	claims.insert("score".into(), json!(0.30000000000000004));
	claims.insert("location".into(), json!({ "lat": 48.858369999999994, "lng": 2.2944813 }));

	let envelope = EnvelopeSigner::new(&env.security)
		.sign_at(claims, SIGNED_AT)
		.expect("Fixture envelope should sign.");
	let url = callback_redirect_url(&env, &envelope).expect("Redirect URL should build.");
	let query = RequestPayload::parse(url.query().unwrap_or_default());

	assert_eq!(query.envelope(), Some(envelope.to_value()));

	let transports = RequestTransports::new().with_query(&query);
	let clock = FixedClock(SIGNED_AT + Duration::seconds(5));
	let report = CallbackHandler::new(&env)
		.handle(&RequestContext::new("/callback", &transports).with_clock(&clock));

	assert_eq!(report.outcome, CallbackOutcome::Validated);
}

#[test]
fn tampering_is_detected() {
	let env = environment_with("session");
	let envelope = signed(&env);
	let now = SIGNED_AT + Duration::seconds(10);
	let AuthEnvelope::Signed { signature, .. } = &envelope else {
		panic!("Fixture envelope should be signed.");
	};
	let mut flipped = signature.clone();
	let last = if flipped.ends_with('0') { "1" } else { "0" };

	flipped.pop();
	flipped.push_str(last);

	assert_eq!(
		session_outcome(&env, &with_signature(&envelope, flipped), now).outcome,
		CallbackOutcome::Rejected(RejectReason::SignatureMismatch)
	);
	assert_eq!(
		session_outcome(&env, &with_signature(&envelope, signature.to_ascii_uppercase()), now)
			.outcome,
		CallbackOutcome::Validated
	);

	let mut forged = envelope.to_value();

	forged["auth"]["uid"] = json!("uid-2");

	let session = MemorySession::default();

	session.put(ENVELOPE_FIELD, forged);

	let transports = RequestTransports::new().with_session(&session);
	let clock = FixedClock(now);
	let report = CallbackHandler::new(&env)
		.handle(&RequestContext::new("/callback", &transports).with_clock(&clock));

	assert_eq!(report.outcome, CallbackOutcome::Rejected(RejectReason::SignatureMismatch));
}

#[test]
fn iteration_and_salt_must_match() {
	let env = environment_with("session");
	let envelope = signed(&env);
	let now = SIGNED_AT + Duration::seconds(10);
	let other_iteration = Environment::resolve(
		&config(json!({ "Static": null })).set("security_iteration", 299),
		&origin(),
	)
	.expect("Configuration should resolve.");
	let other_salt = Environment::resolve(
		&config(json!({ "Static": null })).set("security_salt", "another-salt"),
		&origin(),
	)
	.expect("Configuration should resolve.");

	for env in [&other_iteration, &other_salt] {
		assert_eq!(
			session_outcome(env, &envelope, now).outcome,
			CallbackOutcome::Rejected(RejectReason::SignatureMismatch)
		);
	}
}

#[test]
fn controller_validates_precomputed_input() {
	let controller = FrontController::new(environment_with("session"), handlers())
		.expect("Fixture controller should build.");
	let auth = auth("Static", "uid-1");
	let envelope = EnvelopeSigner::new(&controller.env().security)
		.sign(auth.clone())
		.expect("Envelope should sign at the current time.");
	let AuthEnvelope::Signed { timestamp, signature, .. } = envelope else {
		panic!("Fixture envelope should be signed.");
	};
	let canonical = canonical_input(&auth);
	let result = controller.validate(&canonical, &timestamp, &signature);

	assert!(result.valid);
	assert_eq!(result.reason, None);

	let result = controller.validate(&canonical, "yesterday", &signature);

	assert!(!result.valid);
	assert_eq!(result.reason, Some(RejectReason::Expired));
	assert_eq!(RejectReason::Expired.to_string(), "expired");
}
