use std::io;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use method_prompts::catalog::find_task;
use method_prompts::config::{parse_assignment, parse_tx_assignment};
use method_prompts::invoke::DryRunTransport;
use method_prompts::{
    default_registry, invoke, AddressBook, Context, FieldSpec, Given, Handlers, InvokeError,
    InvokeStatus, MethodSpec, ResolveError, ResolvedValue, ScriptedPrompt, Transport, TxOptionKey,
    TxOptionSpec, TxOptionSpecs, TxOptions,
};
use serde_json::{json, Map, Value};

const ALICE: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";
const BOB: &str = "0x3C44CdDdB6a900fa2b585dd299e03d12FA4293BC";

fn context(prompt: &ScriptedPrompt, non_interactive: bool) -> Context {
    default_registry(AddressBook::new(vec![ALICE.to_string(), BOB.to_string()]))
        .context(Box::new(prompt.clone()), non_interactive)
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

#[derive(Default)]
struct Recorder {
    reads: Vec<(String, String, Vec<ResolvedValue>)>,
    writes: Vec<(String, String, Vec<ResolvedValue>, TxOptions)>,
    fail_with: Option<String>,
}

impl Transport for Recorder {
    fn read(&mut self, target: &str, method: &str, args: &[ResolvedValue]) -> Result<Value> {
        if let Some(message) = &self.fail_with {
            return Err(anyhow!(message.clone()));
        }
        self.reads.push((target.to_string(), method.to_string(), args.to_vec()));
        Ok(json!("42"))
    }

    fn write(
        &mut self,
        target: &str,
        method: &str,
        args: &[ResolvedValue],
        tx_options: &TxOptions,
    ) -> Result<Value> {
        if let Some(message) = &self.fail_with {
            return Err(anyhow!(message.clone()));
        }
        self.writes.push((
            target.to_string(),
            method.to_string(),
            args.to_vec(),
            tx_options.clone(),
        ));
        Ok(json!({ "hash": "0xabc" }))
    }
}

fn balance_of() -> MethodSpec {
    MethodSpec::call("balanceOf", vec![FieldSpec::new("who", "smart-address")])
}

#[test]
fn call_reads_with_resolved_arguments() {
    let prompt = ScriptedPrompt::silent();
    let mut ctx = context(&prompt, true);
    let mut transport = Recorder::default();
    let given = Given {
        arguments: object(json!({ "who": "1" })),
        ..Given::default()
    };

    let mut received = None;
    let status = invoke(
        &mut ctx,
        &mut transport,
        "0xToken",
        &balance_of(),
        &given,
        Handlers::new().on_success(|value| received = Some(value)),
    );

    assert_eq!(status, InvokeStatus::Succeeded);
    assert_eq!(received, Some(json!("42")));
    assert_eq!(
        transport.reads,
        vec![(
            "0xToken".to_string(),
            "balanceOf".to_string(),
            vec![ResolvedValue::Address(BOB.to_string())]
        )]
    );
    assert!(transport.writes.is_empty());
}

#[test]
fn send_writes_with_tx_options() {
    let prompt = ScriptedPrompt::new(["500"]);
    let mut ctx = context(&prompt, false);
    let mut transport = Recorder::default();
    let method = MethodSpec::send(
        "deposit",
        vec![],
        TxOptionSpecs::new()
            .with(TxOptionKey::Value, TxOptionSpec::prompt())
            .with(TxOptionKey::Account, TxOptionSpec::default_to(Some(json!("0")))),
    );

    let status = invoke(
        &mut ctx,
        &mut transport,
        "0xVault",
        &method,
        &Given::default(),
        Handlers::new(),
    );

    assert_eq!(status, InvokeStatus::Succeeded);
    let (_, name, args, tx_options) = &transport.writes[0];
    assert_eq!(name, "deposit");
    assert!(args.is_empty());
    assert_eq!(tx_options.to_json(), json!({ "account": ALICE, "value": "500" }));
}

#[test]
fn transport_failures_reach_the_error_handler() {
    let prompt = ScriptedPrompt::silent();
    let mut ctx = context(&prompt, true);
    let mut transport = Recorder {
        fail_with: Some("execution reverted".to_string()),
        ..Recorder::default()
    };
    let given = Given {
        arguments: object(json!({ "who": ALICE })),
        ..Given::default()
    };

    let mut failure = None;
    let mut succeeded = false;
    let status = invoke(
        &mut ctx,
        &mut transport,
        "0xToken",
        &balance_of(),
        &given,
        Handlers::new()
            .on_success(|_| succeeded = true)
            .on_error(|err| failure = Some(err.to_string())),
    );

    assert_eq!(status, InvokeStatus::Failed);
    assert!(!succeeded);
    assert_eq!(failure.as_deref(), Some("operation failed: execution reverted"));
}

#[test]
fn resolution_failures_skip_the_transport() {
    let prompt = ScriptedPrompt::silent();
    let mut ctx = context(&prompt, true);
    let mut transport = Recorder::default();

    let mut interaction_required = false;
    let status = invoke(
        &mut ctx,
        &mut transport,
        "0xToken",
        &balance_of(),
        &Given::default(),
        Handlers::new().on_error(|err| {
            interaction_required = matches!(
                err,
                InvokeError::Resolve(ResolveError::InteractionRequiredButDisabled { .. })
            );
        }),
    );

    assert_eq!(status, InvokeStatus::Failed);
    assert!(interaction_required);
    assert!(transport.reads.is_empty());
}

#[test]
fn failures_without_handler_are_swallowed() {
    let prompt = ScriptedPrompt::silent();
    let mut ctx = context(&prompt, true);
    let mut transport = Recorder::default();
    let method = MethodSpec::send("deposit", vec![], TxOptionSpecs::new());
    let given = Given {
        tx_options: object(json!({ "from": ALICE })),
        ..Given::default()
    };

    let status = invoke(&mut ctx, &mut transport, "0xVault", &method, &given, Handlers::new());
    assert_eq!(status, InvokeStatus::Failed);
    assert!(transport.writes.is_empty());
}

#[test]
fn dry_run_echoes_a_catalog_task() {
    let prompt = ScriptedPrompt::silent();
    let mut ctx = context(&prompt, true);
    let task = find_task("erc20:transfer").expect("erc20:transfer exists");
    let given = Given {
        arguments: object(json!({ "to": "1", "amount": "0x64" })),
        tx_options: object(json!({ "gasPrice": 7, "eip155": false })),
    };

    let mut received = None;
    let status = invoke(
        &mut ctx,
        &mut DryRunTransport,
        "0xToken",
        &task.method,
        &given,
        Handlers::new().on_success(|value| received = Some(value)),
    );

    assert_eq!(status, InvokeStatus::Succeeded);
    assert_eq!(
        received,
        Some(json!({
            "kind": "send",
            "target": "0xToken",
            "method": "transfer",
            "arguments": [BOB, "100"],
            "txOptions": { "gasPrice": "7", "eip155": false }
        }))
    );
}

#[test]
fn tx_option_errors_are_reported_before_argument_prompts() {
    let prompt = ScriptedPrompt::new(["7"]);
    let mut ctx = context(&prompt, false);
    let mut transport = Recorder::default();
    let method = MethodSpec::send(
        "mint",
        vec![FieldSpec::new("amount", "uint256")],
        TxOptionSpecs::new().with(TxOptionKey::Gas, TxOptionSpec::default_to(None)),
    );

    for tx_options in [
        json!({ "from": "0x00" }),
        json!({ "value": 1 }),
        json!({ "gas": { "actionType": "sometimes" } }),
    ] {
        let given = Given {
            tx_options: object(tx_options),
            ..Given::default()
        };
        let mut misconfigured = false;
        let status = invoke(
            &mut ctx,
            &mut transport,
            "0xToken",
            &method,
            &given,
            Handlers::new().on_error(|err| {
                misconfigured = matches!(
                    err,
                    InvokeError::Resolve(ResolveError::InvalidConfiguration(_))
                );
            }),
        );
        assert_eq!(status, InvokeStatus::Failed);
        assert!(misconfigured);
    }

    let invalid_default = MethodSpec::send(
        "mint",
        vec![FieldSpec::new("amount", "uint256")],
        TxOptionSpecs::new().with(TxOptionKey::Gas, TxOptionSpec::default_to(Some(json!("-1")))),
    );
    let status = invoke(
        &mut ctx,
        &mut transport,
        "0xToken",
        &invalid_default,
        &Given::default(),
        Handlers::new(),
    );
    assert_eq!(status, InvokeStatus::Failed);

    assert!(prompt.transcript().prompts.is_empty());
    assert_eq!(prompt.remaining(), 1);
    assert!(transport.writes.is_empty());
}

#[test]
fn command_line_values_wider_than_u64_are_accepted() -> Result<()> {
    let prompt = ScriptedPrompt::silent();
    let mut ctx = context(&prompt, true);
    let task = find_task("erc20:transfer").expect("erc20:transfer exists");

    let mut given = Given::default();
    for raw in ["to=0", "amount=100000000000000000000"] {
        let (name, value) = parse_assignment(raw)?;
        given.arguments.insert(name, value);
    }
    let (name, value) = parse_tx_assignment("value=340282366920938463463374607431768211456")?;
    given.tx_options.insert(name, value);

    let mut received = None;
    let status = invoke(
        &mut ctx,
        &mut DryRunTransport,
        "0xToken",
        &task.method,
        &given,
        Handlers::new().on_success(|value| received = Some(value)),
    );

    assert_eq!(status, InvokeStatus::Succeeded);
    let received = received.expect("success handler called");
    assert_eq!(received["arguments"], json!([ALICE, "100000000000000000000"]));
    assert_eq!(
        received["txOptions"],
        json!({ "value": "340282366920938463463374607431768211456" })
    );
    Ok(())
}

#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn invoke_logged(verbose: bool, method: &MethodSpec, given: &Given) -> (InvokeStatus, String) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::INFO)
        .finish();

    let prompt = ScriptedPrompt::silent();
    let mut ctx = context(&prompt, true).with_verbose(verbose);
    let status = tracing::subscriber::with_default(subscriber, || {
        invoke(
            &mut ctx,
            &mut DryRunTransport,
            "0xVault",
            method,
            given,
            Handlers::new(),
        )
    });
    (status, logs.text())
}

#[test]
fn verbose_mode_logs_the_resolved_call() {
    let deposit = MethodSpec::send(
        "deposit",
        vec![FieldSpec::new("who", "smart-address")],
        TxOptionSpecs::new().with(TxOptionKey::Value, TxOptionSpec::default_to(Some(json!(500)))),
    );
    let given = Given {
        arguments: object(json!({ "who": "1" })),
        ..Given::default()
    };

    let (status, logs) = invoke_logged(true, &deposit, &given);
    assert_eq!(status, InvokeStatus::Succeeded);
    assert!(logs.contains("Invoking SEND method"), "{logs}");
    assert!(logs.contains("deposit"), "{logs}");
    assert!(logs.contains(BOB), "{logs}");
    assert!(logs.contains("500"), "{logs}");

    let (status, logs) = invoke_logged(true, &balance_of(), &given_who("0"));
    assert_eq!(status, InvokeStatus::Succeeded);
    assert!(logs.contains("Invoking CALL method"), "{logs}");

    let (status, logs) = invoke_logged(false, &deposit, &given);
    assert_eq!(status, InvokeStatus::Succeeded);
    assert!(!logs.contains("Invoking"), "{logs}");
}

fn given_who(who: &str) -> Given {
    Given {
        arguments: object(json!({ "who": who })),
        ..Given::default()
    }
}
