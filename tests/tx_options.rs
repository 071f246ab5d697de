use anyhow::Result;
use method_prompts::{
    default_registry, resolve_tx_options, AddressBook, Context, ResolveError, ResolvedValue,
    ScriptedPrompt, TxOptionKey, TxOptionSpec, TxOptionSpecs,
};
use num_bigint::BigInt;
use serde_json::{json, Map, Value};

const ALICE: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";
const BOB: &str = "0x3C44CdDdB6a900fa2b585dd299e03d12FA4293BC";

fn context(prompt: &ScriptedPrompt, non_interactive: bool) -> Context {
    default_registry(AddressBook::new(vec![ALICE.to_string(), BOB.to_string()]))
        .context(Box::new(prompt.clone()), non_interactive)
}

fn given(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn int(value: u64) -> ResolvedValue {
    ResolvedValue::Int(BigInt::from(value))
}

#[test]
fn absent_option_without_default_is_omitted() -> Result<()> {
    let prompt = ScriptedPrompt::silent();
    let mut ctx = context(&prompt, false);
    let specs = TxOptionSpecs::new().with(TxOptionKey::GasPrice, TxOptionSpec::default_to(None));
    let options = resolve_tx_options(&mut ctx, &specs, &Map::new())?;

    assert!(!options.contains(TxOptionKey::GasPrice));
    assert!(options.is_empty());
    assert_eq!(options.to_json(), json!({}));
    assert!(prompt.transcript().prompts.is_empty());
    Ok(())
}

#[test]
fn absent_option_uses_configured_default() -> Result<()> {
    let prompt = ScriptedPrompt::silent();
    let mut ctx = context(&prompt, true);
    let specs = TxOptionSpecs::new()
        .with(TxOptionKey::Account, TxOptionSpec::default_to(Some(json!("1"))))
        .with(TxOptionKey::Gas, TxOptionSpec::default_to(Some(json!(21000))));
    let options = resolve_tx_options(&mut ctx, &specs, &Map::new())?;

    assert_eq!(
        options.get(TxOptionKey::Account),
        Some(&ResolvedValue::Address(BOB.to_string()))
    );
    assert_eq!(options.get(TxOptionKey::Gas), Some(&int(21000)));
    assert_eq!(options.to_json(), json!({ "account": BOB, "gas": "21000" }));
    Ok(())
}

#[test]
fn absent_prompt_option_asks_the_operator() -> Result<()> {
    let prompt = ScriptedPrompt::new(["-5", "1000"]);
    let mut ctx = context(&prompt, false);
    let specs = TxOptionSpecs::new().with(TxOptionKey::Value, TxOptionSpec::prompt());
    let options = resolve_tx_options(&mut ctx, &specs, &Map::new())?;

    assert_eq!(options.get(TxOptionKey::Value), Some(&int(1000)));
    let transcript = prompt.transcript();
    assert_eq!(transcript.prompts.len(), 1);
    assert_eq!(transcript.rejections.len(), 1);
    Ok(())
}

#[test]
fn absent_prompt_option_fails_when_non_interactive() {
    let prompt = ScriptedPrompt::silent();
    let mut ctx = context(&prompt, true);
    let specs = TxOptionSpecs::new().with(TxOptionKey::Value, TxOptionSpec::prompt());
    let err = resolve_tx_options(&mut ctx, &specs, &Map::new()).unwrap_err();
    assert!(matches!(
        err,
        ResolveError::InteractionRequiredButDisabled { field } if field == "value"
    ));
}

#[test]
fn given_values_win_over_defaults() -> Result<()> {
    let prompt = ScriptedPrompt::silent();
    let mut ctx = context(&prompt, true);
    let specs = TxOptionSpecs::new()
        .with(TxOptionKey::GasPrice, TxOptionSpec::default_to(Some(json!("100"))))
        .with(TxOptionKey::Gas, TxOptionSpec::default_to(Some(json!("50000"))));
    let options = resolve_tx_options(
        &mut ctx,
        &specs,
        &given(json!({
            "gasPrice": "0x10",
            "gas": { "actionType": "value", "value": 60000 }
        })),
    )?;
    assert_eq!(options.get(TxOptionKey::GasPrice), Some(&int(16)));
    assert_eq!(options.get(TxOptionKey::Gas), Some(&int(60000)));
    Ok(())
}

#[test]
fn default_directive_forces_the_configured_default() -> Result<()> {
    let prompt = ScriptedPrompt::silent();
    let mut ctx = context(&prompt, true);
    let specs = TxOptionSpecs::new()
        .with(TxOptionKey::Value, TxOptionSpec::prompt())
        .with(TxOptionKey::GasPrice, TxOptionSpec {
            on_absent: method_prompts::OnAbsent::Prompt,
            default: Some(json!("7")),
        });
    let options = resolve_tx_options(
        &mut ctx,
        &specs,
        &given(json!({
            "value": { "actionType": "default" },
            "gasPrice": { "actionType": "default" }
        })),
    )?;

    assert!(!options.contains(TxOptionKey::Value));
    assert_eq!(options.get(TxOptionKey::GasPrice), Some(&int(7)));
    assert!(prompt.transcript().prompts.is_empty());
    Ok(())
}

#[test]
fn invalid_given_option_prompts_with_seed() -> Result<()> {
    let prompt = ScriptedPrompt::new(["0"]);
    let mut ctx = context(&prompt, false);
    let specs = TxOptionSpecs::new().with(TxOptionKey::Account, TxOptionSpec::default_to(None));
    let options = resolve_tx_options(&mut ctx, &specs, &given(json!({ "account": "7" })))?;

    assert_eq!(
        options.get(TxOptionKey::Account),
        Some(&ResolvedValue::Address(ALICE.to_string()))
    );
    assert_eq!(prompt.transcript().prompts[0].initial.as_deref(), Some("7"));
    Ok(())
}

#[test]
fn invalid_value_directive_fails_when_non_interactive() {
    let prompt = ScriptedPrompt::silent();
    let mut ctx = context(&prompt, true);
    let specs = TxOptionSpecs::new().with(TxOptionKey::Gas, TxOptionSpec::default_to(Some(json!(1))));
    let err = resolve_tx_options(
        &mut ctx,
        &specs,
        &given(json!({ "gas": { "actionType": "value", "value": "lots" } })),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        ResolveError::InteractionRequiredButDisabled { field } if field == "gas"
    ));
}

#[test]
fn eip155_is_copied_through() -> Result<()> {
    let prompt = ScriptedPrompt::silent();
    let mut ctx = context(&prompt, true);
    let options = resolve_tx_options(
        &mut ctx,
        &TxOptionSpecs::new(),
        &given(json!({ "eip155": true })),
    )?;
    assert_eq!(options.eip155(), Some(true));
    assert_eq!(options.to_json(), json!({ "eip155": true }));
    Ok(())
}

#[test]
fn configuration_errors_fail_before_prompting() {
    let prompt = ScriptedPrompt::new(["1"]);
    let mut ctx = context(&prompt, false);
    let specs = TxOptionSpecs::new()
        .with(TxOptionKey::Value, TxOptionSpec::prompt())
        .with(TxOptionKey::Gas, TxOptionSpec::default_to(Some(json!("not-a-number"))));
    let err = resolve_tx_options(&mut ctx, &specs, &Map::new()).unwrap_err();
    assert!(matches!(err, ResolveError::InvalidConfiguration(_)));
    assert!(prompt.transcript().prompts.is_empty());

    let specs = TxOptionSpecs::new().with(TxOptionKey::Value, TxOptionSpec::prompt());
    for bad in [
        json!({ "from": ALICE }),
        json!({ "nonce": 1 }),
        json!({ "gas": 21000 }),
        json!({ "value": { "actionType": "maybe" } }),
        json!({ "eip155": 1 }),
    ] {
        let err = resolve_tx_options(&mut ctx, &specs, &given(bad)).unwrap_err();
        assert!(matches!(err, ResolveError::InvalidConfiguration(_)));
    }
    assert!(prompt.transcript().prompts.is_empty());
}

#[test]
fn options_resolve_in_fixed_order() -> Result<()> {
    let prompt = ScriptedPrompt::new(["1", "2", "3"]);
    let mut ctx = context(&prompt, false);
    let specs = TxOptionSpecs::new()
        .with(TxOptionKey::MaxPriorityFeePerGas, TxOptionSpec::prompt())
        .with(TxOptionKey::Value, TxOptionSpec::prompt())
        .with(TxOptionKey::Account, TxOptionSpec::prompt());
    let options = resolve_tx_options(&mut ctx, &specs, &Map::new())?;

    assert_eq!(options.len(), 3);
    assert_eq!(
        options.get(TxOptionKey::Account),
        Some(&ResolvedValue::Address(BOB.to_string()))
    );
    assert_eq!(options.get(TxOptionKey::Value), Some(&int(2)));
    assert_eq!(options.get(TxOptionKey::MaxPriorityFeePerGas), Some(&int(3)));
    Ok(())
}
