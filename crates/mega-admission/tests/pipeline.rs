//! Tests for the admission pipeline: stage ordering, state branching and event emission.

use std::sync::Arc;

use alloy_primitives::U256;
use mega_admission::{
    test_utils::{
        coins, init_tracing, send_tx, CallLog, RejectAllSignatures, TestNode, ALICE, BOB,
    },
    AdmissionContext, AdmissionError, AdmissionEvent, AdmissionPipeline, BankError, Coin, Coins,
    ExecMode, LedgerState, Transaction,
};
use rstest::rstest;

#[test]
fn test_finalize_commits_fee_and_event() {
    init_tracing();
    let mut node = TestNode::default().with_funds(ALICE, "100atom");
    let pipeline = node.pipeline();

    let mut ctx = AdmissionContext::new(ExecMode::Finalize, &mut node.ledger).with_block_height(1);
    pipeline.admit(&mut ctx, &send_tx(ALICE, "30atom", 1_000)).unwrap();
    let events = ctx.into_events();

    assert_eq!(events.events(), &[AdmissionEvent { fee: coins("30atom"), fee_payer: ALICE }]);
    assert_eq!(node.balance(ALICE, "atom"), U256::from(70));
    assert_eq!(node.balance(node.fee_collector(), "atom"), U256::from(30));
    assert_eq!(node.bank.transfers(), 1);
    assert_eq!(node.signatures.calls(), 1);
}

#[rstest]
#[case::check(ExecMode::Check)]
#[case::recheck(ExecMode::ReCheck)]
#[case::simulate(ExecMode::Simulate)]
fn test_non_finalize_modes_discard_writes_but_emit_events(#[case] mode: ExecMode) {
    let mut node = TestNode::default().with_funds(ALICE, "100atom");
    let before = node.ledger.clone();
    let pipeline = node.pipeline();

    let mut ctx = AdmissionContext::new(mode, &mut node.ledger).with_block_height(1);
    pipeline.admit(&mut ctx, &send_tx(ALICE, "30atom", 1_000)).unwrap();
    let events = ctx.into_events();

    assert_eq!(events.events(), &[AdmissionEvent { fee: coins("30atom"), fee_payer: ALICE }]);
    // The fee was deducted on the branch, but the branch was dropped.
    assert_eq!(node.bank.transfers(), 1);
    assert_eq!(node.ledger, before);
}

#[test]
fn test_execute_sees_admitted_state() {
    let mut node = TestNode::default().with_funds(ALICE, "100atom");
    let pipeline = node.pipeline();

    let mut ctx = AdmissionContext::new(ExecMode::Finalize, &mut node.ledger).with_block_height(1);
    let observed = pipeline
        .run(&mut ctx, &send_tx(ALICE, "30atom", 1_000), |ctx, _| {
            ctx.state_mut().set_balance(BOB, "atom", U256::from(5));
            Ok::<_, AdmissionError>(ctx.state().balance(ALICE, "atom"))
        })
        .unwrap();
    drop(ctx);

    assert_eq!(observed, U256::from(70));
    assert_eq!(node.balance(BOB, "atom"), U256::from(5));
}

#[rstest]
#[case::check(ExecMode::Check)]
#[case::simulate(ExecMode::Simulate)]
fn test_execute_sees_admitted_state_outside_finalize(#[case] mode: ExecMode) {
    let mut node = TestNode::default().with_funds(ALICE, "100atom");
    let before = node.ledger.clone();
    let pipeline = node.pipeline();

    let mut ctx = AdmissionContext::new(mode, &mut node.ledger).with_block_height(1);
    let observed = pipeline
        .run(&mut ctx, &send_tx(ALICE, "30atom", 1_000), |ctx, _| {
            Ok::<_, AdmissionError>(ctx.state().balance(ALICE, "atom"))
        })
        .unwrap();
    drop(ctx);

    assert_eq!(observed, U256::from(70));
    assert_eq!(node.ledger, before);
}

#[test]
fn test_execution_failure_still_charges_fee() {
    let mut node = TestNode::default().with_funds(ALICE, "100atom");
    let pipeline = node.pipeline();

    let mut ctx = AdmissionContext::new(ExecMode::Finalize, &mut node.ledger).with_block_height(1);
    let result = pipeline.run(&mut ctx, &send_tx(ALICE, "30atom", 1_000), |ctx, _| {
        ctx.state_mut().set_balance(BOB, "atom", U256::from(5));
        ctx.emit(AdmissionEvent { fee: coins("1stake"), fee_payer: BOB });
        Err::<(), _>(AdmissionError::Execution("out of gas".into()))
    });
    assert!(matches!(result, Err(AdmissionError::Execution(_))));
    let events = ctx.into_events();

    // Only the fee event survives; the execution's own writes and events are dropped.
    assert_eq!(events.events(), &[AdmissionEvent { fee: coins("30atom"), fee_payer: ALICE }]);
    assert_eq!(node.balance(ALICE, "atom"), U256::from(70));
    assert_eq!(node.balance(node.fee_collector(), "atom"), U256::from(30));
    assert_eq!(node.balance(BOB, "atom"), U256::ZERO);
}

#[test]
fn test_rejected_transaction_leaves_no_trace() {
    let mut node = TestNode::default().with_funds(ALICE, "10atom");
    let before = node.ledger.clone();
    let pipeline = node.pipeline();

    let mut ctx = AdmissionContext::new(ExecMode::Finalize, &mut node.ledger).with_block_height(1);
    let mut executed = false;
    let result = pipeline.run(&mut ctx, &send_tx(ALICE, "30atom", 1_000), |_, _| {
        executed = true;
        Ok::<_, AdmissionError>(())
    });
    assert!(matches!(result, Err(AdmissionError::InsufficientFunds(_))));
    assert!(!executed);
    assert!(ctx.events().is_empty());
    drop(ctx);

    assert_eq!(node.ledger, before);
}

#[test]
fn test_nested_pipeline_shares_enclosing_branch() {
    let mut node = TestNode::default().with_funds(ALICE, "100atom");
    let pipeline = AdmissionPipeline::default().with_decorator(node.pipeline());
    assert_eq!(pipeline.len(), 1);

    let mut ctx = AdmissionContext::new(ExecMode::Finalize, &mut node.ledger).with_block_height(1);
    pipeline.admit(&mut ctx, &send_tx(ALICE, "30atom", 1_000)).unwrap();
    assert_eq!(ctx.events().len(), 1);
    drop(ctx);

    assert_eq!(node.balance(ALICE, "atom"), U256::from(70));
}

#[test]
fn test_first_validator_failure_stops_pipeline() {
    let node = TestNode::default().with_funds(ALICE, "100atom");
    let log = CallLog::default();
    let validators = node
        .validators()
        .with_validator(log.validator("first", Ok(())))
        .with_validator(log.validator("second", Err(AdmissionError::InvalidTransaction("memo too long".into()))))
        .with_validator(log.validator("third", Ok(())));
    let pipeline = AdmissionPipeline::new(validators, node.deduct_fee_decorator());

    let mut ledger = node.ledger.clone();
    let mut ctx = AdmissionContext::new(ExecMode::Check, &mut ledger).with_block_height(1);
    let err = pipeline.admit(&mut ctx, &send_tx(ALICE, "30atom", 1_000)).unwrap_err();

    assert!(matches!(err, AdmissionError::InvalidTransaction(ref reason) if reason == "memo too long"));
    assert_eq!(log.entries(), ["first", "second"]);
    assert_eq!(node.signatures.calls(), 0);
    assert_eq!(node.bank.transfers(), 0);
    assert_eq!(node.feegrants.calls(), 0);
}

#[test]
fn test_signature_failure_rejects_before_fees() {
    let node = TestNode::default().with_funds(ALICE, "100atom");
    let validators = mega_admission::TxValidatorSet::new(RejectAllSignatures);
    let pipeline = AdmissionPipeline::new(validators, node.deduct_fee_decorator());

    let mut ledger = node.ledger.clone();
    let mut ctx = AdmissionContext::new(ExecMode::Finalize, &mut ledger).with_block_height(1);
    let err = pipeline.admit(&mut ctx, &send_tx(ALICE, "30atom", 1_000)).unwrap_err();
    assert!(matches!(err, AdmissionError::Unauthorized(_)));
    assert_eq!(node.bank.transfers(), 0);
}

#[test]
fn test_empty_transaction_rejected() {
    let mut node = TestNode::default().with_funds(ALICE, "100atom");
    let pipeline = node.pipeline();
    let tx = Transaction::builder().signer(ALICE).fee(coins("1atom")).gas(1).build();

    let mut ctx = AdmissionContext::new(ExecMode::Check, &mut node.ledger);
    assert!(matches!(pipeline.admit(&mut ctx, &tx), Err(AdmissionError::InvalidTransaction(_))));
}

#[rstest]
#[case::empty(Coins::empty())]
#[case::explicit_zero(Coins::from_raw(vec![Coin::new("atom", U256::ZERO)]))]
fn test_zero_fee_skips_transfer(#[case] fee: Coins) {
    let mut node = TestNode::default();
    let pipeline = node.pipeline();
    let tx = Transaction::builder()
        .msg(mega_admission::Msg::new(mega_admission::test_utils::MSG_SEND))
        .signer(ALICE)
        .fee(fee)
        .gas(1_000)
        .build();

    let mut ctx = AdmissionContext::new(ExecMode::Finalize, &mut node.ledger).with_block_height(1);
    pipeline.admit(&mut ctx, &tx).unwrap();
    let events = ctx.into_events();

    assert_eq!(node.bank.transfers(), 0);
    assert_eq!(events.events(), &[AdmissionEvent { fee: Coins::empty(), fee_payer: ALICE }]);
    assert_eq!(events.events()[0].attributes()[0], ("fee", String::new()));
}

#[test]
fn test_insufficient_funds_moves_nothing() {
    let mut node = TestNode::default().with_funds(ALICE, "100atom,5stake");
    let before = node.ledger.clone();
    let pipeline = node.pipeline();

    let mut ctx = AdmissionContext::new(ExecMode::Finalize, &mut node.ledger).with_block_height(1);
    let err = pipeline.admit(&mut ctx, &send_tx(ALICE, "10atom,10stake", 1_000)).unwrap_err();
    assert!(matches!(
        err,
        AdmissionError::InsufficientFunds(BankError::InsufficientFunds { ref denom, .. }) if denom == "stake"
    ));
    assert!(!err.is_node_defect());
    drop(ctx);

    assert_eq!(node.ledger, before);
}

#[rstest]
#[case::live_height(1, true)]
#[case::genesis(0, false)]
fn test_zero_gas(#[case] height: u64, #[case] rejected: bool) {
    let mut node = TestNode::default();
    let pipeline = node.pipeline();
    let mut ctx = AdmissionContext::new(ExecMode::Finalize, &mut node.ledger).with_block_height(height);

    let result = pipeline.admit(&mut ctx, &send_tx(ALICE, "", 0));
    assert_eq!(matches!(result, Err(AdmissionError::InvalidGasLimit { height: 1 })), rejected);
    if let Err(err) = result {
        assert_eq!(err.to_string(), "invalid gas limit: must provide positive gas (height 1)");
    }
}

#[test]
fn test_simulate_accepts_zero_gas() {
    let mut node = TestNode::default().with_funds(ALICE, "5atom");
    let pipeline = node.pipeline();
    let mut ctx = AdmissionContext::new(ExecMode::Simulate, &mut node.ledger).with_block_height(10);
    pipeline.admit(&mut ctx, &send_tx(ALICE, "5atom", 0)).unwrap();
}

#[test]
fn test_missing_fee_collector() {
    let node = TestNode::default().with_funds(ALICE, "100atom");
    let accounts = Arc::new(mega_admission::ModuleAccounts::default());
    let deduct = mega_admission::DeductFeeDecorator::new(accounts.clone(), mega_admission::LedgerBank::new(accounts));
    let pipeline = AdmissionPipeline::new(node.validators(), deduct);

    let mut ledger = node.ledger.clone();
    let mut ctx = AdmissionContext::new(ExecMode::Finalize, &mut ledger).with_block_height(1);
    let err = pipeline.admit(&mut ctx, &send_tx(ALICE, "1atom", 1_000)).unwrap_err();
    assert!(matches!(err, AdmissionError::MisconfiguredFeeCollector(_)));
    assert!(err.is_node_defect());
}

#[test]
fn test_sequential_transactions_share_committed_state() {
    let mut node = TestNode::default().with_funds(ALICE, "100atom");
    let pipeline = node.pipeline();

    let mut ctx = AdmissionContext::new(ExecMode::Finalize, &mut node.ledger).with_block_height(1);
    pipeline.admit(&mut ctx, &send_tx(ALICE, "60atom", 1_000)).unwrap();
    assert!(matches!(
        pipeline.admit(&mut ctx, &send_tx(ALICE, "60atom", 1_000)),
        Err(AdmissionError::InsufficientFunds(_))
    ));
    pipeline.admit(&mut ctx, &send_tx(ALICE, "40atom", 1_000)).unwrap();
    assert_eq!(ctx.events().len(), 2);
    drop(ctx);

    assert_eq!(node.balance(ALICE, "atom"), U256::ZERO);
    assert_eq!(node.balance(node.fee_collector(), "atom"), U256::from(100));
}
