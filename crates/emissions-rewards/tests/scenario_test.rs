mod common;

use common::*;
use emissions_rewards::{EmissionsEngine, TopicOutcome};
use emissions_storage::Store;
use emissions_types::{
    Decimal, ModuleAccount, ModuleParams, ReputerRequestNonce, TaskRewardKind, TokenAmount,
};

fn rewarded(outcome: &TopicOutcome) -> &emissions_rewards::TopicDistribution {
    match outcome {
        TopicOutcome::Rewarded { distribution, .. } => distribution,
        other => panic!("topic was not rewarded: {:?}", other),
    }
}

#[test]
fn test_heaviest_two_topics_split_two_to_one() {
    let mut fx = Fixture::new(stake_weighted_params(), 3000);
    fx.add_topic(TopicSetup::new(1, 10));
    fx.add_topic(TopicSetup::new(2, 5));
    fx.add_topic(TopicSetup::new(3, 1));

    let report = EmissionsEngine::new()
        .emit_rewards(&mut fx.store, &mut fx.ledger, BLOCK_HEIGHT)
        .unwrap();

    assert_eq!(report.weighted, vec![1, 2, 3]);
    assert_eq!(report.inactivated, vec![3]);
    assert_eq!(report.selected, vec![1, 2]);
    assert_eq!(
        report.allocation.rewards[&1],
        TokenAmount::from_base_units(2000)
    );
    assert_eq!(
        report.allocation.rewards[&2],
        TokenAmount::from_base_units(1000)
    );
    assert_eq!(report.allocation.remainder, TokenAmount::ZERO);

    assert!(!fx.store.get_topic(3).unwrap().active);
    assert_eq!(fx.store.get_topic(1).unwrap().weight, Decimal::from(10));

    // Revenue of funded topics is swept; the inactivated topic's stays behind
    assert_eq!(report.settlement.swept, TokenAmount::from_base_units(200));
    assert_eq!(report.settlement.returned, TokenAmount::ZERO);
    assert_eq!(
        fx.ledger.module_balance(ModuleAccount::Ecosystem),
        TokenAmount::from_base_units(200)
    );
    assert_eq!(
        fx.ledger.module_balance(ModuleAccount::Requests),
        TokenAmount::from_base_units(100)
    );
    for id in 1..=3 {
        assert_eq!(
            fx.store.topic_fee_revenue(id).unwrap().revenue,
            TokenAmount::ZERO
        );
    }
}

#[test]
fn test_large_stakes_and_emission_are_rewarded() {
    let total = 1_000_000_000_000_000;
    let mut fx = Fixture::new(stake_weighted_params(), total);
    fx.add_topic(TopicSetup::new(1, 1_000_000_000_000_000));
    fx.add_topic(TopicSetup::new(2, 500_000_000_000_000));

    let report = EmissionsEngine::new()
        .emit_rewards(&mut fx.store, &mut fx.ledger, BLOCK_HEIGHT)
        .unwrap();

    assert_eq!(report.selected, vec![1, 2]);
    assert_eq!(
        report.allocation.rewards[&1],
        TokenAmount::from_base_units(666_666_666_666_666)
    );
    assert_eq!(
        report.allocation.rewards[&2],
        TokenAmount::from_base_units(333_333_333_333_333)
    );
    assert_eq!(report.allocation.remainder, TokenAmount::from_base_units(1));
    assert_eq!(report.failed().count(), 0);
    for topic in &report.topics {
        rewarded(&topic.outcome);
    }
    assert_eq!(
        fx.ledger.module_balance(ModuleAccount::Rewards),
        TokenAmount::from_base_units(total).saturating_sub(report.total_paid())
    );
}

#[test]
fn test_unfunded_topic_revenue_is_returned() {
    let params = ModuleParams {
        max_topics_per_block: 1,
        ..stake_weighted_params()
    };
    let mut fx = Fixture::new(params, 1000);
    fx.add_topic(TopicSetup::new(1, 10));
    fx.add_topic(TopicSetup::new(2, 5));

    let report = EmissionsEngine::new()
        .emit_rewards(&mut fx.store, &mut fx.ledger, BLOCK_HEIGHT)
        .unwrap();

    assert_eq!(report.selected, vec![1]);
    assert_eq!(report.settlement.returned, TokenAmount::from_base_units(100));
    assert_eq!(report.settlement.swept, TokenAmount::from_base_units(100));
    assert_eq!(
        fx.ledger.module_balance(ModuleAccount::Requests),
        TokenAmount::from_base_units(100)
    );
    assert_eq!(
        fx.store.topic_fee_revenue(2).unwrap().revenue,
        TokenAmount::ZERO
    );
    // Unfunded topics stay active and are not marked churn-ready
    assert!(fx.store.get_topic(2).unwrap().active);
    assert!(fx.store.is_churn_ready(1));
    assert!(!fx.store.is_churn_ready(2));
}

#[test]
fn test_zero_forecasters_earn_nothing() {
    let mut fx = Fixture::new(stake_weighted_params(), 10_000);
    fx.add_topic(TopicSetup {
        with_forecasters: false,
        ..TopicSetup::new(1, 10)
    });

    let report = EmissionsEngine::new()
        .emit_rewards(&mut fx.store, &mut fx.ledger, BLOCK_HEIGHT)
        .unwrap();

    let distribution = rewarded(&report.topics[0].outcome);
    assert_eq!(distribution.shares.forecast, Decimal::ZERO);
    assert_eq!(distribution.task_rewards.forecast, TokenAmount::ZERO);
    assert!(distribution
        .rewards
        .iter()
        .all(|r| r.kind != TaskRewardKind::ForecastWorker));
    for forecaster in forecasters() {
        assert_eq!(fx.ledger.account_balance(&forecaster), TokenAmount::ZERO);
    }
}

#[test]
fn test_no_loss_improvement_gives_forecasters_no_share() {
    let mut fx = Fixture::new(stake_weighted_params(), 10_000);
    fx.add_topic(TopicSetup {
        naive_loss: 8,
        combined_loss: 8,
        ..TopicSetup::new(1, 10)
    });

    let report = EmissionsEngine::new()
        .emit_rewards(&mut fx.store, &mut fx.ledger, BLOCK_HEIGHT)
        .unwrap();

    let distribution = rewarded(&report.topics[0].outcome);
    assert_eq!(distribution.forecast_utility, Decimal::ZERO);
    assert_eq!(distribution.shares.forecast, Decimal::ZERO);
    assert_eq!(distribution.task_rewards.forecast, TokenAmount::ZERO);
    assert!(distribution.task_rewards.inference > TokenAmount::ZERO);
}

#[test]
fn test_payouts_reach_stake_and_accounts() {
    let mut fx = Fixture::new(stake_weighted_params(), 10_000);
    fx.add_topic(TopicSetup::new(1, 10));

    let report = EmissionsEngine::new()
        .emit_rewards(&mut fx.store, &mut fx.ledger, BLOCK_HEIGHT)
        .unwrap();

    let distribution = rewarded(&report.topics[0].outcome);
    let staked: TokenAmount = reputers()
        .iter()
        .map(|r| fx.ledger.stake_of(1, r))
        .sum();
    assert_eq!(
        staked,
        distribution
            .task_rewards
            .reputer
            .saturating_sub(reputer_dust(distribution))
    );
    assert_eq!(fx.ledger.module_balance(ModuleAccount::Staking), staked);

    let worker_paid: TokenAmount = inferers()
        .iter()
        .chain(forecasters().iter())
        .map(|a| fx.ledger.account_balance(a))
        .sum();
    assert_eq!(staked.saturating_add(worker_paid), report.total_paid());

    // Whatever was not paid out stays in the rewards account
    assert_eq!(
        fx.ledger.module_balance(ModuleAccount::Rewards),
        TokenAmount::from_base_units(10_000).saturating_sub(report.total_paid())
    );
    assert_eq!(
        report.total_paid().saturating_add(report.total_dust()),
        TokenAmount::from_base_units(10_000)
    );
}

fn reputer_dust(distribution: &emissions_rewards::TopicDistribution) -> TokenAmount {
    let paid: TokenAmount = distribution
        .rewards
        .iter()
        .filter(|r| r.kind == TaskRewardKind::Reputer)
        .map(|r| r.reward)
        .sum();
    distribution.task_rewards.reputer.saturating_sub(paid)
}

#[test]
fn test_settled_records_are_pruned() {
    let mut fx = Fixture::new(stake_weighted_params(), 1000);
    fx.add_topic(TopicSetup::new(1, 10));
    fx.store
        .add_unfulfilled_reputer_nonce(1, ReputerRequestNonce::new(80, 70))
        .unwrap();
    let bundle = fx.store.network_loss_bundle(1, NONCE).unwrap().unwrap();
    for height in [40, 49, 50, 60] {
        fx.store.set_loss_bundle(1, height, bundle);
    }

    let report = EmissionsEngine::new()
        .emit_rewards(&mut fx.store, &mut fx.ledger, BLOCK_HEIGHT)
        .unwrap();

    match &report.topics[0].outcome {
        TopicOutcome::Rewarded { prune, .. } => {
            // 80 - 3 epochs of 10 blocks
            assert_eq!(prune.floor, 50);
            assert_eq!(prune.stats.loss_bundles, 2);
        }
        other => panic!("topic was not rewarded: {:?}", other),
    }
    assert_eq!(fx.store.loss_bundle_heights(1), vec![50, 60, NONCE]);
    assert_eq!(fx.store.score_heights(1), vec![NONCE]);
    assert_eq!(fx.store.topic_reward_nonce(1).unwrap(), None);
}

#[test]
fn test_topics_mid_epoch_are_left_alone() {
    let mut fx = Fixture::new(stake_weighted_params(), 1000);
    fx.add_topic(TopicSetup::new(1, 10));
    let mut topic = fx.store.get_topic(1).unwrap();
    topic.epoch_last_ended = 95;
    fx.store.set_topic(&topic).unwrap();

    let report = EmissionsEngine::new()
        .emit_rewards(&mut fx.store, &mut fx.ledger, BLOCK_HEIGHT)
        .unwrap();

    assert!(report.weighted.is_empty());
    assert!(report.topics.is_empty());
    assert_eq!(report.allocation.remainder, TokenAmount::from_base_units(1000));
    assert_eq!(
        fx.store.topic_fee_revenue(1).unwrap().revenue,
        TokenAmount::from_base_units(100)
    );
}
