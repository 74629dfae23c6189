#![allow(dead_code)]

use emissions_storage::{MemoryLedger, MemoryStore};
use emissions_types::{
    AccountAddress, BlockHeight, Decimal, LossBundle, ModuleAccount, ModuleParams,
    ParticipantScore, TaskRewardKind, TokenAmount, Topic, TopicId,
};

pub const EPOCH_LENGTH: BlockHeight = 10;
pub const BLOCK_HEIGHT: BlockHeight = 100;
pub const NONCE: BlockHeight = 90;

pub fn addr(n: u8) -> AccountAddress {
    AccountAddress::from_bytes([n; 32])
}

pub fn reputers() -> Vec<AccountAddress> {
    (1..=3).map(addr).collect()
}

pub fn inferers() -> Vec<AccountAddress> {
    (11..=13).map(addr).collect()
}

pub fn forecasters() -> Vec<AccountAddress> {
    (21..=22).map(addr).collect()
}

/// Params under which a topic's weight equals its stake.
pub fn stake_weighted_params() -> ModuleParams {
    ModuleParams {
        max_topics_per_block: 2,
        min_topic_weight: Decimal::from(2),
        topic_reward_stake_importance: Decimal::ONE,
        topic_reward_fee_revenue_importance: Decimal::ZERO,
        ..ModuleParams::default()
    }
}

pub fn scores(addresses: &[AccountAddress], values: &[i64]) -> Vec<ParticipantScore> {
    addresses
        .iter()
        .zip(values)
        .map(|(a, v)| ParticipantScore::new(*a, Decimal::from(*v)))
        .collect()
}

pub struct TopicSetup {
    pub id: TopicId,
    pub stake: u64,
    pub revenue: u64,
    pub reward_nonce: Option<BlockHeight>,
    pub naive_loss: i64,
    pub combined_loss: i64,
    pub with_forecasters: bool,
}

impl TopicSetup {
    pub fn new(id: TopicId, stake: u64) -> Self {
        Self {
            id,
            stake,
            revenue: 100,
            reward_nonce: Some(NONCE),
            naive_loss: 10,
            combined_loss: 5,
            with_forecasters: true,
        }
    }
}

pub struct Fixture {
    pub store: MemoryStore,
    pub ledger: MemoryLedger,
}

impl Fixture {
    pub fn new(params: ModuleParams, total_reward: u64) -> Self {
        let mut store = MemoryStore::new();
        store.set_params(params);
        store.set_total_reward(TokenAmount::from_base_units(total_reward));

        let mut ledger = MemoryLedger::new();
        ledger.fund_module(
            ModuleAccount::Rewards,
            TokenAmount::from_base_units(total_reward),
        );
        Self { store, ledger }
    }

    pub fn add_topic(&mut self, setup: TopicSetup) {
        let store = &mut self.store;
        store.insert_topic(Topic::new(setup.id, EPOCH_LENGTH));
        store.set_topic_stake(setup.id, TokenAmount::from_base_units(setup.stake));
        store.add_topic_fee_revenue(setup.id, TokenAmount::from_base_units(setup.revenue));
        self.ledger.fund_module(
            ModuleAccount::Requests,
            TokenAmount::from_base_units(setup.revenue),
        );

        let Some(nonce) = setup.reward_nonce else {
            return;
        };
        store.set_topic_reward_nonce(setup.id, nonce);
        store.set_loss_bundle(
            setup.id,
            nonce,
            LossBundle {
                naive_value: Decimal::from(setup.naive_loss),
                combined_value: Decimal::from(setup.combined_loss),
            },
        );
        store.set_scores(
            setup.id,
            nonce,
            TaskRewardKind::Reputer,
            scores(&reputers(), &[7, 5, 6]),
        );
        store.set_scores(
            setup.id,
            nonce,
            TaskRewardKind::InferenceWorker,
            scores(&inferers(), &[2, 4, 3]),
        );
        if setup.with_forecasters {
            store.set_scores(
                setup.id,
                nonce,
                TaskRewardKind::ForecastWorker,
                scores(&forecasters(), &[1, 2]),
            );
        }
    }
}
