use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::{Context, Result, anyhow};
use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tokio::time::{Duration, Instant};

use crate::models::{
    Creator, NewTransaction, Platform, StablecoinBalance, StablecoinType, TransactionStatus,
};
use crate::provider::DataProvider;

use super::amount::DonationAmount;
use super::preview::{Preview, compute_preview};
use super::state::{DonationFlowState, Stage};

pub const RESET_DELAY: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, PartialEq)]
pub struct DonationReceipt {
    pub creator: Creator,
    pub stablecoin: StablecoinType,
    pub preview: Preview,
}

impl DonationReceipt {
    pub fn into_transaction(self) -> NewTransaction {
        NewTransaction {
            creator_id: self.creator.id,
            creator_name: self.creator.name,
            platform: self.creator.platform,
            amount: self.preview.amount,
            stablecoin: self.stablecoin,
            status: TransactionStatus::Completed,
            tx_hash: None,
            fee: self.preview.fee,
            conversion_rate: self.preview.conversion_rate,
        }
    }
}

// The reset task only holds a Weak to the state and is aborted on drop.
pub struct FlowController {
    balances: Vec<StablecoinBalance>,
    creators: Vec<Creator>,
    state: Arc<Mutex<DonationFlowState>>,
    pending_reset: Option<AbortHandle>,
}

impl FlowController {
    pub fn new(balances: Vec<StablecoinBalance>, creators: Vec<Creator>) -> Self {
        let initial = DonationFlowState::initial(balances.first().map(|b| b.kind));
        Self {
            balances,
            creators,
            state: Arc::new(Mutex::new(initial)),
            pending_reset: None,
        }
    }

    pub fn from_provider(provider: &dyn DataProvider) -> Result<Self> {
        let balances = provider.balances().context("残高の取得に失敗しました")?;
        let creators = provider.creators().context("creator一覧の取得に失敗しました")?;
        tracing::debug!(
            balances = balances.len(),
            creators = creators.len(),
            "flow controller initialized"
        );
        Ok(Self::new(balances, creators))
    }

    pub fn state(&self) -> DonationFlowState {
        self.lock().clone()
    }

    pub fn stage(&self) -> Stage {
        self.lock().stage()
    }

    // From the success screen this starts over and drops the pending reset.
    pub fn select_platform(&mut self, platform: Platform) {
        let completed = self.lock().completed;
        if completed {
            if let Some(pending) = self.pending_reset.take() {
                pending.abort();
            }
            let initial = self.initial_state();
            *self.lock() = initial;
        }

        let mut state = self.lock();
        state.selected_platform = Some(platform);
        state.selected_creator = None;
        state.preview_open = false;
        tracing::info!(%platform, "platform selected");
    }

    pub fn set_search_query(&self, query: &str) {
        self.lock().search_query = query.to_string();
    }

    // no platform selected: every creator matches
    pub fn filtered_creators(&self) -> Vec<&Creator> {
        let state = self.lock();
        let query = state.search_query.to_lowercase();
        self.creators
            .iter()
            .filter(|c| state.selected_platform.is_none_or(|p| c.platform == p))
            .filter(|c| c.name.to_lowercase().contains(&query))
            .collect()
    }

    pub fn select_creator(&self, creator_id: &str) -> Result<Creator> {
        let creator = self
            .creators
            .iter()
            .find(|c| c.id == creator_id)
            .ok_or_else(|| anyhow!("creatorが見つかりません: id={creator_id}"))?;

        let mut state = self.lock();
        match state.selected_platform {
            Some(platform) if platform == creator.platform => {}
            Some(platform) => {
                return Err(anyhow!(
                    "platform不一致: selected={platform} creator={} platform={}",
                    creator.name,
                    creator.platform
                ));
            }
            None => return Err(anyhow!("先にplatformを選択してください")),
        }

        state.selected_creator = Some(creator.clone());
        state.preview_open = false;
        tracing::info!(creator = %creator.name, id = %creator.id, "creator selected");
        Ok(creator.clone())
    }

    pub fn set_amount(&self, text: &str) {
        let mut state = self.lock();
        state.amount_input = text.to_string();
        state.amount = DonationAmount::parse(text).ok();
        if state.amount.is_none() && state.preview_open {
            state.preview_open = false;
            tracing::debug!("preview closed after amount became invalid");
        }
    }

    pub fn set_stablecoin(&self, kind: StablecoinType) -> Result<()> {
        if !self.balances.iter().any(|b| b.kind == kind) {
            return Err(anyhow!("残高のないstablecoinは選択できません: {kind}"));
        }
        self.lock().selected_stablecoin = Some(kind);
        Ok(())
    }

    pub fn can_review(&self) -> bool {
        self.lock().can_review()
    }

    pub fn open_preview(&self) -> bool {
        let mut state = self.lock();
        if !state.can_review() {
            tracing::debug!(amount = %state.amount_input, "preview requested before input is valid");
            return false;
        }
        state.preview_open = true;
        true
    }

    pub fn close_preview(&self) {
        self.lock().preview_open = false;
    }

    pub fn preview(&self) -> Option<Preview> {
        self.lock().amount.map(compute_preview)
    }

    // Needs a tokio runtime to schedule the reset, but only once the preview is open.
    pub fn confirm_donation(&mut self) -> Result<Option<DonationReceipt>> {
        let (receipt, runtime) = {
            let mut state = self.lock();
            if !state.preview_open {
                tracing::debug!("confirm ignored: preview is not open");
                return Ok(None);
            }
            let (Some(creator), Some(amount)) = (state.selected_creator.clone(), state.amount)
            else {
                return Ok(None);
            };
            let stablecoin = state
                .selected_stablecoin
                .ok_or_else(|| anyhow!("stablecoinが選択されていません"))?;
            let runtime =
                Handle::try_current().context("リセットタスクの起動にはtokio runtimeが必要です")?;

            state.completed = true;
            state.preview_open = false;

            let receipt = DonationReceipt {
                creator,
                stablecoin,
                preview: compute_preview(amount),
            };
            (receipt, runtime)
        };

        tracing::info!(
            creator = %receipt.creator.name,
            amount = receipt.preview.amount,
            final_amount = receipt.preview.final_amount,
            stablecoin = %receipt.stablecoin,
            "donation confirmed"
        );

        self.schedule_reset(&runtime);
        Ok(Some(receipt))
    }

    fn schedule_reset(&mut self, runtime: &Handle) {
        if let Some(previous) = self.pending_reset.take() {
            previous.abort();
        }

        let deadline = Instant::now() + RESET_DELAY;
        let state = Arc::downgrade(&self.state);
        let initial = self.initial_state();

        let task = runtime.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            let Some(state) = state.upgrade() else {
                return;
            };
            *lock_state(&state) = initial;
            tracing::info!("donation flow reset");
        });
        self.pending_reset = Some(task.abort_handle());
    }

    fn initial_state(&self) -> DonationFlowState {
        DonationFlowState::initial(self.balances.first().map(|b| b.kind))
    }

    fn lock(&self) -> MutexGuard<'_, DonationFlowState> {
        lock_state(&self.state)
    }
}

impl Drop for FlowController {
    fn drop(&mut self) {
        if let Some(pending) = self.pending_reset.take() {
            pending.abort();
        }
    }
}

fn lock_state(state: &Mutex<DonationFlowState>) -> MutexGuard<'_, DonationFlowState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
