use std::fmt;

use crate::models::{Creator, Platform, StablecoinType};

use super::amount::DonationAmount;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DonationFlowState {
    pub selected_platform: Option<Platform>,
    pub search_query: String,
    pub selected_creator: Option<Creator>,
    pub amount_input: String,
    // None while amount_input is empty or invalid
    pub amount: Option<DonationAmount>,
    pub selected_stablecoin: Option<StablecoinType>,
    pub preview_open: bool,
    pub completed: bool,
}

impl DonationFlowState {
    pub fn initial(default_stablecoin: Option<StablecoinType>) -> Self {
        Self {
            selected_stablecoin: default_stablecoin,
            ..Self::default()
        }
    }

    pub fn stage(&self) -> Stage {
        if self.completed {
            Stage::Completed
        } else if self.preview_open {
            Stage::PreviewOpen
        } else if self.selected_creator.is_some() {
            Stage::EnteringAmount
        } else if self.selected_platform.is_some() {
            Stage::SelectingCreator
        } else {
            Stage::SelectingPlatform
        }
    }

    pub fn can_review(&self) -> bool {
        self.selected_creator.is_some() && self.amount.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    SelectingPlatform,
    SelectingCreator,
    EnteringAmount,
    PreviewOpen,
    Completed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stage::SelectingPlatform => "1. platform選択",
            Stage::SelectingCreator => "2. creator検索",
            Stage::EnteringAmount => "3. amount入力",
            Stage::PreviewOpen => "4. 確認",
            Stage::Completed => "完了",
        };
        f.write_str(label)
    }
}
