use serde::Serialize;

/// 有効化状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationState {
    Inactive,
    Active,
}

impl ActivationState {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Inactive => "inactive",
            Self::Active => "active",
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// トグルボタンの表示ラベル
    pub fn toggle_label(&self) -> &'static str {
        match self {
            Self::Inactive => "Activate",
            Self::Active => "Deactivate",
        }
    }
}

/// 有効化フラグと世代番号。
///
/// 世代番号は有効化のたびに進み、以前の有効化期間に開始された
/// 取得結果を判別するのに使う。
#[derive(Debug)]
pub struct Activation {
    state: ActivationState,
    epoch: u64,
    updated_at: Option<String>,
}

impl Activation {
    pub fn new() -> Self {
        Self {
            state: ActivationState::Inactive,
            epoch: 0,
            updated_at: None,
        }
    }

    pub fn state(&self) -> ActivationState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn updated_at(&self) -> Option<&str> {
        self.updated_at.as_deref()
    }

    /// toggle: Inactive→Active（世代を進める）, Active→Inactive
    pub fn toggle(&mut self, now: String) -> StateTransition {
        let prev = self.state;
        self.state = match prev {
            ActivationState::Inactive => {
                self.epoch += 1;
                ActivationState::Active
            }
            ActivationState::Active => ActivationState::Inactive,
        };
        self.updated_at = Some(now.clone());
        StateTransition {
            prev_state: prev,
            new_state: self.state,
            epoch: self.epoch,
            timestamp: now,
        }
    }

    /// 取得開始時の世代のまま有効かどうか
    pub fn is_current(&self, epoch: u64) -> bool {
        self.is_active() && self.epoch == epoch
    }
}

impl Default for Activation {
    fn default() -> Self {
        Self::new()
    }
}

/// 状態遷移ペイロード
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateTransition {
    pub prev_state: ActivationState,
    pub new_state: ActivationState,
    pub epoch: u64,
    pub timestamp: String,
}

impl StateTransition {
    pub fn activated(&self) -> bool {
        self.new_state.is_active()
    }
}
