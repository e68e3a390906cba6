/// Ancestor levels that receive a point for each new referral.
pub const MAX_CREDIT_DEPTH: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    SelfReferral,
    AlreadyReferred,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreditOutcome {
    /// Edge written; `credited` lists the ancestors whose score went up, nearest first.
    Accepted { credited: Vec<i64> },
    Rejected(RejectReason),
}

impl CreditOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, CreditOutcome::Accepted { .. })
    }
}
