//! Governance reads and write supplements.
//!
//! # Responsibilities
//! - Read voting power and delegation status for a token holder
//! - Distinguish "contract lacks the capability" from transport noise
//! - Submit delegation and token transfers through the same seam
//!
//! Votes render at fixed 18-decimal precision, matching how governance
//! tokens account voting units.

use alloy::primitives::U256;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

use crate::error::{SyncError, SyncResult};
use crate::portfolio::units::{format_units_exact, parse_units_exact};
use crate::session::{Session, WalletAddress};

/// Precision of governance vote counts.
const VOTE_DECIMALS: u8 = 18;

/// Voting power and delegation status of one holder.
#[derive(Debug, Clone, Serialize)]
pub struct VotingPower {
    pub holder: WalletAddress,
    pub token: WalletAddress,
    pub delegate: WalletAddress,
    /// Raw vote count as a decimal string.
    pub raw_votes: String,
    /// Exact decimal rendering at 18 decimals.
    pub votes: String,
}

/// Read-only and write capabilities of a governance-capable token.
#[async_trait]
pub trait GovernanceCalls: Send + Sync {
    async fn get_votes(
        &self,
        token: &WalletAddress,
        holder: &WalletAddress,
    ) -> SyncResult<U256>;

    async fn delegates(
        &self,
        token: &WalletAddress,
        holder: &WalletAddress,
    ) -> SyncResult<WalletAddress>;

    async fn decimals(&self, token: &WalletAddress) -> SyncResult<u8>;

    async fn delegate(&self, token: &WalletAddress, delegatee: &WalletAddress) -> SyncResult<()>;

    async fn transfer(
        &self,
        token: &WalletAddress,
        to: &WalletAddress,
        amount: U256,
    ) -> SyncResult<()>;
}

/// Adapter over a governance-capable token's capability surface.
pub struct GovernanceAdapter {
    calls: Arc<dyn GovernanceCalls>,
}

impl GovernanceAdapter {
    pub fn new(calls: Arc<dyn GovernanceCalls>) -> Self {
        Self { calls }
    }

    /// Voting power and delegation status for the session holder.
    ///
    /// An absent session yields `Unauthorized` without any remote
    /// call; a token lacking the governance capability surfaces as
    /// `UnsupportedCapability`.
    pub async fn get_voting_power(
        &self,
        token: &WalletAddress,
        session: Option<&Session>,
    ) -> SyncResult<VotingPower> {
        let session = session.ok_or_else(|| {
            SyncError::Unauthorized("voting power requires a session identity".to_string())
        })?;
        let holder = session.wallet();

        let (votes, delegate) = tokio::try_join!(
            self.calls.get_votes(token, holder),
            self.calls.delegates(token, holder),
        )?;

        Ok(VotingPower {
            holder: holder.clone(),
            token: token.clone(),
            delegate,
            raw_votes: votes.to_string(),
            votes: format_units_exact(votes, VOTE_DECIMALS),
        })
    }

    /// Delegate the session holder's voting power.
    pub async fn delegate_votes(
        &self,
        token: &WalletAddress,
        delegatee: &WalletAddress,
    ) -> SyncResult<()> {
        self.calls.delegate(token, delegatee).await
    }

    /// Transfer tokens, parsing the human-readable amount at the
    /// token's own precision.
    pub async fn send_tokens(
        &self,
        token: &WalletAddress,
        to: &WalletAddress,
        amount: &str,
    ) -> SyncResult<()> {
        let decimals = self.calls.decimals(token).await?;
        let units = parse_units_exact(amount, decimals)?;
        self.calls.transfer(token, to, units).await
    }
}
