//! Audit trail of the platform.
//!
//! Every admin mutation and every state transition emits one of these events.
//! A failed instruction emits nothing, so the trail only holds committed changes.
use anchor_lang::prelude::*;

use crate::state::{
    DrawRunStatus, FundSource, JackpotStatus, LedgerKind, LedgerReason, SlotStatus, TicketStatus,
    WithdrawStatus,
};

// ----------------------------
// Platform
// ----------------------------

#[event]
pub struct ConfigInitialized {
    pub admin: Pubkey,
    pub cash_mint: Pubkey,
    pub treasury: Pubkey,
}

#[event]
pub struct SettingsUpdated {
    pub admin: Pubkey,
    pub hold_duration_secs: i64,
    pub bonus_cap_bps: u16,
    pub utc_offset_secs: i32,
    pub max_withdraw_per_request: u64,
    pub paused: bool,
}

#[event]
pub struct ManagerChanged {
    pub admin: Pubkey,
    pub manager: Pubkey,
    pub added: bool,
}

// ----------------------------
// Ledger
// ----------------------------

/// Mirrors the `LedgerEntry` account for off-chain indexing.
#[event]
pub struct LedgerEntryAppended {
    pub user: Pubkey,
    pub seq: u64,
    pub amount: i64,
    pub kind: LedgerKind,
    pub source: FundSource,
    pub reason: LedgerReason,
    pub reference: Pubkey,
    pub created_at: i64,
}

#[event]
pub struct WithdrawSubmitted {
    pub user: Pubkey,
    pub request: Pubkey,
    pub amount: u64,
}

#[event]
pub struct WithdrawResolved {
    pub actor: Pubkey,
    pub user: Pubkey,
    pub request: Pubkey,
    pub amount: u64,
    pub status: WithdrawStatus,
}

#[event]
pub struct BonusGranted {
    pub actor: Pubkey,
    pub user: Pubkey,
    pub grant: Pubkey,
    pub amount: u64,
    pub expires_at: i64,
}

#[event]
pub struct BonusesExpired {
    pub user: Pubkey,
    pub grants_expired: u32,
    pub amount_removed: u64,
}

// ----------------------------
// Draw runs
// ----------------------------

#[event]
pub struct DrawTemplateSaved {
    pub actor: Pubkey,
    pub template: Pubkey,
    pub template_id: u64,
    pub disabled: bool,
}

#[event]
pub struct DrawRunCreated {
    pub template: Pubkey,
    pub draw_run: Pubkey,
    pub date: u32,
    pub draw_at: i64,
}

#[event]
pub struct DrawRunStatusChanged {
    pub actor: Pubkey,
    pub draw_run: Pubkey,
    pub from: DrawRunStatus,
    pub to: DrawRunStatus,
    pub at: i64,
}

#[event]
pub struct DrawResultDeclared {
    pub actor: Pubkey,
    pub draw: Pubkey,
    pub results: Vec<u32>,
    pub result_digest: [u8; 32],
}

#[event]
pub struct DrawSettled {
    pub draw: Pubkey,
    pub ticket_count: u64,
    pub sales: u64,
    pub total_payout: u64,
}

// ----------------------------
// Slots & seats
// ----------------------------

#[event]
pub struct DigitTemplateCreated {
    pub actor: Pubkey,
    pub template: Pubkey,
    pub digits: u8,
    pub ticket_price: u64,
}

#[event]
pub struct DigitSlotCreated {
    pub actor: Pubkey,
    pub slot: Pubkey,
    pub slot_id: u64,
    pub open_at: i64,
    pub close_at: i64,
}

#[event]
pub struct SlotCloseTimeUpdated {
    pub actor: Pubkey,
    pub slot: Pubkey,
    pub previous_close_at: i64,
    pub new_close_at: i64,
}

#[event]
pub struct SlotStatusChanged {
    pub actor: Pubkey,
    pub slot: Pubkey,
    pub from: SlotStatus,
    pub to: SlotStatus,
}

#[event]
pub struct NumbersHeld {
    pub slot: Pubkey,
    pub user: Pubkey,
    pub numbers: Vec<String>,
    pub hold_until: i64,
}

#[event]
pub struct HoldsReleased {
    pub released: u32,
}

// ----------------------------
// Tickets & settlement
// ----------------------------

#[event]
pub struct TicketsPurchased {
    pub draw: Pubkey,
    pub user: Pubkey,
    pub ticket_count: u32,
    pub wallet_amount: u64,
    pub bonus_amount: u64,
}

#[event]
pub struct TicketSettled {
    pub draw: Pubkey,
    pub ticket: Pubkey,
    pub owner: Pubkey,
    pub status: TicketStatus,
    pub tier: u8,
    pub win_amount: u64,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct WinnerLine {
    pub ticket: Pubkey,
    pub owner: Pubkey,
    pub number: String,
    pub amount: u64,
    pub payout: u64,
}

#[event]
pub struct DigitDrawPreview {
    pub slot: Pubkey,
    pub winning_number: String,
    pub prizes: [u32; 3],
    pub exact_winners: Vec<WinnerLine>,
    pub minus_one_winners: Vec<WinnerLine>,
    pub minus_two_winners: Vec<WinnerLine>,
}

// ----------------------------
// Jackpot
// ----------------------------

#[event]
pub struct JackpotSaved {
    pub actor: Pubkey,
    pub jackpot: Pubkey,
    pub status: JackpotStatus,
}

#[event]
pub struct JackpotStatusChanged {
    pub actor: Pubkey,
    pub jackpot: Pubkey,
    pub from: JackpotStatus,
    pub to: JackpotStatus,
}
