// programs/numbers_lottery/src/contexts.rs

use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::errors::LotteryError;
use crate::state::{
    BonusGrant, Config, DigitSlot, DigitTemplate, DrawRun, DrawTemplate, JackpotDraw,
    SlotRegistry, UserAccount, WithdrawRequest,
};

// ----------------------------
// Platform config
// ----------------------------

#[derive(Accounts)]
pub struct InitializeConfig<'info> {
    #[account(
        init,
        payer = admin,
        space = 8 + Config::INIT_SPACE,
        seeds = [crate::CONFIG_SEED],
        bump
    )]
    pub config: Account<'info, Config>,

    /// Cash token every balance is denominated in.
    pub cash_mint: Account<'info, Mint>,

    /// Treasury SPL = TokenAccount PDA controlled by the program (authority = config PDA)
    #[account(
        init,
        payer = admin,
        seeds = [crate::TREASURY_SEED],
        bump,
        token::mint = cash_mint,
        token::authority = config
    )]
    pub treasury: Account<'info, TokenAccount>,

    #[account(mut)]
    pub admin: Signer<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
    pub rent: Sysvar<'info, Rent>,
}

#[derive(Accounts)]
pub struct SetPause<'info> {
    #[account(
        mut,
        seeds = [crate::CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    pub admin: Signer<'info>,
}

#[derive(Accounts)]
pub struct UpdateSettings<'info> {
    #[account(
        mut,
        seeds = [crate::CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    pub admin: Signer<'info>,
}

// ----------------------------
// Manager allowlist
// ----------------------------

#[derive(Accounts)]
pub struct AddManager<'info> {
    #[account(
        mut,
        seeds = [crate::CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    pub admin: Signer<'info>,
}

#[derive(Accounts)]
pub struct RemoveManager<'info> {
    #[account(
        mut,
        seeds = [crate::CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    pub admin: Signer<'info>,
}

// ----------------------------
// Wallet
// ----------------------------

#[derive(Accounts)]
pub struct InitUserAccount<'info> {
    #[account(
        seeds = [crate::CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    #[account(
        init,
        payer = user,
        space = 8 + UserAccount::INIT_SPACE,
        seeds = [crate::USER_SEED, user.key().as_ref()],
        bump
    )]
    pub user_account: Account<'info, UserAccount>,

    #[account(mut)]
    pub user: Signer<'info>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct Deposit<'info> {
    #[account(
        seeds = [crate::CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    #[account(
        mut,
        seeds = [crate::USER_SEED, user.key().as_ref()],
        bump = user_account.bump
    )]
    pub user_account: Account<'info, UserAccount>,

    #[account(mut, address = config.treasury)]
    pub treasury: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = user_cash_ata.owner == user.key() @ LotteryError::InvalidTokenAccount,
        constraint = user_cash_ata.mint == config.cash_mint @ LotteryError::InvalidTokenAccount
    )]
    pub user_cash_ata: Account<'info, TokenAccount>,

    /// CHECK: ledger entry PDA, created and verified in the handler
    #[account(mut)]
    pub ledger_entry: UncheckedAccount<'info>,

    #[account(mut)]
    pub user: Signer<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct SubmitWithdraw<'info> {
    #[account(
        seeds = [crate::CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    #[account(
        mut,
        seeds = [crate::USER_SEED, user.key().as_ref()],
        bump = user_account.bump
    )]
    pub user_account: Account<'info, UserAccount>,

    #[account(
        init,
        payer = user,
        space = 8 + WithdrawRequest::INIT_SPACE,
        seeds = [
            crate::WITHDRAW_SEED,
            user.key().as_ref(),
            user_account.withdraw_count.to_le_bytes().as_ref()
        ],
        bump
    )]
    pub withdraw_request: Account<'info, WithdrawRequest>,

    /// CHECK: ledger entry PDA, created and verified in the handler
    #[account(mut)]
    pub ledger_entry: UncheckedAccount<'info>,

    #[account(mut)]
    pub user: Signer<'info>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct ApproveWithdraw<'info> {
    #[account(
        seeds = [crate::CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    #[account(
        mut,
        seeds = [crate::USER_SEED, withdraw_request.user.as_ref()],
        bump = user_account.bump
    )]
    pub user_account: Account<'info, UserAccount>,

    #[account(
        mut,
        seeds = [
            crate::WITHDRAW_SEED,
            withdraw_request.user.as_ref(),
            withdraw_request.seq.to_le_bytes().as_ref()
        ],
        bump = withdraw_request.bump
    )]
    pub withdraw_request: Account<'info, WithdrawRequest>,

    #[account(mut, address = config.treasury)]
    pub treasury: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = user_cash_ata.owner == withdraw_request.user @ LotteryError::InvalidTokenAccount,
        constraint = user_cash_ata.mint == config.cash_mint @ LotteryError::InvalidTokenAccount
    )]
    pub user_cash_ata: Account<'info, TokenAccount>,

    /// CHECK: ledger entry PDA (unlock), created and verified in the handler
    #[account(mut)]
    pub unlock_entry: UncheckedAccount<'info>,

    /// CHECK: ledger entry PDA (debit), created and verified in the handler
    #[account(mut)]
    pub debit_entry: UncheckedAccount<'info>,

    #[account(mut)]
    pub admin: Signer<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct RejectWithdraw<'info> {
    #[account(
        seeds = [crate::CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    #[account(
        mut,
        seeds = [crate::USER_SEED, withdraw_request.user.as_ref()],
        bump = user_account.bump
    )]
    pub user_account: Account<'info, UserAccount>,

    #[account(
        mut,
        seeds = [
            crate::WITHDRAW_SEED,
            withdraw_request.user.as_ref(),
            withdraw_request.seq.to_le_bytes().as_ref()
        ],
        bump = withdraw_request.bump
    )]
    pub withdraw_request: Account<'info, WithdrawRequest>,

    /// CHECK: ledger entry PDA, created and verified in the handler
    #[account(mut)]
    pub ledger_entry: UncheckedAccount<'info>,

    #[account(mut)]
    pub admin: Signer<'info>,

    pub system_program: Program<'info, System>,
}

// ----------------------------
// Bonus
// ----------------------------

#[derive(Accounts)]
pub struct GrantBonus<'info> {
    #[account(
        seeds = [crate::CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    #[account(
        mut,
        seeds = [crate::USER_SEED, user_account.owner.as_ref()],
        bump = user_account.bump
    )]
    pub user_account: Account<'info, UserAccount>,

    #[account(
        init,
        payer = operator,
        space = 8 + BonusGrant::INIT_SPACE,
        seeds = [
            crate::BONUS_SEED,
            user_account.owner.as_ref(),
            user_account.bonus_count.to_le_bytes().as_ref()
        ],
        bump
    )]
    pub bonus_grant: Account<'info, BonusGrant>,

    /// CHECK: ledger entry PDA, created and verified in the handler
    #[account(mut)]
    pub ledger_entry: UncheckedAccount<'info>,

    #[account(mut)]
    pub operator: Signer<'info>,

    pub system_program: Program<'info, System>,
}

/// remaining_accounts: every ACTIVE bonus grant of the user.
#[derive(Accounts)]
pub struct ExpireUserBonuses<'info> {
    #[account(
        mut,
        seeds = [crate::USER_SEED, user_account.owner.as_ref()],
        bump = user_account.bump
    )]
    pub user_account: Account<'info, UserAccount>,

    /// CHECK: ledger entry PDA, only created when something expires
    #[account(mut)]
    pub ledger_entry: UncheckedAccount<'info>,

    #[account(mut)]
    pub cranker: Signer<'info>,

    pub system_program: Program<'info, System>,
}

// ----------------------------
// Draw templates & daily runs
// ----------------------------

#[derive(Accounts)]
#[instruction(template_id: u64)]
pub struct CreateDrawTemplate<'info> {
    #[account(
        seeds = [crate::CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    #[account(
        init,
        payer = operator,
        space = 8 + DrawTemplate::INIT_SPACE,
        seeds = [crate::DRAW_TEMPLATE_SEED, template_id.to_le_bytes().as_ref()],
        bump
    )]
    pub template: Account<'info, DrawTemplate>,

    #[account(mut)]
    pub operator: Signer<'info>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct UpdateDrawTemplate<'info> {
    #[account(
        seeds = [crate::CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    #[account(
        mut,
        seeds = [crate::DRAW_TEMPLATE_SEED, template.template_id.to_le_bytes().as_ref()],
        bump = template.bump
    )]
    pub template: Account<'info, DrawTemplate>,

    pub operator: Signer<'info>,
}

/// remaining_accounts: pairs of (template, draw run PDA for the target date).
#[derive(Accounts)]
pub struct CreateDailyDrawRuns<'info> {
    #[account(
        seeds = [crate::CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    #[account(mut)]
    pub payer: Signer<'info>,

    pub system_program: Program<'info, System>,
}

/// remaining_accounts: draw runs to check (writable).
#[derive(Accounts)]
pub struct AutoLockDraws<'info> {
    #[account(
        seeds = [crate::CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    pub cranker: Signer<'info>,
}

/// Shared by lock / start / declare result on a draw run.
#[derive(Accounts)]
pub struct ManageDrawRun<'info> {
    #[account(
        seeds = [crate::CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    #[account(
        mut,
        seeds = [
            crate::DRAW_RUN_SEED,
            draw_run.template.as_ref(),
            draw_run.date.to_le_bytes().as_ref()
        ],
        bump = draw_run.bump
    )]
    pub draw_run: Account<'info, DrawRun>,

    pub operator: Signer<'info>,
}

/// remaining_accounts: tickets, one per number, in request order.
#[derive(Accounts)]
pub struct PurchaseDrawTicket<'info> {
    #[account(
        seeds = [crate::CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    #[account(
        mut,
        seeds = [
            crate::DRAW_RUN_SEED,
            draw_run.template.as_ref(),
            draw_run.date.to_le_bytes().as_ref()
        ],
        bump = draw_run.bump
    )]
    pub draw_run: Account<'info, DrawRun>,

    #[account(
        mut,
        seeds = [crate::USER_SEED, user.key().as_ref()],
        bump = user_account.bump
    )]
    pub user_account: Account<'info, UserAccount>,

    /// CHECK: ledger entry PDA, created and verified in the handler
    #[account(mut)]
    pub ledger_entry: UncheckedAccount<'info>,

    #[account(mut)]
    pub user: Signer<'info>,

    pub system_program: Program<'info, System>,
}

/// remaining_accounts: (ticket, owner user account, ledger entry) per ticket.
#[derive(Accounts)]
pub struct SettleDrawRun<'info> {
    #[account(
        seeds = [crate::CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    #[account(
        mut,
        seeds = [
            crate::DRAW_RUN_SEED,
            draw_run.template.as_ref(),
            draw_run.date.to_le_bytes().as_ref()
        ],
        bump = draw_run.bump
    )]
    pub draw_run: Account<'info, DrawRun>,

    #[account(mut)]
    pub operator: Signer<'info>,

    pub system_program: Program<'info, System>,
}

// ----------------------------
// KuberGold slots
// ----------------------------

#[derive(Accounts)]
#[instruction(template_id: u64)]
pub struct CreateDigitTemplate<'info> {
    #[account(
        seeds = [crate::CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    #[account(
        init,
        payer = operator,
        space = 8 + DigitTemplate::INIT_SPACE,
        seeds = [crate::DIGIT_TEMPLATE_SEED, template_id.to_le_bytes().as_ref()],
        bump
    )]
    pub digit_template: Account<'info, DigitTemplate>,

    #[account(mut)]
    pub operator: Signer<'info>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct InitializeSlotRegistry<'info> {
    #[account(
        seeds = [crate::CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    #[account(
        init,
        payer = admin,
        space = 8 + SlotRegistry::INIT_SPACE,
        seeds = [crate::SLOT_REGISTRY_SEED, config.key().as_ref()],
        bump
    )]
    pub slot_registry: Account<'info, SlotRegistry>,

    #[account(mut)]
    pub admin: Signer<'info>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct CreateDigitDrawSlot<'info> {
    #[account(
        seeds = [crate::CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    #[account(
        seeds = [
            crate::DIGIT_TEMPLATE_SEED,
            digit_template.template_id.to_le_bytes().as_ref()
        ],
        bump = digit_template.bump
    )]
    pub digit_template: Account<'info, DigitTemplate>,

    #[account(
        mut,
        seeds = [crate::SLOT_REGISTRY_SEED, config.key().as_ref()],
        bump = slot_registry.bump
    )]
    pub slot_registry: Account<'info, SlotRegistry>,

    #[account(
        init,
        payer = operator,
        space = 8 + DigitSlot::INIT_SPACE,
        seeds = [crate::SLOT_SEED, slot_registry.next_slot_id.to_le_bytes().as_ref()],
        bump
    )]
    pub slot: Account<'info, DigitSlot>,

    #[account(mut)]
    pub operator: Signer<'info>,

    pub system_program: Program<'info, System>,
}

/// Shared by close-time edits, enable/disable and result entry on a slot.
#[derive(Accounts)]
pub struct ManageSlot<'info> {
    #[account(
        seeds = [crate::CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    #[account(
        mut,
        seeds = [crate::SLOT_SEED, slot.slot_id.to_le_bytes().as_ref()],
        bump = slot.bump
    )]
    pub slot: Account<'info, DigitSlot>,

    pub operator: Signer<'info>,
}

/// remaining_accounts: slots to check (writable).
#[derive(Accounts)]
pub struct LockClosedSlots<'info> {
    pub cranker: Signer<'info>,
}

/// remaining_accounts: one seat PDA per requested number, in request order.
#[derive(Accounts)]
pub struct HoldNumbers<'info> {
    #[account(
        seeds = [crate::CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    #[account(
        seeds = [crate::SLOT_SEED, slot.slot_id.to_le_bytes().as_ref()],
        bump = slot.bump
    )]
    pub slot: Account<'info, DigitSlot>,

    #[account(mut)]
    pub user: Signer<'info>,

    pub system_program: Program<'info, System>,
}

/// remaining_accounts: pairs of (seat, rent receiver).
#[derive(Accounts)]
pub struct ReleaseExpiredHolds<'info> {
    pub cranker: Signer<'info>,
}

/// remaining_accounts: seats (n), tickets (n), bonus grants (k), ledger entries.
#[derive(Accounts)]
pub struct PurchaseSlotTicket<'info> {
    #[account(
        seeds = [crate::CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    #[account(
        mut,
        seeds = [crate::SLOT_SEED, slot.slot_id.to_le_bytes().as_ref()],
        bump = slot.bump
    )]
    pub slot: Account<'info, DigitSlot>,

    #[account(
        mut,
        seeds = [crate::USER_SEED, user.key().as_ref()],
        bump = user_account.bump
    )]
    pub user_account: Account<'info, UserAccount>,

    #[account(mut)]
    pub user: Signer<'info>,

    pub system_program: Program<'info, System>,
}

/// remaining_accounts: the slot's tickets (read-only).
#[derive(Accounts)]
pub struct PreviewDigitDrawWinners<'info> {
    #[account(
        seeds = [crate::CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    #[account(
        seeds = [crate::SLOT_SEED, slot.slot_id.to_le_bytes().as_ref()],
        bump = slot.bump
    )]
    pub slot: Account<'info, DigitSlot>,

    pub operator: Signer<'info>,
}

/// remaining_accounts: (ticket, owner user account, ledger entry) per ticket.
#[derive(Accounts)]
pub struct DeclareDigitDrawWinners<'info> {
    #[account(
        seeds = [crate::CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    #[account(
        mut,
        seeds = [crate::SLOT_SEED, slot.slot_id.to_le_bytes().as_ref()],
        bump = slot.bump
    )]
    pub slot: Account<'info, DigitSlot>,

    #[account(mut)]
    pub operator: Signer<'info>,

    pub system_program: Program<'info, System>,
}

// ----------------------------
// Jackpot
// ----------------------------

#[derive(Accounts)]
#[instruction(jackpot_id: u64)]
pub struct CreateJackpotDraw<'info> {
    #[account(
        seeds = [crate::CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    #[account(
        init,
        payer = operator,
        space = 8 + JackpotDraw::INIT_SPACE,
        seeds = [crate::JACKPOT_SEED, jackpot_id.to_le_bytes().as_ref()],
        bump
    )]
    pub jackpot: Account<'info, JackpotDraw>,

    #[account(mut)]
    pub operator: Signer<'info>,

    pub system_program: Program<'info, System>,
}

/// Shared by patching and result declaration on a jackpot.
#[derive(Accounts)]
pub struct ManageJackpot<'info> {
    #[account(
        seeds = [crate::CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    #[account(
        mut,
        seeds = [crate::JACKPOT_SEED, jackpot.jackpot_id.to_le_bytes().as_ref()],
        bump = jackpot.bump
    )]
    pub jackpot: Account<'info, JackpotDraw>,

    pub operator: Signer<'info>,
}

/// remaining_accounts: jackpots to check (writable).
#[derive(Accounts)]
pub struct RefreshJackpotGuarantee<'info> {
    pub cranker: Signer<'info>,
}

/// remaining_accounts: tickets, one per number, in request order.
#[derive(Accounts)]
pub struct PurchaseJackpotTicket<'info> {
    #[account(
        seeds = [crate::CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    #[account(
        mut,
        seeds = [crate::JACKPOT_SEED, jackpot.jackpot_id.to_le_bytes().as_ref()],
        bump = jackpot.bump
    )]
    pub jackpot: Account<'info, JackpotDraw>,

    #[account(
        mut,
        seeds = [crate::USER_SEED, user.key().as_ref()],
        bump = user_account.bump
    )]
    pub user_account: Account<'info, UserAccount>,

    /// CHECK: ledger entry PDA, created and verified in the handler
    #[account(mut)]
    pub ledger_entry: UncheckedAccount<'info>,

    #[account(mut)]
    pub user: Signer<'info>,

    pub system_program: Program<'info, System>,
}

/// remaining_accounts: (ticket, owner user account, ledger entry) per ticket.
#[derive(Accounts)]
pub struct SettleJackpotDraw<'info> {
    #[account(
        seeds = [crate::CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    #[account(
        mut,
        seeds = [crate::JACKPOT_SEED, jackpot.jackpot_id.to_le_bytes().as_ref()],
        bump = jackpot.bump
    )]
    pub jackpot: Account<'info, JackpotDraw>,

    #[account(mut)]
    pub operator: Signer<'info>,

    pub system_program: Program<'info, System>,
}
