use anchor_lang::prelude::*;

pub mod errors;
pub mod events;
pub mod funding;
pub mod instructions;
pub mod ledger;
pub mod seats;
pub mod settlement;
pub mod state;
pub mod utils;
pub mod contexts;
pub mod constants;

pub use utils::*;
pub use instructions::*;
pub use state::*;
pub use errors::*;
pub use contexts::*;
pub use constants::*;
pub use settlement::PreviewTotals;

use solana_security_txt::security_txt;

security_txt! {
    // Required fields
    name: "Numbers Lottery",
    project_url: "https://github.com/numbers-lottery/numbers-lottery",
    contacts: "link:https://github.com/numbers-lottery/numbers-lottery/issues",
    policy: "https://github.com/numbers-lottery/numbers-lottery/blob/main/SECURITY.md",

    // Optional fields
    preferred_languages: "en",
    source_code: "https://github.com/numbers-lottery/numbers-lottery"
}

declare_id!("8sM8mV8RaNXaGQnC88cTjQADVTPikVcteyxveH2Epv6P");

#[program]
pub mod numbers_lottery {
    use super::*;
    use crate::instructions::{admin, bonus, draw, holds, jackpot, purchase, roles, settle, slots, wallet};

    pub fn initialize_config(ctx: Context<InitializeConfig>, max_withdraw_per_request: u64) -> Result<()> {
        admin::initialize_config(ctx, max_withdraw_per_request)
    }

    pub fn set_pause(ctx: Context<SetPause>, paused: bool) -> Result<()> {
        admin::set_pause(ctx, paused)
    }

    pub fn update_settings(ctx: Context<UpdateSettings>, args: SettingsArgs) -> Result<()> {
        admin::update_settings(ctx, args)
    }

    // ----------------------------
    // Manager allowlist
    // ----------------------------
    pub fn add_manager(ctx: Context<AddManager>, manager: Pubkey) -> Result<()> {
        roles::add_manager(ctx, manager)
    }

    pub fn remove_manager(ctx: Context<RemoveManager>, manager: Pubkey) -> Result<()> {
        roles::remove_manager(ctx, manager)
    }

    // ----------------------------
    // Wallet & ledger
    // ----------------------------
    pub fn init_user_account(ctx: Context<InitUserAccount>) -> Result<()> {
        wallet::init_user_account(ctx)
    }

    pub fn deposit(ctx: Context<Deposit>, amount: u64) -> Result<()> {
        wallet::deposit(ctx, amount)
    }

    pub fn submit_withdraw(ctx: Context<SubmitWithdraw>, amount: u64) -> Result<()> {
        wallet::submit_withdraw(ctx, amount)
    }

    pub fn approve_withdraw(ctx: Context<ApproveWithdraw>) -> Result<()> {
        wallet::approve_withdraw(ctx)
    }

    pub fn reject_withdraw(ctx: Context<RejectWithdraw>) -> Result<()> {
        wallet::reject_withdraw(ctx)
    }

    pub fn grant_bonus(ctx: Context<GrantBonus>, amount: u64, expires_at: i64) -> Result<()> {
        bonus::grant_bonus(ctx, amount, expires_at)
    }

    pub fn expire_user_bonuses<'info>(
        ctx: Context<'_, '_, 'info, 'info, ExpireUserBonuses<'info>>,
    ) -> Result<()> {
        bonus::expire_user_bonuses(ctx)
    }

    // ----------------------------
    // Daily draw runs
    // ----------------------------
    pub fn create_draw_template(
        ctx: Context<CreateDrawTemplate>,
        template_id: u64,
        args: DrawTemplateArgs,
    ) -> Result<()> {
        draw::create_draw_template(ctx, template_id, args)
    }

    pub fn update_draw_template(ctx: Context<UpdateDrawTemplate>, args: DrawTemplateArgs) -> Result<()> {
        draw::update_draw_template(ctx, args)
    }

    pub fn create_daily_draw_runs<'info>(
        ctx: Context<'_, '_, 'info, 'info, CreateDailyDrawRuns<'info>>,
        target_date: Option<u32>,
    ) -> Result<()> {
        draw::create_daily_draw_runs(ctx, target_date)
    }

    pub fn auto_lock_draws<'info>(ctx: Context<'_, '_, 'info, 'info, AutoLockDraws<'info>>) -> Result<()> {
        draw::auto_lock_draws(ctx)
    }

    pub fn lock_draw_run(ctx: Context<ManageDrawRun>) -> Result<()> {
        draw::lock_draw_run(ctx)
    }

    pub fn start_draw_run(ctx: Context<ManageDrawRun>) -> Result<()> {
        draw::start_draw_run(ctx)
    }

    pub fn declare_draw_result(ctx: Context<ManageDrawRun>, results: [u32; 3]) -> Result<()> {
        draw::declare_draw_result(ctx, results)
    }

    pub fn purchase_2d_ticket<'info>(
        ctx: Context<'_, '_, 'info, 'info, PurchaseDrawTicket<'info>>,
        stakes: Vec<NumberStake>,
    ) -> Result<()> {
        purchase::purchase_2d_ticket(ctx, stakes)
    }

    pub fn purchase_draw_ticket<'info>(
        ctx: Context<'_, '_, 'info, 'info, PurchaseDrawTicket<'info>>,
        digits: u8,
        stakes: Vec<NumberStake>,
    ) -> Result<()> {
        purchase::purchase_draw_ticket(ctx, digits, stakes)
    }

    pub fn settle_draw_run<'info>(ctx: Context<'_, '_, 'info, 'info, SettleDrawRun<'info>>) -> Result<()> {
        settle::settle_draw_run(ctx)
    }

    // ----------------------------
    // KuberGold slots
    // ----------------------------
    pub fn create_digit_template(
        ctx: Context<CreateDigitTemplate>,
        template_id: u64,
        args: DigitTemplateArgs,
    ) -> Result<()> {
        slots::create_digit_template(ctx, template_id, args)
    }

    pub fn initialize_slot_registry(ctx: Context<InitializeSlotRegistry>) -> Result<()> {
        slots::initialize_slot_registry(ctx)
    }

    pub fn create_digit_draw_slot(
        ctx: Context<CreateDigitDrawSlot>,
        name: String,
        open_at: i64,
        close_at: i64,
    ) -> Result<u64> {
        slots::create_digit_draw_slot(ctx, name, open_at, close_at)
    }

    pub fn update_kuber_gold_close_time(ctx: Context<ManageSlot>, new_close_at: i64) -> Result<()> {
        slots::update_kuber_gold_close_time(ctx, new_close_at)
    }

    pub fn lock_closed_slots<'info>(ctx: Context<'_, '_, 'info, 'info, LockClosedSlots<'info>>) -> Result<()> {
        slots::lock_closed_slots(ctx)
    }

    pub fn set_slot_disabled(ctx: Context<ManageSlot>, disabled: bool) -> Result<()> {
        slots::set_slot_disabled(ctx, disabled)
    }

    pub fn set_digit_draw_result(ctx: Context<ManageSlot>, number: String) -> Result<()> {
        slots::set_digit_draw_result(ctx, number)
    }

    pub fn hold_kuber_gold_numbers<'info>(
        ctx: Context<'_, '_, 'info, 'info, HoldNumbers<'info>>,
        numbers: Vec<String>,
    ) -> Result<HoldReceipt> {
        holds::hold_kuber_gold_numbers(ctx, numbers)
    }

    pub fn release_expired_holds<'info>(
        ctx: Context<'_, '_, 'info, 'info, ReleaseExpiredHolds<'info>>,
    ) -> Result<()> {
        holds::release_expired_holds(ctx)
    }

    pub fn purchase_kuber_gold_ticket<'info>(
        ctx: Context<'_, '_, 'info, 'info, PurchaseSlotTicket<'info>>,
        numbers: Vec<String>,
        bonus_grant_count: u8,
    ) -> Result<()> {
        purchase::purchase_kuber_gold_ticket(ctx, numbers, bonus_grant_count)
    }

    pub fn preview_digit_draw_winners<'info>(
        ctx: Context<'_, '_, 'info, 'info, PreviewDigitDrawWinners<'info>>,
    ) -> Result<PreviewTotals> {
        settle::preview_digit_draw_winners(ctx)
    }

    pub fn declare_digit_draw_winners<'info>(
        ctx: Context<'_, '_, 'info, 'info, DeclareDigitDrawWinners<'info>>,
    ) -> Result<()> {
        settle::declare_digit_draw_winners(ctx)
    }

    // ----------------------------
    // Jackpot
    // ----------------------------
    pub fn create_jackpot_draw(
        ctx: Context<CreateJackpotDraw>,
        jackpot_id: u64,
        args: JackpotArgs,
    ) -> Result<()> {
        jackpot::create_jackpot_draw(ctx, jackpot_id, args)
    }

    pub fn update_jackpot_draw(ctx: Context<ManageJackpot>, patch: JackpotPatch) -> Result<()> {
        jackpot::update_jackpot_draw(ctx, patch)
    }

    pub fn refresh_jackpot_guarantee<'info>(
        ctx: Context<'_, '_, 'info, 'info, RefreshJackpotGuarantee<'info>>,
    ) -> Result<()> {
        jackpot::refresh_jackpot_guarantee(ctx)
    }

    pub fn purchase_jackpot_ticket<'info>(
        ctx: Context<'_, '_, 'info, 'info, PurchaseJackpotTicket<'info>>,
        numbers: Vec<String>,
    ) -> Result<()> {
        purchase::purchase_jackpot_ticket(ctx, numbers)
    }

    pub fn declare_jackpot_result(ctx: Context<ManageJackpot>, number: String) -> Result<()> {
        jackpot::declare_jackpot_result(ctx, number)
    }

    pub fn settle_jackpot_draw<'info>(
        ctx: Context<'_, '_, 'info, 'info, SettleJackpotDraw<'info>>,
    ) -> Result<()> {
        settle::settle_jackpot_draw(ctx)
    }
}
