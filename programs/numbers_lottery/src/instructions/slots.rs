use anchor_lang::prelude::*;

use crate::{
    errors::LotteryError,
    events::{DigitSlotCreated, DigitTemplateCreated, DrawResultDeclared, SlotCloseTimeUpdated, SlotStatusChanged},
    instructions::admin::{require_admin, require_operator},
    settlement::validate_multipliers,
    state::{DigitSlot, SlotStatus},
    utils::{
        load_program_account, result_digest, store_program_account, validate_name, validate_number,
        DigitTemplateArgs,
    },
    CreateDigitDrawSlot, CreateDigitTemplate, InitializeSlotRegistry, LockClosedSlots, ManageSlot,
    INITIAL_SLOT_ID, INITIAL_VERSION, MAX_DIGITS, MAX_SWEEP_BATCH, MIN_DIGITS,
};

pub fn create_digit_template(
    ctx: Context<CreateDigitTemplate>,
    template_id: u64,
    args: DigitTemplateArgs,
) -> Result<()> {
    require_operator(&ctx.accounts.config, &ctx.accounts.operator.key())?;
    validate_name(&args.name)?;
    require!(
        (MIN_DIGITS..=MAX_DIGITS).contains(&args.digits),
        LotteryError::InvalidDigits
    );
    require!(args.ticket_price > 0, LotteryError::InvalidAmount);
    validate_multipliers(&args.multipliers, args.digits)?;

    let t = &mut ctx.accounts.digit_template;
    t.template_id = template_id;
    t.bump = ctx.bumps.digit_template;
    t.name = args.name;
    t.digits = args.digits;
    t.ticket_price = args.ticket_price;
    t.multipliers = args.multipliers;
    t.disabled = false;
    t.created_at = Clock::get()?.unix_timestamp;

    emit!(DigitTemplateCreated {
        actor: ctx.accounts.operator.key(),
        template: t.key(),
        digits: t.digits,
        ticket_price: t.ticket_price,
    });
    Ok(())
}

pub fn initialize_slot_registry(ctx: Context<InitializeSlotRegistry>) -> Result<()> {
    let cfg = &ctx.accounts.config;
    require_admin(cfg, &ctx.accounts.admin.key())?;

    let reg = &mut ctx.accounts.slot_registry;
    reg.admin = cfg.admin;
    reg.bump = ctx.bumps.slot_registry;
    reg.next_slot_id = INITIAL_SLOT_ID;
    reg.version = INITIAL_VERSION;

    Ok(())
}

/// Opens a new time-boxed slot from a digit template; returns the new slot id.
pub fn create_digit_draw_slot(
    ctx: Context<CreateDigitDrawSlot>,
    name: String,
    open_at: i64,
    close_at: i64,
) -> Result<u64> {
    require_operator(&ctx.accounts.config, &ctx.accounts.operator.key())?;
    validate_name(&name)?;
    require!(open_at < close_at, LotteryError::InvalidWindow);

    let now = Clock::get()?.unix_timestamp;
    require!(close_at > now, LotteryError::InvalidWindow);

    let tpl = &ctx.accounts.digit_template;
    require!(!tpl.disabled, LotteryError::TemplateDisabled);

    let reg = &mut ctx.accounts.slot_registry;
    let slot_id = reg.next_slot_id;

    let slot = &mut ctx.accounts.slot;
    slot.slot_id = slot_id;
    slot.bump = ctx.bumps.slot;
    slot.template = tpl.key();
    slot.name = name;
    slot.digits = tpl.digits;
    slot.ticket_price = tpl.ticket_price;
    slot.multipliers = tpl.multipliers;
    slot.open_at = open_at;
    slot.close_at = close_at;
    slot.status = SlotStatus::Open;
    slot.winning_number = 0;
    slot.result_declared = false;
    slot.result_digest = [0u8; 32];
    slot.sales = 0;
    slot.ticket_count = 0;
    slot.settled_count = 0;
    slot.total_payout = 0;
    slot.created_at = now;
    slot.settled_at = 0;

    reg.next_slot_id = slot_id.checked_add(1).ok_or(LotteryError::MathOverflow)?;

    emit!(DigitSlotCreated {
        actor: ctx.accounts.operator.key(),
        slot: slot.key(),
        slot_id,
        open_at,
        close_at,
    });
    Ok(slot_id)
}

fn slot_transition(slot: &mut DigitSlot, slot_key: Pubkey, to: SlotStatus, actor: Pubkey) -> Result<()> {
    let from = slot.status;
    slot.status.advance(to)?;
    emit!(SlotStatusChanged {
        actor,
        slot: slot_key,
        from,
        to,
    });
    Ok(())
}

pub(crate) fn complete_slot(slot: &mut DigitSlot, slot_key: Pubkey, actor: Pubkey, now: i64) -> Result<()> {
    slot_transition(slot, slot_key, SlotStatus::Completed, actor)?;
    slot.settled_at = now;
    Ok(())
}

/// Moves the sales deadline. Frozen once a result exists; a locked slot whose
/// deadline moves into the future reopens.
pub fn update_kuber_gold_close_time(ctx: Context<ManageSlot>, new_close_at: i64) -> Result<()> {
    let actor = ctx.accounts.operator.key();
    require_operator(&ctx.accounts.config, &actor)?;

    let now = Clock::get()?.unix_timestamp;
    let slot_key = ctx.accounts.slot.key();
    let slot = &mut ctx.accounts.slot;

    require!(slot.status.close_time_editable(), LotteryError::CloseTimeFrozen);
    require!(
        new_close_at > slot.open_at && new_close_at > now,
        LotteryError::InvalidWindow
    );

    let previous_close_at = slot.close_at;
    slot.close_at = new_close_at;
    if slot.status == SlotStatus::Locked {
        slot_transition(slot, slot_key, SlotStatus::Open, actor)?;
    }

    emit!(SlotCloseTimeUpdated {
        actor,
        slot: slot_key,
        previous_close_at,
        new_close_at,
    });
    Ok(())
}

/// Scheduled: locks every supplied Open slot whose close time passed.
pub fn lock_closed_slots<'info>(ctx: Context<'_, '_, 'info, 'info, LockClosedSlots<'info>>) -> Result<()> {
    let remaining = ctx.remaining_accounts;
    require!(remaining.len() <= MAX_SWEEP_BATCH, LotteryError::BatchTooLarge);

    let now = Clock::get()?.unix_timestamp;
    let actor = ctx.accounts.cranker.key();

    let mut due: Vec<(usize, DigitSlot)> = Vec::new();
    for (i, ai) in remaining.iter().enumerate() {
        let slot: DigitSlot = load_program_account(ai, ctx.program_id)?;
        if slot.status == SlotStatus::Open && now >= slot.close_at {
            due.push((i, slot));
        }
    }

    for (i, mut slot) in due {
        let ai = &remaining[i];
        slot_transition(&mut slot, *ai.key, SlotStatus::Locked, actor)?;
        store_program_account(ai, &slot)?;
    }
    Ok(())
}

pub fn set_slot_disabled(ctx: Context<ManageSlot>, disabled: bool) -> Result<()> {
    let actor = ctx.accounts.operator.key();
    require_operator(&ctx.accounts.config, &actor)?;

    let slot_key = ctx.accounts.slot.key();
    let slot = &mut ctx.accounts.slot;
    let to = if disabled {
        SlotStatus::Disabled
    } else {
        // re-enabling must not reopen a slot that was locked
        require!(slot.status == SlotStatus::Disabled, LotteryError::InvalidStatusTransition);
        SlotStatus::Open
    };
    slot_transition(slot, slot_key, to, actor)
}

/// Records the winning number of a locked slot; the slot starts running.
pub fn set_digit_draw_result(ctx: Context<ManageSlot>, number: String) -> Result<()> {
    let actor = ctx.accounts.operator.key();
    require_operator(&ctx.accounts.config, &actor)?;

    let slot_key = ctx.accounts.slot.key();
    let slot = &mut ctx.accounts.slot;
    validate_number(&number, slot.digits)?;
    require!(slot.status == SlotStatus::Locked, LotteryError::DrawNotLocked);

    let winning: u32 = number
        .parse()
        .map_err(|_| error!(LotteryError::InvalidNumber))?;
    slot.winning_number = winning;
    slot.result_declared = true;
    slot.result_digest = result_digest(&slot_key, &[winning]);
    slot_transition(slot, slot_key, SlotStatus::Running, actor)?;

    emit!(DrawResultDeclared {
        actor,
        draw: slot_key,
        results: vec![winning],
        result_digest: slot.result_digest,
    });
    Ok(())
}
