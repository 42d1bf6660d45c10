use anchor_lang::prelude::*;

use crate::constants::*;
use crate::errors::LotteryError;
use crate::events::{ConfigInitialized, SettingsUpdated};
use crate::state::Config;
use crate::utils::SettingsArgs;
use crate::{InitializeConfig, SetPause, UpdateSettings};

pub fn initialize_config(ctx: Context<InitializeConfig>, max_withdraw_per_request: u64) -> Result<()> {
    let cfg: &mut Account<Config> = &mut ctx.accounts.config;

    cfg.admin = ctx.accounts.admin.key();
    cfg.bump = ctx.bumps.config;
    cfg.managers = Vec::new();

    cfg.cash_mint = ctx.accounts.cash_mint.key();
    cfg.treasury = ctx.accounts.treasury.key();
    cfg.treasury_bump = ctx.bumps.treasury;

    // defaults
    cfg.paused = false;
    cfg.hold_duration_secs = DEFAULT_HOLD_DURATION_SECS;
    cfg.bonus_cap_bps = DEFAULT_BONUS_CAP_BPS;
    cfg.utc_offset_secs = DEFAULT_UTC_OFFSET_SECS;
    cfg.max_withdraw_per_request = max_withdraw_per_request;

    cfg.version = INITIAL_VERSION;

    emit!(ConfigInitialized {
        admin: cfg.admin,
        cash_mint: cfg.cash_mint,
        treasury: cfg.treasury,
    });

    Ok(())
}

pub fn set_pause(ctx: Context<SetPause>, paused: bool) -> Result<()> {
    let cfg = &mut ctx.accounts.config;
    require_keys_eq!(cfg.admin, ctx.accounts.admin.key(), LotteryError::Unauthorized);
    cfg.paused = paused;

    msg!("platform paused={}", paused);
    emit_settings(cfg);
    Ok(())
}

pub fn update_settings(ctx: Context<UpdateSettings>, args: SettingsArgs) -> Result<()> {
    let cfg = &mut ctx.accounts.config;
    require_keys_eq!(cfg.admin, ctx.accounts.admin.key(), LotteryError::Unauthorized);

    if let Some(secs) = args.hold_duration_secs {
        require!(secs > 0 && secs <= SECONDS_PER_DAY, LotteryError::InvalidWindow);
        cfg.hold_duration_secs = secs;
    }
    if let Some(bps) = args.bonus_cap_bps {
        require!(bps <= MAX_BPS, LotteryError::InvalidBps);
        cfg.bonus_cap_bps = bps;
    }
    if let Some(offset) = args.utc_offset_secs {
        // UTC-12:00 ..= UTC+14:00
        require!(
            (-12 * 3_600..=14 * 3_600).contains(&offset),
            LotteryError::InvalidDrawTime
        );
        cfg.utc_offset_secs = offset;
    }
    if let Some(limit) = args.max_withdraw_per_request {
        cfg.max_withdraw_per_request = limit;
    }

    emit_settings(cfg);
    Ok(())
}

fn emit_settings(cfg: &Config) {
    emit!(SettingsUpdated {
        admin: cfg.admin,
        hold_duration_secs: cfg.hold_duration_secs,
        bonus_cap_bps: cfg.bonus_cap_bps,
        utc_offset_secs: cfg.utc_offset_secs,
        max_withdraw_per_request: cfg.max_withdraw_per_request,
        paused: cfg.paused,
    });
}

/// Operator gate shared by manager-scoped instructions.
pub fn require_operator(cfg: &Config, signer: &Pubkey) -> Result<()> {
    require!(cfg.is_operator(signer), LotteryError::Unauthorized);
    Ok(())
}

pub fn require_admin(cfg: &Config, signer: &Pubkey) -> Result<()> {
    require_keys_eq!(cfg.admin, *signer, LotteryError::Unauthorized);
    Ok(())
}

pub fn require_not_paused(cfg: &Config) -> Result<()> {
    require!(!cfg.paused, LotteryError::Paused);
    Ok(())
}
