use anchor_lang::prelude::*;

use crate::{
    errors::LotteryError,
    events::{DrawResultDeclared, DrawRunCreated, DrawRunStatusChanged, DrawTemplateSaved},
    instructions::admin::require_operator,
    settlement::validate_multipliers,
    state::{DigitGame, DrawRun, DrawRunStatus, DrawTemplate},
    utils::{
        create_pda_account, is_uninitialized, load_program_account, local_date_key, local_hour,
        local_time_to_unix, next_date_key, number_space, result_digest, store_program_account,
        validate_name, DrawTemplateArgs, DRAW_RUN_SEED,
    },
    AutoLockDraws, CreateDailyDrawRuns, CreateDrawTemplate, ManageDrawRun, UpdateDrawTemplate,
    DAILY_RUN_CREATION_HOUR, MAX_SWEEP_BATCH, MINUTES_PER_DAY, MIN_DIGITS,
};

fn validate_template_args(args: &DrawTemplateArgs) -> Result<()> {
    validate_name(&args.name)?;
    require!(
        args.draw_minute_of_day < MINUTES_PER_DAY,
        LotteryError::InvalidDrawTime
    );
    for (i, g) in args.games.iter().enumerate() {
        if g.enabled {
            validate_multipliers(&g.multipliers, MIN_DIGITS + i as u8)?;
        }
    }
    Ok(())
}

fn apply_template_args(t: &mut DrawTemplate, args: DrawTemplateArgs, now: i64) {
    t.name = args.name;
    t.disabled = args.disabled;
    t.draw_minute_of_day = args.draw_minute_of_day;
    t.games = args.games;
    t.updated_at = now;
}

pub fn create_draw_template(
    ctx: Context<CreateDrawTemplate>,
    template_id: u64,
    args: DrawTemplateArgs,
) -> Result<()> {
    require_operator(&ctx.accounts.config, &ctx.accounts.operator.key())?;
    validate_template_args(&args)?;

    let now = Clock::get()?.unix_timestamp;
    let t = &mut ctx.accounts.template;
    t.template_id = template_id;
    t.bump = ctx.bumps.template;
    t.created_at = now;
    apply_template_args(t, args, now);

    emit!(DrawTemplateSaved {
        actor: ctx.accounts.operator.key(),
        template: t.key(),
        template_id,
        disabled: t.disabled,
    });
    Ok(())
}

/// Changes apply to runs created afterwards; existing runs keep their snapshot.
pub fn update_draw_template(ctx: Context<UpdateDrawTemplate>, args: DrawTemplateArgs) -> Result<()> {
    require_operator(&ctx.accounts.config, &ctx.accounts.operator.key())?;
    validate_template_args(&args)?;

    let now = Clock::get()?.unix_timestamp;
    let t = &mut ctx.accounts.template;
    apply_template_args(t, args, now);

    emit!(DrawTemplateSaved {
        actor: ctx.accounts.operator.key(),
        template: t.key(),
        template_id: t.template_id,
        disabled: t.disabled,
    });
    Ok(())
}

/// Scheduled daily: instantiates one run per (template, run PDA) pair for the
/// target date. Existing runs, disabled and incomplete templates are skipped,
/// so the job can be re-run safely.
pub fn create_daily_draw_runs<'info>(
    ctx: Context<'_, '_, 'info, 'info, CreateDailyDrawRuns<'info>>,
    target_date: Option<u32>,
) -> Result<()> {
    let cfg = &ctx.accounts.config;
    let payer_key = ctx.accounts.payer.key();
    let now = Clock::get()?.unix_timestamp;
    let offset = cfg.utc_offset_secs;

    let date = match target_date {
        Some(d) => {
            require_operator(cfg, &payer_key)?;
            d
        }
        None => {
            if !cfg.is_operator(&payer_key) {
                require!(
                    local_hour(now, offset) >= DAILY_RUN_CREATION_HOUR,
                    LotteryError::InvalidDrawTime
                );
            }
            next_date_key(local_date_key(now, offset))?
        }
    };

    let remaining = ctx.remaining_accounts;
    require!(remaining.len() % 2 == 0, LotteryError::AccountListMismatch);
    require!(remaining.len() / 2 <= MAX_SWEEP_BATCH, LotteryError::BatchTooLarge);
    let date_le = date.to_le_bytes();

    // pass 1: read everything, decide
    let mut planned: Vec<(usize, DrawTemplate, u8, i64)> = Vec::new();
    for (i, pair) in remaining.chunks(2).enumerate() {
        let (template_ai, run_ai) = (&pair[0], &pair[1]);

        let template: DrawTemplate = load_program_account(template_ai, ctx.program_id)?;
        let (expected, bump) = Pubkey::find_program_address(
            &[DRAW_RUN_SEED, template_ai.key.as_ref(), &date_le],
            ctx.program_id,
        );
        require_keys_eq!(expected, *run_ai.key, LotteryError::PdaMismatch);

        if !is_uninitialized(run_ai) {
            msg!("draw run {} for {} exists; skipping", template.template_id, date);
            continue;
        }
        if template.disabled || !template.is_fully_configured() {
            msg!("template {} not eligible; skipping", template.template_id);
            continue;
        }
        let draw_at = local_time_to_unix(date, template.draw_minute_of_day, offset)?;
        if draw_at <= now {
            msg!("template {} draw time already passed for {}", template.template_id, date);
            continue;
        }
        planned.push((i, template, bump, draw_at));
    }

    // pass 2: write
    let payer = ctx.accounts.payer.to_account_info();
    let system_program = ctx.accounts.system_program.to_account_info();
    for (i, template, bump, draw_at) in planned {
        let template_ai = &remaining[2 * i];
        let run_ai = &remaining[2 * i + 1];

        create_pda_account(
            &payer,
            run_ai,
            &system_program,
            &[DRAW_RUN_SEED, template_ai.key.as_ref(), &date_le, &[bump]],
            8 + DrawRun::INIT_SPACE,
            ctx.program_id,
        )?;

        let run = DrawRun {
            template: *template_ai.key,
            template_id: template.template_id,
            date,
            bump,
            status: DrawRunStatus::Open,
            draw_at,
            games: template.games,
            results: [0; 3],
            result_declared: false,
            result_digest: [0u8; 32],
            sales: 0,
            ticket_count: 0,
            settled_count: 0,
            total_payout: 0,
            created_at: now,
            locked_at: 0,
            drawn_at: 0,
            settled_at: 0,
        };
        store_program_account(run_ai, &run)?;

        emit!(DrawRunCreated {
            template: run.template,
            draw_run: *run_ai.key,
            date,
            draw_at,
        });
    }

    Ok(())
}

fn transition(
    run: &mut DrawRun,
    run_key: Pubkey,
    to: DrawRunStatus,
    actor: Pubkey,
    now: i64,
) -> Result<()> {
    let from = run.status;
    run.status.advance(to)?;
    match to {
        DrawRunStatus::Locked => run.locked_at = now,
        DrawRunStatus::Drawn => run.drawn_at = now,
        DrawRunStatus::Settled => run.settled_at = now,
        _ => {}
    }
    emit!(DrawRunStatusChanged {
        actor,
        draw_run: run_key,
        from,
        to,
        at: now,
    });
    Ok(())
}

pub(crate) fn settle_transition(run: &mut DrawRun, run_key: Pubkey, actor: Pubkey, now: i64) -> Result<()> {
    transition(run, run_key, DrawRunStatus::Settled, actor, now)
}

/// Scheduled every minute: locks every supplied Open run whose draw time passed.
pub fn auto_lock_draws<'info>(ctx: Context<'_, '_, 'info, 'info, AutoLockDraws<'info>>) -> Result<()> {
    let remaining = ctx.remaining_accounts;
    require!(remaining.len() <= MAX_SWEEP_BATCH, LotteryError::BatchTooLarge);

    let now = Clock::get()?.unix_timestamp;
    let actor = ctx.accounts.cranker.key();

    let mut due: Vec<(usize, DrawRun)> = Vec::new();
    for (i, ai) in remaining.iter().enumerate() {
        let run: DrawRun = load_program_account(ai, ctx.program_id)?;
        if run.status == DrawRunStatus::Open && now >= run.draw_at {
            due.push((i, run));
        }
    }

    let mut locked = 0u32;
    for (i, mut run) in due {
        let ai = &remaining[i];
        transition(&mut run, *ai.key, DrawRunStatus::Locked, actor, now)?;
        store_program_account(ai, &run)?;
        locked += 1;
    }

    msg!("auto-locked {} draw runs", locked);
    Ok(())
}

pub fn lock_draw_run(ctx: Context<ManageDrawRun>) -> Result<()> {
    let actor = ctx.accounts.operator.key();
    require_operator(&ctx.accounts.config, &actor)?;

    let now = Clock::get()?.unix_timestamp;
    let key = ctx.accounts.draw_run.key();
    transition(&mut ctx.accounts.draw_run, key, DrawRunStatus::Locked, actor, now)
}

pub fn start_draw_run(ctx: Context<ManageDrawRun>) -> Result<()> {
    let actor = ctx.accounts.operator.key();
    require_operator(&ctx.accounts.config, &actor)?;

    let now = Clock::get()?.unix_timestamp;
    let key = ctx.accounts.draw_run.key();
    transition(&mut ctx.accounts.draw_run, key, DrawRunStatus::Running, actor, now)
}

/// Records the winning number per digit type (indexed 2D, 3D, 4D).
/// Entries for games the run does not offer must be 0.
pub fn declare_draw_result(ctx: Context<ManageDrawRun>, results: [u32; 3]) -> Result<()> {
    let actor = ctx.accounts.operator.key();
    require_operator(&ctx.accounts.config, &actor)?;
    validate_results(&ctx.accounts.draw_run.games, &results)?;

    let now = Clock::get()?.unix_timestamp;
    let key = ctx.accounts.draw_run.key();
    let run = &mut ctx.accounts.draw_run;
    require!(
        matches!(run.status, DrawRunStatus::Locked | DrawRunStatus::Running),
        LotteryError::DrawNotLocked
    );

    run.results = results;
    run.result_declared = true;
    run.result_digest = result_digest(&key, &results);
    transition(run, key, DrawRunStatus::Drawn, actor, now)?;

    emit!(DrawResultDeclared {
        actor,
        draw: key,
        results: results.to_vec(),
        result_digest: run.result_digest,
    });
    Ok(())
}

fn validate_results(games: &[DigitGame; 3], results: &[u32; 3]) -> Result<()> {
    for (i, (g, r)) in games.iter().zip(results.iter()).enumerate() {
        if g.enabled {
            require!(
                (*r as u64) < number_space(MIN_DIGITS + i as u8),
                LotteryError::InvalidNumber
            );
        } else {
            require!(*r == 0, LotteryError::InvalidNumber);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> DrawTemplateArgs {
        DrawTemplateArgs {
            name: "Evening".to_string(),
            draw_minute_of_day: 20 * 60,
            games: [
                DigitGame { enabled: true, multipliers: [90, 9, 0] },
                DigitGame::default(),
                DigitGame { enabled: true, multipliers: [9_000, 900, 90] },
            ],
            disabled: false,
        }
    }

    #[test]
    fn template_args_validation() {
        assert!(validate_template_args(&args()).is_ok());

        let mut a = args();
        a.draw_minute_of_day = MINUTES_PER_DAY;
        assert!(validate_template_args(&a).is_err());

        let mut a = args();
        a.games[0].multipliers = [90, 9, 1];
        assert!(validate_template_args(&a).is_err());

        let mut a = args();
        a.name = " ".to_string();
        assert!(validate_template_args(&a).is_err());
    }

    #[test]
    fn results_bounded_by_enabled_games() {
        let games = args().games;
        assert!(validate_results(&games, &[42, 0, 729]).is_ok());
        assert!(validate_results(&games, &[100, 0, 729]).is_err());
        assert!(validate_results(&games, &[42, 5, 729]).is_err());
        assert!(validate_results(&games, &[42, 0, 10_000]).is_err());
    }
}
