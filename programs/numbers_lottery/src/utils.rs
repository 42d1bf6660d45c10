use anchor_lang::prelude::*;
use anchor_lang::system_program;
use solana_sha256_hasher::hashv;

use crate::{
    constants::*,
    errors::LotteryError,
    state::{DigitGame, PrizeTier},
};

// -----------------
// Seeds
// -----------------
pub const CONFIG_SEED: &[u8] = b"config_v1";
pub const TREASURY_SEED: &[u8] = b"treasury_v1";

pub const USER_SEED: &[u8] = b"user_v1";
pub const LEDGER_SEED: &[u8] = b"ledger_v1";
pub const BONUS_SEED: &[u8] = b"bonus_v1";
pub const WITHDRAW_SEED: &[u8] = b"withdraw_v1";

pub const DRAW_TEMPLATE_SEED: &[u8] = b"draw_template_v1";
pub const DRAW_RUN_SEED: &[u8] = b"draw_run_v1";

pub const DIGIT_TEMPLATE_SEED: &[u8] = b"digit_template_v1";
pub const SLOT_REGISTRY_SEED: &[u8] = b"slot_registry_v1";
pub const SLOT_SEED: &[u8] = b"slot_v1";
pub const SEAT_SEED: &[u8] = b"seat_v1";

pub const JACKPOT_SEED: &[u8] = b"jackpot_v1";
pub const TICKET_SEED: &[u8] = b"ticket_v1";

// ---------------
// Request payloads
// ---------------
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct NumberStake {
    pub number: String,
    pub amount: u64,
}

/// Tunables changed by `update_settings`; `None` keeps the current value.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default)]
pub struct SettingsArgs {
    pub hold_duration_secs: Option<i64>,
    pub bonus_cap_bps: Option<u16>,
    pub utc_offset_secs: Option<i32>,
    pub max_withdraw_per_request: Option<u64>,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct DrawTemplateArgs {
    pub name: String,
    pub draw_minute_of_day: u16,
    pub games: [DigitGame; 3],
    pub disabled: bool,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct DigitTemplateArgs {
    pub name: String,
    pub digits: u8,
    pub ticket_price: u64,
    pub multipliers: [u32; 3],
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct JackpotArgs {
    pub name: String,
    pub digits: u8,
    pub ticket_price: u64,
    pub total_capacity: u64,
    pub guaranteed_sales_pct: u8,
    pub tiers: Vec<PrizeTier>,
    pub draw_at: i64,
}

/// Partial update; `None` leaves the field untouched.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default)]
pub struct JackpotPatch {
    pub name: Option<String>,
    pub ticket_price: Option<u64>,
    pub total_capacity: Option<u64>,
    pub guaranteed_sales_pct: Option<u8>,
    pub tiers: Option<Vec<PrizeTier>>,
    pub draw_at: Option<i64>,
    pub status: Option<crate::state::JackpotStatus>,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct HoldReceipt {
    pub hold_until: i64,
    pub hold_duration_seconds: i64,
}

// -------------------------
// Numbers
// -------------------------
pub fn validate_name(name: &str) -> Result<()> {
    require!(
        !name.trim().is_empty() && name.len() <= MAX_NAME_LEN,
        LotteryError::InvalidName
    );
    Ok(())
}

/// A lottery number is exactly `digits` ASCII digits; leading zeros count.
pub fn validate_number(number: &str, digits: u8) -> Result<()> {
    require!(
        number.len() == digits as usize && number.bytes().all(|b| b.is_ascii_digit()),
        LotteryError::InvalidNumber
    );
    Ok(())
}

/// Non-empty, bounded, well-formed and duplicate-free.
pub fn validate_number_set<'a, I>(numbers: I, digits: u8) -> Result<usize>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen: Vec<&str> = Vec::new();
    for n in numbers {
        validate_number(n, digits)?;
        require!(!seen.contains(&n), LotteryError::DuplicateNumber);
        seen.push(n);
        require!(seen.len() <= MAX_NUMBERS_PER_PURCHASE, LotteryError::TooManyNumbers);
    }
    require!(!seen.is_empty(), LotteryError::EmptyNumbers);
    Ok(seen.len())
}

pub fn number_space(digits: u8) -> u64 {
    10u64.pow(digits as u32)
}

/// Zero-padded rendering of a declared result.
pub fn format_number(value: u32, digits: u8) -> Result<String> {
    require!((value as u64) < number_space(digits), LotteryError::InvalidNumber);
    Ok(format!("{:0width$}", value, width = digits as usize))
}

// -------------------------
// Calendar (local dates as yyyymmdd)
// -------------------------

/// Days since 1970-01-01 for a proleptic Gregorian date.
pub fn days_from_civil(year: i64, month: u32, day: u32) -> i64 {
    let y = if month <= 2 { year - 1 } else { year };
    let era = (if y >= 0 { y } else { y - 399 }) / 400;
    let yoe = y - era * 400;
    let m = month as i64;
    let doy = (153 * (if m > 2 { m - 3 } else { m + 9 }) + 2) / 5 + (day as i64) - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

pub fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = (if z >= 0 { z } else { z - 146_096 }) / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + (if month <= 2 { 1 } else { 0 });
    (year, month, day)
}

fn split_date_key(date: u32) -> Result<(i64, u32, u32)> {
    let year = (date / 10_000) as i64;
    let month = (date / 100) % 100;
    let day = date % 100;
    require!((1..=12).contains(&month) && day >= 1, LotteryError::InvalidDate);
    // Reject days past the end of the month by round-tripping.
    let days = days_from_civil(year, month, day);
    require!(civil_from_days(days) == (year, month, day), LotteryError::InvalidDate);
    Ok((year, month, day))
}

pub fn date_key_from_days(days: i64) -> u32 {
    let (y, m, d) = civil_from_days(days);
    (y as u32) * 10_000 + m * 100 + d
}

/// Local calendar date of a unix timestamp.
pub fn local_date_key(unix_ts: i64, utc_offset_secs: i32) -> u32 {
    let local = unix_ts + utc_offset_secs as i64;
    date_key_from_days(local.div_euclid(SECONDS_PER_DAY))
}

pub fn local_hour(unix_ts: i64, utc_offset_secs: i32) -> u8 {
    let local = unix_ts + utc_offset_secs as i64;
    (local.rem_euclid(SECONDS_PER_DAY) / 3_600) as u8
}

pub fn next_date_key(date: u32) -> Result<u32> {
    let (y, m, d) = split_date_key(date)?;
    Ok(date_key_from_days(days_from_civil(y, m, d) + 1))
}

/// Unix time of `minute_of_day` local time on `date`.
pub fn local_time_to_unix(date: u32, minute_of_day: u16, utc_offset_secs: i32) -> Result<i64> {
    require!(minute_of_day < MINUTES_PER_DAY, LotteryError::InvalidDrawTime);
    let (y, m, d) = split_date_key(date)?;
    let local = days_from_civil(y, m, d)
        .checked_mul(SECONDS_PER_DAY)
        .and_then(|s| s.checked_add(minute_of_day as i64 * SECONDS_PER_MINUTE))
        .ok_or(LotteryError::MathOverflow)?;
    Ok(local - utc_offset_secs as i64)
}

// -------------------------
// Result digest
// -------------------------
pub fn result_digest(draw: &Pubkey, results: &[u32]) -> [u8; 32] {
    let mut buf = Vec::with_capacity(results.len() * 4);
    for r in results {
        buf.extend_from_slice(&r.to_le_bytes());
    }
    hashv(&[b"numbers-lottery:result_v1".as_ref(), draw.as_ref(), &buf[..]]).to_bytes()
}

// -------------------------
// Raw account plumbing (remaining accounts)
// -------------------------
pub fn is_uninitialized(ai: &AccountInfo) -> bool {
    ai.lamports() == 0 && ai.data_is_empty()
}

/// Creates a program-owned PDA; the PDA signs with `signer_seeds` (bump included).
pub fn create_pda_account<'info>(
    payer: &AccountInfo<'info>,
    target: &AccountInfo<'info>,
    system_program_ai: &AccountInfo<'info>,
    signer_seeds: &[&[u8]],
    space: usize,
    program_id: &Pubkey,
) -> Result<()> {
    let lamports = Rent::get()?.minimum_balance(space);
    system_program::create_account(
        CpiContext::new_with_signer(
            system_program_ai.clone(),
            system_program::CreateAccount {
                from: payer.clone(),
                to: target.clone(),
            },
            &[signer_seeds],
        ),
        lamports,
        space as u64,
        program_id,
    )
}

pub fn load_program_account<T: AccountDeserialize>(
    ai: &AccountInfo,
    program_id: &Pubkey,
) -> Result<T> {
    require_keys_eq!(*ai.owner, *program_id, LotteryError::NotOwnedByProgram);
    let data = ai
        .try_borrow_data()
        .map_err(|_| error!(LotteryError::AccountBorrowFailed))?;
    let mut slice: &[u8] = &data;
    T::try_deserialize(&mut slice)
}

pub fn store_program_account<T: AccountSerialize>(ai: &AccountInfo, value: &T) -> Result<()> {
    let mut data = ai
        .try_borrow_mut_data()
        .map_err(|_| error!(LotteryError::AccountBorrowFailed))?;
    let mut w = std::io::Cursor::new(&mut data[..]);
    value.try_serialize(&mut w)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_keep_leading_zeros() {
        assert!(validate_number("0729", 4).is_ok());
        assert!(validate_number("729", 4).is_err());
        assert!(validate_number("07a9", 4).is_err());
        assert!(validate_number("42", 2).is_ok());
        assert_eq!(format_number(729, 4).unwrap(), "0729");
        assert_eq!(format_number(5, 2).unwrap(), "05");
        assert!(format_number(100, 2).is_err());
    }

    #[test]
    fn number_set_rejects_duplicates_and_empty() {
        assert_eq!(validate_number_set(["42", "17"], 2).unwrap(), 2);
        assert!(validate_number_set(["42", "42"], 2).is_err());
        assert!(validate_number_set(Vec::<&str>::new(), 2).is_err());
        let too_many: Vec<String> = (0..=MAX_NUMBERS_PER_PURCHASE).map(|i| format!("{:02}", i)).collect();
        assert!(validate_number_set(too_many.iter().map(|s| s.as_str()), 2).is_err());
    }

    #[test]
    fn civil_round_trip() {
        assert_eq!(days_from_civil(1970, 1, 1), 0);
        assert_eq!(civil_from_days(0), (1970, 1, 1));
        assert_eq!(days_from_civil(2000, 3, 1), 11_017);
        let d = days_from_civil(2024, 2, 29);
        assert_eq!(civil_from_days(d), (2024, 2, 29));
        assert_eq!(date_key_from_days(d + 1), 20_240_301);
    }

    #[test]
    fn date_keys_respect_local_offset() {
        // 2026-10-19 19:00:00 UTC is 2026-10-20 00:30 in UTC+05:30.
        let ts = days_from_civil(2026, 10, 19) * SECONDS_PER_DAY + 19 * 3_600;
        assert_eq!(local_date_key(ts, 0), 20_261_019);
        assert_eq!(local_date_key(ts, DEFAULT_UTC_OFFSET_SECS), 20_261_020);
        assert_eq!(local_hour(ts, DEFAULT_UTC_OFFSET_SECS), 0);
    }

    #[test]
    fn next_date_rolls_over_months_and_years() {
        assert_eq!(next_date_key(20_261_031).unwrap(), 20_261_101);
        assert_eq!(next_date_key(20_261_231).unwrap(), 20_270_101);
        assert!(next_date_key(20_260_230).is_err());
        assert!(next_date_key(20_261_301).is_err());
    }

    #[test]
    fn draw_time_converts_local_to_unix() {
        let unix = local_time_to_unix(20_261_020, 13 * 60, DEFAULT_UTC_OFFSET_SECS).unwrap();
        let expected = days_from_civil(2026, 10, 20) * SECONDS_PER_DAY + 13 * 3_600
            - DEFAULT_UTC_OFFSET_SECS as i64;
        assert_eq!(unix, expected);
        assert!(local_time_to_unix(20_261_020, MINUTES_PER_DAY, 0).is_err());
    }

    #[test]
    fn result_digest_binds_draw_and_result() {
        let draw = Pubkey::new_unique();
        let a = result_digest(&draw, &[42]);
        assert_eq!(a, result_digest(&draw, &[42]));
        assert_ne!(a, result_digest(&draw, &[43]));
        assert_ne!(a, result_digest(&Pubkey::new_unique(), &[42]));
    }
}
