use syncscript_types::Timestamp;

/// 2024-01-15T09:00:00.000Z
const SEED_EPOCH_MS: i64 = 1_705_309_200_000;

/// A fixed seed timestamp `minutes` after the seed epoch.
pub(crate) fn at(minutes: i64) -> Timestamp {
    Timestamp::from_millis(SEED_EPOCH_MS + minutes * 60_000).unwrap_or_default()
}
