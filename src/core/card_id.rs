//! Card and page id generation.
//!
//! Ids embed their creation time in milliseconds. Ids minted together in
//! one batch also carry a random base-36 suffix so they stay unique within
//! the same millisecond.

use chrono::Utc;
use rand::Rng;
use std::collections::HashSet;

/// Length of the random suffix on batch ids
pub const SUFFIX_LEN: usize = 9;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Current time in milliseconds since the Unix epoch
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// `<prefix>_<millis>`
pub fn card_id_at(prefix: &str, millis: i64) -> String {
    format!("{}_{}", prefix, millis)
}

/// `<prefix>_<millis>_<suffix>`
pub fn batch_card_id_at<R: Rng>(prefix: &str, millis: i64, rng: &mut R) -> String {
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("{}_{}_{}", prefix, millis, suffix)
}

/// Mint a single id for a card created on its own
pub fn mint_card_id(prefix: &str) -> String {
    card_id_at(prefix, now_millis())
}

/// Mint `count` distinct ids sharing one timestamp
pub fn mint_batch_card_ids(prefix: &str, count: usize) -> Vec<String> {
    let millis = now_millis();
    let mut rng = rand::thread_rng();
    let mut seen = HashSet::with_capacity(count);
    let mut ids = Vec::with_capacity(count);
    while ids.len() < count {
        let id = batch_card_id_at(prefix, millis, &mut rng);
        if seen.insert(id.clone()) {
            ids.push(id);
        }
    }
    ids
}
