use crate::common::get_current_time_or_zero;
use log::{info, warn};
use rand::rngs::OsRng;
use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

const NODE_ID_BITS: u64 = 10;
const SEQUENCE_BITS: u64 = 12;
const EPOCH: u64 = 1288834974657;

/// Twitter-style snowflake generator: 41 bits of milliseconds since
/// [EPOCH], 10 bits of node id, 12 bits of per-millisecond sequence.
pub(crate) struct SnowflakeIdGenerator {
    node_id: u64,
    sequence: AtomicU64,
    last_timestamp: AtomicU64,
    mutex: Mutex<()>,
}

impl SnowflakeIdGenerator {
    pub fn new() -> Self {
        let max_node_id = (1_u64 << NODE_ID_BITS) - 1;
        let mut node_id = Self::random_node_id();
        if node_id > max_node_id {
            warn!("Node id can't be greater than {}", max_node_id);
            node_id = OsRng.gen_range(1..=max_node_id);
        }
        info!("Initialized id generator with node id: {}", node_id);

        SnowflakeIdGenerator {
            node_id,
            sequence: AtomicU64::new(0),
            last_timestamp: AtomicU64::new(0),
            mutex: Mutex::new(()),
        }
    }

    pub fn get_id(&self) -> u64 {
        let _lock = match self.mutex.lock() {
            Ok(lock) => lock,
            Err(poisoned) => {
                warn!("Snowflake lock was poisoned, recovering");
                poisoned.into_inner()
            }
        };

        let sequence_mask = (1_u64 << SEQUENCE_BITS) - 1;
        let mut timestamp = get_current_time_or_zero() as u64;
        let last_timestamp = self.last_timestamp.load(Ordering::Relaxed);

        // clock moved backwards, keep issuing ids from the last timestamp
        if timestamp < last_timestamp {
            timestamp = last_timestamp;
        }

        let sequence = if timestamp == last_timestamp {
            let next = (self.sequence.load(Ordering::Relaxed) + 1) & sequence_mask;
            if next == 0 {
                // sequence exhausted for this millisecond
                while timestamp <= last_timestamp {
                    std::thread::yield_now();
                    timestamp = get_current_time_or_zero() as u64;
                }
            }
            next
        } else {
            0
        };

        self.sequence.store(sequence, Ordering::Relaxed);
        self.last_timestamp.store(timestamp, Ordering::Relaxed);

        ((timestamp.saturating_sub(EPOCH)) << (SEQUENCE_BITS + NODE_ID_BITS))
            | (self.node_id << SEQUENCE_BITS)
            | sequence
    }

    fn random_node_id() -> u64 {
        let uuid = uuid::Uuid::new_v4();
        let uid = uuid.as_bytes();
        let rnd_byte = OsRng.gen::<u64>() & 0x000000FF;

        ((0x000000FF & uid[uid.len() - 1] as u64) | (0x0000FF00 & (rnd_byte << 8))) >> 6
    }
}
