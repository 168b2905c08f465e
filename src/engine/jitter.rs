// ==========================================
// 八字运势引擎 - 流日确定性扰动
// ==========================================
// 种子: SHA-256("bazi-jitter/v1|" + 流日天干 + 流日地支) → ChaCha8
// 同一流日的扰动序列恒定, 不同流日互不相同
// 红线: 种子只依赖流日干支, 不得引入系统时间
// ==========================================

use crate::domain::ganzhi::GanZhi;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

/// 种子版本前缀，算法变更时递增
pub const JITTER_SEED_VERSION: &str = "bazi-jitter/v1";

pub struct DayJitter {
    rng: ChaCha8Rng,
}

impl DayJitter {
    pub fn for_day(day: GanZhi) -> Self {
        Self::from_seed(seed_for(day))
    }

    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self {
            rng: ChaCha8Rng::from_seed(seed),
        }
    }

    /// 闭区间 [lo, hi] 内的整数
    pub fn int(&mut self, lo: i32, hi: i32) -> i32 {
        if lo >= hi {
            return lo;
        }
        self.rng.gen_range(lo..=hi)
    }
}

/// 流日干支的种子
pub fn seed_for(day: GanZhi) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(JITTER_SEED_VERSION.as_bytes());
    hasher.update(b"|");
    hasher.update(day.stem.symbol().as_bytes());
    hasher.update(day.branch.symbol().as_bytes());
    let digest = hasher.finalize();
    let mut seed = [0u8; 32];
    seed.copy_from_slice(&digest);
    seed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_day_same_sequence() {
        let day = GanZhi::from_index(16);
        let mut a = DayJitter::for_day(day);
        let mut b = DayJitter::for_day(day);
        let xs: Vec<i32> = (0..16).map(|_| a.int(-4, 4)).collect();
        let ys: Vec<i32> = (0..16).map(|_| b.int(-4, 4)).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn test_seeds_differ_between_days() {
        let seeds: std::collections::HashSet<[u8; 32]> =
            (0..60).map(|i| seed_for(GanZhi::from_index(i))).collect();
        assert_eq!(seeds.len(), 60);
    }

    #[test]
    fn test_int_stays_in_closed_range() {
        let mut jitter = DayJitter::for_day(GanZhi::from_index(0));
        for _ in 0..200 {
            let v = jitter.int(-2, 1);
            assert!((-2..=1).contains(&v));
        }
        assert_eq!(jitter.int(3, 3), 3);
    }
}
