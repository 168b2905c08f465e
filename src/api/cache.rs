// ==========================================
// 八字运势引擎 - 命盘缓存
// ==========================================
// 键: (出生日期, 出生时间, 经度位模式)
// 值: 命盘 + 旺衰 + 用神，出生信息不变则结果不变，永不失效
// 红线: 同一个键至多计算一次（并发请求等待同一次计算）
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::api::fortune_api::ChartAnalysis;
use chrono::{NaiveDate, NaiveTime};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChartKey {
    pub date: NaiveDate,
    pub time: NaiveTime,
    longitude_bits: u64,
}

impl ChartKey {
    pub fn new(date: NaiveDate, time: NaiveTime, longitude: f64) -> Self {
        // -0.0 与 0.0 视为同一经度
        let longitude = if longitude == 0.0 { 0.0 } else { longitude };
        Self {
            date,
            time,
            longitude_bits: longitude.to_bits(),
        }
    }

    pub fn longitude(&self) -> f64 {
        f64::from_bits(self.longitude_bits)
    }
}

type Slot = Arc<OnceLock<Arc<ChartAnalysis>>>;

#[derive(Debug, Default)]
pub struct ChartCache {
    entries: Mutex<HashMap<ChartKey, Slot>>,
}

impl ChartCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> ApiResult<MutexGuard<'_, HashMap<ChartKey, Slot>>> {
        self.entries
            .lock()
            .map_err(|e| ApiError::LockError(e.to_string()))
    }

    /// 命中则直接返回，否则计算并写入
    ///
    /// 计算在表锁之外进行，只阻塞同一个键的并发请求
    pub fn get_or_compute<F>(&self, key: ChartKey, compute: F) -> ApiResult<Arc<ChartAnalysis>>
    where
        F: FnOnce() -> ChartAnalysis,
    {
        let slot = {
            let mut entries = self.lock()?;
            Arc::clone(entries.entry(key).or_default())
        };
        Ok(Arc::clone(slot.get_or_init(|| Arc::new(compute()))))
    }

    pub fn get(&self, key: &ChartKey) -> ApiResult<Option<Arc<ChartAnalysis>>> {
        let entries = self.lock()?;
        Ok(entries.get(key).and_then(|slot| slot.get().cloned()))
    }

    pub fn len(&self) -> ApiResult<usize> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> ApiResult<bool> {
        Ok(self.lock()?.is_empty())
    }
}
