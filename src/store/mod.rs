pub mod memory;

use crate::core::cache::SeriesKey;
use crate::core::series::Series;
use memory::MemoryCache;

/// Process-scoped cache of fetched price series, shared across runs.
pub type SeriesCache = MemoryCache<SeriesKey, Series>;
