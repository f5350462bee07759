use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::{HqlError, Result};

/// Offset/limit window applied directly to the query handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    offset: usize,
    limit: usize,
}

impl Pagination {
    pub fn new(offset: usize, limit: usize) -> Result<Self> {
        if limit == 0 {
            return Err(HqlError::InvalidPagination("limit must be positive".into()));
        }
        Ok(Self { offset, limit })
    }

    /// Offset/limit request parameters, with the configured default page size
    /// filling a missing limit.
    pub fn from_request(
        offset: Option<usize>,
        limit: Option<usize>,
        config: &EngineConfig,
    ) -> Result<Self> {
        let limit = limit.unwrap_or(config.default_page_size);
        if limit > config.max_page_size {
            return Err(HqlError::InvalidPagination(format!(
                "limit {} exceeds the maximum page size {}",
                limit, config.max_page_size
            )));
        }
        Self::new(offset.unwrap_or(0), limit)
    }

    /// 1-based page number and page size.
    pub fn from_page(number: usize, size: Option<usize>, config: &EngineConfig) -> Result<Self> {
        if number == 0 {
            return Err(HqlError::InvalidPagination("page numbers start at 1".into()));
        }
        let size = size.unwrap_or(config.default_page_size);
        let offset = (number - 1).checked_mul(size).ok_or_else(|| {
            HqlError::InvalidPagination(format!("page {} of size {} is out of range", number, size))
        })?;
        Self::from_request(Some(offset), Some(size), config)
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}
