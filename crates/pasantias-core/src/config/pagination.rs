//! Default page sizes for every list view.

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::types::pagination::{MAX_LIMIT, MIN_LIMIT};

/// Default `limit` used by each list view when it is first opened.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Admin offer review list.
    #[serde(default = "default_ten")]
    pub admin_offers: u32,
    /// Organization's own offers.
    #[serde(default = "default_ten")]
    pub organization_offers: u32,
    /// Student offer browser.
    #[serde(default = "default_twelve")]
    pub student_offers: u32,
    /// Every application list.
    #[serde(default = "default_twenty")]
    pub applications: u32,
}

impl PaginationConfig {
    /// Check that every configured size is inside the accepted range.
    pub fn validate(&self) -> Result<(), AppError> {
        let sizes = [
            ("admin_offers", self.admin_offers),
            ("organization_offers", self.organization_offers),
            ("student_offers", self.student_offers),
            ("applications", self.applications),
        ];
        for (name, size) in sizes {
            if !(MIN_LIMIT..=MAX_LIMIT).contains(&size) {
                return Err(AppError::configuration(format!(
                    "pagination.{name} must be between {MIN_LIMIT} and {MAX_LIMIT}, got {size}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            admin_offers: default_ten(),
            organization_offers: default_ten(),
            student_offers: default_twelve(),
            applications: default_twenty(),
        }
    }
}

fn default_ten() -> u32 {
    10
}

fn default_twelve() -> u32 {
    12
}

fn default_twenty() -> u32 {
    20
}
