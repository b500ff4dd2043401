//! Place floorplans and the pins placed on them.
//!
//! Pin coordinates are normalized to the image: `(0, 0)` is the top-left
//! corner, `(1, 1)` the bottom-right.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{LokalError, LokalResult};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaceFloorplan {
    pub id: Uuid,
    pub site_id: Uuid,
    pub place_id: Uuid,
    pub title: String,
    pub image_url: String,
    pub sort_order: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFloorplan {
    pub site_id: Uuid,
    pub place_id: Uuid,
    pub title: String,
    pub image_url: String,
    /// Appended after the last floorplan when omitted.
    pub sort_order: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateFloorplan {
    pub title: Option<String>,
    pub image_url: Option<String>,
    pub sort_order: Option<i64>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FloorplanPin {
    pub id: Uuid,
    pub site_id: Uuid,
    pub floorplan_id: Uuid,
    pub x: f64,
    pub y: f64,
    pub label: String,
    pub sort_order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePin {
    pub site_id: Uuid,
    pub floorplan_id: Uuid,
    pub x: f64,
    pub y: f64,
    pub label: String,
    pub sort_order: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdatePin {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub label: Option<String>,
    pub sort_order: Option<i64>,
}

/// Reject coordinates outside the normalized `0..=1` range (NaN included).
pub fn validate_coordinate(axis: &str, value: f64) -> LokalResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(LokalError::validation(format!(
            "pin coordinate {axis} must be between 0 and 1, got {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_bounds_inclusive() {
        assert!(validate_coordinate("x", 0.0).is_ok());
        assert!(validate_coordinate("x", 1.0).is_ok());
        assert!(validate_coordinate("y", 0.42).is_ok());
    }

    #[test]
    fn rejects_out_of_range_and_nan() {
        assert!(validate_coordinate("x", -0.01).is_err());
        assert!(validate_coordinate("y", 1.5).is_err());
        assert!(validate_coordinate("y", f64::NAN).is_err());
    }
}
