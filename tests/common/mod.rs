#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use radius_overlay::{ResultPoint, SearchInfo};

pub fn search(lon: f64, lat: f64, radius: f64) -> SearchInfo {
    SearchInfo::new(lon, lat, radius)
}

pub fn result(id: i64, device_id: i64, lon: f64, lat: f64) -> ResultPoint {
    ResultPoint {
        id,
        device_id,
        longitude: lon,
        latitude: lat,
        fix_time: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        speed: None,
        altitude: None,
        accuracy: None,
        address: None,
        device_name: None,
    }
}
