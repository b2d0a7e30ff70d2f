//! Record and template types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One plane entry of a sample set.
///
/// Templates carry everything except the identity and time of a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaneTemplate {
    pub speed: f64,
    pub dist: f64,
    pub bearing: f64,
    pub rtid: i32,
    pub orig: String,
    pub dest: String,
    pub secs_to_dep: i32,
    pub lon: f64,
    pub lat: f64,
}

impl PlaneTemplate {
    /// WKT point for this template's position. Whole-number coordinates keep
    /// their `.0`.
    pub fn geometry(&self) -> String {
        format!("POINT ({:?} {:?})", self.lon, self.lat)
    }

    /// Stamp this template into a record with the given id and time.
    pub fn stamp(&self, id: Uuid, ts: DateTime<Utc>) -> Record {
        Record {
            id,
            ts,
            speed: self.speed,
            dist: self.dist,
            bearing: self.bearing,
            rtid: self.rtid,
            orig: self.orig.clone(),
            dest: self.dest.clone(),
            secs_to_dep: self.secs_to_dep,
            lon: self.lon,
            lat: self.lat,
            geometry: self.geometry(),
        }
    }
}

/// A synthetic record ready to be written to a destination.
///
/// Records are immutable once built and are dropped after their write
/// completes or fails.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub id: Uuid,
    pub ts: DateTime<Utc>,
    pub speed: f64,
    pub dist: f64,
    pub bearing: f64,
    pub rtid: i32,
    pub orig: String,
    pub dest: String,
    pub secs_to_dep: i32,
    pub lon: f64,
    pub lat: f64,
    pub geometry: String,
}

impl Record {
    /// Returns true if the template-derived fields match `template`.
    pub fn matches_template(&self, template: &PlaneTemplate) -> bool {
        self.speed == template.speed
            && self.dist == template.dist
            && self.bearing == template.bearing
            && self.rtid == template.rtid
            && self.orig == template.orig
            && self.dest == template.dest
            && self.secs_to_dep == template.secs_to_dep
            && self.lon == template.lon
            && self.lat == template.lat
    }
}
