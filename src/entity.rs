use chrono::{DateTime, Utc};
use tracing::info;

use crate::config::EntityConfig;

/// Meters per degree of latitude at the equator.
const METERS_PER_DEGREE: f64 = 111_111.0;

/// Below this value of cos(latitude) the meridian convergence correction is
/// degenerate and the longitude drift for the step is skipped.
const POLE_COS_EPSILON: f64 = 1e-9;

/// A position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    /// Latitude in decimal degrees
    pub lat: f64,
    /// Longitude in decimal degrees
    pub lon: f64,
}

/// Point-in-time view of an entity, composed of its static fields and a
/// freshly advanced position.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Display name
    pub name: String,
    /// Whether the simulation clock has been started
    pub running: bool,
    /// Display icon, no behavioral effect
    pub icon: String,
    /// Latitude in decimal degrees
    pub lat: f64,
    /// Longitude in decimal degrees
    pub lon: f64,
}

/// A moving sensor that derives its position by integrating a constant
/// velocity over the wall-clock time elapsed since the last sample.
///
/// Position reads are side-effecting: every [`Entity::advance`] both returns
/// and stores the new coordinates, and moves the clock reference forward.
/// There is no read-only accessor for the integrated position.
#[derive(Debug, Clone)]
pub struct Entity {
    name: String,
    icon: String,
    lat: f64,
    lon: f64,
    /// Northward velocity in meters per second, negative moves south
    speed_north: f64,
    /// Eastward velocity in meters per second, negative moves west
    speed_east: f64,
    last_update: Option<DateTime<Utc>>,
}

impl Entity {
    /// Create an entity with unit velocities at the origin. Position and
    /// velocity are normally assigned before [`Entity::start`].
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            icon: ":star:".to_string(),
            lat: 0.0,
            lon: 0.0,
            speed_north: 1.0,
            speed_east: 1.0,
            last_update: None,
        }
    }

    /// Build an entity from a configuration record.
    pub fn from_config(config: &EntityConfig) -> Self {
        let mut entity = Self::new(config.name.clone());
        entity.set_position(config.initial_lat, config.initial_lon);
        entity.set_velocity(config.speed_north, config.speed_east);
        entity.icon = config.icon.clone();
        entity
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Topic-safe form of the name: spaces become underscores, everything
    /// else is kept as-is.
    pub fn slug(&self) -> String {
        self.name.replace(' ', "_")
    }

    /// Whether the simulation clock has been started.
    pub fn running(&self) -> bool {
        self.last_update.is_some()
    }

    /// Assign the constant velocity in meters per second.
    pub fn set_velocity(&mut self, speed_north: f64, speed_east: f64) {
        self.speed_north = speed_north;
        self.speed_east = speed_east;
    }

    /// Store a position, clamping latitude to [-90, 90]. Longitude overflow
    /// wraps across the antimeridian: above 180 lands at -180 and below
    /// -180 lands at 180, so an entity crossing the boundary continues from
    /// the other side.
    pub fn set_position(&mut self, lat: f64, lon: f64) {
        self.lat = if lat > 90.0 {
            90.0
        } else if lat < -90.0 {
            -90.0
        } else {
            lat
        };

        self.lon = if lon > 180.0 {
            -180.0
        } else if lon < -180.0 {
            180.0
        } else {
            lon
        };
    }

    /// Start the simulation clock.
    pub fn start(&mut self) {
        self.last_update = Some(Utc::now());
        info!(entity = %self.name, "Started entity");
    }

    /// Advance the simulation clock to now and return the new position.
    ///
    /// Non-idempotent: each call integrates the velocity over the wall-clock
    /// time elapsed since the previous call and stores the result. Calling
    /// this on an entity that was never started behaves as a zero-elapsed
    /// advance and starts the clock.
    pub fn advance(&mut self) -> Position {
        self.advance_to(Utc::now())
    }

    fn advance_to(&mut self, now: DateTime<Utc>) -> Position {
        let elapsed_secs = self
            .last_update
            .map(|last| (now - last).num_milliseconds() as f64 / 1000.0)
            .unwrap_or(0.0);

        let lat = self.lat + (elapsed_secs * self.speed_north) / METERS_PER_DEGREE;

        // Longitude scaling corrects for meridian convergence using the
        // pre-update latitude. At the poles the correction divides by ~0,
        // so the longitude component is held for that step.
        let meridian_scale = self.lat.to_radians().cos();
        let lon = if meridian_scale.abs() < POLE_COS_EPSILON {
            self.lon
        } else {
            self.lon + (elapsed_secs * self.speed_east) / (METERS_PER_DEGREE * meridian_scale)
        };

        self.set_position(lat, lon);
        self.last_update = Some(now);

        Position {
            lat: self.lat,
            lon: self.lon,
        }
    }

    /// Compose the static fields with a fresh [`Entity::advance`] call.
    /// Each invocation therefore moves simulated time forward.
    pub fn snapshot(&mut self) -> Snapshot {
        let running = self.running();
        let position = self.advance();
        Snapshot {
            name: self.name.clone(),
            running,
            icon: self.icon.clone(),
            lat: position.lat,
            lon: position.lon,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use proptest::prelude::*;

    #[test]
    fn clamp_wraps_longitude_overflow() {
        let mut entity = Entity::new("test");
        entity.set_position(95.0, 185.0);
        assert_eq!(entity.lat, 90.0);
        assert_eq!(entity.lon, -180.0);

        entity.set_position(-95.0, -185.0);
        assert_eq!(entity.lat, -90.0);
        assert_eq!(entity.lon, 180.0);
    }

    #[test]
    fn clamp_keeps_in_range_values() {
        let mut entity = Entity::new("test");
        entity.set_position(66.543, 25.846);
        assert_eq!(entity.lat, 66.543);
        assert_eq!(entity.lon, 25.846);
    }

    proptest! {
        #[test]
        fn stored_position_always_in_range(lat in -1.0e6..1.0e6f64, lon in -1.0e6..1.0e6f64) {
            let mut entity = Entity::new("prop");
            entity.set_position(lat, lon);
            prop_assert!((-90.0..=90.0).contains(&entity.lat));
            prop_assert!((-180.0..=180.0).contains(&entity.lon));
        }
    }

    #[test]
    fn zero_elapsed_advance_returns_same_position() {
        let mut entity = Entity::new("test");
        entity.set_position(60.0, 25.0);
        entity.set_velocity(2.0, 3.0);

        let t0 = Utc::now();
        entity.last_update = Some(t0);
        let first = entity.advance_to(t0);
        let second = entity.advance_to(t0);

        assert!((second.lat - first.lat).abs() < 1e-9);
        assert!((second.lon - first.lon).abs() < 1e-9);
    }

    #[test]
    fn northward_drift_after_elapsed_time() {
        let mut entity = Entity::new("test");
        entity.set_position(60.0, 25.0);
        entity.set_velocity(2.0, 0.0);

        let t0 = Utc::now();
        entity.last_update = Some(t0);
        let position = entity.advance_to(t0 + Duration::milliseconds(111_111));

        assert!((position.lat - 60.002).abs() < 1e-6);
        assert_eq!(position.lon, 25.0);
    }

    #[test]
    fn westward_drift_for_negative_east_velocity() {
        let mut entity = Entity::new("test");
        entity.set_position(60.0, 25.0);
        entity.set_velocity(0.0, -4.0);

        let t0 = Utc::now();
        entity.last_update = Some(t0);
        let position = entity.advance_to(t0 + Duration::seconds(100));

        assert!(position.lon < 25.0);
        assert_eq!(position.lat, 60.0);
    }

    #[test]
    fn pole_guard_keeps_longitude_finite() {
        let mut entity = Entity::new("test");
        entity.set_position(90.0, 10.0);
        entity.set_velocity(0.0, 50.0);

        let t0 = Utc::now();
        entity.last_update = Some(t0);
        let position = entity.advance_to(t0 + Duration::seconds(60));

        assert!(position.lon.is_finite());
        assert_eq!(position.lon, 10.0);
    }

    #[test]
    fn slug_replaces_spaces_only() {
        let entity = Entity::new("Reindeer 1.");
        assert_eq!(entity.slug(), "Reindeer_1.");
    }

    #[test]
    fn snapshot_reports_running_after_start() {
        let mut entity = Entity::new("test");
        entity.set_position(66.543, 25.846);
        assert!(!entity.running());

        entity.start();
        let snapshot = entity.snapshot();
        assert!(snapshot.running);
        assert_eq!(snapshot.name, "test");
    }
}
