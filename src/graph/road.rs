//! Volume-delay parameters for road edges.
//!
//! A road edge travels at `free_flow_time` while empty and slows down as its
//! volume approaches and exceeds capacity, following the Bureau of Public
//! Roads curve:
//!
//! ```text
//! t(v) = t0 * (1 + alpha * (v / c) ^ beta)
//! ```

use crate::config::{LengthMode, RoadDefaults};
use crate::error::{NetworkError, Result};
use serde::{Deserialize, Serialize};

/// The volume-delay payload of a road edge.
///
/// `cost` always holds `cost_function(volume)`: every setter that changes an
/// input of the curve recomputes it, so reads never see a stale value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadParams {
    alpha: f64,
    beta: f64,
    free_flow_time: f64,
    free_flow_speed: f64,
    capacity: f64,
    volume: f64,
    cost: f64,
}

impl RoadParams {
    /// Creates parameters from a known free-flow travel time, using the
    /// default shape parameters.
    pub fn new(free_flow_time: f64, capacity: f64) -> Result<Self> {
        Self::with_defaults(free_flow_time, capacity, &RoadDefaults::default())
    }

    pub fn with_defaults(free_flow_time: f64, capacity: f64, defaults: &RoadDefaults) -> Result<Self> {
        check_non_negative("free_flow_time", free_flow_time)?;
        check_capacity(capacity)?;
        check_non_negative("alpha", defaults.alpha)?;
        check_non_negative("beta", defaults.beta)?;
        let mut params = Self {
            alpha: defaults.alpha,
            beta: defaults.beta,
            free_flow_time,
            free_flow_speed: defaults.free_flow_speed,
            capacity,
            volume: 0.0,
            cost: free_flow_time,
        };
        params.refresh();
        Ok(params)
    }

    /// Derives the free-flow time as `length / free_flow_speed`.
    pub fn from_length(length: f64, free_flow_speed: f64, capacity: f64) -> Result<Self> {
        Self::from_length_with_defaults(length, free_flow_speed, capacity, &RoadDefaults::default())
    }

    pub fn from_length_with_defaults(
        length: f64,
        free_flow_speed: f64,
        capacity: f64,
        defaults: &RoadDefaults,
    ) -> Result<Self> {
        check_non_negative("length", length)?;
        if !(free_flow_speed > 0.0 && free_flow_speed.is_finite()) {
            return Err(NetworkError::domain("free_flow_speed", free_flow_speed, "must be positive and finite"));
        }
        let mut params = Self::with_defaults(length / free_flow_speed, capacity, defaults)?;
        params.free_flow_speed = free_flow_speed;
        Ok(params)
    }

    pub fn with_alpha(mut self, alpha: f64) -> Result<Self> {
        check_non_negative("alpha", alpha)?;
        self.alpha = alpha;
        self.refresh();
        Ok(self)
    }

    pub fn with_beta(mut self, beta: f64) -> Result<Self> {
        check_non_negative("beta", beta)?;
        self.beta = beta;
        self.refresh();
        Ok(self)
    }

    pub fn alpha(&self) -> f64 { self.alpha }
    pub fn beta(&self) -> f64 { self.beta }
    pub fn free_flow_time(&self) -> f64 { self.free_flow_time }
    pub fn free_flow_speed(&self) -> f64 { self.free_flow_speed }
    pub fn capacity(&self) -> f64 { self.capacity }
    pub fn volume(&self) -> f64 { self.volume }

    /// The travel time at the current volume.
    pub fn cost(&self) -> f64 { self.cost }

    /// Evaluates the volume-delay curve at `volume`.
    ///
    /// Depends only on `volume` and the stored shape parameters, so an
    /// assignment solver may call it as often as it likes.
    pub fn cost_function(&self, volume: f64) -> Result<f64> {
        if volume.is_nan() || volume < 0.0 {
            return Err(NetworkError::domain("volume", volume, "must be non-negative"));
        }
        Ok(bpr(self.free_flow_time, self.alpha, self.beta, self.capacity, volume))
    }

    /// Sets the volume and returns the resulting cost.
    pub fn set_volume(&mut self, volume: f64) -> Result<f64> {
        let cost = self.cost_function(volume)?;
        self.volume = volume;
        self.cost = cost;
        Ok(cost)
    }

    pub fn set_capacity(&mut self, capacity: f64) -> Result<()> {
        check_capacity(capacity)?;
        self.capacity = capacity;
        self.refresh();
        Ok(())
    }

    pub fn set_free_flow_time(&mut self, free_flow_time: f64) -> Result<()> {
        check_non_negative("free_flow_time", free_flow_time)?;
        self.free_flow_time = free_flow_time;
        self.refresh();
        Ok(())
    }

    /// Recomputes the cached cost from the current inputs.
    pub(crate) fn refresh(&mut self) {
        self.cost = bpr(self.free_flow_time, self.alpha, self.beta, self.capacity, self.volume);
    }

    /// Re-checks every parameter; used when parameters arrive through
    /// deserialization rather than the validating constructors.
    pub(crate) fn validate(&self) -> Result<()> {
        check_non_negative("free_flow_time", self.free_flow_time)?;
        check_capacity(self.capacity)?;
        check_non_negative("alpha", self.alpha)?;
        check_non_negative("beta", self.beta)?;
        check_non_negative("volume", self.volume)
    }
}

/// Per-edge settings for `Network::add_road_edge`.
///
/// Unset fields are looked up in the edge's attributes (`length`,
/// `capacity`, `free_flow_speed`) and then in the network's road defaults.
/// A length found in neither place is measured from the endpoint
/// coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RoadSpec {
    pub length: Option<f64>,
    pub capacity: Option<f64>,
    pub free_flow_speed: Option<f64>,
    pub length_mode: Option<LengthMode>,
}

impl RoadSpec {
    pub fn new() -> Self { Self::default() }

    pub fn length(mut self, length: f64) -> Self {
        self.length = Some(length);
        self
    }

    pub fn capacity(mut self, capacity: f64) -> Self {
        self.capacity = Some(capacity);
        self
    }

    pub fn free_flow_speed(mut self, free_flow_speed: f64) -> Self {
        self.free_flow_speed = Some(free_flow_speed);
        self
    }

    pub fn length_mode(mut self, mode: LengthMode) -> Self {
        self.length_mode = Some(mode);
        self
    }
}

#[inline(always)]
fn bpr(t0: f64, alpha: f64, beta: f64, capacity: f64, volume: f64) -> f64 {
    t0 * (1.0 + alpha * (volume / capacity).powf(beta))
}

fn check_capacity(capacity: f64) -> Result<()> {
    if capacity > 0.0 && capacity.is_finite() {
        Ok(())
    } else {
        Err(NetworkError::domain("capacity", capacity, "must be positive and finite"))
    }
}

fn check_non_negative(parameter: &'static str, value: f64) -> Result<()> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(NetworkError::domain(parameter, value, "must be non-negative and finite"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[rstest]
    #[case(0.0, 10.0)]
    #[case(50.0, 10.09375)]
    #[case(100.0, 11.5)]
    #[case(200.0, 34.0)]
    fn test_bpr_curve(#[case] volume: f64, #[case] expected: f64) {
        let road = RoadParams::new(10.0, 100.0).unwrap().with_alpha(0.15).unwrap().with_beta(4.0).unwrap();
        let cost = road.cost_function(volume).unwrap();
        assert!(approx(cost, expected), "volume {} gave {}", volume, cost);
    }

    #[test]
    fn test_free_flow_time_from_length() {
        // 1000 m at 25 m/s, capacity 500: t0 = 40 and v/c = 2 at volume 1000.
        let road = RoadParams::from_length(1000.0, 25.0, 500.0).unwrap();
        assert!(approx(road.free_flow_time(), 40.0));
        assert!(approx(road.cost_function(1000.0).unwrap(), 136.0));
    }

    #[test]
    fn test_volume_updates_cached_cost() {
        let mut road = RoadParams::new(10.0, 100.0).unwrap();
        assert!(approx(road.cost(), 10.0));
        let cost = road.set_volume(100.0).unwrap();
        assert!(approx(cost, 11.5));
        assert!(approx(road.cost(), 11.5));

        road.set_capacity(200.0).unwrap();
        assert!(approx(road.cost(), 10.09375));
    }

    #[test]
    fn test_invalid_parameters_are_domain_errors() {
        assert!(matches!(RoadParams::new(10.0, 0.0), Err(NetworkError::Domain { parameter: "capacity", .. })));
        assert!(matches!(RoadParams::new(10.0, -5.0), Err(NetworkError::Domain { .. })));
        assert!(matches!(RoadParams::new(-1.0, 5.0), Err(NetworkError::Domain { parameter: "free_flow_time", .. })));

        let mut road = RoadParams::new(10.0, 100.0).unwrap();
        assert!(matches!(road.cost_function(-1.0), Err(NetworkError::Domain { parameter: "volume", .. })));
        // A rejected volume leaves the edge untouched.
        assert!(road.set_volume(-3.0).is_err());
        assert_eq!(road.volume(), 0.0);
    }

    #[test]
    fn test_cost_is_monotone_in_volume() {
        let road = RoadParams::new(7.5, 120.0).unwrap();
        let mut last = 0.0;
        for step in 0..200 {
            let cost = road.cost_function(step as f64 * 3.0).unwrap();
            assert!(cost >= last);
            last = cost;
        }
    }
}
