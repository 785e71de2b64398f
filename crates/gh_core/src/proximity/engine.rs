//! Fuzzy map generation
//!
//! Every point is placed at a random bearing and a radius drawn from
//! `[min_radius, max_radius)` around the viewer, who always sits at the render
//! origin. Since `min_radius > 0`, no point ever lands on the viewer. Nothing is
//! cached: each call draws fresh positions, even for the same real actors.

use super::types::{ActorPoint, ActorRole, FuzzyBatch, NearbyActor, Point2};
use crate::config::ProximityConfig;
use crate::error::{HelpError, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::f64::consts::TAU;
use tracing::debug;

pub struct ProximityEngine {
    config: ProximityConfig,
    rng: ChaCha8Rng,
}

impl ProximityEngine {
    pub fn new(config: ProximityConfig) -> Result<Self> {
        Self::with_rng(config, ChaCha8Rng::from_entropy())
    }

    /// Reproducible engine for tests and replays
    pub fn with_seed(config: ProximityConfig, seed: u64) -> Result<Self> {
        Self::with_rng(config, ChaCha8Rng::seed_from_u64(seed))
    }

    fn with_rng(config: ProximityConfig, rng: ChaCha8Rng) -> Result<Self> {
        config.validate().map_err(HelpError::InvalidParameter)?;
        Ok(Self { config, rng })
    }

    pub fn config(&self) -> &ProximityConfig {
        &self.config
    }

    /// Synthesize `count` points around `center`.
    ///
    /// `role_ratio` is the probability that a point is a seeker and must lie in
    /// `[0, 1]`. With a ratio of 0 no seekers are produced at all. `count` may
    /// not exceed the configured `max_count`.
    pub fn generate_fuzzy_batch(
        &mut self,
        center: Point2,
        count: usize,
        role_ratio: f64,
    ) -> Result<FuzzyBatch> {
        validate_center(center)?;
        validate_role_ratio(role_ratio)?;
        if count > self.config.max_count {
            return Err(HelpError::InvalidParameter(format!(
                "count must be at most {}, got {count}",
                self.config.max_count
            )));
        }

        let points = (0..count)
            .map(|i| {
                let radius = self.draw_radius();
                let role = self.draw_role(role_ratio);
                self.place(i as u32, role, radius, None)
            })
            .collect();

        debug!(count, role_ratio, "Generated fuzzy batch");
        Ok(FuzzyBatch::from_points(points))
    }

    /// Batch with the configured default size and role ratio
    pub fn generate_default_batch(&mut self, center: Point2) -> Result<FuzzyBatch> {
        let count = self.config.default_count;
        let ratio = self.config.default_role_ratio;
        self.generate_fuzzy_batch(center, count, ratio)
    }

    /// Map real actors onto the fuzzy map.
    ///
    /// The true bearing is dropped. The display radius follows the true
    /// distance (scaled into render units), jittered by up to `radius_jitter`
    /// of itself, and clamped into the radius band.
    pub fn obfuscate_actors(
        &mut self,
        center: Point2,
        actors: &[NearbyActor],
    ) -> Result<FuzzyBatch> {
        validate_center(center)?;
        if let Some(bad) = actors.iter().position(|a| !a.position.is_finite()) {
            return Err(HelpError::InvalidParameter(format!(
                "actor {bad} has a non-finite position"
            )));
        }

        let points = actors
            .iter()
            .enumerate()
            .map(|(i, actor)| {
                let offset = actor.position - center;
                let radius = self.radius_for_offset(offset);
                self.place(i as u32, actor.role, radius, Some(offset))
            })
            .collect();

        debug!(count = actors.len(), "Obfuscated nearby actors");
        Ok(FuzzyBatch::from_points(points))
    }

    /// Fresh fuzzy positions for the same actors, as on a new map activation.
    ///
    /// Roles and ids carry over. Points backed by a real offset are placed from
    /// it again; synthetic points get a new random radius.
    pub fn regenerate(&mut self, batch: &FuzzyBatch) -> FuzzyBatch {
        let points = batch
            .iter()
            .map(|point| {
                let radius = match point.true_position() {
                    Some(offset) => self.radius_for_offset(offset),
                    None => self.draw_radius(),
                };
                self.place(point.id(), point.role(), radius, point.true_position())
            })
            .collect();
        FuzzyBatch::from_points(points)
    }

    fn place(
        &mut self,
        id: u32,
        role: ActorRole,
        radius: f64,
        true_offset: Option<Point2>,
    ) -> ActorPoint {
        let angle = self.rng.gen_range(0.0..TAU);
        let fuzzy = Point2::from_polar(radius, angle);
        ActorPoint::new(id, role, fuzzy, self.distance_estimate(radius), true_offset)
    }

    fn draw_radius(&mut self) -> f64 {
        self.rng.gen_range(self.config.min_radius..self.config.max_radius)
    }

    fn draw_role(&mut self, role_ratio: f64) -> ActorRole {
        if self.rng.gen::<f64>() < role_ratio {
            ActorRole::Seeker
        } else {
            ActorRole::Helper
        }
    }

    fn radius_for_offset(&mut self, offset: Point2) -> f64 {
        let base = offset.length() / self.config.distance_scale;
        let jitter = self.config.radius_jitter;
        let factor =
            if jitter > 0.0 { self.rng.gen_range(1.0 - jitter..=1.0 + jitter) } else { 1.0 };
        (base * factor).clamp(self.config.min_radius, self.config.max_radius)
    }

    /// Meters shown for a render radius, never below 1
    fn distance_estimate(&self, radius: f64) -> u32 {
        ((radius * self.config.distance_scale).round() as u32).max(1)
    }
}

fn validate_center(center: Point2) -> Result<()> {
    if !center.is_finite() {
        return Err(HelpError::InvalidParameter(format!(
            "center must be finite, got ({}, {})",
            center.x, center.y
        )));
    }
    Ok(())
}

fn validate_role_ratio(role_ratio: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&role_ratio) {
        return Err(HelpError::InvalidParameter(format!(
            "role_ratio must be in [0, 1], got {role_ratio}"
        )));
    }
    Ok(())
}
