//! # ccdc
//!
//! Per-pixel continuous change detection core for multispectral satellite
//! time series.
//!
//! For each geographic pixel, a chronological sequence of multi-band
//! reflectance observations with bit-packed quality codes is qualified,
//! characterized and consolidated into a sequence of disjoint stable
//! segments ([`change_model::ChangeModel`]), each described by per-band
//! regression curves and a detected break.
//!
//! This crate is the observation-qualification and
//! statistical-characterization pipeline around the per-band curve-fitting
//! step:
//!
//! * [`quality`] – quality-bit classification and the three alternative
//!   masking procedures that decide which observations are trustworthy.
//! * [`statistics`] – residual/RMSE/median helpers and the variogram noise
//!   estimators, including the cadence-adjusted variant.
//! * [`cadence`] – fitting-window rescaling across sensor configurations.
//! * [`change_model`] – consolidation of per-band fits into the canonical
//!   serializable record, and incremental-resume support.
//!
//! The iterative break-detection loop and the per-band regression routine
//! are external collaborators: they consume the masks, noise estimates and
//! window sizes produced here and hand their fits back for consolidation.
//!
//! Everything is a pure synchronous function over its inputs; pixels are
//! independent, so an external orchestrator may process arbitrarily many of
//! them concurrently with no coordination.

pub mod cadence;
pub mod ccdc_errors;
pub mod change_model;
pub mod constants;
pub mod params;
pub mod quality;
pub mod statistics;
