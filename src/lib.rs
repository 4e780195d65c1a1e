//! Fleet Risk Simulation Library
//!
//! A tick-driven fleet simulation with hazard alerts and operator reroutes,
//! usable headless or behind any map front end.

pub mod simulation;
