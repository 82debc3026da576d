//! Concrete worlds for the Foresight counterfactual planner.
//!
//! Each module defines one [`Scenario`](foresight_core::Scenario): the
//! environment fields, the agents' private state, the closed action set and
//! its effects, and the objectives its agents plan with.
//!
//! # Modules
//!
//! - [`news`] -- A point-making agent facing a doom or flood hazard
//! - [`workshop`] -- Bleggs and rubes with a hidden verdict on which is good
//! - [`facility`] -- A bot, a forbidden room, and an operator with a shutdown button
//! - [`replication`] -- Self-copying bots rewarded for disabling shutdown

pub mod facility;
pub mod news;
pub mod replication;
pub mod workshop;

pub use facility::{
    ControlRoomAlarm, Facility, FacilityAction, FacilityBot, Operator, OperatorFrustration, Room,
    Temperament, facility_world,
};
pub use news::{Hazard, NewsAction, Newsroom, Perspective, newsroom_world};
pub use replication::{Replication, ReplicationAction, SafeBot, replication_world};
pub use workshop::{
    Hypothesis, Reasoning, Workshop, WorkshopAction, average_score, workshop_world,
};
