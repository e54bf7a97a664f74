pub mod api;
pub mod auction;
pub mod clock;
pub mod config;
pub mod demo;
pub mod directory;
pub mod eligibility;
pub mod engine;
pub mod ledger;
pub mod persistence;
pub mod registry;
