//! Schema-role inference and statistical profiling for in-memory tables.
//!
//! A loader hands over a [`Dataset`]; [`profile`] assigns every column a
//! [`Role`] and runs the summary, numeric, categorical, datetime and
//! correlation analyzers over it, returning one serialisable
//! [`ProfileResult`].

pub mod categorical;
pub mod config;
pub mod correlation;
pub mod data;
pub mod dataset;
pub mod datetime;
pub mod error;
pub mod numeric;
pub mod profile;
pub mod roles;
pub mod summary;
pub mod temporal;

pub use crate::{
    config::ProfileConfig,
    data::{StorageType, Value},
    dataset::{Column, Dataset},
    error::ProfileError,
    profile::{ProfileResult, profile, try_profile},
    roles::{Role, RoleMap, classify},
};
