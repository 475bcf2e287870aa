//! Executes a single operation against one controller.
//!
//! Every operation follows the same shape: fetch the values it needs,
//! compute a new raw value, clamp it, and commit it through the storage
//! layer.

use std::time::Duration;

use crate::errors::*;
use crate::path::PathResolver;
use crate::storage;
use crate::value::{self, ValueMode};

make_log_macro!(debug, "exec");

/// Fields addressable on a controller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Field {
    /// Current brightness, live in sysfs.
    #[default]
    Brightness,
    /// Maximum brightness, live in sysfs and read-only.
    MaxBrightness,
    /// Lowest raw value writes are allowed to reach, persisted in the cache.
    MinCap,
    /// Saved-brightness snapshot, persisted in the cache.
    SaveRestore,
}

/// Operations that can be applied to a field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OpMode {
    #[default]
    Get,
    Set,
    Add,
    Sub,
    Save,
    Restore,
}

/// A single requested operation, passed explicitly through the executor
/// rather than held in process-wide state.
#[derive(Clone, Debug)]
pub struct Request {
    pub field: Field,
    pub op: OpMode,
    pub mode: ValueMode,
    /// Logical value for set/add/sub: raw units or hundredths of a percent.
    pub value: u64,
    /// Maximum known from an earlier fetch, to avoid refetching.
    pub cached_max: Option<u64>,
}

impl Request {
    pub fn new(field: Field, op: OpMode, mode: ValueMode, value: u64) -> Self {
        Self {
            field,
            op,
            mode,
            value,
            cached_max: None,
        }
    }
}

pub(crate) struct Executor<'a> {
    resolver: &'a PathResolver,
    delay: Duration,
}

impl<'a> Executor<'a> {
    pub(crate) fn new(resolver: &'a PathResolver, delay: Duration) -> Self {
        Self { resolver, delay }
    }

    /// Run the requested operation against a single controller.
    pub(crate) async fn run(&self, ctrl: &str, req: &Request) -> Result<()> {
        check_pairing(ctrl, req)?;
        let (curr, max, mincap) = self.init(ctrl, req).await?;
        debug!("executing on controller '{ctrl}'");

        match req.op {
            OpMode::Get => self.get(req.field, req.mode, curr, max, mincap),
            OpMode::Save => self.write(ctrl, Field::SaveRestore, curr, curr).await,
            OpMode::Restore => self.restore(ctrl, req, curr, max, mincap).await,
            OpMode::Set | OpMode::Add | OpMode::Sub => {
                self.set(ctrl, req, curr, max, mincap).await
            }
        }
    }

    /// Gather the values the operation needs up front. Operations that
    /// only touch the maximum skip the current and mincap fetches.
    async fn init(&self, ctrl: &str, req: &Request) -> Result<(u64, u64, u64)> {
        let max = match req.cached_max {
            Some(max) => max,
            None => self.fetch(ctrl, Field::MaxBrightness).await?,
        };

        if req.field == Field::MaxBrightness
            || (req.field == Field::MinCap && req.op == OpMode::Set)
        {
            return Ok((0, max, 0));
        }

        let curr = self.fetch(ctrl, Field::Brightness).await?;
        let mincap = self.fetch_mincap(ctrl).await?;
        if mincap > max {
            return Err(LumenError::MincapExceedsMax { mincap, max });
        }

        Ok((curr, max, mincap))
    }

    /// Print the requested field to standard out.
    fn get(&self, field: Field, mode: ValueMode, curr: u64, max: u64, mincap: u64) -> Result<()> {
        if max == 0 {
            return Err(LumenError::ZeroMaxBrightness);
        }
        let raw = match field {
            Field::Brightness => curr,
            Field::MaxBrightness => max,
            Field::MinCap => mincap,
            // Nothing sensible to print for a snapshot
            Field::SaveRestore => return Ok(()),
        };
        let val = value::from_raw(mode, raw, max)?;
        println!("{}", format_value(mode, val));
        Ok(())
    }

    /// Compute, clamp and commit a new value for the brightness or
    /// mincap field.
    async fn set(&self, ctrl: &str, req: &Request, curr: u64, max: u64, mincap: u64) -> Result<()> {
        let curr_raw = match req.field {
            Field::MinCap => self.fetch_mincap(ctrl).await?,
            _ => curr,
        };
        let curr_value = value::from_raw(req.mode, curr_raw, max)?;
        debug!("specified value: {}", req.value);
        debug!("current value: {curr_value}");

        let new_value = match req.op {
            OpMode::Set => req.value,
            OpMode::Add => curr_value.saturating_add(req.value),
            // The raw domain is unsigned; an oversized decrement bottoms
            // out instead of wrapping.
            OpMode::Sub => curr_value.saturating_sub(req.value),
            _ => return invalid_pairing(ctrl, req),
        };

        let mut new_raw = value::to_raw(req.mode, new_value, max);

        // Force any increment to result in some change, however small.
        if req.op == OpMode::Add && new_raw <= curr_raw {
            new_raw = curr_raw + 1;
        }

        let new_raw = value::clamp(new_raw, mincap, max);
        self.write(ctrl, req.field, curr_raw, new_raw).await
    }

    /// Re-enter the set pipeline with the saved raw snapshot.
    async fn restore(
        &self,
        ctrl: &str,
        req: &Request,
        curr: u64,
        max: u64,
        mincap: u64,
    ) -> Result<()> {
        let path = self.resolver.resolve(ctrl, Field::SaveRestore)?;
        let saved = storage::read_value(&path)
            .await
            .map_err(|_| LumenError::NoSavedValue(ctrl.to_string()))?;

        let req = Request {
            op: OpMode::Set,
            mode: ValueMode::Raw,
            value: saved,
            ..req.clone()
        };
        self.set(ctrl, &req, curr, max, mincap).await
    }

    async fn fetch(&self, ctrl: &str, field: Field) -> Result<u64> {
        let path = self.resolver.resolve(ctrl, field)?;
        storage::read_value(&path).await
    }

    /// The mincap cache is optional; a missing or unreadable entry means
    /// no minimum is enforced.
    async fn fetch_mincap(&self, ctrl: &str) -> Result<u64> {
        let path = self.resolver.resolve(ctrl, Field::MinCap)?;
        Ok(storage::read_value(&path).await.unwrap_or(0))
    }

    async fn write(&self, ctrl: &str, field: Field, old: u64, new: u64) -> Result<()> {
        let path = self.resolver.resolve(ctrl, field)?;
        storage::write_value(&path, old, new, self.delay).await
    }
}

/// Render a logical value the way `get` prints it: a bare integer in
/// raw mode, a two-decimal percentage otherwise.
pub(crate) fn format_value(mode: ValueMode, val: u64) -> String {
    match mode {
        ValueMode::Raw => val.to_string(),
        _ => format!("{:.2}", val as f64 / 100.0),
    }
}

fn check_pairing(ctrl: &str, req: &Request) -> Result<()> {
    let valid = match (req.field, req.op) {
        (Field::Brightness, _) => true,
        (Field::MaxBrightness, OpMode::Get) => true,
        (Field::MinCap, OpMode::Get | OpMode::Set) => true,
        (Field::SaveRestore, OpMode::Get) => true,
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        invalid_pairing(ctrl, req)
    }
}

fn invalid_pairing(ctrl: &str, req: &Request) -> Result<()> {
    Err(LumenError::InvalidOperation(format!(
        "controller: {ctrl}, field: {:?}, op: {:?}, mode: {:?}, value: {}",
        req.field, req.op, req.mode, req.value
    )))
}
