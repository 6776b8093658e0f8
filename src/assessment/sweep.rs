//! Batch evaluation over a grid of TTG values.
//!
//! Samples are independent reads of an immutable model, so the runner fans
//! them out to worker threads and gathers results back in grid order.

#![allow(missing_docs)]
#![allow(clippy::cast_precision_loss)]

use std::sync::Arc;
use std::thread;

use crossbeam_channel as channel;
use serde::Serialize;

use crate::assessment::risk::RiskAssessor;
use crate::assessment::validate_ttg;
use crate::core::config::SweepConfig;
use crate::core::errors::{Result, RiskError};
use crate::model::risk_model::RiskModel;

/// Work items queued ahead of the workers; the producer blocks beyond this.
const WORK_QUEUE_CAPACITY: usize = 4096;

/// Inclusive, evenly spaced TTG grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SweepPlan {
    start: f64,
    end: f64,
    samples: usize,
}

impl SweepPlan {
    pub fn new(start: f64, end: f64, samples: usize) -> Result<Self> {
        validate_ttg(start)?;
        validate_ttg(end)?;
        if end < start {
            return Err(RiskError::invalid(format!(
                "sweep end ({end}) must be >= start ({start})"
            )));
        }
        if samples == 0 {
            return Err(RiskError::invalid("sweep needs at least one sample"));
        }
        Ok(Self {
            start,
            end,
            samples,
        })
    }

    pub fn from_config(config: &SweepConfig) -> Result<Self> {
        Self::new(config.start_ttg, config.end_ttg, config.samples)
    }

    pub fn len(&self) -> usize {
        self.samples
    }

    pub fn is_empty(&self) -> bool {
        self.samples == 0
    }

    /// TTG of sample `index`; the last sample is exactly `end`.
    #[must_use]
    pub fn ttg_at(&self, index: usize) -> f64 {
        if self.samples == 1 || index == 0 {
            return self.start;
        }
        if index + 1 >= self.samples {
            return self.end;
        }
        let step = (self.end - self.start) / (self.samples - 1) as f64;
        step.mul_add(index as f64, self.start)
    }

    pub fn ttg_values(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.samples).map(|i| self.ttg_at(i))
    }
}

/// One evaluated grid point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SamplePoint {
    pub index: usize,
    pub ttg: f64,
    pub mode: String,
    pub total_risk: f64,
}

/// A finished sweep: per-sample series plus the running total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepReport {
    pub points: Vec<SamplePoint>,
    pub total_risk: f64,
}

impl SweepReport {
    fn from_points(points: Vec<SamplePoint>) -> Self {
        let total_risk = points.iter().map(|p| p.total_risk).sum();
        Self { points, total_risk }
    }
}

/// Streamed result of one sample; errors stay attached to their sample.
#[derive(Debug)]
pub struct SampleResult {
    pub index: usize,
    pub ttg: f64,
    pub outcome: Result<SamplePoint>,
}

/// Select the minimizing mode at `ttg` and report its risk.
pub fn evaluate_sample(model: &RiskModel, index: usize, ttg: f64) -> Result<SamplePoint> {
    let selection = RiskAssessor::new(model).select_mode_detailed(ttg)?;
    Ok(SamplePoint {
        index,
        ttg,
        mode: selection.mode,
        total_risk: selection.total_risk,
    })
}

/// Lazy, single-threaded sweep; yields samples as they are computed.
pub fn sweep_lazy<'a>(
    model: &'a RiskModel,
    plan: &'a SweepPlan,
) -> impl Iterator<Item = Result<SamplePoint>> + 'a {
    plan.ttg_values()
        .enumerate()
        .map(move |(index, ttg)| evaluate_sample(model, index, ttg))
}

/// Parallel sweep over a shared model.
#[derive(Debug, Clone)]
pub struct SweepRunner {
    model: Arc<RiskModel>,
    parallelism: usize,
}

impl SweepRunner {
    pub fn new(model: Arc<RiskModel>, parallelism: usize) -> Self {
        Self {
            model,
            parallelism: parallelism.max(1),
        }
    }

    pub fn model(&self) -> &RiskModel {
        &self.model
    }

    /// Evaluate every sample and return the series in grid order.
    ///
    /// Fails with the error of the earliest failing sample; nothing is
    /// folded into the total when any sample fails.
    pub fn run(&self, plan: &SweepPlan) -> Result<SweepReport> {
        let mut slots: Vec<Option<Result<SamplePoint>>> = (0..plan.len()).map(|_| None).collect();
        for result in self.stream(plan) {
            if let Some(slot) = slots.get_mut(result.index) {
                *slot = Some(result.outcome);
            }
        }

        let mut points = Vec::with_capacity(slots.len());
        for slot in slots {
            match slot {
                Some(outcome) => points.push(outcome?),
                None => return Err(RiskError::ChannelClosed { component: "sweep" }),
            }
        }
        Ok(SweepReport::from_points(points))
    }

    /// Stream results as workers finish them (not in grid order).
    ///
    /// The receiver closes once every sample has been reported.
    pub fn stream(&self, plan: &SweepPlan) -> channel::Receiver<SampleResult> {
        let workers = self.parallelism.min(plan.len()).max(1);
        let (work_tx, work_rx) = channel::bounded::<(usize, f64)>(WORK_QUEUE_CAPACITY);
        let (result_tx, result_rx) = channel::unbounded::<SampleResult>();

        let plan = *plan;
        thread::spawn(move || {
            for item in plan.ttg_values().enumerate() {
                if work_tx.send(item).is_err() {
                    // Every worker is gone.
                    return;
                }
            }
        });

        for _ in 0..workers {
            let work_rx = work_rx.clone();
            let result_tx = result_tx.clone();
            let model = Arc::clone(&self.model);
            thread::spawn(move || sweep_worker(&model, &work_rx, &result_tx));
        }

        result_rx
    }
}

fn sweep_worker(
    model: &RiskModel,
    work_rx: &channel::Receiver<(usize, f64)>,
    result_tx: &channel::Sender<SampleResult>,
) {
    for (index, ttg) in work_rx {
        let outcome = evaluate_sample(model, index, ttg);
        if result_tx
            .send(SampleResult {
                index,
                ttg,
                outcome,
            })
            .is_err()
        {
            // Consumer hung up.
            return;
        }
    }
}
