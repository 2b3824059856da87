//! Progress reporting for `SceneCompiler`.
//!
//! Observers are handed to each compile call and invoked synchronously on the
//! compiling thread, in the order they were passed.

use std::time::Duration;

use tracing::{debug, info};

use crate::compiler::Category;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryCount {
    pub category: Category,
    // with duplicates, as referenced from the scene
    pub all: usize,
    pub unique: usize,
}

/// Entity counts before and after deduplication
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonReport {
    pub scene_name: String,
    pub counts: Vec<CategoryCount>,
    // time spent extracting and deduplicating
    pub elapsed: Duration,
}

impl ComparisonReport {
    pub fn count(&self, category: Category) -> Option<CategoryCount> {
        self.counts.iter().copied().find(|count| count.category == category)
    }
}

/// Summary of a finished compile
#[derive(Debug, Clone, PartialEq)]
pub struct CompileReport {
    pub scene_name: String,
    pub counts: Vec<CategoryCount>,
    /// Element length of every compiled array, in serialization order
    pub array_lengths: Vec<(&'static str, usize)>,
    // total time of the compile call
    pub elapsed: Duration,
}

impl CompileReport {
    pub fn count(&self, category: Category) -> Option<CategoryCount> {
        self.counts.iter().copied().find(|count| count.category == category)
    }
}

pub trait CompileObserver {
    fn on_compile_start(&mut self, _scene_name: &str) {}

    fn on_compare(&mut self, _report: &ComparisonReport) {}

    fn on_compile_end(&mut self, _report: &CompileReport) {}
}

/// Emits compiler progress as `tracing` events
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl CompileObserver for TracingObserver {
    fn on_compile_start(&mut self, scene_name: &str) {
        info!(scene = scene_name, "compiling scene");
    }

    fn on_compare(&mut self, report: &ComparisonReport) {
        for count in &report.counts {
            info!(
                category = %count.category,
                all = count.all,
                unique = count.unique,
                "deduplicated"
            );
        }
        debug!(elapsed = ?report.elapsed, "extraction and deduplication finished");
    }

    fn on_compile_end(&mut self, report: &CompileReport) {
        for (name, len) in &report.array_lengths {
            debug!(array = *name, len = *len, "compiled array");
        }
        info!(scene = %report.scene_name, elapsed = ?report.elapsed, "scene compiled");
    }
}

/// Keeps every report it receives, useful for inspecting a compile after the fact
#[derive(Debug, Default, Clone)]
pub struct RecordingObserver {
    pub started: Vec<String>,
    pub comparisons: Vec<ComparisonReport>,
    pub compiles: Vec<CompileReport>,
}

impl CompileObserver for RecordingObserver {
    fn on_compile_start(&mut self, scene_name: &str) {
        self.started.push(scene_name.to_owned());
    }

    fn on_compare(&mut self, report: &ComparisonReport) {
        self.comparisons.push(report.clone());
    }

    fn on_compile_end(&mut self, report: &CompileReport) {
        self.compiles.push(report.clone());
    }
}
