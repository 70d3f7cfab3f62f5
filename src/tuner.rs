//! Interactive parameter tuning loop.
//!
//! The loop owns the slider bank, the detector and the viewer, and runs one
//! cycle (snapshot → detect → annotate → show → report) at a time on the
//! calling thread. Input arrives as typed [`TunerEvent`]s over a channel;
//! a cycle is triggered either by each parameter change or by a poll tick.
use crate::annotate::{AnnotationStyle, annotate};
use crate::detection::CircleDetector;
use crate::error::Result;
use crate::models::Circle;
use crate::params::{HoughParams, ParamName, ParameterSet, SliderBank};
use crate::report;
use crate::viewer::Viewer;
use image::{DynamicImage, GrayImage};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};
use tracing::debug;

pub const WINDOW_NAME: &str = "Hough tune";

/// Input to the tuning loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TunerEvent {
    ParameterChanged { name: ParamName, value: i32 },
    /// Print the current slider values without recomputing
    ShowParameters,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TunerState {
    Idle,
    Recomputing,
    Closed,
}

/// What starts a detection cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Every parameter change that alters a slider value
    EventDriven,
    /// Once per tick; parameter changes only move the sliders
    Polling { interval: Duration },
}

/// Result of one detection cycle
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub params: HoughParams,
    pub circles: Vec<Circle>,
    pub elapsed: Duration,
}

/// Returned when the loop closes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TuningSummary {
    pub cycles: usize,
    pub final_params: ParameterSet,
}

pub struct Tuner<'a> {
    gray: GrayImage,
    frame: DynamicImage,
    sliders: SliderBank,
    detector: &'a dyn CircleDetector,
    viewer: &'a mut dyn Viewer,
    style: AnnotationStyle,
    trigger: Trigger,
    verbose: bool,
    state: TunerState,
    cycles: usize,
}

impl<'a> Tuner<'a> {
    pub fn new(
        gray: GrayImage,
        initial: ParameterSet,
        detector: &'a dyn CircleDetector,
        viewer: &'a mut dyn Viewer,
    ) -> Self {
        let frame = DynamicImage::ImageLuma8(gray.clone());
        Self {
            gray,
            frame,
            sliders: SliderBank::new(initial),
            detector,
            viewer,
            style: AnnotationStyle::default(),
            trigger: Trigger::EventDriven,
            verbose: false,
            state: TunerState::Idle,
            cycles: 0,
        }
    }

    pub fn with_trigger(mut self, trigger: Trigger) -> Self {
        self.trigger = trigger;
        self
    }

    pub fn with_style(mut self, style: AnnotationStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn state(&self) -> TunerState {
        self.state
    }

    pub fn sliders(&self) -> &SliderBank {
        &self.sliders
    }

    /// Run one full detection cycle against the current slider values
    pub fn recompute(&mut self) -> Result<CycleReport> {
        self.state = TunerState::Recomputing;
        let started = Instant::now();

        let params = self.sliders.snapshot();
        let circles = self.detector.detect(&self.gray, &params);
        let annotated = annotate(&self.frame, &circles, &self.style);
        let shown = self.viewer.show(WINDOW_NAME, &annotated);
        self.state = TunerState::Idle;
        shown?;

        report::print_circles(&circles, self.verbose);
        self.cycles += 1;

        let elapsed = started.elapsed();
        debug!(
            cycle = self.cycles,
            params = %self.sliders.values(),
            found = circles.len(),
            ?elapsed,
            "cycle done"
        );

        Ok(CycleReport {
            params,
            circles,
            elapsed,
        })
    }

    /// Apply one event. Returns the cycle it triggered, if any.
    pub fn handle(&mut self, event: TunerEvent) -> Result<Option<CycleReport>> {
        if self.state == TunerState::Closed {
            return Ok(None);
        }

        match event {
            TunerEvent::ParameterChanged { name, value } => {
                let changed = self.sliders.set(name, value);
                if changed && self.trigger == Trigger::EventDriven {
                    return self.recompute().map(Some);
                }
                Ok(None)
            }
            TunerEvent::ShowParameters => {
                println!("{}", report::parameters_line(&self.sliders.values()));
                Ok(None)
            }
            TunerEvent::Exit => {
                self.close();
                Ok(None)
            }
        }
    }

    fn close(&mut self) {
        self.viewer.close_all();
        self.state = TunerState::Closed;
    }

    /// Run until an exit event arrives or every sender is gone.
    ///
    /// One cycle runs up front so the window has content straight away.
    pub fn run(mut self, events: &Receiver<TunerEvent>) -> Result<TuningSummary> {
        if self.verbose {
            println!("Detector: {}", self.detector.name());
            println!("{}", report::parameters_line(&self.sliders.values()));
        }
        self.recompute()?;

        match self.trigger {
            Trigger::EventDriven => {
                while self.state != TunerState::Closed {
                    match events.recv() {
                        Ok(event) => {
                            self.handle(event)?;
                        }
                        Err(_) => self.close(),
                    }
                }
            }
            Trigger::Polling { interval } => {
                let mut next_tick = Instant::now() + interval;
                while self.state != TunerState::Closed {
                    let wait = next_tick.saturating_duration_since(Instant::now());
                    match events.recv_timeout(wait) {
                        Ok(event) => {
                            self.handle(event)?;
                        }
                        Err(RecvTimeoutError::Timeout) => {
                            self.recompute()?;
                            next_tick = Instant::now() + interval;
                        }
                        Err(RecvTimeoutError::Disconnected) => self.close(),
                    }
                }
            }
        }

        Ok(TuningSummary {
            cycles: self.cycles,
            final_params: self.sliders.values(),
        })
    }
}
