use crate::config::ScheduledInput;
use pgb_core::{CpuError, EmulationState, InterruptType, CYCLES_PER_FRAME};
use std::thread;
use std::time::{Duration, Instant};

/// Hardware refresh rate of the DMG LCD.
pub const FRAMES_PER_SECOND: f64 = 59.73;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u64,
    pub cycles: u64,
}

/// Drives the emulator one frame at a time: steps the CPU until a frame is ready, draws it, raises
/// V-blank on a fixed cycle interval, and applies scripted button changes.
#[derive(Debug, Clone)]
pub struct Scheduler {
    inputs: Vec<ScheduledInput>,
    realtime: bool,
    vblank_cycles: u64,
    frame: u64,
}

impl Scheduler {
    pub fn new(mut inputs: Vec<ScheduledInput>, realtime: bool) -> Self {
        inputs.sort_by_key(|input| input.frame);

        Self {
            inputs,
            realtime,
            vblank_cycles: 0,
            frame: 0,
        }
    }

    /// Run the given number of frames, optionally holding the hardware frame rate.
    ///
    /// # Errors
    ///
    /// Propagates the CPU error if execution reaches an unimplemented opcode.
    pub fn run(&mut self, state: &mut EmulationState, frames: u64) -> Result<RunSummary, CpuError> {
        let frame_duration = Duration::from_secs_f64(1.0 / FRAMES_PER_SECOND);
        let mut next_frame_time = Instant::now() + frame_duration;

        for _ in 0..frames {
            self.run_frame(state)?;

            if self.realtime {
                let now = Instant::now();
                if now < next_frame_time {
                    thread::sleep(next_frame_time - now);
                }
                next_frame_time += frame_duration;
            }
        }

        Ok(RunSummary {
            frames: self.frame,
            cycles: state.cycle_count(),
        })
    }

    /// Step until the CPU signals a completed frame, then draw it. No further stepping happens
    /// until the next call, so a drawn frame is never overwritten before the caller sees it.
    pub fn run_frame(&mut self, state: &mut EmulationState) -> Result<(), CpuError> {
        self.apply_inputs(state);

        loop {
            let cycles = state.step()?;

            self.vblank_cycles += u64::from(cycles);
            if self.vblank_cycles >= CYCLES_PER_FRAME {
                self.vblank_cycles -= CYCLES_PER_FRAME;
                state.request_interrupt(InterruptType::VBlank);
            }

            if state.take_frame_ready() {
                state.draw_frame();
                break;
            }
        }

        log::trace!("frame {} complete at cycle {}", self.frame, state.cycle_count());
        self.frame += 1;

        Ok(())
    }

    fn apply_inputs(&self, state: &mut EmulationState) {
        for input in self.inputs.iter().filter(|input| input.frame == self.frame) {
            log::debug!(
                "frame {}: {} {}",
                self.frame,
                if input.pressed {
                    "pressing"
                } else {
                    "releasing"
                },
                input.button
            );

            if input.pressed {
                state.press(input.button);
            } else {
                state.release(input.button);
            }
        }
    }
}
