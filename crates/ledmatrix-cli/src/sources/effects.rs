//! Procedural effects: falling asteroids, bouncing balls and moving lines.

use crate::rng::Rng;
use ledmatrix_core::color::Rgb;
use ledmatrix_core::{Frame, FrameSource};

/// Which effect to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum EffectKind {
    /// Colored pixels falling down the columns
    Asteroids,
    /// Balls bouncing off the edges
    Balls,
    /// Colored lines snaking along the rows
    Lines,
}

/// Tuning values for the effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::Args)]
pub struct EffectTunables {
    /// Chance (percent) of a new asteroid each frame
    #[arg(long, default_value_t = 30)]
    pub spawn_percent: u32,

    /// Number of balls
    #[arg(long, default_value_t = 3)]
    pub balls: usize,

    /// A ball hitting a wall changes color when a 1-100 roll exceeds this
    #[arg(long, default_value_t = 95)]
    pub wall_recolor_threshold: u32,

    /// A ball jitters sideways when a 1-100 roll exceeds this
    #[arg(long, default_value_t = 92)]
    pub jitter_threshold: u32,

    /// Pixels per line
    #[arg(long, default_value_t = 4)]
    pub line_length: usize,
}

impl Default for EffectTunables {
    fn default() -> Self {
        Self {
            spawn_percent: 30,
            balls: 3,
            wall_recolor_threshold: 95,
            jitter_threshold: 92,
            line_length: 4,
        }
    }
}

#[derive(Debug, Clone)]
struct Ball {
    row: i32,
    col: i32,
    d_row: i32,
    d_col: i32,
    hit_wall: bool,
    color: Rgb,
    /// 1 jitters columns, 2-4 jitter rows.
    bias: u32,
}

#[derive(Debug, Clone)]
enum State {
    Asteroids { free: Vec<usize> },
    Balls { balls: Vec<Ball> },
    Lines { strip: Vec<Rgb>, color: Rgb, step: usize },
}

/// A procedural effect as a frame source.
pub struct EffectSource {
    side: u16,
    frames: u32,
    produced: u32,
    tunables: EffectTunables,
    rng: Rng,
    frame: Frame,
    state: State,
}

impl EffectSource {
    pub fn new(
        kind: EffectKind,
        side: u16,
        frames: u32,
        tunables: EffectTunables,
        mut rng: Rng,
    ) -> Self {
        let n = side as usize;
        let state = match kind {
            EffectKind::Asteroids => State::Asteroids {
                free: (0..n).collect(),
            },
            EffectKind::Balls => State::Balls {
                balls: (0..tunables.balls)
                    .map(|_| Ball {
                        row: rng.below(n as u64) as i32,
                        col: rng.below(n as u64) as i32,
                        d_row: 1,
                        d_col: 1,
                        hit_wall: false,
                        color: rng.bright_color(),
                        bias: rng.between(1, 4),
                    })
                    .collect(),
            },
            EffectKind::Lines => State::Lines {
                strip: vec![Rgb::BLACK; n * n],
                color: Rgb::BLACK,
                step: 0,
            },
        };
        Self {
            side,
            frames,
            produced: 0,
            tunables,
            rng,
            frame: Frame::new(side),
            state,
        }
    }

    fn step(&mut self) {
        let side = self.side as usize;
        match &mut self.state {
            State::Asteroids { free } => {
                step_asteroids(&mut self.frame, free, &mut self.rng, self.tunables.spawn_percent)
            }
            State::Balls { balls } => {
                for ball in balls.iter_mut() {
                    step_ball(&mut self.frame, ball, &mut self.rng, &self.tunables);
                }
            }
            State::Lines { strip, color, step } => {
                if *step == 0 {
                    *color = self.rng.bright_color();
                }
                strip[0] = *color;
                for (i, &c) in strip.iter().enumerate() {
                    self.frame.set(i / side, i % side, c);
                }
                strip.rotate_right(1);
                strip[0] = Rgb::BLACK;
                *step = (*step + 1) % self.tunables.line_length.max(1);
            }
        }
    }
}

/// Moves every asteroid down one row, frees the columns whose asteroid fell
/// off the bottom, and maybe drops a new one into a free column.
fn step_asteroids(frame: &mut Frame, free: &mut Vec<usize>, rng: &mut Rng, spawn_percent: u32) {
    let side = frame.side_length() as usize;
    if side == 0 {
        return;
    }
    for col in 0..side {
        if frame.get(side - 1, col).is_some_and(|c| !c.is_black()) {
            free.push(col);
        }
    }
    for row in (1..side).rev() {
        for col in 0..side {
            let above = frame.get(row - 1, col).unwrap_or(Rgb::BLACK);
            frame.set(row, col, above);
        }
    }
    for col in 0..side {
        frame.set(0, col, Rgb::BLACK);
    }

    if rng.chance(spawn_percent) || free.is_empty() {
        if free.is_empty() {
            free.extend(0..side);
        } else {
            let slot = rng.below(free.len() as u64) as usize;
            let col = free.swap_remove(slot);
            frame.set(0, col, rng.bright_color());
        }
    }
}

fn bounce(pos: &mut i32, dir: &mut i32, side: i32) -> bool {
    let next = *pos + *dir;
    if next < 0 || next >= side {
        *dir = -*dir;
        *pos = (*pos + *dir).clamp(0, side - 1);
        true
    } else {
        *pos = next;
        false
    }
}

fn step_ball(frame: &mut Frame, ball: &mut Ball, rng: &mut Rng, tunables: &EffectTunables) {
    let side = frame.side_length() as i32;
    if side == 0 {
        return;
    }
    frame.set(ball.row as usize, ball.col as usize, Rgb::BLACK);

    if ball.hit_wall {
        ball.bias = rng.between(1, 4);
        ball.hit_wall = false;
    }
    for hit in [
        bounce(&mut ball.col, &mut ball.d_col, side),
        bounce(&mut ball.row, &mut ball.d_row, side),
    ] {
        if hit {
            if rng.between(1, 100) > tunables.wall_recolor_threshold {
                ball.color = rng.bright_color();
            }
            ball.hit_wall = true;
        }
    }

    if rng.between(1, 100) > tunables.jitter_threshold {
        let delta = if rng.between(1, 2) == 1 { 1 } else { -1 };
        let target = if ball.bias == 1 { &mut ball.col } else { &mut ball.row };
        *target = (*target + delta).clamp(0, side - 1);
    }

    frame.set(ball.row as usize, ball.col as usize, ball.color);
}

impl FrameSource for EffectSource {
    fn side_length(&self) -> u16 {
        self.side
    }

    fn frame_count(&self) -> u32 {
        self.frames
    }

    fn next_frame(&mut self) -> ledmatrix_core::Result<Option<Frame>> {
        if self.produced >= self.frames {
            return Ok(None);
        }
        self.step();
        self.produced += 1;
        Ok(Some(self.frame.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(frame: &Frame) -> usize {
        frame.pixels().iter().filter(|p| !p.is_black()).count()
    }

    fn run(kind: EffectKind, tunables: EffectTunables, frames: u32) -> Vec<Frame> {
        let mut source = EffectSource::new(kind, 8, frames, tunables, Rng::new(11));
        std::iter::from_fn(|| source.next_frame().unwrap()).collect()
    }

    #[test]
    fn test_frame_count_is_exact() {
        for kind in [EffectKind::Asteroids, EffectKind::Balls, EffectKind::Lines] {
            assert_eq!(run(kind, EffectTunables::default(), 25).len(), 25);
        }
    }

    #[test]
    fn test_same_seed_same_frames() {
        let a = run(EffectKind::Balls, EffectTunables::default(), 40);
        let b = run(EffectKind::Balls, EffectTunables::default(), 40);
        assert_eq!(a, b);
    }

    #[test]
    fn test_asteroids_fall() {
        let tunables = EffectTunables {
            spawn_percent: 100,
            ..EffectTunables::default()
        };
        let frames = run(EffectKind::Asteroids, tunables, 3);
        // One new asteroid per frame; earlier ones move down a row.
        assert_eq!(lit(&frames[0]), 1);
        assert_eq!(lit(&frames[2]), 3);
        let top: Vec<usize> = (0..8).filter(|&c| frames[0].get(0, c) != Some(Rgb::BLACK)).collect();
        assert_eq!(frames[1].get(1, top[0]), frames[0].get(0, top[0]));
    }

    #[test]
    fn test_no_spawn_leaves_panel_dark() {
        let tunables = EffectTunables {
            spawn_percent: 0,
            ..EffectTunables::default()
        };
        let frames = run(EffectKind::Asteroids, tunables, 10);
        assert!(frames.iter().all(|f| f.is_black()));
    }

    #[test]
    fn test_balls_stay_on_panel() {
        let tunables = EffectTunables {
            balls: 2,
            jitter_threshold: 0,
            wall_recolor_threshold: 0,
            ..EffectTunables::default()
        };
        for frame in run(EffectKind::Balls, tunables, 200) {
            let n = lit(&frame);
            assert!((1..=2).contains(&n));
        }
    }

    #[test]
    fn test_lines_snake_forward() {
        let tunables = EffectTunables {
            line_length: 3,
            ..EffectTunables::default()
        };
        let frames = run(EffectKind::Lines, tunables, 4);
        assert_eq!(lit(&frames[0]), 1);
        assert_eq!(lit(&frames[2]), 3);
        // Pixel 0 at frame 0 has moved to pixel 2 by frame 2.
        assert_eq!(frames[2].get(0, 2), frames[0].get(0, 0));
        assert_eq!(lit(&frames[3]), 4);
    }
}
