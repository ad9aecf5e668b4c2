//! Per-frame simulation step
//!
//! One `step` call advances the whole simulation: integration with wall
//! containment, the O(n^2) pairwise narrow phase, and infection bookkeeping
//! with termination detection. Pair order is `(i, j)` with `i < j` in cube
//! index order; together with the seeded RNG this makes whole runs
//! bit-reproducible. O(n^2) is deliberate - populations are capped at a few
//! hundred cubes and a broad phase would buy nothing at that scale.

use super::collision::{contain, cube_contact, exchange_momentum, separate};
use super::state::{Phase, Simulation};
use crate::error::SimError;

/// Driver-visible outcome of one step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepReport {
    /// Infected population after this step, including same-step spread
    pub infected_count: usize,
    /// True exactly once, on the step the last cube became infected
    pub just_finished: bool,
}

impl Simulation {
    /// Advance the simulation by `dt` seconds of real time.
    ///
    /// `dt` is clamped to `max_step_dt` so a frame-rate hitch cannot tunnel
    /// cubes through each other. `speed_multiplier` scales every cube's
    /// speed uniformly; zero freezes motion while the step counter keeps
    /// advancing. Outside `Running` this is a no-op that reports the
    /// current count.
    pub fn step(&mut self, dt: f32, speed_multiplier: f32) -> Result<StepReport, SimError> {
        if !dt.is_finite() || dt < 0.0 {
            return Err(SimError::InvalidDelta(dt));
        }

        if self.phase != Phase::Running {
            return Ok(StepReport {
                infected_count: self.infected_count,
                just_finished: false,
            });
        }

        let config = *self.config();
        let dt = dt.min(config.max_step_dt);
        let speed = config.base_speed * speed_multiplier.max(0.0);
        let bound_x = config.bound_x();
        let bound_z = config.bound_z();

        self.steps += 1;

        // 1. Integrate and contain, counting infected cubes in the same pass
        let mut infected = 0usize;
        for cube in &mut self.cubes {
            cube.pos += cube.vel * (speed * dt);
            contain(&mut cube.pos, &mut cube.vel, bound_x, bound_z);
            if cube.infected {
                infected += 1;
            }
        }

        // 2. Pairwise narrow phase, (i, j) with i < j in index order
        let mut spread = false;
        let count = self.cubes.len();
        for i in 0..count {
            let (head, tail) = self.cubes.split_at_mut(i + 1);
            let a = &mut head[i];
            for b in tail.iter_mut() {
                let Some(contact) = cube_contact(a.pos, b.pos, config.cube_size) else {
                    continue;
                };
                separate(&mut a.pos, &mut b.pos, &contact);
                exchange_momentum(&mut a.vel, &mut b.vel, contact.normal);

                if a.infected != b.infected {
                    a.infected = true;
                    b.infected = true;
                    // Counted immediately: transitive same-step spread is
                    // visible to the finish check below
                    infected += 1;
                    spread = true;
                }
            }
        }

        self.infected_count = infected;

        // 3. One-shot termination on the step the last cube flipped
        let mut just_finished = false;
        if spread && infected >= count {
            self.phase = Phase::Finished;
            just_finished = true;
            log::info!("Outbreak complete after {} steps", self.steps);
        }

        Ok(StepReport {
            infected_count: infected,
            just_finished,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use glam::Vec2;

    const DT: f32 = 1.0 / 60.0;

    fn running_sim(seed: u64, count: usize) -> Simulation {
        let mut s = Simulation::new(seed, SimConfig::default());
        s.reset(count).unwrap();
        s.start();
        s
    }

    #[test]
    fn test_forced_contact_spreads_and_finishes() {
        let mut s = running_sim(1, 2);
        // Overlapping pair with opposite flags, at rest
        s.cubes[0].pos = Vec2::ZERO;
        s.cubes[1].pos = Vec2::new(0.5, 0.0);
        s.cubes[0].vel = Vec2::ZERO;
        s.cubes[1].vel = Vec2::ZERO;

        let report = s.step(DT, 1.0).unwrap();
        assert_eq!(report.infected_count, 2);
        assert!(report.just_finished);
        assert!(s.is_finished());
        assert_eq!(s.infected_count(), 2);
        // Separation restored the full contact distance
        let dist = s.cubes()[0].pos.distance(s.cubes()[1].pos);
        assert!((dist - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_finished_is_sticky_no_op() {
        let mut s = running_sim(2, 2);
        s.cubes[0].pos = Vec2::ZERO;
        s.cubes[1].pos = Vec2::new(0.5, 0.0);
        assert!(s.step(DT, 1.0).unwrap().just_finished);

        let frozen = s.cubes().to_vec();
        for _ in 0..10 {
            let report = s.step(DT, 1.0).unwrap();
            assert_eq!(report.infected_count, 2);
            assert!(!report.just_finished);
        }
        assert_eq!(s.cubes(), &frozen[..]);
        assert_eq!(s.steps(), 1);
    }

    #[test]
    fn test_idle_step_is_no_op() {
        let mut s = Simulation::new(3, SimConfig::default());
        s.reset(5).unwrap();
        let placed = s.cubes().to_vec();

        let report = s.step(DT, 1.0).unwrap();
        assert_eq!(report.infected_count, 1);
        assert!(!report.just_finished);
        assert_eq!(s.cubes(), &placed[..]);
        assert_eq!(s.steps(), 0);
    }

    #[test]
    fn test_invalid_dt_rejected_before_mutation() {
        let mut s = running_sim(4, 3);
        let placed = s.cubes().to_vec();

        assert_eq!(s.step(-0.01, 1.0), Err(SimError::InvalidDelta(-0.01)));
        assert!(matches!(
            s.step(f32::NAN, 1.0),
            Err(SimError::InvalidDelta(_))
        ));
        assert_eq!(s.cubes(), &placed[..]);
        assert_eq!(s.steps(), 0);
    }

    #[test]
    fn test_dt_clamped_to_max_step() {
        let mut s = running_sim(5, 2);
        s.cubes[0].pos = Vec2::new(-10.0, 0.0);
        s.cubes[0].vel = Vec2::X;
        s.cubes[1].pos = Vec2::new(10.0, 0.0);
        s.cubes[1].vel = Vec2::ZERO;

        // A 5-second hitch advances at most max_step_dt * base_speed = 1.0
        s.step(5.0, 1.0).unwrap();
        assert!((s.cubes()[0].pos.x - -9.0).abs() < 1e-5);
        assert_eq!(s.cubes()[1].pos, Vec2::new(10.0, 0.0));
    }

    #[test]
    fn test_zero_speed_freezes_motion_not_clock() {
        let mut s = running_sim(6, 50);
        let placed = s.cubes().to_vec();

        for _ in 0..100 {
            let report = s.step(DT, 0.0).unwrap();
            assert_eq!(report.infected_count, 1);
        }
        // Spawn spacing guarantees no resting contacts, so nothing moved
        assert_eq!(s.cubes(), &placed[..]);
        assert_eq!(s.steps(), 100);
    }

    #[test]
    fn test_negative_speed_treated_as_zero() {
        let mut s = running_sim(7, 10);
        let placed = s.cubes().to_vec();
        s.step(DT, -2.0).unwrap();
        assert_eq!(s.cubes(), &placed[..]);
    }

    #[test]
    fn test_collision_course_terminates_once() {
        let mut s = running_sim(8, 2);
        s.cubes[0].pos = Vec2::new(-2.0, 0.0);
        s.cubes[0].vel = Vec2::X;
        s.cubes[1].pos = Vec2::new(2.0, 0.0);
        s.cubes[1].vel = -Vec2::X;

        let mut finishes = 0;
        for _ in 0..20 {
            if s.step(DT, 1.0).unwrap().just_finished {
                finishes += 1;
            }
        }
        assert_eq!(finishes, 1);
        assert!(s.is_finished());
        assert_eq!(s.infected_count(), 2);
        // Velocities swapped head-on: the pair is now separating
        assert_eq!(s.cubes()[0].vel, -Vec2::X);
        assert_eq!(s.cubes()[1].vel, Vec2::X);
    }

    #[test]
    fn test_transitive_spread_in_single_step() {
        let mut s = running_sim(9, 3);
        // Chain: infected 0 touches 1, and after separation 1 touches 2
        s.cubes[0].pos = Vec2::ZERO;
        s.cubes[1].pos = Vec2::new(0.9, 0.0);
        s.cubes[2].pos = Vec2::new(1.8, 0.0);
        for cube in s.cubes.iter_mut() {
            cube.vel = Vec2::ZERO;
        }

        let report = s.step(DT, 0.0).unwrap();
        assert_eq!(report.infected_count, 3);
        assert!(report.just_finished);
    }

    #[test]
    fn test_wall_reflection_preserves_speed() {
        let mut s = running_sim(10, 2);
        let bound = s.config().bound_x();
        s.cubes[0].pos = Vec2::new(bound - 0.01, 3.0);
        s.cubes[0].vel = Vec2::new(0.8, 0.6);
        s.cubes[1].pos = Vec2::new(-5.0, -5.0);
        s.cubes[1].vel = Vec2::ZERO;

        s.step(DT, 1.0).unwrap();
        let cube = s.cubes()[0];
        assert_eq!(cube.pos.x, bound);
        assert_eq!(cube.vel.x, -0.8);
        assert_eq!(cube.vel.y, 0.6);
        assert!((cube.vel.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_monotonic_infection_soak() {
        let mut s = running_sim(11, 40);
        let config = *s.config();
        // Pair separation runs after the wall clamp, so an observable
        // position can sit at most half an overlap outside the bound
        let slack_x = config.bound_x() + config.cube_size * 0.5 + 1e-3;
        let slack_z = config.bound_z() + config.cube_size * 0.5 + 1e-3;

        let mut last_count = 1;
        let mut was_infected = vec![false; 40];
        for _ in 0..3000 {
            let report = s.step(DT, 1.0).unwrap();
            assert!(report.infected_count >= last_count);
            last_count = report.infected_count;

            for (i, cube) in s.cubes().iter().enumerate() {
                assert!(cube.pos.x.abs() <= slack_x);
                assert!(cube.pos.y.abs() <= slack_z);
                // Once infected, never healthy again
                assert!(!was_infected[i] || cube.infected);
                was_infected[i] = cube.infected;
            }
            if s.is_finished() {
                break;
            }
        }
    }

    #[test]
    fn test_determinism_full_run() {
        let mut a = running_sim(777, 30);
        let mut b = running_sim(777, 30);

        // Varying frame deltas and speeds, including a frozen stretch
        let schedule = [(DT, 1.0f32), (1.0 / 30.0, 1.5), (DT, 0.0), (0.02, 0.75)];
        for step in 0..500 {
            let (dt, speed) = schedule[step % schedule.len()];
            let ra = a.step(dt, speed).unwrap();
            let rb = b.step(dt, speed).unwrap();
            assert_eq!(ra, rb);
        }
        assert_eq!(a.cubes(), b.cubes());
        assert_eq!(a.infected_count(), b.infected_count());
        assert_eq!(a.phase(), b.phase());
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(16))]

            #[test]
            fn prop_count_monotonic_and_contained(
                seed in any::<u64>(),
                count in 2usize..32,
                steps in 1usize..150,
            ) {
                let mut s = running_sim(seed, count);
                let config = *s.config();
                let slack_x = config.bound_x() + config.cube_size * 0.5 + 1e-3;
                let slack_z = config.bound_z() + config.cube_size * 0.5 + 1e-3;

                let mut last = s.infected_count();
                for _ in 0..steps {
                    let report = s.step(DT, 1.0).unwrap();
                    prop_assert!(report.infected_count >= last);
                    prop_assert!(report.infected_count <= count);
                    last = report.infected_count;
                    for cube in s.cubes() {
                        prop_assert!(cube.pos.x.abs() <= slack_x);
                        prop_assert!(cube.pos.y.abs() <= slack_z);
                    }
                }
            }
        }
    }
}
